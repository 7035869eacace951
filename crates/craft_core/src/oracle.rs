//! Read-only capability interfaces the satisfaction engine queries.
//!
//! The engine never looks inside an inventory; it only asks these questions.

use std::collections::BTreeMap;

use crate::{ItemTypeId, QualityId, TraitId};

/// Snapshot of what the crafter can reach.
pub trait InventoryOracle {
    /// At least `count` distinct items with `quality` at `level` or above.
    fn has_quality(&self, quality: &QualityId, level: i32, count: i32) -> bool;
    /// At least `count` tool instances, pseudo tools included.
    fn has_tools(&self, item_type: &ItemTypeId, count: i32) -> bool;
    /// At least `count` charges, pseudo tools included.
    fn has_charges(&self, item_type: &ItemTypeId, count: i32) -> bool;
    /// At least `count` real items usable as consumed components.
    fn has_components(&self, item_type: &ItemTypeId, count: i32) -> bool;
}

pub trait ItemTypeOracle {
    fn is_type_defined(&self, item_type: &ItemTypeId) -> bool;
    fn count_by_charges(&self, item_type: &ItemTypeId) -> bool;
    fn qualities_provided(&self, item_type: &ItemTypeId) -> BTreeMap<QualityId, i32>;
    fn has_flag(&self, item_type: &ItemTypeId, flag: &str) -> bool;
}

pub trait ActorOracle {
    fn has_trait(&self, trait_id: &TraitId) -> bool;
    fn hunger_level(&self) -> i32;
}

/// An actor-side resource that stands in for some item types entirely.
///
/// A component demand on a covered type is satisfied whenever `applies`
/// returns true for the current actor.
#[derive(Clone)]
pub struct SubstituteRule {
    pub item_types: Vec<ItemTypeId>,
    pub applies: fn(&dyn ActorOracle) -> bool,
}

impl std::fmt::Debug for SubstituteRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubstituteRule")
            .field("item_types", &self.item_types)
            .finish_non_exhaustive()
    }
}

impl SubstituteRule {
    pub fn covers(&self, item_type: &ItemTypeId, actor: &dyn ActorOracle) -> bool {
        self.item_types.contains(item_type) && (self.applies)(actor)
    }
}

/// Everything one satisfaction check reads. Borrowed for the duration of the
/// check; nothing in here is mutated.
#[derive(Clone, Copy)]
pub struct CheckContext<'a> {
    pub inventory: &'a dyn InventoryOracle,
    pub item_types: &'a dyn ItemTypeOracle,
    pub actor: &'a dyn ActorOracle,
    pub substitutes: &'a [SubstituteRule],
}

impl<'a> CheckContext<'a> {
    pub fn new(
        inventory: &'a dyn InventoryOracle,
        item_types: &'a dyn ItemTypeOracle,
        actor: &'a dyn ActorOracle,
    ) -> Self {
        Self {
            inventory,
            item_types,
            actor,
            substitutes: &[],
        }
    }

    #[must_use]
    pub fn with_substitutes(mut self, substitutes: &'a [SubstituteRule]) -> Self {
        self.substitutes = substitutes;
        self
    }

    pub(crate) fn substituted(&self, item_type: &ItemTypeId) -> bool {
        self.substitutes
            .iter()
            .any(|rule| rule.covers(item_type, self.actor))
    }
}
