//! In-memory implementations of the oracle traits.
//!
//! `InventorySnapshot` is a frozen tally of what the crafter can reach;
//! rebuild it whenever the underlying stock changes.

use std::collections::{BTreeMap, BTreeSet};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::{
    ActorOracle, InventoryOracle, ItemTypeDef, ItemTypeId, ItemTypeOracle, QualityId, TraitId,
};

// ---------------------------------------------------------------------------
// Item catalog
// ---------------------------------------------------------------------------

/// Item-type metadata keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    types: AHashMap<ItemTypeId, ItemTypeDef>,
}

impl ItemCatalog {
    pub fn new(defs: impl IntoIterator<Item = ItemTypeDef>) -> Self {
        Self {
            types: defs.into_iter().map(|d| (d.id.clone(), d)).collect(),
        }
    }

    pub fn get(&self, item_type: &ItemTypeId) -> Option<&ItemTypeDef> {
        self.types.get(item_type)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl ItemTypeOracle for ItemCatalog {
    fn is_type_defined(&self, item_type: &ItemTypeId) -> bool {
        self.types.contains_key(item_type)
    }

    fn count_by_charges(&self, item_type: &ItemTypeId) -> bool {
        self.get(item_type).is_some_and(|d| d.count_by_charges)
    }

    fn qualities_provided(&self, item_type: &ItemTypeId) -> BTreeMap<QualityId, i32> {
        self.get(item_type)
            .map(|d| d.qualities.clone())
            .unwrap_or_default()
    }

    fn has_flag(&self, item_type: &ItemTypeId, flag: &str) -> bool {
        self.get(item_type).is_some_and(|d| d.has_flag(flag))
    }
}

// ---------------------------------------------------------------------------
// Inventory snapshot
// ---------------------------------------------------------------------------

/// One stack of items within reach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    pub item_type: ItemTypeId,
    #[serde(default = "one")]
    pub count: i32,
    /// Total charges across the stack.
    #[serde(default)]
    pub charges: i32,
    /// Provided by furniture or a vehicle (a welding rig's welder): usable
    /// as a tool and for its qualities, never consumed as a component.
    #[serde(default)]
    pub pseudo: bool,
}

fn one() -> i32 {
    1
}

impl StockEntry {
    pub fn new(item_type: impl Into<String>, count: i32) -> Self {
        Self {
            item_type: ItemTypeId(item_type.into()),
            count,
            charges: 0,
            pseudo: false,
        }
    }

    #[must_use]
    pub fn with_charges(mut self, charges: i32) -> Self {
        self.charges = charges;
        self
    }

    #[must_use]
    pub fn pseudo(mut self) -> Self {
        self.pseudo = true;
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    components: i32,
    tools: i32,
    charges: i32,
}

#[derive(Debug, Clone, Default)]
pub struct InventorySnapshot {
    tallies: AHashMap<ItemTypeId, Tally>,
    /// Per quality: `(provided level, instance count)`.
    qualities: AHashMap<QualityId, Vec<(i32, i32)>>,
}

impl InventorySnapshot {
    pub fn new(entries: &[StockEntry], item_types: &dyn ItemTypeOracle) -> Self {
        let mut snapshot = Self::default();
        for entry in entries {
            let tally = snapshot.tallies.entry(entry.item_type.clone()).or_default();
            tally.tools = tally.tools.saturating_add(entry.count);
            tally.charges = tally.charges.saturating_add(entry.charges);
            if !entry.pseudo {
                tally.components = tally.components.saturating_add(entry.count);
            }
            for (quality, level) in item_types.qualities_provided(&entry.item_type) {
                snapshot
                    .qualities
                    .entry(quality)
                    .or_default()
                    .push((level, entry.count));
            }
        }
        snapshot
    }

    fn tally(&self, item_type: &ItemTypeId) -> Tally {
        self.tallies.get(item_type).copied().unwrap_or_default()
    }
}

impl InventoryOracle for InventorySnapshot {
    fn has_quality(&self, quality: &QualityId, level: i32, count: i32) -> bool {
        let found: i32 = self.qualities.get(quality).map_or(0, |providers| {
            providers
                .iter()
                .filter(|(provided, _)| *provided >= level)
                .fold(0, |acc: i32, (_, n)| acc.saturating_add(*n))
        });
        found >= count
    }

    fn has_tools(&self, item_type: &ItemTypeId, count: i32) -> bool {
        self.tally(item_type).tools >= count
    }

    fn has_charges(&self, item_type: &ItemTypeId, count: i32) -> bool {
        self.tally(item_type).charges >= count
    }

    fn has_components(&self, item_type: &ItemTypeId, count: i32) -> bool {
        self.tally(item_type).components >= count
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorState {
    #[serde(default)]
    pub traits: BTreeSet<TraitId>,
    #[serde(default)]
    pub hunger: i32,
}

impl ActorOracle for ActorState {
    fn has_trait(&self, trait_id: &TraitId) -> bool {
        self.traits.contains(trait_id)
    }

    fn hunger_level(&self) -> i32 {
        self.hunger
    }
}
