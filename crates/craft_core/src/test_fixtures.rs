//! Shared test fixtures for craft_core and downstream crates.
//!
//! `workshop_catalog()` is a small item catalog covering every case the
//! engine special-cases: charge-counted items, quality providers, the
//! disassembly substitution tools and an unrecoverable flag.
//! `Bench` bundles a catalog, a stock list and an actor into a `CheckContext`.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{
    ActorState, CheckContext, InventorySnapshot, ItemCatalog, ItemTypeDef, ItemTypeId, QualityId,
    StockEntry, SubstituteRule, FLAG_UNRECOVERABLE,
};

fn item(id: &str, qualities: &[(&str, i32)]) -> ItemTypeDef {
    ItemTypeDef {
        id: ItemTypeId::from(id),
        name: id.replace('_', " "),
        count_by_charges: false,
        qualities: qualities
            .iter()
            .map(|(q, level)| (QualityId::from(*q), *level))
            .collect::<BTreeMap<_, _>>(),
        flags: vec![],
    }
}

pub fn workshop_catalog() -> ItemCatalog {
    let mut thread = item("thread", &[]);
    thread.count_by_charges = true;
    let mut superglue = item("superglue", &[]);
    superglue.flags.push(FLAG_UNRECOVERABLE.to_string());

    ItemCatalog::new([
        item("knife", &[("CUT", 2)]),
        item("scissors", &[("CUT", 1)]),
        item("saw", &[("SAW_W", 1)]),
        item("hacksaw", &[("SAW_M", 1), ("SAW_M_FINE", 1)]),
        item("hammer", &[("HAMMER", 3)]),
        item("welder", &[]),
        item("welder_crude", &[]),
        item("oxy_torch", &[]),
        item("forge", &[]),
        item("char_forge", &[]),
        item("crucible", &[]),
        item("sewing_kit", &[]),
        item("mold_plastic", &[]),
        item("2x4", &[]),
        item("nail", &[]),
        item("rag", &[]),
        item("rags", &[]),
        item("rope_6", &[]),
        item("rope_30", &[]),
        thread,
        superglue,
    ])
}

/// A crafter's surroundings for tests.
pub struct Bench {
    catalog: ItemCatalog,
    entries: Vec<StockEntry>,
    inventory: InventorySnapshot,
    actor: ActorState,
    substitutes: Vec<SubstituteRule>,
}

impl Bench {
    pub fn new(catalog: ItemCatalog) -> Self {
        Self {
            inventory: InventorySnapshot::new(&[], &catalog),
            catalog,
            entries: vec![],
            actor: ActorState::default(),
            substitutes: vec![],
        }
    }

    #[must_use]
    pub fn with_entry(mut self, entry: StockEntry) -> Self {
        self.entries.push(entry);
        self.inventory = InventorySnapshot::new(&self.entries, &self.catalog);
        self
    }

    #[must_use]
    pub fn stock(self, item_type: &str, count: i32) -> Self {
        self.with_entry(StockEntry::new(item_type, count))
    }

    #[must_use]
    pub fn stock_charged(self, item_type: &str, count: i32, charges: i32) -> Self {
        self.with_entry(StockEntry::new(item_type, count).with_charges(charges))
    }

    #[must_use]
    pub fn stock_pseudo(self, item_type: &str, count: i32, charges: i32) -> Self {
        self.with_entry(StockEntry::new(item_type, count).with_charges(charges).pseudo())
    }

    #[must_use]
    pub fn with_actor(mut self, actor: ActorState) -> Self {
        self.actor = actor;
        self
    }

    #[must_use]
    pub fn with_substitutes(mut self, substitutes: Vec<SubstituteRule>) -> Self {
        self.substitutes = substitutes;
        self
    }

    pub fn context(&self) -> CheckContext<'_> {
        CheckContext::new(&self.inventory, &self.catalog, &self.actor)
            .with_substitutes(&self.substitutes)
    }
}

pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}
