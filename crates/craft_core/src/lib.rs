//! `craft_core`: crafting requirement checks.
//!
//! No IO, no logging. Answers whether a requirement can be met from an
//! inventory snapshot, marks what is missing, and derives scaled, combined
//! and disassembly requirements.

mod algebra;
mod demand;
mod error;
mod inventory;
mod oracle;
mod registry;
mod requirement;
mod satisfy;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use demand::{Demand, DemandRef, DemandStatus, ItemDemand, QualityDemand, ToolDemand};
pub use error::{IdentifierKind, RequirementError};
pub use inventory::{ActorState, InventorySnapshot, ItemCatalog, StockEntry};
pub use oracle::{ActorOracle, CheckContext, InventoryOracle, ItemTypeOracle, SubstituteRule};
pub use registry::{RequirementRegistry, SaveOutcome};
pub use requirement::{
    Alternatives, ItemDemandDef, Missing, QualityDemandDef, QualityGroupDef, Requirement,
    RequirementDef, ToolDemandDef, ToolGroupDef,
};
pub use satisfy::StatusReport;
pub use types::*;
