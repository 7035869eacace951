//! Type definitions for `craft_core`.
//!
//! ID newtypes, the availability mark written by the satisfaction engine,
//! and the content definitions for item types and tool qualities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(RequirementId);
string_id!(QualityId);
string_id!(ItemTypeId);
string_id!(TraitId);

/// Item flag marking a type whose components are lost on disassembly.
pub const FLAG_UNRECOVERABLE: &str = "UNRECOVERABLE";

/// Marker in a component definition that clears `recoverable`.
pub const MARKER_NO_RECOVER: &str = "NO_RECOVER";

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

/// Per-demand verdict cached by the last satisfaction check.
///
/// Stale before the first check and after the inventory changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Availability {
    #[default]
    Unavailable,
    Available,
    /// Present in isolation, but oversubscribed by a tool or quality demand
    /// on the same item type.
    Insufficient,
}

impl Availability {
    pub fn from_has(has: bool) -> Self {
        if has {
            Self::Available
        } else {
            Self::Unavailable
        }
    }

    pub fn is_available(self) -> bool {
        self == Self::Available
    }
}

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

/// A tool quality such as `CUT` or `SAW_M_FINE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityDef {
    pub id: QualityId,
    pub name: String,
    /// `(level, usage)` pairs: an item with this quality at `level` or above
    /// unlocks `usage`.
    #[serde(default)]
    pub usages: Vec<(i32, String)>,
}

/// Read-only metadata for one item type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTypeDef {
    pub id: ItemTypeId,
    pub name: String,
    /// Ammo and some food are counted by charges rather than by item.
    #[serde(default)]
    pub count_by_charges: bool,
    /// Qualities this item provides, keyed by quality with the provided level.
    #[serde(default)]
    pub qualities: BTreeMap<QualityId, i32>,
    #[serde(default)]
    pub flags: Vec<String>,
}

impl ItemTypeDef {
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }
}
