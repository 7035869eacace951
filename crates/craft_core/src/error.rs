//! Error types for requirement loading and registry lookups.
//!
//! `can_satisfy` is total and never produces one of these.

use thiserror::Error;

use crate::{ItemTypeId, RequirementId};

/// Which registry an unknown identifier was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Requirement,
    Quality,
}

impl std::fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Requirement => f.write_str("requirement"),
            Self::Quality => f.write_str("quality"),
        }
    }
}

fn in_context(context: &Option<RequirementId>) -> String {
    context
        .as_ref()
        .map(|c| format!(" in {c}"))
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequirementError {
    /// A demand count outside its valid range. Fatal to the enclosing requirement.
    #[error("malformed demand '{subject}' in requirement '{requirement}': {reason}")]
    MalformedDemand {
        requirement: String,
        subject: String,
        reason: &'static str,
    },

    #[error("unknown {kind} '{id}'{}", in_context(.context))]
    UnknownIdentifier {
        kind: IdentifierKind,
        id: String,
        /// Requirement that referenced the identifier, when known.
        context: Option<RequirementId>,
    },

    #[error("'{item_type}' in '{requirement}' is not a valid item type")]
    UndefinedItemType {
        requirement: RequirementId,
        item_type: ItemTypeId,
    },

    #[error("id was not specified for requirement")]
    MissingId,
}
