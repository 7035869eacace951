//! The three demand variants and their satisfaction checks.
//!
//! Each demand carries the `Availability` mark written by the last
//! satisfaction check. The mark is a cache: later phases of the same check and
//! presentation code read it back.

use crate::{Availability, CheckContext, ItemTypeId, QualityId};

/// Presentation hint for one demand, derived from its mark plus a fresh check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DemandStatus {
    Available,
    /// This member is missing but another member of its group is available.
    AlternativeAvailable,
    Insufficient,
    Unavailable,
}

mod private {
    pub trait Sealed {}
    impl Sealed for super::QualityDemand {}
    impl Sealed for super::ToolDemand {}
    impl Sealed for super::ItemDemand {}
}

/// Shared capability of the three demand variants. Sealed: the set of
/// variants is closed.
pub trait Demand: private::Sealed {
    fn subject(&self) -> &str;
    fn has(&self, ctx: &CheckContext<'_>, batch: i32) -> bool;
    fn availability(&self) -> Availability;
    fn set_availability(&mut self, availability: Availability);
    /// `group_has_one` is whether any member of this demand's group is marked
    /// available.
    fn status(&self, group_has_one: bool, ctx: &CheckContext<'_>, batch: i32) -> DemandStatus;
    fn describe(&self, batch: i32) -> String;
}

/// Borrowed view over any demand, for passes that walk all three lists.
#[derive(Debug, Clone, Copy)]
pub enum DemandRef<'a> {
    Quality(&'a QualityDemand),
    Tool(&'a ToolDemand),
    Item(&'a ItemDemand),
}

impl DemandRef<'_> {
    pub fn subject(&self) -> &str {
        match self {
            Self::Quality(q) => q.subject(),
            Self::Tool(t) => t.subject(),
            Self::Item(i) => i.subject(),
        }
    }

    pub fn availability(&self) -> Availability {
        match self {
            Self::Quality(q) => q.availability,
            Self::Tool(t) => t.availability,
            Self::Item(i) => i.availability,
        }
    }
}

fn fresh_status(has_now: bool, group_has_one: bool) -> DemandStatus {
    if has_now {
        DemandStatus::Available
    } else if group_has_one {
        DemandStatus::AlternativeAvailable
    } else {
        DemandStatus::Unavailable
    }
}

// ---------------------------------------------------------------------------
// Quality
// ---------------------------------------------------------------------------

/// `count` distinct tools with `quality` at `level` or better.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityDemand {
    pub quality: QualityId,
    /// May be zero or negative (butchering uses this).
    pub level: i32,
    pub count: i32,
    pub availability: Availability,
}

impl QualityDemand {
    pub fn new(quality: impl Into<String>, level: i32, count: i32) -> Self {
        Self {
            quality: QualityId(quality.into()),
            level,
            count,
            availability: Availability::default(),
        }
    }
}

impl Demand for QualityDemand {
    fn subject(&self) -> &str {
        self.quality.as_str()
    }

    fn has(&self, ctx: &CheckContext<'_>, _batch: i32) -> bool {
        ctx.inventory
            .has_quality(&self.quality, self.level, self.count)
    }

    fn availability(&self) -> Availability {
        self.availability
    }

    fn set_availability(&mut self, availability: Availability) {
        self.availability = availability;
    }

    fn status(&self, _group_has_one: bool, _ctx: &CheckContext<'_>, _batch: i32) -> DemandStatus {
        if self.availability.is_available() {
            DemandStatus::Available
        } else {
            DemandStatus::Unavailable
        }
    }

    fn describe(&self, _batch: i32) -> String {
        let noun = if self.count == 1 { "tool" } else { "tools" };
        format!(
            "{} {noun} with {} of {} or more",
            self.count, self.quality, self.level
        )
    }
}

// ---------------------------------------------------------------------------
// Tool
// ---------------------------------------------------------------------------

/// A specific tool. Positive `count` consumes that many charges per batch
/// unit; negative `count` needs `|count|` instances present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDemand {
    pub item_type: ItemTypeId,
    pub count: i32,
    pub availability: Availability,
}

impl ToolDemand {
    pub fn new(item_type: impl Into<String>, count: i32) -> Self {
        Self {
            item_type: ItemTypeId(item_type.into()),
            count,
            availability: Availability::default(),
        }
    }

    pub fn by_charges(&self) -> bool {
        self.count > 0
    }

    /// Instances needed when the tool is used by instance.
    pub fn instances(&self) -> i32 {
        self.count.saturating_abs()
    }
}

impl Demand for ToolDemand {
    fn subject(&self) -> &str {
        self.item_type.as_str()
    }

    fn has(&self, ctx: &CheckContext<'_>, batch: i32) -> bool {
        if self.by_charges() {
            ctx.inventory
                .has_charges(&self.item_type, self.count.saturating_mul(batch))
        } else {
            ctx.inventory.has_tools(&self.item_type, self.instances())
        }
    }

    fn availability(&self) -> Availability {
        self.availability
    }

    fn set_availability(&mut self, availability: Availability) {
        self.availability = availability;
    }

    fn status(&self, group_has_one: bool, ctx: &CheckContext<'_>, batch: i32) -> DemandStatus {
        if self.availability == Availability::Insufficient {
            return DemandStatus::Insufficient;
        }
        fresh_status(self.has(ctx, batch), group_has_one)
    }

    fn describe(&self, batch: i32) -> String {
        if self.by_charges() {
            let charges = self.count.saturating_mul(batch);
            let noun = if charges == 1 { "charge" } else { "charges" };
            format!("{} ({charges} {noun})", self.item_type)
        } else if self.instances() == 1 {
            self.item_type.to_string()
        } else {
            format!("{} x{}", self.item_type, self.instances())
        }
    }
}

// ---------------------------------------------------------------------------
// Item (consumed component)
// ---------------------------------------------------------------------------

/// A consumed component: `|count|` per batch unit, counted by charges when
/// the item type is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDemand {
    pub item_type: ItemTypeId,
    pub count: i32,
    /// Cleared by the `NO_RECOVER` marker; such components are dropped from
    /// disassembly requirements.
    pub recoverable: bool,
    pub availability: Availability,
}

impl ItemDemand {
    pub fn new(item_type: impl Into<String>, count: i32) -> Self {
        Self {
            item_type: ItemTypeId(item_type.into()),
            count,
            recoverable: true,
            availability: Availability::default(),
        }
    }

    #[must_use]
    pub fn unrecoverable(mut self) -> Self {
        self.recoverable = false;
        self
    }

    /// Units needed for `batch` crafts, ignoring the sign of `count`.
    pub fn total(&self, batch: i32) -> i32 {
        self.count.saturating_abs().saturating_mul(batch)
    }
}

impl Demand for ItemDemand {
    fn subject(&self) -> &str {
        self.item_type.as_str()
    }

    fn has(&self, ctx: &CheckContext<'_>, batch: i32) -> bool {
        if ctx.substituted(&self.item_type) {
            return true;
        }
        let needed = self.total(batch);
        if ctx.item_types.count_by_charges(&self.item_type) {
            ctx.inventory.has_charges(&self.item_type, needed)
        } else {
            ctx.inventory.has_components(&self.item_type, needed)
        }
    }

    fn availability(&self) -> Availability {
        self.availability
    }

    fn set_availability(&mut self, availability: Availability) {
        self.availability = availability;
    }

    fn status(&self, group_has_one: bool, ctx: &CheckContext<'_>, batch: i32) -> DemandStatus {
        if self.availability == Availability::Insufficient {
            return DemandStatus::Insufficient;
        }
        fresh_status(self.has(ctx, batch), group_has_one)
    }

    fn describe(&self, batch: i32) -> String {
        format!("{} {}", self.total(batch), self.item_type)
    }
}

macro_rules! display_via_describe {
    ($($ty:ty),*) => {
        $(
            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.describe(1))
                }
            }
        )*
    };
}

display_via_describe!(QualityDemand, ToolDemand, ItemDemand);
