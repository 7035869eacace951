//! Requirement algebra: batch scaling, union, and disassembly derivation.
//!
//! Every result is a derived requirement with no id; register it explicitly
//! to keep it.

use std::collections::HashSet;
use std::ops::{Add, Mul};

use smallvec::smallvec;

use crate::{ItemTypeOracle, QualityDemand, Requirement, FLAG_UNRECOVERABLE};

/// Tools whose crafting use is reversed by a quality instead. `None` means
/// the tool is simply not needed to take the result apart.
const DISASSEMBLY_SUBSTITUTIONS: &[(&str, Option<&str>)] = &[
    ("welder", Some("SAW_M_FINE")),
    ("welder_crude", Some("SAW_M_FINE")),
    ("oxy_torch", Some("SAW_M_FINE")),
    ("forge", Some("SAW_M_FINE")),
    ("char_forge", Some("SAW_M_FINE")),
    ("sewing_kit", Some("CUT")),
    ("mold_plastic", Some("CUT")),
    ("crucible", None),
];

const SUBSTITUTE_LEVEL: i32 = 1;
const SUBSTITUTE_COUNT: i32 = 1;

fn disassembly_substitute(tool: &str) -> Option<Option<&'static str>> {
    DISASSEMBLY_SUBSTITUTIONS
        .iter()
        .find(|(name, _)| *name == tool)
        .map(|(_, quality)| *quality)
}

impl Requirement {
    /// Requirement for `n` crafts at once. Tool and component counts grow by
    /// `n`; by-instance tools stay at one instance. Qualities are untouched.
    #[must_use]
    pub fn scaled(&self, n: u32) -> Self {
        let factor = i32::try_from(n).unwrap_or(i32::MAX);
        let mut res = self.clone();
        res.id = None;
        for demand in res.components.iter_mut().flatten() {
            demand.count = demand.count.saturating_mul(factor).max(-1);
        }
        for demand in res.tools.iter_mut().flatten() {
            demand.count = demand.count.saturating_mul(factor).max(-1);
        }
        res
    }

    /// Union of two requirements, list by list, `self` first. Nothing is
    /// deduplicated, not even qualities.
    #[must_use]
    pub fn combined(&self, rhs: &Self) -> Self {
        let mut res = self.clone();
        res.id = None;
        res.qualities.extend(rhs.qualities.iter().cloned());
        res.tools.extend(rhs.tools.iter().cloned());
        res.components.extend(rhs.components.iter().cloned());
        res
    }

    /// Requirement for taking the crafted result apart again.
    ///
    /// A tool group containing any substituted tool is dropped whole and its
    /// replacement quality (if any) joins the first quality group, which is
    /// then deduplicated by quality, first occurrence kept. Components that
    /// are marked `NO_RECOVER` or whose type is flagged unrecoverable are
    /// removed; groups left empty go with them.
    #[must_use]
    pub fn disassembly(&self, item_types: &dyn ItemTypeOracle) -> Self {
        let mut res = self.clone();
        res.id = None;

        let mut new_qualities = Vec::new();
        res.tools.retain(|group| {
            let substitute = group
                .iter()
                .find_map(|tool| disassembly_substitute(tool.item_type.as_str()));
            match substitute {
                Some(quality) => {
                    if let Some(quality) = quality {
                        new_qualities.push(QualityDemand::new(
                            quality,
                            SUBSTITUTE_LEVEL,
                            SUBSTITUTE_COUNT,
                        ));
                    }
                    false
                }
                None => true,
            }
        });

        if !new_qualities.is_empty() {
            if res.qualities.is_empty() {
                res.qualities.push(smallvec![]);
            }
            let consolidated = &mut res.qualities[0];
            consolidated.extend(new_qualities);
            let mut seen = HashSet::new();
            consolidated.retain(|q| seen.insert(q.quality.clone()));
        }

        for group in &mut res.components {
            group.retain(|comp| {
                comp.recoverable && !item_types.has_flag(&comp.item_type, FLAG_UNRECOVERABLE)
            });
        }
        res.components.retain(|group| !group.is_empty());

        res
    }
}

impl Mul<u32> for &Requirement {
    type Output = Requirement;

    fn mul(self, n: u32) -> Requirement {
        self.scaled(n)
    }
}

impl Add for &Requirement {
    type Output = Requirement;

    fn add(self, rhs: &Requirement) -> Requirement {
        self.combined(rhs)
    }
}
