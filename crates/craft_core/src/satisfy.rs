//! Satisfaction engine: can this requirement be met from this inventory?
//!
//! A check runs four phases and never short-circuits. Phases 1-3 write an
//! availability mark on every quality, tool and component demand. Phase 4
//! reads those marks to find components that are also claimed as a tool or
//! as a quality provider, and downgrades them to `Insufficient` when the
//! inventory cannot cover both uses at once.

use crate::requirement::{any_marked_available, find_by_subject};
use crate::{
    Alternatives, Availability, CheckContext, Demand, DemandStatus, ItemDemand, QualityDemand,
    Requirement, ToolDemand,
};

/// Presentation status for every demand, shaped like the requirement lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    pub qualities: Vec<Vec<DemandStatus>>,
    pub tools: Vec<Vec<DemandStatus>>,
    pub components: Vec<Vec<DemandStatus>>,
}

/// Marks every member of every group; true when each group has a member.
/// An empty group is unsatisfied.
fn mark_list<T: Demand>(list: &mut [Alternatives<T>], ctx: &CheckContext<'_>, batch: i32) -> bool {
    let mut all_groups = true;
    for group in list.iter_mut() {
        let mut any_member = false;
        for demand in group.iter_mut() {
            let has = demand.has(ctx, batch);
            demand.set_availability(Availability::from_has(has));
            any_member |= has;
        }
        all_groups &= any_member;
    }
    all_groups
}

fn list_statuses<T: Demand>(
    list: &[Alternatives<T>],
    ctx: &CheckContext<'_>,
    batch: i32,
) -> Vec<Vec<DemandStatus>> {
    list.iter()
        .map(|group| {
            let has_one = any_marked_available(group);
            group
                .iter()
                .map(|d| d.status(has_one, ctx, batch))
                .collect()
        })
        .collect()
}

/// Phase 4 for one component. Returns whether it is still available.
fn resolve_double_use(
    comp: &mut ItemDemand,
    tools: &[Alternatives<ToolDemand>],
    qualities: &[Alternatives<QualityDemand>],
    ctx: &CheckContext<'_>,
    batch: i32,
) -> bool {
    if !comp.availability.is_available() {
        return false;
    }

    let needed = comp.total(batch);
    if let Some(tool) = find_by_subject(tools, comp.item_type.as_str())
        .filter(|t| t.availability.is_available())
    {
        // Same type needed as a tool. Real items cover both uses; pseudo
        // tools (a welding rig's welder) only the tool use.
        let tool_share = if tool.by_charges() {
            1
        } else {
            tool.instances()
        };
        let combined = needed.saturating_add(tool_share);
        let as_components = ItemDemand::new(comp.item_type.0.clone(), combined);
        let as_tools = ToolDemand::new(comp.item_type.0.clone(), -combined);
        // batch is already folded into `combined`
        if !as_components.has(ctx, 1) && !as_tools.has(ctx, 1) {
            comp.availability = Availability::Insufficient;
        }
    }

    for (quality, provided_level) in ctx.item_types.qualities_provided(&comp.item_type) {
        let Some(wanted) = find_by_subject(qualities, quality.as_str()) else {
            continue;
        };
        if wanted.level > provided_level {
            continue;
        }
        let total = wanted.count.saturating_add(comp.count.saturating_abs());
        if !ctx.inventory.has_quality(&wanted.quality, wanted.level, total) {
            comp.availability = Availability::Insufficient;
        }
    }

    comp.availability.is_available()
}

impl Requirement {
    /// Checks the requirement for `batch` crafts, rewriting every demand's
    /// availability mark.
    ///
    /// Marks from a previous check are overwritten, so repeating a check
    /// against an unchanged inventory reproduces the same marks.
    pub fn can_satisfy(&mut self, ctx: &CheckContext<'_>, batch: i32) -> bool {
        let qualities_ok = mark_list(&mut self.qualities, ctx, batch);
        let tools_ok = mark_list(&mut self.tools, ctx, batch);
        let components_ok = mark_list(&mut self.components, ctx, batch);
        let enough = self.check_enough_materials(ctx, batch);
        qualities_ok && tools_ok && components_ok && enough
    }

    /// Phase 4 on its own. Expects marks from phases 1-3 of the same check:
    /// fails a component group once none of its members is still available.
    pub fn check_enough_materials(&mut self, ctx: &CheckContext<'_>, batch: i32) -> bool {
        let Self {
            qualities,
            tools,
            components,
            ..
        } = self;
        let mut all_groups = true;
        for group in components.iter_mut() {
            let mut any_member = false;
            for comp in group.iter_mut() {
                any_member |= resolve_double_use(comp, tools, qualities, ctx, batch);
            }
            all_groups &= any_member;
        }
        all_groups
    }

    /// Presentation status of every demand, read from the current marks.
    pub fn statuses(&self, ctx: &CheckContext<'_>, batch: i32) -> StatusReport {
        StatusReport {
            qualities: list_statuses(&self.qualities, ctx, batch),
            tools: list_statuses(&self.tools, ctx, batch),
            components: list_statuses(&self.components, ctx, batch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{workshop_catalog, Bench};
    use smallvec::smallvec;

    fn planks_with_saw() -> Requirement {
        let mut req = Requirement::new("planks");
        req.components = vec![smallvec![ItemDemand::new("2x4", 1)]];
        req.tools = vec![smallvec![ToolDemand::new("saw", -1)]];
        req
    }

    #[test]
    fn empty_requirement_is_trivially_satisfied() {
        let bench = Bench::new(workshop_catalog());
        let mut req = Requirement::new("nothing");
        assert!(req.can_satisfy(&bench.context(), 1));
    }

    #[test]
    fn empty_group_is_never_satisfied() {
        let bench = Bench::new(workshop_catalog()).stock("saw", 1);
        let mut req = Requirement::new("hollow");
        req.tools = vec![smallvec![]];
        assert!(!req.can_satisfy(&bench.context(), 1));
    }

    #[test]
    fn missing_planks_fail_but_saw_is_marked() {
        let bench = Bench::new(workshop_catalog()).stock("saw", 1);
        let mut req = planks_with_saw();
        assert!(!req.can_satisfy(&bench.context(), 1));
        assert_eq!(req.tools[0][0].availability, Availability::Available);
        assert_eq!(req.components[0][0].availability, Availability::Unavailable);
    }

    #[test]
    fn all_phases_run_even_after_failure() {
        // qualities fail first; tools and components must still be marked
        let bench = Bench::new(workshop_catalog()).stock("saw", 1).stock("2x4", 1);
        let mut req = planks_with_saw();
        req.qualities = vec![smallvec![QualityDemand::new("HAMMER", 1, 1)]];
        assert!(!req.can_satisfy(&bench.context(), 1));
        assert_eq!(req.qualities[0][0].availability, Availability::Unavailable);
        assert_eq!(req.tools[0][0].availability, Availability::Available);
        assert_eq!(req.components[0][0].availability, Availability::Available);
    }

    #[test]
    fn any_member_satisfies_group() {
        let bench = Bench::new(workshop_catalog()).stock("rags", 5);
        let mut req = Requirement::new("bandage");
        req.components = vec![smallvec![
            ItemDemand::new("rag", 3),
            ItemDemand::new("rags", 5),
        ]];
        assert!(req.can_satisfy(&bench.context(), 1));
        assert_eq!(req.components[0][0].availability, Availability::Unavailable);
        assert_eq!(req.components[0][1].availability, Availability::Available);
    }

    #[test]
    fn batch_scales_component_need() {
        let bench = Bench::new(workshop_catalog()).stock("saw", 1).stock("2x4", 3);
        let mut req = planks_with_saw();
        assert!(req.can_satisfy(&bench.context(), 3));
        assert!(!req.can_satisfy(&bench.context(), 4));
    }

    #[test]
    fn real_welder_used_as_tool_and_component_is_insufficient() {
        let bench = Bench::new(workshop_catalog()).stock_charged("welder", 1, 100);
        let mut req = Requirement::new("welded");
        req.tools = vec![smallvec![ToolDemand::new("welder", -1)]];
        req.components = vec![smallvec![ItemDemand::new("welder", 1)]];

        assert!(!req.can_satisfy(&bench.context(), 1));
        assert_eq!(req.tools[0][0].availability, Availability::Available);
        assert_eq!(
            req.components[0][0].availability,
            Availability::Insufficient,
        );
    }

    #[test]
    fn pseudo_welder_covers_the_tool_use() {
        let bench = Bench::new(workshop_catalog())
            .stock("welder", 1)
            .stock_pseudo("welder", 1, 500);
        let mut req = Requirement::new("welded");
        req.tools = vec![smallvec![ToolDemand::new("welder", -1)]];
        req.components = vec![smallvec![ItemDemand::new("welder", 1)]];
        assert!(req.can_satisfy(&bench.context(), 1));
        assert_eq!(req.components[0][0].availability, Availability::Available);
    }

    #[test]
    fn charge_tool_shares_one_instance_with_component() {
        let bench = Bench::new(workshop_catalog()).stock_charged("welder", 2, 100);
        let mut req = Requirement::new("welded");
        req.tools = vec![smallvec![ToolDemand::new("welder", 20)]];
        req.components = vec![smallvec![ItemDemand::new("welder", 1)]];
        assert!(req.can_satisfy(&bench.context(), 1));
    }

    #[test]
    fn unavailable_tool_does_not_trigger_double_use() {
        let bench = Bench::new(workshop_catalog()).stock("welder", 1);
        let mut req = Requirement::new("welded");
        req.tools = vec![smallvec![ToolDemand::new("welder", 50)]];
        req.components = vec![smallvec![ItemDemand::new("welder", 1)]];
        assert!(!req.can_satisfy(&bench.context(), 1));
        assert_eq!(req.tools[0][0].availability, Availability::Unavailable);
        assert_eq!(req.components[0][0].availability, Availability::Available);
    }

    #[test]
    fn quality_provider_consumed_as_component_is_insufficient() {
        let bench = Bench::new(workshop_catalog()).stock("knife", 1);
        let mut req = Requirement::new("shiv");
        req.qualities = vec![smallvec![QualityDemand::new("CUT", 1, 1)]];
        req.components = vec![smallvec![ItemDemand::new("knife", 1)]];
        assert!(!req.can_satisfy(&bench.context(), 1));
        assert_eq!(req.qualities[0][0].availability, Availability::Available);
        assert_eq!(
            req.components[0][0].availability,
            Availability::Insufficient,
        );

        let bench = Bench::new(workshop_catalog()).stock("knife", 1).stock("scissors", 1);
        assert!(req.can_satisfy(&bench.context(), 1));
    }

    #[test]
    fn quality_demand_above_provided_level_is_ignored() {
        let bench = Bench::new(workshop_catalog()).stock("scissors", 1);
        let mut req = Requirement::new("fine_cut");
        req.qualities = vec![smallvec![QualityDemand::new("CUT", 2, 1)]];
        req.components = vec![smallvec![ItemDemand::new("scissors", 1)]];
        req.can_satisfy(&bench.context(), 1);
        assert_eq!(req.components[0][0].availability, Availability::Available);
    }

    #[test]
    fn insufficient_member_does_not_fail_group_with_other_member() {
        let bench = Bench::new(workshop_catalog()).stock("knife", 1).stock("rag", 2);
        let mut req = Requirement::new("strips");
        req.qualities = vec![smallvec![QualityDemand::new("CUT", 1, 1)]];
        req.components = vec![smallvec![
            ItemDemand::new("knife", 1),
            ItemDemand::new("rag", 2),
        ]];
        assert!(req.can_satisfy(&bench.context(), 1));
        assert_eq!(
            req.components[0][0].availability,
            Availability::Insufficient,
        );
        assert_eq!(req.components[0][1].availability, Availability::Available);
    }

    #[test]
    fn statuses_reflect_marks() {
        let bench = Bench::new(workshop_catalog()).stock("rags", 5).stock("knife", 1);
        let mut req = Requirement::new("mixed");
        req.qualities = vec![smallvec![QualityDemand::new("CUT", 1, 1)]];
        req.components = vec![
            smallvec![ItemDemand::new("rag", 3), ItemDemand::new("rags", 5)],
            smallvec![ItemDemand::new("knife", 1)],
            smallvec![ItemDemand::new("nail", 4)],
        ];
        let ctx = bench.context();
        req.can_satisfy(&ctx, 1);
        let report = req.statuses(&ctx, 1);
        assert_eq!(report.qualities, vec![vec![DemandStatus::Available]]);
        assert_eq!(
            report.components,
            vec![
                vec![DemandStatus::AlternativeAvailable, DemandStatus::Available],
                vec![DemandStatus::Insufficient],
                vec![DemandStatus::Unavailable],
            ]
        );
    }

    #[test]
    fn extreme_negative_counts_check_without_overflow() {
        let def: crate::RequirementDef = serde_json::from_str(
            r#"{ "id": "vast", "tools": [ [ ["welder", -2147483648] ] ],
                 "components": [ [ ["welder", 1] ] ] }"#,
        )
        .unwrap();
        let mut req = def.build(None).unwrap();
        let bench = Bench::new(workshop_catalog()).stock("welder", 1);
        assert!(!req.can_satisfy(&bench.context(), 1));
        assert_eq!(req.tools[0][0].availability, Availability::Unavailable);
        assert_eq!(req.tools[0][0].instances(), i32::MAX);
        assert_eq!(req.tools[0][0].to_string(), "welder x2147483647");

        let mut planks = ItemDemand::new("2x4", 1);
        planks.count = i32::MIN;
        assert_eq!(planks.total(3), i32::MAX);
        req.components = vec![smallvec![planks]];
        assert!(!req.can_satisfy(&bench.context(), 3));
    }

    #[test]
    fn repeated_check_keeps_marks() {
        let bench = Bench::new(workshop_catalog()).stock("knife", 1).stock("saw", 1);
        let mut req = planks_with_saw();
        req.components[0].push(ItemDemand::new("knife", 1));
        req.qualities = vec![smallvec![QualityDemand::new("CUT", 1, 1)]];
        let ctx = bench.context();
        let first = req.can_satisfy(&ctx, 1);
        let marks = req.clone();
        let second = req.can_satisfy(&ctx, 1);
        assert_eq!(first, second);
        assert_eq!(req, marks);
    }
}
