//! The requirement aggregate and its content-file definition shape.
//!
//! A requirement holds three lists of alternative groups. Every group in a
//! list must be satisfied; any one member satisfies its group.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    Demand, DemandRef, ItemDemand, ItemTypeId, QualityDemand, QualityId, RequirementError,
    RequirementId, ToolDemand, MARKER_NO_RECOVER,
};

/// Interchangeable options; the first member is the primary one.
pub type Alternatives<T> = SmallVec<[T; 2]>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirement {
    /// `None` for derived aggregates (sums, scaled copies, disassembly) that
    /// have not been registered.
    pub id: Option<RequirementId>,
    pub qualities: Vec<Alternatives<QualityDemand>>,
    pub tools: Vec<Alternatives<ToolDemand>>,
    pub components: Vec<Alternatives<ItemDemand>>,
}

/// Groups from each list that had no member marked available.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Missing<'a> {
    pub qualities: Vec<&'a [QualityDemand]>,
    pub tools: Vec<&'a [ToolDemand]>,
    pub components: Vec<&'a [ItemDemand]>,
}

impl Missing<'_> {
    pub fn is_empty(&self) -> bool {
        self.qualities.is_empty() && self.tools.is_empty() && self.components.is_empty()
    }
}

pub(crate) fn any_marked_available<T: Demand>(group: &[T]) -> bool {
    group.iter().any(|d| d.availability().is_available())
}

fn unmarked_groups<T: Demand>(list: &[Alternatives<T>]) -> Vec<&[T]> {
    list.iter()
        .filter(|group| !any_marked_available(group))
        .map(|group| group.as_slice())
        .collect()
}

/// First demand on `subject` in scan order: group by group, member by member.
pub(crate) fn find_by_subject<'a, T: Demand>(
    list: &'a [Alternatives<T>],
    subject: &str,
) -> Option<&'a T> {
    list.iter().flatten().find(|d| d.subject() == subject)
}

fn remove_subject<T: Demand>(list: &mut Vec<Alternatives<T>>, item_type: &ItemTypeId) {
    for group in list.iter_mut() {
        group.retain(|d| d.subject() != item_type.as_str());
    }
    list.retain(|group| !group.is_empty());
}

impl Requirement {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(RequirementId(id.into())),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.qualities.is_empty() && self.tools.is_empty() && self.components.is_empty()
    }

    /// Every demand, qualities first, then tools, then components.
    pub fn demands(&self) -> impl Iterator<Item = DemandRef<'_>> {
        let qualities = self.qualities.iter().flatten().map(DemandRef::Quality);
        let tools = self.tools.iter().flatten().map(DemandRef::Tool);
        let components = self.components.iter().flatten().map(DemandRef::Item);
        qualities.chain(tools).chain(components)
    }

    /// Groups with no member marked available by the last satisfaction check.
    pub fn missing(&self) -> Missing<'_> {
        Missing {
            qualities: unmarked_groups(&self.qualities),
            tools: unmarked_groups(&self.tools),
            components: unmarked_groups(&self.components),
        }
    }

    /// Drops every tool and component demand on `item_type`, then any group
    /// left empty.
    pub fn remove_item(&mut self, item_type: &ItemTypeId) {
        remove_subject(&mut self.tools, item_type);
        remove_subject(&mut self.components, item_type);
    }

    pub fn first_quality(&self, quality: &QualityId) -> Option<&QualityDemand> {
        find_by_subject(&self.qualities, quality.as_str())
    }
}

// ---------------------------------------------------------------------------
// Content definition shape
// ---------------------------------------------------------------------------

fn default_one() -> i32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityDemandDef {
    pub id: String,
    #[serde(default = "default_one")]
    pub level: i32,
    #[serde(default = "default_one")]
    pub amount: i32,
}

/// Qualities are normally listed one by one, each mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QualityGroupDef {
    Single(QualityDemandDef),
    Alternatives(Vec<QualityDemandDef>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolDemandDef {
    /// Construction shorthand: one tool instance, count -1.
    Shorthand(String),
    Counted(String, i32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolGroupDef {
    Single(String),
    Alternatives(Vec<ToolDemandDef>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemDemandDef {
    Marked(String, i32, String),
    Plain(String, i32),
}

/// One requirement as it appears in content files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qualities: Vec<QualityGroupDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolGroupDef>,
    /// Each entry is a list of alternatives.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Vec<ItemDemandDef>>,
}

fn malformed(requirement: &str, subject: &str, reason: &'static str) -> RequirementError {
    RequirementError::MalformedDemand {
        requirement: requirement.to_string(),
        subject: subject.to_string(),
        reason,
    }
}

impl QualityDemandDef {
    fn build(&self, requirement: &str) -> Result<QualityDemand, RequirementError> {
        if self.amount <= 0 {
            return Err(malformed(
                requirement,
                &self.id,
                "quality amount must be a positive number",
            ));
        }
        Ok(QualityDemand::new(self.id.clone(), self.level, self.amount))
    }
}

impl ToolDemandDef {
    fn build(&self, requirement: &str) -> Result<ToolDemand, RequirementError> {
        let (item_type, count) = match self {
            Self::Shorthand(item_type) => (item_type, -1),
            Self::Counted(item_type, count) => (item_type, *count),
        };
        if count == 0 {
            return Err(malformed(requirement, item_type, "tool count must not be 0"));
        }
        Ok(ToolDemand::new(item_type.clone(), count))
    }
}

impl ItemDemandDef {
    fn build(&self, requirement: &str) -> Result<ItemDemand, RequirementError> {
        let (item_type, count, marker) = match self {
            Self::Marked(item_type, count, marker) => (item_type, *count, Some(marker)),
            Self::Plain(item_type, count) => (item_type, *count, None),
        };
        if count <= 0 {
            return Err(malformed(
                requirement,
                item_type,
                "item count must be a positive number",
            ));
        }
        let mut demand = ItemDemand::new(item_type.clone(), count);
        demand.recoverable = marker.map_or(true, |m| m != MARKER_NO_RECOVER);
        Ok(demand)
    }
}

fn build_group<D, T>(
    defs: &[D],
    build: impl Fn(&D) -> Result<T, RequirementError>,
) -> Result<Alternatives<T>, RequirementError> {
    defs.iter().map(build).collect()
}

impl RequirementDef {
    /// Builds a requirement, validating every demand. `id` overrides the id in
    /// the definition; one of the two must be present.
    pub fn build(&self, id: Option<&str>) -> Result<Requirement, RequirementError> {
        let id = id
            .or(self.id.as_deref())
            .filter(|id| !id.is_empty())
            .ok_or(RequirementError::MissingId)?;

        let mut req = Requirement::new(id);
        for group in &self.qualities {
            let built = match group {
                QualityGroupDef::Single(def) => {
                    build_group(std::slice::from_ref(def), |d| d.build(id))?
                }
                QualityGroupDef::Alternatives(defs) => build_group(defs, |d| d.build(id))?,
            };
            if !built.is_empty() {
                req.qualities.push(built);
            }
        }
        for group in &self.tools {
            let built = match group {
                ToolGroupDef::Single(item_type) => {
                    build_group(&[ToolDemandDef::Shorthand(item_type.clone())], |d| d.build(id))?
                }
                ToolGroupDef::Alternatives(defs) => build_group(defs, |d| d.build(id))?,
            };
            if !built.is_empty() {
                req.tools.push(built);
            }
        }
        for group in &self.components {
            let built = build_group(group, |d| d.build(id))?;
            if !built.is_empty() {
                req.components.push(built);
            }
        }
        Ok(req)
    }
}

impl From<&Requirement> for RequirementDef {
    fn from(req: &Requirement) -> Self {
        let qualities = req
            .qualities
            .iter()
            .map(|group| {
                QualityGroupDef::Alternatives(
                    group
                        .iter()
                        .map(|q| QualityDemandDef {
                            id: q.quality.0.clone(),
                            level: q.level,
                            amount: q.count,
                        })
                        .collect(),
                )
            })
            .collect();
        let tools = req
            .tools
            .iter()
            .map(|group| {
                ToolGroupDef::Alternatives(
                    group
                        .iter()
                        .map(|t| ToolDemandDef::Counted(t.item_type.0.clone(), t.count))
                        .collect(),
                )
            })
            .collect();
        let components = req
            .components
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|c| {
                        if c.recoverable {
                            ItemDemandDef::Plain(c.item_type.0.clone(), c.count)
                        } else {
                            ItemDemandDef::Marked(
                                c.item_type.0.clone(),
                                c.count,
                                MARKER_NO_RECOVER.to_string(),
                            )
                        }
                    })
                    .collect()
            })
            .collect();
        Self {
            id: req.id.as_ref().map(|id| id.0.clone()),
            qualities,
            tools,
            components,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Availability;
    use smallvec::smallvec;

    fn parse(json: &str) -> RequirementDef {
        serde_json::from_str(json).expect("valid requirement json")
    }

    #[test]
    fn loads_all_three_list_shapes() {
        let def = parse(
            r#"{
                "id": "chair",
                "qualities": [
                    { "id": "HAMMER" },
                    [ { "id": "SAW_W", "level": 2 }, { "id": "CUT", "amount": 2 } ]
                ],
                "tools": [ "hammer", [ ["welder", 20], "oxy_torch" ] ],
                "components": [ [ ["2x4", 4] ], [ ["nail", 10], ["glue", 1, "NO_RECOVER"] ] ]
            }"#,
        );
        let req = def.build(None).unwrap();
        assert_eq!(req.id, Some(RequirementId::from("chair")));

        assert_eq!(req.qualities.len(), 2);
        assert_eq!(
            req.qualities[0].as_slice(),
            &[QualityDemand::new("HAMMER", 1, 1)],
        );
        assert_eq!(req.qualities[1][0], QualityDemand::new("SAW_W", 2, 1));
        assert_eq!(req.qualities[1][1], QualityDemand::new("CUT", 1, 2));

        assert_eq!(req.tools.len(), 2);
        assert_eq!(req.tools[0].as_slice(), &[ToolDemand::new("hammer", -1)]);
        assert_eq!(req.tools[1][0], ToolDemand::new("welder", 20));
        assert_eq!(req.tools[1][1], ToolDemand::new("oxy_torch", -1));

        assert_eq!(req.components.len(), 2);
        assert!(req.components[1][0].recoverable);
        assert!(!req.components[1][1].recoverable);
    }

    #[test]
    fn unknown_marker_keeps_component_recoverable() {
        let req = parse(r#"{ "id": "r", "components": [ [ ["rag", 1, "WHATEVER"] ] ] }"#)
            .build(None)
            .unwrap();
        assert!(req.components[0][0].recoverable);
    }

    #[test]
    fn empty_alternative_lists_are_skipped() {
        let req = parse(
            r#"{ "id": "r", "tools": [ [] ], "components": [ [], [ ["rag", 1] ] ] }"#,
        )
        .build(None)
        .unwrap();
        assert!(req.tools.is_empty());
        assert_eq!(req.components.len(), 1);
    }

    #[test]
    fn zero_tool_count_is_malformed() {
        let err = parse(r#"{ "id": "r", "tools": [ [ ["welder", 0] ] ] }"#)
            .build(None)
            .unwrap_err();
        assert!(matches!(
            err,
            RequirementError::MalformedDemand { ref subject, .. } if subject == "welder"
        ));
    }

    #[test]
    fn non_positive_component_count_is_malformed() {
        for count in [0, -2] {
            let json = format!(r#"{{ "id": "r", "components": [ [ ["rag", {count}] ] ] }}"#);
            assert!(matches!(
                parse(&json).build(None),
                Err(RequirementError::MalformedDemand { .. })
            ));
        }
    }

    #[test]
    fn non_positive_quality_amount_is_malformed_but_level_is_free() {
        assert!(parse(r#"{ "id": "r", "qualities": [ { "id": "CUT", "amount": 0 } ] }"#)
            .build(None)
            .is_err());
        let req = parse(r#"{ "id": "r", "qualities": [ { "id": "BUTCHER", "level": -20 } ] }"#)
            .build(None)
            .unwrap();
        assert_eq!(req.qualities[0][0].level, -20);
    }

    #[test]
    fn id_is_required_unless_given() {
        let def = parse(r#"{ "components": [ [ ["rag", 1] ] ] }"#);
        assert_eq!(def.build(None), Err(RequirementError::MissingId));
        assert_eq!(
            def.build(Some("inline")).unwrap().id,
            Some(RequirementId::from("inline"))
        );
    }

    #[test]
    fn definition_round_trips_through_requirement() {
        let def = parse(
            r#"{ "id": "r", "qualities": [ { "id": "CUT" } ], "tools": [ "saw" ],
                 "components": [ [ ["rag", 2], ["glue", 1, "NO_RECOVER"] ] ] }"#,
        );
        let req = def.build(None).unwrap();
        let again = RequirementDef::from(&req).build(None).unwrap();
        assert_eq!(req, again);
    }

    #[test]
    fn remove_item_prunes_emptied_groups() {
        let mut req = Requirement::new("r");
        req.tools = vec![
            smallvec![ToolDemand::new("welder", -1)],
            smallvec![ToolDemand::new("hammer", -1), ToolDemand::new("welder", 5)],
        ];
        req.components = vec![smallvec![ItemDemand::new("welder", 1)]];
        req.remove_item(&ItemTypeId::from("welder"));
        assert_eq!(req.tools.len(), 1);
        assert_eq!(req.tools[0].as_slice(), &[ToolDemand::new("hammer", -1)]);
        assert!(req.components.is_empty());
    }

    #[test]
    fn missing_lists_groups_without_available_member() {
        let mut req = Requirement::new("r");
        let mut rag = ItemDemand::new("rag", 1);
        rag.availability = Availability::Available;
        req.components = vec![
            smallvec![ItemDemand::new("2x4", 1), rag],
            smallvec![ItemDemand::new("nail", 3)],
        ];
        req.tools = vec![smallvec![ToolDemand::new("saw", -1)]];
        let missing = req.missing();
        assert_eq!(missing.components.len(), 1);
        assert_eq!(missing.components[0][0].item_type.as_str(), "nail");
        assert_eq!(missing.tools.len(), 1);
        assert!(missing.qualities.is_empty());
    }

    #[test]
    fn demands_walks_lists_in_order() {
        let mut req = Requirement::new("r");
        req.qualities = vec![smallvec![QualityDemand::new("CUT", 1, 1)]];
        req.tools = vec![smallvec![ToolDemand::new("saw", -1)]];
        req.components = vec![smallvec![ItemDemand::new("rag", 1)]];
        let order: Vec<String> = req.demands().map(|d| d.subject().to_string()).collect();
        assert_eq!(order, vec!["CUT", "saw", "rag"]);
    }
}
