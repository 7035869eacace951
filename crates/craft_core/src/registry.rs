//! Registry of requirement and quality definitions by id.
//!
//! An explicit context object: bulk-load it at startup, `clear()` it on
//! teardown. Lookups return a typed not-found error instead of an empty
//! default.

use std::collections::BTreeMap;

use crate::{
    DemandRef, IdentifierKind, ItemTypeId, ItemTypeOracle, QualityDef, QualityId, Requirement,
    RequirementError, RequirementId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Added,
    Updated,
}

#[derive(Debug, Clone, Default)]
pub struct RequirementRegistry {
    requirements: BTreeMap<RequirementId, Requirement>,
    qualities: BTreeMap<QualityId, QualityDef>,
}

impl RequirementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `req` under its own id, replacing any previous entry.
    pub fn save(&mut self, req: Requirement) -> Result<SaveOutcome, RequirementError> {
        let id = req.id.clone().ok_or(RequirementError::MissingId)?;
        Ok(self.insert(id, req))
    }

    /// Stores a (typically derived) requirement under an explicit id.
    pub fn save_as(&mut self, mut req: Requirement, id: RequirementId) -> SaveOutcome {
        req.id = Some(id.clone());
        self.insert(id, req)
    }

    fn insert(&mut self, id: RequirementId, req: Requirement) -> SaveOutcome {
        match self.requirements.insert(id, req) {
            Some(_) => SaveOutcome::Updated,
            None => SaveOutcome::Added,
        }
    }

    pub fn get(&self, id: &RequirementId) -> Result<&Requirement, RequirementError> {
        self.requirements
            .get(id)
            .ok_or_else(|| RequirementError::UnknownIdentifier {
                kind: IdentifierKind::Requirement,
                id: id.0.clone(),
                context: None,
            })
    }

    pub fn is_valid(&self, id: &RequirementId) -> bool {
        self.requirements.contains_key(id)
    }

    /// All requirements in id order.
    pub fn all(&self) -> impl Iterator<Item = &Requirement> {
        self.requirements.values()
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn save_quality(&mut self, def: QualityDef) -> SaveOutcome {
        match self.qualities.insert(def.id.clone(), def) {
            Some(_) => SaveOutcome::Updated,
            None => SaveOutcome::Added,
        }
    }

    pub fn quality(&self, id: &QualityId) -> Result<&QualityDef, RequirementError> {
        self.qualities
            .get(id)
            .ok_or_else(|| RequirementError::UnknownIdentifier {
                kind: IdentifierKind::Quality,
                id: id.0.clone(),
                context: None,
            })
    }

    pub fn is_valid_quality(&self, id: &QualityId) -> bool {
        self.qualities.contains_key(id)
    }

    pub fn qualities(&self) -> impl Iterator<Item = &QualityDef> {
        self.qualities.values()
    }

    pub fn clear(&mut self) {
        self.requirements.clear();
        self.qualities.clear();
    }

    /// Reports every demand that references an unknown quality or an
    /// undefined item type, continuing past each finding. Returns the number
    /// of findings.
    pub fn check_consistency(
        &self,
        item_types: &dyn ItemTypeOracle,
        mut report: impl FnMut(&RequirementError),
    ) -> usize {
        let mut findings = 0;
        for (id, req) in &self.requirements {
            for demand in req.demands() {
                let finding = match demand {
                    DemandRef::Quality(q) if !self.is_valid_quality(&q.quality) => {
                        Some(RequirementError::UnknownIdentifier {
                            kind: IdentifierKind::Quality,
                            id: q.quality.0.clone(),
                            context: Some(id.clone()),
                        })
                    }
                    DemandRef::Tool(_) | DemandRef::Item(_)
                        if !item_types.is_type_defined(&ItemTypeId::from(demand.subject())) =>
                    {
                        Some(RequirementError::UndefinedItemType {
                            requirement: id.clone(),
                            item_type: ItemTypeId::from(demand.subject()),
                        })
                    }
                    _ => None,
                };
                if let Some(err) = finding {
                    report(&err);
                    findings += 1;
                }
            }
        }
        findings
    }
}
