//! Content loading shared by craft_cli and the content tests.
//!
//! Reads qualities, item types and requirements from a content directory,
//! fills a `RequirementRegistry`, and reports soft authoring problems
//! through `tracing`.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use craft_core::{
    ActorOracle, ActorState, ItemCatalog, ItemTypeDef, ItemTypeId, QualityDef, QualityId,
    RequirementDef, RequirementError, RequirementRegistry, SaveOutcome, StockEntry,
    SubstituteRule, TraitId,
};
use serde::Deserialize;

/// Usages are grouped by level in content files: `[[level, [usage, ...]], ...]`.
#[derive(Deserialize)]
struct QualityEntry {
    id: QualityId,
    name: String,
    #[serde(default)]
    usages: Vec<(i32, Vec<String>)>,
}

impl From<QualityEntry> for QualityDef {
    fn from(entry: QualityEntry) -> Self {
        let usages = entry
            .usages
            .into_iter()
            .flat_map(|(level, names)| names.into_iter().map(move |name| (level, name)))
            .collect();
        QualityDef {
            id: entry.id,
            name: entry.name,
            usages,
        }
    }
}

#[derive(Deserialize)]
struct QualitiesFile {
    qualities: Vec<QualityEntry>,
}

#[derive(Deserialize)]
struct ItemTypesFile {
    item_types: Vec<ItemTypeDef>,
}

#[derive(Deserialize)]
struct RequirementsFile {
    content_version: String,
    requirements: Vec<RequirementDef>,
}

/// What the crafter has within reach, as stored in an inventory file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryFile {
    #[serde(default)]
    pub items: Vec<StockEntry>,
    #[serde(default)]
    pub actor: ActorState,
}

pub struct WorkshopContent {
    pub content_version: String,
    pub item_types: ItemCatalog,
    pub registry: RequirementRegistry,
    /// Requirements that failed to build; the rest loaded normally.
    pub rejected: Vec<RequirementError>,
}

/// Hunger above which a web-spinner can no longer produce rope.
pub const WEB_ROPE_MAX_HUNGER: i32 = 300;

fn spins_rope(actor: &dyn ActorOracle) -> bool {
    actor.has_trait(&TraitId::from("WEB_ROPE")) && actor.hunger_level() <= WEB_ROPE_MAX_HUNGER
}

/// Web-spinners replace any amount of rope while reasonably fed.
pub fn rope_web_substitute() -> SubstituteRule {
    SubstituteRule {
        item_types: vec![ItemTypeId::from("rope_30"), ItemTypeId::from("rope_6")],
        applies: spins_rope,
    }
}

pub fn default_substitutes() -> Vec<SubstituteRule> {
    vec![rope_web_substitute()]
}

/// Validates content that cannot be loaded meaningfully, panicking on any
/// authoring error.
///
/// Catches duplicate ids and empty ids. Dangling references are reported by
/// `check_consistency` instead.
pub fn validate_content(
    qualities: &[QualityDef],
    item_types: &[ItemTypeDef],
    requirements: &[RequirementDef],
) {
    let mut quality_ids = HashSet::new();
    for quality in qualities {
        assert!(!quality.id.0.is_empty(), "quality has empty id");
        assert!(
            quality_ids.insert(&quality.id),
            "quality '{}' is defined more than once",
            quality.id
        );
    }

    let mut item_ids = HashSet::new();
    for item in item_types {
        assert!(!item.id.0.is_empty(), "item type has empty id");
        assert!(
            item_ids.insert(&item.id),
            "item type '{}' is defined more than once",
            item.id
        );
    }

    let mut requirement_ids = HashSet::new();
    for def in requirements {
        let Some(id) = def.id.as_deref() else {
            continue;
        };
        assert!(
            requirement_ids.insert(id),
            "requirement '{id}' is defined more than once"
        );
    }
}

/// Reports every dangling quality or item-type reference as a warning.
/// Returns the number of findings.
pub fn check_consistency(content: &WorkshopContent) -> usize {
    let findings = content
        .registry
        .check_consistency(&content.item_types, |err| tracing::warn!("{err}"));
    if findings > 0 {
        tracing::warn!(findings, "requirement consistency check found problems");
    }
    findings
}

fn read_json<T: serde::de::DeserializeOwned>(dir: &Path, file: &str) -> Result<T> {
    let text = std::fs::read_to_string(dir.join(file))
        .with_context(|| format!("reading {file}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {file}"))
}

pub fn load_content(content_dir: &str) -> Result<WorkshopContent> {
    let dir = Path::new(content_dir);
    let qualities_file: QualitiesFile = read_json(dir, "qualities.json")?;
    let qualities: Vec<QualityDef> = qualities_file
        .qualities
        .into_iter()
        .map(Into::into)
        .collect();
    let item_types_file: ItemTypesFile = read_json(dir, "item_types.json")?;
    let requirements_file: RequirementsFile = read_json(dir, "requirements.json")?;

    validate_content(
        &qualities,
        &item_types_file.item_types,
        &requirements_file.requirements,
    );

    let mut registry = RequirementRegistry::new();
    for quality in qualities {
        registry.save_quality(quality);
    }

    let mut rejected = Vec::new();
    for def in &requirements_file.requirements {
        let saved = def.build(None).and_then(|req| registry.save(req));
        match saved {
            Ok(SaveOutcome::Added) => {
                tracing::debug!(id = def.id.as_deref(), "added requirement");
            }
            Ok(SaveOutcome::Updated) => {
                tracing::info!(id = def.id.as_deref(), "updated requirement");
            }
            Err(err) => {
                tracing::error!("skipping requirement: {err}");
                rejected.push(err);
            }
        }
    }

    let content = WorkshopContent {
        content_version: requirements_file.content_version,
        item_types: ItemCatalog::new(item_types_file.item_types),
        registry,
        rejected,
    };
    tracing::info!(
        version = %content.content_version,
        requirements = content.registry.len(),
        item_types = content.item_types.len(),
        rejected = content.rejected.len(),
        "content loaded"
    );
    Ok(content)
}

pub fn load_inventory(path: &str) -> Result<InventoryFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading inventory file: {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing inventory file: {path}"))
}
