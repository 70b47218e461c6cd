//! Static creative catalog and the catalog/custom merger.
//!
//! The catalog file is `{personas: {<persona>: {<phase>: {copies: [...]}}}}`.
//! Entries are loaded once per session and never mutated.

use crate::error::AppError;
use crate::models::{Creative, Persona, Phase};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    personas: BTreeMap<String, BTreeMap<String, Value>>,
}

#[derive(Deserialize)]
struct PhaseBlock {
    #[serde(default)]
    copies: Vec<CatalogCopy>,
}

#[derive(Deserialize)]
struct CatalogCopy {
    id: String,
    headline: String,
    #[serde(default)]
    subline: String,
    #[serde(default)]
    cta: Option<String>,
    #[serde(default)]
    visual_description: Option<String>,
    #[serde(default)]
    visual_template: Option<String>,
}

impl CatalogCopy {
    fn into_creative(self, persona: Persona, phase: Phase) -> Creative {
        Creative {
            id: self.id,
            persona,
            phase,
            headline: self.headline,
            subline: self.subline,
            cta: self.cta,
            visual_description: self.visual_description,
            visual_template: self.visual_template,
        }
    }
}

/// Read-only creative catalog keyed by (persona, phase).
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: BTreeMap<(Persona, Phase), Vec<Creative>>,
}

impl Catalog {
    /// Parse a catalog document.
    ///
    /// Unknown persona ids and non-phase keys are skipped with a warning.
    ///
    /// # Errors
    /// Returns [`AppError::Catalog`] when the document or a phase block is malformed.
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let file: CatalogFile = serde_json::from_str(raw)
            .map_err(|err| AppError::Catalog(format!("Invalid catalog document: {}", err)))?;

        let mut entries = BTreeMap::new();
        for (persona_key, phases) in file.personas {
            let Ok(persona) = persona_key.parse::<Persona>() else {
                tracing::warn!("Skipping unknown persona '{}' in catalog", persona_key);
                continue;
            };
            for (phase_key, block) in phases {
                let Ok(phase) = phase_key.parse::<Phase>() else {
                    tracing::debug!(
                        "Skipping non-phase key '{}' under persona {}",
                        phase_key,
                        persona
                    );
                    continue;
                };
                let block: PhaseBlock = serde_json::from_value(block).map_err(|err| {
                    AppError::Catalog(format!("Invalid copies for {}/{}: {}", persona, phase, err))
                })?;
                let copies = block
                    .copies
                    .into_iter()
                    .map(|copy| copy.into_creative(persona, phase))
                    .collect();
                entries.insert((persona, phase), copies);
            }
        }

        Ok(Self { entries })
    }

    /// Load and parse a catalog file.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            AppError::Catalog(format!("Failed to read catalog '{}': {}", path.display(), err))
        })?;
        let catalog = Self::from_json(&raw)?;
        tracing::debug!(
            "Loaded {} creatives from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Catalog creatives for a pair, or `None` when the pair is absent.
    pub fn copies(&self, persona: Persona, phase: Phase) -> Option<&[Creative]> {
        self.entries.get(&(persona, phase)).map(Vec::as_slice)
    }

    /// First catalog creative with `id`, scanning every pair.
    pub fn find(&self, id: &str) -> Option<&Creative> {
        self.entries
            .values()
            .flat_map(|copies| copies.iter())
            .find(|creative| creative.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Catalog creatives for the pair followed by matching custom creatives.
///
/// Order is catalog order, then custom insertion order. Ids are not
/// de-duplicated.
pub fn combined_list(
    catalog: &Catalog,
    custom: &[Creative],
    persona: Persona,
    phase: Phase,
) -> Vec<Creative> {
    let base = catalog.copies(persona, phase).unwrap_or_default();
    base.iter()
        .chain(
            custom
                .iter()
                .filter(|item| item.persona == persona && item.phase == phase),
        )
        .cloned()
        .collect()
}

/// Find a creative by id in the catalog first, then among custom creatives.
pub fn find_creative<'a>(
    catalog: &'a Catalog,
    custom: &'a [Creative],
    id: &str,
) -> Option<&'a Creative> {
    catalog
        .find(id)
        .or_else(|| custom.iter().find(|item| item.id == id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{custom_creative, sample_catalog};

    #[test]
    fn absent_pair_is_distinct_from_empty_list() {
        let catalog = Catalog::from_json(
            r#"{"personas": {"P3": {"TOFU": {"copies": []}}}}"#,
        )
        .expect("catalog");
        assert_eq!(catalog.copies(Persona::P3, Phase::Tofu), Some(&[][..]));
        assert_eq!(catalog.copies(Persona::P3, Phase::Bofu), None);
    }

    #[test]
    fn loader_skips_unknown_keys_and_fills_position_fields() {
        let catalog = Catalog::from_json(
            r#"{"personas": {
                "P9": {"TOFU": {"copies": [{"id": "P9-TOFU-001", "headline": "x"}]}},
                "P5": {
                    "name": "Vuelta al Pueblo",
                    "BOFU": {"copies": [{"id": "P5-BOFU-001", "headline": "Vuelve"}]}
                }
            }}"#,
        )
        .expect("catalog");

        assert_eq!(catalog.len(), 1);
        let creative = catalog.find("P5-BOFU-001").expect("present");
        assert_eq!(creative.persona, Persona::P5);
        assert_eq!(creative.phase, Phase::Bofu);
        assert!(catalog.find("P9-TOFU-001").is_none());
    }

    #[test]
    fn malformed_phase_block_is_rejected() {
        let err = Catalog::from_json(r#"{"personas": {"P3": {"TOFU": {"copies": [{"id": 1}]}}}}"#)
            .expect_err("bad copy");
        assert!(matches!(err, AppError::Catalog(_)));
    }

    #[test]
    fn combined_list_puts_catalog_before_custom_and_keeps_duplicates() {
        let catalog = sample_catalog();
        let custom = vec![
            custom_creative("P3-CUSTOM-0001", Persona::P3, Phase::Tofu, "Nuevo"),
            custom_creative("P5-CUSTOM-0002", Persona::P5, Phase::Tofu, "Otro"),
            custom_creative("P3-TOFU-001", Persona::P3, Phase::Tofu, "Duplicado"),
        ];

        let ids: Vec<String> = combined_list(&catalog, &custom, Persona::P3, Phase::Tofu)
            .into_iter()
            .map(|creative| creative.id)
            .collect();

        assert_eq!(
            ids,
            vec!["P3-TOFU-001", "P3-TOFU-002", "P3-TOFU-003", "P3-CUSTOM-0001", "P3-TOFU-001"]
        );
    }

    #[test]
    fn combined_list_for_absent_pair_still_lists_custom_items() {
        let catalog = sample_catalog();
        let custom = vec![custom_creative("P5-CUSTOM-0009", Persona::P5, Phase::Bofu, "Solo")];
        let list = combined_list(&catalog, &custom, Persona::P5, Phase::Bofu);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn find_prefers_catalog_over_custom() {
        let catalog = sample_catalog();
        let custom = vec![custom_creative("P3-TOFU-001", Persona::P3, Phase::Tofu, "Dup")];
        let found = find_creative(&catalog, &custom, "P3-TOFU-001").expect("found");
        assert_eq!(found.headline, "A");
        assert!(find_creative(&catalog, &custom, "nope").is_none());
    }
}
