use crate::constants::{
    SEED_PROJECT_ID, SEED_PROJECT_NAME, SEED_PROJECT_SHEET_ID, SEED_PROJECT_SHEET_NAME,
};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A tracked project mirrored into one spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub sheet_id: String,
    pub sheet_name: String,
    pub created: DateTime<Utc>,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Project {
    /// Project reported before the registry has ever been written.
    pub fn seed() -> Self {
        Self {
            id: SEED_PROJECT_ID.to_string(),
            name: SEED_PROJECT_NAME.to_string(),
            sheet_id: SEED_PROJECT_SHEET_ID.to_string(),
            sheet_name: SEED_PROJECT_SHEET_NAME.to_string(),
            created: Utc
                .with_ymd_and_hms(2026, 1, 28, 0, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
            active: true,
            url: None,
        }
    }

    /// Whether the project can be used as a sync target.
    pub fn is_configured(&self) -> bool {
        !self.sheet_id.trim().is_empty()
    }
}

/// Derive a project id from its display name: lowercase, whitespace runs become `-`.
pub fn project_slug(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Projects keyed by id.
pub type ProjectMap = BTreeMap<String, Project>;

/// Registry containing only the seed project.
pub fn seed_projects() -> ProjectMap {
    let seed = Project::seed();
    BTreeMap::from([(seed.id.clone(), seed)])
}
