use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Production state of a creative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreativeStatus {
    #[default]
    Pending,
    Created,
}

impl CreativeStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            CreativeStatus::Pending => "pending",
            CreativeStatus::Created => "created",
        }
    }

    /// Localized label written to the `Estado` column.
    pub const fn sheet_label(self) -> &'static str {
        match self {
            CreativeStatus::Pending => "⏳ Pendiente",
            CreativeStatus::Created => "✅ Creado",
        }
    }
}

/// Persisted status of one creative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: CreativeStatus,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl StatusEntry {
    pub fn created_at(date: DateTime<Utc>) -> Self {
        Self {
            status: CreativeStatus::Created,
            date: Some(date),
        }
    }

    pub fn is_created(&self) -> bool {
        self.status == CreativeStatus::Created
    }

    /// Flip `pending <-> created`.
    ///
    /// Entering `created` stamps `now`; leaving it clears the date.
    pub fn toggled(&self, now: DateTime<Utc>) -> Self {
        match self.status {
            CreativeStatus::Pending => Self::created_at(now),
            CreativeStatus::Created => Self::default(),
        }
    }
}

/// Status records keyed by creative id. A missing id is pending.
pub type StatusMap = BTreeMap<String, StatusEntry>;

/// Resolve the status of `id`, defaulting to pending.
pub fn resolve_status(statuses: &StatusMap, id: &str) -> StatusEntry {
    statuses.get(id).cloned().unwrap_or_default()
}
