//! Fixed 11-column row mirrored into the spreadsheet.

use crate::constants::{ROW_WIDTH, TEMPLATE_FALLBACK};
use crate::models::{Creative, StatusEntry};
use crate::overlay::EffectiveFields;
use chrono::SecondsFormat;

/// Positional row `[id, persona, phase, headline, subline, cta, visual,
/// template, status, date, url]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRow([String; ROW_WIDTH]);

impl SyncRow {
    /// Build the row for a creative.
    ///
    /// `fields` should be resolved with the brief fallback so a missing visual
    /// description is written as `N/A`.
    pub fn for_creative(creative: &Creative, fields: &EffectiveFields, status: &StatusEntry) -> Self {
        let date = status
            .date
            .map(|date| date.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default();
        Self([
            creative.id.clone(),
            creative.persona.id().to_string(),
            creative.phase.id().to_string(),
            fields.headline.clone(),
            fields.subline.clone(),
            fields.cta.clone(),
            fields.visual_description.clone(),
            creative
                .visual_template
                .clone()
                .filter(|template| !template.is_empty())
                .unwrap_or_else(|| TEMPLATE_FALLBACK.to_string()),
            status.status.sheet_label().to_string(),
            date,
            String::new(),
        ])
    }

    pub fn id(&self) -> &str {
        &self.0[0]
    }

    pub fn cells(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0.into()
    }
}
