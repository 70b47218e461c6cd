//! Edit overlay resolution and creative briefs.

use crate::constants::{CTA_FALLBACK, VISUAL_FALLBACK_BRIEF, VISUAL_FALLBACK_EDITOR};
use crate::models::{Creative, CreativeEdit, EditField};
use serde::Serialize;

/// Which fallback literal applies to a missing visual description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionFallback {
    /// Briefs and mirrored rows (`"N/A"`).
    Brief,
    /// Editor view (`"Sin descripción"`).
    Editor,
}

impl DescriptionFallback {
    pub const fn literal(self) -> &'static str {
        match self {
            DescriptionFallback::Brief => VISUAL_FALLBACK_BRIEF,
            DescriptionFallback::Editor => VISUAL_FALLBACK_EDITOR,
        }
    }
}

/// Field values after applying the overlay and fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveFields {
    pub headline: String,
    pub subline: String,
    pub cta: String,
    pub visual_description: String,
}

fn pick(overlay: Option<&str>, base: Option<&str>, fallback: &str) -> String {
    [overlay, base]
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Resolve the effective fields of `creative` under `edit`.
///
/// A field uses the overlay value when present and non-empty, otherwise the
/// catalog value when non-empty, otherwise the fallback literal.
pub fn effective_fields(
    creative: &Creative,
    edit: Option<&CreativeEdit>,
    fallback: DescriptionFallback,
) -> EffectiveFields {
    let overlay = |field: EditField| edit.and_then(|edit| edit.get(field));
    EffectiveFields {
        headline: pick(
            overlay(EditField::Headline),
            Some(creative.headline.as_str()),
            "",
        ),
        subline: pick(
            overlay(EditField::Subline),
            Some(creative.subline.as_str()),
            "",
        ),
        cta: pick(overlay(EditField::Cta), creative.cta.as_deref(), CTA_FALLBACK),
        visual_description: pick(
            overlay(EditField::VisualDescription),
            creative.visual_description.as_deref(),
            fallback.literal(),
        ),
    }
}

const BRIEF_RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Plain-text production brief for one creative.
///
/// `fields` should be resolved with [`DescriptionFallback::Brief`].
pub fn build_brief(creative: &Creative, fields: &EffectiveFields) -> String {
    [
        BRIEF_RULE.to_string(),
        format!("BRIEF CREATIVO [ID: {}]", creative.id),
        BRIEF_RULE.to_string(),
        format!("🎯 PERSONA: {} | FASE: {}", creative.persona, creative.phase),
        format!("✍️ Headline: {}", fields.headline),
        format!("✍️ Copy: {}", fields.subline),
        format!("✍️ CTA: {}", fields.cta),
        format!("🎨 Visual: {}", fields.visual_description),
        BRIEF_RULE.to_string(),
    ]
    .join("\n")
}
