use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Target-audience segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Persona {
    P3,
    P5,
}

impl Persona {
    pub const ALL: [Persona; 2] = [Persona::P3, Persona::P5];

    pub const fn id(self) -> &'static str {
        match self {
            Persona::P3 => "P3",
            Persona::P5 => "P5",
        }
    }

    /// Human-readable segment name.
    pub const fn display_name(self) -> &'static str {
        match self {
            Persona::P3 => "Teletrabajador",
            Persona::P5 => "Vuelta al Pueblo",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Persona {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Persona::ALL
            .into_iter()
            .find(|persona| persona.id().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| AppError::Validation(format!("unknown persona '{}'", value)))
    }
}

/// Funnel stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    Tofu,
    Mofu,
    Bofu,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Tofu, Phase::Mofu, Phase::Bofu];

    pub const fn id(self) -> &'static str {
        match self {
            Phase::Tofu => "TOFU",
            Phase::Mofu => "MOFU",
            Phase::Bofu => "BOFU",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Phase::Tofu => "Awareness",
            Phase::Mofu => "Consideración",
            Phase::Bofu => "Conversión",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Phase {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|phase| phase.id().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| AppError::Validation(format!("unknown phase '{}'", value)))
    }
}

/// One piece of marketing copy tied to a persona and funnel phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creative {
    pub id: String,
    pub persona: Persona,
    pub phase: Phase,
    pub headline: String,
    #[serde(default)]
    pub subline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_template: Option<String>,
}

/// Editable creative field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Headline,
    Subline,
    Cta,
    VisualDescription,
}

impl EditField {
    pub const fn key(self) -> &'static str {
        match self {
            EditField::Headline => "headline",
            EditField::Subline => "subline",
            EditField::Cta => "cta",
            EditField::VisualDescription => "visual_description",
        }
    }
}

impl FromStr for EditField {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "headline" => Ok(EditField::Headline),
            "subline" => Ok(EditField::Subline),
            "cta" => Ok(EditField::Cta),
            "visual_description" | "visual" => Ok(EditField::VisualDescription),
            other => Err(AppError::Validation(format!(
                "unknown field '{}' (expected headline, subline, cta or visual_description)",
                other
            ))),
        }
    }
}

/// Field-level overrides layered over a creative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreativeEdit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_description: Option<String>,
}

impl CreativeEdit {
    pub fn get(&self, field: EditField) -> Option<&str> {
        let slot = match field {
            EditField::Headline => &self.headline,
            EditField::Subline => &self.subline,
            EditField::Cta => &self.cta,
            EditField::VisualDescription => &self.visual_description,
        };
        slot.as_deref()
    }

    pub fn set(&mut self, field: EditField, value: String) {
        let slot = match field {
            EditField::Headline => &mut self.headline,
            EditField::Subline => &mut self.subline,
            EditField::Cta => &mut self.cta,
            EditField::VisualDescription => &mut self.visual_description,
        };
        *slot = Some(value);
    }
}

/// Edit overlays keyed by creative id.
pub type EditMap = BTreeMap<String, CreativeEdit>;
