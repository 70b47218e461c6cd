use crate::models::{Persona, Phase};
use crate::view::Visibility;
use serde::Serialize;

/// Selection and filters driving the current view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub persona: Persona,
    pub phase: Phase,
    pub search: String,
    pub show_pending: bool,
    pub show_created: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            persona: Persona::P3,
            phase: Phase::Tofu,
            search: String::new(),
            show_pending: true,
            show_created: true,
        }
    }
}

impl ViewState {
    pub fn visibility(&self) -> Visibility {
        Visibility {
            show_pending: self.show_pending,
            show_created: self.show_created,
        }
    }

    /// `"P3 / TOFU"`
    pub fn breadcrumb(&self) -> String {
        format!("{} / {}", self.persona.id(), self.phase.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Danger,
}

/// User-facing feedback produced by an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}
