//! Shared constants used across creative tracker crates.

/// Default proxy base URL for the CLI and other clients.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Default proxy port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default location of the static creative catalog.
pub const DEFAULT_CATALOG_PATH: &str = "data/creatives.json";

/// Default client request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Storage key for the status table.
pub const STATUS_KEY: &str = "tracker_status";
/// Storage key for the edit overlay table.
pub const EDITS_KEY: &str = "tracker_edits";
/// Storage key for the custom creatives list.
pub const CUSTOM_KEY: &str = "tracker_custom";
/// Storage key for the project registry.
pub const PROJECTS_KEY: &str = "tracker_projects";
/// Storage key for the current project pointer.
pub const CURRENT_PROJECT_KEY: &str = "tracker_current_project";

/// Seed project reported before the project registry is first written.
pub const SEED_PROJECT_ID: &str = "peru32";
/// Display name of the seed project.
pub const SEED_PROJECT_NAME: &str = "Perú 132 Alcoy";
/// Spreadsheet id of the seed project.
pub const SEED_PROJECT_SHEET_ID: &str = "1-sk-0ckM-wLKvOZY_jKa04d_9HBXxOhK-GtoImFFf8w";
/// Sheet (tab) name of the seed project.
pub const SEED_PROJECT_SHEET_NAME: &str = "PERU32_Creative_Tracker";

/// Sheet name used for newly created project spreadsheets.
pub const DEFAULT_SHEET_NAME: &str = "Creative_Tracker";
/// Suffix appended to a project name to build the spreadsheet title.
pub const SHEET_TITLE_SUFFIX: &str = " - Creative Tracker";

/// Number of columns in a mirrored row (`A:K`).
pub const ROW_WIDTH: usize = 11;

/// Header row written into freshly created spreadsheets.
pub const SHEET_HEADER: [&str; ROW_WIDTH] = [
    "ID",
    "Persona",
    "Fase",
    "Headline",
    "Subline",
    "CTA",
    "Visual_Desc",
    "Template",
    "Estado",
    "Fecha_Creacion",
    "URL_Canva",
];

/// CTA shown when neither the overlay nor the catalog provide one.
pub const CTA_FALLBACK: &str = "Más info";
/// Visual description fallback in briefs and mirrored rows.
pub const VISUAL_FALLBACK_BRIEF: &str = "N/A";
/// Visual description fallback in the editor view.
pub const VISUAL_FALLBACK_EDITOR: &str = "Sin descripción";
/// Template column value for creatives without a visual template.
pub const TEMPLATE_FALLBACK: &str = "Custom";

/// CTA assigned to new custom creatives.
pub const CUSTOM_CTA: &str = "Más información";
/// Visual description assigned to new custom creatives.
pub const CUSTOM_VISUAL_DESCRIPTION: &str = "Entorno real de oficina/vivienda";
