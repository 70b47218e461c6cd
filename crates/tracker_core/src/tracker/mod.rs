//! Orchestrator holding view state and driving user actions.
//!
//! Every local mutation is committed to the store before any remote call is
//! made. Remote failures during a status toggle are logged and surfaced as a
//! warning notice; they never roll local state back.

mod state;

pub use state::{Notice, NoticeLevel, ViewState};

use crate::catalog::{combined_list, find_creative, Catalog};
use crate::config::Config;
use crate::constants::{
    CUSTOM_CTA, CUSTOM_VISUAL_DESCRIPTION, DEFAULT_SHEET_NAME, SHEET_TITLE_SUFFIX,
};
use crate::error::AppError;
use crate::models::project::project_slug;
use crate::models::status::resolve_status;
use crate::models::{Creative, EditField, Persona, Phase, Project, ProjectMap, StatusEntry};
use crate::overlay::{build_brief, effective_fields, DescriptionFallback};
use crate::store::LocalStore;
use crate::sync::{HttpProxy, RemoteAck, SheetsProxy, SyncError, SyncGateway, SyncRow};
use crate::view::{completion_stats, project, CompletionStats, Projection};
use chrono::Utc;
use serde::Serialize;

const NOT_CONFIGURED: &str = "Proyecto no configurado";

/// Snapshot of the current view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendered {
    pub breadcrumb: String,
    pub projection: Projection,
    pub stats: CompletionStats,
}

/// What happened to the remote mirror after a toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The creative went back to pending; nothing is sent.
    Skipped,
    Synced(RemoteAck),
    /// Local state was kept; the message describes the remote failure.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub entry: StatusEntry,
    pub sync: SyncOutcome,
}

/// Application state for one tracker session.
pub struct Tracker<P> {
    store: LocalStore,
    catalog: Catalog,
    gateway: SyncGateway<P>,
    view: ViewState,
    notices: Vec<Notice>,
}

impl Tracker<HttpProxy> {
    /// Open the store, load the catalog and point the gateway at the proxy.
    ///
    /// # Errors
    /// Returns an error if the store cannot be opened, the catalog cannot be
    /// read, or the proxy URL is unusable.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let store = LocalStore::open(&config.db_path)?;
        let catalog = Catalog::load(&config.catalog_path)?;
        let proxy = HttpProxy::new(&config.api_url, config.request_timeout())?;
        Ok(Self::new(store, catalog, SyncGateway::new(proxy)))
    }
}

impl<P: SheetsProxy> Tracker<P> {
    pub fn new(store: LocalStore, catalog: Catalog, gateway: SyncGateway<P>) -> Self {
        Self {
            store,
            catalog,
            gateway,
            view: ViewState::default(),
            notices: Vec::new(),
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn gateway(&self) -> &SyncGateway<P> {
        &self.gateway
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Drain accumulated notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice::new(level, message));
    }

    pub fn set_persona(&mut self, persona: Persona) {
        self.view.persona = persona;
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.view.phase = phase;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.view.search = search.into();
    }

    pub fn set_visibility(&mut self, show_pending: bool, show_created: bool) {
        self.view.show_pending = show_pending;
        self.view.show_created = show_created;
    }

    pub fn breadcrumb(&self) -> String {
        self.view.breadcrumb()
    }

    /// Catalog entries for the selected pair followed by matching custom items.
    pub fn combined(&self) -> Result<Vec<Creative>, AppError> {
        let custom = self.store.custom_items()?;
        Ok(combined_list(
            &self.catalog,
            &custom,
            self.view.persona,
            self.view.phase,
        ))
    }

    pub fn render(&self) -> Result<Rendered, AppError> {
        let combined = self.combined()?;
        let edits = self.store.edits()?;
        let statuses = self.store.status()?;
        let projection = project(
            &combined,
            &edits,
            &statuses,
            &self.view.search,
            self.view.visibility(),
        );
        Ok(Rendered {
            breadcrumb: self.breadcrumb(),
            projection,
            stats: completion_stats(&combined, &statuses),
        })
    }

    pub fn stats(&self) -> Result<CompletionStats, AppError> {
        let combined = self.combined()?;
        Ok(completion_stats(&combined, &self.store.status()?))
    }

    /// Overwrite one overlay field of `id`. Other fields are untouched.
    pub fn update_edit(
        &mut self,
        id: &str,
        field: EditField,
        value: impl Into<String>,
    ) -> Result<(), AppError> {
        let mut edits = self.store.edits()?;
        edits
            .entry(id.to_string())
            .or_default()
            .set(field, value.into());
        self.store.save_edits(&edits)?;
        tracing::debug!(creative_id = id, field = field.key(), "Edit saved");
        Ok(())
    }

    /// Flip the status of `id` and mirror it remotely when it becomes created.
    ///
    /// # Errors
    /// Only local storage failures are returned. Remote failures end up in
    /// [`SyncOutcome::Failed`] and a warning notice.
    pub async fn toggle_status(&mut self, id: &str) -> Result<ToggleOutcome, AppError> {
        let mut statuses = self.store.status()?;
        let entry = resolve_status(&statuses, id).toggled(Utc::now());
        statuses.insert(id.to_string(), entry.clone());
        self.store.save_status(&statuses)?;

        if !entry.is_created() {
            self.notify(NoticeLevel::Info, "↩️ Revertido a pendiente");
            return Ok(ToggleOutcome {
                entry,
                sync: SyncOutcome::Skipped,
            });
        }
        self.notify(NoticeLevel::Info, "✅ Marcado como creado");

        let sync = match self.push_created(id, &entry).await {
            Ok(ack) => {
                self.notify(NoticeLevel::Success, "🚀 Sincronizado con Google Sheets");
                SyncOutcome::Synced(ack)
            }
            Err(err) => {
                tracing::warn!(creative_id = id, error = %err, "Sync failed; status kept locally");
                self.notify(NoticeLevel::Warning, "⚠️ Grabado local pero error de sync");
                SyncOutcome::Failed(err.to_string())
            }
        };
        Ok(ToggleOutcome { entry, sync })
    }

    async fn push_created(&self, id: &str, entry: &StatusEntry) -> Result<RemoteAck, SyncError> {
        let local = |err: AppError| SyncError::Local(err.to_string());
        let custom = self.store.custom_items().map_err(local)?;
        let creative = find_creative(&self.catalog, &custom, id)
            .ok_or_else(|| SyncError::UnknownCreative(id.to_string()))?;
        let edits = self.store.edits().map_err(local)?;
        let fields = effective_fields(creative, edits.get(id), DescriptionFallback::Brief);
        let row = SyncRow::for_creative(creative, &fields, entry);

        let project_id = self.store.current_project_id().map_err(local)?;
        let project = self
            .configured_project(&project_id)
            .map_err(local)?
            .ok_or_else(|| SyncError::NotConfigured(format!("'{}'", project_id)))?;
        self.gateway.push(&project, id, row).await
    }

    /// Add a custom creative to the selected or given (persona, phase).
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] for a blank headline; nothing is written.
    pub fn add_custom(
        &mut self,
        persona: Persona,
        phase: Phase,
        headline: &str,
        subline: &str,
    ) -> Result<Creative, AppError> {
        let headline = headline.trim();
        if headline.is_empty() {
            self.notify(NoticeLevel::Danger, "El headline es obligatorio");
            return Err(AppError::Validation("El headline es obligatorio".to_string()));
        }

        let suffix = Utc::now().timestamp_millis().rem_euclid(10_000);
        let creative = Creative {
            id: format!("{}-CUSTOM-{:04}", persona.id(), suffix),
            persona,
            phase,
            headline: headline.to_string(),
            subline: subline.trim().to_string(),
            cta: Some(CUSTOM_CTA.to_string()),
            visual_description: Some(CUSTOM_VISUAL_DESCRIPTION.to_string()),
            visual_template: None,
        };

        let mut items = self.store.custom_items()?;
        items.push(creative.clone());
        self.store.save_custom_items(&items)?;
        tracing::info!(creative_id = %creative.id, "Custom creative added");
        self.notify(NoticeLevel::Success, "Nueva variación añadida");
        Ok(creative)
    }

    /// Remove every custom creative with `id`. Returns whether any was removed.
    pub fn delete_custom(&mut self, id: &str) -> Result<bool, AppError> {
        let mut items = self.store.custom_items()?;
        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() == before {
            return Ok(false);
        }
        self.store.save_custom_items(&items)?;
        Ok(true)
    }

    /// Production brief for `id` with the current overlay applied.
    pub fn brief(&self, id: &str) -> Result<String, AppError> {
        let custom = self.store.custom_items()?;
        let creative = find_creative(&self.catalog, &custom, id)
            .ok_or_else(|| AppError::NotFound(format!("Creative '{}'", id)))?;
        let edits = self.store.edits()?;
        let fields = effective_fields(creative, edits.get(id), DescriptionFallback::Brief);
        Ok(build_brief(creative, &fields))
    }

    pub fn projects(&self) -> Result<ProjectMap, AppError> {
        self.store.projects()
    }

    /// The active project.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when the pointer does not resolve or the
    /// project has no spreadsheet id.
    pub fn current_project(&self) -> Result<Project, AppError> {
        let id = self.store.current_project_id()?;
        self.configured_project(&id)?
            .ok_or_else(|| AppError::Config(NOT_CONFIGURED.to_string()))
    }

    fn configured_project(&self, id: &str) -> Result<Option<Project>, AppError> {
        Ok(self
            .store
            .projects()?
            .remove(id)
            .filter(Project::is_configured))
    }

    /// Make `id` the active project.
    pub fn select_project(&mut self, id: &str) -> Result<Project, AppError> {
        let project = self
            .store
            .projects()?
            .remove(id)
            .ok_or_else(|| AppError::NotFound(format!("Project '{}'", id)))?;
        self.store.set_current_project(id)?;
        Ok(project)
    }

    /// Create a spreadsheet for a new project, share it and make it active.
    ///
    /// A sharing failure is reported as a warning notice; the project is
    /// still registered.
    pub async fn create_project(&mut self, name: &str, emails: &[String]) -> Result<Project, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Project name is required".to_string()));
        }

        let title = format!("{}{}", name, SHEET_TITLE_SUFFIX);
        let created = self.gateway.create_sheet(&title, DEFAULT_SHEET_NAME).await?;
        if !emails.is_empty() {
            if let Err(err) = self.gateway.share(&created.spreadsheet_id, emails).await {
                tracing::warn!(spreadsheet_id = %created.spreadsheet_id, error = %err, "Share failed");
                self.notify(
                    NoticeLevel::Warning,
                    format!("⚠️ Sheet creado pero no se pudo compartir: {}", err),
                );
            }
        }

        let project = Project {
            id: project_slug(name),
            name: name.to_string(),
            sheet_id: created.spreadsheet_id,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            created: Utc::now(),
            active: true,
            url: created.url,
        };
        let mut projects = self.store.projects()?;
        projects.insert(project.id.clone(), project.clone());
        self.store.save_projects(&projects)?;
        self.store.set_current_project(&project.id)?;
        tracing::info!(project = %project.id, "Project created");
        self.notify(NoticeLevel::Success, format!("Proyecto '{}' creado", project.name));
        Ok(project)
    }

    /// Rows currently mirrored in the active project's sheet.
    pub async fn read_remote_rows(&self, range: Option<&str>) -> Result<Vec<Vec<String>>, AppError> {
        let project = self.current_project()?;
        Ok(self.gateway.read_rows(&project, range).await?)
    }
}
