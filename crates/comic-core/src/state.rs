//! Application state and the action dispatcher that mutates it
//!
//! [`AppState::dispatch`] is the only mutation path. Every action is
//! computed against the current state first and committed at the end, so a
//! failing action leaves the state exactly as it was.

use crate::batch::{apply_batch_update, compute_merged_record, BatchEdit, FormRecord};
use crate::bulk::generate_range;
use crate::error::{Error, Result};
use crate::export::{build_export_document, ExportDocument};
use crate::filter::filter_records;
use crate::loader::{self, parse_document, read_document};
use crate::normalize::normalize_record;
use crate::record::{Field, Record};
use crate::selection::Selection;
use crate::settings::AppSettings;
use crate::sort::sort_records;
use crate::view::{SortSpec, ViewState, Viewport};
use serde_json::Value;
use std::path::Path;

/// Which edit form is open
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditSession {
    #[default]
    Idle,
    /// Editing one row; holds the record as it was when opened
    Single(Record),
    /// Editing the selection; holds the merged representative record
    Batch(FormRecord),
}

/// Every way the state can change
#[derive(Debug, Clone)]
pub enum Action {
    /// Replace the collection with a parsed document
    Load {
        document: Value,
        /// Name to attach; `None` falls back to the default filename
        file_name: Option<String>,
    },
    NewCollection,
    SetFilter { field: Field, pattern: String },
    ClearFilters,
    SetOrFiltering(bool),
    ToggleSort { table_id: String, field: Field },
    /// Replace a table's sort order under the active viewport
    SetSort { table_id: String, spec: SortSpec },
    SetColumnVisible { field: Field, visible: bool },
    SetViewport(Viewport),
    ToggleSelection(String),
    /// Select-all scoped to the visible rows of a table
    ToggleSelectAll { table_id: String },
    ClearSelection,
    OpenRow(String),
    BeginBatchEdit,
    CancelEdit,
    SaveSingle(Record),
    SaveBatch { form: FormRecord, append_comments: bool },
    AddRecord(Record),
    AddRange { template: Record, start_issue: String, end_issue: String },
    DeleteSelected,
    UpdateSettings(AppSettings),
}

/// What a successful dispatch did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Loaded { count: usize },
    Added { uuid: String },
    Generated { count: usize },
    Updated { count: usize },
    Deleted { count: usize },
    /// Any change that carries no result of its own
    Done,
}

/// The whole application state owned by the controller
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub records: Vec<Record>,
    pub file_name: Option<String>,
    pub view: ViewState,
    pub settings: AppSettings,
    pub selection: Selection,
    pub edit: EditSession,
    pub viewport: Viewport,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State with a given set of settings and nothing loaded
    pub fn with_settings(settings: AppSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Filtered then sorted rows of a table under the active viewport
    pub fn visible_rows(&self, table_id: &str) -> Vec<&Record> {
        let filtered = filter_records(&self.records, &self.view.filters, self.view.use_or_filtering);
        sort_records(filtered, self.view.sort_spec(self.viewport, table_id))
    }

    /// Visible fields of the active viewport, in column order
    pub fn visible_fields(&self) -> Vec<Field> {
        self.view
            .layout(self.viewport)
            .map(|l| l.visible_fields())
            .unwrap_or_else(|| Field::ALL.to_vec())
    }

    /// Record with the given identity
    pub fn record(&self, uuid: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.uuid == uuid)
    }

    /// Load a collection file and attach its file name
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<Outcome> {
        let path = path.as_ref();
        let document = read_document(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        self.dispatch(Action::Load {
            document,
            file_name,
        })
    }

    /// Load pasted JSON text; the file name resets to the default
    pub fn load_from_text(&mut self, text: &str) -> Result<Outcome> {
        let document = parse_document(text)?;
        self.dispatch(Action::Load {
            document,
            file_name: None,
        })
    }

    /// The export document for the current state
    pub fn export_document(&self) -> ExportDocument {
        build_export_document(&self.records, &self.view, Some(&self.settings))
    }

    /// Write the full collection with its view state and settings
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.export_document().save(path)
    }

    /// Apply one action
    pub fn dispatch(&mut self, action: Action) -> Result<Outcome> {
        tracing::debug!(action = action_name(&action), "dispatch");

        let outcome = match action {
            Action::Load {
                document,
                file_name,
            } => {
                let loaded = loader::load(&document, &self.view)?;
                let count = loaded.count();
                if let Some(view) = loaded.view_state {
                    self.view = view;
                }
                if let Some(settings) = loaded.settings {
                    self.settings = settings;
                }
                self.file_name =
                    Some(file_name.unwrap_or_else(|| self.settings.default_filename.clone()));
                self.records = loaded.records;
                self.selection.clear();
                self.edit = EditSession::Idle;
                Outcome::Loaded { count }
            }

            Action::NewCollection => {
                self.records.clear();
                self.file_name = Some(self.settings.default_filename.clone());
                self.selection.clear();
                self.edit = EditSession::Idle;
                Outcome::Done
            }

            Action::SetFilter { field, pattern } => {
                self.view.set_filter(field, pattern);
                Outcome::Done
            }

            Action::ClearFilters => {
                self.view.filters.clear();
                Outcome::Done
            }

            Action::SetOrFiltering(use_or) => {
                self.view.use_or_filtering = use_or;
                Outcome::Done
            }

            Action::ToggleSort { table_id, field } => {
                self.view.toggle_sort(self.viewport, &table_id, field);
                Outcome::Done
            }

            Action::SetSort { table_id, spec } => {
                self.view
                    .layout_mut(self.viewport)
                    .table_sorts
                    .insert(table_id, spec);
                Outcome::Done
            }

            Action::SetColumnVisible { field, visible } => {
                self.view.set_column_visible(self.viewport, field, visible);
                Outcome::Done
            }

            Action::SetViewport(viewport) => {
                self.viewport = viewport;
                Outcome::Done
            }

            Action::ToggleSelection(uuid) => {
                self.selection.toggle(&uuid);
                Outcome::Done
            }

            Action::ToggleSelectAll { table_id } => {
                let mut selection = self.selection.clone();
                selection.toggle_all(&self.visible_rows(&table_id));
                self.selection = selection;
                Outcome::Done
            }

            Action::ClearSelection => {
                self.selection.clear();
                Outcome::Done
            }

            Action::OpenRow(uuid) => {
                let record = self
                    .record(&uuid)
                    .cloned()
                    .ok_or(Error::RecordNotFound(uuid))?;
                self.edit = EditSession::Single(record);
                Outcome::Done
            }

            Action::BeginBatchEdit => {
                let merged = compute_merged_record(self.selection.selected(&self.records))
                    .ok_or(Error::EmptySelection)?;
                self.edit = EditSession::Batch(merged);
                Outcome::Done
            }

            Action::CancelEdit => {
                self.edit = EditSession::Idle;
                Outcome::Done
            }

            Action::SaveSingle(submitted) => {
                if !matches!(self.edit, EditSession::Single(_)) {
                    return Err(Error::NotEditing);
                }
                let index = self
                    .records
                    .iter()
                    .position(|r| r.uuid == submitted.uuid)
                    .ok_or_else(|| Error::RecordNotFound(submitted.uuid.clone()))?;
                self.records[index] = normalize_record(submitted);
                self.edit = EditSession::Idle;
                Outcome::Updated { count: 1 }
            }

            Action::SaveBatch {
                form,
                append_comments,
            } => {
                if !matches!(self.edit, EditSession::Batch(_)) {
                    return Err(Error::NotEditing);
                }
                if self.selection.is_empty() {
                    return Err(Error::EmptySelection);
                }
                let batch = BatchEdit::from_form(&form);
                let update =
                    apply_batch_update(&self.records, &batch, &self.selection, append_comments);
                self.records = update.records;
                self.selection.clear();
                self.edit = EditSession::Idle;
                tracing::info!(updated = update.updated, "saved batch edit");
                Outcome::Updated {
                    count: update.updated,
                }
            }

            Action::AddRecord(record) => {
                let record = normalize_record(record);
                let uuid = record.uuid.clone();
                self.records.push(record);
                Outcome::Added { uuid }
            }

            Action::AddRange {
                template,
                start_issue,
                end_issue,
            } => {
                let generated = generate_range(&template, &start_issue, &end_issue)?;
                let count = generated.len();
                self.records.extend(generated);
                Outcome::Generated { count }
            }

            Action::DeleteSelected => {
                if self.selection.is_empty() {
                    return Err(Error::EmptySelection);
                }
                let before = self.records.len();
                let selection = &self.selection;
                self.records.retain(|r| !selection.contains(&r.uuid));
                let count = before - self.records.len();
                self.selection.clear();
                tracing::info!(deleted = count, "deleted selected records");
                Outcome::Deleted { count }
            }

            Action::UpdateSettings(settings) => {
                self.settings = settings;
                Outcome::Done
            }
        };

        Ok(outcome)
    }
}

fn action_name(action: &Action) -> &'static str {
    match action {
        Action::Load { .. } => "load",
        Action::NewCollection => "new_collection",
        Action::SetFilter { .. } => "set_filter",
        Action::ClearFilters => "clear_filters",
        Action::SetOrFiltering(_) => "set_or_filtering",
        Action::ToggleSort { .. } => "toggle_sort",
        Action::SetSort { .. } => "set_sort",
        Action::SetColumnVisible { .. } => "set_column_visible",
        Action::SetViewport(_) => "set_viewport",
        Action::ToggleSelection(_) => "toggle_selection",
        Action::ToggleSelectAll { .. } => "toggle_select_all",
        Action::ClearSelection => "clear_selection",
        Action::OpenRow(_) => "open_row",
        Action::BeginBatchEdit => "begin_batch_edit",
        Action::CancelEdit => "cancel_edit",
        Action::SaveSingle(_) => "save_single",
        Action::SaveBatch { .. } => "save_batch",
        Action::AddRecord(_) => "add_record",
        Action::AddRange { .. } => "add_range",
        Action::DeleteSelected => "delete_selected",
        Action::UpdateSettings(_) => "update_settings",
    }
}
