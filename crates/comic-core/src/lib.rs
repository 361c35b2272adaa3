//! comic-core: Core library for maintaining comic book collection files
//!
//! This library provides functionality to:
//! - Load versioned and legacy collection documents, normalizing every record
//! - Filter and sort the collection for display, per table and viewport
//! - Select rows, merge them into a batch-edit form and apply batch edits
//! - Generate runs of issues from a template record
//! - Export the full collection with its view state and settings
//!
//! [`AppState`] ties these together behind a single `dispatch` entry point.

pub mod batch;
pub mod bulk;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod normalize;
pub mod options;
pub mod record;
pub mod selection;
pub mod settings;
pub mod sort;
pub mod state;
pub mod view;

pub use batch::{
    apply_batch_update, apply_edits, compute_merged_record, BatchEdit, BatchUpdate, FieldEdit,
    FormRecord, CLEAR_MARKER, CLEAR_TEXT,
};
pub use bulk::{calculate_count, generate_range};
pub use error::{BulkError, Error, Result};
pub use export::{build_export_document, write_visible_csv, ExportDocument, FORMAT_VERSION, GENERATOR};
pub use filter::{drill_down_filters, exact_match_pattern, filter_records};
pub use loader::{load, load_str, DocumentFormat, Loaded};
pub use normalize::{normalize, normalize_record};
pub use options::field_options;
pub use record::{Field, FieldKind, FieldValue, GradeCode, Record};
pub use selection::Selection;
pub use settings::{AppSettings, DEFAULT_FILENAME};
pub use sort::{sort_default, sort_records, SortDirection, SortKey};
pub use state::{Action, AppState, EditSession, Outcome};
pub use view::{ColumnConfig, Filters, Layout, ViewState, Viewport, MAIN_TABLE_ID};
