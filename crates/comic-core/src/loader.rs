//! Collection loader for versioned and legacy documents
//!
//! Loading is all-or-nothing: the whole document is interpreted before
//! anything is returned, and any failure leaves the caller's state alone.

use crate::error::{Error, Result};
use crate::normalize::normalize;
use crate::record::{Field, Record};
use crate::settings::AppSettings;
use crate::sort::sort_default;
use crate::view::{ColumnConfig, Filters, TableSorts, ViewState, Viewport};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Which on-disk shape a document had
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Object with a `comics` array plus saved view state
    Versioned,
    /// Bare array of records
    Legacy,
}

/// A successfully interpreted document
#[derive(Debug, Clone)]
pub struct Loaded {
    pub format: DocumentFormat,
    /// Normalized records in canonical display order
    pub records: Vec<Record>,
    /// Prior view state with the document's saved parts applied; `None` for legacy input
    pub view_state: Option<ViewState>,
    pub settings: Option<AppSettings>,
}

impl Loaded {
    pub fn count(&self) -> usize {
        self.records.len()
    }
}

/// Parse JSON text into a document value
pub fn parse_document(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(Error::Parse)
}

/// Read and parse a document from disk
pub fn read_document<P: AsRef<Path>>(path: P) -> Result<Value> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_document(&content)
}

/// Parse and load JSON text
pub fn load_str(text: &str, prior: &ViewState) -> Result<Loaded> {
    load(&parse_document(text)?, prior)
}

/// Interpret a parsed document.
///
/// Saved view-state parts that are present replace the matching parts of
/// `prior`; absent parts leave `prior` untouched.
pub fn load(raw: &Value, prior: &ViewState) -> Result<Loaded> {
    let loaded = match raw {
        Value::Object(obj) => match obj.get("comics") {
            Some(Value::Array(items)) => load_versioned(obj, items, prior)?,
            _ => return Err(invalid_shape()),
        },
        Value::Array(items) => Loaded {
            format: DocumentFormat::Legacy,
            records: normalize_all(items),
            view_state: None,
            settings: None,
        },
        _ => return Err(invalid_shape()),
    };

    tracing::info!(format = ?loaded.format, records = loaded.count(), "loaded collection");
    Ok(loaded)
}

fn invalid_shape() -> Error {
    Error::InvalidFormat(
        "expected an export document with a \"comics\" array, or an array of comics".to_string(),
    )
}

fn load_versioned(obj: &Map<String, Value>, items: &[Value], prior: &ViewState) -> Result<Loaded> {
    let mut view = prior.clone();

    let column_keys = [
        ("columns", Viewport::Default),
        ("mobileColumns", Viewport::Mobile),
        ("desktopColumns", Viewport::Desktop),
    ];
    for (key, viewport) in column_keys {
        if let Some(columns) = optional::<Vec<ColumnConfig>>(obj, key)? {
            view.layout_mut(viewport).columns = columns;
        }
    }

    let sort_keys = [
        ("tableSortConfig", Viewport::Default),
        ("mobileTableSortConfig", Viewport::Mobile),
        ("desktopTableSortConfig", Viewport::Desktop),
    ];
    for (key, viewport) in sort_keys {
        if let Some(sorts) = optional::<TableSorts>(obj, key)? {
            view.layout_mut(viewport).table_sorts = sorts;
        }
    }

    if let Some(filters) = optional::<Map<String, Value>>(obj, "filters")? {
        view.filters = known_filters(filters)?;
    }

    if let Some(use_or) = optional::<bool>(obj, "useOrFiltering")? {
        view.use_or_filtering = use_or;
    }

    let settings = optional::<AppSettings>(obj, "settings")?;

    Ok(Loaded {
        format: DocumentFormat::Versioned,
        records: normalize_all(items),
        view_state: Some(view),
        settings,
    })
}

fn normalize_all(items: &[Value]) -> Vec<Record> {
    sort_default(items.iter().map(normalize).collect())
}

/// A present, non-null sub-object that must deserialize as `T`
fn optional<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Result<Option<T>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| Error::InvalidFormat(format!("\"{}\": {}", key, e))),
    }
}

/// Filters keyed by known fields; unknown keys are dropped
fn known_filters(raw: Map<String, Value>) -> Result<Filters> {
    let mut filters = Filters::new();
    for (key, value) in raw {
        let Some(field) = Field::from_key(&key) else {
            tracing::warn!(key = %key, "ignoring filter for unknown field");
            continue;
        };
        match value {
            Value::String(pattern) => {
                filters.insert(field, pattern);
            }
            Value::Null => {}
            other => {
                return Err(Error::InvalidFormat(format!(
                    "\"filters.{}\": expected a string, found {}",
                    key, other
                )))
            }
        }
    }
    Ok(filters)
}
