//! Application settings carried inside the collection document

use crate::error::{Error, Result};
use crate::record::{GradeCode, Record};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// File name given to a collection started from scratch
pub const DEFAULT_FILENAME: &str = "new-collection.json";

/// User-adjustable defaults and limits.
///
/// Only the default-value settings are consumed here; the rest are used by
/// the presentation layer and are carried so they survive a save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub default_filename: String,
    pub default_volume: String,
    pub default_quantity: i64,
    pub default_condition: GradeCode,
    pub toast_duration: u64,
    pub max_title_length: usize,
    pub max_comment_length: usize,
    pub min_year: i32,
    pub max_year: i32,
    pub min_issue: i64,
    /// Report layout parameters and anything else we do not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_filename: DEFAULT_FILENAME.to_string(),
            default_volume: "1".to_string(),
            default_quantity: 1,
            default_condition: GradeCode::Nm,
            toast_duration: 3000,
            max_title_length: 100,
            max_comment_length: 500,
            min_year: 1900,
            max_year: chrono::Utc::now().year() + 2,
            min_issue: 0,
            extra: Map::new(),
        }
    }
}

impl AppSettings {
    /// Load settings from a JSON file; missing keys take their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Blank record used to seed the add form
    pub fn empty_record(&self) -> Record {
        Record {
            uuid: String::new(),
            volume: self.default_volume.clone(),
            quantity: self.default_quantity,
            condition: self.default_condition,
            ..Default::default()
        }
    }
}
