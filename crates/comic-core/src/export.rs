//! Export document format and the assembler that produces it

use crate::error::Result;
use crate::normalize::normalize_record;
use crate::record::{Field, Record};
use crate::settings::AppSettings;
use crate::view::{ColumnConfig, Filters, TableSorts, ViewState, Viewport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Version written into every export
pub const FORMAT_VERSION: &str = "2.0";

/// Generator name written into every export
pub const GENERATOR: &str = "Comic Book Collection Manager";

/// The versioned on-disk collection document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub app_name: String,
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub columns: Vec<ColumnConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_columns: Option<Vec<ColumnConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desktop_columns: Option<Vec<ColumnConfig>>,
    pub filters: Filters,
    pub use_or_filtering: bool,
    pub table_sort_config: TableSorts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_table_sort_config: Option<TableSorts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desktop_table_sort_config: Option<TableSorts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<AppSettings>,
    pub comics: Vec<Record>,
}

impl ExportDocument {
    /// Pretty-printed JSON text
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the document to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path.as_ref(), self.to_json()?)?;
        tracing::info!(
            path = %path.as_ref().display(),
            records = self.comics.len(),
            "saved collection"
        );
        Ok(())
    }
}

/// Assemble an export of the full collection.
///
/// Every record is re-normalized on the way out. No view filter is applied:
/// the export is a complete backup, not "export visible".
pub fn build_export_document(
    records: &[Record],
    view: &ViewState,
    settings: Option<&AppSettings>,
) -> ExportDocument {
    let columns = |vp: Viewport| view.layout(vp).map(|l| l.columns.clone());
    let sorts = |vp: Viewport| view.layout(vp).map(|l| l.table_sorts.clone());

    ExportDocument {
        app_name: GENERATOR.to_string(),
        version: FORMAT_VERSION.to_string(),
        export_date: Utc::now(),
        columns: columns(Viewport::Default).unwrap_or_default(),
        mobile_columns: columns(Viewport::Mobile),
        desktop_columns: columns(Viewport::Desktop),
        filters: view.filters.clone(),
        use_or_filtering: view.use_or_filtering,
        table_sort_config: sorts(Viewport::Default).unwrap_or_default(),
        mobile_table_sort_config: sorts(Viewport::Mobile),
        desktop_table_sort_config: sorts(Viewport::Desktop),
        settings: settings.cloned(),
        comics: records.iter().cloned().map(normalize_record).collect(),
    }
}

/// Write rows as CSV, limited to the given columns. Lists are joined with ", ".
pub fn write_visible_csv<W: Write>(writer: W, rows: &[&Record], columns: &[Field]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(columns.iter().map(|f| f.label()))?;
    for row in rows {
        csv_writer.write_record(columns.iter().map(|&f| row.display_value(f)))?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::{SortDirection, SortKey};
    use crate::view::MAIN_TABLE_ID;

    fn comic(uuid: &str, title: &str) -> Record {
        Record {
            uuid: uuid.to_string(),
            title: title.to_string(),
            quantity: 1,
            value: "4".to_string(),
            writer: vec!["Lee".to_string(), "Kirby".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_document_metadata_and_shape() {
        let mut view = ViewState::default();
        view.set_filter(Field::Title, "x");
        view.toggle_sort(Viewport::Default, MAIN_TABLE_ID, Field::Issue);

        let doc = build_export_document(&[comic("a", "X")], &view, None);
        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["version"], "2.0");
        assert_eq!(json["appName"], "Comic Book Collection Manager");
        assert!(json["exportDate"].is_string());
        assert_eq!(json["filters"]["title"], "x");
        assert_eq!(json["useOrFiltering"], false);
        assert_eq!(json["tableSortConfig"][MAIN_TABLE_ID][0]["key"], "issue");
        assert_eq!(json["tableSortConfig"][MAIN_TABLE_ID][0]["direction"], "asc");
        assert_eq!(json["columns"].as_array().unwrap().len(), 13);
        assert!(json["mobileColumns"].is_array());
        assert!(json.get("settings").is_none());
    }

    #[test]
    fn test_export_normalizes_records() {
        let doc = build_export_document(&[comic("a", "X")], &ViewState::default(), None);
        assert_eq!(doc.comics[0].value, "4.00");
        assert_eq!(doc.comics[0].uuid, "a");
    }

    #[test]
    fn test_export_ignores_filters() {
        let mut view = ViewState::default();
        view.set_filter(Field::Title, "^nothing matches$");
        let records = vec![comic("a", "X"), comic("b", "Y")];

        let doc = build_export_document(&records, &view, Some(&AppSettings::default()));
        assert_eq!(doc.comics.len(), 2);
        assert!(doc.settings.is_some());
    }

    #[test]
    fn test_parsed_document_comics_are_normalized() {
        let mut raw = serde_json::to_value(build_export_document(&[], &ViewState::default(), None)).unwrap();
        raw["comics"] = serde_json::json!([{"uuid": "k", "value": "3"}]);

        let doc: ExportDocument = serde_json::from_value(raw).unwrap();
        assert_eq!(doc.comics.len(), 1);
        assert_eq!(doc.comics[0].uuid, "k");
        assert_eq!(doc.comics[0].quantity, 1);
        assert_eq!(doc.comics[0].value, "3.00");
    }

    #[test]
    fn test_sort_config_wire_shape() {
        let key: SortKey = serde_json::from_str(r#"{"key":"title","direction":"desc"}"#).unwrap();
        assert_eq!(key, SortKey::new(Field::Title, SortDirection::Desc));
    }

    #[test]
    fn test_write_visible_csv() {
        let records = vec![comic("a", "Spider-Man, The")];
        let rows: Vec<&Record> = records.iter().collect();
        let mut out = Vec::new();

        write_visible_csv(&mut out, &rows, &[Field::Title, Field::Writer]).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "Title,Writer\n\"Spider-Man, The\",\"Lee, Kirby\"\n");
    }
}
