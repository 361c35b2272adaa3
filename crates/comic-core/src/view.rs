//! View state: columns, filters and per-table sort order
//!
//! Filters and the AND/OR flag are shared by every table. Column visibility
//! and sort order are kept per [`Viewport`], and sort order additionally per
//! logical table id within a viewport.

use crate::record::Field;
use crate::sort::{toggle_sort, SortKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Table id used by the maintenance grid
pub const MAIN_TABLE_ID: &str = "main-comics-table";

/// Per-field regular expression sources
pub type Filters = BTreeMap<Field, String>;

/// Sort order for one table; list position is priority
pub type SortSpec = Vec<SortKey>;

/// Sort orders keyed by table id
pub type TableSorts = BTreeMap<String, SortSpec>;

/// Which screen layout a view belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    #[default]
    Default,
    Mobile,
    Desktop,
}

impl Viewport {
    pub const ALL: [Viewport; 3] = [Viewport::Default, Viewport::Mobile, Viewport::Desktop];
}

/// Visibility and label of one grid column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub key: Field,
    pub label: String,
    pub visible: bool,
}

impl ColumnConfig {
    pub fn new(key: Field, visible: bool) -> Self {
        Self {
            key,
            label: key.label().to_string(),
            visible,
        }
    }
}

/// Default columns for a viewport. Mobile only shows title, issue, month and year.
pub fn default_columns(viewport: Viewport) -> Vec<ColumnConfig> {
    Field::ALL
        .iter()
        .map(|&field| {
            let visible = match viewport {
                Viewport::Mobile => matches!(
                    field,
                    Field::Title | Field::Issue | Field::Month | Field::Year
                ),
                Viewport::Default | Viewport::Desktop => true,
            };
            ColumnConfig::new(field, visible)
        })
        .collect()
}

/// Columns and sort orders for one viewport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub columns: Vec<ColumnConfig>,
    pub table_sorts: TableSorts,
}

impl Layout {
    pub fn for_viewport(viewport: Viewport) -> Self {
        Self {
            columns: default_columns(viewport),
            table_sorts: TableSorts::new(),
        }
    }

    /// Fields whose column is visible, in column order
    pub fn visible_fields(&self) -> Vec<Field> {
        self.columns
            .iter()
            .filter(|c| c.visible)
            .map(|c| c.key)
            .collect()
    }
}

/// Everything about how the collection is viewed, persisted alongside the records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub layouts: BTreeMap<Viewport, Layout>,
    pub filters: Filters,
    pub use_or_filtering: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            layouts: Viewport::ALL
                .iter()
                .map(|&vp| (vp, Layout::for_viewport(vp)))
                .collect(),
            filters: Filters::new(),
            use_or_filtering: false,
        }
    }
}

impl ViewState {
    /// Layout for a viewport, if one is configured
    pub fn layout(&self, viewport: Viewport) -> Option<&Layout> {
        self.layouts.get(&viewport)
    }

    /// Layout for a viewport, created with defaults when missing
    pub fn layout_mut(&mut self, viewport: Viewport) -> &mut Layout {
        self.layouts
            .entry(viewport)
            .or_insert_with(|| Layout::for_viewport(viewport))
    }

    /// Sort order of a table in a viewport; empty when never sorted
    pub fn sort_spec(&self, viewport: Viewport, table_id: &str) -> &[SortKey] {
        self.layout(viewport)
            .and_then(|l| l.table_sorts.get(table_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Cycle a sort key on one table: absent, ascending, descending, absent
    pub fn toggle_sort(&mut self, viewport: Viewport, table_id: &str, field: Field) {
        let spec = self
            .layout_mut(viewport)
            .table_sorts
            .entry(table_id.to_string())
            .or_default();
        toggle_sort(spec, field);
    }

    /// Show or hide a column in a viewport
    pub fn set_column_visible(&mut self, viewport: Viewport, field: Field, visible: bool) {
        let layout = self.layout_mut(viewport);
        match layout.columns.iter_mut().find(|c| c.key == field) {
            Some(column) => column.visible = visible,
            None => layout.columns.push(ColumnConfig::new(field, visible)),
        }
    }

    /// Set or clear (blank pattern) the filter for a field
    pub fn set_filter(&mut self, field: Field, pattern: impl Into<String>) {
        let pattern = pattern.into();
        if pattern.trim().is_empty() {
            self.filters.remove(&field);
        } else {
            self.filters.insert(field, pattern);
        }
    }
}
