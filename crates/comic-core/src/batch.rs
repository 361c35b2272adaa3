//! Batch editing across a multi-row selection
//!
//! This module provides:
//! - The merged representative record that seeds a batch-edit form
//! - Translation of submitted form values into explicit per-field edits
//! - Application of those edits to every selected record

use crate::normalize::normalize_record;
use crate::record::{Field, FieldValue, Record};
use crate::selection::Selection;
use std::collections::BTreeMap;

/// A submitted scalar value of exactly this text clears the field
pub const CLEAR_TEXT: &str = " ";

/// A submitted list containing this token clears the field
pub const CLEAR_MARKER: &str = "__CLEAR__";

/// Field values as shown in, and submitted from, an edit form
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormRecord {
    pub values: BTreeMap<Field, FieldValue>,
}

impl FormRecord {
    /// Every field of a record
    pub fn from_record(record: &Record) -> Self {
        Self {
            values: Field::ALL.iter().map(|&f| (f, record.get(f))).collect(),
        }
    }

    /// Value of a field; blank when the form does not carry it
    pub fn get(&self, field: Field) -> FieldValue {
        self.values.get(&field).cloned().unwrap_or_else(|| field.blank())
    }

    pub fn set(&mut self, field: Field, value: FieldValue) {
        self.values.insert(field, value);
    }
}

/// What a batch save does to one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    NoChange,
    Clear,
    SetTo(FieldValue),
}

impl FieldEdit {
    /// Decode the form's sentinel conventions: blank means untouched, a single
    /// space or a list holding [`CLEAR_MARKER`] means clear.
    pub fn from_form_value(value: &FieldValue) -> Self {
        match value {
            FieldValue::Text(s) if s == CLEAR_TEXT => FieldEdit::Clear,
            FieldValue::List(items) if items.iter().any(|i| i == CLEAR_MARKER) => FieldEdit::Clear,
            v if v.is_blank() => FieldEdit::NoChange,
            v => FieldEdit::SetTo(v.clone()),
        }
    }
}

/// Per-field edits to apply across a selection
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchEdit {
    pub edits: BTreeMap<Field, FieldEdit>,
}

impl BatchEdit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode every field carried by a submitted form
    pub fn from_form(form: &FormRecord) -> Self {
        Self {
            edits: form
                .values
                .iter()
                .map(|(&field, value)| (field, FieldEdit::from_form_value(value)))
                .collect(),
        }
    }

    pub fn with(mut self, field: Field, edit: FieldEdit) -> Self {
        self.edits.insert(field, edit);
        self
    }

    /// True when no field would change
    pub fn is_noop(&self) -> bool {
        self.edits.values().all(|e| *e == FieldEdit::NoChange)
    }
}

/// The representative record for a selection: fields where every record
/// agrees keep that value, divergent fields are blank.
///
/// Returns `None` for an empty selection.
pub fn compute_merged_record<'a, I>(selected: I) -> Option<FormRecord>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut iter = selected.into_iter();
    let first = iter.next()?;
    let mut merged = FormRecord::from_record(first);

    for record in iter {
        for field in Field::ALL {
            let current = merged.get(field);
            if !current.is_blank() && !current.same_as(&record.get(field)) {
                merged.set(field, field.blank());
            }
        }
    }

    Some(merged)
}

/// Apply a batch edit to one record and re-normalize it
pub fn apply_edits(record: &Record, batch: &BatchEdit, append_comments: bool) -> Record {
    let mut updated = record.clone();

    for (&field, edit) in &batch.edits {
        match edit {
            FieldEdit::NoChange => {}
            FieldEdit::Clear => updated.set(field, field.blank()),
            FieldEdit::SetTo(value) if field == Field::Comments && append_comments => {
                let addition = value.to_string();
                let combined = match record.comments.as_deref() {
                    Some(existing) if !existing.is_empty() => format!("{} {}", existing, addition),
                    _ => addition,
                };
                updated.comments = Some(combined);
            }
            FieldEdit::SetTo(value) => updated.set(field, value.clone()),
        }
    }

    normalize_record(updated)
}

/// Result of applying a batch edit to a collection
#[derive(Debug, Clone)]
pub struct BatchUpdate {
    /// The whole collection, with selected records replaced
    pub records: Vec<Record>,
    /// Number of records the edit was applied to
    pub updated: usize,
}

/// Apply a batch edit to every selected record. Unselected records pass through.
pub fn apply_batch_update(
    records: &[Record],
    batch: &BatchEdit,
    selection: &Selection,
    append_comments: bool,
) -> BatchUpdate {
    let mut updated = 0;
    let records = records
        .iter()
        .map(|record| {
            if selection.contains(&record.uuid) {
                updated += 1;
                apply_edits(record, batch, append_comments)
            } else {
                record.clone()
            }
        })
        .collect();

    BatchUpdate { records, updated }
}
