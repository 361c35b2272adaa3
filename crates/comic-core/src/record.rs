//! Core record types for representing a comic book collection

use crate::normalize::normalize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A single comic book in the collection.
///
/// Deserializing goes through the normalizer, so partial or legacy input
/// always comes out in canonical shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct Record {
    /// Stable identity, generated once and never derived from content
    pub uuid: String,
    pub title: String,
    pub publisher: String,
    pub volume: String,
    pub issue: String,
    /// Two-digit month when numeric; absent when the record has no month
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    pub year: String,
    pub quantity: i64,
    /// Decimal amount with two fractional digits, or empty for "no value"
    pub value: String,
    pub condition: GradeCode,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub comic_type: Option<String>,
    pub writer: Vec<String>,
    pub artist: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl Record {
    /// Read a field through the descriptor list
    pub fn get(&self, field: Field) -> FieldValue {
        match field {
            Field::Title => FieldValue::Text(self.title.clone()),
            Field::Publisher => FieldValue::Text(self.publisher.clone()),
            Field::Volume => FieldValue::Text(self.volume.clone()),
            Field::Issue => FieldValue::Text(self.issue.clone()),
            Field::Month => FieldValue::Text(self.month.clone().unwrap_or_default()),
            Field::Year => FieldValue::Text(self.year.clone()),
            Field::Quantity => FieldValue::Text(self.quantity.to_string()),
            Field::Value => FieldValue::Text(self.value.clone()),
            Field::Condition => FieldValue::Text(self.condition.code().to_string()),
            Field::Type => FieldValue::Text(self.comic_type.clone().unwrap_or_default()),
            Field::Writer => FieldValue::List(self.writer.clone()),
            Field::Artist => FieldValue::List(self.artist.clone()),
            Field::Comments => FieldValue::Text(self.comments.clone().unwrap_or_default()),
        }
    }

    /// Write a field, coercing the value into the field's storage type.
    ///
    /// Coercion here is only about shape (text vs list, optional vs present);
    /// formatting such as month padding is the normalizer's job.
    pub fn set(&mut self, field: Field, value: FieldValue) {
        match field {
            Field::Title => self.title = value.into_text(),
            Field::Publisher => self.publisher = value.into_text(),
            Field::Volume => self.volume = value.into_text(),
            Field::Issue => self.issue = value.into_text(),
            Field::Month => self.month = non_empty(value.into_text()),
            Field::Year => self.year = value.into_text(),
            Field::Quantity => {
                self.quantity = crate::normalize::coerce_quantity(&value.into_text())
            }
            Field::Value => self.value = value.into_text(),
            Field::Condition => {
                self.condition = GradeCode::from_code(&value.into_text()).unwrap_or_default()
            }
            Field::Type => self.comic_type = non_empty(value.into_text()),
            Field::Writer => self.writer = value.into_list(),
            Field::Artist => self.artist = value.into_list(),
            Field::Comments => self.comments = non_empty(value.into_text()),
        }
    }

    /// The field rendered as a single display string (lists joined with ", ")
    pub fn display_value(&self, field: Field) -> String {
        self.get(field).to_string()
    }
}

impl From<Value> for Record {
    fn from(raw: Value) -> Self {
        normalize(&raw)
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Grade codes, ordered from Mint to Poor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GradeCode {
    Mt,
    #[default]
    Nm,
    Vf,
    Fn,
    Vg,
    Gd,
    Fr,
    Pr,
}

impl GradeCode {
    pub const ALL: [GradeCode; 8] = [
        GradeCode::Mt,
        GradeCode::Nm,
        GradeCode::Vf,
        GradeCode::Fn,
        GradeCode::Vg,
        GradeCode::Gd,
        GradeCode::Fr,
        GradeCode::Pr,
    ];

    /// Two-letter code as stored in documents
    pub fn code(&self) -> &'static str {
        match self {
            GradeCode::Mt => "MT",
            GradeCode::Nm => "NM",
            GradeCode::Vf => "VF",
            GradeCode::Fn => "FN",
            GradeCode::Vg => "VG",
            GradeCode::Gd => "GD",
            GradeCode::Fr => "FR",
            GradeCode::Pr => "PR",
        }
    }

    /// Parse an exact two-letter code
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.code() == code)
    }

    pub fn description(&self) -> &'static str {
        match self {
            GradeCode::Mt => "Mint (10.0 - 9.9) - Perfect condition, no flaws.",
            GradeCode::Nm => "Near Mint (9.8 - 9.0) - Almost perfect, minimal wear.",
            GradeCode::Vf => "Very Fine (8.5 - 7.5) - Slight wear, but still high quality.",
            GradeCode::Fn => "Fine (7.0 - 5.5) - Noticeable wear but well-preserved.",
            GradeCode::Vg => "Very Good (5.0 - 3.5) - Some creases, small tears, or other defects.",
            GradeCode::Gd => "Good (3.0 - 1.8) - Significant wear, possibly detached cover or pages.",
            GradeCode::Fr => "Fair (1.5 - 1.0) - Heavy damage, but still complete.",
            GradeCode::Pr => "Poor (0.5) - Very damaged, missing pages, or severe defects.",
        }
    }
}

impl fmt::Display for GradeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The editable, displayable fields of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Publisher,
    Volume,
    Issue,
    Type,
    Month,
    Year,
    Quantity,
    Value,
    Condition,
    Writer,
    Artist,
    Comments,
}

/// Storage shape of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Numeric,
    Sequence,
}

impl Field {
    /// Every field, in default column order
    pub const ALL: [Field; 13] = [
        Field::Title,
        Field::Publisher,
        Field::Volume,
        Field::Issue,
        Field::Type,
        Field::Month,
        Field::Year,
        Field::Quantity,
        Field::Value,
        Field::Condition,
        Field::Writer,
        Field::Artist,
        Field::Comments,
    ];

    /// Key used in documents and filter maps
    pub fn key(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Publisher => "publisher",
            Field::Volume => "volume",
            Field::Issue => "issue",
            Field::Type => "type",
            Field::Month => "month",
            Field::Year => "year",
            Field::Quantity => "quantity",
            Field::Value => "value",
            Field::Condition => "condition",
            Field::Writer => "writer",
            Field::Artist => "artist",
            Field::Comments => "comments",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Publisher => "Publisher",
            Field::Volume => "Volume",
            Field::Issue => "Issue",
            Field::Type => "Type",
            Field::Month => "Month",
            Field::Year => "Year",
            Field::Quantity => "Quantity",
            Field::Value => "Value",
            Field::Condition => "Condition",
            Field::Writer => "Writer",
            Field::Artist => "Artist",
            Field::Comments => "Comments",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Writer | Field::Artist => FieldKind::Sequence,
            Field::Quantity => FieldKind::Numeric,
            _ => FieldKind::Text,
        }
    }

    /// Look a field up by its document key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    /// The blank value for this field's kind
    pub fn blank(&self) -> FieldValue {
        match self.kind() {
            FieldKind::Sequence => FieldValue::List(Vec::new()),
            _ => FieldValue::Text(String::new()),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A field's value, independent of which field it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Empty string or empty list
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::List(items) => items.is_empty(),
        }
    }

    /// Equality where lists compare by sorted contents and text compares exactly
    pub fn same_as(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::List(a), FieldValue::List(b)) => {
                let mut a = a.clone();
                let mut b = b.clone();
                a.sort();
                b.sort();
                a == b
            }
            _ => self.to_string() == other.to_string(),
        }
    }

    pub fn into_text(self) -> String {
        match self {
            FieldValue::Text(s) => s,
            FieldValue::List(items) => items.join(", "),
        }
    }

    pub fn into_list(self) -> Vec<String> {
        match self {
            FieldValue::Text(s) if s.is_empty() => Vec::new(),
            FieldValue::Text(s) => vec![s],
            FieldValue::List(items) => items,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}
