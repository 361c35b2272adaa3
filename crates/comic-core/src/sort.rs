//! Sort engine: multi-key, stable ordering of records

use crate::normalize::parse_number;
use crate::record::{Field, Record};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One entry of a sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub key: Field,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(key: Field, direction: SortDirection) -> Self {
        Self { key, direction }
    }
}

/// Move a leading "The " to the end: "The Flash" sorts as "Flash, The"
pub fn normalize_title(title: &str) -> String {
    match title.strip_prefix("The ") {
        Some(rest) => format!("{}, The", rest),
        None => title.to_string(),
    }
}

/// Sort records by a spec. Stable; ties across all keys keep input order.
pub fn sort_records<'a, I>(records: I, spec: &[SortKey]) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut rows: Vec<&Record> = records.into_iter().collect();
    if !spec.is_empty() {
        rows.sort_by(|a, b| compare_by_spec(a, b, spec));
    }
    tracing::debug!(rows = rows.len(), keys = spec.len(), "sorted rows");
    rows
}

/// Canonical collection order: title, then volume, then issue, all ascending
pub fn sort_default(mut records: Vec<Record>) -> Vec<Record> {
    records.sort_by(compare_default);
    records
}

/// Compare two records key by key; the first non-equal key decides
pub fn compare_by_spec(a: &Record, b: &Record, spec: &[SortKey]) -> Ordering {
    for sort_key in spec {
        let (mut av, mut bv) = (a.display_value(sort_key.key), b.display_value(sort_key.key));
        if sort_key.key == Field::Title {
            av = normalize_title(&av);
            bv = normalize_title(&bv);
        }

        let ord = compare_values(&av, &bv);
        if ord != Ordering::Equal {
            return match sort_key.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
        }
    }
    Ordering::Equal
}

/// The ordering used when a collection is loaded
pub fn compare_default(a: &Record, b: &Record) -> Ordering {
    locale_compare(&normalize_title(&a.title), &normalize_title(&b.title))
        .then_with(|| compare_numeric_or_locale(&a.volume, &b.volume))
        .then_with(|| compare_numeric_or_locale(&a.issue, &b.issue))
}

/// Numeric when both sides are non-blank numbers, case-insensitive text otherwise
fn compare_values(a: &str, b: &str) -> Ordering {
    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

fn compare_numeric_or_locale(a: &str, b: &str) -> Ordering {
    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => locale_compare(a, b),
    }
}

/// Approximates a locale collation: case-insensitive first, lowercase before
/// uppercase on otherwise equal text.
fn locale_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Cycle a field in a spec: absent -> asc (lowest priority) -> desc -> removed
pub fn toggle_sort(spec: &mut Vec<SortKey>, field: Field) {
    match spec.iter().position(|k| k.key == field) {
        None => spec.push(SortKey::new(field, SortDirection::Asc)),
        Some(idx) if spec[idx].direction == SortDirection::Asc => {
            spec[idx].direction = SortDirection::Desc;
        }
        Some(idx) => {
            spec.remove(idx);
        }
    }
}
