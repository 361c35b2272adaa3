//! Suggestion lists for the add/edit forms

use crate::record::{Field, FieldValue, Record};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Distinct non-blank values of a field across the collection, in natural
/// order ("2" before "10"). List fields contribute each element.
pub fn field_options(records: &[Record], field: Field) -> Vec<String> {
    let mut values: BTreeSet<String> = BTreeSet::new();
    for record in records {
        match record.get(field) {
            FieldValue::Text(s) => {
                values.insert(s);
            }
            FieldValue::List(items) => values.extend(items),
        }
    }

    let mut options: Vec<String> = values.into_iter().filter(|v| !v.trim().is_empty()).collect();
    options.sort_by(|a, b| natural_compare(a, b));
    options
}

/// Compare text with embedded numbers by numeric value, letters case-insensitively
pub fn natural_compare(a: &str, b: &str) -> Ordering {
    let (mut a_chunks, mut b_chunks) = (chunks(a), chunks(b));
    loop {
        match (a_chunks.next(), b_chunks.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = compare_chunk(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn compare_chunk(x: &str, y: &str) -> Ordering {
    let x_digits = x.starts_with(|c: char| c.is_ascii_digit());
    let y_digits = y.starts_with(|c: char| c.is_ascii_digit());
    match (x_digits, y_digits) {
        (true, true) => {
            let x = x.trim_start_matches('0');
            let y = y.trim_start_matches('0');
            x.len().cmp(&y.len()).then_with(|| x.cmp(y))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => x.to_lowercase().cmp(&y.to_lowercase()),
    }
}

/// Split into maximal runs of ASCII digits and non-digits
fn chunks(s: &str) -> impl Iterator<Item = &str> {
    let mut rest = s;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let digit = first.is_ascii_digit();
        let end = rest
            .find(|c: char| c.is_ascii_digit() != digit)
            .unwrap_or(rest.len());
        let (chunk, tail) = rest.split_at(end);
        rest = tail;
        Some(chunk)
    })
}
