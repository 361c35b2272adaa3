//! Filter engine: per-field regular expressions combined with AND or OR

use crate::record::{Field, FieldValue, Record};
use crate::view::Filters;
use regex::{Regex, RegexBuilder};

/// A filter pattern compiled for one field. `None` means the pattern did not compile.
struct FieldPredicate {
    field: Field,
    regex: Option<Regex>,
}

impl FieldPredicate {
    fn compile(field: Field, pattern: &str) -> Self {
        let regex = match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(rx) => Some(rx),
            Err(e) => {
                tracing::warn!(%field, pattern, error = %e, "filter pattern does not compile");
                None
            }
        };
        Self { field, regex }
    }

    fn matches(&self, record: &Record) -> bool {
        let Some(regex) = &self.regex else {
            return false;
        };
        match record.get(self.field) {
            FieldValue::Text(s) => regex.is_match(&s),
            FieldValue::List(items) => items.iter().any(|item| regex.is_match(item)),
        }
    }
}

/// Keep the records that satisfy the filter set.
///
/// Only fields with a non-blank pattern take part. With no participating
/// field every record passes. Under AND a record must match every
/// participating field, under OR at least one.
pub fn filter_records<'a>(records: &'a [Record], filters: &Filters, use_or: bool) -> Vec<&'a Record> {
    let predicates: Vec<FieldPredicate> = filters
        .iter()
        .filter(|(_, pattern)| !pattern.trim().is_empty())
        .map(|(&field, pattern)| FieldPredicate::compile(field, pattern))
        .collect();

    if predicates.is_empty() {
        return records.iter().collect();
    }

    let filtered: Vec<&Record> = records
        .iter()
        .filter(|record| record_passes(record, &predicates, use_or))
        .collect();

    tracing::debug!(
        total = records.len(),
        filtered = filtered.len(),
        active = predicates.len(),
        use_or,
        "filtered rows"
    );
    filtered
}

/// Fold over every field: a field without a pattern contributes `false` under
/// OR and `true` under AND, so it never changes the outcome.
fn record_passes(record: &Record, predicates: &[FieldPredicate], use_or: bool) -> bool {
    Field::ALL.iter().fold(!use_or, |acc, field| {
        let contribution = match predicates.iter().find(|p| p.field == *field) {
            Some(predicate) => predicate.matches(record),
            None => !use_or,
        };
        if use_or {
            acc || contribution
        } else {
            acc && contribution
        }
    })
}

/// Anchored, escaped pattern that matches exactly `value`
pub fn exact_match_pattern(value: &str) -> String {
    format!("^{}$", regex::escape(value))
}

/// Fresh filter set that narrows the grid to one title (and optionally one issue).
///
/// Blank parts produce no pattern. Report pages use this to jump into the grid.
pub fn drill_down_filters(title: &str, publisher: &str, volume: &str, issue: Option<&str>) -> Filters {
    let mut filters = Filters::new();
    let parts = [
        (Field::Title, Some(title)),
        (Field::Publisher, Some(publisher)),
        (Field::Volume, Some(volume)),
        (Field::Issue, issue),
    ];
    for (field, value) in parts {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            filters.insert(field, exact_match_pattern(value));
        }
    }
    filters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comic(title: &str, publisher: &str, writers: &[&str]) -> Record {
        Record {
            uuid: title.to_string(),
            title: title.to_string(),
            publisher: publisher.to_string(),
            writer: writers.iter().map(|w| w.to_string()).collect(),
            quantity: 1,
            ..Default::default()
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            comic("Amazing Spider-Man", "Marvel", &["Stan Lee"]),
            comic("Batman", "DC", &["Bob Kane", "Bill Finger"]),
            comic("Fantastic Four", "Marvel", &["Stan Lee", "Jack Kirby"]),
            comic("Hellboy", "Dark Horse", &[]),
        ]
    }

    fn ids(rows: &[&Record]) -> Vec<String> {
        rows.iter().map(|r| r.uuid.clone()).collect()
    }

    fn filters(pairs: &[(Field, &str)]) -> Filters {
        pairs.iter().map(|(f, p)| (*f, p.to_string())).collect()
    }

    #[test]
    fn test_no_patterns_passes_everything() {
        let records = sample();
        assert_eq!(filter_records(&records, &Filters::new(), false).len(), 4);
        assert_eq!(filter_records(&records, &Filters::new(), true).len(), 4);

        let blank = filters(&[(Field::Title, "   ")]);
        assert_eq!(filter_records(&records, &blank, true).len(), 4);
    }

    #[test]
    fn test_case_insensitive() {
        let records = sample();
        let rows = filter_records(&records, &filters(&[(Field::Publisher, "marvel")]), false);
        assert_eq!(ids(&rows), vec!["Amazing Spider-Man", "Fantastic Four"]);
    }

    #[test]
    fn test_sequence_field_matches_any_element() {
        let records = sample();
        let rows = filter_records(&records, &filters(&[(Field::Writer, "kirby$|finger$")]), false);
        assert_eq!(ids(&rows), vec!["Batman", "Fantastic Four"]);
    }

    #[test]
    fn test_and_or_combination() {
        let records = sample();
        let set = filters(&[(Field::Publisher, "^DC$"), (Field::Writer, "Stan")]);

        let and_rows = filter_records(&records, &set, false);
        assert!(and_rows.is_empty());

        let or_rows = filter_records(&records, &set, true);
        assert_eq!(
            ids(&or_rows),
            vec!["Amazing Spider-Man", "Batman", "Fantastic Four"]
        );
    }

    #[test]
    fn test_or_is_superset_of_and() {
        let records = sample();
        let sets = [
            filters(&[(Field::Title, "a")]),
            filters(&[(Field::Title, "man"), (Field::Publisher, "marvel")]),
            filters(&[(Field::Title, "e"), (Field::Writer, "lee"), (Field::Publisher, "o")]),
        ];
        for set in &sets {
            let and_ids = ids(&filter_records(&records, set, false));
            let or_ids = ids(&filter_records(&records, set, true));
            for id in &and_ids {
                assert!(or_ids.contains(id));
            }
        }
    }

    #[test]
    fn test_invalid_pattern_matches_nothing() {
        let records = sample();
        let rows = filter_records(&records, &filters(&[(Field::Title, "(unclosed")]), false);
        assert!(rows.is_empty());

        // under OR, a valid sibling pattern still lets records through
        let set = filters(&[(Field::Title, "[bad"), (Field::Publisher, "DC")]);
        assert_eq!(ids(&filter_records(&records, &set, true)), vec!["Batman"]);
    }

    #[test]
    fn test_exact_match_pattern_escapes() {
        assert_eq!(exact_match_pattern("Batman (1940)"), r"^Batman \(1940\)$");

        let mut records = sample();
        records.push(comic("Batman: Year One", "DC", &[]));
        let pattern = exact_match_pattern("Batman");
        let set = filters(&[(Field::Title, pattern.as_str())]);
        assert_eq!(ids(&filter_records(&records, &set, false)), vec!["Batman"]);
    }

    #[test]
    fn test_drill_down_filters_skip_blank_parts() {
        let set = drill_down_filters("Batman", "DC", "", None);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(&Field::Title).map(String::as_str), Some("^Batman$"));
        assert!(!set.contains_key(&Field::Volume));

        let with_issue = drill_down_filters("Batman", "DC", "1", Some("27"));
        assert_eq!(with_issue.get(&Field::Issue).map(String::as_str), Some("^27$"));
    }
}
