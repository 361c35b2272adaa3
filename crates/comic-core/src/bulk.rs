//! Bulk generation of a run of issues from one template record
//!
//! Issue numbers step by one from the start issue up to and including the end
//! issue. Month and year start at the template's date and roll forward one
//! month per generated record.

use crate::error::BulkError;
use crate::normalize::{format_number, new_uuid, normalize_record, parse_number};
use crate::record::Record;

/// Largest run a single bulk add may produce
pub const MAX_BULK_ISSUES: usize = 1000;

/// Number of records a bulk add would produce, or 0 when it would fail on the range
pub fn calculate_count(start_issue: &str, end_issue: &str) -> usize {
    parse_range(start_issue, end_issue)
        .map(|(_, count)| count)
        .unwrap_or(0)
}

/// Expand a template into one record per issue in `start_issue..=end_issue`
pub fn generate_range(
    template: &Record,
    start_issue: &str,
    end_issue: &str,
) -> Result<Vec<Record>, BulkError> {
    let (start, count) = parse_range(start_issue, end_issue)?;
    let (mut month, mut year) = start_date(template, count)?;

    let mut records = Vec::with_capacity(count);

    for step in 0..count {
        if step > 0 {
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
        }

        let mut record = template.clone();
        record.uuid = new_uuid();
        record.issue = format_number(start + step as f64);
        record.month = Some(format!("{:02}", month));
        record.year = year.to_string();
        records.push(normalize_record(record));
    }

    tracing::info!(
        title = %template.title,
        start = start_issue,
        end = end_issue,
        count = records.len(),
        "generated issue run"
    );
    Ok(records)
}

/// Start and run length. Both bounds numeric, `end >= start`, and at most
/// [`MAX_BULK_ISSUES`] records; shared by preview and generation.
fn parse_range(start_issue: &str, end_issue: &str) -> Result<(f64, usize), BulkError> {
    let (Some(start), Some(end)) = (parse_number(start_issue), parse_number(end_issue)) else {
        return Err(BulkError::InvalidNumber);
    };
    if end < start {
        return Err(BulkError::InvalidRange);
    }

    // also rejects an infinite span from subtracting extreme bounds
    let span = (end - start).floor();
    if !(span < MAX_BULK_ISSUES as f64) {
        return Err(BulkError::TooManyIssues);
    }
    Ok((start, span as usize + 1))
}

/// Starting month and year; the year must stay representable for the whole run
fn start_date(template: &Record, count: usize) -> Result<(u32, i64), BulkError> {
    let month = template.month.as_deref().unwrap_or("").trim();
    let year = template.year.trim();
    if month.is_empty() || year.is_empty() {
        return Err(BulkError::MissingDate);
    }

    let month: u32 = month.parse().map_err(|_| BulkError::InvalidDate)?;
    let year: i64 = year.parse().map_err(|_| BulkError::InvalidDate)?;
    if !(1..=12).contains(&month) {
        return Err(BulkError::InvalidDate);
    }

    let rollovers = (month as usize - 1 + count.saturating_sub(1)) / 12;
    i64::try_from(rollovers)
        .ok()
        .and_then(|r| year.checked_add(r))
        .ok_or(BulkError::InvalidDate)?;
    Ok((month, year))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::GradeCode;

    fn template(month: Option<&str>, year: &str) -> Record {
        Record {
            uuid: "template".to_string(),
            title: "Amazing Spider-Man".to_string(),
            publisher: "Marvel".to_string(),
            volume: "1".to_string(),
            month: month.map(str::to_string),
            year: year.to_string(),
            quantity: 1,
            value: "3.00".to_string(),
            condition: GradeCode::Vf,
            writer: vec!["Stan Lee".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_count() {
        let t = template(Some("01"), "1990");
        assert_eq!(generate_range(&t, "1", "12").unwrap().len(), 12);
        assert_eq!(generate_range(&t, "5", "5").unwrap().len(), 1);
        assert_eq!(generate_range(&t, "12", "1"), Err(BulkError::InvalidRange));
    }

    #[test]
    fn test_rollover() {
        let t = template(Some("11"), "2023");
        let run = generate_range(&t, "1", "3").unwrap();

        let months: Vec<&str> = run.iter().map(|r| r.month.as_deref().unwrap()).collect();
        let years: Vec<&str> = run.iter().map(|r| r.year.as_str()).collect();
        let issues: Vec<&str> = run.iter().map(|r| r.issue.as_str()).collect();

        assert_eq!(months, vec!["11", "12", "01"]);
        assert_eq!(years, vec!["2023", "2023", "2024"]);
        assert_eq!(issues, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_copies_template_with_fresh_identity() {
        let t = template(Some("3"), "1975");
        let run = generate_range(&t, "10", "11").unwrap();

        assert_eq!(run[0].month.as_deref(), Some("03"));
        assert_ne!(run[0].uuid, t.uuid);
        assert_ne!(run[0].uuid, run[1].uuid);
        for record in &run {
            assert_eq!(record.title, t.title);
            assert_eq!(record.condition, GradeCode::Vf);
            assert_eq!(record.writer, t.writer);
        }
    }

    #[test]
    fn test_fractional_start() {
        let t = template(Some("01"), "2000");
        let run = generate_range(&t, "0.5", "2.9").unwrap();
        let issues: Vec<&str> = run.iter().map(|r| r.issue.as_str()).collect();
        assert_eq!(issues, vec!["0.5", "1.5", "2.5"]);
        assert_eq!(calculate_count("0.5", "2.9"), 3);
    }

    #[test]
    fn test_errors() {
        let t = template(Some("01"), "2000");
        assert_eq!(generate_range(&t, "one", "5"), Err(BulkError::InvalidNumber));
        assert_eq!(generate_range(&t, "1", ""), Err(BulkError::InvalidNumber));

        assert_eq!(
            generate_range(&template(None, "2000"), "1", "2"),
            Err(BulkError::MissingDate)
        );
        assert_eq!(
            generate_range(&template(Some("01"), ""), "1", "2"),
            Err(BulkError::MissingDate)
        );
        assert_eq!(
            generate_range(&template(Some("13"), "2000"), "1", "2"),
            Err(BulkError::InvalidDate)
        );
        assert_eq!(
            generate_range(&template(Some("Spring"), "2000"), "1", "2"),
            Err(BulkError::InvalidDate)
        );
    }

    #[test]
    fn test_range_checked_before_date() {
        let t = template(None, "");
        assert_eq!(generate_range(&t, "x", "1"), Err(BulkError::InvalidNumber));
        assert_eq!(generate_range(&t, "3", "1"), Err(BulkError::InvalidRange));
    }

    #[test]
    fn test_calculate_count_matches_generation_rule() {
        assert_eq!(calculate_count("1", "12"), 12);
        assert_eq!(calculate_count("5", "5"), 1);
        assert_eq!(calculate_count("12", "1"), 0);
        assert_eq!(calculate_count("", "3"), 0);
        assert_eq!(calculate_count("a", "b"), 0);
    }

    #[test]
    fn test_oversized_runs_are_rejected() {
        let t = template(Some("01"), "2000");

        assert_eq!(calculate_count("1", "1e300"), 0);
        assert_eq!(calculate_count("-1e308", "1e308"), 0);
        assert_eq!(generate_range(&t, "0", "1e12"), Err(BulkError::TooManyIssues));

        assert_eq!(calculate_count("1", "1000"), MAX_BULK_ISSUES);
        assert_eq!(generate_range(&t, "1", "1000").unwrap().len(), MAX_BULK_ISSUES);
        assert_eq!(calculate_count("1", "1001"), 0);
    }

    #[test]
    fn test_year_overflow_is_rejected() {
        let last_year = i64::MAX.to_string();

        let t = template(Some("12"), &last_year);
        assert_eq!(generate_range(&t, "1", "2"), Err(BulkError::InvalidDate));

        // a run that stays inside the final year is fine
        let t = template(Some("11"), &last_year);
        let run = generate_range(&t, "1", "2").unwrap();
        assert_eq!(run[1].year, last_year);
    }
}
