//! Validation rules
//!
//! Each rule takes a batch and returns the filtered or transformed batch.
//! Rules never fail: values that cannot be interpreted become null, and
//! records that cannot be kept are dropped without an error.

use super::table::{Cell, Table, Value};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::str::FromStr;
use tracing::debug;

/// Date formats tried in order; month-first wins for ambiguous slash dates
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Remove rows that are exact duplicates of an earlier row
pub fn drop_duplicate_rows(table: Table) -> Table {
    let Table { headers, rows } = table;
    let mut seen = HashSet::new();
    let rows = rows.into_iter().filter(|row| seen.insert(row.clone())).collect();
    Table { headers, rows }
}

/// Keep the first row per unique combination of `keys`, preserving order
///
/// A key column absent from the table counts as null for every row.
pub fn drop_duplicates(table: Table, keys: &[&str]) -> Table {
    let indices: Vec<Option<usize>> = keys.iter().map(|k| table.column_index(k)).collect();
    let Table { headers, rows } = table;
    let mut seen: HashSet<Vec<Cell>> = HashSet::new();

    let before = rows.len();
    let rows: Vec<Vec<Cell>> = rows
        .into_iter()
        .filter(|row| {
            let key: Vec<Cell> = indices
                .iter()
                .map(|idx| idx.and_then(|i| row[i].clone()))
                .collect();
            seen.insert(key)
        })
        .collect();

    if rows.len() != before {
        debug!("Dropped {} duplicate rows on {:?}", before - rows.len(), keys);
    }
    Table { headers, rows }
}

/// Drop rows with a null in any of the `critical` columns
///
/// An absent critical column is null for every row, so every row is dropped.
pub fn drop_missing_critical(table: Table, critical: &[&str]) -> Table {
    let indices: Vec<Option<usize>> = critical.iter().map(|k| table.column_index(k)).collect();
    let Table { headers, rows } = table;

    let before = rows.len();
    let rows: Vec<Vec<Cell>> = rows
        .into_iter()
        .filter(|row| {
            indices
                .iter()
                .all(|idx| idx.map(|i| row[i].is_some()).unwrap_or(false))
        })
        .collect();

    if rows.len() != before {
        debug!(
            "Dropped {} rows missing critical fields {:?}",
            before - rows.len(),
            critical
        );
    }
    Table { headers, rows }
}

/// Turn blank values in non-critical columns into real nulls
///
/// The CSV reader only nulls empty fields, so whitespace-only values reach
/// this step as text.
pub fn fill_non_critical(mut table: Table, critical: &[&str]) -> Table {
    let non_critical: Vec<String> = table
        .headers
        .iter()
        .filter(|h| !critical.contains(&h.as_str()))
        .cloned()
        .collect();

    for column in non_critical {
        table.map_column(&column, |cell| match cell {
            Some(Value::Text(s)) if s.trim().is_empty() => None,
            other => other,
        });
    }
    table
}

/// Trim and title-case every text cell; "nan" and blank become null
pub fn normalize_strings(mut table: Table) -> Table {
    for row in &mut table.rows {
        for cell in row.iter_mut() {
            if let Some(Value::Text(s)) = cell {
                let normalized = title_case(s.trim());
                *cell = if normalized.is_empty() || normalized.eq_ignore_ascii_case("nan") {
                    None
                } else {
                    Some(Value::Text(normalized))
                };
            }
        }
    }
    table
}

/// Earliest year accepted from input; `%Y` also matches one- and two-digit years
const MIN_YEAR: i32 = 1000;

fn with_full_year(date: NaiveDate) -> Option<NaiveDate> {
    (date.year() >= MIN_YEAR).then_some(date)
}

/// Parse date columns permissively; unparseable values become null
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    // Compact YYYYMMDD
    if s.len() == 8 && s.chars().all(|c| c.is_ascii_digit()) {
        let year = s[0..4].parse().ok()?;
        let month = s[4..6].parse().ok()?;
        let day = s[6..8].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day).and_then(with_full_year);
    }

    let parsed = DATE_FORMATS
        .iter()
        .filter_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .chain(
            DATETIME_FORMATS
                .iter()
                .filter_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
                .map(|dt| dt.date()),
        )
        .chain(DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .find_map(with_full_year);
    if parsed.is_some() {
        return parsed;
    }

    // Date followed by an unrecognised time part
    let date_part = s.split(|c: char| c == 'T' || c.is_whitespace()).next()?;
    if date_part.len() < s.len() {
        return DATE_FORMATS[..6]
            .iter()
            .filter_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
            .find_map(with_full_year);
    }

    None
}

/// Parse an integer, accepting integral floats such as "12.0"
pub fn parse_int(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
        Some(f as i64)
    } else {
        None
    }
}

/// Parse a decimal amount
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Some(Value::Text(s.to_string()))
    }

    fn table(headers: &[&str], rows: Vec<Vec<Cell>>) -> Table {
        let mut t = Table::new(headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            t.push_row(row);
        }
        t
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("john DOE"), "John Doe");
        assert_eq!(title_case("p1a2b3"), "P1A2B3");
        assert_eq!(title_case("o'neil"), "O'Neil");
        assert_eq!(title_case("strength-training"), "Strength-Training");
        assert_eq!(title_case("42"), "42");
    }

    #[test]
    fn test_normalize_strings_nan_becomes_null() {
        let t = table(&["name"], vec![vec![text("  nan ")], vec![text("NaN")], vec![text("  amy ")]]);
        let t = normalize_strings(t);
        assert_eq!(t.rows[0][0], None);
        assert_eq!(t.rows[1][0], None);
        assert_eq!(t.rows[2][0], text("Amy"));
    }

    #[test]
    fn test_drop_missing_critical() {
        let t = table(
            &["id", "name"],
            vec![vec![text("1"), text("a")], vec![None, text("b")], vec![text("3"), None]],
        );
        let t = drop_missing_critical(t, &["id", "name"]);
        assert_eq!(t.len(), 1);
        assert_eq!(t.rows[0][0], text("1"));
    }

    #[test]
    fn test_drop_missing_critical_absent_column_drops_all() {
        let t = table(&["id"], vec![vec![text("1")]]);
        let t = drop_missing_critical(t, &["id", "name"]);
        assert!(t.is_empty());
    }

    #[test]
    fn test_fill_non_critical_blanks_become_null() {
        let t = table(&["id", "note"], vec![vec![text("1"), text("   ")]]);
        let t = fill_non_critical(t, &["id"]);
        assert_eq!(t.rows[0][1], None);
        assert_eq!(t.rows[0][0], text("1"));
    }

    #[test]
    fn test_drop_duplicates_keeps_first_in_order() {
        let t = table(
            &["id", "name"],
            vec![
                vec![text("2"), text("b")],
                vec![text("1"), text("a")],
                vec![text("2"), text("c")],
                vec![text("3"), text("d")],
            ],
        );
        let t = drop_duplicates(t, &["id"]);
        let names: Vec<_> = t.rows.iter().map(|r| r[1].clone()).collect();
        assert_eq!(names, vec![text("b"), text("a"), text("d")]);
    }

    #[test]
    fn test_drop_duplicates_idempotent() {
        let t = table(
            &["id"],
            vec![vec![text("1")], vec![text("1")], vec![text("2")], vec![None], vec![None]],
        );
        let once = drop_duplicates(t, &["id"]);
        let twice = drop_duplicates(once.clone(), &["id"]);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn test_drop_duplicate_rows_whole_row() {
        let t = table(
            &["id", "name"],
            vec![
                vec![text("1"), text("a")],
                vec![text("1"), text("a")],
                vec![text("1"), text("b")],
            ],
        );
        assert_eq!(drop_duplicate_rows(t).len(), 2);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        for raw in [
            "2024-03-15",
            "2024/03/15",
            "03/15/2024",
            "15/03/2024",
            "15-03-2024",
            "15.03.2024",
            "20240315",
            "15 Mar 2024",
            "15 March 2024",
            "Mar 15, 2024",
            "2024-03-15 08:30:00",
            "2024-03-15T08:30:00",
            "2024-03-15T08:30:00+05:30",
        ] {
            assert_eq!(parse_date(raw), Some(expected), "failed on {}", raw);
        }
    }

    #[test]
    fn test_parse_date_month_first_when_ambiguous() {
        assert_eq!(parse_date("02/03/2024"), NaiveDate::from_ymd_opt(2024, 2, 3));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("2024-13-45"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_parse_date_two_digit_year_is_null() {
        for raw in ["15-03-24", "03/15/24", "24-03-15", "15 Mar 24", "00240315", "24-03-15 08:30:00"] {
            assert_eq!(parse_date(raw), None, "accepted {}", raw);
        }
    }

    #[test]
    fn test_normalize_dates_unparseable_to_null() {
        let t = table(&["start_date"], vec![vec![text("2024-01-02")], vec![text("Soon")]]);
        let t = normalize_dates(t, &["start_date", "end_date"]);
        assert_eq!(t.rows[0][0], Some(Value::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())));
        assert_eq!(t.rows[1][0], None);
    }

    #[test]
    fn test_normalize_gender() {
        let t = table(&["gender"], vec![vec![text("female")], vec![text(" m")], vec![None]]);
        let t = normalize_gender(t, "gender");
        assert_eq!(t.rows[0][0], text("F"));
        assert_eq!(t.rows[1][0], text("M"));
        assert_eq!(t.rows[2][0], None);
    }

    #[test]
    fn test_coerce_int() {
        let t = table(
            &["contact"],
            vec![vec![text("9876543210")], vec![text("12.0")], vec![text("call me")]],
        );
        let t = coerce_int(t, "contact");
        assert_eq!(t.rows[0][0], Some(Value::Int(9876543210)));
        assert_eq!(t.rows[1][0], Some(Value::Int(12)));
        assert_eq!(t.rows[2][0], None);
    }

    #[test]
    fn test_coerce_positive_int_rejects_zero() {
        let t = table(&["validity_months"], vec![vec![text("0")], vec![text("-2")], vec![text("6")]]);
        let t = coerce_positive_int(t, "validity_months");
        assert_eq!(t.rows[0][0], None);
        assert_eq!(t.rows[1][0], None);
        assert_eq!(t.rows[2][0], Some(Value::Int(6)));
    }

    #[test]
    fn test_coerce_decimal() {
        let t = table(&["price"], vec![vec![text("1499.50")], vec![text("free")]]);
        let t = coerce_decimal(t, "price");
        assert_eq!(t.rows[0][0], Some(Value::Decimal(Decimal::new(149950, 2))));
        assert_eq!(t.rows[1][0], None);
    }

    #[test]
    fn test_referential_filter_keeps_nulls() {
        let allowed: HashSet<Value> = [Value::Int(1)].into_iter().collect();
        let t = table(
            &["trainer_id"],
            vec![vec![Some(Value::Int(1))], vec![Some(Value::Int(2))], vec![None]],
        );
        let t = referential_filter(t, "trainer_id", &allowed);
        assert_eq!(t.rows, vec![vec![Some(Value::Int(1))], vec![None]]);
    }

    #[test]
    fn test_referential_filter_absent_column_keeps_all() {
        let allowed = HashSet::new();
        let t = table(&["name"], vec![vec![text("x")]]);
        assert_eq!(referential_filter(t, "trainer_id", &allowed).len(), 1);
    }

    #[test]
    fn test_lowercase_headers() {
        let t = lowercase_headers(table(&["Trainer_ID", "Name"], vec![]));
        assert_eq!(t.headers, vec!["trainer_id".to_string(), "name".to_string()]);
    }
}
