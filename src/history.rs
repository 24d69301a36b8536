//! Sensor history cleaning
//!
//! Prepares a raw history export for display and for seeding a query:
//! timestamps are parsed and sorted, numeric columns coerced, gaps filled
//! with the column median, exact duplicate rows removed. The input table is
//! left untouched.

use crate::data::{Cell, RawTable};
use crate::features::{adapt, resolve_column, Observation, LABEL_COLUMNS};
use ahash::AHashSet;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Format every parsed timestamp is rewritten to
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a timestamp cell (RFC 3339, `%Y-%m-%d %H:%M:%S` or a bare date)
pub fn parse_timestamp(cell: &Cell) -> Option<NaiveDateTime> {
    let text = cell.as_text()?;

    if let Ok(dt) = DateTime::parse_from_rfc3339(&text) {
        return Some(dt.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&text, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Clean a history table
///
/// Timestamps are rewritten in one format, so the same instant written two
/// ways counts as a duplicate.
/// A column is numeric when it names a canonical feature, or when every
/// non-empty cell parses as a number. Label and other text columns keep
/// their text.
pub fn clean_history(raw: &RawTable) -> RawTable {
    let width = raw.columns().len();
    let mut rows: Vec<Vec<Cell>> = raw
        .rows()
        .iter()
        .map(|row| {
            let mut row = row.clone();
            row.resize(width, Cell::Missing);
            row
        })
        .collect();
    let ts_idx = raw.column_index(TIMESTAMP_COLUMN);

    if let Some(ts_idx) = ts_idx {
        let before = rows.len();
        let mut stamped: Vec<(NaiveDateTime, Vec<Cell>)> = rows
            .into_iter()
            .filter_map(|mut row| {
                let ts = parse_timestamp(&row[ts_idx])?;
                row[ts_idx] = Cell::Text(ts.format(TIMESTAMP_FORMAT).to_string());
                Some((ts, row))
            })
            .collect();
        stamped.sort_by_key(|(ts, _)| *ts);

        if stamped.len() < before {
            tracing::debug!("Dropped {} rows with invalid timestamps", before - stamped.len());
        }
        rows = stamped.into_iter().map(|(_, row)| row).collect();
    }

    for (col, name) in raw.columns().iter().enumerate() {
        if Some(col) == ts_idx || !is_numeric_column(name, &rows, col) {
            continue;
        }

        let mut values: Vec<f64> = Vec::with_capacity(rows.len());
        for row in rows.iter_mut() {
            match row[col].as_f64() {
                Some(v) => {
                    row[col] = Cell::Number(v);
                    values.push(v);
                }
                None => row[col] = Cell::Missing,
            }
        }

        if let Some(fill) = median(&mut values) {
            for row in rows.iter_mut() {
                if row[col] == Cell::Missing {
                    row[col] = Cell::Number(fill);
                }
            }
        }
    }

    let mut seen = AHashSet::with_capacity(rows.len());
    rows.retain(|row| seen.insert(row_key(row)));

    raw.with_rows(rows)
}

/// Observation used to pre-fill a query form
///
/// The most recent complete row of the cleaned history, or the feature means
/// when the table carries no timestamps. None if the features are missing or
/// the values fall outside their domains.
pub fn latest_observation(raw: &RawTable) -> Option<Observation> {
    let cleaned = clean_history(raw);
    let features = adapt(&cleaned).into_complete().ok()?;

    let values = if cleaned.column_index(TIMESTAMP_COLUMN).is_some() {
        features.rows().last()?.values
    } else {
        features.means()?
    };

    let observation = Observation::from_vector(&values);
    observation.validate().ok()?;
    Some(observation)
}

fn is_numeric_column(name: &str, rows: &[Vec<Cell>], col: usize) -> bool {
    if LABEL_COLUMNS.contains(&name) {
        return false;
    }
    if resolve_column(name).is_some() {
        return true;
    }
    let mut any = false;
    for row in rows {
        match &row[col] {
            Cell::Missing => {}
            cell if cell.as_text().is_none() => {}
            cell => {
                if cell.as_f64().is_none() {
                    return false;
                }
                any = true;
            }
        }
    }
    any
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

fn row_key(row: &[Cell]) -> Vec<String> {
    row.iter()
        .map(|cell| match cell {
            Cell::Number(v) => format!("n{}", v.to_bits()),
            Cell::Text(s) => format!("t{}", s),
            Cell::Missing => "-".to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn history() -> RawTable {
        let mut table = RawTable::new(["timestamp", "n", "p", "k", "temp", "hum", "ph", "soil_moisture", "crop"]);
        let rows: [[&str; 9]; 5] = [
            ["2024-03-02 08:00:00", "95", "40", "45", "26.1", "80", "6.2", "31", "rice"],
            ["2024-03-01 08:00:00", "90", "42", "43", "24.0", "82", "6.0", "30", "rice"],
            ["not a date", "10", "10", "10", "10", "10", "7.0", "10", "wheat"],
            ["2024-03-03", "", "41", "44", "25.0", "81", "6.1", "32", "rice"],
            ["2024-03-01 08:00:00", "90", "42", "43", "24.0", "82", "6.0", "30", "rice"],
        ];
        for row in rows {
            table.push_row(row.iter().map(|s| Cell::from(*s)).collect());
        }
        table
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp(&Cell::from("2024-03-01T08:00:00Z")).is_some());
        assert!(parse_timestamp(&Cell::from("2024-03-01 08:00:00")).is_some());
        assert!(parse_timestamp(&Cell::from("2024-03-01")).is_some());
        assert!(parse_timestamp(&Cell::from("yesterday")).is_none());
        assert!(parse_timestamp(&Cell::Missing).is_none());
    }

    #[test]
    fn test_clean_history_sorts_fills_and_dedups() {
        let cleaned = clean_history(&history());

        // bad timestamp dropped, duplicate removed
        assert_eq!(cleaned.height(), 3);
        assert_eq!(cleaned.cell(0, "timestamp"), Some(&Cell::from("2024-03-01 08:00:00")));
        assert_eq!(cleaned.cell(2, "timestamp"), Some(&Cell::from("2024-03-03 00:00:00")));

        // missing nitrogen filled with the median of 95, 90, 90
        assert_eq!(cleaned.cell(2, "n"), Some(&Cell::Number(90.0)));
        assert_eq!(cleaned.cell(0, "soil_moisture"), Some(&Cell::Number(30.0)));
        assert_eq!(cleaned.cell(0, "crop"), Some(&Cell::from("rice")));
    }

    #[test]
    fn test_same_instant_in_different_formats_is_duplicate() {
        let mut table = RawTable::new(["timestamp", "n", "p", "k", "temp", "hum", "ph"]);
        for stamp in ["2024-03-01 08:00:00", "2024-03-01T08:00:00", "2024-03-01T08:00:00Z"] {
            let mut row = vec![Cell::from(stamp)];
            row.extend(["90", "42", "43", "24.0", "82", "6.0"].iter().map(|s| Cell::from(*s)));
            table.push_row(row);
        }

        let cleaned = clean_history(&table);
        assert_eq!(cleaned.height(), 1);
        assert_eq!(cleaned.cell(0, "timestamp"), Some(&Cell::from("2024-03-01 08:00:00")));
    }

    #[test]
    fn test_input_not_modified() {
        let raw = history();
        let _ = clean_history(&raw);
        assert_eq!(raw, history());
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&mut []), None);
    }

    #[test]
    fn test_latest_observation_uses_newest_row() {
        let obs = latest_observation(&history()).unwrap();
        assert_eq!(obs.nitrogen, 90.0);
        assert_eq!(obs.temperature, 25.0);
        assert_eq!(obs.ph, 6.1);
    }

    #[test]
    fn test_latest_observation_without_timestamps_uses_means() {
        let mut table = RawTable::new(["nitrogen", "phosphorus", "potassium", "temperature", "humidity", "ph"]);
        table.push_row(vec![Cell::Number(80.0), 40.0.into(), 40.0.into(), 20.0.into(), 60.0.into(), 6.0.into()]);
        table.push_row(vec![Cell::Number(100.0), 50.0.into(), 60.0.into(), 30.0.into(), 80.0.into(), 7.0.into()]);

        let obs = latest_observation(&table).unwrap();
        assert_relative_eq!(obs.nitrogen, 90.0);
        assert_relative_eq!(obs.ph, 6.5);
    }

    #[test]
    fn test_latest_observation_needs_features() {
        let table = RawTable::new(["timestamp", "soil_moisture"]);
        assert!(latest_observation(&table).is_none());
    }
}
