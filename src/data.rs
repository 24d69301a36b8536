//! Raw Table Loading
//!
//! A `RawTable` is the loosely typed input of the pipeline: named columns,
//! rows of number/text/missing cells, exactly what a spreadsheet export or a
//! JSON request delivers. CSV files are read with Polars and converted here.

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A single table cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// Numeric value, coercing numeric text ("6.5") the way spreadsheets need
    ///
    /// Non-finite numbers and unparseable text both count as missing.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Cell::Number(v) => *v,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
            Cell::Missing => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Text value; numbers are rendered, empty text is missing
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Number(v) => Some(v.to_string()),
            Cell::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Cell::Missing => None,
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

/// Rectangular table of cells keyed by column name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Empty table with the given header
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; short rows are padded with `Missing`, long rows truncated
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Missing);
        self.rows.push(row);
    }

    /// Build from JSON-style records (`[{column: value}]`)
    ///
    /// The header is the union of all record keys.
    pub fn from_records(records: &[BTreeMap<String, Cell>]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let mut table = Self::new(columns);
        for record in records {
            let row = table
                .columns
                .iter()
                .map(|c| record.get(c).cloned().unwrap_or(Cell::Missing))
                .collect();
            table.rows.push(row);
        }
        table
    }

    /// Convert a Polars DataFrame
    ///
    /// Integer and float columns become `Cell::Number`, everything else is
    /// cast to text.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let columns: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        let height = df.height();

        let mut by_column: Vec<Vec<Cell>> = Vec::with_capacity(columns.len());
        for name in &columns {
            let column = df
                .column(name)
                .with_context(|| format!("Column '{}' not found", name))?;
            let dtype = column.dtype();

            let cells: Vec<Cell> = if dtype.is_float() || dtype.is_integer() {
                let cast = column
                    .cast(&DataType::Float64)
                    .with_context(|| format!("Column '{}' could not be cast to f64", name))?;
                cast.f64()?
                    .into_iter()
                    .map(|v| v.map(Cell::Number).unwrap_or(Cell::Missing))
                    .collect()
            } else {
                let cast = column
                    .cast(&DataType::String)
                    .with_context(|| format!("Column '{}' could not be cast to string", name))?;
                cast.str()?
                    .into_iter()
                    .map(|v| match v {
                        Some(s) if !s.trim().is_empty() => Cell::Text(s.to_string()),
                        _ => Cell::Missing,
                    })
                    .collect()
            };
            by_column.push(cells);
        }

        let mut table = Self::new(columns);
        for idx in 0..height {
            let row = by_column
                .iter()
                .map(|cells| cells.get(idx).cloned().unwrap_or(Cell::Missing))
                .collect();
            table.rows.push(row);
        }
        Ok(table)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at (row, column name)
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col)
    }

    /// Replace the rows, keeping the header
    pub(crate) fn with_rows(&self, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }
}

/// Load a CSV file into a `RawTable`
pub fn load_csv(path: &Path) -> Result<RawTable> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.into()))
        .with_context(|| format!("Failed to create CSV reader: {:?}", path))?
        .finish()
        .with_context(|| format!("Failed to load CSV: {:?}", path))?;

    tracing::debug!("Loaded {} rows x {} columns from {:?}", df.height(), df.width(), path);
    RawTable::from_dataframe(&df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_cell_numeric_coercion() {
        assert_eq!(Cell::Number(6.5).as_f64(), Some(6.5));
        assert_eq!(Cell::from(" 42 ").as_f64(), Some(42.0));
        assert_eq!(Cell::from("n/a").as_f64(), None);
        assert_eq!(Cell::Number(f64::NAN).as_f64(), None);
        assert_eq!(Cell::Missing.as_f64(), None);
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(Cell::from(" rice ").as_text().as_deref(), Some("rice"));
        assert_eq!(Cell::from("  ").as_text(), None);
    }

    #[test]
    fn test_from_records_unions_columns() {
        let records: Vec<BTreeMap<String, Cell>> = serde_json::from_str(
            r#"[{"n": 10, "ph": "6.1"}, {"n": 12, "crop": "rice"}]"#,
        )
        .unwrap();
        let table = RawTable::from_records(&records);

        assert_eq!(table.height(), 2);
        assert_eq!(table.columns().len(), 3);
        assert_eq!(table.cell(0, "crop"), Some(&Cell::Missing));
        assert_eq!(table.cell(1, "crop"), Some(&Cell::from("rice")));
        assert_eq!(table.cell(0, "ph").and_then(Cell::as_f64), Some(6.1));
    }

    #[test]
    fn test_push_row_pads_short_rows() {
        let mut table = RawTable::new(["a", "b", "c"]);
        table.push_row(vec![Cell::Number(1.0)]);
        assert_eq!(table.rows()[0], vec![Cell::Number(1.0), Cell::Missing, Cell::Missing]);
    }

    #[test]
    fn test_load_csv() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "timestamp,n,p,k,temp,hum,ph,crop").unwrap();
        writeln!(file, "2024-01-01 10:00:00,90,42,43,20.8,82.0,6.5,rice").unwrap();
        writeln!(file, "2024-01-01 11:00:00,85,58,41,21.7,80.3,7.0,rice").unwrap();
        file.flush().unwrap();

        let table = load_csv(file.path()).unwrap();
        assert_eq!(table.height(), 2);
        assert_eq!(table.cell(0, "n"), Some(&Cell::Number(90.0)));
        assert_eq!(table.cell(1, "ph").and_then(Cell::as_f64), Some(7.0));
        assert_eq!(table.cell(0, "crop"), Some(&Cell::from("rice")));
    }
}
