//! Raw tabular data as read from the downloaded CSV.
//!
//! Cells stay as trimmed strings until the preprocessing pipeline decides,
//! per column, whether they are numeric features or categorical labels.

use crate::error::{ChurnError, Result};
use csv::{ReaderBuilder, Trim};
use std::io::Read;
use std::path::Path;

/// How a column's values are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    /// Every non-empty cell parses as a floating point number.
    Numeric,
    /// At least one non-empty cell is free text.
    Categorical,
}

/// Header plus string rows of a CSV file.
#[derive(Clone, Debug, PartialEq)]
pub struct RawFrame {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawFrame {
    /// Build a frame from already-split cells.
    ///
    /// Every row must have one cell per header.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if let Some(bad) = rows.iter().find(|row| row.len() != headers.len()) {
            return Err(ChurnError::FeatureMismatch {
                expected: format!("{} cells per row", headers.len()),
                got: format!("{} cells", bad.len()),
            });
        }
        Ok(Self { headers, rows })
    }

    /// Read a CSV file with a header row.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ChurnError::MissingArtifact {
                path: path.to_path_buf(),
            });
        }
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Read CSV text with a header row from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Self::new(headers, rows)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.headers.len()
    }

    /// Position of the column called `name`.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ChurnError::MissingColumn(name.to_string()))
    }

    /// All cells of the column called `name`, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// Sniff whether the column at `idx` holds numbers or labels.
    pub fn column_kind(&self, idx: usize) -> Result<ColumnKind> {
        if idx >= self.headers.len() {
            return Err(ChurnError::MissingColumn(format!(
                "column index {} of {}",
                idx,
                self.headers.len()
            )));
        }
        let all_numeric = self
            .rows
            .iter()
            .map(|row| row[idx].as_str())
            .filter(|cell| !cell.is_empty())
            .all(|cell| cell.parse::<f64>().is_ok());
        Ok(if all_numeric {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        })
    }

    /// Drop every column whose lowercase name contains `marker`, except `keep`.
    ///
    /// Returns the dropped column names in their original order.
    pub fn drop_columns_containing(&mut self, marker: &str, keep: &str) -> Vec<String> {
        let marker = marker.to_lowercase();
        if marker.is_empty() {
            return Vec::new();
        }
        let drop: Vec<bool> = self
            .headers
            .iter()
            .map(|h| h != keep && h.to_lowercase().contains(&marker))
            .collect();

        let dropped: Vec<String> = self
            .headers
            .iter()
            .zip(&drop)
            .filter(|(_, &d)| d)
            .map(|(h, _)| h.clone())
            .collect();
        if dropped.is_empty() {
            return dropped;
        }

        self.headers = retain_unmasked(std::mem::take(&mut self.headers), &drop);
        for row in &mut self.rows {
            *row = retain_unmasked(std::mem::take(row), &drop);
        }
        dropped
    }

    /// Drop rows with at least one empty cell. Returns how many were dropped.
    pub fn drop_incomplete_rows(&mut self) -> usize {
        let before = self.rows.len();
        self.rows
            .retain(|row| row.iter().all(|cell| !cell.is_empty()));
        before - self.rows.len()
    }

    /// New frame holding only the rows at `indices`, in that order.
    pub fn select_rows(&self, indices: &[usize]) -> RawFrame {
        RawFrame {
            headers: self.headers.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }
}

fn retain_unmasked(values: Vec<String>, drop: &[bool]) -> Vec<String> {
    values
        .into_iter()
        .zip(drop)
        .filter(|(_, &d)| !d)
        .map(|(v, _)| v)
        .collect()
}
