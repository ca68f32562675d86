//! Flat-file persistence of processed matrices, labels and the feature order.
//!
//! - Feature matrices: CSV with a header row (the feature order), one row per
//!   sample, scaled floats.
//! - Label vectors: CSV with the target column as header, `0`/`1` per row.
//! - Feature order: headerless CSV, one column name per line.

use crate::error::{ChurnError, Result};
use csv::{ReaderBuilder, WriterBuilder};
use ndarray::{Array1, Array2};
use std::path::Path;

/// Fail with [`ChurnError::MissingArtifact`] when `path` does not exist.
pub fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ChurnError::MissingArtifact {
            path: path.to_path_buf(),
        })
    }
}

pub fn write_matrix(path: &Path, headers: &[String], matrix: &Array2<f64>) -> Result<()> {
    if headers.len() != matrix.ncols() {
        return Err(ChurnError::FeatureMismatch {
            expected: format!("{} columns", headers.len()),
            got: format!("{} columns", matrix.ncols()),
        });
    }
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record(headers)?;
    for row in matrix.rows() {
        wtr.write_record(row.iter().map(|v| v.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read a feature matrix, returning its header and values.
pub fn read_matrix(path: &Path) -> Result<(Vec<String>, Array2<f64>)> {
    ensure_exists(path)?;
    let mut rdr = ReaderBuilder::new().from_path(path)?;
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let mut values = Vec::new();
    let mut n_rows = 0;
    for record in rdr.records() {
        let record = record?;
        for (cell, header) in record.iter().zip(&headers) {
            values.push(parse_cell(header, cell)?);
        }
        n_rows += 1;
    }

    let matrix = Array2::from_shape_vec((n_rows, headers.len()), values).map_err(|e| {
        ChurnError::FeatureMismatch {
            expected: format!("{} x {} matrix in {}", n_rows, headers.len(), path.display()),
            got: e.to_string(),
        }
    })?;
    Ok((headers, matrix))
}

pub fn write_labels(path: &Path, column: &str, labels: &Array1<f64>) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record([column])?;
    for &label in labels {
        wtr.write_record([format!("{}", label as u8)])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read a label vector, returning its header and values.
pub fn read_labels(path: &Path) -> Result<(String, Array1<f64>)> {
    ensure_exists(path)?;
    let mut rdr = ReaderBuilder::new().from_path(path)?;
    let column = rdr
        .headers()?
        .get(0)
        .map(str::to_string)
        .ok_or_else(|| ChurnError::EmptyData(format!("{} has no header", path.display())))?;

    let mut labels = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let cell = record.get(0).unwrap_or_default();
        let value = parse_cell(&column, cell)?;
        if value != 0.0 && value != 1.0 {
            return Err(ChurnError::UnrecognizedLabel {
                column: column.clone(),
                value: cell.to_string(),
            });
        }
        labels.push(value);
    }
    Ok((column, Array1::from(labels)))
}

pub fn write_feature_names(path: &Path, names: &[String]) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_path(path)?;
    for name in names {
        wtr.write_record([name])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read the persisted feature order.
pub fn read_feature_names(path: &Path) -> Result<Vec<String>> {
    ensure_exists(path)?;
    let mut rdr = ReaderBuilder::new().has_headers(false).from_path(path)?;
    let mut names = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if let Some(name) = record.get(0) {
            names.push(name.to_string());
        }
    }
    if names.is_empty() {
        return Err(ChurnError::EmptyData(format!(
            "{} lists no features",
            path.display()
        )));
    }
    Ok(names)
}

fn parse_cell(column: &str, cell: &str) -> Result<f64> {
    cell.trim()
        .parse::<f64>()
        .map_err(|_| ChurnError::InvalidValue {
            field: column.to_string(),
            value: cell.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_matrix_roundtrip_keeps_header_order() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("X_train.csv");
        let headers = vec!["Age".to_string(), "Gender".to_string()];
        let matrix = array![[0.25, -1.5], [1.0e-3, 2.0]];

        write_matrix(&path, &headers, &matrix).unwrap();
        let (read_headers, read) = read_matrix(&path).unwrap();

        assert_eq!(read_headers, headers);
        assert_eq!(read, matrix);
    }

    #[test]
    fn test_write_matrix_header_mismatch() {
        let tmp = tempfile::tempdir().unwrap();
        let result = write_matrix(
            &tmp.path().join("X.csv"),
            &["Age".to_string()],
            &array![[1.0, 2.0]],
        );
        assert!(matches!(result, Err(ChurnError::FeatureMismatch { .. })));
    }

    #[test]
    fn test_labels_written_as_integers() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("y_train.csv");

        write_labels(&path, "Churn", &array![1.0, 0.0, 1.0]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Churn\n1\n0\n1\n");
        let (column, labels) = read_labels(&path).unwrap();
        assert_eq!(column, "Churn");
        assert_eq!(labels, array![1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_read_labels_rejects_non_binary() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("y.csv");
        std::fs::write(&path, "Churn\n1\n2\n").unwrap();
        assert!(read_labels(&path).is_err());
    }

    #[test]
    fn test_feature_names_headerless() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("feature_names.csv");
        let names = vec![
            "Age".to_string(),
            "Usage Frequency".to_string(),
            "Gender".to_string(),
        ];

        write_feature_names(&path, &names).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Age\nUsage Frequency\nGender\n");
        assert_eq!(read_feature_names(&path).unwrap(), names);
    }

    #[test]
    fn test_missing_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("absent.csv");
        assert!(matches!(
            read_matrix(&path),
            Err(ChurnError::MissingArtifact { .. })
        ));
        assert!(matches!(
            read_labels(&path),
            Err(ChurnError::MissingArtifact { .. })
        ));
        assert!(matches!(
            read_feature_names(&path),
            Err(ChurnError::MissingArtifact { .. })
        ));
    }
}
