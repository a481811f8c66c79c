//! CSV export of placemark extended data
//!
//! The header comes from the schema, not from the rows: a row missing a
//! column gets an empty cell and keys outside the header are dropped.

use crate::error::Result;
use crate::reconcile::ExtendedFields;
use csv::WriterBuilder;
use std::io::Write;
use std::path::Path;
use tracing::{debug, error};

/// What happened to a CSV export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularOutcome {
    /// The file was written with this many data rows
    Written {
        /// Data rows written, header excluded
        rows: usize,
    },
    /// Writing failed; the error has been logged
    Failed,
}

impl TabularOutcome {
    /// True if the file was written
    #[inline]
    #[must_use]
    pub const fn is_written(self) -> bool {
        matches!(self, Self::Written { .. })
    }
}

/// Write `rows` to a CSV file at `path` under a `columns` header
///
/// Failures are logged and reported as [`TabularOutcome::Failed`]; this
/// function never returns an error.
#[must_use = "the outcome reports whether the file was written"]
pub fn write_tabular(path: &Path, columns: &[String], rows: &[ExtendedFields]) -> TabularOutcome {
    match try_write_tabular(path, columns, rows) {
        Ok(rows) => TabularOutcome::Written { rows },
        Err(e) => {
            error!(path = %path.display(), "I/O error writing CSV: {e}");
            TabularOutcome::Failed
        }
    }
}

/// [`write_tabular`] with the error returned instead of logged
///
/// # Errors
///
/// Returns [`crate::KmlError::Io`] if the file cannot be created and
/// [`crate::KmlError::Csv`] if a record cannot be written.
pub fn try_write_tabular(path: &Path, columns: &[String], rows: &[ExtendedFields]) -> Result<usize> {
    let file = std::fs::File::create(path)?;
    let written = write_records(file, columns, rows)?;
    debug!(path = %path.display(), rows = written, "CSV written");
    Ok(written)
}

/// Write header and rows to any writer, returning the number of data rows
///
/// # Errors
///
/// Returns [`crate::KmlError::Csv`] if the underlying writer fails.
pub fn write_records<W: Write>(
    writer: W,
    columns: &[String],
    rows: &[ExtendedFields],
) -> Result<usize> {
    let mut csv = WriterBuilder::new().from_writer(writer);
    csv.write_record(columns)?;
    for row in rows {
        csv.write_record(
            columns
                .iter()
                .map(|column| row.get(column).map_or("", String::as_str)),
        )?;
    }
    csv.flush()?;
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    fn row(pairs: &[(&str, &str)]) -> ExtendedFields {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn render(columns: &[String], rows: &[ExtendedFields]) -> String {
        let mut buf = Vec::new();
        write_records(&mut buf, columns, rows).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_missing_column_is_empty_cell() {
        let out = render(
            &columns(&["ComplexNam", "DivName"]),
            &[row(&[("ComplexNam", "Foo")])],
        );
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines, ["ComplexNam,DivName", "Foo,"]);
    }

    #[test]
    fn test_extra_keys_dropped() {
        let out = render(
            &columns(&["ComplexNam", "DivName"]),
            &[row(&[("ComplexNam", "Foo"), ("Extra", "Bar")])],
        );
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines, ["ComplexNam,DivName", "Foo,"]);
    }

    #[test]
    fn test_cells_follow_header_order() {
        let out = render(
            &columns(&["B", "A"]),
            &[row(&[("A", "1"), ("B", "2")]), row(&[("B", "3")])],
        );
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines, ["B,A", "2,1", "3,"]);
    }

    #[test]
    fn test_values_are_quoted_when_needed() {
        let out = render(&columns(&["Name"]), &[row(&[("Name", "Depot, \"East\"")])]);
        assert!(out.contains(r#""Depot, ""East""""#), "{out}");
    }

    #[test]
    fn test_write_tabular_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lands.csv");
        let outcome = write_tabular(
            &path,
            &columns(&["ComplexNam", "DivName"]),
            &[row(&[("ComplexNam", "Main St Depot"), ("DivName", "East")])],
        );
        assert_eq!(outcome, TabularOutcome::Written { rows: 1 });
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content.lines().collect::<Vec<_>>(),
            ["ComplexNam,DivName", "Main St Depot,East"]
        );
    }

    #[test]
    fn test_write_failure_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        // parent directory does not exist
        let path = dir.path().join("missing").join("lands.csv");
        let outcome = write_tabular(&path, &columns(&["A"]), &[]);
        assert_eq!(outcome, TabularOutcome::Failed);
        assert!(!outcome.is_written());
        assert!(try_write_tabular(&path, &columns(&["A"]), &[]).is_err());
    }
}
