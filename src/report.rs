use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::marker::PhantomData;
use std::path::Path;

use csv::Writer;
use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::EpiError;
use crate::snapshot::StateCounts;

/// One row of the `state_counts.csv` report: the number of individuals in each state at the end
/// of a step.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub struct StateCountsRow {
    pub step: u64,
    pub susceptible: usize,
    pub infected: usize,
    pub critical: usize,
    pub recovered: usize,
    pub dead: usize,
}

impl StateCountsRow {
    #[must_use]
    pub fn new(step: u64, counts: &StateCounts) -> Self {
        StateCountsRow {
            step,
            susceptible: counts.susceptible,
            infected: counts.infected,
            critical: counts.critical,
            recovered: counts.recovered,
            dead: counts.dead,
        }
    }
}

// Checks that the path is valid. Creates the file and all parent directories if
// they do not exist.
fn generate_validate_filepath(path: &Path) -> Result<File, EpiError> {
    match path.extension().and_then(OsStr::to_str) {
        Some("csv") => {
            if let Some(parent) = path.parent() {
                create_dir_all(parent)?;
            }
            Ok(File::create(path)?)
        }
        _ => Err(EpiError::invalid(format!(
            "report output files must be CSVs, got {}",
            path.display()
        ))),
    }
}

/// A CSV file with one serialized row per call to [`send`](Self::send). The header is written
/// with the first row.
pub struct Report<T: Serialize> {
    writer: Writer<File>,
    rows: usize,
    row_type: PhantomData<T>,
}

impl<T: Serialize> Report<T> {
    /// # Errors
    /// Returns `EpiError::InvalidParameter` if `path` is not a `.csv` path and
    /// `EpiError::IoError` if the file or its directories cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, EpiError> {
        let path = path.as_ref();
        trace!("creating report {}", path.display());
        let file = generate_validate_filepath(path)?;
        Ok(Report {
            writer: Writer::from_writer(file),
            rows: 0,
            row_type: PhantomData,
        })
    }

    /// Writes one row and flushes it to disk.
    ///
    /// # Errors
    /// Returns `EpiError::CSVError` or `EpiError::IoError` if the row cannot be written.
    pub fn send(&mut self, row: &T) -> Result<(), EpiError> {
        self.writer.serialize(row)?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn counts(infected: usize) -> StateCounts {
        StateCounts {
            susceptible: 10 - infected,
            infected,
            ..StateCounts::default()
        }
    }

    #[test]
    fn writes_header_and_rows() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("state_counts.csv");
        let mut report = Report::create(&path).unwrap();
        report.send(&StateCountsRow::new(1, &counts(2))).unwrap();
        report.send(&StateCountsRow::new(2, &counts(3))).unwrap();
        assert_eq!(report.rows(), 2);

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("step,susceptible,infected,critical,recovered,dead")
        );
        assert_eq!(lines.next(), Some("1,8,2,0,0,0"));

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<StateCountsRow> = reader.deserialize().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], StateCountsRow::new(2, &counts(3)));
    }

    #[test]
    fn creates_missing_directories() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("out").join("report.csv");
        let mut report = Report::create(&path).unwrap();
        report.send(&StateCountsRow::new(1, &counts(1))).unwrap();
        assert!(path.exists(), "CSV file should exist");
    }

    #[test]
    fn only_csvs_allowed() {
        let temp_dir = tempdir().unwrap();
        let result = Report::<StateCountsRow>::create(temp_dir.path().join("report.tsv"));
        assert!(matches!(result, Err(EpiError::InvalidParameter(_))));
    }
}
