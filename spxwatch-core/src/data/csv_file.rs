//! CSV replay provider.
//!
//! Reads a recorded feed with the snapshot API's columns
//! (`dateTime,spx,spxExpectedMove,spxOTMBids,vix`, epoch seconds) and serves
//! the rows that fall on the requested trading day. One file may hold
//! several days, so seeding and replay can share a recording.

use std::path::{Path, PathBuf};

use super::grid::reduce_to_grid;
use super::http::RawSnapshot;
use super::provider::{DataError, FetchRequest, ObservationProvider};
use crate::domain::Observation;

#[derive(Debug, Clone)]
pub struct CsvProvider {
    path: PathBuf,
}

impl CsvProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<Observation>, DataError> {
        let mut reader = csv::Reader::from_path(&self.path).map_err(|e| match e.into_kind() {
            csv::ErrorKind::Io(source) => DataError::Io {
                path: self.path.clone(),
                source,
            },
            other => DataError::Csv(format!("{other:?}")),
        })?;

        let mut out = Vec::new();
        for (i, row) in reader.deserialize::<RawSnapshot>().enumerate() {
            let row = row.map_err(|e| DataError::Csv(format!("row {}: {e}", i + 1)))?;
            out.push(row.into_observation()?);
        }
        Ok(out)
    }
}

impl ObservationProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&self, request: &FetchRequest) -> Result<Vec<Observation>, DataError> {
        let day = request.target.resolve_date();
        let mut observations = self.read_all()?;
        observations.retain(|o| o.timestamp.date_naive() == day);
        Ok(reduce_to_grid(observations, request.interval_min, request.cutoff_instant()))
    }
}
