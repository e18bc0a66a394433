use crate::work_hours::employee::{validate_record, Employee, RawWorkRecord, WorkRecord};
use std::{
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Error};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

pub trait WorkRecordSource {
    fn fetch_work_records(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<WorkRecord>, Error>;

    fn fetch_employees(&self) -> Result<Vec<Employee>, Error>;
}

pub struct JsonFileSource {
    records_path: PathBuf,
    employees_path: PathBuf,
}

impl JsonFileSource {
    pub fn new(records_path: impl Into<PathBuf>, employees_path: impl Into<PathBuf>) -> Self {
        Self {
            records_path: records_path.into(),
            employees_path: employees_path.into(),
        }
    }
}

impl WorkRecordSource for JsonFileSource {
    fn fetch_work_records(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<WorkRecord>, Error> {
        let records: Vec<WorkRecord> = read_work_records(&self.records_path)?
            .into_iter()
            .filter(|record| start <= record.timestamp && record.timestamp <= end)
            .collect();

        info!(
            "Loaded {} work records between {} and {}",
            records.len(),
            start,
            end
        );
        Ok(records)
    }

    fn fetch_employees(&self) -> Result<Vec<Employee>, Error> {
        read_json(&self.employees_path)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Error> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.to_string_lossy()))?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse json from {}", path.to_string_lossy()))
}

// a broken entry only costs that entry, the rest of the export is still used
fn read_work_records(path: &Path) -> Result<Vec<WorkRecord>, Error> {
    let entries: Vec<Value> = read_json(path)?;

    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let record = serde_json::from_value::<RawWorkRecord>(entry)
                .context("entry does not look like a work record")
                .and_then(|raw| validate_record(&raw));
            match record {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!("Skipping work record #{} in {}: {:#}", index, path.display(), err);
                    None
                }
            }
        })
        .collect())
}

#[cfg(test)]
pub struct InMemorySource {
    pub records: Vec<WorkRecord>,
    pub employees: Vec<Employee>,
}

#[cfg(test)]
impl WorkRecordSource for InMemorySource {
    fn fetch_work_records(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<WorkRecord>, Error> {
        Ok(self.records.clone())
    }

    fn fetch_employees(&self) -> Result<Vec<Employee>, Error> {
        Ok(self.employees.clone())
    }
}
