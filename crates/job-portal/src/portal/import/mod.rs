//! Bulk job posting import from CSV exports.

mod parser;

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::portal::actor::{Actor, ActorRole};
use crate::portal::jobs::{JobPosting, JobRepository, JobService};

pub use parser::{ImportedJob, RowError};

#[derive(Debug)]
pub enum JobImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for JobImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobImportError::Io(err) => write!(f, "failed to read job export: {}", err),
            JobImportError::Csv(err) => write!(f, "invalid job CSV data: {}", err),
        }
    }
}

impl std::error::Error for JobImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JobImportError::Io(err) => Some(err),
            JobImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for JobImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for JobImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Parsed rows split into usable postings and per-row rejections.
#[derive(Debug, Default)]
pub struct JobImport {
    pub jobs: Vec<ImportedJob>,
    pub rejected: Vec<RowError>,
}

/// Outcome of publishing an import through the job service.
#[derive(Debug, Default)]
pub struct PublishedImport {
    pub published: Vec<JobPosting>,
    pub rejected: Vec<RowError>,
}

pub struct JobCsvImporter;

impl JobCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<JobImport, JobImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<JobImport, JobImportError> {
        let mut import = JobImport::default();
        for row in parser::parse_rows(reader)? {
            match row {
                Ok(job) => import.jobs.push(job),
                Err(rejected) => import.rejected.push(rejected),
            }
        }
        Ok(import)
    }
}

impl JobImport {
    /// Creates every parsed posting on behalf of its owning employer.
    pub fn publish<J>(self, service: &JobService<J>, now: DateTime<Utc>) -> PublishedImport
    where
        J: JobRepository + 'static,
    {
        let mut outcome = PublishedImport {
            published: Vec::with_capacity(self.jobs.len()),
            rejected: self.rejected,
        };

        for imported in self.jobs {
            let owner = Actor {
                id: imported.owner,
                role: ActorRole::Employer,
            };
            match service.create(&owner, imported.draft, now) {
                Ok(posting) => outcome.published.push(posting),
                Err(err) => {
                    warn!(line = imported.line, error = %err, "imported job rejected");
                    outcome.rejected.push(RowError {
                        line: imported.line,
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            published = outcome.published.len(),
            rejected = outcome.rejected.len(),
            "job import finished"
        );
        outcome
    }
}
