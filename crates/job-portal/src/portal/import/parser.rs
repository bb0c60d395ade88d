use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::portal::actor::ActorId;
use crate::portal::jobs::{EmploymentType, JobDraft, SalaryRange};
use crate::timestamp::{parse_timestamp, DateOnly};

/// Posting parsed from one CSV row together with the employer that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedJob {
    pub line: u64,
    pub owner: ActorId,
    pub draft: JobDraft,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("row {line}: {reason}")]
pub struct RowError {
    pub line: u64,
    pub reason: String,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<Result<ImportedJob, RowError>>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut rows = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |position| position.line());
        match record.deserialize::<JobRow>(Some(&headers)) {
            Ok(row) => rows.push(row.into_job(line)),
            Err(err) => rows.push(Err(RowError {
                line,
                reason: err.to_string(),
            })),
        }
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct JobRow {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Company")]
    company: String,
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "Category", default)]
    category: String,
    #[serde(rename = "Description")]
    description: String,
    #[serde(
        rename = "Requirements",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    requirements: Option<String>,
    #[serde(rename = "Salary Min")]
    salary_min: u32,
    #[serde(rename = "Salary Max")]
    salary_max: u32,
    #[serde(rename = "Currency")]
    currency: String,
    #[serde(rename = "Employment Type")]
    employment_type: String,
    #[serde(rename = "Remote", default, deserialize_with = "empty_string_as_none")]
    remote: Option<String>,
    #[serde(
        rename = "Expires At",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    expires_at: Option<String>,
    #[serde(rename = "Owner")]
    owner: String,
}

impl JobRow {
    fn into_job(self, line: u64) -> Result<ImportedJob, RowError> {
        let fail = |reason: String| RowError { line, reason };

        let employment_type = EmploymentType::parse(&self.employment_type)
            .ok_or_else(|| fail(format!("unknown employment type '{}'", self.employment_type)))?;

        let remote = match self.remote.as_deref() {
            None => false,
            Some(raw) => parse_flag(raw).ok_or_else(|| fail(format!("invalid remote flag '{raw}'")))?,
        };

        let expires_at = match self.expires_at.as_deref() {
            None => None,
            Some(raw) => Some(
                parse_timestamp(raw, DateOnly::EndOfDay).ok_or_else(|| fail(format!("invalid expiry '{raw}'")))?,
            ),
        };

        if self.owner.is_empty() {
            return Err(fail("owner must not be empty".to_string()));
        }

        let requirements = self
            .requirements
            .map(|raw| {
                raw.split(';')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(ImportedJob {
            line,
            owner: ActorId::new(self.owner),
            draft: JobDraft {
                title: self.title,
                company: self.company,
                location: self.location,
                category: self.category,
                description: self.description,
                requirements,
                salary: SalaryRange {
                    min: self.salary_min,
                    max: self.salary_max,
                    currency: self.currency,
                },
                employment_type,
                remote,
                status: None,
                expires_at,
            },
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "1" => Some(true),
        "no" | "n" | "false" | "0" => Some(false),
        _ => None,
    }
}
