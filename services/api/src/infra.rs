use chrono::{DateTime, Utc};
use job_portal::config::PortalConfig;
use job_portal::error::AppError;
use job_portal::portal::applications::ApplicationService;
use job_portal::portal::import::{JobCsvImporter, PublishedImport};
use job_portal::portal::jobs::JobService;
use job_portal::portal::memory::{InMemoryApplicationRepository, InMemoryJobRepository};
use job_portal::timestamp::{self, DateOnly};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type PortalJobService = JobService<InMemoryJobRepository>;
pub(crate) type PortalApplicationService =
    ApplicationService<InMemoryApplicationRepository, InMemoryJobRepository>;

/// Both services wired over one shared job store so application counters stay consistent.
#[derive(Clone)]
pub(crate) struct PortalServices {
    pub(crate) jobs: Arc<PortalJobService>,
    pub(crate) applications: Arc<PortalApplicationService>,
}

impl PortalServices {
    pub(crate) fn in_memory(config: &PortalConfig) -> Self {
        let job_store = Arc::new(InMemoryJobRepository::default());
        let application_store = Arc::new(InMemoryApplicationRepository::default());

        Self {
            jobs: Arc::new(JobService::with_page_size(
                job_store.clone(),
                config.default_page_size,
            )),
            applications: Arc::new(ApplicationService::new(application_store, job_store)),
        }
    }

    /// Publishes every valid row of a job export, logging the rows that were refused.
    pub(crate) fn seed_from_csv(
        &self,
        path: &Path,
        now: DateTime<Utc>,
    ) -> Result<PublishedImport, AppError> {
        let import = JobCsvImporter::from_path(path)?;
        let outcome = import.publish(self.jobs.as_ref(), now);
        for row in &outcome.rejected {
            warn!(path = %path.display(), line = row.line, reason = %row.reason, "seed row skipped");
        }
        info!(
            path = %path.display(),
            published = outcome.published.len(),
            "job board seeded"
        );
        Ok(outcome)
    }
}

/// Clap value parser for `--now`: RFC 3339, or a bare `YYYY-MM-DD` read as midnight UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    timestamp::parse_timestamp(raw, DateOnly::StartOfDay)
        .ok_or_else(|| format!("failed to parse '{}' as RFC 3339 or YYYY-MM-DD", raw.trim()))
}
