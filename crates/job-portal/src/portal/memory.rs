//! Process-local stores backing the service binary, the demo, and the test suites.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::portal::actor::ActorId;
use crate::portal::applications::{ApplicationId, ApplicationRecord, ApplicationRepository};
use crate::portal::jobs::{JobId, JobPosting, JobRepository};
use crate::portal::repository::RepositoryError;

fn lock<'a, T>(mutex: &'a Mutex<T>, store: &str) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{store} lock poisoned")))
}

#[derive(Default, Clone)]
pub struct InMemoryJobRepository {
    jobs: Arc<Mutex<HashMap<JobId, JobPosting>>>,
}

impl JobRepository for InMemoryJobRepository {
    fn insert(&self, job: JobPosting) -> Result<JobPosting, RepositoryError> {
        let mut guard = lock(&self.jobs, "job store")?;
        if guard.contains_key(&job.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    fn update(&self, job: JobPosting) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.jobs, "job store")?;
        match guard.get_mut(&job.id) {
            Some(slot) => {
                // The counter belongs to the lifecycle manager; edits never overwrite it.
                let applications_count = slot.applications_count;
                *slot = JobPosting {
                    applications_count,
                    ..job
                };
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &JobId) -> Result<Option<JobPosting>, RepositoryError> {
        let guard = lock(&self.jobs, "job store")?;
        Ok(guard.get(id).cloned())
    }

    fn delete(&self, id: &JobId) -> Result<JobPosting, RepositoryError> {
        let mut guard = lock(&self.jobs, "job store")?;
        guard.remove(id).ok_or(RepositoryError::NotFound)
    }

    fn all(&self) -> Result<Vec<JobPosting>, RepositoryError> {
        let guard = lock(&self.jobs, "job store")?;
        Ok(guard.values().cloned().collect())
    }

    fn adjust_applications(&self, id: &JobId, delta: i32) -> Result<JobPosting, RepositoryError> {
        let mut guard = lock(&self.jobs, "job store")?;
        let job = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        job.applications_count = job.applications_count.saturating_add_signed(delta);
        Ok(job.clone())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl InMemoryApplicationRepository {
    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(lock(&self.records, "application store")?.len())
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.len()? == 0)
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = lock(&self.records, "application store")?;
        let pair_taken = guard.values().any(|existing| {
            existing.job_id == record.job_id && existing.applicant == record.applicant
        });
        if pair_taken || guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(
        &self,
        record: ApplicationRecord,
        expected_version: u64,
    ) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records, "application store")?;
        match guard.get_mut(&record.id) {
            Some(slot) if slot.version == expected_version => {
                *slot = record;
                Ok(())
            }
            Some(_) => Err(RepositoryError::Conflict),
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = lock(&self.records, "application store")?;
        Ok(guard.get(id).cloned())
    }

    fn find_by_pair(
        &self,
        job_id: &JobId,
        applicant: &ActorId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = lock(&self.records, "application store")?;
        Ok(guard
            .values()
            .find(|record| &record.job_id == job_id && &record.applicant == applicant)
            .cloned())
    }

    fn delete(
        &self,
        id: &ApplicationId,
        expected_version: u64,
    ) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = lock(&self.records, "application store")?;
        match guard.get(id) {
            Some(stored) if stored.version == expected_version => {
                guard.remove(id).ok_or(RepositoryError::NotFound)
            }
            Some(_) => Err(RepositoryError::Conflict),
            None => Err(RepositoryError::NotFound),
        }
    }

    fn for_job(&self, job_id: &JobId) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = lock(&self.records, "application store")?;
        Ok(guard
            .values()
            .filter(|record| &record.job_id == job_id)
            .cloned()
            .collect())
    }

    fn for_applicant(
        &self,
        applicant: &ActorId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = lock(&self.records, "application store")?;
        Ok(guard
            .values()
            .filter(|record| &record.applicant == applicant)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portal::applications::{ApplicationSubmission, PersonalInfo};
    use chrono::{TimeZone, Utc};

    fn stored_record(store: &InMemoryApplicationRepository) -> ApplicationRecord {
        let submission = ApplicationSubmission {
            personal_info: PersonalInfo {
                full_name: "Ana Ribeiro".to_string(),
                email: "ana@example.com".to_string(),
                phone: None,
            },
            documents: Default::default(),
            answers: Vec::new(),
        };
        let now = Utc
            .with_ymd_and_hms(2025, 4, 14, 10, 0, 0)
            .single()
            .expect("valid timestamp");
        store
            .insert(ApplicationRecord::new(
                ApplicationId("app-1".to_string()),
                JobId("job-1".to_string()),
                ActorId::new("seeker-ana"),
                submission,
                now,
            ))
            .expect("record stored")
    }

    #[test]
    fn delete_checks_the_stored_version() {
        let store = InMemoryApplicationRepository::default();
        let record = stored_record(&store);

        assert!(matches!(
            store.delete(&record.id, record.version + 1),
            Err(RepositoryError::Conflict)
        ));
        assert_eq!(store.len().expect("store readable"), 1);

        let removed = store.delete(&record.id, record.version).expect("deleted");
        assert_eq!(removed.id, record.id);
        assert!(matches!(
            store.delete(&record.id, record.version),
            Err(RepositoryError::NotFound)
        ));
    }
}
