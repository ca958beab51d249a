use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::info;

use super::cache::{form_digest, CacheConfig, FormDigest, ScoreCache};
use super::catalog::IndicatorLookup;
use super::domain::{ApplicationId, FormData};
use super::repository::{AuditRepository, RepositoryError, ScoreAudit};
use super::scoring::{OverallResult, ScoringEngine};
use super::validation::{SubmissionGuard, SubmissionViolation};

/// Service composing the submission guard, cached scoring engine, and audit trail.
pub struct CertificationService<R> {
    engine: Arc<ScoringEngine>,
    guard: SubmissionGuard,
    repository: Arc<R>,
    cache: Mutex<ScoreCache>,
}

static AUDIT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_audit_id() -> String {
    let id = AUDIT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("audit-{id:06}")
}

impl<R> CertificationService<R>
where
    R: AuditRepository + 'static,
{
    pub fn new(engine: Arc<ScoringEngine>, repository: Arc<R>, cache: CacheConfig) -> Self {
        Self::with_guard(SubmissionGuard::default(), engine, repository, cache)
    }

    pub fn with_guard(
        guard: SubmissionGuard,
        engine: Arc<ScoringEngine>,
        repository: Arc<R>,
        cache: CacheConfig,
    ) -> Self {
        Self {
            engine,
            guard,
            repository,
            cache: Mutex::new(ScoreCache::new(cache)),
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn catalog(&self) -> &dyn IndicatorLookup {
        self.engine.catalog()
    }

    /// Score a form without recording it.
    /// Number of engine results currently held in the cache.
    pub fn cached_results(&self) -> usize {
        self.cache().len()
    }

    pub fn score(&self, form: &FormData) -> OverallResult {
        self.score_at(form, Utc::now())
    }

    pub fn score_at(&self, form: &FormData, now: DateTime<Utc>) -> OverallResult {
        self.score_with_digest(form, &form_digest(form), now)
    }

    fn score_with_digest(
        &self,
        form: &FormData,
        digest: &FormDigest,
        now: DateTime<Utc>,
    ) -> OverallResult {
        if let Some(cached) = self.cache().get(digest, now) {
            return cached;
        }

        let result = self.engine.process_form_data(form);
        self.cache().insert(digest.clone(), result.clone(), now);
        result
    }

    /// Validate, score, and append an audit row for the application.
    pub fn submit(
        &self,
        application_id: ApplicationId,
        form: FormData,
    ) -> Result<ScoreAudit, CertificationServiceError> {
        self.guard.review(self.engine.catalog(), &form)?;

        let calculated_at = Utc::now();
        let digest = form_digest(&form);
        let result = self.score_with_digest(&form, &digest, calculated_at);
        let audit = ScoreAudit {
            audit_id: next_audit_id(),
            application_id,
            calculated_at,
            input_digest: digest,
            result,
        };

        let stored = self.repository.record(audit)?;
        info!(
            application_id = %stored.application_id,
            audit_id = %stored.audit_id,
            overall_score = stored.result.overall_score,
            certification = stored.result.certification_level.label(),
            "score audit recorded"
        );
        Ok(stored)
    }

    pub fn history(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Vec<ScoreAudit>, CertificationServiceError> {
        Ok(self.repository.history(application_id)?)
    }

    pub fn latest(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ScoreAudit, CertificationServiceError> {
        let audit = self
            .repository
            .latest(application_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(audit)
    }

    fn cache(&self) -> MutexGuard<'_, ScoreCache> {
        // A panic mid-update leaves at worst a stale entry, so keep serving.
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Error raised by the certification service.
#[derive(Debug, thiserror::Error)]
pub enum CertificationServiceError {
    #[error(transparent)]
    Submission(#[from] SubmissionViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
