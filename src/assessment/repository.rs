use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cache::FormDigest;
use super::domain::ApplicationId;
use super::scoring::{CertificationLevel, OverallResult};

/// One persisted calculation, carrying a full copy of the computed structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreAudit {
    pub audit_id: String,
    pub application_id: ApplicationId,
    pub calculated_at: DateTime<Utc>,
    pub input_digest: FormDigest,
    pub result: OverallResult,
}

impl ScoreAudit {
    pub fn certification_level(&self) -> CertificationLevel {
        self.result.certification_level
    }

    pub fn summary(&self) -> AuditSummary {
        AuditSummary {
            audit_id: self.audit_id.clone(),
            application_id: self.application_id.clone(),
            calculated_at: self.calculated_at,
            overall_score: self.result.overall_score,
            certification_level: self.result.certification_level,
        }
    }
}

/// Compact listing row for an application's scoring history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    pub audit_id: String,
    pub application_id: ApplicationId,
    pub calculated_at: DateTime<Utc>,
    pub overall_score: f64,
    pub certification_level: CertificationLevel,
}

/// Storage abstraction for the score audit trail.
///
/// `record` must make the whole audit visible at once or not at all.
pub trait AuditRepository: Send + Sync {
    fn record(&self, audit: ScoreAudit) -> Result<ScoreAudit, RepositoryError>;
    /// Audits for the application, oldest first.
    fn history(&self, application_id: &ApplicationId) -> Result<Vec<ScoreAudit>, RepositoryError>;
    fn latest(&self, application_id: &ApplicationId) -> Result<Option<ScoreAudit>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
