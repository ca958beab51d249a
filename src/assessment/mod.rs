//! Innovation-maturity assessment: indicator catalog, scoring engine, submission checks,
//! and the audit-trail service and router built around them.

pub mod cache;
pub mod catalog;
pub mod domain;
pub mod evidence;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use cache::{form_digest, CacheConfig, FormDigest, ScoreCache};
pub use catalog::{
    CatalogError, EvidencePolicy, IndicatorCatalog, IndicatorLookup, IndicatorMetadata,
    MeasurementUnit, SubPillarDefinition,
};
pub use domain::{
    ApplicationId, FormData, IndicatorId, IndicatorMap, IndicatorResponse, PillarId, RawValue,
};
pub use evidence::{
    is_absolute_url, validate_evidence, EvidenceBundle, FileEvidence, LinkEvidence, TextEvidence,
};
pub use repository::{AuditRepository, AuditSummary, RepositoryError, ScoreAudit};
pub use router::certification_router;
pub use scoring::{
    is_evidence_required, normalize, normalize_value, CertificationLevel, IndicatorResult,
    MaturityTier, OverallResult, PillarScore, ScoringConfig, ScoringEngine, SubPillarScore,
};
pub use service::{CertificationService, CertificationServiceError};
pub use validation::{
    EvidenceIssue, EvidencePolicyLimits, EvidenceProblem, SubmissionGuard, SubmissionViolation,
};
