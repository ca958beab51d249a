use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::assessment::cache::CacheConfig;
use crate::assessment::domain::{ApplicationId, FormData, IndicatorResponse, PillarId};
use crate::assessment::evidence::{EvidenceBundle, FileEvidence};
use crate::assessment::repository::{AuditRepository, RepositoryError, ScoreAudit};
use crate::assessment::scoring::ScoringEngine;
use crate::assessment::certification_router;
use crate::assessment::service::CertificationService;

pub(super) fn pillar(number: u8) -> PillarId {
    PillarId::new(number).expect("valid pillar")
}

pub(super) fn engine() -> Arc<ScoringEngine> {
    Arc::new(ScoringEngine::standard())
}

/// The single-indicator example: 1.1.1 answered with 75 percent.
pub(super) fn single_percentage_form() -> FormData {
    let mut form = FormData::new();
    form.insert(pillar(1), "1.1.1", IndicatorResponse::new(75.0));
    form
}

/// Same answer as above with the required evidence attached.
pub(super) fn documented_percentage_form() -> FormData {
    let mut form = FormData::new();
    form.insert(
        pillar(1),
        "1.1.1",
        IndicatorResponse::new(75.0).with_evidence(EvidenceBundle::text("Annual plan, section 2")),
    );
    form
}

/// Every pillar answered, all required evidence attached.
pub(super) fn complete_form() -> FormData {
    let mut form = FormData::new();
    form.insert(
        pillar(1),
        "1.1.1",
        IndicatorResponse::new(80.0).with_evidence(EvidenceBundle::text("Strategy deck 2024, slide 4")),
    )
    .insert(
        pillar(1),
        "1.1.2",
        IndicatorResponse::new(true).with_evidence(EvidenceBundle::link(
            "https://intranet.example.org/strategy.pdf",
            "Board minutes",
        )),
    )
    .insert(pillar(2), "2.2.3", IndicatorResponse::new(4.0))
    .insert(pillar(3), "3.2.1", IndicatorResponse::new(8.0))
    .insert(pillar(4), "4.2.2", IndicatorResponse::new(0.9))
    .insert(pillar(5), "5.2.2", IndicatorResponse::new(30.0))
    .insert(
        pillar(6),
        "6.2.2",
        IndicatorResponse::new(9.0).with_evidence(EvidenceBundle::file(FileEvidence {
            file_name: "survey-results.pdf".to_string(),
            file_size: Some(120_000),
            file_type: None,
            file_url: Some("https://files.example.org/survey-results.pdf".to_string()),
            description: "Customer survey".to_string(),
        })),
    );
    form
}

/// Answers 1.1.2 with "yes" but attaches nothing.
pub(super) fn missing_evidence_form() -> FormData {
    let mut form = FormData::new();
    form.insert(pillar(1), "1.1.2", IndicatorResponse::new("yes"));
    form
}

pub(super) fn service_with<R: AuditRepository + 'static>(
    repository: Arc<R>,
) -> CertificationService<R> {
    CertificationService::new(engine(), repository, CacheConfig::default())
}

pub(super) fn application_id(value: &str) -> ApplicationId {
    ApplicationId(value.to_string())
}

#[derive(Default)]
pub(super) struct MemoryAuditRepository {
    audits: Mutex<BTreeMap<ApplicationId, Vec<ScoreAudit>>>,
}

impl MemoryAuditRepository {
    pub(super) fn total(&self) -> usize {
        self.audits
            .lock()
            .expect("audit mutex poisoned")
            .values()
            .map(Vec::len)
            .sum()
    }
}

impl AuditRepository for MemoryAuditRepository {
    fn record(&self, audit: ScoreAudit) -> Result<ScoreAudit, RepositoryError> {
        self.audits
            .lock()
            .expect("audit mutex poisoned")
            .entry(audit.application_id.clone())
            .or_default()
            .push(audit.clone());
        Ok(audit)
    }

    fn history(&self, application_id: &ApplicationId) -> Result<Vec<ScoreAudit>, RepositoryError> {
        Ok(self
            .audits
            .lock()
            .expect("audit mutex poisoned")
            .get(application_id)
            .cloned()
            .unwrap_or_default())
    }

    fn latest(&self, application_id: &ApplicationId) -> Result<Option<ScoreAudit>, RepositoryError> {
        Ok(self
            .audits
            .lock()
            .expect("audit mutex poisoned")
            .get(application_id)
            .and_then(|audits| audits.last().cloned()))
    }
}

pub(super) struct UnavailableRepository;

impl AuditRepository for UnavailableRepository {
    fn record(&self, _audit: ScoreAudit) -> Result<ScoreAudit, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn history(&self, _application_id: &ApplicationId) -> Result<Vec<ScoreAudit>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn latest(&self, _application_id: &ApplicationId) -> Result<Option<ScoreAudit>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_memory() -> (axum::Router, Arc<MemoryAuditRepository>) {
    let repository = Arc::new(MemoryAuditRepository::default());
    let service = service_with(repository.clone());
    (certification_router(Arc::new(service)), repository)
}
