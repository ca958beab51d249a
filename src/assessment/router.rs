use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::catalog::IndicatorMetadata;
use super::domain::{ApplicationId, FormData};
use super::evidence::{validate_evidence, EvidenceBundle};
use super::repository::{AuditRepository, RepositoryError};
use super::service::{CertificationService, CertificationServiceError};

/// Router builder exposing scoring, catalog, and audit-trail endpoints.
pub fn certification_router<R>(service: Arc<CertificationService<R>>) -> Router
where
    R: AuditRepository + 'static,
{
    Router::new()
        .route("/api/v1/assessments/score", post(score_handler::<R>))
        .route(
            "/api/v1/assessments/evidence/validate",
            post(validate_evidence_handler),
        )
        .route("/api/v1/catalog/indicators", get(catalog_handler::<R>))
        .route(
            "/api/v1/applications/:application_id/scores",
            post(submit_handler::<R>).get(history_handler::<R>),
        )
        .route(
            "/api/v1/applications/:application_id/scores/latest",
            get(latest_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn score_handler<R>(
    State(service): State<Arc<CertificationService<R>>>,
    axum::Json(form): axum::Json<FormData>,
) -> Response
where
    R: AuditRepository + 'static,
{
    let result = service.score(&form);
    (StatusCode::OK, axum::Json(result)).into_response()
}

pub(crate) async fn validate_evidence_handler(
    axum::Json(bundle): axum::Json<EvidenceBundle>,
) -> Response {
    let payload = json!({ "valid": validate_evidence(&bundle) });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn catalog_handler<R>(
    State(service): State<Arc<CertificationService<R>>>,
) -> Response
where
    R: AuditRepository + 'static,
{
    let indicators: Vec<IndicatorMetadata> =
        service.catalog().indicators().into_iter().cloned().collect();
    (StatusCode::OK, axum::Json(indicators)).into_response()
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<CertificationService<R>>>,
    Path(application_id): Path<String>,
    axum::Json(form): axum::Json<FormData>,
) -> Response
where
    R: AuditRepository + 'static,
{
    match service.submit(ApplicationId(application_id), form) {
        Ok(audit) => (StatusCode::CREATED, axum::Json(audit)).into_response(),
        Err(CertificationServiceError::Submission(violation)) => {
            let payload = json!({
                "error": violation.to_string(),
                "issues": violation
                    .issues()
                    .iter()
                    .map(|issue| json!({
                        "pillar": issue.pillar,
                        "indicator": issue.indicator,
                        "problem": issue.problem,
                        "message": issue.to_string(),
                    }))
                    .collect::<Vec<_>>(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn history_handler<R>(
    State(service): State<Arc<CertificationService<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: AuditRepository + 'static,
{
    match service.history(&ApplicationId(application_id)) {
        Ok(audits) => (StatusCode::OK, axum::Json(audits)).into_response(),
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn latest_handler<R>(
    State(service): State<Arc<CertificationService<R>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: AuditRepository + 'static,
{
    let id = ApplicationId(application_id);
    match service.latest(&id) {
        Ok(audit) => (StatusCode::OK, axum::Json(audit)).into_response(),
        Err(CertificationServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "error": format!("no score recorded for application {id}"),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

fn internal_error(error: CertificationServiceError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
