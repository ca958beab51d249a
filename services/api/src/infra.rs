use innovation_cert::assessment::{
    ApplicationId, AuditRepository, FormData, IndicatorCatalog, RepositoryError, ScoreAudit,
    ScoringEngine,
};
use innovation_cert::config::CertificationConfig;
use innovation_cert::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAuditRepository {
    audits: Arc<Mutex<HashMap<ApplicationId, Vec<ScoreAudit>>>>,
}

impl InMemoryAuditRepository {
    fn guard(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<ApplicationId, Vec<ScoreAudit>>>, RepositoryError>
    {
        self.audits
            .lock()
            .map_err(|_| RepositoryError::Unavailable("audit store poisoned".to_string()))
    }
}

impl AuditRepository for InMemoryAuditRepository {
    fn record(&self, audit: ScoreAudit) -> Result<ScoreAudit, RepositoryError> {
        let mut guard = self.guard()?;
        guard
            .entry(audit.application_id.clone())
            .or_default()
            .push(audit.clone());
        Ok(audit)
    }

    fn history(&self, application_id: &ApplicationId) -> Result<Vec<ScoreAudit>, RepositoryError> {
        let guard = self.guard()?;
        Ok(guard.get(application_id).cloned().unwrap_or_default())
    }

    fn latest(&self, application_id: &ApplicationId) -> Result<Option<ScoreAudit>, RepositoryError> {
        let guard = self.guard()?;
        Ok(guard
            .get(application_id)
            .and_then(|audits| audits.last().cloned()))
    }
}

/// Build the engine from configuration: a CSV catalog when one is given, the built-in one otherwise.
pub(crate) fn load_engine(
    config: &CertificationConfig,
    catalog_override: Option<PathBuf>,
) -> Result<ScoringEngine, AppError> {
    let catalog = match catalog_override.or_else(|| config.catalog_path.clone()) {
        Some(path) => {
            let catalog = IndicatorCatalog::from_path(&path)?;
            info!(path = %path.display(), indicators = catalog.len(), "loaded indicator catalog");
            catalog
        }
        None => IndicatorCatalog::standard(),
    };

    let uncovered = catalog.uncovered_pillars();
    if !uncovered.is_empty() {
        warn!(
            ?uncovered,
            "indicator catalog leaves pillars without indicators; they will always score 0"
        );
    }

    Ok(ScoringEngine::new(Arc::new(catalog), config.scoring))
}

pub(crate) fn read_form(path: &Path) -> Result<FormData, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let form = serde_json::from_str(&raw)?;
    Ok(form)
}
