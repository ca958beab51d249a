use crate::infra::{load_engine, read_form, InMemoryAuditRepository};
use clap::Args;
use innovation_cert::assessment::{
    ApplicationId, CertificationService, CertificationServiceError, EvidenceBundle, FileEvidence,
    FormData, IndicatorLookup, IndicatorResponse, OverallResult, PillarId,
};
use innovation_cert::config::{AppConfig, CertificationConfig};
use innovation_cert::error::AppError;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Assessment JSON keyed pillar_1..pillar_6
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Indicator catalog CSV (defaults to CERT_CATALOG_PATH or the built-in framework)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Print the raw result JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogArgs {
    /// Indicator catalog CSV (defaults to CERT_CATALOG_PATH or the built-in framework)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Application identifier used for the recorded audits
    #[arg(long, default_value = "demo-institution")]
    pub(crate) application_id: String,
    /// Skip the audit-trail portion of the demo
    #[arg(long)]
    pub(crate) skip_submission: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let engine = load_engine(&config.certification, args.catalog)?;
    let form = read_form(&args.input)?;

    let result = engine.process_form_data(&form);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render_result(&result);
    }
    Ok(())
}

pub(crate) fn run_catalog(args: CatalogArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let engine = load_engine(&config.certification, args.catalog)?;
    let catalog = engine.catalog();

    for pillar in PillarId::ALL {
        println!("Pillar {} - {}", pillar, pillar.name());
        for group in catalog.sub_pillars(pillar) {
            println!("  {} {}", group.code, group.name);
            for id in &group.indicators {
                if let Some(metadata) = catalog.metadata(id) {
                    let ceiling = metadata
                        .max_score
                        .map(|max| format!(" (max {max})"))
                        .unwrap_or_default();
                    println!(
                        "    {} {} [{}{}] evidence: {}",
                        metadata.id,
                        metadata.name,
                        metadata.unit.label(),
                        ceiling,
                        metadata.evidence
                    );
                }
            }
        }
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        application_id,
        skip_submission,
    } = args;

    let certification = CertificationConfig::default();
    let engine = Arc::new(load_engine(&certification, None)?);
    let repository = Arc::new(InMemoryAuditRepository::default());
    let service = CertificationService::new(engine, repository, certification.cache);

    println!("Innovation certification demo");
    let form = demo_form(true);
    let result = service.score(&form);
    render_result(&result);

    if skip_submission {
        return Ok(());
    }

    let application = ApplicationId(application_id);
    println!("\nAudit trail for {application}");

    match service.submit(application.clone(), demo_form(false)) {
        Ok(audit) => println!("  Unexpectedly accepted draft as {}", audit.audit_id),
        Err(err) => {
            println!("  Draft rejected: {err}");
            if let CertificationServiceError::Submission(violation) = &err {
                for issue in violation.issues() {
                    println!("    - {issue}");
                }
            }
        }
    }

    let audit = match service.submit(application.clone(), form) {
        Ok(audit) => audit,
        Err(err) => {
            println!("  Submission rejected: {err}");
            return Ok(());
        }
    };
    println!(
        "- Recorded {} at {} -> {} ({:.1})",
        audit.audit_id,
        audit.calculated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        audit.result.certification_level.label(),
        audit.result.overall_score
    );
    println!("  Input digest: {}", audit.input_digest);

    match service.history(&application) {
        Ok(history) => {
            let summaries: Vec<_> = history.iter().map(|audit| audit.summary()).collect();
            match serde_json::to_string_pretty(&summaries) {
                Ok(json) => println!("  Stored history:\n{json}"),
                Err(err) => println!("  Stored history unavailable: {err}"),
            }
        }
        Err(err) => println!("  Repository unavailable: {err}"),
    }

    Ok(())
}

fn render_result(result: &OverallResult) {
    println!(
        "Overall score {:.1} -> {} | maturity {} ({} stars)",
        result.overall_score,
        result.certification_level.label(),
        result.maturity_tier.label(),
        result.maturity_tier.stars()
    );
    for pillar in &result.pillars {
        println!(
            "- Pillar {} {}: {:.1} ({} indicators)",
            pillar.id,
            pillar.name,
            pillar.average_score,
            pillar.indicators.len()
        );
        for group in pillar.sub_pillars.iter().filter(|group| group.answered > 0) {
            println!(
                "    {} {}: {:.1} over {} answered",
                group.code, group.name, group.average_score, group.answered
            );
        }
    }
    if result.recommendations.is_empty() {
        println!("Recommendations: none");
    } else {
        println!("Recommendations:");
        for line in &result.recommendations {
            println!("  - {line}");
        }
    }
}

/// Sample assessment; `with_evidence` controls whether claims are substantiated.
fn demo_form(with_evidence: bool) -> FormData {
    let attach = |response: IndicatorResponse, evidence: EvidenceBundle| {
        if with_evidence {
            response.with_evidence(evidence)
        } else {
            response
        }
    };

    let pillar = |number: usize| PillarId::ALL[number - 1];
    let mut form = FormData::new();
    form.insert(
        pillar(1),
        "1.1.1",
        attach(
            IndicatorResponse::new(70.0),
            EvidenceBundle::text("Seven of ten strategic objectives carry innovation KPIs"),
        ),
    )
    .insert(
        pillar(1),
        "1.1.2",
        attach(
            IndicatorResponse::new("yes"),
            EvidenceBundle::link(
                "https://intranet.example.org/innovation-strategy",
                "Strategy approved by the board",
            ),
        ),
    )
    .insert(pillar(2), "2.1.1", IndicatorResponse::new(45.0))
    .insert(pillar(2), "2.2.3", IndicatorResponse::new(4.0))
    .insert(pillar(3), "3.2.1", IndicatorResponse::new(6.0))
    .insert(pillar(3), "3.2.3", IndicatorResponse::new(3.0))
    .insert(pillar(4), "4.2.2", IndicatorResponse::new(0.75))
    .insert(pillar(5), "5.2.2", IndicatorResponse::new(12.0))
    .insert(
        pillar(6),
        "6.2.2",
        attach(
            IndicatorResponse::new(8.0),
            EvidenceBundle::file(FileEvidence {
                file_name: "stakeholder-survey-2024.pdf".to_string(),
                file_size: Some(482_133),
                file_type: None,
                file_url: Some("https://files.example.org/stakeholder-survey-2024.pdf".to_string()),
                description: "Annual stakeholder survey".to_string(),
            }),
        ),
    );
    form
}

#[cfg(test)]
mod tests {
    use super::*;
    use innovation_cert::assessment::{CacheConfig, ScoringEngine};

    #[test]
    fn demo_form_passes_review_only_with_evidence() {
        let service = CertificationService::new(
            Arc::new(ScoringEngine::standard()),
            Arc::new(InMemoryAuditRepository::default()),
            CacheConfig::default(),
        );
        let application = ApplicationId("demo".to_string());

        assert!(service.submit(application.clone(), demo_form(false)).is_err());
        let audit = service
            .submit(application.clone(), demo_form(true))
            .expect("documented form accepted");
        assert_eq!(audit.result.pillars.len(), 6);
        assert_eq!(service.history(&application).expect("history").len(), 1);
    }
}
