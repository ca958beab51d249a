mod certification;
mod config;
mod normalization;
mod recommendations;

use std::sync::Arc;

pub use certification::{classify, CertificationLevel, MaturityTier};
pub use config::ScoringConfig;
pub use normalization::{normalize, normalize_value, DEFAULT_MAX_SCORE, FULL_TIME_HOURS};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::catalog::{IndicatorCatalog, IndicatorLookup};
use super::domain::{FormData, IndicatorId, IndicatorMap, PillarId, RawValue};
use super::evidence::validate_evidence;

/// Whether the answer given for `id` has to be substantiated.
///
/// Unknown indicators and unanswered values never require evidence.
pub fn is_evidence_required(
    lookup: &dyn IndicatorLookup,
    id: &IndicatorId,
    value: Option<&RawValue>,
) -> bool {
    let Some(value) = value.filter(|value| !value.is_missing()) else {
        return false;
    };
    lookup
        .metadata(id)
        .is_some_and(|metadata| metadata.evidence.requires(value))
}

/// Stateless evaluator mapping raw indicator answers to pillar and overall scores.
#[derive(Clone)]
pub struct ScoringEngine {
    lookup: Arc<dyn IndicatorLookup>,
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(lookup: Arc<dyn IndicatorLookup>, config: ScoringConfig) -> Self {
        Self { lookup, config }
    }

    /// Engine over the built-in framework with default thresholds.
    pub fn standard() -> Self {
        Self::new(Arc::new(IndicatorCatalog::standard()), ScoringConfig::default())
    }

    pub fn catalog(&self) -> &dyn IndicatorLookup {
        self.lookup.as_ref()
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn is_evidence_required(&self, id: &IndicatorId, value: Option<&RawValue>) -> bool {
        is_evidence_required(self.lookup.as_ref(), id, value)
    }

    pub fn process_pillar_data(&self, pillar: PillarId, indicators: &IndicatorMap) -> PillarScore {
        let lookup = self.lookup.as_ref();

        let results: Vec<IndicatorResult> = indicators
            .iter()
            .map(|(id, response)| {
                let value = response.answered_value();
                IndicatorResult {
                    id: id.clone(),
                    normalized_score: normalize(lookup, id, value),
                    has_evidence: response.evidence.as_ref().is_some_and(validate_evidence),
                    evidence_required: is_evidence_required(lookup, id, value),
                }
            })
            .collect();

        let average_score = mean(results.iter().map(|result| result.normalized_score));

        let sub_pillars = lookup
            .sub_pillars(pillar)
            .iter()
            .map(|group| {
                let answered: Vec<f64> = results
                    .iter()
                    .filter(|result| group.indicators.contains(&result.id))
                    .filter(|result| {
                        indicators
                            .get(&result.id)
                            .and_then(|response| response.answered_value())
                            .is_some()
                    })
                    .map(|result| result.normalized_score)
                    .collect();
                SubPillarScore {
                    code: group.code.clone(),
                    name: group.name.clone(),
                    average_score: mean(answered.iter().copied()),
                    answered: answered.len(),
                }
            })
            .collect();

        debug!(
            pillar = pillar.number(),
            indicators = results.len(),
            average_score,
            "pillar scored"
        );

        PillarScore {
            id: pillar,
            name: pillar.name().to_string(),
            average_score,
            sub_pillars,
            indicators: results,
        }
    }

    pub fn process_form_data(&self, form: &FormData) -> OverallResult {
        let empty = IndicatorMap::new();
        let pillars: Vec<PillarScore> = PillarId::ALL
            .into_iter()
            .map(|pillar| self.process_pillar_data(pillar, form.pillar(pillar).unwrap_or(&empty)))
            .collect();

        // Every pillar contributes, including the empty ones.
        let overall_score = pillars
            .iter()
            .map(|pillar| pillar.average_score)
            .sum::<f64>()
            / PillarId::COUNT as f64;

        let (certification_level, maturity_tier) = classify(overall_score, &self.config);
        let recommendations = recommendations::recommend(&pillars, &self.config);

        debug!(
            overall_score,
            certification = certification_level.label(),
            maturity = maturity_tier.label(),
            recommendations = recommendations.len(),
            "assessment scored"
        );

        OverallResult {
            overall_score,
            pillars,
            certification_level,
            maturity_tier,
            recommendations,
        }
    }
}

fn mean(scores: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = scores.fold((0.0, 0usize), |(sum, count), score| (sum + score, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Normalized outcome for one answered indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorResult {
    pub id: IndicatorId,
    pub normalized_score: f64,
    pub has_evidence: bool,
    pub evidence_required: bool,
}

/// Informational sub-pillar roll-up; does not feed the pillar average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubPillarScore {
    pub code: String,
    pub name: String,
    pub average_score: f64,
    pub answered: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PillarScore {
    pub id: PillarId,
    pub name: String,
    pub average_score: f64,
    pub sub_pillars: Vec<SubPillarScore>,
    pub indicators: Vec<IndicatorResult>,
}

/// Full engine output for one assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallResult {
    pub overall_score: f64,
    pub pillars: Vec<PillarScore>,
    pub certification_level: CertificationLevel,
    pub maturity_tier: MaturityTier,
    pub recommendations: Vec<String>,
}

impl OverallResult {
    pub fn pillar(&self, pillar: PillarId) -> Option<&PillarScore> {
        self.pillars.iter().find(|score| score.id == pillar)
    }

    /// True when nothing scored at all. Callers decide whether that means an incomplete submission.
    pub fn is_blank(&self) -> bool {
        self.pillars.iter().all(|pillar| pillar.average_score == 0.0)
    }
}
