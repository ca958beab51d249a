//! Single source of truth for turning an overall score into tiers.
//!
//! The persisted decision uses the three-tier `CertificationLevel`; dashboards show the
//! five-tier `MaturityTier`. Both are derived here from the same score so callers never
//! duplicate threshold logic.

use serde::{Deserialize, Serialize};

use super::config::ScoringConfig;

/// Certification decision recorded against an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CertificationLevel {
    #[serde(rename = "Gold")]
    Gold,
    #[serde(rename = "Certified")]
    Certified,
    #[serde(rename = "Not Certified")]
    NotCertified,
}

impl CertificationLevel {
    pub fn for_score(score: f64, config: &ScoringConfig) -> Self {
        if score >= config.gold_threshold {
            Self::Gold
        } else if score >= config.certified_threshold {
            Self::Certified
        } else {
            Self::NotCertified
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CertificationLevel::Gold => "Gold",
            CertificationLevel::Certified => "Certified",
            CertificationLevel::NotCertified => "Not Certified",
        }
    }

    pub const fn is_certified(self) -> bool {
        !matches!(self, CertificationLevel::NotCertified)
    }
}

/// Five-step maturity scale used for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MaturityTier {
    Initiating,
    Developing,
    Structured,
    Optimizing,
    Leading,
}

impl MaturityTier {
    pub fn for_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::Leading
        } else if score >= 80.0 {
            Self::Optimizing
        } else if score >= 70.0 {
            Self::Structured
        } else if score >= 60.0 {
            Self::Developing
        } else {
            Self::Initiating
        }
    }

    pub const fn stars(self) -> u8 {
        match self {
            MaturityTier::Leading => 5,
            MaturityTier::Optimizing => 4,
            MaturityTier::Structured => 3,
            MaturityTier::Developing => 2,
            MaturityTier::Initiating => 1,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            MaturityTier::Leading => "Leading",
            MaturityTier::Optimizing => "Optimizing",
            MaturityTier::Structured => "Structured",
            MaturityTier::Developing => "Developing",
            MaturityTier::Initiating => "Initiating",
        }
    }
}

/// Both tiers for one overall score.
pub fn classify(score: f64, config: &ScoringConfig) -> (CertificationLevel, MaturityTier) {
    (
        CertificationLevel::for_score(score, config),
        MaturityTier::for_score(score),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certification_boundaries() {
        let config = ScoringConfig::default();
        assert_eq!(
            CertificationLevel::for_score(80.0, &config),
            CertificationLevel::Gold
        );
        assert_eq!(
            CertificationLevel::for_score(79.9, &config),
            CertificationLevel::Certified
        );
        assert_eq!(
            CertificationLevel::for_score(60.0, &config),
            CertificationLevel::Certified
        );
        assert_eq!(
            CertificationLevel::for_score(59.9, &config),
            CertificationLevel::NotCertified
        );
        assert_eq!(
            CertificationLevel::for_score(0.0, &config),
            CertificationLevel::NotCertified
        );
    }

    #[test]
    fn maturity_boundaries_and_stars() {
        let cases = [
            (95.0, MaturityTier::Leading, 5),
            (90.0, MaturityTier::Leading, 5),
            (89.99, MaturityTier::Optimizing, 4),
            (70.0, MaturityTier::Structured, 3),
            (60.0, MaturityTier::Developing, 2),
            (12.5, MaturityTier::Initiating, 1),
        ];
        for (score, tier, stars) in cases {
            assert_eq!(MaturityTier::for_score(score), tier, "score {score}");
            assert_eq!(tier.stars(), stars);
        }
    }

    #[test]
    fn level_serializes_with_display_names() {
        assert_eq!(
            serde_json::to_string(&CertificationLevel::NotCertified).unwrap(),
            "\"Not Certified\""
        );
        assert_eq!(
            serde_json::to_string(&CertificationLevel::Gold).unwrap(),
            "\"Gold\""
        );
    }

    #[test]
    fn classify_respects_configured_thresholds() {
        let strict = ScoringConfig {
            gold_threshold: 90.0,
            certified_threshold: 75.0,
            improvement_threshold: 75.0,
        };
        let (level, tier) = classify(85.0, &strict);
        assert_eq!(level, CertificationLevel::Certified);
        assert_eq!(tier, MaturityTier::Optimizing);
    }
}
