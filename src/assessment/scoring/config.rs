use serde::{Deserialize, Serialize};

/// Certification and recommendation thresholds on the 0-100 overall scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub gold_threshold: f64,
    pub certified_threshold: f64,
    /// Pillars averaging below this receive an improvement recommendation.
    pub improvement_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            gold_threshold: 80.0,
            certified_threshold: 60.0,
            improvement_threshold: 60.0,
        }
    }
}
