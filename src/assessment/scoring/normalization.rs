use crate::assessment::catalog::{IndicatorLookup, MeasurementUnit};
use crate::assessment::domain::{IndicatorId, RawValue};

/// Ceiling for `Score` indicators that do not declare one.
pub const DEFAULT_MAX_SCORE: f64 = 5.0;
/// Weekly hours treated as full marks for `Hours` indicators.
pub const FULL_TIME_HOURS: f64 = 40.0;

/// Map a raw answer onto the common 0-100 scale. Unknown indicators score 0.
pub fn normalize(lookup: &dyn IndicatorLookup, id: &IndicatorId, value: Option<&RawValue>) -> f64 {
    let Some(value) = value.filter(|value| !value.is_missing()) else {
        return 0.0;
    };

    match lookup.metadata(id) {
        Some(metadata) => normalize_value(metadata.unit, metadata.max_score, value),
        None => 0.0,
    }
}

/// `Binary` answers score 100 when truthy. Beyond numbers and booleans, the text spellings
/// `yes`/`y`/`true` count as truthy; other non-numeric text scores 0.
pub fn normalize_value(unit: MeasurementUnit, max_score: Option<f64>, value: &RawValue) -> f64 {
    if value.is_missing() {
        return 0.0;
    }

    let score = match (unit, value.as_number()) {
        // Text spellings are accepted alongside numeric truthiness.
        (MeasurementUnit::Binary, _) => {
            if value.as_flag() == Some(true) {
                100.0
            } else {
                0.0
            }
        }
        (_, None) => return 0.0,
        (MeasurementUnit::Score, Some(number)) => number / score_ceiling(max_score) * 100.0,
        (MeasurementUnit::Percentage | MeasurementUnit::Number, Some(number)) => number,
        (MeasurementUnit::Hours, Some(number)) => number / FULL_TIME_HOURS * 100.0,
        (MeasurementUnit::Ratio, Some(number)) => number * 100.0,
    };

    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

fn score_ceiling(max_score: Option<f64>) -> f64 {
    max_score
        .filter(|ceiling| ceiling.is_finite() && *ceiling > 0.0)
        .unwrap_or(DEFAULT_MAX_SCORE)
}
