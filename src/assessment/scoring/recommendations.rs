use super::config::ScoringConfig;
use super::PillarScore;

/// Pillars averaging below this are treated as lacking basic practices.
const FOUNDATIONAL_BAND: f64 = 30.0;

pub(crate) fn recommend(pillars: &[PillarScore], config: &ScoringConfig) -> Vec<String> {
    let mut recommendations = Vec::new();

    for pillar in pillars {
        if pillar.average_score < config.improvement_threshold {
            recommendations.push(improvement_line(pillar, config));
        }

        let missing_evidence = pillar
            .indicators
            .iter()
            .filter(|indicator| indicator.evidence_required && !indicator.has_evidence)
            .count();
        if missing_evidence > 0 {
            recommendations.push(format!(
                "Attach supporting evidence for {missing_evidence} indicator(s) in {}.",
                pillar.name
            ));
        }
    }

    recommendations
}

fn improvement_line(pillar: &PillarScore, config: &ScoringConfig) -> String {
    let weakest = pillar
        .sub_pillars
        .iter()
        .filter(|group| group.answered > 0)
        .min_by(|left, right| left.average_score.total_cmp(&right.average_score));

    let mut line = if pillar.indicators.is_empty() {
        format!(
            "Complete the {} section: no indicators were answered.",
            pillar.name
        )
    } else if pillar.average_score < FOUNDATIONAL_BAND {
        format!(
            "Establish foundational practices in {} (score {:.1}, target {:.0}).",
            pillar.name, pillar.average_score, config.improvement_threshold
        )
    } else {
        format!(
            "Strengthen {} to reach the {:.0} target (score {:.1}).",
            pillar.name, config.improvement_threshold, pillar.average_score
        )
    };

    if let Some(group) = weakest {
        line.push_str(&format!(
            " Start with {} ({:.1}).",
            group.name, group.average_score
        ));
    }

    line
}
