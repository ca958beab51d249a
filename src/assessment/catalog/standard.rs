use super::{EvidencePolicy, IndicatorMetadata, MeasurementUnit};
use crate::assessment::domain::IndicatorId;

use EvidencePolicy::{Always, Never, WhenAbove, WhenPositive};
use MeasurementUnit::{Binary, Hours, Number, Percentage, Ratio, Score};

type SubPillarRows = (&'static str, &'static str, Vec<IndicatorMetadata>);

fn indicator(
    id: &str,
    name: &str,
    unit: MeasurementUnit,
    max_score: Option<f64>,
    evidence: EvidencePolicy,
) -> IndicatorMetadata {
    IndicatorMetadata {
        id: IndicatorId::new(id),
        name: name.to_string(),
        unit,
        max_score,
        evidence,
    }
}

/// Framework version 2024.1: six pillars, twelve sub-pillars.
pub(crate) fn standard_framework() -> Vec<SubPillarRows> {
    vec![
        (
            "1.1",
            "Innovation Strategy",
            vec![
                indicator(
                    "1.1.1",
                    "Share of strategic objectives with innovation targets",
                    Percentage,
                    None,
                    WhenAbove(50.0),
                ),
                indicator(
                    "1.1.2",
                    "Formal innovation strategy approved by leadership",
                    Binary,
                    None,
                    WhenPositive,
                ),
                indicator(
                    "1.1.3",
                    "Strategy communication maturity",
                    Score,
                    Some(5.0),
                    WhenAbove(3.0),
                ),
            ],
        ),
        (
            "1.2",
            "Leadership Commitment",
            vec![
                indicator(
                    "1.2.1",
                    "Dedicated innovation lead at executive level",
                    Binary,
                    None,
                    WhenPositive,
                ),
                indicator(
                    "1.2.2",
                    "Share of budget earmarked for innovation",
                    Percentage,
                    None,
                    Always,
                ),
            ],
        ),
        (
            "2.1",
            "Mindset & Engagement",
            vec![
                indicator(
                    "2.1.1",
                    "Employees submitting ideas in the last year",
                    Percentage,
                    None,
                    Never,
                ),
                indicator(
                    "2.1.2",
                    "Idea management platform in place",
                    Binary,
                    None,
                    WhenPositive,
                ),
            ],
        ),
        (
            "2.2",
            "Learning & Recognition",
            vec![
                indicator(
                    "2.2.1",
                    "Innovation training hours per employee",
                    Hours,
                    None,
                    WhenAbove(20.0),
                ),
                indicator(
                    "2.2.2",
                    "Recognition programme for innovators",
                    Binary,
                    None,
                    WhenPositive,
                ),
                indicator(
                    "2.2.3",
                    "Tolerance for experimentation and failure",
                    Score,
                    Some(5.0),
                    Never,
                ),
            ],
        ),
        (
            "3.1",
            "Funding",
            vec![
                indicator(
                    "3.1.1",
                    "R&D spend relative to revenue",
                    Ratio,
                    None,
                    Always,
                ),
                indicator(
                    "3.1.2",
                    "Access to external innovation funding",
                    Binary,
                    None,
                    WhenPositive,
                ),
            ],
        ),
        (
            "3.2",
            "People & Facilities",
            vec![
                indicator(
                    "3.2.1",
                    "Staff dedicated to innovation activities",
                    Number,
                    None,
                    WhenAbove(10.0),
                ),
                indicator(
                    "3.2.2",
                    "Innovation lab or maker space",
                    Binary,
                    None,
                    WhenPositive,
                ),
                indicator(
                    "3.2.3",
                    "Digital tooling adequacy",
                    Score,
                    Some(5.0),
                    Never,
                ),
            ],
        ),
        (
            "4.1",
            "Innovation Process",
            vec![
                indicator(
                    "4.1.1",
                    "Documented stage-gate or portfolio process",
                    Binary,
                    None,
                    WhenPositive,
                ),
                indicator(
                    "4.1.2",
                    "Projects passing a structured review",
                    Percentage,
                    None,
                    WhenAbove(50.0),
                ),
            ],
        ),
        (
            "4.2",
            "Measurement & Improvement",
            vec![
                indicator(
                    "4.2.1",
                    "Innovation KPIs tracked at management level",
                    Score,
                    Some(5.0),
                    WhenAbove(3.0),
                ),
                indicator(
                    "4.2.2",
                    "Post-project reviews completed",
                    Ratio,
                    None,
                    Never,
                ),
            ],
        ),
        (
            "5.1",
            "External Partnerships",
            vec![
                indicator(
                    "5.1.1",
                    "Active partnerships with universities or research centres",
                    Number,
                    None,
                    WhenAbove(0.0),
                ),
                indicator(
                    "5.1.2",
                    "Joint projects with startups",
                    Number,
                    None,
                    WhenAbove(0.0),
                ),
            ],
        ),
        (
            "5.2",
            "Open Innovation",
            vec![
                indicator(
                    "5.2.1",
                    "Open innovation challenges run",
                    Binary,
                    None,
                    WhenPositive,
                ),
                indicator(
                    "5.2.2",
                    "Hours spent in ecosystem networks per month",
                    Hours,
                    None,
                    Never,
                ),
            ],
        ),
        (
            "6.1",
            "Outputs",
            vec![
                indicator(
                    "6.1.1",
                    "Revenue share from products launched in the last three years",
                    Percentage,
                    None,
                    Always,
                ),
                indicator(
                    "6.1.2",
                    "Intellectual property filings",
                    Number,
                    None,
                    WhenAbove(0.0),
                ),
            ],
        ),
        (
            "6.2",
            "Outcomes",
            vec![
                indicator(
                    "6.2.1",
                    "Process improvements adopted from innovation projects",
                    Ratio,
                    None,
                    Never,
                ),
                indicator(
                    "6.2.2",
                    "Customer or stakeholder satisfaction with new offerings",
                    Score,
                    Some(10.0),
                    WhenAbove(7.0),
                ),
                indicator(
                    "6.2.3",
                    "External innovation awards received",
                    Binary,
                    None,
                    WhenPositive,
                ),
            ],
        ),
    ]
}
