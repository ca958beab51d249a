//! Static indicator metadata and pillar structure consumed by the scoring engine.

mod parser;
mod standard;

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::domain::{IndicatorId, PillarId, RawValue};

/// Determines which normalization formula applies to an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasurementUnit {
    Score,
    Percentage,
    Binary,
    Hours,
    Number,
    Ratio,
}

impl MeasurementUnit {
    pub const fn label(self) -> &'static str {
        match self {
            MeasurementUnit::Score => "Score",
            MeasurementUnit::Percentage => "Percentage",
            MeasurementUnit::Binary => "Binary",
            MeasurementUnit::Hours => "Hours",
            MeasurementUnit::Number => "Number",
            MeasurementUnit::Ratio => "Ratio",
        }
    }
}

impl FromStr for MeasurementUnit {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "score" => Ok(Self::Score),
            "percentage" | "percent" | "%" => Ok(Self::Percentage),
            "binary" | "yes/no" => Ok(Self::Binary),
            "hours" => Ok(Self::Hours),
            "number" | "count" => Ok(Self::Number),
            "ratio" => Ok(Self::Ratio),
            other => Err(format!("unknown measurement unit '{other}'")),
        }
    }
}

/// When an answer has to be substantiated with evidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "when", content = "threshold", rename_all = "snake_case")]
pub enum EvidencePolicy {
    Never,
    /// Any answered value needs evidence.
    Always,
    /// Only answers claiming something (non-zero, `yes`) need evidence.
    WhenPositive,
    /// Only answers strictly above the threshold need evidence.
    WhenAbove(f64),
}

impl EvidencePolicy {
    pub fn requires(&self, value: &RawValue) -> bool {
        match self {
            EvidencePolicy::Never => false,
            EvidencePolicy::Always => true,
            EvidencePolicy::WhenPositive => value.as_flag().unwrap_or(false),
            EvidencePolicy::WhenAbove(threshold) => value
                .as_number()
                .map(|number| number > *threshold)
                .unwrap_or(false),
        }
    }
}

impl FromStr for EvidencePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim().to_ascii_lowercase();
        match value.as_str() {
            "" | "never" | "none" => Ok(Self::Never),
            "always" => Ok(Self::Always),
            "positive" | "when_positive" => Ok(Self::WhenPositive),
            other => {
                let threshold = other
                    .strip_prefix("above:")
                    .ok_or_else(|| format!("unknown evidence policy '{other}'"))?;
                threshold
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|number| number.is_finite())
                    .map(Self::WhenAbove)
                    .ok_or_else(|| format!("invalid evidence threshold '{threshold}'"))
            }
        }
    }
}

impl fmt::Display for EvidencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvidencePolicy::Never => f.write_str("never"),
            EvidencePolicy::Always => f.write_str("always"),
            EvidencePolicy::WhenPositive => f.write_str("positive"),
            EvidencePolicy::WhenAbove(threshold) => write!(f, "above:{threshold}"),
        }
    }
}

/// Per-indicator scoring metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorMetadata {
    pub id: IndicatorId,
    pub name: String,
    pub unit: MeasurementUnit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
    pub evidence: EvidencePolicy,
}

/// Display grouping of indicators inside a pillar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubPillarDefinition {
    pub code: String,
    pub name: String,
    pub indicators: Vec<IndicatorId>,
}

/// Lookup interface the scoring engine depends on.
pub trait IndicatorLookup: Send + Sync {
    fn metadata(&self, id: &IndicatorId) -> Option<&IndicatorMetadata>;
    fn sub_pillars(&self, pillar: PillarId) -> &[SubPillarDefinition];
    fn indicators(&self) -> Vec<&IndicatorMetadata>;
}

/// Errors raised while loading a catalog table.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read indicator catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid indicator catalog CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("catalog row {line}: {reason}")]
    InvalidRow { line: u64, reason: String },
    #[error("indicator {0} is defined more than once")]
    DuplicateIndicator(IndicatorId),
}

/// Immutable indicator table plus pillar -> sub-pillar -> indicator grouping.
#[derive(Debug, Clone, Default)]
pub struct IndicatorCatalog {
    indicators: BTreeMap<IndicatorId, IndicatorMetadata>,
    structure: BTreeMap<PillarId, Vec<SubPillarDefinition>>,
}

impl IndicatorCatalog {
    /// Built-in assessment framework.
    pub fn standard() -> Self {
        let mut catalog = Self::default();
        for (code, sub_pillar_name, indicators) in standard::standard_framework() {
            for metadata in indicators {
                catalog.insert(code, sub_pillar_name, metadata);
            }
        }
        catalog
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for row in parser::parse_rows(reader)? {
            let id = &row.metadata.id;
            let sub_pillar_code = match (id.is_well_formed(), id.pillar(), id.sub_pillar_code()) {
                (true, Some(_), Some(code)) => code.to_string(),
                _ => {
                    return Err(CatalogError::InvalidRow {
                        line: row.line,
                        reason: format!(
                            "indicator code '{id}' must look like <pillar>.<sub-pillar>.<indicator> with pillar 1-6"
                        ),
                    })
                }
            };

            if catalog.indicators.contains_key(id) {
                return Err(CatalogError::DuplicateIndicator(row.metadata.id));
            }

            let sub_pillar_name = if row.sub_pillar_name.is_empty() {
                sub_pillar_code.as_str()
            } else {
                row.sub_pillar_name.as_str()
            };
            catalog.insert(&sub_pillar_code, sub_pillar_name, row.metadata);
        }
        Ok(catalog)
    }

    /// Callers guarantee a well-formed, unique indicator code.
    fn insert(&mut self, sub_pillar_code: &str, sub_pillar_name: &str, metadata: IndicatorMetadata) {
        let Some(pillar) = metadata.id.pillar() else {
            return;
        };

        let groups = self.structure.entry(pillar).or_default();
        match groups.iter_mut().find(|group| group.code == sub_pillar_code) {
            Some(group) => group.indicators.push(metadata.id.clone()),
            None => groups.push(SubPillarDefinition {
                code: sub_pillar_code.to_string(),
                name: sub_pillar_name.to_string(),
                indicators: vec![metadata.id.clone()],
            }),
        }

        self.indicators.insert(metadata.id.clone(), metadata);
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    /// Pillars that have no indicator at all; a usable framework covers all six.
    pub fn uncovered_pillars(&self) -> Vec<PillarId> {
        let covered: HashSet<PillarId> = self.structure.keys().copied().collect();
        PillarId::ALL
            .into_iter()
            .filter(|pillar| !covered.contains(pillar))
            .collect()
    }
}

impl IndicatorLookup for IndicatorCatalog {
    fn metadata(&self, id: &IndicatorId) -> Option<&IndicatorMetadata> {
        self.indicators.get(id)
    }

    fn sub_pillars(&self, pillar: PillarId) -> &[SubPillarDefinition] {
        self.structure
            .get(&pillar)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn indicators(&self) -> Vec<&IndicatorMetadata> {
        self.indicators.values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn standard_catalog_covers_every_pillar() {
        let catalog = IndicatorCatalog::standard();
        assert!(catalog.uncovered_pillars().is_empty());
        for pillar in PillarId::ALL {
            assert!(
                !catalog.sub_pillars(pillar).is_empty(),
                "pillar {pillar} should have sub-pillars"
            );
        }

        let percentage = catalog
            .metadata(&IndicatorId::from("1.1.1"))
            .expect("1.1.1 defined");
        assert_eq!(percentage.unit, MeasurementUnit::Percentage);
        for code in ["1.1.2", "2.2.3", "3.2.1"] {
            assert!(catalog.metadata(&IndicatorId::from(code)).is_some(), "{code}");
        }
    }

    #[test]
    fn standard_structure_matches_indicator_codes() {
        let catalog = IndicatorCatalog::standard();
        for pillar in PillarId::ALL {
            for group in catalog.sub_pillars(pillar) {
                for id in &group.indicators {
                    assert_eq!(id.pillar(), Some(pillar));
                    assert_eq!(id.sub_pillar_code(), Some(group.code.as_str()));
                }
            }
        }
    }

    #[test]
    fn csv_catalog_groups_rows_by_sub_pillar() {
        let csv = "indicator_id,sub_pillar_name,indicator_name,unit,max_score,evidence\n\
1.1.1,Vision,Strategy documented,Percentage,,above:50\n\
1.1.2,Vision,Leadership rating,Score,10,always\n\
1.2.1,Governance,Innovation committee,Binary,,positive\n";

        let catalog = IndicatorCatalog::from_reader(Cursor::new(csv)).expect("catalog loads");
        assert_eq!(catalog.len(), 3);

        let groups = catalog.sub_pillars(PillarId::ALL[0]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].code, "1.1");
        assert_eq!(groups[0].name, "Vision");
        assert_eq!(groups[0].indicators.len(), 2);

        let rating = catalog
            .metadata(&IndicatorId::from("1.1.2"))
            .expect("rating present");
        assert_eq!(rating.max_score, Some(10.0));
        assert_eq!(rating.evidence, EvidencePolicy::Always);
        assert_eq!(catalog.uncovered_pillars().len(), 5);
    }

    #[test]
    fn blank_sub_pillar_name_falls_back_to_its_code() {
        let csv = "indicator_id,sub_pillar_name,indicator_name,unit,max_score,evidence\n\
2.3.1,,Idea submissions,Number,,never\n\
2.3.2,,Ideas implemented,Percentage,,never\n";

        let catalog = IndicatorCatalog::from_reader(Cursor::new(csv)).expect("catalog loads");
        let groups = catalog.sub_pillars(PillarId::ALL[1]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].code, "2.3");
        assert_eq!(groups[0].name, "2.3");
        assert_eq!(groups[0].indicators.len(), 2);
    }

    #[test]
    fn csv_catalog_rejects_duplicates_and_bad_units() {
        let duplicate = "indicator_id,sub_pillar_name,indicator_name,unit,max_score,evidence\n\
1.1.1,Vision,A,Percentage,,never\n\
1.1.1,Vision,B,Percentage,,never\n";
        match IndicatorCatalog::from_reader(Cursor::new(duplicate)) {
            Err(CatalogError::DuplicateIndicator(id)) => assert_eq!(id.as_str(), "1.1.1"),
            other => panic!("expected duplicate error, got {other:?}"),
        }

        let bad_unit = "indicator_id,sub_pillar_name,indicator_name,unit,max_score,evidence\n\
1.1.1,Vision,A,Furlongs,,never\n";
        match IndicatorCatalog::from_reader(Cursor::new(bad_unit)) {
            Err(CatalogError::InvalidRow { line, reason }) => {
                assert_eq!(line, 2);
                assert!(reason.contains("Furlongs") || reason.contains("furlongs"));
            }
            other => panic!("expected invalid row, got {other:?}"),
        }

        let flat_code = "indicator_id,sub_pillar_name,indicator_name,unit,max_score,evidence\n\
7,Vision,A,Percentage,,never\n";
        assert!(matches!(
            IndicatorCatalog::from_reader(Cursor::new(flat_code)),
            Err(CatalogError::InvalidRow { .. })
        ));
    }

    #[test]
    fn from_path_propagates_io_errors() {
        match IndicatorCatalog::from_path("./does-not-exist.csv") {
            Err(CatalogError::Io(_)) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn evidence_policy_round_trips_text_form() {
        for raw in ["never", "always", "positive", "above:50"] {
            let policy: EvidencePolicy = raw.parse().expect("policy parses");
            assert_eq!(policy.to_string(), raw);
        }
        assert!("above:abc".parse::<EvidencePolicy>().is_err());
        assert!("sometimes".parse::<EvidencePolicy>().is_err());
    }

    #[test]
    fn evidence_policy_thresholds() {
        assert!(!EvidencePolicy::Never.requires(&RawValue::Number(100.0)));
        assert!(EvidencePolicy::Always.requires(&RawValue::Number(0.0)));
        assert!(EvidencePolicy::WhenPositive.requires(&RawValue::from("yes")));
        assert!(!EvidencePolicy::WhenPositive.requires(&RawValue::Flag(false)));
        assert!(EvidencePolicy::WhenAbove(50.0).requires(&RawValue::Number(50.5)));
        assert!(!EvidencePolicy::WhenAbove(50.0).requires(&RawValue::Number(50.0)));
        assert!(!EvidencePolicy::WhenAbove(50.0).requires(&RawValue::from("n/a")));
    }
}
