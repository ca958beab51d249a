use super::{CatalogError, EvidencePolicy, IndicatorMetadata, MeasurementUnit};
use crate::assessment::domain::IndicatorId;
use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug)]
pub(crate) struct CatalogRow {
    pub(crate) line: u64,
    pub(crate) sub_pillar_name: String,
    pub(crate) metadata: IndicatorMetadata,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<CatalogRow>, CatalogError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut rows = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        let raw: RawCatalogRow = record.deserialize(Some(&headers))?;
        rows.push(raw.into_row(line)?);
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct RawCatalogRow {
    indicator_id: String,
    #[serde(default)]
    sub_pillar_name: String,
    indicator_name: String,
    unit: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    max_score: Option<String>,
    #[serde(default)]
    evidence: String,
}

impl RawCatalogRow {
    fn into_row(self, line: u64) -> Result<CatalogRow, CatalogError> {
        let invalid = |reason: String| CatalogError::InvalidRow { line, reason };

        let unit = self.unit.parse::<MeasurementUnit>().map_err(invalid)?;
        let evidence = self.evidence.parse::<EvidencePolicy>().map_err(invalid)?;
        let max_score = match self.max_score {
            Some(raw) => Some(
                raw.parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite() && *value > 0.0)
                    .ok_or_else(|| invalid(format!("max_score '{raw}' must be a positive number")))?,
            ),
            None => None,
        };

        Ok(CatalogRow {
            line,
            sub_pillar_name: self.sub_pillar_name,
            metadata: IndicatorMetadata {
                id: IndicatorId(self.indicator_id),
                name: self.indicator_name,
                unit,
                max_score,
                evidence,
            },
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
