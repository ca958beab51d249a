use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::evidence::EvidenceBundle;

/// Read an optional field, treating `null` or a value of the wrong shape as absent.
pub(crate) fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}

/// One of the six fixed top-level assessment pillars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PillarId(u8);

impl PillarId {
    pub const COUNT: usize = 6;

    pub const ALL: [PillarId; Self::COUNT] = [
        PillarId(1),
        PillarId(2),
        PillarId(3),
        PillarId(4),
        PillarId(5),
        PillarId(6),
    ];

    pub const fn new(number: u8) -> Option<Self> {
        if number >= 1 && number as usize <= Self::COUNT {
            Some(Self(number))
        } else {
            None
        }
    }

    pub const fn number(self) -> u8 {
        self.0
    }

    pub const fn name(self) -> &'static str {
        match self.0 {
            1 => "Strategy & Leadership",
            2 => "Innovation Culture",
            3 => "Resources & Infrastructure",
            4 => "Processes & Methods",
            5 => "Partnerships & Collaboration",
            _ => "Impact & Results",
        }
    }

    /// Key used for this pillar in submitted form data (`pillar_3`).
    pub fn form_key(self) -> String {
        format!("pillar_{}", self.0)
    }

    fn from_form_key(key: &str) -> Option<Self> {
        key.trim()
            .strip_prefix("pillar_")
            .and_then(|number| number.parse::<u8>().ok())
            .and_then(Self::new)
    }
}

impl TryFrom<u8> for PillarId {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("pillar id must be between 1 and 6, got {value}"))
    }
}

impl From<PillarId> for u8 {
    fn from(value: PillarId) -> Self {
        value.0
    }
}

impl fmt::Display for PillarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hierarchical indicator code such as `2.2.3`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorId(pub String);

impl IndicatorId {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Pillar encoded in the first segment of the code.
    pub fn pillar(&self) -> Option<PillarId> {
        self.0
            .split('.')
            .next()
            .and_then(|segment| segment.trim().parse::<u8>().ok())
            .and_then(PillarId::new)
    }

    /// Sub-pillar code (`2.2` for `2.2.3`) when the code has three segments.
    pub fn sub_pillar_code(&self) -> Option<&str> {
        let (prefix, leaf) = self.0.rsplit_once('.')?;
        if leaf.is_empty() || !prefix.contains('.') {
            return None;
        }
        Some(prefix)
    }

    /// True when every segment is a non-empty run of ASCII digits.
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty()
            && self
                .0
                .split('.')
                .all(|segment| !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()))
    }
}

impl fmt::Display for IndicatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IndicatorId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Raw indicator answer as submitted by the institution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Blank text counts as an unanswered indicator.
    pub fn is_missing(&self) -> bool {
        matches!(self, RawValue::Text(text) if text.trim().is_empty())
    }

    /// Numeric reading of the value; `None` when it cannot be read as a finite number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(value) if value.is_finite() => Some(*value),
            RawValue::Number(_) => None,
            RawValue::Flag(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            RawValue::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite()),
        }
    }

    /// Truthiness for yes/no indicators, accepting the usual textual spellings.
    pub fn as_flag(&self) -> Option<bool> {
        if let RawValue::Text(text) = self {
            match text.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" => return Some(true),
                "false" | "no" | "n" => return Some(false),
                _ => {}
            }
        }
        self.as_number().map(|value| value != 0.0)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Answer for a single indicator with optional supporting evidence.
///
/// Arrays or objects in place of a value read as unanswered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorResponse {
    #[serde(default, deserialize_with = "lenient_option")]
    pub value: Option<RawValue>,
    #[serde(
        default,
        deserialize_with = "lenient_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub evidence: Option<EvidenceBundle>,
}

impl IndicatorResponse {
    pub fn new(value: impl Into<RawValue>) -> Self {
        Self {
            value: Some(value.into()),
            evidence: None,
        }
    }

    pub fn with_evidence(mut self, evidence: EvidenceBundle) -> Self {
        self.evidence = Some(evidence);
        self
    }

    /// The raw value, or `None` when absent or blank.
    pub fn answered_value(&self) -> Option<&RawValue> {
        self.value.as_ref().filter(|value| !value.is_missing())
    }
}

pub type IndicatorMap = BTreeMap<IndicatorId, IndicatorResponse>;

/// Assessment answers grouped by pillar, keyed `pillar_1` through `pillar_6` on the wire.
///
/// Keys that do not name a pillar are dropped, and absent or non-object pillars read as
/// empty. An indicator entry that is not an object counts as unanswered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "BTreeMap<String, IndicatorMap>")]
pub struct FormData {
    pillars: BTreeMap<PillarId, IndicatorMap>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pillar(&self, pillar: PillarId) -> Option<&IndicatorMap> {
        self.pillars.get(&pillar)
    }

    pub fn insert(
        &mut self,
        pillar: PillarId,
        indicator: impl Into<IndicatorId>,
        response: IndicatorResponse,
    ) -> &mut Self {
        self.pillars
            .entry(pillar)
            .or_default()
            .insert(indicator.into(), response);
        self
    }

    pub fn with_pillar(mut self, pillar: PillarId, indicators: IndicatorMap) -> Self {
        self.pillars.insert(pillar, indicators);
        self
    }

    /// Iterate every response together with the pillar it was submitted under.
    pub fn responses(&self) -> impl Iterator<Item = (PillarId, &IndicatorId, &IndicatorResponse)> {
        self.pillars.iter().flat_map(|(pillar, indicators)| {
            indicators
                .iter()
                .map(move |(id, response)| (*pillar, id, response))
        })
    }

    pub fn answered_count(&self) -> usize {
        self.responses()
            .filter(|(_, _, response)| response.answered_value().is_some())
            .count()
    }
}

impl From<Value> for FormData {
    fn from(raw: Value) -> Self {
        let mut pillars = BTreeMap::new();
        let Value::Object(entries) = raw else {
            return Self { pillars };
        };

        for (key, indicators) in entries {
            let Some(pillar) = PillarId::from_form_key(&key) else {
                continue;
            };
            let Value::Object(indicators) = indicators else {
                continue;
            };
            let parsed: &mut IndicatorMap = pillars.entry(pillar).or_default();
            for (id, response) in indicators {
                let response = serde_json::from_value(response).unwrap_or_default();
                parsed.insert(IndicatorId(id), response);
            }
        }
        Self { pillars }
    }
}

impl From<FormData> for BTreeMap<String, IndicatorMap> {
    fn from(form: FormData) -> Self {
        form.pillars
            .into_iter()
            .map(|(pillar, indicators)| (pillar.form_key(), indicators))
            .collect()
    }
}

/// Identifier of the institution's certification application.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
