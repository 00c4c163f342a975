use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One climate/geophysical risk category tracked by the audit.
///
/// Variants are declared in lexical order of their wire names so that the
/// derived `Ord` doubles as the documented deterministic tie-break when
/// ranking hazards by score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hazard {
    Cavites,
    DroughtClay,
    Fire,
    Flood,
    Heat,
}

impl Hazard {
    pub const ALL: [Hazard; 5] = [
        Hazard::Cavites,
        Hazard::DroughtClay,
        Hazard::Fire,
        Hazard::Flood,
        Hazard::Heat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Hazard::Cavites => "cavites",
            Hazard::DroughtClay => "drought_clay",
            Hazard::Fire => "fire",
            Hazard::Flood => "flood",
            Hazard::Heat => "heat",
        }
    }
}

impl fmt::Display for Hazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative severity bucket derived from a score, or `Indisponible` when
/// no usable signal exists for the hazard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardLevel {
    #[serde(rename = "faible")]
    Faible,
    #[serde(rename = "moyen")]
    Moyen,
    #[serde(rename = "élevé")]
    Eleve,
    #[serde(rename = "très_élevé")]
    TresEleve,
    #[serde(rename = "indisponible")]
    Indisponible,
}

impl HazardLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            HazardLevel::Faible => "faible",
            HazardLevel::Moyen => "moyen",
            HazardLevel::Eleve => "élevé",
            HazardLevel::TresEleve => "très_élevé",
            HazardLevel::Indisponible => "indisponible",
        }
    }
}

/// Provenance record attached to every observation for audit traceability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMeta {
    pub name: String,
    pub version: String,
    pub fetched_at: DateTime<Utc>,
    pub params: QueryParams,
}

/// Coordinates the provider was queried with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryParams {
    pub lat: f64,
    pub lng: f64,
}

/// One provider's raw plus normalized output for one hazard at one location.
///
/// `confidence` 0 marks the observation as unavailable: downstream it always
/// yields level `indisponible` and never enters the global aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardObservation {
    pub hazard: Hazard,
    pub raw_indicators: Map<String, Value>,
    pub normalized_score: u8,
    pub explanation: String,
    pub confidence: u8,
    pub source: SourceMeta,
}

impl HazardObservation {
    /// Degraded observation used whenever an upstream source cannot answer.
    pub fn unavailable(hazard: Hazard, message: impl Into<String>, source: SourceMeta) -> Self {
        let message = message.into();
        let mut raw_indicators = Map::new();
        raw_indicators.insert("status".to_string(), Value::from("unavailable"));
        raw_indicators.insert("error".to_string(), Value::from(message.clone()));

        Self {
            hazard,
            raw_indicators,
            normalized_score: 0,
            explanation: message,
            confidence: 0,
            source,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.confidence == 0
    }
}

/// Aggregated scoring output across all hazards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub scores: BTreeMap<Hazard, u8>,
    pub levels: BTreeMap<Hazard, HazardLevel>,
    pub global_score: u8,
    pub global_level: HazardLevel,
    pub confidence_score: u8,
    pub explanations: BTreeMap<Hazard, String>,
    pub data_sources: Vec<SourceMeta>,
}

impl ScoringResult {
    /// Scores of hazards whose observation carried a usable signal. Hazards
    /// classified `indisponible` are left out so they can never headline the
    /// recommendation engine's top-hazard selection.
    pub fn usable_scores(&self) -> BTreeMap<Hazard, u8> {
        self.scores
            .iter()
            .filter(|(hazard, _)| self.levels.get(hazard) != Some(&HazardLevel::Indisponible))
            .map(|(hazard, score)| (*hazard, *score))
            .collect()
    }
}

/// Stated criticality of the audited activity, boosting action priorities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criticality {
    High,
    Medium,
    Standard,
}

impl Criticality {
    /// Lenient parse from free-form input; anything unrecognized is standard.
    pub fn from_input(value: Option<&str>) -> Self {
        match value.map(|raw| raw.trim().to_ascii_lowercase()).as_deref() {
            Some("high") | Some("haute") => Criticality::High,
            Some("medium") | Some("moyenne") => Criticality::Medium,
            _ => Criticality::Standard,
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            Criticality::High => 1.2,
            Criticality::Medium => 1.1,
            Criticality::Standard => 1.0,
        }
    }
}

/// Input describing the audited site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteProfile {
    pub lat: f64,
    pub lng: f64,
    pub has_basement: bool,
    pub sector: Option<String>,
    pub building_type: Option<String>,
    pub criticality: Criticality,
}

/// Final assembled output for one audit: scoring plus ranked actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub scoring: ScoringResult,
    pub recommendations: Vec<crate::risk::recommend::RankedAction>,
    pub computed_at: DateTime<Utc>,
}
