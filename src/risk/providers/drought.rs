//! Drought hazard: clay shrink-swell exposure classification.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{source_meta, ArcGisClient, ProviderError, RiskProvider};
use crate::risk::domain::{Hazard, HazardObservation};

const EXPOSURE_FIELDS: [&str; 4] = ["alea", "ALEA", "exposition", "EXPOSITION"];

pub struct ClayShrinkSwellProvider {
    arcgis: ArcGisClient,
    layer_url: String,
}

impl ClayShrinkSwellProvider {
    pub fn new(arcgis: ArcGisClient, layer_url: impl Into<String>) -> Self {
        Self {
            arcgis,
            layer_url: layer_url.into(),
        }
    }
}

fn exposure_classification(attributes: &Map<String, Value>) -> Option<String> {
    EXPOSURE_FIELDS
        .iter()
        .find_map(|field| attributes.get(*field))
        .and_then(Value::as_str)
        .map(|raw| raw.trim().to_lowercase())
}

fn score_for_exposure(classification: &str) -> u8 {
    if classification.contains("fort") {
        85
    } else if classification.contains("moyen") {
        60
    } else if classification.contains("faible") {
        35
    } else {
        10
    }
}

#[async_trait]
impl RiskProvider for ClayShrinkSwellProvider {
    fn hazard(&self) -> Hazard {
        Hazard::DroughtClay
    }

    fn source_name(&self) -> &str {
        "Exposition retrait-gonflement des argiles"
    }

    fn source_version(&self) -> &str {
        "v1"
    }

    async fn observe(&self, lat: f64, lng: f64) -> Result<HazardObservation, ProviderError> {
        let attributes = self
            .arcgis
            .fetch_first_attributes(&self.layer_url, lat, lng, &["*"])
            .await?;

        let mut raw_indicators = Map::new();
        let (score, explanation) = match attributes.as_ref().and_then(exposure_classification) {
            Some(classification) => {
                let score = score_for_exposure(&classification);
                raw_indicators.insert(
                    "clay_shrink_swell".to_string(),
                    Value::from(classification.clone()),
                );
                (
                    score,
                    format!("Exposition au retrait-gonflement des argiles : {classification}."),
                )
            }
            None => {
                raw_indicators.insert("clay_shrink_swell".to_string(), Value::Null);
                (
                    10,
                    "Site hors des zones d'exposition aux argiles cartographiées.".to_string(),
                )
            }
        };

        raw_indicators.insert("lat".to_string(), Value::from(lat));
        raw_indicators.insert("lng".to_string(), Value::from(lng));

        Ok(HazardObservation {
            hazard: Hazard::DroughtClay,
            raw_indicators,
            normalized_score: score,
            explanation,
            confidence: 45,
            source: source_meta(self, lat, lng),
        })
    }
}
