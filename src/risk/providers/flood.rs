//! Flood hazard: regulatory flood-zoning classification enriched with the
//! nearest hydrometric station's latest reading.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use super::{source_meta, ArcGisClient, HubEauClient, ProviderError, RiskProvider};
use crate::risk::domain::{Hazard, HazardObservation};

const STATION_SEARCH_RADIUS_KM: u32 = 20;

/// Attribute fields carrying the alea classification, checked in order.
const ALEA_FIELDS: [&str; 4] = ["alea", "ALEA", "niv_alea", "NIV_ALEA"];

pub struct FloodZoningProvider {
    arcgis: ArcGisClient,
    hydro: HubEauClient,
    layer_url: String,
}

impl FloodZoningProvider {
    pub fn new(arcgis: ArcGisClient, hydro: HubEauClient, layer_url: impl Into<String>) -> Self {
        Self {
            arcgis,
            hydro,
            layer_url: layer_url.into(),
        }
    }
}

fn alea_classification(attributes: &Map<String, Value>) -> Option<String> {
    ALEA_FIELDS
        .iter()
        .find_map(|field| attributes.get(*field))
        .and_then(Value::as_str)
        .map(|raw| raw.trim().to_lowercase())
}

fn score_for_alea(classification: &str) -> u8 {
    if classification.contains("très fort") || classification.contains("tres fort") {
        90
    } else if classification.contains("fort") {
        70
    } else if classification.contains("moyen") {
        45
    } else if classification.contains("faible") {
        20
    } else {
        10
    }
}

#[async_trait]
impl RiskProvider for FloodZoningProvider {
    fn hazard(&self) -> Hazard {
        Hazard::Flood
    }

    fn source_name(&self) -> &str {
        "Zonage inondation + hydrométrie"
    }

    fn source_version(&self) -> &str {
        "v2"
    }

    async fn observe(&self, lat: f64, lng: f64) -> Result<HazardObservation, ProviderError> {
        let attributes = self
            .arcgis
            .fetch_first_attributes(&self.layer_url, lat, lng, &["*"])
            .await?;

        let mut raw_indicators = Map::new();
        let (score, explanation) = match attributes.as_ref().and_then(alea_classification) {
            Some(classification) => {
                let score = score_for_alea(&classification);
                raw_indicators.insert("alea".to_string(), Value::from(classification.clone()));
                (
                    score,
                    format!("Site en zone inondable, aléa « {classification} »."),
                )
            }
            None => {
                raw_indicators.insert("alea".to_string(), Value::Null);
                (
                    10,
                    "Site hors de tout zonage inondation connu.".to_string(),
                )
            }
        };

        // The hydrometric reading enriches the observation; its absence or
        // failure never degrades the classification itself.
        let mut confidence = 55;
        match self.hydro.nearest_station(lat, lng, STATION_SEARCH_RADIUS_KM).await {
            Ok(Some(station)) => {
                raw_indicators.insert("station_code".to_string(), Value::from(station.code.clone()));
                raw_indicators.insert("station_label".to_string(), Value::from(station.label));
                raw_indicators
                    .insert("station_distance_km".to_string(), Value::from(station.distance_km));

                match self.hydro.latest_height(&station.code).await {
                    Ok(Some(reading)) => {
                        raw_indicators
                            .insert("height_mm".to_string(), Value::from(reading.height_mm));
                        raw_indicators
                            .insert("measured_at".to_string(), Value::from(reading.measured_at));
                        confidence = 65;
                    }
                    Ok(None) => {}
                    Err(err) => {
                        debug!(error = %err, "hydrometric reading unavailable, keeping classification only");
                    }
                }
            }
            Ok(None) => {}
            Err(err) => {
                debug!(error = %err, "station lookup unavailable, keeping classification only");
            }
        }

        raw_indicators.insert("lat".to_string(), Value::from(lat));
        raw_indicators.insert("lng".to_string(), Value::from(lng));

        Ok(HazardObservation {
            hazard: Hazard::Flood,
            raw_indicators,
            normalized_score: score,
            explanation,
            confidence,
            source: source_meta(self, lat, lng),
        })
    }
}
