//! Cavity hazard: count of known underground cavities near the site.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{source_meta, ArcGisClient, ProviderError, RiskProvider};
use crate::risk::domain::{Hazard, HazardObservation};

const DEFAULT_RADIUS_METERS: u32 = 500;

pub struct CavityInventoryProvider {
    arcgis: ArcGisClient,
    layer_url: String,
    radius_m: u32,
}

impl CavityInventoryProvider {
    pub fn new(arcgis: ArcGisClient, layer_url: impl Into<String>) -> Self {
        Self {
            arcgis,
            layer_url: layer_url.into(),
            radius_m: DEFAULT_RADIUS_METERS,
        }
    }
}

fn score_for_count(count: u64) -> u8 {
    match count {
        0 => 10,
        1 => 35,
        2..=4 => 60,
        _ => 85,
    }
}

#[async_trait]
impl RiskProvider for CavityInventoryProvider {
    fn hazard(&self) -> Hazard {
        Hazard::Cavites
    }

    fn source_name(&self) -> &str {
        "Inventaire des cavités souterraines"
    }

    fn source_version(&self) -> &str {
        "FeatureServer"
    }

    async fn observe(&self, lat: f64, lng: f64) -> Result<HazardObservation, ProviderError> {
        let count = self
            .arcgis
            .fetch_count(&self.layer_url, lat, lng, Some(self.radius_m))
            .await?;
        let score = score_for_count(count);

        let mut raw_indicators = Map::new();
        raw_indicators.insert("count".to_string(), Value::from(count));
        raw_indicators.insert("radius_m".to_string(), Value::from(self.radius_m));

        Ok(HazardObservation {
            hazard: Hazard::Cavites,
            raw_indicators,
            normalized_score: score,
            explanation: format!(
                "{} cavité(s) recensée(s) dans un rayon de {}m.",
                count, self.radius_m
            ),
            confidence: 65,
            source: source_meta(self, lat, lng),
        })
    }
}
