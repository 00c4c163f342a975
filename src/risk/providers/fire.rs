//! Fire hazard: density of historical wildfire records around the site.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{source_meta, ArcGisClient, ProviderError, RiskProvider};
use crate::risk::domain::{Hazard, HazardObservation};

const DEFAULT_RADIUS_METERS: u32 = 5_000;

pub struct WildfireHistoryProvider {
    arcgis: ArcGisClient,
    layer_url: String,
    radius_m: u32,
}

impl WildfireHistoryProvider {
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
        1..=2 => 35,
        3..=9 => 60,
        _ => 85,
    }
}

#[async_trait]
impl RiskProvider for WildfireHistoryProvider {
    fn hazard(&self) -> Hazard {
        Hazard::Fire
    }

    fn source_name(&self) -> &str {
        "Inventaire feux de végétation"
    }

    fn source_version(&self) -> &str {
        "v1"
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
            hazard: Hazard::Fire,
            raw_indicators,
            normalized_score: score,
            explanation: format!(
                "{} feu(x) de végétation recensé(s) dans un rayon de {}m.",
                count, self.radius_m
            ),
            confidence: 50,
            source: source_meta(self, lat, lng),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_map_to_four_tier_scores() {
        assert_eq!(score_for_count(0), 10);
        assert_eq!(score_for_count(1), 35);
        assert_eq!(score_for_count(2), 35);
        assert_eq!(score_for_count(3), 60);
        assert_eq!(score_for_count(9), 60);
        assert_eq!(score_for_count(10), 85);
    }
}
