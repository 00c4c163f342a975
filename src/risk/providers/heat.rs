//! Heat hazard from the public weather-vigilance color level.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{source_meta, ProviderError, RiskProvider};
use crate::risk::domain::{Hazard, HazardObservation};

const SERVICE: &str = "Vigilance météo";

/// Client for a vigilance endpoint answering with the current color level
/// (1 = vert .. 4 = rouge) for a point.
#[derive(Clone)]
pub struct VigilanceClient {
    http: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl VigilanceClient {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub async fn color_level(&self, lat: f64, lng: f64) -> Result<u8, ProviderError> {
        if self.endpoint.is_empty() {
            return Err(ProviderError::MissingConfig(
                "API vigilance météo".to_string(),
            ));
        }

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("lat".to_string(), format!("{lat:.6}")),
                ("lon".to_string(), format!("{lng:.6}")),
            ])
            .timeout(self.timeout)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|err| ProviderError::Transport {
                service: SERVICE.to_string(),
                detail: err.to_string(),
            })?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(ProviderError::Http {
                service: SERVICE.to_string(),
                status: status.as_u16(),
            });
        }

        let payload: Value = response.json().await.map_err(|_| ProviderError::Payload {
            service: SERVICE.to_string(),
        })?;

        color_from_payload(&payload).ok_or(ProviderError::Payload {
            service: SERVICE.to_string(),
        })
    }
}

fn color_from_payload(payload: &Value) -> Option<u8> {
    if let Some(level) = payload.get("color_id").and_then(Value::as_u64) {
        return u8::try_from(level).ok().filter(|l| (1..=4).contains(l));
    }

    match payload.get("color").and_then(Value::as_str)? {
        "vert" | "green" => Some(1),
        "jaune" | "yellow" => Some(2),
        "orange" => Some(3),
        "rouge" | "red" => Some(4),
        _ => None,
    }
}

fn score_for_color(level: u8) -> u8 {
    match level {
        1 => 10,
        2 => 35,
        3 => 60,
        _ => 85,
    }
}

fn color_label(level: u8) -> &'static str {
    match level {
        1 => "vert",
        2 => "jaune",
        3 => "orange",
        _ => "rouge",
    }
}

pub struct HeatVigilanceProvider {
    client: VigilanceClient,
}

impl HeatVigilanceProvider {
    pub fn new(client: VigilanceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RiskProvider for HeatVigilanceProvider {
    fn hazard(&self) -> Hazard {
        Hazard::Heat
    }

    fn source_name(&self) -> &str {
        "Vigilance météo canicule"
    }

    fn source_version(&self) -> &str {
        "v1"
    }

    async fn observe(&self, lat: f64, lng: f64) -> Result<HazardObservation, ProviderError> {
        let level = self.client.color_level(lat, lng).await?;
        let score = score_for_color(level);

        let mut raw_indicators = Map::new();
        raw_indicators.insert("color_id".to_string(), Value::from(level));
        raw_indicators.insert("color".to_string(), Value::from(color_label(level)));

        Ok(HazardObservation {
            hazard: Hazard::Heat,
            raw_indicators,
            normalized_score: score,
            explanation: format!(
                "Vigilance canicule de niveau {} ({}) sur la zone.",
                level,
                color_label(level)
            ),
            confidence: 55,
            source: source_meta(self, lat, lng),
        })
    }
}
