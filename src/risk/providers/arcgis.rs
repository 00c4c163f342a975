//! Minimal ArcGIS FeatureServer query client.
//!
//! Two query shapes cover every hazard inventory we read: "how many records
//! intersect this point (within an optional radius)" and "give me the first
//! record's attributes at this point".

use std::time::Duration;

use serde_json::{Map, Value};

use super::ProviderError;

const SERVICE: &str = "ArcGIS";

#[derive(Clone)]
pub struct ArcGisClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl ArcGisClient {
    pub fn new(http: reqwest::Client, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    /// Count of records intersecting the point, optionally within a radius
    /// in meters.
    pub async fn fetch_count(
        &self,
        layer_url: &str,
        lat: f64,
        lng: f64,
        radius_m: Option<u32>,
    ) -> Result<u64, ProviderError> {
        let mut query = base_query(lat, lng);
        query.push(("returnCountOnly".to_string(), "true".to_string()));
        if let Some(radius) = radius_m {
            query.push(("distance".to_string(), radius.to_string()));
            query.push(("units".to_string(), "esriSRUnit_Meter".to_string()));
        }

        let payload = self.request(layer_url, &query).await?;
        Ok(count_from_payload(&payload))
    }

    /// Attributes of the first record intersecting the point, or `None` when
    /// the layer has nothing there.
    pub async fn fetch_first_attributes(
        &self,
        layer_url: &str,
        lat: f64,
        lng: f64,
        out_fields: &[&str],
    ) -> Result<Option<Map<String, Value>>, ProviderError> {
        let mut query = base_query(lat, lng);
        query.push(("resultRecordCount".to_string(), "1".to_string()));
        query.push(("outFields".to_string(), format_fields(out_fields)));

        let payload = self.request(layer_url, &query).await?;
        Ok(first_attributes(payload))
    }

    async fn request(
        &self,
        layer_url: &str,
        query: &[(String, String)],
    ) -> Result<Value, ProviderError> {
        let url = build_query_url(layer_url)?;

        let response = self
            .http
            .get(&url)
            .query(query)
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

        ensure_no_error_member(&payload)?;
        Ok(payload)
    }
}

fn base_query(lat: f64, lng: f64) -> Vec<(String, String)> {
    vec![
        ("f".to_string(), "json".to_string()),
        ("where".to_string(), "1=1".to_string()),
        ("geometry".to_string(), format!("{lng:.6},{lat:.6}")),
        ("geometryType".to_string(), "esriGeometryPoint".to_string()),
        ("inSR".to_string(), "4326".to_string()),
        (
            "spatialRel".to_string(),
            "esriSpatialRelIntersects".to_string(),
        ),
        ("returnGeometry".to_string(), "false".to_string()),
    ]
}

fn build_query_url(layer_url: &str) -> Result<String, ProviderError> {
    let base = layer_url.trim().trim_end_matches('/');
    if base.is_empty() {
        return Err(ProviderError::MissingConfig("couche ArcGIS".to_string()));
    }

    if base.ends_with("/query") {
        Ok(base.to_string())
    } else {
        Ok(format!("{base}/query"))
    }
}

fn format_fields(fields: &[&str]) -> String {
    if fields.is_empty() || fields.contains(&"*") {
        "*".to_string()
    } else {
        fields.join(",")
    }
}

fn count_from_payload(payload: &Value) -> u64 {
    payload
        .get("count")
        .and_then(Value::as_u64)
        .unwrap_or_default()
}

fn first_attributes(payload: Value) -> Option<Map<String, Value>> {
    match payload.get("features")?.get(0)?.get("attributes")? {
        Value::Object(attributes) => Some(attributes.clone()),
        _ => None,
    }
}

fn ensure_no_error_member(payload: &Value) -> Result<(), ProviderError> {
    let Some(error) = payload.get("error") else {
        return Ok(());
    };

    let mut detail = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if let Some(parts) = error.get("details").and_then(Value::as_array) {
        for part in parts.iter().filter_map(Value::as_str) {
            if !detail.is_empty() {
                detail.push(' ');
            }
            detail.push_str(part);
        }
    }

    Err(ProviderError::Rejected {
        service: SERVICE.to_string(),
        detail: if detail.is_empty() {
            "erreur non détaillée".to_string()
        } else {
            detail
        },
    })
}
