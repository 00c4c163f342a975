//! Hub'Eau hydrometry client: nearest in-service station and its latest
//! water-height reading.

use std::time::Duration;

use serde_json::Value;

use super::ProviderError;
use crate::risk::geo;

const SERVICE: &str = "Hub'Eau";

/// Hydrometric station close to the queried point.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub code: String,
    pub label: String,
    pub lat: f64,
    pub lng: f64,
    pub distance_km: f64,
}

/// Latest water-height observation for a station.
#[derive(Debug, Clone, PartialEq)]
pub struct HydroReading {
    pub height_mm: f64,
    pub measured_at: String,
}

#[derive(Clone)]
pub struct HubEauClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HubEauClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Nearest in-service station within `radius_km` of the point, if any.
    /// Ties on exact distance keep the first station seen in the payload.
    pub async fn nearest_station(
        &self,
        lat: f64,
        lng: f64,
        radius_km: u32,
    ) -> Result<Option<Station>, ProviderError> {
        let payload = self
            .request(
                "/hydrometrie/referentiel/stations",
                &[
                    ("latitude".to_string(), format!("{lat:.6}")),
                    ("longitude".to_string(), format!("{lng:.6}")),
                    ("distance".to_string(), radius_km.to_string()),
                    ("en_service".to_string(), "1".to_string()),
                    ("size".to_string(), "25".to_string()),
                    ("format".to_string(), "json".to_string()),
                ],
            )
            .await?;

        Ok(nearest_from_payload(&payload, lat, lng))
    }

    /// Most recent real-time water-height observation for a station.
    pub async fn latest_height(
        &self,
        station_code: &str,
    ) -> Result<Option<HydroReading>, ProviderError> {
        let payload = self
            .request(
                "/hydrometrie/observations_tr",
                &[
                    ("code_entite".to_string(), station_code.to_string()),
                    ("grandeur_hydro".to_string(), "H".to_string()),
                    ("size".to_string(), "20".to_string()),
                    ("sort".to_string(), "desc".to_string()),
                    ("format".to_string(), "json".to_string()),
                ],
            )
            .await?;

        Ok(latest_from_payload(&payload))
    }

    async fn request(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Value, ProviderError> {
        if self.base_url.is_empty() {
            return Err(ProviderError::MissingConfig("API Hub'Eau".to_string()));
        }

        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
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

        if let Some(error) = payload.get("error") {
            let detail = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("erreur non détaillée")
                .to_string();
            return Err(ProviderError::Rejected {
                service: SERVICE.to_string(),
                detail,
            });
        }

        Ok(payload)
    }
}

fn nearest_from_payload(payload: &Value, lat: f64, lng: f64) -> Option<Station> {
    let stations = payload.get("data")?.as_array()?;

    let mut best: Option<(f64, Station)> = None;
    for station in stations {
        let Some(station_lat) = station.get("latitude_station").and_then(Value::as_f64) else {
            continue;
        };
        let Some(station_lng) = station.get("longitude_station").and_then(Value::as_f64) else {
            continue;
        };

        let distance_km = geo::distance_km(lat, lng, station_lat, station_lng);
        // strict comparison on the raw distance: first-seen wins on exact ties
        if best.as_ref().is_some_and(|(raw, _)| distance_km >= *raw) {
            continue;
        }

        best = Some((
            distance_km,
            Station {
                code: station
                    .get("code_station")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                label: station
                    .get("libelle_station")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                lat: station_lat,
                lng: station_lng,
                distance_km: (distance_km * 10.0).round() / 10.0,
            },
        ));
    }

    best.map(|(_, station)| station)
}

fn latest_from_payload(payload: &Value) -> Option<HydroReading> {
    let observations = payload.get("data")?.as_array()?;
    let latest = observations.first()?;

    Some(HydroReading {
        height_mm: latest.get("resultat_obs").and_then(Value::as_f64)?,
        measured_at: latest
            .get("date_obs")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nearest_station_picks_the_closest() {
        let payload = json!({
            "data": [
                {
                    "code_station": "K001",
                    "libelle_station": "Amont",
                    "latitude_station": 48.90,
                    "longitude_station": 2.40
                },
                {
                    "code_station": "K002",
                    "libelle_station": "Aval",
                    "latitude_station": 48.86,
                    "longitude_station": 2.36
                }
            ]
        });

        let station = nearest_from_payload(&payload, 48.8566, 2.3522).expect("a station");
        assert_eq!(station.code, "K002");
        assert!(station.distance_km < 1.0);
    }

    #[test]
    fn stations_without_coordinates_are_skipped() {
        let payload = json!({
            "data": [
                { "code_station": "K001", "latitude_station": null },
                {
                    "code_station": "K002",
                    "latitude_station": 48.86,
                    "longitude_station": 2.36
                }
            ]
        });

        let station = nearest_from_payload(&payload, 48.8566, 2.3522).expect("a station");
        assert_eq!(station.code, "K002");
    }

    #[test]
    fn exact_distance_tie_keeps_first_seen() {
        let payload = json!({
            "data": [
                {
                    "code_station": "FIRST",
                    "latitude_station": 48.86,
                    "longitude_station": 2.36
                },
                {
                    "code_station": "SECOND",
                    "latitude_station": 48.86,
                    "longitude_station": 2.36
                }
            ]
        });

        let station = nearest_from_payload(&payload, 48.8566, 2.3522).expect("a station");
        assert_eq!(station.code, "FIRST");
    }

    #[test]
    fn rounded_display_distance_does_not_affect_selection() {
        // both stations sit between 0.95 and 1.0 km, so both display as
        // 1.0 km; the second is farther and must not win
        let payload = json!({
            "data": [
                {
                    "code_station": "NEAR",
                    "latitude_station": 48.8566,
                    "longitude_station": 2.36545
                },
                {
                    "code_station": "FAR",
                    "latitude_station": 48.8566,
                    "longitude_station": 2.36555
                }
            ]
        });

        let station = nearest_from_payload(&payload, 48.8566, 2.3522).expect("a station");
        assert_eq!(station.code, "NEAR");
        assert_eq!(station.distance_km, 1.0);
    }

    #[test]
    fn empty_station_list_yields_none() {
        assert!(nearest_from_payload(&json!({ "data": [] }), 48.85, 2.35).is_none());
        assert!(nearest_from_payload(&json!({}), 48.85, 2.35).is_none());
    }

    #[test]
    fn latest_reading_comes_from_the_first_row() {
        let payload = json!({
            "data": [
                { "resultat_obs": 1432.0, "date_obs": "2026-08-29T06:00:00Z" },
                { "resultat_obs": 1401.0, "date_obs": "2026-08-29T05:00:00Z" }
            ]
        });

        let reading = latest_from_payload(&payload).expect("a reading");
        assert_eq!(reading.height_mm, 1432.0);
        assert_eq!(reading.measured_at, "2026-08-29T06:00:00Z");
    }

    #[test]
    fn missing_result_value_yields_none() {
        let payload = json!({ "data": [ { "date_obs": "2026-08-29T06:00:00Z" } ] });
        assert!(latest_from_payload(&payload).is_none());
    }
}
