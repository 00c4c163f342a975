use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tracing::warn;

use crate::risk::domain::Hazard;
use crate::risk::scoring::{RiskThresholds, RiskWeights};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub risk: RiskConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            risk: RiskConfig::from_env(),
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Risk pipeline tuning: admin weights/thresholds, cache TTL, per-provider
/// call timeout, and upstream endpoints. Malformed admin entries fall back to
/// the documented defaults (weight 1.0, thresholds 25/50/75) with a warning,
/// never an error.
#[derive(Debug, Clone)]
pub struct RiskConfig {
    pub weights: RiskWeights,
    pub thresholds: RiskThresholds,
    pub cache_ttl: Duration,
    pub provider_timeout: Duration,
    pub sources: SourceEndpoints,
}

/// Upstream endpoints for the hazard providers.
#[derive(Debug, Clone)]
pub struct SourceEndpoints {
    pub flood_layer_url: String,
    pub drought_layer_url: String,
    pub fire_layer_url: String,
    pub cavites_layer_url: String,
    pub vigilance_url: String,
    pub hubeau_base_url: String,
}

impl RiskConfig {
    fn from_env() -> Self {
        let weights = parse_weights(env::var("RISK_HAZARD_WEIGHTS").ok().as_deref());
        let thresholds = parse_thresholds(env::var("RISK_THRESHOLDS").ok().as_deref());

        let cache_ttl = env::var("RISK_CACHE_TTL_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(crate::risk::cache::OBSERVATION_TTL);

        let provider_timeout = env::var("RISK_PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(12));

        Self {
            weights,
            thresholds,
            cache_ttl,
            provider_timeout,
            sources: SourceEndpoints::from_env(),
        }
    }
}

impl SourceEndpoints {
    fn from_env() -> Self {
        fn var_or(key: &str, default: &str) -> String {
            env::var(key).unwrap_or_else(|_| default.to_string())
        }

        Self {
            flood_layer_url: var_or(
                "RISK_FLOOD_LAYER_URL",
                "https://www.georisques.gouv.fr/arcgis/rest/services/AZI/FeatureServer/0",
            ),
            drought_layer_url: var_or(
                "RISK_DROUGHT_LAYER_URL",
                "https://www.georisques.gouv.fr/arcgis/rest/services/ALEARG/FeatureServer/0",
            ),
            fire_layer_url: var_or(
                "RISK_FIRE_LAYER_URL",
                "https://www.georisques.gouv.fr/arcgis/rest/services/INCENDIE/FeatureServer/0",
            ),
            cavites_layer_url: var_or(
                "RISK_CAVITES_LAYER_URL",
                "https://www.georisques.gouv.fr/arcgis/rest/services/BDCAVITES/FeatureServer/0",
            ),
            vigilance_url: var_or(
                "RISK_VIGILANCE_URL",
                "https://public-api.meteofrance.fr/public/DPVigilance/v1/cartevigilance/encours",
            ),
            hubeau_base_url: var_or("RISK_HUBEAU_BASE_URL", "https://hubeau.eaufrance.fr/api/v2"),
        }
    }
}

fn parse_weights(raw: Option<&str>) -> RiskWeights {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return RiskWeights::default();
    };

    match serde_json::from_str::<BTreeMap<Hazard, f64>>(raw) {
        Ok(map) => RiskWeights(map),
        Err(err) => {
            warn!(error = %err, "RISK_HAZARD_WEIGHTS unreadable, using default weight 1.0");
            RiskWeights::default()
        }
    }
}

fn parse_thresholds(raw: Option<&str>) -> RiskThresholds {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return RiskThresholds::default();
    };

    match serde_json::from_str::<RiskThresholds>(raw) {
        Ok(thresholds) => thresholds.validated(),
        Err(err) => {
            warn!(error = %err, "RISK_THRESHOLDS unreadable, using defaults 25/50/75");
            RiskThresholds::default()
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
