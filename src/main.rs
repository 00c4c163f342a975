use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use climaudit::config::AppConfig;
use climaudit::error::AppError;
use climaudit::risk::{
    audit_router, ArcGisClient, AuditOrchestrator, AuditService, AuditStore,
    CavityInventoryProvider, ClayShrinkSwellProvider, Criticality, FloodZoningProvider,
    HeatVigilanceProvider, HubEauClient, InMemoryActionCatalog, InMemoryAuditStore,
    InMemoryObservationCache, ProviderRegistry, RecommendationEngine, RiskProvider, ScoringEngine,
    SiteProfile, VigilanceClient, WildfireHistoryProvider,
};
use climaudit::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

type Orchestrator = AuditOrchestrator<InMemoryActionCatalog>;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: Arc<PrometheusHandle>,
}

#[derive(Parser, Debug)]
#[command(
    name = "climaudit",
    about = "Assess site-level climate-hazard exposure and recommend mitigation actions",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run one assessment from the command line and print the result as JSON
    Compute(ComputeArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct ComputeArgs {
    /// Site latitude (WGS84)
    #[arg(long)]
    lat: f64,
    /// Site longitude (WGS84)
    #[arg(long)]
    lng: f64,
    /// The site has a basement
    #[arg(long)]
    basement: bool,
    /// Activity sector (e.g. tertiaire, industrie)
    #[arg(long)]
    sector: Option<String>,
    /// Building type, recorded for future use
    #[arg(long)]
    building_type: Option<String>,
    /// Stated criticality: high, medium, or standard
    #[arg(long)]
    criticality: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Compute(args) => run_compute(args).await,
    }
}

fn build_orchestrator(config: &AppConfig) -> Orchestrator {
    let http = reqwest::Client::new();
    let sources = &config.risk.sources;
    let call_timeout = config.risk.provider_timeout;

    let arcgis = ArcGisClient::new(http.clone(), call_timeout);
    let hubeau = HubEauClient::new(http.clone(), sources.hubeau_base_url.clone(), call_timeout);
    let vigilance = VigilanceClient::new(http, sources.vigilance_url.clone(), call_timeout);

    let providers: Vec<Arc<dyn RiskProvider>> = vec![
        Arc::new(HeatVigilanceProvider::new(vigilance)),
        Arc::new(FloodZoningProvider::new(
            arcgis.clone(),
            hubeau,
            sources.flood_layer_url.clone(),
        )),
        Arc::new(ClayShrinkSwellProvider::new(
            arcgis.clone(),
            sources.drought_layer_url.clone(),
        )),
        Arc::new(WildfireHistoryProvider::new(
            arcgis.clone(),
            sources.fire_layer_url.clone(),
        )),
        Arc::new(CavityInventoryProvider::new(
            arcgis,
            sources.cavites_layer_url.clone(),
        )),
    ];

    let registry = ProviderRegistry::new(
        providers,
        Arc::new(InMemoryObservationCache::new()),
        call_timeout,
        config.risk.cache_ttl,
    );
    let scoring = ScoringEngine::new(config.risk.weights.clone(), config.risk.thresholds);
    let recommendations = RecommendationEngine::new(InMemoryActionCatalog::seeded());

    AuditOrchestrator::new(registry, scoring, recommendations)
}

fn with_operational_routes<S>(
    service: Arc<AuditService<InMemoryActionCatalog, S>>,
) -> axum::Router
where
    S: AuditStore + 'static,
{
    audit_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(AuditService::new(
        build_orchestrator(&config),
        Arc::new(InMemoryAuditStore::new()),
    ));

    let app = with_operational_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "climate risk audit service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_compute(args: ComputeArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let orchestrator = build_orchestrator(&config);
    let site = SiteProfile {
        lat: args.lat,
        lng: args.lng,
        has_basement: args.basement,
        sector: args.sector,
        building_type: args.building_type,
        criticality: Criticality::from_input(args.criticality.as_deref()),
    };

    let result = orchestrator.assess(&site).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&result).expect("assessment result serializes")
    );
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
