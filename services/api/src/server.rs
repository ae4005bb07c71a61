use crate::cli::ServeArgs;
use crate::infra::{open_store, AppState};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use leaddesk::config::AppConfig;
use leaddesk::dashboard::Dashboard;
use leaddesk::error::AppError;
use leaddesk::intake::IntakeService;
use leaddesk::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = open_store(&config.store, None)?;
    if config.dashboard.credentials.password.is_none() {
        warn!("APP_ADMIN_PASSWORD is not set; admin login is disabled");
    }
    let dashboard = Arc::new(Dashboard::new(Arc::clone(&store), &config.dashboard));
    let intake = Arc::new(IntakeService::new(store));

    let app = with_service_routes(dashboard, intake)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "lead desk ready");

    axum::serve(listener, app).await?;
    Ok(())
}
