use crate::cli::ServeArgs;
use crate::infra::{build_service, load_rate_book, AppState};
use crate::routes::with_payroll_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use stitch_payroll::config::AppConfig;
use stitch_payroll::error::AppError;
use stitch_payroll::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(path) = args.rates_csv.take() {
        config.payroll.rate_config_csv = Some(path);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let rates = load_rate_book(&config.payroll)?;
    let (service, directory) = build_service(rates);
    info!(staff = directory.roster().len(), "staff directory seeded");

    let app = with_payroll_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "stitch payroll service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
