use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemorySessionStore, TracingNotifier};
use crate::routes::with_signup_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use course_signup::catalog::CourseCatalog;
use course_signup::config::AppConfig;
use course_signup::error::AppError;
use course_signup::telemetry;
use course_signup::workflows::signup::SignupService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(catalog_path) = args.catalog.take() {
        config.catalog.path = catalog_path;
    }

    telemetry::init(&config.telemetry)?;

    // Without a readable catalog the signup feature cannot be offered at all.
    let catalog = Arc::new(CourseCatalog::load(&config.catalog.path)?);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let sessions = Arc::new(InMemorySessionStore::default());
    let notifier = Arc::new(TracingNotifier);
    let signup_service = Arc::new(SignupService::new(catalog, sessions, notifier));

    let app = with_signup_routes(signup_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "course signup service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
