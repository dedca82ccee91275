use crate::cli::ServeArgs;
use crate::demo::seed_demo;
use crate::infra::{AppState, Services};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use shine::access::{Account, AccountDirectory, Caller};
use shine::config::AppConfig;
use shine::error::AppError;
use shine::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
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

    if config.auth.uses_default_admin_token() {
        warn!(
            username = %config.auth.superuser.username,
            "superuser token left at its default; set SHINE_ADMIN_TOKEN"
        );
    }

    let accounts = Arc::new(AccountDirectory::from_config(&config.auth));
    let services = Services::in_memory(Arc::clone(&accounts));

    if args.seed_demo {
        let caller = Caller::Authenticated(Account::from(&config.auth.superuser));
        let seeded = seed_demo(&services, &caller)?;
        info!(
            posts = seeded.posts,
            bookings = seeded.bookings,
            "demo content seeded"
        );
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_operational_routes(services.router())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        accounts = accounts.len(),
        "sustainable shine api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
