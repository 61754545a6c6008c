use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod leave;
mod messenger;
mod model;
mod models;
mod routes;
mod store;

use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::leave::tasks::drain_reports;
use crate::leave::{AttendanceService, Clock, KeyedLocks, LeaveService, SystemClock, TaskQueue};
use crate::messenger::{LogMessenger, Messenger, SmtpMessenger};
use crate::store::{MySqlStore, Store};
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Campus leave service"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to connect to database")?;
    let store: Arc<dyn Store> = Arc::new(MySqlStore::new(pool));

    let messenger: Arc<dyn Messenger> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpMessenger::new(smtp).context("Failed to configure SMTP")?),
        None => {
            warn!("SMTP not configured; notifications will only be logged");
            Arc::new(LogMessenger)
        }
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let locks = Arc::new(KeyedLocks::new());
    let (tasks, reports) = TaskQueue::new();

    actix_web::rt::spawn(drain_reports(reports));

    let leave_service = Data::new(LeaveService::new(
        store.clone(),
        messenger,
        clock.clone(),
        locks.clone(),
        tasks,
    ));
    let attendance_service = Data::new(AttendanceService::new(store, clock, locks));

    let limiter = Arc::new(routes::build_limiter(config.rate_protected_per_min)?);
    let server_addr = config.server_addr.clone();
    let config_data = Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(config_data.clone())
            .app_data(leave_service.clone())
            .app_data(attendance_service.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config_data.api_prefix, limiter.clone()))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
