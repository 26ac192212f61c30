//! Visitor service entrypoint.

use coworkd_common::{Mailer, SmtpMailer};
use coworkd_visitors::jobs::{self, JobContext};
use coworkd_visitors::store::SessionStore;
use coworkd_visitors::{AppState, Config, router};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coworkd_visitors=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = Config::from_env();

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let mailer: Option<Arc<dyn Mailer>> = match config.mail_credentials() {
        Some((sender, password)) => Some(Arc::new(SmtpMailer::new(
            config.smtp_server.clone(),
            config.smtp_port,
            sender.clone(),
            password,
            sender,
            "Co-working Space".to_string(),
        ))),
        None => {
            warn!("EMAIL_SENDER/EMAIL_PASSWORD not set, report delivery disabled");
            None
        }
    };

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(pool.clone(), config);

    // The jobs run on their own pool handle, outside the request path. The
    // scheduler must stay alive for as long as the server runs.
    let _scheduler = jobs::start(JobContext {
        store: SessionStore::new(pool),
        mailer,
        config: state.config.clone(),
    })
    .await?;
    info!("Report scheduler started: daily at 11:00, monthly on the last day at 23:59");

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "Visitor service listening");
    axum::serve(listener, app).await?;

    Ok(())
}
