use std::sync::{Arc, Mutex};

use anyhow::Context;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use cottagebook::auth::StaticTokenIdentity;
use cottagebook::config::AppConfig;
use cottagebook::db;
use cottagebook::handlers;
use cottagebook::services::notify::webhook::WebhookNotifier;
use cottagebook::services::notify::{LogNotifier, Notifier};
use cottagebook::services::sweep;
use cottagebook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url, config.store_timeout)?;

    if config.admin_token.is_empty() {
        tracing::warn!("ADMIN_TOKEN is not set, admin operations are disabled");
    }

    let notifier: Box<dyn Notifier> = if config.notify_webhook_url.is_empty() {
        tracing::info!("no NOTIFY_WEBHOOK_URL set, confirmation notices will only be logged");
        Box::new(LogNotifier)
    } else {
        tracing::info!("sending confirmation notices to {}", config.notify_webhook_url);
        Box::new(WebhookNotifier::new(
            config.notify_webhook_url.clone(),
            config.notify_webhook_secret.clone(),
        ))
    };

    let (events_tx, _) = broadcast::channel(256);

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        identity: Box::new(StaticTokenIdentity::from_config(&config)),
        config: config.clone(),
        notifier,
        events_tx,
    });

    sweep::spawn_sweep(Arc::clone(&state));

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
