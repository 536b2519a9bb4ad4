use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

use freightbill_api::{app, config, db, events, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = config::load_config().context("failed to load configuration")?;
    config::init_tracing(app_config.log_level(), app_config.log_json);

    info!(
        environment = %app_config.environment,
        "starting freightbill-api v{}",
        env!("CARGO_PKG_VERSION")
    );

    let db_pool = Arc::new(
        db::establish_connection_from_app_config(&app_config)
            .await
            .context("failed to connect to database")?,
    );

    if app_config.auto_migrate {
        info!("running database migrations");
        db::run_migrations(&db_pool)
            .await
            .context("failed to run migrations")?;
    }

    let (event_tx, event_rx) = mpsc::channel(1024);
    let event_sender = events::EventSender::new(event_tx);

    tokio::spawn(events::process_events(event_rx));
    events::outbox::start_worker(db_pool.clone(), event_sender.clone()).await;

    let state = AppState::new(db_pool, app_config.clone(), event_sender);

    // stale drafts are reclaimed in the background, not on access
    let drafts = state.drafts.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(60));
        loop {
            tick.tick().await;
            drafts.sweep_expired();
        }
    });

    let addr = format!("{}:{}", app_config.host, app_config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("listening on {}", addr);

    if let Err(e) = axum::serve(listener, app(state)).await {
        error!("server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
