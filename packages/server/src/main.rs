use std::sync::Arc;

use anyhow::Context;
use common::{ContestStore, MemoryStore};
use contest_server::anti_cheat::run_periodic_scan;
use contest_server::clock::SystemClock;
use contest_server::config::AppConfig;
use contest_server::database::init_db;
use contest_server::state::AppState;
use contest_server::store::DatabaseStore;
use executor::PistonClient;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let store: Arc<dyn ContestStore> = match &config.database.url {
        Some(url) => {
            let db = init_db(url)
                .await
                .context("Failed to connect to database")?;
            info!("Using database store");
            Arc::new(DatabaseStore::new(db))
        }
        None => {
            warn!("No database configured, contest state is kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let executor =
        PistonClient::new(&config.executor).context("Failed to build executor client")?;
    info!(url = executor.url(), "Executor client ready");

    let state = AppState::new(
        config.clone(),
        store,
        Arc::new(executor),
        Arc::new(SystemClock),
    );

    let rounds = state.rounds.status().await.context("Failed to read rounds")?;
    for round in &rounds {
        info!(
            round_id = %round.id,
            state = %round.state,
            remaining = ?round.remaining,
            locked = round.is_locked,
            "Round loaded"
        );
    }

    if config.anti_cheat.scan_interval_secs > 0 {
        tokio::spawn(run_periodic_scan(
            state.scanner.clone(),
            config.anti_cheat.scan_interval_secs,
        ));
    }

    info!("Contest server ready");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutting down");

    Ok(())
}
