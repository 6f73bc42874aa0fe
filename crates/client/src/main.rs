//! Dungeon game client binary.
//!
//! Headless composition root: loads configuration from the environment
//! (and `.env`), sets up file logging, starts the runtime, and autoplays a
//! session while every game event is logged as JSON.
//!
//! ```bash
//! DUNGEON_SEED=7 AUTOPLAY_TURNS=500 cargo run -p dungeon-client
//! ```

mod autoplay;
mod config;
mod logging;

use anyhow::Result;
use tokio::sync::broadcast;
use tracing::{info, warn};

use runtime::{Event, Runtime, Topic};

use crate::autoplay::Autoplay;
use crate::config::CliConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = CliConfig::from_env();
    let _log_guard = logging::setup_logging(config.session_id.as_deref())?;

    info!("Starting Dungeon client");
    info!(
        seed = config.runtime.seed,
        width = config.runtime.map_width,
        height = config.runtime.map_height,
        monsters = config.runtime.monster_count,
        turns = config.autoplay_turns,
        "configuration loaded"
    );

    let runtime = Runtime::start(config.runtime.clone()).await?;
    let handle = runtime.handle();
    let event_log = tokio::spawn(log_events(handle.subscribe(Topic::GameState)));

    let summary = Autoplay::new(handle.clone()).run(config.autoplay_turns).await?;
    runtime.shutdown().await?;

    // The log task ends once the last bus sender is gone.
    drop(handle);
    event_log.await?;

    info!(?summary, "client shutdown complete");
    println!(
        "played {} turns, clock {}, {} entities, {}",
        summary.turns_played,
        summary.clock,
        summary.entities,
        if summary.game_over { "player died" } else { "player alive" }
    );
    Ok(())
}

async fn log_events(mut rx: broadcast::Receiver<Event>) {
    loop {
        match rx.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => info!(target: "dungeon::events", "{json}"),
                Err(error) => warn!(target: "dungeon::events", %error, "unserializable event"),
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(target: "dungeon::events", skipped, "event log lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
