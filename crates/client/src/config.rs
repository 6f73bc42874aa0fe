//! Client configuration loaded from the process environment.
use std::env;
use std::str::FromStr;

use runtime::RuntimeConfig;

/// Default number of player turns an autoplay session lasts.
const DEFAULT_AUTOPLAY_TURNS: usize = 200;

#[derive(Clone, Debug)]
pub struct CliConfig {
    pub runtime: RuntimeConfig,
    pub autoplay_turns: usize,
    pub session_id: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            runtime: RuntimeConfig::default(),
            autoplay_turns: DEFAULT_AUTOPLAY_TURNS,
            session_id: None,
        }
    }
}

impl CliConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `DUNGEON_*` - Runtime settings, see [`RuntimeConfig::from_env`]
    /// - `AUTOPLAY_TURNS` - Player turns to play before exiting (default: 200)
    /// - `GAME_SESSION_ID` - Session identifier for the log directory (default: auto-generated)
    pub fn from_env() -> Self {
        let mut config = Self {
            runtime: RuntimeConfig::from_env(),
            ..Self::default()
        };

        if let Some(turns) = read_env::<usize>("AUTOPLAY_TURNS") {
            config.autoplay_turns = turns;
        }

        config.session_id = env::var("GAME_SESSION_ID").ok();

        config
    }
}

fn read_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok()?.parse().ok()
}
