//! Runtime configuration from environment variables, with defaults for a single-host deployment.

use crate::logic::{SlotMapBuilder, THIRD_PLACE_MATCH_ID};
use crate::models::MatchId;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_REFEREE_PASSWORD: &str = "referee";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// Variable set but not parseable.
    Invalid { var: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { var, value } => {
                write!(f, "Invalid value for {}: '{}'", var, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Holds matches.json and knockout.json.
    pub data_dir: PathBuf,
    /// `name,group` CSV; the built-in roster when unset.
    pub roster_path: Option<PathBuf>,
    /// Read-only views served at `/`.
    pub static_dir: PathBuf,
    pub referee_password: String,
    pub third_place_id: MatchId,
    pub best_placed_slots: usize,
    pub lock_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            data_dir: PathBuf::from("data"),
            roster_path: None,
            static_dir: PathBuf::from("static"),
            referee_password: DEFAULT_REFEREE_PASSWORD.to_string(),
            third_place_id: MatchId::from(THIRD_PLACE_MATCH_ID),
            best_placed_slots: SlotMapBuilder::default().best_placed_slots,
            lock_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Read HOST, PORT, DATA_DIR, ROSTER_PATH, STATIC_DIR, REFEREE_PASSWORD,
    /// THIRD_PLACE_MATCH_ID, BEST_PLACED_SLOTS and LOCK_TIMEOUT_SECS.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = parse_var("PORT", port)?;
        }
        if let Some(dir) = lookup("DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        config.roster_path = lookup("ROSTER_PATH").map(PathBuf::from);
        if let Some(dir) = lookup("STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }
        match lookup("REFEREE_PASSWORD") {
            Some(password) if !password.is_empty() => config.referee_password = password,
            _ => log::warn!("REFEREE_PASSWORD not set; using the default referee password"),
        }
        if let Some(id) = lookup("THIRD_PLACE_MATCH_ID") {
            config.third_place_id = MatchId::from(id);
        }
        if let Some(n) = lookup("BEST_PLACED_SLOTS") {
            config.best_placed_slots = parse_var("BEST_PLACED_SLOTS", n)?;
        }
        if let Some(secs) = lookup("LOCK_TIMEOUT_SECS") {
            config.lock_timeout = Duration::from_secs(parse_var("LOCK_TIMEOUT_SECS", secs)?);
        }
        Ok(config)
    }

    pub fn slot_map_builder(&self) -> SlotMapBuilder {
        SlotMapBuilder {
            best_placed_slots: self.best_placed_slots,
            ..SlotMapBuilder::default()
        }
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value })
}
