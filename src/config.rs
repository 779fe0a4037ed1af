use crate::cli::Cli;
use crate::error::BoardResult;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

const TRACE_LEVELS: [&'static str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];
const LOCAL_SETTINGS_YAML_FILE: &str = "hackboard.yaml";
const ENV_PREFIX: &str = "HACKBOARD_";

// All settings may be configured via a local yaml file, environment variables or
// command line flags, later sources winning. Example:
// HACKBOARD_LEADERBOARD_TTL_MS=5000 would set leaderboard_ttl_ms to 5000.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Settings {
    #[serde(default = "default_trace_level")]
    trace_level: String,
    #[serde(default = "default_cache_default_ttl_ms")]
    pub cache_default_ttl_ms: u64,
    // Six fields cron expression, seconds first
    #[serde(default = "default_cache_sweep_schedule")]
    pub cache_sweep_schedule: String,
    // Periodic full rank recompute of every event. Disabled when unset.
    #[serde(default)]
    pub rank_reconcile_schedule: Option<String>,
    // Family TTLs (see `CacheFamily::ttl`). Sponsors, resources and profile are not
    // read by the console; they are there for read endpoints using the same keys.
    #[serde(default = "default_sponsors_ttl_ms")]
    pub sponsors_ttl_ms: u64,
    #[serde(default = "default_events_ttl_ms")]
    pub events_ttl_ms: u64,
    #[serde(default = "default_leaderboard_ttl_ms")]
    pub leaderboard_ttl_ms: u64,
    #[serde(default = "default_resources_ttl_ms")]
    pub resources_ttl_ms: u64,
    #[serde(default = "default_profile_ttl_ms")]
    pub profile_ttl_ms: u64,
    #[serde(default = "default_pagination_default_limit")]
    pub pagination_default_limit: u32,
    #[serde(default = "default_pagination_max_limit")]
    pub pagination_max_limit: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            trace_level: default_trace_level(),
            cache_default_ttl_ms: default_cache_default_ttl_ms(),
            cache_sweep_schedule: default_cache_sweep_schedule(),
            rank_reconcile_schedule: None,
            sponsors_ttl_ms: default_sponsors_ttl_ms(),
            events_ttl_ms: default_events_ttl_ms(),
            leaderboard_ttl_ms: default_leaderboard_ttl_ms(),
            resources_ttl_ms: default_resources_ttl_ms(),
            profile_ttl_ms: default_profile_ttl_ms(),
            pagination_default_limit: default_pagination_default_limit(),
            pagination_max_limit: default_pagination_max_limit(),
        }
    }
}

impl Settings {
    pub fn load(cli: &Cli) -> BoardResult<Self> {
        Ok(Self::figment(cli).extract()?)
    }

    pub fn figment(cli: &Cli) -> Figment {
        let yaml_file = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(LOCAL_SETTINGS_YAML_FILE));

        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if Path::new(&yaml_file).exists() {
            figment = figment.merge(Yaml::file(yaml_file));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(cli))
    }

    pub fn get_trace_level(&self) -> Level {
        get_trace_level(&self.trace_level)
    }

    pub fn cache_default_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_default_ttl_ms)
    }
}

fn get_trace_level(level_str: &str) -> Level {
    match level_str.to_uppercase().as_str() {
        level if level == TRACE_LEVELS[0] => Level::TRACE,
        level if level == TRACE_LEVELS[1] => Level::DEBUG,
        level if level == TRACE_LEVELS[2] => Level::INFO,
        level if level == TRACE_LEVELS[3] => Level::WARN,
        level if level == TRACE_LEVELS[4] => Level::ERROR,
        // Default trace level
        _ => Level::INFO,
    }
}

fn default_trace_level() -> String {
    "INFO".to_string()
}

fn default_cache_default_ttl_ms() -> u64 {
    60_000
}

fn default_cache_sweep_schedule() -> String {
    // every 5 minutes
    "0 */5 * * * *".to_string()
}

fn default_sponsors_ttl_ms() -> u64 {
    5 * 60 * 1000
}

fn default_events_ttl_ms() -> u64 {
    2 * 60 * 1000
}

fn default_leaderboard_ttl_ms() -> u64 {
    30 * 1000
}

fn default_resources_ttl_ms() -> u64 {
    5 * 60 * 1000
}

fn default_profile_ttl_ms() -> u64 {
    60 * 1000
}

fn default_pagination_default_limit() -> u32 {
    20
}

fn default_pagination_max_limit() -> u32 {
    100
}
