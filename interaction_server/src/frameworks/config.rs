use std::{env, io, path::PathBuf, time::Duration};

use crate::domain::tuning::Tuning;

// Runtime/server constants (not gameplay tuning).

pub fn status_port() -> u16 {
    env::var("STATUS_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3005)
}

pub fn session_bridge_url() -> String {
    env::var("SESSION_BRIDGE_URL").unwrap_or_else(|_| "http://127.0.0.1:3100".to_string())
}

// Unset or unparsable means no per-request timeout.
pub fn session_request_timeout() -> Option<Duration> {
    env::var("SESSION_REQUEST_TIMEOUT_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Comma-separated display names; an empty list allows every actor.
pub fn allowed_actors() -> Vec<String> {
    parse_actor_list(&env::var("ALLOWED_ACTORS").unwrap_or_default())
}

pub fn tuning_path() -> Option<PathBuf> {
    env::var("INTERACTION_TUNING_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
}

/// Defaults, overridden by the TOML file at `INTERACTION_TUNING_PATH` when set.
pub fn load_tuning() -> io::Result<Tuning> {
    let Some(path) = tuning_path() else {
        return Ok(Tuning::default());
    };
    let text = std::fs::read_to_string(&path)
        .map_err(|e| io::Error::new(e.kind(), format!("read {}: {e}", path.display())))?;
    parse_tuning(&text)
}

pub fn parse_tuning(text: &str) -> io::Result<Tuning> {
    toml::from_str(text).map_err(|e| io::Error::other(format!("parse tuning TOML: {e}")))
}

fn parse_actor_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

pub const PROBE_INTERVAL: Duration = Duration::from_millis(1000);

pub const COMBAT_PERIOD: Duration = Duration::from_millis(20);
pub const ARCHERY_PERIOD: Duration = Duration::from_millis(100);
pub const STONE_TELEPORT_PERIOD: Duration = Duration::from_millis(200);
pub const AUTO_FORGE_PERIOD: Duration = Duration::from_millis(200);
pub const TAVERN_PERIOD: Duration = Duration::from_millis(500);
pub const STARLIGHT_PERIOD: Duration = Duration::from_millis(500);
pub const GESTURE_PERIOD: Duration = Duration::from_millis(500);
pub const ROSTER_PERIOD: Duration = Duration::from_millis(500);
pub const SOCIAL_PERIOD: Duration = Duration::from_millis(500);
pub const DRINKING_PERIOD: Duration = Duration::from_millis(1000);
