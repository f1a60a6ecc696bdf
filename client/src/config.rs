use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://localhost:8080/api";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_COOLDOWN_TICK_MS: u64 = 100;
pub const DEFAULT_PIXEL_UNIT: f64 = 10.0;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 3;
pub const DEFAULT_EXPORT_TIMEOUT_SECS: u64 = 120; // video rendering is slow
pub const DEFAULT_SESSION_FILE: &str = ".placeboard-session.json";
pub const USER_AGENT: &str = "placeboard-client/0.1";

/// Runtime settings, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base: String,
    pub poll_interval: Duration,
    pub cooldown_tick: Duration,
    pub pixel_unit: f64,
    pub http_timeout: Duration,
    pub connect_timeout: Duration,
    pub export_timeout: Duration,
    pub session_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            cooldown_tick: Duration::from_millis(DEFAULT_COOLDOWN_TICK_MS),
            pixel_unit: DEFAULT_PIXEL_UNIT,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            export_timeout: Duration::from_secs(DEFAULT_EXPORT_TIMEOUT_SECS),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_base: api_base(),
            poll_interval: poll_interval(),
            cooldown_tick: cooldown_tick(),
            pixel_unit: pixel_unit(),
            http_timeout: http_timeout(),
            connect_timeout: connect_timeout(),
            export_timeout: export_timeout(),
            session_file: session_file(),
        }
    }
}

pub fn api_base() -> String {
    std::env::var("PLACEBOARD_API_BASE")
        .ok()
        .map(|value| value.trim().trim_end_matches('/').to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}

pub fn poll_interval() -> Duration {
    millis_var("PLACEBOARD_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)
}

pub fn cooldown_tick() -> Duration {
    millis_var("PLACEBOARD_COOLDOWN_TICK_MS", DEFAULT_COOLDOWN_TICK_MS)
}

pub fn pixel_unit() -> f64 {
    std::env::var("PLACEBOARD_PIXEL_UNIT")
        .ok()
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value > 0.0)
        .unwrap_or(DEFAULT_PIXEL_UNIT)
}

pub fn http_timeout() -> Duration {
    secs_var("PLACEBOARD_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)
}

pub fn connect_timeout() -> Duration {
    secs_var("PLACEBOARD_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)
}

pub fn export_timeout() -> Duration {
    secs_var("PLACEBOARD_EXPORT_TIMEOUT_SECS", DEFAULT_EXPORT_TIMEOUT_SECS)
}

pub fn session_file() -> PathBuf {
    std::env::var("PLACEBOARD_SESSION_FILE")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE))
}

fn millis_var(name: &str, default: u64) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_millis)
        .unwrap_or_else(|| Duration::from_millis(default))
}

fn secs_var(name: &str, default: u64) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default))
}
