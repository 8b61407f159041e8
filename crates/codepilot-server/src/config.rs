// Server Configuration
//
// Listener, CORS and rate limit settings read from the environment. Parsing goes through
// a lookup function so it can be exercised without touching process state.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use codepilot_lib::{AIError, AIResult};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;
/// Requests allowed per client within one window
pub const DEFAULT_RATE_LIMIT_MAX: u32 = 30;
pub const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Allowed browser origin; any origin when `None`
    pub cors_origin: Option<String>,
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            cors_origin: None,
            rate_limit_max: DEFAULT_RATE_LIMIT_MAX,
            rate_limit_window: DEFAULT_RATE_LIMIT_WINDOW,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> AIResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AIResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = non_blank("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host = host
            .parse::<IpAddr>()
            .map_err(|_| AIError::InvalidConfig(format!("HOST must be an IP address, got '{}'", host)))?;

        let port = match non_blank("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| AIError::InvalidConfig(format!("PORT must be a port number, got '{}'", raw)))?,
            None => DEFAULT_PORT,
        };

        let rate_limit_max = match non_blank("RATE_LIMIT_MAX") {
            Some(raw) => raw.parse::<u32>().ok().filter(|max| *max > 0).ok_or_else(|| {
                AIError::InvalidConfig(format!("RATE_LIMIT_MAX must be a positive integer, got '{}'", raw))
            })?,
            None => DEFAULT_RATE_LIMIT_MAX,
        };

        let rate_limit_window = match non_blank("RATE_LIMIT_WINDOW") {
            Some(raw) => parse_window(&raw).ok_or_else(|| {
                AIError::InvalidConfig(format!(
                    "RATE_LIMIT_WINDOW must be milliseconds or '<n> <second|minute|hour>', got '{}'",
                    raw
                ))
            })?,
            None => DEFAULT_RATE_LIMIT_WINDOW,
        };

        Ok(Self {
            host,
            port,
            cors_origin: non_blank("CORS_ORIGIN").or_else(|| non_blank("FRONTEND_URL")),
            rate_limit_max,
            rate_limit_window,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Parse a window length: a bare integer is milliseconds, otherwise
/// `<n> <unit>` with unit second, minute or hour (plural allowed)
pub fn parse_window(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if let Ok(millis) = raw.parse::<u64>() {
        return (millis > 0).then(|| Duration::from_millis(millis));
    }

    let mut parts = raw.split_whitespace();
    let amount = parts.next()?.parse::<u64>().ok().filter(|n| *n > 0)?;
    let unit = parts.next()?.to_ascii_lowercase();
    if parts.next().is_some() {
        return None;
    }
    let seconds = match unit.strip_suffix('s').unwrap_or(&unit) {
        "second" | "sec" => 1,
        "minute" | "min" => 60,
        "hour" => 3600,
        _ => return None,
    };
    Some(Duration::from_secs(amount.checked_mul(seconds)?))
}
