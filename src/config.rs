use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8001;
pub const DEFAULT_ROUND_SECS: u32 = 10;
pub const DEFAULT_PAUSE_SECS: u64 = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("{key} must be at least 1")]
    Zero { key: &'static str },
}

/// How long a round lasts and how long the server waits before the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTiming {
    /// Number of countdown ticks in a round
    pub round_secs: u32,
    pub pause: Duration,
    pub tick: Duration,
}

impl Default for RoundTiming {
    fn default() -> Self {
        Self {
            round_secs: DEFAULT_ROUND_SECS,
            pause: Duration::from_secs(DEFAULT_PAUSE_SECS),
            tick: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub timing: RoundTiming,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            timing: RoundTiming::default(),
        }
    }
}

impl ServerConfig {
    /// Reads `PORT`, `BEATPAD_ROUND_SECS` and `BEATPAD_PAUSE_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = parse(&lookup, "PORT")? {
            config.port = port;
        }
        if let Some(round_secs) = parse::<u32, _>(&lookup, "BEATPAD_ROUND_SECS")? {
            if round_secs == 0 {
                return Err(ConfigError::Zero {
                    key: "BEATPAD_ROUND_SECS",
                });
            }
            config.timing.round_secs = round_secs;
        }
        if let Some(pause_secs) = parse::<u64, _>(&lookup, "BEATPAD_PAUSE_SECS")? {
            config.timing.pause = Duration::from_secs(pause_secs);
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn parse<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
