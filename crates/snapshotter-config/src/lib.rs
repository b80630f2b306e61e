pub mod error;

pub use error::*;

use std::fmt;
use std::time::Duration;

pub const ENV_TOKEN: &str = "DO_TOKEN";
pub const ENV_VOLUMES: &str = "DO_VOLUMES";
pub const ENV_SNAPSHOT_COUNT: &str = "DO_SNAPSHOT_COUNT";
pub const ENV_API_URL: &str = "DO_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "DO_TIMEOUT_SECS";

pub const DEFAULT_API_URL: &str = "https://api.digitalocean.com/v2";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Provider credential; never printed
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

/// Connection settings for the provider gateway
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub token: ApiToken,
    pub api_url: String,
    pub timeout: Duration,
}

/// What to rotate and how many snapshots to keep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionConfig {
    /// Volume identifiers, processed in this order
    pub volume_ids: Vec<String>,

    /// Maximum number of snapshots kept per volume after rotation
    pub snapshot_count: usize,
}

#[derive(Debug, Clone)]
pub struct SnapshotterConfig {
    pub provider: ProviderConfig,
    pub retention: RetentionConfig,
}

/// Unvalidated setting values, as collected from the environment or CLI
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub token: Option<String>,
    pub volumes: Option<String>,
    pub snapshot_count: Option<String>,
    pub api_url: Option<String>,
    pub timeout_secs: Option<String>,
}

impl Settings {
    /// Collect settings through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            token: lookup(ENV_TOKEN),
            volumes: lookup(ENV_VOLUMES),
            snapshot_count: lookup(ENV_SNAPSHOT_COUNT),
            api_url: lookup(ENV_API_URL),
            timeout_secs: lookup(ENV_TIMEOUT_SECS),
        }
    }
}

impl SnapshotterConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_settings(Settings::from_lookup(|name| std::env::var(name).ok()))
    }

    /// Validate collected settings
    ///
    /// Required settings are checked in the order token, volumes, count so
    /// the first reported error is stable.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let token = settings.token.ok_or(ConfigError::MissingEnvVar(ENV_TOKEN))?;
        let volumes = settings
            .volumes
            .ok_or(ConfigError::MissingEnvVar(ENV_VOLUMES))?;
        let snapshot_count = settings
            .snapshot_count
            .ok_or(ConfigError::MissingEnvVar(ENV_SNAPSHOT_COUNT))?;

        let volume_ids = parse_volume_ids(&volumes)?;
        let snapshot_count = parse_non_negative(ENV_SNAPSHOT_COUNT, &snapshot_count)?;

        if snapshot_count == 0 {
            tracing::warn!(
                "{} is 0: every snapshot, including the one just created, will be deleted",
                ENV_SNAPSHOT_COUNT
            );
        }

        let api_url = match settings.api_url {
            Some(url) => parse_api_url(&url)?,
            None => DEFAULT_API_URL.to_string(),
        };

        let timeout_secs = match settings.timeout_secs {
            Some(secs) => parse_positive(ENV_TIMEOUT_SECS, &secs)?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            provider: ProviderConfig {
                token: ApiToken::new(token),
                api_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            retention: RetentionConfig {
                volume_ids,
                snapshot_count,
            },
        })
    }
}

/// Split a comma-separated volume list, keeping order
fn parse_volume_ids(value: &str) -> Result<Vec<String>> {
    value
        .split(',')
        .enumerate()
        .map(|(position, id)| {
            let id = id.trim();
            if id.is_empty() {
                return Err(ConfigError::EmptyVolumeId {
                    name: ENV_VOLUMES,
                    position,
                });
            }
            Ok(id.to_string())
        })
        .collect()
}

fn parse_non_negative(name: &'static str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::NotAnInteger {
            name,
            value: value.to_string(),
        })
}

/// A zero request timeout would fail every call immediately
fn parse_positive(name: &'static str, value: &str) -> Result<u64> {
    match parse_non_negative(name, value)? {
        0 => Err(ConfigError::NotPositive {
            name,
            value: value.to_string(),
        }),
        n => Ok(n as u64),
    }
}

fn parse_api_url(value: &str) -> Result<String> {
    let url = value.trim();
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(url.trim_end_matches('/').to_string())
    } else {
        Err(ConfigError::InvalidUrl {
            name: ENV_API_URL,
            value: value.to_string(),
        })
    }
}
