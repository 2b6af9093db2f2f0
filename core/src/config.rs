//! Environment-sourced configuration and credential tiers.
//!
//! Values are read once, when a client is constructed. Empty variables are
//! treated the same as missing ones.

use std::time::Duration;

use crate::error::{Error, Result};

pub const URL_VAR: &str = "SUPABASE_URL";
pub const ANON_KEY_VAR: &str = "SUPABASE_ANON";
pub const SERVICE_KEY_VAR: &str = "SUPABASE_SERVICE_KEY";
pub const TIMEOUT_VAR: &str = "SUPABASE_TIMEOUT_SECS";

/// Transport timeout applied to every request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Which API key a client attaches to its requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Public anon key; subject to row-level security.
    #[default]
    Anonymous,
    /// Service-role key; required for admin endpoints.
    Privileged,
}

impl Tier {
    /// Environment variable holding this tier's key.
    pub fn key_var(self) -> &'static str {
        match self {
            Tier::Anonymous => ANON_KEY_VAR,
            Tier::Privileged => SERVICE_KEY_VAR,
        }
    }
}

/// Connection settings for the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: Option<String>,
    pub anon_key: Option<String>,
    pub service_key: Option<String>,
    pub timeout: Duration,
}

impl Config {
    /// Reads the settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the settings through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let timeout = match value(TIMEOUT_VAR) {
            None => DEFAULT_TIMEOUT,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!(var = TIMEOUT_VAR, value = %raw, "ignoring invalid timeout");
                    DEFAULT_TIMEOUT
                }
            },
        };

        Self {
            base_url: value(URL_VAR),
            anon_key: value(ANON_KEY_VAR),
            service_key: value(SERVICE_KEY_VAR),
            timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the base URL and the key selected by `tier`.
    pub fn credentials(&self, tier: Tier) -> Result<(&str, &str)> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or(Error::ConfigurationMissing(URL_VAR))?;
        let key = match tier {
            Tier::Anonymous => self.anon_key.as_deref(),
            Tier::Privileged => self.service_key.as_deref(),
        }
        .ok_or(Error::ConfigurationMissing(tier.key_var()))?;
        Ok((base_url, key))
    }
}
