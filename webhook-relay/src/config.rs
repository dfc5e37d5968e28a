//! Process configuration.
//!
//! Everything comes from environment variables (a `.env` file is loaded by
//! `main` when present). See the crate docs for the full table.

use std::{fmt::Display, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::warn;

use crate::{display_time::DisplayClock, secrets::SecretsClient};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DESTINATIONS: &str = "main,secondary";
pub const DEFAULT_MAIL_FROM: &str = "onboarding@resend.dev";
pub const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com";
pub const DEFAULT_RESEND_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = -180;
pub const DEFAULT_TIME_FORMAT: &str = "%M/%H %d/%m/%Y";

/// The destination whose key lives in the unsuffixed `RESEND_API_KEY`.
const PRIMARY_DESTINATION: &str = "main";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(String),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

// ------------------------------------------------------------------ //
//  Types                                                              //
// ------------------------------------------------------------------ //

/// One mailbox group with its own Resend account.
#[derive(Debug, Clone)]
pub struct DestinationConfig {
    pub name: String,
    pub api_key: String,
    pub to: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub from: String,
    pub timeout: Duration,
    pub destinations: Vec<DestinationConfig>,
}

#[derive(Debug)]
pub struct RelayConfig {
    pub bind_addr: String,
    /// Refuse to start when [`RelayConfig::mail`] is an error.
    pub strict_startup: bool,
    pub clock: DisplayClock,
    /// Kept as a result so a non-strict process can still serve `/api/view`.
    pub mail: Result<MailConfig, ConfigError>,
}

// ------------------------------------------------------------------ //
//  Loading                                                            //
// ------------------------------------------------------------------ //

impl RelayConfig {
    /// Fails only on malformed settings; incomplete mail settings land in `mail`.
    pub async fn load(secrets: &SecretsClient) -> Result<Self, ConfigError> {
        let clock = DisplayClock::new(
            parse_env("DISPLAY_UTC_OFFSET_MINUTES", DEFAULT_UTC_OFFSET_MINUTES)?,
            read_env("DISPLAY_TIME_FORMAT", DEFAULT_TIME_FORMAT),
        )?;
        let strict_startup = parse_bool(
            "RELAY_STRICT_STARTUP",
            &read_env("RELAY_STRICT_STARTUP", "true"),
        )?;

        Ok(Self {
            bind_addr: read_env("RELAY_ADDR", DEFAULT_BIND_ADDR),
            strict_startup,
            clock,
            mail: MailConfig::load(secrets).await,
        })
    }
}

impl MailConfig {
    pub async fn load(secrets: &SecretsClient) -> Result<Self, ConfigError> {
        let names = destination_names(&read_env("RELAY_DESTINATIONS", DEFAULT_DESTINATIONS));
        if names.is_empty() {
            return Err(ConfigError::Missing("RELAY_DESTINATIONS".into()));
        }

        let timeout_secs = parse_env("RESEND_TIMEOUT_SECS", DEFAULT_RESEND_TIMEOUT_SECS)?;

        let mut destinations = Vec::with_capacity(names.len());
        for name in names {
            let key_var = api_key_var(&name);
            let api_key = match secrets.resolve(&key_var).await {
                Ok(key) => key,
                Err(e) => {
                    warn!(destination = %name, error = %e, "Resend API key unavailable");
                    return Err(ConfigError::Missing(key_var));
                }
            };

            let to_var = recipients_var(&name);
            let to = parse_recipients(&read_env(&to_var, ""));
            if to.is_empty() {
                return Err(ConfigError::Missing(to_var));
            }

            destinations.push(DestinationConfig { name, api_key, to });
        }

        Ok(Self {
            api_url: read_env("RESEND_API_URL", DEFAULT_RESEND_API_URL),
            from: read_env("MAIL_FROM", DEFAULT_MAIL_FROM),
            timeout: Duration::from_secs(timeout_secs),
            destinations,
        })
    }
}

// ------------------------------------------------------------------ //
//  Helpers                                                            //
// ------------------------------------------------------------------ //

/// Trimmed env var, or `default` when unset or blank.
pub fn read_env(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => default.to_string(),
    }
}

fn parse_env<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v.trim().parse().map_err(|e: T::Err| {
            ConfigError::Invalid {
                name: key,
                reason: e.to_string(),
            }
        }),
        _ => Ok(default),
    }
}

pub fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            name,
            reason: format!("'{other}' is not a boolean"),
        }),
    }
}

/// Lowercased, de-duplicated destination names in declaration order.
pub fn destination_names(raw: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in raw.split(',').map(|n| n.trim().to_ascii_lowercase()) {
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

pub fn api_key_var(destination: &str) -> String {
    if destination == PRIMARY_DESTINATION {
        "RESEND_API_KEY".to_string()
    } else {
        format!("RESEND_API_KEY_{}", env_suffix(destination))
    }
}

pub fn recipients_var(destination: &str) -> String {
    format!("MAIL_TO_{}", env_suffix(destination))
}

pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|addr| !addr.is_empty())
        .map(str::to_owned)
        .collect()
}

fn env_suffix(destination: &str) -> String {
    destination
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}
