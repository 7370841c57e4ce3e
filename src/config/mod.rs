//! Settings read from environment variables.
//!
//! Every reader takes a lookup function instead of touching the process
//! environment directly, `from_env` variants plug in [std::env::var].

use anyhow::{anyhow, bail, Context, Result};

use super::ticket::TicketId;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Bearer credential (JWT) for the Pinata API
pub static PINATA_JWT_ENV: &str = "PINATA_JWT";
/// Base URL of the Pinata API
pub static PINATA_API_URL_ENV: &str = "PINATA_API_URL";
/// Base URL of the gateway used in metadata documents
pub static PINATA_GATEWAY_URL_ENV: &str = "PINATA_GATEWAY_URL";
/// Seconds before a pinning request is abandoned
pub static PINATA_TIMEOUT_ENV: &str = "PINATA_TIMEOUT_SECS";
/// Origin that ticket QR codes link to
pub static TICKET_ORIGIN_ENV: &str = "TICKET_ORIGIN";
/// Ticket issued by the `issue-ticket` binary when no argument is given
pub static TICKET_ID_ENV: &str = "TICKET_ID";
/// Port of the development server
pub static PORT_ENV: &str = "PORT";
/// Directory holding the built front-end
pub static STATIC_DIR_ENV: &str = "STATIC_DIR";

pub const DEFAULT_PINATA_API_URL: &str = "https://api.pinata.cloud";
pub const DEFAULT_PINATA_GATEWAY_URL: &str = "https://gateway.pinata.cloud";
pub const DEFAULT_PINATA_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STATIC_DIR: &str = "dist";

/// How to reach and authenticate against Pinata
#[derive(Clone, PartialEq, Eq)]
pub struct PinataConfig {
    pub jwt: String,
    pub api_url: String,
    pub gateway_url: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for PinataConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinataConfig")
            .field("jwt", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("gateway_url", &self.gateway_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl PinataConfig {
    /// Configuration for the public Pinata endpoints
    pub fn new(jwt: impl Into<String>) -> Self {
        PinataConfig {
            jwt: jwt.into(),
            api_url: DEFAULT_PINATA_API_URL.to_string(),
            gateway_url: DEFAULT_PINATA_GATEWAY_URL.to_string(),
            timeout: DEFAULT_PINATA_TIMEOUT,
        }
    }

    /// Reads the configuration, `None` when no credential is set
    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt = match non_empty(&lookup, PINATA_JWT_ENV) {
            Some(jwt) => jwt,
            None => return Ok(None),
        };
        let mut config = PinataConfig::new(jwt);
        if let Some(api_url) = non_empty(&lookup, PINATA_API_URL_ENV) {
            config.api_url = api_url;
        }
        if let Some(gateway_url) = non_empty(&lookup, PINATA_GATEWAY_URL_ENV) {
            config.gateway_url = gateway_url;
        }
        if let Some(timeout) = non_empty(&lookup, PINATA_TIMEOUT_ENV) {
            let seconds = timeout
                .parse::<u64>()
                .with_context(|| format!("{} must be a number of seconds", PINATA_TIMEOUT_ENV))?;
            if seconds == 0 {
                bail!("{} must be at least 1 second", PINATA_TIMEOUT_ENV);
            }
            config.timeout = Duration::from_secs(seconds);
        }
        Ok(Some(config))
    }

    pub fn from_env() -> Result<Option<Self>> {
        Self::from_lookup(env_lookup)
    }

    /// Like [PinataConfig::from_env], but a missing credential is an error
    pub fn require_from_env() -> Result<Self> {
        Self::from_env()?.ok_or_else(|| anyhow!("{} must be set", PINATA_JWT_ENV))
    }
}

/// Development server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: PathBuf,
    /// Origin embedded in ticket QR codes
    pub origin: String,
}

impl ServerConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = port(&lookup)?;
        let static_dir = non_empty(&lookup, STATIC_DIR_ENV)
            .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())
            .into();
        Ok(ServerConfig {
            port,
            static_dir,
            origin: ticket_origin(&lookup, port),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }
}

/// Settings of the `issue-ticket` binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueConfig {
    pub ticket_id: TicketId,
    /// Origin embedded in the ticket QR code
    pub origin: String,
}

impl IssueConfig {
    /// Reads the ticket to issue from `argument`, falling back to `TICKET_ID`
    pub fn from_lookup<F>(argument: Option<String>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = argument
            .map(|argument| argument.trim().to_string())
            .filter(|argument| !argument.is_empty())
            .or_else(|| non_empty(&lookup, TICKET_ID_ENV))
            .ok_or_else(|| anyhow!("pass a ticket id or set {}", TICKET_ID_ENV))?;
        let ticket_id = raw
            .parse::<TicketId>()
            .with_context(|| format!("couldn't use {:?} as a ticket id", raw))?;
        Ok(IssueConfig {
            ticket_id,
            origin: ticket_origin(&lookup, port(&lookup)?),
        })
    }

    pub fn from_env(argument: Option<String>) -> Result<Self> {
        Self::from_lookup(argument, env_lookup)
    }
}

/// Port of the development server, `PORT` or 3000
pub fn port<F>(lookup: &F) -> Result<u16>
where
    F: Fn(&str) -> Option<String>,
{
    match non_empty(lookup, PORT_ENV) {
        Some(port) => port
            .parse::<u16>()
            .with_context(|| format!("{} must be a port number", PORT_ENV)),
        None => Ok(DEFAULT_PORT),
    }
}

/// Origin for QR deep links, defaults to the local development server
pub fn ticket_origin<F>(lookup: &F, port: u16) -> String
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, TICKET_ORIGIN_ENV)
        .map(|origin| origin.trim_end_matches('/').to_string())
        .unwrap_or_else(|| format!("http://localhost:{}", port))
}

#[doc(hidden)]
fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[doc(hidden)]
fn env_lookup(key: &str) -> Option<String> {
    env::var(key).ok()
}
