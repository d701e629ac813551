//! Startup configuration: where the task API lives and where logs go.

use std::path::PathBuf;

use url::{Host, Url};

use crate::error::{Error, Result};

/// Full base address override, e.g. `https://todo.example.com/api`.
pub const API_URL_VAR: &str = "TASKLIST_API_URL";
/// Address the client is deployed behind; selects the `/api` routing convention.
pub const ORIGIN_VAR: &str = "TASKLIST_ORIGIN";
pub const LOG_FILE_VAR: &str = "TASKLIST_LOG_FILE";

/// Base address used when running against a store on this machine.
pub const LOCAL_API_URL: &str = "http://localhost:5001/api";
/// Path the routing layer exposes the API under.
pub const API_PATH: &str = "/api";
const DEFAULT_LOG_FILE: &str = "tasklist.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: Url,
    pub log_file: PathBuf,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = resolve_base_url(lookup(API_URL_VAR).as_deref(), lookup(ORIGIN_VAR).as_deref())?;
        let log_file = lookup(LOG_FILE_VAR)
            .filter(|v| !v.is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), PathBuf::from);
        Ok(Self { base_url, log_file })
    }
}

/// Resolve the API base address, in order: explicit override, `/api` on a
/// non-loopback origin, then the local development default.
pub fn resolve_base_url(override_url: Option<&str>, origin: Option<&str>) -> Result<Url> {
    if let Some(url) = override_url.map(str::trim).filter(|u| !u.is_empty()) {
        return parse_base(url, API_URL_VAR);
    }

    match origin.map(str::trim).filter(|o| !o.is_empty()) {
        Some(origin) => {
            let origin = parse_base(origin, ORIGIN_VAR)?;
            if is_loopback(&origin) {
                Ok(Url::parse(LOCAL_API_URL)?)
            } else {
                Ok(origin.join(API_PATH)?)
            }
        }
        None => Ok(Url::parse(LOCAL_API_URL)?),
    }
}

fn parse_base(raw: &str, var: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::config(format!("{var}={raw:?}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(Error::config(format!("{var}={raw:?} cannot be used as a base address")));
    }
    Ok(url)
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => true,
    }
}
