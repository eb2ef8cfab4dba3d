use std::ffi::OsString;
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Environment variable holding the bucket name. Required unless the config
/// file sets `bucket_name`.
pub const BUCKET_ENV: &str = "S3_BUCKET_NAME";

/// Environment variable overriding the bind address.
pub const BIND_ENV: &str = "FILES_API_BIND";

/// Upper bound on `max_page_size`. S3 returns at most this many keys per
/// listing call, so a larger page could never be filled.
pub const PAGE_SIZE_CEILING: u32 = 1000;

/// The process environment, skipping entries whose name or value is not
/// valid UTF-8.
pub fn process_env() -> impl Iterator<Item = (String, String)> {
    utf8_vars(std::env::vars_os())
}

fn utf8_vars<I>(vars: I) -> impl Iterator<Item = (String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
}

/// Which object store backs the server.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Memory,
    S3,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::S3 => write!(f, "s3"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = ServerError;

    fn from_str(s: &str) -> ServerResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "s3" => Ok(Self::S3),
            other => Err(ServerError::Config(format!("unknown backend: {other}"))),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Config {
    /// Custom endpoint for S3-compatible services; `None` means AWS.
    pub endpoint_url: Option<String>,
    pub region: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub bucket_name: String,
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub max_upload_bytes: usize,
    pub request_timeout_secs: u64,
    pub backend: BackendKind,
    pub s3: Option<S3Config>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8000)),
            bucket_name: String::new(),
            default_page_size: files_listing::DEFAULT_PAGE_SIZE,
            max_page_size: PAGE_SIZE_CEILING,
            max_upload_bytes: 10 * 1024 * 1024,
            request_timeout_secs: 30,
            backend: BackendKind::Memory,
            s3: None,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> ServerResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(self) -> ServerResult<Self> {
        self.apply_env_vars(process_env())
    }

    /// Apply overrides from `vars`. Names match case-insensitively.
    pub fn apply_env_vars<I>(mut self, vars: I) -> ServerResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            if name.eq_ignore_ascii_case(BUCKET_ENV) {
                self.bucket_name = value;
            } else if name.eq_ignore_ascii_case(BIND_ENV) {
                self.bind_addr = value
                    .parse()
                    .map_err(|e| ServerError::Config(format!("{BIND_ENV}={value}: {e}")))?;
            }
        }
        Ok(self)
    }

    pub fn validate(&self) -> ServerResult<()> {
        if self.bucket_name.trim().is_empty() {
            return Err(ServerError::Config(format!(
                "bucket name is required (set {BUCKET_ENV})"
            )));
        }
        if self.default_page_size == 0 || self.max_page_size == 0 {
            return Err(ServerError::Config("page sizes must be positive".into()));
        }
        if self.max_page_size > PAGE_SIZE_CEILING {
            return Err(ServerError::Config(format!(
                "max_page_size {} exceeds the listing limit of {PAGE_SIZE_CEILING}",
                self.max_page_size
            )));
        }
        if self.default_page_size > self.max_page_size {
            return Err(ServerError::Config(format!(
                "default_page_size {} exceeds max_page_size {}",
                self.default_page_size, self.max_page_size
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ServerError::Config("request_timeout_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
