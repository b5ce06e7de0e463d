//! Server settings loaded via OrthoConfig.
//!
//! Values come from `FINLENS_*` environment variables, matching CLI flags, or
//! a configuration file. Every field is optional; accessors supply defaults.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use actix_web::cookie::Key;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;
use url::Url;
use zeroize::Zeroizing;

use crate::domain::{DEFAULT_ANALYSIS_TIMEOUT, DEFAULT_MAX_UPLOAD_BYTES, UploadPolicy};
use crate::outbound::openai::{DEFAULT_OPENAI_ENDPOINT, DEFAULT_OPENAI_MODEL};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_KEY_PATH: &str = "/var/run/secrets/session_key";
const DEFAULT_AI_REQUEST_TIMEOUT: Duration = Duration::from_secs(90);
/// `Key::derive_from` needs at least this much key material.
const SESSION_KEY_MIN_LEN: usize = 32;

/// Errors raised while interpreting settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The bind address is not `host:port`.
    #[error("invalid bind address {value:?}: {message}")]
    BindAddr { value: String, message: String },
    /// The AI endpoint is not an absolute URL.
    #[error("invalid AI endpoint {value:?}: {message}")]
    AiEndpoint { value: String, message: String },
    /// The session key could not be read and ephemeral keys are not allowed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The session key file is too short.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// Release builds refuse the built-in demo accounts unless opted in.
    #[error("fixture login accounts are disabled; set FINLENS_ALLOW_FIXTURE_LOGIN=true to enable")]
    FixtureLoginDisabled,
}

/// Runtime settings for the finlens server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FINLENS")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when unset.
    pub database_url: Option<String>,
    /// Connection pool cap.
    pub database_max_connections: Option<u32>,
    /// File holding the session signing key.
    pub session_key_file: Option<PathBuf>,
    /// Generate a throwaway session key when the key file is unreadable.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
    /// Send session cookies without the `Secure` flag (local HTTP only).
    #[ortho_config(default = false)]
    pub allow_insecure_cookies: bool,
    /// Accept the built-in demo accounts in release builds.
    #[ortho_config(default = false)]
    pub allow_fixture_login: bool,
    /// Base URL of the OpenAI-compatible provider.
    pub ai_endpoint: Option<String>,
    /// Provider API key; analyses fail fast when unset.
    pub ai_api_key: Option<String>,
    /// Chat model identifier.
    pub ai_model: Option<String>,
    /// Per-request transport timeout for the provider.
    pub ai_request_timeout_secs: Option<u64>,
    /// Overall time allowed for one analysis.
    pub analysis_timeout_secs: Option<u64>,
    /// Upload size cap in bytes.
    pub max_upload_bytes: Option<usize>,
}

impl AppSettings {
    /// Parsed bind address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Path of the session key file.
    pub fn session_key_path(&self) -> &Path {
        self.session_key_file
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_SESSION_KEY_PATH))
    }

    /// Whether cookies carry the `Secure` flag.
    pub fn cookie_secure(&self) -> bool {
        !self.allow_insecure_cookies
    }

    /// Provider base URL.
    pub fn ai_endpoint(&self) -> Result<Url, SettingsError> {
        let raw = self.ai_endpoint.as_deref().unwrap_or(DEFAULT_OPENAI_ENDPOINT);
        Url::parse(raw).map_err(|err| SettingsError::AiEndpoint {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Provider API key, ignoring blank values.
    pub fn ai_api_key(&self) -> Option<Zeroizing<String>> {
        self.ai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(|key| Zeroizing::new(key.to_owned()))
    }

    /// Chat model identifier.
    pub fn ai_model(&self) -> &str {
        self.ai_model.as_deref().unwrap_or(DEFAULT_OPENAI_MODEL)
    }

    /// Provider transport timeout.
    pub fn ai_request_timeout(&self) -> Duration {
        self.ai_request_timeout_secs
            .map_or(DEFAULT_AI_REQUEST_TIMEOUT, Duration::from_secs)
    }

    /// Overall analysis timeout.
    pub fn analysis_timeout(&self) -> Duration {
        self.analysis_timeout_secs
            .map_or(DEFAULT_ANALYSIS_TIMEOUT, Duration::from_secs)
    }

    /// Upload limits.
    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy::new(self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES))
    }

    /// Gate the built-in demo accounts.
    ///
    /// They are always available in debug builds. Release builds need
    /// `allow_fixture_login`, and every permitted start logs a warning.
    pub fn check_fixture_login(&self, debug_build: bool) -> Result<(), SettingsError> {
        if !(debug_build || self.allow_fixture_login) {
            return Err(SettingsError::FixtureLoginDisabled);
        }
        warn!("fixture login accounts are active; do not expose this deployment publicly");
        Ok(())
    }

    /// Load the session signing key.
    ///
    /// An unreadable key file is tolerated in debug builds, or when
    /// `session_allow_ephemeral` is set, by generating a temporary key.
    pub fn session_key(&self, debug_build: bool) -> Result<Key, SettingsError> {
        let path = self.session_key_path();
        match std::fs::read(path) {
            Ok(bytes) => {
                let bytes = Zeroizing::new(bytes);
                if bytes.len() < SESSION_KEY_MIN_LEN {
                    return Err(SettingsError::KeyTooShort {
                        path: path.to_path_buf(),
                        length: bytes.len(),
                        min_len: SESSION_KEY_MIN_LEN,
                    });
                }
                Ok(Key::derive_from(&bytes))
            }
            Err(source) if debug_build || self.session_allow_ephemeral => {
                warn!(path = %path.display(), error = %source, "using temporary session key (dev only)");
                Ok(Key::generate())
            }
            Err(source) => Err(SettingsError::KeyRead {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}
