//! Connection configuration.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::env;
use std::time::Duration;

pub const API_TOKEN_HEADER: &str = "X-Cybozu-API-Token";
pub const PASSWORD_AUTH_HEADER: &str = "X-Cybozu-Authorization";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How requests authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    ApiToken(String),
    Password { login: String, password: String },
}

impl Auth {
    /// Header name and value carrying the credentials.
    pub fn header(&self) -> (&'static str, String) {
        match self {
            Auth::ApiToken(token) => (API_TOKEN_HEADER, token.clone()),
            Auth::Password { login, password } => (
                PASSWORD_AUTH_HEADER,
                STANDARD.encode(format!("{}:{}", login, password)),
            ),
        }
    }
}

/// Connection settings, passed explicitly to the transport.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the service, e.g. `https://example.cybozu.com`
    pub base_url: String,
    pub auth: Auth,
    /// Route every call through a guest space
    pub guest_space_id: Option<i64>,
    pub user_agent: String,
    /// Extra headers sent with every request
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

impl Config {
    pub fn new(base_url: impl Into<String>, auth: Auth) -> Self {
        Self {
            base_url: base_url.into(),
            auth,
            guest_space_id: None,
            user_agent: default_user_agent(),
            headers: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_guest_space(mut self, id: i64) -> Self {
        self.guest_space_id = Some(id);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("KINBASE_BASE_URL").ok_or(ConfigError::MissingBaseUrl)?;

        let auth = match (
            lookup("KINBASE_API_TOKEN"),
            lookup("KINBASE_LOGIN"),
            lookup("KINBASE_PASSWORD"),
        ) {
            (Some(token), _, _) => Auth::ApiToken(token),
            (None, Some(login), Some(password)) => Auth::Password { login, password },
            _ => return Err(ConfigError::MissingCredentials),
        };

        let guest_space_id = lookup("KINBASE_GUEST_SPACE_ID")
            .map(|v| v.parse().map_err(|_| ConfigError::InvalidGuestSpaceId))
            .transpose()?;

        let timeout = lookup("KINBASE_TIMEOUT_SECS")
            .unwrap_or_else(|| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidTimeout)?;

        let user_agent = match lookup("KINBASE_USER_AGENT_SUFFIX") {
            Some(suffix) => format!("{} {}", default_user_agent(), suffix),
            None => default_user_agent(),
        };

        Ok(Self {
            base_url,
            auth,
            guest_space_id,
            user_agent,
            headers: Vec::new(),
            timeout,
        })
    }

    /// Path of an API endpoint, honouring the guest space.
    pub fn api_path(&self, api: &str) -> String {
        match self.guest_space_id {
            Some(id) => format!("/k/guest/{}/v1/{}", id, api),
            None => format!("/k/v1/{}", api),
        }
    }
}

fn default_user_agent() -> String {
    format!("kinbase-client/{}", env!("CARGO_PKG_VERSION"))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("KINBASE_BASE_URL environment variable is required")]
    MissingBaseUrl,

    #[error("Invalid KINBASE_BASE_URL value")]
    InvalidBaseUrl,

    #[error("set KINBASE_API_TOKEN, or KINBASE_LOGIN and KINBASE_PASSWORD")]
    MissingCredentials,

    #[error("Invalid KINBASE_GUEST_SPACE_ID value")]
    InvalidGuestSpaceId,

    #[error("Invalid KINBASE_TIMEOUT_SECS value")]
    InvalidTimeout,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn token_config() {
        let config = Config::from_lookup(lookup(&[
            ("KINBASE_BASE_URL", "https://example.test"),
            ("KINBASE_API_TOKEN", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.auth, Auth::ApiToken("secret".into()));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.guest_space_id, None);
        assert!(config.user_agent.starts_with("kinbase-client/"));
    }

    #[test]
    fn token_wins_over_password() {
        let config = Config::from_lookup(lookup(&[
            ("KINBASE_BASE_URL", "https://example.test"),
            ("KINBASE_API_TOKEN", "secret"),
            ("KINBASE_LOGIN", "alice"),
            ("KINBASE_PASSWORD", "pw"),
        ]))
        .unwrap();
        assert!(matches!(config.auth, Auth::ApiToken(_)));
    }

    #[test]
    fn password_header_is_base64() {
        let auth = Auth::Password {
            login: "Administrator".into(),
            password: "cybozu".into(),
        };
        assert_eq!(
            auth.header(),
            (PASSWORD_AUTH_HEADER, "QWRtaW5pc3RyYXRvcjpjeWJvenU=".to_string())
        );
    }

    #[test]
    fn missing_values() {
        assert_eq!(
            Config::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::MissingBaseUrl
        );
        assert_eq!(
            Config::from_lookup(lookup(&[
                ("KINBASE_BASE_URL", "https://example.test"),
                ("KINBASE_LOGIN", "alice"),
            ]))
            .unwrap_err(),
            ConfigError::MissingCredentials
        );
    }

    #[test]
    fn invalid_numbers() {
        let base = [
            ("KINBASE_BASE_URL", "https://example.test"),
            ("KINBASE_API_TOKEN", "t"),
        ];

        let mut pairs = base.to_vec();
        pairs.push(("KINBASE_GUEST_SPACE_ID", "abc"));
        assert_eq!(
            Config::from_lookup(lookup(&pairs)).unwrap_err(),
            ConfigError::InvalidGuestSpaceId
        );

        let mut pairs = base.to_vec();
        pairs.push(("KINBASE_TIMEOUT_SECS", "-5"));
        assert_eq!(
            Config::from_lookup(lookup(&pairs)).unwrap_err(),
            ConfigError::InvalidTimeout
        );
    }

    #[test]
    fn api_paths() {
        let config = Config::new("https://example.test", Auth::ApiToken("t".into()));
        assert_eq!(config.api_path("records.json"), "/k/v1/records.json");

        let guest = config.with_guest_space(12).with_header("X-Extra", "1");
        assert_eq!(guest.api_path("file.json"), "/k/guest/12/v1/file.json");
        assert_eq!(guest.headers, [("X-Extra".to_string(), "1".to_string())]);
    }

    #[test]
    fn user_agent_suffix() {
        let config = Config::from_lookup(lookup(&[
            ("KINBASE_BASE_URL", "https://example.test"),
            ("KINBASE_API_TOKEN", "t"),
            ("KINBASE_USER_AGENT_SUFFIX", "batch-job/2"),
        ]))
        .unwrap();
        assert!(config.user_agent.ends_with(" batch-job/2"));
    }
}
