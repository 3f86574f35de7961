//! Client configuration.
//!
//! Handles:
//! - Base URL of the pidman REST API
//! - Credentials for calls that modify data
//! - Transport timeout

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::ConfigError;

/// Base URL of the pidman server, e.g. `https://pid.example.org/`.
pub const ENV_HOST: &str = "PIDMAN_HOST";

/// Username used for authenticated calls.
pub const ENV_USER: &str = "PIDMAN_USER";

/// Password for [`ENV_USER`].
pub const ENV_PASSWORD: &str = "PIDMAN_PASSWORD";

/// Optional whole-request timeout in seconds.
pub const ENV_TIMEOUT: &str = "PIDMAN_TIMEOUT_SECS";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the REST API. A trailing slash is ignored.
    pub base_url: String,

    /// Username for authenticated calls.
    pub username: Option<String>,

    /// Password for authenticated calls.
    pub password: Option<String>,

    /// Request timeout enforced by the HTTP transport.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Create an unauthenticated configuration for a base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            username: None,
            password: None,
            timeout: None,
        }
    }

    /// Set the credentials used for calls that modify data.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the transport timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Load configuration from environment variables.
    ///
    /// `PIDMAN_HOST`, `PIDMAN_USER` and `PIDMAN_PASSWORD` are required;
    /// `PIDMAN_TIMEOUT_SECS` is optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let base_url = required(ENV_HOST)?;
        let username = required(ENV_USER)?;
        let password = required(ENV_PASSWORD)?;

        let timeout = lookup(ENV_TIMEOUT)
            .map(|value| {
                value
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| ConfigError::Invalid {
                        name: ENV_TIMEOUT,
                        message: e.to_string(),
                    })
            })
            .transpose()?
            .map(Duration::from_secs);

        Ok(Self {
            base_url,
            username: Some(username),
            password: Some(password),
            timeout,
        })
    }

    /// Credentials, if both username and password are set and non-empty.
    pub fn credentials(&self) -> Option<Credentials> {
        Credentials::from_parts(self.username.as_deref(), self.password.as_deref())
    }
}

/// Username and password for HTTP Basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Credentials from optional parts; `None` unless both are non-empty.
    pub fn from_parts(username: Option<&str>, password: Option<&str>) -> Option<Self> {
        match (username, password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Some(Self::new(u, p)),
            _ => None,
        }
    }

    /// The username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Value for the `Authorization` header.
    pub fn basic_auth(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {token}")
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_from_lookup() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_HOST, "http://testpidman.example.org/"),
            (ENV_USER, "testuser"),
            (ENV_PASSWORD, "testpass"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://testpidman.example.org/");
        let creds = config.credentials().unwrap();
        assert_eq!(creds.username(), "testuser");
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_missing_host() {
        let result = ClientConfig::from_lookup(lookup(&[
            (ENV_USER, "testuser"),
            (ENV_PASSWORD, "testpass"),
        ]));
        assert_eq!(result, Err(ConfigError::Missing(ENV_HOST)));
    }

    #[test]
    fn test_missing_password() {
        let result = ClientConfig::from_lookup(lookup(&[
            (ENV_HOST, "http://testpidman.example.org/"),
            (ENV_USER, "testuser"),
            (ENV_PASSWORD, ""),
        ]));
        assert_eq!(result, Err(ConfigError::Missing(ENV_PASSWORD)));
    }

    #[test]
    fn test_timeout() {
        let vars = [
            (ENV_HOST, "http://testpidman.example.org/"),
            (ENV_USER, "testuser"),
            (ENV_PASSWORD, "testpass"),
            (ENV_TIMEOUT, "15"),
        ];
        let config = ClientConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));

        let mut bad = vars;
        bad[3] = (ENV_TIMEOUT, "soon");
        let result = ClientConfig::from_lookup(lookup(&bad));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                name: ENV_TIMEOUT,
                ..
            })
        ));
    }

    #[test]
    fn test_credentials_require_both_parts() {
        assert!(Credentials::from_parts(Some("user"), Some("pass")).is_some());
        assert!(Credentials::from_parts(Some("user"), None).is_none());
        assert!(Credentials::from_parts(Some(""), Some("pass")).is_none());
        assert!(ClientConfig::new("http://localhost").credentials().is_none());
    }

    #[test]
    fn test_basic_auth() {
        let creds = Credentials::new("Aladdin", "open sesame");
        assert_eq!(creds.basic_auth(), "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==");
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::new("testuser", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("testuser"));
        assert!(!debug.contains("hunter2"));
    }
}
