use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8002;

#[derive(Debug, Clone)]
pub struct JsdbgConfig {
    pub hostname: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub ssl: bool,
    pub ca_path: Option<PathBuf>,
    pub timeout: Duration,
    /// How long one server-side `wait` call may block before it is re-issued.
    pub wait_poll: Duration,
}

/// Connection settings supplied by the editor's launch/attach arguments.
/// `None` keeps whatever the base config already holds.
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    pub hostname: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub ssl: Option<bool>,
    pub ca_path: Option<PathBuf>,
}

impl Default for JsdbgConfig {
    fn default() -> Self {
        Self {
            hostname: "localhost".to_string(),
            port: DEFAULT_PORT,
            username: String::new(),
            password: String::new(),
            ssl: false,
            ca_path: None,
            timeout: Duration::from_secs(30),
            wait_poll: Duration::from_secs(5),
        }
    }
}

impl JsdbgConfig {
    pub fn new(
        hostname: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            username: username.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();

        let hostname = std::env::var("JSDBG_HOST").unwrap_or(defaults.hostname);
        let port = std::env::var("JSDBG_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(defaults.port);
        let username = std::env::var("JSDBG_USER").unwrap_or(defaults.username);
        let password = std::env::var("JSDBG_PASSWORD").unwrap_or(defaults.password);
        let ssl = std::env::var("JSDBG_SSL")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.ssl);
        let ca_path = std::env::var("JSDBG_CA_PATH").ok().map(PathBuf::from);

        let timeout = std::env::var("JSDBG_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.timeout);

        let wait_poll = std::env::var("JSDBG_WAIT_POLL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.wait_poll);

        Self {
            hostname,
            port,
            username,
            password,
            ssl,
            ca_path,
            timeout,
            wait_poll,
        }
    }

    pub fn with_overrides(mut self, overrides: &ConnectionOverrides) -> Self {
        if let Some(hostname) = &overrides.hostname {
            self.hostname = hostname.clone();
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(username) = &overrides.username {
            self.username = username.clone();
        }
        if let Some(password) = &overrides.password {
            self.password = password.clone();
        }
        if let Some(ssl) = overrides.ssl {
            self.ssl = ssl;
        }
        if let Some(ca_path) = &overrides.ca_path {
            self.ca_path = Some(ca_path.clone());
        }
        self
    }

    pub fn base_url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.hostname, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = JsdbgConfig::default();
        assert_eq!(config.hostname, "localhost");
        assert_eq!(config.port, 8002);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.wait_poll, Duration::from_secs(5));
        assert!(!config.ssl);
    }

    #[test]
    fn test_new_config() {
        let config = JsdbgConfig::new("ml-host", "admin", "secret");
        assert_eq!(config.hostname, "ml-host");
        assert_eq!(config.username, "admin");
        assert_eq!(config.password, "secret");
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_base_url_follows_ssl_flag() {
        let mut config = JsdbgConfig::new("ml-host", "admin", "secret");
        assert_eq!(config.base_url(), "http://ml-host:8002");

        config.ssl = true;
        config.port = 8443;
        assert_eq!(config.base_url(), "https://ml-host:8443");
    }

    #[test]
    fn test_overrides_replace_only_present_fields() {
        let base = JsdbgConfig::new("env-host", "env-user", "env-pass");
        let overrides = ConnectionOverrides {
            hostname: Some("launch-host".to_string()),
            password: Some("launch-pass".to_string()),
            ssl: Some(true),
            ..ConnectionOverrides::default()
        };

        let config = base.with_overrides(&overrides);
        assert_eq!(config.hostname, "launch-host");
        assert_eq!(config.username, "env-user");
        assert_eq!(config.password, "launch-pass");
        assert!(config.ssl);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_from_env_custom() {
        std::env::set_var("JSDBG_HOST", "custom-host");
        std::env::set_var("JSDBG_PORT", "9002");
        std::env::set_var("JSDBG_TIMEOUT_MS", "5000");
        std::env::set_var("JSDBG_WAIT_POLL_SECS", "0");

        let config = JsdbgConfig::from_env();
        assert_eq!(config.hostname, "custom-host");
        assert_eq!(config.port, 9002);
        assert_eq!(config.timeout, Duration::from_millis(5000));
        // a zero poll would spin, so it falls back to the default
        assert_eq!(config.wait_poll, Duration::from_secs(5));

        std::env::remove_var("JSDBG_HOST");
        std::env::remove_var("JSDBG_PORT");
        std::env::remove_var("JSDBG_TIMEOUT_MS");
        std::env::remove_var("JSDBG_WAIT_POLL_SECS");
    }
}
