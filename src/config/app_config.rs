use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use reqwest::Client;

use super::probe_config::ProbeConfig;
use crate::error::ConfigError;

pub const USER_VAR: &str = "WEBALERT_BACKEND_USER";
pub const PASSWORD_VAR: &str = "WEBALERT_BACKEND_PASSWORD";
pub const BACKEND_URL_VAR: &str = "WEBALERT_BACKEND_LOGIN_URL";
pub const CONFIG_FILE_VAR: &str = "CONFIG_FILE";

const DEFAULT_CONFIG_FILE: &str = "config.yml";

/// Operator credentials used for the login exchange.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub credentials: Credentials,
    /// Backend base URL without a trailing slash.
    pub backend_url: String,
    pub probe: ProbeConfig,
}

/// Load the application configuration from the process environment.
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(|key| env::var(key).ok())
}

/// Load the application configuration through `lookup`.
/// The three backend variables are required and must be non-empty.
/// Probe tuning is read from the YAML file named by `CONFIG_FILE`, or from `config.yml`
/// when that file exists, and otherwise falls back to [`ProbeConfig::default`].
pub fn load_config_from<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let required = |key: &'static str| {
        lookup(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingVar(key))
    };

    let email = required(USER_VAR)?;
    let password = required(PASSWORD_VAR)?;
    let backend_url = required(BACKEND_URL_VAR)?.trim_end_matches('/').to_string();

    let probe = match lookup(CONFIG_FILE_VAR) {
        Some(path) => read_probe_config(Path::new(&path))?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            read_probe_config(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => ProbeConfig::default(),
    };
    probe.validate()?;

    log::info!("Using backend: {}", backend_url);
    log::debug!("Probe settings: {:?}", probe);

    Ok(AppConfig {
        credentials: Credentials { email, password },
        backend_url,
        probe,
    })
}

fn read_probe_config(path: &Path) -> Result<ProbeConfig, ConfigError> {
    let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: PathBuf::from(path),
        source,
    })?;

    if config_str.trim().is_empty() {
        return Ok(ProbeConfig::default());
    }

    serde_yaml::from_str(&config_str).map_err(|source| ConfigError::Parse {
        path: PathBuf::from(path),
        source,
    })
}

/// Setup the shared keep-alive client used for reachability requests and page measurement.
/// The idle pool is bounded by `max_idle_connections` per host and idle sockets are closed
/// after `idle_timeout_seconds`.
pub fn setup_http_client(config: &ProbeConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(config.request_timeout())
        .pool_max_idle_per_host(config.max_idle_connections)
        .pool_idle_timeout(config.idle_timeout())
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .user_agent(config.user_agent.clone())
        .build()
}

/// Setup the client for the backend exchanges. Certificates are always verified here.
pub fn setup_backend_client(config: &ProbeConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(config.request_timeout())
        .user_agent(config.user_agent.clone())
        .build()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    const BASE_VARS: [(&str, &str); 3] = [
        (USER_VAR, "ops@example.com"),
        (PASSWORD_VAR, "hunter2"),
        (BACKEND_URL_VAR, "https://backend.test/"),
    ];

    #[test]
    fn test_load_config_from_env_values() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let path = file.path().to_string_lossy().to_string();
        let mut vars: Vec<(&str, &str)> = BASE_VARS.to_vec();
        vars.push((CONFIG_FILE_VAR, path.as_str()));

        let config = load_config_from(lookup_from(&vars)).expect("config should load");
        assert_eq!(config.credentials.email, "ops@example.com");
        assert_eq!(config.credentials.password, "hunter2");
        assert_eq!(config.backend_url, "https://backend.test");
        assert_eq!(config.probe, ProbeConfig::default());
    }

    #[test]
    fn test_missing_password_is_rejected() {
        let vars = [(USER_VAR, "ops@example.com"), (BACKEND_URL_VAR, "https://backend.test")];
        let err = load_config_from(lookup_from(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(PASSWORD_VAR)));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let vars = [
            (USER_VAR, "   "),
            (PASSWORD_VAR, "hunter2"),
            (BACKEND_URL_VAR, "https://backend.test"),
        ];
        let err = load_config_from(lookup_from(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(USER_VAR)));
    }

    #[test]
    fn test_probe_settings_read_from_config_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "request_timeout_seconds: 7\nmax_idle_connections: 3").expect("write");
        let path = file.path().to_string_lossy().to_string();

        let mut vars: Vec<(&str, &str)> = BASE_VARS.to_vec();
        vars.push((CONFIG_FILE_VAR, path.as_str()));

        let config = load_config_from(lookup_from(&vars)).expect("config should load");
        assert_eq!(config.probe.request_timeout_seconds, 7);
        assert_eq!(config.probe.max_idle_connections, 3);
        assert_eq!(config.probe.idle_timeout_seconds, 30);
    }

    #[test]
    fn test_named_config_file_must_exist() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("missing.yml").to_string_lossy().to_string();

        let mut vars: Vec<(&str, &str)> = BASE_VARS.to_vec();
        vars.push((CONFIG_FILE_VAR, path.as_str()));

        let err = load_config_from(lookup_from(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_invalid_yaml_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "max_idle_connections: [not, a, number]").expect("write");
        let path = file.path().to_string_lossy().to_string();

        let mut vars: Vec<(&str, &str)> = BASE_VARS.to_vec();
        vars.push((CONFIG_FILE_VAR, path.as_str()));

        let err = load_config_from(lookup_from(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_zero_timeout_in_config_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "request_timeout_seconds: 0").expect("write");
        let path = file.path().to_string_lossy().to_string();

        let mut vars: Vec<(&str, &str)> = BASE_VARS.to_vec();
        vars.push((CONFIG_FILE_VAR, path.as_str()));

        let err = load_config_from(lookup_from(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroValue("request_timeout_seconds")));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let credentials = Credentials {
            email: "ops@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("ops@example.com"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_setup_http_clients() {
        let config = ProbeConfig::default();
        assert!(setup_http_client(&config).is_ok());
        assert!(setup_backend_client(&config).is_ok());
    }
}
