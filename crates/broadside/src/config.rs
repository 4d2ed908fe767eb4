//! Server configuration.
//!
//! Loaded from environment variables. Every setting has a default, so an
//! empty environment yields a working server on port 5050.

use std::collections::HashMap;
use std::env;

use broadside_session::SessionConfig;
use broadside_transport::WebSocketConfig;
use thiserror::Error;

/// Default listen address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5050";

/// Default WebSocket upgrade path.
pub const DEFAULT_PATH: &str = "/my-custom-path/";

/// Default origin allow-list: any origin.
pub const DEFAULT_ALLOWED_ORIGINS: &str = "*";

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address (default: "0.0.0.0:5050").
    pub bind_address: String,

    /// Request path the WebSocket upgrade must use (default: "/my-custom-path/").
    pub path: String,

    /// Origins allowed to connect. `*` admits any origin.
    pub allowed_origins: Vec<String>,

    /// Remove games from memory once their last player leaves (default: false).
    pub evict_empty_sessions: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            path: DEFAULT_PATH.to_string(),
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGINS.to_string()],
            evict_empty_sessions: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BROADSIDE_BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let path = vars
            .get("BROADSIDE_PATH")
            .cloned()
            .unwrap_or_else(|| DEFAULT_PATH.to_string());
        if !path.starts_with('/') {
            return Err(ConfigError::InvalidValue(format!(
                "BROADSIDE_PATH must start with '/', got {path:?}"
            )));
        }

        let allowed_origins: Vec<String> = vars
            .get("BROADSIDE_ALLOWED_ORIGINS")
            .map(String::as_str)
            .unwrap_or(DEFAULT_ALLOWED_ORIGINS)
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();
        if allowed_origins.is_empty() {
            return Err(ConfigError::InvalidValue(
                "BROADSIDE_ALLOWED_ORIGINS lists no origins".to_string(),
            ));
        }

        let evict_empty_sessions = match vars
            .get("BROADSIDE_EVICT_EMPTY_SESSIONS")
            .map(|s| s.trim().to_ascii_lowercase())
            .as_deref()
        {
            None | Some("false") | Some("0") => false,
            Some("true") | Some("1") => true,
            Some(other) => {
                return Err(ConfigError::InvalidValue(format!(
                    "BROADSIDE_EVICT_EMPTY_SESSIONS must be true or false, got {other:?}"
                )));
            }
        };

        Ok(Self {
            bind_address,
            path,
            allowed_origins,
            evict_empty_sessions,
        })
    }

    /// The upgrade rules handed to the WebSocket transport.
    pub fn websocket_config(&self) -> WebSocketConfig {
        WebSocketConfig {
            path: self.path.clone(),
            allowed_origins: self.allowed_origins.clone(),
        }
    }

    /// The session-layer settings.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            evict_empty_sessions: self.evict_empty_sessions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_vars_empty_uses_defaults() {
        let config = ServerConfig::from_vars(&HashMap::new()).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_address, "0.0.0.0:5050");
        assert_eq!(config.path, "/my-custom-path/");
        assert_eq!(config.allowed_origins, vec!["*".to_string()]);
        assert!(!config.evict_empty_sessions);
    }

    #[test]
    fn test_from_vars_overrides() {
        let config = ServerConfig::from_vars(&vars(&[
            ("BROADSIDE_BIND_ADDRESS", "127.0.0.1:9000"),
            ("BROADSIDE_PATH", "/ws"),
            ("BROADSIDE_EVICT_EMPTY_SESSIONS", "true"),
        ]))
        .unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.path, "/ws");
        assert!(config.evict_empty_sessions);
        assert!(config.session_config().evict_empty_sessions);
    }

    #[test]
    fn test_from_vars_splits_and_trims_origins() {
        let config = ServerConfig::from_vars(&vars(&[(
            "BROADSIDE_ALLOWED_ORIGINS",
            "http://localhost:3000, https://example.com ,",
        )]))
        .unwrap();

        assert_eq!(
            config.allowed_origins,
            vec![
                "http://localhost:3000".to_string(),
                "https://example.com".to_string()
            ]
        );
        let ws = config.websocket_config();
        assert!(ws.origin_allowed("https://example.com"));
        assert!(!ws.origin_allowed("https://evil.example"));
    }

    #[test]
    fn test_from_vars_empty_origins_is_invalid() {
        let result =
            ServerConfig::from_vars(&vars(&[("BROADSIDE_ALLOWED_ORIGINS", " , ")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_from_vars_relative_path_is_invalid() {
        let result = ServerConfig::from_vars(&vars(&[("BROADSIDE_PATH", "ws")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_from_vars_bad_bool_is_invalid() {
        let result = ServerConfig::from_vars(&vars(&[(
            "BROADSIDE_EVICT_EMPTY_SESSIONS",
            "sometimes",
        )]));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("BROADSIDE_EVICT_EMPTY_SESSIONS"));
    }

    #[test]
    fn test_from_vars_bool_is_case_insensitive() {
        let config = ServerConfig::from_vars(&vars(&[(
            "BROADSIDE_EVICT_EMPTY_SESSIONS",
            "TRUE",
        )]))
        .unwrap();
        assert!(config.evict_empty_sessions);
    }
}
