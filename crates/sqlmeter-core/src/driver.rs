//! Database driver trait and connection settings

use crate::{Connection, MeterError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Core driver trait that database drivers implement
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Unique identifier for this driver (e.g., "mssql")
    fn id(&self) -> &'static str {
        self.name()
    }

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Default connection port
    fn default_port(&self) -> Option<u16> {
        None
    }

    /// Create a new connection
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>>;

    /// Test that a connection can be established
    async fn test_connection(&self, config: &ConnectionConfig) -> Result<()>;

    /// Parse a connection string into a configuration
    fn parse_connection_string(&self, _conn_str: &str) -> Result<ConnectionConfig> {
        Err(MeterError::NotSupported(
            "Connection string parsing not implemented for this driver".into(),
        ))
    }

    /// Build a connection string from configuration
    fn build_connection_string(&self, config: &ConnectionConfig) -> String;
}

/// Connection settings for one monitored endpoint
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Display name
    pub name: String,
    /// Driver ID (e.g., "mssql")
    pub driver: String,
    /// Host address
    pub host: String,
    /// Port number (0 for the driver default)
    pub port: u16,
    /// Database name
    pub database: Option<String>,
    /// Username
    pub username: Option<String>,
    /// Password. Never rendered by `Display`; see `redacted`.
    pub password: Option<String>,
    /// Use integrated (OS) authentication instead of explicit credentials
    pub trusted: bool,
    /// Additional connection parameters
    pub params: HashMap<String, String>,
}

impl ConnectionConfig {
    /// Create a new configuration with default values
    pub fn new(driver: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            driver: driver.to_string(),
            host: String::new(),
            port: 0,
            database: None,
            username: None,
            password: None,
            trusted: false,
            params: HashMap::new(),
        }
    }

    /// Set a connection parameter
    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.params.insert(key.to_string(), value.to_string());
        self
    }

    /// Get a string parameter, falling back to the known fields
    pub fn get_string(&self, key: &str) -> Option<String> {
        if let Some(val) = self.params.get(key) {
            return Some(val.clone());
        }
        match key {
            "host" => Some(self.host.clone()),
            "database" => self.database.clone(),
            "username" | "user" => self.username.clone(),
            "password" => self.password.clone(),
            _ => None,
        }
    }

    /// Get port
    pub fn get_port(&self) -> u16 {
        self.port
    }

    /// Render the settings with credential material masked.
    ///
    /// This is the only form that may reach a log sink.
    pub fn redacted(&self) -> String {
        let mut parts = vec![format!("Server={},{}", self.host, self.port)];
        if let Some(database) = &self.database {
            parts.push(format!("Database={}", database));
        }
        if self.trusted {
            parts.push("Trusted_Connection=True".to_string());
        }
        if let Some(username) = &self.username {
            parts.push(format!("User Id={}", username));
        }
        if self.password.is_some() {
            parts.push("Password=[redacted]".to_string());
        }
        parts.join(";")
    }

    /// A configuration must use either integrated security or explicit
    /// user/password credentials, not both and not neither.
    pub fn credentials_misconfigured(&self) -> bool {
        let has_user_creds = self.username.is_some() || self.password.is_some();
        self.trusted == has_user_creds
    }
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.redacted())
    }
}
