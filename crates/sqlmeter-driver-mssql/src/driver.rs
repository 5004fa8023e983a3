//! MS SQL Server driver implementation

use crate::connection::MssqlConnection;
use async_trait::async_trait;
use std::sync::Arc;
use sqlmeter_core::{Connection, ConnectionConfig, DatabaseDriver, MeterError, Result};

/// MS SQL Server database driver
pub struct MssqlDriver;

impl MssqlDriver {
    /// Create a new MS SQL Server driver instance
    pub fn new() -> Self {
        tracing::debug!("MS SQL Server driver initialized");
        Self
    }
}

impl Default for MssqlDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseDriver for MssqlDriver {
    fn id(&self) -> &'static str {
        "mssql"
    }

    fn name(&self) -> &'static str {
        "mssql"
    }

    fn default_port(&self) -> Option<u16> {
        Some(1433)
    }

    #[tracing::instrument(skip(self, config), fields(host = %config.host, database = config.database.as_deref()))]
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
        tracing::debug!("connecting to MS SQL Server");
        let connection = MssqlConnection::from_config(config)
            .await
            .map_err(|e| MeterError::Connection(e.to_string()))?;
        Ok(Arc::new(connection))
    }

    #[tracing::instrument(skip(self, config))]
    async fn test_connection(&self, config: &ConnectionConfig) -> Result<()> {
        tracing::debug!("testing MS SQL Server connection");
        let conn = self.connect(config).await?;
        conn.close().await
    }

    /// Parse an ADO-style connection string
    /// (`Server=host,port;Database=name;User Id=user;Password=pass`).
    fn parse_connection_string(&self, conn_str: &str) -> Result<ConnectionConfig> {
        let mut config = ConnectionConfig::new("mssql", "mssql");

        for fragment in conn_str.split(';') {
            let fragment = fragment.trim();
            if fragment.is_empty() {
                continue;
            }
            let (key, value) = fragment.split_once('=').ok_or_else(|| {
                MeterError::Configuration(format!(
                    "malformed connection string fragment '{}'",
                    fragment
                ))
            })?;
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            match key.as_str() {
                "server" | "data source" => {
                    if let Some((host, port)) = value.split_once(',') {
                        config.host = host.trim().to_string();
                        config.port = port.trim().parse().map_err(|_| {
                            MeterError::Configuration(format!("invalid port '{}'", port.trim()))
                        })?;
                    } else {
                        config.host = value.to_string();
                        config.port = 1433;
                    }
                }
                "database" | "initial catalog" => {
                    config.database = Some(value.to_string());
                }
                "user id" | "uid" => {
                    config.username = Some(value.to_string());
                }
                "password" | "pwd" => {
                    config.password = Some(value.to_string());
                }
                "trusted_connection" | "integrated security" => {
                    config.trusted = matches!(
                        value.to_ascii_lowercase().as_str(),
                        "true" | "yes" | "sspi"
                    );
                }
                "trustservercertificate" => {
                    if value.eq_ignore_ascii_case("true") {
                        config.params.insert("trust_cert".to_string(), "true".to_string());
                    }
                }
                other => {
                    config.params.insert(other.to_string(), value.to_string());
                }
            }
        }

        if config.host.is_empty() {
            return Err(MeterError::Configuration(
                "connection string is missing a Server entry".to_string(),
            ));
        }

        Ok(config)
    }

    fn build_connection_string(&self, config: &ConnectionConfig) -> String {
        let host = if config.host.is_empty() {
            "localhost"
        } else {
            &config.host
        };
        let port = if config.port > 0 { config.port } else { 1433 };

        let mut conn_str = format!("Server={},{}", host, port);

        if let Some(db) = &config.database {
            conn_str.push_str(&format!(";Database={}", db));
        }

        if let Some(user) = &config.username {
            conn_str.push_str(&format!(";User Id={}", user));
            if let Some(password) = &config.password {
                conn_str.push_str(&format!(";Password={}", password));
            }
        } else {
            conn_str.push_str(";Trusted_Connection=True");
        }

        conn_str
    }
}
