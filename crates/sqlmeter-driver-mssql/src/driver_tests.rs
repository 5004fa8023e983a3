//! Unit tests for the MS SQL Server driver

use super::*;
use pretty_assertions::assert_eq;
use sqlmeter_core::{ConnectionConfig, DatabaseDriver};

#[test]
fn test_mssql_driver_identity() {
    let driver = MssqlDriver::new();
    assert_eq!(driver.id(), "mssql");
    assert_eq!(driver.name(), "mssql");
}

#[test]
fn test_mssql_default_port() {
    let driver = MssqlDriver::new();
    assert_eq!(driver.default_port(), Some(1433));
}

#[test]
fn test_parse_connection_string_full() {
    let driver = MssqlDriver::new();
    let config = driver
        .parse_connection_string("Server=db01,1434;Database=master;User Id=monitor;Password=pw")
        .unwrap();

    assert_eq!(config.host, "db01");
    assert_eq!(config.port, 1434);
    assert_eq!(config.database, Some("master".to_string()));
    assert_eq!(config.username, Some("monitor".to_string()));
    assert_eq!(config.password, Some("pw".to_string()));
    assert!(!config.trusted);
}

#[test]
fn test_parse_connection_string_defaults_port() {
    let driver = MssqlDriver::new();
    let config = driver.parse_connection_string("Server=db01").unwrap();
    assert_eq!(config.host, "db01");
    assert_eq!(config.port, 1433);
}

#[test]
fn test_parse_connection_string_synonyms() {
    let driver = MssqlDriver::new();
    let config = driver
        .parse_connection_string("Data Source=db02;Initial Catalog=metrics;UID=sa;PWD=secret")
        .unwrap();

    assert_eq!(config.host, "db02");
    assert_eq!(config.database, Some("metrics".to_string()));
    assert_eq!(config.username, Some("sa".to_string()));
    assert_eq!(config.password, Some("secret".to_string()));
}

#[test]
fn test_parse_connection_string_integrated_security() {
    let driver = MssqlDriver::new();
    let config = driver
        .parse_connection_string("Server=db01;Integrated Security=SSPI")
        .unwrap();
    assert!(config.trusted);

    let config = driver
        .parse_connection_string("Server=db01;Trusted_Connection=true")
        .unwrap();
    assert!(config.trusted);
}

#[test]
fn test_parse_connection_string_trust_cert() {
    let driver = MssqlDriver::new();
    let config = driver
        .parse_connection_string("Server=db01;TrustServerCertificate=true")
        .unwrap();
    assert_eq!(config.params.get("trust_cert"), Some(&"true".to_string()));
}

#[test]
fn test_parse_connection_string_unknown_keys_kept_as_params() {
    let driver = MssqlDriver::new();
    let config = driver
        .parse_connection_string("Server=db01;Application Name=sqlmeter")
        .unwrap();
    assert_eq!(
        config.params.get("application name"),
        Some(&"sqlmeter".to_string())
    );
}

#[test]
fn test_parse_connection_string_rejects_malformed_fragment() {
    let driver = MssqlDriver::new();
    assert!(driver.parse_connection_string("Server=db01;garbage").is_err());
}

#[test]
fn test_parse_connection_string_rejects_missing_server() {
    let driver = MssqlDriver::new();
    assert!(driver.parse_connection_string("Database=master").is_err());
}

#[test]
fn test_parse_connection_string_rejects_bad_port() {
    let driver = MssqlDriver::new();
    assert!(driver.parse_connection_string("Server=db01,notaport").is_err());
}

#[test]
fn test_build_connection_string_with_credentials() {
    let driver = MssqlDriver::new();
    let mut config = ConnectionConfig::new("mssql", "Production");
    config.host = "db01".to_string();
    config.port = 1433;
    config.database = Some("master".to_string());
    config.username = Some("monitor".to_string());
    config.password = Some("pw".to_string());

    assert_eq!(
        driver.build_connection_string(&config),
        "Server=db01,1433;Database=master;User Id=monitor;Password=pw"
    );
}

#[test]
fn test_build_connection_string_trusted() {
    let driver = MssqlDriver::new();
    let mut config = ConnectionConfig::new("mssql", "Integrated");
    config.host = "db01".to_string();

    assert_eq!(
        driver.build_connection_string(&config),
        "Server=db01,1433;Trusted_Connection=True"
    );
}

#[test]
fn test_parse_then_build_round_trips() {
    let driver = MssqlDriver::new();
    let original = "Server=db01,1433;Database=master;User Id=monitor;Password=pw";
    let config = driver.parse_connection_string(original).unwrap();
    assert_eq!(driver.build_connection_string(&config), original);
}
