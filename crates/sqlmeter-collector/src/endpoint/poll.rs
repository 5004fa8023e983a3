//! The public polling unit: one monitored database target

use crate::catalog::MetricQuery;
use crate::context::QueryContext;
use crate::dml::DmlDeltaTracker;
use crate::executor::run_queries;
use crate::VERBOSE_SQL_TARGET;
use sqlmeter_core::{ConnectionConfig, DatabaseDriver, Result};

/// Endpoint variant. Fixes the component identifier reported with every
/// context and the query filter applied to the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// On-premises SQL Server instance
    SqlServer,
    /// Azure SQL database (a subset of the DMVs is available)
    AzureSql,
}

impl EndpointKind {
    /// Component identifier reported to the downstream collector
    pub fn component_guid(&self) -> &'static str {
        match self {
            EndpointKind::SqlServer => "com.sqlmeter.mssql",
            EndpointKind::AzureSql => "com.sqlmeter.azure",
        }
    }

    fn keeps(&self, query: &MetricQuery) -> bool {
        match self {
            EndpointKind::SqlServer => query.enabled,
            EndpointKind::AzureSql => query.enabled && query.azure_compatible,
        }
    }
}

/// One monitored database target with its own connection settings,
/// identity, and cross-cycle delta state.
///
/// Each `execute_queries` call is one full poll cycle. The DML activity
/// history persists across cycles on the same instance. An endpoint is
/// not internally synchronized: the caller must not run two cycles of
/// the same endpoint concurrently.
#[derive(Debug)]
pub struct Endpoint {
    name: String,
    kind: EndpointKind,
    config: ConnectionConfig,
    queries: Vec<MetricQuery>,
    tracker: DmlDeltaTracker,
}

impl Endpoint {
    /// Create an endpoint with an empty query set and no history
    pub fn new(kind: EndpointKind, name: impl Into<String>, config: ConnectionConfig) -> Self {
        Self {
            name: name.into(),
            kind,
            config,
            queries: Vec::new(),
            tracker: DmlDeltaTracker::new(),
        }
    }

    /// Endpoint display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Endpoint variant
    pub fn kind(&self) -> EndpointKind {
        self.kind
    }

    /// Component identifier of this endpoint's variant
    pub fn component_guid(&self) -> &'static str {
        self.kind.component_guid()
    }

    /// The queries this endpoint will run, post-filter
    pub fn queries(&self) -> &[MetricQuery] {
        &self.queries
    }

    /// Adopt a query catalogue, keeping the subset this endpoint variant
    /// can run. Input order is preserved.
    pub fn set_queries(&mut self, catalogue: &[MetricQuery]) {
        self.queries = catalogue
            .iter()
            .copied()
            .filter(|query| self.kind.keeps(query))
            .collect();
    }

    /// Run one full poll cycle.
    ///
    /// Opens one connection, executes every filtered query on it in
    /// order, and closes the connection before returning. Individual
    /// query failures are logged and skipped; only a failure to open the
    /// connection aborts the cycle.
    pub async fn execute_queries(
        &mut self,
        driver: &dyn DatabaseDriver,
    ) -> Result<Vec<QueryContext>> {
        tracing::debug!(
            target: VERBOSE_SQL_TARGET,
            endpoint = %self.name,
            "connecting with {}",
            self.config
        );

        let conn = driver.connect(&self.config).await?;
        let contexts = run_queries(
            conn.as_ref(),
            &self.queries,
            &mut self.tracker,
            &self.name,
            self.kind.component_guid(),
        )
        .await;

        if let Err(error) = conn.close().await {
            tracing::warn!(endpoint = %self.name, error = %error, "failed to close connection");
        }

        Ok(contexts)
    }

    /// Log this endpoint's identity. Credential material never reaches
    /// the sink; the connection settings render in redacted form.
    pub fn log_identity(&self) {
        tracing::info!(endpoint = %self.name, "{}", self.config);

        if self.config.credentials_misconfigured() {
            tracing::error!(
                endpoint = %self.name,
                "connection settings for '{}' must use either integrated security or \
                 explicit user/password credentials, not both or neither",
                self.config.host
            );
        }
    }
}
