//! MS SQL Server connection implementation using tiberius

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tiberius::{AuthMethod, Client, ColumnData, Config, EncryptionLevel, Row as TiberiusRow};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use uuid::Uuid;
use sqlmeter_core::{
    ColumnMeta, Connection, MeterError, QueryResult, Result, Row, Value,
};

/// MS SQL Server connection errors
#[derive(Debug, thiserror::Error)]
pub enum MssqlConnectionError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Connection is closed")]
    ConnectionClosed,

    #[error("Tiberius error: {0}")]
    Tiberius(#[from] tiberius::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<MssqlConnectionError> for MeterError {
    fn from(err: MssqlConnectionError) -> Self {
        MeterError::Driver(err.to_string())
    }
}

/// Lift server-reported SQL errors into the structured variant so the
/// collector can log the error number; everything else stays a plain
/// driver error.
fn query_error(err: tiberius::error::Error) -> MeterError {
    match err {
        tiberius::error::Error::Server(token) => MeterError::Server {
            code: token.code(),
            message: token.message().to_string(),
        },
        other => MeterError::Driver(other.to_string()),
    }
}

/// MS SQL Server connection using tiberius
pub struct MssqlConnection {
    client: Mutex<Client<Compat<TcpStream>>>,
    closed: AtomicBool,
    database: Option<String>,
}

impl MssqlConnection {
    /// Open a connection to a SQL Server endpoint.
    ///
    /// `username`/`password` of `None` selects integrated (Windows)
    /// authentication; on other platforms that is a configuration error.
    #[tracing::instrument(skip(password))]
    pub async fn connect(
        host: &str,
        port: u16,
        database: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
        trust_cert: bool,
    ) -> std::result::Result<Self, MssqlConnectionError> {
        tracing::debug!("connecting to MS SQL Server at {}:{}", host, port);

        let mut config = Config::new();
        config.host(host);
        config.port(port);

        if let Some(db) = database {
            config.database(db);
        }

        if trust_cert {
            config.trust_cert();
        }

        config.encryption(EncryptionLevel::Required);

        match (username, password) {
            (Some(user), Some(pass)) => {
                config.authentication(AuthMethod::sql_server(user, pass));
            }
            (Some(user), None) => {
                config.authentication(AuthMethod::sql_server(user, ""));
            }
            (None, _) => {
                #[cfg(windows)]
                {
                    config.authentication(AuthMethod::Integrated);
                }
                #[cfg(not(windows))]
                {
                    return Err(MssqlConnectionError::AuthenticationFailed(
                        "Integrated security is only supported on Windows".to_string(),
                    ));
                }
            }
        }

        let tcp = TcpStream::connect(config.get_addr())
            .await
            .map_err(|e| MssqlConnectionError::ConnectionFailed(e.to_string()))?;

        tcp.set_nodelay(true)?;
        let compat_stream = tcp.compat_write();

        let client = Client::connect(config, compat_stream)
            .await
            .map_err(|e| MssqlConnectionError::ConnectionFailed(e.to_string()))?;

        tracing::debug!("successfully connected to MS SQL Server");

        Ok(Self {
            client: Mutex::new(client),
            closed: AtomicBool::new(false),
            database: database.map(String::from),
        })
    }

    /// Open a connection from endpoint settings
    pub async fn from_config(
        config: &sqlmeter_core::ConnectionConfig,
    ) -> std::result::Result<Self, MssqlConnectionError> {
        let host = if config.host.is_empty() {
            "localhost".to_string()
        } else {
            config.host.clone()
        };
        let port = if config.port > 0 { config.port } else { 1433 };
        let username = if config.trusted {
            None
        } else {
            config.username.clone()
        };
        let trust_cert = config
            .params
            .get("trust_cert")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Self::connect(
            &host,
            port,
            config.database.as_deref(),
            username.as_deref(),
            config.password.as_deref(),
            trust_cert,
        )
        .await
    }

    fn ensure_not_closed(&self) -> std::result::Result<(), MssqlConnectionError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(MssqlConnectionError::ConnectionClosed);
        }
        Ok(())
    }
}

#[async_trait]
impl Connection for MssqlConnection {
    fn driver_name(&self) -> &str {
        "mssql"
    }

    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.ensure_not_closed()?;
        let start = std::time::Instant::now();

        let mut client = self.client.lock().await;

        let stream = if params.is_empty() {
            client.query(sql, &[]).await
        } else {
            let tiberius_params = values_to_tiberius_params(params);
            let param_refs: Vec<&dyn tiberius::ToSql> = tiberius_params
                .iter()
                .map(|p| p as &dyn tiberius::ToSql)
                .collect();
            client.query(sql, &param_refs[..]).await
        };

        match stream {
            Ok(query_stream) => {
                let tib_rows = query_stream
                    .into_first_result()
                    .await
                    .map_err(query_error)?;

                let columns: Vec<ColumnMeta> = tib_rows
                    .first()
                    .map(|row| {
                        row.columns()
                            .iter()
                            .enumerate()
                            .map(|(idx, col)| ColumnMeta {
                                name: col.name().to_string(),
                                data_type: format!("{:?}", col.column_type()),
                                ordinal: idx,
                            })
                            .collect()
                    })
                    .unwrap_or_default();

                let column_names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
                let mut rows: Vec<Row> = Vec::with_capacity(tib_rows.len());
                for tib_row in tib_rows {
                    rows.push(Row::new(column_names.clone(), tiberius_row_to_values(tib_row)));
                }

                let execution_time_ms = start.elapsed().as_millis() as u64;
                tracing::debug!(
                    row_count = rows.len(),
                    duration_ms = execution_time_ms,
                    "query completed"
                );

                Ok(QueryResult {
                    id: Uuid::new_v4(),
                    columns,
                    rows,
                    execution_time_ms,
                })
            }
            Err(e) => {
                tracing::error!(error = %e, "query failed");
                Err(query_error(e))
            }
        }
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        tracing::debug!("MS SQL Server connection closed");
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Convert a tiberius row to a vector of Values by consuming the row
fn tiberius_row_to_values(row: TiberiusRow) -> Vec<Value> {
    row.into_iter().map(column_data_to_value).collect()
}

/// Days offset from a SQL Server epoch plus intra-day seconds to a naive datetime
fn datetime_from_parts(epoch_year: i32, days: i64, secs: u32, nanos: u32) -> chrono::NaiveDateTime {
    let date = chrono::NaiveDate::from_ymd_opt(epoch_year, 1, 1).unwrap_or_default()
        + chrono::Duration::days(days);
    let time =
        chrono::NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos).unwrap_or_default();
    chrono::NaiveDateTime::new(date, time)
}

/// Convert tiberius ColumnData to a core Value
pub(crate) fn column_data_to_value(col_data: ColumnData<'static>) -> Value {
    match col_data {
        ColumnData::Bit(v) => v.map(Value::Bool).unwrap_or(Value::Null),
        ColumnData::U8(v) => v.map(|n| Value::Int16(n as i16)).unwrap_or(Value::Null),
        ColumnData::I16(v) => v.map(Value::Int16).unwrap_or(Value::Null),
        ColumnData::I32(v) => v.map(Value::Int32).unwrap_or(Value::Null),
        ColumnData::I64(v) => v.map(Value::Int64).unwrap_or(Value::Null),
        ColumnData::F32(v) => v.map(Value::Float32).unwrap_or(Value::Null),
        ColumnData::F64(v) => v.map(Value::Float64).unwrap_or(Value::Null),
        ColumnData::String(v) => v
            .map(|s| Value::String(s.into_owned()))
            .unwrap_or(Value::Null),
        ColumnData::Guid(v) => v.map(Value::Uuid).unwrap_or(Value::Null),
        ColumnData::Binary(v) => v
            .map(|b| Value::Bytes(b.into_owned()))
            .unwrap_or(Value::Null),
        ColumnData::Numeric(v) => v
            .map(|n| Value::Decimal(n.to_string()))
            .unwrap_or(Value::Null),
        ColumnData::DateTime(v) => v
            .map(|dt| {
                Value::DateTime(datetime_from_parts(
                    1900,
                    dt.days() as i64,
                    (dt.seconds_fragments() as f64 / 300.0) as u32,
                    0,
                ))
            })
            .unwrap_or(Value::Null),
        ColumnData::SmallDateTime(v) => v
            .map(|dt| {
                Value::DateTime(datetime_from_parts(
                    1900,
                    dt.days() as i64,
                    (dt.seconds_fragments() as u32) * 60,
                    0,
                ))
            })
            .unwrap_or(Value::Null),
        ColumnData::DateTime2(v) => v
            .map(|dt| {
                let increments = dt.time().increments();
                Value::DateTime(datetime_from_parts(
                    1,
                    dt.date().days() as i64,
                    (increments / 10_000_000) as u32,
                    ((increments % 10_000_000) * 100) as u32,
                ))
            })
            .unwrap_or(Value::Null),
        ColumnData::DateTimeOffset(v) => v
            .map(|dto| {
                let dt2 = dto.datetime2();
                let increments = dt2.time().increments();
                let naive = datetime_from_parts(
                    1,
                    dt2.date().days() as i64,
                    (increments / 10_000_000) as u32,
                    ((increments % 10_000_000) * 100) as u32,
                );
                Value::DateTimeUtc(chrono::DateTime::from_naive_utc_and_offset(
                    naive,
                    chrono::Utc,
                ))
            })
            .unwrap_or(Value::Null),
        ColumnData::Date(v) => v
            .map(|d| {
                Value::Date(
                    chrono::NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or_default()
                        + chrono::Duration::days(d.days() as i64),
                )
            })
            .unwrap_or(Value::Null),
        ColumnData::Time(v) => v
            .map(|t| {
                let increments = t.increments();
                Value::Time(
                    chrono::NaiveTime::from_num_seconds_from_midnight_opt(
                        (increments / 10_000_000) as u32,
                        ((increments % 10_000_000) * 100) as u32,
                    )
                    .unwrap_or_default(),
                )
            })
            .unwrap_or(Value::Null),
        ColumnData::Xml(v) => v
            .map(|x| Value::String(x.into_owned().into_string()))
            .unwrap_or(Value::Null),
    }
}

/// Parameter values for the metric queries
#[derive(Debug)]
pub(crate) enum TiberiusParam {
    Null,
    Bool(bool),
    I32(i32),
    I64(i64),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
}

impl tiberius::ToSql for TiberiusParam {
    fn to_sql(&self) -> ColumnData<'_> {
        match self {
            TiberiusParam::Null => ColumnData::I32(None),
            TiberiusParam::Bool(v) => ColumnData::Bit(Some(*v)),
            TiberiusParam::I32(v) => ColumnData::I32(Some(*v)),
            TiberiusParam::I64(v) => ColumnData::I64(Some(*v)),
            TiberiusParam::F64(v) => ColumnData::F64(Some(*v)),
            TiberiusParam::String(v) => {
                ColumnData::String(Some(std::borrow::Cow::Borrowed(v.as_str())))
            }
            TiberiusParam::Bytes(v) => {
                ColumnData::Binary(Some(std::borrow::Cow::Borrowed(v.as_slice())))
            }
        }
    }
}

/// Convert core Values to tiberius parameters. Types with no direct TDS
/// parameter encoding are sent as their string form.
pub(crate) fn values_to_tiberius_params(values: &[Value]) -> Vec<TiberiusParam> {
    values
        .iter()
        .map(|v| match v {
            Value::Null => TiberiusParam::Null,
            Value::Bool(b) => TiberiusParam::Bool(*b),
            Value::Int16(i) => TiberiusParam::I32(*i as i32),
            Value::Int32(i) => TiberiusParam::I32(*i),
            Value::Int64(i) => TiberiusParam::I64(*i),
            Value::Float32(f) => TiberiusParam::F64(*f as f64),
            Value::Float64(f) => TiberiusParam::F64(*f),
            Value::Bytes(b) => TiberiusParam::Bytes(b.clone()),
            other => TiberiusParam::String(other.to_string()),
        })
        .collect()
}

impl std::fmt::Debug for MssqlConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MssqlConnection")
            .field("database", &self.database)
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish()
    }
}
