use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use tiberius::{AuthMethod, Client, ColumnData, Config as TdsConfig, FromSql, Query, Row};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use crate::config::DatabaseConfig;
use crate::database::executor::{ProcedureCall, ProcedureExecutor, ResultSet, SqlParam, SqlValue};
use crate::error::Result;

type TdsClient = Client<Compat<TcpStream>>;

/// SQL Server executor. Every call opens its own connection and closes it
/// before returning, whatever the outcome.
#[derive(Clone)]
pub struct MssqlExecutor {
    config: TdsConfig,
}

impl MssqlExecutor {
    pub fn new(db: &DatabaseConfig) -> Self {
        let mut config = TdsConfig::new();
        config.host(&db.server);
        config.port(db.port);
        config.database(&db.database);
        config.authentication(AuthMethod::sql_server(&db.username, &db.password));
        config.application_name(env!("CARGO_PKG_NAME"));
        if db.trust_cert {
            config.trust_cert();
        }
        Self { config }
    }

    async fn connect(&self) -> Result<TdsClient> {
        match open(self.config.clone()).await {
            // Azure SQL gateways answer the first login with a redirect.
            Err(crate::error::Error::Database(tiberius::error::Error::Routing { host, port })) => {
                tracing::debug!("Following SQL Server redirect to {}:{}", host, port);
                let mut config = self.config.clone();
                config.host(&host);
                config.port(port);
                open(config).await
            }
            other => other,
        }
    }
}

async fn open(config: TdsConfig) -> Result<TdsClient> {
    let tcp = TcpStream::connect(config.get_addr()).await?;
    tcp.set_nodelay(true)?;
    Ok(Client::connect(config, tcp.compat_write()).await?)
}

async fn release(client: TdsClient) {
    if let Err(e) = client.close().await {
        tracing::warn!("Failed to close database connection: {}", e);
    }
}

fn prepare(call: &ProcedureCall) -> Query<'_> {
    let mut query = Query::new(call.to_sql());
    for (_, value) in &call.params {
        match value {
            SqlParam::Text(text) => query.bind(text.as_str()),
            SqlParam::Integer(Some(number)) => query.bind(*number),
            SqlParam::Integer(None) => {}
            SqlParam::Timestamp(ts) => query.bind(*ts),
        }
    }
    query
}

async fn execute_committed(client: &mut TdsClient, call: &ProcedureCall) -> Result<()> {
    client
        .simple_query("BEGIN TRANSACTION")
        .await?
        .into_results()
        .await?;
    prepare(call).execute(client).await?;
    // An error before this point leaves the transaction open; closing the
    // connection makes the server roll it back.
    client
        .simple_query("COMMIT TRANSACTION")
        .await?
        .into_results()
        .await?;
    Ok(())
}

async fn query_result_sets(client: &mut TdsClient, call: &ProcedureCall) -> Result<Vec<ResultSet>> {
    let sets = prepare(call).query(client).await?.into_results().await?;
    sets.into_iter().map(into_result_set).collect()
}

async fn select_version(client: &mut TdsClient) -> Result<String> {
    let row = client
        .simple_query("SELECT @@VERSION")
        .await?
        .into_row()
        .await?;
    let version = match row {
        Some(row) => row.try_get::<&str, _>(0)?.map(str::to_owned),
        None => None,
    };
    Ok(version.unwrap_or_default())
}

fn into_result_set(rows: Vec<Row>) -> Result<ResultSet> {
    let columns = rows
        .first()
        .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
        .unwrap_or_default();
    let rows = rows
        .into_iter()
        .map(|row| row.into_iter().map(into_sql_value).collect::<Result<Vec<_>>>())
        .collect::<Result<Vec<_>>>()?;
    Ok(ResultSet { columns, rows })
}

fn into_sql_value(data: ColumnData<'static>) -> Result<SqlValue> {
    let value = match &data {
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            NaiveDateTime::from_sql(&data)?.map(SqlValue::Timestamp)
        }
        ColumnData::DateTimeOffset(_) => DateTime::<FixedOffset>::from_sql(&data)?
            .map(|dt| SqlValue::Timestamp(dt.naive_local())),
        ColumnData::Date(_) => NaiveDate::from_sql(&data)?.map(SqlValue::Date),
        ColumnData::Time(_) => NaiveTime::from_sql(&data)?.map(SqlValue::Time),
        ColumnData::U8(v) => v.map(|n| SqlValue::Int(n.into())),
        ColumnData::I16(v) => v.map(|n| SqlValue::Int(n.into())),
        ColumnData::I32(v) => v.map(|n| SqlValue::Int(n.into())),
        ColumnData::I64(v) => v.map(SqlValue::Int),
        ColumnData::F32(v) => v.map(|n| SqlValue::Float(n.into())),
        ColumnData::F64(v) => v.map(SqlValue::Float),
        ColumnData::Bit(v) => v.map(SqlValue::Bool),
        ColumnData::String(v) => v.as_ref().map(|s| SqlValue::Text(s.to_string())),
        ColumnData::Guid(v) => v.map(|g| SqlValue::Text(g.to_string())),
        ColumnData::Binary(v) => v.as_ref().map(|b| SqlValue::Bytes(b.to_vec())),
        ColumnData::Numeric(v) => v.as_ref().map(|n| SqlValue::Decimal(n.to_string())),
        ColumnData::Xml(v) => v
            .as_ref()
            .map(|xml| SqlValue::Text((**xml).clone().into_string())),
        #[allow(unreachable_patterns)]
        _ => None,
    };
    Ok(value.unwrap_or(SqlValue::Null))
}

#[async_trait]
impl ProcedureExecutor for MssqlExecutor {
    async fn execute(&self, call: &ProcedureCall) -> Result<()> {
        let mut client = self.connect().await?;
        let outcome = execute_committed(&mut client, call).await;
        release(client).await;
        outcome
    }

    async fn query(&self, call: &ProcedureCall) -> Result<Vec<ResultSet>> {
        let mut client = self.connect().await?;
        let outcome = query_result_sets(&mut client, call).await;
        release(client).await;
        outcome
    }

    async fn server_version(&self) -> Result<String> {
        let mut client = self.connect().await?;
        let outcome = select_version(&mut client).await;
        release(client).await;
        outcome
    }
}
