mod content_cards;
#[cfg(feature = "test-utilities")]
mod memory;
mod permissions;
mod schema;

use async_trait::async_trait;
use time::OffsetDateTime;
use time::PrimitiveDateTime;
use tokio::task::JoinHandle;
use tokio_postgres::types::ToSql;
use tokio_postgres::Client;
use tokio_postgres::NoTls;

use crate::config::PostgresConfig;
use crate::core::types::BlockNum;
use crate::core::types::Timestamp;
use crate::projection::Write;
use crate::Error;

#[cfg(feature = "test-utilities")]
pub use memory::ContentCardRow;
#[cfg(feature = "test-utilities")]
pub use memory::MemorySink;
#[cfg(feature = "test-utilities")]
pub use memory::PermissionRow;
pub use schema::SCHEMA_SQL;

/// Destination of projected writes.
#[async_trait]
pub trait Sink: Send {
    /// False when there is no live connection, making every call a no-op.
    fn is_connected(&self) -> bool;

    /// Execute a single write, returning the number of affected rows.
    async fn execute(&mut self, write: &Write) -> Result<u64, Error>;

    /// Quote a literal for inclusion in a statement.
    fn escape(&self, literal: &str) -> String {
        escape_literal(literal)
    }
}

/// Quote `input` as a SQL string literal.
///
/// Same output as libpq's `PQescapeLiteral`: quotes are doubled and, if the
/// input holds any backslash, backslashes are doubled too and the literal is
/// given an ` E` prefix.
pub fn escape_literal(input: &str) -> String {
    let has_backslash = input.contains('\\');
    let mut out = String::with_capacity(input.len() + 4);
    if has_backslash {
        out.push_str(" E");
    }
    out.push('\'');
    for c in input.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Statement parameter
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Param {
    Text(String),
    BigInt(i64),
    SmallInt(i16),
    Time(PrimitiveDateTime),
}

impl Param {
    pub(crate) fn text(s: &str) -> Self {
        Self::Text(s.to_owned())
    }

    pub(crate) fn block_num(block_num: BlockNum) -> Self {
        Self::BigInt(block_num as i64)
    }

    pub(crate) fn block_time(timestamp: Timestamp) -> Self {
        Self::Time(block_time(timestamp))
    }

    fn as_sql(&self) -> &(dyn ToSql + Sync) {
        match self {
            Self::Text(s) => s as &(dyn ToSql + Sync),
            Self::BigInt(i) => i as &(dyn ToSql + Sync),
            Self::SmallInt(i) => i as &(dyn ToSql + Sync),
            Self::Time(t) => t as &(dyn ToSql + Sync),
        }
    }

    /// Render as a SQL literal, quoting text through `escape`.
    fn render(&self, escape: &dyn Fn(&str) -> String) -> String {
        match self {
            Self::Text(s) => escape(s),
            Self::BigInt(i) => i.to_string(),
            Self::SmallInt(i) => i.to_string(),
            Self::Time(t) => escape(&t.to_string()),
        }
    }
}

/// Convert a block timestamp into a (utc) `timestamp` column value.
pub(crate) fn block_time(timestamp: Timestamp) -> PrimitiveDateTime {
    let t = OffsetDateTime::UNIX_EPOCH + time::Duration::seconds(timestamp as i64);
    PrimitiveDateTime::new(t.date(), t.time())
}

/// A parameterized sql statement.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Statement {
    pub sql: &'static str,
    pub params: Vec<Param>,
}

impl Statement {
    fn sql_params(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(|p| p.as_sql()).collect()
    }

    /// Statement text with parameters inlined, for logs.
    fn render(&self, escape: &dyn Fn(&str) -> String) -> String {
        // Highest placeholders first so $1 doesn't clobber $10
        self.params
            .iter()
            .enumerate()
            .rev()
            .fold(self.sql.to_owned(), |sql, (i, p)| {
                sql.replace(&format!("${}", i + 1), &p.render(escape))
            })
    }
}

impl From<&Write> for Statement {
    fn from(write: &Write) -> Self {
        match write {
            Write::UpsertContentCard {
                record,
                on_conflict,
            } => content_cards::upsert(record, *on_conflict),
            Write::RemoveContentCard {
                content_card_id,
                lifecycle,
            } => content_cards::remove(content_card_id, lifecycle),
            Write::UpsertPermission { record } => permissions::upsert(record),
            Write::RemovePermission {
                permission_id,
                lifecycle,
            } => permissions::remove(permission_id, lifecycle),
        }
    }
}

/// PostgreSQL sink, owning a single connection for the whole session.
pub struct PgSink {
    client: Option<Client>,
    connection: Option<JoinHandle<()>>,
}

impl PgSink {
    /// Connect to postgres and create tables if needed.
    ///
    /// Failing either step is fatal to the session.
    pub async fn connect(pgconf: &PostgresConfig) -> Result<Self, Error> {
        tracing::debug!("connecting to postgres");
        let (mut client, connection) = tokio_postgres::connect(&pgconf.connection_uri, NoTls)
            .await
            .map_err(Error::Connection)?;

        let handle = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("connection error: {}", e);
            }
        });
        tracing::info!("postgres connection successful");

        schema::init(&mut client).await?;

        Ok(Self {
            client: Some(client),
            connection: Some(handle),
        })
    }

    /// A sink without connection, ignoring all writes.
    pub fn disconnected() -> Self {
        Self {
            client: None,
            connection: None,
        }
    }

    /// Release the connection.
    pub async fn close(mut self) {
        tracing::debug!("closing postgres connection");
        // Dropping the client ends the connection future
        drop(self.client.take());
        if let Some(handle) = self.connection.take() {
            if let Err(e) = handle.await {
                tracing::warn!("connection task ended abnormally: {e}");
            }
        }
    }
}

#[async_trait]
impl Sink for PgSink {
    fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    async fn execute(&mut self, write: &Write) -> Result<u64, Error> {
        let Some(client) = &self.client else {
            return Ok(0);
        };
        let statement = Statement::from(write);
        tracing::trace!("executing {statement:?}");
        match client.execute(statement.sql, &statement.sql_params()).await {
            Ok(n) => Ok(n),
            Err(e) => {
                tracing::error!("sql: {}", statement.render(&|s: &str| self.escape(s)));
                Err(Error::Write(e))
            }
        }
    }
}
