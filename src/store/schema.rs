use tokio_postgres::Client;

use crate::Error;

/// DDL of the projected tables and their indexes.
pub const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Create tables and indexes, if not there already.
pub(super) async fn init(client: &mut Client) -> Result<(), Error> {
    tracing::debug!("loading schema");
    let tx = client.transaction().await.map_err(Error::Schema)?;
    tx.batch_execute(SCHEMA_SQL).await.map_err(Error::Schema)?;
    tx.commit().await.map_err(Error::Schema)?;
    tracing::info!("postgres tables created/verified");
    Ok(())
}
