use thiserror::Error;

use crate::core::types::ParseObjectIDError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("postgres connection failed: {0}")]
    Connection(#[source] tokio_postgres::Error),

    #[error("schema bootstrap failed: {0}")]
    Schema(#[source] tokio_postgres::Error),

    #[error("write failed: {0}")]
    Write(#[from] tokio_postgres::Error),

    #[error("write rejected for {0}")]
    Rejected(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    ParseObjectID(#[from] ParseObjectIDError),
}
