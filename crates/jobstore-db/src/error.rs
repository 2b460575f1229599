use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Malformed job record: {0}")]
    MalformedRecord(String),

    #[error("Invalid job record: {0}")]
    InvalidRecord(String),

    #[error("Query error: {0}")]
    Query(String),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Error::Connection(err.to_string()),
            other => Error::Query(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
