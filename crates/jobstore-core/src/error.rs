use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid job result: {0}")]
    InvalidResult(String),
}

pub type Result<T> = std::result::Result<T, Error>;
