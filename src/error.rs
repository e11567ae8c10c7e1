use crate::common::types::Timestamp;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
/// Enum for the various errors surfaced by the filters.
pub enum FilterError {
    #[error("Out-of-order sample. Last accepted {0}, received {1}.")]
    InvalidOrder(Timestamp, Timestamp),

    #[error("Malformed batch. {0}")]
    InvalidShape(String),

    #[error("Invalid filter parameter. {0}")]
    InvalidParameter(String),

    #[error("Invalid line protocol. {0}")]
    InvalidLine(String),
}

pub type FilterResult<T> = Result<T, FilterError>;
