//! Error types.
//!
//! Only *mandatory* queries surface as [`Error::HandleQuery`]. Best-effort queries
//! (per-type code bitmasks, axis info, physical path, unique id) are absorbed where
//! they happen and replaced with an empty or zeroed default.

use crate::device::Query;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A mandatory query against the device handle failed.
    #[error("mandatory query {query} failed: {source}")]
    HandleQuery {
        query: Query,
        #[source]
        source: io::Error,
    },

    #[error("malformed event data: {0}")]
    Decode(#[from] DecodeError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn query(query: Query, source: io::Error) -> Self {
        Error::HandleQuery { query, source }
    }
}

/// Fixed-layout decoding failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Strict decoding found bytes past the last whole record.
    #[error("{trailing} trailing byte(s) after {records} whole record(s) of {record_size} bytes")]
    TrailingBytes {
        records: usize,
        record_size: usize,
        trailing: usize,
    },

    /// A query reply was shorter than the kernel struct it should contain.
    #[error("short reply for {what}: expected {expected} bytes, got {actual}")]
    ShortReply {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
