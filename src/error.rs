//! Crate error type
//!
//! The simulation itself never fails; these cover configuration parsing and
//! browser platform setup.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid config field `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("platform error: {0}")]
    Platform(String),
}

pub type Result<T> = std::result::Result<T, Error>;
