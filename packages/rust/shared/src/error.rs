//! Error types for RollCall.
//!
//! Library crates use [`RollCallError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all RollCall operations.
///
/// Every pipeline failure carries the input that triggered it (URL, link,
/// cast value) so callers can tell which stage and which record broke.
#[derive(Debug, thiserror::Error)]
pub enum RollCallError {
    /// Transport failure, timeout, or non-success HTTP status.
    #[error("fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// An expected structural marker is missing from a fetched document.
    #[error("parse error in {source_ref}: {message}")]
    Parse { source_ref: String, message: String },

    /// A cast value matched none of the recoding rules.
    #[error("unrecognized cast {cast:?} for {senator} on {vote_id}")]
    UnrecognizedCast {
        vote_id: String,
        senator: String,
        cast: String,
    },

    /// Too few senators or votes for projection and clustering.
    #[error("insufficient data ({senators} senators x {votes} votes): {message}")]
    InsufficientData {
        senators: usize,
        votes: usize,
        message: String,
    },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, RollCallError>;

impl RollCallError {
    /// Create a fetch error for the given URL.
    pub fn fetch(url: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: msg.into(),
        }
    }

    /// Create a parse error naming the offending document or link.
    pub fn parse(source_ref: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Parse {
            source_ref: source_ref.into(),
            message: msg.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an insufficient-data error for a matrix of the given shape.
    pub fn insufficient(senators: usize, votes: usize, msg: impl Into<String>) -> Self {
        Self::InsufficientData {
            senators,
            votes,
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Name of the pipeline stage this error belongs to.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "fetch",
            Self::Parse { .. } => "parse",
            Self::UnrecognizedCast { .. } => "recode",
            Self::InsufficientData { .. } => "cluster",
            Self::Config { .. } => "config",
            Self::Io { .. } => "io",
        }
    }
}
