//! Shared types, error model, configuration, and HTTP access for RollCall.
//!
//! This crate is the foundation depended on by all other RollCall crates.
//! It provides:
//! - [`RollCallError`]: the unified error type
//! - Domain types ([`SessionRef`], [`VoteLink`], [`CastRecord`], [`RecodedTable`],
//!   [`ClusterAssignment`])
//! - Configuration ([`AppConfig`], [`SourceConfig`], [`ClusterOptions`], config loading)
//! - [`SourceClient`]: the HTTP boundary to the roll-call records portal

pub mod config;
pub mod error;
pub mod http;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ClusterOptions, ClusterSection, FillPolicy, ParticipationMeasure, SessionSection,
    SourceConfig, SourceSection, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use error::{Result, RollCallError};
pub use http::SourceClient;
pub use types::{
    CastRecord, ClusterAssignment, RecodedRecord, RecodedTable, SessionRef, VoteLink,
};
