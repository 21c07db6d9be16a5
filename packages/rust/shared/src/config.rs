//! Application configuration for RollCall.
//!
//! User config lives at `~/.rollcall/rollcall.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, RollCallError};
use crate::types::SessionRef;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "rollcall.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".rollcall";

// ---------------------------------------------------------------------------
// Config structs (matching rollcall.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Records portal access.
    #[serde(default)]
    pub source: SourceSection,

    /// Which session to analyse.
    #[serde(default)]
    pub session: SessionSection,

    /// Projection and clustering parameters.
    #[serde(default)]
    pub cluster: ClusterSection,
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSection {
    /// Scheme + host of the records portal.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra attempts after a retryable fetch failure.
    #[serde(default)]
    pub max_retries: u32,

    /// Initial backoff between retries; doubles on each attempt.
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,

    /// Pause before each detail-page request.
    #[serde(default)]
    pub rate_limit_ms: u64,

    /// Maximum detail pages fetched concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
            retry_backoff_ms: default_retry_backoff(),
            rate_limit_ms: 0,
            concurrency: default_concurrency(),
        }
    }
}

fn default_origin() -> String {
    "https://www.senate.gov".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_retry_backoff() -> u64 {
    500
}
fn default_concurrency() -> u32 {
    1
}

/// `[session]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSection {
    #[serde(default = "default_congress")]
    pub congress: u32,

    #[serde(default = "default_session")]
    pub session: u32,

    /// Votes to process from the front of the listing; -1 means all.
    #[serde(default = "default_vote_limit")]
    pub vote_limit: i64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            congress: default_congress(),
            session: default_session(),
            vote_limit: default_vote_limit(),
        }
    }
}

fn default_congress() -> u32 {
    117
}
fn default_session() -> u32 {
    1
}
fn default_vote_limit() -> i64 {
    -1
}

/// `[cluster]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSection {
    #[serde(default = "default_one")]
    pub participation_threshold: u32,

    #[serde(default = "default_cluster_count")]
    pub cluster_count: usize,

    #[serde(default)]
    pub random_seed: u64,

    #[serde(default)]
    pub fill: FillPolicy,

    #[serde(default)]
    pub participation: ParticipationMeasure,

    /// k-means restarts; the lowest-inertia run wins.
    #[serde(default = "default_n_init")]
    pub n_init: usize,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl Default for ClusterSection {
    fn default() -> Self {
        Self {
            participation_threshold: default_one(),
            cluster_count: default_cluster_count(),
            random_seed: 0,
            fill: FillPolicy::default(),
            participation: ParticipationMeasure::default(),
            n_init: default_n_init(),
            max_iterations: default_max_iterations(),
        }
    }
}

fn default_one() -> u32 {
    1
}
fn default_cluster_count() -> usize {
    3
}
fn default_n_init() -> usize {
    10
}
fn default_max_iterations() -> usize {
    300
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// How absent (senator, vote) cells are materialized before projection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FillPolicy {
    /// Absent cells become 0, indistinguishable from a Nay.
    #[default]
    Zero,
    /// Absent cells take the mean of the vote's observed cells.
    VoteMean,
}

/// What the participation threshold is compared against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParticipationMeasure {
    /// Sum of |cast_binary| over observed cells, i.e. the number of Yea/Guilty casts.
    #[default]
    SignalMass,
    /// Number of votes the senator has any recorded cast on.
    VotesCast,
}

// ---------------------------------------------------------------------------
// Runtime configs (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime settings for the HTTP source client.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub origin: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub rate_limit_ms: u64,
    pub concurrency: u32,
}

impl From<&AppConfig> for SourceConfig {
    fn from(config: &AppConfig) -> Self {
        let s = &config.source;
        Self {
            origin: s.origin.clone(),
            timeout_secs: s.timeout_secs,
            max_retries: s.max_retries,
            retry_backoff_ms: s.retry_backoff_ms,
            rate_limit_ms: s.rate_limit_ms,
            concurrency: s.concurrency,
        }
    }
}

/// Runtime parameters for the cluster engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterOptions {
    pub participation_threshold: u32,
    pub cluster_count: usize,
    pub random_seed: u64,
    pub fill: FillPolicy,
    pub participation: ParticipationMeasure,
    pub n_init: usize,
    pub max_iterations: usize,
}

impl ClusterOptions {
    /// Options with the given core parameters and default policies.
    pub fn new(participation_threshold: u32, cluster_count: usize, random_seed: u64) -> Self {
        Self {
            participation_threshold,
            cluster_count,
            random_seed,
            ..Self::from(&ClusterSection::default())
        }
    }

    /// Reject parameter values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.participation_threshold < 1 {
            return Err(RollCallError::config("participation_threshold must be at least 1"));
        }
        if self.cluster_count < 1 {
            return Err(RollCallError::config("cluster_count must be at least 1"));
        }
        if self.n_init < 1 {
            return Err(RollCallError::config("n_init must be at least 1"));
        }
        if self.max_iterations < 1 {
            return Err(RollCallError::config("max_iterations must be at least 1"));
        }
        Ok(())
    }
}

impl From<&ClusterSection> for ClusterOptions {
    fn from(c: &ClusterSection) -> Self {
        Self {
            participation_threshold: c.participation_threshold,
            cluster_count: c.cluster_count,
            random_seed: c.random_seed,
            fill: c.fill,
            participation: c.participation,
            n_init: c.n_init,
            max_iterations: c.max_iterations,
        }
    }
}

impl From<&AppConfig> for ClusterOptions {
    fn from(config: &AppConfig) -> Self {
        Self::from(&config.cluster)
    }
}

impl AppConfig {
    /// The session described by the `[session]` section.
    pub fn session_ref(&self) -> Result<SessionRef> {
        SessionRef::new(
            self.session.congress,
            self.session.session,
            self.session.vote_limit,
        )
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.rollcall/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| RollCallError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.rollcall/rollcall.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| RollCallError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| RollCallError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| RollCallError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| RollCallError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| RollCallError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
