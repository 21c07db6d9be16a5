//! End-to-end pipeline: session → vote links → rolls → recoded table → clusters.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};

pub use rollcall_cluster::ClusterReport;
use rollcall_shared::{
    AppConfig, ClusterAssignment, ClusterOptions, Result, SessionRef, SourceClient, SourceConfig,
    VoteLink,
};

/// Configuration for [`run_pipeline`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// HTTP and crawl settings.
    pub source: SourceConfig,
    /// Congress/session to analyse and the vote limit.
    pub session: SessionRef,
    /// Cluster engine parameters.
    pub cluster: ClusterOptions,
}

impl PipelineConfig {
    /// Build a pipeline configuration from the loaded application config.
    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            source: SourceConfig::from(config),
            session: config.session_ref()?,
            cluster: ClusterOptions::from(config),
        })
    }
}

/// Result of a pipeline run, handed to whatever sink renders or stores it.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Session the votes were taken from.
    pub session: SessionRef,
    /// When the run finished.
    pub generated_at: DateTime<Utc>,
    /// Number of votes fetched and parsed.
    pub votes: usize,
    /// Number of recoded (senator, vote) records.
    pub records: usize,
    /// Total elapsed time in milliseconds.
    pub elapsed_ms: u64,
    /// Cluster assignments and projection diagnostics.
    pub cluster: ClusterReport,
}

impl PipelineReport {
    /// One assignment per retained senator.
    pub fn assignments(&self) -> &[ClusterAssignment] {
        &self.cluster.assignments
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when a vote's roll has been fetched and parsed.
    fn vote_fetched(&self, link: &VoteLink, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, report: &PipelineReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn vote_fetched(&self, _link: &VoteLink, _current: usize, _total: usize) {}
    fn done(&self, _report: &PipelineReport) {}
}

/// Run the full pipeline.
///
/// 1. Resolve the session's vote links
/// 2. Fetch and parse every roll, in listing order
/// 3. Assemble and recode the casts
/// 4. Pivot, filter, project and cluster
///
/// Any stage failure aborts the run; nothing partial is returned.
#[instrument(skip_all, fields(session = %config.session))]
pub async fn run_pipeline(
    config: &PipelineConfig,
    progress: &dyn ProgressReporter,
) -> Result<PipelineReport> {
    let start = Instant::now();
    config.cluster.validate()?;
    let client = SourceClient::new(&config.source)?;

    info!(origin = %client.origin(), "starting pipeline");

    // --- Phase 1: Vote links ---
    progress.phase("Resolving vote links");
    let links = rollcall_discovery::resolve_vote_links(&client, &config.session).await?;

    // --- Phase 2: Rolls ---
    progress.phase("Fetching roll calls");
    let concurrency = config.source.concurrency as usize;
    let batches = rollcall_crawler::extract_all(&client, &links, concurrency, |link, i, n| {
        progress.vote_fetched(link, i, n)
    })
    .await?;

    // --- Phase 3: Recode ---
    progress.phase("Recoding casts");
    let table = rollcall_dataset::assemble_and_recode(batches)?;

    // --- Phase 4: Cluster ---
    progress.phase("Clustering senators");
    let cluster = rollcall_cluster::cluster_report(&table, &config.cluster)?;

    let report = PipelineReport {
        session: config.session,
        generated_at: Utc::now(),
        votes: links.len(),
        records: table.len(),
        elapsed_ms: start.elapsed().as_millis() as u64,
        cluster,
    };

    progress.done(&report);

    info!(
        votes = report.votes,
        records = report.records,
        senators = report.assignments().len(),
        elapsed_ms = report.elapsed_ms,
        "pipeline complete"
    );

    Ok(report)
}
