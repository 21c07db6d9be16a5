//! CLI command definitions, routing, and tracing setup.

use std::fmt::Write as _;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rollcall_core::pipeline::{PipelineConfig, PipelineReport, ProgressReporter};
use rollcall_shared::{
    AppConfig, FillPolicy, ParticipationMeasure, VoteLink, init_config, load_config,
};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// RollCall: cluster senators by how they vote.
#[derive(Parser)]
#[command(
    name = "rollcall",
    version,
    about = "Scrape a Senate session's roll-call votes and cluster senators by voting behavior.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    Json,
    Table,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch a session's votes, cluster the senators and print the result.
    Run(RunArgs),

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags for `rollcall run`. Each one overrides the config file.
#[derive(Args, Debug)]
pub(crate) struct RunArgs {
    /// Congress number (e.g. 117).
    #[arg(long)]
    pub congress: Option<u32>,

    /// Session within the congress (1 or 2).
    #[arg(long)]
    pub session: Option<u32>,

    /// Newest votes to analyse; -1 for all.
    #[arg(long, allow_hyphen_values = true)]
    pub vote_limit: Option<i64>,

    /// Minimum participation for a senator to be clustered.
    #[arg(long)]
    pub threshold: Option<u32>,

    /// Number of clusters.
    #[arg(short = 'k', long)]
    pub clusters: Option<usize>,

    /// Random seed for k-means initialization.
    #[arg(long)]
    pub seed: Option<u64>,

    /// How absent cells are filled before projection.
    #[arg(long)]
    pub fill: Option<FillArg>,

    /// What the participation threshold is compared against.
    #[arg(long)]
    pub participation: Option<ParticipationArg>,

    /// Concurrent detail-page fetches.
    #[arg(long)]
    pub concurrency: Option<u32>,

    /// Output format for the report.
    #[arg(long, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum FillArg {
    Zero,
    VoteMean,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum ParticipationArg {
    SignalMass,
    VotesCast,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

impl RunArgs {
    /// Apply command-line overrides on top of the loaded config.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(v) = self.congress {
            config.session.congress = v;
        }
        if let Some(v) = self.session {
            config.session.session = v;
        }
        if let Some(v) = self.vote_limit {
            config.session.vote_limit = v;
        }
        if let Some(v) = self.threshold {
            config.cluster.participation_threshold = v;
        }
        if let Some(v) = self.clusters {
            config.cluster.cluster_count = v;
        }
        if let Some(v) = self.seed {
            config.cluster.random_seed = v;
        }
        if let Some(v) = self.fill {
            config.cluster.fill = match v {
                FillArg::Zero => FillPolicy::Zero,
                FillArg::VoteMean => FillPolicy::VoteMean,
            };
        }
        if let Some(v) = self.participation {
            config.cluster.participation = match v {
                ParticipationArg::SignalMass => ParticipationMeasure::SignalMass,
                ParticipationArg::VotesCast => ParticipationMeasure::VotesCast,
            };
        }
        if let Some(v) = self.concurrency {
            config.source.concurrency = v;
        }
    }
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr; stdout carries the report.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "rollcall=info",
        1 => "rollcall=debug",
        _ => "rollcall=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run(args) => cmd_run(&args).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

async fn cmd_run(args: &RunArgs) -> Result<()> {
    let mut config = load_config()?;
    args.apply(&mut config);
    let pipeline_config = PipelineConfig::from_app_config(&config)?;

    info!(
        session = %pipeline_config.session,
        clusters = pipeline_config.cluster.cluster_count,
        threshold = pipeline_config.cluster.participation_threshold,
        "running roll-call pipeline"
    );

    let reporter = CliProgress::new();
    let report = rollcall_core::pipeline::run_pipeline(&pipeline_config, &reporter).await?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print!("{}", render_table(&report)?),
    }

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Table output
// ---------------------------------------------------------------------------

/// Plain-text rendering: a summary header, then one row per senator.
fn render_table(report: &PipelineReport) -> std::result::Result<String, std::fmt::Error> {
    let assignments = report.assignments();
    let width = assignments
        .iter()
        .map(|a| a.senator.len())
        .max()
        .unwrap_or(0)
        .max("Senator".len());

    let mut out = String::new();
    writeln!(out)?;
    writeln!(out, "  Session:   {}", report.session)?;
    writeln!(out, "  Votes:     {}", report.votes)?;
    writeln!(out, "  Records:   {}", report.records)?;
    writeln!(out, "  Senators:  {}", assignments.len())?;
    writeln!(out, "  Dropped:   {}", report.cluster.dropped_senators.len())?;
    if let Some(ratio) = report.cluster.explained_variance_ratio.first() {
        writeln!(out, "  PC1 var:   {:.1}%", ratio * 100.0)?;
    }
    writeln!(out, "  Inertia:   {:.4}", report.cluster.inertia)?;
    writeln!(out)?;

    writeln!(out, "  {:<width$}  {:>7}  {:>8}  {:>8}", "Senator", "Cluster", "PC1", "PC2")?;
    for a in assignments {
        let pc = |i: usize| a.coordinates.get(i).copied().unwrap_or(0.0);
        writeln!(
            out,
            "  {:<width$}  {:>7}  {:>8.3}  {:>8.3}",
            a.senator,
            a.cluster_label,
            pc(0),
            pc(1)
        )?;
    }
    writeln!(out)?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner on stderr.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("static spinner template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn vote_fetched(&self, link: &VoteLink, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Fetching [{current}/{total}] {}", link.vote_id()));
    }

    fn done(&self, _report: &PipelineReport) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    // A failed run never reaches `done`; clear the spinner before the error report.
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}
