//! Entrypoint: parse flags, set up tracing, layer the configuration, run one
//! counted scan against the chosen backend and print the result.

use aerocount::cli::{Backend, Cli, OutputFormat};
use aerocount::client::{ClientPolicy, Connector, MemoryCluster};
use aerocount::config::ScanConfig;
use aerocount::output;
use aerocount::report::ScanReport;
use aerocount::runner::ScanRunner;
use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let mut settings = cli.load_settings().context("failed to load settings")?;
    cli.apply(&mut settings);
    let config = settings.scan_config()?;
    let client_policy = settings.client_policy()?;
    debug!(?config, ?client_policy, "resolved configuration");

    match cli.backend {
        Backend::Memory => {
            if !cli.quiet {
                output::print_warning("using the simulated in-memory cluster; no server is contacted");
            }
            let cluster = MemoryCluster::builder(config.endpoint.clone())
                .nodes(cli.demo_nodes)
                .set(config.namespace.clone(), config.set.clone(), cli.demo_records)
                .build();
            execute(cluster, &cli, &config, client_policy).await
        }
        Backend::Aerospike => run_aerospike(&cli, &config, client_policy).await,
    }
}

#[cfg(feature = "aerospike")]
async fn run_aerospike(cli: &Cli, config: &ScanConfig, policy: ClientPolicy) -> anyhow::Result<()> {
    execute(
        aerocount::client::aerospike::AerospikeConnector::new(),
        cli,
        config,
        policy,
    )
    .await
}

#[cfg(not(feature = "aerospike"))]
async fn run_aerospike(_cli: &Cli, _config: &ScanConfig, _policy: ClientPolicy) -> anyhow::Result<()> {
    Err(aerocount::CliError::Unsupported(
        "this build has no aerospike backend; rebuild with `--features aerospike` or pass `--backend memory`"
            .to_string(),
    )
    .into())
}

async fn execute<C: Connector>(
    connector: C,
    cli: &Cli,
    config: &ScanConfig,
    policy: ClientPolicy,
) -> anyhow::Result<()> {
    let mut runner = ScanRunner::new(connector).with_client_policy(policy);

    let progress = (cli.progress && !cli.quiet).then(spinner);
    if let Some(pb) = &progress {
        runner = runner.with_progress(pb.clone());
    }

    let plain = cli.output == OutputFormat::Plain;
    if plain && !cli.quiet {
        output::print_scan_header(config, runner.backend());
    }

    let started_at = Utc::now();
    let start = Instant::now();
    let result = runner.run(config).await;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let records = result.with_context(|| format!("scan against {} failed", config.endpoint))?;

    let report = ScanReport::new(runner.backend(), config, records, started_at, start.elapsed());
    output::print_report(&report, cli.output, cli.quiet)?;

    Ok(())
}

/// Initialise tracing on stderr. `RUST_LOG` wins over `-v`/`-q`.
fn init_tracing(cli: &Cli) {
    let default = if cli.verbose {
        "aerocount=debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} records ({per_sec})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
