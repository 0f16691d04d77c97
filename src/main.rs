//! latency-router - replay call outcomes and show the routing decision
//!
//! Loads a router configuration, feeds it a recorded list of call outcomes, and
//! prints which deployment of a model group would be chosen next.

use anyhow::{Context, bail};
use clap::Parser;
use latency_router::utils::logging::init_logging;
use latency_router::{CallOutcome, Config, LatencyRouter};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "latency-router", version, about)]
struct Cli {
    /// Router configuration (YAML)
    #[arg(short, long, env = "LATENCY_ROUTER_CONFIG", default_value = "config/router.yaml")]
    config: PathBuf,

    /// Call outcomes to record before choosing (YAML list)
    #[arg(short, long)]
    replay: Option<PathBuf>,

    /// Model group to choose a deployment for
    #[arg(short, long)]
    group: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_file(&cli.config)
        .await
        .with_context(|| format!("loading {}", cli.config.display()))?;
    init_logging(&config.logging);

    let candidates = config.deployments_for(&cli.group);
    if candidates.is_empty() {
        bail!("no deployments configured for group {}", cli.group);
    }

    let router = LatencyRouter::from_config(&config).await?;

    if let Some(path) = &cli.replay {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let outcomes: Vec<CallOutcome> =
            serde_yaml::from_str(&content).context("parsing replay file")?;
        for outcome in &outcomes {
            router.report_outcome(outcome).await;
        }
        info!(count = outcomes.len(), "Replayed call outcomes");
    }

    let chosen = router.choose_deployment(&cli.group, &candidates).await;
    let report = serde_json::json!({
        "group": cli.group,
        "deployment": chosen,
        "stats": router.group_stats(&cli.group).await,
        "metrics": router.metrics_snapshot(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
