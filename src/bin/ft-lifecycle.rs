//! # FT Lifecycle Launcher
//!
//! Command-line entry point: parses the connection and target options, loads
//! the layered configuration, runs one protection lifecycle and exits with the
//! status derived from the run report.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing::{error, info};

use ft_lifecycle::client::SimulatedEndpoint;
use ft_lifecycle::config::{ConfigManager, ConfigOverrides, LifecycleConfig};
use ft_lifecycle::constants::{exit_codes, system};
use ft_lifecycle::logging::init_console_logging;
use ft_lifecycle::orchestration::{LifecycleRunner, RunReport};

const BANNER_WIDTH: usize = 90;

#[derive(Parser, Debug)]
#[command(name = "ft-lifecycle")]
#[command(about = "Enable, exercise and remove fault-tolerance protection on a workload")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Management endpoint address (IP or host name)
    #[arg(long, visible_alias = "vsphereip", required_unless_present = "config")]
    endpoint: Option<String>,

    /// User name for the management endpoint
    #[arg(long, required_unless_present = "config")]
    username: Option<String>,

    /// Password for the management endpoint
    #[arg(long, required_unless_present = "config")]
    password: Option<String>,

    /// Cluster holding the workload
    #[arg(long, visible_alias = "clusterName", required_unless_present = "config")]
    cluster_name: Option<String>,

    /// Workload to protect; the first workload on an eligible host when omitted
    #[arg(long, visible_alias = "vmName")]
    workload_name: Option<String>,

    /// Configuration file (YAML, TOML or JSON) merged under the command-line values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rehearse against an inventory snapshot (JSON) instead of a live endpoint
    #[arg(long)]
    inventory: Option<PathBuf>,

    /// Print the run report as JSON once the run is over
    #[arg(long)]
    json_report: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            address: self.endpoint.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            cluster_name: self.cluster_name.clone(),
            workload_name: self.workload_name.clone(),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_console_logging();

    banner("Fault Tolerance lifecycle execution STARTED");

    let code = run(&cli).await;
    process::exit(code);
}

async fn run(cli: &Cli) -> i32 {
    let manager = match ConfigManager::load(cli.config.as_deref(), &cli.overrides()) {
        Ok(manager) => manager,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            eprintln!(
                "Usage: ft-lifecycle --endpoint <address> --username <user> --password <password> \
                 --cluster-name <cluster> [--workload-name <workload>]"
            );
            banner("Fault Tolerance lifecycle execution COMPLETED");
            return exit_codes::CONFIGURATION_ERROR;
        }
    };
    let config = manager.config();
    echo_target(config);

    let Some(inventory) = cli.inventory.as_deref() else {
        report_missing_adapter(config);
        finish(config).await;
        return exit_codes::RESOLUTION_FAILED;
    };

    // An unreadable snapshot is bad input, not a resolution failure
    let endpoint = match open_inventory(inventory) {
        Ok(endpoint) => endpoint,
        Err(e) => {
            error!(error = %format!("{e:#}"), "❌ LAUNCHER: inventory snapshot unusable");
            eprintln!("Configuration error: {e:#}");
            finish(config).await;
            return exit_codes::CONFIGURATION_ERROR;
        }
    };
    info!(
        version = system::FT_LIFECYCLE_VERSION,
        environment = manager.environment(),
        inventory = %inventory.display(),
        "🧪 LAUNCHER: rehearsing against the simulated endpoint"
    );

    let runner = LifecycleRunner::from_config(Arc::new(endpoint), config);
    let report = runner.run_target(&config.target).await;

    summarize(&report);
    if cli.json_report {
        match render_report(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => error!(error = %format!("{e:#}"), "❌ LAUNCHER: run report not printed"),
        }
    }

    finish(config).await;
    report.exit_code()
}

fn open_inventory(path: &Path) -> anyhow::Result<SimulatedEndpoint> {
    SimulatedEndpoint::load_snapshot(path)
        .with_context(|| format!("loading inventory snapshot {}", path.display()))
}

fn render_report(report: &RunReport) -> anyhow::Result<String> {
    serde_json::to_string_pretty(report).context("serializing the run report")
}

fn echo_target(config: &LifecycleConfig) {
    let rule = "-".repeat(67);
    println!("Reading endpoint and credentials information");
    println!("{rule}");
    println!("Endpoint: {}", config.endpoint.address);
    println!("Username: {}", config.endpoint.username);
    println!("Password: ******");
    println!("Cluster Name: {}", config.target.cluster_name);
    if let Some(workload) = &config.target.workload_name {
        println!("Workload Name: {workload}");
    }
    println!("{rule}\n");
}

fn report_missing_adapter(config: &LifecycleConfig) {
    eprintln!(
        "No live endpoint adapter is linked into this build, cannot log into {}",
        config.endpoint.url()
    );
    eprintln!("Use --inventory <snapshot.json> to rehearse the lifecycle offline.");
    eprintln!("When logging into a live endpoint fails, check that:");
    eprintln!("  - the username and password are correct");
    eprintln!("  - special characters in the password are quoted for your shell");
    eprintln!("  - the endpoint address is reachable from this machine");
}

fn summarize(report: &RunReport) {
    if let Some(resolution) = &report.resolution {
        eprintln!("Topology resolution failed: {resolution}");
        return;
    }
    for record in &report.steps {
        println!("{:<32} {}", record.step.as_str(), record.outcome.label());
    }
    if !report.rollback.is_clean() {
        eprintln!("Rollback left residue, restore the workload state manually:");
        for fault in &report.rollback.faults {
            eprintln!("  - {fault}");
        }
    }
}

async fn finish(config: &LifecycleConfig) {
    let delay = config.timeouts.exit_delay();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    banner("Fault Tolerance lifecycle execution COMPLETED");
}

fn banner(title: &str) {
    let pad = BANNER_WIDTH.saturating_sub(title.len() + 2) / 2;
    let hashes = "#".repeat(pad.max(3));
    println!("{hashes} {title} {hashes}");
}
