use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use gpon_sim::config::SimProfile;
use gpon_sim::net::SplitRatio;
use gpon_sim::optics::compute_power_budget;
use gpon_sim::topo::{TopologyOpts, TopologyShape, build_topology};
use gpon_sim::Result;
use tracing::error;

#[derive(Debug, Parser)]
#[command(
    name = "power-budget",
    about = "Build a GPON topology and report the optical budget of every terminal"
)]
struct Args {
    /// star, bus, ring or tree
    #[arg(long, default_value = "star")]
    shape: TopologyShape,

    #[arg(long, default_value_t = 32)]
    terminals: usize,

    /// Split ratio, e.g. 1:32
    #[arg(long, default_value = "1:32")]
    split_ratio: SplitRatio,

    /// JSON profile overriding the built-in constants
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Override head-end transmit power (dBm)
    #[arg(long, allow_hyphen_values = true)]
    tx_power_dbm: Option<f64>,

    /// Override head-end receive sensitivity (dBm)
    #[arg(long, allow_hyphen_values = true)]
    rx_sensitivity_dbm: Option<f64>,

    /// Print the full report as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn run(args: Args) -> Result<()> {
    let mut profile = match &args.profile {
        Some(path) => SimProfile::from_json_file(path)?,
        None => SimProfile::default(),
    };
    if let Some(tx) = args.tx_power_dbm {
        profile.head_end.tx_power_dbm = tx;
    }
    if let Some(rx) = args.rx_sensitivity_dbm {
        profile.head_end.rx_sensitivity_dbm = rx;
    }

    let opts = TopologyOpts {
        shape: args.shape,
        terminal_count: args.terminals,
        split_ratio: args.split_ratio,
        head_end: profile.head_end,
        ..TopologyOpts::default()
    };
    let topology = build_topology(&opts, &profile.optical)?;
    let report = compute_power_budget(&topology.network, &profile.optical)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{:<8} {:>9} {:>10} {:>10} {:>8} {:>10} {:>10}  valid",
        "terminal", "path_km", "split_db", "fiber_db", "splices", "total_db", "avail_db"
    );
    for b in &report {
        println!(
            "{:<8} {:>9.2} {:>10.2} {:>10.2} {:>8} {:>10.2} {:>10.2}  {}",
            b.terminal_name,
            b.budget.path_length_km,
            b.budget.splitter_loss_db,
            b.budget.fiber_loss_db,
            b.budget.splice_count,
            b.total_loss_db(),
            b.available_power_db(),
            b.is_valid()
        );
    }
    let valid = report.iter().filter(|b| b.is_valid()).count();
    println!(
        "budget_summary shape={} ratio={} terminals={} valid={}",
        topology.shape,
        topology.split_ratio,
        report.len(),
        valid
    );
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(code = e.code(), "{e}");
            eprintln!("error[{}]: {e}", e.code());
            ExitCode::FAILURE
        }
    }
}
