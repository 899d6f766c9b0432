use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use gpon_sim::analysis::analyze;
use gpon_sim::config::{AllocationPolicy, SimProfile};
use gpon_sim::net::SplitRatio;
use gpon_sim::sim::TrafficSimulator;
use gpon_sim::topo::{TopologyOpts, TopologyShape, build_topology};
use gpon_sim::Result;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(
    name = "traffic-sim",
    about = "Run an upstream traffic simulation on a generated GPON topology"
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

    #[arg(long, default_value_t = 60.0)]
    duration_s: f64,

    /// Per-terminal rate in Mbps, in terminal order; may repeat.
    /// Terminals without a rate get a synthesized demand.
    #[arg(long = "traffic-rate", allow_hyphen_values = true)]
    traffic_rates: Vec<f64>,

    /// Override the allocation policy
    #[arg(long, value_enum)]
    policy: Option<AllocationPolicy>,

    /// JSON profile overriding the built-in constants
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Write the full simulation run as JSON
    #[arg(long)]
    out_json: Option<PathBuf>,
}

fn run(args: Args) -> Result<()> {
    let mut profile = match &args.profile {
        Some(path) => SimProfile::from_json_file(path)?,
        None => SimProfile::default(),
    };
    if let Some(policy) = args.policy {
        profile.traffic.policy = policy;
    }

    let opts = TopologyOpts {
        shape: args.shape,
        terminal_count: args.terminals,
        split_ratio: args.split_ratio,
        head_end: profile.head_end,
        traffic_rates: args.traffic_rates,
        ..TopologyOpts::default()
    };
    let topology = build_topology(&opts, &profile.optical)?;
    let metrics = analyze(&topology, &profile.analysis)?;
    info!(
        total_fiber_km = metrics.total_fiber_km,
        avg_latency_ms = metrics.avg_latency_ms,
        "拓扑分析"
    );

    let run = TrafficSimulator::new(profile).run(&topology, "cli", args.duration_s)?;

    for t in &run.terminals {
        println!(
            "terminal {} requested={:.3} granted={:.3} throughput={:.3} packets={} valid={}",
            t.terminal_name,
            t.requested_mbps,
            t.granted_mbps,
            t.effective_throughput_mbps,
            t.packets_sent,
            t.is_valid
        );
    }
    println!(
        "sim_summary shape={} terminals={} duration_s={} total_throughput_mbps={:.3} average_throughput_mbps={:.3} total_packets={} utilization_pct={:.2}",
        topology.shape,
        run.terminals.len(),
        run.duration_s,
        run.total_throughput_mbps,
        run.average_throughput_mbps,
        run.total_packets,
        run.allocation.global_utilization_pct
    );

    if let Some(path) = &args.out_json {
        fs::write(path, serde_json::to_string_pretty(&run)?)?;
        eprintln!("wrote simulation run to {}", path.display());
    }
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
