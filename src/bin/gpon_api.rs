use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use gpon_sim::config::SimProfile;
use gpon_sim::service::SimulationService;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(
    name = "gpon-api",
    about = "Serve JSON requests (one per line) from stdin and write one JSON response per line"
)]
struct Args {
    /// JSON profile overriding the built-in constants
    #[arg(long)]
    profile: Option<PathBuf>,
}

fn serve(service: &SimulationService) -> io::Result<usize> {
    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    let mut handled = 0;
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let resp = service.handle_json(&line);
        serde_json::to_writer(&mut out, &resp)?;
        out.write_all(b"\n")?;
        out.flush()?;
        handled += 1;
    }
    Ok(handled)
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

    let args = Args::parse();
    let profile = match &args.profile {
        Some(path) => match SimProfile::from_json_file(path) {
            Ok(p) => p,
            Err(e) => {
                error!(code = e.code(), path = %path.display(), "{e}");
                return ExitCode::FAILURE;
            }
        },
        None => SimProfile::default(),
    };

    let service = SimulationService::new(profile);
    match serve(&service) {
        Ok(handled) => {
            info!(handled, "🚀 输入结束，服务退出");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "读写失败");
            ExitCode::FAILURE
        }
    }
}
