mod args;
mod generator;
mod stream;

use args::CliArgs;
use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};
use stream::{StreamSettings, run_log_stream};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    info!(rate = args.rate(), count = ?args.count(), "starting log stream");

    let settings = StreamSettings {
        rate: *args.rate(),
        count: *args.count(),
        malformed_ratio: *args.malformed_ratio(),
        path: args.path().clone(),
    };
    let mut rng = match args.seed() {
        Some(seed) => StdRng::seed_from_u64(*seed),
        None => StdRng::from_os_rng(),
    };
    let mut stdout = tokio::io::stdout();

    tokio::select! {
        written = run_log_stream(&mut stdout, &mut rng, &settings) => {
            let written = written?;
            info!(written, "log stream finished");
        }
        interrupted = signal::ctrl_c() => {
            if let Err(e) = interrupted {
                warn!(error = %e, "failed to listen for ctrl_c");
            }
            info!("stopping log generation");
        }
    }
    Ok(())
}
