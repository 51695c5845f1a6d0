mod analytics;
mod error;
mod ingest;
mod invariants;
mod logging;
mod models;
mod report;
mod worker;

use clap::Parser;
use error::StatsError;
use ingest::{LineSource, MAX_LINE_LEN, shutdown_signal};
use report::ReportFormat;
use std::{io, num::NonZeroU64};
use worker::{Settings, process};

#[derive(Parser, Debug)]
#[command(version, about = "Running statistics over an HTTP access log read from stdin", long_about = None)]
struct Args {
    /// Print a report after this many accepted lines
    #[arg(long, default_value = "10")]
    report_every: NonZeroU64,

    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    /// Lines longer than this many bytes are skipped as malformed
    #[arg(long, default_value_t = MAX_LINE_LEN)]
    max_line_length: usize,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), StatsError> {
    let args = Args::parse();
    logging::init_logging();

    let settings = Settings {
        report_every: args.report_every,
        format: args.format,
    };
    let mut source = LineSource::spawn(io::stdin(), args.max_line_length, shutdown_signal())
        .map_err(StatsError::Reader)?;
    let mut out = io::stdout().lock();
    process(&mut source, &mut out, &settings).await?;

    Ok(())
}
