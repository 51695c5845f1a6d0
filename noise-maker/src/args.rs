use clap::Parser;
use derive_getters::Getters;

#[derive(Parser, Debug, Getters)]
#[command(name = "noise-maker")]
#[command(about = "Generate a fake access log stream on stdout", long_about = None)]
pub struct CliArgs {
    /// Lines per second; 0 writes as fast as the pipe accepts
    #[arg(long, default_value_t = 10)]
    rate: u64,

    /// Stop after this many lines
    #[arg(long)]
    count: Option<u64>,

    /// Share of lines that are deliberately not valid records
    #[arg(long, default_value_t = 0.0, value_parser = parse_ratio)]
    malformed_ratio: f64,

    #[arg(long, default_value = "/projects/260")]
    path: String,

    /// Seed for a reproducible stream
    #[arg(long)]
    seed: Option<u64>,
}

fn parse_ratio(s: &str) -> Result<f64, String> {
    let ratio: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&ratio) {
        Ok(ratio)
    } else {
        Err(format!("{ratio} is not between 0 and 1"))
    }
}
