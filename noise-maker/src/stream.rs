use crate::generator::{generate_access_log, generate_malformed_log};
use rand::{Rng, RngCore};
use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::time::{Duration, sleep};
use tracing::debug;

const MAX_RATE_BEFORE_DISABLING_THROTTLING: u64 = 10_000;

#[derive(Debug, Clone)]
pub struct StreamSettings {
    pub rate: u64,
    pub count: Option<u64>,
    pub malformed_ratio: f64,
    pub path: String,
}

/// Writes generated lines to `out` until `count` is reached or the reader
/// goes away. Returns how many lines were written.
pub async fn run_log_stream<W, R>(
    out: &mut W,
    rng: &mut R,
    settings: &StreamSettings,
) -> io::Result<u64>
where
    W: AsyncWrite + Unpin,
    R: RngCore,
{
    let delay = match settings.rate {
        0 => None,
        rate if rate >= MAX_RATE_BEFORE_DISABLING_THROTTLING => None,
        rate => Some(Duration::from_secs_f64(1f64 / rate as f64)),
    };

    let mut written = 0u64;
    while settings.count.is_none_or(|count| written < count) {
        let mut line = if rng.random_bool(settings.malformed_ratio) {
            generate_malformed_log(rng, &settings.path)
        } else {
            generate_access_log(rng, &settings.path)
        };
        line.push('\n');

        match out.write_all(line.as_bytes()).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!("reader closed the stream");
                break;
            }
            Err(e) => return Err(e),
        }
        out.flush().await?;
        written += 1;

        if let Some(d) = delay {
            sleep(d).await;
        }
    }
    Ok(written)
}
