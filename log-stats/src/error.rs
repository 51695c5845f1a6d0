use std::io;

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("failed to write report: {0}")]
    Output(#[from] io::Error),

    #[error("failed to start input reader: {0}")]
    Reader(#[source] io::Error),

    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}
