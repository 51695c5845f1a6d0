use crate::invariants::{StatusToken, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub host: String,
    pub timestamp: Timestamp,
    pub request: String,
    pub status: StatusToken,
    pub bytes: u64,
}
