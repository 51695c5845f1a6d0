use serde::Serialize;
use std::{collections::BTreeMap, num::NonZeroU64};

use crate::models::LogEntry;

/// Status codes that get their own counter in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatusCode {
    Ok,
    MovedPermanently,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    InternalServerError,
}

impl StatusCode {
    /// Every tracked code, in ascending numeric order.
    pub const ALL: [Self; 8] = [
        Self::Ok,
        Self::MovedPermanently,
        Self::BadRequest,
        Self::Unauthorized,
        Self::Forbidden,
        Self::NotFound,
        Self::MethodNotAllowed,
        Self::InternalServerError,
    ];

    pub fn try_from_status(status: u16) -> Option<Self> {
        match status {
            200 => Some(Self::Ok),
            301 => Some(Self::MovedPermanently),
            400 => Some(Self::BadRequest),
            401 => Some(Self::Unauthorized),
            403 => Some(Self::Forbidden),
            404 => Some(Self::NotFound),
            405 => Some(Self::MethodNotAllowed),
            500 => Some(Self::InternalServerError),
            _ => None,
        }
    }

    pub fn to_status(self) -> u16 {
        match self {
            Self::Ok => 200u16,
            Self::MovedPermanently => 301u16,
            Self::BadRequest => 400u16,
            Self::Unauthorized => 401u16,
            Self::Forbidden => 403u16,
            Self::NotFound => 404u16,
            Self::MethodNotAllowed => 405u16,
            Self::InternalServerError => 500u16,
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Running totals over every accepted line of the stream.
///
/// Owned by the processing loop; nothing here is ever reset.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Analytics {
    total_size: u64,
    events: [u64; StatusCode::ALL.len()],
    accepted_lines: u64,
}

impl Analytics {
    /// Folds one parse result into the totals. Returns whether the line was
    /// accepted; a `None` entry leaves the state untouched.
    pub fn record(&mut self, entry: Option<&LogEntry>) -> bool {
        let Some(entry) = entry else {
            return false;
        };
        self.total_size = self.total_size.saturating_add(entry.bytes);
        if let Some(code) = entry.status.code().and_then(StatusCode::try_from_status) {
            self.events[code.slot()] += 1;
        }
        self.accepted_lines += 1;
        true
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn accepted_lines(&self) -> u64 {
        self.accepted_lines
    }

    pub fn event_count(&self, code: StatusCode) -> u64 {
        self.events[code.slot()]
    }

    pub fn is_report_due(&self, every: NonZeroU64) -> bool {
        self.accepted_lines > 0 && self.accepted_lines % every.get() == 0
    }

    pub fn snapshot(&self) -> Snapshot {
        let status_codes = StatusCode::ALL
            .iter()
            .filter_map(|code| {
                let count = self.event_count(*code);
                (count > 0).then(|| (code.to_status(), count))
            })
            .collect();
        Snapshot {
            file_size: self.total_size,
            status_codes,
        }
    }
}

/// Point-in-time copy of [`Analytics`] as it is reported. Only codes with a
/// nonzero count are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub file_size: u64,
    pub status_codes: BTreeMap<u16, u64>,
}
