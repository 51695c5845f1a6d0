use std::str::FromStr;

use chrono::NaiveDateTime;
use derive_more::{AsRef, Debug, Display};

/// Raw status field of an access log record: a run of ASCII digits. Codes
/// too large for `u16` are still well-formed, they just never match a
/// tracked code.
#[derive(Debug, Display, AsRef, Clone, PartialEq, Eq, Hash)]
pub struct StatusToken(String);

impl StatusToken {
    pub fn code(&self) -> Option<u16> {
        self.0.parse().ok()
    }
}

impl FromStr for StatusToken {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("invalid status token: {s:?}"));
        }
        Ok(Self(s.into()))
    }
}

// 2017-02-05 23:31:22.258076; the fractional part may have any precision
const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

#[derive(Debug, Display, AsRef, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Copy)]
pub struct Timestamp(NaiveDateTime);

impl FromStr for Timestamp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('.') {
            Some((_, fraction))
                if !fraction.is_empty() && fraction.bytes().all(|b| b.is_ascii_digit()) => {}
            _ => return Err(format!("missing fractional seconds: {s:?}")),
        }
        NaiveDateTime::parse_from_str(s, TS_FORMAT)
            .map(Self)
            .map_err(|e| e.to_string())
    }
}
