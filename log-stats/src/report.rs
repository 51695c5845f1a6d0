use clap::ValueEnum;
use std::{fmt, io::Write};

use crate::{analytics::Snapshot, error::StatsError};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File size: {}", self.file_size)?;
        for (code, count) in &self.status_codes {
            writeln!(f, "{code}: {count}")?;
        }
        Ok(())
    }
}

/// Writes one report and flushes it before returning, so nothing is left in
/// a buffer if the process is torn down right after.
pub fn write_report<W: Write>(
    out: &mut W,
    snapshot: &Snapshot,
    format: ReportFormat,
) -> Result<(), StatsError> {
    let rendered = match format {
        ReportFormat::Text => snapshot.to_string(),
        ReportFormat::Json => {
            let mut line = serde_json::to_string(snapshot)?;
            line.push('\n');
            line
        }
    };
    for line in rendered.split_inclusive('\n') {
        out.write_all(line.as_bytes())?;
        out.flush()?;
    }
    Ok(())
}
