use regex::Regex;
use std::{future::Future, io::Write, num::NonZeroU64, sync::LazyLock};
use tracing::{debug, info, trace};

use crate::{
    analytics::Analytics,
    error::StatsError,
    ingest::{EndReason, LineSource},
    models::LogEntry,
    report::{ReportFormat, write_report},
};

// 93.114.18.21 - [2017-02-05 23:31:22.258076] "GET /projects/260 HTTP/1.1" 200 512
static LOG_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<host>\S+) - ",
        r"\[(?P<timestamp>[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}\.[0-9]+)\] ",
        r#""(?P<request>[^"]*)" "#,
        r"(?P<status>[0-9]+) (?P<bytes>[0-9]+)$",
    ))
    .expect("valid log line pattern")
});

#[derive(Debug, Clone, Copy)]
pub struct Settings {
    pub report_every: NonZeroU64,
    pub format: ReportFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            report_every: NonZeroU64::new(10).expect("nonzero const"),
            format: ReportFormat::default(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub lines_read: u64,
    pub accepted_lines: u64,
    pub reports: u64,
    pub end: Option<EndReason>,
}

/// Consumes `source` to the end, printing a report every
/// `settings.report_every` accepted lines and once more when input stops.
pub async fn process<S, W>(
    source: &mut LineSource<S>,
    out: &mut W,
    settings: &Settings,
) -> Result<Summary, StatsError>
where
    S: Future<Output = ()>,
    W: Write,
{
    let mut analytics = Analytics::default();
    let mut summary = Summary::default();

    while let Some(line) = source.next_line().await {
        summary.lines_read += 1;
        let entry = parse_log_line(&line);
        match &entry {
            Some(e) => trace!(
                host = %e.host,
                timestamp = %e.timestamp,
                request = %e.request,
                status = %e.status,
                bytes = e.bytes,
                "accepted line"
            ),
            None => debug!(%line, "skipping malformed line"),
        }
        if analytics.record(entry.as_ref()) && analytics.is_report_due(settings.report_every) {
            write_report(out, &analytics.snapshot(), settings.format)?;
            summary.reports += 1;
        }
    }

    write_report(out, &analytics.snapshot(), settings.format)?;
    summary.reports += 1;
    summary.accepted_lines = analytics.accepted_lines();
    summary.end = source.end_reason();
    info!(
        lines_read = summary.lines_read,
        accepted = summary.accepted_lines,
        total_size = analytics.total_size(),
        overlong = source.overlong_lines(),
        end = ?summary.end,
        "log stream finished"
    );
    Ok(summary)
}

fn parse_log_line(line: &str) -> Option<LogEntry> {
    let caps = LOG_LINE.captures(line.trim())?;
    Some(LogEntry {
        host: caps["host"].to_string(),
        timestamp: caps["timestamp"].parse().ok()?,
        request: caps["request"].to_string(),
        status: caps["status"].parse().ok()?,
        bytes: caps["bytes"].parse().ok()?,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use asserting::{expectations::IsEqualTo, prelude::*};
    use crate::ingest::MAX_LINE_LEN;
    use std::{future::pending, io, time::Duration};

    fn line(status: &str, bytes: &str) -> String {
        format!(
            r#"93.114.18.21 - [2017-02-05 23:31:22.258076] "GET /projects/260 HTTP/1.1" {status} {bytes}"#
        )
    }

    fn lines<'a>(items: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
        items
            .into_iter()
            .map(|(status, bytes)| line(status, bytes) + "\n")
            .collect()
    }

    async fn run(input: &str, settings: Settings) -> (String, Summary) {
        let reader = io::Cursor::new(input.as_bytes().to_vec());
        let mut source = LineSource::spawn(reader, MAX_LINE_LEN, pending::<()>()).unwrap();
        let mut out = Vec::new();
        let summary = process(&mut source, &mut out, &settings).await.unwrap();
        (String::from_utf8(out).unwrap(), summary)
    }

    #[test]
    fn parse_log_line_valid() {
        let line = r#"93.114.18.21 - [2017-02-05 23:31:22.258076] "GET /projects/260 HTTP/1.1" 200 512"#;
        assert_that!(parse_log_line(line))
            .is_some()
            .mapping(|o| o.unwrap())
            .expecting(IsEqualTo {
                expected: LogEntry {
                    host: "93.114.18.21".into(),
                    timestamp: "2017-02-05 23:31:22.258076".parse().unwrap(),
                    request: "GET /projects/260 HTTP/1.1".into(),
                    status: "200".parse().unwrap(),
                    bytes: 512,
                },
            });
    }

    #[test]
    fn parse_log_line_any_request_path() {
        let line = r#"10.0.0.7 - [2024-03-01 08:00:00.1] "POST /api/v2/items?id=4 HTTP/2" 404 0"#;
        let entry = parse_log_line(line).unwrap();
        assert_eq!(entry.request, "POST /api/v2/items?id=4 HTTP/2");
        assert_eq!(entry.bytes, 0);
    }

    #[test]
    fn parse_log_line_strips_surrounding_whitespace() {
        let padded = format!("  {}\r\n", line("301", "7"));
        assert_that!(parse_log_line(&padded)).is_some();
    }

    #[test]
    fn parse_log_line_keeps_unknown_numeric_status() {
        let entry = parse_log_line(&line("999", "50")).unwrap();
        assert_eq!(entry.status.code(), Some(999));
        assert_eq!(entry.bytes, 50);
    }

    #[test]
    fn parse_log_line_rejects_malformed() {
        let rejected = [
            String::new(),
            "garbage".to_string(),
            line("200", "abc"),
            line("200", "-12"),
            line("OK", "50"),
            line("2O0", "50"),
            line("-200", "50"),
            line("200", "99999999999999999999999"),
            line("200", ""),
            format!("{} extra", line("200", "10")),
            line("200", "10").replace(" - [", " ["),
            line("200", "10").replace('"', ""),
            line("200", "10").replace("2017-02-05", "2017-02-31"),
            line("200", "10").replace("23:31:22.258076", "23:31"),
            line("200", "10").replace("23:31:22.258076", "23:31:22"),
            line("200", "10").replace("23:31:22.258076", "23:31:22."),
            r#"93.114.18.21 - [2017-02-05 23:31:22.258076] "GET /projects/260 HTTP/1.1" 200"#
                .to_string(),
        ];
        for candidate in rejected {
            assert!(parse_log_line(&candidate).is_none(), "accepted {candidate:?}");
        }
    }

    #[tokio::test]
    async fn no_input_prints_empty_final_report() {
        let (out, summary) = run("", Settings::default()).await;
        assert_eq!(out, "File size: 0\n");
        assert_eq!(summary.reports, 1);
        assert_eq!(summary.end, Some(EndReason::Eof));
    }

    #[tokio::test]
    async fn ten_lines_report_midstream_and_at_end() {
        let input = lines(std::iter::repeat_n(("200", "100"), 10));
        let (out, summary) = run(&input, Settings::default()).await;
        assert_eq!(out, "File size: 1000\n200: 10\nFile size: 1000\n200: 10\n");
        assert_eq!(summary.reports, 2);
        assert_eq!(summary.accepted_lines, 10);
    }

    #[tokio::test]
    async fn unrecognized_status_only_counts_size() {
        let (out, _) = run(&lines([("999", "50")]), Settings::default()).await;
        assert_eq!(out, "File size: 50\n");
    }

    #[tokio::test]
    async fn malformed_lines_do_not_trigger_reports() {
        let mut input = lines(std::iter::repeat_n(("200", "1"), 9));
        input.push_str(&line("200", "ten"));
        input.push('\n');
        input.push_str("\n");
        let (out, summary) = run(&input, Settings::default()).await;

        assert_eq!(out, "File size: 9\n200: 9\n");
        assert_eq!(summary.lines_read, 11);
        assert_eq!(summary.accepted_lines, 9);
    }

    #[tokio::test]
    async fn counts_are_cumulative_across_reports() {
        let input = lines([
            ("200", "10"),
            ("404", "20"),
            ("500", "30"),
            ("bogus", "oops"),
            ("404", "40"),
        ]);
        let settings = Settings {
            report_every: NonZeroU64::new(2).unwrap(),
            ..Settings::default()
        };
        let (out, summary) = run(&input, settings).await;

        let expected = concat!(
            "File size: 30\n200: 1\n404: 1\n",
            "File size: 100\n200: 1\n404: 2\n500: 1\n",
            "File size: 100\n200: 1\n404: 2\n500: 1\n",
        );
        assert_eq!(out, expected);
        assert_eq!(summary.reports, 3);
    }

    #[tokio::test]
    async fn json_format_matches_text_semantics() {
        let input = lines([("401", "5"), ("403", "6")]);
        let settings = Settings {
            format: ReportFormat::Json,
            ..Settings::default()
        };
        let (out, _) = run(&input, settings).await;
        assert_eq!(out, "{\"file_size\":11,\"status_codes\":{\"401\":1,\"403\":1}}\n");
    }

    #[tokio::test]
    async fn letter_status_lines_are_not_counted() {
        let input = lines(std::iter::repeat_n(("abc", "5"), 10));
        let (out, summary) = run(&input, Settings::default()).await;

        assert_eq!(out, "File size: 0\n");
        assert_eq!(summary.accepted_lines, 0);
        assert_eq!(summary.reports, 1);
    }

    #[tokio::test]
    async fn interruption_still_reports_everything_seen() {
        let (reader, mut writer) = io::pipe().unwrap();
        io::Write::write_all(
            &mut writer,
            lines([("200", "1"), ("405", "2"), ("301", "3")]).as_bytes(),
        )
        .unwrap();

        let mut source = LineSource::spawn(
            reader,
            MAX_LINE_LEN,
            tokio::time::sleep(Duration::from_millis(50)),
        )
        .unwrap();
        let mut out = Vec::new();
        let summary = process(&mut source, &mut out, &Settings::default())
            .await
            .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "File size: 6\n200: 1\n301: 1\n405: 1\n"
        );
        assert_eq!(summary.end, Some(EndReason::Interrupted));
        drop(writer);
    }
}
