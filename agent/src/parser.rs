//! Line parser (spec §4.2.2): three formats tried in order, each producing
//! an entry or signalling unparseable. Never panics on malformed input -
//! a parse or timestamp failure simply drops the line.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use logline_protocol::{Level, LogEntry};
use once_cell::sync::Lazy;
use regex::Regex;

/// `[<iso-timestamp>] [<LEVEL>] [<service>] <message>`
static APPLICATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[(?P<ts>[^\]]+)\]\s*\[(?P<level>[A-Za-z]+)\]\s*\[(?P<service>[^\]]+)\]\s*(?P<msg>.*)$")
        .expect("valid regex")
});

/// `<dd-MMM-yyyy HH:mm:ss.SSS> <WORD> [<module>] <message>`
static SERVER_APPLICATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<ts>\d{2}-[A-Za-z]{3}-\d{4} \d{2}:\d{2}:\d{2}\.\d{3})\s+(?P<level>\w+)\s+\[(?P<module>[^\]]+)\]\s*(?P<msg>.*)$",
    )
    .expect("valid regex")
});

/// Combined-log-shape HTTP access line with an explicit status code.
static HTTP_ACCESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?P<host>\S+) \S+ \S+ \[(?P<ts>[^\]]+)\] "(?P<method>\S+) (?P<path>\S+)(?: \S+)?" (?P<status>\d{3}) (?P<size>\S+)"#,
    )
    .expect("valid regex")
});

/// Which format produced an entry; carried through for metrics/tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Application,
    ServerApplication,
    HttpAccess,
}

/// Parses one tailed line into a [`LogEntry`], per spec §4.2.2. Returns
/// `None` (and the caller increments a drop counter) when no format
/// matches or the timestamp fails to parse.
pub fn parse_line(line: &str, source: &str, agent_id: &str) -> Option<(LogEntry, Format)> {
    if let Some(caps) = APPLICATION.captures(line) {
        let timestamp_ns = parse_rfc3339(&caps["ts"])?;
        let level = parse_level_direct(&caps["level"]);
        let service = caps["service"].to_string();
        let mut fields = HashMap::new();
        fields.insert("service".to_string(), service);
        return Some((
            LogEntry {
                timestamp_ns,
                level,
                message: caps["msg"].to_string(),
                source: source.to_string(),
                agent_id: agent_id.to_string(),
                fields,
            },
            Format::Application,
        ));
    }

    if let Some(caps) = SERVER_APPLICATION.captures(line) {
        let timestamp_ns = parse_server_application_ts(&caps["ts"])?;
        let level = parse_level_server_application(&caps["level"]);
        let module = caps["module"].to_string();
        let mut fields = HashMap::new();
        fields.insert("service".to_string(), module);
        return Some((
            LogEntry {
                timestamp_ns,
                level,
                message: caps["msg"].to_string(),
                source: source.to_string(),
                agent_id: agent_id.to_string(),
                fields,
            },
            Format::ServerApplication,
        ));
    }

    if let Some(caps) = HTTP_ACCESS.captures(line) {
        let timestamp_ns = parse_http_access_ts(&caps["ts"])?;
        let status: u16 = caps["status"].parse().ok()?;
        let level = level_for_status(status);
        let mut fields = HashMap::new();
        fields.insert("service".to_string(), "http-access".to_string());
        fields.insert("host".to_string(), caps["host"].to_string());
        fields.insert("status".to_string(), status.to_string());
        return Some((
            LogEntry {
                timestamp_ns,
                level,
                message: format!("{} {} {}", &caps["method"], &caps["path"], status),
                source: source.to_string(),
                agent_id: agent_id.to_string(),
                fields,
            },
            Format::HttpAccess,
        ));
    }

    None
}

fn parse_level_direct(raw: &str) -> Level {
    match raw.to_ascii_uppercase().as_str() {
        "ERROR" => Level::Error,
        "WARN" | "WARNING" => Level::Warn,
        "INFO" => Level::Info,
        "DEBUG" => Level::Debug,
        _ => Level::Unknown,
    }
}

fn parse_level_server_application(raw: &str) -> Level {
    match raw.to_ascii_uppercase().as_str() {
        "SEVERE" => Level::Error,
        "WARNING" => Level::Warn,
        _ => Level::Info,
    }
}

fn level_for_status(status: u16) -> Level {
    if status >= 500 {
        Level::Error
    } else if status >= 400 {
        Level::Warn
    } else {
        Level::Info
    }
}

fn parse_rfc3339(raw: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .and_then(|dt| dt.with_timezone(&Utc).timestamp_nanos_opt())
}

fn parse_server_application_ts(raw: &str) -> Option<i64> {
    NaiveDateTime::parse_from_str(raw, "%d-%b-%Y %H:%M:%S%.3f")
        .ok()
        .and_then(|naive| naive.and_utc().timestamp_nanos_opt())
}

fn parse_http_access_ts(raw: &str) -> Option<i64> {
    DateTime::parse_from_str(raw, "%d/%b/%Y:%H:%M:%S %z")
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .and_then(|dt| dt.timestamp_nanos_opt())
}
