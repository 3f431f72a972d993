//! Optional journald forwarding via systemd-cat.
//!
//! Best-effort: failure to forward must not change the run outcome.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::process::{Command, Stdio};

/// One line forwarded to the system log per run.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub username: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunRecord {
    pub fn new(action: &str, username: &str, error: Option<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            action: action.to_string(),
            username: username.to_string(),
            success: error.is_none(),
            error,
        }
    }
}

pub fn systemd_cat_available() -> bool {
    Command::new("systemd-cat")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Forward a run record to journald as a single JSON line.
pub fn forward_record(tag: &str, record: &RunRecord) {
    match serde_json::to_string(record) {
        Ok(line) => forward_line(tag, &line),
        Err(e) => tracing::warn!(error = %e, "cannot serialize journald record"),
    }
}

/// Forward a single log line to journald using `systemd-cat`.
pub fn forward_line(tag: &str, line: &str) {
    if !systemd_cat_available() {
        tracing::debug!("systemd-cat not available, skipping journald forwarding");
        return;
    }

    let mut child = match Command::new("systemd-cat")
        .arg("-t")
        .arg(tag)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(c) => c,
        Err(_) => return,
    };

    if let Some(mut stdin) = child.stdin.take() {
        let _ = stdin.write_all(line.as_bytes());
        let _ = stdin.write_all(b"\n");
    }

    let _ = child.wait();
}
