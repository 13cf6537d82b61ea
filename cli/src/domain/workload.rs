//! Workload run record and the stages a workload passes through.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of one orchestrated workload. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkloadRun {
    pub pod_id: String,
    /// Exit code of the user's action.
    pub exit_code: i32,
    /// When the auto-termination timer fires.
    pub auto_termination_at: DateTime<Utc>,
    /// Remote stdout, present only when output was captured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

impl WorkloadRun {
    /// Attach captured remote output.
    #[must_use]
    pub fn with_output(mut self, stdout: String, stderr: String) -> Self {
        self.stdout = Some(stdout);
        self.stderr = Some(stderr);
        self
    }
}

/// Absolute auto-termination time: creation time plus `minutes`.
#[must_use]
pub fn auto_termination_at(created_at: DateTime<Utc>, minutes: u64) -> DateTime<Utc> {
    let ms = i64::try_from(minutes.saturating_mul(60_000)).unwrap_or(i64::MAX);
    created_at
        .checked_add_signed(chrono::Duration::milliseconds(ms))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Remote command used by `podctl test` when none is given.
pub const DEFAULT_TEST_COMMAND: &str = "python -m pytest -v";

/// Remote working directory that uploads land in.
pub const REMOTE_WORKDIR: &str = "/workspace";

/// Quote `s` for a POSIX shell.
#[must_use]
pub fn shell_quote(s: &str) -> String {
    if !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:@".contains(c))
    {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', r"'\''"))
}
