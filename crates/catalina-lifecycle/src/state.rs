//! Instance state detection over a process table

use crate::error::{LifecycleError, LifecycleResult};
use std::thread;
use std::time::{Duration, Instant};

/// Observed state of one catalina instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceState {
    Started,
    Stopped,
    /// More than one process claims the instance's base directory
    ErrorMultipleProcess,
    /// The process table itself could not be read
    ErrorFindingProcess,
}

impl InstanceState {
    /// Whether the state reflects a failure to observe a single process
    #[inline]
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::ErrorMultipleProcess | Self::ErrorFindingProcess)
    }
}

/// One row of the process table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub user: String,
    pub command_line: String,
}

impl ProcessInfo {
    #[must_use]
    pub fn new(pid: u32, user: impl Into<String>, command_line: impl Into<String>) -> Self {
        Self {
            pid,
            user: user.into(),
            command_line: command_line.into(),
        }
    }
}

/// Selects the processes belonging to one instance
///
/// A process matches when its command line carries
/// `-Dcatalina.base=<base>` and, if a user is set, it runs as that user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessQuery {
    pub catalina_base: String,
    pub user: Option<String>,
}

impl ProcessQuery {
    #[must_use]
    pub fn new(catalina_base: impl Into<String>) -> Self {
        Self {
            catalina_base: catalina_base.into(),
            user: None,
        }
    }

    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    #[must_use]
    pub fn matches(&self, process: &ProcessInfo) -> bool {
        let marker = format!("-Dcatalina.base={}", self.catalina_base);
        let base_matches = process
            .command_line
            .split_whitespace()
            .any(|arg| arg == marker);
        base_matches && self.user.as_deref().map_or(true, |user| user == process.user)
    }
}

/// Source of process rows
#[cfg_attr(test, mockall::automock)]
pub trait ProcessTable {
    /// Snapshot of the running processes
    ///
    /// # Errors
    /// Returns [`LifecycleError::Query`] when the table cannot be read.
    fn processes(&self) -> LifecycleResult<Vec<ProcessInfo>>;
}

impl ProcessTable for [ProcessInfo] {
    fn processes(&self) -> LifecycleResult<Vec<ProcessInfo>> {
        Ok(self.to_vec())
    }
}

impl ProcessTable for Vec<ProcessInfo> {
    fn processes(&self) -> LifecycleResult<Vec<ProcessInfo>> {
        Ok(self.clone())
    }
}

/// Classify an instance by counting its matching processes
pub fn detect_state<T: ProcessTable + ?Sized>(table: &T, query: &ProcessQuery) -> InstanceState {
    let processes = match table.processes() {
        Ok(processes) => processes,
        Err(err) => {
            tracing::warn!(error = %err, base = %query.catalina_base, "process lookup failed");
            return InstanceState::ErrorFindingProcess;
        }
    };
    let count = processes.iter().filter(|p| query.matches(p)).count();
    tracing::debug!(count, base = %query.catalina_base, "matched instance processes");
    match count {
        0 => InstanceState::Stopped,
        1 => InstanceState::Started,
        _ => InstanceState::ErrorMultipleProcess,
    }
}

/// Poll until the instance reaches `desired` or `deadline` elapses
///
/// Sleeps `interval` between polls. The last observed state is returned
/// on success and reported in the timeout error otherwise.
///
/// # Errors
/// Returns [`LifecycleError::Timeout`] once the deadline has passed.
pub fn wait_for_state<T: ProcessTable + ?Sized>(
    table: &T,
    query: &ProcessQuery,
    desired: InstanceState,
    interval: Duration,
    deadline: Duration,
) -> LifecycleResult<InstanceState> {
    let started = Instant::now();
    loop {
        let state = detect_state(table, query);
        if state == desired {
            return Ok(state);
        }
        let waited = started.elapsed();
        if waited >= deadline {
            tracing::warn!(?desired, last = ?state, ?waited, "gave up waiting for instance state");
            return Err(LifecycleError::Timeout {
                desired,
                last: state,
                waited,
            });
        }
        thread::sleep(interval);
    }
}
