//! Process-table queries used by the ancestry prober.
//!
//! The prober only ever asks one question: "for this pid, what is the
//! parent pid and the command name?". [`ProcessTable`] abstracts that
//! question so the walk can run against the live OS ([`SystemProcessTable`])
//! or against a fixed set of processes ([`MemoryProcessTable`]).

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use crate::error::{ProbeError, Result};

/// What the process table knows about a single pid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    /// Parent pid, or `0` when the process has no parent.
    pub parent_pid: u32,
    /// Command name as reported by the OS (`comm` on Linux).
    pub command: String,
}

/// A source of process information.
pub trait ProcessTable {
    /// Looks up `pid`, failing with [`ProbeError::ProcessQueryFailed`] when
    /// the process does not exist or cannot be inspected.
    fn query(&self, pid: u32) -> impl Future<Output = Result<ProcessEntry>> + Send;
}

impl<T: ProcessTable + Sync> ProcessTable for &T {
    fn query(&self, pid: u32) -> impl Future<Output = Result<ProcessEntry>> + Send {
        (**self).query(pid)
    }
}

/// Process table backed by the operating system via `sysinfo`.
///
/// Each query refreshes only the requested pid and runs on tokio's blocking
/// pool, so it must be awaited from within a tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessTable;

impl SystemProcessTable {
    pub fn new() -> Self {
        SystemProcessTable
    }

    fn query_blocking(pid: u32) -> Result<ProcessEntry> {
        let target = Pid::from_u32(pid);
        let mut sys = System::new();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[target]),
            true,
            ProcessRefreshKind::nothing(),
        );

        let process = sys.process(target).ok_or_else(|| ProbeError::ProcessQueryFailed {
            pid,
            reason: "no such process".to_string(),
        })?;

        Ok(ProcessEntry {
            parent_pid: process.parent().map(|p| p.as_u32()).unwrap_or(0),
            command: process.name().to_string_lossy().into_owned(),
        })
    }
}

impl ProcessTable for SystemProcessTable {
    async fn query(&self, pid: u32) -> Result<ProcessEntry> {
        tokio::task::spawn_blocking(move || Self::query_blocking(pid))
            .await
            .map_err(|e| ProbeError::ProcessQueryFailed {
                pid,
                reason: format!("process query task failed: {e}"),
            })?
    }
}

/// A fixed, in-memory process table.
///
/// Useful for replaying a captured process tree and for tests. Counts the
/// queries it answers.
#[derive(Debug, Default)]
pub struct MemoryProcessTable {
    entries: HashMap<u32, ProcessEntry>,
    queries: AtomicUsize,
}

impl MemoryProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a process.
    pub fn with_process(mut self, pid: u32, parent_pid: u32, command: impl Into<String>) -> Self {
        self.insert(pid, parent_pid, command);
        self
    }

    pub fn insert(&mut self, pid: u32, parent_pid: u32, command: impl Into<String>) {
        self.entries.insert(
            pid,
            ProcessEntry {
                parent_pid,
                command: command.into(),
            },
        );
    }

    /// Builds a linear ancestry. `chain[0]` is the starting process and
    /// each following element is the parent of the previous one; the last
    /// element's parent is `root_pid`.
    pub fn from_chain<S: Into<String>>(
        chain: impl IntoIterator<Item = (u32, S)>,
        root_pid: u32,
    ) -> Self {
        let chain: Vec<(u32, String)> = chain.into_iter().map(|(p, c)| (p, c.into())).collect();
        let mut table = Self::new();

        for (i, (pid, command)) in chain.iter().enumerate() {
            let parent = chain.get(i + 1).map(|(p, _)| *p).unwrap_or(root_pid);
            table.insert(*pid, parent, command.clone());
        }

        table
    }

    /// Number of queries answered (or refused) so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ProcessTable for MemoryProcessTable {
    async fn query(&self, pid: u32) -> Result<ProcessEntry> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.entries
            .get(&pid)
            .cloned()
            .ok_or_else(|| ProbeError::ProcessQueryFailed {
                pid,
                reason: "no such process".to_string(),
            })
    }
}
