//! Asynchronous process-ancestry walk.
//!
//! When the environment guess is ambiguous, the terminal can still be found
//! by climbing from the current process through its parents until one of
//! them is a known terminal emulator (`gnome-terminal`, `konsole`, `urxvt`,
//! ...). Intermediate shells and multiplexers are skipped.
//!
//! The walk is a strict chain: each step needs the parent pid returned by
//! the previous one. Every visited ancestor costs two process-table
//! queries, one for the parent pid and one for the parent's command name.

use std::collections::HashSet;

use serde::Serialize;

use crate::discovery::families::{ColorFlags, match_process};
use crate::discovery::process_table::{ProcessTable, SystemProcessTable};
use crate::env::{EnvSnapshot, SSH_CONNECTION};
use crate::error::{ProbeError, Result};

/// A terminal-hosting process found by the ancestry walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessInfo {
    pub app_id: String,
    pub app_name: String,
    pub pid: u32,
    /// Always `true`: a real process name was matched.
    pub safe: bool,
}

/// Outcome of visiting one ancestor.
#[derive(Debug)]
enum Step {
    Found(ProcessInfo),
    Continue(u32),
    Failed(ProbeError),
}

/// Whether `pid` is the root of the process tree (the kernel or init).
fn is_root(pid: u32) -> bool {
    pid <= 1
}

/// Walks the ancestry of `start_pid` looking for a terminal emulator.
///
/// ## Errors
///
/// - [`ProbeError::RemoteSessionUnsupported`] when `SSH_CONNECTION` is set;
///   no query is issued in that case.
/// - [`ProbeError::ProcessQueryFailed`] when `table` cannot answer.
/// - [`ProbeError::TerminalNotFound`] when the walk reaches pid 0 or 1, or
///   revisits a pid, without a match.
pub async fn probe_parent_terminal<P: ProcessTable>(
    env: &EnvSnapshot,
    table: &P,
    start_pid: u32,
) -> Result<ProcessInfo> {
    if env.is_set(SSH_CONNECTION) {
        tracing::debug!("Skipping process ancestry probe over SSH");
        return Err(ProbeError::RemoteSessionUnsupported);
    }

    let flags = ColorFlags::from_env(env);
    let mut visited = HashSet::from([start_pid]);
    let mut pid = start_pid;

    loop {
        match visit_parent(table, pid, flags).await {
            Step::Found(info) => {
                tracing::debug!(
                    app_id = %info.app_id,
                    app_name = %info.app_name,
                    pid = info.pid,
                    "Found terminal in process ancestry"
                );
                return Ok(info);
            }
            Step::Continue(parent) if !visited.insert(parent) => {
                tracing::warn!(pid = parent, "Process ancestry loops back on itself");
                return Err(ProbeError::TerminalNotFound { last_pid: parent });
            }
            Step::Continue(parent) => pid = parent,
            Step::Failed(error) => {
                tracing::debug!(%error, start_pid, "Process ancestry probe failed");
                return Err(error);
            }
        }
    }
}

/// Probes the ancestry of the current process using the live environment
/// and the OS process table. Must run inside a tokio runtime.
pub async fn probe_parent_terminal_system() -> Result<ProcessInfo> {
    let env = EnvSnapshot::from_process();
    probe_parent_terminal(&env, &SystemProcessTable::new(), std::process::id()).await
}

async fn visit_parent<P: ProcessTable>(table: &P, pid: u32, flags: ColorFlags) -> Step {
    let parent_pid = match table.query(pid).await {
        Ok(entry) => entry.parent_pid,
        Err(e) => return Step::Failed(e),
    };

    // pid 0 is "no parent"; there is nothing left to ask about
    if parent_pid == 0 {
        return Step::Failed(ProbeError::TerminalNotFound { last_pid: pid });
    }

    let command = match table.query(parent_pid).await {
        Ok(entry) => entry.command,
        Err(e) => return Step::Failed(e),
    };

    tracing::trace!(pid = parent_pid, command = %command, "Visiting ancestor");

    if let Some(found) = match_process(&command, flags) {
        return Step::Found(ProcessInfo {
            app_id: found.app_id,
            app_name: found.app_name,
            pid: parent_pid,
            safe: true,
        });
    }

    if is_root(parent_pid) {
        Step::Failed(ProbeError::TerminalNotFound {
            last_pid: parent_pid,
        })
    } else {
        Step::Continue(parent_pid)
    }
}
