/// Errors returned by the process-ancestry prober.
///
/// None of these ever escape [`crate::terminal::detect`]; the detector
/// falls back to the environment guess instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// The process runs inside a remote session, where the local process
    /// tree says nothing about the user's terminal.
    #[error("SSH connection detected, process ancestry cannot identify the terminal")]
    RemoteSessionUnsupported,

    /// A process-table query failed, usually because the process exited
    /// while the walk was in progress.
    #[error("process query failed for pid {pid}: {reason}")]
    ProcessQueryFailed { pid: u32, reason: String },

    /// The walk reached the root of the process tree without recognizing
    /// a terminal-hosting process.
    #[error("terminal not found (walk stopped at pid {last_pid})")]
    TerminalNotFound { last_pid: u32 },
}

/// Convenience Result type for probing operations.
pub type Result<T> = std::result::Result<T, ProbeError>;
