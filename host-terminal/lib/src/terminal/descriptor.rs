use std::io::{self, Stderr, Stdin, Stdout};

use serde::Serialize;

use crate::config::DetectionConfig;
use crate::discovery::classify::{TerminalGuess, UNKNOWN};
use crate::discovery::probe::ProcessInfo;
use crate::env::{EnvSnapshot, TERM};

/// Handles to the process's standard streams.
#[derive(Debug)]
pub struct StdStreams {
    pub stdin: Stdin,
    pub stdout: Stdout,
    pub stderr: Stderr,
}

impl Default for StdStreams {
    fn default() -> Self {
        StdStreams {
            stdin: io::stdin(),
            stdout: io::stdout(),
            stderr: io::stderr(),
        }
    }
}

/// Which path of the detection produced a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionSource {
    /// The environment guess was safe.
    Environment,
    /// Running over SSH; the unconfirmed environment guess was used.
    RemoteSession,
    /// The process ancestry identified the terminal.
    ProcessTree,
    /// Probing failed and the unconfirmed environment guess was used.
    Fallback,
}

/// Everything a terminal factory needs to build a terminal handle.
#[derive(Debug, Serialize)]
pub struct TerminalDescriptor {
    #[serde(skip)]
    pub streams: StdStreams,
    /// Lower-cased `TERM`, or `"unknown"`.
    pub generic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    pub process_sigwinch: bool,
    pub prefer_process_sigwinch: bool,
    pub source: DetectionSource,
}

impl TerminalDescriptor {
    /// Descriptor for an environment guess. The guess's `app_id` is only
    /// carried over when the guess is safe.
    pub fn from_guess(
        guess: &TerminalGuess,
        env: &EnvSnapshot,
        config: DetectionConfig,
        source: DetectionSource,
    ) -> Self {
        TerminalDescriptor {
            app_id: guess.app_id.clone().filter(|_| guess.safe),
            ..Self::base(env, config, source)
        }
    }

    /// Descriptor for a terminal found in the process ancestry.
    pub fn from_process(info: ProcessInfo, env: &EnvSnapshot, config: DetectionConfig) -> Self {
        TerminalDescriptor {
            app_id: Some(info.app_id),
            app_name: Some(info.app_name),
            pid: Some(info.pid),
            ..Self::base(env, config, DetectionSource::ProcessTree)
        }
    }

    fn base(env: &EnvSnapshot, config: DetectionConfig, source: DetectionSource) -> Self {
        TerminalDescriptor {
            streams: StdStreams::default(),
            generic: generic_label(env),
            app_id: None,
            app_name: None,
            pid: None,
            process_sigwinch: config.process_sigwinch,
            prefer_process_sigwinch: config.prefer_process_sigwinch,
            source,
        }
    }
}

/// The label shown when no profile matched: lower-cased `TERM` or `"unknown"`.
pub fn generic_label(env: &EnvSnapshot) -> String {
    env.get(TERM)
        .map(str::to_lowercase)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Builds terminal handles from detection results.
///
/// Implemented for any `Fn(TerminalDescriptor) -> H`.
pub trait TerminalFactory {
    type Handle;

    fn create_terminal(&self, descriptor: TerminalDescriptor) -> Self::Handle;
}

impl<F, H> TerminalFactory for F
where
    F: Fn(TerminalDescriptor) -> H,
{
    type Handle = H;

    fn create_terminal(&self, descriptor: TerminalDescriptor) -> H {
        self(descriptor)
    }
}
