//! Combined detection: environment guess first, process ancestry second.
//!
//! ```no_run
//! use host_terminal::terminal::{TerminalDescriptor, detect_terminal};
//!
//! # async fn run() {
//! let descriptor = detect_terminal(&|d: TerminalDescriptor| d).await;
//! println!("{:?} ({})", descriptor.app_id, descriptor.generic);
//! # }
//! ```

use crate::config::{DetectionConfig, global_config};
use crate::discovery::classify::classify;
use crate::discovery::probe::probe_parent_terminal;
use crate::discovery::process_table::{ProcessTable, SystemProcessTable};
use crate::env::EnvSnapshot;
use crate::terminal::descriptor::{DetectionSource, TerminalDescriptor, TerminalFactory};

/// Runs terminal detection against an injected environment and process
/// table.
///
/// Detection never fails: when probing is impossible or unsuccessful the
/// descriptor degrades to the environment guess.
#[derive(Debug, Clone)]
pub struct Detector<P> {
    table: P,
    env: EnvSnapshot,
    config: DetectionConfig,
    pid: u32,
}

impl Detector<SystemProcessTable> {
    /// A detector for the current process: live environment, own pid,
    /// OS process table and the global configuration.
    pub fn system() -> Self {
        Detector::new(SystemProcessTable::new())
    }
}

impl<P: ProcessTable> Detector<P> {
    pub fn new(table: P) -> Self {
        Detector {
            table,
            env: EnvSnapshot::from_process(),
            config: global_config(),
            pid: std::process::id(),
        }
    }

    pub fn with_env(mut self, env: EnvSnapshot) -> Self {
        self.env = env;
        self
    }

    pub fn with_config(mut self, config: DetectionConfig) -> Self {
        self.config = config;
        self
    }

    /// Starts the ancestry walk from `pid` instead of the current process.
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }

    /// Works out the descriptor without building a terminal.
    pub async fn describe(&self) -> TerminalDescriptor {
        let guess = classify(&self.env);

        if guess.safe || guess.ssh {
            let source = if guess.safe {
                DetectionSource::Environment
            } else {
                DetectionSource::RemoteSession
            };
            return TerminalDescriptor::from_guess(&guess, &self.env, self.config, source);
        }

        match probe_parent_terminal(&self.env, &self.table, self.pid).await {
            Ok(info) => TerminalDescriptor::from_process(info, &self.env, self.config),
            Err(error) => {
                tracing::debug!(
                    %error,
                    generic = %guess.generic,
                    "Falling back to the environment guess"
                );
                TerminalDescriptor::from_guess(
                    &guess,
                    &self.env,
                    self.config,
                    DetectionSource::Fallback,
                )
            }
        }
    }

    /// Detects the terminal and hands the result to `factory`.
    pub async fn detect<F: TerminalFactory>(&self, factory: &F) -> F::Handle {
        let descriptor = self.describe().await;
        tracing::info!(
            app_id = ?descriptor.app_id,
            app_name = ?descriptor.app_name,
            generic = %descriptor.generic,
            source = ?descriptor.source,
            "Detected terminal"
        );
        factory.create_terminal(descriptor)
    }
}

/// Detects the terminal hosting the current process. Must run inside a
/// tokio runtime.
pub async fn detect_terminal<F: TerminalFactory>(factory: &F) -> F::Handle {
    Detector::system().detect(factory).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::process_table::MemoryProcessTable;
    use crate::env::{SSH_CONNECTION, TERM, VTE_VERSION};

    const SELF_PID: u32 = 900;

    fn xterm_in_gnome() -> MemoryProcessTable {
        MemoryProcessTable::from_chain(
            [(SELF_PID, "node"), (800, "bash"), (700, "gnome-terminal-server")],
            1,
        )
    }

    fn detector<'a>(
        table: &'a MemoryProcessTable,
        pairs: &[(&str, &str)],
    ) -> Detector<&'a MemoryProcessTable> {
        Detector::new(table)
            .with_env(EnvSnapshot::from_pairs(pairs.iter().copied()))
            .with_config(DetectionConfig::default())
            .with_pid(SELF_PID)
    }

    #[tokio::test]
    async fn safe_guess_skips_probing() {
        let table = xterm_in_gnome();
        let d = detector(&table, &[(TERM, "xterm"), (VTE_VERSION, "5200")])
            .describe()
            .await;

        assert_eq!(d.app_id.as_deref(), Some("gnome"));
        assert_eq!(d.generic, "xterm");
        assert_eq!(d.source, DetectionSource::Environment);
        assert_eq!(table.query_count(), 0);
    }

    #[tokio::test]
    async fn ambiguous_guess_is_confirmed_by_process_tree() {
        let table = xterm_in_gnome();
        let d = detector(&table, &[(TERM, "xterm-256color")]).describe().await;

        assert_eq!(d.app_id.as_deref(), Some("gnome-256color"));
        assert_eq!(d.app_name.as_deref(), Some("gnome-terminal"));
        assert_eq!(d.pid, Some(700));
        assert_eq!(d.generic, "xterm-256color");
        assert_eq!(d.source, DetectionSource::ProcessTree);
    }

    #[tokio::test]
    async fn ssh_never_probes() {
        let table = xterm_in_gnome();
        let d = detector(&table, &[(TERM, "xterm"), (SSH_CONNECTION, "1.2.3.4 5 6.7.8.9 22")])
            .describe()
            .await;

        assert_eq!(d.app_id, None);
        assert_eq!(d.generic, "xterm");
        assert_eq!(d.source, DetectionSource::RemoteSession);
        assert_eq!(table.query_count(), 0);
    }

    #[tokio::test]
    async fn probe_failure_falls_back_silently() {
        let table = MemoryProcessTable::from_chain([(SELF_PID, "node"), (800, "bash")], 1);
        let d = detector(&table, &[(TERM, "xterm-256color")]).describe().await;

        assert_eq!(d.app_id, None);
        assert_eq!(d.app_name, None);
        assert_eq!(d.generic, "xterm-256color");
        assert_eq!(d.source, DetectionSource::Fallback);
    }

    #[tokio::test]
    async fn empty_environment_still_yields_a_handle() {
        let table = MemoryProcessTable::new();
        let handle = detector(&table, &[])
            .detect(&|d: TerminalDescriptor| (d.generic, d.app_id))
            .await;
        assert_eq!(handle, ("unknown".to_string(), None));
    }

    #[tokio::test]
    async fn resize_flags_come_from_config() {
        let table = MemoryProcessTable::new();
        let config = DetectionConfig::default()
            .with_process_sigwinch(false)
            .with_prefer_process_sigwinch(true);
        let d = detector(&table, &[(TERM, "konsole")])
            .with_config(config)
            .describe()
            .await;

        assert!(!d.process_sigwinch);
        assert!(d.prefer_process_sigwinch);
    }
}
