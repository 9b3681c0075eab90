//! # host-terminal
//!
//! Identify which terminal emulator hosts the current process, so a
//! terminal-control layer can pick the right capability profile (color
//! depth, escape-sequence dialect).
//!
//! Detection happens in two stages:
//!
//! - **Environment guess**: `TERM`, `COLORTERM`, `VTE_VERSION` and Konsole
//!   variables are mapped to a canonical `app_id` such as `gnome-256color`.
//!   This is pure and synchronous.
//! - **Process ancestry**: when the guess is ambiguous (`TERM=xterm` is
//!   advertised by almost everything), the parent processes are walked
//!   until a known emulator is found. Skipped over SSH.
//!
//! ## Quick Start
//!
//! ```
//! use host_terminal::{EnvSnapshot, classify};
//!
//! let env = EnvSnapshot::from_pairs([("TERM", "rxvt-unicode-256color")]);
//! let guess = classify(&env);
//!
//! assert_eq!(guess.app_id.as_deref(), Some("rxvt-256color"));
//! assert!(guess.safe);
//! ```
//!
//! Full detection needs a tokio runtime:
//!
//! ```no_run
//! use host_terminal::terminal::Detector;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let descriptor = Detector::system().describe().await;
//!     println!("{} {:?}", descriptor.generic, descriptor.app_id);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`env`] - Immutable environment snapshots
//! - [`discovery`] - Low-level detection functions
//!   - [`discovery::families`] - Known terminal families
//!   - [`discovery::classify`] - Environment classification
//!   - [`discovery::process_table`] - Process-table queries
//!   - [`discovery::probe`] - Process-ancestry walk
//! - [`terminal`] - Combined detection and the terminal factory seam
//! - [`config`] - Process-wide resize-signal settings

pub mod config;
pub mod discovery;
pub mod env;
pub mod error;
pub mod terminal;

pub use config::DetectionConfig;
pub use discovery::classify::{TerminalGuess, classify};
pub use discovery::probe::{ProcessInfo, probe_parent_terminal, probe_parent_terminal_system};
pub use env::EnvSnapshot;
pub use error::{ProbeError, Result};
pub use terminal::{Detector, TerminalDescriptor, TerminalFactory, detect_terminal};
