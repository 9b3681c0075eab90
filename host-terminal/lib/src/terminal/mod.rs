//! Terminal detection entry points
//!
//! This module merges the environment guess and the process-ancestry probe
//! into a [`TerminalDescriptor`] and hands it to a [`TerminalFactory`].

pub mod descriptor;
pub mod detect;

pub use descriptor::{DetectionSource, StdStreams, TerminalDescriptor, TerminalFactory};
pub use detect::{Detector, detect_terminal};
