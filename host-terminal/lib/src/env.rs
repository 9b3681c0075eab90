//! Immutable environment snapshots.
//!
//! Every detection step reads the environment through an [`EnvSnapshot`]
//! rather than `std::env`, so a classification can be replayed against a
//! fixed set of variables.

use std::collections::BTreeMap;
use std::env;

/// The terminal type advertised by the emulator.
pub const TERM: &str = "TERM";
/// Secondary terminal hint, often a true-color marker.
pub const COLORTERM: &str = "COLORTERM";
/// Present when the process runs inside an SSH session.
pub const SSH_CONNECTION: &str = "SSH_CONNECTION";
/// Version of the VTE library exported by VTE-based emulators.
pub const VTE_VERSION: &str = "VTE_VERSION";
/// Substring of variable names exported by KDE's Konsole.
pub const KONSOLE_MARKER: &str = "KONSOLE";

/// A read-only copy of a set of environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Captures the environment of the current process.
    ///
    /// Names or values that are not valid UTF-8 are converted lossily.
    pub fn from_process() -> Self {
        env::vars_os()
            .map(|(k, v)| {
                (
                    k.to_string_lossy().into_owned(),
                    v.to_string_lossy().into_owned(),
                )
            })
            .collect()
    }

    /// Builds a snapshot from explicit name/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect()
    }

    /// Returns the value of `name`, treating an empty value as unset.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Whether `name` is set to a non-empty value.
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over all variable names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    /// Whether any variable name contains `needle`.
    pub fn any_name_contains(&self, needle: &str) -> bool {
        self.names().any(|name| name.contains(needle))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for EnvSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        EnvSnapshot {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
