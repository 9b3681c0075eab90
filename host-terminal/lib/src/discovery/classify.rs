//! Synchronous terminal guess from environment variables.
//!
//! [`classify`] never touches the OS: it reads `TERM`, `COLORTERM`,
//! `SSH_CONNECTION` and `VTE_VERSION` from an [`EnvSnapshot`] and maps them
//! through the family table. The result carries a `safe` flag telling the
//! caller whether the guess is good enough or should be confirmed by
//! walking the process tree.
//!
//! ## Examples
//!
//! ```
//! use host_terminal::discovery::classify::classify;
//! use host_terminal::env::EnvSnapshot;
//!
//! let env = EnvSnapshot::from_pairs([("TERM", "xterm"), ("VTE_VERSION", "5200")]);
//! let guess = classify(&env);
//!
//! assert_eq!(guess.app_id.as_deref(), Some("gnome"));
//! assert!(guess.safe);
//! ```

use serde::Serialize;

use crate::discovery::families::{
    ColorFlags, ColorVariant, family_for_env_name, is_true_color_marker,
};
use crate::env::{COLORTERM, EnvSnapshot, KONSOLE_MARKER, SSH_CONNECTION, TERM, VTE_VERSION};

/// Label used when nothing identifies the terminal.
pub const UNKNOWN: &str = "unknown";

/// First VTE release (0.38.3) whose emulators can be trusted to be
/// gnome-terminal compatible.
pub const VTE_MIN_GNOME_VERSION: u64 = 3803;

/// Relabeled id for an xterm-compatible terminal announcing 24-bit color.
pub const XTERM_TRUECOLOR: &str = "xterm-truecolor";

/// A best-effort guess of the hosting terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminalGuess {
    /// Canonical family and color-variant id, if anything was advertised.
    pub app_id: Option<String>,
    /// The guess needs no confirmation from the process tree.
    pub safe: bool,
    /// Coarse label for display when the guess is not safe.
    pub generic: String,
    /// The process runs inside an SSH session; probing must not run.
    pub ssh: bool,
}

/// Guesses the hosting terminal from `env`.
///
/// `TERM` values `xterm` and `xterm-256color` are advertised by most
/// emulators for compatibility, so they only produce a safe guess when
/// `VTE_VERSION` or a Konsole variable narrows them down.
pub fn classify(env: &EnvSnapshot) -> TerminalGuess {
    let flags = ColorFlags::from_env(env);
    let term = env.get(TERM);
    let candidate = match env.get(COLORTERM) {
        Some(colorterm) if !is_true_color_marker(colorterm) => Some(colorterm),
        _ => term,
    };
    let ssh = env.is_set(SSH_CONNECTION);
    let mut safe = term.is_some_and(|t| t != "xterm" && t != "xterm-256color");

    let (app_id, generic) = match candidate {
        None => (None, UNKNOWN.to_string()),
        Some(candidate) => match family_for_env_name(candidate) {
            Some(family) if family.ambiguous && !safe => {
                let refined = refine_ambiguous(candidate, env, flags);
                safe = refined.safe;
                (Some(refined.app_id), refined.generic)
            }
            Some(family) => (
                Some(family.env_variant.resolve(family.base, candidate, flags)),
                candidate.to_string(),
            ),
            None => {
                let lowered = candidate.to_lowercase();
                (Some(lowered.clone()), lowered)
            }
        },
    };

    let generic = match (&app_id, safe) {
        (Some(id), true) => id.clone(),
        _ => generic,
    };

    let guess = TerminalGuess {
        app_id,
        safe,
        generic,
        ssh,
    };

    tracing::debug!(
        app_id = ?guess.app_id,
        safe = guess.safe,
        generic = %guess.generic,
        ssh = guess.ssh,
        "Classified terminal from environment"
    );

    guess
}

struct Refined {
    app_id: String,
    generic: String,
    safe: bool,
}

/// Looks for emulator-specific variables behind an xterm `TERM`.
fn refine_ambiguous(candidate: &str, env: &EnvSnapshot, flags: ColorFlags) -> Refined {
    let label = if flags.true_color {
        XTERM_TRUECOLOR
    } else {
        candidate
    };
    let mut refined = Refined {
        app_id: label.to_string(),
        generic: label.to_string(),
        safe: false,
    };

    if vte_version(env).is_some_and(|v| v >= VTE_MIN_GNOME_VERSION) {
        refined.app_id = ColorVariant::ByColor.resolve("gnome", candidate, flags);
        refined.safe = true;
    } else if env.any_name_contains(KONSOLE_MARKER) {
        refined.app_id = ColorVariant::ByColor.resolve("konsole", candidate, flags);
        refined.safe = true;
    }

    refined
}

/// Parses the leading digits of `VTE_VERSION` (e.g. `"5200"` or `"6003 "`).
///
/// A digit run too long for `u64` saturates instead of being rejected.
fn vte_version(env: &EnvSnapshot) -> Option<u64> {
    let raw = env.get(VTE_VERSION)?.trim_start();
    let end = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let digits = &raw[..end];
    if digits.is_empty() {
        return None;
    }
    Some(digits.parse().unwrap_or(u64::MAX))
}
