//! Process-wide detection settings.
//!
//! The resize-signal flags handed to the terminal factory do not depend on
//! what was detected; they come from a single [`DetectionConfig`] shared by
//! the whole process.

use std::sync::{LazyLock, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::env::EnvSnapshot;

/// Set to `1`, `true` or `yes` to prefer `SIGWINCH` over other resize
/// notifications.
pub const PREFER_SIGWINCH_VAR: &str = "HOST_TERMINAL_PREFER_SIGWINCH";

/// Window-resize handling passed on to the terminal factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Listen for `SIGWINCH` to learn about window resizes.
    pub process_sigwinch: bool,
    /// When both are available, use `SIGWINCH` rather than the terminal's
    /// in-band resize reports.
    pub prefer_process_sigwinch: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        DetectionConfig {
            process_sigwinch: true,
            prefer_process_sigwinch: false,
        }
    }
}

impl DetectionConfig {
    /// Defaults, with `prefer_process_sigwinch` taken from
    /// [`PREFER_SIGWINCH_VAR`] when set.
    pub fn from_env(env: &EnvSnapshot) -> Self {
        let prefer = env
            .get(PREFER_SIGWINCH_VAR)
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        DetectionConfig {
            prefer_process_sigwinch: prefer,
            ..Self::default()
        }
    }

    pub fn with_process_sigwinch(mut self, enabled: bool) -> Self {
        self.process_sigwinch = enabled;
        self
    }

    pub fn with_prefer_process_sigwinch(mut self, prefer: bool) -> Self {
        self.prefer_process_sigwinch = prefer;
        self
    }
}

static GLOBAL_CONFIG: LazyLock<RwLock<DetectionConfig>> =
    LazyLock::new(|| RwLock::new(DetectionConfig::from_env(&EnvSnapshot::from_process())));

/// The process-wide configuration, initialized from the environment on
/// first use.
pub fn global_config() -> DetectionConfig {
    *GLOBAL_CONFIG.read().unwrap_or_else(PoisonError::into_inner)
}

/// Replaces the process-wide configuration.
pub fn set_global_config(config: DetectionConfig) {
    *GLOBAL_CONFIG.write().unwrap_or_else(PoisonError::into_inner) = config;
}
