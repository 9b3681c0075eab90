//! The table of known terminal families.
//!
//! Each [`TerminalFamily`] lists the `TERM`/`COLORTERM` values and the
//! process names that identify it, together with the policy used to turn a
//! match into a capability-profile id (`app_id`). Both the environment
//! classifier and the process-ancestry prober iterate this table; neither
//! hard-codes terminal names.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::env::{COLORTERM, EnvSnapshot, TERM};

/// Suffix appended to a family base when extended colors are available.
pub const COLOR_256_SUFFIX: &str = "-256color";

/// `COLORTERM` values announcing 24-bit color support.
static TRUE_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(truecolor|24bits?)$").expect("Invalid true-color regex"));

/// Whether `value` is one of the `COLORTERM` true-color markers.
pub fn is_true_color_marker(value: &str) -> bool {
    TRUE_COLOR_RE.is_match(value)
}

/// Color capabilities advertised by the environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ColorFlags {
    /// `TERM` or `COLORTERM` mentions `256`.
    pub has_256: bool,
    /// `COLORTERM` is a true-color marker.
    pub true_color: bool,
    /// `TERM` is exactly `rxvt`; the rxvt family then always resolves to
    /// its 256-color profile.
    pub plain_rxvt: bool,
}

impl ColorFlags {
    pub fn from_env(env: &EnvSnapshot) -> Self {
        let term = env.get(TERM);
        let colorterm = env.get(COLORTERM);

        ColorFlags {
            has_256: term.is_some_and(|t| t.contains("256"))
                || colorterm.is_some_and(|c| c.contains("256")),
            true_color: colorterm.is_some_and(is_true_color_marker),
            plain_rxvt: term == Some("rxvt"),
        }
    }

    /// Whether the environment supports more than the basic 16 colors.
    pub fn extended(&self) -> bool {
        self.has_256 || self.true_color
    }
}

/// How a matched name becomes an `app_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColorVariant {
    /// Keep the matched name unchanged.
    Verbatim,
    /// Always the family base, whatever the color flags say.
    Fixed,
    /// The family base, with `-256color` when colors are extended.
    ByColor,
    /// Like [`ColorVariant::ByColor`], but `TERM=rxvt` forces `-256color`.
    Rxvt,
    /// Always the `-256color` variant of the family base.
    Always256,
}

impl ColorVariant {
    pub fn resolve(self, base: &str, matched: &str, flags: ColorFlags) -> String {
        let suffixed = || format!("{base}{COLOR_256_SUFFIX}");

        match self {
            ColorVariant::Verbatim => matched.to_string(),
            ColorVariant::Fixed => base.to_string(),
            ColorVariant::ByColor if flags.extended() => suffixed(),
            ColorVariant::ByColor => base.to_string(),
            ColorVariant::Rxvt if flags.plain_rxvt || flags.extended() => suffixed(),
            ColorVariant::Rxvt => base.to_string(),
            ColorVariant::Always256 => suffixed(),
        }
    }
}

/// A process name that identifies a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessAlias {
    pub name: &'static str,
    /// Replaces the reported process name, e.g. `login` is reported as `linux`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<&'static str>,
    pub variant: ColorVariant,
}

/// A terminal family and every name it is known by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TerminalFamily {
    /// Canonical id before color suffixing.
    pub base: &'static str,
    /// The family's `TERM` values are emitted by many unrelated emulators,
    /// so a match needs further evidence.
    pub ambiguous: bool,
    pub env_variant: ColorVariant,
    pub env_names: &'static [&'static str],
    pub process_names: &'static [ProcessAlias],
    /// Fallback match on any process name containing this string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_contains: Option<&'static str>,
}

const fn alias(name: &'static str, variant: ColorVariant) -> ProcessAlias {
    ProcessAlias {
        name,
        app_name: None,
        variant,
    }
}

const fn renamed(name: &'static str, app_name: &'static str, variant: ColorVariant) -> ProcessAlias {
    ProcessAlias {
        name,
        app_name: Some(app_name),
        variant,
    }
}

/// Families whose single profile covers every color depth.
const fn single_profile(
    base: &'static str,
    env_names: &'static [&'static str],
    process_names: &'static [ProcessAlias],
) -> TerminalFamily {
    TerminalFamily {
        base,
        ambiguous: false,
        env_variant: ColorVariant::Verbatim,
        env_names,
        process_names,
        process_contains: None,
    }
}

use ColorVariant::{Always256, ByColor, Fixed, Rxvt, Verbatim};

/// Every family the classifier and the prober recognize.
pub static FAMILIES: &[TerminalFamily] = &[
    TerminalFamily {
        base: "xterm",
        ambiguous: true,
        env_variant: Verbatim,
        env_names: &["xterm", "xterm-256color"],
        process_names: &[alias("xterm", ByColor)],
        process_contains: None,
    },
    single_profile(
        "linux",
        &["linux"],
        &[alias("linux", Verbatim), renamed("login", "linux", Fixed)],
    ),
    single_profile("aterm", &["aterm"], &[alias("aterm", Verbatim)]),
    single_profile("kuake", &["kuake"], &[alias("kuake", Verbatim)]),
    single_profile("tilda", &["tilda"], &[alias("tilda", Verbatim)]),
    single_profile(
        "terminology",
        &["terminology"],
        &[alias("terminology", Verbatim)],
    ),
    single_profile("wterm", &["wterm"], &[alias("wterm", Verbatim)]),
    single_profile("mrxvt", &["mrxvt"], &[alias("mrxvt", Verbatim)]),
    single_profile(
        "atomic-terminal",
        &["atomic-terminal"],
        &[alias("atomic-terminal", Verbatim)],
    ),
    TerminalFamily {
        base: "gnome",
        ambiguous: false,
        env_variant: ByColor,
        env_names: &[
            "gnome",
            "gnome-256color",
            "gnome-terminal",
            "gnome-terminal-256color",
            // both render through the gnome-terminal library
            "terminator",
            "guake",
        ],
        process_names: &[
            alias("gnome-terminal", ByColor),
            alias("terminator", ByColor),
            alias("guake", ByColor),
        ],
        process_contains: Some("gnome-terminal"),
    },
    TerminalFamily {
        base: "konsole",
        ambiguous: false,
        env_variant: ByColor,
        env_names: &["konsole"],
        process_names: &[alias("konsole", ByColor)],
        process_contains: None,
    },
    TerminalFamily {
        base: "rxvt",
        ambiguous: false,
        env_variant: Rxvt,
        env_names: &[
            "rxvt",
            "rxvt-xpm",
            "rxvt-unicode",
            "rxvt-unicode-256color",
            "urxvt",
            "urxvt-ml",
            "urxvt256c",
            "urxvt256c-ml",
        ],
        process_names: &[
            alias("rxvt", Always256),
            alias("urxvt256c", Always256),
            alias("urxvt256c-ml", Always256),
            alias("urxvt", Fixed),
            alias("urxvt-ml", Fixed),
        ],
        process_contains: None,
    },
    TerminalFamily {
        base: "xfce",
        ambiguous: false,
        env_variant: Fixed,
        env_names: &["xfce", "xfce-terminal", "xfce4-terminal"],
        process_names: &[alias("xfce4-terminal", Fixed)],
        process_contains: None,
    },
    TerminalFamily {
        base: "eterm",
        ambiguous: false,
        env_variant: ByColor,
        env_names: &["eterm", "Eterm"],
        process_names: &[
            renamed("Eterm", "Eterm", ByColor),
            renamed("eterm", "Eterm", ByColor),
        ],
        process_contains: None,
    },
];

/// Looks up the family whose environment names include `name` (case-sensitive).
pub fn family_for_env_name(name: &str) -> Option<&'static TerminalFamily> {
    FAMILIES
        .iter()
        .find(|f| f.env_names.iter().any(|n| *n == name))
}

/// A process name recognized as a terminal host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessMatch {
    pub family: &'static TerminalFamily,
    pub app_id: String,
    pub app_name: String,
}

/// Recognizes a terminal-hosting process by its command name.
///
/// Exact aliases win over substring matches, so `gnome-terminal-server`
/// only matches through the gnome family's `process_contains` fallback.
pub fn match_process(command: &str, flags: ColorFlags) -> Option<ProcessMatch> {
    let exact = FAMILIES.iter().find_map(|family| {
        family
            .process_names
            .iter()
            .find(|a| a.name == command)
            .map(|a| ProcessMatch {
                family,
                app_id: a.variant.resolve(family.base, command, flags),
                app_name: a.app_name.unwrap_or(command).to_string(),
            })
    });

    exact.or_else(|| {
        FAMILIES.iter().find_map(|family| {
            let needle = family.process_contains?;
            command.contains(needle).then(|| ProcessMatch {
                family,
                app_id: ByColor.resolve(family.base, command, flags),
                app_name: needle.to_string(),
            })
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: ColorFlags = ColorFlags {
        has_256: false,
        true_color: false,
        plain_rxvt: false,
    };
    const EXTENDED: ColorFlags = ColorFlags {
        has_256: true,
        true_color: false,
        plain_rxvt: false,
    };

    #[test]
    fn true_color_markers() {
        assert!(is_true_color_marker("truecolor"));
        assert!(is_true_color_marker("24bit"));
        assert!(is_true_color_marker("24bits"));
        assert!(!is_true_color_marker("TrueColor"));
        assert!(!is_true_color_marker("24bitsx"));
        assert!(!is_true_color_marker("gnome-terminal"));
    }

    #[test]
    fn color_flags_from_env() {
        let env = EnvSnapshot::from_pairs([(TERM, "xterm-256color"), (COLORTERM, "24bit")]);
        let flags = ColorFlags::from_env(&env);
        assert!(flags.has_256);
        assert!(flags.true_color);
        assert!(!flags.plain_rxvt);

        let env = EnvSnapshot::from_pairs([(TERM, "rxvt")]);
        let flags = ColorFlags::from_env(&env);
        assert!(flags.plain_rxvt);
        assert!(!flags.extended());
    }

    #[test]
    fn every_env_name_belongs_to_one_family() {
        for family in FAMILIES {
            for name in family.env_names {
                assert_eq!(
                    family_for_env_name(name).map(|f| f.base),
                    Some(family.base),
                    "{name} is claimed by more than one family"
                );
            }
        }
    }

    #[test]
    fn only_xterm_is_ambiguous() {
        let ambiguous: Vec<_> = FAMILIES.iter().filter(|f| f.ambiguous).map(|f| f.base).collect();
        assert_eq!(ambiguous, vec!["xterm"]);
    }

    #[test]
    fn variant_resolution() {
        assert_eq!(ByColor.resolve("gnome", "guake", BASIC), "gnome");
        assert_eq!(ByColor.resolve("gnome", "guake", EXTENDED), "gnome-256color");
        assert_eq!(Verbatim.resolve("linux", "linux", EXTENDED), "linux");
        assert_eq!(Fixed.resolve("xfce", "xfce4-terminal", EXTENDED), "xfce");
        assert_eq!(Always256.resolve("rxvt", "urxvt256c", BASIC), "rxvt-256color");

        let plain_rxvt = ColorFlags {
            plain_rxvt: true,
            ..BASIC
        };
        assert_eq!(Rxvt.resolve("rxvt", "rxvt", plain_rxvt), "rxvt-256color");
        assert_eq!(Rxvt.resolve("rxvt", "urxvt", BASIC), "rxvt");
    }

    #[test]
    fn login_is_reported_as_linux() {
        let m = match_process("login", EXTENDED).expect("login should match");
        assert_eq!(m.app_name, "linux");
        assert_eq!(m.app_id, "linux");
    }

    #[test]
    fn eterm_process_name_is_normalized() {
        let m = match_process("eterm", EXTENDED).expect("eterm should match");
        assert_eq!(m.app_name, "Eterm");
        assert_eq!(m.app_id, "eterm-256color");
    }

    #[test]
    fn urxvt_ignores_color_flags() {
        assert_eq!(match_process("urxvt", EXTENDED).map(|m| m.app_id), Some("rxvt".into()));
        assert_eq!(
            match_process("urxvt256c-ml", BASIC).map(|m| m.app_id),
            Some("rxvt-256color".into())
        );
    }

    #[test]
    fn gnome_terminal_server_matches_by_substring() {
        let m = match_process("gnome-terminal-server", BASIC).expect("substring match");
        assert_eq!(m.family.base, "gnome");
        assert_eq!(m.app_name, "gnome-terminal");
        assert_eq!(m.app_id, "gnome");
    }

    #[test]
    fn shells_are_not_terminals() {
        for shell in ["bash", "zsh", "fish", "sshd", "tmux: server", "systemd"] {
            assert!(match_process(shell, BASIC).is_none(), "{shell} matched");
        }
    }
}
