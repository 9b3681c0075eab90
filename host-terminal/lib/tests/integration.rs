//! Integration tests for host-terminal library.
//!
//! These tests verify the public API works correctly and that the
//! classifier, the prober and the detector integrate properly together.

use host_terminal::discovery::families::FAMILIES;
use host_terminal::discovery::process_table::MemoryProcessTable;
use host_terminal::terminal::DetectionSource;
use host_terminal::{
    DetectionConfig, Detector, EnvSnapshot, ProbeError, TerminalDescriptor, classify,
    detect_terminal, probe_parent_terminal, probe_parent_terminal_system,
};
use proptest::prelude::*;

// ============================================================================
// Classification
// ============================================================================

#[test]
fn test_classify_is_idempotent_for_known_terminals() {
    let env = EnvSnapshot::from_pairs([
        ("TERM", "xterm-256color"),
        ("COLORTERM", "truecolor"),
        ("KONSOLE_PROFILE_NAME", "Shell"),
    ]);

    let first = classify(&env);
    let second = classify(&env);
    assert_eq!(first, second);
    assert_eq!(first.app_id.as_deref(), Some("konsole-256color"));
}

#[test]
fn test_every_family_env_name_classifies_safely() {
    for family in FAMILIES.iter().filter(|f| !f.ambiguous) {
        for name in family.env_names {
            let guess = classify(&EnvSnapshot::from_pairs([("TERM", *name)]));
            assert!(guess.safe, "TERM={name} should be safe");
            let app_id = guess.app_id.expect("app_id for a known family");
            assert!(
                app_id.starts_with(family.base) || app_id == *name,
                "TERM={name} resolved to {app_id}"
            );
        }
    }
}

fn env_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    let names = prop::sample::select(vec![
        "TERM",
        "COLORTERM",
        "SSH_CONNECTION",
        "VTE_VERSION",
        "KONSOLE_VERSION",
        "LANG",
    ]);
    let values = prop::sample::select(vec![
        "",
        "xterm",
        "xterm-256color",
        "truecolor",
        "24bit",
        "rxvt",
        "gnome-terminal",
        "Eterm",
        "5200",
        "3802",
        "Alacritty",
    ]);
    prop::collection::vec(
        (names.prop_map(String::from), values.prop_map(String::from)),
        0..6,
    )
}

proptest! {
    #[test]
    fn prop_classify_is_deterministic(pairs in env_strategy()) {
        let env = EnvSnapshot::from_pairs(pairs);
        prop_assert_eq!(classify(&env), classify(&env.clone()));
    }

    #[test]
    fn prop_generic_is_never_empty(pairs in env_strategy()) {
        let guess = classify(&EnvSnapshot::from_pairs(pairs));
        prop_assert!(!guess.generic.is_empty());
        if let Some(app_id) = guess.app_id {
            prop_assert!(!app_id.is_empty());
        }
    }

    #[test]
    fn prop_ssh_follows_ssh_connection(pairs in env_strategy()) {
        let env = EnvSnapshot::from_pairs(pairs);
        prop_assert_eq!(classify(&env).ssh, env.is_set("SSH_CONNECTION"));
    }
}

// ============================================================================
// Probing
// ============================================================================

#[tokio::test]
async fn test_probe_finds_terminal_through_unknown_ancestors() {
    let table = MemoryProcessTable::from_chain(
        [
            (42, "host-terminal"),
            (30, "unknown-shell"),
            (20, "bash"),
            (10, "gnome-terminal"),
        ],
        1,
    );
    let env = EnvSnapshot::from_pairs([("TERM", "xterm")]);

    let info = probe_parent_terminal(&env, &table, 42).await.expect("found");
    assert_eq!(info.app_id, "gnome");
    assert_eq!(info.app_name, "gnome-terminal");
    assert_eq!(info.pid, 10);
    assert!(info.safe);
}

#[tokio::test]
async fn test_probe_without_terminal_is_not_found() {
    let table = MemoryProcessTable::from_chain([(42, "cargo"), (20, "bash")], 1)
        .with_process(1, 0, "init");
    let env = EnvSnapshot::from_pairs([("TERM", "xterm")]);

    let err = probe_parent_terminal(&env, &table, 42).await.unwrap_err();
    assert!(matches!(err, ProbeError::TerminalNotFound { .. }));
}

// ============================================================================
// Detection
// ============================================================================

#[tokio::test]
async fn test_detector_uses_factory() {
    let table = MemoryProcessTable::from_chain([(42, "bash"), (10, "urxvt")], 1);
    let detector = Detector::new(&table)
        .with_env(EnvSnapshot::from_pairs([("TERM", "xterm")]))
        .with_config(DetectionConfig::default())
        .with_pid(42);

    let handle = detector
        .detect(&|d: TerminalDescriptor| format!("{}:{:?}", d.generic, d.app_id))
        .await;
    assert_eq!(handle, "xterm:Some(\"rxvt\")");
}

#[tokio::test]
async fn test_ssh_detection_is_total_and_does_not_probe() {
    let table = MemoryProcessTable::from_chain([(42, "bash"), (10, "konsole")], 1);
    let descriptor = Detector::new(&table)
        .with_env(EnvSnapshot::from_pairs([
            ("TERM", "xterm-256color"),
            ("SSH_CONNECTION", "192.168.1.20 50000 192.168.1.10 22"),
        ]))
        .with_pid(42)
        .describe()
        .await;

    assert_eq!(descriptor.source, DetectionSource::RemoteSession);
    assert_eq!(descriptor.app_id, None);
    assert_eq!(table.query_count(), 0);
}

#[tokio::test]
#[serial_test::serial]
async fn test_live_detection_always_returns_a_descriptor() {
    // Whatever hosts the test runner, detection must not fail
    let descriptor = detect_terminal(&|d: TerminalDescriptor| d).await;
    assert!(!descriptor.generic.is_empty());
    if descriptor.source == DetectionSource::ProcessTree {
        assert!(descriptor.pid.is_some());
        assert!(descriptor.app_name.is_some());
    }
}

#[tokio::test]
#[serial_test::serial]
async fn test_live_probe_finds_terminal_or_reports_why() {
    match probe_parent_terminal_system().await {
        Ok(info) => {
            assert!(info.safe);
            assert!(!info.app_id.is_empty());
            assert!(info.pid > 1);
        }
        Err(err) => assert!(matches!(
            err,
            ProbeError::RemoteSessionUnsupported
                | ProbeError::ProcessQueryFailed { .. }
                | ProbeError::TerminalNotFound { .. }
        )),
    }
}
