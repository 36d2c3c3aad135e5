//! Theme switching and persistence functional tests
//!
//! Drives the theme controller against a real preference file in an
//! isolated directory.

mod common;

use common::{TestEnvironment, ms, run_frames, small_config};
use neon_config::{Config, MemoryPreferenceStore};
use neon_core::{
    OverlayState, StyleDocument, SwitchOutcome, ThemeController, ThemeEvent, ThemeState,
    restore_theme,
};
use neon_theme::{ThemeId, read_theme_variables};
use neonfolio::{Command, Showcase};

fn controller_on(env: &TestEnvironment) -> (ThemeController, StyleDocument) {
    let document = StyleDocument::new();
    let controller =
        ThemeController::new(Box::new(env.preference_store()), Box::new(document.clone()));
    (controller, document)
}

// === Restore ===

#[test]
fn test_every_valid_id_round_trips() {
    for id in ThemeId::ALL {
        let env = TestEnvironment::new();
        env.write_preference(id.as_str());
        let (controller, _) = controller_on(&env);
        assert_eq!(controller.current_theme(), id);
    }
}

#[test]
fn test_invalid_stored_values_fall_back() {
    for raw in ["", "ZEUS", "matrix", " rogue", "42"] {
        let env = TestEnvironment::new();
        env.write_preference(raw);
        let (controller, _) = controller_on(&env);
        assert_eq!(controller.current_theme(), ThemeId::Neutral, "stored {:?}", raw);
    }
}

#[test]
fn test_malformed_preference_file_falls_back() {
    let env = TestEnvironment::new();
    std::fs::write(env.preferences_path(), "portfolio-theme = [not toml").unwrap();
    assert_eq!(restore_theme(&env.preference_store(), ThemeId::Secure), ThemeId::Secure);
}

#[test]
fn test_missing_preference_uses_config_default() {
    let env = TestEnvironment::new();
    let mut config = small_config();
    config.general.theme = "secure".to_string();
    let showcase = Showcase::new(&config, Box::new(env.preference_store()), None);
    assert_eq!(showcase.controller().current_theme(), ThemeId::Secure);
    assert_eq!(env.stored_theme(), None);
}

// === Switching ===

#[test]
fn test_committed_switch_persists_and_survives_restart() {
    let env = TestEnvironment::new();
    {
        let (mut controller, document) = controller_on(&env);
        assert_eq!(controller.set_theme(ThemeId::Zeus, ms(0)), SwitchOutcome::Started);
        assert_eq!(document.overlay(), OverlayState::Active);

        controller.tick(ms(299));
        assert_eq!(env.stored_theme(), None);
        controller.tick(ms(300));
        assert_eq!(env.stored_theme().as_deref(), Some("zeus"));
        controller.tick(ms(1300));
        assert_eq!(controller.state(), ThemeState::Idle(ThemeId::Zeus));
        assert_eq!(document.overlay(), OverlayState::Hidden);
        assert!(!document.transition_class());
    }

    let (restarted, _) = controller_on(&env);
    assert_eq!(restarted.current_theme(), ThemeId::Zeus);
}

#[test]
fn test_same_theme_is_noop() {
    let store = MemoryPreferenceStore::new();
    let document = StyleDocument::new();
    let mut controller = ThemeController::new(Box::new(store.clone()), Box::new(document.clone()));

    assert_eq!(controller.set_theme(ThemeId::Neutral, ms(0)), SwitchOutcome::AlreadyActive);
    assert_eq!(controller.set_theme(ThemeId::Neutral, ms(5)), SwitchOutcome::AlreadyActive);
    controller.tick(ms(5000));

    assert_eq!(document.css_replacements(), 1);
    assert_eq!(store.write_count(), 0);
    assert!(!controller.is_transitioning());
}

#[test]
fn test_second_switch_during_transition_ignored() {
    let store = MemoryPreferenceStore::new();
    let document = StyleDocument::new();
    let mut controller = ThemeController::new(Box::new(store.clone()), Box::new(document.clone()));
    let events = controller.subscribe();

    assert_eq!(controller.set_theme(ThemeId::Rogue, ms(0)), SwitchOutcome::Started);
    assert_eq!(controller.set_theme(ThemeId::Secure, ms(100)), SwitchOutcome::Busy);
    assert_eq!(controller.set_theme(ThemeId::Secure, ms(700)), SwitchOutcome::Busy);
    controller.tick(ms(2000));

    assert_eq!(controller.current_theme(), ThemeId::Rogue);
    assert_eq!(store.value().as_deref(), Some("rogue"));
    assert_eq!(store.write_count(), 1);
    assert_eq!(
        events.drain(),
        vec![
            ThemeEvent::TransitionStarted {
                from: ThemeId::Neutral,
                to: ThemeId::Rogue
            },
            ThemeEvent::ThemeCommitted(ThemeId::Rogue),
            ThemeEvent::TransitionFinished(ThemeId::Rogue),
        ]
    );
}

#[test]
fn test_unknown_name_changes_nothing() {
    let env = TestEnvironment::new();
    let (mut controller, document) = controller_on(&env);
    assert!(controller.set_theme_by_name("synthwave", ms(0)).is_err());
    controller.tick(ms(2000));
    assert_eq!(controller.current_theme(), ThemeId::Neutral);
    assert_eq!(document.css_replacements(), 1);
    assert_eq!(env.stored_theme(), None);
}

#[test]
fn test_unmount_cancels_pending_commit() {
    let env = TestEnvironment::new();
    let (mut controller, document) = controller_on(&env);
    controller.set_theme(ThemeId::Rogue, ms(0));
    controller.unmount();
    controller.tick(ms(5000));

    assert_eq!(controller.current_theme(), ThemeId::Neutral);
    assert_eq!(env.stored_theme(), None);
    assert_eq!(document.css_replacements(), 1);
    assert_eq!(controller.set_theme(ThemeId::Zeus, ms(6000)), SwitchOutcome::Unmounted);
}

// === Emitted stylesheet ===

#[test]
fn test_installed_css_tracks_committed_theme() {
    let env = TestEnvironment::new();
    let (mut controller, document) = controller_on(&env);
    controller.set_theme(ThemeId::Secure, ms(0));
    controller.tick(ms(300));

    let variables = read_theme_variables(&document.css()).unwrap();
    let colors = variables.colors().unwrap();
    assert_eq!(colors, ThemeId::Secure.theme().colors);
    assert_eq!(document.css_replacements(), 2);
    assert_eq!(
        document.announcements().last().map(String::as_str),
        Some(ThemeId::Secure.theme().announcement().as_str())
    );
}

// === Showcase ===

#[test]
fn test_showcase_keys_switch_and_persist() {
    let env = TestEnvironment::new();
    let mut showcase = env.showcase();
    showcase.start(ms(0));

    let command = Command::from_key("2").unwrap();
    assert!(showcase.execute(command, ms(0)));
    run_frames(&mut showcase, 0, 1400, 16);

    assert_eq!(showcase.controller().current_theme(), ThemeId::Rogue);
    assert_eq!(showcase.composer().theme().id, ThemeId::Rogue);
    assert_eq!(env.stored_theme().as_deref(), Some("rogue"));

    let restarted = env.showcase();
    assert_eq!(restarted.controller().current_theme(), ThemeId::Rogue);
}

#[test]
fn test_default_config_created_alongside_preferences() {
    let env = TestEnvironment::new();
    let config = env.load_config();
    assert_eq!(config.general.theme, "neutral");
    assert!(env.config_dir.join("config.toml").exists());
    assert_eq!(env.preferences_path(), Config::preferences_path_in(&env.config_dir));

    env.write_config("[general]\ntheme = \"rogue\"\nseed = 9\n");
    let config = env.load_config();
    assert_eq!(config.general.theme, "rogue");
    assert_eq!(config.general.seed, Some(9));
    assert_eq!(config.scene.matrix_columns, 30);
}
