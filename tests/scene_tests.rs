//! Animated scene functional tests
//!
//! Checks the simulators' observable properties across many seeds and
//! drives the full showcase headlessly through its frame clock.

mod common;

use common::{TestEnvironment, ms, run_frames, small_config};
use neon_core::FrameClock;
use neon_effects::effects::{
    FloatingGeometry, GeometryParams, MatrixRain, ParticleBuffers, ParticleParams, RainParams,
};
use neon_effects::{GlitchText, GlitchTuning, SceneComposer, SceneSettings, make_rng};
use neon_theme::{GlitchLevel, ThemeId, all_themes};
use neonfolio::Command;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Seeds for property checks, themselves drawn from a fixed seed
fn seeds(count: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(0x6e656f6e);
    (0..count).map(|_| rng.gen_range(0..u64::MAX)).collect()
}

// === Particles ===

#[test]
fn test_particles_within_radius_for_every_theme() {
    for theme in all_themes() {
        for seed in seeds(4) {
            let params = ParticleParams::from_theme(theme).with_count(2_000);
            let buffers = ParticleBuffers::initialize(&params, &mut make_rng(Some(seed)));

            assert_eq!(buffers.positions.len(), 6_000);
            assert_eq!(buffers.colors.len(), 6_000);
            assert_eq!(buffers.sizes.len(), 2_000);

            let bound = params.max_radius() * 1.0001;
            for i in 0..buffers.len() {
                let distance = buffers.position(i).length();
                assert!(distance <= bound, "{} seed {}: {} > {}", theme.id, seed, distance, bound);
            }
        }
    }
}

#[test]
fn test_zero_particles() {
    let params = ParticleParams::from_theme(ThemeId::Neutral.theme()).with_count(0);
    let buffers = ParticleBuffers::initialize(&params, &mut make_rng(Some(1)));
    assert!(buffers.is_empty());
    assert!(buffers.positions.is_empty());
}

// === Matrix rain ===

#[test]
fn test_every_column_resets_into_negative_range() {
    let params = RainParams {
        columns: 8,
        rows: 20,
        speed: 0.2,
        spacing: 1.5,
    };
    for seed in seeds(3) {
        let mut rain = MatrixRain::new(params, Some(seed));
        let mut resets = vec![0usize; params.columns];

        for _ in 0..1_200 {
            let before = rain.drops().to_vec();
            rain.advance(1.0 / 60.0);
            for (col, (&prev, &now)) in before.iter().zip(rain.drops()).enumerate() {
                if now < prev {
                    resets[col] += 1;
                    assert!(prev + 1.0 > params.rows as f32);
                    assert!((-10.0..0.0).contains(&now), "column {} reset to {}", col, now);
                }
            }
        }
        assert!(resets.iter().all(|&n| n > 0), "seed {}: {:?}", seed, resets);
    }
}

// === Floating geometry ===

#[test]
fn test_geometry_position_independent_of_history() {
    for seed in seeds(3) {
        let mut stepped = FloatingGeometry::new(GeometryParams::default(), Some(seed));
        let fresh = FloatingGeometry::new(GeometryParams::default(), Some(seed));

        for frame in 0..600 {
            stepped.step(frame as f32 / 60.0);
        }
        for t in [0.0, 1.5, 10.0, 123.25] {
            for (a, b) in stepped.items().iter().zip(fresh.items()) {
                assert_eq!(a.position_at(t), b.position_at(t));
            }
        }
    }
}

#[test]
fn test_themed_origins_scale_with_intensity() {
    for theme in all_themes() {
        let holograms = FloatingGeometry::themed(theme, 40, Some(8));
        let half = 60.0 / 2.0 * theme.effects.intensity;
        for item in holograms.items() {
            assert!(item.origin.x.abs() <= half);
            assert!(item.origin.y.abs() <= half * 2.0 / 3.0 + 1e-4);
            assert!(item.origin.z.abs() <= half);
        }
    }
}

// === Glitch ===

#[test]
fn test_glitch_tuning_monotonic_across_levels() {
    let tunings: Vec<GlitchTuning> =
        GlitchLevel::ALL.iter().map(|&l| GlitchTuning::for_level(l)).collect();
    for pair in tunings.windows(2) {
        assert!(pair[1].frames >= pair[0].frames);
        assert!(pair[1].probability >= pair[0].probability);
        assert!(pair[1].max_replacements >= pair[0].max_replacements);
    }
}

#[test]
fn test_glitch_session_restores_source_on_every_level() {
    for level in GlitchLevel::ALL {
        for seed in seeds(5) {
            let mut glitch = GlitchText::new("ACCESS_GRANTED", level, Some(seed));
            assert!(glitch.trigger(ms(0)));
            let mut t = 0;
            while glitch.is_active() && t < 5_000 {
                t += 10;
                glitch.tick(ms(t));
            }
            assert!(!glitch.is_active());
            assert_eq!(glitch.text(), "ACCESS_GRANTED");
        }
    }
}

// === Composer and showcase ===

#[test]
fn test_composer_rethemes_while_mounted() {
    let settings = SceneSettings {
        seed: Some(3),
        rain: RainParams {
            columns: 2,
            rows: 4,
            ..RainParams::default()
        },
        hologram_count: 1,
        ..SceneSettings::default()
    };
    let clock = FrameClock::new();
    let composer = Rc::new(RefCell::new(SceneComposer::new(ThemeId::Neutral.theme(), &settings)));
    let _subscription = SceneComposer::mount(&composer, &clock);

    clock.advance(Duration::ZERO);
    clock.advance(ms(16));
    composer.borrow_mut().apply_theme(ThemeId::Zeus.theme());
    clock.advance(ms(32));

    assert_eq!(composer.borrow().theme().id, ThemeId::Zeus);
    assert!((composer.borrow().time() - 0.032).abs() < 1e-6);
}

#[test]
fn test_showcase_runs_headless_through_switches() {
    let env = TestEnvironment::new();
    let mut showcase = env.showcase();
    showcase.start(ms(0));

    let mut now = 0;
    for key in ["3", "g", "4"] {
        let command = Command::from_key(key).unwrap();
        showcase.execute(command, ms(now));
        run_frames(&mut showcase, now, now + 1_500, 16);
        now += 1_500;
    }
    assert_eq!(showcase.controller().current_theme(), ThemeId::Zeus);
    assert_eq!(env.stored_theme().as_deref(), Some("zeus"));

    // Pressed mid-transition: ignored
    showcase.execute(Command::from_key("2").unwrap(), ms(now));
    showcase.execute(Command::from_key("1").unwrap(), ms(now + 100));
    run_frames(&mut showcase, now, now + 1_500, 16);

    assert_eq!(showcase.controller().current_theme(), ThemeId::Rogue);
    assert!(showcase.clock().frame_count() > 300);
    assert!(showcase.title().contains("ROGUE"));
}

#[test]
fn test_hidden_scene_freezes_time() {
    let env = TestEnvironment::new();
    let mut showcase = env.showcase();
    showcase.tick(ms(0));
    showcase.tick(ms(500));
    showcase.execute(Command::ToggleScene, ms(500));
    showcase.tick(ms(2_000));
    assert_eq!(showcase.composer().time(), 0.5);
}

#[test]
fn test_auto_glitch_fires_from_config() {
    let mut config = small_config();
    config.glitch.auto_trigger = true;
    config.glitch.base_interval_ms = 100;
    let env = TestEnvironment::new();
    let mut showcase =
        neonfolio::Showcase::new(&config, Box::new(env.preference_store()), None);
    showcase.start(ms(0));

    let mut seen_active = false;
    for t in (0..4_000).step_by(10) {
        showcase.tick(ms(t));
        seen_active |= showcase.glitch().is_active();
    }
    assert!(seen_active);
}

#[test]
fn test_zero_typing_speed_keeps_frames_bounded() {
    let mut config = small_config();
    config.typing.speed_ms = 0;
    config.typing.loop_delay_ms = 0;
    config.typing.loop_lines = true;
    let env = TestEnvironment::new();
    let mut showcase =
        neonfolio::Showcase::new(&config, Box::new(env.preference_store()), None);
    showcase.start(ms(0));

    run_frames(&mut showcase, 0, 500, 16);
    assert!(showcase.clock().frame_count() >= 30);
    assert!(showcase.typing().next_deadline().is_some());
}
