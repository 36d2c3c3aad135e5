//! Matrix-style digital rain
//!
//! A grid of cells hangs in front of the camera. Each column has a drop
//! that falls row by row; cells are colored in discrete tiers by their
//! distance from the drop. When a drop falls past the last row it re-enters
//! from a random point above the grid so columns never fall in lockstep.

use neon_theme::{Color, ThemeDefinition};
use rand::Rng;
use rand::rngs::StdRng;
use vello::Scene;
use vello::kurbo::{Affine, Rect};
use vello::peniko::{Brush, Fill};

use super::{FrameContext, SceneEffect, make_rng, theme_color};
use crate::math::{Vec3, Viewport};

/// Distance over which a trail fades to nothing
const TRAIL_LENGTH: f32 = 8.0;

/// Per-frame chance of a cell re-rolling its depth
const DEPTH_SHIMMER_CHANCE: f64 = 0.01;

/// Frames per second the base speed is expressed against
const REFERENCE_FPS: f32 = 60.0;

/// Brightness band of a cell relative to its column's drop
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RainTier {
    /// At the drop
    Head,
    /// Just behind the drop
    Body,
    /// Fading tail
    Trail,
    /// Not lit
    Dark,
}

impl RainTier {
    /// Tier and falloff intensity for a cell `distance` rows from the drop
    pub fn classify(distance: f32) -> (RainTier, f32) {
        let intensity = (1.0 - distance / TRAIL_LENGTH).max(0.0);
        let tier = if distance < 1.0 {
            RainTier::Head
        } else if distance < 3.0 {
            RainTier::Body
        } else if intensity > 0.0 {
            RainTier::Trail
        } else {
            RainTier::Dark
        };
        (tier, intensity)
    }
}

/// Colors for each lit tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RainPalette {
    pub head: Color,
    pub body: Color,
    pub dark: Color,
}

impl Default for RainPalette {
    fn default() -> Self {
        Self::classic()
    }
}

impl RainPalette {
    pub const fn classic() -> Self {
        Self {
            head: Color::hex(0x66ff66),
            body: Color::hex(0x00ff41),
            dark: Color::hex(0x003d10),
        }
    }

    /// Derive the tiers from a theme's primary color
    pub fn from_theme(theme: &ThemeDefinition) -> Self {
        let body = theme.colors.primary;
        Self {
            head: body.lerp(Color::WHITE, 0.4),
            body,
            dark: body.lerp(Color::BLACK, 0.76),
        }
    }

    /// Color for a tier; trails blend from dark toward the body color
    pub fn color_for(&self, tier: RainTier, intensity: f32) -> Color {
        match tier {
            RainTier::Head => self.head,
            RainTier::Body => self.body,
            RainTier::Trail => self.dark.lerp(self.body, intensity * 2.0),
            RainTier::Dark => Color::BLACK,
        }
    }
}

/// Grid dimensions and fall speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RainParams {
    pub columns: usize,
    pub rows: usize,
    /// Rows per frame at 60 fps
    pub speed: f32,
    /// World units between cells
    pub spacing: f32,
}

impl Default for RainParams {
    fn default() -> Self {
        Self {
            columns: 30,
            rows: 50,
            speed: 0.02,
            spacing: 1.5,
        }
    }
}

/// Matrix rain effect
pub struct MatrixRain {
    enabled: bool,
    params: RainParams,
    palette: RainPalette,
    /// Follow the active theme's colors instead of classic green
    themed: bool,
    drops: Vec<f32>,
    /// Cell positions, column-major
    cells: Vec<Vec3>,
    rng: StdRng,
}

impl MatrixRain {
    pub fn new(params: RainParams, seed: Option<u64>) -> Self {
        Self::with_rng(params, make_rng(seed))
    }

    pub fn with_rng(params: RainParams, mut rng: StdRng) -> Self {
        let rows = params.rows as f32;
        let drops = (0..params.columns)
            .map(|_| if params.rows > 0 { rng.gen_range(0.0..rows) } else { 0.0 })
            .collect();

        let mut cells = Vec::with_capacity(params.columns * params.rows);
        for col in 0..params.columns {
            for row in 0..params.rows {
                cells.push(Vec3::new(
                    (col as f32 - params.columns as f32 / 2.0) * params.spacing,
                    (params.rows as f32 / 2.0 - row as f32) * params.spacing,
                    rng.gen_range(-5.0..5.0),
                ));
            }
        }

        Self {
            enabled: true,
            params,
            palette: RainPalette::classic(),
            themed: false,
            drops,
            cells,
            rng,
        }
    }

    /// Color from `theme` and follow later theme changes
    pub fn themed(mut self, theme: &ThemeDefinition) -> Self {
        self.themed = true;
        self.palette = RainPalette::from_theme(theme);
        self
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn params(&self) -> &RainParams {
        &self.params
    }

    pub fn palette(&self) -> &RainPalette {
        &self.palette
    }

    pub fn drops(&self) -> &[f32] {
        &self.drops
    }

    pub fn cell(&self, col: usize, row: usize) -> Vec3 {
        self.cells[col * self.params.rows + row]
    }

    /// Tier and intensity for one cell at the current drop positions
    pub fn cell_state(&self, col: usize, row: usize) -> (RainTier, f32) {
        RainTier::classify((row as f32 - self.drops[col]).abs())
    }

    /// Advance every drop by `dt` seconds
    ///
    /// Negative or non-finite deltas count as zero.
    pub fn advance(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let rows = self.params.rows as f32;
        let base = self.params.speed * REFERENCE_FPS;

        for drop in &mut self.drops {
            let jitter = self.rng.gen_range(0.0..0.5) * base;
            *drop += (base + jitter) * dt;
            if *drop > rows {
                *drop = self.rng.gen_range(-10.0..0.0);
            }
        }

        for cell in &mut self.cells {
            if self.rng.gen_bool(DEPTH_SHIMMER_CHANCE) {
                cell.z = self.rng.gen_range(-5.0..5.0);
            }
        }
    }
}

impl SceneEffect for MatrixRain {
    fn effect_type(&self) -> &'static str {
        "matrix"
    }

    fn update(&mut self, frame: &FrameContext) {
        if self.enabled {
            self.advance(frame.dt);
        }
    }

    fn render(&self, scene: &mut Scene, viewport: &Viewport) {
        if !self.enabled || self.cells.is_empty() {
            return;
        }

        for col in 0..self.params.columns {
            for row in 0..self.params.rows {
                let (tier, intensity) = self.cell_state(col, row);
                if tier == RainTier::Dark {
                    continue;
                }
                let Some(projected) = viewport.project(self.cell(col, row)) else {
                    continue;
                };

                let size = (intensity * 3.0) as f64 * 0.1 * projected.scale;
                if size < 0.5 {
                    continue;
                }
                let color = self.palette.color_for(tier, intensity);
                let alpha = if tier == RainTier::Head { 1.0 } else { 0.4 + 0.6 * intensity };

                // Glyph-sized cell, taller than wide
                let rect = Rect::from_center_size(projected.point, (size * 0.6, size));
                scene.fill(
                    Fill::NonZero,
                    Affine::IDENTITY,
                    &Brush::Solid(theme_color(color, alpha)),
                    None,
                    &rect,
                );
            }
        }
    }

    fn apply_theme(&mut self, theme: &ThemeDefinition) {
        if self.themed {
            self.palette = RainPalette::from_theme(theme);
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neon_theme::{ThemeId, get_theme};

    #[test]
    fn test_tier_bands() {
        assert_eq!(RainTier::classify(0.0).0, RainTier::Head);
        assert_eq!(RainTier::classify(0.99).0, RainTier::Head);
        assert_eq!(RainTier::classify(1.0).0, RainTier::Body);
        assert_eq!(RainTier::classify(2.5).0, RainTier::Body);
        assert_eq!(RainTier::classify(3.0).0, RainTier::Trail);
        assert_eq!(RainTier::classify(7.9).0, RainTier::Trail);
        assert_eq!(RainTier::classify(8.0).0, RainTier::Dark);
        assert_eq!(RainTier::classify(40.0), (RainTier::Dark, 0.0));
    }

    #[test]
    fn test_tiers_ordered_by_distance() {
        let mut last = RainTier::Head;
        for step in 0..100 {
            let (tier, _) = RainTier::classify(step as f32 * 0.1);
            assert!(tier >= last);
            last = tier;
        }
    }

    #[test]
    fn test_grid_layout() {
        let rain = MatrixRain::new(RainParams::default(), Some(1));
        assert_eq!(rain.drops().len(), 30);
        let first = rain.cell(0, 0);
        assert_eq!(first.x, -15.0 * 1.5);
        assert_eq!(first.y, 25.0 * 1.5);
        assert!(first.z >= -5.0 && first.z < 5.0);
        assert!(rain.drops().iter().all(|&d| (0.0..50.0).contains(&d)));
    }

    #[test]
    fn test_drop_resets_to_negative_offset() {
        let params = RainParams {
            columns: 4,
            rows: 10,
            speed: 0.5,
            spacing: 1.5,
        };
        let mut rain = MatrixRain::new(params, Some(3));
        let mut reset_seen = [false; 4];

        for _ in 0..600 {
            let before: Vec<f32> = rain.drops().to_vec();
            rain.advance(1.0 / 60.0);
            for (col, (&prev, &now)) in before.iter().zip(rain.drops()).enumerate() {
                if now < prev {
                    reset_seen[col] = true;
                    assert!(now < 0.0 && now >= -10.0, "reset landed at {now}");
                }
            }
        }
        assert!(reset_seen.iter().all(|&seen| seen));
    }

    #[test]
    fn test_bad_delta_does_not_move_drops() {
        let mut rain = MatrixRain::new(RainParams::default(), Some(4));
        let before = rain.drops().to_vec();
        rain.advance(-1.0);
        rain.advance(f32::NAN);
        assert_eq!(rain.drops(), before.as_slice());
    }

    #[test]
    fn test_empty_grid() {
        let params = RainParams {
            columns: 0,
            rows: 0,
            ..RainParams::default()
        };
        let mut rain = MatrixRain::new(params, None);
        rain.advance(0.016);
        assert!(rain.drops().is_empty());
    }

    #[test]
    fn test_themed_palette_follows_theme() {
        let mut rain =
            MatrixRain::new(RainParams::default(), Some(1)).themed(get_theme(ThemeId::Neutral));
        assert_eq!(rain.palette().body, get_theme(ThemeId::Neutral).colors.primary);
        rain.apply_theme(get_theme(ThemeId::Rogue));
        assert_eq!(rain.palette().body, get_theme(ThemeId::Rogue).colors.primary);

        let mut classic = MatrixRain::new(RainParams::default(), Some(1));
        classic.apply_theme(get_theme(ThemeId::Rogue));
        assert_eq!(*classic.palette(), RainPalette::classic());
    }

    #[test]
    fn test_trail_blends_toward_body() {
        let palette = RainPalette::classic();
        assert_eq!(palette.color_for(RainTier::Trail, 0.0), palette.dark);
        assert_eq!(palette.color_for(RainTier::Trail, 0.6), palette.body);
        assert_eq!(palette.color_for(RainTier::Dark, 1.0), Color::BLACK);
    }
}
