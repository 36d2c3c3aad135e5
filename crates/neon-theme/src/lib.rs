//! Neon Theme - live-swappable portfolio themes
//!
//! This crate provides:
//! - The fixed theme registry (`neutral`, `rogue`, `secure`, `zeus`)
//! - Theme definition types (colors, effect intensities, typography)
//! - CSS custom-property emission for the active theme
//! - A stylesheet reader for `--theme-*` variables

pub mod emitter;
pub mod parser;

pub use emitter::{emit_css, transition_css, REQUIRED_PROPERTIES};
pub use parser::{parse_hex_color, read_theme_variables, ThemeVariables};

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised at the theme boundary
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThemeError {
    #[error("Unknown theme: {0}")]
    UnknownTheme(String),

    #[error("CSS parse error: {0}")]
    CssError(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Missing required property: {0}")]
    MissingProperty(String),

    #[error("Unknown glitch level: {0}")]
    UnknownGlitchLevel(String),
}

/// Identifier of a registered theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThemeId {
    /// Compliance mode, the default
    #[default]
    Neutral,
    /// Offensive security mode
    Rogue,
    /// Guardian mode
    Secure,
    /// Godmode
    Zeus,
}

impl ThemeId {
    /// All theme ids in registry order
    pub const ALL: [ThemeId; 4] = [
        ThemeId::Neutral,
        ThemeId::Rogue,
        ThemeId::Secure,
        ThemeId::Zeus,
    ];

    /// The persisted / CSS-facing name of this id
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeId::Neutral => "neutral",
            ThemeId::Rogue => "rogue",
            ThemeId::Secure => "secure",
            ThemeId::Zeus => "zeus",
        }
    }

    /// Look up the definition for this id
    pub fn theme(self) -> &'static ThemeDefinition {
        get_theme(self)
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeId {
    type Err = ThemeError;

    /// Exact, case-sensitive match on the persisted name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "neutral" => Ok(ThemeId::Neutral),
            "rogue" => Ok(ThemeId::Rogue),
            "secure" => Ok(ThemeId::Secure),
            "zeus" => Ok(ThemeId::Zeus),
            other => Err(ThemeError::UnknownTheme(other.to_string())),
        }
    }
}

/// sRGB color with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::hex(0x000000);
    pub const WHITE: Color = Color::hex(0xffffff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` literal
    pub const fn hex(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xff) as u8,
            g: ((value >> 8) & 0xff) as u8,
            b: (value & 0xff) as u8,
        }
    }

    /// Normalized channels in 0-1
    pub fn to_rgb_f32(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    /// Linear interpolation between two colors, `t` clamped to 0-1
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color::rgb(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Color {
    /// Lowercase `#rrggbb`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Semantic color roles every theme must supply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorRole {
    Primary,
    Secondary,
    Accent,
    Background,
    Surface,
    Text,
    TextSecondary,
    Border,
    Glow,
    Particle1,
    Particle2,
    Particle3,
}

impl ColorRole {
    pub const ALL: [ColorRole; 12] = [
        ColorRole::Primary,
        ColorRole::Secondary,
        ColorRole::Accent,
        ColorRole::Background,
        ColorRole::Surface,
        ColorRole::Text,
        ColorRole::TextSecondary,
        ColorRole::Border,
        ColorRole::Glow,
        ColorRole::Particle1,
        ColorRole::Particle2,
        ColorRole::Particle3,
    ];

    /// Custom property name, e.g. `--theme-text-secondary`
    pub fn css_property(&self) -> &'static str {
        match self {
            ColorRole::Primary => "--theme-primary",
            ColorRole::Secondary => "--theme-secondary",
            ColorRole::Accent => "--theme-accent",
            ColorRole::Background => "--theme-background",
            ColorRole::Surface => "--theme-surface",
            ColorRole::Text => "--theme-text",
            ColorRole::TextSecondary => "--theme-text-secondary",
            ColorRole::Border => "--theme-border",
            ColorRole::Glow => "--theme-glow",
            ColorRole::Particle1 => "--theme-particle1",
            ColorRole::Particle2 => "--theme-particle2",
            ColorRole::Particle3 => "--theme-particle3",
        }
    }
}

/// Full color table for a theme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeColors {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub background: Color,
    pub surface: Color,
    pub text: Color,
    pub text_secondary: Color,
    pub border: Color,
    pub glow: Color,
    pub particle1: Color,
    pub particle2: Color,
    pub particle3: Color,
}

impl ThemeColors {
    /// Total lookup over the fixed role set
    pub fn get(&self, role: ColorRole) -> Color {
        match role {
            ColorRole::Primary => self.primary,
            ColorRole::Secondary => self.secondary,
            ColorRole::Accent => self.accent,
            ColorRole::Background => self.background,
            ColorRole::Surface => self.surface,
            ColorRole::Text => self.text,
            ColorRole::TextSecondary => self.text_secondary,
            ColorRole::Border => self.border,
            ColorRole::Glow => self.glow,
            ColorRole::Particle1 => self.particle1,
            ColorRole::Particle2 => self.particle2,
            ColorRole::Particle3 => self.particle3,
        }
    }

    /// Depth palette used by the particle field, nearest shell first
    pub fn particle_palette(&self) -> Vec<Color> {
        vec![
            self.particle1,
            self.particle2,
            self.particle3,
            self.primary,
            self.secondary,
        ]
    }
}

/// Glitch severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum GlitchLevel {
    Low,
    #[default]
    Medium,
    High,
    Extreme,
}

impl GlitchLevel {
    pub const ALL: [GlitchLevel; 4] = [
        GlitchLevel::Low,
        GlitchLevel::Medium,
        GlitchLevel::High,
        GlitchLevel::Extreme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GlitchLevel::Low => "low",
            GlitchLevel::Medium => "medium",
            GlitchLevel::High => "high",
            GlitchLevel::Extreme => "extreme",
        }
    }

}

impl FromStr for GlitchLevel {
    type Err = ThemeError;

    /// Case-insensitive, surrounding whitespace ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "extreme" => Ok(Self::Extreme),
            _ => Err(ThemeError::UnknownGlitchLevel(s.trim().to_string())),
        }
    }
}

/// Effect tuning for a theme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeEffects {
    /// Multiplier on visual effect strength
    pub intensity: f32,
    pub glitch_level: GlitchLevel,
    pub particle_count: usize,
    pub animation_speed: f32,
}

/// Cosmetic typography settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Typography {
    pub font_family: &'static str,
    pub weight: &'static str,
    pub letter_spacing: &'static str,
}

/// A complete, immutable theme
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeDefinition {
    pub id: ThemeId,
    /// Display name, e.g. `ROGUE`
    pub name: &'static str,
    pub codename: &'static str,
    pub description: &'static str,
    pub colors: ThemeColors,
    pub effects: ThemeEffects,
    pub typography: Typography,
    /// Fill color for the generated favicon
    pub favicon: Color,
}

impl ThemeDefinition {
    /// Screen-reader announcement for a switch to this theme
    pub fn announcement(&self) -> String {
        format!("Theme changed to {} - {}", self.name, self.description)
    }
}

const MONO: &str = "'JetBrains Mono', monospace";

static THEMES: [ThemeDefinition; 4] = [
    ThemeDefinition {
        id: ThemeId::Neutral,
        name: "NEUTRAL",
        codename: "COMPLIANCE_PROTOCOL",
        description: "Standard GRC operational mode - PCI DSS, ISO 27001, SOC compliance",
        colors: ThemeColors {
            primary: Color::hex(0x00ffaa),
            secondary: Color::hex(0x00d4ff),
            accent: Color::hex(0x8b5cf6),
            background: Color::hex(0x0a0a0a),
            surface: Color::hex(0x1a1a1a),
            text: Color::hex(0xffffff),
            text_secondary: Color::hex(0x00ffaa),
            border: Color::hex(0x00ffaa),
            glow: Color::hex(0x00ffaa),
            particle1: Color::hex(0x00ffaa),
            particle2: Color::hex(0x00d4ff),
            particle3: Color::hex(0x8b5cf6),
        },
        effects: ThemeEffects {
            intensity: 1.0,
            glitch_level: GlitchLevel::Medium,
            particle_count: 6000,
            animation_speed: 1.0,
        },
        typography: Typography {
            font_family: MONO,
            weight: "normal",
            letter_spacing: "0.05em",
        },
        favicon: Color::hex(0x00ff41),
    },
    ThemeDefinition {
        id: ThemeId::Rogue,
        name: "ROGUE",
        codename: "PENTEST_PROTOCOL",
        description: "Offensive security mode - penetration testing and vulnerability assessment",
        colors: ThemeColors {
            primary: Color::hex(0xff3344),
            secondary: Color::hex(0xff5566),
            accent: Color::hex(0xff6b00),
            background: Color::hex(0x1a0a0a),
            surface: Color::hex(0x2a1010),
            text: Color::hex(0xffffff),
            text_secondary: Color::hex(0xff3344),
            border: Color::hex(0xff3344),
            glow: Color::hex(0xff3344),
            particle1: Color::hex(0xff3344),
            particle2: Color::hex(0xff5566),
            particle3: Color::hex(0xff6b00),
        },
        effects: ThemeEffects {
            intensity: 1.5,
            glitch_level: GlitchLevel::Extreme,
            particle_count: 8000,
            animation_speed: 1.3,
        },
        typography: Typography {
            font_family: MONO,
            weight: "bold",
            letter_spacing: "0.1em",
        },
        favicon: Color::hex(0xff0040),
    },
    ThemeDefinition {
        id: ThemeId::Secure,
        name: "SECURE",
        codename: "GUARDIAN_PROTOCOL",
        description: "Enhanced security mode - ISO 27001 and advanced encryption layers",
        colors: ThemeColors {
            primary: Color::hex(0xa855f7),
            secondary: Color::hex(0xb967f7),
            accent: Color::hex(0x06b6d4),
            background: Color::hex(0x0f0a1a),
            surface: Color::hex(0x1a0f2a),
            text: Color::hex(0xffffff),
            text_secondary: Color::hex(0xa855f7),
            border: Color::hex(0xa855f7),
            glow: Color::hex(0xa855f7),
            particle1: Color::hex(0xa855f7),
            particle2: Color::hex(0xb967f7),
            particle3: Color::hex(0x06b6d4),
        },
        effects: ThemeEffects {
            intensity: 1.2,
            glitch_level: GlitchLevel::Low,
            particle_count: 7000,
            animation_speed: 0.8,
        },
        typography: Typography {
            font_family: MONO,
            weight: "300",
            letter_spacing: "0.08em",
        },
        favicon: Color::hex(0x8b5cf6),
    },
    ThemeDefinition {
        id: ThemeId::Zeus,
        name: "ZEUS",
        codename: "DIVINE_PROTOCOL",
        description: "Godmode activated - unlimited administrative access and control",
        colors: ThemeColors {
            primary: Color::hex(0xffffff),
            secondary: Color::hex(0xf0f9ff),
            accent: Color::hex(0x60a5fa),
            background: Color::hex(0x030712),
            surface: Color::hex(0x111827),
            text: Color::hex(0xffffff),
            text_secondary: Color::hex(0xf0f9ff),
            border: Color::hex(0xffffff),
            glow: Color::hex(0xffffff),
            particle1: Color::hex(0xffffff),
            particle2: Color::hex(0xf0f9ff),
            particle3: Color::hex(0x60a5fa),
        },
        effects: ThemeEffects {
            intensity: 2.0,
            glitch_level: GlitchLevel::High,
            particle_count: 10000,
            animation_speed: 1.1,
        },
        typography: Typography {
            font_family: MONO,
            weight: "500",
            letter_spacing: "0.12em",
        },
        favicon: Color::hex(0xffffff),
    },
];

/// Get the definition for a theme id
pub fn get_theme(id: ThemeId) -> &'static ThemeDefinition {
    match id {
        ThemeId::Neutral => &THEMES[0],
        ThemeId::Rogue => &THEMES[1],
        ThemeId::Secure => &THEMES[2],
        ThemeId::Zeus => &THEMES[3],
    }
}

/// Look up a theme by its persisted name
pub fn find_theme(name: &str) -> Result<&'static ThemeDefinition, ThemeError> {
    name.parse::<ThemeId>().map(get_theme)
}

/// All registered themes in registry order
pub fn all_themes() -> &'static [ThemeDefinition] {
    &THEMES
}

/// List all registered theme names
pub fn theme_names() -> Vec<&'static str> {
    THEMES.iter().map(|t| t.id.as_str()).collect()
}
