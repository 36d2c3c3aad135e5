//! Theme stylesheet reader using lightningcss
//!
//! Reads the `--theme-*` custom properties back out of an emitted stylesheet
//! so consumers can resolve live colors and numbers from the CSS surface.

use lightningcss::printer::PrinterOptions;
use lightningcss::properties::custom::TokenOrValue;
use lightningcss::properties::Property;
use lightningcss::rules::CssRule;
use lightningcss::stylesheet::{ParserOptions, StyleSheet};
use lightningcss::traits::ToCss;
use log::debug;

use crate::{Color, ColorRole, GlitchLevel, ThemeColors, ThemeEffects, ThemeError};

/// Helper to get PrinterOptions (since it doesn't implement Copy)
fn opts() -> PrinterOptions<'static> {
    PrinterOptions::default()
}

/// Custom properties declared under `:root`, in source order
///
/// Duplicates are kept so callers can detect repeated declarations.
#[derive(Debug, Clone, Default)]
pub struct ThemeVariables {
    declarations: Vec<(String, String)>,
}

impl ThemeVariables {
    /// Last declared value for `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.declarations
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// How many times `name` was declared
    pub fn occurrences(&self, name: &str) -> usize {
        self.declarations.iter().filter(|(n, _)| n == name).count()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    fn require(&self, name: &str) -> Result<&str, ThemeError> {
        self.get(name)
            .ok_or_else(|| ThemeError::MissingProperty(name.to_string()))
    }

    /// Resolve a color role
    pub fn color(&self, role: ColorRole) -> Result<Color, ThemeError> {
        parse_color(self.require(role.css_property())?)
    }

    /// Resolve a numeric property
    pub fn number(&self, name: &str) -> Result<f32, ThemeError> {
        let raw = self.require(name)?;
        raw.trim()
            .parse::<f32>()
            .map_err(|_| ThemeError::CssError(format!("{} is not a number: {}", name, raw)))
    }

    /// Resolve the full color table
    pub fn colors(&self) -> Result<ThemeColors, ThemeError> {
        Ok(ThemeColors {
            primary: self.color(ColorRole::Primary)?,
            secondary: self.color(ColorRole::Secondary)?,
            accent: self.color(ColorRole::Accent)?,
            background: self.color(ColorRole::Background)?,
            surface: self.color(ColorRole::Surface)?,
            text: self.color(ColorRole::Text)?,
            text_secondary: self.color(ColorRole::TextSecondary)?,
            border: self.color(ColorRole::Border)?,
            glow: self.color(ColorRole::Glow)?,
            particle1: self.color(ColorRole::Particle1)?,
            particle2: self.color(ColorRole::Particle2)?,
            particle3: self.color(ColorRole::Particle3)?,
        })
    }

    /// Resolve the effect block
    pub fn effects(&self) -> Result<ThemeEffects, ThemeError> {
        let level = self.require("--theme-glitch-level")?;
        let glitch_level: GlitchLevel = level.parse()?;
        Ok(ThemeEffects {
            intensity: self.number("--theme-intensity")?,
            glitch_level,
            particle_count: self.number("--theme-particle-count")?.max(0.0) as usize,
            animation_speed: self.number("--theme-animation-speed")?,
        })
    }
}

/// Serialize a custom property's token list back to text
fn custom_value(tokens: &[TokenOrValue]) -> String {
    let mut value_parts = Vec::new();
    for token_or_value in tokens {
        match token_or_value {
            TokenOrValue::Token(token) => {
                if let Ok(s) = token.to_css_string(opts()) {
                    value_parts.push(s);
                }
            }
            TokenOrValue::Color(color) => {
                if let Ok(s) = color.to_css_string(opts()) {
                    value_parts.push(s);
                }
            }
            TokenOrValue::Length(len) => {
                if let Ok(s) = len.to_css_string(opts()) {
                    value_parts.push(s);
                }
            }
            _ => {}
        }
    }
    value_parts.join("").trim().to_string()
}

/// Read every custom property declared in `:root` rules
pub fn read_theme_variables(css: &str) -> Result<ThemeVariables, ThemeError> {
    let options = ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    };
    let stylesheet =
        StyleSheet::parse(css, options).map_err(|e| ThemeError::CssError(format!("{:?}", e)))?;

    let mut variables = ThemeVariables::default();
    for rule in &stylesheet.rules.0 {
        let CssRule::Style(style_rule) = rule else {
            continue;
        };
        let selector = style_rule.selectors.to_css_string(opts()).unwrap_or_default();
        if selector.trim() != ":root" {
            continue;
        }
        for decl in &style_rule.declarations.declarations {
            if let Property::Custom(prop) = decl {
                let name = prop.name.as_ref().to_string();
                if !name.starts_with("--theme-") {
                    continue;
                }
                variables
                    .declarations
                    .push((name, custom_value(&prop.value.0)));
            }
        }
    }

    debug!("Read {} theme variables", variables.len());
    Ok(variables)
}

/// Parse a color from a CSS string value
pub fn parse_color(value: &str) -> Result<Color, ThemeError> {
    let value = value.trim();

    if value.starts_with('#') {
        parse_hex_color(value)
    } else if value.starts_with("rgb") {
        parse_rgb_color(value)
    } else {
        parse_named_color(value).ok_or_else(|| ThemeError::InvalidColor(value.to_string()))
    }
}

/// The few named colors the serializer may prefer over hex
fn parse_named_color(name: &str) -> Option<Color> {
    let rgb = match name.to_lowercase().as_str() {
        "black" => 0x000000,
        "white" => 0xffffff,
        "red" => 0xff0000,
        "lime" => 0x00ff00,
        "blue" => 0x0000ff,
        "cyan" | "aqua" => 0x00ffff,
        "magenta" | "fuchsia" => 0xff00ff,
        "purple" => 0x800080,
        "gray" | "grey" => 0x808080,
        _ => return None,
    };
    Some(Color::hex(rgb))
}

/// Parse a hex color (#rgb, #rgba, #rrggbb, #rrggbbaa); alpha is discarded
pub fn parse_hex_color(hex: &str) -> Result<Color, ThemeError> {
    let digits = hex.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidColor(hex.to_string());

    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    match digits.len() {
        3 | 4 => Ok(Color::rgb(
            channel(&digits[0..1].repeat(2))?,
            channel(&digits[1..2].repeat(2))?,
            channel(&digits[2..3].repeat(2))?,
        )),
        6 | 8 => Ok(Color::rgb(
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        )),
        _ => Err(invalid()),
    }
}

/// Parse rgb(r, g, b) or rgba(r, g, b, a) with 0-255 channels
pub fn parse_rgb_color(input: &str) -> Result<Color, ThemeError> {
    let input = input.trim();
    let invalid = || ThemeError::InvalidColor(input.to_string());

    let inner = input
        .strip_prefix("rgba(")
        .or_else(|| input.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(invalid)?;

    let parts: Vec<&str> = inner
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(invalid());
    }

    let channel = |s: &str| -> Result<u8, ThemeError> {
        let v: f32 = s.parse().map_err(|_| invalid())?;
        Ok(v.round().clamp(0.0, 255.0) as u8)
    };
    Ok(Color::rgb(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?))
}
