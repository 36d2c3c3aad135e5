//! Theme stylesheet emission
//!
//! Maps a [`ThemeDefinition`] to the CSS text installed on the style surface:
//! the `:root` custom-property block, the body rule, the legacy color-class
//! overrides and the glow utilities. The result is a pure function of the
//! theme, so emitting the same theme twice yields identical text.

use std::fmt::Write;

use crate::{ColorRole, ThemeDefinition};

/// Every custom property the `:root` block declares, in emission order
pub const REQUIRED_PROPERTIES: [&str; 19] = [
    "--theme-primary",
    "--theme-secondary",
    "--theme-accent",
    "--theme-background",
    "--theme-surface",
    "--theme-text",
    "--theme-text-secondary",
    "--theme-border",
    "--theme-glow",
    "--theme-particle1",
    "--theme-particle2",
    "--theme-particle3",
    "--theme-intensity",
    "--theme-glitch-level",
    "--theme-particle-count",
    "--theme-animation-speed",
    "--theme-font",
    "--theme-font-weight",
    "--theme-letter-spacing",
];

/// Legacy utility class groups redirected to a theme role
struct LegacyGroup {
    selectors: &'static [&'static str],
    role: &'static str,
}

const SOLID_OVERRIDES: [LegacyGroup; 3] = [
    LegacyGroup {
        selectors: &[
            ".text-green-400",
            ".border-green-400",
            ".bg-green-400",
            ".text-green-500",
            ".border-green-500",
            ".bg-green-500",
        ],
        role: "primary",
    },
    LegacyGroup {
        selectors: &[
            ".text-cyan-400",
            ".border-cyan-400",
            ".bg-cyan-400",
            ".text-blue-400",
            ".border-blue-400",
            ".bg-blue-400",
        ],
        role: "secondary",
    },
    LegacyGroup {
        selectors: &[
            ".text-purple-400",
            ".border-purple-400",
            ".bg-purple-400",
            ".text-indigo-400",
            ".border-indigo-400",
            ".bg-indigo-400",
        ],
        role: "accent",
    },
];

const TRANSLUCENT_OVERRIDES: [LegacyGroup; 3] = [
    LegacyGroup {
        selectors: &[".bg-green-500\\/20", ".bg-green-400\\/20", ".bg-green-900"],
        role: "primary",
    },
    LegacyGroup {
        selectors: &[".bg-cyan-500\\/20", ".bg-cyan-400\\/20", ".bg-blue-500\\/20"],
        role: "secondary",
    },
    LegacyGroup {
        selectors: &[".bg-purple-500\\/20", ".bg-purple-400\\/20", ".bg-indigo-500\\/20"],
        role: "accent",
    },
];

const HOVER_OVERRIDES: [LegacyGroup; 3] = [
    LegacyGroup {
        selectors: &[
            ".hover\\:text-green-400:hover",
            ".hover\\:border-green-500:hover",
            ".hover\\:bg-green-500:hover",
        ],
        role: "primary",
    },
    LegacyGroup {
        selectors: &[
            ".hover\\:text-cyan-400:hover",
            ".hover\\:border-cyan-400:hover",
            ".hover\\:bg-cyan-400:hover",
        ],
        role: "secondary",
    },
    LegacyGroup {
        selectors: &[
            ".hover\\:text-purple-400:hover",
            ".hover\\:border-purple-400:hover",
            ".hover\\:bg-purple-400:hover",
        ],
        role: "accent",
    },
];

const SHADOW_OVERRIDES: [LegacyGroup; 3] = [
    LegacyGroup {
        selectors: &[".shadow-green-400\\/25", ".shadow-green-500\\/30"],
        role: "primary",
    },
    LegacyGroup {
        selectors: &[".shadow-cyan-400\\/25", ".shadow-blue-400\\/25"],
        role: "secondary",
    },
    LegacyGroup {
        selectors: &[".shadow-purple-400\\/25"],
        role: "accent",
    },
];

/// Transition styles appended to every emission
const TRANSITION_CSS: &str = r#"
.theme-transition {
  transition: all 1.5s cubic-bezier(0.4, 0, 0.2, 1);
}

.theme-transition * {
  transition:
    color 1.5s cubic-bezier(0.4, 0, 0.2, 1),
    background-color 1.5s cubic-bezier(0.4, 0, 0.2, 1),
    border-color 1.5s cubic-bezier(0.4, 0, 0.2, 1),
    box-shadow 1.5s cubic-bezier(0.4, 0, 0.2, 1),
    text-shadow 1.5s cubic-bezier(0.4, 0, 0.2, 1);
}

.theme-switch-overlay {
  position: fixed;
  inset: 0;
  background: radial-gradient(circle at center, var(--theme-primary) 0%, transparent 70%);
  opacity: 0;
  pointer-events: none;
  z-index: 9999;
  transition: opacity 0.8s ease-out;
}

.theme-switch-overlay.active {
  opacity: 0.3;
}
"#;

/// The transition stylesheet on its own
pub fn transition_css() -> &'static str {
    TRANSITION_CSS
}

/// Emit the complete stylesheet for a theme
///
/// Every name in [`REQUIRED_PROPERTIES`] is declared exactly once, inside
/// the single `:root` block.
pub fn emit_css(theme: &ThemeDefinition) -> String {
    let mut css = String::with_capacity(8 * 1024);
    write_stylesheet(&mut css, theme).expect("writing to a String cannot fail");
    css
}

fn write_stylesheet(css: &mut String, theme: &ThemeDefinition) -> std::fmt::Result {
    write_root_block(css, theme)?;
    write_body_rule(css, theme)?;
    write_legacy_overrides(css)?;
    write_utilities(css, theme)?;
    css.write_str(TRANSITION_CSS)
}

fn write_root_block(css: &mut String, theme: &ThemeDefinition) -> std::fmt::Result {
    writeln!(css, ":root {{")?;
    for role in ColorRole::ALL {
        writeln!(css, "  {}: {};", role.css_property(), theme.colors.get(role))?;
    }
    let effects = &theme.effects;
    writeln!(css, "  --theme-intensity: {};", effects.intensity)?;
    writeln!(css, "  --theme-glitch-level: {};", effects.glitch_level.as_str())?;
    writeln!(css, "  --theme-particle-count: {};", effects.particle_count)?;
    writeln!(css, "  --theme-animation-speed: {};", effects.animation_speed)?;
    let typography = &theme.typography;
    writeln!(css, "  --theme-font: {};", typography.font_family)?;
    writeln!(css, "  --theme-font-weight: {};", typography.weight)?;
    writeln!(css, "  --theme-letter-spacing: {};", typography.letter_spacing)?;
    writeln!(css, "}}")?;
    writeln!(css)
}

fn write_body_rule(css: &mut String, theme: &ThemeDefinition) -> std::fmt::Result {
    let colors = &theme.colors;
    writeln!(css, "body {{")?;
    writeln!(
        css,
        "  background: linear-gradient(135deg, {bg} 0%, {surface} 50%, {bg} 100%);",
        bg = colors.background,
        surface = colors.surface
    )?;
    writeln!(css, "  color: {};", colors.text)?;
    writeln!(css, "  font-family: var(--theme-font);")?;
    writeln!(css, "  font-weight: var(--theme-font-weight);")?;
    writeln!(css, "  letter-spacing: var(--theme-letter-spacing);")?;
    writeln!(css, "}}")?;
    writeln!(css)
}

fn write_group(css: &mut String, group: &LegacyGroup, body: &str) -> std::fmt::Result {
    writeln!(css, "{} {{", group.selectors.join(",\n"))?;
    write!(css, "{}", body.replace("{role}", group.role))?;
    writeln!(css, "}}")?;
    writeln!(css)
}

fn write_legacy_overrides(css: &mut String) -> std::fmt::Result {
    const SOLID: &str = "  color: var(--theme-{role}) !important;\n  border-color: var(--theme-{role}) !important;\n  background-color: var(--theme-{role}) !important;\n";
    const TRANSLUCENT: &str = "  background-color: color-mix(in srgb, var(--theme-{role}) 20%, transparent) !important;\n";
    const SHADOW: &str = "  box-shadow: 0 0 25px color-mix(in srgb, var(--theme-{role}) 25%, transparent) !important;\n";

    for group in &SOLID_OVERRIDES {
        write_group(css, group, SOLID)?;
    }
    for group in &TRANSLUCENT_OVERRIDES {
        write_group(css, group, TRANSLUCENT)?;
    }
    for group in &HOVER_OVERRIDES {
        write_group(css, group, SOLID)?;
    }

    writeln!(
        css,
        ".from-green-400 {{\n  --tw-gradient-from: var(--theme-primary) !important;\n}}"
    )?;
    writeln!(css, ".to-cyan-400 {{\n  --tw-gradient-to: var(--theme-secondary) !important;\n}}")?;
    writeln!(
        css,
        ".from-purple-400 {{\n  --tw-gradient-from: var(--theme-accent) !important;\n}}"
    )?;
    writeln!(css)?;

    for group in &SHADOW_OVERRIDES {
        write_group(css, group, SHADOW)?;
    }

    writeln!(
        css,
        ".bg-gray-900\\/50 {{\n  background-color: color-mix(in srgb, var(--theme-surface) 50%, transparent) !important;\n}}\n"
    )?;
    writeln!(
        css,
        ".border-gray-700,\n.border-gray-800 {{\n  border-color: color-mix(in srgb, var(--theme-border) 30%, #374151) !important;\n}}\n"
    )
}

fn write_utilities(css: &mut String, theme: &ThemeDefinition) -> std::fmt::Result {
    let glow_stack = |property: &str| {
        format!(
            "  {property}:\n    0 0 calc(5px * var(--theme-intensity)) var(--theme-glow),\n    0 0 calc(10px * var(--theme-intensity)) var(--theme-glow),\n    0 0 calc(15px * var(--theme-intensity)) var(--theme-glow);\n"
        )
    };

    write!(css, ".theme-glow {{\n{}}}\n\n", glow_stack("box-shadow"))?;
    write!(css, ".theme-text-shadow {{\n{}}}\n\n", glow_stack("text-shadow"))?;
    writeln!(
        css,
        ".theme-border {{\n  border-color: var(--theme-border);\n  box-shadow:\n    0 0 calc(5px * var(--theme-intensity)) var(--theme-border),\n    inset 0 0 calc(5px * var(--theme-intensity)) var(--theme-border);\n}}\n"
    )?;
    writeln!(css, "* {{\n  animation-duration: calc(1s / var(--theme-animation-speed));\n}}\n")?;

    let colors = &theme.colors;
    // 8-digit hex: the trailing 50 is the selection alpha
    writeln!(
        css,
        "::selection {{\n  background: linear-gradient(45deg, {}50, {}50);\n  color: {};\n  text-shadow: 0 0 calc(10px * var(--theme-intensity)) currentColor;\n}}\n",
        colors.primary, colors.secondary, colors.text
    )?;
    writeln!(
        css,
        "nav a {{\n  border-color: var(--theme-border) !important;\n  color: var(--theme-text-secondary) !important;\n}}\n"
    )?;
    writeln!(css, "nav a:hover {{\n  box-shadow: 0 0 15px var(--theme-glow) !important;\n}}\n")?;
    writeln!(
        css,
        ".matrix-char {{\n  color: var(--theme-primary) !important;\n  text-shadow: 0 0 5px var(--theme-primary) !important;\n}}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{all_themes, get_theme, ThemeId};

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn test_every_property_declared_exactly_once() {
        for theme in all_themes() {
            let css = emit_css(theme);
            for name in REQUIRED_PROPERTIES {
                let declaration = format!("{}: ", name);
                assert_eq!(
                    count(&css, &declaration),
                    1,
                    "{} declared wrong number of times for {}",
                    name,
                    theme.id
                );
            }
        }
    }

    #[test]
    fn test_stylesheet_writer_reports_success() {
        let theme = get_theme(ThemeId::Zeus);
        let mut css = String::from("/* host */\n");
        assert!(write_stylesheet(&mut css, theme).is_ok());
        assert_eq!(css.strip_prefix("/* host */\n"), Some(emit_css(theme).as_str()));
        assert!(css.ends_with(TRANSITION_CSS));
    }

    #[test]
    fn test_emission_is_deterministic() {
        let theme = get_theme(ThemeId::Secure);
        assert_eq!(emit_css(theme), emit_css(theme));
    }

    #[test]
    fn test_root_values() {
        let css = emit_css(get_theme(ThemeId::Rogue));
        assert!(css.contains("--theme-primary: #ff3344;"));
        assert!(css.contains("--theme-intensity: 1.5;"));
        assert!(css.contains("--theme-glitch-level: extreme;"));
        assert!(css.contains("--theme-particle-count: 8000;"));
        assert!(css.contains("--theme-animation-speed: 1.3;"));
    }

    #[test]
    fn test_legacy_classes_redirected() {
        let css = emit_css(get_theme(ThemeId::Neutral));
        assert!(css.contains(".text-green-400,"));
        assert!(css.contains("color: var(--theme-primary) !important;"));
        assert!(css.contains("color: var(--theme-secondary) !important;"));
        assert!(css.contains("color: var(--theme-accent) !important;"));
        assert!(css.contains(".bg-gray-900\\/50"));
    }

    #[test]
    fn test_transition_css_appended() {
        let css = emit_css(get_theme(ThemeId::Zeus));
        assert!(css.ends_with(transition_css()));
        assert_eq!(count(&css, ".theme-switch-overlay {"), 1);
    }

    #[test]
    fn test_themes_differ_only_in_values() {
        let a = emit_css(get_theme(ThemeId::Neutral));
        let b = emit_css(get_theme(ThemeId::Zeus));
        assert_ne!(a, b);
        assert_eq!(a.lines().count(), b.lines().count());
    }
}
