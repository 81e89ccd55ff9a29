//! Field settings and variant presets
//!
//! Each mounted canvas picks a variant preset, optionally patched by a JSON
//! override taken from the page (see `platform::web`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::FieldError;
use crate::consts::*;
use crate::sim::{Color, ExclusionZone, ParticleCount, Span, SpawnRanges};

/// Which field a canvas hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Full-viewport ambient field behind the landing page
    #[default]
    Background,
    /// Decorative layer behind the results chart
    Overlay,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Background => "background",
            Variant::Overlay => "overlay",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "background" | "bg" => Some(Variant::Background),
            "overlay" | "report" => Some(Variant::Overlay),
            _ => None,
        }
    }
}

/// Which shapes particles are drawn as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeStyle {
    /// Triangles, squares, circles by index thirds
    Mixed,
    Circles,
}

/// Where the viewport size is measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sizing {
    /// Browser window inner size
    Window,
    /// The canvas element's own layout size
    Element,
}

/// Proximity link appearance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkStyle {
    /// Pairs closer than this are linked (pixels)
    pub distance: f32,
    /// Alpha of a zero-length link
    pub base_alpha: f32,
    pub color: Color,
    pub width: f32,
}

/// Complete configuration for one particle field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSettings {
    pub variant: Variant,
    pub count: ParticleCount,
    pub exclusion_zone: ExclusionZone,
    pub spawn: SpawnRanges,
    pub palette: Vec<Color>,
    pub shapes: ShapeStyle,
    pub links: LinkStyle,
    pub sizing: Sizing,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self::for_variant(Variant::Background)
    }
}

/// Brand purple used for links and the first palette slot
const PURPLE: Color = Color::rgb(0x89, 0x19, 0xA5);
const PINK: Color = Color::rgb(0xE2, 0x3F, 0x8B);

impl FieldSettings {
    /// Preset for a variant
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Background => Self {
                variant,
                count: ParticleCount::PerWidth {
                    spacing: BACKGROUND_PARTICLE_SPACING,
                    max: BACKGROUND_MAX_PARTICLES,
                },
                exclusion_zone: ExclusionZone::anchored(HEADER_ZONE_WIDTH, HEADER_ZONE_HEIGHT),
                spawn: SpawnRanges::default(),
                palette: vec![
                    PURPLE,
                    PINK,
                    Color::rgb(0xEE, 0xB8, 0xA0),
                    Color::rgb(0xFF, 0x8F, 0x41),
                    Color::rgb(0xF8, 0x49, 0x41),
                    Color::rgb(0xB8, 0x29, 0x4D),
                ],
                shapes: ShapeStyle::Mixed,
                links: LinkStyle {
                    distance: BACKGROUND_LINK_DISTANCE,
                    base_alpha: LINK_BASE_ALPHA,
                    color: PURPLE,
                    width: BACKGROUND_LINK_WIDTH,
                },
                sizing: Sizing::Window,
            },
            Variant::Overlay => Self {
                variant,
                count: ParticleCount::Fixed {
                    count: OVERLAY_PARTICLE_COUNT,
                },
                exclusion_zone: ExclusionZone::none(),
                spawn: SpawnRanges {
                    // Circles draw at half the radius, so this is 1..4 px on screen
                    radius: Span::new(2.0, 8.0),
                    speed: Span::new(-1.0, 1.0),
                    opacity: Span::fixed(0.5),
                    rotation: Span::new(0.0, 360.0),
                    rotation_speed: Span::fixed(0.0),
                },
                palette: vec![PURPLE, PINK],
                shapes: ShapeStyle::Circles,
                links: LinkStyle {
                    distance: OVERLAY_LINK_DISTANCE,
                    base_alpha: LINK_BASE_ALPHA,
                    color: PURPLE,
                    width: OVERLAY_LINK_WIDTH,
                },
                sizing: Sizing::Element,
            },
        }
    }

    /// Deep-merge a partial JSON object over these settings
    pub fn with_overrides(&self, json: &str) -> Result<Self, FieldError> {
        let mut merged = serde_json::to_value(self)?;
        let patch: Value = serde_json::from_str(json)?;
        merge_json(&mut merged, patch);

        let settings: FieldSettings = serde_json::from_value(merged)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the simulation can't run with
    pub fn validate(&self) -> Result<(), FieldError> {
        let invalid = |msg: String| Err(FieldError::InvalidSettings(msg));

        if self.palette.is_empty() {
            return invalid("palette is empty".into());
        }
        let limit = match self.count {
            ParticleCount::PerWidth { spacing, max } => {
                if !(spacing.is_finite() && spacing > 0.0) {
                    return invalid(format!("particle spacing must be positive, got {}", spacing));
                }
                max
            }
            ParticleCount::Fixed { count } => count,
        };
        if limit > MAX_PARTICLES {
            return invalid(format!("particle count {} exceeds the limit of {}", limit, MAX_PARTICLES));
        }

        let spans = [
            ("radius", self.spawn.radius),
            ("speed", self.spawn.speed),
            ("opacity", self.spawn.opacity),
            ("rotation", self.spawn.rotation),
            ("rotation_speed", self.spawn.rotation_speed),
        ];
        for (name, span) in spans {
            if !span.is_valid() {
                return invalid(format!("{} range [{}, {}) is invalid", name, span.min, span.max));
            }
        }
        if self.spawn.radius.min <= 0.0 {
            return invalid("radius must be positive".into());
        }
        if self.spawn.opacity.min < 0.0 || self.spawn.opacity.max > 1.0 {
            return invalid("opacity must lie within [0, 1]".into());
        }

        let zone = self.exclusion_zone;
        if !(zone.origin.is_finite() && zone.size.is_finite()) || zone.size.min_element() < 0.0 {
            return invalid("exclusion zone must be finite with non-negative size".into());
        }

        let links = self.links;
        if !(links.distance.is_finite() && links.distance > 0.0) {
            return invalid(format!("link distance must be positive, got {}", links.distance));
        }
        if !(0.0..=1.0).contains(&links.base_alpha) {
            return invalid(format!("link alpha must lie within [0, 1], got {}", links.base_alpha));
        }
        if !(links.width.is_finite() && links.width > 0.0) {
            return invalid(format!("link width must be positive, got {}", links.width));
        }

        Ok(())
    }
}

/// Recursively merge `patch` into `base`; non-object values replace outright
fn merge_json(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_names() {
        assert_eq!(Variant::from_name("Background"), Some(Variant::Background));
        assert_eq!(Variant::from_name(" report "), Some(Variant::Overlay));
        assert_eq!(Variant::from_name("sidebar"), None);
        assert_eq!(Variant::Overlay.as_str(), "overlay");
    }

    #[test]
    fn test_presets_are_valid() {
        for variant in [Variant::Background, Variant::Overlay] {
            let settings = FieldSettings::for_variant(variant);
            assert_eq!(settings.variant, variant);
            settings.validate().unwrap();
        }
    }

    #[test]
    fn test_background_preset_values() {
        let s = FieldSettings::default();
        assert_eq!(s.palette.len(), 6);
        assert_eq!(s.links.distance, 150.0);
        assert_eq!(s.exclusion_zone, ExclusionZone::anchored(300.0, 100.0));
        assert_eq!(s.shapes, ShapeStyle::Mixed);
    }

    #[test]
    fn test_overlay_preset_values() {
        let s = FieldSettings::for_variant(Variant::Overlay);
        assert_eq!(s.count, ParticleCount::Fixed { count: 50 });
        assert_eq!(s.links.distance, 100.0);
        assert!(s.exclusion_zone.is_empty());
        assert_eq!(s.shapes, ShapeStyle::Circles);
    }

    #[test]
    fn test_overrides_merge_partially() {
        let base = FieldSettings::default();
        let s = base
            .with_overrides(r##"{"links": {"distance": 90}, "palette": ["#000000"]}"##)
            .unwrap();
        assert_eq!(s.links.distance, 90.0);
        assert_eq!(s.links.width, base.links.width);
        assert_eq!(s.palette, vec![Color::rgb(0, 0, 0)]);
        assert_eq!(s.spawn, base.spawn);
    }

    #[test]
    fn test_overrides_can_switch_count_mode() {
        let s = FieldSettings::default()
            .with_overrides(r#"{"count": {"mode": "fixed", "count": 12}}"#)
            .unwrap();
        assert_eq!(s.count, ParticleCount::Fixed { count: 12 });
    }

    #[test]
    fn test_overrides_reject_bad_input() {
        let base = FieldSettings::default();
        assert!(matches!(base.with_overrides("{not json"), Err(FieldError::SettingsJson(_))));
        assert!(matches!(
            base.with_overrides(r#"{"palette": []}"#),
            Err(FieldError::InvalidSettings(_))
        ));
        assert!(matches!(
            base.with_overrides(r#"{"links": {"distance": -5}}"#),
            Err(FieldError::InvalidSettings(_))
        ));
        assert!(matches!(
            base.with_overrides(r#"{"spawn": {"opacity": {"min": 0.8, "max": 0.2}}}"#),
            Err(FieldError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_overrides_reject_oversized_counts() {
        let base = FieldSettings::default();
        assert!(matches!(
            base.with_overrides(r#"{"count": {"mode": "fixed", "count": 5000}}"#),
            Err(FieldError::InvalidSettings(_))
        ));
        assert!(matches!(
            base.with_overrides(r#"{"count": {"max": 151}}"#),
            Err(FieldError::InvalidSettings(_))
        ));

        let at_limit = base
            .with_overrides(r#"{"count": {"mode": "fixed", "count": 150}}"#)
            .unwrap();
        assert_eq!(at_limit.count, ParticleCount::Fixed { count: MAX_PARTICLES });
    }

    #[test]
    fn test_json_roundtrip_keeps_preset() {
        let s = FieldSettings::for_variant(Variant::Overlay);
        let json = serde_json::to_string(&s).unwrap();
        let back: FieldSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
