//! Theme presets - background, lights, ground, and decorations

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Linear-ish RGB color with components in 0.0-1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(pub [f32; 3]);

impl Rgb {
    /// Build from a `0xRRGGBB` literal
    pub const fn hex(value: u32) -> Self {
        Self([
            ((value >> 16) & 0xff) as f32 / 255.0,
            ((value >> 8) & 0xff) as f32 / 255.0,
            (value & 0xff) as f32 / 255.0,
        ])
    }

    pub const WHITE: Rgb = Rgb([1.0, 1.0, 1.0]);

    pub fn r(&self) -> f32 {
        self.0[0]
    }

    pub fn g(&self) -> f32 {
        self.0[1]
    }

    pub fn b(&self) -> f32 {
        self.0[2]
    }
}

/// Shadow map parameters for a shadow-casting directional light
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowSettings {
    pub map_size: u32,
    pub near: f32,
    pub far: f32,
    /// Half-width of the orthographic shadow frustum
    pub extent: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            map_size: 2048,
            near: 0.5,
            far: 150.0,
            extent: 50.0,
        }
    }
}

/// A light in the composed scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LightDefinition {
    Directional {
        color: Rgb,
        intensity: f32,
        position: Vec3,
        shadow: Option<ShadowSettings>,
    },
    Hemisphere {
        sky: Rgb,
        ground: Rgb,
        intensity: f32,
    },
    Point {
        color: Rgb,
        intensity: f32,
        position: Vec3,
    },
}

/// Named theme presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    Day,
    #[default]
    Night,
}

impl ThemeName {
    pub fn descriptor(self) -> ThemeDescriptor {
        match self {
            ThemeName::Day => ThemeDescriptor::day(),
            ThemeName::Night => ThemeDescriptor::night(),
        }
    }

    pub fn toggled(self) -> ThemeName {
        match self {
            ThemeName::Day => ThemeName::Night,
            ThemeName::Night => ThemeName::Day,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeName::Day => "day",
            ThemeName::Night => "night",
        }
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(ThemeName::Day),
            "night" => Ok(ThemeName::Night),
            other => Err(format!("unknown theme '{other}' (expected 'day' or 'night')")),
        }
    }
}

/// Immutable color/light/decoration bundle selected as a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeDescriptor {
    pub name: ThemeName,
    pub background: Rgb,
    pub ambient_intensity: f32,
    pub ground_color: Rgb,
    pub grid_color: Rgb,
    pub lights: Vec<LightDefinition>,
    pub sky: bool,
    pub stars: bool,
    pub clouds: bool,
}

impl ThemeDescriptor {
    pub fn day() -> Self {
        Self {
            name: ThemeName::Day,
            background: Rgb::hex(0x87ceeb),
            ambient_intensity: 0.4,
            ground_color: Rgb::hex(0x3a5a40),
            grid_color: Rgb::hex(0x0f3460),
            lights: vec![
                LightDefinition::Directional {
                    color: Rgb::WHITE,
                    intensity: 1.2,
                    position: Vec3::new(30.0, 50.0, 30.0),
                    shadow: Some(ShadowSettings::default()),
                },
                LightDefinition::Directional {
                    color: Rgb::hex(0x8ecae6),
                    intensity: 0.5,
                    position: Vec3::new(-20.0, 20.0, -20.0),
                    shadow: None,
                },
                LightDefinition::Hemisphere {
                    sky: Rgb::hex(0x87ceeb),
                    ground: Rgb::hex(0x4a6741),
                    intensity: 0.3,
                },
            ],
            sky: true,
            stars: false,
            clouds: true,
        }
    }

    pub fn night() -> Self {
        Self {
            name: ThemeName::Night,
            background: Rgb::hex(0x1a1a2e),
            ambient_intensity: 0.25,
            ground_color: Rgb::hex(0x24382a),
            grid_color: Rgb::hex(0x0f3460),
            lights: vec![
                // Moonlight
                LightDefinition::Directional {
                    color: Rgb::hex(0xb0c4de),
                    intensity: 0.6,
                    position: Vec3::new(-30.0, 50.0, 20.0),
                    shadow: Some(ShadowSettings::default()),
                },
                LightDefinition::Hemisphere {
                    sky: Rgb::hex(0x0f3460),
                    ground: Rgb::hex(0x1a1a2e),
                    intensity: 0.2,
                },
                // Warm street-level glow
                LightDefinition::Point {
                    color: Rgb::hex(0xffb86b),
                    intensity: 0.8,
                    position: Vec3::new(0.0, 8.0, 12.0),
                },
            ],
            sky: false,
            stars: true,
            clouds: false,
        }
    }

    /// The shadow-casting sun/moon, if the preset has one
    pub fn key_light(&self) -> Option<&LightDefinition> {
        self.lights.iter().find(|light| {
            matches!(light, LightDefinition::Directional { shadow: Some(_), .. })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_conversion() {
        let c = Rgb::hex(0xff8000);
        assert_eq!(c.r(), 1.0);
        assert!((c.g() - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.b(), 0.0);
    }

    #[test]
    fn test_presets_are_distinct_and_flag_decorations() {
        let day = ThemeName::Day.descriptor();
        let night = ThemeName::Night.descriptor();
        assert_ne!(day, night);
        assert!(day.sky && day.clouds && !day.stars);
        assert!(night.stars && !night.sky);
        assert!(day.key_light().is_some());
        assert!(night.key_light().is_some());
    }

    #[test]
    fn test_theme_name_parsing() {
        assert_eq!("Day".parse::<ThemeName>().unwrap(), ThemeName::Day);
        assert_eq!(" night ".parse::<ThemeName>().unwrap(), ThemeName::Night);
        assert!("dusk".parse::<ThemeName>().is_err());
        assert_eq!(ThemeName::Day.toggled(), ThemeName::Night);
        assert_eq!(ThemeName::Night.to_string(), "night");
    }
}
