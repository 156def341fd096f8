//! Environmental blocking and wetness checks.
//!
//! A fire is *blocked* when it is buried under terrain, has something
//! solid right above its smoke outlet, or its smoke spawner reports a
//! blockage. It is *wet* when strong wind reaches it through thin cover,
//! or when it is raining and there is no roof overhead. The world is
//! queried through [`EnvironmentProbe`] so the same checks run against a
//! physics engine, a database row, or a test fixture.

use serde::{Deserialize, Serialize};

use crate::config::FireplaceConfig;
use crate::constants::{COVER_RAY_DISTANCE, WET_COVER_THRESHOLD, WET_WIND_THRESHOLD};

/// World-space position (y up).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// This position raised by `dy`.
    pub fn up(self, dy: f32) -> Self {
        Self {
            y: self.y + dy,
            ..self
        }
    }

    pub fn distance(self, other: Vec3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Overhead cover at a point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CoverSample {
    /// Fraction of sky directions that are covered, 0.0–1.0.
    pub percentage: f32,
    pub under_roof: bool,
}

/// World queries the fireplace needs from its host.
pub trait EnvironmentProbe {
    /// Terrain height below/above the xz of `pos`, if any terrain exists there.
    fn terrain_height(&self, pos: Vec3) -> Option<f32>;
    /// Whether a solid object lies within `distance` straight up from `origin`.
    fn solid_above(&self, origin: Vec3, distance: f32) -> bool;
    /// Whether the attached smoke spawner is blocked. `false` without one.
    fn smoke_blocked(&self) -> bool;
    fn cover(&self, point: Vec3) -> CoverSample;
    fn wind_intensity(&self) -> f32;
    /// Whether the current weather is wet (rain, snow...).
    fn is_precipitating(&self) -> bool;
    /// Height of the liquid surface at `pos`, if any liquid is there.
    fn liquid_level(&self, pos: Vec3) -> Option<f32>;
}

/// Result of one environment check. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnvironmentStatus {
    pub blocked: bool,
    pub wet: bool,
}

/// Whether the fire at `pos` is smothered by terrain, a ceiling, or smoke blockage.
pub fn check_blocked(probe: &impl EnvironmentProbe, pos: Vec3, config: &FireplaceConfig) -> bool {
    if let Some(height) = probe.terrain_height(pos) {
        if height > pos.y + config.check_terrain_offset {
            return true;
        }
    }
    if probe.solid_above(pos.up(config.cover_check_offset), COVER_RAY_DISTANCE) {
        return true;
    }
    probe.smoke_blocked()
}

/// Whether the fire at `pos` is exposed to wind or rain.
pub fn check_wet(probe: &impl EnvironmentProbe, pos: Vec3, config: &FireplaceConfig) -> bool {
    let cover = probe.cover(pos.up(config.cover_check_offset));
    if probe.wind_intensity() >= WET_WIND_THRESHOLD && cover.percentage < WET_COVER_THRESHOLD {
        return true;
    }
    probe.is_precipitating() && !cover.under_roof
}

/// Run both checks. Wetness is only evaluated for fires with flame variants;
/// otherwise it stays at `previous_wet`.
pub fn check_environment(
    probe: &impl EnvironmentProbe,
    pos: Vec3,
    config: &FireplaceConfig,
    previous_wet: bool,
) -> EnvironmentStatus {
    let blocked = check_blocked(probe, pos, config);
    let wet = if config.has_flame_variants {
        check_wet(probe, pos, config)
    } else {
        previous_wet
    };
    EnvironmentStatus { blocked, wet }
}

/// Plain-data environment: one sample of every probe result.
///
/// Heights are absolute world y values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StaticEnvironment {
    pub terrain_height: Option<f32>,
    /// Underside of the nearest solid object above the fire.
    pub ceiling_height: Option<f32>,
    pub smoke_blocked: bool,
    pub cover: CoverSample,
    pub wind_intensity: f32,
    pub precipitation: bool,
    pub liquid_level: Option<f32>,
}

impl EnvironmentProbe for StaticEnvironment {
    fn terrain_height(&self, _pos: Vec3) -> Option<f32> {
        self.terrain_height
    }

    fn solid_above(&self, origin: Vec3, distance: f32) -> bool {
        self.ceiling_height
            .is_some_and(|h| h >= origin.y && h - origin.y <= distance)
    }

    fn smoke_blocked(&self) -> bool {
        self.smoke_blocked
    }

    fn cover(&self, _point: Vec3) -> CoverSample {
        self.cover
    }

    fn wind_intensity(&self) -> f32 {
        self.wind_intensity
    }

    fn is_precipitating(&self) -> bool {
        self.precipitation
    }

    fn liquid_level(&self, _pos: Vec3) -> Option<f32> {
        self.liquid_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: Vec3 = Vec3::new(0.0, 10.0, 0.0);

    fn open_field() -> StaticEnvironment {
        StaticEnvironment {
            terrain_height: Some(10.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_open_field_not_blocked() {
        let config = FireplaceConfig::default();
        assert!(!check_blocked(&open_field(), ORIGIN, &config));
    }

    #[test]
    fn test_buried_under_terrain() {
        let config = FireplaceConfig::default();
        let env = StaticEnvironment {
            terrain_height: Some(10.3),
            ..Default::default()
        };
        assert!(check_blocked(&env, ORIGIN, &config));
        // Within the offset is still open.
        let env = StaticEnvironment {
            terrain_height: Some(10.1),
            ..Default::default()
        };
        assert!(!check_blocked(&env, ORIGIN, &config));
    }

    #[test]
    fn test_low_ceiling_blocks() {
        let config = FireplaceConfig::default();
        // Probe origin at 10.5, ray reaches 11.0.
        let low = StaticEnvironment {
            ceiling_height: Some(10.9),
            ..open_field()
        };
        assert!(check_blocked(&low, ORIGIN, &config));
        let high = StaticEnvironment {
            ceiling_height: Some(11.5),
            ..open_field()
        };
        assert!(!check_blocked(&high, ORIGIN, &config));
    }

    #[test]
    fn test_smoke_blockage() {
        let config = FireplaceConfig::default();
        let env = StaticEnvironment {
            smoke_blocked: true,
            ..open_field()
        };
        assert!(check_blocked(&env, ORIGIN, &config));
    }

    #[test]
    fn test_windy_and_exposed_is_wet() {
        let config = FireplaceConfig::default();
        let mut env = StaticEnvironment {
            wind_intensity: 0.8,
            cover: CoverSample {
                percentage: 0.5,
                under_roof: false,
            },
            ..open_field()
        };
        assert!(check_wet(&env, ORIGIN, &config));
        env.cover.percentage = 0.7;
        assert!(!check_wet(&env, ORIGIN, &config));
        env.wind_intensity = 0.79;
        env.cover.percentage = 0.0;
        assert!(!check_wet(&env, ORIGIN, &config));
    }

    #[test]
    fn test_rain_without_roof_is_wet() {
        let config = FireplaceConfig::default();
        let mut env = StaticEnvironment {
            precipitation: true,
            ..open_field()
        };
        assert!(check_wet(&env, ORIGIN, &config));
        env.cover.under_roof = true;
        assert!(!check_wet(&env, ORIGIN, &config));
    }

    #[test]
    fn test_wet_skipped_without_variants() {
        let config = FireplaceConfig {
            has_flame_variants: false,
            ..Default::default()
        };
        let env = StaticEnvironment {
            precipitation: true,
            ..open_field()
        };
        let status = check_environment(&env, ORIGIN, &config, false);
        assert!(!status.wet);
        let with_variants = check_environment(&env, ORIGIN, &FireplaceConfig::default(), false);
        assert!(with_variants.wet);
    }

    #[test]
    fn test_vec3_helpers() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 4.0, 0.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-6);
        assert_eq!(a.up(2.0).y, 2.0);
    }
}
