//! Fireplace tuning and preset loading.
//!
//! Every placeable fire (campfire, hearth, bonfire, brazier...) is the same
//! state machine with different numbers. A [`FireplaceConfig`] carries those
//! numbers; presets ship as JSON and are validated on load.
//!
//! ```
//! use hearth_logic::config::{validate_config, FireplaceConfig};
//!
//! let config = FireplaceConfig::default();
//! assert!(validate_config(&config).is_empty());
//! assert_eq!(config.max_fuel, 10.0);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tuning for one kind of fireplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireplaceConfig {
    /// Display name (localization key or literal).
    pub name: String,
    /// Fuel written on first placement.
    pub start_fuel: f32,
    /// Capacity; add-fuel is refused once `ceil(fuel)` reaches it.
    pub max_fuel: f32,
    /// Seconds of burning consumed per fuel unit.
    pub sec_per_fuel: f32,
    /// Terrain above `y + check_terrain_offset` smothers the fire.
    pub check_terrain_offset: f32,
    /// Height of the cover/ceiling probe origin above the base.
    pub cover_check_offset: f32,
    /// Height of the flame emitter above the base (submersion check).
    pub emitter_height: f32,
    /// Minimum seconds between repeated held "use" actions. `<= 0` disables hold.
    pub hold_repeat_interval: f32,
    /// Item consumed by "use".
    pub fuel_item: String,
    /// Optional special consumable thrown into a burning fire.
    pub firework_item: Option<String>,
    /// How many firework items one throw consumes.
    pub firework_items: u32,
    /// Whether the fire has separate high (dry) and low (wet) flames.
    pub has_flame_variants: bool,
}

impl Default for FireplaceConfig {
    fn default() -> Self {
        Self {
            name: "$piece_firepit".to_string(),
            start_fuel: 3.0,
            max_fuel: 10.0,
            sec_per_fuel: 3.0,
            check_terrain_offset: 0.2,
            cover_check_offset: 0.5,
            emitter_height: 0.25,
            hold_repeat_interval: 0.2,
            fuel_item: "$item_wood".to_string(),
            firework_item: None,
            firework_items: 2,
            has_flame_variants: true,
        }
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("name is empty")]
    EmptyName,
    #[error("max_fuel must be positive, got {0}")]
    NonPositiveMaxFuel(f32),
    #[error("start_fuel {0} is outside [0, max_fuel]")]
    StartFuelOutOfRange(f32),
    #[error("sec_per_fuel must be positive, got {0}")]
    NonPositiveSecPerFuel(f32),
    #[error("fuel_item is empty")]
    EmptyFuelItem,
    #[error("firework_items must be at least 1 when a firework item is set")]
    ZeroFireworkItems,
}

/// Validate a fireplace configuration, returning all errors found.
pub fn validate_config(config: &FireplaceConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.name.trim().is_empty() {
        errors.push(ConfigError::EmptyName);
    }
    if !(config.max_fuel > 0.0) {
        errors.push(ConfigError::NonPositiveMaxFuel(config.max_fuel));
    }
    if !(config.start_fuel >= 0.0 && config.start_fuel <= config.max_fuel) {
        errors.push(ConfigError::StartFuelOutOfRange(config.start_fuel));
    }
    if !(config.sec_per_fuel > 0.0) {
        errors.push(ConfigError::NonPositiveSecPerFuel(config.sec_per_fuel));
    }
    if config.fuel_item.trim().is_empty() {
        errors.push(ConfigError::EmptyFuelItem);
    }
    if config.firework_item.is_some() && config.firework_items == 0 {
        errors.push(ConfigError::ZeroFireworkItems);
    }

    errors
}

/// A named fireplace configuration from the preset file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireplacePreset {
    pub id: String,
    #[serde(flatten)]
    pub config: FireplaceConfig,
}

/// Failure to load a preset file.
#[derive(Debug, Error)]
pub enum PresetError {
    #[error("preset file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("preset file contains no presets")]
    Empty,
    #[error("duplicate preset id `{0}`")]
    DuplicateId(String),
    #[error("preset `{id}` is invalid: {errors:?}")]
    Invalid {
        id: String,
        errors: Vec<ConfigError>,
    },
}

/// Parse and validate a JSON array of presets.
pub fn load_presets(json: &str) -> Result<Vec<FireplacePreset>, PresetError> {
    let presets: Vec<FireplacePreset> = serde_json::from_str(json)?;
    if presets.is_empty() {
        return Err(PresetError::Empty);
    }

    for (i, preset) in presets.iter().enumerate() {
        if presets[..i].iter().any(|p| p.id == preset.id) {
            return Err(PresetError::DuplicateId(preset.id.clone()));
        }
        let errors = validate_config(&preset.config);
        if !errors.is_empty() {
            return Err(PresetError::Invalid {
                id: preset.id.clone(),
                errors,
            });
        }
    }

    log::debug!("Loaded {} fireplace presets", presets.len());
    Ok(presets)
}

/// Look up a preset by id.
pub fn find_preset<'a>(presets: &'a [FireplacePreset], id: &str) -> Option<&'a FireplacePreset> {
    presets.iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(validate_config(&FireplaceConfig::default()).is_empty());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let config = FireplaceConfig {
            name: "  ".into(),
            max_fuel: 0.0,
            start_fuel: 5.0,
            sec_per_fuel: -1.0,
            fuel_item: String::new(),
            firework_item: Some("$item_fireworks".into()),
            firework_items: 0,
            ..Default::default()
        };
        let errors = validate_config(&config);
        assert!(errors.contains(&ConfigError::EmptyName));
        assert!(errors.contains(&ConfigError::NonPositiveMaxFuel(0.0)));
        assert!(errors.contains(&ConfigError::StartFuelOutOfRange(5.0)));
        assert!(errors.contains(&ConfigError::NonPositiveSecPerFuel(-1.0)));
        assert!(errors.contains(&ConfigError::EmptyFuelItem));
        assert!(errors.contains(&ConfigError::ZeroFireworkItems));
    }

    #[test]
    fn test_nan_fuel_rejected() {
        let config = FireplaceConfig {
            max_fuel: f32::NAN,
            ..Default::default()
        };
        assert!(!validate_config(&config).is_empty());
    }

    #[test]
    fn test_load_presets_fills_defaults() {
        let json = r#"[
            { "id": "campfire", "name": "$piece_firepit" },
            { "id": "bonfire", "name": "$piece_bonfire", "max_fuel": 30.0, "sec_per_fuel": 5.0 }
        ]"#;
        let presets = load_presets(json).unwrap();
        assert_eq!(presets.len(), 2);
        let bonfire = find_preset(&presets, "bonfire").unwrap();
        assert_eq!(bonfire.config.max_fuel, 30.0);
        assert_eq!(bonfire.config.start_fuel, 3.0);
        assert!(find_preset(&presets, "missing").is_none());
    }

    #[test]
    fn test_load_presets_errors() {
        assert!(matches!(
            load_presets("not json"),
            Err(PresetError::Parse(_))
        ));
        assert!(matches!(load_presets("[]"), Err(PresetError::Empty)));
        let dup = r#"[{ "id": "a" }, { "id": "a" }]"#;
        assert!(matches!(load_presets(dup), Err(PresetError::DuplicateId(id)) if id == "a"));
        let bad = r#"[{ "id": "a", "max_fuel": -1.0 }]"#;
        assert!(matches!(
            load_presets(bad),
            Err(PresetError::Invalid { .. })
        ));
    }
}
