//! Flame visual selection.

use serde::{Deserialize, Serialize};

/// Which flame objects should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlameVisual {
    /// Base flame, light and sound.
    pub enabled: bool,
    /// Full flame, shown when dry.
    pub high: bool,
    /// Sputtering flame, shown when wet.
    pub low: bool,
}

impl FlameVisual {
    pub const OFF: FlameVisual = FlameVisual {
        enabled: false,
        high: false,
        low: false,
    };
}

/// Pick the flame visual for the current burning and wet state.
///
/// Fires without high/low variants only toggle the base flame.
pub fn select_visual(burning: bool, wet: bool, has_variants: bool) -> FlameVisual {
    if !burning {
        return FlameVisual::OFF;
    }
    FlameVisual {
        enabled: true,
        high: has_variants && !wet,
        low: has_variants && wet,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_burning_is_off() {
        assert_eq!(select_visual(false, false, true), FlameVisual::OFF);
        assert_eq!(select_visual(false, true, true), FlameVisual::OFF);
        assert_eq!(select_visual(false, true, false), FlameVisual::OFF);
    }

    #[test]
    fn test_dry_fire_high_flame() {
        let v = select_visual(true, false, true);
        assert!(v.enabled && v.high && !v.low);
    }

    #[test]
    fn test_wet_fire_low_flame() {
        let v = select_visual(true, true, true);
        assert!(v.enabled && !v.high && v.low);
    }

    #[test]
    fn test_no_variants() {
        let v = select_visual(true, true, false);
        assert!(v.enabled && !v.high && !v.low);
    }
}
