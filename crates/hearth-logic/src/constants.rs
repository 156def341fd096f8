//! Shared constants: persisted keys, timer cadences, thresholds, and
//! HUD message keys.

/// Keys written to the replicated object store.
pub mod keys {
    /// Current fuel amount (f32).
    pub const FUEL: &str = "fuel";
    /// Timestamp of the last fuel update, in ticks (i64).
    pub const LAST_TIME: &str = "lastTime";
    /// Prefix for random animation values, followed by the parameter name.
    pub const RANDOM_ANIMATION_PREFIX: &str = "RA_";
}

/// Timer cadences, in seconds.
pub mod cadence {
    /// Fuel update runs immediately on spawn, then every 2 s.
    pub const FUEL_UPDATE_DELAY: f64 = 0.0;
    pub const FUEL_UPDATE_INTERVAL: f64 = 2.0;
    /// Environment check first runs after 4 s, then every 4 s.
    pub const ENVIRONMENT_CHECK_DELAY: f64 = 4.0;
    pub const ENVIRONMENT_CHECK_INTERVAL: f64 = 4.0;
}

/// Ticks per second (100 ns resolution).
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Wind intensity at or above which an uncovered fire is considered wet.
pub const WET_WIND_THRESHOLD: f32 = 0.8;

/// Cover fraction below which strong wind makes a fire wet.
pub const WET_COVER_THRESHOLD: f32 = 0.7;

/// Reach of the upward solid-object ray above the emission point.
pub const COVER_RAY_DISTANCE: f32 = 0.5;

/// Localization keys for transient HUD messages.
pub mod messages {
    pub const CANT_ADD_MORE: &str = "$msg_cantaddmore";
    pub const FIRE_ADDING: &str = "$msg_fireadding";
    pub const OUT_OF: &str = "$msg_outof";
    pub const FIRE_NOT_BURNING: &str = "$msg_firenotburning";
    pub const TOO_FEW: &str = "$msg_toofew";
    pub const THROW_IN_FIRE: &str = "$msg_throwinfire";
    pub const TOO_HARD: &str = "$msg_toohard";
    pub const BLOCKED: &str = "$msg_blocked";
}

/// Localization keys used in hover text.
pub mod hover {
    pub const FIRE_FUEL: &str = "$piece_fire_fuel";
    pub const USE: &str = "$piece_use";
    pub const USE_ITEM: &str = "$piece_useitem";
    pub const KEY_USE: &str = "$KEY_Use";
}
