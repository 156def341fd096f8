//! SpacetimeDB table definitions for the fireplace module.
//!
//! A `fireplace` row is the persisted object store of one fire (fuel and
//! last update time) plus the derived state clients render from. The module
//! is the single writer; the `owner` column records which player has
//! claimed the fire.

use spacetimedb::{client_visibility_filter, table, Filter, Identity, ScheduleAt, Timestamp};

use crate::reducers::{check_fireplace_environment, update_fireplaces};

// ============================================================================
// FIREPLACES
// ============================================================================

/// A placed fireplace
#[table(name = fireplace, public)]
#[derive(Clone)]
pub struct PlacedFireplace {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    /// Preset id from `fireplace_presets.json`
    pub preset: String,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub fuel: f32,
    /// Last fuel update, in 100 ns ticks
    pub last_time: i64,
    /// Player who claimed the fire, if any
    pub owner: Option<Identity>,
    pub placed_by: Identity,
    pub placed_at: Timestamp,
    pub blocked: bool,
    pub wet: bool,
    pub flame_enabled: bool,
    pub flame_high: bool,
    pub flame_low: bool,
    /// Seconds of the last accepted held "use"
    pub last_use: Option<f64>,
}

/// Latest physics sample around a fireplace, reported by a client
#[table(name = fireplace_site, public)]
#[derive(Clone)]
pub struct FireplaceSite {
    #[primary_key]
    pub fireplace_id: u64,
    pub terrain_height: Option<f32>,
    pub ceiling_height: Option<f32>,
    pub smoke_blocked: bool,
    pub cover_percentage: f32,
    pub under_roof: bool,
    pub liquid_level: Option<f32>,
}

/// Weather singleton (id always 0)
#[table(name = weather, public)]
#[derive(Clone)]
pub struct Weather {
    #[primary_key]
    pub id: u32,
    pub wind_intensity: f32,
    pub precipitation: bool,
}

/// Visual/audio cue for clients (fuel added, fireworks)
#[table(name = fire_effect, public)]
pub struct FireEffectEvent {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub fireplace_id: u64,
    pub kind: String,
    pub created_at: Timestamp,
}

pub mod effect_kinds {
    pub const FUEL_ADDED: &str = "fuel_added";
    pub const FIREWORKS: &str = "fireworks";
}

// ============================================================================
// PLAYERS
// ============================================================================

/// Connected player tracking
#[table(name = connected_player, public)]
pub struct ConnectedPlayer {
    #[primary_key]
    pub identity: Identity,
    /// Session-scoped id used by the fireplace ownership logic
    #[unique]
    #[auto_inc]
    pub participant_id: u64,
    pub connected_at: Timestamp,
}

/// One stack of items held by a player
#[table(name = inventory_item, public)]
#[derive(Clone)]
pub struct InventoryItem {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    #[index(btree)]
    pub owner: Identity,
    pub name: String,
    pub count: u32,
}

/// Center-screen message for one player
#[table(name = hud_message, public)]
pub struct HudMessage {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    #[index(btree)]
    pub recipient: Identity,
    pub text: String,
    pub created_at: Timestamp,
}

/// Players only see their own items and messages.
#[client_visibility_filter]
const OWN_INVENTORY_ONLY: Filter =
    Filter::Sql("SELECT * FROM inventory_item WHERE owner = :sender");

#[client_visibility_filter]
const OWN_HUD_MESSAGES_ONLY: Filter =
    Filter::Sql("SELECT * FROM hud_message WHERE recipient = :sender");

// ============================================================================
// SCHEDULES
// ============================================================================

/// Drives `update_fireplaces` every 2 s
#[table(name = fireplace_update_schedule, scheduled(update_fireplaces))]
pub struct FireplaceUpdateSchedule {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub scheduled_at: ScheduleAt,
}

/// Drives `check_fireplace_environment` every 4 s
#[table(name = environment_check_schedule, scheduled(check_fireplace_environment))]
pub struct EnvironmentCheckSchedule {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub scheduled_at: ScheduleAt,
}
