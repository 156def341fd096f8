//! Client-facing and scheduled reducers for fireplaces.
//!
//! Every reducer rebuilds a `hearth_logic` fireplace from its row, runs the
//! logic against a probe assembled from the reported site sample and the
//! weather, and writes the result back. The module applies owner-bound
//! requests itself, so clients never mutate fuel directly.

use crate::tables::*;
use hearth_logic::clock::{micros_to_ticks, Clock, Ticks};
use hearth_logic::config::{find_preset, load_presets, FireplaceConfig, FireplacePreset};
use hearth_logic::constants::{cadence, keys};
use hearth_logic::environment::{CoverSample, EnvironmentStatus, StaticEnvironment, Vec3};
use hearth_logic::fireplace::{AddFuelOutcome, Authority, FireEffect, Fireplace};
use hearth_logic::interaction::{
    self, ActionOutcome, Actor, HoldGate, IdentityLocalizer, Inventory,
};
use hearth_logic::replication::{FireplaceRequest, Ownership, ParticipantId};
use hearth_logic::store::ObjectStore;
use spacetimedb::{reducer, Identity, ReducerContext, ScheduleAt, Table, TimeDuration, Timestamp};

const PRESETS_JSON: &str = include_str!("../../../data/fireplace_presets.json");

/// HUD messages and effect cues are dropped after this long.
const TRANSIENT_RETENTION_MICROS: i64 = 10_000_000;

// ============================================================================
// HOST ADAPTERS
// ============================================================================

/// Reducer timestamp as a fireplace clock.
struct ReducerClock(Timestamp);

impl Clock for ReducerClock {
    fn now_ticks(&self) -> Ticks {
        micros_to_ticks(self.0.to_micros_since_unix_epoch())
    }
}

/// A player's `inventory_item` rows.
struct PlayerInventory<'a> {
    ctx: &'a ReducerContext,
    owner: Identity,
}

impl PlayerInventory<'_> {
    fn stacks(&self, name: &str) -> Vec<InventoryItem> {
        self.ctx
            .db
            .inventory_item()
            .owner()
            .filter(&self.owner)
            .filter(|i| i.name == name)
            .collect()
    }
}

impl Inventory for PlayerInventory<'_> {
    fn count_items(&self, name: &str) -> u32 {
        self.stacks(name).iter().map(|i| i.count).sum()
    }

    fn remove_items(&mut self, name: &str, amount: u32) {
        let mut remaining = amount;
        for mut stack in self.stacks(name) {
            if remaining == 0 {
                break;
            }
            let taken = stack.count.min(remaining);
            remaining -= taken;
            stack.count -= taken;
            if stack.count == 0 {
                self.ctx.db.inventory_item().id().delete(stack.id);
            } else {
                self.ctx.db.inventory_item().id().update(stack);
            }
        }
    }
}

// ============================================================================
// LIFECYCLE
// ============================================================================

#[reducer(init)]
pub fn init(ctx: &ReducerContext) -> Result<(), String> {
    let presets = presets()?;
    log::info!(
        "Initializing fireplace module with {} presets",
        presets.len()
    );

    if ctx.db.weather().id().find(0).is_none() {
        ctx.db.weather().insert(Weather {
            id: 0,
            wind_intensity: 0.0,
            precipitation: false,
        });
    }
    if ctx.db.fireplace_update_schedule().iter().count() == 0 {
        ctx.db
            .fireplace_update_schedule()
            .insert(FireplaceUpdateSchedule {
                id: 0,
                scheduled_at: every(cadence::FUEL_UPDATE_INTERVAL),
            });
    }
    if ctx.db.environment_check_schedule().iter().count() == 0 {
        ctx.db
            .environment_check_schedule()
            .insert(EnvironmentCheckSchedule {
                id: 0,
                scheduled_at: every(cadence::ENVIRONMENT_CHECK_INTERVAL),
            });
    }
    Ok(())
}

/// Called when a client connects
#[reducer(client_connected)]
pub fn client_connected(ctx: &ReducerContext) {
    log::info!("Client connected: {:?}", ctx.sender);
    if ctx.db.connected_player().identity().find(ctx.sender).is_none() {
        ctx.db.connected_player().insert(ConnectedPlayer {
            identity: ctx.sender,
            participant_id: 0,
            connected_at: ctx.timestamp,
        });
    }
}

/// Called when a client disconnects. Fires it owned become unowned.
#[reducer(client_disconnected)]
pub fn client_disconnected(ctx: &ReducerContext) {
    log::info!("Client disconnected: {:?}", ctx.sender);
    let owned: Vec<PlacedFireplace> = ctx
        .db
        .fireplace()
        .iter()
        .filter(|f| f.owner == Some(ctx.sender))
        .collect();
    for mut row in owned {
        log::debug!("Releasing fireplace {} held by {:?}", row.id, ctx.sender);
        row.owner = None;
        ctx.db.fireplace().id().update(row);
    }
    ctx.db.connected_player().identity().delete(ctx.sender);
}

// ============================================================================
// PLACEMENT
// ============================================================================

/// Place a fireplace of the given preset. The placer owns it.
#[reducer]
pub fn place_fireplace(
    ctx: &ReducerContext,
    preset: String,
    x: f32,
    y: f32,
    z: f32,
) -> Result<(), String> {
    let config = preset_config(&presets()?, &preset)?;
    let mut fire = Fireplace::new(
        config,
        Vec3::new(x, y, z),
        ObjectStore::new(),
        Authority::Owner,
    );
    fire.place();

    let row = ctx.db.fireplace().insert(PlacedFireplace {
        id: 0,
        preset,
        x,
        y,
        z,
        fuel: fire.fuel(),
        last_time: ReducerClock(ctx.timestamp).now_ticks(),
        owner: Some(ctx.sender),
        placed_by: ctx.sender,
        placed_at: ctx.timestamp,
        blocked: false,
        wet: false,
        flame_enabled: false,
        flame_high: false,
        flame_low: false,
        last_use: None,
    });
    log::info!(
        "{:?} placed {} fireplace {} at ({}, {}, {})",
        ctx.sender,
        row.preset,
        row.id,
        x,
        y,
        z
    );

    let probe = probe_for(ctx, row.id);
    store_fire(ctx, row, &mut fire, &probe);
    Ok(())
}

/// Deconstruct a fireplace. Refused while it burns.
#[reducer]
pub fn remove_fireplace(ctx: &ReducerContext, fireplace_id: u64) -> Result<(), String> {
    let row = find_fireplace(ctx, fireplace_id)?;
    let probe = probe_for(ctx, row.id);
    let fire = load_fire(&presets()?, &row)?;
    if !fire.can_be_removed(&probe) {
        return Err(format!("Fireplace {} is burning", fireplace_id));
    }

    ctx.db.fireplace().id().delete(fireplace_id);
    ctx.db.fireplace_site().fireplace_id().delete(fireplace_id);
    let effects: Vec<u64> = ctx
        .db
        .fire_effect()
        .iter()
        .filter(|e| e.fireplace_id == fireplace_id)
        .map(|e| e.id)
        .collect();
    for id in effects {
        ctx.db.fire_effect().id().delete(id);
    }
    log::info!("{:?} removed fireplace {}", ctx.sender, fireplace_id);
    Ok(())
}

// ============================================================================
// WORLD INPUT
// ============================================================================

/// Latest physics sample around a fireplace, reported by a nearby client.
#[reducer]
#[allow(clippy::too_many_arguments)]
pub fn report_site(
    ctx: &ReducerContext,
    fireplace_id: u64,
    terrain_height: Option<f32>,
    ceiling_height: Option<f32>,
    smoke_blocked: bool,
    cover_percentage: f32,
    under_roof: bool,
    liquid_level: Option<f32>,
) -> Result<(), String> {
    find_fireplace(ctx, fireplace_id)?;
    let site = FireplaceSite {
        fireplace_id,
        terrain_height,
        ceiling_height,
        smoke_blocked,
        cover_percentage: cover_percentage.clamp(0.0, 1.0),
        under_roof,
        liquid_level,
    };
    if ctx.db.fireplace_site().fireplace_id().find(fireplace_id).is_some() {
        ctx.db.fireplace_site().fireplace_id().update(site);
    } else {
        ctx.db.fireplace_site().insert(site);
    }
    Ok(())
}

#[reducer]
pub fn set_weather(ctx: &ReducerContext, wind_intensity: f32, precipitation: bool) {
    let weather = Weather {
        id: 0,
        wind_intensity: wind_intensity.clamp(0.0, 1.0),
        precipitation,
    };
    log::info!(
        "Weather set: wind={} precipitation={}",
        weather.wind_intensity,
        weather.precipitation
    );
    if ctx.db.weather().id().find(0).is_some() {
        ctx.db.weather().id().update(weather);
    } else {
        ctx.db.weather().insert(weather);
    }
}

/// Add items to the caller's inventory.
#[reducer]
pub fn give_item(ctx: &ReducerContext, name: String, count: u32) -> Result<(), String> {
    if count == 0 {
        return Err("Item count must be positive".to_string());
    }
    let existing = ctx
        .db
        .inventory_item()
        .owner()
        .filter(&ctx.sender)
        .find(|i| i.name == name);
    if let Some(mut stack) = existing {
        stack.count = stack.count.saturating_add(count);
        ctx.db.inventory_item().id().update(stack);
    } else {
        ctx.db.inventory_item().insert(InventoryItem {
            id: 0,
            owner: ctx.sender,
            name,
            count,
        });
    }
    Ok(())
}

// ============================================================================
// PLAYER ACTIONS
// ============================================================================

/// "Use" on a fireplace: claim it if unowned and feed one fuel item.
#[reducer]
pub fn use_fireplace(ctx: &ReducerContext, fireplace_id: u64, hold: bool) -> Result<(), String> {
    let mut row = find_fireplace(ctx, fireplace_id)?;
    let participant = participant_of(ctx, ctx.sender).ok_or("Player is not connected")?;
    let probe = probe_for(ctx, row.id);
    let fire = load_fire(&presets()?, &row)?;

    let mut ownership = row
        .owner
        .and_then(|owner| participant_of(ctx, owner))
        .map(Ownership::owned_by)
        .unwrap_or_default();
    let mut gate = HoldGate::from_last_use(row.last_use);
    let mut inventory = PlayerInventory {
        ctx,
        owner: ctx.sender,
    };
    let outcome = interaction::interact(
        &fire,
        &mut ownership,
        &mut gate,
        Actor {
            id: participant,
            inventory: Some(&mut inventory),
        },
        hold,
        ReducerClock(ctx.timestamp).now_seconds(),
        &IdentityLocalizer,
    );

    let owner = ownership.owner().and_then(|p| identity_of(ctx, p));
    if owner != row.owner {
        log::info!("{:?} claimed fireplace {}", ctx.sender, row.id);
    }
    row.owner = owner;
    row.last_use = gate.last_use();
    finish_action(ctx, row, fire, outcome, &probe);
    Ok(())
}

/// Use a specific item (fuel or fireworks) on a fireplace.
#[reducer]
pub fn use_item_on_fireplace(
    ctx: &ReducerContext,
    fireplace_id: u64,
    item: String,
) -> Result<(), String> {
    let row = find_fireplace(ctx, fireplace_id)?;
    let probe = probe_for(ctx, row.id);
    let mut fire = load_fire(&presets()?, &row)?;
    let mut inventory = PlayerInventory {
        ctx,
        owner: ctx.sender,
    };
    if !inventory.has_item(&item) {
        return Err(format!("No {} in inventory", item));
    }

    let outcome =
        interaction::use_item(&mut fire, &mut inventory, &item, &probe, &IdentityLocalizer);
    if !outcome.handled {
        return Err(format!(
            "{} cannot be used on fireplace {}",
            item, fireplace_id
        ));
    }
    finish_action(ctx, row, fire, outcome, &probe);
    Ok(())
}

// ============================================================================
// SCHEDULED REDUCERS
// ============================================================================

/// Fuel decay and visual refresh for every fireplace.
#[reducer]
pub fn update_fireplaces(
    ctx: &ReducerContext,
    _schedule: FireplaceUpdateSchedule,
) -> Result<(), String> {
    if ctx.sender != ctx.identity() {
        return Err(
            "update_fireplaces may only be invoked by the scheduler".to_string(),
        );
    }
    let now = ReducerClock(ctx.timestamp).now_ticks();
    let presets = presets()?;
    let rows: Vec<PlacedFireplace> = ctx.db.fireplace().iter().collect();
    for row in rows {
        let probe = probe_for(ctx, row.id);
        let mut fire = match load_fire(&presets, &row) {
            Ok(fire) => fire,
            Err(e) => {
                log::warn!("Skipping fireplace {}: {}", row.id, e);
                continue;
            }
        };
        fire.update(now, &probe);
        store_fire(ctx, row, &mut fire, &probe);
    }
    expire_transient(ctx);
    Ok(())
}

/// Blocked / wet checks for every fireplace.
#[reducer]
pub fn check_fireplace_environment(
    ctx: &ReducerContext,
    _schedule: EnvironmentCheckSchedule,
) -> Result<(), String> {
    if ctx.sender != ctx.identity() {
        return Err(
            "check_fireplace_environment may only be invoked by the scheduler".to_string(),
        );
    }
    let presets = presets()?;
    let rows: Vec<PlacedFireplace> = ctx.db.fireplace().iter().collect();
    for row in rows {
        let probe = probe_for(ctx, row.id);
        let mut fire = match load_fire(&presets, &row) {
            Ok(fire) => fire,
            Err(e) => {
                log::warn!("Skipping fireplace {}: {}", row.id, e);
                continue;
            }
        };
        fire.check_environment(&probe);
        store_fire(ctx, row, &mut fire, &probe);
    }
    Ok(())
}

// ============================================================================
// HELPERS
// ============================================================================

fn every(seconds: f64) -> ScheduleAt {
    ScheduleAt::Interval(TimeDuration::from_micros((seconds * 1_000_000.0) as i64))
}

fn presets() -> Result<Vec<FireplacePreset>, String> {
    load_presets(PRESETS_JSON).map_err(|e| e.to_string())
}

fn preset_config(presets: &[FireplacePreset], id: &str) -> Result<FireplaceConfig, String> {
    find_preset(presets, id)
        .map(|p| p.config.clone())
        .ok_or_else(|| format!("Unknown fireplace preset `{}`", id))
}

fn find_fireplace(ctx: &ReducerContext, fireplace_id: u64) -> Result<PlacedFireplace, String> {
    ctx.db
        .fireplace()
        .id()
        .find(fireplace_id)
        .ok_or_else(|| format!("Fireplace {} not found", fireplace_id))
}

fn participant_of(ctx: &ReducerContext, identity: Identity) -> Option<ParticipantId> {
    ctx.db
        .connected_player()
        .identity()
        .find(identity)
        .map(|p| p.participant_id)
}

fn identity_of(ctx: &ReducerContext, participant: ParticipantId) -> Option<Identity> {
    ctx.db
        .connected_player()
        .participant_id()
        .find(participant)
        .map(|p| p.identity)
}

/// Environment probe from the site sample and the weather singleton.
fn probe_for(ctx: &ReducerContext, fireplace_id: u64) -> StaticEnvironment {
    let mut env = StaticEnvironment::default();
    if let Some(weather) = ctx.db.weather().id().find(0) {
        env.wind_intensity = weather.wind_intensity;
        env.precipitation = weather.precipitation;
    }
    if let Some(site) = ctx.db.fireplace_site().fireplace_id().find(fireplace_id) {
        env.terrain_height = site.terrain_height;
        env.ceiling_height = site.ceiling_height;
        env.smoke_blocked = site.smoke_blocked;
        env.cover = CoverSample {
            percentage: site.cover_percentage,
            under_roof: site.under_roof,
        };
        env.liquid_level = site.liquid_level;
    }
    env
}

/// Rebuild the logic fireplace from its row. The module is the authority.
fn load_fire(presets: &[FireplacePreset], row: &PlacedFireplace) -> Result<Fireplace, String> {
    let config = preset_config(presets, &row.preset)?;
    let mut store = ObjectStore::new();
    store.set_float(keys::FUEL, row.fuel);
    store.set_long(keys::LAST_TIME, row.last_time);
    let mut fire = Fireplace::new(
        config,
        Vec3::new(row.x, row.y, row.z),
        store,
        Authority::Owner,
    );
    fire.set_environment(EnvironmentStatus {
        blocked: row.blocked,
        wet: row.wet,
    });
    Ok(fire)
}

/// Write the logic state back to its row and publish queued effects.
fn store_fire(
    ctx: &ReducerContext,
    mut row: PlacedFireplace,
    fire: &mut Fireplace,
    probe: &StaticEnvironment,
) {
    let visual = fire.refresh_visual(probe);
    let status = fire.environment();
    row.fuel = fire.fuel();
    row.last_time = fire.store().get_long(keys::LAST_TIME, row.last_time);
    row.blocked = status.blocked;
    row.wet = status.wet;
    row.flame_enabled = visual.enabled;
    row.flame_high = visual.high;
    row.flame_low = visual.low;

    for effect in fire.drain_effects() {
        let kind = match effect {
            FireEffect::FuelAdded => effect_kinds::FUEL_ADDED,
            FireEffect::Fireworks => effect_kinds::FIREWORKS,
        };
        ctx.db.fire_effect().insert(FireEffectEvent {
            id: 0,
            fireplace_id: row.id,
            kind: kind.to_string(),
            created_at: ctx.timestamp,
        });
    }
    ctx.db.fireplace().id().update(row);
}

/// Deliver the action's message and apply its owner-bound request.
fn finish_action(
    ctx: &ReducerContext,
    row: PlacedFireplace,
    mut fire: Fireplace,
    outcome: ActionOutcome,
    probe: &StaticEnvironment,
) {
    if let Some(text) = outcome.message {
        ctx.db.hud_message().insert(HudMessage {
            id: 0,
            recipient: ctx.sender,
            text,
            created_at: ctx.timestamp,
        });
    }
    if let Some(request) = outcome.request {
        apply_request(&mut fire, request, row.id);
    }
    store_fire(ctx, row, &mut fire, probe);
}

fn apply_request(fire: &mut Fireplace, request: FireplaceRequest, fireplace_id: u64) {
    match request {
        FireplaceRequest::AddFuel => match fire.add_fuel() {
            AddFuelOutcome::Added { fuel } => {
                log::info!("Fireplace {} fuel now {}", fireplace_id, fuel);
            }
            outcome => {
                log::debug!(
                    "AddFuel on fireplace {} not applied: {:?}",
                    fireplace_id,
                    outcome
                );
            }
        },
    }
}

fn expire_transient(ctx: &ReducerContext) {
    let cutoff = ctx.timestamp.to_micros_since_unix_epoch() - TRANSIENT_RETENTION_MICROS;
    let effects: Vec<u64> = ctx
        .db
        .fire_effect()
        .iter()
        .filter(|e| e.created_at.to_micros_since_unix_epoch() < cutoff)
        .map(|e| e.id)
        .collect();
    for id in effects {
        ctx.db.fire_effect().id().delete(id);
    }
    let messages: Vec<u64> = ctx
        .db
        .hud_message()
        .iter()
        .filter(|m| m.created_at.to_micros_since_unix_epoch() < cutoff)
        .map(|m| m.id)
        .collect();
    for id in messages {
        ctx.db.hud_message().id().delete(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(preset: &str, fuel: f32) -> PlacedFireplace {
        PlacedFireplace {
            id: 1,
            preset: preset.to_string(),
            x: 0.0,
            y: 0.0,
            z: 0.0,
            fuel,
            last_time: 0,
            owner: None,
            placed_by: Identity::ZERO,
            placed_at: Timestamp::UNIX_EPOCH,
            blocked: false,
            wet: false,
            flame_enabled: false,
            flame_high: false,
            flame_low: false,
            last_use: None,
        }
    }

    #[test]
    fn test_bundled_presets_resolve() {
        let presets = presets().unwrap();
        assert_eq!(preset_config(&presets, "brazier").unwrap().max_fuel, 5.0);
        assert!(preset_config(&presets, "forge").is_err());
    }

    #[test]
    fn test_load_fire_reads_from_parsed_presets() {
        let presets = presets().unwrap();
        let fire = load_fire(&presets, &row("bonfire", 12.0)).unwrap();
        assert_eq!(fire.fuel(), 12.0);
        assert_eq!(fire.config().max_fuel, 40.0);

        // Only the list handed in is consulted.
        assert!(load_fire(&[], &row("bonfire", 12.0)).is_err());
    }
}
