//! Fireplace fuel state machine.
//!
//! Fuel burns down with real elapsed time and is topped up one unit at a
//! time by players. Only the authoritative owner advances or mutates the
//! fuel; everyone else renders from the replicated [`ObjectStore`].
//!
//! Two periodic tasks drive a fireplace (see [`crate::scheduler`]):
//!
//! | Task | Cadence | Work |
//! |------|---------|------|
//! | update | every 2 s from spawn | owner: [`Fireplace::advance`]; all: visual refresh |
//! | environment | every 4 s after 4 s | [`Fireplace::check_environment`] |
//!
//! ```
//! use hearth_logic::config::FireplaceConfig;
//! use hearth_logic::environment::{StaticEnvironment, Vec3};
//! use hearth_logic::fireplace::{Authority, Fireplace};
//! use hearth_logic::store::ObjectStore;
//!
//! let mut fire = Fireplace::new(
//!     FireplaceConfig::default(),
//!     Vec3::default(),
//!     ObjectStore::new(),
//!     Authority::Owner,
//! );
//! fire.place();
//! assert!(fire.is_burning(&StaticEnvironment::default()));
//! ```

use serde::{Deserialize, Serialize};

use crate::clock::{ticks_to_seconds, Ticks};
use crate::config::FireplaceConfig;
use crate::constants::keys;
use crate::environment::{self, EnvironmentProbe, EnvironmentStatus, Vec3};
use crate::store::ObjectStore;
use crate::visual::{select_visual, FlameVisual};

/// Whether this participant may mutate the fireplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Authority {
    Owner,
    Replica,
}

impl Authority {
    pub fn is_owner(self) -> bool {
        self == Authority::Owner
    }
}

/// Typed view of the persisted fuel fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuelState {
    /// Always within `[0, max_fuel]`.
    pub fuel: f32,
    /// Tick of the last decay update.
    pub last_update: Ticks,
    pub authority: Authority,
}

impl FuelState {
    /// Read from a store. A missing `lastTime` reads as `now`, so the first
    /// update after placement never charges for time before it existed.
    pub fn read(store: &ObjectStore, authority: Authority, now: Ticks) -> Self {
        Self {
            fuel: store.get_float(keys::FUEL, 0.0),
            last_update: store.get_long(keys::LAST_TIME, now),
            authority,
        }
    }

    pub fn write(&self, store: &mut ObjectStore) {
        store.set_float(keys::FUEL, self.fuel);
        store.set_long(keys::LAST_TIME, self.last_update);
    }
}

/// Side effects the host should play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FireEffect {
    /// Particles and sound for fuel going in.
    FuelAdded,
    /// Spawn a fireworks object at the fireplace.
    Fireworks,
}

/// Result of [`Fireplace::add_fuel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AddFuelOutcome {
    Added { fuel: f32 },
    /// `ceil(fuel)` already at capacity; nothing changed.
    Full,
    /// Called on a replica; nothing changed.
    NotOwner,
}

impl AddFuelOutcome {
    pub fn added(self) -> bool {
        matches!(self, AddFuelOutcome::Added { .. })
    }
}

/// One fireplace instance as seen by one participant.
#[derive(Debug, Clone)]
pub struct Fireplace {
    config: FireplaceConfig,
    position: Vec3,
    store: ObjectStore,
    authority: Authority,
    environment: EnvironmentStatus,
    visual: FlameVisual,
    effects: Vec<FireEffect>,
}

impl Fireplace {
    pub fn new(
        config: FireplaceConfig,
        position: Vec3,
        store: ObjectStore,
        authority: Authority,
    ) -> Self {
        Self {
            config,
            position,
            store,
            authority,
            environment: EnvironmentStatus::default(),
            visual: FlameVisual::OFF,
            effects: Vec::new(),
        }
    }

    /// Seed a freshly placed fireplace with its starting fuel.
    ///
    /// Only the owner writes, and only when no fuel has ever been stored.
    /// Returns whether the store was initialized.
    pub fn place(&mut self) -> bool {
        if !self.authority.is_owner() || self.store.contains(keys::FUEL) {
            return false;
        }
        self.store.set_float(keys::FUEL, self.config.start_fuel);
        if self.config.start_fuel > 0.0 {
            self.effects.push(FireEffect::FuelAdded);
        }
        log::debug!(
            "Placed {} with {} fuel",
            self.config.name,
            self.config.start_fuel
        );
        true
    }

    pub fn config(&self) -> &FireplaceConfig {
        &self.config
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Where the flame sits; checked against the liquid surface.
    pub fn emitter_position(&self) -> Vec3 {
        self.position.up(self.config.emitter_height)
    }

    pub fn authority(&self) -> Authority {
        self.authority
    }

    pub fn set_authority(&mut self, authority: Authority) {
        self.authority = authority;
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    /// Replace the local copy with a replicated one.
    pub fn replace_store(&mut self, store: ObjectStore) {
        self.store = store;
    }

    pub fn fuel(&self) -> f32 {
        self.store.get_float(keys::FUEL, 0.0)
    }

    pub fn fuel_state(&self, now: Ticks) -> FuelState {
        FuelState::read(&self.store, self.authority, now)
    }

    pub fn environment(&self) -> EnvironmentStatus {
        self.environment
    }

    /// Restore environment flags computed elsewhere (e.g. a persisted row).
    pub fn set_environment(&mut self, status: EnvironmentStatus) {
        self.environment = status;
    }

    pub fn visual(&self) -> FlameVisual {
        self.visual
    }

    /// Whether the fire is alight right now.
    ///
    /// Uses the cached blocked flag from the last environment check and a
    /// fresh liquid-level query.
    pub fn is_burning(&self, probe: &impl EnvironmentProbe) -> bool {
        if self.environment.blocked {
            return false;
        }
        let emitter = self.emitter_position();
        if let Some(level) = probe.liquid_level(emitter) {
            if emitter.y < level {
                return false;
            }
        }
        self.fuel() > 0.0
    }

    /// Burn fuel for the time elapsed since the last update.
    ///
    /// Owner only; replicas get the current fuel back untouched. The
    /// timestamp is always moved to `now`, burning or not, so idle time is
    /// never charged later.
    pub fn advance(&mut self, now: Ticks, probe: &impl EnvironmentProbe) -> f32 {
        if !self.authority.is_owner() {
            return self.fuel();
        }

        let mut state = self.fuel_state(now);
        let elapsed = ticks_to_seconds(now - state.last_update).max(0.0);
        state.last_update = now;

        if self.is_burning(probe) {
            let burned = (elapsed / self.config.sec_per_fuel as f64) as f32;
            state.fuel = (state.fuel - burned).max(0.0);
            if state.fuel == 0.0 && burned > 0.0 {
                log::debug!("{} burned out", self.config.name);
            }
        }

        state.write(&mut self.store);
        state.fuel
    }

    /// Add one unit of fuel. Owner only.
    pub fn add_fuel(&mut self) -> AddFuelOutcome {
        if !self.authority.is_owner() {
            return AddFuelOutcome::NotOwner;
        }
        let fuel = self.fuel();
        if self.is_full_at(fuel) {
            return AddFuelOutcome::Full;
        }

        let max = self.config.max_fuel;
        let fuel = (fuel.clamp(0.0, max) + 1.0).clamp(0.0, max);
        self.store.set_float(keys::FUEL, fuel);
        self.effects.push(FireEffect::FuelAdded);
        log::debug!("Added fuel to {}: {}/{}", self.config.name, fuel, max);
        AddFuelOutcome::Added { fuel }
    }

    /// Whether another unit would be refused.
    pub fn is_full(&self) -> bool {
        self.is_full_at(self.fuel())
    }

    fn is_full_at(&self, fuel: f32) -> bool {
        fuel.ceil() >= self.config.max_fuel
    }

    /// Re-run the blocked and wet checks.
    pub fn check_environment(&mut self, probe: &impl EnvironmentProbe) -> EnvironmentStatus {
        let status = environment::check_environment(
            probe,
            self.position,
            &self.config,
            self.environment.wet,
        );
        if status != self.environment {
            log::debug!(
                "{} environment changed: blocked={} wet={}",
                self.config.name,
                status.blocked,
                status.wet
            );
        }
        self.environment = status;
        status
    }

    /// Recompute the flame visual from the current state.
    pub fn refresh_visual(&mut self, probe: &impl EnvironmentProbe) -> FlameVisual {
        self.visual = select_visual(
            self.is_burning(probe),
            self.environment.wet,
            self.config.has_flame_variants,
        );
        self.visual
    }

    /// The periodic update: advance fuel if owner, then refresh visuals.
    pub fn update(&mut self, now: Ticks, probe: &impl EnvironmentProbe) -> FlameVisual {
        if self.authority.is_owner() {
            self.advance(now, probe);
        }
        self.refresh_visual(probe)
    }

    /// A burning fire cannot be deconstructed.
    pub fn can_be_removed(&self, probe: &impl EnvironmentProbe) -> bool {
        !self.is_burning(probe)
    }

    pub(crate) fn push_effect(&mut self, effect: FireEffect) {
        self.effects.push(effect);
    }

    /// Take all effects queued since the last drain.
    pub fn drain_effects(&mut self) -> Vec<FireEffect> {
        std::mem::take(&mut self.effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::seconds_to_ticks;
    use crate::environment::StaticEnvironment;

    fn owner_fire(fuel: f32) -> Fireplace {
        let mut store = ObjectStore::new();
        store.set_float(keys::FUEL, fuel);
        store.set_long(keys::LAST_TIME, 0);
        Fireplace::new(
            FireplaceConfig::default(),
            Vec3::default(),
            store,
            Authority::Owner,
        )
    }

    fn open_air() -> StaticEnvironment {
        StaticEnvironment::default()
    }

    #[test]
    fn test_place_initializes_once() {
        let mut fire = Fireplace::new(
            FireplaceConfig::default(),
            Vec3::default(),
            ObjectStore::new(),
            Authority::Owner,
        );
        assert!(fire.place());
        assert_eq!(fire.fuel(), 3.0);
        assert_eq!(fire.drain_effects(), vec![FireEffect::FuelAdded]);

        fire.add_fuel();
        assert!(!fire.place());
        assert_eq!(fire.fuel(), 4.0);
    }

    #[test]
    fn test_place_without_start_fuel_is_silent() {
        let config = FireplaceConfig {
            start_fuel: 0.0,
            ..Default::default()
        };
        let mut fire = Fireplace::new(
            config,
            Vec3::default(),
            ObjectStore::new(),
            Authority::Owner,
        );
        assert!(fire.place());
        assert!(fire.drain_effects().is_empty());
        assert!(fire.store().contains(keys::FUEL));
    }

    #[test]
    fn test_replica_never_places() {
        let mut fire = Fireplace::new(
            FireplaceConfig::default(),
            Vec3::default(),
            ObjectStore::new(),
            Authority::Replica,
        );
        assert!(!fire.place());
        assert_eq!(fire.store().revision(), 0);
    }

    #[test]
    fn test_advance_burns_by_elapsed_time() {
        let mut fire = owner_fire(3.0);
        let fuel = fire.advance(seconds_to_ticks(6.0), &open_air());
        assert!((fuel - 1.0).abs() < 1e-6);
        assert_eq!(fire.fuel_state(0).last_update, seconds_to_ticks(6.0));
    }

    #[test]
    fn test_advance_clamps_at_zero() {
        let mut fire = owner_fire(1.0);
        let fuel = fire.advance(seconds_to_ticks(600.0), &open_air());
        assert_eq!(fuel, 0.0);
        assert!(!fire.is_burning(&open_air()));
    }

    #[test]
    fn test_advance_same_timestamp_is_idempotent() {
        let mut fire = owner_fire(5.0);
        let now = seconds_to_ticks(3.0);
        let first = fire.advance(now, &open_air());
        let second = fire.advance(now, &open_air());
        assert_eq!(first, second);
        assert!((first - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_advance_tolerates_clock_skew() {
        let mut fire = owner_fire(5.0);
        fire.advance(seconds_to_ticks(10.0), &open_air());
        let before = fire.fuel();
        // Clock jumps backwards: no negative elapsed, no fuel gain.
        let after = fire.advance(seconds_to_ticks(4.0), &open_air());
        assert_eq!(before, after);
        assert_eq!(fire.fuel_state(0).last_update, seconds_to_ticks(4.0));
    }

    #[test]
    fn test_idle_time_not_charged_later() {
        let mut fire = owner_fire(5.0);
        fire.set_environment(EnvironmentStatus {
            blocked: true,
            wet: false,
        });
        fire.advance(seconds_to_ticks(30.0), &open_air());
        assert_eq!(fire.fuel(), 5.0);

        fire.set_environment(EnvironmentStatus::default());
        let fuel = fire.advance(seconds_to_ticks(33.0), &open_air());
        assert!((fuel - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_replica_advance_is_noop() {
        let mut fire = owner_fire(3.0);
        fire.set_authority(Authority::Replica);
        let rev = fire.store().revision();
        assert_eq!(fire.advance(seconds_to_ticks(6.0), &open_air()), 3.0);
        assert_eq!(fire.store().revision(), rev);
    }

    #[test]
    fn test_blocked_never_burns() {
        let mut fire = owner_fire(8.0);
        fire.set_environment(EnvironmentStatus {
            blocked: true,
            wet: false,
        });
        assert!(!fire.is_burning(&open_air()));
        assert!(fire.can_be_removed(&open_air()));
    }

    #[test]
    fn test_submerged_never_burns() {
        let fire = owner_fire(8.0);
        let flooded = StaticEnvironment {
            liquid_level: Some(1.0),
            ..Default::default()
        };
        assert!(!fire.is_burning(&flooded));
        let shallow = StaticEnvironment {
            liquid_level: Some(0.1),
            ..Default::default()
        };
        assert!(fire.is_burning(&shallow));
        assert!(!fire.can_be_removed(&shallow));
    }

    #[test]
    fn test_no_fuel_not_burning() {
        let fire = owner_fire(0.0);
        let dry_land = StaticEnvironment {
            liquid_level: Some(-5.0),
            ..Default::default()
        };
        assert!(!fire.is_burning(&dry_land));
    }

    #[test]
    fn test_add_fuel_increments_one_unit() {
        let mut fire = owner_fire(3.0);
        assert_eq!(fire.add_fuel(), AddFuelOutcome::Added { fuel: 4.0 });
        assert_eq!(fire.drain_effects(), vec![FireEffect::FuelAdded]);
    }

    #[test]
    fn test_add_fuel_refused_when_ceil_reaches_max() {
        let mut fire = owner_fire(9.5);
        assert_eq!(fire.add_fuel(), AddFuelOutcome::Full);
        assert_eq!(fire.fuel(), 9.5);
        assert_eq!(fire.add_fuel(), AddFuelOutcome::Full);
        assert_eq!(fire.fuel(), 9.5);
        assert!(fire.drain_effects().is_empty());
    }

    #[test]
    fn test_add_fuel_clamps_to_max() {
        let mut fire = owner_fire(8.5);
        assert_eq!(fire.add_fuel(), AddFuelOutcome::Added { fuel: 9.5 });
        let mut fire = owner_fire(-2.0);
        assert_eq!(fire.add_fuel(), AddFuelOutcome::Added { fuel: 1.0 });
    }

    #[test]
    fn test_add_fuel_on_replica_refused() {
        let mut fire = owner_fire(3.0);
        fire.set_authority(Authority::Replica);
        assert_eq!(fire.add_fuel(), AddFuelOutcome::NotOwner);
        assert_eq!(fire.fuel(), 3.0);
    }

    #[test]
    fn test_update_refreshes_visual() {
        let mut fire = owner_fire(3.0);
        let rainy = StaticEnvironment {
            precipitation: true,
            ..Default::default()
        };
        fire.check_environment(&rainy);
        let visual = fire.update(seconds_to_ticks(2.0), &rainy);
        assert!(visual.enabled && visual.low && !visual.high);

        let visual = fire.update(seconds_to_ticks(100.0), &rainy);
        assert_eq!(visual, FlameVisual::OFF);
    }

    #[test]
    fn test_check_environment_sets_blocked() {
        let mut fire = owner_fire(3.0);
        let buried = StaticEnvironment {
            terrain_height: Some(2.0),
            ..Default::default()
        };
        assert!(fire.check_environment(&buried).blocked);
        assert!(!fire.is_burning(&buried));
    }
}
