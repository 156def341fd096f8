//! Player actions on a fireplace and its hover text.
//!
//! "Use" feeds one fuel item from the player's inventory; "use item"
//! handles a specific hotbar item (fuel, or a firework thrown into a
//! burning fire). Refusals are ordinary outcomes carrying a HUD message,
//! never errors. Fuel changes are not applied here: the action yields a
//! [`FireplaceRequest`] that must reach the owner.

use std::collections::BTreeMap;

use crate::constants::{hover, messages};
use crate::environment::EnvironmentProbe;
use crate::fireplace::{FireEffect, Fireplace};
use crate::replication::{FireplaceRequest, Ownership, ParticipantId};

/// Item storage of the acting player.
pub trait Inventory {
    fn count_items(&self, name: &str) -> u32;

    fn has_item(&self, name: &str) -> bool {
        self.count_items(name) > 0
    }

    /// Remove up to `amount` items named `name`.
    fn remove_items(&mut self, name: &str, amount: u32);
}

/// Item counts by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemCounts {
    counts: BTreeMap<String, u32>,
}

impl ItemCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, amount: u32) -> Self {
        self.add(name, amount);
        self
    }

    pub fn add(&mut self, name: &str, amount: u32) {
        *self.counts.entry(name.to_string()).or_insert(0) += amount;
    }
}

impl Inventory for ItemCounts {
    fn count_items(&self, name: &str) -> u32 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    fn remove_items(&mut self, name: &str, amount: u32) {
        if let Some(count) = self.counts.get_mut(name) {
            *count = count.saturating_sub(amount);
            if *count == 0 {
                self.counts.remove(name);
            }
        }
    }
}

/// Turns `$keys` into display text.
pub trait Localizer {
    fn localize(&self, text: &str) -> String;

    /// Localize `key` with one substituted argument.
    fn localize_with(&self, key: &str, arg: &str) -> String {
        format!("{} {}", self.localize(key), self.localize(arg))
    }
}

/// Leaves keys untouched. Used when no string table is loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityLocalizer;

impl Localizer for IdentityLocalizer {
    fn localize(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Rate limit for held "use".
#[derive(Debug, Clone, Copy, Default)]
pub struct HoldGate {
    last_use: Option<f64>,
}

impl HoldGate {
    /// Restore a gate from a persisted last-use time.
    pub fn from_last_use(last_use: Option<f64>) -> Self {
        Self { last_use }
    }

    pub fn last_use(&self) -> Option<f64> {
        self.last_use
    }

    fn allows(&self, hold: bool, now_seconds: f64, interval: f32) -> bool {
        if !hold {
            return true;
        }
        if interval <= 0.0 {
            return false;
        }
        match self.last_use {
            Some(last) => now_seconds - last >= interval as f64,
            None => true,
        }
    }

    fn record(&mut self, now_seconds: f64) {
        self.last_use = Some(now_seconds);
    }
}

/// What an action did.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionOutcome {
    /// Whether the action was consumed by the fireplace.
    pub handled: bool,
    /// Transient center-screen message for the actor.
    pub message: Option<String>,
    /// Request to deliver to the owner.
    pub request: Option<FireplaceRequest>,
}

impl ActionOutcome {
    fn handled(message: String) -> Self {
        Self {
            handled: true,
            message: Some(message),
            request: None,
        }
    }

    fn refused(message: String) -> Self {
        Self {
            handled: false,
            message: Some(message),
            request: None,
        }
    }

    fn add_fuel(message: String) -> Self {
        Self {
            handled: true,
            message: Some(message),
            request: Some(FireplaceRequest::AddFuel),
        }
    }
}

/// The acting player.
pub struct Actor<'a> {
    pub id: ParticipantId,
    /// `None` for actors without an inventory (e.g. creatures).
    pub inventory: Option<&'a mut dyn Inventory>,
}

/// "Use" on a fireplace.
///
/// Claims ownership for the actor if nobody owns the fireplace, then tries
/// to feed one fuel item.
pub fn interact(
    fire: &Fireplace,
    ownership: &mut Ownership,
    gate: &mut HoldGate,
    actor: Actor<'_>,
    hold: bool,
    now_seconds: f64,
    localizer: &impl Localizer,
) -> ActionOutcome {
    let config = fire.config();
    if !gate.allows(hold, now_seconds, config.hold_repeat_interval) {
        return ActionOutcome::default();
    }

    if !ownership.has_owner() {
        ownership.claim_if_unowned(actor.id);
    }

    let Some(inventory) = actor.inventory else {
        return ActionOutcome {
            handled: true,
            ..Default::default()
        };
    };

    let fuel_item = config.fuel_item.as_str();
    if !inventory.has_item(fuel_item) {
        return ActionOutcome::refused(format!("{} {}", messages::OUT_OF, fuel_item));
    }
    if fire.is_full() {
        return ActionOutcome::refused(
            localizer.localize_with(messages::CANT_ADD_MORE, fuel_item),
        );
    }

    inventory.remove_items(fuel_item, 1);
    gate.record(now_seconds);
    ActionOutcome::add_fuel(localizer.localize_with(messages::FIRE_ADDING, fuel_item))
}

/// "Use item" on a fireplace with a specific item.
pub fn use_item(
    fire: &mut Fireplace,
    inventory: &mut dyn Inventory,
    item: &str,
    probe: &impl EnvironmentProbe,
    localizer: &impl Localizer,
) -> ActionOutcome {
    let config = fire.config();

    if item == config.fuel_item {
        if !inventory.has_item(item) {
            return ActionOutcome::refused(format!("{} {}", messages::OUT_OF, item));
        }
        if fire.is_full() {
            return ActionOutcome::handled(
                localizer.localize_with(messages::CANT_ADD_MORE, item),
            );
        }
        inventory.remove_items(item, 1);
        return ActionOutcome::add_fuel(
            localizer.localize_with(messages::FIRE_ADDING, item),
        );
    }

    if config.firework_item.as_deref() == Some(item) {
        let needed = config.firework_items;
        if !fire.is_burning(probe) {
            return ActionOutcome::handled(messages::FIRE_NOT_BURNING.to_string());
        }
        if inventory.count_items(item) < needed {
            return ActionOutcome::handled(format!("{} {}", messages::TOO_FEW, item));
        }
        inventory.remove_items(item, needed);
        fire.push_effect(FireEffect::Fireworks);
        fire.push_effect(FireEffect::FuelAdded);
        log::debug!("Fireworks thrown into {}", fire.config().name);
        return ActionOutcome::handled(
            localizer.localize_with(messages::THROW_IN_FIRE, item),
        );
    }

    ActionOutcome::default()
}

/// Hover label: name, fuel gauge, and key hints.
pub fn hover_text(fire: &Fireplace, localizer: &impl Localizer) -> String {
    let config = fire.config();
    localizer.localize(&format!(
        "{} ( {} {}/{} )\n[<color=yellow><b>{}</b></color>] {} {}\n[<color=yellow><b>1-8</b></color>] {}",
        config.name,
        hover::FIRE_FUEL,
        fire.fuel().ceil(),
        config.max_fuel as i32,
        hover::KEY_USE,
        hover::USE,
        config.fuel_item,
        hover::USE_ITEM,
    ))
}

pub fn hover_name(fire: &Fireplace) -> &str {
    &fire.config().name
}
