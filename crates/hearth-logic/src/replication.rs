//! Authoritative-owner replication, decoupled from any transport.
//!
//! Every participant holds a [`ReplicatedFireplace`]. Exactly one of them
//! owns it: the owner advances fuel and applies requests, then publishes
//! [`FireplaceSnapshot`]s. Everyone else forwards requests through a
//! [`Mailbox`] and applies snapshots as they arrive. Requests are
//! fire-and-forget: no acknowledgement, no retry.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::clock::Ticks;
use crate::config::FireplaceConfig;
use crate::environment::{EnvironmentProbe, EnvironmentStatus, Vec3};
use crate::fireplace::{AddFuelOutcome, Authority, Fireplace};
use crate::interaction::{self, ActionOutcome, Actor, HoldGate, Inventory, Localizer};
use crate::store::ObjectStore;
use crate::visual::FlameVisual;

/// Session participant id.
pub type ParticipantId = u64;

/// Who owns an object, if anyone.
///
/// `version` goes up on every claim and release, so a participant can tell
/// a newer ownership record from a stale one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ownership {
    owner: Option<ParticipantId>,
    version: u64,
}

impl Ownership {
    pub fn owned_by(owner: ParticipantId) -> Self {
        Self {
            owner: Some(owner),
            version: 0,
        }
    }

    pub fn owner(&self) -> Option<ParticipantId> {
        self.owner
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn has_owner(&self) -> bool {
        self.owner.is_some()
    }

    pub fn is_owner(&self, participant: ParticipantId) -> bool {
        self.owner == Some(participant)
    }

    /// Take ownership if nobody holds it. Returns whether `participant` now owns it.
    pub fn claim_if_unowned(&mut self, participant: ParticipantId) -> bool {
        if self.owner.is_none() {
            self.owner = Some(participant);
            self.version += 1;
        }
        self.is_owner(participant)
    }

    /// Give up ownership. Only the current owner can release.
    pub fn release(&mut self, participant: ParticipantId) -> bool {
        if self.is_owner(participant) {
            self.owner = None;
            self.version += 1;
            true
        } else {
            false
        }
    }

    /// Whether `other` should replace this record. Higher versions win;
    /// two claims at the same version settle on the lower participant id.
    fn superseded_by(&self, other: &Ownership) -> bool {
        match other.version.cmp(&self.version) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => match (self.owner, other.owner) {
                (Some(mine), Some(theirs)) => theirs < mine,
                _ => false,
            },
        }
    }
}

/// Mutation a non-owner asks the owner to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FireplaceRequest {
    AddFuel,
}

/// A request in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub sender: ParticipantId,
    pub request: FireplaceRequest,
}

/// State the owner publishes to everyone else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireplaceSnapshot {
    pub ownership: Ownership,
    pub store: ObjectStore,
}

/// FIFO queue of outbound messages.
#[derive(Debug, Clone)]
pub struct Mailbox<T> {
    queue: VecDeque<T>,
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&mut self, message: T) {
        self.queue.push_back(message);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.queue.drain(..)
    }
}

/// One participant's view of a networked fireplace.
#[derive(Debug, Clone)]
pub struct ReplicatedFireplace {
    participant: ParticipantId,
    fire: Fireplace,
    ownership: Ownership,
    hold_gate: HoldGate,
}

impl ReplicatedFireplace {
    /// Placement by `participant`, who becomes the owner.
    pub fn place(participant: ParticipantId, config: FireplaceConfig, position: Vec3) -> Self {
        let mut replicated = Self::from_snapshot(
            participant,
            config,
            position,
            FireplaceSnapshot {
                ownership: Ownership::owned_by(participant),
                store: ObjectStore::new(),
            },
        );
        replicated.fire.place();
        replicated
    }

    /// Join an existing fireplace from its latest snapshot.
    pub fn from_snapshot(
        participant: ParticipantId,
        config: FireplaceConfig,
        position: Vec3,
        snapshot: FireplaceSnapshot,
    ) -> Self {
        let authority = authority_for(&snapshot.ownership, participant);
        Self {
            participant,
            fire: Fireplace::new(config, position, snapshot.store, authority),
            ownership: snapshot.ownership,
            hold_gate: HoldGate::default(),
        }
    }

    pub fn participant(&self) -> ParticipantId {
        self.participant
    }

    pub fn fire(&self) -> &Fireplace {
        &self.fire
    }

    pub fn fire_mut(&mut self) -> &mut Fireplace {
        &mut self.fire
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    pub fn is_owner(&self) -> bool {
        self.ownership.is_owner(self.participant)
    }

    fn sync_authority(&mut self) {
        self.fire
            .set_authority(authority_for(&self.ownership, self.participant));
    }

    pub fn claim_ownership(&mut self) -> bool {
        let claimed = self.ownership.claim_if_unowned(self.participant);
        self.sync_authority();
        claimed
    }

    pub fn release_ownership(&mut self) -> bool {
        let released = self.ownership.release(self.participant);
        self.sync_authority();
        released
    }

    /// Route a request: applied on the spot by the owner, queued otherwise.
    pub fn dispatch(
        &mut self,
        request: FireplaceRequest,
        outbox: &mut Mailbox<RequestEnvelope>,
        probe: &impl EnvironmentProbe,
    ) {
        let envelope = RequestEnvelope {
            sender: self.participant,
            request,
        };
        if self.is_owner() {
            self.handle_request(envelope, probe);
        } else {
            outbox.send(envelope);
        }
    }

    /// Apply a request. Non-owners drop it.
    pub fn handle_request(
        &mut self,
        envelope: RequestEnvelope,
        probe: &impl EnvironmentProbe,
    ) -> AddFuelOutcome {
        if !self.is_owner() {
            log::debug!(
                "Participant {} dropped request from {}: not owner",
                self.participant,
                envelope.sender
            );
            return AddFuelOutcome::NotOwner;
        }
        match envelope.request {
            FireplaceRequest::AddFuel => {
                let outcome = self.fire.add_fuel();
                if outcome.added() {
                    self.fire.refresh_visual(probe);
                }
                outcome
            }
        }
    }

    pub fn snapshot(&self) -> FireplaceSnapshot {
        FireplaceSnapshot {
            ownership: self.ownership,
            store: self.fire.store().clone(),
        }
    }

    /// Adopt a snapshot from the network. Ownership and store are each
    /// taken only when newer than the local copy.
    /// Returns whether the store was replaced.
    pub fn apply_snapshot(&mut self, snapshot: FireplaceSnapshot) -> bool {
        if self.ownership.superseded_by(&snapshot.ownership) {
            self.ownership = snapshot.ownership;
            self.sync_authority();
        }
        if snapshot.store.revision() <= self.fire.store().revision() {
            return false;
        }
        self.fire.replace_store(snapshot.store);
        true
    }

    /// "Use" by the local participant.
    pub fn interact(
        &mut self,
        inventory: Option<&mut dyn Inventory>,
        hold: bool,
        now_seconds: f64,
        localizer: &impl Localizer,
        outbox: &mut Mailbox<RequestEnvelope>,
        probe: &impl EnvironmentProbe,
    ) -> ActionOutcome {
        let actor = Actor {
            id: self.participant,
            inventory,
        };
        let outcome = interaction::interact(
            &self.fire,
            &mut self.ownership,
            &mut self.hold_gate,
            actor,
            hold,
            now_seconds,
            localizer,
        );
        self.sync_authority();
        if let Some(request) = outcome.request {
            self.dispatch(request, outbox, probe);
        }
        outcome
    }

    /// "Use item" by the local participant.
    pub fn use_item(
        &mut self,
        inventory: &mut dyn Inventory,
        item: &str,
        localizer: &impl Localizer,
        outbox: &mut Mailbox<RequestEnvelope>,
        probe: &impl EnvironmentProbe,
    ) -> ActionOutcome {
        let outcome = interaction::use_item(&mut self.fire, inventory, item, probe, localizer);
        if let Some(request) = outcome.request {
            self.dispatch(request, outbox, probe);
        }
        outcome
    }

    /// The 2 s update task.
    pub fn update(&mut self, now: Ticks, probe: &impl EnvironmentProbe) -> FlameVisual {
        self.fire.update(now, probe)
    }

    /// The 4 s environment task.
    pub fn check_environment(&mut self, probe: &impl EnvironmentProbe) -> EnvironmentStatus {
        self.fire.check_environment(probe)
    }
}

fn authority_for(ownership: &Ownership, participant: ParticipantId) -> Authority {
    if ownership.is_owner(participant) {
        Authority::Owner
    } else {
        Authority::Replica
    }
}
