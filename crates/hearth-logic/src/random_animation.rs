//! Randomized animator parameters.
//!
//! Idle fidgets, flickering torches and the like pick a random variant
//! every few seconds. The owner rolls and writes `RA_<name>` to the
//! object store; replicas adopt whatever is stored, so every participant
//! plays the same variant. Float-mode parameters cross-fade one weight per
//! variant (`<name>0`, `<name>1`, ...) instead of setting an integer.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::keys;
use crate::store::ObjectStore;

/// One randomized parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomValue {
    pub name: String,
    /// Number of variants; rolls land in `0..values`.
    pub values: u32,
    /// Seconds between rolls.
    pub interval: f32,
    /// Cross-fade per-variant float weights instead of an integer.
    pub float_value: bool,
    /// Seconds for a weight to travel from 0 to 1.
    pub float_transition: f32,
}

impl RandomValue {
    pub fn integer(name: &str, values: u32, interval: f32) -> Self {
        Self {
            name: name.to_string(),
            values,
            interval,
            float_value: false,
            float_transition: 1.0,
        }
    }

    pub fn float(name: &str, values: u32, interval: f32, transition: f32) -> Self {
        Self {
            name: name.to_string(),
            values,
            interval,
            float_value: true,
            float_transition: transition,
        }
    }

    fn store_key(&self) -> String {
        format!("{}{}", keys::RANDOM_ANIMATION_PREFIX, self.name)
    }
}

/// Receives parameter writes. Implemented by the host's animator.
pub trait Animator {
    fn set_integer(&mut self, name: &str, value: i32);
    fn set_float(&mut self, name: &str, value: f32);
}

/// Animator that just remembers the last written values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterMap {
    pub integers: std::collections::BTreeMap<String, i32>,
    pub floats: std::collections::BTreeMap<String, f32>,
}

impl Animator for ParameterMap {
    fn set_integer(&mut self, name: &str, value: i32) {
        self.integers.insert(name.to_string(), value);
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.floats.insert(name.to_string(), value);
    }
}

/// How this instance takes part in replication.
pub enum SyncMode<'a> {
    /// Not networked: roll locally, store nothing.
    Local,
    /// Roll and publish.
    Owner(&'a mut ObjectStore),
    /// Follow the published values.
    Replica(&'a ObjectStore),
}

#[derive(Debug, Clone, Default)]
struct ValueState {
    timer: f32,
    value: i32,
    weights: Vec<f32>,
}

/// Driver for a set of random parameters on one object.
#[derive(Debug, Clone)]
pub struct RandomAnimation {
    values: Vec<RandomValue>,
    states: Vec<ValueState>,
}

impl RandomAnimation {
    pub fn new(values: Vec<RandomValue>) -> Self {
        let states = vec![ValueState::default(); values.len()];
        Self { values, states }
    }

    /// Current variant of parameter `index`.
    pub fn value(&self, index: usize) -> Option<i32> {
        self.states.get(index).map(|s| s.value)
    }

    /// Current cross-fade weights of parameter `index` (float mode only).
    pub fn weights(&self, index: usize) -> Option<&[f32]> {
        self.states.get(index).map(|s| s.weights.as_slice())
    }

    /// One fixed-timestep update.
    pub fn fixed_update(
        &mut self,
        dt: f32,
        mut sync: SyncMode<'_>,
        rng: &mut impl Rng,
        animator: &mut impl Animator,
    ) {
        for (param, state) in self.values.iter().zip(self.states.iter_mut()) {
            match &mut sync {
                SyncMode::Replica(store) => {
                    let stored = store.get_int(&param.store_key(), 0);
                    if stored != state.value {
                        state.value = stored;
                        if !param.float_value {
                            animator.set_integer(&param.name, state.value);
                        }
                    }
                }
                rolling => {
                    state.timer += dt;
                    if state.timer > param.interval {
                        state.timer = 0.0;
                        state.value = roll(rng, param.values);
                        if let SyncMode::Owner(store) = rolling {
                            store.set_int(&param.store_key(), state.value);
                        }
                        if !param.float_value {
                            animator.set_integer(&param.name, state.value);
                        }
                    }
                }
            }

            if param.float_value {
                blend_weights(param, state, dt, animator);
            }
        }
    }
}

fn roll(rng: &mut impl Rng, values: u32) -> i32 {
    if values == 0 {
        return 0;
    }
    rng.gen_range(0..values) as i32
}

fn blend_weights(
    param: &RandomValue,
    state: &mut ValueState,
    dt: f32,
    animator: &mut impl Animator,
) {
    let count = param.values as usize;
    if state.weights.len() != count {
        state.weights = vec![0.0; count];
    }
    let step = if param.float_transition > 0.0 {
        dt / param.float_transition
    } else {
        f32::INFINITY
    };
    for (k, weight) in state.weights.iter_mut().enumerate() {
        let target = if k as i32 == state.value { 1.0 } else { 0.0 };
        *weight = move_towards(*weight, target, step);
        animator.set_float(&format!("{}{}", param.name, k), *weight);
    }
}

/// Move `current` toward `target` by at most `max_delta`.
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}
