//! Hearth Headless Simulation Harness
//!
//! Validates fireplace logic and preset data without SpacetimeDB.
//! Runs entirely in-process: no DB, no networking, no rendering.
//!
//! Usage:
//!   cargo run -p hearth-simtest
//!   cargo run -p hearth-simtest -- --verbose

use hearth_logic::clock::{Clock, ManualClock};
use hearth_logic::config::{find_preset, load_presets, validate_config, FireplaceConfig};
use hearth_logic::damage_text::{
    DamageModifier, DamageTextEvent, DamageTextLayer, DamageTextSettings,
};
use hearth_logic::environment::{StaticEnvironment, Vec3};
use hearth_logic::fireplace::AddFuelOutcome;
use hearth_logic::interaction::{hover_text, IdentityLocalizer, Inventory, ItemCounts};
use hearth_logic::random_animation::{ParameterMap, RandomAnimation, RandomValue, SyncMode};
use hearth_logic::replication::{Mailbox, ReplicatedFireplace};
use hearth_logic::scheduler::FireplaceDriver;
use hearth_logic::store::ObjectStore;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

// ── Presets (same JSON the server embeds) ───────────────────────────────
const PRESETS_JSON: &str = include_str!("../../../data/fireplace_presets.json");

/// Fields every preset entry must spell out, checked against the raw JSON.
#[derive(Debug, Deserialize)]
struct PresetHeader {
    id: String,
    name: String,
    fuel_item: String,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Hearth Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Preset file validation
    results.extend(validate_presets(verbose));

    // 2. Fuel decay over time
    results.extend(validate_fuel_decay(verbose));

    // 3. Adding fuel and capacity
    results.extend(validate_add_fuel(verbose));

    // 4. Blocking, submersion, weather
    results.extend(validate_environment(verbose));

    // 5. Two-participant session
    results.extend(validate_session(verbose));

    // 6. Floating damage text
    results.extend(validate_damage_text(verbose));

    // 7. Random animation sync
    results.extend(validate_random_animation(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn scenario_config() -> FireplaceConfig {
    FireplaceConfig {
        start_fuel: 3.0,
        max_fuel: 10.0,
        sec_per_fuel: 3.0,
        ..Default::default()
    }
}

// ── 1. Presets ──────────────────────────────────────────────────────────

fn validate_presets(verbose: bool) -> Vec<TestResult> {
    println!("--- Fireplace Presets ---");
    let mut results = Vec::new();

    let headers: Vec<PresetHeader> = match serde_json::from_str(PRESETS_JSON) {
        Ok(h) => h,
        Err(e) => {
            results.push(TestResult {
                name: "presets_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return results;
        }
    };
    let blank: Vec<_> = headers
        .iter()
        .filter(|h| h.name.is_empty() || h.fuel_item.is_empty())
        .map(|h| h.id.as_str())
        .collect();
    results.push(TestResult {
        name: "presets_named".into(),
        passed: blank.is_empty(),
        detail: if blank.is_empty() {
            format!("{} presets carry a name and fuel item", headers.len())
        } else {
            format!("blank name or fuel item: {:?}", blank)
        },
    });

    let presets = match load_presets(PRESETS_JSON) {
        Ok(p) => p,
        Err(e) => {
            results.push(TestResult {
                name: "presets_load".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };
    let invalid: Vec<_> = presets
        .iter()
        .filter(|p| !validate_config(&p.config).is_empty())
        .map(|p| p.id.as_str())
        .collect();
    results.push(TestResult {
        name: "presets_valid".into(),
        passed: invalid.is_empty(),
        detail: format!("{} presets, invalid: {:?}", presets.len(), invalid),
    });

    let has_campfire = find_preset(&presets, "campfire").is_some();
    results.push(TestResult {
        name: "presets_campfire".into(),
        passed: has_campfire,
        detail: format!("campfire present: {}", has_campfire),
    });

    if verbose {
        println!("  Presets:");
        for p in &presets {
            let hours = p.config.max_fuel * p.config.sec_per_fuel / 3600.0;
            println!(
                "    {:10} max {:>4} fuel, {:.1} h when full",
                p.id, p.config.max_fuel, hours
            );
        }
    }

    results
}

// ── 2. Fuel Decay ───────────────────────────────────────────────────────

fn validate_fuel_decay(verbose: bool) -> Vec<TestResult> {
    println!("--- Fuel Decay ---");
    let mut results = Vec::new();
    let env = StaticEnvironment::default();

    // 3 fuel at 3 s/fuel, 6 s burning -> 1
    let clock = ManualClock::new(0);
    let mut fire = ReplicatedFireplace::place(1, scenario_config(), Vec3::default());
    let mut driver = FireplaceDriver::new(&clock);
    driver.run(&mut fire, &clock, &env);
    clock.advance_seconds(6.0);
    driver.run(&mut fire, &clock, &env);
    let fuel = fire.fire().fuel();
    results.push(TestResult {
        name: "decay_six_seconds".into(),
        passed: (fuel - 1.0).abs() < 1e-4,
        detail: format!("fuel after 6 s = {}", fuel),
    });

    // Burns down to exactly zero, never below
    let clock = ManualClock::new(0);
    let mut fire = ReplicatedFireplace::place(1, scenario_config(), Vec3::default());
    let mut driver = FireplaceDriver::new(&clock);
    let mut burnout_at = None;
    for step in 0..30 {
        driver.run(&mut fire, &clock, &env);
        if burnout_at.is_none() && fire.fire().fuel() == 0.0 {
            burnout_at = Some(clock.now_seconds());
        }
        if verbose && step % 2 == 0 {
            println!(
                "  t={:>4.0}s fuel={:.3} lit={}",
                clock.now_seconds(),
                fire.fire().fuel(),
                fire.fire().visual().enabled
            );
        }
        clock.advance_seconds(1.0);
    }
    results.push(TestResult {
        name: "decay_clamps_at_zero".into(),
        passed: fire.fire().fuel() == 0.0 && !fire.fire().visual().enabled,
        detail: format!("burned out at {:?} s", burnout_at),
    });

    // Replicas never decay
    let mut guest =
        ReplicatedFireplace::from_snapshot(2, scenario_config(), Vec3::default(), {
            let host = ReplicatedFireplace::place(1, scenario_config(), Vec3::default());
            host.snapshot()
        });
    guest.update(hearth_logic::clock::seconds_to_ticks(600.0), &env);
    results.push(TestResult {
        name: "decay_owner_only".into(),
        passed: guest.fire().fuel() == 3.0,
        detail: format!("replica fuel after 10 min = {}", guest.fire().fuel()),
    });

    results
}

// ── 3. Adding Fuel ──────────────────────────────────────────────────────

fn validate_add_fuel(_verbose: bool) -> Vec<TestResult> {
    println!("--- Adding Fuel ---");
    let mut results = Vec::new();
    let env = StaticEnvironment::default();

    let mut store = ObjectStore::new();
    store.set_float(hearth_logic::constants::keys::FUEL, 9.5);
    let mut fire = ReplicatedFireplace::from_snapshot(
        1,
        scenario_config(),
        Vec3::default(),
        hearth_logic::replication::FireplaceSnapshot {
            ownership: hearth_logic::replication::Ownership::owned_by(1),
            store,
        },
    );
    let outcome = fire.fire_mut().add_fuel();
    results.push(TestResult {
        name: "add_fuel_refused_when_ceil_full".into(),
        passed: outcome == AddFuelOutcome::Full && fire.fire().fuel() == 9.5,
        detail: format!("9.5/10 -> {:?}, fuel {}", outcome, fire.fire().fuel()),
    });

    let mut fire = ReplicatedFireplace::place(1, scenario_config(), Vec3::default());
    let mut outbox = Mailbox::new();
    let mut inv = ItemCounts::new().with("$item_wood", 100);
    for _ in 0..100 {
        fire.use_item(
            &mut inv,
            "$item_wood",
            &IdentityLocalizer,
            &mut outbox,
            &env,
        );
    }
    let used = 100 - inv.count_items("$item_wood");
    results.push(TestResult {
        name: "add_fuel_capped".into(),
        passed: fire.fire().fuel() == 10.0 && used == 7,
        detail: format!("fuel {} after using {} wood", fire.fire().fuel(), used),
    });

    let hover = hover_text(fire.fire(), &IdentityLocalizer);
    results.push(TestResult {
        name: "add_fuel_hover_gauge".into(),
        passed: hover.contains("10/10"),
        detail: hover.lines().next().unwrap_or_default().to_string(),
    });

    results
}

// ── 4. Environment ──────────────────────────────────────────────────────

fn validate_environment(_verbose: bool) -> Vec<TestResult> {
    println!("--- Environment ---");
    let mut results = Vec::new();
    let base = Vec3::new(0.0, 10.0, 0.0);

    let cases = [
        ("open", StaticEnvironment::default(), true),
        (
            "buried",
            StaticEnvironment {
                terrain_height: Some(11.0),
                ..Default::default()
            },
            false,
        ),
        (
            "low_ceiling",
            StaticEnvironment {
                ceiling_height: Some(10.8),
                ..Default::default()
            },
            false,
        ),
        (
            "high_ceiling",
            StaticEnvironment {
                ceiling_height: Some(14.0),
                ..Default::default()
            },
            true,
        ),
        (
            "smoke_blocked",
            StaticEnvironment {
                smoke_blocked: true,
                ..Default::default()
            },
            false,
        ),
        (
            "submerged",
            StaticEnvironment {
                liquid_level: Some(12.0),
                ..Default::default()
            },
            false,
        ),
    ];
    for (label, env, expect_burning) in cases {
        let mut fire = ReplicatedFireplace::place(1, scenario_config(), base);
        fire.check_environment(&env);
        let burning = fire.fire().is_burning(&env);
        results.push(TestResult {
            name: format!("env_{}", label),
            passed: burning == expect_burning,
            detail: format!("burning={} (expected {})", burning, expect_burning),
        });
    }

    // Wind alone only wets an exposed fire
    let windy = StaticEnvironment {
        wind_intensity: 0.9,
        ..Default::default()
    };
    let mut fire = ReplicatedFireplace::place(1, scenario_config(), base);
    fire.check_environment(&windy);
    let visual = fire.update(0, &windy);
    results.push(TestResult {
        name: "env_wind_low_flame".into(),
        passed: visual.enabled && visual.low && !visual.high,
        detail: format!("{:?}", visual),
    });

    // Empty fire in shallow water stays dark
    let mut empty = scenario_config();
    empty.start_fuel = 0.0;
    let fire = ReplicatedFireplace::place(1, empty, base);
    let shallow = StaticEnvironment {
        liquid_level: Some(9.0),
        ..Default::default()
    };
    results.push(TestResult {
        name: "env_empty_not_burning".into(),
        passed: !fire.fire().is_burning(&shallow),
        detail: "fuel 0, water below emitter".into(),
    });

    results
}

// ── 5. Session ──────────────────────────────────────────────────────────

fn validate_session(verbose: bool) -> Vec<TestResult> {
    println!("--- Two-Participant Session ---");
    let mut results = Vec::new();
    let env = StaticEnvironment::default();
    let clock = ManualClock::new(0);

    let mut host = ReplicatedFireplace::place(1, scenario_config(), Vec3::default());
    let mut guest =
        ReplicatedFireplace::from_snapshot(2, scenario_config(), Vec3::default(), host.snapshot());
    let mut host_driver = FireplaceDriver::new(&clock);
    let mut guest_driver = FireplaceDriver::new(&clock);
    let mut to_host = Mailbox::new();
    let mut wood = ItemCounts::new().with("$item_wood", 5);

    let mut divergence = 0.0f32;
    for second in 0..20 {
        if second % 4 == 1 {
            guest.interact(
                Some(&mut wood),
                false,
                clock.now_seconds(),
                &IdentityLocalizer,
                &mut to_host,
                &env,
            );
        }
        for envelope in to_host.drain() {
            host.handle_request(envelope, &env);
        }
        host_driver.run(&mut host, &clock, &env);
        guest_driver.run(&mut guest, &clock, &env);
        guest.apply_snapshot(host.snapshot());
        divergence = divergence.max((host.fire().fuel() - guest.fire().fuel()).abs());
        if verbose {
            println!(
                "  t={:>2}s host={:.3} guest={:.3}",
                second,
                host.fire().fuel(),
                guest.fire().fuel()
            );
        }
        clock.advance_seconds(1.0);
    }

    results.push(TestResult {
        name: "session_guest_tracks_host".into(),
        passed: divergence == 0.0,
        detail: format!("max fuel divergence {}", divergence),
    });
    results.push(TestResult {
        name: "session_wood_consumed".into(),
        passed: wood.count_items("$item_wood") == 0,
        detail: format!("{} wood left", wood.count_items("$item_wood")),
    });
    results.push(TestResult {
        name: "session_single_owner".into(),
        passed: host.is_owner() && !guest.is_owner(),
        detail: format!("owner {:?}", host.ownership().owner()),
    });

    results
}

// ── 6. Damage Text ──────────────────────────────────────────────────────

fn validate_damage_text(_verbose: bool) -> Vec<TestResult> {
    println!("--- Damage Text ---");
    let mut results = Vec::new();
    let settings = DamageTextSettings::default();
    let duration = settings.text_duration;
    let mut layer = DamageTextLayer::new(settings, 1);
    let camera = Some(Vec3::default());

    let near = DamageTextEvent::from_modifier(
        DamageModifier::Weak,
        Vec3::new(0.0, 0.0, 5.0),
        12.0,
        false,
    );
    let far = DamageTextEvent::from_modifier(
        DamageModifier::Normal,
        Vec3::new(0.0, 0.0, 50.0),
        3.0,
        false,
    );
    let shown_near = layer.receive(2, &near, camera, false, &IdentityLocalizer);
    let shown_far = layer.receive(2, &far, camera, false, &IdentityLocalizer);
    let hidden_hud = layer.receive(2, &near, camera, true, &IdentityLocalizer);
    results.push(TestResult {
        name: "damage_text_filtering".into(),
        passed: shown_near && !shown_far && !hidden_hud,
        detail: format!(
            "near={} far={} hud_hidden={}",
            shown_near, shown_far, hidden_hud
        ),
    });

    let steps = (duration / 0.1).ceil() as usize + 2;
    let mut min_alpha = 1.0f32;
    for _ in 0..steps {
        layer.update(0.1, |p| Some((p.x, p.y)));
        if let Some(text) = layer.texts().first() {
            min_alpha = min_alpha.min(text.color.a);
        }
    }
    results.push(TestResult {
        name: "damage_text_fades_and_culls".into(),
        passed: layer.texts().is_empty() && min_alpha < 0.25,
        detail: format!("min alpha {:.3}, {} left", min_alpha, layer.texts().len()),
    });

    results
}

// ── 7. Random Animation ─────────────────────────────────────────────────

fn validate_random_animation(_verbose: bool) -> Vec<TestResult> {
    println!("--- Random Animation ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(42);
    let params = vec![
        RandomValue::integer("idle", 4, 0.5),
        RandomValue::float("flicker", 3, 0.5, 0.25),
    ];
    let mut owner = RandomAnimation::new(params.clone());
    let mut replica = RandomAnimation::new(params);
    let mut store = ObjectStore::new();
    let mut owner_params = ParameterMap::default();
    let mut replica_params = ParameterMap::default();

    let mut out_of_range = 0;
    let mut mismatches = 0;
    for _ in 0..1000 {
        owner.fixed_update(
            0.02,
            SyncMode::Owner(&mut store),
            &mut rng,
            &mut owner_params,
        );
        replica.fixed_update(
            0.02,
            SyncMode::Replica(&store),
            &mut rng,
            &mut replica_params,
        );
        if !(0..4).contains(&owner.value(0).unwrap_or(-1)) {
            out_of_range += 1;
        }
        if owner.value(0) != replica.value(0) || owner.value(1) != replica.value(1) {
            mismatches += 1;
        }
    }
    results.push(TestResult {
        name: "random_animation_in_range".into(),
        passed: out_of_range == 0,
        detail: format!("{} out-of-range rolls", out_of_range),
    });
    results.push(TestResult {
        name: "random_animation_replica_follows".into(),
        passed: mismatches == 0,
        detail: format!("{} mismatched frames", mismatches),
    });

    let weight_sum: f32 = (0..3)
        .filter_map(|k| replica_params.floats.get(&format!("flicker{}", k)))
        .sum();
    results.push(TestResult {
        name: "random_animation_weights_bounded".into(),
        passed: (0.0..=3.0).contains(&weight_sum),
        detail: format!("flicker weight sum {:.3}", weight_sum),
    });

    results
}
