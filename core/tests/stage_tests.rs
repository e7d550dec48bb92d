//! Integration scenarios for the full stage: burst spawning, kinematic
//! precedence, eviction, and the pairing invariant across many ticks.

use approx::assert_relative_eq;
use whirl_core::settings;
use whirl_core::types::{Quat, Vec3};
use whirl_core::{Stage, StageSettings};

fn stage_without_burst() -> Stage {
    Stage::new(StageSettings {
        burst_count: 0,
        ..StageSettings::default()
    })
    .unwrap()
}

/// Asserts the pairing invariant: every binding entry has exactly one live
/// body and one live scene node.
fn assert_pairing_invariant(stage: &Stage) {
    for pair in stage.bindings.snapshot() {
        assert!(
            stage.world.contains_body(pair.body),
            "binding without a live body"
        );
        assert!(
            stage.scene.contains(pair.node),
            "binding without a live scene node"
        );
    }
}

#[test]
fn startup_burst_produces_matching_counts_everywhere() {
    let mut stage = Stage::new(StageSettings::default()).unwrap();

    let static_bodies = stage.world.body_count();
    let static_nodes = stage.scene.len();

    // The last burst sphere is due at BURST_DELAY + BURST_COUNT ticks; run a
    // few ticks past that.
    let horizon = settings::BURST_DELAY_TICKS
        + settings::BURST_COUNT as u64 * settings::BURST_STAGGER_TICKS
        + 5;
    for _ in 0..horizon {
        stage.tick();
        assert_pairing_invariant(&stage);
    }

    assert_eq!(stage.sphere_count(), settings::BURST_COUNT);
    assert_eq!(
        stage.world.body_count(),
        static_bodies + settings::BURST_COUNT
    );
    assert_eq!(stage.scene.len(), static_nodes + settings::BURST_COUNT);
    assert_eq!(stage.spawner.pending(), 0);
}

#[test]
fn thousand_ticks_accumulate_the_expected_rotation() {
    let mut stage = stage_without_burst();
    for _ in 0..1000 {
        stage.tick();
    }

    // 1000 ticks at 0.015 rad/tick.
    assert_relative_eq!(stage.driver.rotation_angle(), 15.0, epsilon = 1e-3);

    // The container's scene rotation matches the accumulated angle mod 2*pi.
    let container = stage
        .scene
        .world_pose(stage.driver.container)
        .unwrap()
        .rotation;
    let expected = Quat::from_axis_angle(&Vec3::y_axis(), -15.0);
    assert_relative_eq!(container.angle_to(&expected), 0.0, epsilon = 1e-3);
}

#[test]
fn kinematic_body_matches_start_of_tick_visual_pose() {
    let mut stage = stage_without_burst();

    // Let the driver turn for a while, then inspect a single tick.
    for _ in 0..10 {
        stage.tick();
    }

    let visual_at_tick_start = stage.scene.world_pose(stage.driver.blade_node).unwrap();
    stage.tick();

    // After the step the body holds the pose the visual had at the start of
    // the tick, not the pose after the cosmetic advance.
    let body = stage.world.body_pose(stage.driver.blade_body).unwrap();
    assert_relative_eq!(
        (body.translation - visual_at_tick_start.translation).norm(),
        0.0,
        epsilon = 1e-4
    );
    assert_relative_eq!(
        body.rotation.angle_to(&visual_at_tick_start.rotation),
        0.0,
        epsilon = 1e-4
    );

    // And the visual has already moved on by one increment.
    let visual_now = stage.scene.world_pose(stage.driver.blade_node).unwrap();
    assert!(visual_now.rotation.angle_to(&body.rotation) > 1e-4);
}

#[test]
fn distant_sphere_is_reaped_within_one_tick() {
    let mut stage = stage_without_burst();
    stage.spawn_sphere(Vec3::new(25.0, 0.3, 0.0)).unwrap();
    stage.spawn_sphere(Vec3::new(0.5, 0.3, 0.5)).unwrap();
    assert_eq!(stage.sphere_count(), 2);

    stage.tick();

    // Exactly one sphere (the distant one) is gone from table, world, and
    // scene alike.
    assert_eq!(stage.sphere_count(), 1);
    assert_pairing_invariant(&stage);
}

#[test]
fn hold_to_spawn_follows_the_interval_and_stops_on_release() {
    let mut stage = stage_without_burst();
    stage.spawner.set_hold(true);

    // Interval 12: spawns on ticks 0, 12 and 24.
    for _ in 0..25 {
        stage.tick();
    }
    assert_eq!(stage.sphere_count(), 3);

    stage.spawner.set_hold(false);
    for _ in 0..50 {
        stage.tick();
    }
    assert_eq!(stage.sphere_count(), 3);
}

#[test]
fn sphere_in_the_blade_sweep_stays_contained_and_active() {
    let mut stage = stage_without_burst();
    stage.spawn_sphere(Vec3::new(0.5, 0.3, 0.5)).unwrap();

    let mut max_speed: f32 = 0.0;
    for _ in 0..600 {
        stage.tick();
        for pair in stage.bindings.snapshot() {
            if let Some(v) = stage.world.body_linvel(pair.body) {
                max_speed = max_speed.max(v.norm());
            }
        }
        assert_pairing_invariant(&stage);
    }

    // Ten seconds of sideways gravity, ring bounces, and blade sweeps: the
    // sphere must still be inside the enclosure (unreaped) and moving.
    assert_eq!(stage.sphere_count(), 1);
    assert!(max_speed > 1.0, "sphere never moved (max speed {max_speed})");
}
