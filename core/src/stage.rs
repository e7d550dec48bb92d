/*!
The stage: every collaborator in one explicit context, plus the per-tick
synchronization sequence.

There are no ambient singletons; whoever owns a [`Stage`] owns the whole
toy. The renderer reads the scene graph after each [`Stage::tick`] and is
otherwise uninvolved.

Tick order (strict; see the per-step comments in [`Stage::tick`]):
spawn due spheres, push the driver's visual pose into its kinematic bodies,
step the world once, apply collision responses, copy body poses to visual
nodes, reap runaways, and finally advance the cosmetic rotation for the
next tick. Visuals therefore never lag physics by more than one tick, and
the kinematic bodies never lag their visual driver by more than one tick.
*/

use rapier3d::prelude::RigidBodyHandle;

use crate::binding::BindingTable;
use crate::driver::KinematicDriver;
use crate::error::{SpawnError, StageError};
use crate::material::{ContactProps, Material};
use crate::reactor::CollisionReactor;
use crate::reaper::Reaper;
use crate::scene::{Node, NodeId, NodeKind, SceneGraph};
use crate::settings;
use crate::spawner::SphereSpawner;
use crate::types::{Pose, Quat, ShapeDef, Vec3};
use crate::world::PhysicsWorld;

/// Knobs a host may want to vary. Defaults reproduce the stock scene.
#[derive(Clone, Copy, Debug)]
pub struct StageSettings {
    /// RNG seed for spawn positions.
    pub seed: u64,
    /// Driver yaw per tick (radians).
    pub angular_velocity: f32,
    /// Eviction distance from the hub (meters, exclusive).
    pub reap_distance: f32,
    /// Spheres in the startup burst. Zero disables the burst.
    pub burst_count: usize,
    /// Spawn disk radius (meters).
    pub disk_radius: f32,
    /// Minimum ticks between hold-to-spawn spheres.
    pub hold_interval_ticks: u64,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            angular_velocity: settings::ANGULAR_VELOCITY,
            reap_distance: settings::REAP_DISTANCE,
            burst_count: settings::BURST_COUNT,
            disk_radius: settings::SPAWN_DISK_RADIUS,
            hold_interval_ticks: settings::HOLD_INTERVAL_TICKS,
        }
    }
}

/// Handles for the immovable obstacles created at startup.
pub struct StaticGeometry {
    pub floor_node: NodeId,
    pub floor_body: RigidBodyHandle,
    pub ceiling_node: NodeId,
    pub ceiling_body: RigidBodyHandle,
    /// Ring segments, one (node, body) per segment.
    pub ring: Vec<(NodeId, RigidBodyHandle)>,
}

pub struct Stage {
    pub world: PhysicsWorld,
    pub scene: SceneGraph,
    pub bindings: BindingTable,
    pub spawner: SphereSpawner,
    pub reaper: Reaper,
    pub reactor: CollisionReactor,
    pub driver: KinematicDriver,
    pub statics: StaticGeometry,
    tick: u64,
}

impl Stage {
    /// Build the whole toy: world, static geometry, driver, and (unless the
    /// burst count is zero) the scheduled startup burst. Construction order
    /// guarantees spheres can never spawn before the obstacles and the
    /// driver exist.
    pub fn new(config: StageSettings) -> Result<Self, StageError> {
        let mut world = PhysicsWorld::new(settings::GRAVITY);
        let mut scene = SceneGraph::new();

        let statics = Self::build_statics(&mut scene, &mut world)?;
        let driver = KinematicDriver::build(&mut scene, &mut world, config.angular_velocity)?;

        let mut spawner =
            SphereSpawner::new(config.seed, config.disk_radius, config.hold_interval_ticks);
        if config.burst_count > 0 {
            spawner.schedule_burst(0, config.burst_count);
        }

        let reactor = CollisionReactor::new(vec![driver.blade_body]);

        log::debug!(
            "stage ready: {} static bodies, burst of {} pending",
            world.body_count(),
            spawner.pending()
        );

        Ok(Self {
            world,
            scene,
            bindings: BindingTable::new(),
            spawner,
            reaper: Reaper::new(config.reap_distance),
            reactor,
            driver,
            statics,
            tick: 0,
        })
    }

    fn build_statics(
        scene: &mut SceneGraph,
        world: &mut PhysicsWorld,
    ) -> Result<StaticGeometry, StageError> {
        // Floor: infinite half-space with +Y normal, visualized as a plane.
        let floor_node = scene.insert(Node::new(NodeKind::Floor))?;
        let floor_body = world.add_static(ShapeDef::Plane, Pose::identity(), Material::Floor);

        // Ceiling: a thin slab hovering over the ring to keep spheres down.
        let ceiling_pose = Pose::from_translation(Vec3::new(0.0, settings::CEILING_HEIGHT, 0.0));
        let ceiling_node = scene.insert(
            Node::new(NodeKind::Ceiling).at(ceiling_pose.translation),
        )?;
        let ceiling_body = world.add_static(
            ShapeDef::Cuboid {
                half_extents: settings::CEILING_HALF_EXTENTS,
            },
            ceiling_pose,
            Material::Ceiling,
        );

        // Ring enclosure: thin segments around the rim, each facing the
        // center so its thin axis is radial.
        let mut ring = Vec::with_capacity(settings::RING_SEGMENTS);
        let segment_height = settings::RING_SEGMENT_HALF_EXTENTS.y;
        for index in 0..settings::RING_SEGMENTS {
            let phi = (index as f32 / settings::RING_SEGMENTS as f32) * std::f32::consts::TAU;
            let translation = Vec3::new(
                phi.sin() * settings::RING_RADIUS,
                segment_height,
                phi.cos() * settings::RING_RADIUS,
            );
            let rotation = Quat::from_axis_angle(&Vec3::y_axis(), phi);
            let pose = Pose::new(translation, rotation);

            let node = scene.insert(
                Node::new(NodeKind::RingSegment)
                    .at(translation)
                    .rotated(rotation),
            )?;
            let body = world.add_static(
                ShapeDef::Cuboid {
                    half_extents: settings::RING_SEGMENT_HALF_EXTENTS,
                },
                pose,
                Material::Boundary,
            );
            ring.push((node, body));
        }

        Ok(StaticGeometry {
            floor_node,
            floor_body,
            ceiling_node,
            ceiling_body,
            ring,
        })
    }

    /// Current tick count (number of completed `tick` calls).
    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Number of live spheres.
    #[inline]
    pub fn sphere_count(&self) -> usize {
        self.bindings.len()
    }

    /// Create one paired (body, visual) sphere at `position`.
    ///
    /// All-or-nothing: if the visual node or the binding cannot be created,
    /// whatever part already exists is rolled back before returning, so a
    /// failed spawn leaves no orphaned physics-only object behind.
    pub fn spawn_sphere(&mut self, position: Vec3) -> Result<NodeId, SpawnError> {
        let body = self.world.add_dynamic(
            ShapeDef::Sphere {
                radius: settings::SPHERE_RADIUS,
            },
            Pose::from_translation(position),
            Material::Sphere,
            settings::SPHERE_MASS,
        );

        let node = match self.scene.insert(Node::new(NodeKind::Sphere).at(position)) {
            Ok(node) => node,
            Err(err) => {
                self.world.remove_body(body);
                return Err(err.into());
            }
        };

        if let Err(err) = self.bindings.insert(node, body) {
            self.scene.remove(node);
            self.world.remove_body(body);
            return Err(err.into());
        }

        self.reactor.subscribe(body);

        // Contact coefficients against everything a sphere can hit. The
        // registry deduplicates, so repeating this per spawn is a no-op
        // after the first sphere.
        self.world.register_contact_pair(
            Material::Sphere,
            Material::Blade,
            ContactProps::new(0.0, 0.3),
        );
        self.world.register_contact_pair(
            Material::Sphere,
            Material::Boundary,
            ContactProps::new(0.0, 1.0),
        );
        self.world.register_contact_pair(
            Material::Sphere,
            Material::Ceiling,
            ContactProps::new(0.0, 0.0),
        );

        Ok(node)
    }

    /// Run one synchronization tick.
    pub fn tick(&mut self) {
        let now = self.tick;

        // Spawns scheduled for this tick, so new spheres take part in this
        // tick's physics step.
        for position in self.spawner.due_positions(now) {
            if let Err(err) = self.spawn_sphere(position) {
                log::warn!("spawn failed: {err}");
            }
        }

        // Kinematic precedence: the driver's bodies must carry the visual
        // pose as of the start of this tick before the world advances.
        self.driver.sync_bodies(&self.scene, &mut self.world);

        match self.world.step(settings::FIXED_DT) {
            Ok(events) => {
                self.reactor
                    .dispatch(&events, &mut self.world, settings::FIXED_DT);

                // Post-step body poses drive the visual nodes.
                for pair in self.bindings.snapshot() {
                    if let Some(pose) = self.world.body_pose(pair.body) {
                        self.scene.set_pose(pair.node, pose);
                    }
                }

                let reference = self.driver.reference_point(&self.world);
                self.reaper.reap(
                    reference,
                    &mut self.bindings,
                    &mut self.world,
                    &mut self.scene,
                    &mut self.reactor,
                );

                // Cosmetic rotation last: it only affects the *next* tick's
                // kinematic pose, never the step that just ran.
                self.driver.advance(&mut self.scene);
            }
            Err(err) => {
                // The rest of this tick is abandoned. One lost physics
                // advance is recoverable; evict whatever went non-finite so
                // the next tick can step again.
                log::warn!("physics step skipped this tick: {err}");
                self.evict_corrupt_spheres();
            }
        }

        self.tick += 1;
    }

    /// Remove spheres whose bodies have non-finite translations, restoring
    /// a steppable world after a transient fault.
    fn evict_corrupt_spheres(&mut self) {
        for pair in self.bindings.snapshot() {
            let corrupt = match self.world.body_translation(pair.body) {
                Some(t) => !(t.x.is_finite() && t.y.is_finite() && t.z.is_finite()),
                None => true,
            };
            if corrupt {
                log::warn!("evicting corrupt sphere {}", pair.node);
                self.bindings.remove_by_body(pair.body);
                self.world.remove_body(pair.body);
                self.scene.remove(pair.node);
                self.reactor.unsubscribe(pair.body);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_stage() -> Stage {
        Stage::new(StageSettings {
            burst_count: 0,
            ..StageSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn spawn_creates_exactly_one_pair() {
        let mut stage = quiet_stage();
        let bodies_before = stage.world.body_count();
        let nodes_before = stage.scene.len();

        let node = stage.spawn_sphere(Vec3::new(0.5, 0.3, 0.5)).unwrap();

        assert_eq!(stage.sphere_count(), 1);
        assert_eq!(stage.world.body_count(), bodies_before + 1);
        assert_eq!(stage.scene.len(), nodes_before + 1);
        assert_eq!(stage.bindings.body_for(node), stage.bindings.iter().next().map(|p| p.body));
        assert_eq!(stage.reactor.subscription_count(), 1);
    }

    #[test]
    fn failed_spawn_leaves_no_orphaned_body() {
        let mut stage = quiet_stage();
        let bodies_before = stage.world.body_count();
        let nodes_before = stage.scene.len();

        // Force visual-node creation to fail.
        stage.scene.set_capacity_limit(Some(nodes_before));
        let err = stage.spawn_sphere(Vec3::new(0.0, 0.3, 0.0)).unwrap_err();
        assert!(matches!(err, SpawnError::Scene(_)));

        assert_eq!(stage.world.body_count(), bodies_before);
        assert_eq!(stage.scene.len(), nodes_before);
        assert!(stage.bindings.is_empty());
        assert_eq!(stage.reactor.subscription_count(), 0);
    }

    #[test]
    fn spawn_registers_contact_pairs_once() {
        let mut stage = quiet_stage();
        stage.spawn_sphere(Vec3::new(0.0, 0.3, 0.0)).unwrap();
        let after_first = stage.world.contact_pair_count();
        stage.spawn_sphere(Vec3::new(0.5, 0.3, 0.0)).unwrap();
        assert_eq!(stage.world.contact_pair_count(), after_first);
    }

    #[test]
    fn step_fault_costs_one_tick_and_recovers() {
        let mut stage = quiet_stage();
        let good = stage.spawn_sphere(Vec3::new(0.5, 0.3, 0.5)).unwrap();
        let bad = stage.spawn_sphere(Vec3::new(-0.5, 0.3, 0.5)).unwrap();
        let bad_body = stage.bindings.body_for(bad).unwrap();

        stage
            .world
            .set_body_translation(bad_body, Vec3::new(f32::NAN, 0.0, 0.0));

        // This tick's step aborts, but the corrupt sphere is evicted...
        stage.tick();
        assert_eq!(stage.sphere_count(), 1);
        assert!(stage.scene.contains(good));
        assert!(!stage.scene.contains(bad));

        // ...so the next tick steps normally again.
        let angle_before = stage.driver.rotation_angle();
        stage.tick();
        assert!(stage.driver.rotation_angle() > angle_before);
        assert_eq!(stage.sphere_count(), 1);
    }
}
