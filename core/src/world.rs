/*!
Rapier-based rigid-body world for the propeller toy.

This is the one place that owns rapier state. The rest of the core talks to
it through a small surface: add/remove bodies, registered contact-material
pairs, kinematic pose assignment, and a fixed `step` that reports which body
pairs began touching.

Design
- Kinematic bodies (the driver parts) are moved only by
  `set_next_kinematic_pose` before `step`; they never simulate on their own.
- Collision events are collected through an `EventHandler` sink during
  `step` and handed back to the caller as body-handle pairs, already
  resolved from collider handles while the sets are at hand.
- `step` refuses to run if any dynamic body has gone non-finite. That is a
  transient fault: the caller logs it, skips this tick's advance, and tries
  again next tick.
*/

use parking_lot::Mutex;
use rapier3d::prelude::*;

use crate::error::WorldError;
use crate::material::{self, ContactMaterialRegistry, ContactProps, Material};
use crate::settings;
use crate::types::{Pose, ShapeDef, Vec3, collider_from_shape};

/// A pair of bodies that began touching during the last `step`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContactStarted {
    pub a: RigidBodyHandle,
    pub b: RigidBodyHandle,
}

impl ContactStarted {
    /// The partner of `body` in this contact, if `body` participates at all.
    #[inline]
    pub fn partner_of(&self, body: RigidBodyHandle) -> Option<RigidBodyHandle> {
        if self.a == body {
            Some(self.b)
        } else if self.b == body {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Collects rapier collision events from inside the pipeline.
///
/// Rapier invokes the handler through `&self`, so the buffer sits behind a
/// mutex even though stepping is single-threaded here.
#[derive(Default)]
struct EventSink {
    collisions: Mutex<Vec<CollisionEvent>>,
}

impl EventHandler for EventSink {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        self.collisions.lock().push(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
        // Force-threshold events are not used by this toy.
    }
}

/// The rigid-body world collaborator.
pub struct PhysicsWorld {
    gravity: Vec3,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    materials: ContactMaterialRegistry,
    events: EventSink,
}

impl PhysicsWorld {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity,
            params: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            materials: ContactMaterialRegistry::new(),
            events: EventSink::default(),
        }
    }

    /// Add a fixed (zero-mass, immovable) body.
    pub fn add_static(&mut self, shape: ShapeDef, pose: Pose, mat: Material) -> RigidBodyHandle {
        let body = RigidBodyBuilder::fixed().pose(pose.iso()).build();
        self.insert_with_collider(body, shape, mat, None, false)
    }

    /// Add a kinematic body: infinite mass, driven externally each tick.
    pub fn add_kinematic(&mut self, shape: ShapeDef, pose: Pose, mat: Material) -> RigidBodyHandle {
        let body = RigidBodyBuilder::kinematic_position_based()
            .pose(pose.iso())
            .build();
        self.insert_with_collider(body, shape, mat, None, false)
    }

    /// Add a dynamic body with the given mass. Its collider reports
    /// collision-started events.
    pub fn add_dynamic(
        &mut self,
        shape: ShapeDef,
        pose: Pose,
        mat: Material,
        mass: f32,
    ) -> RigidBodyHandle {
        // CCD keeps small fast spheres from tunneling through the thin ring
        // segments at high contact speeds.
        let body = RigidBodyBuilder::dynamic()
            .pose(pose.iso())
            .can_sleep(true)
            .ccd_enabled(true)
            .build();
        self.insert_with_collider(body, shape, mat, Some(mass), true)
    }

    fn insert_with_collider(
        &mut self,
        body: RigidBody,
        shape: ShapeDef,
        mat: Material,
        mass: Option<f32>,
        report_collisions: bool,
    ) -> RigidBodyHandle {
        let handle = self.bodies.insert(body);
        let mut builder = collider_from_shape(&shape);
        if let Some(mass) = mass {
            builder = builder.mass(mass);
        }
        if report_collisions {
            builder = builder.active_events(ActiveEvents::COLLISION_EVENTS);
        }
        let mut collider = builder.build();
        material::apply_material(&mut collider, mat);
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    /// Remove a body and its colliders. Returns whether it existed. The
    /// handle is invalid afterwards.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> bool {
        self.bodies
            .remove(
                handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    /// Register friction/restitution for an unordered material pair.
    /// Idempotent; see [`ContactMaterialRegistry`].
    pub fn register_contact_pair(&mut self, a: Material, b: Material, props: ContactProps) -> bool {
        self.materials.register(a, b, props)
    }

    pub fn contact_pair_count(&self) -> usize {
        self.materials.len()
    }

    /// Queue the pose a kinematic body must hold for the coming `step`.
    pub fn set_next_kinematic_pose(&mut self, handle: RigidBodyHandle, pose: Pose) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_next_kinematic_translation(pose.translation);
            body.set_next_kinematic_rotation(pose.rotation);
        }
    }

    /// Advance the world by one fixed interval and report the body pairs
    /// that began touching during it.
    pub fn step(&mut self, dt: f32) -> Result<Vec<ContactStarted>, WorldError> {
        self.validate_dynamic_poses()?;
        self.params.dt = dt;

        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &self.materials,
            &self.events,
        );

        let raw: Vec<CollisionEvent> = self.events.collisions.lock().drain(..).collect();
        let mut started = Vec::with_capacity(raw.len());
        for event in raw {
            if let CollisionEvent::Started(c1, c2, _) = event {
                let a = self.colliders.get(c1).and_then(|c| c.parent());
                let b = self.colliders.get(c2).and_then(|c| c.parent());
                if let (Some(a), Some(b)) = (a, b) {
                    started.push(ContactStarted { a, b });
                }
            }
        }
        Ok(started)
    }

    /// A stray NaN in a body pose poisons the broad phase; refuse to step
    /// until the offending body is gone.
    fn validate_dynamic_poses(&self) -> Result<(), WorldError> {
        for (_, body) in self.bodies.iter() {
            if !body.is_dynamic() {
                continue;
            }
            let t = body.position().translation.vector;
            if !(t.x.is_finite() && t.y.is_finite() && t.z.is_finite()) {
                return Err(WorldError::NonFinitePose);
            }
        }
        Ok(())
    }

    pub fn body_pose(&self, handle: RigidBodyHandle) -> Option<Pose> {
        self.bodies.get(handle).map(|b| Pose::from(*b.position()))
    }

    pub fn body_translation(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.bodies
            .get(handle)
            .map(|b| b.position().translation.vector)
    }

    pub fn body_linvel(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.bodies.get(handle).map(|b| *b.linvel())
    }

    /// Teleport a body. Test scaffolding and corrective use only; regular
    /// dynamics should never need it.
    pub fn set_body_translation(&mut self, handle: RigidBodyHandle, translation: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle) {
            let mut pose = *body.position();
            pose.translation.vector = translation;
            body.set_position(pose, true);
        }
    }

    pub fn contains_body(&self, handle: RigidBodyHandle) -> bool {
        self.bodies.get(handle).is_some()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn dynamic_body_count(&self) -> usize {
        self.bodies.iter().filter(|(_, b)| b.is_dynamic()).count()
    }

    /// Apply the blade-strike response: a world-space impulse plus a
    /// body-local force integrated over one fixed step. Deterministic for a
    /// given body orientation. Fails quietly (with a log) if the body is
    /// already gone, which can happen when it was reaped this very tick.
    pub fn apply_kick(
        &mut self,
        handle: RigidBodyHandle,
        impulse: Vec3,
        local_force: Vec3,
        dt: f32,
    ) -> bool {
        let Some(body) = self.bodies.get_mut(handle) else {
            log::warn!("kick dropped: body is no longer in the world");
            return false;
        };
        let local_impulse = body.position().rotation * (local_force * dt);
        body.apply_impulse(impulse, true);
        body.apply_impulse(local_impulse, true);
        true
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(settings::GRAVITY)
    }
}
