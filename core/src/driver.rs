/*!
The kinematic driver: a container node spinning a blade and a hub.

The container node is the rotation authority. The blade hangs off it at a
local X offset; the hub cylinder sits at its center. Both have kinematic
bodies whose poses are copied from the scene's *world* transforms before
every physics step. The bodies never simulate on their own.

The rotation itself is presentation state: `advance` bumps the yaw once per
tick, which only affects the *next* tick's kinematic pose.
*/

use rapier3d::prelude::RigidBodyHandle;

use crate::error::SceneError;
use crate::material::Material;
use crate::scene::{Node, NodeId, NodeKind, SceneGraph};
use crate::settings;
use crate::types::{Quat, ShapeDef, Vec3};
use crate::world::PhysicsWorld;

pub struct KinematicDriver {
    pub container: NodeId,
    pub blade_node: NodeId,
    pub blade_body: RigidBodyHandle,
    pub hub_node: NodeId,
    pub hub_body: RigidBodyHandle,
    /// Yaw increment per tick (radians), applied as a negative rotation.
    pub angular_velocity: f32,
    /// Unwrapped cumulative rotation; the container rotation is derived
    /// from this every `advance`.
    angle: f32,
}

impl KinematicDriver {
    /// Create the container/blade/hub nodes and their kinematic bodies.
    pub fn build(
        scene: &mut SceneGraph,
        world: &mut PhysicsWorld,
        angular_velocity: f32,
    ) -> Result<Self, SceneError> {
        let container = scene.insert(Node::new(NodeKind::Container))?;
        let blade_node = scene.insert(
            Node::new(NodeKind::Blade)
                .at(Vec3::new(settings::BLADE_OFFSET_X, 0.0, 0.0))
                .child_of(container),
        )?;
        let hub_node = scene.insert(Node::new(NodeKind::Hub).child_of(container))?;

        // Bodies start at the nodes' current world poses; sync_bodies keeps
        // them there from then on.
        let blade_pose = scene
            .world_pose(blade_node)
            .ok_or(SceneError::MissingParent(container.0))?;
        let hub_pose = scene
            .world_pose(hub_node)
            .ok_or(SceneError::MissingParent(container.0))?;

        let blade_body = world.add_kinematic(
            ShapeDef::Cuboid {
                half_extents: settings::BLADE_HALF_EXTENTS,
            },
            blade_pose,
            Material::Blade,
        );
        let hub_body = world.add_kinematic(
            ShapeDef::CylinderY {
                radius: settings::HUB_RADIUS,
                half_height: settings::HUB_HALF_HEIGHT,
            },
            hub_pose,
            Material::Hub,
        );

        Ok(Self {
            container,
            blade_node,
            blade_body,
            hub_node,
            hub_body,
            angular_velocity,
            angle: 0.0,
        })
    }

    /// Copy the parts' current scene world poses into their kinematic
    /// bodies. Must run before `PhysicsWorld::step`, otherwise the solver
    /// acts on a stale pose.
    pub fn sync_bodies(&self, scene: &SceneGraph, world: &mut PhysicsWorld) {
        for (node, body) in [
            (self.blade_node, self.blade_body),
            (self.hub_node, self.hub_body),
        ] {
            if let Some(pose) = scene.world_pose(node) {
                world.set_next_kinematic_pose(body, pose);
            }
        }
    }

    /// Advance the presentation rotation by one tick.
    pub fn advance(&mut self, scene: &mut SceneGraph) {
        self.angle += self.angular_velocity;
        scene.set_rotation(
            self.container,
            Quat::from_axis_angle(&Vec3::y_axis(), -self.angle),
        );
    }

    /// Unwrapped cumulative rotation magnitude (radians).
    #[inline]
    pub fn rotation_angle(&self) -> f32 {
        self.angle
    }

    /// Reference point for distance-based eviction: the hub body's world
    /// position. The hub rather than the orbiting blade, so the eviction
    /// radius does not wobble with the blade's phase.
    pub fn reference_point(&self, world: &PhysicsWorld) -> Vec3 {
        world.body_translation(self.hub_body).unwrap_or_default()
    }

    /// Whether `body` belongs to the driver.
    #[inline]
    pub fn owns_body(&self, body: RigidBodyHandle) -> bool {
        body == self.blade_body || body == self.hub_body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn setup() -> (SceneGraph, PhysicsWorld, KinematicDriver) {
        let mut scene = SceneGraph::new();
        let mut world = PhysicsWorld::default();
        let driver =
            KinematicDriver::build(&mut scene, &mut world, settings::ANGULAR_VELOCITY).unwrap();
        (scene, world, driver)
    }

    #[test]
    fn advance_accumulates_angle() {
        let (mut scene, _world, mut driver) = setup();
        for _ in 0..10 {
            driver.advance(&mut scene);
        }
        assert_relative_eq!(
            driver.rotation_angle(),
            10.0 * settings::ANGULAR_VELOCITY,
            epsilon = 1e-6
        );
    }

    #[test]
    fn blade_world_pose_follows_container_rotation() {
        let (mut scene, _world, mut driver) = setup();

        let before = scene.world_pose(driver.blade_node).unwrap();
        assert_relative_eq!(before.translation.x, settings::BLADE_OFFSET_X, epsilon = 1e-6);

        driver.advance(&mut scene);

        let after = scene.world_pose(driver.blade_node).unwrap();
        // A negative yaw about +Y carries the +X offset toward +Z.
        assert!(after.translation.z > 0.0);
        assert_relative_eq!(
            after.translation.norm(),
            settings::BLADE_OFFSET_X,
            epsilon = 1e-5
        );
    }

    #[test]
    fn sync_bodies_lands_the_assigned_pose_after_step() {
        let (mut scene, mut world, mut driver) = setup();

        driver.advance(&mut scene);
        let expected = scene.world_pose(driver.blade_node).unwrap();

        driver.sync_bodies(&scene, &mut world);
        world.step(settings::FIXED_DT).unwrap();

        let blade = world.body_pose(driver.blade_body).unwrap();
        assert_relative_eq!(
            (blade.translation - expected.translation).norm(),
            0.0,
            epsilon = 1e-5
        );
        assert_relative_eq!(blade.rotation.angle_to(&expected.rotation), 0.0, epsilon = 1e-5);
    }
}
