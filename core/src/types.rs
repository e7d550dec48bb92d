/*!
Core math aliases and shape definitions shared by the whirl modules.

This module intentionally contains no algorithms. It defines the data types
exchanged between:
- world (the rapier-backed rigid-body collaborator)
- scene (the visual node graph the renderer consumes)
- stage (the per-tick synchronizer that moves transforms between the two)
*/

use nalgebra as na;
use rapier3d::prelude::{ColliderBuilder, SharedShape, UnitVector};

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// A rigid transform (isometry) in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Pose {
    #[inline]
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Pose with no rotation.
    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::identity())
    }

    #[inline]
    pub fn identity() -> Self {
        Self::new(Vec3::zeros(), Quat::identity())
    }

    /// Convert to nalgebra `Isometry3` for use with rapier.
    #[inline]
    pub fn iso(&self) -> Iso {
        Iso::from_parts(
            na::Translation3::new(self.translation.x, self.translation.y, self.translation.z),
            self.rotation,
        )
    }

    /// Compose `self * local`: the world pose of a child expressed in this frame.
    #[inline]
    pub fn transform(&self, local: &Pose) -> Pose {
        Pose {
            translation: self.translation + self.rotation * local.translation,
            rotation: self.rotation * local.rotation,
        }
    }
}

impl From<Iso> for Pose {
    #[inline]
    fn from(iso: Iso) -> Self {
        Self {
            translation: iso.translation.vector,
            rotation: iso.rotation,
        }
    }
}

/// Collision shapes used by this scene.
///
/// Keep this intentionally small. The shapes are expressed in the body's local
/// frame; the world-space placement comes from the owning body's pose.
#[derive(Clone, Copy, Debug)]
pub enum ShapeDef {
    /// Infinite half-space whose outward normal is the body-local +Y axis.
    ///
    /// In rapier a plane is infinite; any visual extent is a rendering
    /// concern, not collision.
    Plane,

    /// Axis-aligned (in local space) cuboid with given half-extents (meters).
    Cuboid { half_extents: Vec3 },

    /// Sphere/ball (meters).
    Sphere { radius: f32 },

    /// Y-aligned cylinder (meters).
    CylinderY { radius: f32, half_height: f32 },
}

/// Build a rapier collider from a [`ShapeDef`].
///
/// The collider is created with identity local transform; the parent body's
/// pose places it in the world.
pub fn collider_from_shape(shape: &ShapeDef) -> ColliderBuilder {
    match shape {
        ShapeDef::Plane => {
            let up = UnitVector::new_normalize(Vec3::y());
            ColliderBuilder::new(SharedShape::halfspace(up))
        }
        ShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }
        ShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius),
        ShapeDef::CylinderY {
            radius,
            half_height,
        } => ColliderBuilder::cylinder(*half_height, *radius),
    }
}
