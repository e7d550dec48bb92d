//! Conversions between whirl-core's nalgebra types and Bevy's math types.
//! The only module that knows both.

use bevy::math::{Quat, Vec3};
use whirl_core::Pose;

#[inline]
pub fn vec3_from_core(v: whirl_core::Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

#[inline]
pub fn quat_from_core(q: whirl_core::Quat) -> Quat {
    let q = q.quaternion();
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

/// Build a Bevy `Transform` from a core pose.
#[inline]
pub fn transform_from_pose(pose: &Pose) -> bevy::prelude::Transform {
    bevy::prelude::Transform {
        translation: vec3_from_core(pose.translation),
        rotation: quat_from_core(pose.rotation),
        ..Default::default()
    }
}
