//! Top-down camera: a narrow 20-degree perspective looking straight down
//! the ring from thirty meters up.

use bevy::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, add_camera);
}

const CAMERA_HEIGHT: f32 = 30.0;
const CAMERA_FOV_DEGREES: f32 = 20.0;

fn add_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: CAMERA_FOV_DEGREES.to_radians(),
            ..default()
        }),
        // Looking straight down; -Z as the up reference keeps the basis
        // well-defined.
        Transform::from_xyz(0.0, CAMERA_HEIGHT, 0.0).looking_at(Vec3::ZERO, Vec3::NEG_Z),
    ));
}
