//! Scene lighting: soft ambient fill, one shadow-casting directional light,
//! and the violet point light that gives the toy its tint.

use bevy::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 150.0,
        ..default()
    });
    app.add_systems(Startup, add_lights);
}

fn add_lights(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(2.0, 2.0, -2.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        PointLight {
            color: Color::srgb_u8(0x39, 0x0f, 0xff),
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(1.5, 4.0, -2.4),
    ));
}
