//! Input forwarding: holding Space streams spheres into the ring.
//!
//! The core polls its hold flag once per tick, so releasing the key stops
//! further spawns on the very next tick with nothing left to cancel.

use bevy::prelude::*;

use crate::stage::{StageRes, StageTickSet};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Update, spawn_hold.before(StageTickSet));
}

fn spawn_hold(keys: Res<ButtonInput<KeyCode>>, stage: Option<ResMut<StageRes>>) {
    let Some(mut stage) = stage else {
        return;
    };
    if keys.just_pressed(KeyCode::Space) {
        stage.0.spawner.set_hold(true);
    }
    if keys.just_released(KeyCode::Space) {
        stage.0.spawner.set_hold(false);
    }
}
