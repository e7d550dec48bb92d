//! Owns the core [`Stage`] as a resource and runs one synchronization tick
//! per rendered frame.

use bevy::prelude::*;
use whirl_core::{Stage, StageSettings};

/// The whole toy, wrapped for the ECS. Everything the mirror renders comes
/// out of this.
#[derive(Resource)]
pub struct StageRes(pub Stage);

/// Systems that advance the core tick. The mirror runs after this set so it
/// always sees this frame's poses.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct StageTickSet;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, setup);
    app.add_systems(Update, advance.in_set(StageTickSet));
}

fn setup(mut commands: Commands, mut exit: MessageWriter<AppExit>) {
    match Stage::new(StageSettings::default()) {
        Ok(stage) => {
            commands.insert_resource(StageRes(stage));
        }
        Err(err) => {
            // The only fatal path: report once and quit.
            error!("failed to initialize the stage: {err}");
            exit.write(AppExit::error());
        }
    }
}

fn advance(stage: Option<ResMut<StageRes>>) {
    if let Some(mut stage) = stage {
        stage.0.tick();
    }
}
