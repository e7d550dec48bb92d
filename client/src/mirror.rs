//! Mirrors the core scene graph into Bevy entities.
//!
//! Each frame (after the stage tick) the mirror diffs the core's nodes
//! against its `NodeId -> Entity` map: new nodes get a mesh entity chosen by
//! their [`NodeKind`], vanished nodes get despawned, and every surviving
//! entity receives its node's world pose. The core never learns Bevy exists.

use std::collections::HashMap;

use bevy::prelude::*;
use whirl_core::{NodeId, NodeKind};

use crate::convert::transform_from_pose;
use crate::stage::{StageRes, StageTickSet};

/// Maps core scene nodes to their Bevy entities.
#[derive(Resource, Default)]
struct NodeEntities(HashMap<NodeId, Entity>);

/// Mesh/material handles shared by all mirrored entities, so sphere churn
/// does not allocate new assets.
#[derive(Resource)]
struct MirrorAssets {
    sphere_mesh: Handle<Mesh>,
    sphere_material: Handle<StandardMaterial>,
    blade_mesh: Handle<Mesh>,
    hub_mesh: Handle<Mesh>,
    segment_mesh: Handle<Mesh>,
    structure_material: Handle<StandardMaterial>,
    floor_mesh: Handle<Mesh>,
    floor_material: Handle<StandardMaterial>,
}

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<NodeEntities>();
    app.add_systems(Startup, setup_assets);
    app.add_systems(Update, sync_scene.after(StageTickSet));
}

fn setup_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    use whirl_core::settings as s;

    commands.insert_resource(MirrorAssets {
        sphere_mesh: meshes.add(Sphere::new(s::SPHERE_RADIUS)),
        sphere_material: materials.add(StandardMaterial {
            base_color: Color::srgb_u8(0x39, 0x0f, 0xff),
            metallic: 0.1,
            perceptual_roughness: 0.1,
            ..default()
        }),
        blade_mesh: meshes.add(Cuboid::new(
            s::BLADE_HALF_EXTENTS.x * 2.0,
            s::BLADE_HALF_EXTENTS.y * 2.0,
            s::BLADE_HALF_EXTENTS.z * 2.0,
        )),
        hub_mesh: meshes.add(Cylinder::new(s::HUB_RADIUS, s::HUB_HALF_HEIGHT * 2.0)),
        segment_mesh: meshes.add(Cuboid::new(
            s::RING_SEGMENT_HALF_EXTENTS.x * 2.0,
            s::RING_SEGMENT_HALF_EXTENTS.y * 2.0,
            s::RING_SEGMENT_HALF_EXTENTS.z * 2.0,
        )),
        structure_material: materials.add(StandardMaterial {
            base_color: Color::WHITE,
            metallic: 0.0,
            perceptual_roughness: 1.0,
            ..default()
        }),
        floor_mesh: meshes.add(Plane3d::default().mesh().size(10.0, 10.0).build()),
        floor_material: materials.add(StandardMaterial {
            base_color: Color::srgb_u8(26, 26, 26),
            metallic: 0.5,
            perceptual_roughness: 0.5,
            ..default()
        }),
    });
}

fn sync_scene(
    mut commands: Commands,
    stage: Option<Res<StageRes>>,
    assets: Res<MirrorAssets>,
    mut map: ResMut<NodeEntities>,
    mut transforms: Query<&mut Transform>,
) {
    let Some(stage) = stage else {
        return;
    };
    let scene = &stage.0.scene;

    // Despawn entities whose nodes are gone (reaped spheres).
    map.0.retain(|id, entity| {
        if scene.contains(*id) {
            true
        } else {
            commands.entity(*entity).despawn();
            false
        }
    });

    for (id, node) in scene.iter() {
        let Some(pose) = scene.world_pose(id) else {
            continue;
        };
        let transform = transform_from_pose(&pose);

        if let Some(&entity) = map.0.get(&id) {
            if let Ok(mut existing) = transforms.get_mut(entity) {
                *existing = transform;
            }
            continue;
        }

        let entity = match mesh_for(node.kind, &assets) {
            Some((mesh, material)) => commands
                .spawn((Mesh3d(mesh), MeshMaterial3d(material), transform))
                .id(),
            // Container and ceiling have no visual; keep a bare transform so
            // the map still covers every node.
            None => commands.spawn((transform, Visibility::default())).id(),
        };
        map.0.insert(id, entity);
    }
}

fn mesh_for(
    kind: NodeKind,
    assets: &MirrorAssets,
) -> Option<(Handle<Mesh>, Handle<StandardMaterial>)> {
    match kind {
        NodeKind::Sphere => Some((assets.sphere_mesh.clone(), assets.sphere_material.clone())),
        NodeKind::Blade => Some((assets.blade_mesh.clone(), assets.structure_material.clone())),
        NodeKind::Hub => Some((assets.hub_mesh.clone(), assets.structure_material.clone())),
        NodeKind::RingSegment => Some((
            assets.segment_mesh.clone(),
            assets.structure_material.clone(),
        )),
        NodeKind::Floor => Some((assets.floor_mesh.clone(), assets.floor_material.clone())),
        NodeKind::Container | NodeKind::Ceiling => None,
    }
}
