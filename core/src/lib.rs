/*!
whirl-core: the render/physics synchronization core of the propeller toy.

A rotating propeller inside a ring enclosure batting spheres around, as a
library: a rapier-backed rigid-body world, a minimal scene graph, and the
per-tick loop that keeps the two consistent. Rendering and input are left
to a host (see the `whirl-client` Bevy shell); the host's only obligations
are to call [`stage::Stage::tick`] once per display refresh, mirror the
scene graph however it likes, and forward spawn triggers.

Module map
- types:    math aliases, poses, collision shape definitions
- settings: tuning constants
- world:    the rapier rigid-body collaborator (bodies, step, events)
- material: named contact materials and the pairwise coefficient registry
- scene:    the visual node graph the renderer consumes
- binding:  the body–visual pairing table for dynamic spheres
- driver:   the kinematically driven propeller (container/blade/hub)
- spawner:  deterministic tick-based spawn scheduling
- reaper:   distance-based eviction of runaway spheres
- reactor:  collision-triggered impulse responses
- stage:    the explicit context owning all of the above, plus the tick
*/

pub mod binding;
pub mod driver;
pub mod error;
pub mod material;
pub mod reactor;
pub mod reaper;
pub mod scene;
pub mod settings;
pub mod spawner;
pub mod stage;
pub mod types;
pub mod world;

pub use binding::{BindingTable, BoundPair};
pub use driver::KinematicDriver;
pub use error::{BindingError, SceneError, SpawnError, StageError, WorldError};
pub use material::{ContactMaterialRegistry, ContactProps, Material};
pub use reactor::CollisionReactor;
pub use reaper::Reaper;
pub use scene::{Node, NodeId, NodeKind, SceneGraph};
pub use spawner::SphereSpawner;
pub use stage::{Stage, StageSettings};
pub use types::{Pose, Quat, ShapeDef, Vec3};
pub use world::{ContactStarted, PhysicsWorld};
