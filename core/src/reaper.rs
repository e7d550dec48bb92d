/*!
Distance-based eviction of runaway spheres.

Run once per tick after transforms are synced. A sphere whose body has
drifted strictly beyond `threshold` meters from the reference point (the
driver's hub) is removed from the world, the scene, the binding table, and
the reactor's subscriptions in one pass, so no half-removed state is ever
observable.

The scan walks a snapshot of the binding table. Removing entries during a
forward scan over the live table would skip the element after each removal;
the snapshot makes the pass immune to that.
*/

use crate::binding::BindingTable;
use crate::reactor::CollisionReactor;
use crate::scene::SceneGraph;
use crate::types::Vec3;
use crate::world::PhysicsWorld;

pub struct Reaper {
    /// Eviction distance (meters). Exclusive: a sphere at exactly this
    /// distance is retained.
    pub threshold: f32,
}

impl Reaper {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Evict every bound sphere beyond the threshold. Returns how many were
    /// removed.
    pub fn reap(
        &self,
        reference: Vec3,
        bindings: &mut BindingTable,
        world: &mut PhysicsWorld,
        scene: &mut SceneGraph,
        reactor: &mut CollisionReactor,
    ) -> usize {
        let mut evicted = 0;
        for pair in bindings.snapshot() {
            let Some(translation) = world.body_translation(pair.body) else {
                // Body vanished out from under us; drop the stale entry so
                // the pairing invariant holds again.
                log::warn!("reaper found a binding without a live body; detaching {}", pair.node);
                bindings.remove_by_body(pair.body);
                scene.remove(pair.node);
                reactor.unsubscribe(pair.body);
                continue;
            };
            if (translation - reference).norm() > self.threshold {
                bindings.remove_by_body(pair.body);
                world.remove_body(pair.body);
                scene.remove(pair.node);
                reactor.unsubscribe(pair.body);
                evicted += 1;
            }
        }
        if evicted > 0 {
            log::debug!("reaped {evicted} sphere(s) beyond {} m", self.threshold);
        }
        evicted
    }
}
