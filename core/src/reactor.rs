/*!
Collision-triggered impulse responses.

Each sphere subscribes at spawn time and is unsubscribed when it is removed,
so the subscription's lifetime matches the object's. After every physics
step the frame loop hands the step's contact-started events to `dispatch`;
any event pairing a subscribed sphere with a driver body gets the blade
kick: a fixed world-space impulse plus a body-local force applied over one
step. Both are constant, so the response is deterministic for a given
collision state.

A response that fails to apply (typically because the body was removed in
the same tick) is logged and skipped; it never blocks the remaining events.
*/

use std::collections::HashSet;

use rapier3d::prelude::RigidBodyHandle;

use crate::settings;
use crate::types::Vec3;
use crate::world::{ContactStarted, PhysicsWorld};

pub struct CollisionReactor {
    /// Bodies whose contact with these triggers the kick.
    driver_bodies: Vec<RigidBodyHandle>,
    subscribed: HashSet<RigidBodyHandle>,
    impulse: Vec3,
    local_force: Vec3,
}

impl CollisionReactor {
    pub fn new(driver_bodies: Vec<RigidBodyHandle>) -> Self {
        Self {
            driver_bodies,
            subscribed: HashSet::new(),
            impulse: settings::BLADE_KICK_IMPULSE,
            local_force: settings::BLADE_KICK_LOCAL_FORCE,
        }
    }

    /// Start reacting to collisions involving `body`.
    pub fn subscribe(&mut self, body: RigidBodyHandle) {
        self.subscribed.insert(body);
    }

    /// Stop reacting to `body`. Called as part of removing the object.
    pub fn unsubscribe(&mut self, body: RigidBodyHandle) {
        self.subscribed.remove(&body);
    }

    pub fn subscription_count(&self) -> usize {
        self.subscribed.len()
    }

    /// Apply the kick for every event pairing a subscribed sphere with a
    /// driver body. Returns the number of kicks applied.
    pub fn dispatch(
        &self,
        events: &[ContactStarted],
        world: &mut PhysicsWorld,
        dt: f32,
    ) -> usize {
        let mut applied = 0;
        for event in events {
            for &driver in &self.driver_bodies {
                let Some(partner) = event.partner_of(driver) else {
                    continue;
                };
                if !self.subscribed.contains(&partner) {
                    continue;
                }
                // Failures are isolated per event so one stale handle
                // cannot starve the rest of the batch.
                if world.apply_kick(partner, self.impulse, self.local_force, dt) {
                    applied += 1;
                } else {
                    log::warn!("collision response skipped: sphere body already gone");
                }
            }
        }
        applied
    }
}
