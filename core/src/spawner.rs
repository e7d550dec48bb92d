/*!
Sphere spawn scheduling.

The startup burst and hold-to-spawn are both expressed as tick-based state
consumed by the frame loop, which makes spawn timing deterministic and
testable without a clock:

- The burst is a queue of `(due_tick, position)` requests, drained by
  `due_positions` as ticks pass.
- Hold-to-spawn is a polled flag gated by a fixed tick interval. Releasing
  the hold stops further spawns instantly; there is no pending timer to
  cancel.

Positions are sampled inside a disk with a restricted angular range
(`a` in `[0, pi/2)`) and the odd `sin(a - 3)` / `sin(a - 2)` axes. That
asymmetry is part of the look; keep it.
*/

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::settings;
use crate::types::Vec3;

/// Tick-based spawn scheduler for dynamic spheres.
pub struct SphereSpawner {
    /// Pending (due_tick, position) requests, in due order.
    schedule: VecDeque<(u64, Vec3)>,
    disk_radius: f32,
    hold_active: bool,
    hold_interval: u64,
    last_hold_spawn: Option<u64>,
    rng: StdRng,
}

impl SphereSpawner {
    pub fn new(seed: u64, disk_radius: f32, hold_interval: u64) -> Self {
        Self {
            schedule: VecDeque::new(),
            disk_radius,
            hold_active: false,
            hold_interval,
            last_hold_spawn: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Queue `count` spawn requests starting `settings::BURST_DELAY_TICKS`
    /// after `now`, staggered `settings::BURST_STAGGER_TICKS` apart.
    pub fn schedule_burst(&mut self, now: u64, count: usize) {
        for index in 0..count {
            let due = now
                + settings::BURST_DELAY_TICKS
                + (index as u64 + 1) * settings::BURST_STAGGER_TICKS;
            let position = self.sample_disk();
            self.schedule.push_back((due, position));
        }
    }

    /// Begin or end hold-to-spawn. Ending it cancels any further hold
    /// spawns immediately; the burst schedule is unaffected.
    pub fn set_hold(&mut self, active: bool) {
        self.hold_active = active;
        if !active {
            self.last_hold_spawn = None;
        }
    }

    #[inline]
    pub fn is_holding(&self) -> bool {
        self.hold_active
    }

    pub fn pending(&self) -> usize {
        self.schedule.len()
    }

    /// Positions due at `tick`: every scheduled request whose due tick has
    /// passed, plus at most one hold spawn if the interval has elapsed.
    pub fn due_positions(&mut self, tick: u64) -> Vec<Vec3> {
        let mut due = Vec::new();
        while let Some(&(when, position)) = self.schedule.front() {
            if when > tick {
                break;
            }
            self.schedule.pop_front();
            due.push(position);
        }

        if self.hold_active {
            let ready = match self.last_hold_spawn {
                None => true,
                Some(last) => tick.saturating_sub(last) >= self.hold_interval,
            };
            if ready {
                self.last_hold_spawn = Some(tick);
                due.push(self.sample_disk());
            }
        }

        due
    }

    /// Sample a spawn position inside the disk: `a = u1 * pi/2`,
    /// `r = R * sqrt(u2)`, `x = r * sin(a - 3)`, `z = r * sin(a - 2)`.
    pub fn sample_disk(&mut self) -> Vec3 {
        let a = self.rng.random::<f32>() * std::f32::consts::FRAC_PI_2;
        let r = self.disk_radius * self.rng.random::<f32>().sqrt();
        Vec3::new(
            r * (a - 3.0).sin(),
            settings::SPAWN_HEIGHT,
            r * (a - 2.0).sin(),
        )
    }
}

impl Default for SphereSpawner {
    fn default() -> Self {
        Self::new(
            0,
            settings::SPAWN_DISK_RADIUS,
            settings::HOLD_INTERVAL_TICKS,
        )
    }
}
