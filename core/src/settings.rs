/*!
Tuning constants for the propeller toy.

These centralize the parameters used by the physics world, the spawner, the
reaper, and the kinematic driver. Keeping them together makes tuning easier
and helps ensure deterministic behavior across platforms.

Notes
- Distances are in meters, time in seconds, angles in radians.
- One tick is one fixed physics interval; the presentation layer drives one
  tick per display refresh.
*/

use crate::types::Vec3;

/// Fixed physics timestep (seconds). One `step` per tick.
pub const FIXED_DT: f32 = 1.0 / 60.0;

/// World gravity. The sideways +Z pull is deliberate: it herds the spheres
/// against the ring and into the blade's sweep.
pub const GRAVITY: Vec3 = Vec3::new(0.0, -5.0, 20.0);

/// Driver rotation per tick (radians). Applied as a negative yaw.
pub const ANGULAR_VELOCITY: f32 = 0.015;

/// Sphere radius (meters) and mass (kilograms).
pub const SPHERE_RADIUS: f32 = 0.15;
pub const SPHERE_MASS: f32 = 3.0;

/// Height above the floor at which new spheres appear.
pub const SPAWN_HEIGHT: f32 = 0.3;

/// Number of spheres in the startup burst.
pub const BURST_COUNT: usize = 150;

/// Radius of the spawn disk sampled for burst/hold positions.
pub const SPAWN_DISK_RADIUS: f32 = 2.0;

/// Delay before the first burst sphere is due (ticks). One second at 60 Hz.
pub const BURST_DELAY_TICKS: u64 = 60;

/// Spacing between consecutive burst spheres (ticks).
pub const BURST_STAGGER_TICKS: u64 = 1;

/// Minimum spacing between hold-to-spawn spheres (ticks).
pub const HOLD_INTERVAL_TICKS: u64 = 12;

/// Distance from the driver hub beyond which a sphere is evicted.
/// The boundary is exclusive: a sphere sitting exactly at this distance stays.
pub const REAP_DISTANCE: f32 = 20.0;

/// Propeller blade dimensions (meters) and its offset from the hub.
pub const BLADE_HALF_EXTENTS: Vec3 = Vec3::new(1.525, 0.5, 0.15);
pub const BLADE_OFFSET_X: f32 = 1.45;

/// Hub cylinder dimensions (meters).
pub const HUB_RADIUS: f32 = 0.2;
pub const HUB_HALF_HEIGHT: f32 = 1.0;

/// Ring enclosure: segment count, segment half-extents, and ring radius.
pub const RING_SEGMENTS: usize = 150;
pub const RING_SEGMENT_HALF_EXTENTS: Vec3 = Vec3::new(0.1, 0.5, 0.025);
pub const RING_RADIUS: f32 = 1.48 * 2.0;

/// Ceiling slab half-extents and center height.
pub const CEILING_HALF_EXTENTS: Vec3 = Vec3::new(3.0, 0.1, 3.0);
pub const CEILING_HEIGHT: f32 = 1.0;

/// Collision response applied when a sphere meets the blade: a world-space
/// impulse plus a body-local force integrated over one fixed step.
pub const BLADE_KICK_IMPULSE: Vec3 = Vec3::new(-4.0, 0.0, 0.0);
pub const BLADE_KICK_LOCAL_FORCE: Vec3 = Vec3::new(80.0, 0.0, 0.0);
