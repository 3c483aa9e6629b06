//! Steering helpers that turn a goal point into a `MovementIntent`.
//!
//! Angles are compared in the thrust frame: a ship accelerates along its net
//! thrust direction, so that is the heading it must align with the goal.

use std::f64::consts::{PI, TAU};

use glam::DVec2;

use hullbreak_core::constants::*;
use hullbreak_core::intent::MovementIntent;
use hullbreak_core::types::rotate;

/// What steering needs to know about the ship being steered.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Kinematics {
    pub position: DVec2,
    pub velocity: DVec2,
    /// Unit vector the ship accelerates along, in world space.
    pub thrust_dir: DVec2,
}

/// Signed smallest rotation from `from` to `to`, in (-PI, PI].
pub fn angle_diff(from: f64, to: f64) -> f64 {
    let d = (to - from).rem_euclid(TAU);
    if d > PI {
        d - TAU
    } else {
        d
    }
}

fn heading(v: DVec2) -> f64 {
    v.y.atan2(v.x)
}

fn turn_toward(thrust_dir: DVec2, desired: DVec2) -> (bool, bool) {
    let delta = angle_diff(heading(thrust_dir), heading(desired));
    (delta < -STEER_TURN_TOLERANCE, delta > STEER_TURN_TOLERANCE)
}

/// Angle between the thrust direction and the direction to `target`.
pub fn thrust_alignment_delta(k: &Kinematics, target: DVec2) -> f64 {
    let desired = (target - k.position).normalize_or_zero();
    k.thrust_dir.dot(desired).clamp(-1.0, 1.0).acos()
}

pub fn is_thrust_facing(k: &Kinematics, target: DVec2, threshold: f64) -> bool {
    thrust_alignment_delta(k, target) <= threshold
}

/// Rotate toward `target` without thrusting.
pub fn face_target(k: &Kinematics, target: DVec2) -> MovementIntent {
    let desired = (target - k.position).normalize_or_zero();
    let (rotate_left, rotate_right) = turn_toward(k.thrust_dir, desired);
    MovementIntent {
        rotate_left,
        rotate_right,
        ..Default::default()
    }
}

/// Fly to `target`, braking on arrival if still closing fast.
pub fn approach_target(k: &Kinematics, target: DVec2) -> MovementIntent {
    let to_target = target - k.position;
    let dist = to_target.length();
    let desired = to_target.normalize_or_zero();

    let mut thrust_forward = false;
    let mut brake = false;
    if dist < STEER_ARRIVAL_RADIUS {
        brake = k.velocity.dot(desired) > STEER_BRAKE_SPEED;
    } else if is_thrust_facing(k, target, STEER_ALIGN_TOLERANCE) {
        thrust_forward = true;
    }

    let (rotate_left, rotate_right) = turn_toward(k.thrust_dir, desired);
    MovementIntent {
        thrust_forward,
        brake,
        rotate_left,
        rotate_right,
        ..Default::default()
    }
}

/// Circle `target` at `radius`, correcting when the radius drifts.
pub fn orbit_target(k: &Kinematics, target: DVec2, radius: f64) -> MovementIntent {
    let to_target = target - k.position;
    let radius_error = to_target.length() - radius;
    let dir = to_target.normalize_or_zero();
    let tangent = DVec2::new(-dir.y, dir.x);

    let (rotate_left, rotate_right) = turn_toward(k.thrust_dir, tangent);

    let alignment = k.velocity.normalize_or_zero().dot(tangent);
    let mut thrust_forward = false;
    let mut brake = false;
    if radius_error.abs() > ORBIT_RADIUS_TOLERANCE {
        if radius_error > 0.0 {
            thrust_forward = true;
        } else if alignment > 0.7 {
            brake = true;
        }
    } else if alignment < 0.5 {
        thrust_forward = true;
    }

    MovementIntent {
        thrust_forward,
        brake,
        rotate_left,
        rotate_right,
        ..Default::default()
    }
}

/// Position of a body after `t` seconds at constant velocity.
pub fn predict_position(position: DVec2, velocity: DVec2, t: f64) -> DVec2 {
    position + velocity * t
}

/// Aim point that intercepts a constant-velocity target.
/// Falls back to the target's current position when no intercept exists.
pub fn lead_target(
    shooter: DVec2,
    target_pos: DVec2,
    target_vel: DVec2,
    projectile_speed: f64,
) -> DVec2 {
    let to_target = target_pos - shooter;
    let a = target_vel.dot(target_vel) - projectile_speed * projectile_speed;
    let b = 2.0 * to_target.dot(target_vel);
    let c = to_target.dot(to_target);

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 || a.abs() < 1e-5 {
        return target_pos;
    }

    let sqrt_disc = discriminant.sqrt();
    let t1 = (-b - sqrt_disc) / (2.0 * a);
    let t2 = (-b + sqrt_disc) / (2.0 * a);
    predict_position(target_pos, target_vel, t1.max(t2).max(0.0))
}

/// Local push direction of an engine block. Engines push opposite the way they face.
pub fn block_thrust_direction(rotation_deg: f64) -> DVec2 {
    let facing = rotation_deg.to_radians();
    DVec2::new(facing.sin(), -facing.cos())
}

/// Normalized world-space sum of engine pushes, or zero with no engines.
/// Each engine is `(block rotation in degrees, thrust power)`.
pub fn net_thrust_direction(
    ship_rotation: f64,
    engines: impl IntoIterator<Item = (f64, f64)>,
) -> DVec2 {
    let sum = engines
        .into_iter()
        .fold(DVec2::ZERO, |acc, (rotation_deg, power)| {
            acc + rotate(block_thrust_direction(rotation_deg), ship_rotation) * power
        });
    sum.normalize_or_zero()
}
