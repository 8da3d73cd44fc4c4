//! Stateless geometry and kinematics helpers.
//!
//! # Coordinate Convention
//!
//! The world is a toroidal square plane `[0, world_size)²` with a linear depth
//! axis. Heading 0° points along -y ("north" on the client map) and increases
//! clockwise, so a unit moving at heading `h` is displaced by
//! `(sin h, -cos h) * distance`. [`bearing`] uses the same convention, which
//! means a contact straight ahead of a submarine reports a bearing equal to
//! its heading.
//!
//! ```
//! use uboat_core::physics::{bearing, heading_vector};
//! use glam::DVec2;
//!
//! let east = heading_vector(90.0);
//! assert!((east - DVec2::new(1.0, 0.0)).length() < 1e-12);
//! assert!((bearing(DVec2::new(100.0, 0.0)) - 90.0).abs() < 1e-12);
//! ```

use glam::DVec2;

/// Maps a coordinate into `[0, size)`.
///
/// Values within one world length of the plane (the only ones normal motion
/// produces) move by exactly one `size`; anything further out is reduced with
/// Euclidean remainder so the result is always in range.
#[must_use]
pub fn wrap(value: f64, size: f64) -> f64 {
    let wrapped = if value < 0.0 {
        value + size
    } else if value >= size {
        value - size
    } else {
        return value;
    };
    if (0.0..size).contains(&wrapped) {
        return wrapped;
    }
    let reduced = value.rem_euclid(size);
    // rem_euclid of a tiny negative rounds up to exactly `size`
    if reduced >= size {
        0.0
    } else {
        reduced
    }
}

/// Wraps both components of a position onto the plane.
#[must_use]
pub fn wrap_position(position: DVec2, size: f64) -> DVec2 {
    DVec2::new(wrap(position.x, size), wrap(position.y, size))
}

/// Clamps `value` into `[lo, hi]`. A NaN input yields `lo`.
#[must_use]
pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

/// Normalizes an angle into `[0, 360)`.
#[must_use]
pub fn normalize_heading(degrees: f64) -> f64 {
    let h = degrees.rem_euclid(360.0);
    if h >= 360.0 {
        0.0
    } else {
        h
    }
}

/// Shortest signed rotation from `current` to `target`, in `(-180, 180]`.
///
/// ```
/// use uboat_core::physics::angular_difference;
///
/// assert_eq!(angular_difference(10.0, 350.0), 20.0);
/// assert_eq!(angular_difference(350.0, 10.0), -20.0);
/// assert_eq!(angular_difference(180.0, 0.0), 180.0);
/// ```
#[must_use]
pub fn angular_difference(target: f64, current: f64) -> f64 {
    let diff = normalize_heading(target - current);
    if diff > 180.0 {
        diff - 360.0
    } else {
        diff
    }
}

/// Moves `current` toward `target` by at most `max_delta`, never overshooting.
#[must_use]
pub fn move_towards(current: f64, target: f64, max_delta: f64) -> f64 {
    if current < target {
        (current + max_delta).min(target)
    } else {
        (current - max_delta).max(target)
    }
}

/// Turns `heading` toward `target` by at most `max_turn` degrees along the
/// shorter arc. Snaps onto the target once it is within reach.
#[must_use]
pub fn turn_towards(heading: f64, target: f64, max_turn: f64) -> f64 {
    let turn = clamp(max_turn, 0.0, 360.0);
    let diff = angular_difference(target, heading);
    if diff.abs() < turn {
        normalize_heading(target)
    } else {
        normalize_heading(heading + turn.copysign(diff))
    }
}

/// Converts a speed order into a target speed in `[0, max_speed]`.
///
/// Values up to `order_max` are throttle notches mapped proportionally onto
/// the speed range; larger values are absolute speeds.
///
/// ```
/// use uboat_core::physics::interpret_speed_command;
///
/// assert_eq!(interpret_speed_command(2.0, 4.0, 20.0), 10.0);
/// assert_eq!(interpret_speed_command(4.0, 4.0, 20.0), 20.0);
/// assert_eq!(interpret_speed_command(12.5, 4.0, 20.0), 12.5);
/// assert_eq!(interpret_speed_command(99.0, 4.0, 20.0), 20.0);
/// assert_eq!(interpret_speed_command(-3.0, 4.0, 20.0), 0.0);
/// ```
#[must_use]
pub fn interpret_speed_command(command: f64, order_max: f64, max_speed: f64) -> f64 {
    if command <= order_max {
        clamp(command / order_max * max_speed, 0.0, max_speed)
    } else {
        clamp(command, 0.0, max_speed)
    }
}

/// Unit displacement for a heading in degrees.
#[must_use]
pub fn heading_vector(heading: f64) -> DVec2 {
    let rad = heading.to_radians();
    DVec2::new(rad.sin(), -rad.cos())
}

/// Compass bearing in `[0, 360)` of a horizontal offset from the observer.
#[must_use]
pub fn bearing(offset: DVec2) -> f64 {
    normalize_heading(offset.x.atan2(-offset.y).to_degrees())
}

/// Straight-line distance between two points including depth separation.
///
/// The plane offset is not wrapped: sonar hears across open water only.
#[must_use]
pub fn distance_3d(a: DVec2, a_depth: f64, b: DVec2, b_depth: f64) -> f64 {
    let dz = b_depth - a_depth;
    (b - a).extend(dz).length()
}

/// Tests a point against a hull modelled as a horizontal capsule.
///
/// The hull is a segment of `2 * half_length` centred on `center`, oriented
/// along `heading`. The point's horizontal offset is projected onto the hull
/// axis and clamped to the segment; the perpendicular horizontal distance to
/// that closest point is combined with the depth separation, and the point
/// hits if the resulting 3-D distance is at most `radius`. A long hull is
/// therefore far easier to hit broadside than end-on.
#[must_use]
pub fn capsule_hit_test(
    point: DVec2,
    point_depth: f64,
    center: DVec2,
    center_depth: f64,
    heading: f64,
    half_length: f64,
    radius: f64,
) -> bool {
    let axis = heading_vector(heading);
    let rel = point - center;
    let along = clamp(rel.dot(axis), -half_length, half_length);
    let closest = center + axis * along;
    let horizontal = point.distance(closest);
    let dz = point_depth - center_depth;
    horizontal.hypot(dz) <= radius
}
