use glam::{Quat, Vec3};

const DIRECTION_EPSILON: f32 = 1.0e-6;

/// Normalizes `v`, or returns `None` when it is too short to carry a direction.
pub fn safe_normalize(v: Vec3) -> Option<Vec3> {
    let len_sq = v.length_squared();
    if !len_sq.is_finite() || len_sq <= DIRECTION_EPSILON * DIRECTION_EPSILON {
        return None;
    }
    Some(v / len_sq.sqrt())
}

/// Minimal rotation taking direction `from` onto direction `to`.
///
/// Inputs need not be normalized. Returns identity when either input has no
/// usable length or when the directions already agree. For antiparallel inputs
/// the axis is an arbitrary perpendicular to `from`.
pub fn shortest_arc(from: Vec3, to: Vec3) -> Quat {
    let (Some(from), Some(to)) = (safe_normalize(from), safe_normalize(to)) else {
        return Quat::IDENTITY;
    };
    if from.dot(to) >= 1.0 - DIRECTION_EPSILON {
        return Quat::IDENTITY;
    }
    Quat::from_rotation_arc(from, to)
}

/// Spherical interpolation between two directions.
///
/// `t` is not clamped. The result has unit length whenever both inputs do.
pub fn slerp_direction(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    let (Some(a), Some(b)) = (safe_normalize(from), safe_normalize(to)) else {
        return from.lerp(to, t);
    };
    let arc = shortest_arc(a, b);
    Quat::IDENTITY.slerp(arc, t) * a
}

/// Moves `current` toward `target` by `rate * dt` of the remaining arc.
///
/// The step is clamped to `[0, 1]`: a zero rate never moves, a step of one or
/// more lands exactly on `target`.
pub fn advance_rotation(current: Quat, target: Quat, rate: f32, dt: f32) -> Quat {
    let t = rate * dt;
    if !t.is_finite() {
        return if t > 0.0 { target } else { current };
    }
    if t <= 0.0 {
        return current;
    }
    if t >= 1.0 {
        return target;
    }
    current.slerp(target, t).normalize()
}

/// Exponential approach of `current` toward `target`, clamped like
/// [`advance_rotation`].
pub fn advance_position(current: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    let t = rate * dt;
    if !t.is_finite() {
        return if t > 0.0 { target } else { current };
    }
    if t <= 0.0 {
        return current;
    }
    if t >= 1.0 {
        return target;
    }
    current.lerp(target, t)
}
