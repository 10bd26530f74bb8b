/// Combat arithmetic: hit regions, clamped damage, pursuit steps.
/// No state lives here; the sim layer applies the results.

use super::entity::Facing;
use super::geom::{Rect, Vec2};

/// The square slash region in front of an attacker.
pub fn attack_hitbox(center: Vec2, facing: Facing, size: f32, offset: f32) -> Rect {
    let c = center + facing.unit().scale(offset);
    Rect::centered(c, size, size)
}

/// `hp + delta` clamped into `[0, max]`.
#[inline]
pub fn clamp_hp(hp: i32, delta: i32, max: i32) -> i32 {
    hp.saturating_add(delta).clamp(0, max)
}

/// One tick of straight-line pursuit. Never overshoots the target.
pub fn pursue(from: Vec2, to: Vec2, speed: f32, dt_ms: f32) -> Vec2 {
    let delta = to - from;
    let distance = delta.length();
    let max_step = speed * dt_ms / 1000.0;
    if distance <= max_step || distance <= f32::EPSILON {
        return to;
    }
    from + delta.scale(max_step / distance)
}
