//! Scalar helpers shared by ball, character and NPC code.
//!
//! Everything here is pure and allocation-free; keep it that way so the
//! physics code can call these in inner loops without thinking about it.

/// Linear interpolation between two scalars.
#[inline]
pub fn lerp(start: f32, end: f32, factor: f32) -> f32 {
    start + (end - start) * factor
}

/// Clamp `value` into `[min, max]`.
#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    (dx * dx + dy * dy).sqrt()
}

/// Frame-rate independent smoothing factor for `lerp` chasing a target.
///
/// `rate` is the per-millisecond blend amount; the returned factor is the
/// equivalent blend for a `dt_ms` step, capped at 1 so oversized deltas
/// cannot overshoot the target.
#[inline]
pub fn smoothing_factor(rate_per_ms: f32, dt_ms: f32) -> f32 {
    clamp(rate_per_ms * dt_ms, 0.0, 1.0)
}

/// Decay factor for a per-frame multiplicative constant, normalized to an
/// arbitrary tick length. `per_frame` is the factor applied once per 60 Hz
/// frame (16.667 ms); the result applies the same cumulative decay over
/// `dt_ms`.
#[inline]
pub fn frame_decay(per_frame: f32, dt_ms: f32) -> f32 {
    per_frame.powf(dt_ms / (1000.0 / 60.0))
}
