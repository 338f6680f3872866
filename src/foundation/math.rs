//! Interpolation helpers.

use crate::foundation::core::Rect;

#[inline]
/// Linearly interpolate between two scalars with clamped parameter `t`.
///
/// Written as `a * (1 - t) + b * t` so that `t == 0` yields `a` and `t == 1` yields `b` bit for bit.
pub fn lerp_f64(a: f64, b: f64, t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    a * (1.0 - t) + b * t
}

#[inline]
/// Interpolate every edge of two rectangles with clamped parameter `t`.
pub fn lerp_rect(a: Rect, b: Rect, t: f64) -> Rect {
    Rect::new(
        lerp_f64(a.x0, b.x0, t),
        lerp_f64(a.y0, b.y0, t),
        lerp_f64(a.x1, b.x1, t),
        lerp_f64(a.y1, b.y1, t),
    )
}

pub(crate) fn is_finite_rect(r: Rect) -> bool {
    r.x0.is_finite() && r.y0.is_finite() && r.x1.is_finite() && r.y1.is_finite()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
