use crate::{
    animation::ease::Ease,
    foundation::core::{Affine, Canvas, MediaDuration, Rect, Vec2, Viewport},
    foundation::error::{StoryError, StoryResult},
    foundation::math::{is_finite_rect, lerp_rect},
};

/// Pan/zoom motion over a still image.
///
/// An effect has no duration of its own. The renderer supplies normalized progress in `[0, 1]`
/// derived from the owning page's narration length (see [`progress_at`]).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Effect {
    /// Viewport shown at progress `0`.
    pub start: Viewport,
    /// Viewport shown at progress `1`.
    pub end: Viewport,
    /// Easing applied to progress before interpolating viewports.
    #[serde(default)]
    pub ease: Ease,
}

impl Effect {
    /// Build an effect, rejecting empty or non-finite viewports.
    pub fn new(start: Viewport, end: Viewport, ease: Ease) -> StoryResult<Self> {
        let fx = Self { start, end, ease };
        fx.validate()?;
        Ok(fx)
    }

    /// An effect that holds one viewport for the whole page.
    pub fn still(viewport: Viewport) -> StoryResult<Self> {
        Self::new(viewport, viewport, Ease::Linear)
    }

    /// Zoom between the full frame and a focus region; `zoom_in` picks the direction.
    pub fn zoom(full: Viewport, focus: Viewport, zoom_in: bool) -> StoryResult<Self> {
        if zoom_in {
            Self::new(full, focus, Ease::InOutQuad)
        } else {
            Self::new(focus, full, Ease::InOutQuad)
        }
    }

    /// Check both viewports are finite with positive width and height.
    pub fn validate(&self) -> StoryResult<()> {
        for (name, r) in [("start", self.start), ("end", self.end)] {
            if !is_finite_rect(r) {
                return Err(StoryError::validation(format!(
                    "effect {name} viewport must be finite"
                )));
            }
            if r.width() <= 0.0 || r.height() <= 0.0 {
                return Err(StoryError::validation(format!(
                    "effect {name} viewport must have width and height > 0"
                )));
            }
        }
        Ok(())
    }

    /// Viewport at normalized `progress`.
    ///
    /// `evaluate(0.0)` is exactly `start` and `evaluate(1.0)` is exactly `end`. Values outside
    /// `[0, 1]` are clamped.
    pub fn evaluate(&self, progress: f64) -> Viewport {
        lerp_rect(self.start, self.end, self.ease.apply(progress))
    }

    /// Affine that maps the viewport at `progress` onto the full output `canvas`.
    pub fn transform(&self, progress: f64, canvas: Canvas) -> Affine {
        viewport_to_canvas(self.evaluate(progress), canvas)
    }
}

/// Map source-image coordinates inside `viewport` onto `canvas` pixel coordinates.
pub fn viewport_to_canvas(viewport: Viewport, canvas: Canvas) -> Affine {
    let sx = f64::from(canvas.width) / viewport.width().max(f64::EPSILON);
    let sy = f64::from(canvas.height) / viewport.height().max(f64::EPSILON);
    Affine::scale_non_uniform(sx, sy) * Affine::translate(-Vec2::new(viewport.x0, viewport.y0))
}

/// Normalized progress of `elapsed` within a page lasting `total`.
///
/// A zero-length page is treated as already complete.
pub fn progress_at(elapsed: MediaDuration, total: MediaDuration) -> f64 {
    if total.is_zero() {
        return 1.0;
    }
    (elapsed.as_micros() as f64 / total.as_micros() as f64).clamp(0.0, 1.0)
}

/// Full-frame viewport of an image with the given pixel size.
pub fn full_frame(width: u32, height: u32) -> Viewport {
    Rect::new(0.0, 0.0, f64::from(width), f64::from(height))
}

#[cfg(test)]
#[path = "../../tests/unit/effects/ken_burns.rs"]
mod tests;
