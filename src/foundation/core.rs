use std::{iter::Sum, ops::Add};

use crate::foundation::error::{StoryError, StoryResult};

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Region of a source image shown at one instant of a pan/zoom effect, in image pixels.
pub type Viewport = Rect;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    pub start: FrameIndex,
    pub end: FrameIndex, // exclusive
}

impl FrameRange {
    pub fn new(start: FrameIndex, end: FrameIndex) -> StoryResult<Self> {
        if start.0 > end.0 {
            return Err(StoryError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> StoryResult<Self> {
        if den == 0 {
            return Err(StoryError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(StoryError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Frame index at which time `t` falls, computed exactly in integer microseconds.
    pub fn frame_at(self, t: MediaDuration) -> FrameIndex {
        let scaled = u128::from(t.as_micros()) * u128::from(self.num);
        let denom = u128::from(self.den) * u128::from(MediaDuration::MICROS_PER_SEC);
        FrameIndex(u64::try_from(scaled / denom).unwrap_or(u64::MAX))
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

/// Playable length of a media asset.
///
/// Stored as a single microsecond measurement; every coarser reading is derived from it, so the
/// second and millisecond views of one probe can never disagree.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct MediaDuration {
    micros: u64,
}

impl MediaDuration {
    pub const ZERO: Self = Self { micros: 0 };
    pub const MICROS_PER_SEC: u64 = 1_000_000;
    pub const MICROS_PER_MILLI: u64 = 1_000;

    pub const fn from_micros(micros: u64) -> Self {
        Self { micros }
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self {
            micros: millis.saturating_mul(Self::MICROS_PER_MILLI),
        }
    }

    /// Round a (finite, non-negative) second count to the nearest microsecond.
    pub fn from_secs_f64(secs: f64) -> StoryResult<Self> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(StoryError::validation(
                "duration seconds must be finite and >= 0",
            ));
        }
        Ok(Self {
            micros: (secs * Self::MICROS_PER_SEC as f64).round() as u64,
        })
    }

    pub const fn as_micros(self) -> u64 {
        self.micros
    }

    /// Fine-grained reading.
    pub const fn as_millis(self) -> u64 {
        self.micros / Self::MICROS_PER_MILLI
    }

    /// Coarse reading: whole seconds, truncated.
    pub const fn as_secs(self) -> u64 {
        self.micros / Self::MICROS_PER_SEC
    }

    pub fn as_secs_f64(self) -> f64 {
        self.micros as f64 / Self::MICROS_PER_SEC as f64
    }

    pub fn is_zero(self) -> bool {
        self.micros == 0
    }

    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self {
            micros: self.micros.saturating_sub(rhs.micros),
        }
    }
}

impl Add for MediaDuration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            micros: self.micros.saturating_add(rhs.micros),
        }
    }
}

impl Sum for MediaDuration {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<MediaDuration> for std::time::Duration {
    fn from(d: MediaDuration) -> Self {
        std::time::Duration::from_micros(d.micros)
    }
}

impl std::fmt::Display for MediaDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:03}s", self.as_secs(), self.as_millis() % 1_000)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
