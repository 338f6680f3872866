use crate::{
    assets::cache::ImageCache,
    assets::probe::DurationProbe,
    effects::ken_burns::{Effect, progress_at},
    foundation::core::{Fps, FrameIndex, FrameRange, MediaDuration, Viewport},
    foundation::error::{StoryError, StoryResult},
    story::collection::PageCollection,
};

/// Options controlling how pages are laid onto the output timeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssemblerOpts {
    /// Output frame rate.
    pub fps: Fps,
    /// Abort on the first failing page instead of skipping it.
    pub fail_fast: bool,
}

/// One page placed on the timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PageSegment {
    /// Position of the page in its collection.
    pub index: usize,
    /// Timeline time at which the page starts.
    pub start: MediaDuration,
    /// Narration length, which is also how long the effect runs.
    pub duration: MediaDuration,
    /// Output frames covered by the page.
    pub frames: FrameRange,
    /// Cache key of the page image.
    pub image_key: String,
    /// Decoded image width in pixels.
    pub image_width: u32,
    /// Decoded image height in pixels.
    pub image_height: u32,
    /// Motion applied across `duration`.
    pub effect: Effect,
    /// Overlay text, if any.
    pub caption: Option<String>,
}

impl PageSegment {
    /// Timeline time at which the page ends.
    pub fn end(&self) -> MediaDuration {
        self.start + self.duration
    }

    /// Effect progress at timeline time `t`, clamped to this segment.
    pub fn progress_at(&self, t: MediaDuration) -> f64 {
        progress_at(t.saturating_sub(self.start), self.duration)
    }
}

/// A page that could not be placed.
#[derive(Debug)]
pub struct PageFailure {
    /// Position of the page in its collection.
    pub index: usize,
    /// Why the page was skipped.
    pub error: StoryError,
}

/// Pages laid back to back, with the pages that failed on the way.
#[derive(Debug)]
pub struct StoryTimeline {
    pub fps: Fps,
    pub segments: Vec<PageSegment>,
    pub failures: Vec<PageFailure>,
}

impl StoryTimeline {
    /// Sum of every placed page's narration length.
    pub fn total_duration(&self) -> MediaDuration {
        self.segments.iter().map(|s| s.duration).sum()
    }

    /// Total number of output frames.
    pub fn total_frames(&self) -> u64 {
        self.segments.last().map_or(0, |s| s.frames.end.0)
    }

    /// Segment covering output frame `frame`.
    pub fn segment_at(&self, frame: FrameIndex) -> Option<&PageSegment> {
        let idx = self.segments.partition_point(|s| s.frames.end <= frame);
        self.segments.get(idx).filter(|s| s.frames.contains(frame))
    }

    /// Timeline time at which output frame `frame` is presented.
    pub fn frame_time(&self, frame: FrameIndex) -> MediaDuration {
        let micros = u128::from(frame.0)
            * u128::from(self.fps.den)
            * u128::from(MediaDuration::MICROS_PER_SEC)
            / u128::from(self.fps.num);
        MediaDuration::from_micros(u64::try_from(micros).unwrap_or(u64::MAX))
    }

    /// Effect viewport shown at output frame `frame`.
    pub fn viewport_at(&self, frame: FrameIndex) -> Option<Viewport> {
        let seg = self.segment_at(frame)?;
        Some(seg.effect.evaluate(seg.progress_at(self.frame_time(frame))))
    }
}

/// Drives a page collection in order, asking each page for its duration and image.
///
/// This is the consumer side of the page contract: durations come from the narration probe and
/// images come through the shared bounded cache, one page at a time.
#[derive(Clone, Debug, Default)]
pub struct Assembler {
    opts: AssemblerOpts,
}

impl Assembler {
    pub fn new(opts: AssemblerOpts) -> Self {
        Self { opts }
    }

    pub fn opts(&self) -> AssemblerOpts {
        self.opts
    }

    #[tracing::instrument(skip_all, fields(pages = pages.len()))]
    pub fn assemble(
        &self,
        pages: &PageCollection,
        probe: &dyn DurationProbe,
        cache: &ImageCache,
    ) -> StoryResult<StoryTimeline> {
        let fps = Fps::new(self.opts.fps.num, self.opts.fps.den)?;
        let mut segments = Vec::with_capacity(pages.len());
        let mut failures = Vec::new();
        let mut cursor = MediaDuration::ZERO;

        for (index, page) in pages.iter().enumerate() {
            let placed = page.duration(probe).and_then(|duration| {
                let image = page.image(cache)?;
                Ok((duration, image))
            });
            let (duration, image) = match placed {
                Ok(v) => v,
                Err(error) if !self.opts.fail_fast => {
                    tracing::warn!(index, %error, "skipping page");
                    failures.push(PageFailure { index, error });
                    continue;
                }
                Err(error) => return Err(error),
            };

            let end = cursor + duration;
            let frames = FrameRange::new(fps.frame_at(cursor), fps.frame_at(end))?;
            segments.push(PageSegment {
                index,
                start: cursor,
                duration,
                frames,
                image_key: page.image_key()?,
                image_width: image.width,
                image_height: image.height,
                effect: *page.effect(),
                caption: page.caption().map(str::to_string),
            });
            cursor = end;
        }

        tracing::debug!(
            placed = segments.len(),
            failed = failures.len(),
            total = %cursor,
            "assembled story timeline"
        );
        Ok(StoryTimeline {
            fps,
            segments,
            failures,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/story/timeline.rs"]
mod tests;
