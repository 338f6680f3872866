//! storyreel assembles narrated slideshow videos from story pages.
//!
//! Each [`Page`] pairs a still image with a narration clip and a pan/zoom [`Effect`]. The
//! narration is the clock: a page is shown for exactly as long as its audio plays, and the effect
//! is evaluated over normalized progress within that span.
//!
//! # Pieces
//!
//! - [`DurationProbe`]: measures narration length ([`MediaDuration`], one measurement with second
//!   and millisecond readings).
//! - [`ImageCache`]: bounded LRU cache of decoded images, decoding on a miss through an injected
//!   [`ImageDecoder`].
//! - [`Effect`]: pure viewport interpolation over progress in `[0, 1]`.
//! - [`Assembler`]: walks a [`PageCollection`] in order and lays pages onto a [`StoryTimeline`].
//!
//! Nothing in this crate spawns threads. Cache misses and probes block the caller, so callers
//! that need a responsive UI should run assembly on a worker thread.
#![forbid(unsafe_code)]

mod animation;
mod assets;
mod effects;
mod foundation;
mod story;

pub use animation::ease::Ease;
pub use assets::cache::{CacheStats, DEFAULT_IMAGE_CACHE_CAPACITY, ImageCache};
pub use assets::decode::{
    DecodedImage, FsImageDecoder, ImageDecoder, decode_image, normalize_asset_key,
};
pub use assets::probe::{DurationProbe, FsDurationProbe, probe_wav};
pub use effects::ken_burns::{Effect, full_frame, progress_at, viewport_to_canvas};
pub use foundation::core::{
    Affine, Canvas, Fps, FrameIndex, FrameRange, MediaDuration, Point, Rect, Size, Vec2, Viewport,
};
pub use foundation::error::{StoryError, StoryResult};
pub use foundation::math::{lerp_f64, lerp_rect};
pub use story::collection::PageCollection;
pub use story::page::Page;
pub use story::project::{StoryProject, assets_root_for};
pub use story::timeline::{
    Assembler, AssemblerOpts, PageFailure, PageSegment, StoryTimeline,
};
