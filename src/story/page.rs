use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    assets::cache::ImageCache,
    assets::decode::{DecodedImage, normalize_asset_key},
    assets::probe::DurationProbe,
    effects::ken_burns::Effect,
    foundation::core::MediaDuration,
    foundation::error::{StoryError, StoryResult},
};

/// One unit of a narrated story: a still image, its narration, and the motion applied to it.
///
/// The narration dictates how long the page is shown; the effect is stretched over that length.
/// A page never touches its assets when constructed. The image and narration are only resolved
/// when [`Page::image`] or [`Page::duration`] is called, through the collaborators passed in.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Page {
    image: PathBuf,
    narration: PathBuf,
    effect: Effect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    caption: Option<String>,
}

impl Page {
    /// Create a page. Arguments are stored as given.
    pub fn new(
        image: impl Into<PathBuf>,
        narration: impl Into<PathBuf>,
        effect: Effect,
        caption: Option<String>,
    ) -> Self {
        Self {
            image: image.into(),
            narration: narration.into(),
            effect,
            caption,
        }
    }

    /// Path of the raster image shown on this page.
    pub fn image_path(&self) -> &Path {
        &self.image
    }

    /// Path of the narration audio that sets this page's length.
    pub fn narration_path(&self) -> &Path {
        &self.narration
    }

    /// Pan/zoom motion applied over the page's duration.
    pub fn effect(&self) -> &Effect {
        &self.effect
    }

    /// Overlay text, if any.
    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    /// Key under which this page's image lives in an [`ImageCache`].
    pub fn image_key(&self) -> StoryResult<String> {
        normalize_asset_key(&self.image.to_string_lossy())
    }

    /// Display duration, measured from the narration asset on every call.
    pub fn duration(&self, probe: &dyn DurationProbe) -> StoryResult<MediaDuration> {
        probe.probe(&self.narration)
    }

    /// Decoded image, served from `cache` or decoded on a miss.
    pub fn image(&self, cache: &ImageCache) -> StoryResult<Arc<DecodedImage>> {
        let key = self
            .image_key()
            .map_err(|e| StoryError::decode(self.image.to_string_lossy(), e))?;
        cache.get(&key)
    }

    /// Check the page is well-formed without touching its assets.
    pub fn validate(&self) -> StoryResult<()> {
        if self.image.as_os_str().is_empty() {
            return Err(StoryError::validation("page image path must be non-empty"));
        }
        if self.narration.as_os_str().is_empty() {
            return Err(StoryError::validation(
                "page narration path must be non-empty",
            ));
        }
        self.effect.validate()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/story/page.rs"]
mod tests;
