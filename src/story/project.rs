use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;

use crate::{
    assets::cache::{DEFAULT_IMAGE_CACHE_CAPACITY, ImageCache},
    assets::decode::FsImageDecoder,
    assets::probe::FsDurationProbe,
    foundation::core::{Canvas, Fps},
    foundation::error::{StoryError, StoryResult},
    story::collection::PageCollection,
};

/// A story project as stored on disk: output settings plus the ordered pages.
///
/// Relative image and narration paths resolve against the directory holding the project file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StoryProject {
    /// Output frame rate used when laying pages onto frames.
    #[serde(default)]
    pub fps: Fps,
    /// Output canvas size used when mapping effect viewports to pixels.
    #[serde(default = "default_canvas")]
    pub canvas: Canvas,
    /// Number of decoded images kept resident while assembling.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Pages in presentation order.
    pub pages: PageCollection,
}

fn default_canvas() -> Canvas {
    Canvas {
        width: 1280,
        height: 720,
    }
}

fn default_cache_capacity() -> usize {
    DEFAULT_IMAGE_CACHE_CAPACITY
}

impl StoryProject {
    /// Parse and validate a project from JSON text.
    pub fn from_json_str(json: &str) -> StoryResult<Self> {
        let project: Self =
            serde_json::from_str(json).map_err(|e| StoryError::serde(e.to_string()))?;
        project.validate()?;
        Ok(project)
    }

    /// Read, parse, and validate a project file.
    pub fn from_path(path: &Path) -> StoryResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read project '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_string(&self) -> StoryResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| StoryError::serde(e.to_string()))
    }

    /// Validate settings and every page. Asset existence is not checked.
    pub fn validate(&self) -> StoryResult<()> {
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(StoryError::validation("fps must have num>0 and den>0"));
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(StoryError::validation("canvas width/height must be > 0"));
        }
        if self.cache_capacity == 0 {
            return Err(StoryError::validation("cache_capacity must be > 0"));
        }
        for (i, page) in self.pages.iter().enumerate() {
            page.validate()
                .map_err(|e| StoryError::validation(format!("page {i}: {e}")))?;
        }
        Ok(())
    }

    /// Image cache sized by this project, decoding files under `assets_root`.
    pub fn image_cache(&self, assets_root: &Path) -> StoryResult<ImageCache> {
        ImageCache::new(
            self.cache_capacity,
            Arc::new(FsImageDecoder::new(assets_root)),
        )
    }

    /// Narration probe reading files under `assets_root`.
    pub fn duration_probe(&self, assets_root: &Path) -> FsDurationProbe {
        FsDurationProbe::new(assets_root)
    }
}

/// Directory against which a project file's relative asset paths resolve.
pub fn assets_root_for(project_path: &Path) -> PathBuf {
    project_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
#[path = "../../tests/unit/story/project.rs"]
mod tests;
