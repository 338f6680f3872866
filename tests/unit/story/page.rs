use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::{animation::ease::Ease, foundation::core::Rect};

fn effect() -> Effect {
    Effect::new(
        Rect::new(0.0, 0.0, 640.0, 480.0),
        Rect::new(80.0, 60.0, 560.0, 420.0),
        Ease::SmoothStep,
    )
    .unwrap()
}

fn fake_cache(capacity: usize) -> ImageCache {
    let decoder = |key: &str| -> StoryResult<DecodedImage> {
        if key.ends_with(".bad") {
            return Err(StoryError::decode(key, "corrupt"));
        }
        Ok(DecodedImage {
            width: 4,
            height: 3,
            rgba8_premul: Arc::new(vec![7; 4 * 3 * 4]),
        })
    };
    ImageCache::new(capacity, Arc::new(decoder)).unwrap()
}

#[test]
fn accessors_return_constructor_arguments() {
    let page = Page::new(
        "pages/1.png",
        "audio/1.wav",
        effect(),
        Some("In the beginning".to_string()),
    );
    assert_eq!(page.image_path(), Path::new("pages/1.png"));
    assert_eq!(page.narration_path(), Path::new("audio/1.wav"));
    assert_eq!(*page.effect(), effect());
    assert_eq!(page.caption(), Some("In the beginning"));

    let bare = Page::new("pages/2.png", "audio/2.wav", effect(), None);
    assert_eq!(bare.caption(), None);
}

#[test]
fn construction_does_no_io() {
    let page = Page::new("/does/not/exist.png", "/nor/this.wav", effect(), None);
    page.validate().unwrap();
}

#[test]
fn duration_is_queried_on_every_call() {
    let calls = AtomicUsize::new(0);
    let probe = |path: &Path| -> StoryResult<MediaDuration> {
        calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(path, Path::new("audio/1.wav"));
        Ok(MediaDuration::from_millis(4_000))
    };
    let page = Page::new("pages/1.png", "audio/1.wav", effect(), None);
    let a = page.duration(&probe).unwrap();
    let b = page.duration(&probe).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, MediaDuration::from_millis(4_000));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn duration_failure_is_asset_unavailable() {
    let probe = |path: &Path| -> StoryResult<MediaDuration> {
        Err(StoryError::asset_unavailable(path, "no such file"))
    };
    let page = Page::new("pages/1.png", "audio/gone.wav", effect(), None);
    assert!(page.duration(&probe).unwrap_err().is_asset_unavailable());
}

#[test]
fn image_goes_through_the_cache_with_normalized_key() {
    let cache = fake_cache(3);
    let page = Page::new("pages\\1.png", "audio/1.wav", effect(), None);
    let a = page.image(&cache).unwrap();
    let b = page.image(&cache).unwrap();
    assert_eq!(a, b);
    assert_eq!(cache.resident_keys(), vec!["pages/1.png"]);
    assert_eq!(cache.stats().hits, 1);
}

#[test]
fn image_decode_error_propagates_unchanged() {
    let cache = fake_cache(3);
    let page = Page::new("pages/1.bad", "audio/1.wav", effect(), None);
    let err = page.image(&cache).unwrap_err();
    assert!(matches!(err, StoryError::Decode { ref key, .. } if key == "pages/1.bad"));
}

#[test]
fn validate_rejects_empty_paths() {
    assert!(Page::new("", "a.wav", effect(), None).validate().is_err());
    assert!(Page::new("a.png", "", effect(), None).validate().is_err());
}

#[test]
fn json_shape_omits_missing_caption() {
    let page = Page::new("p.png", "n.wav", effect(), None);
    let json = serde_json::to_value(&page).unwrap();
    assert!(json.get("caption").is_none());
    let back: Page = serde_json::from_value(json).unwrap();
    assert_eq!(back, page);
}
