use super::*;

const MINIMAL: &str = r#"{
    "pages": [
        {
            "image": "img/1.png",
            "narration": "audio/1.wav",
            "effect": {
                "start": {"x0": 0, "y0": 0, "x1": 640, "y1": 480},
                "end": {"x0": 64, "y0": 48, "x1": 576, "y1": 432},
                "ease": "in_out_quad"
            },
            "caption": "Page one"
        },
        {
            "image": "img/2.png",
            "narration": "audio/2.wav",
            "effect": {
                "start": {"x0": 0, "y0": 0, "x1": 640, "y1": 480},
                "end": {"x0": 0, "y0": 0, "x1": 640, "y1": 480}
            }
        }
    ]
}"#;

#[test]
fn defaults_fill_missing_settings() {
    let project = StoryProject::from_json_str(MINIMAL).unwrap();
    assert_eq!(project.fps, Fps { num: 30, den: 1 });
    assert_eq!(project.cache_capacity, DEFAULT_IMAGE_CACHE_CAPACITY);
    assert_eq!(project.canvas, default_canvas());
    assert_eq!(project.pages.len(), 2);
    assert_eq!(project.pages.get(0).unwrap().caption(), Some("Page one"));
    assert_eq!(project.pages.get(1).unwrap().caption(), None);
}

#[test]
fn json_round_trip_preserves_project() {
    let project = StoryProject::from_json_str(MINIMAL).unwrap();
    let again = StoryProject::from_json_str(&project.to_json_string().unwrap()).unwrap();
    assert_eq!(again, project);
}

#[test]
fn invalid_settings_are_rejected() {
    let mut v: serde_json::Value = serde_json::from_str(MINIMAL).unwrap();
    v["cache_capacity"] = serde_json::json!(0);
    let err = StoryProject::from_json_str(&v.to_string()).unwrap_err();
    assert!(matches!(err, StoryError::Validation(_)));

    let mut v: serde_json::Value = serde_json::from_str(MINIMAL).unwrap();
    v["pages"][1]["effect"]["end"]["x1"] = serde_json::json!(0);
    let err = StoryProject::from_json_str(&v.to_string()).unwrap_err();
    assert!(err.to_string().contains("page 1"));

    assert!(matches!(
        StoryProject::from_json_str("{").unwrap_err(),
        StoryError::Serde(_)
    ));
}

#[test]
fn assets_root_is_project_directory() {
    assert_eq!(
        assets_root_for(Path::new("stories/ruth/story.json")),
        PathBuf::from("stories/ruth")
    );
    assert_eq!(assets_root_for(Path::new("story.json")), PathBuf::from("."));
}

#[test]
fn built_cache_uses_configured_capacity() {
    let mut project = StoryProject::from_json_str(MINIMAL).unwrap();
    project.cache_capacity = 5;
    let cache = project.image_cache(Path::new(".")).unwrap();
    assert_eq!(cache.capacity(), 5);
}
