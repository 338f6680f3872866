use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        StoryError::asset_unavailable("a/narration.wav", "missing")
            .to_string()
            .contains("asset unavailable 'a/narration.wav':")
    );
    assert!(
        StoryError::decode("a/page.png", "bad header")
            .to_string()
            .contains("decode error for 'a/page.png':")
    );
    assert!(
        StoryError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        StoryError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn kind_predicates_match_variants() {
    assert!(StoryError::asset_unavailable("x.wav", "gone").is_asset_unavailable());
    assert!(!StoryError::asset_unavailable("x.wav", "gone").is_decode());
    assert!(StoryError::decode("x.png", "corrupt").is_decode());
    assert!(!StoryError::validation("x").is_decode());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = StoryError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
