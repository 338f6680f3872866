use std::io::Cursor;

use super::*;

fn png_bytes(rgba: Vec<u8>, width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(width, height, rgba).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let buf = png_bytes(vec![100u8, 50u8, 200u8, 128u8], 1, 1);

    let decoded = decode_image(&buf).unwrap();
    assert_eq!(decoded.width, 1);
    assert_eq!(decoded.height, 1);
    assert_eq!(
        decoded.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
    assert_eq!(decoded.byte_len(), 4);
}

#[test]
fn straight_export_restores_semi_transparent_colour() {
    let buf = png_bytes(
        vec![200u8, 100, 50, 128, 10, 20, 30, 255, 77, 88, 99, 0],
        3,
        1,
    );
    let decoded = decode_image(&buf).unwrap();
    assert_eq!(&decoded.rgba8_premul[0..4], &[100, 50, 25, 128]);

    let straight = decoded.to_straight_rgba8();
    for (got, want) in straight[0..3].iter().zip([200u8, 100, 50]) {
        assert!(got.abs_diff(want) <= 1, "got {got}, want {want}");
    }
    assert_eq!(straight[3], 128);
    assert_eq!(&straight[4..8], &[10, 20, 30, 255]);
    assert_eq!(&straight[8..12], &[0, 0, 0, 0]);
    assert_eq!(decoded.bounds(), crate::foundation::core::Rect::new(0.0, 0.0, 3.0, 1.0));
}

#[test]
fn decode_twice_compares_equal_by_content() {
    let buf = png_bytes(vec![9u8; 2 * 2 * 4], 2, 2);
    let a = decode_image(&buf).unwrap();
    let b = decode_image(&buf).unwrap();
    assert!(!Arc::ptr_eq(&a.rgba8_premul, &b.rgba8_premul));
    assert_eq!(a, b);
}

#[test]
fn fs_decoder_reports_missing_and_corrupt_files_as_decode_errors() {
    let dir = std::env::temp_dir().join(format!("storyreel_decode_unit_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("corrupt.png"), b"not a png").unwrap();

    let decoder = FsImageDecoder::new(&dir);
    let missing = decoder.decode("missing.png").unwrap_err();
    assert!(matches!(missing, StoryError::Decode { ref key, .. } if key == "missing.png"));
    let corrupt = decoder.decode("corrupt.png").unwrap_err();
    assert!(matches!(corrupt, StoryError::Decode { ref key, .. } if key == "corrupt.png"));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn closures_act_as_decoders() {
    let decoder = |key: &str| -> StoryResult<DecodedImage> {
        Ok(DecodedImage {
            width: key.len() as u32,
            height: 1,
            rgba8_premul: Arc::new(vec![0; key.len() * 4]),
        })
    };
    assert_eq!(ImageDecoder::decode(&decoder, "abc").unwrap().width, 3);
}

#[test]
fn normalize_key_cross_platform() {
    assert_eq!(normalize_asset_key("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_asset_key("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_asset_key("./a//b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_asset_key("/story/1.jpg").unwrap(), "/story/1.jpg");
    assert!(normalize_asset_key("").is_err());
    assert!(normalize_asset_key("./").is_err());
}
