extern crate crayon_texture;
extern crate gl;
extern crate serde_json;

use crayon_texture::prelude::*;

#[test]
fn from_json() {
    let json = r#"{
        "target": "Rectangle",
        "wrap_s": "Repeat",
        "min_filter": "Nearest",
        "mipmapping": true,
        "max_anisotropy": 8.0,
        "swizzle_mask": ["Red", "Red", "Red", "One"],
        "label": "atlas",
        "load_top_down": true
    }"#;

    let format: Format = serde_json::from_str(json).unwrap();
    assert_eq!(format.target, TextureTarget::Rectangle);
    assert_eq!(format.wrap_s, TextureWrap::Repeat);
    assert_eq!(format.wrap_t, TextureWrap::ClampToEdge);
    assert_eq!(format.resolved_min_filter(), TextureFilter::Nearest);
    assert_eq!(format.swizzle_mask, Some(SWIZZLE_GRAY));
    assert_eq!(format.label.as_ref().map(|v| v.as_str()), Some("atlas"));
    assert!(format.mipmapping && format.load_top_down);
    assert!(format.intermediate_pbo.is_none());

    let json = serde_json::to_string(&format).unwrap();
    assert!(!json.contains("intermediate_pbo"));

    let again: Format = serde_json::from_str(&json).unwrap();
    assert_eq!(again.max_anisotropy, Some(8.0));
    assert_eq!(again.target, TextureTarget::Rectangle);
}

#[test]
fn empty_json_is_default() {
    let format: Format = serde_json::from_str("{}").unwrap();
    let default = Format::default();

    assert_eq!(format.target, default.target);
    assert_eq!(format.wrap_s, default.wrap_s);
    assert_eq!(format.mag_filter, default.mag_filter);
    assert_eq!(format.mipmapping, default.mipmapping);
    assert_eq!(format.internal_format, None);
    assert_eq!(format.resolved_min_filter(), TextureFilter::Linear);
}

#[test]
fn applied() {
    let device = HeadlessDevice::new();
    let ctx = Context::new(device.clone());

    let json = r#"{ "wrap_s": "MirroredRepeat", "wrap_t": "Repeat", "internal_format": 32856,
        "compare_mode": "CompareRefToTexture", "border_color": [1.0, 0.0, 0.0, 1.0] }"#;
    let format: Format = serde_json::from_str(json).unwrap();

    let texture = Texture2d::new(&ctx, 4, 4, format).unwrap();
    assert_eq!(texture.internal_format(), gl::RGBA8);
    assert_eq!(texture.wrap_s(), TextureWrap::MirroredRepeat);
    assert_eq!(texture.wrap_t(), TextureWrap::Repeat);
    assert_eq!(texture.compare_mode(), CompareMode::CompareRefToTexture);
    assert_eq!(texture.border_color(), [1.0, 0.0, 0.0, 1.0]);
}
