extern crate crayon_texture;
extern crate gl;

use crayon_texture::prelude::*;

fn color(face: usize) -> [u8; 4] {
    [face as u8 * 40, 255 - face as u8 * 40, 7, 255]
}

fn read_face(texture: &TextureCubeMap, face: usize) -> Surface8u {
    let mut source = texture.create_face_source(face).unwrap();
    Surface::from_source(&mut source).unwrap()
}

/// Paints every face cell of a packed image of `layout` in the color of its face.
fn packed(layout: CubeLayout, width: u32, height: u32) -> Surface8u {
    let mut surface = Surface8u::new(width, height, true);
    for (face, &(area, _)) in layout.face_areas(width, height).iter().enumerate() {
        for y in area.min.y..area.max.y {
            for x in area.min.x..area.max.x {
                surface.set_pixel(x as u32, y as u32, &color(face));
            }
        }
    }

    surface
}

fn assert_faces(texture: &TextureCubeMap, size: u32) {
    assert_eq!(texture.size(), Vector2::new(size, size));
    for face in 0..6 {
        let expected = Surface8u::filled(size, size, ChannelOrder::RGBA, &color(face));
        assert_eq!(read_face(texture, face), expected, "face {}", face);
    }
}

#[test]
fn faces() {
    let ctx = Context::headless();
    let f = |i| Surface8u::filled(4, 4, ChannelOrder::RGBA, &color(i));
    let faces = [f(0), f(1), f(2), f(3), f(4), f(5)];

    let texture = TextureCubeMap::from_faces(&ctx, &faces, Format::default()).unwrap();
    assert_eq!(texture.target(), gl::TEXTURE_CUBE_MAP);
    assert!(texture.is_top_down());
    assert_faces(&texture, 4);

    let mut faces = faces;
    faces[3] = Surface8u::new(4, 2, true);
    match TextureCubeMap::from_faces(&ctx, &faces, Format::default()) {
        Err(Error::ResizeMismatch { attempted, .. }) => assert_eq!(attempted, Vector2::new(4, 2)),
        v => panic!("{:?}", v),
    }
}

#[test]
fn packed_layouts() {
    let ctx = Context::headless();
    let cases = [
        (CubeLayout::HorizontalStrip, 24, 4),
        (CubeLayout::VerticalStrip, 4, 24),
        (CubeLayout::HorizontalCross, 16, 12),
    ];

    for &(layout, width, height) in &cases {
        assert_eq!(CubeLayout::infer(width, height), layout);
        let surface = packed(layout, width, height);
        let texture = TextureCubeMap::from_surface(&ctx, &surface, Format::default()).unwrap();
        assert_faces(&texture, 4);
    }
}

#[test]
fn vertical_cross() {
    let ctx = Context::headless();
    let mut surface = packed(CubeLayout::VerticalCross, 12, 16);

    // Marks the top row of the -Z cell, which is stored upside down.
    for x in 4..8 {
        surface.set_pixel(x, 12, &[1, 2, 3, 4]);
    }

    let texture = TextureCubeMap::from_surface(&ctx, &surface, Format::default()).unwrap();
    let face = read_face(&texture, 5);
    assert_eq!(face.pixel(0, 3), &[1, 2, 3, 4]);
    assert_eq!(face.pixel(3, 3), &[1, 2, 3, 4]);
    assert_eq!(face.pixel(0, 0), &color(5));
}

#[test]
fn updates() {
    let device = HeadlessDevice::new();
    let ctx = Context::new(device.clone());

    assert!(TextureCubeMap::new(&ctx, 4, 8, Format::default()).is_err());

    let format = Format::new().mipmap(true);
    let mut texture = TextureCubeMap::new(&ctx, 8, 8, format).unwrap();
    for &face in &[gl::TEXTURE_CUBE_MAP_POSITIVE_X, gl::TEXTURE_CUBE_MAP_NEGATIVE_Z] {
        assert_eq!(device.levels(texture.id(), face), vec![0]);
    }

    let surface = Surface8u::filled(8, 8, ChannelOrder::RGBA, &color(2));
    texture.update_face(2, &surface, 0).unwrap();
    assert_eq!(read_face(&texture, 2), surface);
    assert_eq!(
        device.levels(texture.id(), gl::TEXTURE_CUBE_MAP_POSITIVE_Y),
        vec![0, 1, 2, 3]
    );

    assert!(texture.update_face(6, &surface, 0).is_err());
    match texture.update_face(0, &surface, 1) {
        Err(Error::ResizeMismatch { expected, .. }) => assert_eq!(expected, Vector2::new(4, 4)),
        v => panic!("{:?}", v),
    }
}
