extern crate crayon_texture;
extern crate env_logger;
extern crate gl;
extern crate rand;

use std::rc::Rc;

use crayon_texture::backends::ParameterValue;
use crayon_texture::prelude::*;

fn random_surface<T>(width: u32, height: u32, order: ChannelOrder, gen: fn() -> T) -> Surface<T>
where
    T: Component,
{
    let len = width as usize * height as usize * order.channels();
    let data = (0..len).map(|_| gen()).collect();
    Surface::from_data(width, height, order, data).unwrap()
}

fn read_surface<T: Component>(texture: &Texture2d) -> Surface<T> {
    let mut source = texture.create_source().unwrap();
    Surface::from_source(&mut source).unwrap()
}

#[test]
fn round_trip() {
    let _ = env_logger::try_init();
    let ctx = Context::headless();

    for &top_down in &[false, true] {
        let format = Format::new().load_top_down(top_down);

        let surface = random_surface(5, 3, ChannelOrder::RGBA, rand::random::<u8>);
        let texture = Texture2d::from_surface(&ctx, &surface, format.clone()).unwrap();
        assert_eq!(texture.internal_format(), gl::RGBA8);
        assert_eq!(read_surface::<u8>(&texture), surface);

        let surface = random_surface(7, 5, ChannelOrder::RGB, rand::random::<u8>);
        let texture = Texture2d::from_surface(&ctx, &surface, format.clone()).unwrap();
        assert_eq!(texture.internal_format(), gl::RGB8);
        assert_eq!(read_surface::<u8>(&texture), surface);

        let surface = random_surface(4, 6, ChannelOrder::RGBA, rand::random::<u16>);
        let texture = Texture2d::from_surface(&ctx, &surface, format.clone()).unwrap();
        assert_eq!(texture.internal_format(), gl::RGBA16);
        assert_eq!(read_surface::<u16>(&texture), surface);

        let surface = random_surface(3, 3, ChannelOrder::RGB, rand::random::<f32>);
        let texture = Texture2d::from_surface(&ctx, &surface, format.clone()).unwrap();
        assert_eq!(texture.internal_format(), gl::RGB32F);
        assert_eq!(read_surface::<f32>(&texture), surface);

        let surface = random_surface(3, 4, ChannelOrder::RGB, rand::random::<u16>);
        let texture = Texture2d::from_surface(&ctx, &surface, format.clone()).unwrap();
        assert_eq!(texture.internal_format(), gl::RGB16);
        assert_eq!(read_surface::<u16>(&texture), surface);

        let surface = random_surface(2, 5, ChannelOrder::RGBA, rand::random::<f32>);
        let texture = Texture2d::from_surface(&ctx, &surface, format.clone()).unwrap();
        assert_eq!(texture.internal_format(), gl::RGBA32F);
        assert_eq!(read_surface::<f32>(&texture), surface);

        // Any other color order is converted into RGB(A) on the way.
        let orders = [
            ChannelOrder::BGRA,
            ChannelOrder::ARGB,
            ChannelOrder::ABGR,
            ChannelOrder::RGBX,
            ChannelOrder::BGRX,
            ChannelOrder::XRGB,
            ChannelOrder::BGR,
        ];

        for &order in &orders {
            converted_round_trip(&ctx, &format, order, rand::random::<u8>);
            converted_round_trip(&ctx, &format, order, rand::random::<u16>);
            converted_round_trip(&ctx, &format, order, rand::random::<f32>);
        }
    }
}

fn converted_round_trip<T>(ctx: &Context, format: &Format, order: ChannelOrder, gen: fn() -> T)
where
    T: Component,
{
    let surface = random_surface(6, 3, order, gen);
    let texture = Texture2d::from_surface(ctx, &surface, format.clone()).unwrap();
    assert_eq!(texture.has_alpha(), order.has_alpha(), "{:?}", order);

    let color = ChannelOrder::color(order.has_alpha());
    let expected = surface.converted(surface.bounds(), color, false).unwrap();
    assert_eq!(read_surface::<T>(&texture), expected, "{:?}", order);
}

#[test]
fn padded_rows() {
    let ctx = Context::headless();
    let mut surface = Surface8u::with_stride(3, 2, ChannelOrder::RGB, 16).unwrap();
    surface.set_pixel(0, 0, &[1, 2, 3]);
    surface.set_pixel(2, 1, &[4, 5, 6]);

    let texture = Texture2d::from_surface(&ctx, &surface, Format::default()).unwrap();
    let back = read_surface::<u8>(&texture);
    assert_eq!(back.pixel(0, 0), &[1, 2, 3]);
    assert_eq!(back.pixel(2, 1), &[4, 5, 6]);
}

#[test]
fn orientation() {
    let ctx = Context::headless();
    let mut surface = Surface8u::new(1, 2, true);
    surface.set_pixel(0, 0, &[255, 0, 0, 255]);
    surface.set_pixel(0, 1, &[0, 0, 255, 255]);

    // A bottom-up texture stores the visual bottom row first.
    let texture = Texture2d::from_surface(&ctx, &surface, Format::default()).unwrap();
    assert!(!texture.is_top_down());

    let mut raw = Texture2d::from_external(&ctx, gl::TEXTURE_2D, texture.id(), 1, 2, true);
    raw.set_top_down(true);
    assert_eq!(read_surface::<u8>(&raw).pixel(0, 0), &[0, 0, 255, 255]);
    drop(raw);

    let format = Format::new().load_top_down(true);
    let texture = Texture2d::from_surface(&ctx, &surface, format).unwrap();
    let mut raw = Texture2d::from_external(&ctx, gl::TEXTURE_2D, texture.id(), 1, 2, true);
    raw.set_top_down(true);
    assert_eq!(read_surface::<u8>(&raw).pixel(0, 0), &[255, 0, 0, 255]);
}

#[test]
fn solid_red() {
    let ctx = Context::headless();
    let surface = Surface8u::filled(4, 4, ChannelOrder::RGBA, &[255, 0, 0, 255]);
    let texture = Texture2d::from_surface(&ctx, &surface, Format::default()).unwrap();

    assert_eq!((texture.width(), texture.height()), (4, 4));
    assert_eq!(texture.internal_format(), gl::RGBA8);
    assert!(texture.has_alpha());
    assert!(!texture.is_compressed());
    assert_eq!(texture.aspect_ratio(), 1.0);

    let back = read_surface::<u8>(&texture);
    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(back.pixel(x, y), &[255, 0, 0, 255]);
        }
    }
}

#[test]
fn channels() {
    let ctx = Context::headless();
    let data = (0..12).map(|v| v as u8 * 20).collect();
    let channel = Channel8u::from_data(4, 3, data).unwrap();

    let texture = Texture2d::from_channel(&ctx, &channel, Format::default()).unwrap();
    assert_eq!(texture.internal_format(), gl::R8);
    assert_eq!(texture.swizzle_mask(), SWIZZLE_GRAY);

    let mut source = texture.create_source().unwrap();
    assert_eq!(Channel8u::from_source(&mut source).unwrap(), channel);
}

#[test]
fn identity_swizzle_is_not_written() {
    let device = HeadlessDevice::new();
    let ctx = Context::new(device.clone());
    let surface = Surface8u::new(2, 2, true);

    let texture = Texture2d::from_surface(&ctx, &surface, Format::default()).unwrap();
    assert_eq!(texture.swizzle_mask(), SWIZZLE_IDENTITY);
    assert_eq!(device.parameter(texture.id(), gl::TEXTURE_SWIZZLE_RGBA), None);

    let mask = [Swizzle::Blue, Swizzle::Green, Swizzle::Red, Swizzle::Alpha];
    let format = Format::new().swizzle_mask(mask);
    let texture = Texture2d::from_surface(&ctx, &surface, format).unwrap();
    assert_eq!(texture.swizzle_mask(), mask);
    assert!(device.parameter(texture.id(), gl::TEXTURE_SWIZZLE_RGBA).is_some());
}

#[test]
fn defaults_are_not_written() {
    let device = HeadlessDevice::new();
    let ctx = Context::new(device.clone());

    let format = Format::new()
        .wrap(TextureWrap::Repeat)
        .min_filter(TextureFilter::NearestMipmapLinear)
        .mag_filter(TextureFilter::Linear);

    let texture = Texture2d::new(&ctx, 8, 8, format).unwrap();
    assert!(device.parameter_writes(texture.id()).is_empty());

    let mut texture = Texture2d::new(&ctx, 8, 8, Format::default()).unwrap();
    let writes = device.parameter_writes(texture.id());
    assert!(writes.contains(&(gl::TEXTURE_WRAP_S, ParameterValue::Int(gl::CLAMP_TO_EDGE as i32))));
    assert!(writes.contains(&(gl::TEXTURE_MIN_FILTER, ParameterValue::Int(gl::LINEAR as i32))));

    let count = writes.len();
    texture.set_wrap(TextureWrap::ClampToEdge, TextureWrap::ClampToEdge).unwrap();
    texture.set_min_filter(TextureFilter::Linear).unwrap();
    assert_eq!(device.parameter_writes(texture.id()).len(), count);

    texture.set_mag_filter(TextureFilter::Nearest).unwrap();
    assert_eq!(device.parameter_writes(texture.id()).len(), count + 1);
    assert!(texture.set_mag_filter(TextureFilter::LinearMipmapLinear).is_err());

    assert_eq!(texture.set_max_anisotropy(4.0).unwrap(), 4.0);
    assert_eq!(texture.set_max_anisotropy(100.0).unwrap(), 16.0);
}

#[test]
fn size_validation() {
    let ctx = Context::headless();
    assert!(Texture2d::new(&ctx, 0, 4, Format::default()).is_err());
    assert!(Texture2d::new(&ctx, 4, 100_000, Format::default()).is_err());

    let mut texture = Texture2d::new(&ctx, 8, 8, Format::default()).unwrap();
    match texture.update_surface(&Surface8u::new(4, 8, true), 0) {
        Err(Error::ResizeMismatch {
            attempted,
            expected,
        }) => {
            assert_eq!(attempted, Vector2::new(4, 8));
            assert_eq!(expected, Vector2::new(8, 8));
        }
        v => panic!("{:?}", v),
    }

    for &(w, h) in &[(0, 0), (16, 16), (8, 9)] {
        match texture.update_surface(&Surface8u::new(w, h, true), 0) {
            Err(Error::ResizeMismatch { attempted, .. }) => {
                assert_eq!(attempted, Vector2::new(w, h))
            }
            v => panic!("{:?}", v),
        }
    }

    texture.update_surface(&Surface8u::new(8, 8, true), 0).unwrap();

    let surface = Surface8u::new(4, 4, true);
    match texture.update_surface_region(&surface, surface.bounds(), Vector2::new(6, 0), 0) {
        Err(Error::OutOfBounds) => {}
        v => panic!("{:?}", v),
    }

    let area = Area::with_size(2, 2, 4, 4);
    assert!(texture
        .update_surface_region(&surface, area, Vector2::new(0, 0), 0)
        .is_err());
}

#[test]
fn regions() {
    let ctx = Context::headless();
    for &top_down in &[false, true] {
        let format = Format::new().load_top_down(top_down);
        let surface = Surface8u::new(4, 4, true);
        let mut texture = Texture2d::from_surface(&ctx, &surface, format).unwrap();

        let patch = Surface8u::filled(2, 1, ChannelOrder::RGBA, &[9, 8, 7, 6]);
        texture
            .update_surface_region(&patch, patch.bounds(), Vector2::new(1, 0), 0)
            .unwrap();

        let back = read_surface::<u8>(&texture);
        assert_eq!(back.pixel(0, 0), &[0, 0, 0, 0]);
        assert_eq!(back.pixel(1, 0), &[9, 8, 7, 6]);
        assert_eq!(back.pixel(2, 0), &[9, 8, 7, 6]);
        assert_eq!(back.pixel(1, 1), &[0, 0, 0, 0]);

        for &offset in &[
            Vector2::new(3, 0),
            Vector2::new(0, 4),
            Vector2::new(u32::max_value(), 0),
            Vector2::new(0, u32::max_value()),
        ] {
            match texture.update_surface_region(&patch, patch.bounds(), offset, 0) {
                Err(Error::OutOfBounds) => {}
                v => panic!("{:?} at {:?}", v, offset),
            }
        }
    }
}

#[test]
fn mipmaps() {
    let device = HeadlessDevice::new();
    let ctx = Context::new(device.clone());
    let surface = random_surface(16, 8, ChannelOrder::RGBA, rand::random::<u8>);

    let texture = Texture2d::from_surface(&ctx, &surface, Format::new().mipmap(true)).unwrap();
    assert!(texture.has_mipmapping());
    assert_eq!(texture.min_filter(), TextureFilter::LinearMipmapLinear);
    assert_eq!(texture.max_mipmap_level(), 4);
    assert_eq!(device.levels(texture.id(), gl::TEXTURE_2D), vec![0, 1, 2, 3, 4]);

    let texture = Texture2d::from_surface(&ctx, &surface, Format::default()).unwrap();
    assert_eq!(device.levels(texture.id(), gl::TEXTURE_2D), vec![0]);

    let format = Format::new().mipmap(true).immutable_storage(true);
    let texture = Texture2d::from_surface(&ctx, &surface, format).unwrap();
    assert!(device.is_immutable(texture.id()));
    assert_eq!(device.levels(texture.id(), gl::TEXTURE_2D).len(), 5);

    let rectangle = Format::new().target(TextureTarget::Rectangle).mipmap(true);
    let texture = Texture2d::from_surface(&ctx, &surface, rectangle).unwrap();
    assert!(texture.regenerate_mipmaps().is_err());
}

#[test]
fn tex_coords() {
    let ctx = Context::headless();
    let mut texture = Texture2d::new(&ctx, 64, 32, Format::default()).unwrap();

    let coords = texture.area_tex_coords(Area::with_size(0, 0, 32, 8));
    assert_eq!((coords.x1, coords.y1, coords.x2, coords.y2), (0.0, 1.0, 0.5, 0.75));

    texture.set_clean_size(48, 40);
    assert_eq!((texture.clean_width(), texture.clean_height()), (48, 32));
    assert_eq!(texture.max_u(), 0.75);
    assert_eq!(texture.max_v(), 1.0);

    // Orientation only mirrors the vertical coordinates.
    let area = Area::with_size(16, 8, 32, 8);
    let flipped = Texture2d::new(&ctx, 64, 32, Format::default()).unwrap();
    let upright = Texture2d::new(&ctx, 64, 32, Format::new().load_top_down(true)).unwrap();
    let (a, b) = (flipped.area_tex_coords(area), upright.area_tex_coords(area));
    assert_eq!((a.x1, a.x2), (b.x1, b.x2));
    assert_eq!((b.x1, b.y1, b.x2, b.y2), (0.25, 0.25, 0.75, 0.5));
    assert_eq!((a.y1, a.y2), (1.0 - b.y1, 1.0 - b.y2));

    let format = Format::new().target(TextureTarget::Rectangle).load_top_down(true);
    let texture = Texture2d::new(&ctx, 64, 32, format).unwrap();
    let coords = texture.area_tex_coords(Area::with_size(0, 0, 32, 8));
    assert_eq!((coords.x1, coords.y1, coords.x2, coords.y2), (0.0, 0.0, 32.0, 8.0));
    assert_eq!(texture.max_u(), 64.0);
}

#[test]
fn raw_bytes() {
    let ctx = Context::headless();
    let bytes: Vec<u8> = (0..16).collect();

    let (rgba, ubyte) = (gl::RGBA, gl::UNSIGNED_BYTE);
    let format = Format::default();
    let texture = Texture2d::from_bytes(&ctx, &bytes, rgba, ubyte, 2, 2, format.clone()).unwrap();
    assert_eq!(texture.internal_format(), gl::RGBA8);

    // Rows are uploaded as they are, so reading them back un-flips a bottom-up texture.
    let back = read_surface::<u8>(&texture);
    assert_eq!(back.pixel(0, 0), &[8, 9, 10, 11]);
    assert_eq!(back.pixel(0, 1), &[0, 1, 2, 3]);

    let texture = Texture2d::from_bytes(&ctx, &bytes[..8], gl::RG, ubyte, 2, 2, format).unwrap();
    assert_eq!(texture.internal_format(), gl::RG8);

    let short = Texture2d::from_bytes(&ctx, &bytes[..15], rgba, ubyte, 2, 2, Format::default());
    assert!(short.is_err());
}

#[test]
fn image_sources() {
    let device = HeadlessDevice::new();
    let ctx = Context::new(device.clone());
    let surface = random_surface(8, 4, ChannelOrder::RGBA, rand::random::<u8>);

    let heap = Texture2d::from_source(&ctx, &mut surface.to_source(), Format::default()).unwrap();
    assert_eq!(device.buffer_uploads(), 0);

    let pbo = Rc::new(PixelBuffer::new(&ctx, 8 * 4 * 4, BufferUsage::Stream).unwrap());
    let format = Format::new().intermediate_pbo(pbo.clone());
    let staged = Texture2d::from_source(&ctx, &mut surface.to_source(), format.clone()).unwrap();
    assert_eq!(device.buffer_uploads(), 1);
    assert_eq!(read_surface::<u8>(&staged), read_surface::<u8>(&heap));
    assert_eq!(read_surface::<u8>(&staged), surface);

    // A refused mapping falls back to the heap.
    device.set_map_failure(true);
    let fallback = Texture2d::from_source(&ctx, &mut surface.to_source(), format).unwrap();
    assert_eq!(device.buffer_uploads(), 1);
    assert_eq!(read_surface::<u8>(&fallback), surface);
    device.set_map_failure(false);

    // So does a buffer which is too small.
    let small = Rc::new(PixelBuffer::new(&ctx, 16, BufferUsage::Stream).unwrap());
    let format = Format::new().intermediate_pbo(small);
    let fallback = Texture2d::from_source(&ctx, &mut surface.to_source(), format).unwrap();
    assert_eq!(device.buffer_uploads(), 1);
    assert_eq!(read_surface::<u8>(&fallback), surface);

    let bytes = vec![1, 2, 3, 4, 5, 6, 7, 8];
    let gray = BufferSource::new(2, 2, ChannelOrder::YA, DataType::U8, bytes);
    let texture = Texture2d::from_source(&ctx, &mut gray.clone(), Format::default()).unwrap();
    assert_eq!(texture.internal_format(), gl::RG8);
    assert_eq!(texture.swizzle_mask(), SWIZZLE_GRAY_ALPHA);
}

#[test]
fn buffer_updates() {
    let device = HeadlessDevice::new();
    let ctx = Context::new(device.clone());
    let mut texture = Texture2d::new(&ctx, 2, 1, Format::new().load_top_down(true)).unwrap();

    let pbo = PixelBuffer::new(&ctx, 12, BufferUsage::Dynamic).unwrap();
    pbo.write(4, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
    texture
        .update_from_buffer(&pbo, 4, gl::RGBA, gl::UNSIGNED_BYTE, 0)
        .unwrap();

    let back = read_surface::<u8>(&texture);
    assert_eq!(back.pixel(1, 0), &[5, 6, 7, 8]);
    for &offset in &[8, usize::max_value()] {
        match texture.update_from_buffer(&pbo, offset, gl::RGBA, gl::UNSIGNED_BYTE, 0) {
            Err(Error::OutOfBounds) => {}
            v => panic!("{:?} at {}", v, offset),
        }
    }
}

#[test]
fn ownership() {
    let device = HeadlessDevice::new();
    let ctx = Context::new(device.clone());

    let texture = Texture2d::new(&ctx, 4, 4, Format::new().label("albedo")).unwrap();
    let id = texture.id();
    assert_eq!(texture.label(), Some("albedo"));
    assert_eq!(device.label(id), Some("albedo".to_owned()));

    let external = Texture2d::from_external(&ctx, gl::TEXTURE_2D, id, 4, 4, true);
    drop(external);
    assert!(device.is_texture(id));

    drop(texture);
    assert!(!device.is_texture(id));
    assert_eq!(device.texture_count(), 0);

    let texture = Texture2d::new(&ctx, 4, 4, Format::default()).unwrap();
    texture.bind(3).unwrap();
    assert_eq!(device.binding(3), Some((gl::TEXTURE_2D, texture.id())));
    texture.unbind(3).unwrap();
}
