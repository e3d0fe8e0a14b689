extern crate byteorder;
extern crate crayon_texture;
extern crate gl;

use std::rc::Rc;

use byteorder::{LittleEndian, WriteBytesExt};

use crayon_texture::backends::ext;
use crayon_texture::containers::{dds, ktx};
use crayon_texture::prelude::*;

fn ktx_rgba(width: u32, height: u32, levels: &[Vec<u8>]) -> Vec<u8> {
    let mut bytes = ktx::MAGIC.to_vec();
    let header = [
        0x0403_0201,
        gl::UNSIGNED_BYTE,
        1,
        gl::RGBA,
        gl::RGBA8,
        gl::RGBA,
        width,
        height,
        0,
        0,
        1,
        levels.len() as u32,
        0,
    ];

    for v in &header {
        bytes.write_u32::<LittleEndian>(*v).unwrap();
    }

    for v in levels {
        bytes.write_u32::<LittleEndian>(v.len() as u32).unwrap();
        bytes.extend_from_slice(v);
    }

    bytes
}

fn dds_dxt5(size: u32, mipmaps: u32, len: usize) -> Vec<u8> {
    let mut v = [0u32; 31];
    v[0] = 124;
    v[1] = 0x0002_0000;
    v[2] = size;
    v[3] = size;
    v[6] = mipmaps;
    v[18] = 32;
    v[19] = 0x4;
    v[20] = u32::from_le_bytes(*b"DXT5");

    let mut bytes = dds::MAGIC.to_vec();
    for w in &v {
        bytes.write_u32::<LittleEndian>(*w).unwrap();
    }

    bytes.resize(bytes.len() + len, 0x55);
    bytes
}

#[test]
fn ktx_files() {
    let device = HeadlessDevice::new();
    let ctx = Context::new(device.clone());

    let level0: Vec<u8> = (0..16).collect();
    let bytes = ktx_rgba(2, 2, &[level0, vec![200; 4]]);

    let texture = Texture2d::from_ktx(&ctx, &bytes, Format::default()).unwrap();
    assert_eq!(texture.size(), Vector2::new(2, 2));
    assert_eq!(texture.internal_format(), gl::RGBA8);
    assert_eq!(texture.max_mipmap_level(), 1);
    assert_eq!(device.levels(texture.id(), gl::TEXTURE_2D), vec![0, 1]);

    // Container rows are uploaded as they are.
    let mut source = texture.create_source().unwrap();
    let surface = Surface8u::from_source(&mut source).unwrap();
    assert_eq!(surface.pixel(0, 1), &[0, 1, 2, 3]);

    match Texture2d::from_ktx(&ctx, &bytes[..bytes.len() - 2], Format::default()) {
        Err(Error::TextureData(_)) => {}
        v => panic!("{:?}", v),
    }
}

#[test]
fn dds_files() {
    let device = HeadlessDevice::new();
    let ctx = Context::new(device.clone());

    let bytes = dds_dxt5(8, 4, 64 + 16 * 3);
    let format = Format::new().immutable_storage(true);
    let texture = Texture2d::from_dds(&ctx, &bytes, format).unwrap();

    assert!(texture.is_compressed());
    assert!(!device.is_immutable(texture.id()));
    assert_eq!(texture.internal_format(), ext::COMPRESSED_RGBA_S3TC_DXT5);
    assert_eq!(device.levels(texture.id(), gl::TEXTURE_2D), vec![0, 1, 2, 3]);
    assert!(texture.create_source().is_err());

    let bytes = dds_dxt5(8, 4, 64);
    assert!(Texture2d::from_dds(&ctx, &bytes, Format::default()).is_err());
}

#[test]
fn payloads() {
    let device = HeadlessDevice::new();
    let ctx = Context::new(device.clone());
    let mut texture = Texture2d::new(&ctx, 4, 4, Format::new().load_top_down(true)).unwrap();

    let store = DataStore::Heap((0..9).collect());
    let mut data = TextureData::new(3, 1, gl::RGB8, gl::RGB, gl::UNSIGNED_BYTE, store);
    assert!(data.set_unpack_alignment(3).is_err());

    let level = |size| Level {
        width: 3,
        height: 1,
        offset: 0,
        size,
    };

    assert!(data.push_level(level(12)).is_err());
    assert!(data.push_level(level(6)).is_err());
    data.push_level(level(9)).unwrap();

    texture.replace(&data).unwrap();
    assert_eq!(texture.size(), Vector2::new(3, 1));
    assert_eq!(texture.internal_format(), gl::RGB8);

    let mut source = texture.create_source().unwrap();
    let surface = Surface8u::from_source(&mut source).unwrap();
    assert_eq!(surface.pixel(2, 0), &[6, 7, 8]);

    texture.update_data(&data).unwrap();

    let store = DataStore::Heap(vec![0; 64]);
    let mut other = TextureData::new(4, 4, gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE, store);
    other
        .push_level(Level {
            width: 4,
            height: 4,
            offset: 0,
            size: 64,
        })
        .unwrap();

    match texture.update_data(&other) {
        Err(Error::ResizeMismatch { attempted, .. }) => assert_eq!(attempted, Vector2::new(4, 4)),
        v => panic!("{:?}", v),
    }

    // Payloads can live in a pixel buffer.
    let pbo = PixelBuffer::new(&ctx, 64, BufferUsage::Static).unwrap();
    pbo.write(0, &[255; 64]).unwrap();

    let store = DataStore::Buffer(Rc::new(pbo));
    let mut staged = TextureData::new(4, 4, gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE, store);
    staged
        .push_level(Level {
            width: 4,
            height: 4,
            offset: 0,
            size: 64,
        })
        .unwrap();

    assert!(staged.level_bytes(0).is_none());
    let texture = Texture2d::from_data(&ctx, &staged, Format::default()).unwrap();
    assert_eq!(device.buffer_uploads(), 1);

    let mut source = texture.create_source().unwrap();
    let surface = Surface8u::from_source(&mut source).unwrap();
    assert_eq!(surface.pixel(3, 3), &[255, 255, 255, 255]);
}

#[test]
fn volumes() {
    let device = HeadlessDevice::new();
    let ctx = Context::new(device.clone());

    let mut texture = Texture3d::new(&ctx, 4, 4, 4, Format::default()).unwrap();
    assert_eq!(texture.target(), gl::TEXTURE_3D);
    assert_eq!(texture.depth(), 4);

    let layer = Surface8u::filled(4, 4, ChannelOrder::RGBA, &[1, 2, 3, 4]);
    texture.update(&layer, 2, 0).unwrap();
    texture
        .update(&Surface8u::with_order(4, 4, ChannelOrder::BGRA), 3, 0)
        .unwrap();

    match texture.update(&layer, 4, 0) {
        Err(Error::OutOfBounds) => {}
        v => panic!("{:?}", v),
    }

    match texture.update(&Surface8u::with_order(4, 4, ChannelOrder::ARGB), 0, 0) {
        Err(Error::DataFormat { order, bits }) => {
            assert_eq!(order, ChannelOrder::ARGB);
            assert_eq!(bits, 8);
        }
        v => panic!("{:?}", v),
    }

    assert!(texture.update(&Surface8u::new(2, 2, true), 0, 0).is_err());

    let format = Format::new().target(TextureTarget::Texture2dArray).mipmap(true);
    let bytes = vec![0; 4 * 4 * 3 * 4];
    let size = Vector3::new(4, 4, 3);
    let (rgba, ubyte) = (gl::RGBA, gl::UNSIGNED_BYTE);
    let array = Texture3d::from_bytes(&ctx, &bytes, rgba, ubyte, size, format).unwrap();
    assert_eq!(array.target(), gl::TEXTURE_2D_ARRAY);
    assert_eq!(device.levels(array.id(), gl::TEXTURE_2D_ARRAY), vec![0, 1, 2]);

    let format = Format::new().mipmap(true);
    let bytes = vec![0; 4 * 4 * 4 * 4];
    let size = Vector3::new(4, 4, 4);
    let mut volume = Texture3d::from_bytes(&ctx, &bytes, rgba, ubyte, size, format).unwrap();
    assert_eq!(device.levels(volume.id(), gl::TEXTURE_3D), vec![0, 1, 2]);

    volume.update(&Surface8u::new(2, 2, true), 1, 1).unwrap();
    assert!(volume.update(&Surface8u::new(2, 2, true), 2, 1).is_err());

    assert!(Texture3d::new(&ctx, 4, 4, 0, Format::default()).is_err());
    let cube = Format::new().target(TextureTarget::CubeMap);
    assert!(Texture3d::new(&ctx, 4, 4, 4, cube).is_err());
}
