extern crate crayon_texture;
extern crate gl;
extern crate rand;

use std::collections::HashSet;

use rand::Rng;

use crayon_texture::backends::ParameterValue;
use crayon_texture::prelude::*;

fn frame(value: u8) -> Surface8u {
    Surface8u::filled(64, 64, ChannelOrder::RGB, &[value, value, value])
}

#[test]
fn two_masters() {
    let device = HeadlessDevice::new();
    let ctx = Context::new(device.clone());
    let cache = Texture2dCache::new(&ctx, &frame(0), Format::default());
    assert_eq!(cache.slot_count(), 0);
    assert_eq!(cache.size(), Vector2::new(64, 64));

    let a = cache.cache(&frame(1)).unwrap();
    let b = cache.cache(&frame(2)).unwrap();
    assert_eq!(cache.slot_count(), 2);
    assert_eq!(device.texture_count(), 2);
    assert_ne!(a.id(), b.id());
    assert_eq!(a.internal_format(), gl::RGB8);

    let mut source = b.create_source().unwrap();
    assert_eq!(Surface8u::from_source(&mut source).unwrap(), frame(2));

    // Dropping a lease keeps the texture alive for the next call.
    let id = a.id();
    drop(a);
    assert!(device.is_texture(id));
    assert_eq!(cache.available_count(), 1);

    let c = cache.cache(&frame(3)).unwrap();
    assert_eq!(c.id(), id);
    assert_eq!(cache.slot_count(), 2);

    let mut source = c.create_source().unwrap();
    assert_eq!(Surface8u::from_source(&mut source).unwrap(), frame(3));

    match cache.cache(&Surface8u::new(32, 64, false)) {
        Err(Error::ResizeMismatch { attempted, expected }) => {
            assert_eq!(attempted, Vector2::new(32, 64));
            assert_eq!(expected, Vector2::new(64, 64));
        }
        v => panic!("{:?}", v),
    }

    drop(cache);
    assert_eq!(device.texture_count(), 2);
    drop(b);
    drop(c);
    assert_eq!(device.texture_count(), 0);
}

#[test]
fn leases_are_exclusive() {
    let ctx = Context::headless();
    let surface = Surface8u::new(4, 4, true);
    let cache = Texture2dCache::new(&ctx, &surface, Format::default());

    let mut rng = rand::thread_rng();
    let mut leases: Vec<CachedTexture> = Vec::new();
    let mut peak = 0;

    for _ in 0..200 {
        if leases.is_empty() || rng.gen::<bool>() {
            leases.push(cache.cache(&surface).unwrap());
        } else {
            let index = rng.gen_range(0, leases.len());
            leases.swap_remove(index);
        }

        peak = peak.max(leases.len());

        let ids: HashSet<_> = leases.iter().map(|v| v.id()).collect();
        assert_eq!(ids.len(), leases.len());
        assert_eq!(cache.slot_count(), peak);
        assert_eq!(cache.available_count(), peak - leases.len());
    }
}

#[test]
fn parameters_survive_leases() {
    let device = HeadlessDevice::new();
    let ctx = Context::new(device.clone());
    let cache = Texture2dCache::new(&ctx, &frame(0), Format::default());

    let mut a = cache.cache(&frame(1)).unwrap();
    let id = a.id();
    a.set_wrap_s(TextureWrap::MirroredRepeat).unwrap();
    drop(a);

    let mut b = cache.cache(&frame(2)).unwrap();
    assert_eq!(b.id(), id);
    assert_eq!(b.wrap_s(), TextureWrap::MirroredRepeat);

    b.set_wrap_s(TextureWrap::ClampToEdge).unwrap();
    assert_eq!(
        device.parameter(id, gl::TEXTURE_WRAP_S),
        Some(ParameterValue::Int(gl::CLAMP_TO_EDGE as i32))
    );
}
