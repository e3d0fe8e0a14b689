//! # crayon-texture
//!
//! OpenGL texture resources. The crate turns CPU-side pixel data (surfaces, single
//! channels, lazily decoded image sources or compressed container payloads) plus a
//! `Format` description into GPU textures, and keeps them updatable, re-mipmappable and
//! readable afterwards.
//!
//! All commands go through a `Context`, which wraps a `Device` bound to the graphics
//! context of the current thread. Two devices are provided: `GLDevice`, built on the `gl`
//! crate, and `HeadlessDevice`, a software emulation used by tests and tools.
//!
//! ```rust,ignore
//! use crayon_texture::prelude::*;
//!
//! let ctx = Context::headless();
//! let surface = Surface8u::new(4, 4, true);
//! let texture = Texture2d::from_surface(&ctx, &surface, Format::default())?;
//! texture.bind(0)?;
//! ```

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;

extern crate byteorder;
extern crate cgmath;
extern crate failure;
extern crate gl;
extern crate smallvec;

pub mod errors;
pub mod math;

pub mod backends;
pub mod buffer;
pub mod context;
pub mod image;

pub mod containers;
pub mod texture;

pub mod prelude {
    pub use crate::backends::{Capabilities, Device, HeadlessDevice, Version};
    pub use crate::buffer::{BufferUsage, PixelBuffer};
    pub use crate::context::Context;
    pub use crate::errors::{Error, Result};
    pub use crate::image::{
        BufferSource, Channel, Channel16u, Channel32f, Channel8u, ChannelOrder, ColorModel,
        Component, DataType, ImageSource, ImageTarget, Surface, Surface16u, Surface32f, Surface8u,
    };
    pub use crate::math::{Area, Rect, Vector2, Vector3};
    pub use crate::texture::prelude::*;
}
