//! The backend of the texture manager, which should be responsible for only one thing:
//! executing texture and pixel buffer commands against a graphics context.
//!
//! Everything above this module talks to a `Device`. `gl::GLDevice` issues the commands
//! through the `gl` crate, `headless::HeadlessDevice` emulates them in memory.

pub mod capabilities;
pub mod ext;
pub mod headless;

pub mod gl;

pub use self::capabilities::{Capabilities, Extensions, Profile, TextureCompression, Version};
pub use self::headless::HeadlessDevice;

use ::gl::types::*;

use crate::errors::*;
use crate::math::Vector3;

pub type TextureId = GLuint;
pub type BufferId = GLuint;

/// A value of a texture parameter.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ParameterValue {
    Int(GLint),
    Float(f32),
    Ints([GLint; 4]),
    Floats([f32; 4]),
}

/// Describes one image (a face, a level and a region of it) of a texture, together with
/// the client-side layout of the pixels travelling to or from it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TexImage {
    /// The image target, e.g. `GL_TEXTURE_2D` or `GL_TEXTURE_CUBE_MAP_POSITIVE_X`.
    pub target: GLenum,
    pub level: u32,
    pub internal_format: GLenum,
    pub offset: Vector3<u32>,
    pub size: Vector3<u32>,
    /// The client pixel format, `0` for compressed images.
    pub format: GLenum,
    /// The client pixel type, `0` for compressed images.
    pub pixel_type: GLenum,
    /// Row alignment of the client pixels.
    pub alignment: u32,
}

impl TexImage {
    /// Describes a whole two-dimensional level.
    pub fn level_2d(target: GLenum, level: u32, internal_format: GLenum, w: u32, h: u32) -> Self {
        TexImage {
            target,
            level,
            internal_format,
            offset: Vector3::new(0, 0, 0),
            size: Vector3::new(w, h, 1),
            format: 0,
            pixel_type: 0,
            alignment: 4,
        }
    }

    #[inline]
    pub fn with_offset(mut self, x: u32, y: u32, z: u32) -> Self {
        self.offset = Vector3::new(x, y, z);
        self
    }

    #[inline]
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.size.z = depth;
        self
    }

    #[inline]
    pub fn with_pixels(mut self, format: GLenum, pixel_type: GLenum, alignment: u32) -> Self {
        self.format = format;
        self.pixel_type = pixel_type;
        self.alignment = alignment;
        self
    }
}

/// Where pixel data of an upload comes from.
#[derive(Debug, Copy, Clone)]
pub enum PixelData<'a> {
    /// Allocates storage only.
    None,
    /// Client memory.
    Host(&'a [u8]),
    /// A region of a pixel buffer, starting at `offset`.
    Buffer { buffer: BufferId, offset: usize },
}

/// A graphics context able to execute texture commands.
///
/// Implementations are bound to the context of the thread they are created on and must
/// only be used from there.
pub trait Device {
    fn capabilities(&self) -> &Capabilities;

    fn create_texture(&mut self, target: GLenum) -> Result<TextureId>;

    fn delete_texture(&mut self, id: TextureId) -> Result<()>;

    /// Binds `id` to texture unit `unit`. An `id` of `0` unbinds.
    fn bind_texture(&mut self, unit: u32, target: GLenum, id: TextureId) -> Result<()>;

    fn set_parameter(
        &mut self,
        target: GLenum,
        id: TextureId,
        pname: GLenum,
        value: ParameterValue,
    ) -> Result<()>;

    /// Allocates immutable storage for `levels` levels (and all faces of cube maps).
    fn allocate_storage(
        &mut self,
        target: GLenum,
        id: TextureId,
        levels: u32,
        internal_format: GLenum,
        size: Vector3<u32>,
    ) -> Result<()>;

    /// (Re)specifies a whole level, optionally with pixel data.
    fn tex_image(&mut self, id: TextureId, image: &TexImage, data: PixelData) -> Result<()>;

    /// Replaces a region of an existing level.
    fn tex_sub_image(&mut self, id: TextureId, image: &TexImage, data: PixelData) -> Result<()>;

    /// (Re)specifies a whole level from `len` bytes of compressed data.
    fn compressed_tex_image(
        &mut self,
        id: TextureId,
        image: &TexImage,
        data: PixelData,
        len: usize,
    ) -> Result<()>;

    /// Replaces a region of an existing compressed level.
    fn compressed_tex_sub_image(
        &mut self,
        id: TextureId,
        image: &TexImage,
        data: PixelData,
        len: usize,
    ) -> Result<()>;

    fn generate_mipmap(&mut self, target: GLenum, id: TextureId) -> Result<()>;

    /// Queries the internal format of a level.
    fn internal_format(&mut self, target: GLenum, id: TextureId, level: u32) -> Result<GLenum>;

    /// Queries the dimensions of a level.
    fn level_size(&mut self, target: GLenum, id: TextureId, level: u32) -> Result<Vector3<u32>>;

    /// Reads a whole level back in the client layout described by `image`.
    fn read_image(&mut self, id: TextureId, image: &TexImage, out: &mut [u8]) -> Result<()>;

    /// Reads a whole compressed level back.
    fn read_compressed_image(&mut self, id: TextureId, image: &TexImage) -> Result<Vec<u8>>;

    fn set_label(&mut self, target: GLenum, id: TextureId, label: &str) -> Result<()>;

    fn create_buffer(&mut self, target: GLenum, size: usize, usage: GLenum) -> Result<BufferId>;

    fn delete_buffer(&mut self, id: BufferId) -> Result<()>;

    fn buffer_sub_data(&mut self, id: BufferId, offset: usize, data: &[u8]) -> Result<()>;

    /// Maps the whole buffer for writing and passes it to `func`. Returns `false` without
    /// calling `func` if the driver refused to map it.
    fn map_buffer(&mut self, id: BufferId, func: &mut dyn FnMut(&mut [u8])) -> Result<bool>;
}

/// Returns the target a texture is bound to for a given image target.
#[inline]
pub fn bind_target(target: GLenum) -> GLenum {
    match target {
        ::gl::TEXTURE_CUBE_MAP_POSITIVE_X
        | ::gl::TEXTURE_CUBE_MAP_NEGATIVE_X
        | ::gl::TEXTURE_CUBE_MAP_POSITIVE_Y
        | ::gl::TEXTURE_CUBE_MAP_NEGATIVE_Y
        | ::gl::TEXTURE_CUBE_MAP_POSITIVE_Z
        | ::gl::TEXTURE_CUBE_MAP_NEGATIVE_Z => ::gl::TEXTURE_CUBE_MAP,
        v => v,
    }
}

/// Returns true if images of `target` have a depth dimension.
#[inline]
pub fn is_volume_target(target: GLenum) -> bool {
    target == ::gl::TEXTURE_3D || target == ::gl::TEXTURE_2D_ARRAY
}
