//! Volume textures and 2D texture arrays.

use std::ops::{Deref, DerefMut};

use gl::types::*;

use crate::backends::{PixelData, TexImage};
use crate::context::Context;
use crate::errors::*;
use crate::image::{Component, DataType, Surface};
use crate::math::{Vector2, Vector3};

use super::base::{mip_level_size, required_mipmap_levels, Texture, TextureBase};
use super::format::{Format, TextureTarget};
use super::introspect;
use super::resolve;

/// A 3D texture, or an array of 2D layers.
#[derive(Debug)]
pub struct Texture3d {
    base: TextureBase,
    width: u32,
    height: u32,
    depth: u32,
}

impl Texture3d {
    /// Creates a texture with uninitialized contents. `Format::target` picks between
    /// `Texture3d` (the default) and `Texture2dArray`.
    pub fn new(ctx: &Context, width: u32, height: u32, depth: u32, format: Format) -> Result<Self> {
        let internal_format = format.internal_format.unwrap_or_else(|| {
            resolve::color_internal_format(ctx.capabilities(), DataType::U8, true)
        });

        let size = Vector3::new(width, height, depth);
        let texture = Texture3d::create(ctx, size, &format, internal_format)?;
        if let Some(internal_format) = texture.storage(&format)? {
            let info = introspect::internal_format_info(internal_format);
            let image = TexImage::level_2d(texture.target(), 0, internal_format, width, height)
                .with_depth(depth)
                .with_pixels(info.data_format, info.data_type, 1);

            texture
                .context()
                .device()
                .tex_image(texture.id(), &image, PixelData::None)?;
        }

        Ok(texture)
    }

    /// Creates a texture from tightly packed pixels, layer after layer.
    pub fn from_bytes(
        ctx: &Context,
        bytes: &[u8],
        data_format: GLenum,
        data_type: GLenum,
        size: Vector3<u32>,
        format: Format,
    ) -> Result<Self> {
        let data_type = format.data_type.unwrap_or(data_type);
        let pixel_bytes = introspect::client_pixel_bytes(data_format, data_type).ok_or_else(|| {
            Error::Unsupported(format!(
                "Unknown client format {:#x} with type {:#x}.",
                data_format, data_type
            ))
        })?;

        let len = size.x as usize * size.y as usize * size.z as usize * pixel_bytes;
        if bytes.len() < len {
            return Err(Error::OutOfBounds);
        }

        let internal_format = match format.internal_format {
            Some(v) => v,
            None => resolve::bytes_internal_format(ctx.capabilities(), data_format, data_type).0,
        };

        let texture = Texture3d::create(ctx, size, &format, internal_format)?;
        let image = TexImage::level_2d(texture.target(), 0, internal_format, size.x, size.y)
            .with_depth(size.z)
            .with_pixels(data_format, data_type, 1);

        let respecify = texture.storage(&format)?;
        {
            let mut device = texture.context().device();
            match respecify {
                Some(_) => device.tex_image(texture.id(), &image, PixelData::Host(bytes))?,
                None => device.tex_sub_image(texture.id(), &image, PixelData::Host(bytes))?,
            }
        }

        if texture.has_mipmapping() {
            texture.regenerate_mipmaps()?;
        }

        Ok(texture)
    }

    fn create(
        ctx: &Context,
        size: Vector3<u32>,
        format: &Format,
        internal_format: GLenum,
    ) -> Result<Self> {
        let target = match format.target {
            TextureTarget::Texture2d | TextureTarget::Texture3d => gl::TEXTURE_3D,
            TextureTarget::Texture2dArray => gl::TEXTURE_2D_ARRAY,
            v => {
                return Err(Error::Unsupported(format!(
                    "{:?} is not a volume target.",
                    v
                )));
            }
        };

        let max = ctx.capabilities().max_texture_size;
        let dims = [size.x, size.y, size.z];
        if dims.iter().any(|&v| v == 0 || v > max) {
            return Err(Error::OutOfBounds);
        }

        let levels = if target == gl::TEXTURE_3D {
            required_mipmap_levels(size.x, size.y, size.z)
        } else {
            required_mipmap_levels(size.x, size.y, 1)
        };

        let mut base = TextureBase::new(ctx, target)?;
        base.set_internal_format(internal_format);
        base.apply_format(format, None, levels)?;

        debug!(
            "Texture3d {} created with {}x{}x{} {}.",
            base.id(),
            size.x,
            size.y,
            size.z,
            introspect::internal_format_name(internal_format)
        );

        Ok(Texture3d {
            base,
            width: size.x,
            height: size.y,
            depth: size.z,
        })
    }

    fn storage(&self, format: &Format) -> Result<Option<GLenum>> {
        let internal_format = self.base.internal_format();
        if !format.immutable_storage || !self.context().capabilities().has_texture_storage() {
            return Ok(Some(internal_format));
        }

        let levels = if self.base.has_mipmapping() {
            self.base.max_mipmap_level() + 1
        } else {
            1
        };

        let size = Vector3::new(self.width, self.height, self.depth);
        self.context()
            .device()
            .allocate_storage(self.target(), self.id(), levels, internal_format, size)?;

        Ok(None)
    }

    /// Returns the number of layers of a mipmap level.
    fn level_depth(&self, level: u32) -> u32 {
        if self.target() == gl::TEXTURE_3D {
            mip_level_size(self.depth, level)
        } else {
            self.depth
        }
    }

    /// Replaces the layer `depth_index` of a mipmap level with `surface`.
    ///
    /// The surface is uploaded without any conversion, so its channel order must be one
    /// GL takes as it is.
    pub fn update<T: Component>(
        &mut self,
        surface: &Surface<T>,
        depth_index: u32,
        level: u32,
    ) -> Result<()> {
        let expected = Vector2::new(
            mip_level_size(self.width, level),
            mip_level_size(self.height, level),
        );

        if surface.size() != expected {
            return Err(Error::ResizeMismatch {
                attempted: surface.size(),
                expected,
            });
        }

        if depth_index >= self.level_depth(level) {
            return Err(Error::OutOfBounds);
        }

        let (format, pixel_type) = resolve::client_format(surface.channel_order(), T::DATA_TYPE)?;

        let copy;
        let row = surface.width() as usize * surface.channel_order().channels();
        let bytes = if surface.row_stride() == row {
            surface.as_bytes()
        } else {
            copy = surface.converted(surface.bounds(), surface.channel_order(), false)?;
            copy.as_bytes()
        };

        let internal_format = self.internal_format();
        let (w, h) = (expected.x, expected.y);
        let image = TexImage::level_2d(self.target(), level, internal_format, w, h)
            .with_offset(0, 0, depth_index)
            .with_pixels(format, pixel_type, 1);

        self.context()
            .device()
            .tex_sub_image(self.id(), &image, PixelData::Host(bytes))
    }
}

impl Texture for Texture3d {
    #[inline]
    fn base(&self) -> &TextureBase {
        &self.base
    }

    #[inline]
    fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn depth(&self) -> u32 {
        self.depth
    }
}

impl Deref for Texture3d {
    type Target = TextureBase;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl DerefMut for Texture3d {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.base
    }
}
