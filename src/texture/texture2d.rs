//! Two-dimensional textures, the most used kind.

use std::ops::{Deref, DerefMut};

use gl::types::*;

use crate::backends::{PixelData, TexImage, TextureId};
use crate::buffer::PixelBuffer;
use crate::containers;
use crate::context::Context;
use crate::errors::*;
use crate::image::{Channel, Component, DataType, ImageSource, Surface};
use crate::math::{Area, Point2, Rect, Vector2, Vector3};

use super::base::{mip_level_size, required_mipmap_levels, Destination, Texture, TextureBase};
use super::data::TextureData;
use super::format::{Format, SwizzleMask, TextureTarget};
use super::introspect;
use super::resolve;
use super::target::{self, TextureImageSource, TextureImageTarget};

/// A 2D (or rectangle) texture.
///
/// Besides its allocated size a texture has a "clean" size, the part of it which holds
/// meaningful content, e.g. when the image has been padded to a power of two.
#[derive(Debug)]
pub struct Texture2d {
    base: TextureBase,
    width: u32,
    height: u32,
    clean_width: u32,
    clean_height: u32,
}

impl Texture2d {
    /// Creates a texture with uninitialized contents.
    pub fn new(ctx: &Context, width: u32, height: u32, format: Format) -> Result<Self> {
        let caps = ctx.capabilities();
        let internal_format = format
            .internal_format
            .unwrap_or_else(|| resolve::color_internal_format(caps, DataType::U8, true));

        let texture = Texture2d::create(ctx, width, height, &format, internal_format, None)?;
        let info = introspect::internal_format_info(internal_format);
        let client = (info.data_format, info.data_type);

        if let Some(internal_format) = texture.storage(&format)? {
            if info.compressed {
                let len = introspect::compressed_image_size(internal_format, width, height)
                    .unwrap_or(0);
                let image = TexImage::level_2d(texture.target(), 0, internal_format, width, height);
                let zeros = vec![0; len];
                texture
                    .context()
                    .device()
                    .compressed_tex_image(texture.id(), &image, PixelData::Host(&zeros), len)?;
            } else {
                let image = TexImage::level_2d(texture.target(), 0, internal_format, width, height)
                    .with_pixels(client.0, client.1, 1);
                texture
                    .context()
                    .device()
                    .tex_image(texture.id(), &image, PixelData::None)?;
            }
        }

        Ok(texture)
    }

    /// Creates a texture from tightly packed pixels, which are uploaded as they are: the
    /// first row lands in texture row 0. The pixel type can be overridden with
    /// `Format::data_type`.
    pub fn from_bytes(
        ctx: &Context,
        bytes: &[u8],
        data_format: GLenum,
        data_type: GLenum,
        width: u32,
        height: u32,
        format: Format,
    ) -> Result<Self> {
        let data_type = format.data_type.unwrap_or(data_type);
        let pixel_bytes = introspect::client_pixel_bytes(data_format, data_type).ok_or_else(|| {
            Error::Unsupported(format!(
                "Unknown client format {:#x} with type {:#x}.",
                data_format, data_type
            ))
        })?;

        if bytes.len() < width as usize * height as usize * pixel_bytes {
            return Err(Error::OutOfBounds);
        }

        let (internal_format, swizzle) = match format.internal_format {
            Some(v) => (v, None),
            None => resolve::bytes_internal_format(ctx.capabilities(), data_format, data_type),
        };

        let texture = Texture2d::create(ctx, width, height, &format, internal_format, swizzle)?;
        let image = TexImage::level_2d(texture.target(), 0, internal_format, width, height)
            .with_pixels(data_format, data_type, 1);

        let respecify = texture.storage(&format)?;
        texture.upload(&image, PixelData::Host(bytes), respecify)?;

        texture.after_upload()?;
        Ok(texture)
    }

    /// Creates a texture from a surface of 8-bit, 16-bit or float components.
    pub fn from_surface<T: Component>(
        ctx: &Context,
        surface: &Surface<T>,
        format: Format,
    ) -> Result<Self> {
        let internal_format = format.internal_format.unwrap_or_else(|| {
            resolve::color_internal_format(ctx.capabilities(), T::DATA_TYPE, surface.has_alpha())
        });

        let (w, h) = (surface.width(), surface.height());
        let texture = Texture2d::create(ctx, w, h, &format, internal_format, None)?;

        let respecify = texture.storage(&format)?;
        let dst = Destination::level(texture.target(), 0, surface.size());
        texture.upload_surface(dst, surface, surface.bounds(), respecify)?;

        texture.after_upload()?;
        Ok(texture)
    }

    /// Creates a gray texture from a single channel.
    pub fn from_channel<T: Component>(
        ctx: &Context,
        channel: &Channel<T>,
        format: Format,
    ) -> Result<Self> {
        let (internal_format, swizzle) = match format.internal_format {
            Some(v) => (v, None),
            None => resolve::gray_internal_format(ctx.capabilities(), T::DATA_TYPE, false),
        };

        let (w, h) = (channel.width(), channel.height());
        let texture = Texture2d::create(ctx, w, h, &format, internal_format, swizzle)?;

        let respecify = texture.storage(&format)?;
        let dst = Destination::level(texture.target(), 0, channel.size());
        texture.upload_channel(dst, channel, channel.bounds(), respecify)?;

        texture.after_upload()?;
        Ok(texture)
    }

    /// Creates a texture from a lazily decoded image.
    ///
    /// The image is decoded into `Format::intermediate_pbo` when one is set, and into a
    /// heap buffer when it is not, is too small or can not be mapped.
    pub fn from_source(
        ctx: &Context,
        source: &mut dyn ImageSource,
        format: Format,
    ) -> Result<Self> {
        let caps = ctx.capabilities();
        let order = resolve::source_order(source)?;
        let data_type = source.data_type();

        let (internal_format, swizzle) = match format.internal_format {
            Some(v) => (v, None),
            None => resolve::source_internal_format(caps, source)?,
        };

        let size = Vector2::new(source.width(), source.height());
        let texture = Texture2d::create(ctx, size.x, size.y, &format, internal_format, swizzle)?;

        let (client_format, pixel_type) = resolve::source_client_format(caps, order, data_type);
        let respecify = texture.storage(&format)?;
        let image = TexImage::level_2d(texture.target(), 0, internal_format, size.x, size.y)
            .with_pixels(client_format, pixel_type, 1);

        let flip = !texture.is_top_down();
        let required = TextureImageTarget::required_bytes(size, order, data_type);

        let mut staged = false;
        if let Some(ref pbo) = format.intermediate_pbo {
            if pbo.size() >= required {
                let mut result = Ok(());
                let mapped = pbo.map(|bytes| {
                    let bytes = &mut bytes[..required];
                    result = TextureImageTarget::new(bytes, size, order, data_type, flip)
                        .and_then(|mut target| source.load(&mut target));
                })?;

                if mapped {
                    result?;
                    let data = PixelData::Buffer {
                        buffer: pbo.id(),
                        offset: 0,
                    };

                    texture.upload(&image, data, respecify)?;
                    staged = true;
                } else {
                    warn!("Failed to map intermediate PBO {}, decoding into the heap.", pbo.id());
                }
            } else {
                warn!(
                    "Intermediate PBO {} holds {} bytes but {} are required, using the heap.",
                    pbo.id(),
                    pbo.size(),
                    required
                );
            }
        }

        if !staged {
            let mut bytes = vec![0; required];
            {
                let mut target = TextureImageTarget::new(&mut bytes, size, order, data_type, flip)?;
                source.load(&mut target)?;
            }

            texture.upload(&image, PixelData::Host(&bytes), respecify)?;
        }

        texture.after_upload()?;
        Ok(texture)
    }

    /// Creates a texture from a decoded payload, see `replace`.
    pub fn from_data(ctx: &Context, data: &TextureData, format: Format) -> Result<Self> {
        let mut format = format;
        if format.immutable_storage {
            debug!("Texture data is uploaded into mutable storage.");
            format.immutable_storage = false;
        }

        let (w, h) = (data.width(), data.height());
        let internal_format = data.internal_format();
        let swizzle = data.swizzle_mask();
        let mut texture = Texture2d::create(ctx, w, h, &format, internal_format, swizzle)?;

        texture.replace(data)?;
        Ok(texture)
    }

    /// Creates a texture from the contents of a KTX file.
    pub fn from_ktx(ctx: &Context, bytes: &[u8], format: Format) -> Result<Self> {
        let data = containers::ktx::parse(bytes)?;
        Texture2d::from_data(ctx, &data, format)
    }

    /// Creates a texture from the contents of a DDS file.
    pub fn from_dds(ctx: &Context, bytes: &[u8], format: Format) -> Result<Self> {
        let data = containers::dds::parse(bytes)?;
        Texture2d::from_data(ctx, &data, format)
    }

    /// Wraps a texture object created elsewhere. With `do_not_dispose` the object is left
    /// alone when the texture is dropped.
    pub fn from_external(
        ctx: &Context,
        target: GLenum,
        id: TextureId,
        width: u32,
        height: u32,
        do_not_dispose: bool,
    ) -> Self {
        Texture2d {
            base: TextureBase::external(ctx, target, id, do_not_dispose),
            width,
            height,
            clean_width: width,
            clean_height: height,
        }
    }

    /// Returns a handle on the same GL object which does not own it.
    pub(crate) fn alias(&self) -> Self {
        Texture2d {
            base: self.base.alias(),
            width: self.width,
            height: self.height,
            clean_width: self.clean_width,
            clean_height: self.clean_height,
        }
    }

    /// Takes over the state of `alias`, see `TextureBase::adopt_state`.
    pub(crate) fn adopt_state(&mut self, alias: &Texture2d) {
        self.base.adopt_state(&alias.base);
        self.width = alias.width;
        self.height = alias.height;
        self.clean_width = alias.clean_width;
        self.clean_height = alias.clean_height;
    }

    fn create(
        ctx: &Context,
        width: u32,
        height: u32,
        format: &Format,
        internal_format: GLenum,
        default_swizzle: Option<SwizzleMask>,
    ) -> Result<Self> {
        let target = match format.target {
            TextureTarget::Texture2d | TextureTarget::Rectangle => GLenum::from(format.target),
            v => {
                return Err(Error::Unsupported(format!(
                    "{:?} is not a two-dimensional target.",
                    v
                )));
            }
        };

        let max = ctx.capabilities().max_texture_size;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(Error::OutOfBounds);
        }

        let mut base = TextureBase::new(ctx, target)?;
        base.set_internal_format(internal_format);
        base.apply_format(format, default_swizzle, required_mipmap_levels(width, height, 1))?;

        debug!(
            "Texture2d {} created with {}x{} {}.",
            base.id(),
            width,
            height,
            introspect::internal_format_name(internal_format)
        );

        Ok(Texture2d {
            base,
            width,
            height,
            clean_width: width,
            clean_height: height,
        })
    }

    /// Allocates immutable storage if requested and supported. Returns the internal
    /// format level 0 has to be specified with otherwise.
    fn storage(&self, format: &Format) -> Result<Option<GLenum>> {
        let internal_format = self.base.internal_format();
        if !format.immutable_storage {
            return Ok(Some(internal_format));
        }

        if !self.context().capabilities().has_texture_storage() {
            warn!("Immutable texture storage is not available, using mutable storage.");
            return Ok(Some(internal_format));
        }

        let levels = if self.base.has_mipmapping() {
            self.base.max_mipmap_level() + 1
        } else {
            1
        };

        let size = Vector3::new(self.width, self.height, 1);
        self.context()
            .device()
            .allocate_storage(self.target(), self.id(), levels, internal_format, size)?;

        Ok(None)
    }

    fn upload(&self, image: &TexImage, data: PixelData, respecify: Option<GLenum>) -> Result<()> {
        let mut device = self.context().device();
        match respecify {
            Some(_) => device.tex_image(self.id(), image, data),
            None => device.tex_sub_image(self.id(), image, data),
        }
    }

    fn after_upload(&self) -> Result<()> {
        if self.base.has_mipmapping() {
            self.base.regenerate_mipmaps()?;
        }

        Ok(())
    }

    fn level_size(&self, level: u32) -> Vector2<u32> {
        Vector2::new(mip_level_size(self.width, level), mip_level_size(self.height, level))
    }

    fn check_level(&self, attempted: Vector2<u32>, level: u32) -> Result<Vector2<u32>> {
        let expected = self.level_size(level);
        if attempted != expected {
            return Err(Error::ResizeMismatch { attempted, expected });
        }

        Ok(expected)
    }

    /// Replaces a whole mipmap level with `surface`, which must have the size of the level.
    pub fn update_surface<T: Component>(&mut self, surface: &Surface<T>, level: u32) -> Result<()> {
        let size = self.check_level(surface.size(), level)?;
        let dst = Destination::level(self.target(), level, size);
        self.base.upload_surface(dst, surface, surface.bounds(), None)?;

        if level == 0 {
            self.after_upload()?;
        }

        Ok(())
    }

    /// Replaces a whole mipmap level with `channel`, which must have the size of the level.
    pub fn update_channel<T: Component>(&mut self, channel: &Channel<T>, level: u32) -> Result<()> {
        let size = self.check_level(channel.size(), level)?;
        let dst = Destination::level(self.target(), level, size);
        self.base.upload_channel(dst, channel, channel.bounds(), None)?;

        if level == 0 {
            self.after_upload()?;
        }

        Ok(())
    }

    /// Replaces a region of a mipmap level with `area` of `surface`. `offset` is the
    /// top-left corner of the region inside the level.
    pub fn update_surface_region<T: Component>(
        &mut self,
        surface: &Surface<T>,
        area: Area,
        offset: Vector2<u32>,
        level: u32,
    ) -> Result<()> {
        let dst = Destination::level(self.target(), level, self.level_size(level));
        let dst = dst.with_offset(offset);
        self.base.upload_surface(dst, surface, area, None)?;

        if level == 0 {
            self.after_upload()?;
        }

        Ok(())
    }

    /// Replaces a whole mipmap level with pixels stored in `pbo` at `offset`.
    pub fn update_from_buffer(
        &mut self,
        pbo: &PixelBuffer,
        offset: usize,
        data_format: GLenum,
        data_type: GLenum,
        level: u32,
    ) -> Result<()> {
        let size = self.level_size(level);
        let pixel_bytes = introspect::client_pixel_bytes(data_format, data_type).ok_or_else(|| {
            Error::Unsupported(format!("Unknown client format {:#x}.", data_format))
        })?;

        let len = size.x as usize * size.y as usize * pixel_bytes;
        if offset.checked_add(len).map_or(true, |end| end > pbo.size()) {
            return Err(Error::OutOfBounds);
        }

        let image = TexImage::level_2d(self.target(), level, self.internal_format(), size.x, size.y)
            .with_pixels(data_format, data_type, 1);

        let data = PixelData::Buffer {
            buffer: pbo.id(),
            offset,
        };

        self.upload(&image, data, None)?;
        if level == 0 {
            self.after_upload()?;
        }

        Ok(())
    }

    /// Re-specifies the texture with every level of `data`. The texture takes the size
    /// and internal format of the payload.
    pub fn replace(&mut self, data: &TextureData) -> Result<()> {
        self.upload_data(data, true)?;

        self.width = data.width();
        self.height = data.height();
        self.clean_width = data.width();
        self.clean_height = data.height();
        self.base.set_internal_format(data.internal_format());

        if let Some(mask) = data.swizzle_mask() {
            self.base.set_swizzle_mask(mask)?;
        }

        self.after_data(data)
    }

    /// Replaces the contents of every level of `data`, which must have the size of the
    /// texture.
    pub fn update_data(&mut self, data: &TextureData) -> Result<()> {
        let attempted = Vector2::new(data.width(), data.height());
        self.check_level(attempted, 0)?;
        self.upload_data(data, false)?;
        self.after_data(data)
    }

    fn upload_data(&self, data: &TextureData, respecify: bool) -> Result<()> {
        if data.levels().is_empty() {
            return Err(Error::TextureData("payload has no levels".into()));
        }

        let mut device = self.context().device();
        let (id, internal_format) = (self.id(), data.internal_format());

        for (i, level) in data.levels().iter().enumerate() {
            let (w, h) = (level.width, level.height);
            let image = TexImage::level_2d(self.target(), i as u32, internal_format, w, h)
                .with_pixels(data.data_format(), data.data_type(), data.unpack_alignment());

            let pixels = data.level_data(i)?;
            match (data.is_compressed(), respecify) {
                (true, true) => device.compressed_tex_image(id, &image, pixels, level.size)?,
                (true, false) => device.compressed_tex_sub_image(id, &image, pixels, level.size)?,
                (false, true) => device.tex_image(id, &image, pixels)?,
                (false, false) => device.tex_sub_image(id, &image, pixels)?,
            }
        }

        Ok(())
    }

    fn after_data(&mut self, data: &TextureData) -> Result<()> {
        let levels = data.levels().len() as u32;
        if levels > 1 {
            self.base.set_max_mipmap_level(levels - 1)?;
        } else if !data.is_compressed() {
            self.after_upload()?;
        }

        Ok(())
    }

    /// Returns the texture coordinates of a pixel area: normalized over the allocated
    /// size, or in pixels for rectangle textures. The rows of bottom-up textures are
    /// flipped, so the coordinates of the visual top of `area` come first.
    pub fn area_tex_coords(&self, area: Area) -> Rect {
        let (w, h) = (self.width as f32, self.height as f32);
        let rectangle = self.target() == gl::TEXTURE_RECTANGLE;

        let mut coords = if rectangle {
            Rect::new(
                area.min.x as f32,
                area.min.y as f32,
                area.max.x as f32,
                area.max.y as f32,
            )
        } else {
            Rect::new(
                area.min.x as f32 / w,
                area.min.y as f32 / h,
                area.max.x as f32 / w,
                area.max.y as f32 / h,
            )
        };

        if !self.is_top_down() {
            let top = if rectangle { h } else { 1.0 };
            coords.y1 = top - coords.y1;
            coords.y2 = top - coords.y2;
        }

        coords
    }

    /// Sets the size of the part of the texture which holds meaningful content.
    pub fn set_clean_size(&mut self, width: u32, height: u32) {
        self.clean_width = width.min(self.width);
        self.clean_height = height.min(self.height);
    }

    #[inline]
    pub fn clean_width(&self) -> u32 {
        self.clean_width
    }

    #[inline]
    pub fn clean_height(&self) -> u32 {
        self.clean_height
    }

    #[inline]
    pub fn clean_bounds(&self) -> Area {
        Area::new(
            Point2::new(0, 0),
            Point2::new(self.clean_width as i32, self.clean_height as i32),
        )
    }

    /// Returns the horizontal texture coordinate of the right edge of the clean area.
    pub fn max_u(&self) -> f32 {
        if self.target() == gl::TEXTURE_RECTANGLE {
            self.clean_width as f32
        } else {
            self.clean_width as f32 / self.width as f32
        }
    }

    /// Returns the vertical texture coordinate of the bottom edge of the clean area.
    pub fn max_v(&self) -> f32 {
        if self.target() == gl::TEXTURE_RECTANGLE {
            self.clean_height as f32
        } else {
            self.clean_height as f32 / self.height as f32
        }
    }

    /// Reads level 0 back into client memory.
    pub fn create_source(&self) -> Result<TextureImageSource> {
        target::read_back(&self.base, self.target(), 0, self.size())
    }
}

impl Texture for Texture2d {
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
}

impl Deref for Texture2d {
    type Target = TextureBase;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl DerefMut for Texture2d {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.base
    }
}
