//! The identity and sampling state every texture kind shares.

use std::cell::Cell;

use gl::types::*;

use crate::backends::{ParameterValue, PixelData, TexImage, TextureId};
use crate::context::Context;
use crate::errors::*;
use crate::image::{Channel, Component, Surface};
use crate::math::{Area, Point2, Vector2};

use super::format::*;
use super::introspect;
use super::resolve;

/// Returns the number of levels of a full mipmap chain.
#[inline]
pub fn required_mipmap_levels(width: u32, height: u32, depth: u32) -> u32 {
    let max = width.max(height).max(depth).max(1);
    32 - max.leading_zeros()
}

/// Returns the size of a dimension at mipmap `level`.
#[inline]
pub fn mip_level_size(dim: u32, level: u32) -> u32 {
    if level >= 32 {
        1
    } else {
        (dim >> level).max(1)
    }
}

/// Operations every texture kind provides on top of `TextureBase`.
pub trait Texture {
    fn base(&self) -> &TextureBase;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn depth(&self) -> u32 {
        1
    }

    #[inline]
    fn size(&self) -> Vector2<u32> {
        Vector2::new(self.width(), self.height())
    }

    #[inline]
    fn bounds(&self) -> Area {
        Area::new(
            Point2::new(0, 0),
            Point2::new(self.width() as i32, self.height() as i32),
        )
    }

    #[inline]
    fn aspect_ratio(&self) -> f32 {
        self.width() as f32 / self.height().max(1) as f32
    }
}

/// A GPU texture object with its sampling parameters.
///
/// The object is deleted when the `TextureBase` is dropped, unless it was wrapped with
/// `do_not_dispose`. Parameter setters take effect immediately and only reach the device
/// when the value actually changes; the initial state mirrors the GL defaults.
#[derive(Debug)]
pub struct TextureBase {
    ctx: Context,
    id: TextureId,
    target: GLenum,
    internal_format: Cell<Option<GLenum>>,
    do_not_dispose: bool,
    top_down: bool,
    mipmapping: bool,
    base_mipmap_level: u32,
    max_mipmap_level: u32,
    wrap: [TextureWrap; 3],
    min_filter: TextureFilter,
    mag_filter: TextureFilter,
    max_anisotropy: f32,
    compare_mode: CompareMode,
    compare_func: CompareFunc,
    swizzle_mask: SwizzleMask,
    border_color: [f32; 4],
    label: Option<String>,
}

impl TextureBase {
    /// Generates a new texture object of `target`.
    pub(crate) fn new(ctx: &Context, target: GLenum) -> Result<Self> {
        let id = ctx.device().create_texture(target)?;
        Ok(TextureBase::external(ctx, target, id, false))
    }

    /// Wraps an existing texture object, assuming its parameters are the GL defaults.
    pub(crate) fn external(
        ctx: &Context,
        target: GLenum,
        id: TextureId,
        do_not_dispose: bool,
    ) -> Self {
        let rectangle = target == gl::TEXTURE_RECTANGLE;
        let (wrap, min_filter) = if rectangle {
            (TextureWrap::ClampToEdge, TextureFilter::Linear)
        } else {
            (TextureWrap::Repeat, TextureFilter::NearestMipmapLinear)
        };

        TextureBase {
            ctx: ctx.clone(),
            id,
            target,
            internal_format: Cell::new(None),
            do_not_dispose,
            top_down: false,
            mipmapping: false,
            base_mipmap_level: 0,
            max_mipmap_level: 1000,
            wrap: [wrap; 3],
            min_filter,
            mag_filter: TextureFilter::Linear,
            max_anisotropy: 1.0,
            compare_mode: CompareMode::None,
            compare_func: CompareFunc::LessEqual,
            swizzle_mask: SWIZZLE_IDENTITY,
            border_color: [0.0; 4],
            label: None,
        }
    }

    /// Returns a copy of this texture which does not own the GL object.
    pub(crate) fn alias(&self) -> Self {
        let mut alias = TextureBase::external(&self.ctx, self.target, self.id, true);
        alias.adopt_state(self);
        alias
    }

    /// Takes over the cached state of `alias`, a handle on the same GL object which
    /// might have changed it.
    pub(crate) fn adopt_state(&mut self, alias: &TextureBase) {
        debug_assert_eq!(self.id, alias.id);

        self.internal_format.set(alias.internal_format.get());
        self.top_down = alias.top_down;
        self.mipmapping = alias.mipmapping;
        self.base_mipmap_level = alias.base_mipmap_level;
        self.max_mipmap_level = alias.max_mipmap_level;
        self.wrap = alias.wrap;
        self.min_filter = alias.min_filter;
        self.mag_filter = alias.mag_filter;
        self.max_anisotropy = alias.max_anisotropy;
        self.compare_mode = alias.compare_mode;
        self.compare_func = alias.compare_func;
        self.swizzle_mask = alias.swizzle_mask;
        self.border_color = alias.border_color;
        self.label = alias.label.clone();
    }

    /// Applies the sampling state of `format` to a texture with a chain of `levels` mipmaps.
    pub(crate) fn apply_format(
        &mut self,
        format: &Format,
        default_swizzle: Option<SwizzleMask>,
        levels: u32,
    ) -> Result<()> {
        self.top_down = format.load_top_down;

        self.set_wrap_s(format.wrap_s)?;
        self.set_wrap_t(format.wrap_t)?;
        if self.target == gl::TEXTURE_3D || self.target == gl::TEXTURE_CUBE_MAP {
            self.set_wrap_r(format.wrap_r)?;
        }

        let rectangle = self.target == gl::TEXTURE_RECTANGLE;
        let min_filter = format.resolved_min_filter();
        if rectangle && min_filter.is_mipmap() {
            warn!("Rectangle textures have no mipmaps, ignoring {:?}.", min_filter);
            self.set_min_filter(TextureFilter::Linear)?;
        } else {
            self.set_min_filter(min_filter)?;
        }

        self.set_mag_filter(format.mag_filter)?;

        if format.mipmapping && !rectangle {
            self.mipmapping = true;
            let max = format
                .max_mipmap_level
                .unwrap_or(levels - 1)
                .min(levels - 1);

            self.set_base_mipmap_level(format.base_mipmap_level.min(max))?;
            self.set_max_mipmap_level(max)?;
        }

        if let Some(anisotropy) = format.max_anisotropy {
            self.set_max_anisotropy(anisotropy)?;
        }

        if let Some(mask) = format.swizzle_mask.or(default_swizzle) {
            self.set_swizzle_mask(mask)?;
        }

        if let Some(color) = format.border_color {
            self.set_border_color(color)?;
        }

        if let Some(mode) = format.compare_mode {
            self.set_compare_mode(mode)?;
        }

        if let Some(func) = format.compare_func {
            self.set_compare_func(func)?;
        }

        if let Some(ref label) = format.label {
            self.set_label(label.as_str())?;
        }

        Ok(())
    }

    #[inline]
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    #[inline]
    pub fn id(&self) -> TextureId {
        self.id
    }

    #[inline]
    pub fn target(&self) -> GLenum {
        self.target
    }

    /// Returns true if the texture does not own its GL object.
    #[inline]
    pub fn do_not_dispose(&self) -> bool {
        self.do_not_dispose
    }

    /// Binds the texture to texture unit `unit`.
    pub fn bind(&self, unit: u32) -> Result<()> {
        self.ctx.device().bind_texture(unit, self.target, self.id)
    }

    /// Unbinds whatever texture of this target is bound to `unit`.
    pub fn unbind(&self, unit: u32) -> Result<()> {
        self.ctx.device().bind_texture(unit, self.target, 0)
    }

    /// Returns the internal format, querying the device the first time it is needed.
    pub fn internal_format(&self) -> GLenum {
        if let Some(v) = self.internal_format.get() {
            return v;
        }

        match self.ctx.device().internal_format(self.target, self.id, 0) {
            Ok(v) => {
                self.internal_format.set(Some(v));
                v
            }
            Err(err) => {
                warn!(
                    "Failed to query internal format of texture {}, assuming GL_RGBA. {}",
                    self.id, err
                );
                gl::RGBA
            }
        }
    }

    #[inline]
    pub(crate) fn set_internal_format(&self, internal_format: GLenum) {
        self.internal_format.set(Some(internal_format));
    }

    #[inline]
    pub fn has_alpha(&self) -> bool {
        introspect::internal_format_info(self.internal_format()).has_alpha
    }

    #[inline]
    pub fn is_compressed(&self) -> bool {
        introspect::internal_format_info(self.internal_format()).compressed
    }

    #[inline]
    pub fn is_srgb(&self) -> bool {
        introspect::internal_format_info(self.internal_format()).srgb
    }

    /// Returns true if the first row of the texture is the visual top of the image.
    #[inline]
    pub fn is_top_down(&self) -> bool {
        self.top_down
    }

    #[inline]
    pub fn set_top_down(&mut self, top_down: bool) {
        self.top_down = top_down;
    }

    #[inline]
    pub fn has_mipmapping(&self) -> bool {
        self.mipmapping
    }

    #[inline]
    pub fn base_mipmap_level(&self) -> u32 {
        self.base_mipmap_level
    }

    #[inline]
    pub fn max_mipmap_level(&self) -> u32 {
        self.max_mipmap_level
    }

    #[inline]
    pub fn wrap_s(&self) -> TextureWrap {
        self.wrap[0]
    }

    #[inline]
    pub fn wrap_t(&self) -> TextureWrap {
        self.wrap[1]
    }

    #[inline]
    pub fn wrap_r(&self) -> TextureWrap {
        self.wrap[2]
    }

    #[inline]
    pub fn min_filter(&self) -> TextureFilter {
        self.min_filter
    }

    #[inline]
    pub fn mag_filter(&self) -> TextureFilter {
        self.mag_filter
    }

    #[inline]
    pub fn max_anisotropy(&self) -> f32 {
        self.max_anisotropy
    }

    #[inline]
    pub fn compare_mode(&self) -> CompareMode {
        self.compare_mode
    }

    #[inline]
    pub fn compare_func(&self) -> CompareFunc {
        self.compare_func
    }

    #[inline]
    pub fn swizzle_mask(&self) -> SwizzleMask {
        self.swizzle_mask
    }

    #[inline]
    pub fn border_color(&self) -> [f32; 4] {
        self.border_color
    }

    #[inline]
    pub fn label(&self) -> Option<&str> {
        self.label.as_ref().map(|v| v.as_str())
    }

    fn parameter(&self, pname: GLenum, value: ParameterValue) -> Result<()> {
        self.ctx
            .device()
            .set_parameter(self.target, self.id, pname, value)
    }

    #[inline]
    fn enum_parameter<T: Into<GLenum>>(&self, pname: GLenum, value: T) -> Result<()> {
        self.parameter(pname, ParameterValue::Int(value.into() as GLint))
    }

    /// Sets the wrap mode of the s and t coordinates.
    pub fn set_wrap(&mut self, s: TextureWrap, t: TextureWrap) -> Result<()> {
        self.set_wrap_s(s)?;
        self.set_wrap_t(t)
    }

    pub fn set_wrap_s(&mut self, wrap: TextureWrap) -> Result<()> {
        if self.wrap[0] != wrap {
            self.enum_parameter(gl::TEXTURE_WRAP_S, wrap)?;
            self.wrap[0] = wrap;
        }

        Ok(())
    }

    pub fn set_wrap_t(&mut self, wrap: TextureWrap) -> Result<()> {
        if self.wrap[1] != wrap {
            self.enum_parameter(gl::TEXTURE_WRAP_T, wrap)?;
            self.wrap[1] = wrap;
        }

        Ok(())
    }

    pub fn set_wrap_r(&mut self, wrap: TextureWrap) -> Result<()> {
        if self.wrap[2] != wrap {
            self.enum_parameter(gl::TEXTURE_WRAP_R, wrap)?;
            self.wrap[2] = wrap;
        }

        Ok(())
    }

    pub fn set_min_filter(&mut self, filter: TextureFilter) -> Result<()> {
        if self.min_filter != filter {
            self.enum_parameter(gl::TEXTURE_MIN_FILTER, filter)?;
            self.min_filter = filter;
        }

        Ok(())
    }

    pub fn set_mag_filter(&mut self, filter: TextureFilter) -> Result<()> {
        if filter.is_mipmap() {
            return Err(Error::Unsupported(format!(
                "{:?} is not a magnification filter.",
                filter
            )));
        }

        if self.mag_filter != filter {
            self.enum_parameter(gl::TEXTURE_MAG_FILTER, filter)?;
            self.mag_filter = filter;
        }

        Ok(())
    }

    /// Sets the degree of anisotropic filtering, clamped to what the context supports.
    /// Returns the degree which has been applied.
    pub fn set_max_anisotropy(&mut self, anisotropy: f32) -> Result<f32> {
        let caps = self.ctx.capabilities();
        if !caps.has_anisotropic_filter() {
            warn!("Anisotropic filtering is not available, ignoring {}.", anisotropy);
            return Ok(self.max_anisotropy);
        }

        let anisotropy = anisotropy.max(1.0).min(caps.max_anisotropy);
        if (self.max_anisotropy - anisotropy).abs() > ::std::f32::EPSILON {
            self.parameter(
                crate::backends::ext::TEXTURE_MAX_ANISOTROPY,
                ParameterValue::Float(anisotropy),
            )?;
            self.max_anisotropy = anisotropy;
        }

        Ok(anisotropy)
    }

    pub fn set_compare_mode(&mut self, mode: CompareMode) -> Result<()> {
        if self.compare_mode != mode {
            self.enum_parameter(gl::TEXTURE_COMPARE_MODE, mode)?;
            self.compare_mode = mode;
        }

        Ok(())
    }

    pub fn set_compare_func(&mut self, func: CompareFunc) -> Result<()> {
        if self.compare_func != func {
            self.enum_parameter(gl::TEXTURE_COMPARE_FUNC, func)?;
            self.compare_func = func;
        }

        Ok(())
    }

    pub fn set_swizzle_mask(&mut self, mask: SwizzleMask) -> Result<()> {
        if self.swizzle_mask == mask {
            return Ok(());
        }

        if !self.ctx.capabilities().has_texture_swizzle() {
            warn!("Texture swizzle is not available, ignoring {:?}.", mask);
            return Ok(());
        }

        let mut v = [0; 4];
        for (dst, src) in v.iter_mut().zip(mask.iter()) {
            *dst = GLenum::from(*src) as GLint;
        }

        self.parameter(gl::TEXTURE_SWIZZLE_RGBA, ParameterValue::Ints(v))?;
        self.swizzle_mask = mask;
        Ok(())
    }

    pub fn set_border_color(&mut self, color: [f32; 4]) -> Result<()> {
        if self.border_color != color {
            self.parameter(gl::TEXTURE_BORDER_COLOR, ParameterValue::Floats(color))?;
            self.border_color = color;
        }

        Ok(())
    }

    pub fn set_base_mipmap_level(&mut self, level: u32) -> Result<()> {
        if self.base_mipmap_level != level {
            self.parameter(gl::TEXTURE_BASE_LEVEL, ParameterValue::Int(level as GLint))?;
            self.base_mipmap_level = level;
        }

        Ok(())
    }

    pub fn set_max_mipmap_level(&mut self, level: u32) -> Result<()> {
        if self.max_mipmap_level != level {
            self.parameter(gl::TEXTURE_MAX_LEVEL, ParameterValue::Int(level as GLint))?;
            self.max_mipmap_level = level;
        }

        Ok(())
    }

    /// Attaches a debug label, if the context supports them.
    pub fn set_label<T: Into<String>>(&mut self, label: T) -> Result<()> {
        let label = label.into();
        self.ctx.device().set_label(self.target, self.id, &label)?;
        self.label = Some(label);
        Ok(())
    }

    /// Regenerates every mipmap level from the base level.
    pub fn regenerate_mipmaps(&self) -> Result<()> {
        if self.target == gl::TEXTURE_RECTANGLE {
            return Err(Error::Unsupported(
                "Rectangle textures have no mipmaps.".into(),
            ));
        }

        self.ctx.device().generate_mipmap(self.target, self.id)
    }

    /// Uploads `area` of `surface` into the image described by `dst`. With `respecify`
    /// the whole image is (re)allocated in that internal format.
    pub(crate) fn upload_surface<T: Component>(
        &self,
        dst: Destination,
        surface: &Surface<T>,
        area: Area,
        respecify: Option<GLenum>,
    ) -> Result<()> {
        dst.check(area, surface.bounds())?;

        let row = surface.width() as usize * surface.channel_order().channels();
        let tight = area == surface.bounds() && surface.row_stride() == row;

        let plan = resolve::plan_surface_upload(
            surface.channel_order(),
            T::DATA_TYPE,
            tight,
            !self.top_down,
        )?;

        let copy;
        let bytes = match plan.intermediate {
            Some(order) => {
                copy = surface.converted(area, order, plan.flip)?;
                copy.as_bytes()
            }
            None => surface.as_bytes(),
        };

        let size = Vector2::new(area.width() as u32, area.height() as u32);
        self.upload_pixels(dst, size, (plan.format, plan.pixel_type), bytes, respecify)
    }

    /// Uploads `area` of `channel` into the image described by `dst`, see `upload_surface`.
    pub(crate) fn upload_channel<T: Component>(
        &self,
        dst: Destination,
        channel: &Channel<T>,
        area: Area,
        respecify: Option<GLenum>,
    ) -> Result<()> {
        dst.check(area, channel.bounds())?;

        let client = resolve::gray_client_format(self.ctx.capabilities(), T::DATA_TYPE, false);
        let tight = area == channel.bounds() && channel.row_stride() == channel.width() as usize;

        let copy;
        let bytes = if tight && self.top_down {
            channel.as_bytes()
        } else {
            copy = channel.converted(area, !self.top_down)?;
            copy.as_bytes()
        };

        let size = Vector2::new(area.width() as u32, area.height() as u32);
        self.upload_pixels(dst, size, client, bytes, respecify)
    }

    fn upload_pixels(
        &self,
        dst: Destination,
        size: Vector2<u32>,
        client: (GLenum, GLenum),
        bytes: &[u8],
        respecify: Option<GLenum>,
    ) -> Result<()> {
        let mut device = self.ctx.device();
        match respecify {
            Some(internal_format) => {
                let image =
                    TexImage::level_2d(dst.target, dst.level, internal_format, size.x, size.y)
                        .with_pixels(client.0, client.1, 1);

                device.tex_image(self.id, &image, PixelData::Host(bytes))
            }
            None => {
                // Offsets are given from the visual top of the image.
                let y = if self.top_down {
                    dst.offset.y
                } else {
                    dst.level_size.y - dst.offset.y - size.y
                };

                let internal_format = self.internal_format.get().unwrap_or(0);
                let image =
                    TexImage::level_2d(dst.target, dst.level, internal_format, size.x, size.y)
                        .with_offset(dst.offset.x, y, 0)
                        .with_pixels(client.0, client.1, 1);

                device.tex_sub_image(self.id, &image, PixelData::Host(bytes))
            }
        }
    }
}

/// The two-dimensional image (a face and a level) a region of pixels is uploaded to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Destination {
    pub target: GLenum,
    pub level: u32,
    pub level_size: Vector2<u32>,
    /// The top-left corner of the region, from the visual top of the image.
    pub offset: Vector2<u32>,
}

impl Destination {
    /// Describes a whole level.
    pub fn level(target: GLenum, level: u32, level_size: Vector2<u32>) -> Self {
        Destination {
            target,
            level,
            level_size,
            offset: Vector2::new(0, 0),
        }
    }

    #[inline]
    pub fn with_offset(mut self, offset: Vector2<u32>) -> Self {
        self.offset = offset;
        self
    }

    /// Checks that `area` lies inside `bounds` and fits into the level at `offset`.
    fn check(&self, area: Area, bounds: Area) -> Result<()> {
        if area.min.x < 0 || area.min.y < 0 || !bounds.contains(&area) {
            return Err(Error::OutOfBounds);
        }

        let fits = |offset: u32, len: i32, size: u32| {
            offset
                .checked_add(len as u32)
                .map_or(false, |end| end <= size)
        };

        if !fits(self.offset.x, area.width(), self.level_size.x)
            || !fits(self.offset.y, area.height(), self.level_size.y)
        {
            return Err(Error::OutOfBounds);
        }

        Ok(())
    }
}

impl Drop for TextureBase {
    fn drop(&mut self) {
        if self.do_not_dispose {
            return;
        }

        if let Err(err) = self.ctx.device().delete_texture(self.id) {
            error!("Failed to delete texture {}. {}", self.id, err);
        }
    }
}
