//! Cube map textures, assembled from six faces or from one packed image.

use std::ops::{Deref, DerefMut};

use gl::types::*;

use crate::backends::{PixelData, TexImage};
use crate::context::Context;
use crate::errors::*;
use crate::image::{Component, DataType, Surface};
use crate::math::{Area, Vector2, Vector3};

use super::base::{mip_level_size, required_mipmap_levels, Destination, Texture, TextureBase};
use super::format::{Format, SwizzleMask};
use super::introspect;
use super::resolve;
use super::target::{self, TextureImageSource};

/// The image targets of the faces, in face order.
pub const FACE_TARGETS: [GLenum; 6] = [
    gl::TEXTURE_CUBE_MAP_POSITIVE_X,
    gl::TEXTURE_CUBE_MAP_NEGATIVE_X,
    gl::TEXTURE_CUBE_MAP_POSITIVE_Y,
    gl::TEXTURE_CUBE_MAP_NEGATIVE_Y,
    gl::TEXTURE_CUBE_MAP_POSITIVE_Z,
    gl::TEXTURE_CUBE_MAP_NEGATIVE_Z,
];

/// How six faces are packed into one image.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CubeLayout {
    /// Six faces side by side.
    HorizontalStrip,
    /// Six faces on top of each other.
    VerticalStrip,
    /// A 4x3 grid, `+Y` above and `-Y` below the `-X +Z +X -Z` row.
    HorizontalCross,
    /// A 3x4 grid, `-Z` at the bottom and upside down.
    VerticalCross,
}

impl CubeLayout {
    /// Infers the layout of a packed image from its aspect ratio.
    pub fn infer(width: u32, height: u32) -> Self {
        let aspect = width.min(height) as f32 / width.max(height).max(1) as f32;
        let horizontal = width > height;

        if (aspect - 1.0 / 6.0).abs() < (aspect - 3.0 / 4.0).abs() {
            if horizontal {
                CubeLayout::HorizontalStrip
            } else {
                CubeLayout::VerticalStrip
            }
        } else if horizontal {
            CubeLayout::HorizontalCross
        } else {
            CubeLayout::VerticalCross
        }
    }

    /// Returns the size of a face of a packed image.
    pub fn face_size(self, width: u32, height: u32) -> u32 {
        match self {
            CubeLayout::HorizontalStrip | CubeLayout::VerticalStrip => width.min(height),
            CubeLayout::HorizontalCross => width / 4,
            CubeLayout::VerticalCross => width / 3,
        }
    }

    /// Returns the grid cell of every face, and whether it is stored upside down.
    pub fn face_cells(self) -> [(u32, u32, bool); 6] {
        match self {
            CubeLayout::HorizontalStrip => [
                (0, 0, false),
                (1, 0, false),
                (2, 0, false),
                (3, 0, false),
                (4, 0, false),
                (5, 0, false),
            ],
            CubeLayout::VerticalStrip => [
                (0, 0, false),
                (0, 1, false),
                (0, 2, false),
                (0, 3, false),
                (0, 4, false),
                (0, 5, false),
            ],
            CubeLayout::HorizontalCross => [
                (2, 1, false),
                (0, 1, false),
                (1, 0, false),
                (1, 2, false),
                (1, 1, false),
                (3, 1, false),
            ],
            CubeLayout::VerticalCross => [
                (2, 1, false),
                (0, 1, false),
                (1, 0, false),
                (1, 2, false),
                (1, 1, false),
                (1, 3, true),
            ],
        }
    }

    /// Returns the area of every face of a packed image.
    pub fn face_areas(self, width: u32, height: u32) -> [(Area, bool); 6] {
        let size = self.face_size(width, height) as i32;
        let mut areas = [(Area::zero(), false); 6];
        for (dst, &(x, y, rotated)) in areas.iter_mut().zip(self.face_cells().iter()) {
            *dst = (Area::with_size(x as i32 * size, y as i32 * size, size, size), rotated);
        }

        areas
    }
}

/// A cube map. Faces are square and, following the cube map convention, stored with
/// their first row at the visual top.
#[derive(Debug)]
pub struct TextureCubeMap {
    base: TextureBase,
    size: u32,
}

impl TextureCubeMap {
    /// Creates a cube map with uninitialized faces of `width` by `height`.
    pub fn new(ctx: &Context, width: u32, height: u32, format: Format) -> Result<Self> {
        let internal_format = format.internal_format.unwrap_or_else(|| {
            resolve::color_internal_format(ctx.capabilities(), DataType::U8, true)
        });

        let texture = TextureCubeMap::create(ctx, width, height, &format, internal_format, None)?;
        if let Some(internal_format) = texture.storage(&format)? {
            let info = introspect::internal_format_info(internal_format);
            let mut device = texture.context().device();
            for &face in &FACE_TARGETS {
                let image = TexImage::level_2d(face, 0, internal_format, width, height)
                    .with_pixels(info.data_format, info.data_type, 1);
                device.tex_image(texture.id(), &image, PixelData::None)?;
            }
        }

        Ok(texture)
    }

    /// Creates a cube map from six faces in face order: `+X -X +Y -Y +Z -Z`.
    pub fn from_faces<T: Component>(
        ctx: &Context,
        faces: &[Surface<T>; 6],
        format: Format,
    ) -> Result<Self> {
        let expected = faces[0].size();
        for face in faces.iter() {
            if face.size() != expected {
                return Err(Error::ResizeMismatch {
                    attempted: face.size(),
                    expected,
                });
            }
        }

        let internal_format = format.internal_format.unwrap_or_else(|| {
            resolve::color_internal_format(ctx.capabilities(), T::DATA_TYPE, faces[0].has_alpha())
        });

        let (w, h) = (expected.x, expected.y);
        let texture = TextureCubeMap::create(ctx, w, h, &format, internal_format, None)?;
        let respecify = texture.storage(&format)?;

        for (face, surface) in FACE_TARGETS.iter().zip(faces.iter()) {
            let dst = Destination::level(*face, 0, expected);
            texture.upload_surface(dst, surface, surface.bounds(), respecify)?;
        }

        texture.after_upload()?;
        Ok(texture)
    }

    /// Creates a cube map from an image with six packed faces, see `CubeLayout::infer`.
    pub fn from_surface<T: Component>(
        ctx: &Context,
        surface: &Surface<T>,
        format: Format,
    ) -> Result<Self> {
        let layout = CubeLayout::infer(surface.width(), surface.height());
        let size = layout.face_size(surface.width(), surface.height());
        debug!("Cube map image of {:?} inferred as {:?}.", surface.size(), layout);

        let internal_format = format.internal_format.unwrap_or_else(|| {
            resolve::color_internal_format(ctx.capabilities(), T::DATA_TYPE, surface.has_alpha())
        });

        let texture = TextureCubeMap::create(ctx, size, size, &format, internal_format, None)?;
        let respecify = texture.storage(&format)?;

        let areas = layout.face_areas(surface.width(), surface.height());
        for (face, &(area, rotated)) in FACE_TARGETS.iter().zip(areas.iter()) {
            let dst = Destination::level(*face, 0, Vector2::new(size, size));
            if rotated {
                let copy = surface
                    .converted(area, surface.channel_order(), false)?
                    .rotated_180();
                texture.upload_surface(dst, &copy, copy.bounds(), respecify)?;
            } else {
                texture.upload_surface(dst, surface, area, respecify)?;
            }
        }

        texture.after_upload()?;
        Ok(texture)
    }

    fn create(
        ctx: &Context,
        width: u32,
        height: u32,
        format: &Format,
        internal_format: GLenum,
        default_swizzle: Option<SwizzleMask>,
    ) -> Result<Self> {
        if width != height {
            return Err(Error::Unsupported(format!(
                "Cube map faces must be square, got {}x{}.",
                width, height
            )));
        }

        let max = ctx.capabilities().max_texture_size;
        if width == 0 || width > max {
            return Err(Error::OutOfBounds);
        }

        let mut base = TextureBase::new(ctx, gl::TEXTURE_CUBE_MAP)?;
        base.set_internal_format(internal_format);
        base.apply_format(format, default_swizzle, required_mipmap_levels(width, width, 1))?;
        base.set_top_down(true);

        debug!(
            "TextureCubeMap {} created with faces of {}x{} {}.",
            base.id(),
            width,
            width,
            introspect::internal_format_name(internal_format)
        );

        Ok(TextureCubeMap { base, size: width })
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

        let size = Vector3::new(self.size, self.size, 1);
        self.context().device().allocate_storage(
            gl::TEXTURE_CUBE_MAP,
            self.id(),
            levels,
            internal_format,
            size,
        )?;

        Ok(None)
    }

    fn after_upload(&self) -> Result<()> {
        if self.base.has_mipmapping() {
            self.base.regenerate_mipmaps()?;
        }

        Ok(())
    }

    /// Replaces a mipmap level of a face with `surface`, which must have the size of the
    /// level.
    pub fn update_face<T: Component>(
        &mut self,
        face: usize,
        surface: &Surface<T>,
        level: u32,
    ) -> Result<()> {
        let target = *FACE_TARGETS.get(face).ok_or(Error::OutOfBounds)?;
        let expected = Vector2::new(
            mip_level_size(self.size, level),
            mip_level_size(self.size, level),
        );

        if surface.size() != expected {
            return Err(Error::ResizeMismatch {
                attempted: surface.size(),
                expected,
            });
        }

        let dst = Destination::level(target, level, expected);
        self.base.upload_surface(dst, surface, surface.bounds(), None)?;

        if level == 0 {
            self.after_upload()?;
        }

        Ok(())
    }

    /// Reads level 0 of a face back into client memory.
    pub fn create_face_source(&self, face: usize) -> Result<TextureImageSource> {
        let target = *FACE_TARGETS.get(face).ok_or(Error::OutOfBounds)?;
        target::read_back(&self.base, target, 0, self.size())
    }
}

impl Texture for TextureCubeMap {
    #[inline]
    fn base(&self) -> &TextureBase {
        &self.base
    }

    #[inline]
    fn width(&self) -> u32 {
        self.size
    }

    #[inline]
    fn height(&self) -> u32 {
        self.size
    }
}

impl Deref for TextureCubeMap {
    type Target = TextureBase;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl DerefMut for TextureCubeMap {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts() {
        assert_eq!(CubeLayout::infer(600, 100), CubeLayout::HorizontalStrip);
        assert_eq!(CubeLayout::infer(100, 600), CubeLayout::VerticalStrip);
        assert_eq!(CubeLayout::infer(400, 300), CubeLayout::HorizontalCross);
        assert_eq!(CubeLayout::infer(300, 400), CubeLayout::VerticalCross);
        assert_eq!(CubeLayout::infer(100, 100), CubeLayout::VerticalCross);

        assert_eq!(CubeLayout::HorizontalCross.face_size(400, 300), 100);
        assert_eq!(CubeLayout::VerticalCross.face_size(300, 400), 100);
        assert_eq!(CubeLayout::VerticalStrip.face_size(100, 600), 100);
    }

    #[test]
    fn areas() {
        let areas = CubeLayout::HorizontalCross.face_areas(40, 30);
        assert_eq!(areas[0].0, Area::with_size(20, 10, 10, 10));
        assert_eq!(areas[2].0, Area::with_size(10, 0, 10, 10));
        assert_eq!(areas[5].0, Area::with_size(30, 10, 10, 10));

        let areas = CubeLayout::VerticalCross.face_areas(30, 40);
        assert_eq!(areas[5], (Area::with_size(10, 30, 10, 10), true));
        assert!(!areas[4].1);

        let areas = CubeLayout::VerticalStrip.face_areas(10, 60);
        assert_eq!(areas[3].0, Area::with_size(0, 30, 10, 10));
    }
}
