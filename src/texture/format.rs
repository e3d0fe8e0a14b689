//! The configuration a texture is created from.

use std::rc::Rc;

use gl::types::*;

use crate::buffer::PixelBuffer;

/// The kind of a texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureTarget {
    Texture2d,
    /// Rectangle textures are addressed with pixel coordinates and have no mipmaps.
    Rectangle,
    Texture3d,
    Texture2dArray,
    CubeMap,
}

impl Default for TextureTarget {
    fn default() -> Self {
        TextureTarget::Texture2d
    }
}

impl From<TextureTarget> for GLenum {
    fn from(target: TextureTarget) -> Self {
        match target {
            TextureTarget::Texture2d => gl::TEXTURE_2D,
            TextureTarget::Rectangle => gl::TEXTURE_RECTANGLE,
            TextureTarget::Texture3d => gl::TEXTURE_3D,
            TextureTarget::Texture2dArray => gl::TEXTURE_2D_ARRAY,
            TextureTarget::CubeMap => gl::TEXTURE_CUBE_MAP,
        }
    }
}

/// How texture coordinates outside `[0, 1]` are resolved.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureWrap {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
    ClampToBorder,
}

impl Default for TextureWrap {
    fn default() -> Self {
        TextureWrap::ClampToEdge
    }
}

impl From<TextureWrap> for GLenum {
    fn from(wrap: TextureWrap) -> Self {
        match wrap {
            TextureWrap::Repeat => gl::REPEAT,
            TextureWrap::MirroredRepeat => gl::MIRRORED_REPEAT,
            TextureWrap::ClampToEdge => gl::CLAMP_TO_EDGE,
            TextureWrap::ClampToBorder => gl::CLAMP_TO_BORDER,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

impl Default for TextureFilter {
    fn default() -> Self {
        TextureFilter::Linear
    }
}

impl TextureFilter {
    /// Returns true if the filter samples from mipmaps.
    #[inline]
    pub fn is_mipmap(self) -> bool {
        match self {
            TextureFilter::Nearest | TextureFilter::Linear => false,
            _ => true,
        }
    }
}

impl From<TextureFilter> for GLenum {
    fn from(filter: TextureFilter) -> Self {
        match filter {
            TextureFilter::Nearest => gl::NEAREST,
            TextureFilter::Linear => gl::LINEAR,
            TextureFilter::NearestMipmapNearest => gl::NEAREST_MIPMAP_NEAREST,
            TextureFilter::LinearMipmapNearest => gl::LINEAR_MIPMAP_NEAREST,
            TextureFilter::NearestMipmapLinear => gl::NEAREST_MIPMAP_LINEAR,
            TextureFilter::LinearMipmapLinear => gl::LINEAR_MIPMAP_LINEAR,
        }
    }
}

/// Where a sampled channel takes its value from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Swizzle {
    Red,
    Green,
    Blue,
    Alpha,
    Zero,
    One,
}

impl From<Swizzle> for GLenum {
    fn from(swizzle: Swizzle) -> Self {
        match swizzle {
            Swizzle::Red => gl::RED,
            Swizzle::Green => gl::GREEN,
            Swizzle::Blue => gl::BLUE,
            Swizzle::Alpha => gl::ALPHA,
            Swizzle::Zero => gl::ZERO,
            Swizzle::One => gl::ONE,
        }
    }
}

/// The sources of the sampled red, green, blue and alpha channels.
pub type SwizzleMask = [Swizzle; 4];

pub const SWIZZLE_IDENTITY: SwizzleMask =
    [Swizzle::Red, Swizzle::Green, Swizzle::Blue, Swizzle::Alpha];

/// Expands a red channel into gray.
pub const SWIZZLE_GRAY: SwizzleMask = [Swizzle::Red, Swizzle::Red, Swizzle::Red, Swizzle::One];

/// Expands a red-green pair into gray with alpha.
pub const SWIZZLE_GRAY_ALPHA: SwizzleMask =
    [Swizzle::Red, Swizzle::Red, Swizzle::Red, Swizzle::Green];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareMode {
    None,
    /// Depth textures are sampled as the result of comparing against the reference value.
    CompareRefToTexture,
}

impl From<CompareMode> for GLenum {
    fn from(mode: CompareMode) -> Self {
        match mode {
            CompareMode::None => gl::NONE,
            CompareMode::CompareRefToTexture => gl::COMPARE_REF_TO_TEXTURE,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareFunc {
    Never,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    Always,
}

impl From<CompareFunc> for GLenum {
    fn from(func: CompareFunc) -> Self {
        match func {
            CompareFunc::Never => gl::NEVER,
            CompareFunc::Less => gl::LESS,
            CompareFunc::LessEqual => gl::LEQUAL,
            CompareFunc::Greater => gl::GREATER,
            CompareFunc::GreaterEqual => gl::GEQUAL,
            CompareFunc::Equal => gl::EQUAL,
            CompareFunc::NotEqual => gl::NOTEQUAL,
            CompareFunc::Always => gl::ALWAYS,
        }
    }
}

/// Describes how a texture is stored and sampled.
///
/// A `Format` is consumed when the texture is created; changing it afterwards has no
/// effect on the texture. Unset optional fields are resolved from the pixel data the
/// texture is created from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Format {
    /// Ignored by textures of a fixed kind, e.g. `TextureCubeMap`.
    pub target: TextureTarget,
    pub wrap_s: TextureWrap,
    pub wrap_t: TextureWrap,
    pub wrap_r: TextureWrap,
    /// Defaults to `LinearMipmapLinear` with mipmapping and `Linear` without.
    pub min_filter: Option<TextureFilter>,
    pub mag_filter: TextureFilter,
    pub mipmapping: bool,
    pub base_mipmap_level: u32,
    /// Defaults to the last level of a full mipmap chain.
    pub max_mipmap_level: Option<u32>,
    /// Allocates storage whose size and format can not change afterwards.
    pub immutable_storage: bool,
    /// Overrides the internal format which would be inferred from the pixel data.
    pub internal_format: Option<GLenum>,
    /// Overrides the client pixel type of raw byte uploads.
    pub data_type: Option<GLenum>,
    pub max_anisotropy: Option<f32>,
    /// Defaults to the identity, or to an expansion of gray formats into RGBA.
    pub swizzle_mask: Option<SwizzleMask>,
    pub border_color: Option<[f32; 4]>,
    pub compare_mode: Option<CompareMode>,
    pub compare_func: Option<CompareFunc>,
    pub label: Option<String>,
    /// The first row of the texture is the visual top of the image. Textures are
    /// bottom-up by default, following the GL convention.
    pub load_top_down: bool,
    /// Stages uploads of image sources in this buffer.
    #[serde(skip)]
    pub intermediate_pbo: Option<Rc<PixelBuffer>>,
}

impl Default for Format {
    fn default() -> Self {
        Format {
            target: TextureTarget::Texture2d,
            wrap_s: TextureWrap::ClampToEdge,
            wrap_t: TextureWrap::ClampToEdge,
            wrap_r: TextureWrap::ClampToEdge,
            min_filter: None,
            mag_filter: TextureFilter::Linear,
            mipmapping: false,
            base_mipmap_level: 0,
            max_mipmap_level: None,
            immutable_storage: false,
            internal_format: None,
            data_type: None,
            max_anisotropy: None,
            swizzle_mask: None,
            border_color: None,
            compare_mode: None,
            compare_func: None,
            label: None,
            load_top_down: false,
            intermediate_pbo: None,
        }
    }
}

impl Format {
    pub fn new() -> Self {
        Format::default()
    }

    #[inline]
    pub fn target(mut self, target: TextureTarget) -> Self {
        self.target = target;
        self
    }

    /// Sets the wrap mode of every dimension.
    #[inline]
    pub fn wrap(mut self, wrap: TextureWrap) -> Self {
        self.wrap_s = wrap;
        self.wrap_t = wrap;
        self.wrap_r = wrap;
        self
    }

    #[inline]
    pub fn min_filter(mut self, filter: TextureFilter) -> Self {
        self.min_filter = Some(filter);
        self
    }

    #[inline]
    pub fn mag_filter(mut self, filter: TextureFilter) -> Self {
        self.mag_filter = filter;
        self
    }

    #[inline]
    pub fn mipmap(mut self, mipmapping: bool) -> Self {
        self.mipmapping = mipmapping;
        self
    }

    #[inline]
    pub fn immutable_storage(mut self, immutable: bool) -> Self {
        self.immutable_storage = immutable;
        self
    }

    #[inline]
    pub fn internal_format(mut self, internal_format: GLenum) -> Self {
        self.internal_format = Some(internal_format);
        self
    }

    #[inline]
    pub fn max_anisotropy(mut self, anisotropy: f32) -> Self {
        self.max_anisotropy = Some(anisotropy);
        self
    }

    #[inline]
    pub fn swizzle_mask(mut self, mask: SwizzleMask) -> Self {
        self.swizzle_mask = Some(mask);
        self
    }

    #[inline]
    pub fn label<T: Into<String>>(mut self, label: T) -> Self {
        self.label = Some(label.into());
        self
    }

    #[inline]
    pub fn load_top_down(mut self, top_down: bool) -> Self {
        self.load_top_down = top_down;
        self
    }

    #[inline]
    pub fn intermediate_pbo(mut self, pbo: Rc<PixelBuffer>) -> Self {
        self.intermediate_pbo = Some(pbo);
        self
    }

    /// Returns the min filter, resolving the default.
    #[inline]
    pub fn resolved_min_filter(&self) -> TextureFilter {
        self.min_filter.unwrap_or(if self.mipmapping {
            TextureFilter::LinearMipmapLinear
        } else {
            TextureFilter::Linear
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_filter() {
        assert_eq!(Format::new().resolved_min_filter(), TextureFilter::Linear);
        assert_eq!(
            Format::new().mipmap(true).resolved_min_filter(),
            TextureFilter::LinearMipmapLinear
        );
        assert_eq!(
            Format::new()
                .mipmap(true)
                .min_filter(TextureFilter::Nearest)
                .resolved_min_filter(),
            TextureFilter::Nearest
        );

        assert!(TextureFilter::NearestMipmapLinear.is_mipmap());
        assert!(!TextureFilter::Linear.is_mipmap());
    }

    #[test]
    fn conversions() {
        assert_eq!(GLenum::from(TextureWrap::Repeat), gl::REPEAT);
        assert_eq!(GLenum::from(TextureTarget::CubeMap), gl::TEXTURE_CUBE_MAP);
        assert_eq!(GLenum::from(Swizzle::One), gl::ONE);
        assert_eq!(GLenum::from(CompareFunc::LessEqual), gl::LEQUAL);
    }
}
