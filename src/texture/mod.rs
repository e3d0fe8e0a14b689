//! GPU textures: format resolution, parameter state, the texture kinds and a pool of
//! reusable 2D textures.

pub mod format;
pub mod introspect;
pub mod resolve;

pub mod base;
pub mod data;
pub mod target;

pub mod cube;
pub mod texture2d;
pub mod texture3d;

pub mod cache;

pub mod prelude {
    pub use super::format::{
        CompareFunc, CompareMode, Format, Swizzle, SwizzleMask, TextureFilter, TextureTarget,
        TextureWrap, SWIZZLE_GRAY, SWIZZLE_GRAY_ALPHA, SWIZZLE_IDENTITY,
    };

    pub use super::base::{mip_level_size, required_mipmap_levels, Texture, TextureBase};
    pub use super::cache::{CachedTexture, Texture2dCache};
    pub use super::cube::{CubeLayout, TextureCubeMap};
    pub use super::data::{DataStore, Level, TextureData};
    pub use super::target::{TextureImageSource, TextureImageTarget};
    pub use super::texture2d::Texture2d;
    pub use super::texture3d::Texture3d;
}
