//! Enumerants from extensions and the compatibility profile, which the core-profile `gl`
//! bindings do not carry.

use gl::types::GLenum;

pub const LUMINANCE: GLenum = 0x1909;
pub const LUMINANCE_ALPHA: GLenum = 0x190A;
pub const LUMINANCE8: GLenum = 0x8040;
pub const LUMINANCE16: GLenum = 0x8042;
pub const LUMINANCE8_ALPHA8: GLenum = 0x8045;
pub const LUMINANCE16_ALPHA16: GLenum = 0x8048;
pub const ALPHA8: GLenum = 0x803C;

pub const TEXTURE_MAX_ANISOTROPY: GLenum = 0x84FE;
pub const MAX_TEXTURE_MAX_ANISOTROPY: GLenum = 0x84FF;

pub const COMPRESSED_RGB_S3TC_DXT1: GLenum = 0x83F0;
pub const COMPRESSED_RGBA_S3TC_DXT1: GLenum = 0x83F1;
pub const COMPRESSED_RGBA_S3TC_DXT3: GLenum = 0x83F2;
pub const COMPRESSED_RGBA_S3TC_DXT5: GLenum = 0x83F3;
pub const COMPRESSED_SRGB_S3TC_DXT1: GLenum = 0x8C4C;
pub const COMPRESSED_SRGB_ALPHA_S3TC_DXT1: GLenum = 0x8C4D;
pub const COMPRESSED_SRGB_ALPHA_S3TC_DXT3: GLenum = 0x8C4E;
pub const COMPRESSED_SRGB_ALPHA_S3TC_DXT5: GLenum = 0x8C4F;

pub const COMPRESSED_RGB_PVRTC_4BPPV1: GLenum = 0x8C00;
pub const COMPRESSED_RGB_PVRTC_2BPPV1: GLenum = 0x8C01;
pub const COMPRESSED_RGBA_PVRTC_4BPPV1: GLenum = 0x8C02;
pub const COMPRESSED_RGBA_PVRTC_2BPPV1: GLenum = 0x8C03;

pub const ETC1_RGB8: GLenum = 0x8D64;
