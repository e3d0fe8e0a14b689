//! Format introspection.
//!
//! A single table maps every internal format this crate knows about to the client pixel
//! format and type it is naturally uploaded from and read back as, together with its
//! alpha, compression and sRGB traits. Every upload and read-back path consults it.

use gl::types::*;

use crate::backends::ext;

/// What an internal format looks like from the client side.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct InternalFormatInfo {
    pub internal_format: GLenum,
    pub name: &'static str,
    /// Client pixel format used to upload or read back this format.
    pub data_format: GLenum,
    /// Client pixel type used to upload or read back this format.
    pub data_type: GLenum,
    pub has_alpha: bool,
    pub compressed: bool,
    pub srgb: bool,
}

const A: bool = true;
const C: bool = true;
const S: bool = true;
const N: bool = false;

macro_rules! formats {
    ($($internal:expr, $name:expr => $format:expr, $ty:expr, $alpha:expr, $compressed:expr, $srgb:expr;)+) => {
        static FORMATS: &[InternalFormatInfo] = &[
            $(
                InternalFormatInfo {
                    internal_format: $internal,
                    name: $name,
                    data_format: $format,
                    data_type: $ty,
                    has_alpha: $alpha,
                    compressed: $compressed,
                    srgb: $srgb,
                },
            )+
        ];
    }
}

formats! {
    // Unsized formats.
    gl::RED, "GL_RED" => gl::RED, gl::UNSIGNED_BYTE, N, N, N;
    gl::RG, "GL_RG" => gl::RG, gl::UNSIGNED_BYTE, N, N, N;
    gl::RGB, "GL_RGB" => gl::RGB, gl::UNSIGNED_BYTE, N, N, N;
    gl::RGBA, "GL_RGBA" => gl::RGBA, gl::UNSIGNED_BYTE, A, N, N;
    gl::ALPHA, "GL_ALPHA" => gl::ALPHA, gl::UNSIGNED_BYTE, A, N, N;
    ext::LUMINANCE, "GL_LUMINANCE" => ext::LUMINANCE, gl::UNSIGNED_BYTE, N, N, N;
    ext::LUMINANCE_ALPHA, "GL_LUMINANCE_ALPHA" => ext::LUMINANCE_ALPHA, gl::UNSIGNED_BYTE, A, N, N;
    gl::DEPTH_COMPONENT, "GL_DEPTH_COMPONENT" => gl::DEPTH_COMPONENT, gl::FLOAT, N, N, N;
    gl::DEPTH_STENCIL, "GL_DEPTH_STENCIL" => gl::DEPTH_STENCIL, gl::UNSIGNED_INT_24_8, N, N, N;

    // Legacy sized formats.
    ext::LUMINANCE8, "GL_LUMINANCE8" => ext::LUMINANCE, gl::UNSIGNED_BYTE, N, N, N;
    ext::LUMINANCE16, "GL_LUMINANCE16" => ext::LUMINANCE, gl::UNSIGNED_SHORT, N, N, N;
    ext::LUMINANCE8_ALPHA8, "GL_LUMINANCE8_ALPHA8" => ext::LUMINANCE_ALPHA, gl::UNSIGNED_BYTE, A, N, N;
    ext::LUMINANCE16_ALPHA16, "GL_LUMINANCE16_ALPHA16" => ext::LUMINANCE_ALPHA, gl::UNSIGNED_SHORT, A, N, N;
    ext::ALPHA8, "GL_ALPHA8" => gl::ALPHA, gl::UNSIGNED_BYTE, A, N, N;

    // Red.
    gl::R8, "GL_R8" => gl::RED, gl::UNSIGNED_BYTE, N, N, N;
    gl::R8_SNORM, "GL_R8_SNORM" => gl::RED, gl::BYTE, N, N, N;
    gl::R16, "GL_R16" => gl::RED, gl::UNSIGNED_SHORT, N, N, N;
    gl::R16F, "GL_R16F" => gl::RED, gl::HALF_FLOAT, N, N, N;
    gl::R32F, "GL_R32F" => gl::RED, gl::FLOAT, N, N, N;
    gl::R8UI, "GL_R8UI" => gl::RED_INTEGER, gl::UNSIGNED_BYTE, N, N, N;
    gl::R8I, "GL_R8I" => gl::RED_INTEGER, gl::BYTE, N, N, N;
    gl::R16UI, "GL_R16UI" => gl::RED_INTEGER, gl::UNSIGNED_SHORT, N, N, N;
    gl::R16I, "GL_R16I" => gl::RED_INTEGER, gl::SHORT, N, N, N;
    gl::R32UI, "GL_R32UI" => gl::RED_INTEGER, gl::UNSIGNED_INT, N, N, N;
    gl::R32I, "GL_R32I" => gl::RED_INTEGER, gl::INT, N, N, N;

    // Red-green.
    gl::RG8, "GL_RG8" => gl::RG, gl::UNSIGNED_BYTE, N, N, N;
    gl::RG8_SNORM, "GL_RG8_SNORM" => gl::RG, gl::BYTE, N, N, N;
    gl::RG16, "GL_RG16" => gl::RG, gl::UNSIGNED_SHORT, N, N, N;
    gl::RG16F, "GL_RG16F" => gl::RG, gl::HALF_FLOAT, N, N, N;
    gl::RG32F, "GL_RG32F" => gl::RG, gl::FLOAT, N, N, N;
    gl::RG8UI, "GL_RG8UI" => gl::RG_INTEGER, gl::UNSIGNED_BYTE, N, N, N;
    gl::RG16UI, "GL_RG16UI" => gl::RG_INTEGER, gl::UNSIGNED_SHORT, N, N, N;
    gl::RG32UI, "GL_RG32UI" => gl::RG_INTEGER, gl::UNSIGNED_INT, N, N, N;

    // Red-green-blue.
    gl::RGB8, "GL_RGB8" => gl::RGB, gl::UNSIGNED_BYTE, N, N, N;
    gl::RGB8_SNORM, "GL_RGB8_SNORM" => gl::RGB, gl::BYTE, N, N, N;
    gl::RGB16, "GL_RGB16" => gl::RGB, gl::UNSIGNED_SHORT, N, N, N;
    gl::RGB16F, "GL_RGB16F" => gl::RGB, gl::HALF_FLOAT, N, N, N;
    gl::RGB32F, "GL_RGB32F" => gl::RGB, gl::FLOAT, N, N, N;
    gl::RGB565, "GL_RGB565" => gl::RGB, gl::UNSIGNED_SHORT_5_6_5, N, N, N;
    gl::R11F_G11F_B10F, "GL_R11F_G11F_B10F" => gl::RGB, gl::UNSIGNED_INT_10F_11F_11F_REV, N, N, N;
    gl::RGB9_E5, "GL_RGB9_E5" => gl::RGB, gl::UNSIGNED_INT_5_9_9_9_REV, N, N, N;
    gl::SRGB8, "GL_SRGB8" => gl::RGB, gl::UNSIGNED_BYTE, N, N, S;
    gl::RGB8UI, "GL_RGB8UI" => gl::RGB_INTEGER, gl::UNSIGNED_BYTE, N, N, N;
    gl::RGB32UI, "GL_RGB32UI" => gl::RGB_INTEGER, gl::UNSIGNED_INT, N, N, N;

    // Red-green-blue-alpha.
    gl::RGBA8, "GL_RGBA8" => gl::RGBA, gl::UNSIGNED_BYTE, A, N, N;
    gl::RGBA8_SNORM, "GL_RGBA8_SNORM" => gl::RGBA, gl::BYTE, A, N, N;
    gl::RGBA16, "GL_RGBA16" => gl::RGBA, gl::UNSIGNED_SHORT, A, N, N;
    gl::RGBA16F, "GL_RGBA16F" => gl::RGBA, gl::HALF_FLOAT, A, N, N;
    gl::RGBA32F, "GL_RGBA32F" => gl::RGBA, gl::FLOAT, A, N, N;
    gl::RGBA4, "GL_RGBA4" => gl::RGBA, gl::UNSIGNED_SHORT_4_4_4_4, A, N, N;
    gl::RGB5_A1, "GL_RGB5_A1" => gl::RGBA, gl::UNSIGNED_SHORT_5_5_5_1, A, N, N;
    gl::RGB10_A2, "GL_RGB10_A2" => gl::RGBA, gl::UNSIGNED_INT_2_10_10_10_REV, A, N, N;
    gl::SRGB8_ALPHA8, "GL_SRGB8_ALPHA8" => gl::RGBA, gl::UNSIGNED_BYTE, A, N, S;
    gl::RGBA8UI, "GL_RGBA8UI" => gl::RGBA_INTEGER, gl::UNSIGNED_BYTE, A, N, N;
    gl::RGBA16UI, "GL_RGBA16UI" => gl::RGBA_INTEGER, gl::UNSIGNED_SHORT, A, N, N;
    gl::RGBA32UI, "GL_RGBA32UI" => gl::RGBA_INTEGER, gl::UNSIGNED_INT, A, N, N;

    // Depth and stencil.
    gl::DEPTH_COMPONENT16, "GL_DEPTH_COMPONENT16" => gl::DEPTH_COMPONENT, gl::UNSIGNED_SHORT, N, N, N;
    gl::DEPTH_COMPONENT24, "GL_DEPTH_COMPONENT24" => gl::DEPTH_COMPONENT, gl::UNSIGNED_INT, N, N, N;
    gl::DEPTH_COMPONENT32F, "GL_DEPTH_COMPONENT32F" => gl::DEPTH_COMPONENT, gl::FLOAT, N, N, N;
    gl::DEPTH24_STENCIL8, "GL_DEPTH24_STENCIL8" => gl::DEPTH_STENCIL, gl::UNSIGNED_INT_24_8, N, N, N;
    gl::DEPTH32F_STENCIL8, "GL_DEPTH32F_STENCIL8" => gl::DEPTH_STENCIL, gl::FLOAT_32_UNSIGNED_INT_24_8_REV, N, N, N;

    // S3TC.
    ext::COMPRESSED_RGB_S3TC_DXT1, "GL_COMPRESSED_RGB_S3TC_DXT1_EXT" => gl::RGB, gl::UNSIGNED_BYTE, N, C, N;
    ext::COMPRESSED_RGBA_S3TC_DXT1, "GL_COMPRESSED_RGBA_S3TC_DXT1_EXT" => gl::RGBA, gl::UNSIGNED_BYTE, A, C, N;
    ext::COMPRESSED_RGBA_S3TC_DXT3, "GL_COMPRESSED_RGBA_S3TC_DXT3_EXT" => gl::RGBA, gl::UNSIGNED_BYTE, A, C, N;
    ext::COMPRESSED_RGBA_S3TC_DXT5, "GL_COMPRESSED_RGBA_S3TC_DXT5_EXT" => gl::RGBA, gl::UNSIGNED_BYTE, A, C, N;
    ext::COMPRESSED_SRGB_S3TC_DXT1, "GL_COMPRESSED_SRGB_S3TC_DXT1_EXT" => gl::RGB, gl::UNSIGNED_BYTE, N, C, S;
    ext::COMPRESSED_SRGB_ALPHA_S3TC_DXT1, "GL_COMPRESSED_SRGB_ALPHA_S3TC_DXT1_EXT" => gl::RGBA, gl::UNSIGNED_BYTE, A, C, S;
    ext::COMPRESSED_SRGB_ALPHA_S3TC_DXT3, "GL_COMPRESSED_SRGB_ALPHA_S3TC_DXT3_EXT" => gl::RGBA, gl::UNSIGNED_BYTE, A, C, S;
    ext::COMPRESSED_SRGB_ALPHA_S3TC_DXT5, "GL_COMPRESSED_SRGB_ALPHA_S3TC_DXT5_EXT" => gl::RGBA, gl::UNSIGNED_BYTE, A, C, S;

    // RGTC.
    gl::COMPRESSED_RED_RGTC1, "GL_COMPRESSED_RED_RGTC1" => gl::RED, gl::UNSIGNED_BYTE, N, C, N;
    gl::COMPRESSED_SIGNED_RED_RGTC1, "GL_COMPRESSED_SIGNED_RED_RGTC1" => gl::RED, gl::BYTE, N, C, N;
    gl::COMPRESSED_RG_RGTC2, "GL_COMPRESSED_RG_RGTC2" => gl::RG, gl::UNSIGNED_BYTE, N, C, N;
    gl::COMPRESSED_SIGNED_RG_RGTC2, "GL_COMPRESSED_SIGNED_RG_RGTC2" => gl::RG, gl::BYTE, N, C, N;

    // BPTC.
    gl::COMPRESSED_RGBA_BPTC_UNORM, "GL_COMPRESSED_RGBA_BPTC_UNORM" => gl::RGBA, gl::UNSIGNED_BYTE, A, C, N;
    gl::COMPRESSED_SRGB_ALPHA_BPTC_UNORM, "GL_COMPRESSED_SRGB_ALPHA_BPTC_UNORM" => gl::RGBA, gl::UNSIGNED_BYTE, A, C, S;
    gl::COMPRESSED_RGB_BPTC_SIGNED_FLOAT, "GL_COMPRESSED_RGB_BPTC_SIGNED_FLOAT" => gl::RGB, gl::FLOAT, N, C, N;
    gl::COMPRESSED_RGB_BPTC_UNSIGNED_FLOAT, "GL_COMPRESSED_RGB_BPTC_UNSIGNED_FLOAT" => gl::RGB, gl::FLOAT, N, C, N;

    // ETC and EAC.
    ext::ETC1_RGB8, "GL_ETC1_RGB8_OES" => gl::RGB, gl::UNSIGNED_BYTE, N, C, N;
    gl::COMPRESSED_RGB8_ETC2, "GL_COMPRESSED_RGB8_ETC2" => gl::RGB, gl::UNSIGNED_BYTE, N, C, N;
    gl::COMPRESSED_SRGB8_ETC2, "GL_COMPRESSED_SRGB8_ETC2" => gl::RGB, gl::UNSIGNED_BYTE, N, C, S;
    gl::COMPRESSED_RGB8_PUNCHTHROUGH_ALPHA1_ETC2, "GL_COMPRESSED_RGB8_PUNCHTHROUGH_ALPHA1_ETC2" => gl::RGBA, gl::UNSIGNED_BYTE, A, C, N;
    gl::COMPRESSED_RGBA8_ETC2_EAC, "GL_COMPRESSED_RGBA8_ETC2_EAC" => gl::RGBA, gl::UNSIGNED_BYTE, A, C, N;
    gl::COMPRESSED_SRGB8_ALPHA8_ETC2_EAC, "GL_COMPRESSED_SRGB8_ALPHA8_ETC2_EAC" => gl::RGBA, gl::UNSIGNED_BYTE, A, C, S;
    gl::COMPRESSED_R11_EAC, "GL_COMPRESSED_R11_EAC" => gl::RED, gl::UNSIGNED_BYTE, N, C, N;
    gl::COMPRESSED_RG11_EAC, "GL_COMPRESSED_RG11_EAC" => gl::RG, gl::UNSIGNED_BYTE, N, C, N;

    // PVRTC.
    ext::COMPRESSED_RGB_PVRTC_4BPPV1, "GL_COMPRESSED_RGB_PVRTC_4BPPV1_IMG" => gl::RGB, gl::UNSIGNED_BYTE, N, C, N;
    ext::COMPRESSED_RGB_PVRTC_2BPPV1, "GL_COMPRESSED_RGB_PVRTC_2BPPV1_IMG" => gl::RGB, gl::UNSIGNED_BYTE, N, C, N;
    ext::COMPRESSED_RGBA_PVRTC_4BPPV1, "GL_COMPRESSED_RGBA_PVRTC_4BPPV1_IMG" => gl::RGBA, gl::UNSIGNED_BYTE, A, C, N;
    ext::COMPRESSED_RGBA_PVRTC_2BPPV1, "GL_COMPRESSED_RGBA_PVRTC_2BPPV1_IMG" => gl::RGBA, gl::UNSIGNED_BYTE, A, C, N;
}

/// Looks up `internal_format`, returning `None` for enumerants missing from the table.
pub fn lookup(internal_format: GLenum) -> Option<InternalFormatInfo> {
    FORMATS
        .iter()
        .find(|v| v.internal_format == internal_format)
        .cloned()
}

/// Looks up `internal_format`. Unknown enumerants, usually from driver extensions, are
/// reported and treated as 4-channel 8-bit data.
pub fn internal_format_info(internal_format: GLenum) -> InternalFormatInfo {
    lookup(internal_format).unwrap_or_else(|| {
        warn!(
            "Unrecognized internal format 0x{:04X}, assuming GL_RGBA/GL_UNSIGNED_BYTE.",
            internal_format
        );

        InternalFormatInfo {
            internal_format,
            name: "unknown",
            data_format: gl::RGBA,
            data_type: gl::UNSIGNED_BYTE,
            has_alpha: true,
            compressed: false,
            srgb: false,
        }
    })
}

/// Returns a human readable name of `internal_format`.
pub fn internal_format_name(internal_format: GLenum) -> &'static str {
    lookup(internal_format).map(|v| v.name).unwrap_or("unknown")
}

/// Returns the number of components of a client pixel format.
pub fn client_components(format: GLenum) -> Option<usize> {
    match format {
        gl::RED | gl::RED_INTEGER | gl::GREEN | gl::BLUE | gl::ALPHA | ext::LUMINANCE => Some(1),
        gl::DEPTH_COMPONENT | gl::STENCIL_INDEX => Some(1),
        gl::RG | gl::RG_INTEGER | ext::LUMINANCE_ALPHA | gl::DEPTH_STENCIL => Some(2),
        gl::RGB | gl::BGR | gl::RGB_INTEGER | gl::BGR_INTEGER => Some(3),
        gl::RGBA | gl::BGRA | gl::RGBA_INTEGER | gl::BGRA_INTEGER => Some(4),
        _ => None,
    }
}

/// Returns the size in bytes of one client pixel in `format`/`pixel_type`.
pub fn client_pixel_bytes(format: GLenum, pixel_type: GLenum) -> Option<usize> {
    match pixel_type {
        gl::UNSIGNED_SHORT_5_6_5
        | gl::UNSIGNED_SHORT_5_6_5_REV
        | gl::UNSIGNED_SHORT_4_4_4_4
        | gl::UNSIGNED_SHORT_4_4_4_4_REV
        | gl::UNSIGNED_SHORT_5_5_5_1
        | gl::UNSIGNED_SHORT_1_5_5_5_REV => Some(2),
        gl::UNSIGNED_INT_2_10_10_10_REV
        | gl::UNSIGNED_INT_10_10_10_2
        | gl::UNSIGNED_INT_10F_11F_11F_REV
        | gl::UNSIGNED_INT_5_9_9_9_REV
        | gl::UNSIGNED_INT_24_8
        | gl::UNSIGNED_INT_8_8_8_8
        | gl::UNSIGNED_INT_8_8_8_8_REV => Some(4),
        gl::FLOAT_32_UNSIGNED_INT_24_8_REV => Some(8),
        _ => {
            let size = match pixel_type {
                gl::UNSIGNED_BYTE | gl::BYTE => 1,
                gl::UNSIGNED_SHORT | gl::SHORT | gl::HALF_FLOAT => 2,
                gl::UNSIGNED_INT | gl::INT | gl::FLOAT => 4,
                _ => return None,
            };

            client_components(format).map(|n| n * size)
        }
    }
}

/// Returns the size in bytes of a row of `width` pixels padded to `alignment`.
#[inline]
pub fn aligned_row_bytes(width: u32, pixel_bytes: usize, alignment: u32) -> usize {
    let alignment = alignment.max(1) as usize;
    let len = width as usize * pixel_bytes;
    (len + alignment - 1) / alignment * alignment
}

/// The block geometry of a compressed format.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CompressedBlock {
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
    /// Images are padded up to at least this many pixels in each dimension.
    pub min_width: u32,
    pub min_height: u32,
}

impl CompressedBlock {
    const fn new(width: u32, height: u32, bytes: usize) -> Self {
        CompressedBlock {
            width,
            height,
            bytes,
            min_width: 1,
            min_height: 1,
        }
    }
}

/// Returns the block geometry of a compressed internal format.
pub fn compressed_block(internal_format: GLenum) -> Option<CompressedBlock> {
    let block = match internal_format {
        ext::COMPRESSED_RGB_S3TC_DXT1
        | ext::COMPRESSED_RGBA_S3TC_DXT1
        | ext::COMPRESSED_SRGB_S3TC_DXT1
        | ext::COMPRESSED_SRGB_ALPHA_S3TC_DXT1
        | gl::COMPRESSED_RED_RGTC1
        | gl::COMPRESSED_SIGNED_RED_RGTC1
        | ext::ETC1_RGB8
        | gl::COMPRESSED_RGB8_ETC2
        | gl::COMPRESSED_SRGB8_ETC2
        | gl::COMPRESSED_RGB8_PUNCHTHROUGH_ALPHA1_ETC2
        | gl::COMPRESSED_R11_EAC => CompressedBlock::new(4, 4, 8),

        ext::COMPRESSED_RGBA_S3TC_DXT3
        | ext::COMPRESSED_RGBA_S3TC_DXT5
        | ext::COMPRESSED_SRGB_ALPHA_S3TC_DXT3
        | ext::COMPRESSED_SRGB_ALPHA_S3TC_DXT5
        | gl::COMPRESSED_RG_RGTC2
        | gl::COMPRESSED_SIGNED_RG_RGTC2
        | gl::COMPRESSED_RGBA_BPTC_UNORM
        | gl::COMPRESSED_SRGB_ALPHA_BPTC_UNORM
        | gl::COMPRESSED_RGB_BPTC_SIGNED_FLOAT
        | gl::COMPRESSED_RGB_BPTC_UNSIGNED_FLOAT
        | gl::COMPRESSED_RGBA8_ETC2_EAC
        | gl::COMPRESSED_SRGB8_ALPHA8_ETC2_EAC
        | gl::COMPRESSED_RG11_EAC => CompressedBlock::new(4, 4, 16),

        ext::COMPRESSED_RGB_PVRTC_4BPPV1 | ext::COMPRESSED_RGBA_PVRTC_4BPPV1 => CompressedBlock {
            min_width: 8,
            min_height: 8,
            ..CompressedBlock::new(4, 4, 8)
        },

        ext::COMPRESSED_RGB_PVRTC_2BPPV1 | ext::COMPRESSED_RGBA_PVRTC_2BPPV1 => CompressedBlock {
            min_width: 16,
            min_height: 8,
            ..CompressedBlock::new(8, 4, 8)
        },

        _ => return None,
    };

    Some(block)
}

/// Returns the size in bytes of a `width` by `height` compressed image.
pub fn compressed_image_size(internal_format: GLenum, width: u32, height: u32) -> Option<usize> {
    compressed_block(internal_format).map(|b| {
        let w = width.max(b.min_width);
        let h = height.max(b.min_height);
        let bw = (w + b.width - 1) / b.width;
        let bh = (h + b.height - 1) / b.height;
        bw as usize * bh as usize * b.bytes
    })
}
