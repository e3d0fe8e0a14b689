//! DirectDraw Surface files: block compressed formats (legacy FourCC codes and the DX10
//! header) and 24/32-bit uncompressed pixels. Cube maps, volumes and arrays are rejected.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};
use gl::types::*;

use crate::backends::ext;
use crate::errors::*;
use crate::texture::data::{DataStore, Level, TextureData};
use crate::texture::introspect;

use super::truncated;

pub const MAGIC: [u8; 4] = *b"DDS ";

const HEADER_SIZE: u32 = 124;

const DDSD_MIPMAPCOUNT: u32 = 0x0002_0000;
const DDSD_DEPTH: u32 = 0x0080_0000;

const DDPF_ALPHAPIXELS: u32 = 0x1;
const DDPF_FOURCC: u32 = 0x4;
const DDPF_RGB: u32 = 0x40;

const DDSCAPS2_CUBEMAP: u32 = 0x200;
const DDSCAPS2_VOLUME: u32 = 0x0020_0000;

const D3D10_RESOURCE_MISC_TEXTURECUBE: u32 = 0x4;
const D3D10_RESOURCE_DIMENSION_TEXTURE3D: u32 = 4;

fn fourcc(v: &[u8; 4]) -> u32 {
    u32::from(v[0]) | u32::from(v[1]) << 8 | u32::from(v[2]) << 16 | u32::from(v[3]) << 24
}

#[derive(Debug, Default)]
struct PixelFormat {
    flags: u32,
    fourcc: u32,
    bits: u32,
    masks: [u32; 4],
}

#[derive(Debug, Default)]
struct Header {
    flags: u32,
    height: u32,
    width: u32,
    depth: u32,
    mipmaps: u32,
    pixel_format: PixelFormat,
    caps2: u32,
}

impl Header {
    fn read(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        let mut v = [0u32; 31];
        for w in &mut v {
            *w = cursor.read_u32::<LittleEndian>().map_err(truncated)?;
        }

        if v[0] != HEADER_SIZE {
            return Err(Error::TextureData(format!(
                "invalid DDS header size {}",
                v[0]
            )));
        }

        // v[18] is the size of the pixel format, v[7..18] are reserved.
        Ok(Header {
            flags: v[1],
            height: v[2],
            width: v[3],
            depth: v[5],
            mipmaps: v[6],
            pixel_format: PixelFormat {
                flags: v[19],
                fourcc: v[20],
                bits: v[21],
                masks: [v[22], v[23], v[24], v[25]],
            },
            caps2: v[27],
        })
    }
}

/// The layout of the pixels of a file.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Layout {
    Compressed(GLenum),
    /// Internal format, client format and the size of a pixel in bytes.
    Uncompressed(GLenum, GLenum, usize),
}

fn legacy_layout(pf: &PixelFormat) -> Result<Layout> {
    if pf.flags & DDPF_FOURCC != 0 {
        let internal_format = match pf.fourcc {
            v if v == fourcc(b"DXT1") => {
                if pf.flags & DDPF_ALPHAPIXELS != 0 {
                    ext::COMPRESSED_RGBA_S3TC_DXT1
                } else {
                    ext::COMPRESSED_RGB_S3TC_DXT1
                }
            }
            v if v == fourcc(b"DXT3") => ext::COMPRESSED_RGBA_S3TC_DXT3,
            v if v == fourcc(b"DXT5") => ext::COMPRESSED_RGBA_S3TC_DXT5,
            v if v == fourcc(b"ATI1") || v == fourcc(b"BC4U") => gl::COMPRESSED_RED_RGTC1,
            v if v == fourcc(b"BC4S") => gl::COMPRESSED_SIGNED_RED_RGTC1,
            v if v == fourcc(b"ATI2") || v == fourcc(b"BC5U") => gl::COMPRESSED_RG_RGTC2,
            v if v == fourcc(b"BC5S") => gl::COMPRESSED_SIGNED_RG_RGTC2,
            v => {
                return Err(Error::Unsupported(format!(
                    "DDS FourCC {:?}",
                    String::from_utf8_lossy(&v.to_le_bytes())
                )));
            }
        };

        return Ok(Layout::Compressed(internal_format));
    }

    if pf.flags & DDPF_RGB == 0 {
        return Err(Error::Unsupported("DDS without RGB or FourCC data".into()));
    }

    let alpha = pf.flags & DDPF_ALPHAPIXELS != 0;
    let [r, g, b, a] = pf.masks;
    let layout = match (pf.bits, r, g, b) {
        (32, 0x00ff_0000, 0x0000_ff00, 0x0000_00ff) if alpha && a == 0xff00_0000 => {
            Layout::Uncompressed(gl::RGBA8, gl::BGRA, 4)
        }
        (32, 0x00ff_0000, 0x0000_ff00, 0x0000_00ff) => Layout::Uncompressed(gl::RGB8, gl::BGRA, 4),
        (32, 0x0000_00ff, 0x0000_ff00, 0x00ff_0000) if alpha && a == 0xff00_0000 => {
            Layout::Uncompressed(gl::RGBA8, gl::RGBA, 4)
        }
        (32, 0x0000_00ff, 0x0000_ff00, 0x00ff_0000) => Layout::Uncompressed(gl::RGB8, gl::RGBA, 4),
        (24, 0x00ff_0000, 0x0000_ff00, 0x0000_00ff) => Layout::Uncompressed(gl::RGB8, gl::BGR, 3),
        (24, 0x0000_00ff, 0x0000_ff00, 0x00ff_0000) => Layout::Uncompressed(gl::RGB8, gl::RGB, 3),
        _ => {
            return Err(Error::Unsupported(format!(
                "DDS {}-bit pixels with masks {:08X?}",
                pf.bits, pf.masks
            )));
        }
    };

    Ok(layout)
}

fn dxgi_layout(format: u32) -> Result<Layout> {
    let layout = match format {
        28 => Layout::Uncompressed(gl::RGBA8, gl::RGBA, 4),
        29 => Layout::Uncompressed(gl::SRGB8_ALPHA8, gl::RGBA, 4),
        87 => Layout::Uncompressed(gl::RGBA8, gl::BGRA, 4),
        71 => Layout::Compressed(ext::COMPRESSED_RGBA_S3TC_DXT1),
        72 => Layout::Compressed(ext::COMPRESSED_SRGB_ALPHA_S3TC_DXT1),
        74 => Layout::Compressed(ext::COMPRESSED_RGBA_S3TC_DXT3),
        75 => Layout::Compressed(ext::COMPRESSED_SRGB_ALPHA_S3TC_DXT3),
        77 => Layout::Compressed(ext::COMPRESSED_RGBA_S3TC_DXT5),
        78 => Layout::Compressed(ext::COMPRESSED_SRGB_ALPHA_S3TC_DXT5),
        80 => Layout::Compressed(gl::COMPRESSED_RED_RGTC1),
        81 => Layout::Compressed(gl::COMPRESSED_SIGNED_RED_RGTC1),
        83 => Layout::Compressed(gl::COMPRESSED_RG_RGTC2),
        84 => Layout::Compressed(gl::COMPRESSED_SIGNED_RG_RGTC2),
        95 => Layout::Compressed(gl::COMPRESSED_RGB_BPTC_UNSIGNED_FLOAT),
        96 => Layout::Compressed(gl::COMPRESSED_RGB_BPTC_SIGNED_FLOAT),
        98 => Layout::Compressed(gl::COMPRESSED_RGBA_BPTC_UNORM),
        99 => Layout::Compressed(gl::COMPRESSED_SRGB_ALPHA_BPTC_UNORM),
        v => return Err(Error::Unsupported(format!("DXGI format {}", v))),
    };

    Ok(layout)
}

fn level_size(layout: Layout, width: u32, height: u32) -> usize {
    match layout {
        Layout::Compressed(v) => introspect::compressed_image_size(v, width, height).unwrap_or(0),
        Layout::Uncompressed(_, _, n) => width as usize * height as usize * n,
    }
}

/// Parses the contents of a DDS file.
pub fn parse(bytes: &[u8]) -> Result<TextureData> {
    if bytes.len() < MAGIC.len() || bytes[..MAGIC.len()] != MAGIC[..] {
        return Err(Error::TextureData("DDS magic does not match".into()));
    }

    let mut cursor = Cursor::new(bytes);
    cursor.set_position(MAGIC.len() as u64);

    let header = Header::read(&mut cursor)?;
    if header.caps2 & DDSCAPS2_CUBEMAP != 0 {
        return Err(Error::Unsupported("DDS cube maps".into()));
    }

    if header.caps2 & DDSCAPS2_VOLUME != 0 || (header.flags & DDSD_DEPTH != 0 && header.depth > 1) {
        return Err(Error::Unsupported("DDS volumes".into()));
    }

    let layout = if header.pixel_format.flags & DDPF_FOURCC != 0
        && header.pixel_format.fourcc == fourcc(b"DX10")
    {
        let mut v = [0u32; 5];
        for w in &mut v {
            *w = cursor.read_u32::<LittleEndian>().map_err(truncated)?;
        }

        let [format, dimension, misc, array_size, _] = v;
        if misc & D3D10_RESOURCE_MISC_TEXTURECUBE != 0 {
            return Err(Error::Unsupported("DDS cube maps".into()));
        }

        if dimension == D3D10_RESOURCE_DIMENSION_TEXTURE3D {
            return Err(Error::Unsupported("DDS volumes".into()));
        }

        if array_size > 1 {
            return Err(Error::Unsupported("DDS texture arrays".into()));
        }

        dxgi_layout(format)?
    } else {
        legacy_layout(&header.pixel_format)?
    };

    let (width, height) = (header.width, header.height);
    if width == 0 || height == 0 {
        return Err(Error::TextureData("DDS image is empty".into()));
    }

    let levels = if header.flags & DDSD_MIPMAPCOUNT != 0 {
        header.mipmaps.max(1)
    } else {
        1
    };

    let start = cursor.position() as usize;
    let buf = bytes[start..].to_vec();

    let mut data = match layout {
        Layout::Compressed(v) => TextureData::compressed(width, height, v, DataStore::Heap(buf)),
        Layout::Uncompressed(internal, format, _) => {
            let store = DataStore::Heap(buf);
            TextureData::new(width, height, internal, format, gl::UNSIGNED_BYTE, store)
        }
    };

    data.set_unpack_alignment(1)?;

    let mut offset = 0;
    for i in 0..levels {
        let (w, h) = ((width >> i).max(1), (height >> i).max(1));
        let size = level_size(layout, w, h);
        data.push_level(Level {
            width: w,
            height: h,
            offset,
            size,
        })?;

        offset += size;
        if (w, h) == (1, 1) {
            break;
        }
    }

    debug!(
        "Parsed DDS {}x{} {} with {} levels.",
        width,
        height,
        introspect::internal_format_name(data.internal_format()),
        data.levels().len()
    );

    Ok(data)
}
