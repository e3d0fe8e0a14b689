//! KTX 1.1 files, in either byte order. Only single-face 2D images are accepted.

use std::io::{Cursor, Read};

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};
use gl::types::*;

use crate::errors::*;
use crate::texture::base::{mip_level_size, required_mipmap_levels};
use crate::texture::data::{DataStore, Level, TextureData};

use super::truncated;

pub const MAGIC: [u8; 12] = [
    0xAB, 0x4B, 0x54, 0x58, 0x20, 0x31, 0x31, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A,
];

const ENDIANNESS: u32 = 0x0403_0201;

#[derive(Debug, Default)]
struct Header {
    gl_type: GLenum,
    gl_type_size: u32,
    gl_format: GLenum,
    gl_internal_format: GLenum,
    width: u32,
    height: u32,
    depth: u32,
    array_elements: u32,
    faces: u32,
    levels: u32,
    key_value_bytes: u32,
}

impl Header {
    fn read<E: ByteOrder>(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        let mut v = [0u32; 12];
        for w in &mut v {
            *w = cursor.read_u32::<E>().map_err(truncated)?;
        }

        // v[4] is the base internal format, which the internal format already implies.
        Ok(Header {
            gl_type: v[0],
            gl_type_size: v[1],
            gl_format: v[2],
            gl_internal_format: v[3],
            width: v[5],
            height: v[6],
            depth: v[7],
            array_elements: v[8],
            faces: v[9],
            levels: v[10],
            key_value_bytes: v[11],
        })
    }
}

/// Parses the contents of a KTX file.
pub fn parse(bytes: &[u8]) -> Result<TextureData> {
    if bytes.len() < MAGIC.len() || bytes[..MAGIC.len()] != MAGIC[..] {
        return Err(Error::TextureData("KTX identifier does not match".into()));
    }

    let mut cursor = Cursor::new(bytes);
    cursor.set_position(MAGIC.len() as u64);

    let endianness = cursor.read_u32::<LittleEndian>().map_err(truncated)?;
    match endianness {
        ENDIANNESS => parse_with::<LittleEndian>(cursor, false),
        v if v.swap_bytes() == ENDIANNESS => parse_with::<BigEndian>(cursor, true),
        v => Err(Error::TextureData(format!(
            "invalid KTX endianness 0x{:08X}",
            v
        ))),
    }
}

fn parse_with<E: ByteOrder>(mut cursor: Cursor<&[u8]>, swapped: bool) -> Result<TextureData> {
    let header = Header::read::<E>(&mut cursor)?;

    if header.faces != 1 {
        return Err(Error::Unsupported(format!(
            "KTX with {} faces",
            header.faces
        )));
    }

    if header.array_elements > 0 || header.depth > 0 {
        return Err(Error::Unsupported("KTX arrays and volumes".into()));
    }

    if header.width == 0 {
        return Err(Error::TextureData("KTX image has no width".into()));
    }

    let position = cursor.position() + u64::from(header.key_value_bytes);
    if position > cursor.get_ref().len() as u64 {
        return Err(Error::TextureData("unexpected end of data".into()));
    }

    cursor.set_position(position);

    let compressed = header.gl_type == 0 || header.gl_format == 0;
    let (width, height) = (header.width, header.height.max(1));
    let levels = header.levels.max(1);

    let chain = required_mipmap_levels(width, height, 1);
    if levels > chain {
        return Err(Error::TextureData(format!(
            "KTX declares {} levels, a {}x{} image has {}",
            levels, width, height, chain
        )));
    }

    let mut buf = Vec::new();
    let mut sizes = Vec::with_capacity(levels as usize);
    for _ in 0..levels {
        let size = cursor.read_u32::<E>().map_err(truncated)? as usize;
        let offset = buf.len();

        let remaining = cursor.get_ref().len() as u64 - cursor.position();
        if size as u64 > remaining {
            return Err(Error::TextureData("unexpected end of data".into()));
        }

        buf.resize(offset + size, 0);
        cursor.read_exact(&mut buf[offset..]).map_err(truncated)?;

        if swapped && !compressed {
            swap_components(&mut buf[offset..], header.gl_type_size);
        }

        sizes.push((offset, size));

        let padding = (4 - size % 4) % 4;
        cursor.set_position(cursor.position() + padding as u64);
    }

    let store = DataStore::Heap(buf);
    let mut data = if compressed {
        TextureData::compressed(width, height, header.gl_internal_format, store)
    } else {
        TextureData::new(
            width,
            height,
            header.gl_internal_format,
            header.gl_format,
            header.gl_type,
            store,
        )
    };

    for (i, (offset, size)) in sizes.into_iter().enumerate() {
        data.push_level(Level {
            width: mip_level_size(width, i as u32),
            height: mip_level_size(height, i as u32),
            offset,
            size,
        })?;
    }

    debug!(
        "Parsed KTX {}x{} 0x{:04X} with {} levels.",
        width, height, header.gl_internal_format, levels
    );

    Ok(data)
}

fn swap_components(bytes: &mut [u8], size: u32) {
    match size {
        2 => bytes.chunks_mut(2).for_each(|v| v.reverse()),
        4 => bytes.chunks_mut(4).for_each(|v| v.reverse()),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;

    fn build<E: ByteOrder>(header: [u32; 12], levels: &[&[u8]]) -> Vec<u8> {
        let mut bytes = MAGIC.to_vec();
        bytes.write_u32::<E>(ENDIANNESS).unwrap();
        for v in &header {
            bytes.write_u32::<E>(*v).unwrap();
        }

        for v in levels {
            bytes.write_u32::<E>(v.len() as u32).unwrap();
            bytes.extend_from_slice(v);
        }

        bytes
    }

    #[test]
    fn uncompressed() {
        let header = [
            gl::UNSIGNED_BYTE, 1, gl::RGBA, gl::RGBA8, gl::RGBA, 2, 2, 0, 0, 1, 2, 0,
        ];

        let bytes = build::<LittleEndian>(header, &[&[7; 16], &[9; 4]]);
        let data = parse(&bytes).unwrap();
        assert_eq!((data.width(), data.height()), (2, 2));
        assert_eq!(data.levels().len(), 2);
        assert_eq!(data.level_bytes(1).unwrap(), &[9; 4]);

        let bytes = build::<BigEndian>(header, &[&[7; 16], &[9; 4]]);
        assert_eq!(parse(&bytes).unwrap().internal_format(), gl::RGBA8);
    }

    #[test]
    fn big_endian_shorts() {
        let header = [
            gl::UNSIGNED_SHORT, 2, gl::RED, gl::R16, gl::RED, 2, 1, 0, 0, 1, 1, 0,
        ];

        let bytes = build::<BigEndian>(header, &[&[0x12, 0x34, 0x56, 0x78]]);
        let data = parse(&bytes).unwrap();
        assert_eq!(data.level_bytes(0).unwrap(), &[0x34, 0x12, 0x78, 0x56]);
    }

    #[test]
    fn rejects() {
        let header = [
            gl::UNSIGNED_BYTE, 1, gl::RGBA, gl::RGBA8, gl::RGBA, 4, 4, 0, 0, 1, 1, 0,
        ];

        let bytes = build::<LittleEndian>(header, &[&[0; 64]]);
        for len in &[8, 20, 60, bytes.len() - 1] {
            match parse(&bytes[..*len]) {
                Err(Error::TextureData(_)) => {}
                v => panic!("{:?}", v),
            }
        }

        let mut cube = header;
        cube[9] = 6;
        let bytes = build::<LittleEndian>(cube, &[&[0; 64]]);
        assert!(parse(&bytes).is_err());
    }

    #[test]
    fn hostile_sizes() {
        let header = [
            gl::UNSIGNED_BYTE, 1, gl::RGBA, gl::RGBA8, gl::RGBA, 4, 4, 0, 0, 1, 1, 0,
        ];

        // The image size claims far more bytes than the file holds.
        let mut bytes = build::<LittleEndian>(header, &[]);
        bytes.write_u32::<LittleEndian>(0xFFFF_FFF0).unwrap();
        bytes.extend_from_slice(&[0; 4]);
        match parse(&bytes) {
            Err(Error::TextureData(_)) => {}
            v => panic!("{:?}", v),
        }

        // More levels than the mipmap chain of the image.
        let mut deep = header;
        deep[10] = 33;
        let empty = vec![&[][..]; 33];
        let bytes = build::<LittleEndian>(deep, &empty);
        match parse(&bytes) {
            Err(Error::TextureData(_)) => {}
            v => panic!("{:?}", v),
        }

        let mut deep = header;
        deep[10] = 4;
        let bytes = build::<LittleEndian>(deep, &[&[0; 64], &[0; 16], &[0; 4], &[0; 4]]);
        assert!(parse(&bytes).is_err());
    }
}
