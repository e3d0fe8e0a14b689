//! Upload-ready texture payloads, usually produced by a container parser.

use std::rc::Rc;

use gl::types::*;
use smallvec::SmallVec;

use crate::backends::PixelData;
use crate::buffer::PixelBuffer;
use crate::errors::*;

use super::base::mip_level_size;
use super::format::SwizzleMask;
use super::introspect;

/// The byte range of one mipmap level inside a `TextureData` store.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Level {
    pub width: u32,
    pub height: u32,
    /// Offset of the first byte of the level.
    pub offset: usize,
    /// Number of bytes of the level.
    pub size: usize,
}

/// Where the bytes of a `TextureData` live.
#[derive(Debug, Clone)]
pub enum DataStore {
    Heap(Vec<u8>),
    /// Levels are uploaded straight from the buffer.
    Buffer(Rc<PixelBuffer>),
}

impl DataStore {
    #[inline]
    pub fn len(&self) -> usize {
        match *self {
            DataStore::Heap(ref v) => v.len(),
            DataStore::Buffer(ref v) => v.size(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A decoded texture: the description of its storage and the bytes of every mipmap level.
#[derive(Debug, Clone)]
pub struct TextureData {
    width: u32,
    height: u32,
    depth: u32,
    internal_format: GLenum,
    /// The client format, `0` for compressed data.
    data_format: GLenum,
    /// The client type, `0` for compressed data.
    data_type: GLenum,
    levels: SmallVec<[Level; 16]>,
    unpack_alignment: u32,
    swizzle_mask: Option<SwizzleMask>,
    store: DataStore,
}

impl TextureData {
    /// Creates a payload of uncompressed pixels without any levels.
    pub fn new(
        width: u32,
        height: u32,
        internal_format: GLenum,
        data_format: GLenum,
        data_type: GLenum,
        store: DataStore,
    ) -> Self {
        TextureData {
            width,
            height,
            depth: 1,
            internal_format,
            data_format,
            data_type,
            levels: SmallVec::new(),
            unpack_alignment: 4,
            swizzle_mask: None,
            store,
        }
    }

    /// Creates a payload of compressed blocks without any levels.
    pub fn compressed(width: u32, height: u32, internal_format: GLenum, store: DataStore) -> Self {
        TextureData::new(width, height, internal_format, 0, 0, store)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn internal_format(&self) -> GLenum {
        self.internal_format
    }

    #[inline]
    pub fn data_format(&self) -> GLenum {
        self.data_format
    }

    #[inline]
    pub fn data_type(&self) -> GLenum {
        self.data_type
    }

    #[inline]
    pub fn is_compressed(&self) -> bool {
        self.data_format == 0
    }

    #[inline]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    #[inline]
    pub fn unpack_alignment(&self) -> u32 {
        self.unpack_alignment
    }

    pub fn set_unpack_alignment(&mut self, alignment: u32) -> Result<()> {
        match alignment {
            1 | 2 | 4 | 8 => {
                self.unpack_alignment = alignment;
                Ok(())
            }
            v => Err(Error::TextureData(format!("invalid unpack alignment {}", v))),
        }
    }

    #[inline]
    pub fn swizzle_mask(&self) -> Option<SwizzleMask> {
        self.swizzle_mask
    }

    #[inline]
    pub fn set_swizzle_mask(&mut self, mask: SwizzleMask) {
        self.swizzle_mask = Some(mask);
    }

    #[inline]
    pub fn store(&self) -> &DataStore {
        &self.store
    }

    /// Returns the bytes of a level if the store lives in client memory.
    pub fn level_bytes(&self, index: usize) -> Option<&[u8]> {
        let level = self.levels.get(index)?;
        match self.store {
            DataStore::Heap(ref v) => Some(&v[level.offset..level.offset + level.size]),
            DataStore::Buffer(_) => None,
        }
    }

    /// Returns where the upload of a level is sourced from.
    pub(crate) fn level_data(&self, index: usize) -> Result<PixelData> {
        let level = self.levels.get(index).ok_or(Error::OutOfBounds)?;
        Ok(match self.store {
            DataStore::Heap(ref v) => PixelData::Host(&v[level.offset..level.offset + level.size]),
            DataStore::Buffer(ref v) => PixelData::Buffer {
                buffer: v.id(),
                offset: level.offset,
            },
        })
    }

    /// Appends the next mipmap level.
    ///
    /// Levels are pushed from level 0 on, each one must have the size of its mipmap level
    /// and a byte range which lies inside the store without overlapping the others.
    pub fn push_level(&mut self, level: Level) -> Result<()> {
        let index = self.levels.len() as u32;
        let expected = (
            mip_level_size(self.width, index),
            mip_level_size(self.height, index),
        );

        if (level.width, level.height) != expected {
            return Err(Error::TextureData(format!(
                "level {} is {}x{}, expected {}x{}",
                index, level.width, level.height, expected.0, expected.1
            )));
        }

        if let Some(last) = self.levels.last() {
            if (last.width, last.height) == (1, 1) {
                return Err(Error::TextureData("mipmap chain already complete".into()));
            }
        }

        let end = level
            .offset
            .checked_add(level.size)
            .ok_or_else(|| Error::TextureData("level range overflows".into()))?;

        if end > self.store.len() {
            return Err(Error::TextureData(format!(
                "level {} ends at byte {}, but only {} are available",
                index,
                end,
                self.store.len()
            )));
        }

        let required = self.required_level_bytes(level.width, level.height);
        if level.size < required {
            return Err(Error::TextureData(format!(
                "level {} holds {} bytes, {} required",
                index, level.size, required
            )));
        }

        for v in &self.levels {
            if level.offset < v.offset + v.size && v.offset < end {
                return Err(Error::TextureData(format!(
                    "level {} overlaps another level",
                    index
                )));
            }
        }

        self.levels.push(level);
        Ok(())
    }

    fn required_level_bytes(&self, width: u32, height: u32) -> usize {
        if self.is_compressed() {
            return introspect::compressed_image_size(self.internal_format, width, height)
                .unwrap_or(0);
        }

        match introspect::client_pixel_bytes(self.data_format, self.data_type) {
            Some(pixel_bytes) if height > 0 => {
                let row = introspect::aligned_row_bytes(width, pixel_bytes, self.unpack_alignment);
                row * (height as usize - 1) + width as usize * pixel_bytes
            }
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::ext;

    fn level(width: u32, height: u32, offset: usize, size: usize) -> Level {
        Level {
            width,
            height,
            offset,
            size,
        }
    }

    #[test]
    fn levels() {
        let store = DataStore::Heap(vec![0; 4 * 4 * 4 + 2 * 2 * 4 + 4]);
        let mut data = TextureData::new(4, 4, gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE, store);

        assert!(data.push_level(level(2, 2, 0, 16)).is_err());
        data.push_level(level(4, 4, 0, 64)).unwrap();
        assert!(data.push_level(level(2, 2, 60, 16)).is_err());
        assert!(data.push_level(level(2, 2, 64, 8)).is_err());
        data.push_level(level(2, 2, 64, 16)).unwrap();
        assert!(data.push_level(level(1, 1, 80, 8)).is_err());
        data.push_level(level(1, 1, 80, 4)).unwrap();
        assert!(data.push_level(level(1, 1, 80, 4)).is_err());

        assert_eq!(data.levels().len(), 3);
        assert_eq!(data.level_bytes(1).unwrap().len(), 16);
        assert!(!data.is_compressed());
    }

    #[test]
    fn compressed() {
        let store = DataStore::Heap(vec![0; 64 + 16]);
        let mut data = TextureData::compressed(8, 8, ext::COMPRESSED_RGBA_S3TC_DXT5, store);

        data.push_level(level(8, 8, 0, 64)).unwrap();
        assert!(data.push_level(level(4, 4, 64, 8)).is_err());
        data.push_level(level(4, 4, 64, 16)).unwrap();

        assert!(data.is_compressed());
        assert_eq!(data.data_type(), 0);
        assert!(data.set_unpack_alignment(3).is_err());
    }
}
