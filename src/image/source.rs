//! The pull-based decoding seam.
//!
//! An `ImageSource` knows the dimensions and layout of an image and decodes it on demand
//! into an `ImageTarget`. The target decides which channel order and component type it
//! wants and hands out one row at a time; the source converts while writing. Rows are
//! always requested top row first, a target that stores images bottom-up simply hands
//! out its rows in reverse.

use crate::errors::*;

use super::convert::{convert_pixels, PixelLayout};
use super::{ChannelOrder, ColorModel, DataType};

pub trait ImageSource {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn color_model(&self) -> ColorModel;

    fn data_type(&self) -> DataType;

    fn has_alpha(&self) -> bool;

    fn is_premultiplied(&self) -> bool {
        false
    }

    /// Decodes the whole image into `target`, converting to the layout it requests.
    fn load(&mut self, target: &mut dyn ImageTarget) -> Result<()>;
}

pub trait ImageTarget {
    /// The channel order the target wants rows in.
    fn channel_order(&self) -> ChannelOrder;

    /// The component type the target wants rows in.
    fn data_type(&self) -> DataType;

    /// Returns the destination of row `y`, where row 0 is the visual top of the image.
    fn row_mut(&mut self, y: u32) -> &mut [u8];

    /// Called once after the last row has been written.
    fn finalize(&mut self) -> Result<()> {
        Ok(())
    }
}

/// An image source over tightly packed pixels in memory.
#[derive(Debug, Clone)]
pub struct BufferSource {
    width: u32,
    height: u32,
    order: ChannelOrder,
    data_type: DataType,
    bottom_up: bool,
    premultiplied: bool,
    bytes: Vec<u8>,
}

impl BufferSource {
    pub fn new(
        width: u32,
        height: u32,
        order: ChannelOrder,
        data_type: DataType,
        bytes: Vec<u8>,
    ) -> Self {
        BufferSource {
            width,
            height,
            order,
            data_type,
            bottom_up: false,
            premultiplied: false,
            bytes,
        }
    }

    /// Marks the rows in memory as stored bottom row first.
    pub fn with_bottom_up(mut self, bottom_up: bool) -> Self {
        self.bottom_up = bottom_up;
        self
    }

    pub fn with_premultiplied(mut self, premultiplied: bool) -> Self {
        self.premultiplied = premultiplied;
        self
    }

    #[inline]
    pub fn channel_order(&self) -> ChannelOrder {
        self.order
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl ImageSource for BufferSource {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn color_model(&self) -> ColorModel {
        if self.order.is_gray() {
            ColorModel::Gray
        } else {
            ColorModel::Rgb
        }
    }

    fn data_type(&self) -> DataType {
        self.data_type
    }

    fn has_alpha(&self) -> bool {
        self.order.has_alpha()
    }

    fn is_premultiplied(&self) -> bool {
        self.premultiplied
    }

    fn load(&mut self, target: &mut dyn ImageTarget) -> Result<()> {
        let src_layout = PixelLayout::from_order(self.order, self.data_type);
        let dst_layout = PixelLayout::from_order(target.channel_order(), target.data_type());
        let row_bytes = self.width as usize * src_layout.pixel_bytes();

        if self.bytes.len() < row_bytes * self.height as usize {
            return Err(Error::OutOfBounds);
        }

        for y in 0..self.height {
            let sy = if self.bottom_up {
                self.height - 1 - y
            } else {
                y
            };

            let begin = sy as usize * row_bytes;
            let src = &self.bytes[begin..begin + row_bytes];
            let dst = target.row_mut(y);
            if dst.len() < self.width as usize * dst_layout.pixel_bytes() {
                return Err(Error::OutOfBounds);
            }

            convert_pixels(src, src_layout, dst, dst_layout, self.width as usize);
        }

        target.finalize()
    }
}
