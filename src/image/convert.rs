//! Pixel row conversion between channel layouts and component types.

use byteorder::{ByteOrder, NativeEndian};

use super::{ChannelOrder, DataType};

/// The meaning of one component inside a pixel.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Slot {
    R,
    G,
    B,
    A,
    /// Padding, ignored when read and written as saturated.
    X,
    /// Gray. Reads expand to red, green and blue; writes take red.
    Y,
}

/// Describes the memory layout of tightly packed pixels.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PixelLayout {
    pub slots: &'static [Slot],
    pub data_type: DataType,
}

impl PixelLayout {
    #[inline]
    pub fn new(slots: &'static [Slot], data_type: DataType) -> Self {
        PixelLayout { slots, data_type }
    }

    #[inline]
    pub fn from_order(order: ChannelOrder, data_type: DataType) -> Self {
        PixelLayout::new(order.slots(), data_type)
    }

    /// Returns the size in bytes of one pixel.
    #[inline]
    pub fn pixel_bytes(&self) -> usize {
        self.slots.len() * self.data_type.size()
    }
}

/// Reads component `index` of `src` as a normalized float.
#[inline]
pub fn read_component(src: &[u8], data_type: DataType, index: usize) -> f32 {
    match data_type {
        DataType::U8 => f32::from(src[index]) / 255.0,
        DataType::U16 => f32::from(NativeEndian::read_u16(&src[index * 2..])) / 65535.0,
        DataType::F32 => NativeEndian::read_f32(&src[index * 4..]),
    }
}

/// Writes a normalized float into component `index` of `dst`.
#[inline]
pub fn write_component(dst: &mut [u8], data_type: DataType, index: usize, v: f32) {
    match data_type {
        DataType::U8 => dst[index] = (v.max(0.0).min(1.0) * 255.0).round() as u8,
        DataType::U16 => {
            let v = (v.max(0.0).min(1.0) * 65535.0).round() as u16;
            NativeEndian::write_u16(&mut dst[index * 2..], v);
        }
        DataType::F32 => NativeEndian::write_f32(&mut dst[index * 4..], v),
    }
}

/// Converts `count` tightly packed pixels from `src` into `dst`.
///
/// Missing color channels read as zero and missing alpha as one.
pub fn convert_pixels(
    src: &[u8],
    src_layout: PixelLayout,
    dst: &mut [u8],
    dst_layout: PixelLayout,
    count: usize,
) {
    let len = count * src_layout.pixel_bytes();
    if src_layout == dst_layout {
        dst[..len].copy_from_slice(&src[..len]);
        return;
    }

    let sn = src_layout.slots.len();
    let dn = dst_layout.slots.len();

    for i in 0..count {
        let mut rgba = [0.0, 0.0, 0.0, 1.0];
        for (c, slot) in src_layout.slots.iter().enumerate() {
            let v = read_component(src, src_layout.data_type, i * sn + c);
            match *slot {
                Slot::R => rgba[0] = v,
                Slot::G => rgba[1] = v,
                Slot::B => rgba[2] = v,
                Slot::A => rgba[3] = v,
                Slot::Y => {
                    rgba[0] = v;
                    rgba[1] = v;
                    rgba[2] = v;
                }
                Slot::X => {}
            }
        }

        for (c, slot) in dst_layout.slots.iter().enumerate() {
            let v = match *slot {
                Slot::R | Slot::Y => rgba[0],
                Slot::G => rgba[1],
                Slot::B => rgba[2],
                Slot::A => rgba[3],
                Slot::X => 1.0,
            };

            write_component(dst, dst_layout.data_type, i * dn + c, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_channels() {
        let src = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let mut dst = [0u8; 8];

        convert_pixels(
            &src,
            PixelLayout::from_order(ChannelOrder::BGRA, DataType::U8),
            &mut dst,
            PixelLayout::from_order(ChannelOrder::RGBA, DataType::U8),
            2,
        );

        assert_eq!(dst, [3, 2, 1, 4, 7, 6, 5, 8]);
    }

    #[test]
    fn expand_and_drop() {
        let src = [10u8, 20, 30];
        let mut dst = [0u8; 4];
        convert_pixels(
            &src,
            PixelLayout::from_order(ChannelOrder::RGB, DataType::U8),
            &mut dst,
            PixelLayout::from_order(ChannelOrder::XBGR, DataType::U8),
            1,
        );
        assert_eq!(dst, [255, 30, 20, 10]);

        let src = [99u8, 7];
        let mut dst = [0u8; 3];
        convert_pixels(
            &src,
            PixelLayout::from_order(ChannelOrder::YA, DataType::U8),
            &mut dst,
            PixelLayout::from_order(ChannelOrder::RGB, DataType::U8),
            1,
        );
        assert_eq!(dst, [99, 99, 99]);
    }

    #[test]
    fn widen() {
        let src = [255u8, 0];
        let mut dst = [0u8; 4];
        convert_pixels(
            &src,
            PixelLayout::from_order(ChannelOrder::YA, DataType::U8),
            &mut dst,
            PixelLayout::from_order(ChannelOrder::YA, DataType::U16),
            1,
        );

        assert_eq!(NativeEndian::read_u16(&dst[0..]), 65535);
        assert_eq!(NativeEndian::read_u16(&dst[2..]), 0);
    }
}
