//! CPU-side images: pixel components, channel layouts, in-memory surfaces and the
//! pull-based `ImageSource`/`ImageTarget` seam used to decode images into textures and
//! to read textures back.

pub mod component;
pub mod convert;
pub mod source;
pub mod surface;

pub use self::component::Component;
pub use self::convert::{convert_pixels, read_component, write_component, PixelLayout, Slot};
pub use self::source::{BufferSource, ImageSource, ImageTarget};
pub use self::surface::{
    Channel, Channel16u, Channel32f, Channel8u, Surface, Surface16u, Surface32f, Surface8u,
};

/// The arrangement of channels of a pixel in memory. `X` marks a padding channel which is
/// ignored when reading and written as fully opaque. `Y` is a gray (luminance) channel.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum ChannelOrder {
    RGBA,
    BGRA,
    ARGB,
    ABGR,
    RGBX,
    BGRX,
    XRGB,
    XBGR,
    RGB,
    BGR,
    Y,
    YA,
}

impl ChannelOrder {
    /// Returns the channel slots, in memory order.
    pub fn slots(self) -> &'static [Slot] {
        use self::Slot::*;

        match self {
            ChannelOrder::RGBA => &[R, G, B, A],
            ChannelOrder::BGRA => &[B, G, R, A],
            ChannelOrder::ARGB => &[A, R, G, B],
            ChannelOrder::ABGR => &[A, B, G, R],
            ChannelOrder::RGBX => &[R, G, B, X],
            ChannelOrder::BGRX => &[B, G, R, X],
            ChannelOrder::XRGB => &[X, R, G, B],
            ChannelOrder::XBGR => &[X, B, G, R],
            ChannelOrder::RGB => &[R, G, B],
            ChannelOrder::BGR => &[B, G, R],
            ChannelOrder::Y => &[Y],
            ChannelOrder::YA => &[Y, A],
        }
    }

    /// Returns the number of components of a pixel.
    #[inline]
    pub fn channels(self) -> usize {
        self.slots().len()
    }

    #[inline]
    pub fn has_alpha(self) -> bool {
        self.slots().contains(&Slot::A)
    }

    #[inline]
    pub fn is_gray(self) -> bool {
        self == ChannelOrder::Y || self == ChannelOrder::YA
    }

    /// The default color order for images with or without alpha.
    #[inline]
    pub fn color(has_alpha: bool) -> Self {
        if has_alpha {
            ChannelOrder::RGBA
        } else {
            ChannelOrder::RGB
        }
    }

    /// The default gray order for images with or without alpha.
    #[inline]
    pub fn gray(has_alpha: bool) -> Self {
        if has_alpha {
            ChannelOrder::YA
        } else {
            ChannelOrder::Y
        }
    }
}

/// The color model an image source reports.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum ColorModel {
    Rgb,
    Gray,
    Cmyk,
    Hsv,
    Unknown,
}

/// The type of a single pixel component.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum DataType {
    U8,
    U16,
    F32,
}

impl DataType {
    /// Returns the size in bytes of one component.
    #[inline]
    pub fn size(self) -> usize {
        match self {
            DataType::U8 => 1,
            DataType::U16 => 2,
            DataType::F32 => 4,
        }
    }

    #[inline]
    pub fn bits(self) -> u8 {
        (self.size() * 8) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_orders() {
        assert_eq!(ChannelOrder::RGBA.channels(), 4);
        assert_eq!(ChannelOrder::BGR.channels(), 3);
        assert_eq!(ChannelOrder::YA.channels(), 2);

        assert!(ChannelOrder::ARGB.has_alpha());
        assert!(!ChannelOrder::RGBX.has_alpha());
        assert!(ChannelOrder::YA.is_gray());
        assert!(!ChannelOrder::RGB.is_gray());

        assert_eq!(ChannelOrder::color(true), ChannelOrder::RGBA);
        assert_eq!(ChannelOrder::gray(false), ChannelOrder::Y);
    }
}
