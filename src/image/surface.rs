//! In-memory images. A `Surface` holds multi-channel pixels in one of the color
//! `ChannelOrder`s, a `Channel` holds a single gray channel. Both are stored top row first
//! and may carry padded rows.

use crate::errors::*;
use crate::math::{Area, Point2, Vector2};

use super::component::{self, Component};
use super::convert::{convert_pixels, PixelLayout};
use super::source::{BufferSource, ImageSource, ImageTarget};
use super::{ChannelOrder, DataType};

pub type Surface8u = Surface<u8>;
pub type Surface16u = Surface<u16>;
pub type Surface32f = Surface<f32>;

pub type Channel8u = Channel<u8>;
pub type Channel16u = Channel<u16>;
pub type Channel32f = Channel<f32>;

#[derive(Debug, Clone, PartialEq)]
pub struct Surface<T: Component> {
    width: u32,
    height: u32,
    row_stride: usize,
    order: ChannelOrder,
    premultiplied: bool,
    data: Vec<T>,
}

impl<T: Component> Surface<T> {
    /// Creates a zeroed surface in `RGBA` or `RGB` order.
    pub fn new(width: u32, height: u32, has_alpha: bool) -> Self {
        Self::with_order(width, height, ChannelOrder::color(has_alpha))
    }

    /// Creates a zeroed, tightly packed surface in `order`.
    ///
    /// # Panics
    ///
    /// If `order` is a gray order, which surfaces do not represent.
    pub fn with_order(width: u32, height: u32, order: ChannelOrder) -> Self {
        assert!(!order.is_gray(), "Surfaces can not be gray, use `Channel`.");

        let row_stride = width as usize * order.channels();
        Surface {
            width,
            height,
            row_stride,
            order,
            premultiplied: false,
            data: vec![T::default(); row_stride * height as usize],
        }
    }

    /// Creates a zeroed surface whose rows are `row_stride` components apart.
    pub fn with_stride(
        width: u32,
        height: u32,
        order: ChannelOrder,
        row_stride: usize,
    ) -> Result<Self> {
        if order.is_gray() || row_stride < width as usize * order.channels() {
            return Err(Error::OutOfBounds);
        }

        Ok(Surface {
            width,
            height,
            row_stride,
            order,
            premultiplied: false,
            data: vec![T::default(); row_stride * height as usize],
        })
    }

    /// Wraps tightly packed pixels.
    pub fn from_data(width: u32, height: u32, order: ChannelOrder, data: Vec<T>) -> Result<Self> {
        let row_stride = width as usize * order.channels();
        if order.is_gray() || data.len() != row_stride * height as usize {
            return Err(Error::OutOfBounds);
        }

        Ok(Surface {
            width,
            height,
            row_stride,
            order,
            premultiplied: false,
            data,
        })
    }

    /// Creates a surface with every pixel set to `pixel`.
    pub fn filled(width: u32, height: u32, order: ChannelOrder, pixel: &[T]) -> Self {
        let mut surface = Self::with_order(width, height, order);
        for y in 0..height {
            for x in 0..width {
                surface.set_pixel(x, y, pixel);
            }
        }
        surface
    }

    /// Decodes an image source into a new surface, in `RGBA` or `RGB` order.
    pub fn from_source(source: &mut dyn ImageSource) -> Result<Self> {
        let order = ChannelOrder::color(source.has_alpha());
        let mut surface = Self::with_order(source.width(), source.height(), order);
        surface.premultiplied = source.is_premultiplied();
        source.load(&mut SurfaceTarget(&mut surface))?;
        Ok(surface)
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
    pub fn size(&self) -> Vector2<u32> {
        Vector2::new(self.width, self.height)
    }

    #[inline]
    pub fn bounds(&self) -> Area {
        Area::new(
            Point2::new(0, 0),
            Point2::new(self.width as i32, self.height as i32),
        )
    }

    #[inline]
    pub fn channel_order(&self) -> ChannelOrder {
        self.order
    }

    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.order.has_alpha()
    }

    #[inline]
    pub fn is_premultiplied(&self) -> bool {
        self.premultiplied
    }

    #[inline]
    pub fn set_premultiplied(&mut self, premultiplied: bool) {
        self.premultiplied = premultiplied;
    }

    /// Returns the size in bytes of one pixel.
    #[inline]
    pub fn pixel_bytes(&self) -> usize {
        self.order.channels() * T::DATA_TYPE.size()
    }

    /// Returns the distance in components between two rows.
    #[inline]
    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    /// Returns the distance in bytes between two rows.
    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.row_stride * T::DATA_TYPE.size()
    }

    #[inline]
    pub fn row(&self, y: u32) -> &[T] {
        let begin = y as usize * self.row_stride;
        &self.data[begin..begin + self.width as usize * self.order.channels()]
    }

    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [T] {
        let begin = y as usize * self.row_stride;
        let len = self.width as usize * self.order.channels();
        &mut self.data[begin..begin + len]
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[T] {
        let n = self.order.channels();
        let begin = y as usize * self.row_stride + x as usize * n;
        &self.data[begin..begin + n]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: &[T]) {
        let n = self.order.channels();
        let begin = y as usize * self.row_stride + x as usize * n;
        self.data[begin..begin + n].copy_from_slice(&pixel[..n]);
    }

    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        component::as_bytes(&self.data)
    }

    /// Copies `area` into a new, tightly packed surface in `order`. When `flip` is set the
    /// rows of the copy are in reverse order.
    pub fn converted(&self, area: Area, order: ChannelOrder, flip: bool) -> Result<Self> {
        if area.min.x < 0 || area.min.y < 0 || !self.bounds().contains(&area) {
            return Err(Error::OutOfBounds);
        }

        let (w, h) = (area.width() as u32, area.height() as u32);
        let mut dst = Self::with_order(w, h, order);
        dst.premultiplied = self.premultiplied;

        let src_layout = PixelLayout::from_order(self.order, T::DATA_TYPE);
        let dst_layout = PixelLayout::from_order(order, T::DATA_TYPE);
        let pixel_bytes = self.pixel_bytes();

        for y in 0..h {
            let sy = area.min.y as u32 + y;
            let dy = if flip { h - 1 - y } else { y };

            let src = component::as_bytes(self.row(sy));
            let src = &src[area.min.x as usize * pixel_bytes..];
            let dst_row = component::as_bytes_mut(dst.row_mut(dy));
            convert_pixels(src, src_layout, dst_row, dst_layout, w as usize);
        }

        Ok(dst)
    }

    /// Returns a copy of this surface turned upside down and mirrored.
    pub fn rotated_180(&self) -> Self {
        let mut dst = Self::with_order(self.width, self.height, self.order);
        for y in 0..self.height {
            for x in 0..self.width {
                dst.set_pixel(self.width - 1 - x, self.height - 1 - y, self.pixel(x, y));
            }
        }
        dst
    }

    /// Wraps a copy of this surface into an image source.
    pub fn to_source(&self) -> BufferSource {
        let tight = if self.row_stride == self.width as usize * self.order.channels() {
            self.as_bytes().to_vec()
        } else {
            self.converted(self.bounds(), self.order, false)
                .map(|v| v.as_bytes().to_vec())
                .unwrap_or_default()
        };

        BufferSource::new(self.width, self.height, self.order, T::DATA_TYPE, tight)
            .with_premultiplied(self.premultiplied)
    }
}

struct SurfaceTarget<'a, T: Component>(&'a mut Surface<T>);

impl<'a, T: Component> ImageTarget for SurfaceTarget<'a, T> {
    fn channel_order(&self) -> ChannelOrder {
        self.0.order
    }

    fn data_type(&self) -> DataType {
        T::DATA_TYPE
    }

    fn row_mut(&mut self, y: u32) -> &mut [u8] {
        component::as_bytes_mut(self.0.row_mut(y))
    }
}

/// A single-channel gray image.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel<T: Component> {
    width: u32,
    height: u32,
    row_stride: usize,
    data: Vec<T>,
}

impl<T: Component> Channel<T> {
    pub fn new(width: u32, height: u32) -> Self {
        Channel {
            width,
            height,
            row_stride: width as usize,
            data: vec![T::default(); width as usize * height as usize],
        }
    }

    pub fn with_stride(width: u32, height: u32, row_stride: usize) -> Result<Self> {
        if row_stride < width as usize {
            return Err(Error::OutOfBounds);
        }

        Ok(Channel {
            width,
            height,
            row_stride,
            data: vec![T::default(); row_stride * height as usize],
        })
    }

    pub fn from_data(width: u32, height: u32, data: Vec<T>) -> Result<Self> {
        if data.len() != width as usize * height as usize {
            return Err(Error::OutOfBounds);
        }

        Ok(Channel {
            width,
            height,
            row_stride: width as usize,
            data,
        })
    }

    /// Decodes an image source into a new channel, keeping only its gray value.
    pub fn from_source(source: &mut dyn ImageSource) -> Result<Self> {
        let mut channel = Self::new(source.width(), source.height());
        source.load(&mut ChannelTarget(&mut channel))?;
        Ok(channel)
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
    pub fn size(&self) -> Vector2<u32> {
        Vector2::new(self.width, self.height)
    }

    #[inline]
    pub fn bounds(&self) -> Area {
        Area::new(
            Point2::new(0, 0),
            Point2::new(self.width as i32, self.height as i32),
        )
    }

    #[inline]
    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.row_stride * T::DATA_TYPE.size()
    }

    #[inline]
    pub fn row(&self, y: u32) -> &[T] {
        let begin = y as usize * self.row_stride;
        &self.data[begin..begin + self.width as usize]
    }

    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [T] {
        let begin = y as usize * self.row_stride;
        let len = self.width as usize;
        &mut self.data[begin..begin + len]
    }

    #[inline]
    pub fn value(&self, x: u32, y: u32) -> T {
        self.data[y as usize * self.row_stride + x as usize]
    }

    #[inline]
    pub fn set_value(&mut self, x: u32, y: u32, v: T) {
        self.data[y as usize * self.row_stride + x as usize] = v;
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        component::as_bytes(&self.data)
    }

    /// Copies `area` into a new, tightly packed channel, optionally with its rows reversed.
    pub fn converted(&self, area: Area, flip: bool) -> Result<Self> {
        if area.min.x < 0 || area.min.y < 0 || !self.bounds().contains(&area) {
            return Err(Error::OutOfBounds);
        }

        let (w, h) = (area.width() as u32, area.height() as u32);
        let mut dst = Self::new(w, h);
        for y in 0..h {
            let sy = area.min.y as u32 + y;
            let dy = if flip { h - 1 - y } else { y };
            let x0 = area.min.x as usize;
            let src = &self.row(sy)[x0..x0 + w as usize];
            dst.row_mut(dy).copy_from_slice(src);
        }

        Ok(dst)
    }

    /// Wraps a copy of this channel into a gray image source.
    pub fn to_source(&self) -> BufferSource {
        let len = self.width as usize * self.height as usize * T::DATA_TYPE.size();
        let mut bytes = Vec::with_capacity(len);
        for y in 0..self.height {
            bytes.extend_from_slice(component::as_bytes(self.row(y)));
        }

        BufferSource::new(self.width, self.height, ChannelOrder::Y, T::DATA_TYPE, bytes)
    }
}

struct ChannelTarget<'a, T: Component>(&'a mut Channel<T>);

impl<'a, T: Component> ImageTarget for ChannelTarget<'a, T> {
    fn channel_order(&self) -> ChannelOrder {
        ChannelOrder::Y
    }

    fn data_type(&self) -> DataType {
        T::DATA_TYPE
    }

    fn row_mut(&mut self, y: u32) -> &mut [u8] {
        component::as_bytes_mut(self.0.row_mut(y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_rows() {
        let mut surface = Surface8u::with_stride(2, 2, ChannelOrder::RGB, 8).unwrap();
        assert_eq!(surface.row_bytes(), 8);
        assert_eq!(surface.pixel_bytes(), 3);

        surface.set_pixel(1, 1, &[1, 2, 3]);
        assert_eq!(surface.row(1), &[0, 0, 0, 1, 2, 3]);

        let tight = surface
            .converted(surface.bounds(), ChannelOrder::RGBA, true)
            .unwrap();
        assert_eq!(tight.row_bytes(), 8);
        assert_eq!(tight.pixel(1, 0), &[1, 2, 3, 255]);

        assert!(Surface8u::with_stride(4, 4, ChannelOrder::RGBA, 15).is_err());
    }

    #[test]
    fn sub_area() {
        let mut surface = Surface16u::new(4, 4, false);
        surface.set_pixel(3, 2, &[7, 8, 9]);

        let area = Area::with_size(2, 2, 2, 2);
        let sub = surface.converted(area, ChannelOrder::BGR, false).unwrap();
        assert_eq!(sub.size(), Vector2::new(2, 2));
        assert_eq!(sub.pixel(1, 0), &[9, 8, 7]);

        let outside = Area::with_size(3, 3, 2, 2);
        assert!(surface.converted(outside, ChannelOrder::RGB, false).is_err());
    }

    #[test]
    fn rotate() {
        let mut surface = Surface8u::new(2, 1, true);
        surface.set_pixel(0, 0, &[1, 1, 1, 1]);
        let rotated = surface.rotated_180();
        assert_eq!(rotated.pixel(1, 0), &[1, 1, 1, 1]);
        assert_eq!(rotated.pixel(0, 0), &[0, 0, 0, 0]);
    }

    #[test]
    fn source_round_trip() {
        let mut surface = Surface8u::with_order(3, 2, ChannelOrder::BGRA);
        surface.set_pixel(2, 1, &[10, 20, 30, 40]);

        let decoded = Surface8u::from_source(&mut surface.to_source()).unwrap();
        assert_eq!(decoded.channel_order(), ChannelOrder::RGBA);
        assert_eq!(decoded.pixel(2, 1), &[30, 20, 10, 40]);

        let mut channel = Channel32f::new(2, 2);
        channel.set_value(1, 0, 0.25);
        let decoded = Channel32f::from_source(&mut channel.to_source()).unwrap();
        assert_eq!(decoded, channel);
    }
}
