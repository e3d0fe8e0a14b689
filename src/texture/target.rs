//! Adapters between textures and the `ImageSource`/`ImageTarget` seam.

use gl::types::*;

use crate::backends::TexImage;
use crate::errors::*;
use crate::image::{BufferSource, ChannelOrder, DataType, PixelLayout};
use crate::math::Vector2;

use super::base::TextureBase;
use super::introspect;

/// A texture read back into client memory. Its rows are top row first.
pub type TextureImageSource = BufferSource;

/// Decodes an image source into a tightly packed byte buffer which is uploaded to a
/// texture afterwards. Bottom-up textures take their rows in reverse.
pub struct TextureImageTarget<'a> {
    bytes: &'a mut [u8],
    height: u32,
    order: ChannelOrder,
    data_type: DataType,
    row_bytes: usize,
    flip: bool,
}

impl<'a> TextureImageTarget<'a> {
    pub fn new(
        bytes: &'a mut [u8],
        size: Vector2<u32>,
        order: ChannelOrder,
        data_type: DataType,
        flip: bool,
    ) -> Result<Self> {
        let row_bytes = size.x as usize * PixelLayout::from_order(order, data_type).pixel_bytes();
        if bytes.len() < row_bytes * size.y as usize {
            return Err(Error::OutOfBounds);
        }

        Ok(TextureImageTarget {
            bytes,
            height: size.y,
            order,
            data_type,
            row_bytes,
            flip,
        })
    }

    /// Returns the number of bytes an image of `size` takes.
    #[inline]
    pub fn required_bytes(size: Vector2<u32>, order: ChannelOrder, data_type: DataType) -> usize {
        size.x as usize * size.y as usize * PixelLayout::from_order(order, data_type).pixel_bytes()
    }
}

impl<'a> crate::image::ImageTarget for TextureImageTarget<'a> {
    fn channel_order(&self) -> ChannelOrder {
        self.order
    }

    fn data_type(&self) -> DataType {
        self.data_type
    }

    fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let y = if self.flip { self.height - 1 - y } else { y };
        let begin = y as usize * self.row_bytes;
        &mut self.bytes[begin..begin + self.row_bytes]
    }
}

/// Returns the order and type a texture of `internal_format` is read back in.
pub fn read_back_layout(internal_format: GLenum) -> Result<(ChannelOrder, DataType)> {
    let info = introspect::internal_format_info(internal_format);
    if info.compressed {
        return Err(Error::Unsupported(format!(
            "Can not read back compressed format {}.",
            info.name
        )));
    }

    let order = match info.data_format {
        gl::RGBA => ChannelOrder::RGBA,
        gl::BGRA => ChannelOrder::BGRA,
        gl::RGB => ChannelOrder::RGB,
        gl::RG => ChannelOrder::YA,
        gl::RED | gl::DEPTH_COMPONENT => ChannelOrder::Y,
        v if v == crate::backends::ext::LUMINANCE => ChannelOrder::Y,
        v if v == crate::backends::ext::LUMINANCE_ALPHA => ChannelOrder::YA,
        _ => {
            return Err(Error::Unsupported(format!(
                "Can not read back format {}.",
                info.name
            )));
        }
    };

    let data_type = match info.data_type {
        _ if info.data_format == gl::DEPTH_COMPONENT => DataType::F32,
        gl::UNSIGNED_SHORT => DataType::U16,
        gl::FLOAT | gl::HALF_FLOAT => DataType::F32,
        _ => DataType::U8,
    };

    Ok((order, data_type))
}

/// Returns the client format which describes `order` to GL.
fn read_back_format(order: ChannelOrder, internal_format: GLenum) -> GLenum {
    let info = introspect::internal_format_info(internal_format);
    match order {
        ChannelOrder::Y | ChannelOrder::YA => info.data_format,
        ChannelOrder::BGRA => gl::BGRA,
        ChannelOrder::RGB => gl::RGB,
        _ => gl::RGBA,
    }
}

/// Reads a whole 2D image of a texture back. The returned source is top-down whatever
/// the orientation of the texture.
pub fn read_back(
    base: &TextureBase,
    image_target: GLenum,
    level: u32,
    size: Vector2<u32>,
) -> Result<TextureImageSource> {
    let internal_format = base.internal_format();
    let (order, data_type) = read_back_layout(internal_format)?;

    let pixel_type = super::resolve::gl_type(data_type);
    let format = read_back_format(order, internal_format);
    let image = TexImage::level_2d(image_target, level, internal_format, size.x, size.y)
        .with_pixels(format, pixel_type, 1);

    let mut bytes = vec![0; TextureImageTarget::required_bytes(size, order, data_type)];
    base.context()
        .device()
        .read_image(base.id(), &image, &mut bytes)?;

    let source = BufferSource::new(size.x, size.y, order, data_type, bytes);
    Ok(source.with_bottom_up(!base.is_top_down()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{ImageSource, ImageTarget};

    #[test]
    fn flipped_rows() {
        let mut source = BufferSource::new(1, 3, ChannelOrder::Y, DataType::U8, vec![1, 2, 3]);

        let mut bytes = vec![0; 3];
        {
            let size = Vector2::new(1, 3);
            let (order, data_type) = (ChannelOrder::Y, DataType::U8);
            let mut target =
                TextureImageTarget::new(&mut bytes, size, order, data_type, true).unwrap();
            source.load(&mut target).unwrap();
            assert_eq!(target.channel_order(), ChannelOrder::Y);
        }

        assert_eq!(bytes, vec![3, 2, 1]);
        let size = Vector2::new(2, 2);
        let (order, data_type) = (ChannelOrder::Y, DataType::U8);
        assert!(TextureImageTarget::new(&mut bytes, size, order, data_type, false).is_err());
    }

    #[test]
    fn layouts() {
        assert_eq!(
            read_back_layout(gl::RGBA8).unwrap(),
            (ChannelOrder::RGBA, DataType::U8)
        );
        assert_eq!(
            read_back_layout(gl::RG16).unwrap(),
            (ChannelOrder::YA, DataType::U16)
        );
        assert_eq!(
            read_back_layout(gl::RGB16F).unwrap(),
            (ChannelOrder::RGB, DataType::F32)
        );
        assert!(read_back_layout(crate::backends::ext::COMPRESSED_RGBA_S3TC_DXT5).is_err());
    }
}
