//! Resolves the pixel data a texture is created from into GL storage and upload
//! parameters.
//!
//! Three things are decided here: the internal format the texture is allocated with, the
//! client format and type which describe the uploaded pixels, and whether those pixels
//! have to be copied into an intermediate buffer first.

use gl::types::*;

use crate::backends::{ext, Capabilities};
use crate::errors::*;
use crate::image::{ChannelOrder, ColorModel, DataType, ImageSource};

use super::format::{SwizzleMask, SWIZZLE_GRAY, SWIZZLE_GRAY_ALPHA};

/// Returns the internal format of color images, chosen by component type and alpha.
pub fn color_internal_format(
    caps: &Capabilities,
    data_type: DataType,
    has_alpha: bool,
) -> GLenum {
    if !caps.has_sized_internal_formats() {
        return if has_alpha { gl::RGBA } else { gl::RGB };
    }

    match (data_type, has_alpha) {
        (DataType::U8, true) => gl::RGBA8,
        (DataType::U8, false) => gl::RGB8,
        (DataType::U16, true) => gl::RGBA16,
        (DataType::U16, false) => gl::RGB16,
        (DataType::F32, true) => gl::RGBA32F,
        (DataType::F32, false) => gl::RGB32F,
    }
}

/// Returns the internal format of gray images and the swizzle which expands it to RGBA.
///
/// Modern contexts store gray in red (and alpha in green) formats, legacy contexts fall
/// back to luminance formats which need no swizzle.
pub fn gray_internal_format(
    caps: &Capabilities,
    data_type: DataType,
    has_alpha: bool,
) -> (GLenum, Option<SwizzleMask>) {
    if caps.is_legacy() {
        let internal_format = if has_alpha {
            ext::LUMINANCE_ALPHA
        } else {
            ext::LUMINANCE
        };

        return (internal_format, None);
    }

    let internal_format = red_internal_format(data_type, has_alpha);
    let swizzle = if has_alpha {
        SWIZZLE_GRAY_ALPHA
    } else {
        SWIZZLE_GRAY
    };

    (internal_format, Some(swizzle))
}

/// Returns the sized red (or red-green) internal format of a component type.
fn red_internal_format(data_type: DataType, green: bool) -> GLenum {
    match (data_type, green) {
        (DataType::U8, false) => gl::R8,
        (DataType::U8, true) => gl::RG8,
        (DataType::U16, false) => gl::R16,
        (DataType::U16, true) => gl::RG16,
        (DataType::F32, false) => gl::R32F,
        (DataType::F32, true) => gl::RG32F,
    }
}

/// Returns the client format and type of gray pixels.
pub fn gray_client_format(
    caps: &Capabilities,
    data_type: DataType,
    has_alpha: bool,
) -> (GLenum, GLenum) {
    let format = match (caps.is_legacy(), has_alpha) {
        (true, false) => ext::LUMINANCE,
        (true, true) => ext::LUMINANCE_ALPHA,
        (false, false) => gl::RED,
        (false, true) => gl::RG,
    };

    (format, gl_type(data_type))
}

#[inline]
pub fn gl_type(data_type: DataType) -> GLenum {
    match data_type {
        DataType::U8 => gl::UNSIGNED_BYTE,
        DataType::U16 => gl::UNSIGNED_SHORT,
        DataType::F32 => gl::FLOAT,
    }
}

/// Returns the client format and type which upload pixels in `order` as they are.
///
/// Only a few orders can be described to GL directly: `RGB`, `RGBA`, `RGBX`, `BGRA` and
/// `BGRX` for 8-bit components, `RGB` and `RGBA` for wider ones.
pub fn client_format(order: ChannelOrder, data_type: DataType) -> Result<(GLenum, GLenum)> {
    let format = match (data_type, order) {
        (DataType::U8, ChannelOrder::RGB) => gl::RGB,
        (DataType::U8, ChannelOrder::RGBA) | (DataType::U8, ChannelOrder::RGBX) => gl::RGBA,
        (DataType::U8, ChannelOrder::BGRA) | (DataType::U8, ChannelOrder::BGRX) => gl::BGRA,
        (_, ChannelOrder::RGB) => gl::RGB,
        (_, ChannelOrder::RGBA) => gl::RGBA,
        _ => {
            return Err(Error::DataFormat {
                order,
                bits: data_type.bits(),
            });
        }
    };

    Ok((format, gl_type(data_type)))
}

/// Returns the component type closest to a client pixel type.
pub fn data_type_of(pixel_type: GLenum) -> DataType {
    match pixel_type {
        gl::UNSIGNED_SHORT | gl::SHORT => DataType::U16,
        gl::FLOAT | gl::HALF_FLOAT => DataType::F32,
        _ => DataType::U8,
    }
}

/// Returns the internal format and swizzle raw pixels of a client format and type are
/// stored in by default. Red and red-green pixels keep their channels, luminance pixels
/// are stored as gray.
pub fn bytes_internal_format(
    caps: &Capabilities,
    format: GLenum,
    pixel_type: GLenum,
) -> (GLenum, Option<SwizzleMask>) {
    let data_type = data_type_of(pixel_type);
    let sized = caps.has_sized_internal_formats();

    match format {
        ext::LUMINANCE => gray_internal_format(caps, data_type, false),
        ext::LUMINANCE_ALPHA => gray_internal_format(caps, data_type, true),
        gl::RED | gl::RG if !sized => (format, None),
        gl::RED => (red_internal_format(data_type, false), None),
        gl::RG => (red_internal_format(data_type, true), None),
        gl::RGB | gl::BGR => (color_internal_format(caps, data_type, false), None),
        gl::RGBA | gl::BGRA => (color_internal_format(caps, data_type, true), None),
        gl::DEPTH_COMPONENT => (gl::DEPTH_COMPONENT, None),
        v => {
            warn!(
                "No default internal format for client format {:#x}, assuming GL_RGBA.",
                v
            );

            (color_internal_format(caps, DataType::U8, true), None)
        }
    }
}

/// How the pixels of a surface reach the texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UploadPlan {
    pub format: GLenum,
    pub pixel_type: GLenum,
    /// The order of the intermediate copy, if one is needed.
    pub intermediate: Option<ChannelOrder>,
    /// The rows of the intermediate copy are reversed.
    pub flip: bool,
}

/// Plans the upload of a surface in `order`.
///
/// An intermediate copy, tightly packed in `RGBA` or `RGB` and with its rows reversed if
/// needed, is made when the rows have to be flipped, when they are padded, or when GL can
/// not take the channel order as it is. Gray orders have no color intermediate.
pub fn plan_surface_upload(
    order: ChannelOrder,
    data_type: DataType,
    tight: bool,
    flip: bool,
) -> Result<UploadPlan> {
    let intermediate = ChannelOrder::color(order.has_alpha());

    match client_format(order, data_type) {
        Ok((format, pixel_type)) => {
            if tight && !flip {
                return Ok(UploadPlan {
                    format,
                    pixel_type,
                    intermediate: None,
                    flip: false,
                });
            }
        }
        Err(err) => {
            if order.is_gray() {
                return Err(err);
            }
        }
    }

    let (format, pixel_type) = client_format(intermediate, data_type)?;
    Ok(UploadPlan {
        format,
        pixel_type,
        intermediate: Some(intermediate),
        flip,
    })
}

/// Returns the order an image source is decoded in, `RGB(A)` or gray with or without
/// alpha.
pub fn source_order(source: &dyn ImageSource) -> Result<ChannelOrder> {
    match source.color_model() {
        ColorModel::Rgb => Ok(ChannelOrder::color(source.has_alpha())),
        ColorModel::Gray => Ok(ChannelOrder::gray(source.has_alpha())),
        v => Err(Error::IllegalColorModel(v)),
    }
}

/// Returns the internal format and swizzle an image source is stored in by default.
pub fn source_internal_format(
    caps: &Capabilities,
    source: &dyn ImageSource,
) -> Result<(GLenum, Option<SwizzleMask>)> {
    let order = source_order(source)?;
    let data_type = source.data_type();

    if order.is_gray() {
        Ok(gray_internal_format(caps, data_type, order.has_alpha()))
    } else {
        Ok((color_internal_format(caps, data_type, order.has_alpha()), None))
    }
}

/// Returns the client format and type of pixels an image source is decoded into.
pub fn source_client_format(
    caps: &Capabilities,
    order: ChannelOrder,
    data_type: DataType,
) -> (GLenum, GLenum) {
    if order.is_gray() {
        gray_client_format(caps, data_type, order.has_alpha())
    } else {
        let format = if order.has_alpha() { gl::RGBA } else { gl::RGB };
        (format, gl_type(data_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{Device, Extensions, HeadlessDevice, Profile, Version};
    use crate::image::BufferSource;

    fn legacy() -> Capabilities {
        Capabilities {
            version: Version::ES(2, 0),
            vendor: String::new(),
            renderer: String::new(),
            extensions: Extensions::default(),
            profile: Some(Profile::Compatibility),
            max_texture_size: 2048,
            max_combined_texture_image_units: 8,
            max_anisotropy: 1.0,
        }
    }

    #[test]
    fn internal_formats() {
        let device = HeadlessDevice::new();
        let caps = device.capabilities();

        assert_eq!(color_internal_format(caps, DataType::U8, true), gl::RGBA8);
        assert_eq!(color_internal_format(caps, DataType::U16, false), gl::RGB16);
        assert_eq!(color_internal_format(caps, DataType::F32, true), gl::RGBA32F);
        assert_eq!(
            gray_internal_format(caps, DataType::U8, false),
            (gl::R8, Some(SWIZZLE_GRAY))
        );
        assert_eq!(
            gray_internal_format(caps, DataType::F32, true),
            (gl::RG32F, Some(SWIZZLE_GRAY_ALPHA))
        );

        let caps = legacy();
        assert_eq!(color_internal_format(&caps, DataType::U8, true), gl::RGBA);
        assert_eq!(
            gray_internal_format(&caps, DataType::U8, false),
            (ext::LUMINANCE, None)
        );
        assert_eq!(
            gray_client_format(&caps, DataType::U8, true),
            (ext::LUMINANCE_ALPHA, gl::UNSIGNED_BYTE)
        );
    }

    #[test]
    fn bytes() {
        let device = HeadlessDevice::new();
        let caps = device.capabilities();

        assert_eq!(
            bytes_internal_format(caps, gl::BGRA, gl::UNSIGNED_BYTE),
            (gl::RGBA8, None)
        );
        assert_eq!(
            bytes_internal_format(caps, gl::RG, gl::FLOAT),
            (gl::RG32F, None)
        );
        assert_eq!(
            bytes_internal_format(caps, ext::LUMINANCE, gl::UNSIGNED_SHORT),
            (gl::R16, Some(SWIZZLE_GRAY))
        );
        assert_eq!(
            bytes_internal_format(caps, gl::RGBA_INTEGER, gl::UNSIGNED_BYTE),
            (gl::RGBA8, None)
        );
        assert_eq!(
            bytes_internal_format(&legacy(), gl::RED, gl::UNSIGNED_BYTE),
            (gl::RED, None)
        );
    }

    #[test]
    fn whitelist() {
        assert_eq!(
            client_format(ChannelOrder::BGRX, DataType::U8).unwrap(),
            (gl::BGRA, gl::UNSIGNED_BYTE)
        );
        assert_eq!(
            client_format(ChannelOrder::RGB, DataType::F32).unwrap(),
            (gl::RGB, gl::FLOAT)
        );

        match client_format(ChannelOrder::BGRA, DataType::U16) {
            Err(Error::DataFormat { order, bits }) => {
                assert_eq!(order, ChannelOrder::BGRA);
                assert_eq!(bits, 16);
            }
            v => panic!("unexpected {:?}", v),
        }
    }

    #[test]
    fn plans() {
        let plan = plan_surface_upload(ChannelOrder::RGBA, DataType::U8, true, false).unwrap();
        assert_eq!(plan.intermediate, None);

        let plan = plan_surface_upload(ChannelOrder::RGBA, DataType::U8, true, true).unwrap();
        assert_eq!(plan.intermediate, Some(ChannelOrder::RGBA));
        assert!(plan.flip);

        let plan = plan_surface_upload(ChannelOrder::BGRA, DataType::U8, false, false).unwrap();
        assert_eq!(plan.intermediate, Some(ChannelOrder::RGBA));
        assert_eq!(plan.format, gl::RGBA);

        let plan = plan_surface_upload(ChannelOrder::XRGB, DataType::U8, true, false).unwrap();
        assert_eq!(plan.intermediate, Some(ChannelOrder::RGB));
        assert_eq!(plan.format, gl::RGB);

        let plan = plan_surface_upload(ChannelOrder::ARGB, DataType::U16, true, false).unwrap();
        assert_eq!(plan.intermediate, Some(ChannelOrder::RGBA));
        assert_eq!((plan.format, plan.pixel_type), (gl::RGBA, gl::UNSIGNED_SHORT));

        let plan = plan_surface_upload(ChannelOrder::BGR, DataType::F32, true, true).unwrap();
        assert_eq!(plan.intermediate, Some(ChannelOrder::RGB));
        assert_eq!(plan.pixel_type, gl::FLOAT);

        assert!(plan_surface_upload(ChannelOrder::Y, DataType::U16, true, false).is_err());
    }

    #[test]
    fn color_models() {
        let source = BufferSource::new(1, 1, ChannelOrder::YA, DataType::U8, vec![0, 0]);
        assert_eq!(source_order(&source).unwrap(), ChannelOrder::YA);

        struct Cmyk;
        impl ImageSource for Cmyk {
            fn width(&self) -> u32 {
                1
            }
            fn height(&self) -> u32 {
                1
            }
            fn color_model(&self) -> ColorModel {
                ColorModel::Cmyk
            }
            fn data_type(&self) -> DataType {
                DataType::U8
            }
            fn has_alpha(&self) -> bool {
                false
            }
            fn load(&mut self, _: &mut dyn crate::image::ImageTarget) -> Result<()> {
                Ok(())
            }
        }

        match source_internal_format(&legacy(), &Cmyk) {
            Err(Error::IllegalColorModel(ColorModel::Cmyk)) => {}
            v => panic!("unexpected {:?}", v),
        }
    }
}
