use std::fmt::Debug;
use std::{mem, slice};

use gl::types::*;

use super::DataType;

/// A single pixel component. Surfaces, channels and the texture upload paths are generic
/// over this trait, which carries everything the three variants differ in: the element
/// size, the GL pixel type and the mapping to normalized values.
pub trait Component: Copy + Default + PartialEq + Debug + 'static {
    const DATA_TYPE: DataType;
    const GL_TYPE: GLenum;

    /// The value of a fully saturated component.
    fn max_value() -> Self;

    fn to_normalized(self) -> f32;

    fn from_normalized(v: f32) -> Self;

    #[inline]
    fn bits() -> u8 {
        Self::DATA_TYPE.bits()
    }
}

impl Component for u8 {
    const DATA_TYPE: DataType = DataType::U8;
    const GL_TYPE: GLenum = gl::UNSIGNED_BYTE;

    #[inline]
    fn max_value() -> Self {
        ::std::u8::MAX
    }

    #[inline]
    fn to_normalized(self) -> f32 {
        f32::from(self) / 255.0
    }

    #[inline]
    fn from_normalized(v: f32) -> Self {
        (v.max(0.0).min(1.0) * 255.0).round() as u8
    }
}

impl Component for u16 {
    const DATA_TYPE: DataType = DataType::U16;
    const GL_TYPE: GLenum = gl::UNSIGNED_SHORT;

    #[inline]
    fn max_value() -> Self {
        ::std::u16::MAX
    }

    #[inline]
    fn to_normalized(self) -> f32 {
        f32::from(self) / 65535.0
    }

    #[inline]
    fn from_normalized(v: f32) -> Self {
        (v.max(0.0).min(1.0) * 65535.0).round() as u16
    }
}

impl Component for f32 {
    const DATA_TYPE: DataType = DataType::F32;
    const GL_TYPE: GLenum = gl::FLOAT;

    #[inline]
    fn max_value() -> Self {
        1.0
    }

    #[inline]
    fn to_normalized(self) -> f32 {
        self
    }

    #[inline]
    fn from_normalized(v: f32) -> Self {
        v
    }
}

/// Reinterprets a slice of components as raw bytes.
#[inline]
pub fn as_bytes<T: Component>(v: &[T]) -> &[u8] {
    // Components are plain integers or floats without padding.
    unsafe { slice::from_raw_parts(v.as_ptr() as *const u8, v.len() * mem::size_of::<T>()) }
}

/// Reinterprets a mutable slice of components as raw bytes.
#[inline]
pub fn as_bytes_mut<T: Component>(v: &mut [T]) -> &mut [u8] {
    unsafe { slice::from_raw_parts_mut(v.as_mut_ptr() as *mut u8, v.len() * mem::size_of::<T>()) }
}
