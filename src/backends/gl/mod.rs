//! The OpenGL device, issuing commands through the `gl` crate.

pub mod capabilities;
pub mod device;

pub use self::device::GLDevice;
