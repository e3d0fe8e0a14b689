use std::io;

use failure::Fail;

use crate::image::{ChannelOrder, ColorModel};
use crate::math::Vector2;

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(
        display = "Invalid channel order {:?} for {}-bit texture data.",
        order, bits
    )]
    DataFormat { order: ChannelOrder, bits: u8 },
    #[fail(display = "Illegal color model {:?}.", _0)]
    IllegalColorModel(ColorModel),
    #[fail(
        display = "Invalid texture update dimensions {:?}, expected {:?}.",
        attempted, expected
    )]
    ResizeMismatch {
        attempted: Vector2<u32>,
        expected: Vector2<u32>,
    },
    #[fail(display = "Out of bounds.")]
    OutOfBounds,
    #[fail(display = "Texture data: {}", _0)]
    TextureData(String),
    #[fail(display = "Unsupported: {}", _0)]
    Unsupported(String),
    #[fail(display = "[GL] {}", _0)]
    Backend(String),
    #[fail(display = "IO: {}", _0)]
    Io(#[cause] io::Error),
}

pub type Result<T> = ::std::result::Result<T, Error>;

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}
