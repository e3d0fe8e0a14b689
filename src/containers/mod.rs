//! Parsers of compressed texture containers. Both produce a `TextureData` holding every
//! mipmap level of the first image of the file.

pub mod dds;
pub mod ktx;

use std::io;

use crate::errors::*;

fn truncated(_: io::Error) -> Error {
    Error::TextureData("unexpected end of data".into())
}
