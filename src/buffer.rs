//! Pixel buffer objects, used to stage texture uploads.

use gl::types::*;

use crate::backends::BufferId;
use crate::context::Context;
use crate::errors::*;

/// Hint how the contents of a buffer are going to be written and used.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BufferUsage {
    /// Written once, used a few times.
    Stream,
    /// Written once, used many times.
    Static,
    /// Written repeatedly, used many times.
    Dynamic,
}

impl Default for BufferUsage {
    fn default() -> Self {
        BufferUsage::Stream
    }
}

impl From<BufferUsage> for GLenum {
    fn from(usage: BufferUsage) -> Self {
        match usage {
            BufferUsage::Stream => gl::STREAM_DRAW,
            BufferUsage::Static => gl::STATIC_DRAW,
            BufferUsage::Dynamic => gl::DYNAMIC_DRAW,
        }
    }
}

/// A pinned transfer buffer (`GL_PIXEL_UNPACK_BUFFER`). Pixels written into it can be
/// uploaded to textures without passing through client memory again.
#[derive(Debug)]
pub struct PixelBuffer {
    ctx: Context,
    id: BufferId,
    size: usize,
    usage: BufferUsage,
}

impl PixelBuffer {
    pub fn new(ctx: &Context, size: usize, usage: BufferUsage) -> Result<Self> {
        if !ctx.capabilities().has_pixel_buffer() {
            return Err(Error::Unsupported(
                "Pixel buffer objects are not available.".into(),
            ));
        }

        let id = ctx
            .device()
            .create_buffer(gl::PIXEL_UNPACK_BUFFER, size, usage.into())?;

        debug!("Created pixel buffer {} of {} bytes.", id, size);
        Ok(PixelBuffer {
            ctx: ctx.clone(),
            id,
            size,
            usage,
        })
    }

    #[inline]
    pub fn id(&self) -> BufferId {
        self.id
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Copies `bytes` into the buffer, starting at `offset`.
    pub fn write(&self, offset: usize, bytes: &[u8]) -> Result<()> {
        if offset + bytes.len() > self.size {
            return Err(Error::OutOfBounds);
        }

        self.ctx.device().buffer_sub_data(self.id, offset, bytes)
    }

    /// Maps the buffer and passes its contents to `func`. Returns `false` without calling
    /// `func` if the driver refused to map it.
    pub fn map<F>(&self, mut func: F) -> Result<bool>
    where
        F: FnMut(&mut [u8]),
    {
        self.ctx.device().map_buffer(self.id, &mut func)
    }
}

impl Drop for PixelBuffer {
    fn drop(&mut self) {
        if let Err(err) = self.ctx.device().delete_buffer(self.id) {
            error!("Failed to delete pixel buffer {}. {}", self.id, err);
        }
    }
}
