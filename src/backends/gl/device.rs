use std::collections::HashMap;
use std::os::raw::c_void;
use std::{ptr, slice};

use gl;
use gl::types::*;
use smallvec::SmallVec;

use crate::backends::{
    bind_target, is_volume_target, BufferId, Capabilities, Device, ParameterValue, PixelData,
    TexImage, TextureId, Version,
};
use crate::errors::*;
use crate::math::Vector3;

struct GLMutableState {
    binded_texture_index: u32,
    binded_textures: SmallVec<[Option<(GLenum, GLuint)>; 8]>,
}

struct GLBufferData {
    target: GLenum,
    size: usize,
}

/// A device which issues commands to the OpenGL context current in the thread it was
/// created on.
pub struct GLDevice {
    state: GLMutableState,
    capabilities: Capabilities,
    buffers: HashMap<BufferId, GLBufferData>,
}

impl GLDevice {
    /// Creates a device on the current context.
    ///
    /// *Safety*: an OpenGL context must be current in the thread, and the function
    /// pointers of the `gl` crate must have been loaded for it.
    pub unsafe fn new() -> Result<Self> {
        let capabilities = Capabilities::query()?;
        info!("GLDevice {:#?}", capabilities);

        if capabilities.version < Version::GL(2, 0) && capabilities.version < Version::ES(2, 0) {
            return Err(Error::Unsupported(format!(
                "The OpenGL implementation {:?} is too old.",
                capabilities.version
            )));
        }

        Ok(GLDevice {
            state: GLMutableState {
                binded_texture_index: 0,
                binded_textures: SmallVec::new(),
            },
            capabilities,
            buffers: HashMap::new(),
        })
    }

    /// Loads the function pointers of the `gl` crate with `loader` and creates a device.
    ///
    /// *Safety*: see `GLDevice::new`.
    pub unsafe fn load_with<F>(loader: F) -> Result<Self>
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);
        GLDevice::new()
    }

    unsafe fn bind(
        state: &mut GLMutableState,
        unit: u32,
        target: GLenum,
        id: GLuint,
    ) -> Result<()> {
        if state.binded_texture_index != unit {
            state.binded_texture_index = unit;
            gl::ActiveTexture(gl::TEXTURE0 + unit);
        }

        let index = unit as usize;
        if state.binded_textures.len() <= index {
            state.binded_textures.resize(index + 1, None);
        }

        let sampler = if id == 0 { None } else { Some((target, id)) };
        if state.binded_textures[index] != sampler {
            state.binded_textures[index] = sampler;
            gl::BindTexture(target, id);
        }

        check()
    }

    /// Binds a texture to the active unit so it can be edited.
    #[inline]
    unsafe fn edit(&mut self, target: GLenum, id: GLuint) -> Result<()> {
        let unit = self.state.binded_texture_index;
        Self::bind(&mut self.state, unit, bind_target(target), id)
    }

    /// Sets up the unpack state and returns the pointer to pass for `data`.
    unsafe fn unpack(&self, image: &TexImage, data: PixelData) -> Result<*const c_void> {
        gl::PixelStorei(gl::UNPACK_ALIGNMENT, image.alignment as GLint);

        match data {
            PixelData::None => {
                gl::BindBuffer(gl::PIXEL_UNPACK_BUFFER, 0);
                Ok(ptr::null())
            }
            PixelData::Host(bytes) => {
                gl::BindBuffer(gl::PIXEL_UNPACK_BUFFER, 0);
                Ok(bytes.as_ptr() as *const c_void)
            }
            PixelData::Buffer { buffer, offset } => {
                if !self.buffers.contains_key(&buffer) {
                    return Err(Error::Backend(format!("Buffer {} is invalid.", buffer)));
                }

                gl::BindBuffer(gl::PIXEL_UNPACK_BUFFER, buffer);
                Ok(offset as *const c_void)
            }
        }
    }
}

impl Device for GLDevice {
    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn create_texture(&mut self, target: GLenum) -> Result<TextureId> {
        unsafe {
            let mut id = 0;
            gl::GenTextures(1, &mut id);
            check()?;

            if id == 0 {
                return Err(Error::Backend("Failed to generate texture.".into()));
            }

            self.edit(target, id)?;
            Ok(id)
        }
    }

    fn delete_texture(&mut self, id: TextureId) -> Result<()> {
        unsafe {
            for v in self.state.binded_textures.iter_mut() {
                if v.map(|v| v.1) == Some(id) {
                    *v = None;
                }
            }

            gl::DeleteTextures(1, &id);
            check()
        }
    }

    fn bind_texture(&mut self, unit: u32, target: GLenum, id: TextureId) -> Result<()> {
        if unit >= self.capabilities.max_combined_texture_image_units {
            return Err(Error::OutOfBounds);
        }

        unsafe { Self::bind(&mut self.state, unit, target, id) }
    }

    fn set_parameter(
        &mut self,
        target: GLenum,
        id: TextureId,
        pname: GLenum,
        value: ParameterValue,
    ) -> Result<()> {
        unsafe {
            self.edit(target, id)?;

            match value {
                ParameterValue::Int(v) => gl::TexParameteri(target, pname, v),
                ParameterValue::Float(v) => gl::TexParameterf(target, pname, v),
                ParameterValue::Ints(v) => gl::TexParameteriv(target, pname, v.as_ptr()),
                ParameterValue::Floats(v) => gl::TexParameterfv(target, pname, v.as_ptr()),
            }

            check()
        }
    }

    fn allocate_storage(
        &mut self,
        target: GLenum,
        id: TextureId,
        levels: u32,
        internal_format: GLenum,
        size: Vector3<u32>,
    ) -> Result<()> {
        unsafe {
            self.edit(target, id)?;

            if is_volume_target(target) {
                gl::TexStorage3D(
                    target,
                    levels as GLsizei,
                    internal_format,
                    size.x as GLsizei,
                    size.y as GLsizei,
                    size.z as GLsizei,
                );
            } else {
                gl::TexStorage2D(
                    target,
                    levels as GLsizei,
                    internal_format,
                    size.x as GLsizei,
                    size.y as GLsizei,
                );
            }

            check()
        }
    }

    fn tex_image(&mut self, id: TextureId, image: &TexImage, data: PixelData) -> Result<()> {
        unsafe {
            self.edit(image.target, id)?;
            let pixels = self.unpack(image, data)?;

            if is_volume_target(image.target) {
                gl::TexImage3D(
                    image.target,
                    image.level as GLint,
                    image.internal_format as GLint,
                    image.size.x as GLsizei,
                    image.size.y as GLsizei,
                    image.size.z as GLsizei,
                    0,
                    image.format,
                    image.pixel_type,
                    pixels,
                );
            } else {
                gl::TexImage2D(
                    image.target,
                    image.level as GLint,
                    image.internal_format as GLint,
                    image.size.x as GLsizei,
                    image.size.y as GLsizei,
                    0,
                    image.format,
                    image.pixel_type,
                    pixels,
                );
            }

            gl::BindBuffer(gl::PIXEL_UNPACK_BUFFER, 0);
            check()
        }
    }

    fn tex_sub_image(&mut self, id: TextureId, image: &TexImage, data: PixelData) -> Result<()> {
        unsafe {
            self.edit(image.target, id)?;
            let pixels = self.unpack(image, data)?;

            if is_volume_target(image.target) {
                gl::TexSubImage3D(
                    image.target,
                    image.level as GLint,
                    image.offset.x as GLint,
                    image.offset.y as GLint,
                    image.offset.z as GLint,
                    image.size.x as GLsizei,
                    image.size.y as GLsizei,
                    image.size.z as GLsizei,
                    image.format,
                    image.pixel_type,
                    pixels,
                );
            } else {
                gl::TexSubImage2D(
                    image.target,
                    image.level as GLint,
                    image.offset.x as GLint,
                    image.offset.y as GLint,
                    image.size.x as GLsizei,
                    image.size.y as GLsizei,
                    image.format,
                    image.pixel_type,
                    pixels,
                );
            }

            gl::BindBuffer(gl::PIXEL_UNPACK_BUFFER, 0);
            check()
        }
    }

    fn compressed_tex_image(
        &mut self,
        id: TextureId,
        image: &TexImage,
        data: PixelData,
        len: usize,
    ) -> Result<()> {
        unsafe {
            self.edit(image.target, id)?;
            let pixels = self.unpack(image, data)?;

            if is_volume_target(image.target) {
                gl::CompressedTexImage3D(
                    image.target,
                    image.level as GLint,
                    image.internal_format,
                    image.size.x as GLsizei,
                    image.size.y as GLsizei,
                    image.size.z as GLsizei,
                    0,
                    len as GLsizei,
                    pixels,
                );
            } else {
                gl::CompressedTexImage2D(
                    image.target,
                    image.level as GLint,
                    image.internal_format,
                    image.size.x as GLsizei,
                    image.size.y as GLsizei,
                    0,
                    len as GLsizei,
                    pixels,
                );
            }

            gl::BindBuffer(gl::PIXEL_UNPACK_BUFFER, 0);
            check()
        }
    }

    fn compressed_tex_sub_image(
        &mut self,
        id: TextureId,
        image: &TexImage,
        data: PixelData,
        len: usize,
    ) -> Result<()> {
        unsafe {
            self.edit(image.target, id)?;
            let pixels = self.unpack(image, data)?;

            if is_volume_target(image.target) {
                gl::CompressedTexSubImage3D(
                    image.target,
                    image.level as GLint,
                    image.offset.x as GLint,
                    image.offset.y as GLint,
                    image.offset.z as GLint,
                    image.size.x as GLsizei,
                    image.size.y as GLsizei,
                    image.size.z as GLsizei,
                    image.internal_format,
                    len as GLsizei,
                    pixels,
                );
            } else {
                gl::CompressedTexSubImage2D(
                    image.target,
                    image.level as GLint,
                    image.offset.x as GLint,
                    image.offset.y as GLint,
                    image.size.x as GLsizei,
                    image.size.y as GLsizei,
                    image.internal_format,
                    len as GLsizei,
                    pixels,
                );
            }

            gl::BindBuffer(gl::PIXEL_UNPACK_BUFFER, 0);
            check()
        }
    }

    fn generate_mipmap(&mut self, target: GLenum, id: TextureId) -> Result<()> {
        unsafe {
            self.edit(target, id)?;
            gl::GenerateMipmap(target);
            check()
        }
    }

    fn internal_format(&mut self, target: GLenum, id: TextureId, level: u32) -> Result<GLenum> {
        unsafe {
            self.edit(target, id)?;

            let mut v = 0;
            gl::GetTexLevelParameteriv(
                level_target(target),
                level as GLint,
                gl::TEXTURE_INTERNAL_FORMAT,
                &mut v,
            );

            check()?;
            Ok(v as GLenum)
        }
    }

    fn level_size(&mut self, target: GLenum, id: TextureId, level: u32) -> Result<Vector3<u32>> {
        unsafe {
            self.edit(target, id)?;

            let mut size = [0; 3];
            let pnames = [gl::TEXTURE_WIDTH, gl::TEXTURE_HEIGHT, gl::TEXTURE_DEPTH];
            for (v, pname) in size.iter_mut().zip(pnames.iter()) {
                gl::GetTexLevelParameteriv(level_target(target), level as GLint, *pname, v);
            }

            check()?;
            Ok(Vector3::new(
                size[0].max(0) as u32,
                size[1].max(0) as u32,
                size[2].max(1) as u32,
            ))
        }
    }

    fn read_image(&mut self, id: TextureId, image: &TexImage, out: &mut [u8]) -> Result<()> {
        if let Version::ES(_, _) = self.capabilities.version {
            return Err(Error::Unsupported(
                "Reading texture images back is not available on OpenGL ES.".into(),
            ));
        }

        unsafe {
            self.edit(image.target, id)?;
            gl::BindBuffer(gl::PIXEL_PACK_BUFFER, 0);
            gl::PixelStorei(gl::PACK_ALIGNMENT, image.alignment as GLint);
            gl::GetTexImage(
                image.target,
                image.level as GLint,
                image.format,
                image.pixel_type,
                out.as_mut_ptr() as *mut c_void,
            );

            check()
        }
    }

    fn read_compressed_image(&mut self, id: TextureId, image: &TexImage) -> Result<Vec<u8>> {
        if let Version::ES(_, _) = self.capabilities.version {
            return Err(Error::Unsupported(
                "Reading texture images back is not available on OpenGL ES.".into(),
            ));
        }

        unsafe {
            self.edit(image.target, id)?;

            let mut len = 0;
            gl::GetTexLevelParameteriv(
                image.target,
                image.level as GLint,
                gl::TEXTURE_COMPRESSED_IMAGE_SIZE,
                &mut len,
            );

            let mut bytes = vec![0u8; len.max(0) as usize];
            gl::BindBuffer(gl::PIXEL_PACK_BUFFER, 0);
            gl::GetCompressedTexImage(
                image.target,
                image.level as GLint,
                bytes.as_mut_ptr() as *mut c_void,
            );

            check()?;
            Ok(bytes)
        }
    }

    fn set_label(&mut self, _: GLenum, id: TextureId, label: &str) -> Result<()> {
        if !self.capabilities.has_debug_label() {
            return Ok(());
        }

        unsafe {
            gl::ObjectLabel(
                gl::TEXTURE,
                id,
                label.len() as GLsizei,
                label.as_ptr() as *const GLchar,
            );

            check()
        }
    }

    fn create_buffer(&mut self, target: GLenum, size: usize, usage: GLenum) -> Result<BufferId> {
        unsafe {
            let mut id = 0;
            gl::GenBuffers(1, &mut id);
            if id == 0 {
                return Err(Error::Backend("Failed to generate buffer.".into()));
            }

            gl::BindBuffer(target, id);
            gl::BufferData(target, size as GLsizeiptr, ptr::null(), usage);
            gl::BindBuffer(target, 0);

            if let Err(err) = check() {
                gl::DeleteBuffers(1, &id);
                return Err(err);
            }

            self.buffers.insert(id, GLBufferData { target, size });
            Ok(id)
        }
    }

    fn delete_buffer(&mut self, id: BufferId) -> Result<()> {
        if self.buffers.remove(&id).is_some() {
            unsafe {
                gl::DeleteBuffers(1, &id);
                check()?;
            }
        }

        Ok(())
    }

    fn buffer_sub_data(&mut self, id: BufferId, offset: usize, data: &[u8]) -> Result<()> {
        let buffer = self
            .buffers
            .get(&id)
            .ok_or_else(|| Error::Backend(format!("Buffer {} is invalid.", id)))?;

        if offset + data.len() > buffer.size {
            return Err(Error::OutOfBounds);
        }

        unsafe {
            gl::BindBuffer(buffer.target, id);
            gl::BufferSubData(
                buffer.target,
                offset as GLintptr,
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
            );
            gl::BindBuffer(buffer.target, 0);
            check()
        }
    }

    fn map_buffer(&mut self, id: BufferId, func: &mut dyn FnMut(&mut [u8])) -> Result<bool> {
        let buffer = self
            .buffers
            .get(&id)
            .ok_or_else(|| Error::Backend(format!("Buffer {} is invalid.", id)))?;

        unsafe {
            gl::BindBuffer(buffer.target, id);
            let bytes = gl::MapBufferRange(
                buffer.target,
                0,
                buffer.size as GLsizeiptr,
                gl::MAP_WRITE_BIT | gl::MAP_INVALIDATE_BUFFER_BIT,
            );

            if bytes.is_null() {
                // Clears the error flag raised by the failed mapping.
                gl::GetError();
                gl::BindBuffer(buffer.target, 0);
                return Ok(false);
            }

            func(slice::from_raw_parts_mut(bytes as *mut u8, buffer.size));

            let unmapped = gl::UnmapBuffer(buffer.target) == gl::TRUE;
            gl::BindBuffer(buffer.target, 0);
            check()?;

            if !unmapped {
                return Err(Error::Backend(
                    "The buffer contents became corrupt while mapped.".into(),
                ));
            }

            Ok(true)
        }
    }
}

/// Returns the target to query level parameters with.
#[inline]
fn level_target(target: GLenum) -> GLenum {
    if target == gl::TEXTURE_CUBE_MAP {
        gl::TEXTURE_CUBE_MAP_POSITIVE_X
    } else {
        target
    }
}

pub unsafe fn check() -> Result<()> {
    match gl::GetError() {
        gl::NO_ERROR => Ok(()),

        gl::INVALID_ENUM => Err(Error::Backend(
            "An unacceptable value is specified for an enumerated argument.".into(),
        )),

        gl::INVALID_VALUE => Err(Error::Backend(
            "A numeric argument is out of range.".into(),
        )),

        gl::INVALID_OPERATION => Err(Error::Backend(
            "The specified operation is not allowed in the current state.".into(),
        )),

        gl::OUT_OF_MEMORY => Err(Error::Backend(
            "There is not enough memory left to execute the command.".into(),
        )),

        _ => Err(Error::Backend("Unknown error.".into())),
    }
}
