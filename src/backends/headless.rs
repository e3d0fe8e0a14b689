//! A device which executes texture commands in memory.
//!
//! Texel data is stored per image (target and level) in the canonical client layout of
//! its internal format, see `texture::introspect`. Uploads and read-backs convert between
//! that layout and the client layout of the command, mipmaps are box filtered. Half
//! floats are kept as 32-bit floats.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use gl::types::*;

use super::{
    bind_target, ext, BufferId, Capabilities, Device, Extensions, ParameterValue, PixelData,
    Profile, TexImage, TextureId, Version,
};
use crate::errors::*;
use crate::image::{convert_pixels, read_component, write_component, DataType, PixelLayout, Slot};
use crate::math::Vector3;
use crate::texture::introspect;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Layout {
    Pixels(PixelLayout),
    /// Formats without a conversion, which only accept their own client layout.
    Raw {
        format: GLenum,
        pixel_type: GLenum,
        pixel_bytes: usize,
    },
    Compressed,
}

#[derive(Debug, Clone)]
struct Image {
    internal_format: GLenum,
    size: Vector3<u32>,
    layout: Layout,
    texels: Vec<u8>,
}

#[derive(Debug, Clone)]
struct TextureObject {
    target: GLenum,
    immutable: bool,
    images: HashMap<(GLenum, u32), Image>,
    parameters: HashMap<GLenum, ParameterValue>,
    writes: Vec<(GLenum, ParameterValue)>,
    label: Option<String>,
}

#[derive(Debug, Clone)]
struct BufferObject {
    usage: GLenum,
    bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct HeadlessState {
    next_id: GLuint,
    textures: HashMap<TextureId, TextureObject>,
    buffers: HashMap<BufferId, BufferObject>,
    bindings: HashMap<u32, (GLenum, TextureId)>,
    refuse_map: bool,
    buffer_uploads: usize,
}

/// A software device, see the module documentation.
///
/// Clones share the same state, which makes it possible to inspect what a `Context`
/// did with the device after handing it over.
#[derive(Debug, Clone)]
pub struct HeadlessDevice {
    capabilities: Capabilities,
    state: Rc<RefCell<HeadlessState>>,
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        HeadlessDevice::new()
    }
}

impl HeadlessDevice {
    /// Creates a device which reports the capabilities of a desktop GL 4.5 core context.
    pub fn new() -> Self {
        let extensions = Extensions::from_names(&[
            "GL_EXT_texture_compression_s3tc",
            "GL_EXT_texture_filter_anisotropic",
            "GL_KHR_debug",
        ]);

        HeadlessDevice::with_capabilities(Capabilities {
            version: Version::GL(4, 5),
            vendor: "crayon".to_owned(),
            renderer: "headless".to_owned(),
            extensions,
            profile: Some(Profile::Core),
            max_texture_size: 16384,
            max_combined_texture_image_units: 32,
            max_anisotropy: 16.0,
        })
    }

    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        HeadlessDevice {
            capabilities,
            state: Rc::new(RefCell::new(HeadlessState {
                next_id: 1,
                ..Default::default()
            })),
        }
    }

    /// Makes every following `map_buffer` call fail.
    pub fn set_map_failure(&self, refuse: bool) {
        self.state.borrow_mut().refuse_map = refuse;
    }

    /// Returns the number of live textures.
    pub fn texture_count(&self) -> usize {
        self.state.borrow().textures.len()
    }

    /// Returns the number of live buffers.
    pub fn buffer_count(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn is_texture(&self, id: TextureId) -> bool {
        self.state.borrow().textures.contains_key(&id)
    }

    /// Returns the current value of a texture parameter, `None` if it has never been set.
    pub fn parameter(&self, id: TextureId, pname: GLenum) -> Option<ParameterValue> {
        let state = self.state.borrow();
        state
            .textures
            .get(&id)
            .and_then(|v| v.parameters.get(&pname).cloned())
    }

    /// Returns every parameter write issued against a texture, in order.
    pub fn parameter_writes(&self, id: TextureId) -> Vec<(GLenum, ParameterValue)> {
        let state = self.state.borrow();
        state
            .textures
            .get(&id)
            .map(|v| v.writes.clone())
            .unwrap_or_default()
    }

    pub fn label(&self, id: TextureId) -> Option<String> {
        let state = self.state.borrow();
        state.textures.get(&id).and_then(|v| v.label.clone())
    }

    pub fn is_immutable(&self, id: TextureId) -> bool {
        let state = self.state.borrow();
        state.textures.get(&id).map(|v| v.immutable).unwrap_or(false)
    }

    /// Returns the levels of an image target which have been specified, sorted.
    pub fn levels(&self, id: TextureId, target: GLenum) -> Vec<u32> {
        let state = self.state.borrow();
        let mut levels: Vec<_> = state
            .textures
            .get(&id)
            .map(|v| {
                v.images
                    .keys()
                    .filter(|k| k.0 == target)
                    .map(|k| k.1)
                    .collect()
            })
            .unwrap_or_default();

        levels.sort();
        levels
    }

    /// Returns the texture bound to a unit.
    pub fn binding(&self, unit: u32) -> Option<(GLenum, TextureId)> {
        self.state.borrow().bindings.get(&unit).cloned()
    }

    /// Returns the number of uploads sourced from a pixel buffer.
    pub fn buffer_uploads(&self) -> usize {
        self.state.borrow().buffer_uploads
    }

    /// Returns the usage hint a buffer was created with.
    pub fn buffer_usage(&self, id: BufferId) -> Option<GLenum> {
        let state = self.state.borrow();
        state.buffers.get(&id).map(|v| v.usage)
    }
}

fn invalid_enum() -> Error {
    Error::Backend("An unacceptable value is specified for an enumerated argument.".into())
}

fn invalid_value() -> Error {
    Error::Backend("A numeric argument is out of range.".into())
}

fn invalid_operation() -> Error {
    Error::Backend("The specified operation is not allowed in the current state.".into())
}

/// Returns the layout of pixels in a client `format`/`pixel_type`, if the device can
/// convert it.
fn client_layout(format: GLenum, pixel_type: GLenum) -> Option<PixelLayout> {
    use crate::image::Slot::*;

    let slots: &'static [Slot] = match format {
        gl::RED | gl::DEPTH_COMPONENT => &[R],
        gl::RG => &[R, G],
        gl::RGB => &[R, G, B],
        gl::BGR => &[B, G, R],
        gl::RGBA => &[R, G, B, A],
        gl::BGRA => &[B, G, R, A],
        gl::ALPHA => &[A],
        ext::LUMINANCE => &[Y],
        ext::LUMINANCE_ALPHA => &[Y, A],
        _ => return None,
    };

    let data_type = match pixel_type {
        gl::UNSIGNED_BYTE => DataType::U8,
        gl::UNSIGNED_SHORT => DataType::U16,
        gl::FLOAT => DataType::F32,
        _ => return None,
    };

    Some(PixelLayout::new(slots, data_type))
}

fn storage_layout(internal_format: GLenum) -> Layout {
    let info = introspect::internal_format_info(internal_format);
    if info.compressed {
        return Layout::Compressed;
    }

    // Half floats are widened.
    let data_type = if info.data_type == gl::HALF_FLOAT {
        gl::FLOAT
    } else {
        info.data_type
    };

    if let Some(layout) = client_layout(info.data_format, data_type) {
        return Layout::Pixels(layout);
    }

    Layout::Raw {
        format: info.data_format,
        pixel_type: info.data_type,
        pixel_bytes: introspect::client_pixel_bytes(info.data_format, info.data_type)
            .unwrap_or(4),
    }
}

impl Layout {
    fn pixel_bytes(&self) -> usize {
        match *self {
            Layout::Pixels(layout) => layout.pixel_bytes(),
            Layout::Raw { pixel_bytes, .. } => pixel_bytes,
            Layout::Compressed => 0,
        }
    }
}

impl Image {
    fn new(internal_format: GLenum, size: Vector3<u32>) -> Self {
        let layout = storage_layout(internal_format);
        let len = match layout {
            Layout::Compressed => {
                introspect::compressed_image_size(internal_format, size.x, size.y).unwrap_or(0)
                    * size.z as usize
            }
            _ => size.x as usize * size.y as usize * size.z as usize * layout.pixel_bytes(),
        };

        Image {
            internal_format,
            size,
            layout,
            texels: vec![0; len],
        }
    }

    fn texel_offset(&self, x: u32, y: u32, z: u32) -> usize {
        ((z as usize * self.size.y as usize + y as usize) * self.size.x as usize + x as usize)
            * self.layout.pixel_bytes()
    }

    /// Copies client pixels into the region `image` describes.
    fn write(&mut self, image: &TexImage, src: &[u8]) -> Result<()> {
        let (src_layout, pixel_bytes) = self.client(image)?;
        let row_bytes = introspect::aligned_row_bytes(image.size.x, pixel_bytes, image.alignment);
        let rows = image.size.y as usize * image.size.z as usize;
        if rows > 0 && src.len() < row_bytes * (rows - 1) + image.size.x as usize * pixel_bytes {
            return Err(invalid_operation());
        }

        let len = image.size.x as usize * self.layout.pixel_bytes();
        for z in 0..image.size.z {
            for y in 0..image.size.y {
                let begin = (z as usize * image.size.y as usize + y as usize) * row_bytes;
                let dst = self.texel_offset(image.offset.x, image.offset.y + y, image.offset.z + z);
                let dst = &mut self.texels[dst..dst + len];

                match (src_layout, self.layout) {
                    (Some(src_layout), Layout::Pixels(dst_layout)) => convert_pixels(
                        &src[begin..],
                        src_layout,
                        dst,
                        dst_layout,
                        image.size.x as usize,
                    ),
                    _ => dst.copy_from_slice(&src[begin..begin + len]),
                }
            }
        }

        Ok(())
    }

    /// Copies the region `image` describes into client pixels.
    fn read(&self, image: &TexImage, out: &mut [u8]) -> Result<()> {
        let (dst_layout, pixel_bytes) = self.client(image)?;
        let row_bytes = introspect::aligned_row_bytes(image.size.x, pixel_bytes, image.alignment);
        let rows = image.size.y as usize * image.size.z as usize;
        if rows > 0 && out.len() < row_bytes * (rows - 1) + image.size.x as usize * pixel_bytes {
            return Err(invalid_operation());
        }

        let len = image.size.x as usize * self.layout.pixel_bytes();
        for z in 0..image.size.z {
            for y in 0..image.size.y {
                let begin = (z as usize * image.size.y as usize + y as usize) * row_bytes;
                let src = self.texel_offset(image.offset.x, image.offset.y + y, image.offset.z + z);
                let src = &self.texels[src..src + len];

                match (dst_layout, self.layout) {
                    (Some(dst_layout), Layout::Pixels(src_layout)) => convert_pixels(
                        src,
                        src_layout,
                        &mut out[begin..],
                        dst_layout,
                        image.size.x as usize,
                    ),
                    _ => out[begin..begin + len].copy_from_slice(src),
                }
            }
        }

        Ok(())
    }

    /// Resolves the client layout of `image` against the storage layout.
    fn client(&self, image: &TexImage) -> Result<(Option<PixelLayout>, usize)> {
        if image.offset.x + image.size.x > self.size.x
            || image.offset.y + image.size.y > self.size.y
            || image.offset.z + image.size.z > self.size.z
        {
            return Err(invalid_value());
        }

        match self.layout {
            Layout::Compressed => Err(invalid_operation()),
            Layout::Pixels(_) => {
                let layout = client_layout(image.format, image.pixel_type).ok_or_else(|| {
                    Error::Unsupported(format!(
                        "Pixels of format 0x{:04X} and type 0x{:04X} can't be converted.",
                        image.format, image.pixel_type
                    ))
                })?;

                Ok((Some(layout), layout.pixel_bytes()))
            }
            Layout::Raw {
                format,
                pixel_type,
                pixel_bytes,
            } => {
                if format != image.format || pixel_type != image.pixel_type {
                    return Err(invalid_operation());
                }

                Ok((None, pixel_bytes))
            }
        }
    }

    /// Box filters `self` into an image of half its size.
    fn downsample(&self, size: Vector3<u32>) -> Image {
        let mut dst = Image::new(self.internal_format, size);
        let (components, data_type) = match self.layout {
            Layout::Pixels(layout) => (layout.slots.len(), layout.data_type),
            _ => return dst,
        };

        let sample = |v: u32, max: u32, i: u32| (v * 2 + i).min(max - 1);

        for z in 0..size.z {
            for y in 0..size.y {
                for x in 0..size.x {
                    let mut sum = [0.0f32; 4];
                    let mut n = 0;

                    let zs = if size.z == self.size.z { 1 } else { 2 };
                    for k in 0..zs {
                        let sz = if zs == 1 { z } else { sample(z, self.size.z, k) };
                        for j in 0..2 {
                            for i in 0..2 {
                                let sx = sample(x, self.size.x, i);
                                let sy = sample(y, self.size.y, j);
                                let base = self.texel_offset(sx, sy, sz) / data_type.size();
                                for (c, v) in sum.iter_mut().enumerate().take(components) {
                                    *v += read_component(&self.texels, data_type, base + c);
                                }
                                n += 1;
                            }
                        }
                    }

                    let base = dst.texel_offset(x, y, z) / data_type.size();
                    for (c, v) in sum.iter().enumerate().take(components) {
                        write_component(&mut dst.texels, data_type, base + c, *v / n as f32);
                    }
                }
            }
        }

        dst
    }
}

impl HeadlessState {
    fn texture(&mut self, id: TextureId) -> Result<&mut TextureObject> {
        self.textures.get_mut(&id).ok_or_else(invalid_value)
    }

    /// Resolves `data` into bytes owned by the caller.
    fn pixels(&mut self, data: PixelData) -> Result<Option<Vec<u8>>> {
        match data {
            PixelData::None => Ok(None),
            PixelData::Host(bytes) => Ok(Some(bytes.to_vec())),
            PixelData::Buffer { buffer, offset } => {
                let buffer = self.buffers.get(&buffer).ok_or_else(invalid_value)?;
                if offset > buffer.bytes.len() {
                    return Err(invalid_value());
                }

                self.buffer_uploads += 1;
                Ok(Some(buffer.bytes[offset..].to_vec()))
            }
        }
    }
}

fn face_targets(target: GLenum) -> &'static [GLenum] {
    const CUBE: [GLenum; 6] = [
        gl::TEXTURE_CUBE_MAP_POSITIVE_X,
        gl::TEXTURE_CUBE_MAP_NEGATIVE_X,
        gl::TEXTURE_CUBE_MAP_POSITIVE_Y,
        gl::TEXTURE_CUBE_MAP_NEGATIVE_Y,
        gl::TEXTURE_CUBE_MAP_POSITIVE_Z,
        gl::TEXTURE_CUBE_MAP_NEGATIVE_Z,
    ];

    match target {
        gl::TEXTURE_CUBE_MAP => &CUBE,
        gl::TEXTURE_2D => &[gl::TEXTURE_2D],
        gl::TEXTURE_3D => &[gl::TEXTURE_3D],
        gl::TEXTURE_2D_ARRAY => &[gl::TEXTURE_2D_ARRAY],
        gl::TEXTURE_RECTANGLE => &[gl::TEXTURE_RECTANGLE],
        _ => &[],
    }
}

fn is_smallest(target: GLenum, size: Vector3<u32>) -> bool {
    size.x <= 1 && size.y <= 1 && (target != gl::TEXTURE_3D || size.z <= 1)
}

fn level_extent(target: GLenum, size: Vector3<u32>, level: u32) -> Vector3<u32> {
    let depth = if target == gl::TEXTURE_3D {
        (size.z >> level).max(1)
    } else {
        size.z
    };

    Vector3::new((size.x >> level).max(1), (size.y >> level).max(1), depth)
}

impl Device for HeadlessDevice {
    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn create_texture(&mut self, target: GLenum) -> Result<TextureId> {
        if face_targets(target).is_empty() {
            return Err(invalid_enum());
        }

        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.textures.insert(
            id,
            TextureObject {
                target,
                immutable: false,
                images: HashMap::new(),
                parameters: HashMap::new(),
                writes: Vec::new(),
                label: None,
            },
        );

        Ok(id)
    }

    fn delete_texture(&mut self, id: TextureId) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.textures.remove(&id);
        state.bindings.retain(|_, v| v.1 != id);
        Ok(())
    }

    fn bind_texture(&mut self, unit: u32, target: GLenum, id: TextureId) -> Result<()> {
        if unit >= self.capabilities.max_combined_texture_image_units {
            return Err(invalid_enum());
        }

        let mut state = self.state.borrow_mut();
        if id == 0 {
            state.bindings.remove(&unit);
            return Ok(());
        }

        if state.texture(id)?.target != target {
            return Err(invalid_operation());
        }

        state.bindings.insert(unit, (target, id));
        Ok(())
    }

    fn set_parameter(
        &mut self,
        target: GLenum,
        id: TextureId,
        pname: GLenum,
        value: ParameterValue,
    ) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let texture = state.texture(id)?;
        if texture.target != target {
            return Err(invalid_operation());
        }

        texture.parameters.insert(pname, value);
        texture.writes.push((pname, value));
        Ok(())
    }

    fn allocate_storage(
        &mut self,
        target: GLenum,
        id: TextureId,
        levels: u32,
        internal_format: GLenum,
        size: Vector3<u32>,
    ) -> Result<()> {
        if levels == 0 || size.x == 0 || size.y == 0 || size.z == 0 {
            return Err(invalid_value());
        }

        let mut state = self.state.borrow_mut();
        let texture = state.texture(id)?;
        if texture.target != target || texture.immutable {
            return Err(invalid_operation());
        }

        texture.images.clear();
        for &face in face_targets(target) {
            for level in 0..levels {
                let extent = level_extent(target, size, level);
                let image = Image::new(internal_format, extent);
                texture.images.insert((face, level), image);
            }
        }

        texture.immutable = true;
        Ok(())
    }

    fn tex_image(&mut self, id: TextureId, image: &TexImage, data: PixelData) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let pixels = state.pixels(data)?;
        let texture = state.texture(id)?;
        if texture.immutable {
            return Err(invalid_operation());
        }

        if bind_target(image.target) != texture.target {
            return Err(invalid_enum());
        }

        let mut dst = Image::new(image.internal_format, image.size);
        if dst.layout == Layout::Compressed {
            return Err(invalid_operation());
        }

        if let Some(pixels) = pixels {
            let region = image.with_offset(0, 0, 0);
            dst.write(&region, &pixels)?;
        }

        texture.images.insert((image.target, image.level), dst);
        Ok(())
    }

    fn tex_sub_image(&mut self, id: TextureId, image: &TexImage, data: PixelData) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let pixels = state.pixels(data)?.ok_or_else(invalid_value)?;
        let texture = state.texture(id)?;
        let dst = texture
            .images
            .get_mut(&(image.target, image.level))
            .ok_or_else(invalid_operation)?;

        dst.write(image, &pixels)
    }

    fn compressed_tex_image(
        &mut self,
        id: TextureId,
        image: &TexImage,
        data: PixelData,
        len: usize,
    ) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let pixels = state.pixels(data)?;
        let texture = state.texture(id)?;
        if texture.immutable {
            return Err(invalid_operation());
        }

        if bind_target(image.target) != texture.target {
            return Err(invalid_enum());
        }

        let mut dst = Image::new(image.internal_format, image.size);
        if dst.layout != Layout::Compressed {
            return Err(invalid_enum());
        }

        if len != dst.texels.len() {
            return Err(invalid_value());
        }

        if let Some(pixels) = pixels {
            if pixels.len() < len {
                return Err(invalid_value());
            }

            dst.texels.copy_from_slice(&pixels[..len]);
        }

        texture.images.insert((image.target, image.level), dst);
        Ok(())
    }

    fn compressed_tex_sub_image(
        &mut self,
        id: TextureId,
        image: &TexImage,
        data: PixelData,
        len: usize,
    ) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let pixels = state.pixels(data)?.ok_or_else(invalid_value)?;
        let texture = state.texture(id)?;
        let dst = texture
            .images
            .get_mut(&(image.target, image.level))
            .ok_or_else(invalid_operation)?;

        let block =
            introspect::compressed_block(dst.internal_format).ok_or_else(invalid_operation)?;

        if image.internal_format != dst.internal_format
            || image.offset.x % block.width != 0
            || image.offset.y % block.height != 0
            || image.offset.x + image.size.x > dst.size.x
            || image.offset.y + image.size.y > dst.size.y
        {
            return Err(invalid_operation());
        }

        let expected =
            introspect::compressed_image_size(dst.internal_format, image.size.x, image.size.y)
                .unwrap_or(0);

        if len != expected || pixels.len() < len {
            return Err(invalid_value());
        }

        // Copies whole rows of blocks.
        let blocks_per_row =
            |w: u32| ((w.max(block.min_width) + block.width - 1) / block.width) as usize;
        let dst_row = blocks_per_row(dst.size.x) * block.bytes;
        let src_row = blocks_per_row(image.size.x) * block.bytes;
        let rows = len / src_row.max(1);
        let bx = (image.offset.x / block.width) as usize * block.bytes;
        let by = (image.offset.y / block.height) as usize;

        for row in 0..rows {
            let begin = (by + row) * dst_row + bx;
            dst.texels[begin..begin + src_row]
                .copy_from_slice(&pixels[row * src_row..(row + 1) * src_row]);
        }

        Ok(())
    }

    fn generate_mipmap(&mut self, target: GLenum, id: TextureId) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let texture = state.texture(id)?;
        if texture.target != target {
            return Err(invalid_operation());
        }

        let base = match texture.parameters.get(&gl::TEXTURE_BASE_LEVEL) {
            Some(ParameterValue::Int(v)) => *v as u32,
            _ => 0,
        };

        let max = match texture.parameters.get(&gl::TEXTURE_MAX_LEVEL) {
            Some(ParameterValue::Int(v)) => *v as u32,
            _ => 1000,
        };

        for &face in face_targets(target) {
            let mut src = match texture.images.get(&(face, base)) {
                Some(v) => v.clone(),
                None => return Err(invalid_operation()),
            };

            if src.layout == Layout::Compressed {
                return Err(invalid_operation());
            }

            let mut level = base;
            while level < max && !is_smallest(target, src.size) {
                level += 1;
                if texture.immutable && !texture.images.contains_key(&(face, level)) {
                    break;
                }

                let extent = level_extent(target, src.size, 1);
                let dst = src.downsample(extent);
                texture.images.insert((face, level), dst.clone());
                src = dst;
            }
        }

        Ok(())
    }

    fn internal_format(&mut self, target: GLenum, id: TextureId, level: u32) -> Result<GLenum> {
        let mut state = self.state.borrow_mut();
        let texture = state.texture(id)?;
        let target = match target {
            gl::TEXTURE_CUBE_MAP => gl::TEXTURE_CUBE_MAP_POSITIVE_X,
            v => v,
        };

        Ok(texture
            .images
            .get(&(target, level))
            .map(|v| v.internal_format)
            .unwrap_or(gl::RGBA))
    }

    fn level_size(&mut self, target: GLenum, id: TextureId, level: u32) -> Result<Vector3<u32>> {
        let mut state = self.state.borrow_mut();
        let texture = state.texture(id)?;
        let target = match target {
            gl::TEXTURE_CUBE_MAP => gl::TEXTURE_CUBE_MAP_POSITIVE_X,
            v => v,
        };

        Ok(texture
            .images
            .get(&(target, level))
            .map(|v| v.size)
            .unwrap_or_else(|| Vector3::new(0, 0, 0)))
    }

    fn read_image(&mut self, id: TextureId, image: &TexImage, out: &mut [u8]) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let texture = state.texture(id)?;
        let src = texture
            .images
            .get(&(image.target, image.level))
            .ok_or_else(invalid_operation)?;

        src.read(image, out)
    }

    fn read_compressed_image(&mut self, id: TextureId, image: &TexImage) -> Result<Vec<u8>> {
        let mut state = self.state.borrow_mut();
        let texture = state.texture(id)?;
        let src = texture
            .images
            .get(&(image.target, image.level))
            .ok_or_else(invalid_operation)?;

        if src.layout != Layout::Compressed {
            return Err(invalid_operation());
        }

        Ok(src.texels.clone())
    }

    fn set_label(&mut self, _: GLenum, id: TextureId, label: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.texture(id)?.label = Some(label.to_owned());
        Ok(())
    }

    fn create_buffer(&mut self, target: GLenum, size: usize, usage: GLenum) -> Result<BufferId> {
        if target != gl::PIXEL_UNPACK_BUFFER && target != gl::PIXEL_PACK_BUFFER {
            return Err(invalid_enum());
        }

        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.buffers.insert(
            id,
            BufferObject {
                usage,
                bytes: vec![0; size],
            },
        );

        Ok(id)
    }

    fn delete_buffer(&mut self, id: BufferId) -> Result<()> {
        self.state.borrow_mut().buffers.remove(&id);
        Ok(())
    }

    fn buffer_sub_data(&mut self, id: BufferId, offset: usize, data: &[u8]) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let buffer = state.buffers.get_mut(&id).ok_or_else(invalid_value)?;
        if offset + data.len() > buffer.bytes.len() {
            return Err(invalid_value());
        }

        buffer.bytes[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn map_buffer(&mut self, id: BufferId, func: &mut dyn FnMut(&mut [u8])) -> Result<bool> {
        let mut state = self.state.borrow_mut();
        if state.refuse_map {
            return Ok(false);
        }

        let buffer = state.buffers.get_mut(&id).ok_or_else(invalid_value)?;
        func(&mut buffer.bytes);
        Ok(true)
    }
}
