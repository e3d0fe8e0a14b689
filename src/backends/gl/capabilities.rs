use std::ffi;

use gl;
use gl::types::*;

use crate::backends::capabilities::*;
use crate::backends::ext;
use crate::errors::*;

impl Version {
    /// Queries the version of the current context.
    ///
    /// *Safety*: an OpenGL context must be current in the thread.
    pub unsafe fn query() -> Result<Version> {
        let desc = parse_str(gl::VERSION)?;
        Version::parse(&desc)
            .ok_or_else(|| Error::Backend(format!("Version string {:?} is unformaled.", desc)))
    }
}

impl Extensions {
    /// Returns the list of extensions supported by the current context.
    ///
    /// The version must match the one of the context.
    ///
    /// *Safety*: an OpenGL context must be current in the thread.
    pub unsafe fn query(version: Version) -> Result<Extensions> {
        let strings: Vec<String> = if version >= Version::GL(3, 0) || version >= Version::ES(3, 0)
        {
            let mut num_extensions = 0;
            gl::GetIntegerv(gl::NUM_EXTENSIONS, &mut num_extensions);

            let mut strings = Vec::with_capacity(num_extensions.max(0) as usize);
            for i in 0..num_extensions {
                let ext = gl::GetStringi(gl::EXTENSIONS, i as GLuint);
                if !ext.is_null() {
                    let ext = ffi::CStr::from_ptr(ext as *const _);
                    strings.push(ext.to_string_lossy().into_owned());
                }
            }

            strings
        } else {
            parse_str(gl::EXTENSIONS)?
                .split(' ')
                .map(|e| e.to_owned())
                .collect()
        };

        Ok(Extensions::from_names(strings))
    }
}

impl Capabilities {
    /// Queries the capabilities of the current context.
    ///
    /// *Safety*: an OpenGL context must be current in the thread.
    pub unsafe fn query() -> Result<Capabilities> {
        let version = Version::query()?;
        let extensions = Extensions::query(version)?;

        let max_anisotropy = if extensions.gl_ext_texture_filter_anisotropic
            || extensions.gl_arb_texture_filter_anisotropic
        {
            let mut val = 1.0;
            gl::GetFloatv(ext::MAX_TEXTURE_MAX_ANISOTROPY, &mut val);
            val.max(1.0)
        } else {
            1.0
        };

        Ok(Capabilities {
            version,
            extensions,
            vendor: parse_str(gl::VENDOR)?,
            renderer: parse_str(gl::RENDERER)?,
            profile: parse_profile(version),
            max_texture_size: parse_integer(gl::MAX_TEXTURE_SIZE, 64),
            max_combined_texture_image_units: parse_integer(
                gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS,
                2,
            ),
            max_anisotropy,
        })
    }
}

#[inline]
unsafe fn parse_str(id: GLenum) -> Result<String> {
    let s = gl::GetString(id);
    if s.is_null() {
        return Err(Error::Backend(format!("String of 0x{:04X} is null.", id)));
    }

    String::from_utf8(ffi::CStr::from_ptr(s as *const _).to_bytes().to_vec())
        .map_err(|_| Error::Backend(format!("String of 0x{:04X} is unformaled.", id)))
}

#[inline]
unsafe fn parse_integer(id: GLenum, min: u32) -> u32 {
    let mut val = min as GLint;
    gl::GetIntegerv(id, &mut val);
    (val.max(0) as u32).max(min)
}

#[inline]
unsafe fn parse_profile(version: Version) -> Option<Profile> {
    if version >= Version::GL(3, 2) {
        let mut val = 0;
        gl::GetIntegerv(gl::CONTEXT_PROFILE_MASK, &mut val);
        let val = val as GLenum;
        if (val & gl::CONTEXT_COMPATIBILITY_PROFILE_BIT) != 0 {
            Some(Profile::Compatibility)
        } else if (val & gl::CONTEXT_CORE_PROFILE_BIT) != 0 {
            Some(Profile::Core)
        } else {
            None
        }
    } else {
        None
    }
}
