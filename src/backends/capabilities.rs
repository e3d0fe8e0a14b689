use std::cmp;

/// Describes the OpenGL context profile.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Profile {
    /// The context uses only future-compatible functions and definitions.
    Core,
    /// The context includes all immediate mode functions and definitions.
    Compatibility,
}

/// Describes a version.
///
/// A version can only be compared to another version if they belong to the same API.
/// For example, both `Version::GL(3, 0) >= Version::ES(3, 0)` and `Version::ES(3, 0) >=
/// Version::GL(3, 0)` return `false`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Version {
    /// Regular OpenGL.
    GL(u8, u8),
    /// OpenGL embedded system.
    ES(u8, u8),
}

impl PartialOrd for Version {
    #[inline]
    fn partial_cmp(&self, other: &Version) -> Option<cmp::Ordering> {
        let (es1, major1, minor1) = match *self {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        let (es2, major2, minor2) = match *other {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        if es1 != es2 {
            None
        } else {
            match major1.cmp(&major2) {
                cmp::Ordering::Equal => Some(minor1.cmp(&minor2)),
                v => Some(v),
            }
        }
    }
}

impl Version {
    /// Parses the string returned by `glGetString(GL_VERSION)`.
    pub fn parse(desc: &str) -> Option<Version> {
        let (es, desc) = if desc.starts_with("OpenGL ES ") {
            (true, &desc[10..])
        } else if desc.starts_with("OpenGL ES-") {
            (true, &desc[13..])
        } else {
            (false, desc)
        };

        let desc = desc.split(' ').next()?;
        let mut iter = desc.split('.');
        let major = iter.next()?.parse().ok()?;
        let minor = iter.next()?.parse().ok()?;

        if es {
            Some(Version::ES(major, minor))
        } else {
            Some(Version::GL(major, minor))
        }
    }
}

macro_rules! extensions {
    ($($string:expr => $field:ident,)+) => {
        /// Contains data about the list of extensions.
        #[derive(Debug, Clone, Copy, Default)]
        pub struct Extensions {
            $(
                pub $field: bool,
            )+
        }

        impl Extensions {
            /// Builds the extension list from the names reported by the driver. Unknown
            /// names are ignored.
            pub fn from_names<I, S>(names: I) -> Extensions
            where
                I: IntoIterator<Item = S>,
                S: AsRef<str>,
            {
                let mut extensions = Extensions::default();
                for extension in names {
                    match extension.as_ref() {
                        $(
                            $string => extensions.$field = true,
                        )+
                        _ => ()
                    }
                }

                extensions
            }
        }
    }
}

extensions! {
    "GL_ARB_texture_storage" => gl_arb_texture_storage,
    "GL_EXT_texture_storage" => gl_ext_texture_storage,
    "GL_ARB_texture_swizzle" => gl_arb_texture_swizzle,
    "GL_EXT_texture_swizzle" => gl_ext_texture_swizzle,
    "GL_ARB_texture_rg" => gl_arb_texture_rg,
    "GL_EXT_texture_rg" => gl_ext_texture_rg,
    "GL_ARB_pixel_buffer_object" => gl_arb_pixel_buffer_object,
    "GL_NV_pixel_buffer_object" => gl_nv_pixel_buffer_object,
    "GL_EXT_texture_filter_anisotropic" => gl_ext_texture_filter_anisotropic,
    "GL_ARB_texture_filter_anisotropic" => gl_arb_texture_filter_anisotropic,
    "GL_KHR_debug" => gl_khr_debug,
    "GL_IMG_texture_compression_pvrtc" => gl_img_texture_compression_pvrtc,
    "GL_EXT_texture_compression_s3tc" => gl_ext_texture_compression_s3tc,
    "GL_EXT_texture_compression_rgtc" => gl_ext_texture_compression_rgtc,
    "GL_ARB_texture_compression_bptc" => gl_arb_texture_compression_bptc,
    "GL_ARB_ES3_compatibility" => gl_arb_es3_compatibility,
    "GL_OES_compressed_ETC2_RGB8_texture" => gl_oes_compressed_etc2_rgb8_texture,
    "GL_OES_compressed_ETC2_RGBA8_texture" => gl_oes_compressed_etc2_rgba8_texture,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextureCompression {
    ETC2,
    PVRTC,
    S3TC,
    RGTC,
    BPTC,
}

/// Represents the capabilities of the context.
///
/// Contrary to the state, these values never change.
#[derive(Debug, Clone)]
pub struct Capabilities {
    /// Returns a version or release number. Vendor-specific information may follow the version
    /// number.
    pub version: Version,

    /// The company responsible for this GL implementation.
    pub vendor: String,

    /// The name of the renderer. This name is typically specific to a particular
    /// configuration of a hardware platform.
    pub renderer: String,

    /// The list of OpenGL extensions support by this implementation.
    pub extensions: Extensions,

    /// The OpenGL context profile if available.
    ///
    /// The context profile is available from OpenGL 3.2 onwards. `None` if not supported.
    pub profile: Option<Profile>,

    /// Maximum width and height of a 2D texture.
    pub max_texture_size: u32,

    /// Maximum number of textures that can be bound to a program.
    ///
    /// `glActiveTexture` must be between `GL_TEXTURE0` and `GL_TEXTURE0` + this value - 1.
    pub max_combined_texture_image_units: u32,

    /// Maximum degree of anisotropic filtering, `1.0` if anisotropic filtering is not
    /// available.
    pub max_anisotropy: f32,
}

impl Capabilities {
    pub fn has_compression(&self, compression: TextureCompression) -> bool {
        let exts = &self.extensions;
        match compression {
            TextureCompression::ETC2 => {
                self.version >= Version::ES(3, 0)
                    || self.version >= Version::GL(4, 3)
                    || exts.gl_arb_es3_compatibility
                    || (exts.gl_oes_compressed_etc2_rgb8_texture
                        && exts.gl_oes_compressed_etc2_rgba8_texture)
            }
            TextureCompression::PVRTC => exts.gl_img_texture_compression_pvrtc,
            TextureCompression::S3TC => exts.gl_ext_texture_compression_s3tc,
            TextureCompression::RGTC => {
                self.version >= Version::GL(3, 0) || exts.gl_ext_texture_compression_rgtc
            }
            TextureCompression::BPTC => {
                self.version >= Version::GL(4, 2) || exts.gl_arb_texture_compression_bptc
            }
        }
    }

    /// Returns true if sized internal formats like `GL_RGBA8` are accepted.
    #[inline]
    pub fn has_sized_internal_formats(&self) -> bool {
        match self.version {
            Version::GL(_, _) => true,
            Version::ES(major, _) => major >= 3,
        }
    }

    /// Returns true if single and dual channel `GL_RED`/`GL_RG` formats are available.
    #[inline]
    pub fn has_texture_rg(&self) -> bool {
        self.version >= Version::GL(3, 0)
            || self.version >= Version::ES(3, 0)
            || self.extensions.gl_arb_texture_rg
            || self.extensions.gl_ext_texture_rg
    }

    #[inline]
    pub fn has_texture_swizzle(&self) -> bool {
        self.version >= Version::GL(3, 3)
            || self.version >= Version::ES(3, 0)
            || self.extensions.gl_arb_texture_swizzle
            || self.extensions.gl_ext_texture_swizzle
    }

    #[inline]
    pub fn has_texture_storage(&self) -> bool {
        self.version >= Version::GL(4, 2)
            || self.version >= Version::ES(3, 0)
            || self.extensions.gl_arb_texture_storage
            || self.extensions.gl_ext_texture_storage
    }

    #[inline]
    pub fn has_pixel_buffer(&self) -> bool {
        self.version >= Version::GL(2, 1)
            || self.version >= Version::ES(3, 0)
            || self.extensions.gl_arb_pixel_buffer_object
            || self.extensions.gl_nv_pixel_buffer_object
    }

    #[inline]
    pub fn has_debug_label(&self) -> bool {
        self.version >= Version::GL(4, 3) || self.extensions.gl_khr_debug
    }

    #[inline]
    pub fn has_anisotropic_filter(&self) -> bool {
        self.extensions.gl_ext_texture_filter_anisotropic
            || self.extensions.gl_arb_texture_filter_anisotropic
    }

    /// Legacy contexts store gray images as `GL_LUMINANCE` instead of a red format expanded
    /// with a swizzle.
    #[inline]
    pub fn is_legacy(&self) -> bool {
        !self.has_texture_rg() || !self.has_texture_swizzle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version() {
        assert_eq!(Version::parse("4.1 Metal - 76.3"), Some(Version::GL(4, 1)));
        assert_eq!(Version::parse("OpenGL ES 3.0 build"), Some(Version::ES(3, 0)));
        assert_eq!(Version::parse("OpenGL ES-CM 1.1"), Some(Version::ES(1, 1)));
        assert_eq!(Version::parse("garbage"), None);

        assert!(Version::GL(3, 3) > Version::GL(3, 2));
        assert!(!(Version::GL(3, 0) >= Version::ES(3, 0)));
        assert!(!(Version::ES(3, 0) >= Version::GL(3, 0)));
    }

    #[test]
    fn extensions() {
        let exts = Extensions::from_names(vec![
            "GL_EXT_texture_compression_s3tc",
            "GL_KHR_debug",
            "GL_UNKNOWN_thing",
        ]);

        assert!(exts.gl_ext_texture_compression_s3tc);
        assert!(exts.gl_khr_debug);
        assert!(!exts.gl_arb_texture_storage);
    }
}
