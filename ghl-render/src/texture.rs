//! Structs and functions for handling textures.
//!
//! The module provides the [`Texture`] struct which owns one GL 2D texture and
//! mirrors its filter and wrap state on the CPU side.

use std::{cell::RefCell, rc::Rc, sync::Arc};

use thiserror::Error;

use crate::{
    backend::GlBackend,
    context::{BindScope, BindState, RenderContext},
};

// IMG_texture_compression_pvrtc, not part of the core enums.
const COMPRESSED_RGBA_PVRTC_4BPPV1_IMG: u32 = 0x8C02;
const COMPRESSED_RGBA_PVRTC_2BPPV1_IMG: u32 = 0x8C03;

/// Pixel layout of a texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Unknown,
    Alpha,
    Rgb,
    Rgba,
    Rgb565,
    Rgba4444,
    Pvrtc2Bpp,
    Pvrtc4Bpp,
}

impl TextureFormat {
    /// Whether uploads go through the compressed-image entry points.
    pub fn is_compressed(self) -> bool {
        matches!(self, TextureFormat::Pvrtc2Bpp | TextureFormat::Pvrtc4Bpp)
    }

    /// Internal format passed to `glTexImage2D`/`glCompressedTexImage2D`.
    pub fn internal_format(self) -> u32 {
        match self {
            TextureFormat::Pvrtc2Bpp => COMPRESSED_RGBA_PVRTC_2BPPV1_IMG,
            TextureFormat::Pvrtc4Bpp => COMPRESSED_RGBA_PVRTC_4BPPV1_IMG,
            TextureFormat::Alpha => glow::ALPHA,
            TextureFormat::Rgb565 => glow::RGB,
            #[cfg(not(feature = "gles"))]
            TextureFormat::Rgb => glow::RGB8,
            #[cfg(not(feature = "gles"))]
            TextureFormat::Rgba => glow::RGBA8,
            #[cfg(feature = "gles")]
            TextureFormat::Rgb => glow::RGB,
            _ => glow::RGBA,
        }
    }

    /// Client-side pixel layout of uncompressed uploads.
    pub fn pixel_format(self) -> u32 {
        match self {
            TextureFormat::Alpha => glow::ALPHA,
            TextureFormat::Rgb | TextureFormat::Rgb565 => glow::RGB,
            _ => glow::RGBA,
        }
    }

    /// Per-texel storage type of uncompressed uploads.
    pub fn storage_type(self) -> u32 {
        match self {
            TextureFormat::Rgb565 => glow::UNSIGNED_SHORT_5_6_5,
            TextureFormat::Rgba4444 => glow::UNSIGNED_SHORT_4_4_4_4,
            _ => glow::UNSIGNED_BYTE,
        }
    }

    /// Bytes a tightly packed `width` x `height` image of this format takes.
    ///
    /// PVRTC rounds up to its minimum block footprint (8x8 at 4bpp, 16x8 at 2bpp).
    /// `None` for [`TextureFormat::Unknown`] or when the size does not fit in `usize`.
    pub fn data_size(self, width: u32, height: u32) -> Option<usize> {
        let (w, h) = (width as usize, height as usize);
        let (w, h, bits) = match self {
            TextureFormat::Unknown => return None,
            TextureFormat::Alpha => (w, h, 8),
            TextureFormat::Rgb => (w, h, 24),
            TextureFormat::Rgba => (w, h, 32),
            TextureFormat::Rgb565 | TextureFormat::Rgba4444 => (w, h, 16),
            TextureFormat::Pvrtc4Bpp => (w.max(8), h.max(8), 4),
            TextureFormat::Pvrtc2Bpp => (w.max(16), h.max(8), 2),
        };
        Some(w.checked_mul(h)?.checked_mul(bits)? / 8)
    }
}

/// Filtering mode of one filter axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TextureFilter {
    #[default]
    None,
    Nearest,
    Linear,
}

impl TextureFilter {
    fn index(self) -> usize {
        match self {
            TextureFilter::None => 0,
            TextureFilter::Nearest => 1,
            TextureFilter::Linear => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TextureWrap {
    #[default]
    Clamp,
    Repeat,
}

impl TextureWrap {
    fn gl_mode(self) -> i32 {
        match self {
            TextureWrap::Clamp => glow::CLAMP_TO_EDGE as i32,
            TextureWrap::Repeat => glow::REPEAT as i32,
        }
    }
}

/// Rows: mip filter. Columns: min filter.
const MIN_FILTERS: [[u32; 3]; 3] = [
    [glow::NEAREST, glow::NEAREST, glow::LINEAR],
    [
        glow::NEAREST_MIPMAP_NEAREST,
        glow::NEAREST_MIPMAP_NEAREST,
        glow::LINEAR_MIPMAP_NEAREST,
    ],
    [
        glow::NEAREST_MIPMAP_LINEAR,
        glow::NEAREST_MIPMAP_LINEAR,
        glow::LINEAR_MIPMAP_LINEAR,
    ],
];

/// The `TEXTURE_MIN_FILTER` value for a mip/min filter pair.
pub fn min_filter_mode(mip: TextureFilter, min: TextureFilter) -> u32 {
    MIN_FILTERS[mip.index()][min.index()]
}

/// The `TEXTURE_MAG_FILTER` value; magnification never samples mip levels.
pub fn mag_filter_mode(mag: TextureFilter) -> u32 {
    MIN_FILTERS[0][mag.index()]
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextureError {
    #[error("Unknown texture format")]
    UnknownFormat,

    #[error("Texture size {width}x{height} is too large")]
    TooLarge { width: u32, height: u32 },

    #[error("Failed to allocate texture: {0}")]
    Allocation(String),

    #[error("{0:?} textures need their compressed data at creation")]
    MissingCompressedData(TextureFormat),

    #[error("Pixel data too short: expected {expected} bytes, got {actual}")]
    DataSize { expected: usize, actual: usize },

    #[error("Region {width}x{height} at ({x}, {y}) is outside mip level {level}")]
    RegionOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        level: u32,
    },
}

/// Validates dimensions against GL's signed sizes and computes the tight upload size.
fn expected_size(format: TextureFormat, width: u32, height: u32) -> Result<usize, TextureError> {
    if format == TextureFormat::Unknown {
        return Err(TextureError::UnknownFormat);
    }
    let too_large = TextureError::TooLarge { width, height };
    if width > i32::MAX as u32 || height > i32::MAX as u32 {
        return Err(too_large);
    }
    format.data_size(width, height).ok_or(too_large)
}

/// Represents a texture stored on the GPU side.
pub struct Texture<G: GlBackend = glow::Context> {
    gl: Arc<G>,
    bindings: Rc<RefCell<BindState>>,
    id: glow::Texture,
    format: TextureFormat,
    width: u32,
    height: u32,
    min_filter: TextureFilter,
    mag_filter: TextureFilter,
    mip_filter: TextureFilter,
    wrap_u: TextureWrap,
    wrap_v: TextureWrap,
    have_mipmaps: bool,
}

impl<G: GlBackend> Texture<G> {
    pub(crate) fn create(
        ctx: &RenderContext<G>,
        format: TextureFormat,
        width: u32,
        height: u32,
        data: Option<&[u8]>,
    ) -> Result<Self, TextureError> {
        let expected = expected_size(format, width, height)?;
        if format.is_compressed() && data.is_none() {
            return Err(TextureError::MissingCompressedData(format));
        }
        if let Some(data) = data
            && data.len() < expected
        {
            return Err(TextureError::DataSize {
                expected,
                actual: data.len(),
            });
        }

        let gl = Arc::clone(ctx.gl());
        let id = gl.create_texture().map_err(TextureError::Allocation)?;
        let texture = Self {
            gl,
            bindings: Rc::clone(ctx.bindings()),
            id,
            format,
            width,
            height,
            min_filter: TextureFilter::Nearest,
            mag_filter: TextureFilter::Nearest,
            mip_filter: TextureFilter::None,
            wrap_u: TextureWrap::Clamp,
            wrap_v: TextureWrap::Clamp,
            have_mipmaps: false,
        };

        {
            let gl = &*texture.gl;
            let _scope = texture.bind();
            gl.tex_parameter(glow::TEXTURE_MIN_FILTER, glow::NEAREST as i32);
            gl.tex_parameter(glow::TEXTURE_MAG_FILTER, glow::NEAREST as i32);
            gl.tex_parameter(glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
            gl.tex_parameter(glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
            gl.pixel_store(glow::UNPACK_ALIGNMENT, 1);
            match data {
                Some(data) if format.is_compressed() => gl.compressed_tex_image_2d(
                    0,
                    format.internal_format() as i32,
                    width as i32,
                    height as i32,
                    &data[..expected],
                ),
                _ => gl.tex_image_2d(
                    0,
                    format.internal_format() as i32,
                    width as i32,
                    height as i32,
                    format.pixel_format(),
                    format.storage_type(),
                    data.map(|data| &data[..expected]),
                ),
            }
            gl.pixel_store(glow::UNPACK_ALIGNMENT, 4);
        }

        log::trace!("created {:?} texture {}x{}", format, width, height);
        Ok(texture)
    }

    fn bind(&self) -> BindScope<'_, G> {
        BindScope::enter(&*self.gl, &self.bindings, self.id)
    }

    /// Returns the GL texture name.
    pub fn id(&self) -> glow::Texture {
        self.id
    }

    /// Returns the pixel format the texture was created with.
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Returns the width of the texture.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the texture.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the minification filter.
    pub fn min_filter(&self) -> TextureFilter {
        self.min_filter
    }

    /// Returns the magnification filter.
    pub fn mag_filter(&self) -> TextureFilter {
        self.mag_filter
    }

    /// Returns the mipmap filter.
    pub fn mip_filter(&self) -> TextureFilter {
        self.mip_filter
    }

    /// Returns the horizontal wrap mode.
    pub fn wrap_u(&self) -> TextureWrap {
        self.wrap_u
    }

    /// Returns the vertical wrap mode.
    pub fn wrap_v(&self) -> TextureWrap {
        self.wrap_v
    }

    /// Returns true once the mip chain has been generated.
    pub fn has_mipmaps(&self) -> bool {
        self.have_mipmaps
    }

    fn apply_min_filter(&self) {
        let _scope = self.bind();
        self.gl.tex_parameter(
            glow::TEXTURE_MIN_FILTER,
            min_filter_mode(self.mip_filter, self.min_filter) as i32,
        );
    }

    fn apply_mag_filter(&self) {
        let _scope = self.bind();
        self.gl
            .tex_parameter(glow::TEXTURE_MAG_FILTER, mag_filter_mode(self.mag_filter) as i32);
    }

    fn check_mips(&mut self) {
        if self.mip_filter != TextureFilter::None && !self.have_mipmaps {
            self.generate_mipmaps();
        }
    }

    /// Sets the minification filter.
    pub fn set_min_filter(&mut self, filter: TextureFilter) {
        self.min_filter = filter;
        self.apply_min_filter();
        self.check_mips();
    }

    /// Sets the magnification filter.
    pub fn set_mag_filter(&mut self, filter: TextureFilter) {
        self.mag_filter = filter;
        self.apply_mag_filter();
        self.check_mips();
    }

    /// Sets the mipmap filter. Anything but [`TextureFilter::None`] builds the
    /// mip chain the first time it is needed.
    pub fn set_mip_filter(&mut self, filter: TextureFilter) {
        self.mip_filter = filter;
        self.apply_min_filter();
        self.apply_mag_filter();
        self.check_mips();
    }

    /// Sets the horizontal (S) wrap mode.
    pub fn set_wrap_u(&mut self, wrap: TextureWrap) {
        self.wrap_u = wrap;
        let _scope = self.bind();
        self.gl.tex_parameter(glow::TEXTURE_WRAP_S, wrap.gl_mode());
    }

    /// Sets the vertical (T) wrap mode.
    pub fn set_wrap_v(&mut self, wrap: TextureWrap) {
        self.wrap_v = wrap;
        let _scope = self.bind();
        self.gl.tex_parameter(glow::TEXTURE_WRAP_T, wrap.gl_mode());
    }

    /// Builds the mip chain from level 0.
    pub fn generate_mipmaps(&mut self) {
        {
            let _scope = self.bind();
            self.gl.generate_mipmap();
        }
        self.have_mipmaps = true;
    }

    /// Replaces a region of mip `level` with tightly packed `data`.
    pub fn set_data(
        &self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        data: &[u8],
        level: u32,
    ) -> Result<(), TextureError> {
        let out_of_bounds = TextureError::RegionOutOfBounds {
            x,
            y,
            width,
            height,
            level,
        };
        if level >= u32::BITS {
            return Err(out_of_bounds);
        }
        let level_width = (self.width >> level).max(1);
        let level_height = (self.height >> level).max(1);
        if x.checked_add(width).is_none_or(|right| right > level_width)
            || y.checked_add(height).is_none_or(|bottom| bottom > level_height)
        {
            return Err(out_of_bounds);
        }
        let expected = expected_size(self.format, width, height)?;
        if data.len() < expected {
            return Err(TextureError::DataSize {
                expected,
                actual: data.len(),
            });
        }

        let gl = &*self.gl;
        let _scope = self.bind();
        gl.pixel_store(glow::UNPACK_ALIGNMENT, 1);
        #[cfg(not(feature = "gles"))]
        gl.pixel_store(glow::UNPACK_ROW_LENGTH, width as i32);
        if self.format.is_compressed() {
            gl.compressed_tex_sub_image_2d(
                level as i32,
                x as i32,
                y as i32,
                width as i32,
                height as i32,
                self.format.internal_format(),
                &data[..expected],
            );
        } else {
            gl.tex_sub_image_2d(
                level as i32,
                x as i32,
                y as i32,
                width as i32,
                height as i32,
                self.format.pixel_format(),
                self.format.storage_type(),
                &data[..expected],
            );
        }
        gl.pixel_store(glow::UNPACK_ALIGNMENT, 4);
        #[cfg(not(feature = "gles"))]
        gl.pixel_store(glow::UNPACK_ROW_LENGTH, 0);
        Ok(())
    }
}

impl<G: GlBackend> Drop for Texture<G> {
    fn drop(&mut self) {
        self.bindings.borrow_mut().forget(self.id);
        self.gl.delete_texture(self.id);
    }
}
