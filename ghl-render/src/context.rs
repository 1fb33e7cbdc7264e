//! The render context: factory and binding bookkeeping for GL resources.
//!
//! OpenGL keeps one "currently bound texture" per texture unit plus one
//! "active unit" for the whole process. The context records what its caller
//! bound through [`RenderContext::set_texture`], and every texture operation
//! that has to bind its own handle restores that recorded state when it is
//! done, through a scope guard.

use std::{cell::RefCell, rc::Rc, sync::Arc};

use image::DynamicImage;
use thiserror::Error;

use crate::{
    backend::GlBackend,
    shader::{FragmentShader, ShaderError, ShaderProgram, VertexShader},
    texture::{Texture, TextureError, TextureFormat},
};

/// A pending error reported by `glGetError`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlError {
    #[error("GL_INVALID_ENUM")]
    InvalidEnum,
    #[error("GL_INVALID_VALUE")]
    InvalidValue,
    #[error("GL_INVALID_OPERATION")]
    InvalidOperation,
    #[error("GL_OUT_OF_MEMORY")]
    OutOfMemory,
    #[error("GL_INVALID_FRAMEBUFFER_OPERATION")]
    InvalidFramebufferOperation,
    #[error("GL error 0x{0:04X}")]
    Other(u32),
}

impl GlError {
    /// Maps a raw `glGetError` code, `None` for `GL_NO_ERROR`.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            glow::NO_ERROR => None,
            glow::INVALID_ENUM => Some(GlError::InvalidEnum),
            glow::INVALID_VALUE => Some(GlError::InvalidValue),
            glow::INVALID_OPERATION => Some(GlError::InvalidOperation),
            glow::OUT_OF_MEMORY => Some(GlError::OutOfMemory),
            glow::INVALID_FRAMEBUFFER_OPERATION => Some(GlError::InvalidFramebufferOperation),
            other => Some(GlError::Other(other)),
        }
    }
}

/// The texture binding state the caller expects to find after any wrapper call.
#[derive(Debug, Default)]
pub(crate) struct BindState {
    active_unit: u32,
    bound: Vec<Option<glow::Texture>>,
}

impl BindState {
    pub(crate) fn bound(&self, unit: u32) -> Option<glow::Texture> {
        self.bound.get(unit as usize).copied().flatten()
    }

    fn record(&mut self, unit: u32, texture: Option<glow::Texture>) {
        let index = unit as usize;
        if index >= self.bound.len() {
            self.bound.resize(index + 1, None);
        }
        self.bound[index] = texture;
        self.active_unit = unit;
    }

    /// Drops every recorded reference to a texture that is going away.
    pub(crate) fn forget(&mut self, texture: glow::Texture) {
        for slot in self.bound.iter_mut() {
            if *slot == Some(texture) {
                *slot = None;
            }
        }
    }
}

/// Restores the recorded binding of unit 0 and the recorded active unit.
fn restore<G: GlBackend + ?Sized>(gl: &G, state: &BindState) {
    gl.active_texture(0);
    gl.bind_texture(state.bound(0));
    if state.active_unit != 0 {
        gl.active_texture(state.active_unit);
    }
}

/// Binds one texture on unit 0 for the lifetime of the guard.
///
/// Dropping the guard puts back whatever the context had recorded, so a
/// wrapper call never leaks its own binding.
pub(crate) struct BindScope<'a, G: GlBackend> {
    gl: &'a G,
    state: &'a RefCell<BindState>,
}

impl<'a, G: GlBackend> BindScope<'a, G> {
    pub(crate) fn enter(gl: &'a G, state: &'a RefCell<BindState>, texture: glow::Texture) -> Self {
        gl.active_texture(0);
        gl.bind_texture(Some(texture));
        Self { gl, state }
    }
}

impl<G: GlBackend> Drop for BindScope<'_, G> {
    fn drop(&mut self) {
        restore(self.gl, &self.state.borrow());
    }
}

/// Owns the GL handle and creates textures and shaders on it.
pub struct RenderContext<G: GlBackend = glow::Context> {
    gl: Arc<G>,
    bindings: Rc<RefCell<BindState>>,
}

impl<G: GlBackend> RenderContext<G> {
    pub fn new(gl: Arc<G>) -> Self {
        Self {
            gl,
            bindings: Rc::new(RefCell::new(BindState::default())),
        }
    }

    /// Returns the shared GL handle.
    pub fn gl(&self) -> &Arc<G> {
        &self.gl
    }

    pub(crate) fn bindings(&self) -> &Rc<RefCell<BindState>> {
        &self.bindings
    }

    /// Creates a 2D texture. `data` may be omitted for uncompressed formats,
    /// leaving the contents undefined until [`Texture::set_data`] is called.
    pub fn create_texture(
        &self,
        format: TextureFormat,
        width: u32,
        height: u32,
        data: Option<&[u8]>,
    ) -> Result<Texture<G>, TextureError> {
        Texture::create(self, format, width, height, data)
    }

    /// Uploads an image as an RGBA texture.
    pub fn create_texture_from_image(&self, image: &DynamicImage) -> Result<Texture<G>, TextureError> {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        self.create_texture(TextureFormat::Rgba, width, height, Some(rgba.as_raw().as_slice()))
    }

    /// Binds `texture` on `unit` and records it as the binding to restore.
    pub fn set_texture(&self, unit: u32, texture: Option<&Texture<G>>) {
        let id = texture.map(Texture::id);
        self.gl.active_texture(unit);
        self.gl.bind_texture(id);
        self.bindings.borrow_mut().record(unit, id);
    }

    /// The texture last bound on `unit` through [`RenderContext::set_texture`].
    pub fn bound_texture(&self, unit: u32) -> Option<glow::Texture> {
        self.bindings.borrow().bound(unit)
    }

    /// Returns the texture unit selected by the last [`RenderContext::set_texture`].
    pub fn active_unit(&self) -> u32 {
        self.bindings.borrow().active_unit
    }

    /// Re-applies the recorded binding, e.g. after foreign code touched GL state.
    pub fn restore_texture(&self) {
        restore(&*self.gl, &self.bindings.borrow());
    }

    /// Compiles a vertex shader.
    pub fn create_vertex_shader(&self, source: &str) -> Result<Rc<VertexShader<G>>, ShaderError> {
        VertexShader::compile(&self.gl, source).map(Rc::new)
    }

    /// Compiles a fragment shader.
    pub fn create_fragment_shader(&self, source: &str) -> Result<Rc<FragmentShader<G>>, ShaderError> {
        FragmentShader::compile(&self.gl, source).map(Rc::new)
    }

    /// Links a program that keeps both shaders alive for as long as it exists.
    pub fn create_program(
        &self,
        vertex: &Rc<VertexShader<G>>,
        fragment: &Rc<FragmentShader<G>>,
    ) -> Result<ShaderProgram<G>, ShaderError> {
        ShaderProgram::link(&self.gl, Rc::clone(vertex), Rc::clone(fragment))
    }

    /// Makes `program` current, or unbinds any program with `None`.
    pub fn set_shader(&self, program: Option<&ShaderProgram<G>>) {
        self.gl.use_program(program.map(ShaderProgram::handle));
    }

    /// Polls the driver for a pending error.
    ///
    /// Filter, wrap and upload calls do not check the driver themselves; call
    /// this when a failure there matters.
    pub fn check_error(&self) -> Result<(), GlError> {
        match GlError::from_code(self.gl.get_error()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingGl;

    fn context() -> RenderContext<RecordingGl> {
        RenderContext::new(Arc::new(RecordingGl::default()))
    }

    #[test]
    fn test_set_texture_records_binding() {
        let ctx = context();
        let a = ctx.create_texture(TextureFormat::Rgba, 2, 2, None).unwrap();
        let b = ctx.create_texture(TextureFormat::Rgba, 2, 2, None).unwrap();

        ctx.set_texture(0, Some(&a));
        ctx.set_texture(1, Some(&b));
        assert_eq!(ctx.bound_texture(0), Some(a.id()));
        assert_eq!(ctx.bound_texture(1), Some(b.id()));
        assert_eq!(ctx.bound_texture(5), None);
        assert_eq!(ctx.active_unit(), 1);

        let gl = ctx.gl().state();
        assert_eq!(gl.active_unit, 1);
        assert_eq!(gl.bound_on(0), Some(a.id()));
        assert_eq!(gl.bound_on(1), Some(b.id()));
    }

    #[test]
    fn test_dropping_texture_clears_recorded_binding() {
        let ctx = context();
        let a = ctx.create_texture(TextureFormat::Rgb, 4, 4, None).unwrap();
        let id = a.id();
        ctx.set_texture(0, Some(&a));
        ctx.set_texture(2, Some(&a));
        drop(a);

        assert_eq!(ctx.bound_texture(0), None);
        assert_eq!(ctx.bound_texture(2), None);
        assert_eq!(ctx.gl().state().deleted_textures, vec![id]);
    }

    #[test]
    fn test_restore_texture() {
        let ctx = context();
        let a = ctx.create_texture(TextureFormat::Alpha, 1, 1, None).unwrap();
        let b = ctx.create_texture(TextureFormat::Alpha, 1, 1, None).unwrap();
        ctx.set_texture(0, Some(&a));

        ctx.gl().active_texture(0);
        ctx.gl().bind_texture(Some(b.id()));
        ctx.restore_texture();
        assert_eq!(ctx.gl().state().bound_on(0), Some(a.id()));
    }

    #[test]
    fn test_check_error() {
        let ctx = context();
        assert_eq!(ctx.check_error(), Ok(()));
        ctx.gl().push_error(glow::INVALID_ENUM);
        assert_eq!(ctx.check_error(), Err(GlError::InvalidEnum));
        assert_eq!(ctx.check_error(), Ok(()));

        assert_eq!(GlError::from_code(0x9999), Some(GlError::Other(0x9999)));
        assert_eq!(GlError::Other(0x9999).to_string(), "GL error 0x9999");
    }
}
