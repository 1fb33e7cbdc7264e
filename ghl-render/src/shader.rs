//! GLSL Shaders
//!
//! This module defines the [`VertexShader`], [`FragmentShader`] and
//! [`ShaderProgram`] wrappers. A program resolves uniform locations lazily and
//! caches them by name; the [`UniformValue`] trait covers the value types a
//! [`ShaderUniform`] can be set to.

use std::{rc::Rc, sync::Arc};

use fxhash::FxHashMap;
use ghl_core::ghl_error;
use glam::{Mat4, Vec2, Vec3, Vec4};
use thiserror::Error;

use crate::backend::GlBackend;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    #[error("Failed to create GL object: {0}")]
    Create(String),

    #[error("Shader compilation failed: {0}")]
    Compile(String),

    #[error("Program link failed: {0}")]
    Link(String),
}

/// One compiled shader object, deleted when dropped.
struct Shader<G: GlBackend> {
    gl: Arc<G>,
    id: glow::Shader,
}

impl<G: GlBackend> Shader<G> {
    fn compile(gl: &Arc<G>, shader_type: u32, source: &str) -> Result<Self, ShaderError> {
        let id = gl.create_shader(shader_type).map_err(ShaderError::Create)?;
        if !gl.compile_shader(id, source) {
            let log = gl.shader_info_log(id);
            gl.delete_shader(id);
            ghl_error!("GLSL", "shader compile failed: {log}");
            return Err(ShaderError::Compile(log));
        }

        Ok(Self {
            gl: Arc::clone(gl),
            id,
        })
    }
}

impl<G: GlBackend> Drop for Shader<G> {
    fn drop(&mut self) {
        self.gl.delete_shader(self.id);
    }
}

pub struct VertexShader<G: GlBackend = glow::Context>(Shader<G>);

impl<G: GlBackend> VertexShader<G> {
    pub fn compile(gl: &Arc<G>, source: &str) -> Result<Self, ShaderError> {
        Shader::compile(gl, glow::VERTEX_SHADER, source).map(Self)
    }

    pub fn handle(&self) -> glow::Shader {
        self.0.id
    }
}

pub struct FragmentShader<G: GlBackend = glow::Context>(Shader<G>);

impl<G: GlBackend> FragmentShader<G> {
    pub fn compile(gl: &Arc<G>, source: &str) -> Result<Self, ShaderError> {
        Shader::compile(gl, glow::FRAGMENT_SHADER, source).map(Self)
    }

    pub fn handle(&self) -> glow::Shader {
        self.0.id
    }
}

/// A value that can be written to a uniform location.
pub trait UniformValue {
    fn apply<G: GlBackend + ?Sized>(&self, gl: &G, location: Option<&glow::UniformLocation>);
}

impl UniformValue for f32 {
    fn apply<G: GlBackend + ?Sized>(&self, gl: &G, location: Option<&glow::UniformLocation>) {
        gl.uniform_1_f32(location, *self);
    }
}

impl UniformValue for i32 {
    fn apply<G: GlBackend + ?Sized>(&self, gl: &G, location: Option<&glow::UniformLocation>) {
        gl.uniform_1_i32(location, *self);
    }
}

impl UniformValue for bool {
    fn apply<G: GlBackend + ?Sized>(&self, gl: &G, location: Option<&glow::UniformLocation>) {
        gl.uniform_1_i32(location, *self as i32);
    }
}

impl UniformValue for Vec2 {
    fn apply<G: GlBackend + ?Sized>(&self, gl: &G, location: Option<&glow::UniformLocation>) {
        gl.uniform_2_f32(location, self.x, self.y);
    }
}

impl UniformValue for Vec3 {
    fn apply<G: GlBackend + ?Sized>(&self, gl: &G, location: Option<&glow::UniformLocation>) {
        gl.uniform_3_f32(location, self.x, self.y, self.z);
    }
}

impl UniformValue for Vec4 {
    fn apply<G: GlBackend + ?Sized>(&self, gl: &G, location: Option<&glow::UniformLocation>) {
        gl.uniform_4_f32(location, self.x, self.y, self.z, self.w);
    }
}

impl UniformValue for Mat4 {
    fn apply<G: GlBackend + ?Sized>(&self, gl: &G, location: Option<&glow::UniformLocation>) {
        gl.uniform_matrix_4_f32(location, &self.to_cols_array());
    }
}

impl<T: UniformValue> UniformValue for &T {
    fn apply<G: GlBackend + ?Sized>(&self, gl: &G, location: Option<&glow::UniformLocation>) {
        (*self).apply(gl, location);
    }
}

/// A resolved uniform slot of one program.
///
/// The location is queried once and never changes. Uniforms the linker
/// dropped have no location; setting them is a no-op on the driver side.
pub struct ShaderUniform<G: GlBackend = glow::Context> {
    gl: Arc<G>,
    location: Option<glow::UniformLocation>,
}

impl<G: GlBackend> ShaderUniform<G> {
    pub fn location(&self) -> Option<&glow::UniformLocation> {
        self.location.as_ref()
    }

    pub fn set_float(&self, value: f32) {
        self.gl.uniform_1_f32(self.location.as_ref(), value);
    }

    pub fn set_int(&self, value: i32) {
        self.gl.uniform_1_i32(self.location.as_ref(), value);
    }

    pub fn set<T: UniformValue>(&self, value: T) {
        value.apply(&*self.gl, self.location.as_ref());
    }
}

/// Represents a linked GLSL program.
pub struct ShaderProgram<G: GlBackend = glow::Context> {
    gl: Arc<G>,
    id: glow::Program,
    vertex: Rc<VertexShader<G>>,
    fragment: Rc<FragmentShader<G>>,
    uniforms: FxHashMap<String, ShaderUniform<G>>,
}

impl<G: GlBackend> ShaderProgram<G> {
    /// Links a new program from a vertex and a fragment shader.
    pub fn link(
        gl: &Arc<G>,
        vertex: Rc<VertexShader<G>>,
        fragment: Rc<FragmentShader<G>>,
    ) -> Result<Self, ShaderError> {
        let program = gl.create_program().map_err(ShaderError::Create)?;
        gl.attach_shader(program, vertex.handle());
        gl.attach_shader(program, fragment.handle());

        if !gl.link_program(program) {
            let log = gl.program_info_log(program);
            gl.delete_program(program);
            ghl_error!("GLSL", "program link failed: {log}");
            return Err(ShaderError::Link(log));
        }

        gl.detach_shader(program, vertex.handle());
        gl.detach_shader(program, fragment.handle());

        Ok(Self {
            gl: Arc::clone(gl),
            id: program,
            vertex,
            fragment,
            uniforms: FxHashMap::default(),
        })
    }

    pub fn handle(&self) -> glow::Program {
        self.id
    }

    pub fn vertex_shader(&self) -> &Rc<VertexShader<G>> {
        &self.vertex
    }

    pub fn fragment_shader(&self) -> &Rc<FragmentShader<G>> {
        &self.fragment
    }

    /// Returns the uniform called `name`, querying its location the first
    /// time the name is seen.
    pub fn uniform(&mut self, name: &str) -> &ShaderUniform<G> {
        if !self.uniforms.contains_key(name) {
            let location = self.gl.uniform_location(self.id, name);
            self.uniforms.insert(
                name.to_owned(),
                ShaderUniform {
                    gl: Arc::clone(&self.gl),
                    location,
                },
            );
        }
        &self.uniforms[name]
    }

    /// Sets a uniform variable by name.
    pub fn set_uniform<T: UniformValue>(&mut self, name: &str, value: T) {
        self.uniform(name).set(value);
    }
}

impl<G: GlBackend> Drop for ShaderProgram<G> {
    fn drop(&mut self) {
        self.gl.delete_program(self.id);
    }
}
