//! A driverless [`GlBackend`] that records what the wrappers ask of it.

use std::{
    cell::{Ref, RefCell, RefMut},
    num::NonZero,
};

use fxhash::FxHashMap;

use crate::backend::GlBackend;

#[derive(Clone, Debug, PartialEq)]
pub struct Upload {
    pub level: i32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub format: u32,
    pub compressed: bool,
    /// `None` when the texture was allocated without data.
    pub len: Option<usize>,
    pub unpack_alignment: i32,
    pub unpack_row_length: i32,
}

#[derive(Debug, Default)]
pub struct TextureRecord {
    pub params: FxHashMap<u32, i32>,
    pub mipmap_generations: u32,
    pub uploads: Vec<Upload>,
}

impl TextureRecord {
    pub fn param(&self, parameter: u32) -> Option<i32> {
        self.params.get(&parameter).copied()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum UniformCall {
    Float(Option<glow::UniformLocation>, f32),
    Int(Option<glow::UniformLocation>, i32),
    Vec(Option<glow::UniformLocation>, Vec<f32>),
}

#[derive(Debug, Default)]
pub struct GlState {
    next_id: u32,
    pub active_unit: u32,
    bound: FxHashMap<u32, glow::Texture>,
    textures: FxHashMap<u32, TextureRecord>,
    pub created_textures: usize,
    pub deleted_textures: Vec<glow::Texture>,
    pixel_store: FxHashMap<u32, i32>,
    errors: Vec<u32>,

    pub fail_texture_alloc: bool,
    pub fail_compile: Option<String>,
    pub fail_link: Option<String>,
    pub deleted_shaders: Vec<glow::Shader>,
    pub deleted_programs: Vec<glow::Program>,
    pub used_program: Option<glow::Program>,
    pub uniform_queries: Vec<String>,
    pub uniform_calls: Vec<UniformCall>,
}

impl GlState {
    fn next(&mut self) -> NonZero<u32> {
        self.next_id += 1;
        NonZero::new(self.next_id).expect("id counter starts at 1")
    }

    pub fn bound_on(&self, unit: u32) -> Option<glow::Texture> {
        self.bound.get(&unit).copied()
    }

    pub fn texture(&self, texture: glow::Texture) -> &TextureRecord {
        &self.textures[&texture.0.get()]
    }

    pub fn pixel_store(&self, parameter: u32) -> i32 {
        let default = if parameter == glow::UNPACK_ALIGNMENT { 4 } else { 0 };
        self.pixel_store.get(&parameter).copied().unwrap_or(default)
    }

    /// The location the recorder hands out for `name`, if it was queried.
    pub fn location_of(&self, name: &str) -> Option<glow::UniformLocation> {
        self.uniform_queries
            .iter()
            .position(|queried| queried == name)
            .filter(|_| !name.starts_with("unused"))
            .map(|index| glow::NativeUniformLocation(index as u32))
    }

    fn current(&mut self) -> &mut TextureRecord {
        let texture = self
            .bound
            .get(&self.active_unit)
            .copied()
            .expect("no texture bound on the active unit");
        self.textures
            .get_mut(&texture.0.get())
            .expect("bound texture was deleted")
    }

    fn upload(&mut self, mut upload: Upload) {
        upload.unpack_alignment = self.pixel_store(glow::UNPACK_ALIGNMENT);
        upload.unpack_row_length = self.pixel_store(glow::UNPACK_ROW_LENGTH);
        self.current().uploads.push(upload);
    }
}

/// Tracks GL state in memory. Uniform names starting with `unused` resolve to
/// no location, like uniforms the linker optimised away.
#[derive(Debug, Default)]
pub struct RecordingGl {
    state: RefCell<GlState>,
}

impl RecordingGl {
    pub fn state(&self) -> Ref<'_, GlState> {
        self.state.borrow()
    }

    pub fn state_mut(&self) -> RefMut<'_, GlState> {
        self.state.borrow_mut()
    }

    pub fn push_error(&self, code: u32) {
        self.state.borrow_mut().errors.push(code);
    }
}

impl GlBackend for RecordingGl {
    fn create_texture(&self) -> Result<glow::Texture, String> {
        let mut state = self.state.borrow_mut();
        if state.fail_texture_alloc {
            return Err("out of texture names".to_string());
        }
        let id = state.next();
        state.textures.insert(id.get(), TextureRecord::default());
        state.created_textures += 1;
        Ok(glow::NativeTexture(id))
    }

    fn delete_texture(&self, texture: glow::Texture) {
        let mut state = self.state.borrow_mut();
        state.textures.remove(&texture.0.get());
        state.bound.retain(|_, bound| *bound != texture);
        state.deleted_textures.push(texture);
    }

    fn active_texture(&self, unit: u32) {
        self.state.borrow_mut().active_unit = unit;
    }

    fn bind_texture(&self, texture: Option<glow::Texture>) {
        let mut state = self.state.borrow_mut();
        let unit = state.active_unit;
        match texture {
            Some(texture) => state.bound.insert(unit, texture),
            None => state.bound.remove(&unit),
        };
    }

    fn tex_parameter(&self, parameter: u32, value: i32) {
        self.state.borrow_mut().current().params.insert(parameter, value);
    }

    fn tex_image_2d(
        &self,
        level: i32,
        _internal_format: i32,
        width: i32,
        height: i32,
        format: u32,
        _ty: u32,
        pixels: Option<&[u8]>,
    ) {
        self.state.borrow_mut().upload(Upload {
            level,
            x: 0,
            y: 0,
            width,
            height,
            format,
            compressed: false,
            len: pixels.map(<[u8]>::len),
            unpack_alignment: 0,
            unpack_row_length: 0,
        });
    }

    fn compressed_tex_image_2d(
        &self,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        pixels: &[u8],
    ) {
        self.state.borrow_mut().upload(Upload {
            level,
            x: 0,
            y: 0,
            width,
            height,
            format: internal_format as u32,
            compressed: true,
            len: Some(pixels.len()),
            unpack_alignment: 0,
            unpack_row_length: 0,
        });
    }

    fn tex_sub_image_2d(
        &self,
        level: i32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: u32,
        _ty: u32,
        pixels: &[u8],
    ) {
        self.state.borrow_mut().upload(Upload {
            level,
            x,
            y,
            width,
            height,
            format,
            compressed: false,
            len: Some(pixels.len()),
            unpack_alignment: 0,
            unpack_row_length: 0,
        });
    }

    fn compressed_tex_sub_image_2d(
        &self,
        level: i32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: u32,
        pixels: &[u8],
    ) {
        self.state.borrow_mut().upload(Upload {
            level,
            x,
            y,
            width,
            height,
            format,
            compressed: true,
            len: Some(pixels.len()),
            unpack_alignment: 0,
            unpack_row_length: 0,
        });
    }

    fn pixel_store(&self, parameter: u32, value: i32) {
        self.state.borrow_mut().pixel_store.insert(parameter, value);
    }

    fn generate_mipmap(&self) {
        self.state.borrow_mut().current().mipmap_generations += 1;
    }

    fn get_error(&self) -> u32 {
        let mut state = self.state.borrow_mut();
        if state.errors.is_empty() {
            glow::NO_ERROR
        } else {
            state.errors.remove(0)
        }
    }

    fn create_shader(&self, _shader_type: u32) -> Result<glow::Shader, String> {
        Ok(glow::NativeShader(self.state.borrow_mut().next()))
    }

    fn compile_shader(&self, _shader: glow::Shader, _source: &str) -> bool {
        self.state.borrow().fail_compile.is_none()
    }

    fn shader_info_log(&self, _shader: glow::Shader) -> String {
        self.state.borrow().fail_compile.clone().unwrap_or_default()
    }

    fn delete_shader(&self, shader: glow::Shader) {
        self.state.borrow_mut().deleted_shaders.push(shader);
    }

    fn create_program(&self) -> Result<glow::Program, String> {
        Ok(glow::NativeProgram(self.state.borrow_mut().next()))
    }

    fn attach_shader(&self, _program: glow::Program, _shader: glow::Shader) {}

    fn detach_shader(&self, _program: glow::Program, _shader: glow::Shader) {}

    fn link_program(&self, _program: glow::Program) -> bool {
        self.state.borrow().fail_link.is_none()
    }

    fn program_info_log(&self, _program: glow::Program) -> String {
        self.state.borrow().fail_link.clone().unwrap_or_default()
    }

    fn delete_program(&self, program: glow::Program) {
        self.state.borrow_mut().deleted_programs.push(program);
    }

    fn use_program(&self, program: Option<glow::Program>) {
        self.state.borrow_mut().used_program = program;
    }

    fn uniform_location(&self, _program: glow::Program, name: &str) -> Option<glow::UniformLocation> {
        let mut state = self.state.borrow_mut();
        state.uniform_queries.push(name.to_owned());
        state.location_of(name)
    }

    fn uniform_1_f32(&self, location: Option<&glow::UniformLocation>, x: f32) {
        self.state
            .borrow_mut()
            .uniform_calls
            .push(UniformCall::Float(location.cloned(), x));
    }

    fn uniform_1_i32(&self, location: Option<&glow::UniformLocation>, x: i32) {
        self.state
            .borrow_mut()
            .uniform_calls
            .push(UniformCall::Int(location.cloned(), x));
    }

    fn uniform_2_f32(&self, location: Option<&glow::UniformLocation>, x: f32, y: f32) {
        self.state
            .borrow_mut()
            .uniform_calls
            .push(UniformCall::Vec(location.cloned(), vec![x, y]));
    }

    fn uniform_3_f32(&self, location: Option<&glow::UniformLocation>, x: f32, y: f32, z: f32) {
        self.state
            .borrow_mut()
            .uniform_calls
            .push(UniformCall::Vec(location.cloned(), vec![x, y, z]));
    }

    fn uniform_4_f32(&self, location: Option<&glow::UniformLocation>, x: f32, y: f32, z: f32, w: f32) {
        self.state
            .borrow_mut()
            .uniform_calls
            .push(UniformCall::Vec(location.cloned(), vec![x, y, z, w]));
    }

    fn uniform_matrix_4_f32(&self, location: Option<&glow::UniformLocation>, values: &[f32]) {
        self.state
            .borrow_mut()
            .uniform_calls
            .push(UniformCall::Vec(location.cloned(), values.to_vec()));
    }
}
