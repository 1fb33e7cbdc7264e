//! The slice of OpenGL the wrappers talk to.
//!
//! [`GlBackend`] lists exactly the calls the texture and shader wrappers issue.
//! It is implemented for [`glow::Context`]; every texture call targets
//! `TEXTURE_2D`. All methods assume the context is current on the calling thread.

use glow::HasContext;

pub trait GlBackend {
    fn create_texture(&self) -> Result<glow::Texture, String>;
    fn delete_texture(&self, texture: glow::Texture);
    /// Selects texture unit `TEXTURE0 + unit`.
    fn active_texture(&self, unit: u32);
    fn bind_texture(&self, texture: Option<glow::Texture>);
    fn tex_parameter(&self, parameter: u32, value: i32);
    #[allow(clippy::too_many_arguments)]
    fn tex_image_2d(
        &self,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
        pixels: Option<&[u8]>,
    );
    fn compressed_tex_image_2d(
        &self,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        pixels: &[u8],
    );
    #[allow(clippy::too_many_arguments)]
    fn tex_sub_image_2d(
        &self,
        level: i32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
        pixels: &[u8],
    );
    #[allow(clippy::too_many_arguments)]
    fn compressed_tex_sub_image_2d(
        &self,
        level: i32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: u32,
        pixels: &[u8],
    );
    fn pixel_store(&self, parameter: u32, value: i32);
    fn generate_mipmap(&self);
    fn get_error(&self) -> u32;

    fn create_shader(&self, shader_type: u32) -> Result<glow::Shader, String>;
    /// Uploads the source, compiles it and reports the compile status.
    fn compile_shader(&self, shader: glow::Shader, source: &str) -> bool;
    fn shader_info_log(&self, shader: glow::Shader) -> String;
    fn delete_shader(&self, shader: glow::Shader);
    fn create_program(&self) -> Result<glow::Program, String>;
    fn attach_shader(&self, program: glow::Program, shader: glow::Shader);
    fn detach_shader(&self, program: glow::Program, shader: glow::Shader);
    /// Links the program and reports the link status.
    fn link_program(&self, program: glow::Program) -> bool;
    fn program_info_log(&self, program: glow::Program) -> String;
    fn delete_program(&self, program: glow::Program);
    fn use_program(&self, program: Option<glow::Program>);
    fn uniform_location(&self, program: glow::Program, name: &str) -> Option<glow::UniformLocation>;
    fn uniform_1_f32(&self, location: Option<&glow::UniformLocation>, x: f32);
    fn uniform_1_i32(&self, location: Option<&glow::UniformLocation>, x: i32);
    fn uniform_2_f32(&self, location: Option<&glow::UniformLocation>, x: f32, y: f32);
    fn uniform_3_f32(&self, location: Option<&glow::UniformLocation>, x: f32, y: f32, z: f32);
    fn uniform_4_f32(&self, location: Option<&glow::UniformLocation>, x: f32, y: f32, z: f32, w: f32);
    fn uniform_matrix_4_f32(&self, location: Option<&glow::UniformLocation>, values: &[f32]);
}

impl GlBackend for glow::Context {
    fn create_texture(&self) -> Result<glow::Texture, String> {
        unsafe { HasContext::create_texture(self) }
    }

    fn delete_texture(&self, texture: glow::Texture) {
        unsafe { HasContext::delete_texture(self, texture) }
    }

    fn active_texture(&self, unit: u32) {
        unsafe { HasContext::active_texture(self, glow::TEXTURE0 + unit) }
    }

    fn bind_texture(&self, texture: Option<glow::Texture>) {
        unsafe { HasContext::bind_texture(self, glow::TEXTURE_2D, texture) }
    }

    fn tex_parameter(&self, parameter: u32, value: i32) {
        unsafe { self.tex_parameter_i32(glow::TEXTURE_2D, parameter, value) }
    }

    fn tex_image_2d(
        &self,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
        pixels: Option<&[u8]>,
    ) {
        unsafe {
            HasContext::tex_image_2d(
                self,
                glow::TEXTURE_2D,
                level,
                internal_format,
                width,
                height,
                0,
                format,
                ty,
                glow::PixelUnpackData::Slice(pixels),
            )
        }
    }

    fn compressed_tex_image_2d(
        &self,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        pixels: &[u8],
    ) {
        unsafe {
            HasContext::compressed_tex_image_2d(
                self,
                glow::TEXTURE_2D,
                level,
                internal_format,
                width,
                height,
                0,
                pixels.len() as i32,
                pixels,
            )
        }
    }

    fn tex_sub_image_2d(
        &self,
        level: i32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
        pixels: &[u8],
    ) {
        unsafe {
            HasContext::tex_sub_image_2d(
                self,
                glow::TEXTURE_2D,
                level,
                x,
                y,
                width,
                height,
                format,
                ty,
                glow::PixelUnpackData::Slice(Some(pixels)),
            )
        }
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
        unsafe {
            HasContext::compressed_tex_sub_image_2d(
                self,
                glow::TEXTURE_2D,
                level,
                x,
                y,
                width,
                height,
                format,
                glow::CompressedPixelUnpackData::Slice(pixels),
            )
        }
    }

    fn pixel_store(&self, parameter: u32, value: i32) {
        unsafe { self.pixel_store_i32(parameter, value) }
    }

    fn generate_mipmap(&self) {
        unsafe { HasContext::generate_mipmap(self, glow::TEXTURE_2D) }
    }

    fn get_error(&self) -> u32 {
        unsafe { HasContext::get_error(self) }
    }

    fn create_shader(&self, shader_type: u32) -> Result<glow::Shader, String> {
        unsafe { HasContext::create_shader(self, shader_type) }
    }

    fn compile_shader(&self, shader: glow::Shader, source: &str) -> bool {
        unsafe {
            self.shader_source(shader, source);
            HasContext::compile_shader(self, shader);
            self.get_shader_compile_status(shader)
        }
    }

    fn shader_info_log(&self, shader: glow::Shader) -> String {
        unsafe { self.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: glow::Shader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }

    fn create_program(&self) -> Result<glow::Program, String> {
        unsafe { HasContext::create_program(self) }
    }

    fn attach_shader(&self, program: glow::Program, shader: glow::Shader) {
        unsafe { HasContext::attach_shader(self, program, shader) }
    }

    fn detach_shader(&self, program: glow::Program, shader: glow::Shader) {
        unsafe { HasContext::detach_shader(self, program, shader) }
    }

    fn link_program(&self, program: glow::Program) -> bool {
        unsafe {
            HasContext::link_program(self, program);
            self.get_program_link_status(program)
        }
    }

    fn program_info_log(&self, program: glow::Program) -> String {
        unsafe { self.get_program_info_log(program) }
    }

    fn delete_program(&self, program: glow::Program) {
        unsafe { HasContext::delete_program(self, program) }
    }

    fn use_program(&self, program: Option<glow::Program>) {
        unsafe { HasContext::use_program(self, program) }
    }

    fn uniform_location(&self, program: glow::Program, name: &str) -> Option<glow::UniformLocation> {
        unsafe { self.get_uniform_location(program, name) }
    }

    fn uniform_1_f32(&self, location: Option<&glow::UniformLocation>, x: f32) {
        unsafe { HasContext::uniform_1_f32(self, location, x) }
    }

    fn uniform_1_i32(&self, location: Option<&glow::UniformLocation>, x: i32) {
        unsafe { HasContext::uniform_1_i32(self, location, x) }
    }

    fn uniform_2_f32(&self, location: Option<&glow::UniformLocation>, x: f32, y: f32) {
        unsafe { HasContext::uniform_2_f32(self, location, x, y) }
    }

    fn uniform_3_f32(&self, location: Option<&glow::UniformLocation>, x: f32, y: f32, z: f32) {
        unsafe { HasContext::uniform_3_f32(self, location, x, y, z) }
    }

    fn uniform_4_f32(&self, location: Option<&glow::UniformLocation>, x: f32, y: f32, z: f32, w: f32) {
        unsafe { HasContext::uniform_4_f32(self, location, x, y, z, w) }
    }

    fn uniform_matrix_4_f32(&self, location: Option<&glow::UniformLocation>, values: &[f32]) {
        unsafe { self.uniform_matrix_4_f32_slice(location, false, values) }
    }
}
