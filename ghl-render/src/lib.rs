//! OpenGL side of the Game Helpers Library.
//!
//! A [`RenderContext`] wraps a GL handle (normally a [`glow::Context`]) and
//! creates [`Texture`]s and shader programs on it. Every wrapper call that has
//! to bind a texture of its own puts the caller's binding back before it
//! returns.

pub mod backend;
pub mod context;
pub mod shader;
pub mod texture;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::GlBackend;
pub use context::{GlError, RenderContext};
pub use shader::{FragmentShader, ShaderError, ShaderProgram, ShaderUniform, UniformValue, VertexShader};
pub use texture::{Texture, TextureError, TextureFilter, TextureFormat, TextureWrap};
