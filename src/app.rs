//! SDL2 and OpenGL application management.
//!
//! This module defines the [`App`] struct which encapsulates the SDL2
//! and OpenGL context the demo renders into.

use std::sync::Arc;

use anyhow::Result;

use crate::config::DemoConfig;

/// The [`App`] struct encapsulates the SDL2 and OpenGL context.
pub struct App {
    _sdl: sdl2::Sdl,
    _video_subsystem: sdl2::VideoSubsystem,
    _gl_context: sdl2::video::GLContext,
    pub window: sdl2::video::Window,
    pub gl: Arc<glow::Context>,
    pub event_pump: sdl2::EventPump,
}

impl App {
    /// Creates a new [`App`] with a 3.3 core context. The configured size is
    /// ignored when `fullscreen` is set.
    pub fn new(title: &str, config: &DemoConfig) -> Result<Self> {
        let sdl = sdl2::init().map_err(anyhow::Error::msg)?;
        let video_subsystem = sdl.video().map_err(anyhow::Error::msg)?;
        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(sdl2::video::GLProfile::Core);
        gl_attr.set_context_version(3, 3);

        let (width, height) = if config.fullscreen {
            let mode = video_subsystem
                .current_display_mode(0)
                .map_err(anyhow::Error::msg)?;
            (mode.w as u32, mode.h as u32)
        } else {
            (config.width, config.height)
        };
        let mut window = video_subsystem
            .window(title, width, height)
            .opengl()
            .resizable()
            .build()?;
        if config.fullscreen {
            window
                .set_fullscreen(sdl2::video::FullscreenType::Desktop)
                .map_err(anyhow::Error::msg)?;
        }

        let gl_context = window.gl_create_context().map_err(anyhow::Error::msg)?;
        window
            .gl_make_current(&gl_context)
            .map_err(anyhow::Error::msg)?;
        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        let event_pump = sdl.event_pump().map_err(anyhow::Error::msg)?;

        Ok(Self {
            _sdl: sdl,
            _video_subsystem: video_subsystem,
            _gl_context: gl_context,
            window,
            gl: Arc::new(gl),
            event_pump,
        })
    }
}
