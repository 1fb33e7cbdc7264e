//! Small interactive demo of the GHL render layer.
//!
//! Draws a checkerboard texture on a fullscreen triangle. `F` cycles the mip
//! filter, `L` toggles linear min/mag filtering, `W` toggles repeat wrapping.

use std::{fs::File, io::BufReader, sync::Arc, time::Instant};

use anyhow::Result;
use ghl_core::{SoundDecoder, WavDecoder, ghl_info, ghl_warning};
use ghl_render::{RenderContext, TextureFilter, TextureWrap};
use glam::Vec4;
use glow::HasContext;
use image::{DynamicImage, Rgba, RgbaImage};

use crate::{app::App, config::DemoConfig};

mod app;
mod config;

fn init_logging(verbose: bool) -> Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {:<5} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(if verbose {
            log::LevelFilter::Trace
        } else {
            log::LevelFilter::Info
        })
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}

fn checkerboard(size: u32, cell: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(size, size, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Rgba([235, 235, 235, 255])
        } else {
            Rgba([40, 40, 48, 255])
        }
    }))
}

fn next_mip_filter(filter: TextureFilter) -> TextureFilter {
    match filter {
        TextureFilter::None => TextureFilter::Nearest,
        TextureFilter::Nearest => TextureFilter::Linear,
        TextureFilter::Linear => TextureFilter::None,
    }
}

fn main() -> Result<()> {
    let (config, unknown) = DemoConfig::from_args(std::env::args().skip(1));
    init_logging(config.verbose)?;
    for arg in unknown {
        ghl_warning!("Demo", "ignoring argument '{arg}'");
    }

    if let Some(path) = &config.wav {
        let decoder = WavDecoder::new(BufReader::new(File::open(path)?))?;
        ghl_info!(
            "Demo",
            "{}: {:?}, {} Hz, {} samples",
            path.display(),
            decoder.sample_type(),
            decoder.frequency(),
            decoder.samples_amount()
        );
    }

    let mut app = App::new("GHL demo", &config)?;
    let ctx = RenderContext::new(Arc::clone(&app.gl));

    let mut texture = ctx.create_texture_from_image(&checkerboard(64, 8))?;
    texture.set_wrap_u(TextureWrap::Repeat);
    texture.set_wrap_v(TextureWrap::Repeat);

    let vert = ctx.create_vertex_shader(include_str!("shaders/quad/vert.glsl"))?;
    let frag = ctx.create_fragment_shader(include_str!("shaders/quad/frag.glsl"))?;
    let mut program = ctx.create_program(&vert, &frag)?;
    drop((vert, frag));

    let vao = unsafe { app.gl.create_vertex_array().map_err(anyhow::Error::msg)? };
    ctx.check_error()?;

    let start = Instant::now();
    'running: loop {
        for event in app.event_pump.poll_iter() {
            match event {
                sdl2::event::Event::Quit { .. } => break 'running,
                sdl2::event::Event::Window {
                    win_event: sdl2::event::WindowEvent::Resized(width, height),
                    ..
                } => unsafe {
                    app.gl.viewport(0, 0, width, height);
                },
                sdl2::event::Event::KeyDown {
                    keycode: Some(key), ..
                } => match key {
                    sdl2::keyboard::Keycode::F => {
                        texture.set_mip_filter(next_mip_filter(texture.mip_filter()));
                        ghl_info!("Demo", "mip filter: {:?}", texture.mip_filter());
                    }
                    sdl2::keyboard::Keycode::L => {
                        let filter = if texture.min_filter() == TextureFilter::Linear {
                            TextureFilter::Nearest
                        } else {
                            TextureFilter::Linear
                        };
                        texture.set_min_filter(filter);
                        texture.set_mag_filter(filter);
                        ghl_info!("Demo", "min/mag filter: {:?}", filter);
                    }
                    sdl2::keyboard::Keycode::W => {
                        let wrap = match texture.wrap_u() {
                            TextureWrap::Clamp => TextureWrap::Repeat,
                            TextureWrap::Repeat => TextureWrap::Clamp,
                        };
                        texture.set_wrap_u(wrap);
                        texture.set_wrap_v(wrap);
                        ghl_info!("Demo", "wrap: {:?}", wrap);
                    }
                    sdl2::keyboard::Keycode::Escape => break 'running,
                    _ => {}
                },
                _ => {}
            }
        }

        let t = start.elapsed().as_secs_f32();
        ctx.set_shader(Some(&program));
        ctx.set_texture(0, Some(&texture));
        program.uniform("u_texture").set_int(0);
        program.uniform("u_scale").set_float(2.0 + t.sin());
        program.set_uniform("u_tint", Vec4::new(1.0, 0.9 + 0.1 * t.cos(), 1.0, 1.0));

        unsafe {
            app.gl.clear_color(0.1, 0.1, 0.12, 1.0);
            app.gl.clear(glow::COLOR_BUFFER_BIT);
            app.gl.bind_vertex_array(Some(vao));
            app.gl.draw_arrays(glow::TRIANGLES, 0, 3);
        }
        if let Err(err) = ctx.check_error() {
            ghl_warning!("Demo", "GL error during frame: {err}");
        }

        app.window.gl_swap_window();
    }

    unsafe {
        app.gl.delete_vertex_array(vao);
    }
    Ok(())
}
