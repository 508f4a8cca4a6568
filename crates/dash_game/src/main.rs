//! dash! -- main loop and application entry point.
//!
//! winit drives the event loop via `ApplicationHandler`. All simulation runs
//! inside `RedrawRequested` using a **fixed-timestep** model (see `TimeState`):
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed accumulator
//!   2. `while should_step()` -- advance the `World` by fixed-dt slices
//!   3. Rebuild the sprite mesh from the world
//!   4. Upload camera uniform, issue draw calls, composite the egui HUD
//!
//! The game config is watched via mtime polling and reloaded at a frame
//! boundary; a reload rebuilds textures and restarts the level.

mod assets;
mod collision;
mod config;
mod frame;
mod mesh;
mod obstacle;
mod parallax;
mod player;
#[cfg(test)]
mod replay;
mod world;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use assets::{ManagedTexture, SheetSizes, TextureId, TextureSet};
use config::{load_config_from_path, load_config_or_default, ConfigWatcher, GameConfig};
use dash_core::input::{InputState, Key};
use dash_core::time::TimeState;
use dash_overlay::{Banner, Hud, HudStats};
use dash_render::{Camera2D, GpuContext, SpritePipeline, SpriteVertex, Texture};
use frame::FrameInput;
use mesh::{build_world_mesh, DrawCall};
use world::World;

const CONFIG_PATH: &str = "assets/config/dash.json";

const CLEAR_COLOR: wgpu::Color = wgpu::Color::WHITE;

struct GpuSpriteTexture {
    texture: Texture,
    bind_group: wgpu::BindGroup,
}

impl ManagedTexture for GpuSpriteTexture {
    fn size(&self) -> (u32, u32) {
        self.texture.size
    }

    fn release(self) {
        self.texture.destroy();
    }
}

/// All mutable game state lives here. Constructed lazily in
/// `ApplicationHandler::resumed` once the window and GPU surface are available.
struct DashState {
    window: Arc<Window>,
    gpu: GpuContext,
    time: TimeState,
    input: InputState,
    camera: Camera2D,
    sprite_pipeline: SpritePipeline,
    hud: Hud,

    // --- Hot-reloadable content -------------------------------------------------
    config_path: PathBuf,
    config_watcher: ConfigWatcher,
    config: GameConfig,
    textures: TextureSet<GpuSpriteTexture>,
    sheet_sizes: SheetSizes,
    world: World,

    // --- Per-frame GPU mesh state -----------------------------------------------
    // Buffers grow (power-of-two) but never shrink.
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    mesh_vertex_capacity: usize,
    mesh_index_capacity: usize,
    draw_calls: Vec<DrawCall>,
    sprite_count: usize,
}

impl DashState {
    fn new(window: Arc<Window>, config_path: PathBuf, config: GameConfig) -> Result<Self, String> {
        let gpu = GpuContext::new(window.clone())?;
        let sprite_pipeline = SpritePipeline::new(&gpu.device, gpu.surface_format);
        let hud = Hud::new(&gpu.device, gpu.surface_format, &window);

        let textures = load_textures(&gpu, &sprite_pipeline, &config);
        let sheet_sizes = textures.sheet_sizes(&SheetSizes::fallback(&config));
        let world = World::new(&config, &sheet_sizes);

        // The game draws in logical pixels; the surface may be larger on HiDPI.
        let camera = Camera2D::screen_space(config.window.width, config.window.height);
        let camera_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform Buffer"),
                contents: bytemuck::cast_slice(&[camera.build_uniform()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group =
            sprite_pipeline.create_camera_bind_group(&gpu.device, &camera_buffer);
        let vertex_buffer = create_vertex_buffer(&gpu.device, 1);
        let index_buffer = create_index_buffer(&gpu.device, 1);

        let mut state = Self {
            window,
            gpu,
            time: TimeState::new(),
            input: InputState::new(),
            camera,
            sprite_pipeline,
            hud,
            config_watcher: ConfigWatcher::new(config_path.clone()),
            config_path,
            config,
            textures,
            sheet_sizes,
            world,
            vertex_buffer,
            index_buffer,
            camera_buffer,
            camera_bind_group,
            mesh_vertex_capacity: 0,
            mesh_index_capacity: 0,
            draw_calls: Vec::new(),
            sprite_count: 0,
        };
        state.rebuild_mesh();
        Ok(state)
    }

    fn restart(&mut self, reason: &str) {
        self.world = World::new(&self.config, &self.sheet_sizes);
        log::info!("Level restarted ({reason})");
    }

    fn reload_config(&mut self, reason: &str) {
        let candidate = match load_config_from_path(&self.config_path) {
            Ok(config) => config,
            Err(err) => {
                log::error!(
                    "Config reload failed ({reason}) for '{}': {err}. Keeping previous config.",
                    self.config_path.display()
                );
                return;
            }
        };

        if candidate.window != self.config.window {
            self.window.set_title(&candidate.window.title);
            if (candidate.window.width, candidate.window.height)
                != (self.config.window.width, self.config.window.height)
            {
                log::warn!("Window size changes take effect on next launch");
            }
        }

        let released = self.textures.release_all();
        log::debug!("Released {released} texture(s) for reload");
        self.textures = load_textures(&self.gpu, &self.sprite_pipeline, &candidate);
        // The window is fixed-size, so the level keeps the running dimensions.
        let mut config = candidate;
        config.window.width = self.config.window.width;
        config.window.height = self.config.window.height;
        self.sheet_sizes = self.textures.sheet_sizes(&SheetSizes::fallback(&config));
        self.config = config;

        log::info!(
            "Config reloaded ({reason}) from '{}'",
            self.config_path.display()
        );
        self.restart("config reload");
    }

    fn outcome_banner(&self) -> Option<Banner> {
        let banner = &self.config.banner;
        let text = self.world.outcome().banner_text(banner)?;
        Some(Banner {
            text: text.to_string(),
            position: (self.world.width / 4.0, self.world.height / 2.0),
            font_size: banner.font_size,
            color: banner.color,
        })
    }

    fn hud_stats(&self) -> HudStats {
        let player = &self.world.player;
        HudStats {
            outcome_label: self.world.outcome().label().to_string(),
            motion_label: player.motion.label().to_string(),
            player_y: player.anim.position.y,
            player_velocity: player.velocity_y,
            finish_distance: self.world.finish_distance(),
            obstacle_count: self.world.obstacles.len() as u32,
            sprite_count: self.sprite_count as u32,
            draw_calls: self.draw_calls.len() as u32,
        }
    }

    fn rebuild_mesh(&mut self) {
        let batch = build_world_mesh(&self.world, &self.sheet_sizes, self.config.parallax.scale);
        self.ensure_mesh_capacity(batch.vertices.len(), batch.indices.len());
        self.sprite_count = batch.quad_count();
        if !batch.is_empty() {
            self.gpu
                .queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&batch.vertices));
            self.gpu
                .queue
                .write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&batch.indices));
        }
        self.draw_calls = batch.draw_calls;
    }

    fn ensure_mesh_capacity(&mut self, vertex_count: usize, index_count: usize) {
        let needed_vertices = vertex_count.max(1);
        if needed_vertices > self.mesh_vertex_capacity {
            self.mesh_vertex_capacity = needed_vertices.next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(&self.gpu.device, self.mesh_vertex_capacity);
        }

        let needed_indices = index_count.max(1);
        if needed_indices > self.mesh_index_capacity {
            self.mesh_index_capacity = needed_indices.next_power_of_two();
            self.index_buffer = create_index_buffer(&self.gpu.device, self.mesh_index_capacity);
        }
    }
}

struct App {
    config_path: PathBuf,
    config: GameConfig,
    state: Option<DashState>,
}

impl App {
    fn new(config_path: PathBuf, config: GameConfig) -> Self {
        Self {
            config_path,
            config,
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window = match dash_platform::create_window(event_loop, &self.config.platform_config())
        {
            Ok(window) => window,
            Err(err) => {
                log::error!("{err}");
                event_loop.exit();
                return;
            }
        };
        match DashState::new(window, self.config_path.clone(), self.config.clone()) {
            Ok(state) => self.state = Some(state),
            Err(err) => {
                log::error!("Failed to initialize renderer: {err}");
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if !state.textures.is_empty() {
            let released = state.textures.release_all();
            log::info!("Released {released} texture(s) on exit");
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        let egui_consumed = state.hud.handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    log::info!("Surface resized to {}x{}", w, h);
                }
            }

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(game_key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed => state.input.key_down(game_key),
                            ElementState::Released => state.input.key_up(game_key),
                        }
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }

                // Fixed-step simulation phase.
                state.time.begin_frame();
                let dt = state.time.fixed_dt();
                let dt_us = state.time.fixed_dt_us;
                let mut level_changed = false;

                let mut frame_input = FrameInput::new();
                while state.time.should_step() {
                    let commands = frame_input.next_step(&state.input);
                    if commands.quit {
                        log::info!("Escape pressed, exiting.");
                        event_loop.exit();
                        return;
                    }
                    if commands.toggle_debug {
                        state.hud.toggle_debug();
                    }
                    if commands.restart {
                        state.restart("manual trigger (R)");
                        level_changed = true;
                    } else if state.time.steps_this_frame == 1
                        && state.config_watcher.should_reload()
                    {
                        state.reload_config("file watcher");
                        level_changed = true;
                    }

                    state.world.step(commands.step, dt, dt_us);
                }
                frame_input.finish(&mut state.input);

                if level_changed || state.time.steps_this_frame > 0 {
                    state.rebuild_mesh();
                }

                // Render phase reads finalized simulation state from this frame.
                state.gpu.queue.write_buffer(
                    &state.camera_buffer,
                    0,
                    bytemuck::cast_slice(&[state.camera.build_uniform()]),
                );

                let Some((output, view)) = state.gpu.begin_frame() else {
                    return;
                };

                let banner = state.outcome_banner();
                let stats = state.hud_stats();
                let (egui_primitives, egui_textures_delta, hud_actions) =
                    state
                        .hud
                        .prepare(&state.window, &state.time, banner.as_ref(), Some(stats));

                let screen_descriptor = egui_wgpu::ScreenDescriptor {
                    size_in_pixels: [state.gpu.size.0, state.gpu.size.1],
                    pixels_per_point: state.window.scale_factor() as f32,
                };

                let mut encoder =
                    state
                        .gpu
                        .device
                        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("Render Encoder"),
                        });

                {
                    let mut last_bound_texture: Option<TextureId> = None;
                    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("Scene Render Pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: None,
                        ..Default::default()
                    });

                    render_pass.set_pipeline(&state.sprite_pipeline.render_pipeline);
                    render_pass.set_bind_group(0, &state.camera_bind_group, &[]);
                    render_pass.set_vertex_buffer(0, state.vertex_buffer.slice(..));
                    render_pass
                        .set_index_buffer(state.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

                    for draw in &state.draw_calls {
                        if let Some(texture) = state.textures.get(draw.texture) {
                            if last_bound_texture != Some(draw.texture) {
                                render_pass.set_bind_group(1, &texture.bind_group, &[]);
                                last_bound_texture = Some(draw.texture);
                            }
                            render_pass.draw_indexed(
                                draw.index_start..(draw.index_start + draw.index_count),
                                0,
                                0..1,
                            );
                        }
                    }
                }

                state.hud.upload(
                    &state.gpu.device,
                    &state.gpu.queue,
                    &mut encoder,
                    &egui_primitives,
                    &egui_textures_delta,
                    &screen_descriptor,
                );

                {
                    let mut egui_pass = encoder
                        .begin_render_pass(&wgpu::RenderPassDescriptor {
                            label: Some("egui Render Pass"),
                            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                                view: &view,
                                resolve_target: None,
                                ops: wgpu::Operations {
                                    load: wgpu::LoadOp::Load,
                                    store: wgpu::StoreOp::Store,
                                },
                            })],
                            depth_stencil_attachment: None,
                            ..Default::default()
                        })
                        .forget_lifetime();

                    state
                        .hud
                        .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
                }

                state.hud.cleanup(&egui_textures_delta);

                state.gpu.queue.submit(std::iter::once(encoder.finish()));
                output.present();

                if hud_actions.restart {
                    state.restart("HUD button");
                    state.rebuild_mesh();
                }
            }

            _ => {}
        }
    }
}

/// Load every texture the config names, substituting a solid placeholder for
/// any file that is missing or fails to decode.
fn load_textures(
    gpu: &GpuContext,
    pipeline: &SpritePipeline,
    config: &GameConfig,
) -> TextureSet<GpuSpriteTexture> {
    let set = TextureSet::acquire_all(|id| {
        let texture = load_texture_or_placeholder(gpu, id, config);
        let bind_group = pipeline.create_texture_bind_group(&gpu.device, &texture);
        GpuSpriteTexture {
            texture,
            bind_group,
        }
    });
    log::info!("Loaded {} texture(s)", set.len());
    set
}

fn load_texture_or_placeholder(gpu: &GpuContext, id: TextureId, config: &GameConfig) -> Texture {
    let texture_config = id.config(config);
    let path = Path::new(&texture_config.path);
    let loaded = std::fs::read(path)
        .map_err(|e| format!("Failed to read '{}': {e}", path.display()))
        .and_then(|bytes| Texture::from_bytes(&gpu.device, &gpu.queue, &bytes, id.label()));

    match loaded {
        Ok(texture) => {
            log::info!(
                "Loaded {} texture '{}' ({}x{})",
                id.label(),
                path.display(),
                texture.size.0,
                texture.size.1
            );
            texture
        }
        Err(err) => {
            let [width, height] = texture_config.fallback_size;
            log::warn!(
                "{err}. Using {}x{} placeholder for {} texture.",
                width,
                height,
                id.label()
            );
            Texture::solid(
                &gpu.device,
                &gpu.queue,
                texture_config.fallback_color,
                width,
                height,
                id.label(),
            )
            .unwrap_or_else(|err| {
                log::error!("{err}. Using 1x1 placeholder for {} texture.", id.label());
                Texture::from_rgba8(
                    &gpu.device,
                    &gpu.queue,
                    &texture_config.fallback_color,
                    1,
                    1,
                    id.label(),
                )
            })
        }
    }
}

fn create_vertex_buffer(device: &wgpu::Device, vertex_capacity: usize) -> wgpu::Buffer {
    let byte_len = (vertex_capacity * std::mem::size_of::<SpriteVertex>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Sprite Vertex Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, index_capacity: usize) -> wgpu::Buffer {
    let byte_len = (index_capacity * std::mem::size_of::<u32>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Sprite Index Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::Space => Some(Key::Space),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyR => Some(Key::R),
        KeyCode::F3 => Some(Key::F3),
        KeyCode::Escape => Some(Key::Escape),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("dash! starting...");

    let config_path = PathBuf::from(CONFIG_PATH);
    let config = match load_config_or_default(&config_path) {
        Ok(config) => config,
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            log::error!("Failed to create event loop: {err}");
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config_path, config);
    if let Err(err) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {err}");
        std::process::exit(1);
    }
}
