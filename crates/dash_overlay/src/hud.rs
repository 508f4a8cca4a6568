//! egui layer drawn on top of the sprite pass: the end-of-run banner and an
//! F3 debug panel.
//!
//! egui needs a three-phase render split because `egui_wgpu::Renderer::render()`
//! wants a `RenderPass<'static>` while `begin_render_pass` borrows the encoder:
//!
//!   1. `prepare()` -- run UI logic, produce tessellated primitives
//!   2. `upload()`  -- upload textures and update GPU buffers (borrows encoder mutably)
//!   3. `paint()`   -- render into a new render pass with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui no longer references
//!
//! Banner coordinates are logical pixels, which are egui points.

use dash_core::time::TimeState;
use winit::window::Window;

/// Text drawn at a fixed screen position, e.g. "You Win!".
#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub text: String,
    pub position: (f32, f32),
    pub font_size: f32,
    pub color: [u8; 4],
}

#[derive(Debug, Clone, Default)]
pub struct HudStats {
    pub outcome_label: String,
    pub motion_label: String,
    pub player_y: f32,
    pub player_velocity: f32,
    pub finish_distance: f32,
    pub obstacle_count: u32,
    pub sprite_count: u32,
    pub draw_calls: u32,
}

#[derive(Debug, Clone, Default)]
pub struct HudActions {
    /// User clicked the restart button
    pub restart: bool,
}

pub struct Hud {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub debug_visible: bool,
}

impl Hud {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            debug_visible: false,
        }
    }

    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_winit_state.on_window_event(window, event);
        response.consumed
    }

    pub fn toggle_debug(&mut self) {
        self.debug_visible = !self.debug_visible;
        log::info!(
            "Debug panel: {}",
            if self.debug_visible { "ON" } else { "OFF" }
        );
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        time: &TimeState,
        banner: Option<&Banner>,
        stats: Option<HudStats>,
    ) -> (
        Vec<egui::ClippedPrimitive>,
        egui::TexturesDelta,
        HudActions,
    ) {
        let mut actions = HudActions::default();
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let debug_visible = self.debug_visible;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if let Some(banner) = banner {
                paint_banner(ctx, banner);
            }
            if debug_visible {
                egui::Window::new("Debug")
                    .default_pos([10.0, 10.0])
                    .show(ctx, |ui| {
                        ui.label(format!("FPS: {:.1}", time.smoothed_fps));
                        ui.label(format!("Frame time: {:.2} ms", time.smoothed_frame_time_ms));
                        ui.label(format!("Steps this frame: {}", time.steps_this_frame));
                        ui.label(format!("Total steps: {}", time.fixed_step_count));
                        ui.label(format!("Sim time: {:.2} s", time.total_time()));
                        if let Some(ref stats) = stats {
                            ui.separator();
                            ui.label(format!("Outcome: {}", stats.outcome_label));
                            ui.label(format!("Player: {}", stats.motion_label));
                            ui.label(format!("  y: {:.1}", stats.player_y));
                            ui.label(format!("  vy: {:.1}", stats.player_velocity));
                            ui.label(format!("Finish in: {:.0} px", stats.finish_distance));
                            ui.label(format!("Obstacles: {}", stats.obstacle_count));
                            ui.label(format!("Sprites: {}", stats.sprite_count));
                            ui.label(format!("Draw calls: {}", stats.draw_calls));
                            ui.separator();
                            if ui.button("Restart").clicked() {
                                actions.restart = true;
                            }
                        }
                    });
            }
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta, actions)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    /// Render into an existing render pass. Call after `upload()`.
    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

fn paint_banner(ctx: &egui::Context, banner: &Banner) {
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Foreground,
        egui::Id::new("dash_banner"),
    ));
    let [r, g, b, a] = banner.color;
    painter.text(
        egui::pos2(banner.position.0, banner.position.1),
        egui::Align2::LEFT_TOP,
        &banner.text,
        egui::FontId::proportional(banner.font_size),
        egui::Color32::from_rgba_unmultiplied(r, g, b, a),
    );
}
