//! Game text rendered via egui on top of the sprite pass.
//!
//! Integration pattern: egui requires a three-phase render split because
//! `egui_wgpu::Renderer::render()` needs a `RenderPass<'static>`, while
//! `begin_render_pass` borrows the encoder. The phases are:
//!
//!   1. `prepare()` -- run egui UI logic, produce tessellated primitives
//!   2. `upload()`  -- upload textures and update GPU buffers (borrows encoder mutably)
//!   3. `paint()`   -- render into a new render pass with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui no longer references
//!
//! The HUD itself is data-driven: the game builds a `HudModel` each frame and
//! this module only decides fonts, anchors and colors per slot. An F3-toggled
//! debug window (frame timing, step counters) rides along in the same pass.

use bb_core::time::TimeState;
use winit::window::Window;

/// Per-frame text slots. Empty slots draw nothing.
#[derive(Debug, Clone, Default)]
pub struct HudModel {
    /// Top-center heading ("Choose a Door").
    pub heading: Option<String>,
    /// Transient highlight line below the heading ("You defeated X!").
    pub info: Option<String>,
    /// Context prompt ("Press SPACE to enter battle").
    pub prompt: Option<String>,
    /// Small instruction strip at the top of the battle screen.
    pub footer: Option<String>,
    /// Screen-center main text (menu prompt, game-over message).
    pub center: Option<String>,
    /// Smaller line under the center text ("Press R to restart").
    pub center_sub: Option<String>,
    /// Huge center banner ("FIGHT!").
    pub banner: Option<String>,
}

pub struct HudOverlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub debug_visible: bool,
}

impl HudOverlay {
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
        model: &HudModel,
    ) -> (Vec<egui::ClippedPrimitive>, egui::TexturesDelta) {
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let debug_visible = self.debug_visible;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            draw_model(ctx, model);

            if debug_visible {
                egui::Window::new("Debug")
                    .default_pos([10.0, 10.0])
                    .show(ctx, |ui| {
                        ui.label(format!("FPS: {:.1}", time.smoothed_fps));
                        ui.label(format!("Frame time: {:.2} ms", time.smoothed_frame_time_ms));
                        ui.label(format!("Steps this frame: {}", time.steps_this_frame));
                        ui.label(format!("Total steps: {}", time.fixed_step_count));
                        ui.label(format!("Frame: {}", time.frame_count));
                        ui.label(format!("Wall clock: {} ms", time.wall_clock_ms()));
                    });
            }
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta)
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

    /// Free textures that egui no longer needs. Call after rendering.
    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

fn draw_model(ctx: &egui::Context, model: &HudModel) {
    if let Some(text) = &model.heading {
        anchored_label(
            ctx,
            "hud_heading",
            egui::Align2::CENTER_TOP,
            [0.0, 20.0],
            egui::RichText::new(text)
                .size(26.0)
                .color(egui::Color32::BLACK),
        );
    }
    if let Some(text) = &model.info {
        anchored_label(
            ctx,
            "hud_info",
            egui::Align2::CENTER_TOP,
            [0.0, 60.0],
            egui::RichText::new(text)
                .size(17.0)
                .color(egui::Color32::YELLOW),
        );
    }
    if let Some(text) = &model.prompt {
        anchored_label(
            ctx,
            "hud_prompt",
            egui::Align2::CENTER_TOP,
            [0.0, 92.0],
            egui::RichText::new(text)
                .size(22.0)
                .color(egui::Color32::BLACK),
        );
    }
    if let Some(text) = &model.footer {
        anchored_label(
            ctx,
            "hud_footer",
            egui::Align2::CENTER_TOP,
            [0.0, 14.0],
            egui::RichText::new(text)
                .size(16.0)
                .color(egui::Color32::BLACK),
        );
    }
    if let Some(text) = &model.center {
        anchored_label(
            ctx,
            "hud_center",
            egui::Align2::CENTER_CENTER,
            [0.0, 0.0],
            egui::RichText::new(text)
                .size(26.0)
                .color(egui::Color32::WHITE),
        );
    }
    if let Some(text) = &model.center_sub {
        anchored_label(
            ctx,
            "hud_center_sub",
            egui::Align2::CENTER_CENTER,
            [0.0, 36.0],
            egui::RichText::new(text)
                .size(16.0)
                .color(egui::Color32::from_gray(180)),
        );
    }
    if let Some(text) = &model.banner {
        anchored_label(
            ctx,
            "hud_banner",
            egui::Align2::CENTER_CENTER,
            [0.0, 0.0],
            egui::RichText::new(text)
                .size(64.0)
                .strong()
                .color(egui::Color32::BLACK),
        );
    }
}

fn anchored_label(
    ctx: &egui::Context,
    id: &str,
    anchor: egui::Align2,
    offset: [f32; 2],
    text: egui::RichText,
) {
    egui::Area::new(egui::Id::new(id))
        .anchor(anchor, offset)
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(text);
        });
}
