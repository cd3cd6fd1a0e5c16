//! Boss Doors -- main loop and application entry point.
//!
//! Architecture: winit drives the event loop via `ApplicationHandler`. All
//! simulation runs inside `RedrawRequested` using a fixed-timestep model
//! (see `TimeState`):
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed accumulator
//!   2. `while should_step()` -- consume fixed-dt slices, tick the game
//!   3. Rebuild the quad mesh from the game's draw list
//!   4. Upload camera uniform, issue draw calls, composite the egui HUD
//!
//! The game itself (`game::Game`) is headless; this file owns everything that
//! touches a device: window, GPU buffers, textures, the HUD overlay and the
//! audio output. Sound requests cross the boundary as `AudioCue`s drained
//! once per frame.

mod assets;
mod audio;
mod character;
mod constants;
mod door;
mod game;
mod rect;
mod view;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use assets::{load_manifest_from_path, AssetManifest};
use audio::AudioManager;
use bb_core::input::{InputState, Key};
use bb_core::time::TimeState;
use bb_platform::window::PlatformConfig;
use bb_render::{GpuContext, ScreenCamera, SpritePipeline, SpriteVertex, Texture};
use bb_ui::HudOverlay;
use constants::{SCREEN_HEIGHT, SCREEN_WIDTH};
use game::{AudioCue, Game};
use view::{build_draw_list, build_hud, DrawCmd, SpriteKey};

const MANIFEST_PATH: &str = "assets/manifest.json";
const WHITE_ASSET: &str = "__white";
const OUTLINE_THICKNESS: i32 = 2;

/// A contiguous run of indices that share the same texture binding.
/// Draw calls are merged when consecutive quads use the same texture,
/// minimizing GPU bind-group switches during the render pass.
#[derive(Debug, Clone)]
struct DrawCall {
    texture_key: Arc<str>,
    index_start: u32,
    index_count: u32,
}

struct GpuSpriteTexture {
    #[allow(dead_code)]
    texture: Texture,
    bind_group: wgpu::BindGroup,
}

/// All mutable engine state. Constructed lazily in
/// `ApplicationHandler::resumed` once the window and GPU surface exist.
struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    time: TimeState,
    input: InputState,
    camera: ScreenCamera,
    sprite_pipeline: SpritePipeline,
    hud: HudOverlay,

    game: Game,
    manifest: AssetManifest,
    audio: Option<AudioManager>,
    textures: HashMap<Arc<str>, GpuSpriteTexture>,

    // The quad mesh is rebuilt on the CPU each simulated frame, then streamed
    // into these GPU buffers. Buffers grow (power-of-two) but never shrink.
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    mesh_vertex_capacity: usize,
    mesh_index_capacity: usize,
    draw_calls: Vec<DrawCall>,
}

impl EngineState {
    fn new(window: Arc<Window>) -> Self {
        let gpu = GpuContext::new(window.clone());
        let time = TimeState::new();
        let input = InputState::new();
        let sprite_pipeline = SpritePipeline::new(&gpu.device, gpu.surface_format);
        let hud = HudOverlay::new(&gpu.device, gpu.surface_format, &window);

        let manifest_path = Path::new(MANIFEST_PATH);
        let manifest = if manifest_path.exists() {
            match load_manifest_from_path(manifest_path) {
                Ok(manifest) => manifest,
                Err(err) => {
                    log::error!("{err}; using built-in asset paths");
                    AssetManifest::built_in()
                }
            }
        } else {
            log::warn!(
                "Asset manifest '{}' not found, using built-in asset paths",
                manifest_path.display()
            );
            AssetManifest::built_in()
        };

        let audio = AudioManager::new(&manifest);

        let camera = ScreenCamera::new(SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32);
        let camera_uniform = camera.build_uniform();
        let camera_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform Buffer"),
                contents: bytemuck::cast_slice(&[camera_uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group =
            sprite_pipeline.create_camera_bind_group(&gpu.device, &camera_buffer);
        let vertex_buffer = create_vertex_buffer(&gpu.device, 1);
        let index_buffer = create_index_buffer(&gpu.device, 1);

        let mut state = Self {
            window,
            gpu,
            time,
            input,
            camera,
            sprite_pipeline,
            hud,
            game: Game::new(),
            manifest,
            audio,
            textures: HashMap::new(),
            vertex_buffer,
            index_buffer,
            camera_buffer,
            camera_bind_group,
            mesh_vertex_capacity: 0,
            mesh_index_capacity: 0,
            draw_calls: Vec::new(),
        };

        // Startup order matters: load textures before building the first mesh.
        state.load_textures();
        state.rebuild_mesh();
        state
    }

    /// Loads every texture the game can ever reference. Missing or broken
    /// image files degrade to 1x1 solid-color stand-ins so the game always
    /// renders something.
    fn load_textures(&mut self) {
        let entries: Vec<(Arc<str>, String, [u8; 4])> = {
            let mut entries = vec![
                (
                    texture_key(&SpriteKey::Player),
                    self.manifest.player_sprite.clone(),
                    [0, 150, 255, 255],
                ),
                (
                    texture_key(&SpriteKey::RoomBackground),
                    self.manifest.room_background.clone(),
                    [40, 40, 55, 255],
                ),
            ];
            for (name, enemy) in &self.manifest.enemies {
                entries.push((
                    texture_key(&SpriteKey::Enemy(name.clone())),
                    enemy.sprite.clone(),
                    [255, 100, 100, 255],
                ));
                entries.push((
                    texture_key(&SpriteKey::BattleBackground(name.clone())),
                    enemy.background.clone(),
                    [70, 45, 45, 255],
                ));
            }
            entries
        };

        for (key, path, fallback_color) in entries {
            let texture = self.load_texture_or_fallback(&path, fallback_color);
            self.textures.insert(key, texture);
        }

        let white = Texture::from_rgba8(
            &self.gpu.device,
            &self.gpu.queue,
            &[255, 255, 255, 255],
            1,
            1,
            WHITE_ASSET,
        );
        let bind_group = self
            .sprite_pipeline
            .create_texture_bind_group(&self.gpu.device, &white);
        self.textures.insert(
            Arc::from(WHITE_ASSET),
            GpuSpriteTexture {
                texture: white,
                bind_group,
            },
        );
    }

    fn load_texture_or_fallback(&self, path: &str, fallback_color: [u8; 4]) -> GpuSpriteTexture {
        let texture = match std::fs::read(path) {
            Ok(bytes) => {
                match Texture::from_bytes(&self.gpu.device, &self.gpu.queue, &bytes, path) {
                    Ok(texture) => Some(texture),
                    Err(err) => {
                        log::warn!("{err}; using solid-color fallback");
                        None
                    }
                }
            }
            Err(err) => {
                log::warn!("Failed to read texture '{path}': {err}; using solid-color fallback");
                None
            }
        };
        let texture = texture.unwrap_or_else(|| {
            Texture::from_rgba8(&self.gpu.device, &self.gpu.queue, &fallback_color, 1, 1, path)
        });
        let bind_group = self
            .sprite_pipeline
            .create_texture_bind_group(&self.gpu.device, &texture);
        GpuSpriteTexture {
            texture,
            bind_group,
        }
    }

    fn rebuild_mesh(&mut self) {
        let (vertices, indices, draw_calls) = self.build_mesh();
        self.ensure_mesh_capacity(vertices.len(), indices.len());
        self.draw_calls = draw_calls;

        if !vertices.is_empty() {
            self.gpu
                .queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
        }
        if !indices.is_empty() {
            self.gpu
                .queue
                .write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&indices));
        }
    }

    fn build_mesh(&self) -> (Vec<SpriteVertex>, Vec<u32>, Vec<DrawCall>) {
        let cmds = build_draw_list(&self.game);
        let mut vertices = Vec::with_capacity(cmds.len() * 4);
        let mut indices = Vec::with_capacity(cmds.len() * 6);
        let mut draw_calls = Vec::with_capacity(8);

        for cmd in &cmds {
            match cmd {
                DrawCmd::Rect { rect, color } => {
                    add_quad(
                        &mut vertices,
                        &mut indices,
                        &mut draw_calls,
                        Arc::from(WHITE_ASSET),
                        *rect,
                        *color,
                    );
                }
                DrawCmd::RectOutline { rect, color } => {
                    // Top, bottom, left, right strips.
                    let t = OUTLINE_THICKNESS;
                    let strips = [
                        rect::Rect::new(rect.x, rect.y, rect.w, t),
                        rect::Rect::new(rect.x, rect.y + rect.h - t, rect.w, t),
                        rect::Rect::new(rect.x, rect.y, t, rect.h),
                        rect::Rect::new(rect.x + rect.w - t, rect.y, t, rect.h),
                    ];
                    for strip in strips {
                        add_quad(
                            &mut vertices,
                            &mut indices,
                            &mut draw_calls,
                            Arc::from(WHITE_ASSET),
                            strip,
                            *color,
                        );
                    }
                }
                DrawCmd::Sprite { rect, key } => {
                    add_quad(
                        &mut vertices,
                        &mut indices,
                        &mut draw_calls,
                        texture_key(key),
                        *rect,
                        [1.0, 1.0, 1.0, 1.0],
                    );
                }
            }
        }

        (vertices, indices, draw_calls)
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

    fn drain_audio(&mut self) {
        for cue in self.game.take_audio_cues() {
            let Some(audio) = &self.audio else {
                continue;
            };
            match cue {
                AudioCue::Music(track) => audio.play_music(&track),
                AudioCue::Effect(effect) => audio.play_effect(effect),
            }
        }
    }
}

struct App {
    config: PlatformConfig,
    state: Option<EngineState>,
}

impl App {
    fn new() -> Self {
        Self {
            config: PlatformConfig::default(),
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window = bb_platform::window::create_window(event_loop, &self.config);
        log::info!(
            "Window created: {}x{}",
            self.config.width,
            self.config.height
        );
        self.state = Some(EngineState::new(window));
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
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
                    log::info!("Resized to {}x{}", w, h);
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
                while state.time.should_step() {
                    if state.input.is_just_pressed(Key::F3) {
                        state.hud.toggle_debug();
                    }
                    let now_ms = state.time.wall_clock_ms();
                    state.game.step(&state.input, now_ms);
                }
                state.drain_audio();

                if state.time.steps_this_frame > 0 {
                    state.rebuild_mesh();
                }

                // Render phase reads finalized simulation state.
                let camera_uniform = state.camera.build_uniform();
                state.gpu.queue.write_buffer(
                    &state.camera_buffer,
                    0,
                    bytemuck::cast_slice(&[camera_uniform]),
                );

                let Some((output, view)) = state.gpu.begin_frame() else {
                    return;
                };

                let hud_model = build_hud(&state.game, state.time.wall_clock_ms());
                let (egui_primitives, egui_textures_delta) =
                    state.hud.prepare(&state.window, &state.time, &hud_model);
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
                    let mut last_bound_texture_key: Option<&Arc<str>> = None;
                    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("Scene Render Pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
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
                        if let Some(texture) = state.textures.get(&draw.texture_key) {
                            let need_rebind = match last_bound_texture_key {
                                Some(last) => **last != *draw.texture_key,
                                None => true,
                            };
                            if need_rebind {
                                render_pass.set_bind_group(1, &texture.bind_group, &[]);
                                last_bound_texture_key = Some(&draw.texture_key);
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
                            label: Some("HUD Render Pass"),
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

                // Only clear edge-triggered input (just_pressed / just_released)
                // after at least one fixed step consumed it. Otherwise a press
                // that lands on a frame with 0 simulation steps is silently lost.
                if state.time.steps_this_frame > 0 {
                    state.input.end_frame();
                }
            }

            _ => {}
        }
    }
}

/// Stable string key for the texture map and draw-call batching.
fn texture_key(key: &SpriteKey) -> Arc<str> {
    match key {
        SpriteKey::Player => Arc::from("player"),
        SpriteKey::Enemy(name) => Arc::from(format!("enemy/{name}").as_str()),
        SpriteKey::RoomBackground => Arc::from("bg/room"),
        SpriteKey::BattleBackground(name) => Arc::from(format!("bg/{name}").as_str()),
    }
}

fn create_vertex_buffer(device: &wgpu::Device, vertex_capacity: usize) -> wgpu::Buffer {
    let byte_len = (vertex_capacity * std::mem::size_of::<SpriteVertex>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Scene Vertex Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, index_capacity: usize) -> wgpu::Buffer {
    let byte_len = (index_capacity * std::mem::size_of::<u32>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Scene Index Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn add_quad(
    vertices: &mut Vec<SpriteVertex>,
    indices: &mut Vec<u32>,
    draw_calls: &mut Vec<DrawCall>,
    texture_key: Arc<str>,
    rect: rect::Rect,
    color: [f32; 4],
) {
    let left = rect.x as f32;
    let top = rect.y as f32;
    let right = (rect.x + rect.w) as f32;
    let bottom = (rect.y + rect.h) as f32;
    let base_index = vertices.len() as u32;

    vertices.push(SpriteVertex {
        position: [left, top],
        tex_coords: [0.0, 0.0],
        color,
    });
    vertices.push(SpriteVertex {
        position: [right, top],
        tex_coords: [1.0, 0.0],
        color,
    });
    vertices.push(SpriteVertex {
        position: [right, bottom],
        tex_coords: [1.0, 1.0],
        color,
    });
    vertices.push(SpriteVertex {
        position: [left, bottom],
        tex_coords: [0.0, 1.0],
        color,
    });

    let draw_start = indices.len() as u32;
    indices.extend_from_slice(&[
        base_index,
        base_index + 1,
        base_index + 2,
        base_index,
        base_index + 2,
        base_index + 3,
    ]);

    push_draw_call(draw_calls, texture_key, draw_start, 6);
}

/// Append a draw call, merging with the previous one when the texture matches
/// and indices are contiguous. Draw commands arrive back-to-front, so runs of
/// solid rects (ground, HP bars) collapse into single `draw_indexed` calls.
fn push_draw_call(
    draw_calls: &mut Vec<DrawCall>,
    texture_key: Arc<str>,
    index_start: u32,
    index_count: u32,
) {
    if let Some(last) = draw_calls.last_mut() {
        let contiguous = last.index_start + last.index_count == index_start;
        if *last.texture_key == *texture_key && contiguous {
            last.index_count += index_count;
            return;
        }
    }
    draw_calls.push(DrawCall {
        texture_key,
        index_start,
        index_count,
    });
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::Space => Some(Key::Space),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::KeyR => Some(Key::R),
        KeyCode::F3 => Some(Key::F3),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Boss Doors starting...");

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app).expect("Event loop error");
}
