//! Gauntlet - first-person obstacle course
//!
//! Opens a window, feeds keyboard and mouse input into the game and renders
//! it through wgpu every frame.

use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::WindowId,
};

use gauntlet::config::AppConfig;
use gauntlet::game::{FrameInput, Game};
use gauntlet::input::{InputAction, InputMapper};
use gauntlet::level::LevelAssets;
use gauntlet::systems::{RenderSystem, WindowSystem};
use gauntlet_input::PlayerController;
use gauntlet_render::{RenderError, WgpuBackend};

/// Main application state
struct App {
    config: AppConfig,
    window: Option<WindowSystem>,
    render: Option<RenderSystem<WgpuBackend>>,
    game: Option<Game>,
    controller: PlayerController,
    mapper: InputMapper,
    /// A click arrived since the last frame
    clicked: bool,
    last_frame: Instant,
    last_summary: String,
}

impl App {
    fn new(config: AppConfig) -> Self {
        let controller = PlayerController::new().with_mouse_sensitivity(config.input.mouse_sensitivity);
        let mapper = InputMapper::new(config.debug.level_skip_keys);
        Self {
            config,
            window: None,
            render: None,
            game: None,
            controller,
            mapper,
            clicked: false,
            last_frame: Instant::now(),
            last_summary: String::new(),
        }
    }

    /// Create the window, the GPU backend and the game
    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn std::error::Error>> {
        let window = WindowSystem::create(event_loop, &self.config.window)?;
        let mut backend = pollster::block_on(WgpuBackend::new(window.window().clone(), self.config.window.vsync))?;

        let assets = LevelAssets::create(&mut backend);
        let game = Game::new(self.config.to_game_config(), self.config.to_physics_config(), assets)?;
        let render = RenderSystem::new(backend, game.camera_node(), &self.config);

        log::info!("{} levels, starting at level {}", game.level_count(), game.current_level());
        self.window = Some(window);
        self.render = Some(render);
        self.game = Some(game);
        self.last_frame = Instant::now();
        Ok(())
    }

    fn handle_action(&mut self, action: InputAction, event_loop: &ActiveEventLoop) {
        match action {
            InputAction::ToggleCursor => {
                if let Some(window) = &mut self.window {
                    let locked = window.set_pointer_lock(!window.is_pointer_locked());
                    self.controller.set_pointer_locked(locked);
                }
            }
            InputAction::Exit => event_loop.exit(),
            InputAction::ToggleFullscreen => {
                if let Some(window) = &self.window {
                    window.toggle_fullscreen();
                }
            }
            InputAction::Click => self.clicked = true,
            InputAction::PreviousLevel | InputAction::NextLevel => {
                if let Some(game) = &mut self.game {
                    let result = if action == InputAction::PreviousLevel {
                        game.previous_level()
                    } else {
                        game.next_level()
                    };
                    if let Err(e) = result {
                        log::warn!("level switch failed: {}", e);
                    }
                }
            }
            InputAction::ManualRestart => {
                if let Some(game) = &mut self.game {
                    game.manual_restart();
                }
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f64();
        self.last_frame = now;

        let (Some(game), Some(render), Some(window)) = (&mut self.game, &mut self.render, &self.window) else {
            return;
        };

        self.controller.update(&mut game.look);
        let input = FrameInput {
            movement: self.controller.move_input(),
            pointer_locked: self.controller.is_pointer_locked(),
            clicked: std::mem::take(&mut self.clicked),
        };
        game.frame(dt, &input);

        let summary = game.overlay.summary();
        if summary != self.last_summary {
            if !summary.is_empty() {
                log::info!("{}", summary);
            }
            self.last_summary = summary;
        }
        window.update_title(&self.last_summary);

        match render.render_frame(game) {
            Ok(()) => {}
            Err(RenderError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                log::debug!("surface reconfigured");
            }
            Err(RenderError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                log::error!("GPU out of memory");
                event_loop.exit();
                return;
            }
            Err(e) => log::warn!("{}", e),
        }
        window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.start(event_loop) {
                log::error!("startup failed: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => {
                if let Some(render) = &mut self.render {
                    render.resize(size.width, size.height);
                }
            }

            WindowEvent::Focused(false) => {
                self.controller.release_all();
                if let Some(window) = &mut self.window {
                    window.set_pointer_lock(false);
                }
                self.controller.set_pointer_locked(false);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    let captured = self.window.as_ref().is_some_and(|w| w.is_pointer_locked());
                    match self.mapper.map_keyboard(key, event.state, captured) {
                        Some(action) => self.handle_action(action, event_loop),
                        None => {
                            self.controller.process_keyboard(key, event.state);
                        }
                    }
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let captured = self.window.as_ref().is_some_and(|w| w.is_pointer_locked());
                if let Some(action) = self.mapper.map_mouse_button(button, state, captured) {
                    self.handle_action(action, event_loop);
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.controller.process_mouse_motion(delta.0, delta.1);
        }
    }
}

fn main() {
    let loaded = AppConfig::load();
    let log_level = loaded
        .as_ref()
        .map(|c| c.debug.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = loaded.unwrap_or_else(|e| {
        log::warn!("{}. Using defaults.", e);
        AppConfig::default()
    });
    log::info!("Starting {}", config.window.title);

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("event loop error: {}", e);
        std::process::exit(1);
    }
}
