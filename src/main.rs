//! Neonfolio showcase window
//!
//! Each redraw:
//! 1. Tick the showcase (preference watcher, theme controller, text effects, frame clock)
//! 2. Rasterize the scene with vello into an offscreen texture
//! 3. Blit it onto the window surface
//!
//! Keys: `1`-`4` switch themes, `G` glitches the headline, `V` toggles the
//! scene, `Escape` quits.

mod gpu;

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use gpu::{GpuState, WindowGpuState};
use neon_config::{Config, FilePreferenceStore, PreferenceWatcher};
use neonfolio::{Command, Showcase};

use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

const WINDOW_WIDTH: u32 = 1280;
const WINDOW_HEIGHT: u32 = 800;

struct WindowState {
    window: Arc<Window>,
    gpu: WindowGpuState,
    /// Last title set, to avoid redundant platform calls
    title: String,
}

struct App {
    showcase: Showcase,
    gpu: Option<GpuState>,
    window: Option<WindowState>,
    started: Instant,
}

impl App {
    fn new(showcase: Showcase) -> Self {
        Self {
            showcase,
            gpu: None,
            window: None,
            started: Instant::now(),
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        if self.gpu.is_none() {
            self.gpu = Some(GpuState::new()?);
        }
        let Some(gpu) = self.gpu.as_ref() else {
            return Ok(());
        };

        let title = self.showcase.title();
        let attrs = Window::default_attributes()
            .with_title(&title)
            .with_inner_size(winit::dpi::LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));
        let window = Arc::new(event_loop.create_window(attrs)?);
        let window_gpu = WindowGpuState::new(gpu, window.clone())?;

        self.showcase.start(self.started.elapsed());
        window.request_redraw();
        log::info!("Created window {:?}", window.id());

        self.window = Some(WindowState {
            window,
            gpu: window_gpu,
            title,
        });
        Ok(())
    }

    fn redraw(&mut self) {
        let now = self.started.elapsed();
        self.showcase.tick(now);

        let (Some(gpu), Some(state)) = (self.gpu.as_ref(), self.window.as_mut()) else {
            return;
        };

        let title = self.showcase.title();
        if title != state.title {
            state.window.set_title(&title);
            state.title = title;
        }

        state.gpu.render(gpu, &self.showcase.composer());
    }
}

/// Logical key name used for command lookup
fn key_name(key: &Key) -> Option<&str> {
    match key {
        Key::Named(NamedKey::Escape) => Some("Escape"),
        Key::Character(text) => Some(text.as_str()),
        _ => None,
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window(event_loop) {
                log::error!("Failed to create window: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.showcase.shutdown();
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let (Some(gpu), Some(state)) = (self.gpu.as_ref(), self.window.as_mut()) {
                    state.gpu.resize(&gpu.device, size.width, size.height);
                    state.window.request_redraw();
                }
            }

            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed && !event.repeat =>
            {
                let Some(command) = key_name(&event.logical_key).and_then(Command::from_key) else {
                    return;
                };
                log::debug!("Key command: {:?}", command);
                if !self.showcase.execute(command, self.started.elapsed()) {
                    self.showcase.shutdown();
                    event_loop.exit();
                }
            }

            WindowEvent::RedrawRequested => self.redraw(),

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // Continuous animation; Fifo presentation paces the loop
        if let Some(state) = self.window.as_ref() {
            state.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({}), using defaults", e);
        Config::default()
    });

    let preferences_path = Config::preferences_path()?;
    let store = FilePreferenceStore::new(&preferences_path);
    let watcher = match PreferenceWatcher::watch(&preferences_path) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            log::warn!("Preference hot-reload disabled: {}", e);
            None
        }
    };

    let showcase = Showcase::new(&config, Box::new(store), watcher);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(showcase);
    event_loop.run_app(&mut app)?;
    Ok(())
}
