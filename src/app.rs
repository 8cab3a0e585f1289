use crate::config::AppConfig;
use crate::render::{Renderer, Scene, Target};
use anyhow::{Context, Result};
use pixels::{Pixels, SurfaceTexture};
use rand::rngs::ThreadRng;
use reflex_core::Button;
use reflex_session::{
    FileStore, KeyValueStore, MemoryStore, SessionController, SessionEvent, SessionTiming,
};
use reflex_timing::{FrameSampler, MonotonicTimer, Timer};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

const TITLE: &str = "Reflex";

type Session = SessionController<MonotonicTimer, ThreadRng, Box<dyn KeyValueStore>>;

pub struct App {
    config: AppConfig,
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<Renderer>,
    session: Session,
    frames: FrameSampler,
    cursor: Option<PhysicalPosition<f64>>,
    should_exit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let store: Box<dyn KeyValueStore> = match &config.store_path {
            Some(path) => {
                let store = FileStore::new(path);
                info!(path = %store.path().display(), "personal best stored on disk");
                Box::new(store)
            }
            None => {
                info!("personal best kept in memory");
                Box::new(MemoryStore::new())
            }
        };
        let session = SessionController::new(
            SessionTiming::default(),
            MonotonicTimer::new(),
            rand::rng(),
            store,
        );

        Self {
            config,
            window: None,
            pixels: None,
            renderer: None,
            session,
            frames: FrameSampler::default(),
            cursor: None,
            should_exit: false,
        }
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        println!("=== REFLEX ===");
        println!("Space / Enter: start   ← or F: left   → or J: right   Esc: quit");
        if let Some(rank) = self.session.best().rank {
            info!(%rank, "loaded personal best");
        }

        event_loop.run_app(&mut self)?;

        let stats = self.frames.stats();
        info!(
            frames = stats.samples,
            mean_ms = stats.average_frame_time_ns / 1e6,
            jitter_ms = stats.jitter_ns / 1e6,
            max_ms = stats.max_frame_time_ns / 1e6,
            fps = stats.effective_fps,
            "render timing"
        );
        Ok(())
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height))
            .with_min_inner_size(LogicalSize::new(320, 240));

        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("failed to create window")?,
        );
        let size = window.inner_size();
        debug!(
            width = size.width,
            height = size.height,
            scale = window.scale_factor(),
            "window created"
        );

        let surface = SurfaceTexture::new(size.width, size.height, window.clone());
        self.pixels = Some(
            Pixels::new(size.width, size.height, surface)
                .context("failed to create pixel surface")?,
        );
        self.renderer = Renderer::new(size.width, size.height);
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let (Some(pixels), Some(renderer)) = (self.pixels.as_mut(), self.renderer.as_mut()) else {
            return Ok(());
        };
        let timer = self.session.timer().clone();
        let started = timer.now();

        renderer.draw(&Scene {
            lit: self.session.lit(),
            start_enabled: self.session.start_enabled(),
        });
        pixels.frame_mut().copy_from_slice(renderer.data());
        pixels.render()?;

        self.frames.record(timer.elapsed(started));
        Ok(())
    }

    fn update(&mut self) {
        for event in self.session.update() {
            match event {
                SessionEvent::Text(text) => self.show_text(&text),
                SessionEvent::StimulusShown(color) => debug!(?color, "light on"),
                SessionEvent::StimulusCleared => debug!("light off"),
                SessionEvent::StartEnabled(enabled) => debug!(enabled, "start button"),
                SessionEvent::Finished(summary) => {
                    debug!(rank = %summary.rank, best = ?summary.best, "summary shown")
                }
            }
        }
    }

    /// Status lines go to stdout; the first line also becomes the window title.
    fn show_text(&self, text: &str) {
        if !text.is_empty() {
            println!("{text}");
        }
        if let Some(window) = &self.window {
            match text.lines().next().filter(|l| !l.is_empty()) {
                Some(line) => window.set_title(&format!("{TITLE} - {line}")),
                None => window.set_title(TITLE),
            }
        }
    }

    fn handle_key(&mut self, key: PhysicalKey, event_loop: &ActiveEventLoop) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        match code {
            KeyCode::ArrowLeft | KeyCode::KeyF => {
                self.session.press(Button::Left);
            }
            KeyCode::ArrowRight | KeyCode::KeyJ => {
                self.session.press(Button::Right);
            }
            KeyCode::Space | KeyCode::Enter => {
                self.session.start();
            }
            KeyCode::Escape => self.cleanup_and_exit(event_loop),
            _ => {}
        }
    }

    fn handle_click(&mut self) {
        let (Some(pos), Some(renderer)) = (self.cursor, self.renderer.as_ref()) else {
            return;
        };
        let target = renderer
            .layout()
            .hit(pos.x as f32, pos.y as f32, self.session.start_enabled());
        match target {
            Some(Target::Left) => {
                self.session.press(Button::Left);
            }
            Some(Target::Right) => {
                self.session.press(Button::Right);
            }
            Some(Target::Start) => {
                self.session.start();
            }
            None => {}
        }
    }

    fn handle_resize(&mut self, size: PhysicalSize<u32>) {
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(size.width, size.height) {
                warn!(error = %e, "failed to resize surface");
            }
            if let Err(e) = pixels.resize_buffer(size.width, size.height) {
                warn!(error = %e, "failed to resize buffer");
            }
        }
        self.renderer = Renderer::new(size.width, size.height);
        debug!(width = size.width, height = size.height, "resized");
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        info!("exiting");
        self.should_exit = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                error!("failed to create window and surface: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::RedrawRequested => {
                self.update();
                if let Err(e) = self.render() {
                    error!("render failed: {e:#}");
                    self.cleanup_and_exit(event_loop);
                    return;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed && !event.repeat =>
            {
                self.handle_key(event.physical_key, event_loop);
            }
            WindowEvent::CursorMoved { position, .. } => self.cursor = Some(position),
            WindowEvent::CursorLeft { .. } => self.cursor = None,
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.handle_click(),
            WindowEvent::Resized(size) => self.handle_resize(size),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
        }
    }
}
