//! Window shell - winit event-loop plumbing around the frame driver.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{Key, NamedKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::render::{FrameDriver, RenderError};
use crate::schema::SimulationConfig;

/// Top-level winit application.
///
/// Startup and presentation failures that the renderer cannot recover from
/// are recorded here and end the event loop; `main` inspects
/// [`App::fatal_error`] afterwards to exit non-zero.
pub struct App {
    config: SimulationConfig,
    driver: Option<FrameDriver>,
    window: Option<Arc<Window>>,
    fatal: Option<(&'static str, String)>,
}

impl App {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            driver: None,
            window: None,
            fatal: None,
        }
    }

    /// The failure that ended the run, if any, as (stage, message).
    pub fn fatal_error(&self) -> Option<&(&'static str, String)> {
        self.fatal.as_ref()
    }

    fn bail(&mut self, event_loop: &ActiveEventLoop, stage: &'static str, message: String) {
        log::error!("fatal {} error: {}", stage, message);
        self.fatal = Some((stage, message));
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.driver.is_some() {
            return;
        }

        let window_attrs = WindowAttributes::default()
            .with_title("Flipfield")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window_width,
                self.config.window_height,
            ));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.bail(event_loop, "startup", e.to_string()),
        };

        let driver = match pollster::block_on(FrameDriver::new(
            window.clone(),
            self.config.clone(),
        )) {
            Ok(driver) => driver,
            Err(e) => return self.bail(event_loop, "startup", e.to_string()),
        };

        self.driver = Some(driver);
        self.window = Some(window.clone());

        // Initial redraw — required on macOS with winit 0.30
        window.request_redraw();
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(driver) = self.driver.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => event_loop.exit(),

            WindowEvent::Resized(new_size) => {
                driver.resize(new_size.width, new_size.height);
            }

            WindowEvent::RedrawRequested => match driver.frame() {
                Ok(()) => {}
                Err(RenderError::Surface(
                    wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated,
                )) => {
                    driver.reconfigure_surface();
                }
                Err(RenderError::Surface(wgpu::SurfaceError::Timeout)) => {
                    log::warn!("surface acquire timed out; skipping frame");
                }
                Err(e) => self.bail(event_loop, "presentation", e.to_string()),
            },

            _ => {}
        }
    }
}
