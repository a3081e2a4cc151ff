//! Application window and event loop management.

mod input;

use std::sync::Arc;

use pollster::FutureExt;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use cloudview_core::{CloudviewError, Result};
use cloudview_render::RenderEngine;

use crate::session::{render_error, Capture, DisplaySession};

/// The window loop for one display session.
///
/// Callbacks cannot return errors, so the first one is stored here, the loop
/// exits, and [`run`] returns it.
pub(crate) struct App<'a> {
    session: &'a mut DisplaySession,
    window: Option<Arc<Window>>,
    engine: Option<RenderEngine>,
    error: Option<CloudviewError>,
    // Mouse state for camera control
    mouse_pos: (f64, f64),
    left_mouse_down: bool,
    right_mouse_down: bool,
    shift_down: bool,
}

impl<'a> App<'a> {
    fn new(session: &'a mut DisplaySession) -> Self {
        Self {
            session,
            window: None,
            engine: None,
            error: None,
            mouse_pos: (0.0, 0.0),
            left_mouse_down: false,
            right_mouse_down: false,
            shift_down: false,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: CloudviewError) {
        log::error!("{error}");
        if self.error.is_none() {
            self.error = Some(error);
        }
        event_loop.exit();
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    /// Captures the final frame if an output path is set, then exits.
    fn close(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.options().output_path.is_some() {
            if let Some(engine) = &mut self.engine {
                let (width, height) = engine.dimensions();
                match engine.render_to_image(self.session.scene(), self.session.camera()) {
                    Ok(pixels) => {
                        self.session.capture = Some(Capture {
                            pixels,
                            width,
                            height,
                        });
                    }
                    Err(e) => {
                        self.fail(event_loop, render_error(e));
                        return;
                    }
                }
            }
        }
        log::info!("window closed");
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(engine) = &mut self.engine else {
            return;
        };
        let result = engine.render_frame(self.session.scene(), self.session.camera());
        if let Err(e) = result {
            self.fail(event_loop, render_error(e));
        }
    }
}

impl ApplicationHandler for App<'_> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let options = self.session.options();
        let (width, height) = options.window_size;
        let window_attributes = Window::default_attributes()
            .with_title(options.title.clone())
            .with_inner_size(LogicalSize::new(width, height));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, render_error(format!("failed to create window: {e}")));
                return;
            }
        };

        let engine = match RenderEngine::new_windowed(window.clone()).block_on() {
            Ok(engine) => engine,
            Err(e) => {
                self.fail(event_loop, render_error(e));
                return;
            }
        };

        event_loop.set_control_flow(ControlFlow::Wait);
        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.close(event_loop),
            WindowEvent::Resized(size) => {
                if let Some(engine) = &mut self.engine {
                    engine.resize(size.width, size.height);
                }
                self.request_redraw();
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            other => self.handle_input(event_loop, other),
        }
    }
}

/// Opens the window and blocks until it is closed.
pub(crate) fn run(session: &mut DisplaySession) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|e| render_error(format!("failed to create event loop: {e}")))?;

    let mut app = App::new(session);
    event_loop
        .run_app(&mut app)
        .map_err(|e| render_error(format!("event loop error: {e}")))?;

    app.error.take().map_or(Ok(()), Err)
}
