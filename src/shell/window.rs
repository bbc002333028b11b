//! Native window for the visualizer, using [`winit`] for the window and input and
//! [`softbuffer`] to present the software-rendered grid.
//!
//! Controls: left mouse places start, end, then walls; right mouse erases; `Space` runs the
//! search; `R` resets the grid; `C` clears the marks of the last search; `Esc` or closing the
//! window quits. Holding a mouse button while moving keeps painting or erasing.

use std::num::NonZeroU32;
use std::sync::Arc;

use grid_util::point::Point;
use log::{error, info};
use thiserror::Error;
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use super::{render, Visualizer};

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Os(#[from] winit::error::OsError),
    #[error("softbuffer error: {0}")]
    SoftBuffer(#[from] softbuffer::SoftBufferError),
}

/// Opens the window and runs the event loop until the user quits.
pub fn run(visualizer: Visualizer) -> Result<(), WindowError> {
    let event_loop = EventLoop::new()?;
    let mut app = App {
        visualizer,
        state: None,
        cursor: None,
        held: None,
        failure: None,
    };
    event_loop.run_app(&mut app)?;
    match app.failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Window resources, created once the event loop resumes.
struct WindowState {
    window: Arc<Window>,
    surface: softbuffer::Surface<Arc<Window>, Arc<Window>>,
    size: PhysicalSize<u32>,
}

struct App {
    visualizer: Visualizer,
    state: Option<WindowState>,
    cursor: Option<PhysicalPosition<f64>>,
    held: Option<MouseButton>,
    failure: Option<WindowError>,
}

fn non_zero(v: u32) -> NonZeroU32 {
    NonZeroU32::new(v).unwrap_or(NonZeroU32::MIN)
}

impl App {
    fn create_window(&self, event_loop: &ActiveEventLoop) -> Result<WindowState, WindowError> {
        let config = self.visualizer.config();
        let side = config.cell_px() * config.grid_size as u32;
        let attrs = Window::default_attributes()
            .with_title(self.visualizer.caption())
            .with_inner_size(PhysicalSize::new(side, side))
            .with_resizable(false);
        let window = Arc::new(event_loop.create_window(attrs)?);
        let context = softbuffer::Context::new(window.clone())?;
        let mut surface = softbuffer::Surface::new(&context, window.clone())?;
        let size = window.inner_size();
        surface.resize(non_zero(size.width), non_zero(size.height))?;
        info!("Opened {}x{} window", size.width, size.height);
        Ok(WindowState {
            window,
            surface,
            size,
        })
    }

    fn cell_px(&self) -> usize {
        let grid_size = self.visualizer.grid().size();
        match &self.state {
            Some(state) => (state.size.width.min(state.size.height) as usize) / grid_size,
            None => self.visualizer.config().cell_px() as usize,
        }
    }

    fn hovered_point(&self) -> Option<Point> {
        let cursor = self.cursor?;
        render::pixel_to_point(
            cursor.x,
            cursor.y,
            self.cell_px(),
            self.visualizer.grid().size(),
        )
    }

    /// Applies the held mouse button to the cell under the cursor.
    fn apply_held_button(&mut self) -> bool {
        let Some(point) = self.hovered_point() else {
            return false;
        };
        match self.held {
            Some(MouseButton::Left) => self.visualizer.left_click(point),
            Some(MouseButton::Right) => self.visualizer.right_click(point),
            _ => false,
        }
    }

    fn handle_key(&mut self, event: &KeyEvent, event_loop: &ActiveEventLoop) -> bool {
        if event.state != ElementState::Pressed || event.repeat {
            return false;
        }
        match &event.logical_key {
            Key::Named(NamedKey::Space) => self.visualizer.press_run(),
            Key::Named(NamedKey::Escape) => {
                self.quit(event_loop);
                false
            }
            Key::Character(c) if c.as_str().eq_ignore_ascii_case("r") => {
                self.visualizer.press_reset();
                true
            }
            Key::Character(c) if c.as_str().eq_ignore_ascii_case("c") => {
                self.visualizer.press_clear()
            }
            _ => false,
        }
    }

    fn quit(&mut self, event_loop: &ActiveEventLoop) {
        self.visualizer.cancel();
        event_loop.exit();
    }

    fn request_redraw(&self) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn redraw(&mut self) -> Result<(), WindowError> {
        let cell_px = self.cell_px();
        let Some(state) = self.state.as_mut() else {
            return Ok(());
        };
        state.window.set_title(self.visualizer.caption());
        let (width, height) = (state.size.width as usize, state.size.height as usize);
        if width == 0 || height == 0 {
            return Ok(());
        }
        let mut buffer = state.surface.buffer_mut()?;
        render::paint(self.visualizer.grid(), cell_px, &mut buffer, width, height);
        state.window.pre_present_notify();
        buffer.present()?;
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match self.create_window(event_loop) {
            Ok(state) => {
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(e) => {
                error!("{}", e);
                self.failure = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let changed = match event {
            WindowEvent::CloseRequested => {
                self.quit(event_loop);
                false
            }
            WindowEvent::Resized(size) => {
                if let Some(state) = self.state.as_mut() {
                    state.size = size;
                    if let Err(e) = state
                        .surface
                        .resize(non_zero(size.width), non_zero(size.height))
                    {
                        error!("{}", e);
                    }
                }
                true
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    error!("{}", e);
                }
                false
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(&event, event_loop),
            WindowEvent::MouseInput { state, button, .. } => {
                match state {
                    ElementState::Pressed => self.held = Some(button),
                    ElementState::Released => self.held = None,
                }
                self.apply_held_button()
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some(position);
                self.apply_held_button()
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                false
            }
            _ => false,
        };
        if changed {
            self.request_redraw();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // One batch of search steps per frame; the loop idles once the search is over.
        if self.visualizer.advance(self.visualizer.config().steps_per_frame) {
            event_loop.set_control_flow(ControlFlow::Poll);
            self.request_redraw();
        } else {
            event_loop.set_control_flow(ControlFlow::Wait);
        }
    }
}
