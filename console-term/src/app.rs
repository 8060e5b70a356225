//! Main application logic
//!
//! Ties together the console, the font atlas and the software rasterizer.

use std::error::Error;
use std::num::NonZeroU32;
use std::rc::Rc;

use console_core::{Console, Viewport};
use softbuffer::{Context, SoftBufferError, Surface};
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::keyboard::ModifiersState;
use winit::window::{Window, WindowBuilder};

use crate::config::Config;
use crate::font_atlas::FontAtlas;
use crate::keys::{map_key, KeyCommand};
use crate::raster::SoftwareSink;
use crate::session::Session;

/// Application state
pub struct App {
    /// Configuration
    config: Config,
    console: Console,
    session: Session,
    atlas: FontAtlas,
    sink: SoftwareSink,
    /// Window (created in `run`)
    window: Option<Rc<Window>>,
    /// Softbuffer context
    #[allow(dead_code)]
    context: Option<Context<Rc<Window>>>,
    /// Softbuffer surface
    surface: Option<Surface<Rc<Window>, Rc<Window>>>,
    /// Current modifiers state
    modifiers: ModifiersState,
    /// Needs redraw
    needs_redraw: bool,
}

impl App {
    /// Create a new application
    pub fn new(config: Config) -> Result<Self, Box<dyn Error>> {
        let (atlas, fonts) = FontAtlas::from_config(&config.font)?;
        log::debug!("Loaded {} font faces", atlas.face_count());

        let mut console = Console::with_config(config.theme.styles(fonts), config.console_config());
        console.print(&config.banner);
        let session = Session::attach(&mut console, config.history_size);
        let sink = SoftwareSink::new(config.window.width, config.window.height, config.theme.background());

        Ok(Self {
            config,
            console,
            session,
            atlas,
            sink,
            window: None,
            context: None,
            surface: None,
            modifiers: ModifiersState::empty(),
            needs_redraw: true,
        })
    }

    /// Run the application
    pub fn run(mut self) -> Result<(), Box<dyn Error>> {
        let event_loop = EventLoop::new()?;

        let window = WindowBuilder::new()
            .with_title("Glyph Console")
            .with_inner_size(LogicalSize::new(self.config.window.width, self.config.window.height))
            .build(&event_loop)?;

        let window = Rc::new(window);
        self.init_graphics(window)?;

        event_loop.run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Wait);

            match event {
                Event::WindowEvent { event, .. } => {
                    self.handle_window_event(event, elwt);
                }
                Event::AboutToWait => {
                    if self.needs_redraw {
                        if let Some(window) = &self.window {
                            window.request_redraw();
                        }
                    }
                }
                _ => {}
            }
        })?;

        Ok(())
    }

    /// Handle window events
    fn handle_window_event(&mut self, event: WindowEvent, elwt: &EventLoopWindowTarget<()>) {
        match event {
            WindowEvent::CloseRequested => {
                elwt.exit();
            }
            WindowEvent::Resized(size) => {
                self.handle_resize(size);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.handle_key_input(&event, elwt);
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }
            WindowEvent::RedrawRequested => {
                self.render();
            }
            _ => {}
        }
    }

    fn init_graphics(&mut self, window: Rc<Window>) -> Result<(), SoftBufferError> {
        let context = Context::new(window.clone())?;
        let surface = Surface::new(&context, window.clone())?;
        let size = window.inner_size();

        self.window = Some(window);
        self.context = Some(context);
        self.surface = Some(surface);
        self.handle_resize(size);
        Ok(())
    }

    /// Handle window resize
    fn handle_resize(&mut self, size: PhysicalSize<u32>) {
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) else {
            return;
        };
        if let Some(surface) = &mut self.surface {
            if let Err(e) = surface.resize(width, height) {
                log::warn!("Failed to resize surface: {}", e);
                return;
            }
        }
        log::debug!("Resized to {}x{}", size.width, size.height);
        self.sink.resize(size.width, size.height);
        self.needs_redraw = true;
    }

    /// Handle keyboard input
    fn handle_key_input(&mut self, event: &KeyEvent, elwt: &EventLoopWindowTarget<()>) {
        if event.state != ElementState::Pressed {
            return;
        }

        let Some(command) = map_key(&event.logical_key, event.text.as_deref(), self.modifiers) else {
            return;
        };
        if command == KeyCommand::Close {
            elwt.exit();
            return;
        }

        for action in command.actions() {
            self.session.handle(&mut self.console, action);
        }
        self.needs_redraw = true;
    }

    fn render(&mut self) {
        match self.draw() {
            Ok(()) => self.needs_redraw = false,
            Err(e) => log::warn!("Render failed: {}", e),
        }
    }

    fn draw(&mut self) -> Result<(), SoftBufferError> {
        let Some(surface) = &mut self.surface else {
            return Ok(());
        };

        self.sink.sync_texture(self.atlas.texture());
        let viewport = Viewport::new(self.sink.width() as f32, self.sink.height() as f32);
        let mut frame = self.console.render(&mut self.atlas, &mut self.sink, viewport);

        // Glyphs rasterized during layout are not in the sink's texture yet
        if self.sink.sync_texture(self.atlas.texture()) {
            frame = self.console.render(&mut self.atlas, &mut self.sink, viewport);
        }
        log::trace!("Frame: {} quads, caret at {:?}", frame.quads, frame.caret);

        let mut buffer = surface.buffer_mut()?;
        let pixels = self.sink.frame();
        if buffer.len() == pixels.len() {
            buffer.copy_from_slice(pixels);
        } else {
            buffer.fill(self.config.theme.background());
        }
        buffer.present()
    }
}
