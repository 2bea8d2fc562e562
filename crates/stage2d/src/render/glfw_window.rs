//! Window management using GLFW
//!
//! OpenGL 3.3 core window. Shared contexts are hidden 1x1 windows created with
//! `create_shared`, so textures uploaded on the main context are visible to
//! the render thread. Only the window's `PRenderContext` crosses threads; the
//! hidden window stays here as the surface and outlives the worker.

use glfw::{Action, Context, GlfwReceiver, OpenGlProfileHint, PWindow, SwapInterval, WindowHint, WindowMode};

use super::window::{GraphicsContext, SharedContext, Window, WindowError, WindowEvent, WindowResult};
use super::RenderError;
use crate::core::WindowSettings;
use crate::input::{KeyCode, MouseButton};

/// GLFW window wrapper with proper resource management
pub struct GlfwWindow {
    glfw: glfw::Glfw,
    window: PWindow,
    events: GlfwReceiver<(f64, glfw::WindowEvent)>,
}

impl GlfwWindow {
    /// Create a window from settings, requesting `msaa_samples` if non-zero
    pub fn new(settings: &WindowSettings, msaa_samples: u32) -> WindowResult<Self> {
        let mut glfw =
            glfw::init(glfw::fail_on_errors).map_err(|e| WindowError::InitializationFailed(format!("{e:?}")))?;

        glfw.window_hint(WindowHint::ContextVersion(3, 3));
        glfw.window_hint(WindowHint::OpenGlProfile(OpenGlProfileHint::Core));
        glfw.window_hint(WindowHint::OpenGlForwardCompat(true));
        glfw.window_hint(WindowHint::Resizable(settings.resizable));
        if msaa_samples > 0 {
            glfw.window_hint(WindowHint::Samples(Some(msaa_samples)));
        }

        let created = if settings.fullscreen {
            glfw.with_primary_monitor(|glfw, monitor| {
                let mode = monitor.map_or(WindowMode::Windowed, |m| WindowMode::FullScreen(&*m));
                glfw.create_window(settings.width, settings.height, &settings.title, mode)
            })
        } else {
            glfw.create_window(settings.width, settings.height, &settings.title, WindowMode::Windowed)
        };
        let (mut window, events) =
            created.ok_or_else(|| WindowError::CreationFailed(format!("{}x{}", settings.width, settings.height)))?;

        window.make_current();
        window.set_key_polling(true);
        window.set_mouse_button_polling(true);
        window.set_cursor_pos_polling(true);
        window.set_close_polling(true);
        window.set_size_polling(true);
        window.set_focus_polling(true);

        log::info!("Created {}x{} window '{}'", settings.width, settings.height, settings.title);
        Ok(Self { glfw, window, events })
    }
}

impl Window for GlfwWindow {
    fn size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_size();
        (width.max(0) as u32, height.max(0) as u32)
    }

    fn should_close(&self) -> bool {
        self.window.should_close()
    }

    fn set_should_close(&mut self, should_close: bool) {
        self.window.set_should_close(should_close);
    }

    fn poll_events(&mut self) -> Vec<WindowEvent> {
        self.glfw.poll_events();
        glfw::flush_messages(&self.events)
            .filter_map(|(_, event)| convert_event(event))
            .collect()
    }

    fn swap_buffers(&mut self) {
        self.window.swap_buffers();
    }

    fn set_vsync(&mut self, enabled: bool) {
        let interval = if enabled { SwapInterval::Sync(1) } else { SwapInterval::None };
        self.glfw.set_swap_interval(interval);
    }

    fn create_shared_context(&mut self) -> WindowResult<SharedContext> {
        self.glfw.window_hint(WindowHint::Visible(false));
        let created = self.window.create_shared(1, 1, "render context", WindowMode::Windowed);
        self.glfw.window_hint(WindowHint::Visible(true));
        let (mut hidden, _events) =
            created.ok_or_else(|| WindowError::SharedContextFailed("create_shared returned no window".to_string()))?;

        // Creation may have switched the current context.
        self.window.make_current();

        let context = hidden.render_context();
        log::debug!("Created shared GL context for the render thread");
        Ok(SharedContext {
            context: Box::new(GlfwContext { context }),
            surface: Box::new(hidden),
        })
    }
}

/// Shared OpenGL context driven by the render thread
struct GlfwContext {
    context: glfw::PRenderContext,
}

impl GraphicsContext for GlfwContext {
    fn make_current(&mut self) {
        self.context.make_current();
    }

    fn load_bindings(&mut self) -> Result<(), RenderError> {
        if self.context.is_current() {
            Ok(())
        } else {
            Err(RenderError::BindingsUnavailable("shared GL context is not current on the render thread".to_string()))
        }
    }

    fn swap_buffers(&mut self) {
        self.context.swap_buffers();
    }

    fn release_current(&mut self) {
        glfw::make_context_current(None);
    }
}

fn convert_event(event: glfw::WindowEvent) -> Option<WindowEvent> {
    match event {
        glfw::WindowEvent::Close => Some(WindowEvent::Close),
        glfw::WindowEvent::Size(width, height) => Some(WindowEvent::Resized {
            width: width.max(0) as u32,
            height: height.max(0) as u32,
        }),
        glfw::WindowEvent::Key(key, _, action, _) => match action {
            Action::Press => Some(WindowEvent::Key { key: convert_key(key), pressed: true }),
            Action::Release => Some(WindowEvent::Key { key: convert_key(key), pressed: false }),
            Action::Repeat => None,
        },
        glfw::WindowEvent::MouseButton(button, action, _) => {
            let button = match button {
                glfw::MouseButtonLeft => MouseButton::Left,
                glfw::MouseButtonRight => MouseButton::Right,
                glfw::MouseButtonMiddle => MouseButton::Middle,
                _ => return None,
            };
            Some(WindowEvent::MouseButton {
                button,
                pressed: action != Action::Release,
            })
        }
        glfw::WindowEvent::CursorPos(x, y) => Some(WindowEvent::CursorMoved { x: x as f32, y: y as f32 }),
        glfw::WindowEvent::Focus(focused) => Some(WindowEvent::Focus(focused)),
        _ => None,
    }
}

fn convert_key(key: glfw::Key) -> KeyCode {
    use glfw::Key;
    match key {
        Key::A => KeyCode::A,
        Key::B => KeyCode::B,
        Key::C => KeyCode::C,
        Key::D => KeyCode::D,
        Key::E => KeyCode::E,
        Key::F => KeyCode::F,
        Key::G => KeyCode::G,
        Key::H => KeyCode::H,
        Key::I => KeyCode::I,
        Key::J => KeyCode::J,
        Key::K => KeyCode::K,
        Key::L => KeyCode::L,
        Key::M => KeyCode::M,
        Key::N => KeyCode::N,
        Key::O => KeyCode::O,
        Key::P => KeyCode::P,
        Key::Q => KeyCode::Q,
        Key::R => KeyCode::R,
        Key::S => KeyCode::S,
        Key::T => KeyCode::T,
        Key::U => KeyCode::U,
        Key::V => KeyCode::V,
        Key::W => KeyCode::W,
        Key::X => KeyCode::X,
        Key::Y => KeyCode::Y,
        Key::Z => KeyCode::Z,
        Key::Num0 => KeyCode::Num0,
        Key::Num1 => KeyCode::Num1,
        Key::Num2 => KeyCode::Num2,
        Key::Num3 => KeyCode::Num3,
        Key::Num4 => KeyCode::Num4,
        Key::Num5 => KeyCode::Num5,
        Key::Num6 => KeyCode::Num6,
        Key::Num7 => KeyCode::Num7,
        Key::Num8 => KeyCode::Num8,
        Key::Num9 => KeyCode::Num9,
        Key::Space => KeyCode::Space,
        Key::Enter => KeyCode::Enter,
        Key::Escape => KeyCode::Escape,
        Key::Tab => KeyCode::Tab,
        Key::Backspace => KeyCode::Backspace,
        Key::Up => KeyCode::Up,
        Key::Down => KeyCode::Down,
        Key::Left => KeyCode::Left,
        Key::Right => KeyCode::Right,
        Key::LeftShift => KeyCode::LeftShift,
        Key::LeftControl => KeyCode::LeftControl,
        _ => KeyCode::Unknown,
    }
}
