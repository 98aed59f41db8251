//! [GLFW](https://crates.io/crates/glfw) backend for shaderscope.

#![deny(missing_docs)]

use gl;
use glfw::{self, Context, Glfw, InitError, SwapInterval, Window, WindowEvent, WindowMode};
use shaderscope::context::GraphicsContext;
pub use shaderscope_gl::gl33::StateQueryError;
use shaderscope_gl::GL33;
use shaderscope_windowing::{CursorMode, WindowDim, WindowOpt};
use std::{convert::Infallible, error, fmt, os::raw::c_void, sync::mpsc::Receiver};

/// Error that can be risen while creating a surface.
#[non_exhaustive]
#[derive(Debug)]
pub enum GlfwSurfaceError<E> {
  /// Initialization of the surface went wrong.
  ///
  /// This variant exposes a **glfw** error for further information about what went wrong.
  InitError(InitError),

  /// Window creation failed.
  WindowCreationFailed,

  /// No primary monitor detected.
  NoPrimaryMonitor,

  /// No available video mode.
  NoVideoMode,

  /// User error.
  UserError(E),

  /// The graphics state is not available.
  ///
  /// This error is generated when the initialization code is called on a thread on which the
  /// graphics state has already been acquired.
  GraphicsStateError(StateQueryError),
}

impl<E> fmt::Display for GlfwSurfaceError<E>
where
  E: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      GlfwSurfaceError::InitError(ref e) => write!(f, "initialization error: {}", e),
      GlfwSurfaceError::WindowCreationFailed => f.write_str("failed to create window"),
      GlfwSurfaceError::NoPrimaryMonitor => f.write_str("no primary monitor"),
      GlfwSurfaceError::NoVideoMode => f.write_str("no video mode"),
      GlfwSurfaceError::UserError(ref e) => write!(f, "user error: {}", e),
      GlfwSurfaceError::GraphicsStateError(ref e) => {
        write!(f, "failed to get graphics state: {}", e)
      }
    }
  }
}

impl<E> From<InitError> for GlfwSurfaceError<E> {
  fn from(e: InitError) -> Self {
    GlfwSurfaceError::InitError(e)
  }
}

impl<E> error::Error for GlfwSurfaceError<E>
where
  E: 'static + error::Error,
{
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      GlfwSurfaceError::InitError(e) => Some(e),
      GlfwSurfaceError::UserError(e) => Some(e),
      GlfwSurfaceError::GraphicsStateError(e) => Some(e),
      _ => None,
    }
  }
}

/// GLFW surface.
///
/// This type is a helper that exposes two important concepts: the GLFW event receiver that you can use it with to
/// poll events and the [`GL33Context`], which allows you to bind shader programs and draw.
#[derive(Debug)]
pub struct GlfwSurface {
  /// Wrapped GLFW events queue.
  pub events_rx: Receiver<(f64, WindowEvent)>,

  /// Wrapped shaderscope context.
  pub context: GL33Context,
}

impl GlfwSurface {
  /// Initialize GLFW and create the window with a user-provided function.
  pub fn new<E>(
    create_window: impl FnOnce(
      &mut Glfw,
    )
      -> Result<(Window, Receiver<(f64, WindowEvent)>), GlfwSurfaceError<E>>,
  ) -> Result<Self, GlfwSurfaceError<E>> {
    #[cfg(feature = "log-errors")]
    let error_cbk = glfw::LOG_ERRORS;
    #[cfg(not(feature = "log-errors"))]
    let error_cbk = glfw::FAIL_ON_ERRORS;

    let mut glfw = glfw::init(error_cbk)?;

    // OpenGL hints
    glfw.window_hint(glfw::WindowHint::OpenGlProfile(
      glfw::OpenGlProfileHint::Core,
    ));
    glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));
    glfw.window_hint(glfw::WindowHint::ContextVersionMajor(3));
    glfw.window_hint(glfw::WindowHint::ContextVersionMinor(3));

    let (mut window, events_rx) = create_window(&mut glfw)?;

    // init OpenGL
    gl::load_with(|s| window.get_proc_address(s) as *const c_void);

    let gl = GL33::new().map_err(GlfwSurfaceError::GraphicsStateError)?;
    let context = GL33Context { window, gl };
    let surface = GlfwSurface { events_rx, context };

    Ok(surface)
  }

  /// Initialize GLFW and create a window configured by [`WindowOpt`].
  pub fn new_gl33(title: &str, win_opt: WindowOpt) -> Result<Self, GlfwSurfaceError<Infallible>> {
    GlfwSurface::new(|glfw| {
      type Error = GlfwSurfaceError<Infallible>;

      glfw.window_hint(glfw::WindowHint::Samples(win_opt.num_samples()));

      let (mut window, events) = match win_opt.dim() {
        WindowDim::Windowed { width, height } => glfw
          .create_window(width, height, title, WindowMode::Windowed)
          .ok_or(Error::WindowCreationFailed)?,

        WindowDim::Fullscreen => glfw.with_primary_monitor(|glfw, monitor| {
          let monitor = monitor.ok_or(Error::NoPrimaryMonitor)?;
          let vmode = monitor
            .get_video_mode()
            .ok_or(Error::NoVideoMode)?;

          glfw
            .create_window(
              vmode.width,
              vmode.height,
              title,
              WindowMode::FullScreen(monitor),
            )
            .ok_or(Error::WindowCreationFailed)
        })?,

        WindowDim::FullscreenRestricted { width, height } => {
          glfw.with_primary_monitor(|glfw, monitor| {
            let monitor = monitor.ok_or(Error::NoPrimaryMonitor)?;

            glfw
              .create_window(width, height, title, WindowMode::FullScreen(monitor))
              .ok_or(Error::WindowCreationFailed)
          })?
        }
      };

      window.make_current();
      window.set_all_polling(true);
      window.set_cursor_mode(match win_opt.cursor_mode() {
        CursorMode::Visible => glfw::CursorMode::Normal,
        CursorMode::Invisible => glfw::CursorMode::Hidden,
        CursorMode::Disabled => glfw::CursorMode::Disabled,
      });

      glfw.set_swap_interval(if win_opt.vsync() {
        SwapInterval::Sync(1)
      } else {
        SwapInterval::None
      });

      Ok((window, events))
    })
  }
}

/// shaderscope OpenGL 3.3 context.
///
/// This type also re-exports the GLFW window, if you need access to it.
#[derive(Debug)]
pub struct GL33Context {
  /// Wrapped GLFW window.
  pub window: Window,

  /// OpenGL 3.3 state.
  gl: GL33,
}

impl GL33Context {
  /// Size of the framebuffer, in pixels.
  pub fn framebuffer_size(&self) -> [u32; 2] {
    let (w, h) = self.window.get_framebuffer_size();
    [w.max(0) as u32, h.max(0) as u32]
  }

  /// Clear the whole framebuffer with a color.
  pub fn clear(&mut self, color: [f32; 4]) {
    let size = self.framebuffer_size();
    self.gl.clear(size, color);
  }
}

unsafe impl GraphicsContext for GL33Context {
  type Backend = GL33;

  fn backend(&mut self) -> &mut Self::Backend {
    &mut self.gl
  }
}
