mod assignment;
mod session;

use assignment::Assignment;
use glfw::{Action, Context as _, Key, WindowEvent};
use session::{Session, SessionError};
use shaderscope::context::GraphicsContext as _;
use shaderscope::registry::pair_shader_paths;
use shaderscope_gl::gl33::FullscreenTriangle;
use shaderscope_glfw::{GlfwSurface, GlfwSurfaceError};
use shaderscope_windowing::{WindowDim, WindowOpt};
use std::{convert::Infallible, error::Error, fmt, path::PathBuf, process, time::Instant};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "shaderscope-inspector")]
/// Load GLSL shaders, inspect and edit their uniforms live.
///
/// Keys: Escape quits, R reloads the shaders from disk, P prints the uniforms of the active shader,
/// Tab switches to the next shader and Delete unloads the active shader.
pub struct CLIOpts {
  #[structopt(long = "set", number_of_values = 1)]
  /// Set a uniform in every shader declaring it (name=value, repeatable).
  assignments: Vec<Assignment>,

  #[structopt(long = "texture", number_of_values = 1)]
  /// Feed an image file to a sampler2D uniform (name=path, repeatable).
  textures: Vec<Assignment>,

  #[structopt(long, default_value = "960")]
  /// Width of the window.
  width: u32,

  #[structopt(long, default_value = "540")]
  /// Height of the window.
  height: u32,

  #[structopt(short, long)]
  /// Print the uniforms of every shader after the first frame and exit.
  list: bool,

  #[structopt(long)]
  /// Exit after that many frames.
  frames: Option<u64>,

  #[structopt(parse(from_os_str))]
  /// Shader sources; a .vs file is paired with the .fs file of the same name.
  files: Vec<PathBuf>,
}

#[derive(Debug)]
enum InspectorError {
  Surface(GlfwSurfaceError<Infallible>),
  Session(SessionError),
}

impl fmt::Display for InspectorError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      InspectorError::Surface(ref e) => write!(f, "cannot create the window: {}", e),
      InspectorError::Session(ref e) => write!(f, "{}", e),
    }
  }
}

impl Error for InspectorError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      InspectorError::Surface(e) => Some(e),
      InspectorError::Session(e) => Some(e),
    }
  }
}

impl From<GlfwSurfaceError<Infallible>> for InspectorError {
  fn from(e: GlfwSurfaceError<Infallible>) -> Self {
    InspectorError::Surface(e)
  }
}

impl From<SessionError> for InspectorError {
  fn from(e: SessionError) -> Self {
    InspectorError::Session(e)
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum InputAction {
  Quit,
  Reload,
  Print,
  Cycle,
  Unload,
}

fn adapt_events(event: WindowEvent) -> Option<InputAction> {
  match event {
    WindowEvent::Close | WindowEvent::Key(Key::Escape, _, Action::Release, _) => {
      Some(InputAction::Quit)
    }

    WindowEvent::Key(key, _, Action::Press, _) => {
      log::debug!("key press: {:?}", key);
      match key {
        Key::R => Some(InputAction::Reload),
        Key::P => Some(InputAction::Print),
        Key::Tab => Some(InputAction::Cycle),
        Key::Delete => Some(InputAction::Unload),
        _ => None,
      }
    }

    _ => None,
  }
}

fn run(cli_opts: CLIOpts) -> Result<(), InspectorError> {
  let dim = WindowDim::Windowed {
    width: cli_opts.width,
    height: cli_opts.height,
  };
  let surface = GlfwSurface::new_gl33("shaderscope", WindowOpt::default().set_dim(dim))?;
  let mut context = surface.context;
  let events = surface.events_rx;

  let mut session = Session::new(&mut context)?;

  for pair in pair_shader_paths(&cli_opts.files) {
    // a broken pair shouldn’t prevent inspecting the other ones
    if let Err(e) = session.load(&mut context, &pair) {
      log::error!("{}", e);
    }
  }

  for assignment in &cli_opts.assignments {
    session.assign(assignment);
  }

  for texture in &cli_opts.textures {
    let path = PathBuf::from(&texture.value);

    if let Err(e) = session.assign_texture(&mut context, &texture.name, &path) {
      log::error!("{}", e);
    }
  }

  let triangle = FullscreenTriangle::new(context.backend());
  let start_t = Instant::now();
  let mut frame = 0;

  'app: loop {
    context.window.glfw.poll_events();

    for (_, event) in glfw::flush_messages(&events) {
      match adapt_events(event) {
        Some(InputAction::Quit) => break 'app,
        Some(InputAction::Reload) => session.reload_all(&mut context),
        Some(InputAction::Print) => session.print_active(&mut context),
        Some(InputAction::Cycle) => session.cycle(),
        Some(InputAction::Unload) => session.unload_active(),
        None => (),
      }
    }

    let t = start_t.elapsed().as_secs_f32();
    session.render(&mut context, t, |_| triangle.render());
    context.window.swap_buffers();
    frame += 1;

    if cli_opts.list {
      session.print_all(&mut context);
      break;
    }

    if cli_opts.frames.map_or(false, |frames| frame >= frames) {
      break;
    }
  }

  Ok(())
}

fn main() {
  env_logger::builder()
    .filter_level(log::LevelFilter::Info)
    .parse_default_env()
    .init();
  let cli_opts = CLIOpts::from_args();

  if let Err(e) = run(cli_opts) {
    log::error!("{}", e);
    process::exit(1);
  }
}
