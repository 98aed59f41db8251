//! # shaderscope windowing
//!
//! Window-related types shared by the windowing crates. The core crate knows nothing about
//! windows: it only needs a graphics context. Creating the window and its OpenGL context is the job
//! of a windowing crate (`shaderscope-glfw`), configured with the types defined here:
//!
//! - [`WindowDim`]: dimension of a window and its mode (windowed, fullscreen, fullscreen
//!   restricted).
//! - [`WindowOpt`]: hints to customize the window, such as its dimension, the cursor mode or the
//!   number of samples used for multisampling.

#![deny(missing_docs)]

/// Dimension metrics.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WindowDim {
  /// Windowed mode.
  Windowed {
    /// Width of the window.
    width: u32,
    /// Height of the window.
    height: u32,
  },
  /// Fullscreen mode (adapt to your screen).
  Fullscreen,
  /// Fullscreen mode with restricted viewport dimension.
  FullscreenRestricted {
    /// Width of the window.
    width: u32,
    /// Height of the window.
    height: u32,
  },
}

impl WindowDim {
  /// Requested size, if any.
  ///
  /// `Fullscreen` uses the monitor resolution and has no requested size.
  pub fn size(&self) -> Option<[u32; 2]> {
    match *self {
      WindowDim::Windowed { width, height } | WindowDim::FullscreenRestricted { width, height } => {
        Some([width, height])
      }
      WindowDim::Fullscreen => None,
    }
  }
}

/// Cursor mode.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CursorMode {
  /// The cursor is always visible.
  Visible,
  /// The cursor exists yet has been disabled.
  Invisible,
  /// The cursor is disabled.
  Disabled,
}

/// Different window options.
///
/// Feel free to look at the different methods available to tweak the options. You may want to start
/// with `default()` though.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WindowOpt {
  dim: WindowDim,
  cursor_mode: CursorMode,
  num_samples: Option<u32>,
  vsync: bool,
}

impl Default for WindowOpt {
  /// Defaults:
  ///
  /// - `dim` set to a 960×540 window.
  /// - `cursor_mode` set to `CursorMode::Visible`.
  /// - `num_samples` set to `None`.
  /// - `vsync` enabled.
  fn default() -> Self {
    WindowOpt {
      dim: WindowDim::Windowed {
        width: 960,
        height: 540,
      },
      cursor_mode: CursorMode::Visible,
      num_samples: None,
      vsync: true,
    }
  }
}

impl WindowOpt {
  /// Set the dimension of the window.
  #[inline]
  pub fn set_dim(self, dim: WindowDim) -> Self {
    WindowOpt { dim, ..self }
  }

  /// Get the dimension of the window.
  #[inline]
  pub fn dim(&self) -> WindowDim {
    self.dim
  }

  /// Hide, unhide or disable the cursor. Default to `CursorMode::Visible`.
  #[inline]
  pub fn set_cursor_mode(self, mode: CursorMode) -> Self {
    WindowOpt {
      cursor_mode: mode,
      ..self
    }
  }

  /// Get the cursor mode.
  #[inline]
  pub fn cursor_mode(&self) -> CursorMode {
    self.cursor_mode
  }

  /// Set the number of samples to use for multisampling.
  ///
  /// Pass `None` to disable multisampling.
  #[inline]
  pub fn set_num_samples<S>(self, samples: S) -> Self
  where
    S: Into<Option<u32>>,
  {
    WindowOpt {
      num_samples: samples.into(),
      ..self
    }
  }

  /// Get the number of samples to use in multisampling, if any.
  #[inline]
  pub fn num_samples(&self) -> Option<u32> {
    self.num_samples
  }

  /// Enable or disable vertical synchronization.
  #[inline]
  pub fn set_vsync(self, vsync: bool) -> Self {
    WindowOpt { vsync, ..self }
  }

  /// Whether vertical synchronization is enabled.
  #[inline]
  pub fn vsync(&self) -> bool {
    self.vsync
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builder_keeps_other_options() {
    let opt = WindowOpt::default()
      .set_num_samples(4)
      .set_dim(WindowDim::Windowed {
        width: 100,
        height: 50,
      })
      .set_vsync(false);

    assert_eq!(opt.num_samples(), Some(4));
    assert_eq!(opt.dim().size(), Some([100, 50]));
    assert_eq!(opt.cursor_mode(), CursorMode::Visible);
    assert!(!opt.vsync());
  }

  #[test]
  fn fullscreen_has_no_size() {
    assert_eq!(WindowDim::Fullscreen.size(), None);
  }
}
