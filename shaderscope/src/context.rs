//! Graphics context.
//!
//! A graphics context is an object that abstracts all the low-level operations that happen on a
//! graphics device. This crate doesn’t provide you with creating such contexts; windowing crates
//! (shaderscope-glfw, for instance) do it for you.
//!
//! The context is passed explicitly to every operation needing the GPU, such as building or binding
//! a [`Program`](crate::shader::program::Program). There is no global graphics state to reach for.
//!
//! # On context and threads
//!
//! - An object which type implements `GraphicsContext` must be `!Send` and `!Sync`. This enforces
//!   that it cannot be moved nor shared between threads.
//! - You can only create a single context per thread. Doing otherwise is undefined behavior.

/// Class of graphics context.
///
/// Such a context must not be Send nor Sync, which means that you cannot share it between
/// threads in any way (move / borrow).
pub unsafe trait GraphicsContext {
  /// Backend type this context runs on.
  type Backend: ?Sized;

  /// Access the backend.
  fn backend(&mut self) -> &mut Self::Backend;
}
