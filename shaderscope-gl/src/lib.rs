//! OpenGL backends.
//!
//! This crate exports [OpenGL](https://www.khronos.org/opengl/) backends for
//! [shaderscope](../shaderscope). The backend type, [`GL33`], implements the shader backend trait of
//! the core crate, and also carries the handful of extra operations the inspector needs to show
//! a shader at work: clearing the screen, drawing a full-screen triangle and uploading RGB textures
//! for sampler uniforms.

pub mod gl33;

pub use gl33::GL33;
