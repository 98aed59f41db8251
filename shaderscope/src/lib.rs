//! # Shader uniform reflection and live binding
//!
//! shaderscope loads GLSL vertex / fragment shader pairs, links them into GPU programs and
//! introspects their declared uniforms by scanning the shader source text. Every discovered uniform
//! gets typed host-side storage, initialized from the value the GPU currently holds for it. Those
//! values can then be edited freely (by an editor UI, a command line, a test…) and are pushed back
//! to the GPU every time the program gets bound for drawing.
//!
//! # Architecture
//!
//! The crate is split the same way a rendering library splits its core and backend:
//!
//! - The **core** (this crate) gathers everything that doesn’t depend on a graphics API: the
//!   [uniform model](crate::shader::uniform), the [declaration parser](crate::shader::parser), the
//!   [shader program](crate::shader::program::Program) and the [shader registry](crate::registry).
//!   All of them are parametric over a backend type, by convention the type variable `B`.
//! - **Backends** implement the [`backend::shader::Shader`] trait. shaderscope-gl provides an
//!   OpenGL 3.3 one.
//! - **Windowing** crates create the graphics context and hand out a type implementing
//!   [`context::GraphicsContext`], which is then passed explicitly to every operation touching the
//!   GPU.
//!
//! # Ownership of GPU resources
//!
//! A [`Program`](crate::shader::program::Program) exclusively owns its GPU handle and its
//! uniforms; it cannot be cloned. A [`Registry`](crate::registry::Registry) exclusively owns its
//! programs and hands out [`ShaderId`](crate::registry::ShaderId)s, which stop resolving as soon as
//! the program they designate gets unloaded or replaced.
//!
//! # Logging
//!
//! Compilation and link errors, rejected declarations and other non-fatal conditions are reported
//! through the [log](https://crates.io/crates/log) facade. Nothing in this crate panics because a
//! shader is broken.

pub mod backend;
pub mod context;
pub mod registry;
pub mod shader;
pub mod texture;
