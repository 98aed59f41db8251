//! Backend interfaces.
//!
//! This module defines the traits a graphics backend must implement so that the rest of the crate
//! can work with it. The interface is low-level and `unsafe`: implementors must uphold the
//! invariants documented on each method, and users should go through the safe wrappers of the
//! [`shader`](crate::shader) and [`registry`](crate::registry) modules instead.

pub mod shader;

#[cfg(test)]
pub(crate) mod mock;
