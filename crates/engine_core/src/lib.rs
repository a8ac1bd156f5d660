//! Core types shared by every crate of the walker demo.
//!
//! This crate provides the foundational pieces used across the simulation:
//! - Frame timing driven by an external delta
//! - The uniform random capability
//! - Colors handed to the render layer

pub mod color;
pub mod random;
pub mod time;

pub use color::*;
pub use random::*;
pub use time::*;

// Re-export commonly used types
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
