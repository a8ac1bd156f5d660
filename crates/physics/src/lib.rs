//! Geometry queries for the walker demo: bounding boxes and ray tests.

pub mod collision;
pub mod raycast;

pub use collision::*;
pub use raycast::*;
