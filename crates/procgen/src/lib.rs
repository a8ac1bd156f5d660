//! Procedural terrain: height-field generation, ground queries and the
//! fragments used when the field is torn down.

pub mod surface_triangle;
pub mod terrain;

pub use surface_triangle::*;
pub use terrain::*;
