//! Domain entities of the movie catalogue.

pub mod entities;

pub use entities::*;
