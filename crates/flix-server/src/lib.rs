//! # Flix Server
//!
//! HTTP surface of the Flix movie catalogue. Selects the repository backend
//! at startup, bootstraps the schema and exposes the catalogue as JSON.

pub mod bootstrap;
pub mod controllers;
pub mod extractors;
pub mod middleware;
pub mod responses;
pub mod router;
pub mod startup;
pub mod state;

pub use bootstrap::*;
pub use router::*;
pub use state::*;
