//! # Flix Core
//!
//! Core types shared by every layer of the Flix movie catalogue: the domain
//! entities, their strongly-typed identifiers, and the unified error type.

pub mod domain;
pub mod error;
pub mod id;
pub mod result;
pub mod traits;
pub mod validation;

pub use domain::*;
pub use error::*;
pub use id::*;
pub use result::*;
pub use traits::*;
pub use validation::*;
