//! # Flix Security
//!
//! Password hashing for user registration and login.

pub mod password;

pub use password::*;
