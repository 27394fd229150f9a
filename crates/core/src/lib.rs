//! Core business logic for flock.

pub mod services;

pub use services::*;
