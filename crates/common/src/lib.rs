//! Common utilities and shared types for flock.
//!
//! This crate provides foundational components used across all flock crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Cryptography**: Secret key generation via [`generate_secret_key`]
//!
//! # Example
//!
//! ```no_run
//! use flock_common::{AppResult, Config};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     println!("Serving {} posts per page", config.feed.posts_per_page);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crypto;
pub mod error;

pub use config::Config;
pub use crypto::generate_secret_key;
pub use error::{AppError, AppResult};
