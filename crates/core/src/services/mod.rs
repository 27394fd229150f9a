//! Business logic services.

#![allow(missing_docs)]

pub mod feed;
pub mod following;
pub mod user;

pub use feed::{CreatePostInput, FeedService};
pub use following::FollowingService;
pub use user::{CreateUserInput, UpdateProfileInput, UserService};
