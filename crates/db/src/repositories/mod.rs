//! Repositories wrapping the database entities.

pub mod follower;
pub mod post;
pub mod user;

pub use follower::FollowerRepository;
pub use post::PostRepository;
pub use user::UserRepository;

use serde::Serialize;

/// One page of a paginated query.
///
/// Pages are numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Current page number.
    pub page: u64,
    /// Maximum items per page.
    pub per_page: u64,
    /// Total number of items across all pages.
    pub total: u64,
}

impl<T> Page<T> {
    /// Number of pages needed for `total` items.
    #[must_use]
    pub const fn num_pages(&self) -> u64 {
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(self.per_page)
    }

    /// Whether a later page has items.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.num_pages()
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Next page number, if any.
    #[must_use]
    pub const fn next_page(&self) -> Option<u64> {
        if self.has_next() { Some(self.page + 1) } else { None }
    }

    /// Previous page number, if any.
    #[must_use]
    pub const fn prev_page(&self) -> Option<u64> {
        if self.has_prev() { Some(self.page - 1) } else { None }
    }
}
