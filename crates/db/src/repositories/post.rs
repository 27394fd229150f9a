//! Post repository.

use std::sync::Arc;

use super::{FollowerRepository, Page};
use crate::entities::{Post, post};
use crate::map_db_err;
use flock_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Select,
};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model.insert(self.db.as_ref()).await.map_err(map_db_err)
    }

    /// Feed of `user_id`: posts by followed users plus their own.
    ///
    /// Newest first; posts sharing a timestamp are ordered by ID, newest first.
    #[must_use]
    pub fn feed_query(user_id: i32) -> Select<Post> {
        let followed = FollowerRepository::followed_ids_query(user_id);

        Post::find()
            .filter(
                Condition::any()
                    .add(post::Column::UserId.in_subquery(followed))
                    .add(post::Column::UserId.eq(user_id)),
            )
            .order_by_desc(post::Column::Timestamp)
            .order_by_desc(post::Column::Id)
    }

    /// The whole feed of a user.
    pub async fn find_followed_posts(&self, user_id: i32) -> AppResult<Vec<post::Model>> {
        Self::feed_query(user_id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// One page of the feed of a user.
    pub async fn find_followed_posts_page(
        &self,
        user_id: i32,
        page: u64,
        per_page: u64,
    ) -> AppResult<Page<post::Model>> {
        self.fetch_page(Self::feed_query(user_id), page, per_page)
            .await
    }

    /// One page of a user's own posts, newest first.
    pub async fn find_by_user_page(
        &self,
        user_id: i32,
        page: u64,
        per_page: u64,
    ) -> AppResult<Page<post::Model>> {
        let query = Post::find()
            .filter(post::Column::UserId.eq(user_id))
            .order_by_desc(post::Column::Timestamp)
            .order_by_desc(post::Column::Id);
        self.fetch_page(query, page, per_page).await
    }

    /// One page of all posts, newest first.
    pub async fn find_all_page(&self, page: u64, per_page: u64) -> AppResult<Page<post::Model>> {
        let query = Post::find()
            .order_by_desc(post::Column::Timestamp)
            .order_by_desc(post::Column::Id);
        self.fetch_page(query, page, per_page).await
    }

    /// Count posts by a user.
    pub async fn count_by_user(&self, user_id: i32) -> AppResult<u64> {
        Post::find()
            .filter(post::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Run `query` as page `page` (1-based; 0 is read as 1).
    async fn fetch_page(
        &self,
        query: Select<Post>,
        page: u64,
        per_page: u64,
    ) -> AppResult<Page<post::Model>> {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let paginator = query.paginate(self.db.as_ref(), per_page);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        // Pages past the end (including offsets too large to compute) are empty
        let past_end = (page - 1)
            .checked_mul(per_page)
            .is_none_or(|offset| offset >= total);
        let items = if past_end {
            Vec::new()
        } else {
            paginator
                .fetch_page(page - 1)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?
        };

        Ok(Page {
            items,
            page,
            per_page,
            total,
        })
    }
}
