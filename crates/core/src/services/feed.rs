//! Feed service: posting and reading timelines.

use flock_common::{AppResult, Config};
use flock_db::{
    entities::post,
    repositories::{Page, PostRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Feed service for posting and reading.
#[derive(Clone)]
pub struct FeedService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    posts_per_page: u64,
}

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostInput {
    #[validate(length(min = 1, max = 140))]
    pub body: String,

    #[validate(length(max = 140))]
    pub url: Option<String>,
}

impl FeedService {
    /// Create a new feed service using the configured page size.
    #[must_use]
    pub fn new(post_repo: PostRepository, user_repo: UserRepository, config: &Config) -> Self {
        Self::with_posts_per_page(post_repo, user_repo, config.feed.posts_per_page)
    }

    /// Create a new feed service with an explicit page size.
    #[must_use]
    pub fn with_posts_per_page(
        post_repo: PostRepository,
        user_repo: UserRepository,
        posts_per_page: u64,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            posts_per_page: posts_per_page.max(1),
        }
    }

    /// Publish a post by `author_id`, timestamped now.
    pub async fn create_post(
        &self,
        author_id: i32,
        input: CreatePostInput,
    ) -> AppResult<post::Model> {
        input.validate()?;

        self.user_repo.get_by_id(author_id).await?;

        let model = post::ActiveModel {
            body: Set(input.body),
            url: Set(input.url),
            user_id: Set(author_id),
            ..Default::default()
        };

        let post = self.post_repo.create(model).await?;
        tracing::info!(post_id = post.id, user_id = author_id, "Created post");
        Ok(post)
    }

    /// Get a post by ID.
    pub async fn get_post(&self, id: i32) -> AppResult<post::Model> {
        self.post_repo.get_by_id(id).await
    }

    /// Number of posts authored by `user_id`.
    pub async fn post_count(&self, user_id: i32) -> AppResult<u64> {
        self.post_repo.count_by_user(user_id).await
    }

    /// Posts by users `user_id` follows plus their own, newest first.
    pub async fn followed_posts(&self, user_id: i32) -> AppResult<Vec<post::Model>> {
        self.post_repo.find_followed_posts(user_id).await
    }

    /// One page of [`Self::followed_posts`].
    pub async fn followed_posts_page(
        &self,
        user_id: i32,
        page: u64,
    ) -> AppResult<Page<post::Model>> {
        self.post_repo
            .find_followed_posts_page(user_id, page, self.posts_per_page)
            .await
    }

    /// One page of a user's own posts, newest first.
    pub async fn user_posts_page(&self, user_id: i32, page: u64) -> AppResult<Page<post::Model>> {
        self.user_repo.get_by_id(user_id).await?;
        self.post_repo
            .find_by_user_page(user_id, page, self.posts_per_page)
            .await
    }

    /// One page of all posts, newest first.
    pub async fn explore_page(&self, page: u64) -> AppResult<Page<post::Model>> {
        self.post_repo
            .find_all_page(page, self.posts_per_page)
            .await
    }
}
