//! Following service.

use flock_common::{AppError, AppResult};
use flock_db::{
    entities::user,
    repositories::{FollowerRepository, UserRepository},
};

/// Following service for the social graph.
#[derive(Clone)]
pub struct FollowingService {
    follower_repo: FollowerRepository,
    user_repo: UserRepository,
}

impl FollowingService {
    /// Create a new following service.
    #[must_use]
    pub const fn new(follower_repo: FollowerRepository, user_repo: UserRepository) -> Self {
        Self {
            follower_repo,
            user_repo,
        }
    }

    /// Follow a user.
    ///
    /// Returns `true` if a new edge was created, `false` if it already existed.
    pub async fn follow(&self, follower_id: i32, followed_id: i32) -> AppResult<bool> {
        // Can't follow yourself
        if follower_id == followed_id {
            return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
        }

        if self
            .follower_repo
            .is_following(follower_id, followed_id)
            .await?
        {
            tracing::debug!(follower_id, followed_id, "Already following");
            return Ok(false);
        }

        // Both users must exist
        self.user_repo.get_by_id(follower_id).await?;
        self.user_repo.get_by_id(followed_id).await?;

        match self.follower_repo.create(follower_id, followed_id).await {
            Ok(_) => {
                tracing::info!(follower_id, followed_id, "Followed user");
                Ok(true)
            }
            Err(e) => {
                // A concurrent follow may have inserted the edge first
                if self
                    .follower_repo
                    .is_following(follower_id, followed_id)
                    .await?
                {
                    tracing::debug!(follower_id, followed_id, error = %e, "Follow edge already inserted");
                    Ok(false)
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Unfollow a user.
    ///
    /// Returns `true` if an edge was removed, `false` if there was none.
    pub async fn unfollow(&self, follower_id: i32, followed_id: i32) -> AppResult<bool> {
        let removed = self
            .follower_repo
            .delete_by_pair(follower_id, followed_id)
            .await?;

        if removed {
            tracing::info!(follower_id, followed_id, "Unfollowed user");
        } else {
            tracing::debug!(follower_id, followed_id, "Not following; nothing to remove");
        }
        Ok(removed)
    }

    /// Check if a user is following another user.
    pub async fn is_following(&self, follower_id: i32, followed_id: i32) -> AppResult<bool> {
        self.follower_repo
            .is_following(follower_id, followed_id)
            .await
    }

    /// Users following `user_id`.
    pub async fn followers(&self, user_id: i32) -> AppResult<Vec<user::Model>> {
        self.follower_repo.find_followers(user_id).await
    }

    /// Users `user_id` follows.
    pub async fn followed_users(&self, user_id: i32) -> AppResult<Vec<user::Model>> {
        self.follower_repo.find_followed_users(user_id).await
    }

    /// Followers of `user_id` that have authored at least one post.
    pub async fn followers_with_posts(&self, user_id: i32) -> AppResult<Vec<user::Model>> {
        self.follower_repo.find_followers_with_posts(user_id).await
    }

    /// Users `user_id` follows that have authored at least one post.
    pub async fn followed_users_with_posts(&self, user_id: i32) -> AppResult<Vec<user::Model>> {
        self.follower_repo
            .find_followed_users_with_posts(user_id)
            .await
    }

    /// Number of followers of `user_id`.
    pub async fn followers_count(&self, user_id: i32) -> AppResult<u64> {
        self.follower_repo.count_followers(user_id).await
    }

    /// Number of users `user_id` follows.
    pub async fn following_count(&self, user_id: i32) -> AppResult<u64> {
        self.follower_repo.count_following(user_id).await
    }
}
