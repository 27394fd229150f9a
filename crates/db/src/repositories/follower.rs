//! Follow edge repository.

use std::sync::Arc;

use crate::entities::{Follower, User, follower, post, user};
use crate::map_db_err;
use flock_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, QueryTrait, Set,
    sea_query::{Expr, Query, SelectStatement},
};

/// Repository for the `followers` edge table.
#[derive(Clone)]
pub struct FollowerRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowerRepository {
    /// Create a new follower repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// IDs of the users `user_id` follows, as a subquery.
    #[must_use]
    pub fn followed_ids_query(user_id: i32) -> SelectStatement {
        Follower::find()
            .select_only()
            .column(follower::Column::FollowedId)
            .filter(follower::Column::FollowerId.eq(user_id))
            .into_query()
    }

    /// IDs of the users following `user_id`, as a subquery.
    #[must_use]
    pub fn follower_ids_query(user_id: i32) -> SelectStatement {
        Follower::find()
            .select_only()
            .column(follower::Column::FollowerId)
            .filter(follower::Column::FollowedId.eq(user_id))
            .into_query()
    }

    /// Find the edge `follower_id -> followed_id`.
    pub async fn find_by_pair(
        &self,
        follower_id: i32,
        followed_id: i32,
    ) -> AppResult<Option<follower::Model>> {
        Follower::find_by_id((follower_id, followed_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user is following another user.
    pub async fn is_following(&self, follower_id: i32, followed_id: i32) -> AppResult<bool> {
        Ok(self.find_by_pair(follower_id, followed_id).await?.is_some())
    }

    /// Insert the edge `follower_id -> followed_id`.
    ///
    /// An existing edge is rejected by the primary key and reported as
    /// [`AppError::Conflict`].
    pub async fn create(&self, follower_id: i32, followed_id: i32) -> AppResult<follower::Model> {
        let model = follower::ActiveModel {
            follower_id: Set(follower_id),
            followed_id: Set(followed_id),
        };

        Follower::insert(model)
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(follower::Model {
            follower_id,
            followed_id,
        })
    }

    /// Delete the edge `follower_id -> followed_id`.
    ///
    /// Returns whether an edge was removed.
    pub async fn delete_by_pair(&self, follower_id: i32, followed_id: i32) -> AppResult<bool> {
        let result = Follower::delete_many()
            .filter(follower::Column::FollowerId.eq(follower_id))
            .filter(follower::Column::FollowedId.eq(followed_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Count followers of a user.
    pub async fn count_followers(&self, user_id: i32) -> AppResult<u64> {
        Follower::find()
            .filter(follower::Column::FollowedId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count users a user is following.
    pub async fn count_following(&self, user_id: i32) -> AppResult<u64> {
        Follower::find()
            .filter(follower::Column::FollowerId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Users `user_id` follows, ordered by user ID.
    pub async fn find_followed_users(&self, user_id: i32) -> AppResult<Vec<user::Model>> {
        User::find()
            .filter(user::Column::Id.in_subquery(Self::followed_ids_query(user_id)))
            .order_by_asc(user::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Users following `user_id`, ordered by user ID.
    pub async fn find_followers(&self, user_id: i32) -> AppResult<Vec<user::Model>> {
        User::find()
            .filter(user::Column::Id.in_subquery(Self::follower_ids_query(user_id)))
            .order_by_asc(user::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Users `user_id` follows, derived by joining posts against the edge table.
    ///
    /// Only followed users who have authored at least one post are returned.
    pub async fn find_followed_users_with_posts(
        &self,
        user_id: i32,
    ) -> AppResult<Vec<user::Model>> {
        let authors = Self::authors_joined_on(
            follower::Column::FollowedId,
            follower::Column::FollowerId,
            user_id,
        );

        User::find()
            .filter(user::Column::Id.in_subquery(authors))
            .order_by_asc(user::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Users following `user_id`, derived by joining posts against the edge table.
    ///
    /// Only followers who have authored at least one post are returned.
    pub async fn find_followers_with_posts(&self, user_id: i32) -> AppResult<Vec<user::Model>> {
        let authors = Self::authors_joined_on(
            follower::Column::FollowerId,
            follower::Column::FollowedId,
            user_id,
        );

        User::find()
            .filter(user::Column::Id.in_subquery(authors))
            .order_by_asc(user::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// `SELECT post.user_id FROM post JOIN followers ON followers.<join_col> = post.user_id
    /// WHERE followers.<filter_col> = user_id`
    fn authors_joined_on(
        join_col: follower::Column,
        filter_col: follower::Column,
        user_id: i32,
    ) -> SelectStatement {
        Query::select()
            .column((post::Entity, post::Column::UserId))
            .from(post::Entity)
            .inner_join(
                follower::Entity,
                Expr::col((follower::Entity, join_col))
                    .equals((post::Entity, post::Column::UserId)),
            )
            .and_where(Expr::col((follower::Entity, filter_col)).eq(user_id))
            .to_owned()
    }
}
