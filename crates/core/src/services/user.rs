//! User service.

use flock_common::{AppError, AppResult};
use flock_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// User service for accounts and session resolution.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
}

/// Input for registering a new user.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 64))]
    pub username: String,

    #[validate(email, length(max = 120))]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,

    #[validate(length(max = 140))]
    pub about_me: Option<String>,
}

/// Input for editing a profile.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(max = 140))]
    pub about_me: Option<String>,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// Register a new user.
    ///
    /// A taken username or email fails with [`AppError::Conflict`].
    pub async fn register(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        let password_hash = user::hash_password(&input.password)?;

        let model = user::ActiveModel {
            username: Set(input.username),
            email: Set(input.email),
            about_me: Set(input.about_me),
            password_hash: Set(Some(password_hash)),
            poster: Set(false),
            ..Default::default()
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = user.id, username = %user.username, "Registered user");
        Ok(user)
    }

    /// Get a user by username.
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))
    }

    /// Check a username and password.
    ///
    /// Returns `None` for an unknown user or a wrong password.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> AppResult<Option<user::Model>> {
        let Some(user) = self.user_repo.find_by_username(username).await? else {
            tracing::warn!(username, "Login for unknown user");
            return Ok(None);
        };

        if !user.check_password(password) {
            tracing::warn!(user_id = user.id, "Login with wrong password");
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Resolve a session's stored user identifier.
    ///
    /// Identifiers that are not numeric or match no user resolve to `None`.
    pub async fn load_user(&self, id: &str) -> AppResult<Option<user::Model>> {
        let Ok(id) = id.trim().parse::<i32>() else {
            return Ok(None);
        };
        self.user_repo.find_by_id(id).await
    }

    /// Record activity by setting `last_seen` to now.
    pub async fn touch_last_seen(&self, user_id: i32) -> AppResult<()> {
        if self.user_repo.touch_last_seen(user_id).await? {
            Ok(())
        } else {
            Err(AppError::UserNotFound(user_id.to_string()))
        }
    }

    /// Replace a user's profile text.
    pub async fn update_about_me(
        &self,
        user_id: i32,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(user_id).await?;
        let mut active: user::ActiveModel = user.into();
        active.about_me = Set(input.about_me);

        self.user_repo.update(active).await
    }

    /// Hash and store a new password.
    pub async fn change_password(&self, user_id: i32, password: &str) -> AppResult<()> {
        if password.is_empty() {
            return Err(AppError::Validation("Password must not be empty".to_string()));
        }

        let mut user = self.user_repo.get_by_id(user_id).await?;
        user.set_password(password)?;

        let hash = user.password_hash.clone();
        let mut active: user::ActiveModel = user.into();
        active.password_hash = Set(hash);
        self.user_repo.update(active).await?;

        tracing::info!(user_id, "Changed password");
        Ok(())
    }

    /// Persist the poster flag.
    pub async fn set_poster(&self, user_id: i32, poster: bool) -> AppResult<user::Model> {
        let mut user = self.user_repo.get_by_id(user_id).await?;
        user.set_poster(poster);

        let mut active: user::ActiveModel = user.into();
        active.poster = Set(poster);
        self.user_repo.update(active).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: i32, username: &str) -> user::Model {
        user::Model {
            id,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            about_me: None,
            last_seen: Utc::now().into(),
            password_hash: None,
            poster: false,
        }
    }

    fn service_with(db: MockDatabase) -> UserService {
        UserService::new(UserRepository::new(Arc::new(db.into_connection())))
    }

    #[tokio::test]
    async fn test_register_invalid_email_returns_error() {
        let service = service_with(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .register(CreateUserInput {
                username: "alice".to_string(),
                email: "not-an-email".to_string(),
                password: "secret".to_string(),
                about_me: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_long_username_returns_error() {
        let service = service_with(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .register(CreateUserInput {
                username: "a".repeat(65),
                email: "alice@example.com".to_string(),
                password: "secret".to_string(),
                about_me: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_success() {
        let user = create_test_user(1, "alice");
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[user]]),
        );

        let result = service
            .register(CreateUserInput {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password: "secret".to_string(),
                about_me: Some("hi".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(result.username, "alice");
    }

    #[tokio::test]
    async fn test_authenticate_unknown_user() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
        );

        assert!(service.authenticate("ghost", "pw").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_authenticate_checks_password() {
        let mut user = create_test_user(1, "alice");
        user.set_password("correct").unwrap();

        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .append_query_results([[user]]),
        );

        assert!(service.authenticate("alice", "wrong").await.unwrap().is_none());
        let found = service.authenticate("alice", "correct").await.unwrap();
        assert_eq!(found.unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_load_user_non_numeric() {
        let service = service_with(MockDatabase::new(DatabaseBackend::Postgres));

        assert!(service.load_user("abc").await.unwrap().is_none());
        assert!(service.load_user("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_user_unknown_id() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
        );

        assert!(service.load_user("999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_user_found() {
        let user = create_test_user(7, "bob");
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[user]]),
        );

        let loaded = service.load_user("7").await.unwrap().unwrap();
        assert_eq!(loaded.username, "bob");
    }

    #[tokio::test]
    async fn test_update_about_me_too_long() {
        let service = service_with(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .update_about_me(
                1,
                UpdateProfileInput {
                    about_me: Some("x".repeat(141)),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_change_password_unknown_user() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
        );

        let result = service.change_password(5, "new").await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }
}
