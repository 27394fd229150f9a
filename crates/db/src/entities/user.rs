//! User entity.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use flock_common::{AppError, AppResult};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, Set};
use serde::{Deserialize, Serialize};

/// Base URL of the avatar image service.
pub const GRAVATAR_URL: &str = "https://www.gravatar.com/avatar";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique, indexed)]
    pub username: String,

    #[sea_orm(unique, indexed)]
    pub email: String,

    /// Profile text (max 140 chars)
    #[sea_orm(nullable)]
    pub about_me: Option<String>,

    /// Last authenticated activity, initialised to the creation time
    pub last_seen: DateTimeWithTimeZone,

    /// Argon2 PHC string; never the plaintext
    #[sea_orm(nullable)]
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,

    #[sea_orm(default_value = false)]
    pub poster: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Posts,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert && self.last_seen.is_not_set() {
            self.last_seen = Set(chrono::Utc::now().into());
        }
        Ok(self)
    }
}

impl Model {
    /// Replace the stored password hash with a fresh salted hash of `password`.
    ///
    /// Only the in-memory record changes; persisting it is up to the caller.
    pub fn set_password(&mut self, password: &str) -> AppResult<()> {
        self.password_hash = Some(hash_password(password)?);
        Ok(())
    }

    /// Check `password` against the stored hash.
    ///
    /// Returns `false` when no password has been set or the stored hash
    /// cannot be parsed.
    #[must_use]
    pub fn check_password(&self, password: &str) -> bool {
        self.password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(password, hash))
    }

    /// Identicon avatar URL for this user's email at `size` pixels.
    #[must_use]
    pub fn avatar(&self, size: u32) -> String {
        let digest = md5::compute(self.email.to_lowercase().as_bytes());
        format!("{GRAVATAR_URL}/{digest:x}?d=identicon&s={size}")
    }

    /// Whether this user carries the poster flag.
    #[must_use]
    pub const fn is_poster(&self) -> bool {
        self.poster
    }

    /// Set the poster flag on the in-memory record.
    pub fn set_poster(&mut self, poster: bool) {
        self.poster = poster;
    }
}

/// Hash a password using Argon2 with a random salt.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a PHC hash string.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
