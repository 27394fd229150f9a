//! Follow edge entity (the `followers` join table).
//!
//! A row means `follower_id` follows `followed_id`. The pair is the primary
//! key, so an edge can exist at most once.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "followers")]
pub struct Model {
    /// The user who is following
    #[sea_orm(primary_key, auto_increment = false)]
    pub follower_id: i32,

    /// The user being followed
    #[sea_orm(primary_key, auto_increment = false)]
    pub followed_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::FollowerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Follower,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::FollowedId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Followed,
}

impl ActiveModelBehavior for ActiveModel {}
