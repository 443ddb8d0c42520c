use anyhow::{Context, Result};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::entities::likes;

pub struct LikeRepository {
    conn: DatabaseConnection,
}

impl LikeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Create a like edge. Returns false if it already existed.
    pub async fn like(&self, user_id: i32, message_id: i32) -> Result<bool> {
        if self.has_liked(user_id, message_id).await? {
            return Ok(false);
        }

        let active = likes::ActiveModel {
            user_id: Set(user_id),
            message_id: Set(message_id),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        likes::Entity::insert(active)
            .exec(&self.conn)
            .await
            .context("Failed to insert like edge")?;

        Ok(true)
    }

    /// Remove a like edge. Returns false if none existed.
    pub async fn unlike(&self, user_id: i32, message_id: i32) -> Result<bool> {
        let res = likes::Entity::delete_by_id((user_id, message_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete like edge")?;

        Ok(res.rows_affected > 0)
    }

    pub async fn has_liked(&self, user_id: i32, message_id: i32) -> Result<bool> {
        let edge = likes::Entity::find_by_id((user_id, message_id))
            .one(&self.conn)
            .await
            .context("Failed to query like edge")?;

        Ok(edge.is_some())
    }

    /// IDs of warbles this user has liked.
    pub async fn liked_message_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        let rows = likes::Entity::find()
            .filter(likes::Column::UserId.eq(user_id))
            .all(&self.conn)
            .await
            .context("Failed to query like edges")?;

        Ok(rows.into_iter().map(|l| l.message_id).collect())
    }
}
