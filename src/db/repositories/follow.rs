use anyhow::{Context, Result};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::entities::follows;

pub struct FollowRepository {
    conn: DatabaseConnection,
}

impl FollowRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Create a follow edge. Returns false if it already existed.
    pub async fn follow(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        if self.is_following(follower_id, followed_id).await? {
            return Ok(false);
        }

        let active = follows::ActiveModel {
            follower_id: Set(follower_id),
            followed_id: Set(followed_id),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        follows::Entity::insert(active)
            .exec(&self.conn)
            .await
            .context("Failed to insert follow edge")?;

        Ok(true)
    }

    /// Remove a follow edge. Returns false if none existed.
    pub async fn unfollow(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        let res = follows::Entity::delete_by_id((follower_id, followed_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete follow edge")?;

        Ok(res.rows_affected > 0)
    }

    pub async fn is_following(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        let edge = follows::Entity::find_by_id((follower_id, followed_id))
            .one(&self.conn)
            .await
            .context("Failed to query follow edge")?;

        Ok(edge.is_some())
    }

    /// IDs of users this user follows.
    pub async fn following_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        let rows = follows::Entity::find()
            .filter(follows::Column::FollowerId.eq(user_id))
            .all(&self.conn)
            .await
            .context("Failed to query following edges")?;

        Ok(rows.into_iter().map(|f| f.followed_id).collect())
    }

    /// IDs of users following this user.
    pub async fn follower_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        let rows = follows::Entity::find()
            .filter(follows::Column::FollowedId.eq(user_id))
            .all(&self.conn)
            .await
            .context("Failed to query follower edges")?;

        Ok(rows.into_iter().map(|f| f.follower_id).collect())
    }
}
