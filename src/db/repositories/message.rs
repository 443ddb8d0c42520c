use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::messages;

/// Maximum warble length in characters.
pub const MAX_WARBLE_LENGTH: usize = 140;

#[derive(Debug, Clone)]
pub struct Warble {
    pub id: i32,
    pub user_id: i32,
    pub text: String,
    pub created_at: String,
}

impl From<messages::Model> for Warble {
    fn from(model: messages::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            text: model.text,
            created_at: model.created_at,
        }
    }
}

pub struct MessageRepository {
    conn: DatabaseConnection,
}

impl MessageRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, user_id: i32, text: &str) -> Result<Warble> {
        let active = messages::ActiveModel {
            user_id: Set(user_id),
            text: Set(text.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert message")?;

        Ok(Warble::from(model))
    }

    pub async fn get(&self, id: i32) -> Result<Option<Warble>> {
        let row = messages::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query message")?;

        Ok(row.map(Warble::from))
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<Warble>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = messages::Entity::find()
            .filter(messages::Column::Id.is_in(ids.iter().copied()))
            .order_by_desc(messages::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to query messages by IDs")?;

        Ok(rows.into_iter().map(Warble::from).collect())
    }

    /// Warbles authored by one user, newest first.
    pub async fn for_user(&self, user_id: i32) -> Result<Vec<Warble>> {
        let rows = messages::Entity::find()
            .filter(messages::Column::UserId.eq(user_id))
            .order_by_desc(messages::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to query messages for user")?;

        Ok(rows.into_iter().map(Warble::from).collect())
    }

    /// Home feed: newest warbles authored by any of the given users.
    pub async fn feed(&self, user_ids: &[i32], limit: u64) -> Result<Vec<Warble>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = messages::Entity::find()
            .filter(messages::Column::UserId.is_in(user_ids.iter().copied()))
            .order_by_desc(messages::Column::CreatedAt)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to query feed")?;

        Ok(rows.into_iter().map(Warble::from).collect())
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let res = messages::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete message")?;

        Ok(res.rows_affected > 0)
    }
}
