use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::message::{MAX_WARBLE_LENGTH, Warble};
pub use repositories::user::{NewUser, ProfileUpdate, User};

/// True when an error chain bottoms out in a unique-constraint violation.
/// Duplicate checks in the handlers race with concurrent writes; the
/// constraint is the backstop and callers map this back onto the form.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sea_orm::DbErr>()
        .and_then(sea_orm::DbErr::sql_err)
        .is_some_and(|e| matches!(e, sea_orm::SqlErr::UniqueConstraintViolation(_)))
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn message_repo(&self) -> repositories::message::MessageRepository {
        repositories::message::MessageRepository::new(self.conn.clone())
    }

    fn follow_repo(&self) -> repositories::follow::FollowRepository {
        repositories::follow::FollowRepository::new(self.conn.clone())
    }

    fn like_repo(&self) -> repositories::like::LikeRepository {
        repositories::like::LikeRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn create_user(&self, new: NewUser) -> Result<User> {
        self.user_repo().create(new).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_users_by_ids(&self, ids: &[i32]) -> Result<Vec<User>> {
        self.user_repo().get_by_ids(ids).await
    }

    pub async fn search_users(&self, query: Option<&str>) -> Result<Vec<User>> {
        self.user_repo().search(query).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn update_user_profile(&self, id: i32, update: ProfileUpdate) -> Result<()> {
        self.user_repo().update_profile(id, update).await
    }

    pub async fn delete_user(&self, id: i32) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    // ========== Warbles ==========

    pub async fn create_message(&self, user_id: i32, text: &str) -> Result<Warble> {
        self.message_repo().create(user_id, text).await
    }

    pub async fn get_message(&self, id: i32) -> Result<Option<Warble>> {
        self.message_repo().get(id).await
    }

    pub async fn get_messages_by_ids(&self, ids: &[i32]) -> Result<Vec<Warble>> {
        self.message_repo().get_by_ids(ids).await
    }

    pub async fn messages_for_user(&self, user_id: i32) -> Result<Vec<Warble>> {
        self.message_repo().for_user(user_id).await
    }

    pub async fn feed(&self, user_ids: &[i32], limit: u64) -> Result<Vec<Warble>> {
        self.message_repo().feed(user_ids, limit).await
    }

    pub async fn delete_message(&self, id: i32) -> Result<bool> {
        self.message_repo().delete(id).await
    }

    // ========== Follow edges ==========

    pub async fn follow(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        self.follow_repo().follow(follower_id, followed_id).await
    }

    pub async fn unfollow(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        self.follow_repo().unfollow(follower_id, followed_id).await
    }

    pub async fn is_following(&self, follower_id: i32, followed_id: i32) -> Result<bool> {
        self.follow_repo()
            .is_following(follower_id, followed_id)
            .await
    }

    pub async fn following_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        self.follow_repo().following_ids(user_id).await
    }

    pub async fn follower_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        self.follow_repo().follower_ids(user_id).await
    }

    // ========== Like edges ==========

    pub async fn like_message(&self, user_id: i32, message_id: i32) -> Result<bool> {
        self.like_repo().like(user_id, message_id).await
    }

    pub async fn unlike_message(&self, user_id: i32, message_id: i32) -> Result<bool> {
        self.like_repo().unlike(user_id, message_id).await
    }

    pub async fn has_liked(&self, user_id: i32, message_id: i32) -> Result<bool> {
        self.like_repo().has_liked(user_id, message_id).await
    }

    pub async fn liked_message_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        self.like_repo().liked_message_ids(user_id).await
    }
}
