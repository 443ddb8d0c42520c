use axum::{
    Router,
    http::{HeaderValue, header},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::Key};

use crate::config::Config;
use crate::db::Store;

pub mod auth;
mod error;
pub mod flash;
mod messages;
mod users;
mod views;

pub use error::PageError;

pub struct AppState {
    pub config: Config,
    pub store: Store,
}

pub async fn create_app_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_url,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    Ok(Arc::new(AppState { config, store }))
}

/// Build the application router. Sessions are cookie-based, signed with
/// the configured secret key, and backed by an in-memory store.
pub fn router(state: Arc<AppState>) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_signed(Key::derive_from(state.config.server.secret_key.as_bytes()))
        .with_secure(false)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            state.config.server.session_ttl_minutes,
        )));

    let static_path = state.config.server.static_path.clone();

    Router::new()
        .route("/", get(messages::homepage))
        .route("/signup", get(auth::signup_form).post(auth::signup))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/users", get(users::list_users))
        .route(
            "/users/profile",
            get(users::edit_profile_form).post(users::edit_profile),
        )
        .route("/users/delete", post(users::delete_user))
        .route("/users/follow/{user_id}", post(users::start_following))
        .route(
            "/users/stop-following/{user_id}",
            post(users::stop_following),
        )
        .route("/users/{user_id}", get(users::show_user))
        .route("/users/{user_id}/following", get(users::show_following))
        .route("/users/{user_id}/followers", get(users::show_followers))
        .route("/users/{user_id}/likes", get(users::show_likes))
        .route(
            "/messages/new",
            get(messages::compose_form).post(messages::create_message),
        )
        .route("/messages/{message_id}", get(messages::show_message))
        .route(
            "/messages/{message_id}/delete",
            post(messages::delete_message),
        )
        .route("/messages/{message_id}/like", post(messages::toggle_like))
        .layer(session_layer)
        .nest_service("/static", ServeDir::new(static_path))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
