use axum::{
    Form,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use crate::db::{self, ProfileUpdate, User};

use super::auth;
use super::flash::{self, FlashLevel};
use super::messages::warble_views;
use super::views::{self, ProfileFormValues, ProfileStats};
use super::{AppState, PageError};

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub header_image_url: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub location: String,
    pub password: String,
}

async fn load_user(state: &AppState, user_id: i32) -> Result<User, PageError> {
    state
        .store
        .get_user(user_id)
        .await?
        .ok_or_else(|| PageError::not_found("User", user_id))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /users?q=
/// User directory with optional username substring search.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<UserSearchQuery>,
) -> Result<Response, PageError> {
    let user = auth::require_user(&state, &session).await?;
    let flashes = flash::take(&session).await;

    let users = state.store.search_users(query.q.as_deref()).await?;

    Ok(Html(views::users_index(&user, &flashes, &users, query.q.as_deref())).into_response())
}

/// GET /users/{user_id}
/// Profile page with the user's warbles, newest first.
pub async fn show_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(user_id): Path<i32>,
) -> Result<Response, PageError> {
    let viewer = auth::require_user(&state, &session).await?;
    let flashes = flash::take(&session).await;

    let profile = load_user(&state, user_id).await?;

    let warbles = state.store.messages_for_user(user_id).await?;
    let stats = ProfileStats {
        warbles: warbles.len(),
        following: state.store.following_ids(user_id).await?.len(),
        followers: state.store.follower_ids(user_id).await?.len(),
        likes: state.store.liked_message_ids(user_id).await?.len(),
    };
    let is_following = state.store.is_following(viewer.id, user_id).await?;

    let warbles = warble_views(&state.store, warbles, &viewer).await?;

    Ok(Html(views::user_profile(
        &viewer,
        &flashes,
        &profile,
        &stats,
        is_following,
        &warbles,
    ))
    .into_response())
}

/// GET /users/{user_id}/following
pub async fn show_following(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(user_id): Path<i32>,
) -> Result<Response, PageError> {
    let viewer = auth::require_user(&state, &session).await?;
    let flashes = flash::take(&session).await;

    let profile = load_user(&state, user_id).await?;
    let ids = state.store.following_ids(user_id).await?;
    let users = state.store.get_users_by_ids(&ids).await?;

    Ok(Html(views::follow_list(&viewer, &flashes, &profile, "Following", &users)).into_response())
}

/// GET /users/{user_id}/followers
pub async fn show_followers(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(user_id): Path<i32>,
) -> Result<Response, PageError> {
    let viewer = auth::require_user(&state, &session).await?;
    let flashes = flash::take(&session).await;

    let profile = load_user(&state, user_id).await?;
    let ids = state.store.follower_ids(user_id).await?;
    let users = state.store.get_users_by_ids(&ids).await?;

    Ok(Html(views::follow_list(&viewer, &flashes, &profile, "Followers", &users)).into_response())
}

/// GET /users/{user_id}/likes
/// Warbles this user has liked.
pub async fn show_likes(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(user_id): Path<i32>,
) -> Result<Response, PageError> {
    let viewer = auth::require_user(&state, &session).await?;
    let flashes = flash::take(&session).await;

    let profile = load_user(&state, user_id).await?;
    let ids = state.store.liked_message_ids(user_id).await?;
    let warbles = state.store.get_messages_by_ids(&ids).await?;
    let warbles = warble_views(&state.store, warbles, &viewer).await?;

    Ok(Html(views::likes_page(&viewer, &flashes, &profile, &warbles)).into_response())
}

/// POST /users/follow/{user_id}
/// Create a follow edge; a no-op if it already exists.
pub async fn start_following(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(user_id): Path<i32>,
) -> Result<Response, PageError> {
    let user = auth::require_user(&state, &session).await?;

    if user_id == user.id {
        flash::push(&session, FlashLevel::Danger, "You cannot follow yourself.").await?;
        return Ok(Redirect::to(&format!("/users/{}/following", user.id)).into_response());
    }

    load_user(&state, user_id).await?;
    state.store.follow(user.id, user_id).await?;

    Ok(Redirect::to(&format!("/users/{}/following", user.id)).into_response())
}

/// POST /users/stop-following/{user_id}
/// Remove a follow edge; a no-op if none exists.
pub async fn stop_following(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(user_id): Path<i32>,
) -> Result<Response, PageError> {
    let user = auth::require_user(&state, &session).await?;

    load_user(&state, user_id).await?;
    state.store.unfollow(user.id, user_id).await?;

    Ok(Redirect::to(&format!("/users/{}/following", user.id)).into_response())
}

/// GET /users/profile
pub async fn edit_profile_form(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, PageError> {
    let user = auth::require_user(&state, &session).await?;
    let flashes = flash::take(&session).await;

    let values = ProfileFormValues {
        username: &user.username,
        email: &user.email,
        image_url: &user.image_url,
        header_image_url: &user.header_image_url,
        bio: user.bio.as_deref().unwrap_or(""),
        location: user.location.as_deref().unwrap_or(""),
    };

    Ok(Html(views::edit_profile_page(&user, &flashes, &values, None)).into_response())
}

/// POST /users/profile
/// Persist display-field changes after confirming the current password.
pub async fn edit_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> Result<Response, PageError> {
    let user = auth::require_user(&state, &session).await?;

    let values = ProfileFormValues {
        username: &form.username,
        email: &form.email,
        image_url: &form.image_url,
        header_image_url: &form.header_image_url,
        bio: &form.bio,
        location: &form.location,
    };

    let rerender = |error: &str| {
        Html(views::edit_profile_page(&user, &[], &values, Some(error))).into_response()
    };

    if form.username.trim().is_empty() {
        return Ok(rerender("Username is required"));
    }
    if form.email.trim().is_empty() {
        return Ok(rerender("Email is required"));
    }

    let is_valid = state
        .store
        .verify_user_password(&user.username, &form.password)
        .await?;
    if !is_valid {
        return Ok(rerender("Wrong password, please try again."));
    }

    if let Some(other) = state.store.get_user_by_username(&form.username).await?
        && other.id != user.id
    {
        return Ok(rerender("Username already taken"));
    }
    if let Some(other) = state.store.get_user_by_email(&form.email).await?
        && other.id != user.id
    {
        return Ok(rerender("Email already taken"));
    }

    let updated = state
        .store
        .update_user_profile(
            user.id,
            ProfileUpdate {
                username: form.username.clone(),
                email: form.email.clone(),
                image_url: if form.image_url.is_empty() {
                    user.image_url.clone()
                } else {
                    form.image_url.clone()
                },
                header_image_url: if form.header_image_url.is_empty() {
                    user.header_image_url.clone()
                } else {
                    form.header_image_url.clone()
                },
                bio: Some(form.bio.clone()),
                location: Some(form.location.clone()),
            },
        )
        .await;

    if let Err(err) = updated {
        if db::is_unique_violation(&err) {
            return Ok(rerender("Username or email already taken"));
        }
        return Err(err.into());
    }

    flash::push(&session, FlashLevel::Success, "Profile updated.").await?;

    Ok(Redirect::to(&format!("/users/{}", user.id)).into_response())
}

/// POST /users/delete
/// Delete the account; warbles, follow edges, and like edges cascade.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, PageError> {
    let user = auth::require_user(&state, &session).await?;

    session.flush().await?;
    state.store.delete_user(user.id).await?;

    tracing::info!("User account deleted: {}", user.username);

    Ok(Redirect::to("/signup").into_response())
}
