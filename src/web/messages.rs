use axum::{
    Form,
    extract::{Path, State},
    http::{HeaderMap, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tower_sessions::Session;

use crate::db::{MAX_WARBLE_LENGTH, Store, User, Warble};

use super::auth;
use super::flash::{self, FlashLevel};
use super::views::{self, WarbleView};
use super::{AppState, PageError};

/// Most recent warbles shown on the home feed.
const HOME_FEED_LIMIT: u64 = 100;

#[derive(Debug, Deserialize)]
pub struct MessageForm {
    pub text: String,
}

/// Join warbles with their authors and viewer-specific like state.
pub(super) async fn warble_views(
    store: &Store,
    warbles: Vec<Warble>,
    viewer: &User,
) -> Result<Vec<WarbleView>, PageError> {
    let author_ids: Vec<i32> = {
        let unique: HashSet<i32> = warbles.iter().map(|w| w.user_id).collect();
        unique.into_iter().collect()
    };

    let authors: HashMap<i32, User> = store
        .get_users_by_ids(&author_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let liked: HashSet<i32> = store
        .liked_message_ids(viewer.id)
        .await?
        .into_iter()
        .collect();

    let mut out = Vec::with_capacity(warbles.len());
    for w in warbles {
        let Some(author) = authors.get(&w.user_id) else {
            continue;
        };
        out.push(WarbleView {
            id: w.id,
            text: w.text,
            created_at: w.created_at,
            author_id: author.id,
            author_username: author.username.clone(),
            author_image: author.image_url.clone(),
            liked: liked.contains(&w.id),
            own: w.user_id == viewer.id,
        });
    }

    Ok(out)
}

/// Redirect target for like toggles: the referring page when it is
/// same-origin, otherwise the home feed.
fn back_url(headers: &HeaderMap) -> String {
    let referer = headers.get(header::REFERER).and_then(|v| v.to_str().ok());
    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());

    referer
        .and_then(|r| local_path(r, host))
        .unwrap_or_else(|| "/".to_string())
}

/// Accept a path-form referer, or an absolute one whose authority matches
/// the request's `Host` header. Protocol-relative values are rejected.
fn local_path(referer: &str, host: Option<&str>) -> Option<String> {
    if referer.starts_with('/') && !referer.starts_with("//") {
        return Some(referer.to_string());
    }

    let rest = referer
        .strip_prefix("http://")
        .or_else(|| referer.strip_prefix("https://"))?
        .strip_prefix(host?)?;

    if rest.is_empty() {
        Some("/".to_string())
    } else if rest.starts_with('/') {
        Some(rest.to_string())
    } else {
        None
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /
/// Authenticated users see the newest warbles from themselves and the
/// users they follow; anonymous visitors see the landing page.
pub async fn homepage(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, PageError> {
    let flashes = flash::take(&session).await;

    match auth::current_user(&state, &session).await? {
        Some(user) => {
            let mut author_ids = state.store.following_ids(user.id).await?;
            author_ids.push(user.id);

            let warbles = state.store.feed(&author_ids, HOME_FEED_LIMIT).await?;
            let warbles = warble_views(&state.store, warbles, &user).await?;

            Ok(Html(views::home_page(&user, &flashes, &warbles)).into_response())
        }
        None => Ok(Html(views::landing_page(&flashes)).into_response()),
    }
}

/// GET /messages/new
pub async fn compose_form(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, PageError> {
    let user = auth::require_user(&state, &session).await?;
    let flashes = flash::take(&session).await;

    Ok(Html(views::compose_page(&user, &flashes, "", None)).into_response())
}

/// POST /messages/new
/// Persist a new warble and redirect to the author's profile.
pub async fn create_message(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<MessageForm>,
) -> Result<Response, PageError> {
    let user = auth::require_user(&state, &session).await?;

    let text = form.text.trim();
    if text.is_empty() {
        return Ok(
            Html(views::compose_page(&user, &[], text, Some("Warble text is required")))
                .into_response(),
        );
    }
    if text.chars().count() > MAX_WARBLE_LENGTH {
        return Ok(Html(views::compose_page(
            &user,
            &[],
            text,
            Some("Warbles are limited to 140 characters"),
        ))
        .into_response());
    }

    state.store.create_message(user.id, text).await?;

    Ok(Redirect::to(&format!("/users/{}", user.id)).into_response())
}

/// GET /messages/{message_id}
pub async fn show_message(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(message_id): Path<i32>,
) -> Result<Response, PageError> {
    let user = auth::require_user(&state, &session).await?;
    let flashes = flash::take(&session).await;

    let warble = state
        .store
        .get_message(message_id)
        .await?
        .ok_or_else(|| PageError::not_found("Warble", message_id))?;

    let warbles = warble_views(&state.store, vec![warble], &user).await?;
    let warble = warbles
        .into_iter()
        .next()
        .ok_or_else(|| PageError::not_found("Warble", message_id))?;

    Ok(Html(views::message_page(&user, &flashes, &warble)).into_response())
}

/// POST /messages/{message_id}/delete
/// Only the author may delete a warble.
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(message_id): Path<i32>,
) -> Result<Response, PageError> {
    let user = auth::require_user(&state, &session).await?;

    let warble = state
        .store
        .get_message(message_id)
        .await?
        .ok_or_else(|| PageError::not_found("Warble", message_id))?;

    if warble.user_id != user.id {
        flash::push(&session, FlashLevel::Danger, "Access unauthorized.").await?;
        return Err(PageError::Unauthorized);
    }

    state.store.delete_message(message_id).await?;
    flash::push(&session, FlashLevel::Success, "Warble deleted.").await?;

    Ok(Redirect::to(&format!("/users/{}", user.id)).into_response())
}

/// POST /messages/{message_id}/like
/// Toggle a like edge. Liking one's own warble is rejected.
pub async fn toggle_like(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(message_id): Path<i32>,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    let user = auth::require_user(&state, &session).await?;
    let back = back_url(&headers);

    let warble = state
        .store
        .get_message(message_id)
        .await?
        .ok_or_else(|| PageError::not_found("Warble", message_id))?;

    if warble.user_id == user.id {
        flash::push(
            &session,
            FlashLevel::Danger,
            "You cannot like your own warble.",
        )
        .await?;
        return Ok(Redirect::to(&back).into_response());
    }

    if state.store.has_liked(user.id, message_id).await? {
        state.store.unlike_message(user.id, message_id).await?;
    } else {
        state.store.like_message(user.id, message_id).await?;
    }

    Ok(Redirect::to(&back).into_response())
}
