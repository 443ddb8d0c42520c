use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use crate::db::{self, NewUser, User};

use super::flash::{self, FlashLevel};
use super::views::{self, SignupFormValues};
use super::{AppState, PageError};

/// Session key holding the authenticated user's id.
const SESSION_USER_KEY: &str = "user_id";

// ============================================================================
// Session helpers
// ============================================================================

pub async fn current_user(
    state: &AppState,
    session: &Session,
) -> Result<Option<User>, PageError> {
    let Some(user_id) = session.get::<i32>(SESSION_USER_KEY).await? else {
        return Ok(None);
    };

    Ok(state.store.get_user(user_id).await?)
}

/// Resolve the authenticated user, or flash "Access unauthorized." and
/// bail with a redirect.
pub async fn require_user(state: &AppState, session: &Session) -> Result<User, PageError> {
    match current_user(state, session).await? {
        Some(user) => Ok(user),
        None => {
            flash::push(session, FlashLevel::Danger, "Access unauthorized.").await?;
            Err(PageError::Unauthorized)
        }
    }
}

async fn start_session(session: &Session, user: &User) -> Result<(), PageError> {
    session.insert(SESSION_USER_KEY, user.id).await?;
    Ok(())
}

async fn end_session(session: &Session) -> Result<(), PageError> {
    session.remove::<i32>(SESSION_USER_KEY).await?;
    Ok(())
}

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub header_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /signup
pub async fn signup_form(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, PageError> {
    if current_user(&state, &session).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let flashes = flash::take(&session).await;
    Ok(Html(views::signup_page(&flashes, &SignupFormValues::default(), None)).into_response())
}

/// POST /signup
/// Create a new user, start a session, redirect to the home feed.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Result<Response, PageError> {
    if current_user(&state, &session).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let values = SignupFormValues {
        username: &form.username,
        email: &form.email,
        image_url: form.image_url.as_deref().unwrap_or(""),
        header_image_url: form.header_image_url.as_deref().unwrap_or(""),
    };

    let rerender = |error: &str| {
        Html(views::signup_page(&[], &values, Some(error))).into_response()
    };

    if form.username.trim().is_empty() {
        return Ok(rerender("Username is required"));
    }
    if form.email.trim().is_empty() {
        return Ok(rerender("Email is required"));
    }
    if form.password.len() < 6 {
        return Ok(rerender("Password must be at least 6 characters"));
    }

    if state
        .store
        .get_user_by_username(&form.username)
        .await?
        .is_some()
    {
        return Ok(rerender("Username already taken"));
    }
    if state.store.get_user_by_email(&form.email).await?.is_some() {
        return Ok(rerender("Email already taken"));
    }

    let created = state
        .store
        .create_user(NewUser {
            username: form.username.clone(),
            email: form.email.clone(),
            password: form.password.clone(),
            image_url: form.image_url.clone(),
            header_image_url: form.header_image_url.clone(),
        })
        .await;

    let user = match created {
        Ok(user) => user,
        Err(err) if db::is_unique_violation(&err) => {
            return Ok(rerender("Username or email already taken"));
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("New user signed up: {}", user.username);

    start_session(&session, &user).await?;
    flash::push(
        &session,
        FlashLevel::Success,
        format!("Hello, {}!", user.username),
    )
    .await?;

    Ok(Redirect::to("/").into_response())
}

/// GET /login
pub async fn login_form(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, PageError> {
    if current_user(&state, &session).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let flashes = flash::take(&session).await;
    Ok(Html(views::login_page(&flashes, "", None)).into_response())
}

/// POST /login
/// Validate credentials and store the user id in the session.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    if current_user(&state, &session).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let is_valid = state
        .store
        .verify_user_password(&form.username, &form.password)
        .await?;

    if !is_valid {
        return Ok(
            Html(views::login_page(&[], &form.username, Some("Invalid credentials.")))
                .into_response(),
        );
    }

    let user = state
        .store
        .get_user_by_username(&form.username)
        .await?
        .ok_or(PageError::Unauthorized)?;

    start_session(&session, &user).await?;
    flash::push(
        &session,
        FlashLevel::Success,
        format!("Hello, {}!", user.username),
    )
    .await?;

    Ok(Redirect::to("/").into_response())
}

/// POST /logout
/// Clear the session and redirect to the login page.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, PageError> {
    if current_user(&state, &session).await?.is_none() {
        flash::push(&session, FlashLevel::Danger, "Access unauthorized.").await?;
        return Ok(Redirect::to("/").into_response());
    }

    end_session(&session).await?;
    flash::push(&session, FlashLevel::Success, "You have been logged out.").await?;

    Ok(Redirect::to("/login").into_response())
}
