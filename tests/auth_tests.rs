mod common;

use axum::http::StatusCode;

use common::{body_string, get, location, post_form, session_cookie, signup, spawn_app};

#[tokio::test]
async fn test_anonymous_homepage_shows_landing_page() {
    let app = spawn_app().await;

    let response = get(&app, "/", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("Sign up now"));
}

#[tokio::test]
async fn test_protected_pages_redirect_anonymous_visitors() {
    let app = spawn_app().await;

    for uri in ["/users", "/users/1", "/messages/new", "/users/profile"] {
        let response = get(&app, uri, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "GET {uri}");
        assert_eq!(location(&response), "/");
    }
}

#[tokio::test]
async fn test_signup_starts_a_session() {
    let app = spawn_app().await;

    let response = post_form(
        &app,
        "/signup",
        None,
        "username=alice&email=alice%40example.com&password=password123",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    let cookie = session_cookie(&response);

    let home = get(&app, "/", Some(&cookie)).await;
    assert_eq!(home.status(), StatusCode::OK);
    let html = body_string(home).await;
    assert!(html.contains("Hello, alice!"));
    assert!(html.contains("@alice"));
}

#[tokio::test]
async fn test_signup_rejects_duplicate_username() {
    let app = spawn_app().await;
    signup(&app, "alice").await;

    let response = post_form(
        &app,
        "/signup",
        None,
        "username=alice&email=other%40example.com&password=password123",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("Username already taken"));
}

#[tokio::test]
async fn test_signup_rejects_duplicate_email() {
    let app = spawn_app().await;
    signup(&app, "alice").await;

    let response = post_form(
        &app,
        "/signup",
        None,
        "username=other&email=alice%40example.com&password=password123",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("Email already taken"));
}

#[tokio::test]
async fn test_signup_rejects_short_password() {
    let app = spawn_app().await;

    let response = post_form(
        &app,
        "/signup",
        None,
        "username=alice&email=alice%40example.com&password=abc",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("Password must be at least 6 characters"));
}

#[tokio::test]
async fn test_login_with_correct_password() {
    let app = spawn_app().await;
    signup(&app, "alice").await;

    let response = post_form(&app, "/login", None, "username=alice&password=password123").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    let cookie = session_cookie(&response);

    let users = get(&app, "/users", Some(&cookie)).await;
    assert_eq!(users.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = spawn_app().await;
    signup(&app, "alice").await;

    let response = post_form(&app, "/login", None, "username=alice&password=wrongpass").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("Invalid credentials."));
}

#[tokio::test]
async fn test_login_with_unknown_username() {
    let app = spawn_app().await;

    let response = post_form(&app, "/login", None, "username=nobody&password=password123").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("Invalid credentials."));
}

#[tokio::test]
async fn test_logout_clears_the_session() {
    let app = spawn_app().await;
    let (cookie, _) = signup(&app, "alice").await;

    let response = post_form(&app, "/logout", Some(&cookie), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let login = get(&app, "/login", Some(&cookie)).await;
    let html = body_string(login).await;
    assert!(html.contains("You have been logged out."));

    let response = get(&app, "/users", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}
