mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use tower::ServiceExt;

use common::{
    body_string, get, location, post_form, post_warble, signup, spawn_app,
};

#[tokio::test]
async fn test_posted_warble_appears_on_profile_and_feed() {
    let app = spawn_app().await;
    let (cookie, user_id) = signup(&app, "alice").await;

    let response = post_form(
        &app,
        "/messages/new",
        Some(&cookie),
        "text=Spotted+a+kingfisher+today",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/users/{user_id}"));

    let home = get(&app, "/", Some(&cookie)).await;
    let html = body_string(home).await;
    assert!(html.contains("Spotted a kingfisher today"));
}

#[tokio::test]
async fn test_message_page_shows_delete_for_author() {
    let app = spawn_app().await;
    let (cookie, _) = signup(&app, "alice").await;
    let warble_id = post_warble(&app, &cookie, "my own warble").await;

    let page = get(&app, &format!("/messages/{warble_id}"), Some(&cookie)).await;
    assert_eq!(page.status(), StatusCode::OK);
    let html = body_string(page).await;
    assert!(html.contains("my own warble"));
    assert!(html.contains(&format!("/messages/{warble_id}/delete")));
}

#[tokio::test]
async fn test_blank_warble_is_rejected() {
    let app = spawn_app().await;
    let (cookie, _) = signup(&app, "alice").await;

    let response = post_form(&app, "/messages/new", Some(&cookie), "text=").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("Warble text is required"));
}

#[tokio::test]
async fn test_warble_length_limit() {
    let app = spawn_app().await;
    let (cookie, _) = signup(&app, "alice").await;

    let over = format!("text={}", "a".repeat(141));
    let response = post_form(&app, "/messages/new", Some(&cookie), &over).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("limited to 140 characters"));

    let exact = format!("text={}", "a".repeat(140));
    let response = post_form(&app, "/messages/new", Some(&cookie), &exact).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_only_the_author_can_delete_a_warble() {
    let app = spawn_app().await;
    let (alice, _) = signup(&app, "alice").await;
    let (bob, _) = signup(&app, "bob").await;
    let warble_id = post_warble(&app, &alice, "do not touch").await;

    let response = post_form(
        &app,
        &format!("/messages/{warble_id}/delete"),
        Some(&bob),
        "",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    // Still there.
    let page = get(&app, &format!("/messages/{warble_id}"), Some(&alice)).await;
    assert_eq!(page.status(), StatusCode::OK);

    let response = post_form(
        &app,
        &format!("/messages/{warble_id}/delete"),
        Some(&alice),
        "",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let page = get(&app, &format!("/messages/{warble_id}"), Some(&alice)).await;
    assert_eq!(page.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_message_is_not_found() {
    let app = spawn_app().await;
    let (cookie, _) = signup(&app, "alice").await;

    let page = get(&app, "/messages/999", Some(&cookie)).await;
    assert_eq!(page.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_like_toggles_on_and_off() {
    let app = spawn_app().await;
    let (alice, _) = signup(&app, "alice").await;
    let (bob, bob_id) = signup(&app, "bob").await;
    let warble_id = post_warble(&app, &alice, "likeable content").await;

    let response = post_form(&app, &format!("/messages/{warble_id}/like"), Some(&bob), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let likes = get(&app, &format!("/users/{bob_id}/likes"), Some(&bob)).await;
    let html = body_string(likes).await;
    assert!(html.contains("likeable content"));

    // Second toggle removes the like, not a second edge.
    post_form(&app, &format!("/messages/{warble_id}/like"), Some(&bob), "").await;

    let likes = get(&app, &format!("/users/{bob_id}/likes"), Some(&bob)).await;
    let html = body_string(likes).await;
    assert!(!html.contains("likeable content"));
    assert!(html.contains("No warbles yet."));
}

#[tokio::test]
async fn test_liking_own_warble_is_rejected() {
    let app = spawn_app().await;
    let (alice, alice_id) = signup(&app, "alice").await;
    let warble_id = post_warble(&app, &alice, "self promotion").await;

    let response = post_form(&app, &format!("/messages/{warble_id}/like"), Some(&alice), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let home = get(&app, "/", Some(&alice)).await;
    let html = body_string(home).await;
    assert!(html.contains("You cannot like your own warble."));

    let likes = get(&app, &format!("/users/{alice_id}/likes"), Some(&alice)).await;
    let html = body_string(likes).await;
    assert!(html.contains("No warbles yet."));
}

#[tokio::test]
async fn test_like_redirects_back_to_referring_page() {
    let app = spawn_app().await;
    let (alice, alice_id) = signup(&app, "alice").await;
    let (bob, _) = signup(&app, "bob").await;
    let warble_id = post_warble(&app, &alice, "referer test").await;

    let like_uri = format!("/messages/{warble_id}/like");
    let profile_uri = format!("/users/{alice_id}");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(&like_uri)
                .header(header::COOKIE, &bob)
                .header(header::REFERER, &profile_uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), profile_uri);

    // Browsers send absolute referers; same-origin ones are honored.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(&like_uri)
                .header(header::COOKIE, &bob)
                .header(header::HOST, "warbler.test")
                .header(header::REFERER, format!("http://warbler.test{profile_uri}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), profile_uri);

    // Off-site referers fall back to the home feed.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(&like_uri)
                .header(header::COOKIE, &bob)
                .header(header::HOST, "warbler.test")
                .header(header::REFERER, "https://elsewhere.example/users/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    // Protocol-relative referers are rejected too.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(&like_uri)
                .header(header::COOKIE, &bob)
                .header(header::HOST, "warbler.test")
                .header(header::REFERER, "//elsewhere.example/users/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}
