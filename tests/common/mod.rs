#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use warbler::Config;

/// Build a router backed by a fresh in-memory database. A single pooled
/// connection keeps the in-memory database alive across requests.
pub async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_url = "sqlite::memory:".to_string();
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.server.secret_key =
        "test-secret-key-test-secret-key-test-secret-key-0000".to_string();

    let state = warbler::web::create_app_state(config)
        .await
        .expect("Failed to create app state");
    warbler::web::router(state)
}

pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }

    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_form(
    app: &Router,
    uri: &str,
    cookie: Option<&str>,
    body: &str,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }

    app.clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

/// The session cookie pair from a response, ready for a `Cookie` header.
pub fn session_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("response is missing Set-Cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("response is missing Location")
        .to_str()
        .unwrap()
        .to_string()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Sign up a user (password "password123") and return the session cookie
/// plus the assigned user id, scraped from the nav profile link.
pub async fn signup(app: &Router, username: &str) -> (String, i32) {
    let body = format!("username={username}&email={username}%40example.com&password=password123");
    let response = post_form(app, "/signup", None, &body).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = session_cookie(&response);

    let home = get(app, "/", Some(&cookie)).await;
    assert_eq!(home.status(), StatusCode::OK);
    let html = body_string(home).await;
    let id = profile_link_id(&html, username);

    (cookie, id)
}

/// Extract the user id from a `<a href="/users/{id}">@{username}</a>` link.
pub fn profile_link_id(html: &str, username: &str) -> i32 {
    let needle = format!(">@{username}</a>");
    let end = html.find(&needle).expect("profile link not present");
    let prefix = &html[..end];
    let start = prefix.rfind("/users/").expect("profile link not present") + "/users/".len();

    prefix[start..]
        .trim_end_matches('"')
        .parse()
        .expect("user id in profile link")
}

/// Extract the first warble id (`id="warble-{id}"`) from a page. Lists are
/// newest-first, so on a profile page this is the latest warble.
pub fn first_warble_id(html: &str) -> i32 {
    let start = html.find("warble-").expect("no warble on page") + "warble-".len();

    html[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .expect("warble id")
}

/// Post a warble and return its id.
pub async fn post_warble(app: &Router, cookie: &str, text: &str) -> i32 {
    let body = format!("text={}", text.replace(' ', "+"));
    let response = post_form(app, "/messages/new", Some(cookie), &body).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let profile = location(&response);
    let page = get(app, &profile, Some(cookie)).await;
    first_warble_id(&body_string(page).await)
}
