//! Server-rendered pages. Presentation is deliberately minimal; every piece
//! of user-provided text is escaped before interpolation.

use std::borrow::Cow;
use std::fmt::Write;

use crate::db::User;

use super::flash::Flash;

/// A warble joined with its author and viewer-specific state.
#[derive(Debug, Clone)]
pub struct WarbleView {
    pub id: i32,
    pub text: String,
    pub created_at: String,
    pub author_id: i32,
    pub author_username: String,
    pub author_image: String,
    pub liked: bool,
    pub own: bool,
}

fn esc(s: &str) -> Cow<'_, str> {
    html_escape::encode_text(s)
}

fn esc_attr(s: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(s)
}

fn timestamp(raw: &str) -> String {
    // RFC 3339, keep the date + time part only
    raw.chars().take(19).map(|c| if c == 'T' { ' ' } else { c }).collect()
}

pub fn layout(title: &str, user: Option<&User>, flashes: &[Flash], body: &str) -> String {
    let mut nav = String::new();
    if let Some(u) = user {
        let _ = write!(
            nav,
            r#"<a href="/">Home</a> <a href="/users">Users</a> <a href="/messages/new">New Warble</a> <a href="/users/{id}">@{name}</a> <a href="/users/profile">Edit Profile</a> <form class="inline" method="post" action="/logout"><button>Log out</button></form>"#,
            id = u.id,
            name = esc(&u.username),
        );
    } else {
        nav.push_str(r#"<a href="/">Home</a> <a href="/signup">Sign up</a> <a href="/login">Log in</a>"#);
    }

    let mut flash_html = String::new();
    for f in flashes {
        let _ = write!(
            flash_html,
            r#"<div class="alert alert-{}">{}</div>"#,
            f.level.css_class(),
            esc(&f.message),
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} | Warbler</title>
</head>
<body>
<nav>{nav}</nav>
{flash_html}
<main>
{body}
</main>
</body>
</html>"#,
        title = esc(title),
    )
}

pub fn warble_list(warbles: &[WarbleView]) -> String {
    if warbles.is_empty() {
        return "<p>No warbles yet.</p>".to_string();
    }

    let mut out = String::from("<ul class=\"warbles\">\n");
    for w in warbles {
        let like_control = if w.own {
            String::new()
        } else {
            let label = if w.liked { "Unlike" } else { "Like" };
            format!(
                r#"<form class="inline" method="post" action="/messages/{}/like"><button>{label}</button></form>"#,
                w.id,
            )
        };
        let _ = write!(
            out,
            r#"<li id="warble-{id}">
<img src="{img}" alt="" width="32">
<a href="/users/{author_id}">@{author}</a>
<a href="/messages/{id}"><time>{time}</time></a>
<p>{text}</p>
{like_control}
</li>
"#,
            id = w.id,
            img = esc_attr(&w.author_image),
            author_id = w.author_id,
            author = esc(&w.author_username),
            time = timestamp(&w.created_at),
            text = esc(&w.text),
        );
    }
    out.push_str("</ul>");
    out
}

pub fn landing_page(flashes: &[Flash]) -> String {
    let body = r#"<h1>What's Happening?</h1>
<p>Sign up now to get your own personalized timeline!</p>
<p><a href="/signup">Sign up</a></p>"#;
    layout("Welcome", None, flashes, body)
}

pub fn home_page(user: &User, flashes: &[Flash], warbles: &[WarbleView]) -> String {
    let body = format!("<h1>Home</h1>\n{}", warble_list(warbles));
    layout("Home", Some(user), flashes, &body)
}

pub struct SignupFormValues<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub image_url: &'a str,
    pub header_image_url: &'a str,
}

impl Default for SignupFormValues<'_> {
    fn default() -> Self {
        Self {
            username: "",
            email: "",
            image_url: "",
            header_image_url: "",
        }
    }
}

fn form_error(error: Option<&str>) -> String {
    error.map_or_else(String::new, |e| {
        format!(r#"<p class="form-error">{}</p>"#, esc(e))
    })
}

pub fn signup_page(flashes: &[Flash], values: &SignupFormValues<'_>, error: Option<&str>) -> String {
    let body = format!(
        r#"<h1>Join Warbler today.</h1>
{error}
<form method="post" action="/signup">
<label>Username <input name="username" value="{username}" required></label>
<label>Email <input name="email" type="email" value="{email}" required></label>
<label>Password <input name="password" type="password" required></label>
<label>Image URL (optional) <input name="image_url" value="{image}"></label>
<label>Header Image URL (optional) <input name="header_image_url" value="{header}"></label>
<button>Sign me up!</button>
</form>"#,
        error = form_error(error),
        username = esc_attr(values.username),
        email = esc_attr(values.email),
        image = esc_attr(values.image_url),
        header = esc_attr(values.header_image_url),
    );
    layout("Sign up", None, flashes, &body)
}

pub fn login_page(flashes: &[Flash], username: &str, error: Option<&str>) -> String {
    let body = format!(
        r#"<h1>Welcome back.</h1>
{error}
<form method="post" action="/login">
<label>Username <input name="username" value="{username}" required></label>
<label>Password <input name="password" type="password" required></label>
<button>Log in</button>
</form>"#,
        error = form_error(error),
        username = esc_attr(username),
    );
    layout("Log in", None, flashes, &body)
}

pub fn users_index(user: &User, flashes: &[Flash], users: &[User], query: Option<&str>) -> String {
    let mut list = String::new();
    if users.is_empty() {
        list.push_str("<p>Sorry, no users found.</p>");
    } else {
        list.push_str("<ul class=\"users\">\n");
        for u in users {
            let _ = write!(
                list,
                r#"<li><img src="{img}" alt="" width="32"> <a href="/users/{id}">@{name}</a></li>
"#,
                img = esc_attr(&u.image_url),
                id = u.id,
                name = esc(&u.username),
            );
        }
        list.push_str("</ul>");
    }

    let body = format!(
        r#"<h1>Users</h1>
<form method="get" action="/users">
<input name="q" value="{q}" placeholder="Search Warbler">
<button>Search</button>
</form>
{list}"#,
        q = esc_attr(query.unwrap_or("")),
    );
    layout("Users", Some(user), flashes, &body)
}

pub struct ProfileStats {
    pub warbles: usize,
    pub following: usize,
    pub followers: usize,
    pub likes: usize,
}

pub fn user_profile(
    viewer: &User,
    flashes: &[Flash],
    profile: &User,
    stats: &ProfileStats,
    is_following: bool,
    warbles: &[WarbleView],
) -> String {
    let follow_control = if profile.id == viewer.id {
        String::new()
    } else if is_following {
        format!(
            r#"<form class="inline" method="post" action="/users/stop-following/{}"><button>Unfollow</button></form>"#,
            profile.id,
        )
    } else {
        format!(
            r#"<form class="inline" method="post" action="/users/follow/{}"><button>Follow</button></form>"#,
            profile.id,
        )
    };

    let bio = profile
        .bio
        .as_deref()
        .map_or_else(String::new, |b| format!("<p>{}</p>", esc(b)));
    let location = profile
        .location
        .as_deref()
        .map_or_else(String::new, |l| format!("<p>{}</p>", esc(l)));

    let body = format!(
        r#"<img src="{header}" alt="" class="header-image">
<h1><img src="{img}" alt="" width="48"> @{name}</h1>
{bio}{location}
<p>
<a href="/users/{id}">{warbles} Warbles</a> |
<a href="/users/{id}/following">{following} Following</a> |
<a href="/users/{id}/followers">{followers} Followers</a> |
<a href="/users/{id}/likes">{likes} Likes</a>
</p>
{follow_control}
{list}"#,
        header = esc_attr(&profile.header_image_url),
        img = esc_attr(&profile.image_url),
        name = esc(&profile.username),
        id = profile.id,
        warbles = stats.warbles,
        following = stats.following,
        followers = stats.followers,
        likes = stats.likes,
        list = warble_list(warbles),
    );
    layout(&profile.username, Some(viewer), flashes, &body)
}

pub fn follow_list(
    viewer: &User,
    flashes: &[Flash],
    profile: &User,
    title: &str,
    users: &[User],
) -> String {
    let mut list = String::new();
    if users.is_empty() {
        list.push_str("<p>Nobody here yet.</p>");
    } else {
        list.push_str("<ul class=\"users\">\n");
        for u in users {
            let _ = write!(
                list,
                r#"<li><img src="{img}" alt="" width="32"> <a href="/users/{id}">@{name}</a></li>
"#,
                img = esc_attr(&u.image_url),
                id = u.id,
                name = esc(&u.username),
            );
        }
        list.push_str("</ul>");
    }

    let body = format!(
        "<h1>@{name} &mdash; {title}</h1>\n{list}",
        name = esc(&profile.username),
        title = esc(title),
    );
    layout(title, Some(viewer), flashes, &body)
}

pub fn likes_page(
    viewer: &User,
    flashes: &[Flash],
    profile: &User,
    warbles: &[WarbleView],
) -> String {
    let body = format!(
        "<h1>@{} &mdash; Likes</h1>\n{}",
        esc(&profile.username),
        warble_list(warbles),
    );
    layout("Likes", Some(viewer), flashes, &body)
}

pub struct ProfileFormValues<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub image_url: &'a str,
    pub header_image_url: &'a str,
    pub bio: &'a str,
    pub location: &'a str,
}

pub fn edit_profile_page(
    viewer: &User,
    flashes: &[Flash],
    values: &ProfileFormValues<'_>,
    error: Option<&str>,
) -> String {
    let body = format!(
        r#"<h1>Edit Your Profile.</h1>
{error}
<form method="post" action="/users/profile">
<label>Username <input name="username" value="{username}" required></label>
<label>Email <input name="email" type="email" value="{email}" required></label>
<label>Image URL <input name="image_url" value="{image}"></label>
<label>Header Image URL <input name="header_image_url" value="{header}"></label>
<label>Bio <textarea name="bio">{bio}</textarea></label>
<label>Location <input name="location" value="{location}"></label>
<label>To confirm changes, enter your password <input name="password" type="password" required></label>
<button>Edit this user!</button>
</form>
<form method="post" action="/users/delete">
<button>Delete my account</button>
</form>"#,
        error = form_error(error),
        username = esc_attr(values.username),
        email = esc_attr(values.email),
        image = esc_attr(values.image_url),
        header = esc_attr(values.header_image_url),
        bio = esc(values.bio),
        location = esc_attr(values.location),
    );
    layout("Edit Profile", Some(viewer), flashes, &body)
}

pub fn compose_page(viewer: &User, flashes: &[Flash], text: &str, error: Option<&str>) -> String {
    let body = format!(
        r#"<h1>Add my message!</h1>
{error}
<form method="post" action="/messages/new">
<label>Warble <textarea name="text" maxlength="140" required>{text}</textarea></label>
<button>Add my message!</button>
</form>"#,
        error = form_error(error),
        text = esc(text),
    );
    layout("New Warble", Some(viewer), flashes, &body)
}

pub fn message_page(viewer: &User, flashes: &[Flash], warble: &WarbleView) -> String {
    let delete_control = if warble.own {
        format!(
            r#"<form class="inline" method="post" action="/messages/{}/delete"><button>Delete</button></form>"#,
            warble.id,
        )
    } else {
        String::new()
    };

    let body = format!(
        "{}\n{delete_control}",
        warble_list(std::slice::from_ref(warble)),
    );
    layout("Warble", Some(viewer), flashes, &body)
}

pub fn error_page(code: &str, message: &str) -> String {
    let body = format!("<h1>{}</h1>\n<p>{}</p>", esc(code), esc(message));
    layout(code, None, &[], &body)
}
