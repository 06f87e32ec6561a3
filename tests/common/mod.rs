//! In-process fake of the GGame API for integration tests.
//!
//! State lives behind a mutex so tests can seed it and inspect the calls the
//! client made.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{Duration, TimeZone, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use ggame::api::ApiClient;
use ggame::models::{Category, Comment, GuestbookEntry, Notification, NotificationKind, Post, User};
use ggame::session::SessionContext;

pub const TOKEN: &str = "test-token";
pub const PASSWORD: &str = "secret1";

#[derive(Default)]
pub struct Backend {
    pub me: Option<User>,
    pub users: Vec<User>,
    pub posts: Vec<Post>,
    pub comments: HashMap<String, Vec<Comment>>,
    pub guestbook: HashMap<String, Vec<GuestbookEntry>>,
    pub notifications: Vec<Notification>,
    /// Every request as "METHOD /path"
    pub calls: Vec<String>,
    /// Answer every authenticated request with 401
    pub reject_tokens: bool,
    /// Make the post listing fail with 500
    pub broken_posts: bool,
    /// Post ids whose comment listing fails with 500
    pub broken_comments: Vec<String>,
    /// (file name, content type, byte count) per upload
    pub uploads: Vec<(String, String, usize)>,
    next_id: u64,
}

impl Backend {
    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.iter().filter(|c| c.as_str() == call).count()
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.calls.iter().filter(|c| c.starts_with(prefix)).count()
    }
}

pub type Shared = Arc<Mutex<Backend>>;

pub struct FakeServer {
    pub base_url: String,
    pub state: Shared,
}

impl FakeServer {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(Backend::default()));
        {
            let mut backend = state.lock().unwrap();
            let me = user("u1", "kim", "Kim");
            backend.users = vec![me.clone(), user("u2", "lee", "Lee"), user("u3", "park", "Park")];
            backend.me = Some(me);
        }

        let api = Router::new()
            .route("/users/login", post(login))
            .route("/users/signup", post(signup))
            .route("/users/me", get(me).put(update_me))
            .route("/users", get(list_users))
            .route("/posts", get(list_posts).post(create_post))
            .route("/posts/meta/count", get(count_posts))
            .route("/posts/{id}", put(update_post).delete(delete_post))
            .route("/posts/{id}/like", post(like).delete(unlike))
            .route("/posts/{id}/comments", get(list_comments).post(create_comment))
            .route(
                "/posts/{id}/comments/{cid}",
                put(update_comment).delete(delete_comment),
            )
            .route("/notifications", get(list_notifications).delete(clear_notifications))
            .route("/notifications/unread/count", get(unread_count))
            .route(
                "/notifications/{id}",
                put(mark_read).delete(delete_notification),
            )
            .route("/profiles/{id}", get(profile))
            .route("/profiles/{id}/profile-image", put(profile_image))
            .route("/profiles/{id}/header-image", put(header_image))
            .route("/profiles/{id}/display-name-color", put(name_color))
            .route("/profiles/{id}/posts", get(profile_posts))
            .route("/profiles/{id}/guestbook", get(guestbook).post(write_guestbook))
            .route(
                "/profiles/{id}/guestbook/{eid}",
                put(edit_guestbook).delete(delete_guestbook),
            )
            .route("/uploads/image", post(upload));

        let app = Router::new().nest("/api", api).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        FakeServer {
            base_url: format!("http://{}/api", addr),
            state,
        }
    }

    pub fn backend(&self) -> MutexGuard<'_, Backend> {
        self.state.lock().unwrap()
    }

    /// A client with no session.
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.base_url, SessionContext::in_memory()).unwrap()
    }

    /// A client already signed in as u1.
    pub fn signed_in_client(&self) -> ApiClient {
        let session = SessionContext::in_memory();
        let me = self.backend().me.clone().unwrap();
        session.establish(TOKEN.to_string(), me).unwrap();
        ApiClient::new(&self.base_url, session).unwrap()
    }

    pub fn seed_posts(&self, count: usize, category: Category) -> Vec<String> {
        let mut backend = self.backend();
        let mut ids = Vec::new();
        for _ in 0..count {
            let id = backend.id("p");
            let mut p = sample_post(&id, "u2", category);
            p.created_at = p.created_at + Duration::minutes(backend.next_id as i64);
            ids.push(id.clone());
            backend.posts.insert(0, p);
        }
        ids
    }

    pub fn seed_comment(&self, post_id: &str, id: &str, parent: Option<&str>, author: &str) {
        let mut backend = self.backend();
        let c = comment(post_id, id, parent, author);
        backend.comments.entry(post_id.to_string()).or_default().push(c);
    }
}

// --- Fixtures ---

pub fn user(id: &str, username: &str, display_name: &str) -> User {
    User {
        id: id.into(),
        username: username.into(),
        display_name: display_name.into(),
        email: Some(format!("{}@example.com", username)),
        bio: None,
        profile_image: None,
        header_image: None,
        display_name_color: None,
        created_at: Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
    }
}

pub fn sample_post(id: &str, author: &str, category: Category) -> Post {
    Post {
        id: id.into(),
        author_id: author.into(),
        author_username: author.into(),
        author_display_name: author.to_uppercase(),
        author_display_name_color: None,
        author_profile_image: None,
        content: format!("post {}", id),
        image_url: None,
        category,
        likes_count: 0,
        liked_by: Vec::new(),
        created_at: Utc.with_ymd_and_hms(2025, 1, 15, 3, 0, 0).unwrap(),
        updated_at: None,
    }
}

pub fn comment(post_id: &str, id: &str, parent: Option<&str>, author: &str) -> Comment {
    Comment {
        id: id.into(),
        post_id: post_id.into(),
        parent_id: parent.map(str::to_string),
        author_id: author.into(),
        author_username: author.into(),
        author_display_name: author.to_uppercase(),
        author_display_name_color: None,
        author_profile_image: None,
        content: format!("comment {}", id),
        image_url: None,
        is_deleted: false,
        created_at: Utc.with_ymd_and_hms(2025, 1, 15, 4, 0, 0).unwrap(),
        updated_at: None,
    }
}

pub fn notification(id: &str, kind: NotificationKind, post_id: Option<&str>) -> Notification {
    Notification {
        id: id.into(),
        kind,
        actor_id: "u2".into(),
        actor_username: "lee".into(),
        actor_display_name: "Lee".into(),
        message: format!("notification {}", id),
        post_id: post_id.map(str::to_string),
        comment_id: None,
        is_read: false,
        created_at: Utc.with_ymd_and_hms(2025, 1, 15, 5, 0, 0).unwrap(),
    }
}

// --- Handlers ---

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn record(state: &Shared, call: String) -> MutexGuard<'_, Backend> {
    let mut backend = state.lock().unwrap();
    backend.calls.push(call);
    backend
}

/// Record the call and check the bearer token.
fn authorize<'a>(
    state: &'a Shared,
    headers: &HeaderMap,
    call: String,
) -> Result<MutexGuard<'a, Backend>, Response> {
    let backend = record(state, call);
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false);
    if !bearer || backend.reject_tokens {
        return Err(detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"));
    }
    Ok(backend)
}

fn auth_response(user: &User) -> Response {
    Json(json!({
        "access_token": TOKEN,
        "token_type": "bearer",
        "user": user,
    }))
    .into_response()
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let backend = record(&state, "POST /users/login".into());
    if body["password"] != PASSWORD {
        return detail(StatusCode::UNAUTHORIZED, "Incorrect email or password");
    }
    match backend.me.as_ref() {
        Some(me) => auth_response(me),
        None => detail(StatusCode::NOT_FOUND, "User not found"),
    }
}

async fn signup(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut backend = record(&state, "POST /users/signup".into());
    let username = body["username"].as_str().unwrap_or_default().to_string();
    if backend.users.iter().any(|u| u.username == username) {
        return detail(StatusCode::BAD_REQUEST, "Username already registered");
    }
    let id = backend.id("u");
    let new_user = user(&id, &username, body["display_name"].as_str().unwrap_or_default());
    backend.users.push(new_user.clone());
    backend.me = Some(new_user.clone());
    auth_response(&new_user)
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    match authorize(&state, &headers, "GET /users/me".into()) {
        Ok(backend) => Json(backend.me.clone()).into_response(),
        Err(resp) => resp,
    }
}

async fn update_me(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut backend = match authorize(&state, &headers, "PUT /users/me".into()) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let Some(mut me) = backend.me.clone() else {
        return detail(StatusCode::NOT_FOUND, "User not found");
    };
    me.display_name = body["display_name"].as_str().unwrap_or_default().to_string();
    me.username = body["username"].as_str().unwrap_or_default().to_string();
    me.bio = body["bio"].as_str().map(str::to_string);
    for u in backend.users.iter_mut().filter(|u| u.id == me.id) {
        *u = me.clone();
    }
    backend.me = Some(me.clone());
    Json(me).into_response()
}

#[derive(Deserialize)]
struct Limit {
    limit: Option<usize>,
}

async fn list_users(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(q): Query<Limit>,
) -> Response {
    match authorize(&state, &headers, "GET /users".into()) {
        Ok(backend) => {
            let limit = q.limit.unwrap_or(50);
            Json(backend.users.iter().take(limit).cloned().collect::<Vec<_>>()).into_response()
        }
        Err(resp) => resp,
    }
}

#[derive(Deserialize)]
struct ListQuery {
    page: usize,
    limit: usize,
    category: Option<String>,
}

async fn list_posts(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(q): Query<ListQuery>,
) -> Response {
    let call = format!("GET /posts?page={}", q.page);
    let backend = match authorize(&state, &headers, call) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    if backend.broken_posts {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "Database error");
    }
    let filtered: Vec<Post> = backend
        .posts
        .iter()
        .filter(|p| match &q.category {
            Some(c) => p.category.wire_name() == c,
            None => true,
        })
        .skip((q.page.max(1) - 1) * q.limit)
        .take(q.limit)
        .cloned()
        .collect();
    Json(filtered).into_response()
}

async fn count_posts(State(state): State<Shared>, headers: HeaderMap) -> Response {
    match authorize(&state, &headers, "GET /posts/meta/count".into()) {
        Ok(backend) => Json(json!({ "total": backend.posts.len() })).into_response(),
        Err(resp) => resp,
    }
}

async fn create_post(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut backend = match authorize(&state, &headers, "POST /posts".into()) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let id = backend.id("p");
    let category: Category = serde_json::from_value(body["category"].clone()).unwrap_or_default();
    let mut p = sample_post(&id, "u1", category);
    p.content = body["content"].as_str().unwrap_or_default().to_string();
    p.image_url = body["image_url"].as_str().map(str::to_string);
    backend.posts.insert(0, p.clone());
    Json(p).into_response()
}

async fn update_post(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut backend = match authorize(&state, &headers, format!("PUT /posts/{}", id)) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    match backend.posts.iter_mut().find(|p| p.id == id) {
        Some(p) => {
            if let Some(content) = body["content"].as_str() {
                p.content = content.to_string();
            }
            p.updated_at = Some(Utc::now());
            Json(p.clone()).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "Post not found"),
    }
}

async fn delete_post(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut backend = match authorize(&state, &headers, format!("DELETE /posts/{}", id)) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    backend.posts.retain(|p| p.id != id);
    backend.comments.remove(&id);
    Json(json!({ "message": "Post deleted" })).into_response()
}

fn set_like(state: &Shared, headers: &HeaderMap, id: &str, liked: bool) -> Response {
    let method = if liked { "POST" } else { "DELETE" };
    let mut backend = match authorize(state, headers, format!("{} /posts/{}/like", method, id)) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let me = backend.me.as_ref().map(|u| u.id.clone()).unwrap_or_default();
    match backend.posts.iter_mut().find(|p| p.id == id) {
        Some(p) => {
            p.liked_by.retain(|u| u != &me);
            if liked {
                p.liked_by.push(me);
            }
            p.likes_count = p.liked_by.len() as u32;
            Json(p.clone()).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "Post not found"),
    }
}

async fn like(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    set_like(&state, &headers, &id, true)
}

async fn unlike(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    set_like(&state, &headers, &id, false)
}

async fn list_comments(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let backend = match authorize(&state, &headers, format!("GET /posts/{}/comments", id)) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    if backend.broken_comments.contains(&id) {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "Database error");
    }
    Json(backend.comments.get(&id).cloned().unwrap_or_default()).into_response()
}

async fn create_comment(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut backend = match authorize(&state, &headers, format!("POST /posts/{}/comments", id)) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let cid = backend.id("c");
    let mut c = comment(&id, &cid, body["parent_id"].as_str(), "u1");
    c.content = body["content"].as_str().unwrap_or_default().to_string();
    c.image_url = body["image_url"].as_str().map(str::to_string);
    backend.comments.entry(id).or_default().push(c.clone());
    Json(c).into_response()
}

async fn update_comment(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((id, cid)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let call = format!("PUT /posts/{}/comments/{}", id, cid);
    let mut backend = match authorize(&state, &headers, call) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let found = backend
        .comments
        .get_mut(&id)
        .and_then(|list| list.iter_mut().find(|c| c.id == cid));
    match found {
        Some(c) => {
            c.content = body["content"].as_str().unwrap_or_default().to_string();
            c.updated_at = Some(Utc::now());
            Json(c.clone()).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "Comment not found"),
    }
}

/// Soft delete when the comment has replies, hard delete otherwise.
async fn delete_comment(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((id, cid)): Path<(String, String)>,
) -> Response {
    let call = format!("DELETE /posts/{}/comments/{}", id, cid);
    let mut backend = match authorize(&state, &headers, call) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let Some(list) = backend.comments.get_mut(&id) else {
        return detail(StatusCode::NOT_FOUND, "Comment not found");
    };
    let has_replies = list.iter().any(|c| c.parent_id.as_deref() == Some(cid.as_str()));
    if has_replies {
        for c in list.iter_mut().filter(|c| c.id == cid) {
            c.is_deleted = true;
            c.content = String::new();
        }
    } else {
        list.retain(|c| c.id != cid);
    }
    Json(json!({ "message": "Comment deleted" })).into_response()
}

async fn list_notifications(State(state): State<Shared>, headers: HeaderMap) -> Response {
    match authorize(&state, &headers, "GET /notifications".into()) {
        Ok(backend) => Json(backend.notifications.clone()).into_response(),
        Err(resp) => resp,
    }
}

async fn unread_count(State(state): State<Shared>, headers: HeaderMap) -> Response {
    match authorize(&state, &headers, "GET /notifications/unread/count".into()) {
        Ok(backend) => {
            let unread = backend.notifications.iter().filter(|n| !n.is_read).count();
            Json(json!({ "unread_count": unread })).into_response()
        }
        Err(resp) => resp,
    }
}

async fn mark_read(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut backend = match authorize(&state, &headers, format!("PUT /notifications/{}", id)) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    match backend.notifications.iter_mut().find(|n| n.id == id) {
        Some(n) => {
            n.is_read = body["is_read"].as_bool().unwrap_or(true);
            Json(n.clone()).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "Notification not found"),
    }
}

async fn delete_notification(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut backend = match authorize(&state, &headers, format!("DELETE /notifications/{}", id)) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    backend.notifications.retain(|n| n.id != id);
    Json(json!({ "message": "Notification deleted" })).into_response()
}

async fn clear_notifications(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut backend = match authorize(&state, &headers, "DELETE /notifications".into()) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    backend.notifications.clear();
    Json(json!({ "message": "All notifications deleted" })).into_response()
}

async fn profile(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let backend = match authorize(&state, &headers, format!("GET /profiles/{}", id)) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    match backend.users.iter().find(|u| u.id == id) {
        Some(u) => Json(u.clone()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "User not found"),
    }
}

#[derive(Deserialize)]
struct ImageQuery {
    image_url: String,
}

fn update_user(
    state: &Shared,
    headers: &HeaderMap,
    call: String,
    id: &str,
    apply: impl FnOnce(&mut User),
) -> Response {
    let mut backend = match authorize(state, headers, call) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let updated = match backend.users.iter_mut().find(|u| u.id == id) {
        Some(u) => {
            apply(u);
            u.clone()
        }
        None => return detail(StatusCode::NOT_FOUND, "User not found"),
    };
    if backend.me.as_ref().map(|m| m.id.as_str()) == Some(id) {
        backend.me = Some(updated.clone());
    }
    Json(updated).into_response()
}

async fn profile_image(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(q): Query<ImageQuery>,
) -> Response {
    let call = format!("PUT /profiles/{}/profile-image", id);
    update_user(&state, &headers, call, &id, |u| u.profile_image = Some(q.image_url))
}

async fn header_image(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(q): Query<ImageQuery>,
) -> Response {
    let call = format!("PUT /profiles/{}/header-image", id);
    update_user(&state, &headers, call, &id, |u| u.header_image = Some(q.image_url))
}

async fn name_color(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let call = format!("PUT /profiles/{}/display-name-color", id);
    let color = body["color"].as_str().unwrap_or_default().to_string();
    if !color.starts_with('#') {
        drop(record(&state, call));
        return detail(StatusCode::UNPROCESSABLE_ENTITY, "Invalid color");
    }
    update_user(&state, &headers, call, &id, |u| u.display_name_color = Some(color))
}

async fn profile_posts(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    match authorize(&state, &headers, format!("GET /profiles/{}/posts", id)) {
        Ok(backend) => {
            let posts: Vec<Post> = backend
                .posts
                .iter()
                .filter(|p| p.author_id == id)
                .cloned()
                .collect();
            Json(posts).into_response()
        }
        Err(resp) => resp,
    }
}

async fn guestbook(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    match authorize(&state, &headers, format!("GET /profiles/{}/guestbook", id)) {
        Ok(backend) => {
            Json(backend.guestbook.get(&id).cloned().unwrap_or_default()).into_response()
        }
        Err(resp) => resp,
    }
}

async fn write_guestbook(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let call = format!("POST /profiles/{}/guestbook", id);
    let mut backend = match authorize(&state, &headers, call) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let eid = backend.id("g");
    let me = backend.me.clone().unwrap_or_else(|| user("u1", "kim", "Kim"));
    let entry = GuestbookEntry {
        id: eid,
        profile_user_id: id.clone(),
        author_id: me.id,
        author_username: me.username,
        author_display_name: me.display_name,
        author_profile_image: None,
        content: body["content"].as_str().unwrap_or_default().to_string(),
        created_at: Utc::now(),
        updated_at: None,
    };
    backend.guestbook.entry(id).or_default().insert(0, entry.clone());
    Json(entry).into_response()
}

async fn edit_guestbook(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((id, eid)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let call = format!("PUT /profiles/{}/guestbook/{}", id, eid);
    let mut backend = match authorize(&state, &headers, call) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let found = backend
        .guestbook
        .get_mut(&id)
        .and_then(|list| list.iter_mut().find(|e| e.id == eid));
    match found {
        Some(e) => {
            e.content = body["content"].as_str().unwrap_or_default().to_string();
            e.updated_at = Some(Utc::now());
            Json(e.clone()).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "Entry not found"),
    }
}

async fn delete_guestbook(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((id, eid)): Path<(String, String)>,
) -> Response {
    let call = format!("DELETE /profiles/{}/guestbook/{}", id, eid);
    let mut backend = match authorize(&state, &headers, call) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    if let Some(list) = backend.guestbook.get_mut(&id) {
        list.retain(|e| e.id != eid);
    }
    Json(json!({ "message": "Entry deleted" })).into_response()
}

async fn upload(
    State(state): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if let Err(resp) = authorize(&state, &headers, "POST /uploads/image".into()) {
        return resp;
    }
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let Ok(bytes) = field.bytes().await else {
            return detail(StatusCode::BAD_REQUEST, "Unreadable upload");
        };
        let url = format!("https://cdn.example.com/{}", file_name);
        state
            .lock()
            .unwrap()
            .uploads
            .push((file_name.clone(), content_type, bytes.len()));
        return Json(json!({ "url": url, "public_id": file_name })).into_response();
    }
    detail(StatusCode::BAD_REQUEST, "No file")
}
