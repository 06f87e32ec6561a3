use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::datefmt::{opt_utc_timestamp, utc_timestamp};

pub const DEFAULT_NAME_COLOR: &str = "#000000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub header_image: Option<String>,
    #[serde(default)]
    pub display_name_color: Option<String>,
    #[serde(default, with = "opt_utc_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn name_color(&self) -> &str {
        self.display_name_color
            .as_deref()
            .unwrap_or(DEFAULT_NAME_COLOR)
    }
}

/// Board category. The API speaks the Korean labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    #[serde(rename = "전체")]
    All,
    #[serde(rename = "공지")]
    Notice,
    #[serde(rename = "일상")]
    Daily,
    #[serde(rename = "영화")]
    Movie,
    #[serde(rename = "게임")]
    Game,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::All,
        Category::Notice,
        Category::Daily,
        Category::Movie,
        Category::Game,
    ];

    pub fn wire_name(&self) -> &'static str {
        match self {
            Category::All => "전체",
            Category::Notice => "공지",
            Category::Daily => "일상",
            Category::Movie => "영화",
            Category::Game => "게임",
        }
    }

    /// Query value for list filters; the All category means no filter.
    pub fn as_filter(&self) -> Option<&'static str> {
        match self {
            Category::All => None,
            other => Some(other.wire_name()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::All => "All",
            Category::Notice => "Notice",
            Category::Daily => "Daily",
            Category::Movie => "Movie",
            Category::Game => "Game",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.wire_name() == trimmed || c.to_string().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("Unknown category: {}", trimmed))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub author_id: String,
    #[serde(default)]
    pub author_username: String,
    #[serde(default)]
    pub author_display_name: String,
    #[serde(default)]
    pub author_display_name_color: Option<String>,
    #[serde(default)]
    pub author_profile_image: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub likes_count: u32,
    #[serde(default)]
    pub liked_by: Vec<String>,
    #[serde(with = "utc_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "opt_utc_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.liked_by.iter().any(|id| id == user_id)
    }

    pub fn author_name(&self) -> &str {
        if self.author_display_name.is_empty() {
            &self.author_username
        } else {
            &self.author_display_name
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub author_id: String,
    #[serde(default)]
    pub author_username: String,
    #[serde(default)]
    pub author_display_name: String,
    #[serde(default)]
    pub author_display_name_color: Option<String>,
    #[serde(default)]
    pub author_profile_image: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(with = "utc_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "opt_utc_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn author_name(&self) -> &str {
        if self.author_display_name.is_empty() {
            &self.author_username
        } else {
            &self.author_display_name
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestbookEntry {
    pub id: String,
    pub profile_user_id: String,
    pub author_id: String,
    #[serde(default)]
    pub author_username: String,
    #[serde(default)]
    pub author_display_name: String,
    #[serde(default)]
    pub author_profile_image: Option<String>,
    pub content: String,
    #[serde(with = "utc_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "opt_utc_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Comment,
    Reply,
    Like,
    Guestbook,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub actor_id: String,
    #[serde(default)]
    pub actor_username: String,
    #[serde(default)]
    pub actor_display_name: String,
    pub message: String,
    #[serde(default)]
    pub post_id: Option<String>,
    #[serde(default)]
    pub comment_id: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(with = "utc_timestamp")]
    pub created_at: DateTime<Utc>,
}

// --- Requests ---

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub category: Category,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewComment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CommentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfilePatch {
    pub display_name: String,
    pub username: String,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GuestbookContent {
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NameColor {
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadFlag {
    pub is_read: bool,
}

// --- Responses ---

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadedImage {
    pub url: String,
    #[serde(default)]
    pub public_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostCount {
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnreadCount {
    pub unread_count: u64,
}
