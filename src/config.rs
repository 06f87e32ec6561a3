use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;

use crate::models::Category;

#[derive(Parser, Debug)]
#[command(name = "ggame", about = "Client for the GGame social board")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the API, including the /api prefix
    #[arg(long, env = "GGAME_API_URL")]
    pub api_url: Option<String>,

    /// Path to data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account and sign in
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        display_name: String,
        #[arg(long)]
        bio: Option<String>,
    },
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Home feed with comment threads
    Feed {
        #[arg(long, value_parser = parse_category, default_value = "all")]
        category: Category,
        /// Number of pages to pull through the infinite-scroll pager
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Numbered list of all posts
    Posts {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, value_parser = parse_category, default_value = "all")]
        category: Category,
    },
    /// Create, edit, delete or like posts
    #[command(subcommand)]
    Post(PostCommand),
    /// Comment on posts
    #[command(subcommand)]
    Comment(CommentCommand),
    /// Render one post's comment thread
    Thread {
        post_id: String,
        /// Emit HTML instead of text
        #[arg(long)]
        html: bool,
    },
    /// Upload an image and print its URL
    Upload { path: PathBuf },
    /// Show or edit profiles
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Write on a profile guestbook
    #[command(subcommand)]
    Guestbook(GuestbookCommand),
    /// Read and manage notifications
    #[command(subcommand)]
    Notifications(NotificationCommand),
    /// List members
    Users {
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
}

#[derive(Subcommand, Debug)]
pub enum PostCommand {
    Create {
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long)]
        image: Option<PathBuf>,
        #[arg(long, value_parser = parse_category, default_value = "all")]
        category: Category,
    },
    Edit {
        post_id: String,
        #[arg(long)]
        content: String,
    },
    Delete { post_id: String },
    Like { post_id: String },
    Unlike { post_id: String },
}

#[derive(Subcommand, Debug)]
pub enum CommentCommand {
    Add {
        post_id: String,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    Reply {
        post_id: String,
        parent_id: String,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    Edit {
        post_id: String,
        comment_id: String,
        #[arg(long)]
        content: String,
    },
    Delete { post_id: String, comment_id: String },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    Show {
        user_id: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    Edit {
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        bio: Option<String>,
    },
    Image { path: PathBuf },
    Header { path: PathBuf },
    Color { color: String },
}

#[derive(Subcommand, Debug)]
pub enum GuestbookCommand {
    Write {
        user_id: String,
        #[arg(long)]
        content: String,
    },
    Edit {
        user_id: String,
        entry_id: String,
        #[arg(long)]
        content: String,
    },
    Delete { user_id: String, entry_id: String },
}

#[derive(Subcommand, Debug)]
pub enum NotificationCommand {
    List,
    Read { notification_id: String },
    Delete { notification_id: String },
    Clear,
    /// Poll and print new notifications until interrupted
    Watch,
}

fn parse_category(value: &str) -> Result<Category, String> {
    value.parse()
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub display: DisplayConfig,
    pub feed: FeedConfig,
    pub notifications: NotificationConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    /// Offset from UTC used when showing timestamps
    pub utc_offset_hours: i32,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FeedConfig {
    pub page_size: u32,
    /// Distance from the bottom of the content that triggers the next page
    pub scroll_threshold: u32,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct NotificationConfig {
    pub poll_interval_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: 9,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: 1000,
            scroll_threshold: 500,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 3,
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli)?;
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        // CLI overrides
        if let Some(ref url) = cli.api_url {
            config.api.base_url = url.clone();
        }

        Ok(config)
    }

    pub fn data_dir(cli: &Cli) -> anyhow::Result<PathBuf> {
        match cli.data_dir.clone() {
            Some(dir) => Ok(dir),
            None => dirs::home_dir()
                .map(|home| home.join(".ggame"))
                .ok_or_else(|| anyhow::anyhow!("Could not determine home directory")),
        }
    }

    pub fn session_path(data_dir: &std::path::Path) -> PathBuf {
        data_dir.join("session.json")
    }
}
