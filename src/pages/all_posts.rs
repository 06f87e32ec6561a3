//! Numbered listing of every post, ten to a page.

use super::{require_session, Route};
use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::models::{Category, Post};

pub const POSTS_PER_PAGE: u32 = 10;
/// Page buttons shown at once
pub const PAGE_WINDOW: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub prev: Option<u32>,
    pub pages: Vec<u32>,
    pub next: Option<u32>,
}

/// Page buttons around `current`: a window of up to [`PAGE_WINDOW`] pages
/// centred where possible, clamped to `1..=total_pages`.
pub fn pagination(current: u32, total_pages: u32) -> Pagination {
    // Widened so the window math can't overflow near u32::MAX
    let window = u64::from(PAGE_WINDOW);
    let mut start = u64::from(current).saturating_sub(window / 2).max(1);
    let end = (start + window - 1).min(u64::from(total_pages));
    if end + 1 < start + window {
        start = (end + 1).saturating_sub(window).max(1);
    }
    Pagination {
        prev: (current > 1).then(|| current - 1),
        pages: (start..=end).filter_map(|p| u32::try_from(p).ok()).collect(),
        next: (current < total_pages).then(|| current + 1),
    }
}

pub struct AllPostsPage {
    api: ApiClient,
    pub posts: Vec<Post>,
    pub current_page: u32,
    pub total_posts: u64,
    pub category: Category,
    pub error: Option<String>,
}

impl AllPostsPage {
    pub async fn load(api: ApiClient, category: Category, page: u32) -> Result<Self, Route> {
        require_session(api.session())?;
        let mut all = Self {
            api,
            posts: Vec::new(),
            current_page: page.max(1),
            total_posts: 0,
            category,
            error: None,
        };
        if all.refresh().await && all.current_page > all.total_pages().max(1) {
            all.current_page = all.total_pages().max(1);
            all.refresh().await;
        }
        Ok(all)
    }

    /// Fetch the current page and the post total together.
    pub async fn refresh(&mut self) -> bool {
        match self.fetch().await {
            Ok((posts, total)) => {
                self.posts = posts;
                self.total_posts = total;
                self.error = None;
                true
            }
            Err(e) => {
                tracing::warn!("Failed to load posts: {}", e);
                self.error = Some(e.user_message("Failed to load posts."));
                false
            }
        }
    }

    async fn fetch(&self) -> ClientResult<(Vec<Post>, u64)> {
        futures::try_join!(
            self.api
                .list_posts(self.current_page, POSTS_PER_PAGE, self.category),
            self.api.count_posts()
        )
    }

    pub fn total_pages(&self) -> u32 {
        let pages = self.total_posts.div_ceil(POSTS_PER_PAGE as u64);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn pagination(&self) -> Pagination {
        pagination(self.current_page, self.total_pages())
    }

    /// Jump to a page, clamped to the pages the last count allows.
    pub async fn go_to(&mut self, page: u32) -> bool {
        self.current_page = page.clamp(1, self.total_pages().max(1));
        self.refresh().await
    }

    pub async fn select_category(&mut self, category: Category) -> bool {
        self.category = category;
        self.current_page = 1;
        self.refresh().await
    }

    /// Where clicking a listed post leads.
    pub fn open_post(&self, post_id: &str) -> Route {
        Route::Home {
            highlight_post: Some(post_id.to_string()),
        }
    }
}
