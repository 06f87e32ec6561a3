//! Infinite-scroll pager for the home feed.

use crate::config::FeedConfig;
use crate::models::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    Idle,
    LoadingMore,
    /// The last page came back short; nothing more to fetch.
    Exhausted,
}

/// Page counter and load state. The pager only decides *when* to fetch and
/// which page; the caller performs the request and reports back.
#[derive(Debug, Clone)]
pub struct FeedPager {
    state: FeedState,
    /// Last page successfully loaded; 0 before the first load
    page: u32,
    page_size: u32,
    threshold: u32,
    category: Category,
}

impl FeedPager {
    pub fn new(page_size: u32, threshold: u32) -> Self {
        Self {
            state: FeedState::Idle,
            page: 0,
            page_size: page_size.max(1),
            threshold,
            category: Category::All,
        }
    }

    pub fn from_config(config: &FeedConfig) -> Self {
        Self::new(config.page_size, config.scroll_threshold)
    }

    pub fn state(&self) -> FeedState {
        self.state
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == FeedState::Exhausted
    }

    /// Whether a scroll to `viewport_bottom` within content `content_height`
    /// tall should trigger the next page.
    pub fn should_load(&self, viewport_bottom: u32, content_height: u32) -> bool {
        self.state == FeedState::Idle
            && self.page > 0
            && viewport_bottom.saturating_add(self.threshold) >= content_height
    }

    /// Start the first page after a reset. Returns the page to fetch.
    pub fn begin_first(&mut self) -> Option<u32> {
        if self.state == FeedState::LoadingMore {
            return None;
        }
        self.page = 0;
        self.state = FeedState::LoadingMore;
        Some(1)
    }

    /// Start the next page if the pager is idle. Returns the page to fetch.
    pub fn begin_next(&mut self) -> Option<u32> {
        if self.state != FeedState::Idle {
            return None;
        }
        self.state = FeedState::LoadingMore;
        Some(self.page + 1)
    }

    /// Record a finished fetch of `count` items.
    pub fn finish(&mut self, count: usize) {
        if self.state != FeedState::LoadingMore {
            return;
        }
        self.page += 1;
        self.state = if count < self.page_size as usize {
            tracing::debug!("Feed exhausted at page {}", self.page);
            FeedState::Exhausted
        } else {
            FeedState::Idle
        };
    }

    /// Record a failed fetch. The page counter stays put so the same page is
    /// tried again on the next trigger.
    pub fn fail(&mut self) {
        if self.state == FeedState::LoadingMore {
            self.state = FeedState::Idle;
        }
    }

    /// Switch category and start over from page 1.
    pub fn reset(&mut self, category: Category) {
        self.category = category;
        self.page = 0;
        self.state = FeedState::Idle;
    }
}

impl Default for FeedPager {
    fn default() -> Self {
        Self::from_config(&FeedConfig::default())
    }
}
