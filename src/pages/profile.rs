//! A user's profile: header, authored posts and guestbook.
//!
//! Each editable field is saved on its own. A failed update leaves every
//! field as it was and only sets `error`; a successful one patches just the
//! fields it owns.

use std::path::Path;

use super::{require_session, Route};
use crate::api::ApiClient;
use crate::datefmt::DateFormatter;
use crate::error::{ClientError, ClientResult};
use crate::models::{GuestbookEntry, Post, ProfilePatch, User};

pub const POSTS_PER_PAGE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryEditor {
    pub entry_id: String,
    pub draft: String,
}

pub struct ProfilePage {
    api: ApiClient,
    dates: DateFormatter,
    pub user_id: String,
    /// Signed-in user at load time
    pub viewer: User,
    pub profile: Option<User>,
    pub posts: Vec<Post>,
    pub page: usize,
    pub guestbook: Vec<GuestbookEntry>,
    pub entry_editor: Option<EntryEditor>,
    pub error: Option<String>,
    redirect: Option<Route>,
}

impl ProfilePage {
    /// Load a profile. A failed fetch keeps the page with `error` set.
    pub async fn load(api: ApiClient, dates: DateFormatter, user_id: &str) -> Result<Self, Route> {
        let session = require_session(api.session())?;
        let mut page = Self {
            api,
            dates,
            user_id: user_id.to_string(),
            viewer: session.user,
            profile: None,
            posts: Vec::new(),
            page: 1,
            guestbook: Vec::new(),
            entry_editor: None,
            error: None,
            redirect: None,
        };

        match page.fetch_all().await {
            Ok((profile, posts, guestbook)) => {
                page.profile = Some(profile);
                page.posts = posts;
                page.guestbook = guestbook;
            }
            Err(e) => {
                tracing::warn!("Profile {} failed to load: {}", user_id, e);
                page.fail(e, "Failed to load profile.");
            }
        }
        Ok(page)
    }

    async fn fetch_all(&self) -> ClientResult<(User, Vec<Post>, Vec<GuestbookEntry>)> {
        let profile = self.api.user_profile(&self.user_id).await?;
        let posts = self.api.user_posts(&self.user_id).await?;
        let guestbook = self.api.guestbook(&self.user_id).await?;
        Ok((profile, posts, guestbook))
    }

    pub fn take_redirect(&mut self) -> Option<Route> {
        self.redirect.take()
    }

    fn fail(&mut self, e: ClientError, fallback: &str) -> bool {
        if e.is_auth() {
            self.redirect = Some(Route::Login);
        }
        self.error = Some(e.user_message(fallback));
        false
    }

    pub fn dates(&self) -> &DateFormatter {
        &self.dates
    }

    /// Whether the viewer is looking at their own profile.
    pub fn is_own(&self) -> bool {
        self.viewer.id == self.user_id
    }

    // --- Posts ---

    pub fn total_pages(&self) -> usize {
        self.posts.len().div_ceil(POSTS_PER_PAGE)
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages().max(1));
    }

    pub fn visible_posts(&self) -> &[Post] {
        let start = (self.page - 1) * POSTS_PER_PAGE;
        if start >= self.posts.len() {
            return &[];
        }
        let end = (start + POSTS_PER_PAGE).min(self.posts.len());
        &self.posts[start..end]
    }

    /// Where clicking one of the listed posts leads.
    pub fn open_post(&self, post_id: &str) -> Route {
        Route::Home {
            highlight_post: Some(post_id.to_string()),
        }
    }

    // --- Profile fields ---

    /// Save display name, username and bio. On your own profile the cached
    /// session user is refreshed too.
    pub async fn update_profile(&mut self, display_name: &str, username: &str, bio: &str) -> bool {
        let display_name = display_name.trim();
        let username = username.trim();
        if display_name.is_empty() || username.is_empty() {
            self.error = Some("Display name and username are required.".into());
            return false;
        }
        let bio = bio.trim();
        let patch = ProfilePatch {
            display_name: display_name.to_string(),
            username: username.to_string(),
            bio: (!bio.is_empty()).then(|| bio.to_string()),
        };

        let updated = match self.api.update_my_profile(&patch).await {
            Ok(updated) => updated,
            Err(e) => return self.fail(e, "Failed to update profile."),
        };

        if let Some(profile) = self.profile.as_mut() {
            profile.display_name = updated.display_name.clone();
            profile.username = updated.username.clone();
            profile.bio = updated.bio.clone();
        }
        if self.viewer.id == updated.id {
            self.viewer.display_name = updated.display_name.clone();
            self.viewer.username = updated.username.clone();
            self.viewer.bio = updated.bio.clone();
            if let Err(e) = self.api.session().update_user(self.viewer.clone()) {
                tracing::warn!("Failed to store updated user: {}", e);
            }
        }

        // Author names on posts and guestbook entries come from the server.
        let refreshed = futures::try_join!(
            self.api.user_posts(&self.user_id),
            self.api.guestbook(&self.user_id)
        );
        match refreshed {
            Ok((posts, guestbook)) => {
                self.posts = posts;
                self.guestbook = guestbook;
                self.set_page(self.page);
                self.error = None;
                true
            }
            Err(e) => self.fail(e, "Failed to update profile."),
        }
    }

    pub async fn change_profile_image(&mut self, image: &Path) -> bool {
        let result = self.upload_and(image, ImageSlot::Profile).await;
        match result {
            Ok(url) => {
                if let Some(profile) = self.profile.as_mut() {
                    profile.profile_image = Some(url);
                }
                self.error = None;
                true
            }
            Err(e) => self.fail(e, "Failed to upload profile image."),
        }
    }

    pub async fn change_header_image(&mut self, image: &Path) -> bool {
        let result = self.upload_and(image, ImageSlot::Header).await;
        match result {
            Ok(url) => {
                if let Some(profile) = self.profile.as_mut() {
                    profile.header_image = Some(url);
                }
                self.error = None;
                true
            }
            Err(e) => self.fail(e, "Failed to upload header image."),
        }
    }

    async fn upload_and(&self, image: &Path, slot: ImageSlot) -> ClientResult<String> {
        let uploaded = self.api.upload_image(image).await?;
        match slot {
            ImageSlot::Profile => {
                self.api
                    .update_profile_image(&self.user_id, &uploaded.url)
                    .await?
            }
            ImageSlot::Header => {
                self.api
                    .update_header_image(&self.user_id, &uploaded.url)
                    .await?
            }
        };
        Ok(uploaded.url)
    }

    pub async fn change_name_color(&mut self, color: &str) -> bool {
        match self.api.update_display_name_color(&self.user_id, color).await {
            Ok(_) => {
                if let Some(profile) = self.profile.as_mut() {
                    profile.display_name_color = Some(color.to_string());
                }
                self.error = None;
                true
            }
            Err(e) => self.fail(e, "Failed to change name color."),
        }
    }

    // --- Guestbook ---

    /// Only the author of an entry may edit or delete it, even on the
    /// profile owner's own page.
    pub fn can_modify(&self, entry: &GuestbookEntry) -> bool {
        entry.author_id == self.viewer.id
    }

    pub async fn write_guestbook(&mut self, content: &str) -> bool {
        if content.trim().is_empty() {
            self.error = Some("Guestbook entry can't be empty.".into());
            return false;
        }
        match self.api.create_guestbook_entry(&self.user_id, content).await {
            Ok(entry) => {
                self.guestbook.insert(0, entry);
                self.error = None;
                true
            }
            Err(e) => self.fail(e, "Failed to write guestbook entry."),
        }
    }

    pub fn start_edit_entry(&mut self, entry_id: &str) {
        if let Some(entry) = self.guestbook.iter().find(|e| e.id == entry_id) {
            self.entry_editor = Some(EntryEditor {
                entry_id: entry.id.clone(),
                draft: entry.content.clone(),
            });
        }
    }

    pub fn cancel_edit_entry(&mut self) {
        self.entry_editor = None;
    }

    pub async fn save_entry_edit(&mut self) -> bool {
        let Some(editor) = self.entry_editor.clone() else {
            return false;
        };
        let saved = self.edit_guestbook(&editor.entry_id, &editor.draft).await;
        if saved {
            self.entry_editor = None;
        }
        saved
    }

    pub async fn edit_guestbook(&mut self, entry_id: &str, content: &str) -> bool {
        if content.trim().is_empty() {
            self.error = Some("Guestbook entry can't be empty.".into());
            return false;
        }
        let result = self
            .api
            .update_guestbook_entry(&self.user_id, entry_id, content)
            .await;
        match result {
            Ok(updated) => {
                if let Some(slot) = self.guestbook.iter_mut().find(|e| e.id == entry_id) {
                    *slot = updated;
                }
                self.error = None;
                true
            }
            Err(e) => self.fail(e, "Failed to update guestbook entry."),
        }
    }

    pub async fn delete_guestbook(&mut self, entry_id: &str) -> bool {
        match self.api.delete_guestbook_entry(&self.user_id, entry_id).await {
            Ok(()) => {
                self.guestbook.retain(|e| e.id != entry_id);
                self.error = None;
                true
            }
            Err(e) => self.fail(e, "Failed to delete guestbook entry."),
        }
    }
}

enum ImageSlot {
    Profile,
    Header,
}
