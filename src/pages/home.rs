//! The home feed: posts with their comment threads, infinite scroll and the
//! member list.

use askama::Template;
use std::collections::HashMap;
use std::path::Path;

use super::{require_session, Route};
use crate::api::ApiClient;
use crate::comments::{build_comment_tree, render, render_thread, RenderContext, ThreadUi};
use crate::datefmt::DateFormatter;
use crate::error::{ClientError, ClientResult};
use crate::feed::FeedPager;
use crate::models::{Category, Comment, CommentPatch, NewComment, NewPost, Post, PostPatch, User};
use crate::widgets::{Avatar, LikeList};

pub const MEMBER_LIST_LIMIT: u32 = 50;

/// Post being edited and its draft text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostEditor {
    pub post_id: String,
    pub draft: String,
}

pub struct HomePage {
    api: ApiClient,
    dates: DateFormatter,
    pub user: User,
    pub posts: Vec<Post>,
    /// Flat comment list per post id, in fetch order
    pub comments: HashMap<String, Vec<Comment>>,
    pub threads: HashMap<String, ThreadUi>,
    pub members: Vec<User>,
    pub pager: FeedPager,
    pub post_editor: Option<PostEditor>,
    pub highlighted: Option<String>,
    pub error: Option<String>,
    redirect: Option<Route>,
}

impl HomePage {
    /// Load the feed for a signed-in user. Without a session, or if the user
    /// or first page can't be fetched, the session is cleared and the caller
    /// is sent to the login page.
    pub async fn load(
        api: ApiClient,
        pager: FeedPager,
        dates: DateFormatter,
        highlight: Option<String>,
    ) -> Result<Self, Route> {
        require_session(api.session())?;

        let (user, posts, comments) = match Self::fetch_first(&api, &pager).await {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!("Home feed failed to load: {}", e);
                if let Err(e) = api.logout() {
                    tracing::warn!("Failed to clear session: {}", e);
                }
                return Err(Route::Login);
            }
        };

        let members = match api.list_users(MEMBER_LIST_LIMIT).await {
            Ok(members) => members,
            Err(e) => {
                tracing::warn!("Failed to fetch member list: {}", e);
                Vec::new()
            }
        };

        let mut page = Self {
            api,
            dates,
            user,
            posts: Vec::new(),
            comments: HashMap::new(),
            threads: HashMap::new(),
            members,
            pager,
            post_editor: None,
            highlighted: None,
            error: None,
            redirect: None,
        };
        page.accept_first(posts, comments);
        if let Some(post_id) = highlight {
            page.highlight(&post_id);
        }
        Ok(page)
    }

    async fn fetch_first(
        api: &ApiClient,
        pager: &FeedPager,
    ) -> ClientResult<(User, Vec<Post>, HashMap<String, Vec<Comment>>)> {
        let user = api.my_profile().await?;
        let posts = api
            .list_posts(1, pager.page_size(), pager.category())
            .await?;
        let comments = fetch_comments(api, &posts).await;
        Ok((user, posts, comments))
    }

    fn accept_first(&mut self, posts: Vec<Post>, comments: HashMap<String, Vec<Comment>>) {
        self.pager.begin_first();
        self.pager.finish(posts.len());
        self.posts = posts;
        self.comments = comments;
        self.threads.clear();
        self.post_editor = None;
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Navigation requested by the last action, if any.
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

    // --- Feed ---

    /// Report a scroll position. Loads the next page when near the bottom.
    pub async fn scroll(&mut self, viewport_bottom: u32, content_height: u32) -> bool {
        if !self.pager.should_load(viewport_bottom, content_height) {
            return false;
        }
        self.load_more().await
    }

    /// Fetch the next page unless one is already loading or the feed is done.
    pub async fn load_more(&mut self) -> bool {
        let Some(page) = self.pager.begin_next() else {
            return false;
        };
        let result = self
            .api
            .list_posts(page, self.pager.page_size(), self.pager.category())
            .await;
        match result {
            Ok(posts) => {
                self.pager.finish(posts.len());
                let comments = fetch_comments(&self.api, &posts).await;
                self.comments.extend(comments);
                self.posts.extend(posts);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to load page {}: {}", page, e);
                self.pager.fail();
                if e.is_auth() {
                    self.redirect = Some(Route::Login);
                }
                false
            }
        }
    }

    /// Switch category and reload from page 1. On failure the current feed
    /// and pager are left as they were.
    pub async fn select_category(&mut self, category: Category) -> bool {
        self.error = None;
        let result = self.api.list_posts(1, self.pager.page_size(), category).await;
        match result {
            Ok(posts) => {
                let comments = fetch_comments(&self.api, &posts).await;
                self.pager.reset(category);
                self.accept_first(posts, comments);
                true
            }
            Err(e) => {
                tracing::warn!("Failed to switch to {}: {}", category, e);
                self.fail(e, "Failed to load posts.")
            }
        }
    }

    pub fn highlight(&mut self, post_id: &str) {
        if self.posts.iter().any(|p| p.id == post_id) {
            self.highlighted = Some(post_id.to_string());
        }
    }

    pub fn clear_highlight(&mut self) {
        self.highlighted = None;
    }

    // --- Posts ---

    pub fn post(&self, post_id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == post_id)
    }

    /// Publish a post in the current category.
    pub async fn create_post(&mut self, content: &str, image: Option<&Path>) -> bool {
        self.error = None;
        let result = publish_post(&self.api, content, image, self.pager.category()).await;
        match result {
            Ok(post) => {
                self.comments.insert(post.id.clone(), Vec::new());
                self.posts.insert(0, post);
                true
            }
            Err(e) => self.fail(e, "Failed to create post."),
        }
    }

    pub fn start_edit_post(&mut self, post_id: &str) {
        if let Some(post) = self.post(post_id) {
            self.post_editor = Some(PostEditor {
                post_id: post.id.clone(),
                draft: post.content.clone(),
            });
            self.error = None;
        }
    }

    pub fn set_post_draft(&mut self, text: impl Into<String>) {
        if let Some(editor) = self.post_editor.as_mut() {
            editor.draft = text.into();
        }
    }

    pub fn cancel_edit_post(&mut self) {
        self.post_editor = None;
        self.error = None;
    }

    /// Save the open post editor.
    pub async fn save_post_edit(&mut self) -> bool {
        let Some(editor) = self.post_editor.clone() else {
            return false;
        };
        let saved = self.update_post(&editor.post_id, &editor.draft).await;
        if saved {
            self.post_editor = None;
        }
        saved
    }

    pub async fn update_post(&mut self, post_id: &str, content: &str) -> bool {
        self.error = None;
        match revise_post(&self.api, post_id, content).await {
            Ok(updated) => {
                self.replace_post(updated);
                true
            }
            Err(e) => self.fail(e, "Failed to update post."),
        }
    }

    pub async fn delete_post(&mut self, post_id: &str) -> bool {
        self.error = None;
        match self.api.delete_post(post_id).await {
            Ok(()) => {
                self.posts.retain(|p| p.id != post_id);
                self.comments.remove(post_id);
                self.threads.remove(post_id);
                true
            }
            Err(e) => self.fail(e, "Failed to delete post."),
        }
    }

    /// Like the post, or unlike it if the viewer already has. Each call
    /// issues its own request.
    pub async fn toggle_like(&mut self, post_id: &str) -> bool {
        self.error = None;
        let Some(post) = self.post(post_id) else {
            return false;
        };
        let result = if post.is_liked_by(&self.user.id) {
            self.api.unlike_post(post_id).await
        } else {
            self.api.like_post(post_id).await
        };
        match result {
            Ok(updated) => {
                self.replace_post(updated);
                true
            }
            Err(e) => self.fail(e, "Failed to update like."),
        }
    }

    fn replace_post(&mut self, updated: Post) {
        if let Some(slot) = self.posts.iter_mut().find(|p| p.id == updated.id) {
            *slot = updated;
        }
    }

    pub fn like_list(&self, post_id: &str) -> Option<LikeList> {
        self.post(post_id)
            .map(|post| LikeList::resolve(post, &self.members))
    }

    // --- Comments ---

    pub fn thread_ui(&mut self, post_id: &str) -> &mut ThreadUi {
        self.threads.entry(post_id.to_string()).or_default()
    }

    pub async fn add_comment(&mut self, post_id: &str, content: &str, image: Option<&Path>) -> bool {
        self.submit_comment(post_id, None, content, image).await
    }

    pub async fn reply(
        &mut self,
        post_id: &str,
        parent_id: &str,
        content: &str,
        image: Option<&Path>,
    ) -> bool {
        self.submit_comment(post_id, Some(parent_id), content, image)
            .await
    }

    /// Send the open reply composer under `parent_id`. The composer closes on
    /// success and keeps its draft on failure.
    pub async fn submit_reply(&mut self, post_id: &str, parent_id: &str, image: Option<&Path>) -> bool {
        let draft = self.thread_ui(post_id).take_reply(parent_id).unwrap_or_default();
        let sent = self.reply(post_id, parent_id, &draft, image).await;
        if !sent {
            self.thread_ui(post_id).set_reply_draft(parent_id, draft);
        }
        sent
    }

    async fn submit_comment(
        &mut self,
        post_id: &str,
        parent_id: Option<&str>,
        content: &str,
        image: Option<&Path>,
    ) -> bool {
        self.error = None;
        match publish_comment(&self.api, post_id, parent_id, content, image).await {
            Ok(created) => {
                self.comments
                    .entry(post_id.to_string())
                    .or_default()
                    .push(created);
                true
            }
            Err(e) => self.fail(e, "Failed to post comment."),
        }
    }

    /// Save the open comment editor.
    pub async fn submit_comment_edit(&mut self, post_id: &str, comment_id: &str) -> bool {
        let Some(draft) = self.thread_ui(post_id).take_edit(comment_id) else {
            return false;
        };
        self.edit_comment(post_id, comment_id, &draft).await
    }

    pub async fn edit_comment(&mut self, post_id: &str, comment_id: &str, content: &str) -> bool {
        self.error = None;
        match revise_comment(&self.api, post_id, comment_id, content).await {
            Ok(updated) => {
                if let Some(list) = self.comments.get_mut(post_id) {
                    if let Some(slot) = list.iter_mut().find(|c| c.id == comment_id) {
                        *slot = updated;
                    }
                }
                true
            }
            Err(e) => self.fail(e, "Failed to update comment."),
        }
    }

    /// Delete a comment, then re-fetch the post's comments so soft-deleted
    /// parents come back as placeholders.
    pub async fn delete_comment(&mut self, post_id: &str, comment_id: &str) -> bool {
        self.error = None;
        let result = self.try_delete_comment(post_id, comment_id).await;
        match result {
            Ok(comments) => {
                if let Some(ui) = self.threads.get_mut(post_id) {
                    ui.retain_ids(comments.iter().map(|c| c.id.as_str()));
                }
                self.comments.insert(post_id.to_string(), comments);
                true
            }
            Err(e) => self.fail(e, "Failed to delete comment."),
        }
    }

    async fn try_delete_comment(&self, post_id: &str, comment_id: &str) -> ClientResult<Vec<Comment>> {
        self.api.delete_comment(post_id, comment_id).await?;
        self.api.list_comments(post_id).await
    }

    // --- Rendering ---

    pub fn thread(&self, post_id: &str) -> Vec<render::RenderedComment> {
        let comments = self.comments.get(post_id).map(Vec::as_slice).unwrap_or(&[]);
        let tree = build_comment_tree(comments);
        let empty = ThreadUi::default();
        let ctx = RenderContext {
            viewer_id: Some(&self.user.id),
            ui: self.threads.get(post_id).unwrap_or(&empty),
            dates: &self.dates,
        };
        render_thread(&tree, &ctx)
    }

    pub fn post_card(&self, post: &Post) -> PostCard {
        PostCard {
            id: post.id.clone(),
            author: post.author_name().to_string(),
            author_color: post
                .author_display_name_color
                .clone()
                .unwrap_or_else(|| crate::models::DEFAULT_NAME_COLOR.to_string()),
            avatar: Avatar::new(
                post.author_name(),
                post.author_profile_image.as_deref(),
                Some(&post.author_id),
            ),
            category: post.category.to_string(),
            created_at: self.dates.time_ago(&post.created_at),
            edited: post.updated_at.is_some(),
            content: post.content.clone(),
            image_url: post.image_url.clone(),
            likes_count: post.likes_count,
            liked: post.is_liked_by(&self.user.id),
            can_edit: post.author_id == self.user.id,
            highlighted: self.highlighted.as_deref() == Some(post.id.as_str()),
            comment_count: self.comments.get(&post.id).map_or(0, |c| {
                c.iter().filter(|c| !c.is_deleted).count()
            }),
        }
    }

    /// One post card with its comment thread, as HTML.
    pub fn post_html(&self, post_id: &str) -> Result<Option<String>, askama::Error> {
        let Some(post) = self.post(post_id) else {
            return Ok(None);
        };
        let template = PostCardTemplate {
            post: self.post_card(post),
            comments_html: render::to_html(&self.thread(post_id))?,
        };
        template.render().map(Some)
    }

    pub fn logout(&mut self) -> Route {
        if let Err(e) = self.api.logout() {
            tracing::warn!("Failed to clear session: {}", e);
        }
        Route::Login
    }
}

const EMPTY_SUBMISSION: &str = "Enter some text or attach an image.";

async fn upload_attachment(api: &ApiClient, image: Option<&Path>) -> ClientResult<Option<String>> {
    match image {
        Some(path) => Ok(Some(api.upload_image(path).await?.url)),
        None => Ok(None),
    }
}

/// Create a post from text, an image, or both. The image is uploaded first.
pub async fn publish_post(
    api: &ApiClient,
    content: &str,
    image: Option<&Path>,
    category: Category,
) -> ClientResult<Post> {
    let content = content.trim();
    if content.is_empty() && image.is_none() {
        return Err(ClientError::Validation(EMPTY_SUBMISSION.into()));
    }
    let post = NewPost {
        content: (!content.is_empty()).then(|| content.to_string()),
        image_url: upload_attachment(api, image).await?,
        category,
    };
    api.create_post(&post).await
}

pub async fn revise_post(api: &ApiClient, post_id: &str, content: &str) -> ClientResult<Post> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ClientError::Validation("Post content can't be empty.".into()));
    }
    let patch = PostPatch {
        content: Some(content.to_string()),
        ..Default::default()
    };
    api.update_post(post_id, &patch).await
}

/// Create a comment, or a reply when `parent_id` is set. Same rules as posts.
pub async fn publish_comment(
    api: &ApiClient,
    post_id: &str,
    parent_id: Option<&str>,
    content: &str,
    image: Option<&Path>,
) -> ClientResult<Comment> {
    let content = content.trim();
    if content.is_empty() && image.is_none() {
        return Err(ClientError::Validation(EMPTY_SUBMISSION.into()));
    }
    let comment = NewComment {
        content: (!content.is_empty()).then(|| content.to_string()),
        image_url: upload_attachment(api, image).await?,
        parent_id: parent_id.map(str::to_string),
    };
    api.create_comment(post_id, &comment).await
}

pub async fn revise_comment(
    api: &ApiClient,
    post_id: &str,
    comment_id: &str,
    content: &str,
) -> ClientResult<Comment> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ClientError::Validation("Comment can't be empty.".into()));
    }
    let patch = CommentPatch {
        content: Some(content.to_string()),
        ..Default::default()
    };
    api.update_comment(post_id, comment_id, &patch).await
}

/// Comments for each post, fetched concurrently. A failed fetch leaves that
/// post with no comments.
pub async fn fetch_comments(api: &ApiClient, posts: &[Post]) -> HashMap<String, Vec<Comment>> {
    let fetches = posts.iter().map(|post| async move {
        let comments = match api.list_comments(&post.id).await {
            Ok(comments) => comments,
            Err(e) => {
                tracing::warn!("Failed to fetch comments for post {}: {}", post.id, e);
                Vec::new()
            }
        };
        (post.id.clone(), comments)
    });
    futures::future::join_all(fetches).await.into_iter().collect()
}

// --- View ---

pub struct PostCard {
    pub id: String,
    pub author: String,
    pub author_color: String,
    pub avatar: Avatar,
    pub category: String,
    pub created_at: String,
    pub edited: bool,
    pub content: String,
    pub image_url: Option<String>,
    pub likes_count: u32,
    pub liked: bool,
    pub can_edit: bool,
    pub highlighted: bool,
    pub comment_count: usize,
}

#[derive(Template)]
#[template(path = "components/post_card.html")]
pub struct PostCardTemplate {
    pub post: PostCard,
    pub comments_html: String,
}
