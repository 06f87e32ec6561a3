use askama::Template;
use std::collections::HashMap;
use std::fmt::Write as _;

use super::tree::CommentNode;
use crate::datefmt::DateFormatter;
use crate::models::{Comment, DEFAULT_NAME_COLOR};
use crate::widgets::avatar::Avatar;

// --- Per-node UI state ---

/// Local toggles for one comment. Each comment has its own; opening the
/// editor on one leaves every other comment alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeUi {
    /// Draft text while the editor is open
    pub edit_draft: Option<String>,
    /// Draft text while the reply composer is open
    pub reply_draft: Option<String>,
}

impl NodeUi {
    fn is_idle(&self) -> bool {
        self.edit_draft.is_none() && self.reply_draft.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ThreadUi {
    nodes: HashMap<String, NodeUi>,
}

impl ThreadUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, comment_id: &str) -> NodeUi {
        self.nodes.get(comment_id).cloned().unwrap_or_default()
    }

    pub fn is_editing(&self, comment_id: &str) -> bool {
        self.nodes
            .get(comment_id)
            .is_some_and(|n| n.edit_draft.is_some())
    }

    pub fn is_replying(&self, comment_id: &str) -> bool {
        self.nodes
            .get(comment_id)
            .is_some_and(|n| n.reply_draft.is_some())
    }

    /// Open the editor seeded with the comment's current text.
    pub fn start_edit(&mut self, comment: &Comment) {
        self.entry(&comment.id).edit_draft = Some(comment.content.clone());
    }

    pub fn set_edit_draft(&mut self, comment_id: &str, text: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(comment_id) {
            if node.edit_draft.is_some() {
                node.edit_draft = Some(text.into());
            }
        }
    }

    pub fn cancel_edit(&mut self, comment_id: &str) {
        self.update(comment_id, |n| n.edit_draft = None);
    }

    /// Close the editor and hand back its draft.
    pub fn take_edit(&mut self, comment_id: &str) -> Option<String> {
        let mut draft = None;
        self.update(comment_id, |n| draft = n.edit_draft.take());
        draft
    }

    pub fn toggle_reply(&mut self, comment_id: &str) {
        let node = self.entry(comment_id);
        node.reply_draft = match node.reply_draft {
            Some(_) => None,
            None => Some(String::new()),
        };
        self.tidy(comment_id);
    }

    pub fn set_reply_draft(&mut self, comment_id: &str, text: impl Into<String>) {
        self.entry(comment_id).reply_draft = Some(text.into());
    }

    pub fn close_reply(&mut self, comment_id: &str) {
        self.update(comment_id, |n| n.reply_draft = None);
    }

    /// Close the reply composer and hand back its draft.
    pub fn take_reply(&mut self, comment_id: &str) -> Option<String> {
        let mut draft = None;
        self.update(comment_id, |n| draft = n.reply_draft.take());
        draft
    }

    /// Drop state for comments that are no longer in the thread.
    pub fn retain_ids<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        let keep: std::collections::HashSet<&str> = ids.into_iter().collect();
        self.nodes.retain(|id, _| keep.contains(id.as_str()));
    }

    fn entry(&mut self, comment_id: &str) -> &mut NodeUi {
        self.nodes.entry(comment_id.to_string()).or_default()
    }

    fn update(&mut self, comment_id: &str, f: impl FnOnce(&mut NodeUi)) {
        if let Some(node) = self.nodes.get_mut(comment_id) {
            f(node);
        }
        self.tidy(comment_id);
    }

    fn tidy(&mut self, comment_id: &str) {
        if self.nodes.get(comment_id).is_some_and(NodeUi::is_idle) {
            self.nodes.remove(comment_id);
        }
    }
}

// --- View model ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controls {
    pub reply: bool,
    pub edit: bool,
    pub delete: bool,
}

impl Controls {
    pub fn any(&self) -> bool {
        self.reply || self.edit || self.delete
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiveComment {
    pub author: String,
    pub author_color: String,
    pub avatar: Avatar,
    pub timestamp: String,
    pub edited: bool,
    pub content: String,
    pub image_url: Option<String>,
    pub controls: Controls,
    pub edit_draft: Option<String>,
    pub reply_draft: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommentBody {
    Live(LiveComment),
    /// Soft-deleted comment kept because it still has replies
    Deleted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedComment {
    pub id: String,
    pub depth: usize,
    pub body: CommentBody,
    pub replies: Vec<RenderedComment>,
}

impl RenderedComment {
    pub fn is_placeholder(&self) -> bool {
        matches!(self.body, CommentBody::Deleted)
    }
}

pub struct RenderContext<'a> {
    /// Signed-in user, if any; controls are scoped to them.
    pub viewer_id: Option<&'a str>,
    pub ui: &'a ThreadUi,
    pub dates: &'a DateFormatter,
}

/// Render a comment forest. Deleted leaves vanish; deleted comments with
/// replies become placeholders and their replies render beneath them.
pub fn render_thread(nodes: &[CommentNode], ctx: &RenderContext<'_>) -> Vec<RenderedComment> {
    nodes
        .iter()
        .filter_map(|node| render_node(node, 0, ctx))
        .collect()
}

fn render_node(node: &CommentNode, depth: usize, ctx: &RenderContext<'_>) -> Option<RenderedComment> {
    let comment = &node.comment;
    if comment.is_deleted && node.replies.is_empty() {
        return None;
    }

    let replies = node
        .replies
        .iter()
        .filter_map(|reply| render_node(reply, depth + 1, ctx))
        .collect();

    let body = if comment.is_deleted {
        CommentBody::Deleted
    } else {
        CommentBody::Live(live_view(comment, ctx))
    };

    Some(RenderedComment {
        id: comment.id.clone(),
        depth,
        body,
        replies,
    })
}

fn live_view(comment: &Comment, ctx: &RenderContext<'_>) -> LiveComment {
    let is_author = ctx.viewer_id == Some(comment.author_id.as_str());
    let ui = ctx.ui.node(&comment.id);
    LiveComment {
        author: comment.author_name().to_string(),
        author_color: comment
            .author_display_name_color
            .clone()
            .unwrap_or_else(|| DEFAULT_NAME_COLOR.to_string()),
        avatar: Avatar::new(
            comment.author_name(),
            comment.author_profile_image.as_deref(),
            Some(&comment.author_id),
        ),
        timestamp: ctx.dates.short(&comment.created_at),
        edited: comment.updated_at.is_some(),
        content: comment.content.clone(),
        image_url: comment.image_url.clone(),
        controls: Controls {
            reply: ctx.viewer_id.is_some(),
            edit: is_author,
            delete: is_author,
        },
        edit_draft: if is_author { ui.edit_draft } else { None },
        reply_draft: ui.reply_draft,
    }
}

/// Count of rendered nodes, placeholders included.
pub fn rendered_len(nodes: &[RenderedComment]) -> usize {
    nodes
        .iter()
        .map(|n| 1 + rendered_len(&n.replies))
        .sum()
}

// --- Text output ---

pub fn to_text(nodes: &[RenderedComment]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_text(node, &mut out);
    }
    out
}

fn write_text(node: &RenderedComment, out: &mut String) {
    let indent = "  ".repeat(node.depth);
    match &node.body {
        CommentBody::Deleted => {
            let _ = writeln!(out, "{}(deleted comment)", indent);
        }
        CommentBody::Live(c) => {
            let edited = if c.edited { " (edited)" } else { "" };
            let _ = writeln!(
                out,
                "{}{} · {}{} [{}]",
                indent, c.author, c.timestamp, edited, node.id
            );
            match &c.edit_draft {
                Some(draft) => {
                    let _ = writeln!(out, "{}  editing: {}", indent, draft);
                }
                None => {
                    for line in c.content.lines() {
                        let _ = writeln!(out, "{}  {}", indent, line);
                    }
                }
            }
            if let Some(url) = &c.image_url {
                let _ = writeln!(out, "{}  [image] {}", indent, url);
            }
            if c.controls.any() {
                let mut actions = Vec::new();
                if c.controls.reply {
                    actions.push("[reply]");
                }
                if c.controls.edit {
                    actions.push("[edit]");
                }
                if c.controls.delete {
                    actions.push("[delete]");
                }
                let _ = writeln!(out, "{}  {}", indent, actions.join(" "));
            }
            if let Some(draft) = &c.reply_draft {
                let _ = writeln!(out, "{}  replying: {}", indent, draft);
            }
        }
    }
    for reply in &node.replies {
        write_text(reply, out);
    }
}

// --- HTML output ---

#[derive(Template)]
#[template(path = "components/comment.html")]
struct CommentTemplate<'a> {
    id: &'a str,
    depth: usize,
    indent: usize,
    comment: &'a LiveComment,
    replies_html: String,
}

#[derive(Template)]
#[template(path = "components/deleted_comment.html")]
struct DeletedCommentTemplate<'a> {
    id: &'a str,
    depth: usize,
    indent: usize,
    replies_html: String,
}

const INDENT_PX: usize = 24;

/// Render the thread as HTML. Children are rendered first and nested inside
/// their parent's markup.
pub fn to_html(nodes: &[RenderedComment]) -> Result<String, askama::Error> {
    let mut out = String::new();
    for node in nodes {
        out.push_str(&node_html(node)?);
    }
    Ok(out)
}

fn node_html(node: &RenderedComment) -> Result<String, askama::Error> {
    let replies_html = to_html(&node.replies)?;
    let indent = if node.depth > 0 { INDENT_PX } else { 0 };
    match &node.body {
        CommentBody::Live(comment) => CommentTemplate {
            id: &node.id,
            depth: node.depth,
            indent,
            comment,
            replies_html,
        }
        .render(),
        CommentBody::Deleted => DeletedCommentTemplate {
            id: &node.id,
            depth: node.depth,
            indent,
            replies_html,
        }
        .render(),
    }
}
