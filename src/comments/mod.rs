//! Comment threads: assembling the flat list a post returns into a reply tree,
//! and rendering that tree.

pub mod render;
pub mod tree;

pub use render::{render_thread, RenderContext, RenderedComment, ThreadUi};
pub use tree::{build_comment_tree, count_comments, find_comment, CommentNode};
