use std::collections::HashMap;

use crate::models::Comment;

/// A comment and the replies that resolved to it, in fetch order.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentNode {
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    pub fn id(&self) -> &str {
        &self.comment.id
    }

    /// This node plus every descendant.
    pub fn size(&self) -> usize {
        1 + self.replies.iter().map(CommentNode::size).sum::<usize>()
    }

    pub fn depth(&self) -> usize {
        1 + self
            .replies
            .iter()
            .map(CommentNode::depth)
            .max()
            .unwrap_or(0)
    }
}

/// Assemble a flat comment list for one post into a reply tree.
///
/// A comment goes under its parent when `parent_id` names another comment in
/// the same list; otherwise it is a root. Input order is kept at every level.
/// Comments caught in a parent cycle are promoted to roots after the resolved
/// ones, so every input comment appears exactly once.
pub fn build_comment_tree(comments: &[Comment]) -> Vec<CommentNode> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(comments.len());
    for (i, comment) in comments.iter().enumerate() {
        index.entry(comment.id.as_str()).or_insert(i);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); comments.len()];
    let mut roots = Vec::new();
    for (i, comment) in comments.iter().enumerate() {
        let parent = comment
            .parent_id
            .as_deref()
            .and_then(|parent_id| index.get(parent_id).copied())
            .filter(|&p| p != i);
        match parent {
            Some(p) => children[p].push(i),
            None => {
                if let Some(parent_id) = comment.parent_id.as_deref() {
                    tracing::debug!(
                        "Comment {} has unresolved parent {}, showing at top level",
                        comment.id,
                        parent_id
                    );
                }
                roots.push(i)
            }
        }
    }

    let mut placed = vec![false; comments.len()];
    let mut tree: Vec<CommentNode> = roots
        .iter()
        .map(|&i| assemble(i, comments, &children, &mut placed))
        .collect();

    for i in 0..comments.len() {
        if !placed[i] {
            tracing::warn!("Comment {} is part of a reply cycle", comments[i].id);
            tree.push(assemble(i, comments, &children, &mut placed));
        }
    }

    tree
}

fn assemble(
    i: usize,
    comments: &[Comment],
    children: &[Vec<usize>],
    placed: &mut [bool],
) -> CommentNode {
    placed[i] = true;
    let mut replies = Vec::with_capacity(children[i].len());
    for &child in &children[i] {
        if !placed[child] {
            replies.push(assemble(child, comments, children, placed));
        }
    }
    CommentNode {
        comment: comments[i].clone(),
        replies,
    }
}

/// Total number of comments in a forest.
pub fn count_comments(nodes: &[CommentNode]) -> usize {
    nodes.iter().map(CommentNode::size).sum()
}

/// Depth-first search for a comment by id.
pub fn find_comment<'a>(nodes: &'a [CommentNode], id: &str) -> Option<&'a CommentNode> {
    nodes.iter().find_map(|node| {
        if node.id() == id {
            Some(node)
        } else {
            find_comment(&node.replies, id)
        }
    })
}
