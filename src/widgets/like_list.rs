use super::avatar::Avatar;
use crate::models::{Post, User};

pub const EMPTY_TEXT: &str = "Nobody has liked this yet.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikedUser {
    pub id: String,
    pub username: String,
    pub avatar: Avatar,
}

/// Who liked a post, resolved against the member list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeList {
    pub post_id: String,
    pub users: Vec<LikedUser>,
}

/// Where a click landed, relative to the open popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Popup,
    Anchor,
    Elsewhere,
}

impl LikeList {
    /// Ids missing from `members` are skipped; `liked_by` order is kept.
    pub fn resolve(post: &Post, members: &[User]) -> Self {
        let users = post
            .liked_by
            .iter()
            .filter_map(|id| members.iter().find(|m| &m.id == id))
            .map(|member| LikedUser {
                id: member.id.clone(),
                username: member.username.clone(),
                avatar: Avatar::new(
                    &member.display_name,
                    member.profile_image.as_deref(),
                    Some(&member.id),
                ),
            })
            .collect();
        Self {
            post_id: post.id.clone(),
            users,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Popup text lines: one per user, or the empty-state message.
    pub fn lines(&self) -> Vec<String> {
        if self.users.is_empty() {
            return vec![EMPTY_TEXT.to_string()];
        }
        self.users.iter().map(|u| u.username.clone()).collect()
    }

    /// Clicks on the popup or its anchor keep it open; anything else closes it.
    pub fn dismisses(target: ClickTarget) -> bool {
        target == ClickTarget::Elsewhere
    }
}
