use super::ApiClient;
use crate::error::ClientResult;
use crate::models::{Comment, CommentPatch, NewComment};

impl ApiClient {
    /// All comments on a post as a flat list, oldest first.
    pub async fn list_comments(&self, post_id: &str) -> ClientResult<Vec<Comment>> {
        self.get(&format!("/posts/{}/comments", post_id)).await
    }

    /// Create a comment, or a reply when `comment.parent_id` is set.
    pub async fn create_comment(&self, post_id: &str, comment: &NewComment) -> ClientResult<Comment> {
        self.post(&format!("/posts/{}/comments", post_id), comment)
            .await
    }

    pub async fn update_comment(
        &self,
        post_id: &str,
        comment_id: &str,
        patch: &CommentPatch,
    ) -> ClientResult<Comment> {
        self.put(&format!("/posts/{}/comments/{}", post_id, comment_id), patch)
            .await
    }

    pub async fn delete_comment(&self, post_id: &str, comment_id: &str) -> ClientResult<()> {
        self.delete(&format!("/posts/{}/comments/{}", post_id, comment_id))
            .await
    }
}
