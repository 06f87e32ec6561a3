use serde::Serialize;

use super::ApiClient;
use crate::error::ClientResult;
use crate::models::{Category, NewPost, Post, PostCount, PostPatch};

#[derive(Serialize)]
struct ListQuery<'a> {
    page: u32,
    limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
}

impl ApiClient {
    /// One page of posts, newest first. Pages start at 1.
    pub async fn list_posts(
        &self,
        page: u32,
        limit: u32,
        category: Category,
    ) -> ClientResult<Vec<Post>> {
        let query = ListQuery {
            page: page.max(1),
            limit,
            category: category.as_filter(),
        };
        self.get_query("/posts", &query).await
    }

    pub async fn count_posts(&self) -> ClientResult<u64> {
        let count: PostCount = self.get("/posts/meta/count").await?;
        Ok(count.total)
    }

    pub async fn get_post(&self, post_id: &str) -> ClientResult<Post> {
        self.get(&format!("/posts/{}", post_id)).await
    }

    pub async fn create_post(&self, post: &NewPost) -> ClientResult<Post> {
        self.post("/posts", post).await
    }

    pub async fn update_post(&self, post_id: &str, patch: &PostPatch) -> ClientResult<Post> {
        self.put(&format!("/posts/{}", post_id), patch).await
    }

    pub async fn delete_post(&self, post_id: &str) -> ClientResult<()> {
        self.delete(&format!("/posts/{}", post_id)).await
    }

    pub async fn like_post(&self, post_id: &str) -> ClientResult<Post> {
        self.post_empty_body(&format!("/posts/{}/like", post_id))
            .await
    }

    pub async fn unlike_post(&self, post_id: &str) -> ClientResult<Post> {
        self.delete_json(&format!("/posts/{}/like", post_id)).await
    }
}
