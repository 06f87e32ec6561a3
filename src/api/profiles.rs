use reqwest::Method;

use super::ApiClient;
use crate::error::ClientResult;
use crate::models::{GuestbookContent, GuestbookEntry, ImageUrl, NameColor, Post, User};

impl ApiClient {
    pub async fn user_profile(&self, user_id: &str) -> ClientResult<User> {
        self.get(&format!("/profiles/{}", user_id)).await
    }

    pub async fn update_profile_image(&self, user_id: &str, image_url: &str) -> ClientResult<User> {
        self.put_image(&format!("/profiles/{}/profile-image", user_id), image_url)
            .await
    }

    pub async fn update_header_image(&self, user_id: &str, image_url: &str) -> ClientResult<User> {
        self.put_image(&format!("/profiles/{}/header-image", user_id), image_url)
            .await
    }

    pub async fn update_display_name_color(&self, user_id: &str, color: &str) -> ClientResult<User> {
        self.put(
            &format!("/profiles/{}/display-name-color", user_id),
            &NameColor {
                color: color.to_string(),
            },
        )
        .await
    }

    pub async fn user_posts(&self, user_id: &str) -> ClientResult<Vec<Post>> {
        self.get(&format!("/profiles/{}/posts", user_id)).await
    }

    pub async fn guestbook(&self, user_id: &str) -> ClientResult<Vec<GuestbookEntry>> {
        self.get(&format!("/profiles/{}/guestbook", user_id)).await
    }

    pub async fn create_guestbook_entry(
        &self,
        user_id: &str,
        content: &str,
    ) -> ClientResult<GuestbookEntry> {
        self.post(
            &format!("/profiles/{}/guestbook", user_id),
            &GuestbookContent {
                content: content.to_string(),
            },
        )
        .await
    }

    pub async fn update_guestbook_entry(
        &self,
        user_id: &str,
        entry_id: &str,
        content: &str,
    ) -> ClientResult<GuestbookEntry> {
        self.put(
            &format!("/profiles/{}/guestbook/{}", user_id, entry_id),
            &GuestbookContent {
                content: content.to_string(),
            },
        )
        .await
    }

    pub async fn delete_guestbook_entry(&self, user_id: &str, entry_id: &str) -> ClientResult<()> {
        self.delete(&format!("/profiles/{}/guestbook/{}", user_id, entry_id))
            .await
    }

    /// The image endpoints read `image_url` from the query string; the body
    /// carries it too.
    async fn put_image(&self, path: &str, image_url: &str) -> ClientResult<User> {
        let builder = self
            .request(Method::PUT, path)?
            .query(&[("image_url", image_url)])
            .json(&ImageUrl {
                image_url: image_url.to_string(),
            });
        self.send_json(builder).await
    }
}
