use super::ApiClient;
use crate::error::ClientResult;
use crate::models::{Notification, ReadFlag, UnreadCount};

impl ApiClient {
    pub async fn list_notifications(&self) -> ClientResult<Vec<Notification>> {
        self.get("/notifications").await
    }

    pub async fn unread_notification_count(&self) -> ClientResult<u64> {
        let count: UnreadCount = self.get("/notifications/unread/count").await?;
        Ok(count.unread_count)
    }

    pub async fn mark_notification_read(&self, notification_id: &str) -> ClientResult<Notification> {
        self.put(
            &format!("/notifications/{}", notification_id),
            &ReadFlag { is_read: true },
        )
        .await
    }

    pub async fn delete_notification(&self, notification_id: &str) -> ClientResult<()> {
        self.delete(&format!("/notifications/{}", notification_id))
            .await
    }

    pub async fn delete_all_notifications(&self) -> ClientResult<()> {
        self.delete("/notifications").await
    }
}
