use std::time::Duration;

use tokio::sync::watch;

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::models::{Notification, NotificationKind};
use crate::pages::Route;
use crate::poller::{spawn_interval, PollHandle};

/// What one refresh of the bell fetched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BellSnapshot {
    pub notifications: Vec<Notification>,
    pub unread_count: u64,
}

/// Notification bell: the list, the unread badge and the dropdown toggle.
pub struct NotificationBell {
    api: ApiClient,
    pub notifications: Vec<Notification>,
    pub unread_count: u64,
    pub open: bool,
}

impl NotificationBell {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            notifications: Vec::new(),
            unread_count: 0,
            open: false,
        }
    }

    /// Fetch the list and unread count together.
    pub async fn fetch(api: &ApiClient) -> ClientResult<BellSnapshot> {
        let (notifications, unread_count) = futures::try_join!(
            api.list_notifications(),
            api.unread_notification_count()
        )?;
        Ok(BellSnapshot {
            notifications,
            unread_count,
        })
    }

    /// Refresh in place. Failures are logged and the previous state kept.
    pub async fn refresh(&mut self) {
        match Self::fetch(&self.api).await {
            Ok(snapshot) => self.apply(snapshot),
            Err(e) => tracing::warn!("Failed to fetch notifications: {}", e),
        }
    }

    pub fn apply(&mut self, snapshot: BellSnapshot) {
        self.notifications = snapshot.notifications;
        self.unread_count = snapshot.unread_count;
    }

    pub fn badge(&self) -> Option<String> {
        badge_text(self.unread_count)
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Open a notification: mark it read if needed and work out where it
    /// leads. The dropdown closes and the list is refreshed.
    pub async fn click(&mut self, notification_id: &str) -> ClientResult<Option<Route>> {
        let Some(notification) = self
            .notifications
            .iter()
            .find(|n| n.id == notification_id)
            .cloned()
        else {
            return Ok(None);
        };

        if !notification.is_read {
            self.api.mark_notification_read(&notification.id).await?;
        }

        self.open = false;
        self.refresh().await;
        Ok(destination(&notification))
    }

    pub async fn delete(&mut self, notification_id: &str) -> ClientResult<()> {
        self.api.delete_notification(notification_id).await?;
        self.notifications.retain(|n| n.id != notification_id);
        Ok(())
    }

    pub async fn delete_all(&mut self) -> ClientResult<()> {
        self.api.delete_all_notifications().await?;
        self.notifications.clear();
        self.unread_count = 0;
        Ok(())
    }

    /// Refresh every `period` on a background task. Each successful fetch is
    /// published on the returned channel; failures keep the last snapshot.
    pub fn watch(api: ApiClient, period: Duration) -> (PollHandle, watch::Receiver<BellSnapshot>) {
        let (tx, rx) = watch::channel(BellSnapshot::default());
        let handle = spawn_interval((api, tx), period, |(api, tx)| {
            let api = api.clone();
            let tx = tx.clone();
            async move {
                match Self::fetch(&api).await {
                    Ok(snapshot) => {
                        tx.send_replace(snapshot);
                    }
                    Err(e) => tracing::warn!("Failed to fetch notifications: {}", e),
                }
            }
        });
        (handle, rx)
    }
}

/// Where clicking a notification navigates.
pub fn destination(notification: &Notification) -> Option<Route> {
    if let Some(post_id) = &notification.post_id {
        Some(Route::Home {
            highlight_post: Some(post_id.clone()),
        })
    } else if notification.kind == NotificationKind::Guestbook {
        Some(Route::Profile {
            user_id: notification.actor_id.clone(),
        })
    } else {
        None
    }
}

pub fn badge_text(unread: u64) -> Option<String> {
    match unread {
        0 => None,
        n if n > 99 => Some("99+".to_string()),
        n => Some(n.to_string()),
    }
}

pub fn icon(kind: &NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Comment => "💬",
        NotificationKind::Reply => "↩️",
        NotificationKind::Like => "❤️",
        NotificationKind::Guestbook => "📝",
        NotificationKind::Other => "🔔",
    }
}
