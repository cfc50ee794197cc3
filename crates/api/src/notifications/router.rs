//! Event-to-notification routing.

use lms_core::types::DbId;
use lms_db::models::notification::{CreateNotification, Notification};
use lms_db::repositories::{NotificationRepo, VideoRepo};
use lms_db::DbPool;
use lms_events::{event_types, PlatformEvent};
use tokio::sync::broadcast;

pub const KIND_COMMENT: &str = "comment";
pub const KIND_COMPLETION: &str = "completion";
pub const KIND_SUBSCRIPTION: &str = "subscription";

/// Routes platform events to the users they concern.
pub struct NotificationRouter {
    pool: DbPool,
}

impl NotificationRouter {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run the routing loop until the [`EventBus`](lms_events::EventBus)
    /// is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.handle_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            tenant_id = event.tenant_id,
                            "Failed to route event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Create the notification for a single event, if it warrants one.
    ///
    /// Returns the stored row, or `None` for events nobody needs to hear
    /// about (unknown types, users commenting on their own video).
    pub async fn handle_event(
        &self,
        event: &PlatformEvent,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let Some(input) = self.build(event).await? else {
            return Ok(None);
        };
        let created = NotificationRepo::create(&self.pool, &input).await?;
        tracing::debug!(
            notification_id = created.id,
            user_id = created.user_id,
            kind = %created.kind,
            "Notification created"
        );
        Ok(Some(created))
    }

    async fn build(&self, event: &PlatformEvent) -> Result<Option<CreateNotification>, sqlx::Error> {
        match event.event_type.as_str() {
            event_types::COMMENT_CREATED => {
                let Some(video_id) = event.payload_id("video_id") else {
                    return Ok(None);
                };
                let Some(video) =
                    VideoRepo::find_in_tenant(&self.pool, event.tenant_id, video_id).await?
                else {
                    return Ok(None);
                };
                let Some(owner) = video.created_by else {
                    return Ok(None);
                };
                if event.actor_user_id == Some(owner) {
                    return Ok(None);
                }
                let commenter = event.payload_str("author_name").unwrap_or("Someone");
                Ok(Some(notice(
                    event.tenant_id,
                    owner,
                    KIND_COMMENT,
                    format!("{commenter} commented on \"{}\"", video.title),
                    event.payload_str("excerpt").map(str::to_string),
                    Some(format!("/videos/{}", video.slug)),
                )))
            }
            event_types::VIDEO_COMPLETED => {
                let Some(user_id) = event.actor_user_id else {
                    return Ok(None);
                };
                let title = event.payload_str("title").unwrap_or("a video");
                Ok(Some(notice(
                    event.tenant_id,
                    user_id,
                    KIND_COMPLETION,
                    format!("You completed {title}"),
                    None,
                    event.payload_str("slug").map(|s| format!("/videos/{s}")),
                )))
            }
            event_types::SUBSCRIPTION_ACTIVATED => {
                let Some(user_id) = event.payload_id("user_id") else {
                    return Ok(None);
                };
                Ok(Some(notice(
                    event.tenant_id,
                    user_id,
                    KIND_SUBSCRIPTION,
                    "Your subscription is active".to_string(),
                    Some("Subscriber content is now unlocked.".to_string()),
                    Some("/account/billing".to_string()),
                )))
            }
            _ => Ok(None),
        }
    }
}

fn notice(
    tenant_id: DbId,
    user_id: DbId,
    kind: &str,
    title: String,
    body: Option<String>,
    link: Option<String>,
) -> CreateNotification {
    CreateNotification {
        tenant_id: Some(tenant_id),
        user_id,
        kind: kind.to_string(),
        title,
        body,
        link,
    }
}
