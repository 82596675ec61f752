use std::{fmt::Display, future::Future};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::order_types::OrderNumber;

/// The event-type discriminator carried in a notification's `data` payload, used by the
/// deep-link action resolver to interpret a notification click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderEventKind {
    OrderAwaitingApproval,
    OrderCompleted,
}

impl Display for OrderEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderEventKind::OrderAwaitingApproval => write!(f, "order_awaiting_approval"),
            OrderEventKind::OrderCompleted => write!(f, "order_completed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    pub order_number: Option<OrderNumber>,
    pub event: OrderEventKind,
}

/// A local alert, deliverable on either the platform (background) or in-page
/// (foreground) surface. The `tag` is the dedup key: the surface replaces an
/// unacknowledged alert bearing the same tag instead of stacking a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalNotification {
    pub title: String,
    pub body: String,
    pub tag: String,
    pub data: NotificationData,
}

impl LocalNotification {
    /// The wire form handed to the platform notification API.
    pub fn payload(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// The platform notification capability. Implementations enforce replace-on-tag dedup.
///
/// The delivery futures are `Send` so that dispatch can run inside spawned event
/// handlers.
pub trait NotificationSurface: Clone {
    /// Whether the notification API exists on this surface at all.
    fn is_available(&self) -> bool;

    /// Whether the customer has granted notification permission. Governs the
    /// browser-level surface only; in-page alerts do not require it.
    fn permission_granted(&self) -> bool;

    /// Delivers via the platform-level notification channel (page not visible or closed).
    fn push_background(
        &self,
        notification: &LocalNotification,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;

    /// Renders an in-page alert (page open and visible).
    fn alert_foreground(
        &self,
        notification: &LocalNotification,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    #[error("Notifications are not supported on this surface")]
    Unsupported,
    #[error("Notification permission was denied")]
    PermissionDenied,
    #[error("The notification surface failed. {0}")]
    Surface(String),
}
