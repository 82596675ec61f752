//! Decides whether and how to surface a local alert for an order event.
//!
//! Dedup is by tag: the tag is derived from the order number, so a second alert for the
//! same order replaces the unacknowledged first one instead of stacking on top of it.
//! The dispatcher never throws into its caller: an unavailable notification API or a
//! denied permission degrades to a log line.

use std::sync::Arc;

use futures_util::FutureExt;
use log::*;

use crate::{
    events::EventHooks,
    order_types::OrderNumber,
    traits::{LocalNotification, NotificationData, NotificationSurface, OrderEventKind},
};

/// Where the event is being delivered. Foreground means the page is open and visible;
/// background defers entirely to the platform-level notification so the customer is
/// never double-fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Foreground,
    Background,
}

/// Reports the current page visibility at dispatch time.
pub type VisibilityProbe = Arc<dyn Fn() -> Delivery + Send + Sync>;

#[derive(Clone)]
pub struct NotificationDispatcher<N> {
    surface: N,
    fallback_tag: String,
    browser_alerts_in_foreground: bool,
}

impl<N: NotificationSurface> NotificationDispatcher<N> {
    pub fn new(surface: N, fallback_tag: impl Into<String>, browser_alerts_in_foreground: bool) -> Self {
        Self { surface, fallback_tag: fallback_tag.into(), browser_alerts_in_foreground }
    }

    /// Builds the alert for an order event. The tag is stable per order so the surface
    /// can replace rather than stack; events without an order number fall back to the
    /// static tag.
    pub fn notification_for(&self, kind: OrderEventKind, order_number: Option<&OrderNumber>) -> LocalNotification {
        let (title, body) = match (kind, order_number) {
            (OrderEventKind::OrderAwaitingApproval, Some(n)) => (
                "Your order needs approval".to_string(),
                format!("Order {n} has been prepared. Review any substitutions and approve to complete payment."),
            ),
            (OrderEventKind::OrderAwaitingApproval, None) => (
                "An order needs approval".to_string(),
                "One of your orders has been prepared and is waiting for your approval.".to_string(),
            ),
            (OrderEventKind::OrderCompleted, Some(n)) => {
                ("Your order is ready".to_string(), format!("Order {n} has been fulfilled."))
            },
            (OrderEventKind::OrderCompleted, None) => {
                ("Your order is ready".to_string(), "One of your orders has been fulfilled.".to_string())
            },
        };
        let tag = match order_number {
            Some(n) => format!("order-{n}"),
            None => self.fallback_tag.clone(),
        };
        LocalNotification { title, body, tag, data: NotificationData { order_number: order_number.cloned(), event: kind } }
    }

    /// Builds and delivers the alert for an order event. Infallible by policy.
    pub async fn dispatch_event(&self, kind: OrderEventKind, order_number: Option<&OrderNumber>, delivery: Delivery) {
        let notification = self.notification_for(kind, order_number);
        self.deliver(notification, delivery).await;
    }

    /// Delivers an alert, degrading silently when the capability is missing. Failures are
    /// logged and never escalate to the caller.
    ///
    /// Permission gates the browser-level surface only: a denied permission drops the
    /// platform push but still renders the in-page alert for a visible page.
    pub async fn deliver(&self, notification: LocalNotification, delivery: Delivery) {
        if !self.surface.is_available() {
            debug!("🔔️ Notification API unavailable; dropping alert [{}]", notification.tag);
            return;
        }
        let result = match delivery {
            Delivery::Background => {
                if !self.surface.permission_granted() {
                    debug!("🔔️ Notification permission denied; dropping alert [{}]", notification.tag);
                    return;
                }
                self.surface.push_background(&notification).await
            },
            Delivery::Foreground => {
                let shown = self.surface.alert_foreground(&notification).await;
                if shown.is_ok() && self.browser_alerts_in_foreground && self.surface.permission_granted() {
                    self.surface.push_background(&notification).await
                } else {
                    shown
                }
            },
        };
        if let Err(e) = result {
            warn!("🔔️ Could not surface alert [{}]: {e}", notification.tag);
        }
    }
}

/// Wires a dispatcher into the reconciliation hook set. Foreground versus background is
/// decided per event by the visibility probe.
pub fn register_notification_hooks<N>(
    dispatcher: Arc<NotificationDispatcher<N>>,
    hooks: &mut EventHooks,
    visibility: VisibilityProbe,
) where
    N: NotificationSurface + Send + Sync + 'static,
{
    let d = dispatcher.clone();
    let v = visibility.clone();
    hooks.on_order_awaiting_approval(move |ev| {
        let d = d.clone();
        let delivery = v();
        async move {
            d.dispatch_event(OrderEventKind::OrderAwaitingApproval, Some(&ev.order.order_number), delivery).await;
        }
        .boxed()
    });
    hooks.on_order_completed(move |ev| {
        let d = dispatcher.clone();
        let delivery = visibility();
        async move {
            d.dispatch_event(OrderEventKind::OrderCompleted, Some(&ev.order.order_number), delivery).await;
        }
        .boxed()
    });
}
