use chrono::{DateTime, Utc};
use onl_common::Money;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::order_types::{NewOrder, Order, OrderId, OrderItem, OrderStatusType};

/// The interface to the persistent order collection.
///
/// The subscription contract matters to the reconciliation engine: snapshots arrive in
/// the order the server computed them, and the snapshot in which an order exits the
/// subscribed status set includes that order one final time with its terminal status, so
/// that observers can distinguish a fulfilled order from a cancelled one.
///
/// A caller that mutates and immediately reads must not assume the subscription has
/// already reflected its own write.
#[allow(async_fn_in_trait)]
pub trait OrderStore: Clone {
    /// Inserts the draft with a server-assigned id in `PendingPayment` status and returns
    /// the stored order.
    async fn create_order(&self, order: NewOrder) -> Result<Order, OrderStoreError>;

    /// Applies a partial update. Usable for every lifecycle transition.
    async fn patch_order(&self, id: &OrderId, patch: OrderPatch) -> Result<Order, OrderStoreError>;

    async fn fetch_order(&self, id: &OrderId) -> Result<Option<Order>, OrderStoreError>;

    /// Subscribes to realtime pushes of all of the customer's orders matching the status
    /// set, ordered by recency. Dropping the returned handle releases the subscription.
    async fn subscribe_orders(
        &self,
        customer_id: &str,
        statuses: &[OrderStatusType],
    ) -> Result<OrderSubscription, OrderStoreError>;
}

//--------------------------------------     OrderPatch        --------------------------------------------------------
/// A partial update to an order. Only the populated fields are written.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub status: Option<OrderStatusType>,
    pub items: Option<Vec<OrderItem>>,
    pub total: Option<Money>,
    pub original_total: Option<Money>,
    pub payment_intent_id: Option<String>,
    pub authorized_amount: Option<Money>,
    pub authorized_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
}

impl OrderPatch {
    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_items(mut self, items: Vec<OrderItem>) -> Self {
        self.items = Some(items);
        self
    }

    pub fn with_total(mut self, total: Money) -> Self {
        self.total = Some(total);
        self
    }

    pub fn with_original_total(mut self, original_total: Money) -> Self {
        self.original_total = Some(original_total);
        self
    }

    pub fn with_payment_intent_id(mut self, payment_intent_id: impl Into<String>) -> Self {
        self.payment_intent_id = Some(payment_intent_id.into());
        self
    }

    pub fn with_authorized_amount(mut self, amount: Money) -> Self {
        self.authorized_amount = Some(amount);
        self
    }

    pub fn with_authorized_at(mut self, at: DateTime<Utc>) -> Self {
        self.authorized_at = Some(at);
        self
    }

    pub fn with_paid_at(mut self, at: DateTime<Utc>) -> Self {
        self.paid_at = Some(at);
        self
    }

    pub fn with_cancelled_at(mut self, at: DateTime<Utc>) -> Self {
        self.cancelled_at = Some(at);
        self
    }

    pub fn with_cancellation_reason(mut self, reason: impl Into<String>) -> Self {
        self.cancellation_reason = Some(reason.into());
        self
    }
}

//--------------------------------------  OrderSubscription    --------------------------------------------------------
/// A live order subscription. Snapshots are full views of the matching orders; the handle
/// releases the server-side listener when dropped or closed.
#[derive(Debug)]
pub struct OrderSubscription {
    receiver: mpsc::UnboundedReceiver<Vec<Order>>,
}

impl OrderSubscription {
    pub fn new(receiver: mpsc::UnboundedReceiver<Vec<Order>>) -> Self {
        Self { receiver }
    }

    /// Waits for the next snapshot. Returns `None` once the subscription has been
    /// released and the last buffered snapshot consumed.
    pub async fn next_snapshot(&mut self) -> Option<Vec<Order>> {
        self.receiver.recv().await
    }

    /// Releases the subscription without dropping the handle.
    pub fn close(&mut self) {
        self.receiver.close();
    }
}

//--------------------------------------   OrderStoreError     --------------------------------------------------------
#[derive(Debug, Clone, Error)]
pub enum OrderStoreError {
    #[error("The order store backend failed. {0}")]
    Backend(String),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("The store rejected the operation. {0}")]
    PermissionDenied(String),
}
