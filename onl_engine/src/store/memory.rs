//! An in-memory [`OrderStore`] backend.
//!
//! Implements the full subscription contract, including the rule that an order leaving
//! the subscribed status set appears one final time with its terminal status, so
//! observers can tell a fulfilled order from a cancelled one. Backs the engine's tests
//! and any deployment that does not need durable storage.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use chrono::Utc;
use log::*;
use tokio::sync::mpsc;

use crate::{
    order_types::{NewOrder, Order, OrderId, OrderStatusType},
    traits::{OrderPatch, OrderStore, OrderStoreError, OrderSubscription},
};

#[derive(Clone, Default)]
pub struct MemoryOrderStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    orders: HashMap<OrderId, Order>,
    next_id: u64,
    subscriptions: Vec<SubscriptionEntry>,
}

struct SubscriptionEntry {
    customer_id: String,
    statuses: Vec<OrderStatusType>,
    sender: mpsc::UnboundedSender<Vec<Order>>,
    /// Ids included in the previous push; used to give a departing order its final
    /// appearance.
    last_matched: HashSet<OrderId>,
}

impl Inner {
    fn snapshot_for(&self, entry: &SubscriptionEntry) -> Vec<Order> {
        let mut matched: Vec<Order> = self
            .orders
            .values()
            .filter(|o| o.customer.customer_id == entry.customer_id && entry.statuses.contains(&o.status))
            .cloned()
            .collect();
        // Ordered by recency, newest first.
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        // An order that just left the filter rides along once more with its new status.
        let departing: Vec<Order> = entry
            .last_matched
            .iter()
            .filter(|id| !matched.iter().any(|o| &&o.id == id))
            .filter_map(|id| self.orders.get(id))
            .cloned()
            .collect();
        matched.extend(departing);
        matched
    }

    fn publish(&mut self) {
        let mut snapshots = Vec::with_capacity(self.subscriptions.len());
        for entry in &self.subscriptions {
            snapshots.push(self.snapshot_for(entry));
        }
        let mut stale = Vec::new();
        for (idx, (entry, snapshot)) in self.subscriptions.iter_mut().zip(snapshots).enumerate() {
            entry.last_matched = snapshot
                .iter()
                .filter(|o| entry.statuses.contains(&o.status))
                .map(|o| o.id.clone())
                .collect();
            if entry.sender.send(snapshot).is_err() {
                stale.push(idx);
            }
        }
        // Dropped receivers release their subscription.
        for idx in stale.into_iter().rev() {
            trace!("🗄️ Pruning released order subscription");
            self.subscriptions.remove(idx);
        }
    }
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of orders held, across all statuses. Orders are never hard-deleted.
    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.orders.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OrderStore for MemoryOrderStore {
    async fn create_order(&self, order: NewOrder) -> Result<Order, OrderStoreError> {
        let mut inner = self.inner.lock().map_err(|e| OrderStoreError::Backend(e.to_string()))?;
        inner.next_id += 1;
        let id = OrderId(format!("ord-{:04}", inner.next_id));
        let now = Utc::now();
        let stored = Order {
            id: id.clone(),
            order_number: order.order_number,
            customer: order.customer,
            shipping_address: Some(order.shipping_address),
            items: order.items,
            subtotal: order.subtotal,
            total: order.total,
            original_total: None,
            status: OrderStatusType::PendingPayment,
            payment_intent_id: None,
            authorized_amount: None,
            source: order.source,
            cancellation_reason: None,
            created_at: order.created_at,
            updated_at: now,
            authorized_at: None,
            paid_at: None,
            cancelled_at: None,
        };
        inner.orders.insert(id.clone(), stored.clone());
        inner.publish();
        debug!("🗄️ Order {} stored as {id}", stored.order_number);
        Ok(stored)
    }

    async fn patch_order(&self, id: &OrderId, patch: OrderPatch) -> Result<Order, OrderStoreError> {
        let mut inner = self.inner.lock().map_err(|e| OrderStoreError::Backend(e.to_string()))?;
        let order = inner.orders.get_mut(id).ok_or_else(|| OrderStoreError::OrderNotFound(id.clone()))?;
        if let Some(status) = patch.status {
            order.status = status;
        }
        if let Some(items) = patch.items {
            order.items = items;
        }
        if let Some(total) = patch.total {
            order.total = total;
        }
        if let Some(original_total) = patch.original_total {
            order.original_total = Some(original_total);
        }
        if let Some(payment_intent_id) = patch.payment_intent_id {
            order.payment_intent_id = Some(payment_intent_id);
        }
        if let Some(amount) = patch.authorized_amount {
            order.authorized_amount = Some(amount);
        }
        if let Some(at) = patch.authorized_at {
            order.authorized_at = Some(at);
        }
        if let Some(at) = patch.paid_at {
            order.paid_at = Some(at);
        }
        if let Some(at) = patch.cancelled_at {
            order.cancelled_at = Some(at);
        }
        if let Some(reason) = patch.cancellation_reason {
            order.cancellation_reason = Some(reason);
        }
        order.updated_at = Utc::now();
        let updated = order.clone();
        inner.publish();
        Ok(updated)
    }

    async fn fetch_order(&self, id: &OrderId) -> Result<Option<Order>, OrderStoreError> {
        let inner = self.inner.lock().map_err(|e| OrderStoreError::Backend(e.to_string()))?;
        Ok(inner.orders.get(id).cloned())
    }

    async fn subscribe_orders(
        &self,
        customer_id: &str,
        statuses: &[OrderStatusType],
    ) -> Result<OrderSubscription, OrderStoreError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().map_err(|e| OrderStoreError::Backend(e.to_string()))?;
        let mut entry = SubscriptionEntry {
            customer_id: customer_id.to_string(),
            statuses: statuses.to_vec(),
            sender,
            last_matched: HashSet::new(),
        };
        // Initial snapshot delivers the current state of the views.
        let snapshot = inner.snapshot_for(&entry);
        entry.last_matched = snapshot.iter().map(|o| o.id.clone()).collect();
        let _ = entry.sender.send(snapshot);
        inner.subscriptions.push(entry);
        debug!("🗄️ Subscription registered for customer {customer_id}");
        Ok(OrderSubscription::new(receiver))
    }
}
