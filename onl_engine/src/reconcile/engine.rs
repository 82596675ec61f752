use std::collections::HashSet;

use log::*;

use crate::{
    events::{EventProducers, OrderAwaitingApprovalEvent, OrderCompletedEvent},
    order_types::{Order, OrderId, OrderStatusType},
    traits::OrderSubscription,
};

/// A transition detected between two consecutive snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileEvent {
    /// The order newly entered the awaiting-approval view.
    AwaitingApproval(Order),
    /// The order left the active views and the snapshot shows it as completed.
    Completed(Order),
}

/// The three live views, rebuilt on every server push.
#[derive(Debug, Clone, Default)]
pub struct OrderPartitions {
    pub pending: Vec<Order>,
    pub awaiting_approval: Vec<Order>,
    pub approved: Vec<Order>,
}

impl OrderPartitions {
    fn from_snapshot(snapshot: &[Order]) -> Self {
        let mut parts = Self::default();
        for order in snapshot {
            match order.status {
                OrderStatusType::Pending => parts.pending.push(order.clone()),
                OrderStatusType::AwaitingApproval => parts.awaiting_approval.push(order.clone()),
                OrderStatusType::Approved => parts.approved.push(order.clone()),
                // An order exiting the views appears once with its terminal status; it is
                // not partitioned, only inspected for transition detection. Orders that
                // have not been authorized yet never reach these views.
                OrderStatusType::PendingPayment | OrderStatusType::Completed | OrderStatusType::Cancelled => {},
            }
        }
        parts
    }

    fn active_ids(&self) -> HashSet<OrderId> {
        self.pending
            .iter()
            .chain(self.awaiting_approval.iter())
            .chain(self.approved.iter())
            .map(|o| o.id.clone())
            .collect()
    }
}

/// Maintains the customer's live order views over one store subscription and detects
/// status transitions exactly once.
#[derive(Debug, Default)]
pub struct ReconciliationEngine {
    partitions: OrderPartitions,
    previous_awaiting: HashSet<OrderId>,
    previous_active: HashSet<OrderId>,
    seen_first_snapshot: bool,
}

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a snapshot into the engine state and returns the transitions it revealed.
    ///
    /// Feeding the same snapshot twice in a row produces no additional events, and the
    /// very first snapshot of a session never does: it only seeds the comparison sets.
    pub fn observe(&mut self, snapshot: &[Order]) -> Vec<ReconcileEvent> {
        let parts = OrderPartitions::from_snapshot(snapshot);
        let current_active = parts.active_ids();
        let mut events = Vec::new();
        if self.seen_first_snapshot {
            for order in snapshot {
                if order.status == OrderStatusType::Completed
                    && self.previous_active.contains(&order.id)
                    && !current_active.contains(&order.id)
                {
                    debug!("🔄️📦️ Order {} has been fulfilled", order.order_number);
                    events.push(ReconcileEvent::Completed(order.clone()));
                }
            }
            for order in &parts.awaiting_approval {
                if !self.previous_awaiting.contains(&order.id) {
                    debug!("🔄️📦️ Order {} is awaiting approval", order.order_number);
                    events.push(ReconcileEvent::AwaitingApproval(order.clone()));
                }
            }
        } else {
            trace!("🔄️ First snapshot of the session observed; seeding comparison sets only");
        }
        self.previous_awaiting = parts.awaiting_approval.iter().map(|o| o.id.clone()).collect();
        self.previous_active = current_active;
        self.partitions = parts;
        self.seen_first_snapshot = true;
        events
    }

    /// The current live views.
    pub fn partitions(&self) -> &OrderPartitions {
        &self.partitions
    }

    /// Ids currently awaiting approval, in view order. Feeds the deep-link resolver.
    pub fn awaiting_ids(&self) -> Vec<OrderId> {
        self.partitions.awaiting_approval.iter().map(|o| o.id.clone()).collect()
    }

    /// Clears all views and comparison state. Called on sign-out or navigation away; the
    /// next snapshot observed after a reset is treated as a first snapshot again.
    pub fn reset(&mut self) {
        self.partitions = OrderPartitions::default();
        self.previous_awaiting.clear();
        self.previous_active.clear();
        self.seen_first_snapshot = false;
    }

    /// Drives the engine from a live subscription until it closes, publishing detected
    /// transitions to the hook producers. Consumes the engine; all state is cleared on
    /// teardown.
    pub async fn run(mut self, mut subscription: OrderSubscription, producers: EventProducers) {
        while let Some(snapshot) = subscription.next_snapshot().await {
            trace!("🔄️ Snapshot with {} orders received", snapshot.len());
            for event in self.observe(&snapshot) {
                match event {
                    ReconcileEvent::AwaitingApproval(order) => {
                        for producer in &producers.awaiting_approval_producer {
                            producer.publish_event(OrderAwaitingApprovalEvent::new(order.clone())).await;
                        }
                    },
                    ReconcileEvent::Completed(order) => {
                        for producer in &producers.order_completed_producer {
                            producer.publish_event(OrderCompletedEvent::new(order.clone())).await;
                        }
                    },
                }
            }
        }
        self.reset();
        debug!("🔄️ Order subscription closed; reconciliation state cleared");
    }
}
