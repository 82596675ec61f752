use serde::{Deserialize, Serialize};

use crate::order_types::Order;

/// The merchant has picked the order and the customer needs to review substitutions and
/// approve capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAwaitingApprovalEvent {
    pub order: Order,
}

impl OrderAwaitingApprovalEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// The merchant has fulfilled the order and it has left the customer's active views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCompletedEvent {
    pub order: Order,
}

impl OrderCompletedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}
