use thiserror::Error;

use crate::{
    order_types::{OrderId, OrderStatusType},
    traits::{GatewayError, OrderStoreError},
};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    /// Recovered locally and surfaced as inline messages; never sent to the store.
    #[error("Order validation failed. {0}")]
    Validation(#[from] ValidationError),
    /// Surfaced to the customer as a retryable in-dialog message. The order state is left
    /// unchanged, not assumed failed, so a subsequent retry is safe.
    #[error("The payment gateway reported an error. {0}")]
    Gateway(#[from] GatewayError),
    #[error("{0}")]
    Store(#[from] OrderStoreError),
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidTransition { order_id: OrderId, from: OrderStatusType, to: OrderStatusType },
}

#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("The cart is empty")]
    EmptyCart,
    #[error("The delivery address is incomplete")]
    IncompleteAddress,
}
