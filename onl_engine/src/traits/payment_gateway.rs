use onl_common::Money;
use thiserror::Error;

use crate::order_types::{OrderId, ShippingAddress};

/// The result of placing an authorize-only hold: the secret the browser needs to complete
/// card entry, the gateway's intent id, and the amount actually held (order total plus
/// the buffer fraction).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentAuthorization {
    pub client_secret: String,
    pub payment_intent_id: String,
    pub authorized_amount: Money,
}

/// Settlement of an existing hold. Capture and release are exposed as a single remote
/// procedure on the gateway side; the action discriminates the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementAction {
    /// Convert the hold into a charge for the given amount, which may be less than or
    /// equal to the held amount.
    Capture(Money),
    /// Remove the hold without charging.
    Release,
}

/// The interface to the hosted payment processor.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway: Clone {
    /// Places an authorize-only hold of `amount × (1 + buffer_fraction)` for the order.
    async fn create_authorization(
        &self,
        order_id: &OrderId,
        amount: Money,
        buffer_fraction: f64,
        customer_email: &str,
    ) -> Result<PaymentAuthorization, GatewayError>;

    /// Completes 3-D-Secure/card entry in the browser for a previously created
    /// authorization.
    async fn confirm_client_side(&self, client_secret: &str) -> Result<(), GatewayError>;

    /// Captures or releases the hold for the order. Releasing a hold that was already
    /// released reports [`GatewayError::AlreadyReleased`]; callers on the cancellation
    /// path must tolerate it.
    async fn capture_or_cancel(&self, order_id: &OrderId, action: SettlementAction) -> Result<(), GatewayError>;

    /// Road distance between two addresses in miles. Informational display only; not part
    /// of the order state machine.
    async fn calculate_distance(&self, from: &ShippingAddress, to: &ShippingAddress) -> Result<f64, GatewayError>;
}

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("The payment was declined. {0}")]
    Declined(String),
    #[error("The hold was already released")]
    AlreadyReleased,
    #[error("The payment gateway call failed. {0}")]
    Api(String),
}
