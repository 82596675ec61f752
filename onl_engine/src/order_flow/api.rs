use std::fmt::Debug;

use chrono::Utc;
use log::*;

use crate::{
    cart::Cart,
    config::EngineConfig,
    helpers::new_order_number,
    order_flow::{OrderFlowError, ValidationError},
    order_types::{CustomerInfo, NewOrder, Order, OrderItem, OrderStatusType, ShippingAddress, SourceChannel},
    traits::{GatewayError, OrderPatch, OrderStore, PaymentGateway, SettlementAction},
};

/// `OrderFlowApi` owns the customer-initiated side of the order lifecycle: checkout,
/// payment authorization, abandonment, approval/capture, and cancellation.
///
/// The transition table:
///
/// | From \ To        | Pending | AwaitingApproval | Approved | Completed | Cancelled |
/// |------------------|---------|------------------|----------|-----------|-----------|
/// | PendingPayment   | 1       |                  |          |           | 2         |
/// | Pending          |         | ext              |          |           | 3         |
/// | AwaitingApproval |         |                  | 4        |           | 3         |
/// | Approved         |         |                  |          | ext       |           |
///
/// 1. [`Self::authorize_payment`]: a hold for the buffered total succeeds.
/// 2. [`Self::abandon_authorization`]: the customer closed the payment UI.
/// 3. [`Self::cancel_order`].
/// 4. [`Self::approve_and_capture`].
///
/// `ext` entries are effected by the merchant fulfilment surface and only observed here
/// (via the reconciliation engine). Every other pairing is rejected with
/// [`OrderFlowError::InvalidTransition`] before any gateway call is made.
pub struct OrderFlowApi<S, G> {
    store: S,
    gateway: G,
    config: EngineConfig,
}

impl<S, G> Debug for OrderFlowApi<S, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<S, G> OrderFlowApi<S, G> {
    pub fn new(store: S, gateway: G, config: EngineConfig) -> Self {
        Self { store, gateway, config }
    }
}

impl<S, G> OrderFlowApi<S, G>
where
    S: OrderStore,
    G: PaymentGateway,
{
    /// Creates an order from the cart snapshot in `PendingPayment` status.
    ///
    /// Requires a non-empty cart and a complete delivery address. The subtotal is the sum
    /// of the line totals; the total equals the subtotal until substitutions adjust it.
    /// The cart itself is untouched: it is only cleared once authorization succeeds.
    pub async fn place_order(
        &self,
        cart: &Cart,
        customer: &CustomerInfo,
        address: &ShippingAddress,
        source: SourceChannel,
    ) -> Result<Order, OrderFlowError> {
        if cart.is_empty() {
            return Err(ValidationError::EmptyCart.into());
        }
        if !address.is_complete() {
            return Err(ValidationError::IncompleteAddress.into());
        }
        let items: Vec<OrderItem> = cart
            .lines()
            .map(|line| OrderItem {
                item_id: line.item.item_id.clone(),
                name: line.item.name.clone(),
                unit_price: line.item.unit_price,
                quantity: line.quantity,
                line_total: line.line_total(),
                category: line.item.category.clone(),
                allow_substitution: line.allow_substitution,
                substitutes: Vec::new(),
            })
            .collect();
        let subtotal = cart.subtotal();
        let now = Utc::now();
        let draft = NewOrder {
            order_number: new_order_number(now),
            customer: customer.clone(),
            shipping_address: address.clone(),
            items,
            subtotal,
            total: subtotal,
            source,
            created_at: now,
        };
        let order = self.store.create_order(draft).await?;
        debug!("🛒️📦️ Order {} placed for customer {} ({})", order.order_number, customer.customer_id, order.total);
        Ok(order)
    }

    /// Requests an authorize-only hold for the order total plus the configured buffer
    /// fraction, completes the client-side confirmation, and moves the order
    /// `PendingPayment → Pending`, recording the intent id and held amount.
    ///
    /// On success the cart is cleared optimistically; the subscription will confirm the
    /// status change on its own schedule. On gateway failure the order is left in
    /// `PendingPayment` and the error is surfaced; retrying is the customer's call.
    ///
    /// The intent id is persisted as soon as the hold exists, before the client-side
    /// confirmation. A confirmation failure then leaves a record of the partial hold, so
    /// a subsequent abandonment can release it.
    pub async fn authorize_payment(&self, cart: &mut Cart, order: &Order) -> Result<Order, OrderFlowError> {
        self.check_transition(order, OrderStatusType::Pending)?;
        let auth = self
            .gateway
            .create_authorization(&order.id, order.total, self.config.buffer_fraction, &order.customer.email)
            .await?;
        self.store
            .patch_order(&order.id, OrderPatch::default().with_payment_intent_id(auth.payment_intent_id.clone()))
            .await?;
        self.gateway.confirm_client_side(&auth.client_secret).await?;
        let patch = OrderPatch::default()
            .with_status(OrderStatusType::Pending)
            .with_authorized_amount(auth.authorized_amount)
            .with_authorized_at(Utc::now());
        let updated = self.store.patch_order(&order.id, patch).await?;
        cart.clear();
        debug!(
            "💳️📦️ Order {} authorized: {} held against intent {}",
            updated.order_number, auth.authorized_amount, auth.payment_intent_id
        );
        Ok(updated)
    }

    /// The customer closed the payment UI without completing it. The order moves
    /// `PendingPayment → Cancelled` with reason "payment not completed", and any hold
    /// that was partially created is released.
    ///
    /// The release is a compensating action, not a rollback: the local cancellation
    /// stands even if the gateway call fails, and the discrepancy is left to server-side
    /// reconciliation.
    pub async fn abandon_authorization(&self, order: &Order) -> Result<Order, OrderFlowError> {
        if order.status != OrderStatusType::PendingPayment {
            return Err(OrderFlowError::InvalidTransition {
                order_id: order.id.clone(),
                from: order.status,
                to: OrderStatusType::Cancelled,
            });
        }
        let patch = OrderPatch::default()
            .with_status(OrderStatusType::Cancelled)
            .with_cancelled_at(Utc::now())
            .with_cancellation_reason("payment not completed");
        let updated = self.store.patch_order(&order.id, patch).await?;
        self.release_hold(&updated).await;
        info!("💳️❌️ Order {} abandoned at payment", updated.order_number);
        Ok(updated)
    }

    /// The customer approved the picked order. Only valid from `AwaitingApproval`.
    /// Captures the possibly substitution-adjusted total against the existing hold, then
    /// moves the order to `Approved`, recording the capture time.
    ///
    /// A state error performs no gateway call. If substitutions reduced the payable total
    /// below the hold, the capture simply requests the lower amount.
    pub async fn approve_and_capture(&self, order: &Order) -> Result<Order, OrderFlowError> {
        if order.status != OrderStatusType::AwaitingApproval {
            return Err(OrderFlowError::InvalidTransition {
                order_id: order.id.clone(),
                from: order.status,
                to: OrderStatusType::Approved,
            });
        }
        self.gateway.capture_or_cancel(&order.id, SettlementAction::Capture(order.total)).await?;
        let patch = OrderPatch::default().with_status(OrderStatusType::Approved).with_paid_at(Utc::now());
        let updated = self.store.patch_order(&order.id, patch).await?;
        debug!("💳️✅️ Order {} approved; captured {}", updated.order_number, updated.total);
        Ok(updated)
    }

    /// Cancels an order that has not been approved yet, releasing any payment hold.
    ///
    /// Idempotent from the caller's perspective: the gateway reporting "already released"
    /// is tolerated, and any other release failure still leaves the order cancelled
    /// locally (best effort, per the compensating-action policy).
    pub async fn cancel_order(&self, order: &Order) -> Result<Order, OrderFlowError> {
        self.check_transition(order, OrderStatusType::Cancelled)?;
        let patch = OrderPatch::default()
            .with_status(OrderStatusType::Cancelled)
            .with_cancelled_at(Utc::now())
            .with_cancellation_reason("cancelled by customer");
        let updated = self.store.patch_order(&order.id, patch).await?;
        self.release_hold(&updated).await;
        info!("📦️❌️ Order {} cancelled by customer", updated.order_number);
        Ok(updated)
    }

    fn check_transition(&self, order: &Order, to: OrderStatusType) -> Result<(), OrderFlowError> {
        if order.status.can_transition_to(to) {
            Ok(())
        } else {
            Err(OrderFlowError::InvalidTransition { order_id: order.id.clone(), from: order.status, to })
        }
    }

    /// Best-effort hold release. Skipped when no hold was ever recorded.
    async fn release_hold(&self, order: &Order) {
        if order.payment_intent_id.is_none() {
            trace!("💳️ Order {} has no hold to release", order.order_number);
            return;
        }
        match self.gateway.capture_or_cancel(&order.id, SettlementAction::Release).await {
            Ok(()) => debug!("💳️ Hold released for order {}", order.order_number),
            Err(GatewayError::AlreadyReleased) => {
                debug!("💳️ Hold for order {} was already released", order.order_number)
            },
            Err(e) => warn!(
                "💳️ Could not release the hold for order {}: {e}. The order stays cancelled locally; the \
                 discrepancy is a server-side reconciliation concern.",
                order.order_number
            ),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
