//! ONL Order Engine
//!
//! The engine behind the ONL storefront's public ordering catalog: the state machine
//! that carries a customer order from cart checkout through merchant fulfilment,
//! substitution, payment capture, and cancellation, together with the realtime
//! reconciliation that keeps the customer's live order views consistent as server-side
//! changes arrive asynchronously.
//!
//! The library is divided into four main sections:
//! 1. The order lifecycle state machine ([`OrderFlowApi`]): the customer-initiated
//!    transitions (place, authorize, abandon, approve-and-capture, cancel) with an
//!    authorize-then-capture payment model and a configurable buffer above the order
//!    total to absorb substitution cost increases.
//! 2. The realtime reconciliation engine ([`ReconciliationEngine`]): one multiplexed
//!    order subscription partitioned into the pending / awaiting-approval / approved
//!    views, with transition detection that fires user-facing effects exactly once.
//! 3. The notification dispatcher ([`notify::NotificationDispatcher`]): tag-deduplicated
//!    local alerts that distinguish foreground from background delivery and degrade
//!    silently when the platform capability is missing.
//! 4. The deep-link action resolver ([`deeplink::DeepLinkResolver`]): an idempotent
//!    convergence that fires a notification-originated approval action exactly once,
//!    regardless of the order in which merchant resolution, authentication, and order
//!    data arrive.
//!
//! Persistent storage, the payment processor, the notification platform, and merchant
//! identifier resolution are external collaborators, injected via the traits in
//! [`mod@traits`]. A simple hook system ([`mod@events`]) lets callers subscribe to order
//! lifecycle events.

pub mod cart;
pub mod config;
pub mod deeplink;
pub mod events;
pub mod helpers;
pub mod notify;
pub mod order_flow;
pub mod order_types;
pub mod reconcile;
mod store;
pub mod traits;

pub use config::EngineConfig;
pub use order_flow::{OrderFlowApi, OrderFlowError, ValidationError};
pub use reconcile::{OrderPartitions, ReconcileEvent, ReconciliationEngine};
pub use store::MemoryOrderStore;
