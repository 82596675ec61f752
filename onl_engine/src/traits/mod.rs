//! Interface contracts for the engine's external collaborators.
//!
//! The engine never reaches into ambient global state. Each component accepts its
//! collaborators as explicit, injected handles implementing these traits:
//!
//! * [`OrderStore`]: the persistent order collection (create, patch, fetch, and
//!   subscribe-to-changes).
//! * [`PaymentGateway`]: the hosted payment processor (authorize-only holds, client-side
//!   confirmation, and capture/release settlement).
//! * [`NotificationSurface`]: platform push delivery (background) and the in-page alert
//!   primitive (foreground).
//! * [`MerchantResolver`]: resolution of a human-facing identifier (slug or raw id) to a
//!   canonical merchant id.

mod merchant_resolver;
mod notifications;
mod order_store;
mod payment_gateway;

pub use merchant_resolver::{MerchantId, MerchantResolver, ResolveError};
pub use notifications::{LocalNotification, NotificationData, NotificationSurface, NotifyError, OrderEventKind};
pub use order_store::{OrderPatch, OrderStore, OrderStoreError, OrderSubscription};
pub use payment_gateway::{GatewayError, PaymentAuthorization, PaymentGateway, SettlementAction};
