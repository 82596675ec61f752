//! Reconciles a notification-originated navigation action against the asynchronous
//! arrival of merchant resolution, authentication state, and order data.
//!
//! A notification click deep-links into the catalog page carrying an "approve" action,
//! but the action can only fire once the merchant id has resolved, the customer's
//! authentication state is known, and the awaiting-approval orders have synced. Those
//! inputs arrive in any order; this is an idempotent convergence re-evaluated on every
//! update, guarded by an explicit `Idle → Latched → Fired` one-shot latch rather than
//! mutable flags scattered across call sites.

use log::*;

use crate::{order_types::OrderId, traits::MerchantId};

/// The in-app action carried by a deep link's query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeepLinkAction {
    /// Open the approval dialog for the orders awaiting approval.
    ApproveOrder,
}

impl DeepLinkAction {
    /// Parses the action query parameter, e.g. `?action=approve`.
    pub fn from_query_value(value: &str) -> Option<Self> {
        match value {
            "approve" => Some(Self::ApproveOrder),
            _ => None,
        }
    }
}

/// The one-shot latch. `Latched` means an action is pending but its inputs have not all
/// arrived; `Fired` is terminal for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    Idle,
    Latched,
    Fired,
}

/// What the caller should do after an input update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Keep waiting; more inputs are needed before the action can fire.
    Pending,
    /// Open the approval dialog for these orders, then clear the action from the URL so
    /// a refresh does not refire it.
    FireApproval(Vec<OrderId>),
    /// Nothing to do: no action is pending, or it has already fired.
    Done,
}

#[derive(Debug, Default)]
pub struct DeepLinkResolver {
    latch: Latch,
    merchant: Option<MerchantId>,
    auth_resolved: bool,
    customer_id: Option<String>,
    awaiting: Vec<OrderId>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Latch {
    #[default]
    Idle,
    Latched(DeepLinkAction),
    Fired,
}

impl DeepLinkResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// An action was found in the URL at page load (or on a late navigation event).
    pub fn action_from_url(&mut self, action: DeepLinkAction) -> Resolution {
        if self.latch == Latch::Fired {
            return Resolution::Done;
        }
        trace!("🔗️ Deep-link action {action:?} latched");
        self.latch = Latch::Latched(action);
        self.evaluate()
    }

    /// The identifier-to-merchant resolution completed.
    pub fn merchant_resolved(&mut self, merchant: MerchantId) -> Resolution {
        self.merchant = Some(merchant);
        self.evaluate()
    }

    /// The authentication state arrived: `Some` for a signed-in customer, `None` for
    /// signed out. A signed-out customer keeps the action latched; a later sign-in event
    /// re-evaluates.
    pub fn auth_resolved(&mut self, customer_id: Option<String>) -> Resolution {
        self.auth_resolved = true;
        self.customer_id = customer_id;
        self.evaluate()
    }

    /// The awaiting-approval view changed. An empty set keeps the action latched: the
    /// order data has not synced yet.
    pub fn awaiting_orders_changed(&mut self, ids: Vec<OrderId>) -> Resolution {
        self.awaiting = ids;
        self.evaluate()
    }

    /// Re-evaluates the convergence. Fires at most once per session.
    fn evaluate(&mut self) -> Resolution {
        match self.latch {
            Latch::Fired => Resolution::Done,
            Latch::Idle => Resolution::Pending,
            Latch::Latched(_) => {
                if self.merchant.is_none() || !self.auth_resolved || self.customer_id.is_none() {
                    return Resolution::Pending;
                }
                if self.awaiting.is_empty() {
                    return Resolution::Pending;
                }
                self.latch = Latch::Fired;
                debug!("🔗️ Deep-link approval firing for {} awaiting order(s)", self.awaiting.len());
                Resolution::FireApproval(self.awaiting.clone())
            },
        }
    }

    pub fn state(&self) -> ResolverState {
        match self.latch {
            Latch::Idle => ResolverState::Idle,
            Latch::Latched(_) => ResolverState::Latched,
            Latch::Fired => ResolverState::Fired,
        }
    }

    /// Discards all latched state. Called when the customer navigates away.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
