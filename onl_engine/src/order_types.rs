use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use onl_common::Money;
use serde::{Deserialize, Serialize};
use thiserror::Error;

//--------------------------------------   OrderStatusType     --------------------------------------------------------
/// The closed set of order states. Every transition and display decision matches on this
/// exhaustively, so a new status cannot be introduced without updating every consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatusType {
    /// The order has been created at checkout, but no hold has been placed yet.
    PendingPayment,
    /// Funds are on hold and the order is visible to the merchant.
    Pending,
    /// The merchant has picked the order, possibly with substitutions, and is waiting on
    /// the customer to approve.
    AwaitingApproval,
    /// The customer approved and the payment was captured.
    Approved,
    /// Terminal. The merchant marked the order fulfilled.
    Completed,
    /// Terminal. The order was cancelled by the customer, or abandoned at payment.
    Cancelled,
}

impl OrderStatusType {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatusType::Completed | OrderStatusType::Cancelled)
    }

    /// True for the statuses that appear in the customer's live order views.
    pub fn is_active(&self) -> bool {
        matches!(self, OrderStatusType::Pending | OrderStatusType::AwaitingApproval | OrderStatusType::Approved)
    }

    /// The order transition table.
    ///
    /// | From \ To        | Pending | AwaitingApproval | Approved | Completed | Cancelled |
    /// |------------------|---------|------------------|----------|-----------|-----------|
    /// | PendingPayment   | ✓       |                  |          |           | ✓         |
    /// | Pending          |         | ✓                |          |           | ✓         |
    /// | AwaitingApproval |         |                  | ✓        |           | ✓         |
    /// | Approved         |         |                  |          | ✓         |           |
    /// | Completed        |         |                  |          |           |           |
    /// | Cancelled        |         |                  |          |           |           |
    ///
    /// Transitions into `AwaitingApproval` and `Completed` are effected by the merchant
    /// fulfilment surface. They are validated here but never driven by this engine.
    pub fn can_transition_to(&self, next: OrderStatusType) -> bool {
        use OrderStatusType::*;
        match (self, next) {
            (PendingPayment, Pending) => true,
            (PendingPayment, Cancelled) => true,
            (Pending, AwaitingApproval) => true,
            (Pending, Cancelled) => true,
            (AwaitingApproval, Approved) => true,
            (AwaitingApproval, Cancelled) => true,
            (Approved, Completed) => true,
            (_, _) => false,
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::PendingPayment => write!(f, "pending_payment"),
            OrderStatusType::Pending => write!(f, "pending"),
            OrderStatusType::AwaitingApproval => write!(f, "awaiting_approval"),
            OrderStatusType::Approved => write!(f, "approved"),
            OrderStatusType::Completed => write!(f, "completed"),
            OrderStatusType::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct StatusConversionError(String);

impl FromStr for OrderStatusType {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_payment" => Ok(Self::PendingPayment),
            "pending" => Ok(Self::Pending),
            "awaiting_approval" => Ok(Self::AwaitingApproval),
            "approved" => Ok(Self::Approved),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(StatusConversionError(s.to_string())),
        }
    }
}

//--------------------------------------       OrderId         --------------------------------------------------------
/// The store-assigned unique id for an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------     OrderNumber       --------------------------------------------------------
/// The human-facing order number, e.g. `ONL-LX3K9P2M-7Q4B`. Unique with overwhelming
/// probability, but not guaranteed; collisions are not defended against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(pub String);

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl OrderNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------    SourceChannel      --------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceChannel {
    Online,
    InStore,
}

impl Display for SourceChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceChannel::Online => write!(f, "online"),
            SourceChannel::InStore => write!(f, "in_store"),
        }
    }
}

//--------------------------------------   SubstituteLine      --------------------------------------------------------
/// A merchant-side replacement for an ordered line. Its presence supersedes the parent
/// line's value in the effective payable total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstituteLine {
    pub item_id: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub line_total: Money,
}

impl SubstituteLine {
    pub fn new(item_id: impl Into<String>, name: impl Into<String>, unit_price: Money, quantity: u32) -> Self {
        Self {
            item_id: item_id.into(),
            name: name.into(),
            unit_price,
            quantity,
            line_total: unit_price * i64::from(quantity),
        }
    }
}

//--------------------------------------      OrderItem        --------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub item_id: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub line_total: Money,
    pub category: Option<String>,
    /// Whether the customer allows this line to be substituted if the item is unavailable.
    pub allow_substitution: bool,
    /// Substitutes attached by the merchant. When non-empty, the parent line is displayed
    /// as superseded and its value is excluded from the effective total.
    pub substitutes: Vec<SubstituteLine>,
}

impl OrderItem {
    pub fn is_substituted(&self) -> bool {
        !self.substitutes.is_empty()
    }

    /// The payable value of this line: the substitutes' total when substituted, the
    /// original line total otherwise.
    pub fn effective_total(&self) -> Money {
        if self.is_substituted() {
            self.substitutes.iter().map(|s| s.line_total).sum()
        } else {
            self.line_total
        }
    }
}

//--------------------------------------  ShippingAddress      --------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub street: String,
    pub suburb: Option<String>,
    pub city: String,
    pub postal_code: String,
}

impl ShippingAddress {
    pub fn is_complete(&self) -> bool {
        !self.street.trim().is_empty() && !self.city.trim().is_empty() && !self.postal_code.trim().is_empty()
    }
}

impl Display for ShippingAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, ", self.street)?;
        if let Some(suburb) = &self.suburb {
            write!(f, "{suburb}, ")?;
        }
        write!(f, "{} {}", self.city, self.postal_code)
    }
}

//--------------------------------------    CustomerInfo       --------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

//--------------------------------------        Order          --------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub customer: CustomerInfo,
    pub shipping_address: Option<ShippingAddress>,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub total: Money,
    /// The pre-substitution total, recorded by the merchant surface when substitutions
    /// adjust the payable amount.
    pub original_total: Option<Money>,
    pub status: OrderStatusType,
    pub payment_intent_id: Option<String>,
    pub authorized_amount: Option<Money>,
    pub source: SourceChannel,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub authorized_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn has_substitutions(&self) -> bool {
        self.items.iter().any(OrderItem::is_substituted)
    }

    /// The payable total computed from the lines, with substituted lines superseded.
    /// Equal to `total` whenever the merchant surface has kept the order consistent.
    pub fn effective_total(&self) -> Money {
        self.items.iter().map(OrderItem::effective_total).sum()
    }
}

//--------------------------------------      NewOrder         --------------------------------------------------------
/// An order draft as produced by cart checkout, ready for insertion into the order store
/// in `PendingPayment` status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub order_number: OrderNumber,
    pub customer: CustomerInfo,
    pub shipping_address: ShippingAddress,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub total: Money,
    pub source: SourceChannel,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            OrderStatusType::PendingPayment,
            OrderStatusType::Pending,
            OrderStatusType::AwaitingApproval,
            OrderStatusType::Approved,
            OrderStatusType::Completed,
            OrderStatusType::Cancelled,
        ] {
            assert_eq!(status.to_string().parse::<OrderStatusType>().unwrap(), status);
        }
        assert!("paid".parse::<OrderStatusType>().is_err());
    }

    #[test]
    fn transition_table() {
        use OrderStatusType::*;
        assert!(PendingPayment.can_transition_to(Pending));
        assert!(PendingPayment.can_transition_to(Cancelled));
        assert!(Pending.can_transition_to(AwaitingApproval));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(AwaitingApproval.can_transition_to(Approved));
        assert!(AwaitingApproval.can_transition_to(Cancelled));
        assert!(Approved.can_transition_to(Completed));
        // Terminal states go nowhere, and no shortcuts exist.
        for from in [Completed, Cancelled] {
            for to in [PendingPayment, Pending, AwaitingApproval, Approved, Completed, Cancelled] {
                assert!(!from.can_transition_to(to));
            }
        }
        assert!(!PendingPayment.can_transition_to(Approved));
        assert!(!Pending.can_transition_to(Approved));
        assert!(!Approved.can_transition_to(Cancelled));
    }

    #[test]
    fn substituted_line_is_superseded() {
        let mut item = OrderItem {
            item_id: "sku-1".into(),
            name: "Granola".into(),
            unit_price: Money::from_cents(500),
            quantity: 1,
            line_total: Money::from_cents(500),
            category: None,
            allow_substitution: true,
            substitutes: vec![],
        };
        assert_eq!(item.effective_total(), Money::from_cents(500));
        item.substitutes.push(SubstituteLine::new("sku-2", "Muesli", Money::from_cents(600), 1));
        assert_eq!(item.effective_total(), Money::from_cents(600));
    }
}
