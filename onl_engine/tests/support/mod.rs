#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use onl_common::Money;
use onl_engine::{
    cart::{Cart, CartItem},
    notify::Delivery,
    order_types::{CustomerInfo, Order, OrderId, OrderNumber, OrderStatusType, ShippingAddress, SourceChannel},
    traits::{
        GatewayError, LocalNotification, MerchantId, MerchantResolver, NotificationSurface, NotifyError,
        PaymentAuthorization, PaymentGateway, ResolveError, SettlementAction,
    },
    EngineConfig, MemoryOrderStore, OrderFlowApi,
};

pub fn init_test_env() {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
}

//--------------------------------------    TestGateway        --------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Authorize { order_id: OrderId, amount: Money, buffer_fraction: f64 },
    Confirm,
    Capture { order_id: OrderId, amount: Money },
    Release { order_id: OrderId },
}

#[derive(Default)]
struct GatewayState {
    calls: Vec<GatewayCall>,
    decline_authorization: bool,
    fail_confirmation: bool,
    fail_capture: bool,
    already_released: bool,
}

/// A recording payment gateway with scriptable failure modes.
#[derive(Clone, Default)]
pub struct TestGateway {
    inner: Arc<Mutex<GatewayState>>,
}

impl TestGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decline_authorization(self) -> Self {
        self.inner.lock().unwrap().decline_authorization = true;
        self
    }

    pub fn fail_confirmation(self) -> Self {
        self.inner.lock().unwrap().fail_confirmation = true;
        self
    }

    pub fn fail_capture(self) -> Self {
        self.inner.lock().unwrap().fail_capture = true;
        self
    }

    pub fn report_already_released(self) -> Self {
        self.inner.lock().unwrap().already_released = true;
        self
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner.lock().unwrap().calls.len()
    }
}

impl PaymentGateway for TestGateway {
    async fn create_authorization(
        &self,
        order_id: &OrderId,
        amount: Money,
        buffer_fraction: f64,
        _customer_email: &str,
    ) -> Result<PaymentAuthorization, GatewayError> {
        let mut state = self.inner.lock().unwrap();
        if state.decline_authorization {
            return Err(GatewayError::Declined("card declined".into()));
        }
        state.calls.push(GatewayCall::Authorize { order_id: order_id.clone(), amount, buffer_fraction });
        Ok(PaymentAuthorization {
            client_secret: format!("cs_{}", order_id.as_str()),
            payment_intent_id: format!("pi_{}", order_id.as_str()),
            authorized_amount: amount.buffered(buffer_fraction),
        })
    }

    async fn confirm_client_side(&self, _client_secret: &str) -> Result<(), GatewayError> {
        let mut state = self.inner.lock().unwrap();
        state.calls.push(GatewayCall::Confirm);
        if state.fail_confirmation {
            Err(GatewayError::Declined("3-D-Secure challenge failed".into()))
        } else {
            Ok(())
        }
    }

    async fn capture_or_cancel(&self, order_id: &OrderId, action: SettlementAction) -> Result<(), GatewayError> {
        let mut state = self.inner.lock().unwrap();
        match action {
            SettlementAction::Capture(amount) => {
                if state.fail_capture {
                    return Err(GatewayError::Api("capture rejected".into()));
                }
                state.calls.push(GatewayCall::Capture { order_id: order_id.clone(), amount });
                Ok(())
            },
            SettlementAction::Release => {
                state.calls.push(GatewayCall::Release { order_id: order_id.clone() });
                if state.already_released {
                    Err(GatewayError::AlreadyReleased)
                } else {
                    Ok(())
                }
            },
        }
    }

    async fn calculate_distance(&self, _from: &ShippingAddress, _to: &ShippingAddress) -> Result<f64, GatewayError> {
        Ok(3.2)
    }
}

//-------------------------------------- RecordingNotifications -------------------------------------------------------

/// Captures delivered alerts, mimicking the replace-on-tag dedup of a real surface.
#[derive(Clone, Default)]
pub struct RecordingNotifications {
    inner: Arc<Mutex<NotificationLog>>,
}

#[derive(Default)]
struct NotificationLog {
    delivered: Vec<(Delivery, LocalNotification)>,
    by_tag: HashMap<String, LocalNotification>,
}

impl RecordingNotifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<(Delivery, LocalNotification)> {
        self.inner.lock().unwrap().delivered.clone()
    }

    /// The visible alerts after replace-on-tag dedup.
    pub fn visible(&self) -> Vec<LocalNotification> {
        self.inner.lock().unwrap().by_tag.values().cloned().collect()
    }
}

impl NotificationSurface for RecordingNotifications {
    fn is_available(&self) -> bool {
        true
    }

    fn permission_granted(&self) -> bool {
        true
    }

    async fn push_background(&self, notification: &LocalNotification) -> Result<(), NotifyError> {
        let mut log = self.inner.lock().unwrap();
        log.delivered.push((Delivery::Background, notification.clone()));
        log.by_tag.insert(notification.tag.clone(), notification.clone());
        Ok(())
    }

    async fn alert_foreground(&self, notification: &LocalNotification) -> Result<(), NotifyError> {
        let mut log = self.inner.lock().unwrap();
        log.delivered.push((Delivery::Foreground, notification.clone()));
        log.by_tag.insert(notification.tag.clone(), notification.clone());
        Ok(())
    }
}

//--------------------------------------   StaticResolver      --------------------------------------------------------

#[derive(Clone, Default)]
pub struct StaticResolver {
    merchants: HashMap<String, String>,
}

impl StaticResolver {
    pub fn with(slug: &str, merchant_id: &str) -> Self {
        let mut merchants = HashMap::new();
        merchants.insert(slug.to_string(), merchant_id.to_string());
        Self { merchants }
    }
}

impl MerchantResolver for StaticResolver {
    async fn resolve(&self, slug_or_id: &str) -> Result<MerchantId, ResolveError> {
        self.merchants
            .get(slug_or_id)
            .map(|id| MerchantId(id.clone()))
            .ok_or_else(|| ResolveError::NotFound(slug_or_id.to_string()))
    }
}

//--------------------------------------      Fixtures         --------------------------------------------------------

/// A bare order in the given status, for driving the reconciliation engine directly.
pub fn order_in(id: &str, number: &str, status: OrderStatusType) -> Order {
    let now = chrono::Utc::now();
    Order {
        id: OrderId(id.to_string()),
        order_number: OrderNumber(number.to_string()),
        customer: customer(),
        shipping_address: Some(address()),
        items: Vec::new(),
        subtotal: Money::from_cents(750),
        total: Money::from_cents(750),
        original_total: None,
        status,
        payment_intent_id: None,
        authorized_amount: None,
        source: SourceChannel::Online,
        cancellation_reason: None,
        created_at: now,
        updated_at: now,
        authorized_at: None,
        paid_at: None,
        cancelled_at: None,
    }
}

pub fn chips_cart() -> Cart {
    let mut cart = Cart::new();
    cart.add(
        CartItem { item_id: "chips".into(), name: "Chips".into(), unit_price: Money::from_cents(250), category: None },
        3,
    );
    cart
}

pub fn customer() -> CustomerInfo {
    CustomerInfo {
        customer_id: "cust-1".into(),
        name: "Alice Example".into(),
        email: "alice@example.com".into(),
        phone: Some("+1 555 0100".into()),
    }
}

pub fn address() -> ShippingAddress {
    ShippingAddress {
        street: "12 Foundry Lane".into(),
        suburb: None,
        city: "Springfield".into(),
        postal_code: "0137".into(),
    }
}

pub fn flow() -> (OrderFlowApi<MemoryOrderStore, TestGateway>, MemoryOrderStore, TestGateway) {
    let store = MemoryOrderStore::new();
    let gateway = TestGateway::new();
    let api = OrderFlowApi::new(store.clone(), gateway.clone(), EngineConfig::default());
    (api, store, gateway)
}

pub fn flow_with_gateway(gateway: TestGateway) -> (OrderFlowApi<MemoryOrderStore, TestGateway>, MemoryOrderStore) {
    let store = MemoryOrderStore::new();
    let api = OrderFlowApi::new(store.clone(), gateway, EngineConfig::default());
    (api, store)
}
