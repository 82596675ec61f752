use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::events::{EventHandler, EventProducer, Handler, OrderAwaitingApprovalEvent, OrderCompletedEvent};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub awaiting_approval_producer: Vec<EventProducer<OrderAwaitingApprovalEvent>>,
    pub order_completed_producer: Vec<EventProducer<OrderCompletedEvent>>,
}

pub struct EventHandlers {
    pub on_order_awaiting_approval: Option<EventHandler<OrderAwaitingApprovalEvent>>,
    pub on_order_completed: Option<EventHandler<OrderCompletedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_order_awaiting_approval = hooks.on_order_awaiting_approval.map(|f| EventHandler::new(buffer_size, f));
        let on_order_completed = hooks.on_order_completed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_order_awaiting_approval, on_order_completed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_order_awaiting_approval {
            result.awaiting_approval_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_order_completed {
            result.order_completed_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_order_awaiting_approval {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_order_completed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_order_awaiting_approval: Option<Handler<OrderAwaitingApprovalEvent>>,
    pub on_order_completed: Option<Handler<OrderCompletedEvent>>,
}

impl EventHooks {
    pub fn on_order_awaiting_approval<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderAwaitingApprovalEvent) -> BoxFuture<'static, ()>) + Send + Sync + 'static {
        self.on_order_awaiting_approval = Some(Arc::new(f));
        self
    }

    pub fn on_order_completed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderCompletedEvent) -> BoxFuture<'static, ()>) + Send + Sync + 'static {
        self.on_order_completed = Some(Arc::new(f));
        self
    }
}
