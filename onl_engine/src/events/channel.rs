//! Simple stateless pub-sub event handler.
//!
//! This module provides the hook plumbing that lets consumers of the engine subscribe to
//! order lifecycle events and react to them. The handler is stateless: subscribers have
//! no access to engine internals, only to the event itself. Handlers may be async.

use std::sync::{atomic::AtomicI64, Arc};

use futures_util::future::BoxFuture;
use log::*;
use tokio::sync::mpsc;

pub type Handler<E> = Arc<dyn Fn(E) -> BoxFuture<'static, ()> + Send + Sync>;

pub struct EventHandler<E: Send + Sync + 'static> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size);
        Self { listener: receiver, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    pub async fn start_handler(mut self) {
        debug!("📬️ Starting event handler");
        // With the internal sender dropped, the channel closes as soon as the last
        // producer goes away and the handler shuts down on its own.
        drop(self.sender);
        let jobs = Arc::new(AtomicI64::new(0));
        while let Some(ev) = self.listener.recv().await {
            trace!("📬️ Handling event");
            let handler = Arc::clone(&self.handler);
            jobs.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            let job = jobs.clone();
            tokio::spawn(async move {
                (handler)(ev).await;
                job.fetch_sub(1, std::sync::atomic::Ordering::Relaxed);
                trace!("📬️ Event handled");
            });
        }
        match tokio::spawn(async move {
            while jobs.load(std::sync::atomic::Ordering::SeqCst) > 0 {
                debug!("📬️ Waiting for in-flight handlers to complete");
                tokio::time::sleep(tokio::time::Duration::from_millis(1000)).await;
            }
        })
        .await
        {
            Ok(_) => {
                debug!("📬️ Event handler shutting down gracefully");
            },
            Err(e) => {
                warn!("📬️ The event handler's drain task panicked: {e}");
            },
        }
        debug!("📬️ Event handler has shut down");
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    pub async fn publish_event(&self, event: E) {
        if let Err(e) = self.sender.send(event).await {
            error!("📬️ Failed to send event: {e}");
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use futures_util::FutureExt;

    use super::*;
    use crate::order_types::OrderNumber;

    #[tokio::test]
    async fn fans_in_from_multiple_producers_and_drains_on_shutdown() {
        let _ = env_logger::try_init();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler = Arc::new(move |number: OrderNumber| {
            let sink = sink.clone();
            async move {
                debug!("Alert raised for order {number}");
                sink.lock().unwrap().push(number.0);
                tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
            }
            .boxed()
        });
        let event_handler = EventHandler::new(1, handler);
        let reconciler = event_handler.subscribe();
        let push_listener = event_handler.subscribe();
        tokio::spawn(async move {
            for n in 0..5 {
                reconciler.publish_event(OrderNumber(format!("ONL-R{n}-0000"))).await;
            }
        });
        tokio::spawn(async move {
            for n in 0..5 {
                push_listener.publish_event(OrderNumber(format!("ONL-P{n}-0000"))).await;
            }
        });

        // Both producers drop when their tasks finish, so the handler drains and stops.
        event_handler.start_handler().await;
        let mut seen = seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen.len(), 10);
        assert!(seen.iter().take(5).all(|n| n.starts_with("ONL-P")));
        assert!(seen.iter().skip(5).all(|n| n.starts_with("ONL-R")));
    }
}
