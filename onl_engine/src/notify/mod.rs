mod dispatcher;

pub use dispatcher::{register_notification_hooks, Delivery, NotificationDispatcher, VisibilityProbe};
