use std::env;

use log::*;
use onl_common::parse_boolean_flag;

pub const DEFAULT_BUFFER_FRACTION: f64 = 0.10;
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 25;
pub const DEFAULT_FALLBACK_NOTIFICATION_TAG: &str = "onl-general";

#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// The extra fraction above order total held at authorization time, to cover
    /// substitution-driven cost increases without re-authorization.
    pub buffer_fraction: f64,
    /// Channel depth for the event hook handlers.
    pub event_buffer_size: usize,
    /// Dedup tag used for notifications that do not name a specific order.
    pub fallback_notification_tag: String,
    /// When true, a foreground delivery also raises a browser-level alert in addition to
    /// the in-page one.
    pub browser_alerts_in_foreground: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            buffer_fraction: DEFAULT_BUFFER_FRACTION,
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
            fallback_notification_tag: DEFAULT_FALLBACK_NOTIFICATION_TAG.to_string(),
            browser_alerts_in_foreground: false,
        }
    }
}

impl EngineConfig {
    pub fn from_env_or_default() -> Self {
        let buffer_fraction = env::var("ONL_BUFFER_FRACTION")
            .map(|s| {
                s.parse::<f64>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid value for ONL_BUFFER_FRACTION. {e} Using the default, \
                         {DEFAULT_BUFFER_FRACTION}, instead."
                    );
                    DEFAULT_BUFFER_FRACTION
                })
            })
            .ok()
            .unwrap_or(DEFAULT_BUFFER_FRACTION);
        let event_buffer_size = env::var("ONL_EVENT_BUFFER_SIZE")
            .map(|s| {
                s.parse::<usize>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid value for ONL_EVENT_BUFFER_SIZE. {e} Using the default, \
                         {DEFAULT_EVENT_BUFFER_SIZE}, instead."
                    );
                    DEFAULT_EVENT_BUFFER_SIZE
                })
            })
            .ok()
            .unwrap_or(DEFAULT_EVENT_BUFFER_SIZE);
        let fallback_notification_tag = env::var("ONL_FALLBACK_NOTIFICATION_TAG")
            .ok()
            .unwrap_or_else(|| DEFAULT_FALLBACK_NOTIFICATION_TAG.to_string());
        let browser_alerts_in_foreground =
            parse_boolean_flag(env::var("ONL_FOREGROUND_BROWSER_ALERTS").ok(), false);
        Self { buffer_fraction, event_buffer_size, fallback_notification_tag, browser_alerts_in_foreground }
    }
}
