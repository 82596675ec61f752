//! # Realtime reconciliation
//!
//! One multiplexed subscription backs the customer's three live order views: pending,
//! awaiting approval, and approved. Every snapshot from the store is partitioned by
//! status and diffed against the previous observation so that user-facing effects fire
//! exactly once, on transitions *into* a state, never on steady-state presence.
//!
//! The first snapshot of a session establishes a baseline and fires nothing: an order
//! that was already awaiting approval when the page loaded must not notify again.

mod engine;

pub use engine::{OrderPartitions, ReconcileEvent, ReconciliationEngine};
