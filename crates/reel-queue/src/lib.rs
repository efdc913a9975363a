//! Redis FIFO job queue.
//!
//! This crate provides:
//! - The producer push (API side, after the catalog row is durable)
//! - The blocking consumer pop with a bounded timeout (worker side)
//!
//! Delivery is at-least-once; the catalog's guarded lease transition is
//! what makes duplicates safe.

pub mod error;
pub mod queue;

pub use error::{QueueError, QueueResult};
pub use queue::{JobQueue, QueueConfig};
