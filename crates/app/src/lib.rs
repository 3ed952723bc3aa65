//! # hapdemo-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `KeyValueStore` — durable storage for pairings and server identity
//!   - `EventPublisher` — fan-out of characteristic changes
//! - Provide the **accessory registry** (reads, writes, change events)
//! - Provide the **pairing** and **identity** services on top of the store
//! - Provide **in-process infrastructure** that doesn't need IO: the event
//!   bus and the shutdown token shared by every long-running task
//!
//! ## Dependency rule
//! Depends on `hapdemo-domain` only (plus `tokio::sync` and `tokio-stream` for
//! channels and `chrono` for pairing dates).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod lifecycle;
pub mod ports;
pub mod registry;
pub mod services;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
