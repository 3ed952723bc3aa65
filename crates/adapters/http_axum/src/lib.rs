//! # hapdemo-adapter-http-axum
//!
//! Accessory protocol server built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **accessory endpoints** (`/accessories`, `/characteristics`,
//!   `/identify`, `/pair-setup`, `/pairings`) with HAP-shaped JSON bodies
//!   and per-characteristic status codes
//! - Stream characteristic changes to paired controllers over SSE (`/events`)
//! - Authenticate callers against the stored pairings
//! - Run until a [`ShutdownToken`](hapdemo_app::lifecycle::ShutdownToken) is
//!   cancelled, then drain in-flight requests within a bounded window
//!
//! ## Dependency rule
//! Depends on `hapdemo-app` (for port traits and services) and
//! `hapdemo-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod server;
pub mod state;

pub use server::{HapServer, ServerError};

#[cfg(test)]
pub(crate) mod testing;
