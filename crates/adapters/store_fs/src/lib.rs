//! # hapdemo-adapter-store-fs
//!
//! Directory-backed persistence adapter.
//!
//! ## Responsibilities
//! - Implement the `KeyValueStore` port defined in `hapdemo-app::ports::store`
//! - Own the store directory: create it on open, refuse anything that is not
//!   a directory
//! - Keep each key in its own file and replace values atomically
//!
//! ## Dependency rule
//! Depends on `hapdemo-app` (for the port trait) and `hapdemo-domain` (for
//! errors). The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod store;

pub use error::StoreError;
pub use store::FsStore;
