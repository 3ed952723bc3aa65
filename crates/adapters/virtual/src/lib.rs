//! # hapdemo-adapter-virtual
//!
//! Virtual/demo accessory exposed by the daemon.
//!
//! ## Provided accessories
//!
//! | Accessory | Services | Behaviour |
//! |-----------|----------|-----------|
//! | Virtual Switch | Switch (`On`) | Logs `Switch is on` / `Switch is off` on remote writes, `Identify requested` on identify |
//!
//! ## Dependency rule
//!
//! Depends on `hapdemo-app` (event bus, shutdown token) and `hapdemo-domain` only.

pub mod switch;

pub use switch::{SwitchAction, SwitchListener, VirtualSwitch};
