//! # hapdemo-domain
//!
//! Pure domain model for the hapdemo accessory server.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions
//! - Define **Accessories** (devices exposed to controllers)
//! - Define **Services** and **Characteristics** (the controllable properties
//!   of an accessory, with their formats and permissions)
//! - Define protocol **status codes** returned per characteristic
//! - Define **Pairings** and the pairing code
//! - Define **Events** (characteristic change records)
//! - Define the persistent **server identity**
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod accessory;
pub mod characteristic;
pub mod event;
pub mod identity;
pub mod pairing;
pub mod service;
pub mod status;
