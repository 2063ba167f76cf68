//! # orderflow-core — Foundational Types
//!
//! The leaf crate of the orderflow workspace. It defines the primitives every
//! other crate shares: the order identifier newtype, the UTC-only timestamp,
//! and the error hierarchy.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `orderflow-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod temporal;

pub use error::{ObserverError, OrderflowError};
pub use identity::OrderId;
pub use temporal::Timestamp;
