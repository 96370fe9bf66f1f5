//! core
//!
//! Core domain types and state for the harness.
//!
//! # Modules
//!
//! - [`types`] - Strong types: InstanceName, Kind
//! - [`registry`] - Slot tables owning every live container
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Every reference is validated before anything is allocated
//! - Schemas are strict and self-describing

pub mod config;
pub mod registry;
pub mod types;
