//! Shared types, adapter traits, and core utilities for the Civiroll platform.
//!
//! This crate contains the foundational types that are shared between the
//! server crate, the RBAC core, and all adapter implementations. Extracting
//! these into a separate crate allows adapter crates to compile in parallel
//! with the core and server crates.

pub mod directory_adapter;
pub mod error;
pub mod prelude;
pub mod rbac;
pub mod types;

// vim: ts=4
