//! Civiroll is the admin backend of a biometric voter registration platform.
//!
//! # Features
//!
//! - Role based access control
//!		- roles carry a numeric level, level 10 is the super administrator
//!		- fine grained `module.action` permissions attached to roles
//!		- per page access policy for the admin console
//!	- Session tokens minted against an external identity provider
//!	- SQLite backed user/role/permission directory with a seeded catalog
//!	- TTL bounded permission cache, invalidated on role reassignment

#![forbid(unsafe_code)]

pub mod admin;
pub mod auth;
pub mod prelude;
pub mod routes;

pub use civiroll_core::app::{App, AppBuilderOpts, AppState};

// vim: ts=4
