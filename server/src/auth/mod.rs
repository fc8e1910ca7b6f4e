//! Authentication and access-probe endpoints.

pub mod handler;

// vim: ts=4
