//! Administrative endpoints: role/permission catalog and user management.

pub mod handler;

// vim: ts=4
