//! HTTP request handlers.

pub mod tenants;
