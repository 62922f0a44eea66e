//! carta library crate.
//!
//! Exposes the catalog domain, application services, cache subsystem,
//! configuration and infrastructure layers so integration tests and the
//! binary share one implementation.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
