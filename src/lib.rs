//! Marquee - streaming catalog service
//!
//! This library crate exposes the configuration and HTTP server for the
//! binary and for integration testing.

pub mod config;
pub mod seed;
pub mod server;
