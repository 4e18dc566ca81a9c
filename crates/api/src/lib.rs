//! HTTP transport boundary: server wiring, request validation and
//! response mapping around the auth core.

pub mod app;
pub mod config;
pub mod middleware;
