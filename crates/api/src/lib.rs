//! HTTP API: the request pipeline (encryption, context gate, error translation)
//! and the route modules mounted behind it.

pub mod app;
pub mod config;
pub mod middleware;
