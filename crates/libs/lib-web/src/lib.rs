//! # Web Library
//!
//! HTTP server, middleware, and handlers of the EcoBot API.

pub mod handlers;
pub mod middleware;
pub mod server;

pub use server::{create_router, start_server, AppState, ServerConfig};
