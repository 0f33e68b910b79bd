//! HTTP API and graph viewer

pub mod handler;
pub mod server;

pub use server::{build_router, AppState, HttpServer};
