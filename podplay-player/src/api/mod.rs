//! HTTP API for the podplay player
//!
//! REST control endpoints under `/api/v1` plus an SSE event stream.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{create_router, run, AppContext};
