//! HTTP API: the till's screens as JSON routes plus a live SSE feed.

pub mod app;
pub mod context;
pub mod middleware;
