//! Binary Ninja MCP tool surface.
//!
//! Request schemas live in `schemas`, the tool router and per-tool handlers in `dispatch`.

mod dispatch;
mod schemas;

pub use dispatch::BinjaBridgeService;
