//! Regscope MCP Server
//!
//! Model Context Protocol server exposing the regulatory catalog, local
//! extract search and the research workflow to AI assistants.

pub mod protocol;
mod resources;
mod server;
pub mod tools;

pub use server::{start_server, McpServer};
