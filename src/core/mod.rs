/// Core Server Framework Module
///
/// This module contains the core server implementation including:
/// - server.rs: MCP server implementation with HTTP and STDIO transport
/// - config.rs: Environment-driven configuration

pub mod config;
pub mod server;
