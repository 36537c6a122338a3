//! MCP (Model Context Protocol) server implementation
//!
//! This module provides an MCP server that exposes the KEGG, Gene Ontology,
//! UniProt and weather queries as tools for MCP clients.

pub mod handlers;
pub mod protocol;
pub mod server;
pub mod tools;

pub use protocol::*;
pub use server::{McpServer, PROTOCOL_VERSION};
