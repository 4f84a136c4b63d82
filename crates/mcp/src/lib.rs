// MCP surface of the Smartlead gateway: protocol types, the tool catalog,
// the upstream adapters and the stdio transport.

pub mod adapter;
pub mod bootstrap;
pub mod protocol;
pub mod server;
pub mod tools;

pub use adapter::{RestAdapter, WorkflowAdapter};
pub use bootstrap::{build_router, build_server, init_tracing};
pub use server::McpServer;
