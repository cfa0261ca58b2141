//! JSON-RPC API Layer
//!
//! JSON-RPC 2.0 command surface for SmartQ: queue administration, ticket
//! issuance, agent actions and admin endpoints.

pub mod error;
pub mod handler;
pub mod rate_limiter;
pub mod server;
pub mod types;

pub use handler::{RpcHandler, RpcServices};
pub use rate_limiter::{RateLimitConfig, RateLimiter};
pub use server::{RpcServer, RpcServerConfig, RpcServerError};

pub use jsonrpsee::server::ServerHandle;
