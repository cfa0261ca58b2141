//! JSON-RPC Server
//!
//! JSON-RPC 2.0 over HTTP on TCP. The handler is the module context, so
//! every method callback receives it as `Arc<RpcHandler>`.

use crate::error::invalid_params;
use crate::handler::RpcHandler;
use crate::types::{
    CallNextRequest, MaintenanceRequest, QueueCreateRequest, QueueIdRequest, QueueListRequest,
    QueueUpdateRequest, StatsRequest, TicketIdRequest, TicketIssueRequest,
};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::{ErrorObjectOwned, Params};
use jsonrpsee::RpcModule;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::net::SocketAddr;
use thiserror::Error;
use tracing::info;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9527;

/// RPC Server Configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

#[derive(Error, Debug)]
pub enum RpcServerError {
    #[error("failed to bind JSON-RPC server on {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("failed to register method {method}: {reason}")]
    Register { method: &'static str, reason: String },
}

/// Decode method params; malformed or out-of-range fields are validation errors
fn parse_params<T: DeserializeOwned>(params: &Params<'_>) -> Result<T, ErrorObjectOwned> {
    params.parse().map_err(invalid_params)
}

/// Register `$method`, parsing params into `$req` and calling `$call`
macro_rules! method {
    ($module:expr, $method:literal, $req:ty, $call:ident) => {
        $module
            .register_async_method($method, |params, handler, _| async move {
                let req: $req = parse_params(&params)?;
                handler.$call(req).await
            })
            .map_err(|e| RpcServerError::Register {
                method: $method,
                reason: e.to_string(),
            })?;
    };
    // Params object may be omitted entirely
    ($module:expr, $method:literal, optional $req:ty, $call:ident) => {
        $module
            .register_async_method($method, |params, handler, _| async move {
                let req: Option<$req> = parse_params(&params)?;
                handler.$call(req.unwrap_or_default()).await
            })
            .map_err(|e| RpcServerError::Register {
                method: $method,
                reason: e.to_string(),
            })?;
    };
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: RpcHandler,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, handler: RpcHandler) -> Self {
        Self { config, handler }
    }

    fn into_module(self) -> Result<RpcModule<RpcHandler>, RpcServerError> {
        let mut module = RpcModule::new(self.handler);

        method!(module, "queue.create.v1", QueueCreateRequest, create_queue);
        method!(module, "queue.list.v1", optional QueueListRequest, list_queues);
        method!(module, "queue.get.v1", QueueIdRequest, get_queue);
        method!(module, "queue.update.v1", QueueUpdateRequest, update_queue);
        method!(module, "queue.delete.v1", QueueIdRequest, delete_queue);

        method!(module, "ticket.issue.v1", TicketIssueRequest, issue_ticket);
        method!(module, "ticket.status.v1", TicketIdRequest, ticket_status);
        method!(module, "ticket.call_next.v1", CallNextRequest, call_next);
        method!(module, "ticket.complete.v1", TicketIdRequest, complete);
        method!(module, "ticket.cancel.v1", TicketIdRequest, cancel);
        method!(module, "ticket.no_show.v1", TicketIdRequest, no_show);

        method!(module, "admin.stats.v1", optional StatsRequest, stats);
        method!(module, "admin.maintenance.v1", optional MaintenanceRequest, maintenance);

        Ok(module)
    }

    /// Bind and start serving; returns the bound address (useful with port 0)
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), RpcServerError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|source| RpcServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = server
            .local_addr()
            .map_err(|source| RpcServerError::Bind { addr, source })?;

        let module = self.into_module()?;
        let methods = module.method_names().count();
        let handle = server.start(module);

        info!(addr = %local_addr, methods = methods, "JSON-RPC server started");
        Ok((local_addr, handle))
    }
}
