//! WebSocket accept loop and per-connection tasks
//!
//! Each connection gets a reader loop (subscription requests) and a writer
//! task draining its bounded outbox. On disconnect the hub forgets the
//! connection before the writer is torn down.

use crate::connection::WsSubscriber;
use crate::protocol::parse_client_message;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use smartq_core::application::BroadcastHub;
use smartq_core::port::ConnectionId;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// How long a closing connection may take to flush its outbox
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WsGatewayConfig {
    pub host: String,
    pub port: u16,
    /// Frames buffered per connection before events are dropped
    pub outbound_buffer: usize,
}

impl Default for WsGatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9528,
            outbound_buffer: 64,
        }
    }
}

#[derive(Error, Debug)]
pub enum WsError {
    #[error("failed to bind WebSocket gateway on {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
}

pub struct WsGateway {
    listener: TcpListener,
    hub: Arc<BroadcastHub>,
    outbound_buffer: usize,
    next_id: AtomicU64,
}

impl WsGateway {
    pub async fn bind(config: &WsGatewayConfig, hub: Arc<BroadcastHub>) -> Result<Self, WsError> {
        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| WsError::Bind { addr, source })?;

        Ok(Self {
            listener,
            hub,
            outbound_buffer: config.outbound_buffer,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until `shutdown` flips
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        match self.local_addr() {
            Ok(addr) => info!(addr = %addr, "WebSocket gateway listening"),
            Err(e) => warn!(error = %e, "WebSocket gateway listening on unknown address"),
        }

        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                        tokio::spawn(serve_connection(
                            stream,
                            peer,
                            id,
                            Arc::clone(&self.hub),
                            self.outbound_buffer,
                            shutdown.clone(),
                        ));
                    }
                    Err(e) => warn!(error = %e, "Failed to accept TCP connection"),
                },
                _ = shutdown.changed() => {
                    info!("WebSocket gateway stopped");
                    return;
                }
            }
        }
    }
}

async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    id: ConnectionId,
    hub: Arc<BroadcastHub>,
    outbound_buffer: usize,
    mut shutdown: watch::Receiver<bool>,
) {
    let ws = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!(peer = %peer, error = %e, "WebSocket handshake failed");
            return;
        }
    };
    debug!(connection_id = id, peer = %peer, "WebSocket connected");

    let (mut sink, mut incoming) = ws.split();
    let (subscriber, outbox) = WsSubscriber::channel(id, outbound_buffer);

    let writer = tokio::spawn(async move {
        let mut outbox: mpsc::Receiver<Arc<str>> = outbox;
        while let Some(frame) = outbox.recv().await {
            if sink.send(Message::Text(frame.to_string())).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    loop {
        tokio::select! {
            message = incoming.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    let Some(request) = parse_client_message(&text) else {
                        continue;
                    };
                    let ack = match serde_json::to_string(&request.ack()) {
                        Ok(ack) => ack,
                        Err(e) => {
                            warn!(error = %e, "Failed to serialize subscription ack");
                            continue;
                        }
                    };
                    // Queue the ack before registering so no event can overtake it
                    if subscriber.send_reliable(Arc::from(ack)).await.is_err() {
                        break;
                    }
                    let topic = request.topic();
                    hub.subscribe(subscriber.clone(), topic.clone());
                    debug!(connection_id = id, topic = %topic, "Subscribed");
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(connection_id = id, error = %e, "WebSocket read failed");
                    break;
                }
            },
            _ = shutdown.changed() => break,
        }
    }

    let removed = hub.on_disconnect(id);
    drop(subscriber);
    let mut writer = writer;
    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer).await.is_err() {
        writer.abort();
        debug!(connection_id = id, "Writer did not drain before timeout");
    }
    debug!(connection_id = id, topics = removed, "WebSocket disconnected");
}
