//! TCP line server
//!
//! Speaks the line protocol over TCP. Every connection is greeted with
//! `READY`, then gets exactly one response line per non-blank request line.
//! All connections share one queue through the `QueueHandle`. Shutdown
//! stops accepting and ends every open session, so the handles they hold
//! are dropped with them.

use crate::application::service::QueueHandle;
use futures::{SinkExt, StreamExt};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};

/// Greeting sent when a session starts.
pub const READY: &str = "READY";

/// Accepts connections until `shutdown` resolves, then aborts the open
/// sessions and waits for them to finish.
pub async fn run_server(
    listener: TcpListener,
    handle: QueueHandle,
    max_line_length: usize,
    shutdown: impl Future<Output = ()>,
) -> std::io::Result<()> {
    tracing::info!("line server listening on {}", listener.local_addr()?);
    tokio::pin!(shutdown);
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::warn!("accept failed: {}", e);
                        continue;
                    }
                };
                tracing::info!("accepted connection from {}", peer);
                let handle = handle.clone();
                connections.spawn(async move {
                    if let Err(e) = handle_connection(stream, peer, handle, max_line_length).await {
                        tracing::warn!("connection {} closed with error: {}", peer, e);
                    }
                });
            }
            // 回收已结束的连接任务
            Some(_) = connections.join_next() => {}
            _ = &mut shutdown => {
                tracing::info!(open = connections.len(), "line server shutting down");
                connections.shutdown().await;
                return Ok(());
            }
        }
    }
}

// 处理单个客户端连接
async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    handle: QueueHandle,
    max_line_length: usize,
) -> Result<(), LinesCodecError> {
    let mut framed = Framed::new(stream, LinesCodec::new_with_max_length(max_line_length));
    framed.send(READY).await?;

    while let Some(line) = framed.next().await {
        let line = line?;
        let response = match handle.handle_line(line).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("dropping connection {}: {}", peer, e);
                break;
            }
        };
        if let Some(response) = response {
            framed.send(response).await?;
        }
    }

    tracing::info!("connection {} closed", peer);
    Ok(())
}
