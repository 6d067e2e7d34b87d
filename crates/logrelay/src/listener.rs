// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! UDP server receiving game-server log lines.
//!
//! The receive loop owns nothing but the socket. Every datagram is handed to its own spawned
//! task, which runs the [`EventPipeline`] and echoes the reply to the sender over the same
//! socket. Tasks are unsupervised and unbounded; a slow admin API only delays its own task.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace};

use crate::errors::{ListenerError, ReplyError};
use crate::pipeline::EventPipeline;

/// Receive buffer size. Longer datagrams are truncated.
pub const BUFFER_SIZE: usize = 1024;

/// Configuration for the UDP listener
pub struct ListenerConfig {
    /// Host to bind UDP socket to (e.g., "0.0.0.0")
    pub host: String,
    /// Port to bind UDP socket to (e.g., 5001), 0 for an ephemeral port
    pub port: u16,
}

/// UDP server to receive, classify, and relay log lines.
pub struct LogListener {
    cancel_token: CancellationToken,
    socket: Arc<UdpSocket>,
    pipeline: EventPipeline,
}

impl LogListener {
    /// Binds the UDP socket. Failing to bind is fatal for the service.
    pub async fn new(
        config: &ListenerConfig,
        pipeline: EventPipeline,
        cancel_token: CancellationToken,
    ) -> Result<LogListener, ListenerError> {
        let addr = format!("{}:{}", config.host, config.port);
        let socket = UdpSocket::bind(&addr)
            .await
            .map_err(|source| ListenerError::Bind { addr, source })?;

        Ok(LogListener {
            cancel_token,
            socket: Arc::new(socket),
            pipeline,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ListenerError> {
        self.socket.local_addr().map_err(ListenerError::LocalAddr)
    }

    /// Main loop: receives datagrams until the cancel token fires.
    pub async fn spin(self) {
        loop {
            tokio::select! {
                _ = self.cancel_token.cancelled() => break,
                _ = self.consume_datagram() => {}
            }
        }
        debug!("Listener stopped");
    }

    /// Receives one datagram and spawns its handler. Read errors are logged and skipped.
    async fn consume_datagram(&self) {
        let mut buf = [0; BUFFER_SIZE];
        match self.socket.recv_from(&mut buf).await {
            Ok((amt, src)) => {
                let payload = buf[..amt].to_vec();
                trace!(
                    "Received {} from {}: {}",
                    amt,
                    src,
                    String::from_utf8_lossy(&payload)
                );
                tokio::spawn(handle_datagram(
                    self.pipeline.clone(),
                    Arc::clone(&self.socket),
                    payload,
                    src,
                ));
            }
            Err(e) => {
                error!("Read error: {}", e);
            }
        }
    }
}

/// Processes one datagram and echoes the outcome to its sender.
async fn handle_datagram(
    pipeline: EventPipeline,
    socket: Arc<UdpSocket>,
    payload: Vec<u8>,
    src: SocketAddr,
) {
    let reply = pipeline.process(&payload).await;
    if let Err(e) = send_reply(&socket, &reply, src).await {
        error!("{}", e);
    }
}

async fn send_reply(socket: &UdpSocket, reply: &[u8], addr: SocketAddr) -> Result<(), ReplyError> {
    socket
        .send_to(reply, addr)
        .await
        .map(|_| ())
        .map_err(|source| ReplyError { addr, source })
}
