// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! RTI server core implementation.

use crate::config::{ConfigError, ServerConfig};
use hrti::{Float64Time, Rti, RtiError};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Notify};
use tracing::{debug, error, info, warn};

pub mod connection;
pub mod protocol;
mod session;

pub use connection::{ConnectionError, FrameReader, FrameWriter};
pub use protocol::{ClientFrame, Reply, Request, ServerFrame};
use session::Session;

/// RTI server: hosts federation executions for remote federates.
#[derive(Clone)]
pub struct RtiServer {
    config: Arc<ServerConfig>,
    rti: Rti<Float64Time>,
    shutdown: Arc<Notify>,
    running: Arc<AtomicBool>,
    connections: Arc<AtomicUsize>,
}

/// What the reader task hands to the connection loop.
enum Inbound {
    Frame(ClientFrame),
    Malformed(String),
}

/// Decrements the connection count when a connection ends.
struct ConnectionSlot(Arc<AtomicUsize>);

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RtiServer {
    /// Create a server and the federation executions listed in `config`.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        config.validate_limits()?;

        let rti = Rti::new(config.rti.clone())?;
        for seed in &config.federations {
            rti.create_federation_execution(&seed.name, &seed.model)?;
            info!("Created federation execution '{}'", seed.name);
        }

        Ok(Self {
            config: Arc::new(config),
            rti,
            shutdown: Arc::new(Notify::new()),
            running: Arc::new(AtomicBool::new(false)),
            connections: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Bind the configured address and serve until [`RtiServer::shutdown`].
    pub async fn run(&self) -> Result<(), ServerError> {
        self.config.validate()?;
        let addr = SocketAddr::new(self.config.bind_address, self.config.port);
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(e.to_string()))?;
        self.serve(listener).await
    }

    /// Serve connections accepted on `listener` until [`RtiServer::shutdown`].
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ServerError::AlreadyRunning);
        }
        if let Ok(addr) = listener.local_addr() {
            info!("RTI server listening on {}", addr);
        }

        let shutdown = self.shutdown.notified();
        tokio::pin!(shutdown);
        shutdown.as_mut().enable();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => self.accept(stream, peer_addr),
                        Err(e) => error!("Accept error: {}", e),
                    }
                }
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn accept(&self, stream: TcpStream, peer_addr: SocketAddr) {
        let active = self.connections.fetch_add(1, Ordering::SeqCst);
        let slot = ConnectionSlot(Arc::clone(&self.connections));
        let config = Arc::clone(&self.config);

        if active >= config.max_connections {
            warn!("Max connections reached, rejecting {}", peer_addr);
            tokio::spawn(async move {
                let (_, write_half) = stream.into_split();
                let mut writer = FrameWriter::new(write_half, config.max_message_size);
                let rejected = ServerFrame::Rejected {
                    message: "Max connections reached".into(),
                };
                if let Err(e) = writer.write_frame(&rejected).await {
                    debug!("Failed to reject {}: {}", peer_addr, e);
                }
                drop(slot);
            });
            return;
        }

        info!("New connection from {}", peer_addr);
        let rti = self.rti.clone();
        let shutdown = Arc::clone(&self.shutdown);
        tokio::spawn(async move {
            if let Err(e) =
                Self::handle_connection(stream, peer_addr, rti, config, shutdown).await
            {
                warn!("Connection error from {}: {}", peer_addr, e);
            }
            drop(slot);
        });
    }

    /// Serve one federate until it disconnects or the server stops.
    async fn handle_connection(
        stream: TcpStream,
        peer_addr: SocketAddr,
        rti: Rti<Float64Time>,
        config: Arc<ServerConfig>,
        shutdown: Arc<Notify>,
    ) -> Result<(), ServerError> {
        let stopping = shutdown.notified();
        tokio::pin!(stopping);
        stopping.as_mut().enable();

        let wake = Arc::new(Notify::new());
        let waker = Arc::clone(&wake);
        let session = Session::open(
            &rti,
            config.disconnect_action,
            Arc::new(move || waker.notify_one()),
        )?;

        let (read_half, write_half) = stream.into_split();
        let mut writer = FrameWriter::new(write_half, config.max_message_size);

        // Reads run in their own task so the loop below never drops a
        // partially read frame.
        let (inbound_tx, mut inbound_rx) = mpsc::channel::<Inbound>(32);
        let reader = tokio::spawn(Self::read_loop(
            FrameReader::new(read_half, config.max_message_size),
            inbound_tx,
            peer_addr,
        ));

        let result = loop {
            tokio::select! {
                inbound = inbound_rx.recv() => {
                    let frame = match inbound {
                        Some(Inbound::Frame(frame)) => {
                            ServerFrame::answer(frame.id, session.execute(frame.request))
                        }
                        Some(Inbound::Malformed(message)) => ServerFrame::Rejected { message },
                        None => {
                            info!("Connection closed: {}", peer_addr);
                            break Ok(());
                        }
                    };
                    match writer.write_frame(&frame).await {
                        Ok(()) => {}
                        Err(e) if e.is_recoverable() => {
                            warn!("Answer to {} not sent: {}", peer_addr, e);
                            let refused = match frame {
                                ServerFrame::Response { id, .. } | ServerFrame::Error { id, .. } => {
                                    let error = RtiError::RtiInternalError(e.to_string());
                                    ServerFrame::answer(id, Err(error))
                                }
                                _ => ServerFrame::Rejected { message: e.to_string() },
                            };
                            if let Err(e) = writer.write_frame(&refused).await {
                                break Err(e.into());
                            }
                        }
                        Err(e) => break Err(e.into()),
                    }
                    // Callbacks may have been re-enabled by the request.
                    if session.pending() > 0 {
                        wake.notify_one();
                    }
                }
                _ = wake.notified() => {
                    let batch = session.drain(config.callback_batch_size);
                    let full = batch.len() == config.callback_batch_size;
                    let mut sent = Ok(());
                    for callback in batch {
                        let name = callback.name();
                        match writer.write_frame(&ServerFrame::Callback { callback }).await {
                            Ok(()) => {}
                            // Nothing was written; the stream stays aligned.
                            Err(e) if e.is_recoverable() => {
                                warn!("Dropped {} callback for {}: {}", name, peer_addr, e);
                            }
                            Err(e) => {
                                sent = Err(e);
                                break;
                            }
                        }
                    }
                    if let Err(e) = sent {
                        break Err(e.into());
                    }
                    if full && session.pending() > 0 {
                        wake.notify_one();
                    }
                }
                _ = &mut stopping => {
                    debug!("Connection handler shutting down: {}", peer_addr);
                    break Ok(());
                }
            }
        };

        reader.abort();
        session.close();
        result
    }

    async fn read_loop(
        mut reader: FrameReader<OwnedReadHalf>,
        inbound: mpsc::Sender<Inbound>,
        peer_addr: SocketAddr,
    ) {
        loop {
            let next = match reader.read_frame::<ClientFrame>().await {
                Ok(Some(frame)) => Inbound::Frame(frame),
                Ok(None) => break,
                Err(e) if e.is_recoverable() => {
                    debug!("Malformed frame from {}: {}", peer_addr, e);
                    Inbound::Malformed(e.to_string())
                }
                Err(e) => {
                    warn!("Read error from {}: {}", peer_addr, e);
                    break;
                }
            };
            if inbound.send(next).await.is_err() {
                break;
            }
        }
    }

    /// Stop accepting connections and close every open one.
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Connections currently open, including ones being rejected.
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// The hosted RTI.
    pub fn rti(&self) -> &Rti<Float64Time> {
        &self.rti
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Server error types.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Bind error: {0}")]
    Bind(String),
    #[error("Server already running")]
    AlreadyRunning,
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("RTI error: {0}")]
    Rti(#[from] RtiError),
}
