//! TCP monitor listener for framed lane telemetry.

use std::net::SocketAddr;
use std::sync::Arc;

use gantry_proto::{FrameAssembler, RawFrame};
use gantry_topology::TopologyResolver;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::error::IngestError;
use crate::pipeline::EventPipeline;

const READ_BUFFER: usize = 2048;
const FRAME_QUEUE: usize = 256;

/// Accepts lane device connections and feeds their frames to the pipeline.
///
/// In production mode connections from addresses the topology does not know
/// are refused at accept time; debug mode skips the check so bench rigs can
/// connect. Each connection gets a reader task and a decode task joined by
/// a bounded queue, so a burst of frames never blocks the socket read.
pub struct MonitorServer {
    listener: TcpListener,
    topology: Arc<dyn TopologyResolver>,
    pipeline: Arc<EventPipeline>,
    debug_mode: bool,
}

impl MonitorServer {
    /// Binds the listener.
    pub async fn bind(
        addr: &str,
        topology: Arc<dyn TopologyResolver>,
        pipeline: Arc<EventPipeline>,
        debug_mode: bool,
    ) -> Result<Self, IngestError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| IngestError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        Ok(Self {
            listener,
            topology,
            pipeline,
            debug_mode,
        })
    }

    /// The bound address, useful when binding port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept loop; runs until the shutdown channel fires.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        if let Ok(addr) = self.local_addr() {
            info!(%addr, debug_mode = self.debug_mode, "monitor server listening");
        }
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => self.accept(stream, peer, shutdown.clone()),
                        Err(err) => warn!(error = %err, "accept failed"),
                    }
                }
                _ = shutdown.changed() => {
                    info!("monitor server stopping");
                    break;
                }
            }
        }
    }

    fn accept(&self, stream: TcpStream, peer: SocketAddr, shutdown: watch::Receiver<bool>) {
        if !self.debug_mode && self.topology.node_by_ip(&peer.ip().to_string()).is_none() {
            warn!(%peer, "refusing connection from address outside topology");
            return;
        }
        debug!(%peer, "lane device connected");
        let pipeline = Arc::clone(&self.pipeline);
        tokio::spawn(handle_connection(stream, peer, pipeline, shutdown));
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    pipeline: Arc<EventPipeline>,
    mut shutdown: watch::Receiver<bool>,
) {
    let (frame_tx, mut frame_rx) = mpsc::channel::<RawFrame>(FRAME_QUEUE);

    let decoder = tokio::spawn(async move {
        while let Some(frame) = frame_rx.recv().await {
            pipeline.handle_frame(&frame).await;
        }
    });

    let mut assembler = FrameAssembler::new();
    let mut buf = [0u8; READ_BUFFER];
    loop {
        tokio::select! {
            read = stream.read(&mut buf) => {
                match read {
                    Ok(0) => {
                        debug!(%peer, "lane device disconnected");
                        break;
                    }
                    Ok(n) => {
                        for frame in assembler.push(&buf[..n]) {
                            if frame_tx.send(frame).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(err) => {
                        warn!(%peer, error = %err, "read failed, closing connection");
                        break;
                    }
                }
            }
            _ = shutdown.changed() => break,
        }
    }
    drop(frame_tx);
    let _ = decoder.await;
}
