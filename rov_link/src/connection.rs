//! Link state machine.
//!
//! ```text
//! DISCONNECTED ──connect──► CONNECTING ──ok──► CONNECTED ──peer closed / error──► IDLE
//!      ▲                        │                  │                              │
//!      └────────── failed ──────┘                  └──────────disconnect──────────┘
//!      ▲                                                      │
//!      └──────────────────────── DISCONNECTING ◄──────────────┘
//! ```
//!
//! The status lives in the `connections` partition. Nothing here retries:
//! whoever supervises the link polls the status and calls
//! [`Connection::connect`] or [`Connection::reconnect`].

use crate::wire;
use rov_common::config::ConnectionConfig;
use rov_common::error::{NetworkingError, StoreError, StoreResult};
use rov_common::types::ConnectionStatus;
use rov_store::DataManager;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// How long cleanup waits for the exchange worker before aborting it.
pub const WORKER_STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// Reasons the exchange loop ends.
#[derive(Debug, Error)]
enum ExchangeError {
    /// Send or receive failed.
    #[error("socket error: {0}")]
    Io(#[from] io::Error),

    /// Transmission snapshot or telemetry merge failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Peer sent something that is not MessagePack.
    #[error("malformed frame: {0}")]
    Malformed(#[from] rmp_serde::decode::Error),
}

struct Worker {
    handle: JoinHandle<io::Result<()>>,
    stop: oneshot::Sender<()>,
}

struct Shared {
    address: String,
    peer: String,
    buffer_size: usize,
    store: DataManager,
    /// Held across each status check and the write that follows it.
    transition: parking_lot::Mutex<()>,
    worker: Mutex<Option<Worker>>,
}

/// TCP link to the onboard controller.
///
/// Cloning yields another handle to the same link.
#[derive(Clone)]
pub struct Connection {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("address", &self.shared.address)
            .field("peer", &self.shared.peer)
            .field("buffer_size", &self.shared.buffer_size)
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Link described by `config`, reporting its status under `config.peer`.
    pub fn new(store: DataManager, config: &ConnectionConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                address: config.address(),
                peer: config.peer.clone(),
                buffer_size: config.buffer_size,
                store,
                transition: parking_lot::Mutex::new(()),
                worker: Mutex::new(None),
            }),
        }
    }

    /// Remote `host:port`.
    pub fn address(&self) -> &str {
        &self.shared.address
    }

    /// Key of this link in the `connections` partition.
    pub fn peer(&self) -> &str {
        &self.shared.peer
    }

    /// Status as stored in the `connections` partition.
    ///
    /// # Errors
    ///
    /// Store failures, or `Backend` if the stored value is not a known status.
    pub fn status(&self) -> StoreResult<ConnectionStatus> {
        let connections = self.shared.store.connections();
        let value = connections.get(&self.shared.peer)?;
        value
            .as_i64()
            .and_then(ConnectionStatus::from_i64)
            .ok_or_else(|| StoreError::Backend {
                segment: connections.name().to_owned(),
                key: self.shared.peer.clone(),
                reason: format!("invalid connection status {value}"),
            })
    }

    fn set_status(&self, status: ConnectionStatus) {
        match self
            .shared
            .store
            .connections()
            .set(&self.shared.peer, status.as_i64())
        {
            Ok(()) => debug!(peer = %self.shared.peer, %status, "Link status changed"),
            Err(e) => error!(peer = %self.shared.peer, %status, error = %e, "Failed to store link status"),
        }
    }

    // ─── Lifecycle ──────────────────────────────────────────────────

    /// Start connecting in the background.
    ///
    /// Refused with a warning unless the link is `DISCONNECTED`. Returns the
    /// handle of the connect task, which finishes once the socket is up or
    /// the attempt has failed. Of several concurrent callers only one gets
    /// a handle.
    pub fn connect(&self) -> Option<JoinHandle<()>> {
        {
            let _transition = self.shared.transition.lock();
            match self.status() {
                Ok(ConnectionStatus::Disconnected) => {}
                Ok(status) => {
                    warn!(address = %self.shared.address, %status, "Connect ignored, link is not disconnected");
                    return None;
                }
                Err(e) => {
                    error!(address = %self.shared.address, error = %e, "Connect ignored, link status unreadable");
                    return None;
                }
            }
            self.set_status(ConnectionStatus::Connecting);
        }

        let link = self.clone();
        Some(tokio::spawn(async move { link.establish().await }))
    }

    async fn establish(self) {
        info!(address = %self.shared.address, "Connecting to the onboard controller");

        match TcpStream::connect(&self.shared.address).await {
            Ok(stream) => {
                let (stop, stopped) = oneshot::channel();
                let mut worker = self.shared.worker.lock().await;
                // Status first: a peer closing immediately must end in IDLE.
                self.set_status(ConnectionStatus::Connected);
                let handle = tokio::spawn(self.clone().exchange(stream, stopped));
                *worker = Some(Worker { handle, stop });
                info!(address = %self.shared.address, "Connected to the onboard controller");
            }
            Err(source) => {
                let e = NetworkingError::Connect {
                    address: self.shared.address.clone(),
                    source,
                };
                error!(error = %e, "Connection attempt failed");
                self.set_status(ConnectionStatus::Disconnected);
                if let Err(e) = self.cleanup(true).await {
                    debug!(error = %e, "Cleanup after failed connect");
                }
            }
        }
    }

    /// Close the link.
    ///
    /// Refused with a warning unless the link is `CONNECTED` or `IDLE`.
    /// Once started, always ends in `DISCONNECTED`.
    pub async fn disconnect(&self) {
        {
            let _transition = self.shared.transition.lock();
            match self.status() {
                Ok(ConnectionStatus::Connected | ConnectionStatus::Idle) => {}
                Ok(status) => {
                    warn!(address = %self.shared.address, %status, "Disconnect ignored, link is not connected");
                    return;
                }
                Err(e) => {
                    error!(address = %self.shared.address, error = %e, "Disconnect ignored, link status unreadable");
                    return;
                }
            }
            self.set_status(ConnectionStatus::Disconnecting);
        }

        if let Err(e) = self.cleanup(false).await {
            warn!(error = %e, "Cleanup failed, retrying without error checks");
            if let Err(e) = self.cleanup(true).await {
                debug!(error = %e, "Second cleanup");
            }
        }
        self.set_status(ConnectionStatus::Disconnected);
        info!(address = %self.shared.address, "Disconnected from the onboard controller");
    }

    /// `disconnect` followed by `connect`.
    pub async fn reconnect(&self) -> Option<JoinHandle<()>> {
        self.disconnect().await;
        self.connect()
    }

    /// Stop the exchange worker and close its socket.
    ///
    /// Idempotent: with no worker running this does nothing. When
    /// `ignore_errors` is set failures are logged and `Ok` is returned.
    async fn cleanup(&self, ignore_errors: bool) -> Result<(), NetworkingError> {
        let worker = self.shared.worker.lock().await.take();
        let Some(Worker { mut handle, stop }) = worker else {
            return Ok(());
        };

        // The worker may already have exited on its own.
        let _ = stop.send(());

        let address = self.shared.address.clone();
        let result = match tokio::time::timeout(WORKER_STOP_TIMEOUT, &mut handle).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(source))) => Err(NetworkingError::Cleanup { address, source }),
            Ok(Err(join)) => Err(NetworkingError::Worker {
                address,
                reason: join.to_string(),
            }),
            Err(_) => {
                handle.abort();
                Err(NetworkingError::Worker {
                    address,
                    reason: format!("did not stop within {WORKER_STOP_TIMEOUT:?}, aborted"),
                })
            }
        };

        match result {
            Err(e) if ignore_errors => {
                debug!(error = %e, "Ignoring cleanup failure");
                Ok(())
            }
            other => other,
        }
    }

    // ─── Exchange worker ────────────────────────────────────────────

    /// Exchange frames until the peer leaves, an error occurs or `stop` fires.
    ///
    /// Leaves the link `IDLE` unless stopped; a stopped worker shuts the
    /// socket down and reports the result.
    async fn exchange(self, mut stream: TcpStream, mut stop: oneshot::Receiver<()>) -> io::Result<()> {
        let mut buffer = vec![0u8; self.shared.buffer_size];

        loop {
            tokio::select! {
                _ = &mut stop => {
                    debug!(address = %self.shared.address, "Exchange worker stopping");
                    return stream.shutdown().await;
                }
                result = self.exchange_once(&mut stream, &mut buffer) => match result {
                    Ok(true) => {}
                    Ok(false) => {
                        info!(address = %self.shared.address, "Onboard controller closed the connection");
                        break;
                    }
                    Err(e) => {
                        warn!(address = %self.shared.address, error = %e, "Exchange loop ended");
                        break;
                    }
                },
            }
        }

        self.set_status(ConnectionStatus::Idle);
        Ok(())
    }

    /// One send and receive. `Ok(false)` when the peer closed the stream.
    async fn exchange_once(&self, stream: &mut TcpStream, buffer: &mut [u8]) -> Result<bool, ExchangeError> {
        let snapshot = self.shared.store.transmission().all_raw()?;
        let frame = wire::encode_frame(&snapshot)?;
        stream.write_all(&frame).await?;

        let read = stream.read(buffer).await?;
        if read == 0 {
            return Ok(false);
        }

        if let Some(values) = wire::decode_frame(&buffer[..read])? {
            debug!(keys = values.len(), "Telemetry received");
            self.shared.store.received().update(values)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link() -> (Connection, DataManager) {
        let store = DataManager::in_memory().unwrap();
        let config = ConnectionConfig {
            host: "127.0.0.1".into(),
            port: 1,
            ..ConnectionConfig::default()
        };
        (Connection::new(store.clone(), &config), store)
    }

    #[tokio::test]
    async fn starts_disconnected() {
        let (link, _) = link();
        assert_eq!(link.status().unwrap(), ConnectionStatus::Disconnected);
        assert_eq!(link.address(), "127.0.0.1:1");
        assert_eq!(link.peer(), "surface-pi");
    }

    #[tokio::test]
    async fn connect_is_refused_unless_disconnected() {
        let (link, _) = link();
        for status in [
            ConnectionStatus::Connected,
            ConnectionStatus::Connecting,
            ConnectionStatus::Idle,
            ConnectionStatus::Disconnecting,
        ] {
            link.set_status(status);
            assert!(link.connect().is_none());
            assert_eq!(link.status().unwrap(), status);
        }
    }

    #[tokio::test]
    async fn disconnect_is_refused_unless_connected_or_idle() {
        let (link, _) = link();
        link.disconnect().await;
        assert_eq!(link.status().unwrap(), ConnectionStatus::Disconnected);

        link.set_status(ConnectionStatus::Connecting);
        link.disconnect().await;
        assert_eq!(link.status().unwrap(), ConnectionStatus::Connecting);
    }

    #[tokio::test]
    async fn disconnect_without_worker_still_ends_disconnected() {
        let (link, _) = link();
        link.set_status(ConnectionStatus::Idle);
        link.disconnect().await;
        assert_eq!(link.status().unwrap(), ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn unknown_stored_status_is_an_error() {
        let (link, store) = link();
        store.connections().set("surface-pi", 42).unwrap();
        assert!(matches!(link.status(), Err(StoreError::Backend { .. })));
        assert!(link.connect().is_none());
    }

    /// Worker that fails the way a socket shutdown error would.
    async fn install_failing_worker(link: &Connection) {
        let (stop, stopped) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let _ = stopped.await;
            Err(io::Error::other("shutdown failed"))
        });
        *link.shared.worker.lock().await = Some(Worker { handle, stop });
    }

    #[tokio::test]
    async fn cleanup_reports_worker_failure() {
        let (link, _) = link();
        install_failing_worker(&link).await;
        assert!(matches!(link.cleanup(false).await, Err(NetworkingError::Cleanup { .. })));
        assert!(link.shared.worker.lock().await.is_none());

        install_failing_worker(&link).await;
        link.cleanup(true).await.unwrap();
        assert!(link.shared.worker.lock().await.is_none());
    }

    #[tokio::test]
    async fn disconnect_ends_disconnected_when_cleanup_fails() {
        let (link, _) = link();
        install_failing_worker(&link).await;
        link.set_status(ConnectionStatus::Idle);

        link.disconnect().await;

        assert_eq!(link.status().unwrap(), ConnectionStatus::Disconnected);
        assert!(link.shared.worker.lock().await.is_none());
    }

    #[tokio::test]
    async fn disconnect_ends_disconnected_when_worker_panics() {
        let (link, _) = link();
        let (stop, stopped) = oneshot::channel::<()>();
        let handle: JoinHandle<io::Result<()>> = tokio::spawn(async move {
            let _ = stopped.await;
            panic!("exchange worker crashed");
        });
        *link.shared.worker.lock().await = Some(Worker { handle, stop });
        link.set_status(ConnectionStatus::Connected);

        link.disconnect().await;

        assert_eq!(link.status().unwrap(), ConnectionStatus::Disconnected);
        assert!(link.shared.worker.lock().await.is_none());
    }

    #[tokio::test]
    async fn cleanup_is_idempotent() {
        let (link, _) = link();
        link.cleanup(false).await.unwrap();
        link.cleanup(true).await.unwrap();
    }
}
