//! Station supervisor: owns the store, starts the control loops and keeps
//! the link to the onboard controller alive.

use rov_common::config::SurfaceConfig;
use rov_common::error::{ControlResult, StoreResult};
use rov_common::types::ConnectionStatus;
use rov_control::{ControlManager, InputDevice, ManualController};
use rov_link::Connection;
use rov_store::{DataManager, MemoryCache};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, trace};

/// Wires the store, control loops and link together.
#[derive(Debug)]
pub struct Supervisor {
    config: SurfaceConfig,
    store: DataManager,
    link: Connection,
}

impl Supervisor {
    /// Build an in-memory store and an idle link from `config`.
    pub fn new(config: SurfaceConfig) -> StoreResult<Self> {
        let store = DataManager::with_peers(
            Arc::new(MemoryCache::new()),
            &[config.connection.peer.as_str()],
        )?;
        let link = Connection::new(store.clone(), &config.connection);
        Ok(Self {
            config,
            store,
            link,
        })
    }

    /// Name this station logs under.
    pub fn service_name(&self) -> &str {
        &self.config.shared.service_name
    }

    /// Shared store.
    pub fn store(&self) -> &DataManager {
        &self.store
    }

    /// Link to the onboard controller.
    pub fn link(&self) -> &Connection {
        &self.link
    }

    /// Start the control manager loop.
    pub fn spawn_control(&self) -> JoinHandle<()> {
        let tick = Duration::from_millis(self.config.control.tick_ms);
        ControlManager::new(self.store.clone()).spawn(tick)
    }

    /// Start the manual controller on `device`.
    ///
    /// # Errors
    ///
    /// `NoInputDevice` when `device` is `None`.
    pub fn spawn_manual<D>(&self, device: Option<D>) -> ControlResult<JoinHandle<()>>
    where
        D: InputDevice + Send + 'static,
    {
        ManualController::with_dead_zone(self.store.clone(), self.config.input.dead_zone)
            .start(device)
    }

    /// React to the current link status once.
    ///
    /// `DISCONNECTED` starts a connection, `IDLE` reconnects, anything else
    /// is left alone.
    pub async fn check_link(&self) {
        match self.link.status() {
            Ok(ConnectionStatus::Disconnected) => {
                info!(address = %self.link.address(), "Link down, connecting");
                self.link.connect();
            }
            Ok(ConnectionStatus::Idle) => {
                info!(address = %self.link.address(), "Link idle, reconnecting");
                self.link.reconnect().await;
            }
            Ok(status) => trace!(%status, "Link status"),
            Err(e) => error!(error = %e, "Failed to read the link status"),
        }
    }

    /// Poll the link until `shutdown` completes, then disconnect it.
    pub async fn supervise<S>(&self, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        let period = Duration::from_millis(self.config.connection.poll_interval_ms);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            service = %self.service_name(),
            period_ms = period.as_millis() as u64,
            "Supervising the link"
        );
        loop {
            tokio::select! {
                _ = interval.tick() => self.check_link().await,
                () = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
            }
        }

        self.link.disconnect().await;
    }
}
