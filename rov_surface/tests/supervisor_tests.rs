//! Supervisor behaviour against a fake onboard controller

use rov_common::config::{ConfigLoader, SurfaceConfig};
use rov_common::error::ControlSystemError;
use rov_common::types::ConnectionStatus;
use rov_control::EvdevGamepad;
use rov_store::Value;
use rov_surface::Supervisor;
use std::path::Path;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::time::timeout;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const PATIENCE: Duration = Duration::from_secs(5);

async fn station() -> Result<(TcpListener, Supervisor), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let mut config = SurfaceConfig::default();
    config.connection.host = "127.0.0.1".into();
    config.connection.port = listener.local_addr()?.port();
    config.connection.poll_interval_ms = 10;
    Ok((listener, Supervisor::new(config)?))
}

async fn wait_for(supervisor: &Supervisor, status: ConnectionStatus) -> TestResult {
    timeout(PATIENCE, async {
        while supervisor.link().status().ok() != Some(status) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await?;
    Ok(())
}

#[test]
fn test_shipped_config_is_valid() -> TestResult {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/surface.toml");
    let config = SurfaceConfig::load(&path)?;
    config.validate()?;
    assert_eq!(config.connection.address(), "localhost:50000");
    assert_eq!(config.control.tick_ms, 10);
    assert!(config.input.device.is_none());
    assert_eq!(config.shared.service_name, "surface");
    Ok(())
}

#[test]
fn test_service_name_comes_from_config() -> TestResult {
    let mut config = SurfaceConfig::default();
    assert_eq!(Supervisor::new(config.clone())?.service_name(), "surface");

    config.shared.service_name = "surface-aft".into();
    assert_eq!(Supervisor::new(config)?.service_name(), "surface-aft");
    Ok(())
}

#[tokio::test]
async fn test_check_link_connects_when_disconnected() -> TestResult {
    let (listener, supervisor) = station().await?;

    supervisor.check_link().await;
    let _peer = timeout(PATIENCE, listener.accept()).await??;
    wait_for(&supervisor, ConnectionStatus::Connected).await?;

    supervisor.link().disconnect().await;
    Ok(())
}

#[tokio::test]
async fn test_check_link_reconnects_when_idle() -> TestResult {
    let (listener, supervisor) = station().await?;

    supervisor.check_link().await;
    let (first, _) = timeout(PATIENCE, listener.accept()).await??;
    drop(first);
    wait_for(&supervisor, ConnectionStatus::Idle).await?;

    supervisor.check_link().await;
    let _second = timeout(PATIENCE, listener.accept()).await??;
    wait_for(&supervisor, ConnectionStatus::Connected).await?;

    supervisor.link().disconnect().await;
    Ok(())
}

#[tokio::test]
async fn test_supervise_disconnects_on_shutdown() -> TestResult {
    let (listener, supervisor) = station().await?;
    let (stop, stopped) = oneshot::channel::<()>();

    let watcher = async {
        let peer = timeout(PATIENCE, listener.accept()).await??;
        wait_for(&supervisor, ConnectionStatus::Connected).await?;
        let _ = stop.send(());
        Ok::<_, Box<dyn std::error::Error>>(peer)
    };
    let shutdown = async {
        let _ = stopped.await;
    };

    let (peer, ()) = tokio::join!(watcher, supervisor.supervise(shutdown));
    // Keep the peer open until the supervisor has disconnected.
    drop(peer?);

    assert_eq!(supervisor.link().status()?, ConnectionStatus::Disconnected);
    Ok(())
}

#[tokio::test]
async fn test_control_loop_feeds_transmission() -> TestResult {
    let (_listener, supervisor) = station().await?;
    let control = supervisor.spawn_control();

    supervisor.store().control().set("manual-micro", 1.0)?;
    timeout(PATIENCE, async {
        while supervisor.store().transmission().get("T_M").ok() != Some(Value::Int(1900)) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await?;

    control.abort();
    Ok(())
}

#[tokio::test]
async fn test_manual_controller_needs_a_device() -> TestResult {
    let (_listener, supervisor) = station().await?;
    let result = supervisor.spawn_manual::<EvdevGamepad>(None);
    assert!(matches!(result, Err(ControlSystemError::NoInputDevice(_))));
    Ok(())
}
