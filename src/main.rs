//! HomiSmart bridge - main entry point

use homismart_bridge::client::CapabilitySet;
use homismart_bridge::config::{BridgeConfig, HomismartCredentials, PollingConfig, SceneStorageConfig};
use homismart_bridge::mock::{MockClient, MockDevice};
use homismart_bridge::{BridgeRegistry, BridgeService, Coordinator, Result, SceneStore};

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Command line arguments
#[derive(Parser)]
#[command(name = "homismart-bridge")]
#[command(about = "HomiSmart device bridge")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bridge against a simulated device set
    Simulate {
        /// Refresh interval in seconds
        #[arg(short, long, default_value = "5")]
        interval: u64,

        /// Scene document path
        #[arg(long, default_value = "scenes.json")]
        scenes_file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = homismart_bridge::logging::LogConfig::from_env();
    if let Err(e) = homismart_bridge::logging::init_logging(log_config) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    match cli.command {
        Commands::Simulate {
            interval,
            scenes_file,
        } => {
            info!("Starting HomiSmart bridge in simulation mode");
            run_simulation(interval, scenes_file).await?;
        }
    }

    Ok(())
}

fn simulated_devices() -> Vec<Arc<MockDevice>> {
    vec![
        Arc::new(
            MockDevice::new("Living Room Shutter")
                .with_capabilities(CapabilitySet::none().with_level().with_stop())
                .with_current_level(70)
                .with_battery(88)
                .with_rssi(-61),
        ),
        Arc::new(
            MockDevice::new("Bedroom Blind")
                .with_capabilities(CapabilitySet::none().with_level().with_stop())
                .with_current_level(100)
                .with_curtain_state("Closed"),
        ),
        Arc::new(
            MockDevice::new("Kitchen Lamp")
                .with_capabilities(CapabilitySet::none().with_on_off())
                .with_is_on(true),
        ),
        Arc::new(
            MockDevice::new("Garden Plug")
                .with_capabilities(CapabilitySet::none().with_on_off())
                .with_is_on(false)
                .with_online(false),
        ),
    ]
}

async fn run_simulation(interval: u64, scenes_file: PathBuf) -> Result<()> {
    let config = BridgeConfig {
        homismart: homismart_bridge::config::HomismartConfig {
            endpoint: url::Url::parse(homismart_bridge::config::DEFAULT_ENDPOINT)
                .expect("default endpoint must parse"),
            credentials: HomismartCredentials {
                username: "simulation".to_string(),
                password: "simulation".to_string(),
            },
        },
        polling: PollingConfig {
            update_interval: Duration::from_secs(interval),
        },
        scenes: SceneStorageConfig { path: scenes_file },
    };
    config.validate()?;

    let devices = simulated_devices()
        .into_iter()
        .map(|device| device as Arc<dyn homismart_bridge::DeviceHandle>)
        .collect();
    let client = Arc::new(MockClient::with_devices(devices));

    let coordinator = Arc::new(Coordinator::new(
        Arc::clone(&client) as Arc<dyn homismart_bridge::HomismartClient>,
        config.polling.update_interval,
    ));
    coordinator.refresh().await?;
    coordinator.start().await;

    let service = Arc::new(BridgeService::new(
        Arc::clone(&coordinator),
        SceneStore::new(config.scenes.path.clone()),
    ));

    let registry = BridgeRegistry::new();
    registry.insert("simulation", Arc::clone(&service)).await;

    let snapshot = coordinator.snapshot().await;
    info!(devices = snapshot.len(), "Initial snapshot published");
    for record in snapshot.iter() {
        info!(
            device = %record.label,
            kind = %record.device_type,
            status = record.status_label(),
            position = record.host_position(),
            "Discovered device"
        );
    }

    // Leave a scene document behind so replay can be tried interactively.
    match service
        .create_scene("simulation-baseline", &Default::default())
        .await
    {
        Ok(scene) => info!(devices = scene.devices.len(), "Captured baseline scene"),
        Err(e) => error!("Failed to capture baseline scene: {e}"),
    }

    info!("Bridge running; press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .map_err(homismart_bridge::HomismartError::Io)?;

    registry.shutdown_all().await;
    Ok(())
}
