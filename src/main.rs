//! Aria - voice and text desktop assistant

use anyhow::{anyhow, Result};
use aria::integration::{AssistantConfig, OrchestratorBuilder};
use aria::ui::{AppState, AriaApp};
use eframe::egui;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aria=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Aria voice assistant");

    let config = AssistantConfig::load_or_default()?;
    let (orchestrator, handle) = OrchestratorBuilder::new().with_config(config).build()?;
    let worker = orchestrator.start()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 680.0])
            .with_min_inner_size([640.0, 420.0])
            .with_title("Aria"),
        ..Default::default()
    };

    let state = AppState::new(handle);
    eframe::run_native(
        "Aria",
        options,
        Box::new(|cc| Ok(Box::new(AriaApp::new(cc, state)))),
    )
    .map_err(|e| anyhow!("UI failed: {}", e))?;

    // on_exit has sent Shutdown
    if worker.join().is_err() {
        tracing::warn!("Orchestrator thread panicked");
    }

    info!("Aria stopped");
    Ok(())
}
