//! Run command implementation.

use super::{build_engine, EngineSettings};
use crate::Game;
use std::path::Path;
use std::time::Duration;

/// Time left to the emergency upload before the runtime stops.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Runs the sync loop until Ctrl-C.
pub async fn run(
    root: &Path,
    game: Game,
    settings: EngineSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = build_engine(root, game, settings)?;

    engine
        .run(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("interrupt received, stopping"),
                Err(e) => {
                    tracing::warn!(error = %e, "cannot listen for Ctrl-C");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await;

    tokio::time::sleep(SHUTDOWN_GRACE).await;

    let stats = engine.stats();
    println!(
        "{} passes: {} pushed, {} pulled, {} skipped, {} failed",
        stats.passes, stats.pushes, stats.pulls, stats.skipped, stats.failures
    );
    Ok(())
}
