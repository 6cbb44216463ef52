//! Sync command implementation.

use super::{build_engine, EngineSettings};
use crate::Game;
use std::path::Path;

/// Runs one sync pass and prints its outcome.
///
/// A failed pass is returned as an error so the process exits non-zero.
pub async fn run(
    root: &Path,
    game: Game,
    settings: EngineSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = build_engine(root, game, settings)?;

    let outcome = engine.sync_once().await;
    if outcome.is_failure() {
        return Err(format!("{}: {outcome}", engine.config().profile.game_name).into());
    }

    println!("{}: {outcome}", engine.config().profile.game_name);
    Ok(())
}
