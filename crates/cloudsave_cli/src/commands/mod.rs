//! CLI command implementations.

pub mod inspect;
pub mod list;
pub mod run;
pub mod sync;

use crate::Game;
use cloudsave_storage::{FileStore, OpenOptions};
use cloudsave_sync_engine::{HttpSaveService, SyncConfig, SyncEngine};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Engine settings shared by `run` and `sync`.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Base URL of the Save Service.
    pub server: String,
    /// Seconds between passes.
    pub interval: u64,
    /// Seconds per remote call.
    pub timeout: u64,
    /// Session cookie.
    pub cookie: Option<String>,
}

/// Opens a game's store under `root`, creating it on first use.
pub fn open_store(root: &Path, game: Game) -> Result<FileStore, Box<dyn std::error::Error>> {
    let profile = game.profile();
    Ok(FileStore::open_named(root, &profile.store_name, OpenOptions::create())?)
}

/// Builds an engine over the game's file store and the HTTP Save Service.
pub fn build_engine(
    root: &Path,
    game: Game,
    settings: EngineSettings,
) -> Result<SyncEngine<FileStore, HttpSaveService>, Box<dyn std::error::Error>> {
    let store = open_store(root, game)?;

    let mut config = SyncConfig::new(game.profile(), settings.server)
        .with_sync_interval(Duration::from_secs(settings.interval.max(1)))
        .with_request_timeout(Duration::from_secs(settings.timeout.max(1)));
    if let Some(cookie) = settings.cookie {
        config = config.with_session_cookie(cookie);
    }

    let service = HttpSaveService::from_config(&config)?;
    Ok(SyncEngine::new(config, Arc::new(store), service))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn engine_uses_game_store() {
        let dir = tempdir().unwrap();
        let settings = EngineSettings {
            server: "http://localhost:8080".into(),
            interval: 0,
            timeout: 5,
            cookie: Some("session=abc".into()),
        };

        let engine = build_engine(dir.path(), Game::Undertale, settings).unwrap();
        assert!(dir.path().join("_savedata").is_dir());
        assert_eq!(engine.config().sync_interval, Duration::from_secs(1));
        assert_eq!(engine.config().request_timeout, Duration::from_secs(5));
        assert_eq!(engine.service().base_url(), "http://localhost:8080");
    }

    #[test]
    fn invalid_cookie_is_reported() {
        let dir = tempdir().unwrap();
        let settings = EngineSettings {
            server: "http://localhost".into(),
            interval: 15,
            timeout: 10,
            cookie: Some("bad\ncookie".into()),
        };
        assert!(build_engine(dir.path(), Game::Buckshot, settings).is_err());
    }
}
