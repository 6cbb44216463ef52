//! List command implementation.

use super::open_store;
use crate::Game;
use cloudsave_storage::{FileStore, OpenOptions, StoreBackend, CONTAINER_FILE};
use std::fs;
use std::path::Path;

/// Runs the list command.
pub fn run(root: &Path, game: Option<Game>) -> Result<(), Box<dyn std::error::Error>> {
    for (store, keys) in collect(root, game)? {
        println!("{store}:");
        if keys.is_empty() {
            println!("  (empty)");
        }
        for key in keys {
            println!("  {key}");
        }
    }
    Ok(())
}

/// Returns the keys of each store, by store directory name.
///
/// Without a game, every directory under `root` holding a record
/// container is listed.
pub fn collect(
    root: &Path,
    game: Option<Game>,
) -> Result<Vec<(String, Vec<String>)>, Box<dyn std::error::Error>> {
    if let Some(game) = game {
        let store = open_store(root, game)?;
        return Ok(vec![(dir_name(store.path()), store.keys()?)]);
    }

    if !root.is_dir() {
        return Err(format!("No stores found at {}", root.display()).into());
    }

    let mut stores = Vec::new();
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if !path.join(CONTAINER_FILE).is_file() {
            continue;
        }
        let store = FileStore::open(&path, OpenOptions::existing())?;
        stores.push((dir_name(&path), store.keys()?));
    }
    stores.sort();
    Ok(stores)
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudsave_storage::SaveRecord;
    use cloudsave_testkit::TestStore;

    #[test]
    fn list_single_store() {
        let store = TestStore::new("/userfs");
        store.put("/userfs/godot/app_userdata/Flappy Bird Remake/highscore.save", &SaveRecord::new()).unwrap();

        let listed = collect(store.root(), Some(Game::FlappyBird)).unwrap();
        assert_eq!(
            listed,
            vec![(
                "userfs".to_string(),
                vec!["/userfs/godot/app_userdata/Flappy Bird Remake/highscore.save".to_string()]
            )]
        );
    }

    #[test]
    fn list_all_stores() {
        let store = TestStore::new("/_savedata");
        store.put("timestamp", &SaveRecord::new()).unwrap();
        fs::create_dir(store.root().join("not_a_store")).unwrap();
        open_store(store.root(), Game::Buckshot).unwrap();

        let listed = collect(store.root(), None).unwrap();
        assert_eq!(
            listed,
            vec![
                ("_savedata".to_string(), vec!["timestamp".to_string()]),
                ("userfs".to_string(), vec![]),
            ]
        );
    }

    #[test]
    fn list_missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect(&dir.path().join("absent"), None).is_err());
    }
}
