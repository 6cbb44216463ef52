//! Server-side save storage.

use cloudsave_protocol::{RemoteSavePayload, SingleFileData};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

/// A save as last uploaded for a game.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredSave {
    /// File map of a multi-file game.
    Files(RemoteSavePayload),
    /// File entry of a single-file game.
    Single(SingleFileData),
}

impl StoredSave {
    /// Returns the load response `data` for the requested shape.
    ///
    /// A save uploaded in the other shape is not served.
    pub fn to_data(&self, multiple_files: bool) -> Option<Value> {
        match (self, multiple_files) {
            (StoredSave::Files(files), true) => serde_json::to_value(files).ok(),
            (StoredSave::Single(data), false) => serde_json::to_value(data).ok(),
            _ => None,
        }
    }
}

/// The latest save per game, with a revision counter.
///
/// Each upload replaces the stored save of its game entirely.
#[derive(Debug, Default)]
pub struct SaveTable {
    saves: RwLock<HashMap<String, (u64, StoredSave)>>,
}

impl SaveTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a save and returns its revision, starting at 1.
    pub fn put(&self, game_name: &str, save: StoredSave) -> u64 {
        let mut saves = self.saves.write();
        let revision = saves.get(game_name).map_or(0, |(rev, _)| *rev) + 1;
        saves.insert(game_name.to_string(), (revision, save));
        revision
    }

    /// Returns the stored save of a game.
    pub fn get(&self, game_name: &str) -> Option<StoredSave> {
        self.saves.read().get(game_name).map(|(_, save)| save.clone())
    }

    /// Returns the revision of a game's save, 0 if none.
    pub fn revision(&self, game_name: &str) -> u64 {
        self.saves.read().get(game_name).map_or(0, |(rev, _)| *rev)
    }

    /// Number of games with a stored save.
    pub fn len(&self) -> usize {
        self.saves.read().len()
    }

    /// Returns true if no save is stored.
    pub fn is_empty(&self) -> bool {
        self.saves.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn files() -> StoredSave {
        let mut payload = RemoteSavePayload::new();
        payload.insert("file0", json!("data:application/octet-stream;base64,AQID"));
        StoredSave::Files(payload)
    }

    #[test]
    fn put_replaces_and_counts_revisions() {
        let table = SaveTable::new();
        assert!(table.is_empty());
        assert_eq!(table.revision("Undertale"), 0);

        assert_eq!(table.put("Undertale", files()), 1);
        assert_eq!(table.put("Undertale", StoredSave::Files(RemoteSavePayload::new())), 2);
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get("Undertale"),
            Some(StoredSave::Files(RemoteSavePayload::new()))
        );
    }

    #[test]
    fn data_is_served_in_stored_shape_only() {
        let save = files();
        assert_eq!(
            save.to_data(true),
            Some(json!({"file0": "data:application/octet-stream;base64,AQID"}))
        );
        assert_eq!(save.to_data(false), None);

        let single = StoredSave::Single(SingleFileData {
            timestamp: None,
            mode: None,
            contents: vec![1, 255],
        });
        assert_eq!(single.to_data(false), Some(json!({"contents": [1, -1]})));
        assert_eq!(single.to_data(true), None);
    }
}
