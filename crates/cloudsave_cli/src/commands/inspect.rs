//! Inspect command implementation.

use super::open_store;
use crate::Game;
use cloudsave_codec::FileContents;
use cloudsave_storage::{FileStore, LocalStore, SaveRecord};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Save inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Store directory.
    pub store: String,
    /// Record key.
    pub key: String,
    /// Last-modified time (RFC 3339).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    /// Files in the record.
    pub files: Vec<FileEntry>,
}

/// One file of the record.
#[derive(Debug, Serialize)]
pub struct FileEntry {
    /// Logical name.
    pub name: String,
    /// `binary` or `text`.
    pub kind: &'static str,
    /// Size in bytes.
    pub size: usize,
    /// Whether the game expects this file.
    pub expected: bool,
}

/// Runs the inspect command.
pub fn run(root: &Path, game: Game, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(root, game)?;
    let result = inspect(store, game)?;

    // Output
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Reads the game's record, repairing missing files.
pub fn inspect(store: FileStore, game: Game) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let profile = game.profile();
    let path = store.path().display().to_string();
    let local = LocalStore::new(Arc::new(store), profile.expected_files.clone());

    let mut handle = local.open()?;
    let record = handle.read(&profile.record_key)?;
    handle.close();

    Ok(InspectResult {
        store: path,
        key: profile.record_key.clone(),
        modified: record.modified.map(|t| t.to_rfc3339()),
        files: entries(&record, |name| profile.expected_files.contains(name)),
    })
}

fn entries(record: &SaveRecord, expected: impl Fn(&str) -> bool) -> Vec<FileEntry> {
    record
        .files
        .iter()
        .map(|(name, contents)| FileEntry {
            name: name.clone(),
            kind: match contents {
                FileContents::Binary(_) => "binary",
                FileContents::Text(_) => "text",
            },
            size: contents.len(),
            expected: expected(name),
        })
        .collect()
}

fn print_text_output(result: &InspectResult) {
    println!("Store: {}", result.store);
    println!("Key:   {}", result.key);
    if let Some(modified) = &result.modified {
        println!("Modified: {modified}");
    }
    println!();
    println!("{:<40} {:>8} {:>10}", "File", "Kind", "Bytes");
    for file in &result.files {
        let marker = if file.expected { "" } else { " (extra)" };
        println!("{:<40} {:>8} {:>10}{marker}", file.name, file.kind, file.size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudsave_storage::StoreBackend;
    use tempfile::tempdir;

    #[test]
    fn inspect_repairs_and_lists_files() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path(), Game::Undertale).unwrap();
        store
            .put(
                "timestamp",
                &SaveRecord::new()
                    .with_file("file0", vec![1u8, 2, 3])
                    .with_file("notes", FileContents::Text("hi".into())),
            )
            .unwrap();

        let result = inspect(store, Game::Undertale).unwrap();
        assert_eq!(result.key, "timestamp");
        assert_eq!(result.files.len(), 8);
        assert!(result.modified.is_some());

        let file0 = result.files.iter().find(|f| f.name == "file0").unwrap();
        assert_eq!((file0.kind, file0.size, file0.expected), ("binary", 3, true));
        let notes = result.files.iter().find(|f| f.name == "notes").unwrap();
        assert_eq!((notes.kind, notes.expected), ("text", false));
    }

    #[test]
    fn inspect_json_shape() {
        let dir = tempdir().unwrap();
        let store = open_store(dir.path(), Game::FlappyBird).unwrap();
        let result = inspect(store, Game::FlappyBird).unwrap();

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json["key"],
            "/userfs/godot/app_userdata/Flappy Bird Remake/highscore.save"
        );
        assert_eq!(json["files"][0]["name"], "highscore.save");
        assert_eq!(json["files"][0]["size"], 0);
    }
}
