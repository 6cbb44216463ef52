//! Integration tests for sync engine and server.

use cloudsave_codec::FileContents;
use cloudsave_protocol::{
    AuthStatus, LoadQuery, LoadResponse, SaveRequest, SaveResponse, SingleFileData,
};
use cloudsave_server::{SaveServer, ServerConfig, ServerError};
use cloudsave_storage::{FileStore, OpenOptions, SaveRecord, StoreBackend};
use cloudsave_sync_engine::{
    GameProfile, PassOutcome, SaveService, SessionCapability, SyncConfig, SyncEngine, SyncError,
    SyncResult,
};
use cloudsave_testkit::{blank_record, complete_record, TestStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// A Save Service client that calls an in-process server.
///
/// Messages pass through JSON in both directions, as they would over HTTP.
struct InProcessService {
    server: Arc<SaveServer>,
}

impl InProcessService {
    fn new(server: Arc<SaveServer>) -> Self {
        Self { server }
    }
}

fn over_the_wire<T: Serialize, U: DeserializeOwned>(message: &T) -> SyncResult<U> {
    let json = serde_json::to_vec(message).map_err(|e| SyncError::MalformedPayload(e.to_string()))?;
    serde_json::from_slice(&json).map_err(|e| SyncError::MalformedPayload(e.to_string()))
}

fn http_error(err: ServerError) -> SyncError {
    SyncError::RemoteUnavailable(format!("HTTP {}: {err}", err.status_code()))
}

impl SaveService for InProcessService {
    async fn auth_status(&self) -> SyncResult<AuthStatus> {
        over_the_wire(&self.server.handle_auth_status())
    }

    async fn load(&self, query: &LoadQuery) -> SyncResult<LoadResponse> {
        let response = self.server.handle_load(query).map_err(http_error)?;
        over_the_wire(&response)
    }

    async fn save(&self, request: &SaveRequest) -> SyncResult<SaveResponse> {
        let request: SaveRequest = over_the_wire(request)?;
        let response = self.server.handle_save(request).map_err(http_error)?;
        over_the_wire(&response)
    }

    fn send_beacon(&self, request: SaveRequest) {
        let _ = self.server.handle_save(request);
    }
}

fn device(
    profile: GameProfile,
    server: &Arc<SaveServer>,
) -> (TestStore, SyncEngine<FileStore, InProcessService>) {
    let store = TestStore::new(&profile.store_name);
    let config = SyncConfig::new(profile, "memory://");
    let engine = SyncEngine::new(
        config,
        Arc::clone(&store.store),
        InProcessService::new(Arc::clone(server)),
    );
    (store, engine)
}

#[tokio::test]
async fn save_moves_between_devices() {
    let server = Arc::new(SaveServer::new(ServerConfig::default()));
    let profile = GameProfile::undertale();
    let expected = profile.expected_files.clone();

    // Device A has progress, device B is fresh
    let (store_a, engine_a) = device(profile.clone(), &server);
    store_a
        .put(
            "timestamp",
            &complete_record(&expected, &[("file0", &[1, 2, 3]), ("file9", &[0xff])]),
        )
        .unwrap();
    let (store_b, engine_b) = device(profile, &server);

    assert_eq!(engine_a.sync_once().await, PassOutcome::Pushed { files: 7 });
    assert_eq!(server.saves().revision("Undertale"), 1);

    assert_eq!(engine_b.sync_once().await, PassOutcome::Pulled { files: 7 });
    let record = store_b.get("timestamp").unwrap().unwrap();
    assert_eq!(record.get("file0"), Some(&FileContents::Binary(vec![1, 2, 3])));
    assert_eq!(record.get("file9"), Some(&FileContents::Binary(vec![0xff])));
    assert_eq!(record.get("file8"), Some(&FileContents::empty()));

    // Device B now has content and pushes from here on
    assert_eq!(engine_b.sync_once().await, PassOutcome::Pushed { files: 7 });
    assert_eq!(server.saves().revision("Undertale"), 2);
}

#[tokio::test]
async fn fresh_device_with_empty_server_keeps_placeholders() {
    let server = Arc::new(SaveServer::new(ServerConfig::default()));
    let profile = GameProfile::undertale();
    let expected = profile.expected_files.clone();
    let (store, engine) = device(profile, &server);

    let outcome = engine.sync_once().await;
    assert!(outcome.is_failure());

    let record = store.get("timestamp").unwrap().unwrap();
    assert_eq!(record.files, blank_record(&expected).files);
    assert!(server.saves().is_empty());
}

#[tokio::test]
async fn signed_out_session_never_reaches_endpoints() {
    let server = Arc::new(SaveServer::new(ServerConfig::new().with_auth_required(true)));
    let profile = GameProfile::undertale();
    let expected = profile.expected_files.clone();
    let (store, engine) = device(profile, &server);
    let seeded = complete_record(&expected, &[("file0", &[7])]);
    store.put("timestamp", &seeded).unwrap();

    assert_eq!(engine.sync_once().await, PassOutcome::SkippedUnauthenticated);
    assert_eq!(engine.capability(), SessionCapability::Anonymous);
    assert_eq!(server.request_count(), 1);
    assert_eq!(store.get("timestamp").unwrap(), Some(seeded));

    server.sign_in();
    assert_eq!(engine.sync_once().await, PassOutcome::Pushed { files: 7 });
}

#[tokio::test]
async fn single_file_game_between_devices() {
    let server = Arc::new(SaveServer::new(ServerConfig::default()));
    let profile = GameProfile::flappy_bird();
    let key = profile.record_key.clone();

    let (store_a, engine_a) = device(profile.clone(), &server);
    store_a
        .put(&key, &SaveRecord::new().with_file("highscore.save", vec![42u8, 200]))
        .unwrap();
    let (store_b, engine_b) = device(profile, &server);

    assert_eq!(engine_a.sync_once().await, PassOutcome::Pushed { files: 1 });
    assert_eq!(engine_b.sync_once().await, PassOutcome::Pulled { files: 1 });

    let record = store_b.get(&key).unwrap().unwrap();
    assert_eq!(record.get("highscore.save"), Some(&FileContents::Binary(vec![42, 200])));
    assert_eq!(record.mode, Some(0o100_666));
}

#[tokio::test]
async fn emergency_push_reaches_server() {
    let server = Arc::new(SaveServer::new(ServerConfig::default()));
    let profile = GameProfile::buckshot();
    let key = profile.record_key.clone();
    let (store, engine) = device(profile, &server);
    store
        .put(&key, &SaveRecord::new().with_file("buckshotroulette_playerstats.shell", vec![1u8]))
        .unwrap();

    engine.refresh_capability().await.unwrap();
    assert!(engine.emergency_push());

    let response = server.handle_load(&LoadQuery::new("Buckshot", false)).unwrap();
    assert!(response.success);
}

#[tokio::test]
async fn emergency_push_from_shared_store_sends_own_game() {
    let server = Arc::new(SaveServer::new(ServerConfig::default()));
    let buckshot = GameProfile::buckshot();
    let flappy = GameProfile::flappy_bird();

    // Both Godot games keep their saves in /userfs; FlappyBird wrote last.
    let store = TestStore::new("/userfs");
    let own = SaveRecord {
        modified: Some("2025-01-01T00:00:00Z".parse().unwrap()),
        ..SaveRecord::new().with_file("buckshotroulette_playerstats.shell", vec![1u8, 2, 3])
    };
    let foreign = SaveRecord {
        modified: Some("2025-06-01T00:00:00Z".parse().unwrap()),
        ..SaveRecord::new().with_file("highscore.save", vec![42u8])
    };
    store.put(&buckshot.record_key, &own).unwrap();
    store.put(&flappy.record_key, &foreign).unwrap();

    let engine = SyncEngine::new(
        SyncConfig::new(buckshot, "memory://"),
        Arc::clone(&store.store),
        InProcessService::new(Arc::clone(&server)),
    );
    engine.refresh_capability().await.unwrap();
    assert!(engine.emergency_push());

    let data = server
        .handle_load(&LoadQuery::new("Buckshot", false))
        .unwrap()
        .data
        .unwrap();
    assert_eq!(SingleFileData::from_value(data).unwrap().contents, vec![1, 2, 3]);
    assert!(server.handle_load(&LoadQuery::new("FlappyBird", false)).is_err());
}

#[tokio::test]
async fn survives_store_reopen() {
    let server = Arc::new(SaveServer::new(ServerConfig::default()));
    let profile = GameProfile::undertale();
    let expected = profile.expected_files.clone();
    let (store_a, engine_a) = device(profile.clone(), &server);
    store_a
        .put("timestamp", &complete_record(&expected, &[("undertale.ini", b"[General]")]))
        .unwrap();
    engine_a.sync_once().await;

    let (store_b, engine_b) = device(profile, &server);
    engine_b.sync_once().await;
    drop(engine_b);

    let reopened = FileStore::open(store_b.path(), OpenOptions::existing()).unwrap();
    let record = reopened.get("timestamp").unwrap().unwrap();
    assert_eq!(record.get("undertale.ini"), Some(&FileContents::Binary(b"[General]".to_vec())));
}
