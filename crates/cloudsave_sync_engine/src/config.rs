//! Configuration for the sync engine.

use cloudsave_protocol::{
    LoadQuery, ProtocolResult, RemoteSavePayload, SaveRequest, SingleFileData,
};
use cloudsave_storage::{ExpectedFileSet, SaveRecord};
use serde_json::Value;
use std::time::Duration;

/// Save files of Undertale, in upload order.
pub const UNDERTALE_FILES: [&str; 7] = [
    "file0",
    "file8",
    "file9",
    "config.ini",
    "undertale.ini",
    "trophies.ini",
    "decomp_vars.ini",
];

/// How a game's save travels over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadShape {
    /// A map of logical filename to data URI (`files`).
    MultiFile,
    /// One engine file entry with signed byte contents (`data`).
    SingleFile {
        /// Logical name of the file inside the record.
        file_name: String,
    },
}

/// Compiled-in constants for one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameProfile {
    /// Identifier sent as `gameName`.
    pub game_name: String,
    /// Name of the local store.
    pub store_name: String,
    /// Key of the record holding the save.
    pub record_key: String,
    /// Files that must exist in the record.
    pub expected_files: ExpectedFileSet,
    /// Wire shape of uploads and downloads.
    pub shape: PayloadShape,
}

impl GameProfile {
    /// A game whose record holds several files sent as one map.
    pub fn multi_file<I, S>(
        game_name: impl Into<String>,
        store_name: impl Into<String>,
        record_key: impl Into<String>,
        files: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            game_name: game_name.into(),
            store_name: store_name.into(),
            record_key: record_key.into(),
            expected_files: ExpectedFileSet::new(files),
            shape: PayloadShape::MultiFile,
        }
    }

    /// A game whose record holds exactly one file.
    pub fn single_file(
        game_name: impl Into<String>,
        store_name: impl Into<String>,
        record_key: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        let file_name = file_name.into();
        Self {
            game_name: game_name.into(),
            store_name: store_name.into(),
            record_key: record_key.into(),
            expected_files: ExpectedFileSet::new([file_name.clone()]),
            shape: PayloadShape::SingleFile { file_name },
        }
    }

    /// Undertale: seven files under the `timestamp` key of `/_savedata`.
    pub fn undertale() -> Self {
        Self::multi_file("Undertale", "/_savedata", "timestamp", UNDERTALE_FILES)
    }

    /// Buckshot Roulette: the player stats file.
    pub fn buckshot() -> Self {
        Self::single_file(
            "Buckshot",
            "/userfs",
            "/userfs/godot/app_userdata/Buckshot Roulette/buckshotroulette_playerstats.shell",
            "buckshotroulette_playerstats.shell",
        )
    }

    /// Flappy Bird remake: the high score file.
    pub fn flappy_bird() -> Self {
        Self::single_file(
            "FlappyBird",
            "/userfs",
            "/userfs/godot/app_userdata/Flappy Bird Remake/highscore.save",
            "highscore.save",
        )
    }

    /// Looks up a built-in profile by game name, ignoring case.
    pub fn builtin(name: &str) -> Option<Self> {
        [Self::undertale(), Self::buckshot(), Self::flappy_bird()]
            .into_iter()
            .find(|profile| profile.game_name.eq_ignore_ascii_case(name))
    }

    /// Returns true for games sending a file map.
    pub fn is_multi_file(&self) -> bool {
        self.shape == PayloadShape::MultiFile
    }

    /// The load query for this game.
    pub fn load_query(&self) -> LoadQuery {
        LoadQuery::new(&self.game_name, self.is_multi_file())
    }

    /// Builds the upload of a sync pass: every expected file.
    pub fn save_request(&self, record: &SaveRecord) -> SaveRequest {
        match &self.shape {
            PayloadShape::MultiFile => SaveRequest::multi_file(
                &self.game_name,
                RemoteSavePayload::from_record(record, &self.expected_files),
            ),
            PayloadShape::SingleFile { file_name } => {
                SaveRequest::single_file(&self.game_name, SingleFileData::from_record(record, file_name))
            }
        }
    }

    /// Returns true if `record` holds something worth a teardown upload.
    ///
    /// Single-file games need their own file with content; a record of
    /// another game sharing the store never qualifies.
    pub fn has_emergency_content(&self, record: &SaveRecord) -> bool {
        match &self.shape {
            PayloadShape::MultiFile => record.files.values().any(|contents| !contents.is_empty()),
            PayloadShape::SingleFile { file_name } => record
                .get(file_name)
                .is_some_and(|contents| !contents.is_empty()),
        }
    }

    /// Builds the teardown upload: exactly the entries of `record`.
    pub fn emergency_request(&self, record: &SaveRecord) -> SaveRequest {
        match &self.shape {
            PayloadShape::MultiFile => {
                SaveRequest::multi_file(&self.game_name, RemoteSavePayload::from_entries(record))
            }
            PayloadShape::SingleFile { file_name } => {
                SaveRequest::single_file(&self.game_name, SingleFileData::from_record(record, file_name))
            }
        }
    }

    /// Turns the `data` of a load response into a complete record.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if `data` does not have this game's shape
    /// or a file cannot be decoded.
    pub fn record_from_remote(&self, data: Value) -> ProtocolResult<SaveRecord> {
        match &self.shape {
            PayloadShape::MultiFile => {
                RemoteSavePayload::from_value(data)?.to_record(&self.expected_files)
            }
            PayloadShape::SingleFile { file_name } => {
                Ok(SingleFileData::from_value(data)?.into_record(file_name))
            }
        }
    }
}

/// Shortest period between sync passes.
pub const MIN_SYNC_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for sync operations.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// The game being synced.
    pub profile: GameProfile,
    /// Base URL of the Save Service.
    pub server_url: String,
    /// Period between sync passes.
    pub sync_interval: Duration,
    /// Delay before the first pass.
    pub startup_delay: Duration,
    /// Bound on each remote call.
    pub request_timeout: Duration,
    /// `Cookie` header value carrying the session.
    pub session_cookie: Option<String>,
}

impl SyncConfig {
    /// Creates a new sync configuration.
    pub fn new(profile: GameProfile, server_url: impl Into<String>) -> Self {
        Self {
            profile,
            server_url: server_url.into(),
            sync_interval: Duration::from_secs(15),
            startup_delay: Duration::from_secs(2),
            request_timeout: Duration::from_secs(10),
            session_cookie: None,
        }
    }

    /// Sets the period between passes, at least [`MIN_SYNC_INTERVAL`].
    pub fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = interval.max(MIN_SYNC_INTERVAL);
        self
    }

    /// The period the run loop ticks at.
    ///
    /// `sync_interval` raised to [`MIN_SYNC_INTERVAL`], since the field can
    /// be set directly.
    pub fn tick_period(&self) -> Duration {
        self.sync_interval.max(MIN_SYNC_INTERVAL)
    }

    /// Sets the delay before the first pass.
    pub fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }

    /// Sets the per-call timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the session cookie.
    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }
}
