//! Request and response messages of the Save Service.

use crate::payload::RemoteSavePayload;
use crate::single_file::SingleFileData;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Path of the authentication status endpoint.
pub const AUTH_STATUS_PATH: &str = "/api/auth/status";
/// Path of the load endpoint.
pub const LOAD_PATH: &str = "/api/load";
/// Path of the save endpoint.
pub const SAVE_PATH: &str = "/api/save";

/// Response of `GET /api/auth/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether the current session is signed in.
    #[serde(default)]
    pub authenticated: bool,
}

impl AuthStatus {
    /// A signed-in session.
    pub fn authenticated() -> Self {
        Self {
            authenticated: true,
        }
    }

    /// An anonymous session.
    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
        }
    }
}

/// Query of `GET /api/load`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadQuery {
    /// Game identifier.
    pub game_name: String,
    /// Ask for the multi-file payload instead of a single file entry.
    pub multiple_files: bool,
}

impl LoadQuery {
    /// Creates a load query.
    pub fn new(game_name: impl Into<String>, multiple_files: bool) -> Self {
        Self {
            game_name: game_name.into(),
            multiple_files,
        }
    }

    /// Query string pairs, in wire order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("gameName", self.game_name.clone())];
        if self.multiple_files {
            pairs.push(("multipleFiles", "true".to_string()));
        }
        pairs
    }
}

/// Response of `GET /api/load`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LoadResponse {
    /// Whether a save was found.
    #[serde(default)]
    pub success: bool,
    /// The stored payload: a file map for multi-file games, a file entry for
    /// single-file games.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Server-provided reason on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoadResponse {
    /// A successful load carrying `data`.
    pub fn found(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// A load that found nothing.
    pub fn not_found(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(reason.into()),
        }
    }

    /// Returns the data of a successful load.
    ///
    /// `null` data counts as missing.
    pub fn into_data(self) -> Option<Value> {
        if self.success {
            self.data.filter(|d| !d.is_null())
        } else {
            None
        }
    }
}

/// Body of `POST /api/save`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    /// Game identifier.
    pub game_name: String,
    /// Files of a multi-file game.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<RemoteSavePayload>,
    /// File entry of a single-file game.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SingleFileData>,
}

impl SaveRequest {
    /// A save for a multi-file game.
    pub fn multi_file(game_name: impl Into<String>, files: RemoteSavePayload) -> Self {
        Self {
            game_name: game_name.into(),
            files: Some(files),
            data: None,
        }
    }

    /// A save for a single-file game.
    pub fn single_file(game_name: impl Into<String>, data: SingleFileData) -> Self {
        Self {
            game_name: game_name.into(),
            files: None,
            data: Some(data),
        }
    }

    /// Number of files carried by the request.
    pub fn file_count(&self) -> usize {
        self.files.as_ref().map_or(0, RemoteSavePayload::len) + usize::from(self.data.is_some())
    }
}

/// Response of `POST /api/save`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SaveResponse {
    /// Explicit success indicator.
    #[serde(default)]
    pub success: bool,
    /// Server-provided reason on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveResponse {
    /// An accepted save.
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// A rejected save.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(reason.into()),
        }
    }
}
