//! Main Save Service.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::saves::{SaveTable, StoredSave};
use cloudsave_codec::decode_value;
use cloudsave_protocol::{AuthStatus, LoadQuery, LoadResponse, SaveRequest, SaveResponse};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// The Save Service.
///
/// Handles the three endpoints against an in-memory [`SaveTable`]. With
/// [`ServerConfig::auth_required`] set, the session starts signed out and
/// [`SaveServer::sign_in`] opens it.
pub struct SaveServer {
    config: ServerConfig,
    saves: SaveTable,
    signed_in: AtomicBool,
    requests: AtomicU64,
}

impl SaveServer {
    /// Creates a new server.
    pub fn new(config: ServerConfig) -> Self {
        let signed_in = !config.auth_required;
        Self {
            config,
            saves: SaveTable::new(),
            signed_in: AtomicBool::new(signed_in),
            requests: AtomicU64::new(0),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the stored saves.
    pub fn saves(&self) -> &SaveTable {
        &self.saves
    }

    /// Signs the session in.
    pub fn sign_in(&self) {
        self.signed_in.store(true, Ordering::SeqCst);
    }

    /// Signs the session out.
    pub fn sign_out(&self) {
        self.signed_in.store(false, Ordering::SeqCst);
    }

    /// Number of requests handled.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }

    /// Handles `GET /api/auth/status`.
    pub fn handle_auth_status(&self) -> AuthStatus {
        self.requests.fetch_add(1, Ordering::SeqCst);
        AuthStatus {
            authenticated: self.signed_in.load(Ordering::SeqCst),
        }
    }

    /// Handles `GET /api/load`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::NotAuthenticated`] for a signed-out session
    /// and [`ServerError::NotFound`] if the game has no save in the
    /// requested shape.
    pub fn handle_load(&self, query: &LoadQuery) -> ServerResult<LoadResponse> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.check_session()?;

        let data = self
            .saves
            .get(&query.game_name)
            .and_then(|save| save.to_data(query.multiple_files))
            .ok_or_else(|| ServerError::NotFound(query.game_name.clone()))?;

        tracing::debug!(game = %query.game_name, "save loaded");
        Ok(LoadResponse::found(data))
    }

    /// Handles `POST /api/save`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::NotAuthenticated`] for a signed-out session,
    /// [`ServerError::PayloadTooLarge`] past the size limit, and
    /// [`ServerError::InvalidRequest`] for a request without a game name,
    /// with both or neither of `files` and `data`, or with an undecodable
    /// file.
    pub fn handle_save(&self, request: SaveRequest) -> ServerResult<SaveResponse> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.check_session()?;

        let size = serde_json::to_vec(&request)
            .map_err(|e| ServerError::Internal(e.to_string()))?
            .len();
        if size > self.config.max_payload_bytes {
            return Err(ServerError::PayloadTooLarge {
                size,
                limit: self.config.max_payload_bytes,
            });
        }

        if request.game_name.is_empty() {
            return Err(ServerError::InvalidRequest("missing gameName".into()));
        }

        let save = match (request.files, request.data) {
            (Some(files), None) => {
                for (name, value) in files.iter() {
                    decode_value(Some(value)).map_err(|e| {
                        ServerError::InvalidRequest(format!("file {name}: {e}"))
                    })?;
                }
                StoredSave::Files(files)
            }
            (None, Some(data)) => StoredSave::Single(data),
            _ => {
                return Err(ServerError::InvalidRequest(
                    "exactly one of files and data is required".into(),
                ))
            }
        };

        let revision = self.saves.put(&request.game_name, save);
        tracing::debug!(game = %request.game_name, revision, "save stored");
        Ok(SaveResponse::ok())
    }

    fn check_session(&self) -> ServerResult<()> {
        if self.signed_in.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ServerError::NotAuthenticated)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cloudsave_protocol::{RemoteSavePayload, SingleFileData};
    use serde_json::json;

    fn undertale_save(file0: &str) -> SaveRequest {
        let mut files = RemoteSavePayload::new();
        files.insert("file0", json!(file0));
        files.insert("config.ini", json!("[General]"));
        SaveRequest::multi_file("Undertale", files)
    }

    #[test]
    fn server_lifecycle() {
        let server = SaveServer::new(ServerConfig::default());
        assert!(server.handle_auth_status().authenticated);
        assert!(server.saves().is_empty());
        assert_eq!(server.request_count(), 1);
    }

    #[test]
    fn full_save_flow() {
        let server = SaveServer::new(ServerConfig::default());
        let query = LoadQuery::new("Undertale", true);

        // Nothing stored yet
        assert!(matches!(server.handle_load(&query), Err(ServerError::NotFound(_))));

        let response = server
            .handle_save(undertale_save("data:application/octet-stream;base64,AQID"))
            .unwrap();
        assert!(response.success);

        let response = server.handle_load(&query).unwrap();
        assert_eq!(
            response.into_data(),
            Some(json!({
                "config.ini": "[General]",
                "file0": "data:application/octet-stream;base64,AQID"
            }))
        );
    }

    #[test]
    fn single_file_flow() {
        let server = SaveServer::new(ServerConfig::default());
        let data = SingleFileData {
            timestamp: None,
            mode: Some(33206),
            contents: vec![3, 200],
        };
        server
            .handle_save(SaveRequest::single_file("Buckshot", data))
            .unwrap();

        let response = server
            .handle_load(&LoadQuery::new("Buckshot", false))
            .unwrap();
        assert_eq!(
            response.into_data(),
            Some(json!({"mode": 33206, "contents": [3, -56]}))
        );
        assert!(server.handle_load(&LoadQuery::new("Buckshot", true)).is_err());
    }

    #[test]
    fn signed_out_session_is_rejected() {
        let server = SaveServer::new(ServerConfig::new().with_auth_required(true));
        assert!(!server.handle_auth_status().authenticated);
        assert!(matches!(
            server.handle_save(undertale_save("")),
            Err(ServerError::NotAuthenticated)
        ));
        assert!(matches!(
            server.handle_load(&LoadQuery::new("Undertale", true)),
            Err(ServerError::NotAuthenticated)
        ));

        server.sign_in();
        assert!(server.handle_auth_status().authenticated);
        assert!(server.handle_save(undertale_save("")).is_ok());

        server.sign_out();
        assert!(!server.handle_auth_status().authenticated);
    }

    #[test]
    fn malformed_saves_are_rejected() {
        let server = SaveServer::new(ServerConfig::default());

        let err = server
            .handle_save(undertale_save("data:application/octet-stream;base64,@@"))
            .unwrap_err();
        assert!(matches!(err, ServerError::InvalidRequest(ref msg) if msg.contains("file0")));

        let mut request = undertale_save("");
        request.game_name.clear();
        assert!(matches!(
            server.handle_save(request),
            Err(ServerError::InvalidRequest(_))
        ));

        let request = SaveRequest {
            game_name: "Undertale".into(),
            files: None,
            data: None,
        };
        assert!(matches!(
            server.handle_save(request),
            Err(ServerError::InvalidRequest(_))
        ));
        assert!(server.saves().is_empty());
    }

    #[test]
    fn oversized_save_is_rejected() {
        let server = SaveServer::new(ServerConfig::new().with_max_payload_bytes(64));
        let big = format!("data:application/octet-stream;base64,{}", "A".repeat(128));
        let err = server.handle_save(undertale_save(&big)).unwrap_err();
        assert_eq!(err.status_code(), 413);
    }
}
