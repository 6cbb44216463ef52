//! Transport layer abstraction for the Save Service.

use crate::error::{SyncError, SyncResult};
use cloudsave_protocol::{AuthStatus, LoadQuery, LoadResponse, SaveRequest, SaveResponse};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Client side of the Save Service.
///
/// Implementations report transport failures and non-success HTTP statuses
/// as [`SyncError::RemoteUnavailable`] and undecodable bodies as
/// [`SyncError::MalformedPayload`]. The `success` flag of a decoded body is
/// left for the caller to judge.
pub trait SaveService: Send + Sync + 'static {
    /// Queries whether the current session is authenticated.
    fn auth_status(&self) -> impl Future<Output = SyncResult<AuthStatus>> + Send;

    /// Downloads the stored save of a game.
    fn load(&self, query: &LoadQuery) -> impl Future<Output = SyncResult<LoadResponse>> + Send;

    /// Uploads a save.
    fn save(&self, request: &SaveRequest) -> impl Future<Output = SyncResult<SaveResponse>> + Send;

    /// Starts an upload without waiting for it.
    ///
    /// Must return promptly. Delivery is not guaranteed.
    fn send_beacon(&self, request: SaveRequest);
}

impl<S: SaveService> SaveService for Arc<S> {
    fn auth_status(&self) -> impl Future<Output = SyncResult<AuthStatus>> + Send {
        (**self).auth_status()
    }

    fn load(&self, query: &LoadQuery) -> impl Future<Output = SyncResult<LoadResponse>> + Send {
        (**self).load(query)
    }

    fn save(&self, request: &SaveRequest) -> impl Future<Output = SyncResult<SaveResponse>> + Send {
        (**self).save(request)
    }

    fn send_beacon(&self, request: SaveRequest) {
        (**self).send_beacon(request)
    }
}

/// A call received by [`MockSaveService`].
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    /// `auth_status`.
    AuthStatus,
    /// `load` with its query.
    Load(LoadQuery),
    /// `save` with its request.
    Save(SaveRequest),
    /// `send_beacon` with its request.
    Beacon(SaveRequest),
}

/// A scripted Save Service for testing.
///
/// Unset responses fail with [`SyncError::RemoteUnavailable`].
#[derive(Debug, Default)]
pub struct MockSaveService {
    auth: Mutex<Option<AuthStatus>>,
    load_response: Mutex<Option<Result<LoadResponse, String>>>,
    save_response: Mutex<Option<Result<SaveResponse, String>>>,
    delay: Mutex<Option<Duration>>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockSaveService {
    /// Creates a mock with an authenticated session that accepts saves.
    pub fn new() -> Self {
        let mock = Self::default();
        mock.set_authenticated(true);
        mock.set_save_response(SaveResponse::ok());
        mock
    }

    /// Sets the session state reported by `auth_status`.
    pub fn set_authenticated(&self, authenticated: bool) {
        *self.auth.lock() = Some(AuthStatus { authenticated });
    }

    /// Makes `auth_status` fail.
    pub fn fail_auth(&self) {
        *self.auth.lock() = None;
    }

    /// Sets the load response.
    pub fn set_load_response(&self, response: LoadResponse) {
        *self.load_response.lock() = Some(Ok(response));
    }

    /// Makes `load` fail with a transport error.
    pub fn fail_load(&self, message: impl Into<String>) {
        *self.load_response.lock() = Some(Err(message.into()));
    }

    /// Sets the save response.
    pub fn set_save_response(&self, response: SaveResponse) {
        *self.save_response.lock() = Some(Ok(response));
    }

    /// Makes `save` fail with a transport error.
    pub fn fail_save(&self, message: impl Into<String>) {
        *self.save_response.lock() = Some(Err(message.into()));
    }

    /// Delays every async response.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    /// Returns every call received so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    /// Returns the requests passed to `save`.
    pub fn saves(&self) -> Vec<SaveRequest> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                MockCall::Save(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    /// Returns the requests passed to `send_beacon`.
    pub fn beacons(&self) -> Vec<SaveRequest> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                MockCall::Beacon(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of `load` calls received.
    pub fn load_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, MockCall::Load(_)))
            .count()
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().push(call);
    }

    async fn pause(&self) {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl SaveService for MockSaveService {
    async fn auth_status(&self) -> SyncResult<AuthStatus> {
        self.record(MockCall::AuthStatus);
        self.pause().await;
        let auth = *self.auth.lock();
        auth.ok_or_else(|| SyncError::RemoteUnavailable("no mock auth status set".into()))
    }

    async fn load(&self, query: &LoadQuery) -> SyncResult<LoadResponse> {
        self.record(MockCall::Load(query.clone()));
        self.pause().await;
        let response = self.load_response.lock().clone();
        match response {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(SyncError::RemoteUnavailable(message)),
            None => Err(SyncError::RemoteUnavailable("no mock load response set".into())),
        }
    }

    async fn save(&self, request: &SaveRequest) -> SyncResult<SaveResponse> {
        self.record(MockCall::Save(request.clone()));
        self.pause().await;
        let response = self.save_response.lock().clone();
        match response {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(SyncError::RemoteUnavailable(message)),
            None => Err(SyncError::RemoteUnavailable("no mock save response set".into())),
        }
    }

    fn send_beacon(&self, request: SaveRequest) {
        self.record(MockCall::Beacon(request));
    }
}
