//! Sync engine state machine.

use crate::config::{PayloadShape, SyncConfig};
use crate::error::{SyncError, SyncResult};
use crate::transport::SaveService;
use cloudsave_protocol::AuthStatus;
use cloudsave_storage::{LocalStore, SaveRecord, StoreBackend, StoreHandle};
use parking_lot::RwLock;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;

/// The current state of the sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Engine is idle, not syncing.
    Idle,
    /// Engine is reading the local record.
    ReadLocal,
    /// Engine is uploading the local record.
    PushRemote,
    /// Engine is downloading the remote save.
    PullRemote,
    /// The last pass failed.
    Error,
}

impl SyncState {
    /// Returns true while a pass is running.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SyncState::ReadLocal | SyncState::PushRemote | SyncState::PullRemote
        )
    }

    /// Returns true if the engine can start a new pass.
    pub fn can_start_sync(&self) -> bool {
        matches!(self, SyncState::Idle | SyncState::Error)
    }
}

/// What the engine knows about the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionCapability {
    /// Not queried yet, or the last query failed.
    #[default]
    Unknown,
    /// The session is signed in.
    Authenticated,
    /// The session is anonymous.
    Anonymous,
}

impl SessionCapability {
    /// Returns true if remote calls are allowed.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionCapability::Authenticated)
    }
}

impl From<AuthStatus> for SessionCapability {
    fn from(status: AuthStatus) -> Self {
        if status.authenticated {
            SessionCapability::Authenticated
        } else {
            SessionCapability::Anonymous
        }
    }
}

/// How a sync pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// The local record was uploaded.
    Pushed {
        /// Files sent.
        files: usize,
    },
    /// The remote save replaced the local record.
    Pulled {
        /// Files written.
        files: usize,
    },
    /// The session is not authenticated; nothing was sent.
    SkippedUnauthenticated,
    /// Another pass was still running.
    SkippedInFlight,
    /// The pass failed; local state is unchanged.
    Failed {
        /// Error message.
        reason: String,
    },
}

impl PassOutcome {
    /// Returns true for [`PassOutcome::Failed`].
    pub fn is_failure(&self) -> bool {
        matches!(self, PassOutcome::Failed { .. })
    }
}

impl fmt::Display for PassOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassOutcome::Pushed { files } => write!(f, "pushed {files} file(s)"),
            PassOutcome::Pulled { files } => write!(f, "pulled {files} file(s)"),
            PassOutcome::SkippedUnauthenticated => write!(f, "skipped: not authenticated"),
            PassOutcome::SkippedInFlight => write!(f, "skipped: pass already running"),
            PassOutcome::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Statistics about sync passes.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Passes that ran to an outcome other than an in-flight skip.
    pub passes: u64,
    /// Successful uploads.
    pub pushes: u64,
    /// Successful downloads.
    pub pulls: u64,
    /// Passes skipped for lack of authentication.
    pub skipped: u64,
    /// Failed passes.
    pub failures: u64,
    /// Last successful push or pull.
    pub last_sync_time: Option<Instant>,
    /// Last error message.
    pub last_error: Option<String>,
}

/// Clears the in-flight flag on every exit path of a pass.
struct PassGuard<'a>(&'a AtomicBool);

impl<'a> PassGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The sync engine keeps one game's local record and the Save Service in
/// step.
pub struct SyncEngine<B: StoreBackend, S: SaveService> {
    config: SyncConfig,
    store: LocalStore<B>,
    service: Arc<S>,
    state: RwLock<SyncState>,
    stats: RwLock<SyncStats>,
    capability: RwLock<SessionCapability>,
    in_flight: AtomicBool,
    wake: Notify,
}

impl<B: StoreBackend, S: SaveService> SyncEngine<B, S> {
    /// Creates a new sync engine.
    pub fn new(config: SyncConfig, backend: Arc<B>, service: S) -> Self {
        let store = LocalStore::new(backend, config.profile.expected_files.clone());
        Self {
            config,
            store,
            service: Arc::new(service),
            state: RwLock::new(SyncState::Idle),
            stats: RwLock::new(SyncStats::default()),
            capability: RwLock::new(SessionCapability::Unknown),
            in_flight: AtomicBool::new(false),
            wake: Notify::new(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns the Save Service client.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Returns the local store adapter.
    pub fn store(&self) -> &LocalStore<B> {
        &self.store
    }

    /// Gets the current state.
    pub fn state(&self) -> SyncState {
        *self.state.read()
    }

    /// Gets the current stats.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Gets the session capability.
    pub fn capability(&self) -> SessionCapability {
        *self.capability.read()
    }

    /// Overrides the session capability, e.g. after a sign-out.
    pub fn set_capability(&self, capability: SessionCapability) {
        *self.capability.write() = capability;
    }

    /// Wakes the run loop for an immediate pass.
    ///
    /// Requests made while a pass runs are coalesced into one.
    pub fn request_sync(&self) {
        self.wake.notify_one();
    }

    fn set_state(&self, state: SyncState) {
        *self.state.write() = state;
    }

    /// Reads the game's record once, repairing missing files.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::StoreUnavailable`] if the store cannot be read.
    pub fn prepare_store(&self) -> SyncResult<SaveRecord> {
        let mut handle = self.store.open()?;
        let record = handle.read(&self.config.profile.record_key)?;
        handle.close();
        Ok(record)
    }

    /// Queries the session state and stores it.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the query fails; the capability is
    /// then reset to [`SessionCapability::Unknown`].
    pub async fn refresh_capability(&self) -> SyncResult<SessionCapability> {
        match self.remote(self.service.auth_status()).await {
            Ok(status) => {
                let capability = SessionCapability::from(status);
                self.set_capability(capability);
                Ok(capability)
            }
            Err(e) => {
                self.set_capability(SessionCapability::Unknown);
                Err(e)
            }
        }
    }

    async fn ensure_authenticated(&self) -> SyncResult<()> {
        if self.capability().is_authenticated() {
            return Ok(());
        }
        match self.refresh_capability().await {
            Ok(capability) if capability.is_authenticated() => Ok(()),
            Ok(_) => Err(SyncError::AuthRequired),
            Err(e) => {
                tracing::debug!(error = %e, "auth status unavailable, treating session as anonymous");
                Err(SyncError::AuthRequired)
            }
        }
    }

    /// Runs one sync pass.
    ///
    /// Returns [`PassOutcome::SkippedInFlight`] without touching anything if
    /// another pass is running.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the pass. The local record is unchanged
    /// except for repair of missing files.
    pub async fn try_sync_pass(&self) -> SyncResult<PassOutcome> {
        let Some(_guard) = PassGuard::acquire(&self.in_flight) else {
            tracing::debug!("sync pass already running, skipping");
            return Ok(PassOutcome::SkippedInFlight);
        };

        let result = self.pass().await;

        let mut stats = self.stats.write();
        stats.passes += 1;
        match &result {
            Ok(outcome) => {
                self.set_state(SyncState::Idle);
                match outcome {
                    PassOutcome::Pushed { .. } => stats.pushes += 1,
                    PassOutcome::Pulled { .. } => stats.pulls += 1,
                    PassOutcome::SkippedUnauthenticated => stats.skipped += 1,
                    PassOutcome::SkippedInFlight | PassOutcome::Failed { .. } => {}
                }
                if matches!(outcome, PassOutcome::Pushed { .. } | PassOutcome::Pulled { .. }) {
                    stats.last_sync_time = Some(Instant::now());
                    stats.last_error = None;
                }
            }
            Err(e) => {
                self.set_state(SyncState::Error);
                stats.failures += 1;
                stats.last_error = Some(e.to_string());
            }
        }
        drop(stats);

        result
    }

    /// Runs one sync pass and logs its failure.
    pub async fn sync_once(&self) -> PassOutcome {
        match self.try_sync_pass().await {
            Ok(outcome) => outcome,
            Err(e) => {
                if e.is_store_failure() {
                    tracing::error!(game = %self.config.profile.game_name, error = %e, "sync pass failed");
                } else {
                    tracing::warn!(game = %self.config.profile.game_name, error = %e, "sync pass failed");
                }
                PassOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn pass(&self) -> SyncResult<PassOutcome> {
        let profile = &self.config.profile;

        self.set_state(SyncState::ReadLocal);
        let mut handle = self.store.open()?;
        let local = handle.read(&profile.record_key)?;

        match self.ensure_authenticated().await {
            Ok(()) => {}
            Err(SyncError::AuthRequired) => {
                tracing::debug!(game = %profile.game_name, "not authenticated, skipping sync");
                handle.close();
                return Ok(PassOutcome::SkippedUnauthenticated);
            }
            Err(e) => return Err(e),
        }

        let outcome = if local.has_content(&profile.expected_files) {
            self.set_state(SyncState::PushRemote);
            self.push(&local).await?
        } else {
            self.set_state(SyncState::PullRemote);
            tracing::debug!(game = %profile.game_name, "no local save, attempting download");
            self.pull(&handle).await?
        };

        handle.close();
        Ok(outcome)
    }

    async fn push(&self, record: &SaveRecord) -> SyncResult<PassOutcome> {
        let profile = &self.config.profile;
        let request = profile.save_request(record);
        let files = request.file_count();

        let response = self.remote(self.service.save(&request)).await?;
        if !response.success {
            return Err(SyncError::RemoteUnavailable(format!(
                "save rejected: {}",
                response.error.as_deref().unwrap_or("no reason given")
            )));
        }

        tracing::info!(game = %profile.game_name, files, "uploaded save");
        Ok(PassOutcome::Pushed { files })
    }

    async fn pull(&self, handle: &StoreHandle<B>) -> SyncResult<PassOutcome> {
        let profile = &self.config.profile;

        let response = self.remote(self.service.load(&profile.load_query())).await?;
        let reason = response.error.clone();
        let data = response.into_data().ok_or_else(|| {
            SyncError::RemoteUnavailable(format!(
                "no save on server: {}",
                reason.as_deref().unwrap_or("empty response")
            ))
        })?;

        let record = profile.record_from_remote(data)?;
        handle.write(&profile.record_key, &record)?;

        tracing::info!(game = %profile.game_name, files = record.len(), "downloaded save");
        Ok(PassOutcome::Pulled {
            files: record.len(),
        })
    }

    /// Uploads the game's newest local save without waiting.
    ///
    /// Meant for shutdown. Multi-file games send the most recently written
    /// record of their store. Single-file games share their store with
    /// other games and send only their own record. Does nothing unless the
    /// session is known to be authenticated and that record has content.
    /// Returns true if a request was handed to the transport.
    pub fn emergency_push(&self) -> bool {
        let profile = &self.config.profile;
        if !self.capability().is_authenticated() {
            tracing::debug!(game = %profile.game_name, "not authenticated, no emergency save");
            return false;
        }

        let found = self.store.open().and_then(|handle| match &profile.shape {
            PayloadShape::MultiFile => handle.latest(),
            PayloadShape::SingleFile { .. } => Ok(handle
                .get(&profile.record_key)?
                .map(|record| (profile.record_key.clone(), record))),
        });
        let (key, record) = match found {
            Ok(Some(found)) => found,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!(error = %e, "cannot read store for emergency save");
                return false;
            }
        };

        if !profile.has_emergency_content(&record) {
            tracing::debug!(game = %profile.game_name, key = %key, "no save content, no emergency save");
            return false;
        }

        self.service.send_beacon(profile.emergency_request(&record));
        tracing::info!(game = %profile.game_name, key = %key, "emergency save sent");
        true
    }

    /// Runs the sync loop until `shutdown` completes.
    ///
    /// Repairs the store and queries the session at once, runs the first
    /// pass after the startup delay, then one pass per interval or per
    /// [`SyncEngine::request_sync`]. Ticks missed while a pass runs are
    /// skipped. On shutdown the emergency push is attempted.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let game = self.config.profile.game_name.as_str();
        tracing::info!(game, interval = ?self.config.tick_period(), "save sync started");

        if let Err(e) = self.prepare_store() {
            tracing::warn!(game, error = %e, "initial store read failed");
        }
        if let Err(e) = self.refresh_capability().await {
            tracing::debug!(game, error = %e, "auth status unavailable");
        }

        tokio::pin!(shutdown);

        let started = tokio::select! {
            _ = &mut shutdown => false,
            _ = tokio::time::sleep(self.config.startup_delay) => true,
        };

        if started {
            let mut ticker = tokio::time::interval(self.config.tick_period());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = ticker.tick() => {}
                    _ = self.wake.notified() => tracing::debug!(game, "sync requested"),
                }
                self.sync_once().await;
            }
        }

        self.emergency_push();
        tracing::info!(game, "save sync stopped");
    }

    async fn remote<T, F>(&self, call: F) -> SyncResult<T>
    where
        F: Future<Output = SyncResult<T>>,
    {
        tokio::time::timeout(self.config.request_timeout, call)
            .await
            .map_err(|_| SyncError::Timeout)?
    }
}
