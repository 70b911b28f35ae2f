use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use chemviz_core::auth::{AuthConfig, AuthContext, Credentials};
use chemviz_core::config::SessionConfig;
use chemviz_core::dataset::{Dataset, DatasetApi, DatasetId, UploadFile, UploadPhase};
use chemviz_core::error::{ChemvizError, Result};
use chemviz_core::history::HistoryStore;
use chemviz_core::projection::{ChartProjector, ChartSeries, SummaryView, TableProjection};
use chemviz_core::report::{ExportReceipt, ReportExporter};
use chemviz_core::session::{Outcome, SessionState, status};
use tokio::sync::{Mutex, RwLock, watch};

use super::generation::{Generation, GenerationCounter};
use super::upload_guard::UploadGuard;

/// Mutable part of the session. Credentials live in the [`AuthContext`].
#[derive(Debug, Default)]
struct SessionData {
    current_dataset: Option<Arc<Dataset>>,
    history: HistoryStore,
    upload_phase: UploadPhase,
    status_message: String,
    last_report: Option<ExportReceipt>,
}

/// Orchestrates the dataset session on behalf of a UI.
///
/// `DatasetSessionController` is responsible for:
/// - Loading history and the latest dataset on startup and after every
///   credentials change
/// - The upload workflow (validation, upload, dependent history refresh)
/// - Selecting past uploads
/// - Fetching and exporting reports
/// - Serving the chart, table and summary projections of the current dataset
///
/// Requests are never cancelled. Each response is checked against the
/// generation counter of the state slot it targets and dropped if a newer
/// request for that slot was issued in the meantime.
pub struct DatasetSessionController {
    api: Arc<dyn DatasetApi>,
    exporter: Arc<dyn ReportExporter>,
    auth: AuthContext,
    /// Subscription to `auth`; the only trigger for credential refreshes.
    credentials_changes: Mutex<watch::Receiver<Arc<AuthConfig>>>,
    state: RwLock<SessionData>,
    dataset_generation: GenerationCounter,
    history_generation: GenerationCounter,
    upload_in_flight: AtomicBool,
    chart: ChartProjector,
}

impl DatasetSessionController {
    /// Creates a controller around an existing authorization context.
    ///
    /// No request is issued until [`initialize`](Self::initialize) is called.
    pub fn new(
        auth: AuthContext,
        api: Arc<dyn DatasetApi>,
        exporter: Arc<dyn ReportExporter>,
    ) -> Self {
        let credentials_changes = Mutex::new(auth.subscribe());
        Self {
            api,
            exporter,
            auth,
            credentials_changes,
            state: RwLock::new(SessionData::default()),
            dataset_generation: GenerationCounter::new(),
            history_generation: GenerationCounter::new(),
            upload_in_flight: AtomicBool::new(false),
            chart: ChartProjector::new(),
        }
    }

    /// Creates a controller seeded with the configured credentials.
    pub fn from_config(
        config: &SessionConfig,
        api: Arc<dyn DatasetApi>,
        exporter: Arc<dyn ReportExporter>,
    ) -> Self {
        Self::new(AuthContext::new(config.credentials.clone()), api, exporter)
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    // ============================================================================
    // Credentials
    // ============================================================================

    /// Replaces the credentials. Returns whether they changed.
    ///
    /// This only publishes the change; the refresh runs when the change is
    /// observed by [`on_credentials_changed`](Self::on_credentials_changed)
    /// or [`watch_credentials`](Self::watch_credentials).
    pub fn set_credentials(&self, credentials: Credentials) -> bool {
        self.auth.set_credentials(credentials)
    }

    /// Runs one refresh if the credentials changed since the last
    /// observation.
    ///
    /// # Returns
    ///
    /// The `(history, latest dataset)` outcomes of the refresh, or `None`
    /// if the credentials did not change.
    pub async fn on_credentials_changed(&self) -> Option<(Outcome, Outcome)> {
        let changed = {
            let mut receiver = self.credentials_changes.lock().await;
            match receiver.has_changed() {
                Ok(true) => {
                    receiver.borrow_and_update();
                    true
                }
                _ => false,
            }
        };

        if !changed {
            return None;
        }
        tracing::info!("[Session] Credentials changed, refreshing");
        Some(self.initialize().await)
    }

    /// Refreshes after every credentials change, until the context closes.
    ///
    /// Intended to run as a background task. The watcher holds its own
    /// subscription, so it observes changes independently of
    /// [`on_credentials_changed`](Self::on_credentials_changed).
    pub async fn watch_credentials(&self) {
        let mut receiver = self.auth.subscribe();
        while receiver.changed().await.is_ok() {
            tracing::info!("[Session] Credentials changed, refreshing");
            self.initialize().await;
        }
    }

    // ============================================================================
    // Operations
    // ============================================================================

    /// Loads history and the latest dataset.
    ///
    /// Both requests are issued together and applied independently as they
    /// resolve. A history failure is reported on the status line; a missing
    /// latest dataset is not an error.
    ///
    /// # Returns
    ///
    /// `(history outcome, latest dataset outcome)`
    pub async fn initialize(&self) -> (Outcome, Outcome) {
        let auth = self.auth.snapshot();
        let history_generation = self.history_generation.issue();
        let dataset_generation = self.dataset_generation.issue();
        tracing::debug!(
            "[Session] Initializing as '{}' (history #{}, dataset #{})",
            auth.username(),
            history_generation.value(),
            dataset_generation.value()
        );

        tokio::join!(
            self.load_history(&auth, history_generation),
            self.load_latest(&auth, dataset_generation),
        )
    }

    /// Reloads the upload history.
    pub async fn refresh_history(&self) -> Outcome {
        let auth = self.auth.snapshot();
        let generation = self.history_generation.issue();
        self.load_history(&auth, generation).await
    }

    /// Uploads a CSV file.
    ///
    /// Without a file, fails locally with no network call. On success the
    /// returned dataset replaces the current one and the history is
    /// refreshed afterwards. A second upload while one is in flight is
    /// rejected.
    pub async fn upload(&self, file: Option<UploadFile>) -> Outcome {
        let Some(guard) = UploadGuard::try_acquire(&self.upload_in_flight) else {
            tracing::warn!("[Session] Upload rejected: another upload is in flight");
            self.set_status(status::UPLOAD_IN_PROGRESS).await;
            return Outcome::Failed(ChemvizError::UploadInProgress);
        };

        self.state.write().await.upload_phase = UploadPhase::Validating;

        let Some(file) = file else {
            let mut state = self.state.write().await;
            state.upload_phase = UploadPhase::Idle;
            state.status_message = status::NO_FILE_SELECTED.to_string();
            return Outcome::Failed(ChemvizError::validation(status::NO_FILE_SELECTED));
        };

        {
            let mut state = self.state.write().await;
            state.upload_phase = UploadPhase::Uploading;
            state.status_message = status::UPLOADING.to_string();
        }

        let auth = self.auth.snapshot();
        let generation = self.dataset_generation.issue();
        tracing::info!(
            "[Session] Uploading '{}' ({} bytes)",
            file.name,
            file.bytes.len()
        );
        let result = self.api.upload(&auth, &file).await;

        let outcome = {
            let mut state = self.state.write().await;
            state.upload_phase = UploadPhase::Idle;
            match result {
                Ok(dataset) => {
                    state.status_message = status::UPLOAD_SUCCEEDED.to_string();
                    if self.dataset_generation.is_current(generation) {
                        tracing::info!("[Session] Upload stored as dataset {}", dataset.id);
                        state.current_dataset = Some(Arc::new(dataset));
                        Outcome::Applied
                    } else {
                        tracing::debug!(
                            "[Session] Upload response for dataset {} superseded, not shown",
                            dataset.id
                        );
                        Outcome::Discarded
                    }
                }
                Err(e) => {
                    tracing::warn!("[Session] Upload of '{}' failed: {}", file.name, e);
                    state.status_message = e.user_message(status::UPLOAD_FAILED);
                    return Outcome::Failed(e);
                }
            }
        };
        drop(guard);

        // The upload changed the backend's history either way
        self.refresh_history().await;
        outcome
    }

    /// Loads a past upload by id.
    ///
    /// On failure the current dataset is kept and the entry stays in the
    /// history, so the selection can be retried.
    pub async fn select_history_entry(&self, id: DatasetId) -> Outcome {
        let auth = self.auth.snapshot();
        let generation = self.dataset_generation.issue();
        tracing::debug!(
            "[Session] Loading dataset {} (#{})",
            id,
            generation.value()
        );
        let result = self.api.fetch_dataset(&auth, id).await;

        let mut state = self.state.write().await;
        if !self.dataset_generation.is_current(generation) {
            tracing::debug!("[Session] Discarding stale response for dataset {}", id);
            return Outcome::Discarded;
        }

        match result {
            Ok(dataset) => {
                state.current_dataset = Some(Arc::new(dataset));
                state.status_message = status::DATASET_LOADED.to_string();
                Outcome::Applied
            }
            Err(e) => {
                tracing::warn!("[Session] Failed to load dataset {}: {}", id, e);
                state.status_message = status::DATASET_FAILED.to_string();
                Outcome::Failed(e)
            }
        }
    }

    /// Loads the history entry at a display position (0-based).
    pub async fn select_history_item(&self, index: usize) -> Outcome {
        let id = self.state.read().await.history.get(index).map(|entry| entry.id);
        match id {
            Some(id) => self.select_history_entry(id).await,
            None => {
                let message = format!("No history entry at position {}.", index + 1);
                self.set_status(&message).await;
                Outcome::Failed(ChemvizError::validation(message))
            }
        }
    }

    /// Fetches the report for the current dataset and hands it to the
    /// exporter. Does nothing without a current dataset.
    pub async fn download_report(&self) -> Outcome {
        let Some(dataset) = self.current_dataset().await else {
            tracing::debug!("[Session] No dataset loaded, skipping report");
            return Outcome::Skipped;
        };

        let auth = self.auth.snapshot();
        match self.fetch_and_export(&auth, dataset.id).await {
            Ok(receipt) => {
                let mut state = self.state.write().await;
                state.status_message = status::REPORT_SAVED.to_string();
                state.last_report = Some(receipt);
                Outcome::Applied
            }
            Err(e) => {
                tracing::warn!("[Session] Report for dataset {} failed: {}", dataset.id, e);
                self.set_status(status::REPORT_FAILED).await;
                Outcome::Failed(e)
            }
        }
    }

    // ============================================================================
    // Read projections
    // ============================================================================

    /// Returns a snapshot of the whole session.
    pub async fn snapshot(&self) -> SessionState {
        let state = self.state.read().await;
        SessionState {
            credentials: self.auth.credentials(),
            current_dataset: state.current_dataset.clone(),
            history: state.history.clone(),
            upload_phase: state.upload_phase,
            status_message: state.status_message.clone(),
            last_report: state.last_report.clone(),
        }
    }

    pub async fn current_dataset(&self) -> Option<Arc<Dataset>> {
        self.state.read().await.current_dataset.clone()
    }

    pub async fn history(&self) -> HistoryStore {
        self.state.read().await.history.clone()
    }

    pub async fn status_message(&self) -> String {
        self.state.read().await.status_message.clone()
    }

    /// Type distribution series, recomputed only when the current dataset
    /// is replaced.
    pub async fn chart(&self) -> Arc<ChartSeries> {
        let current = self.current_dataset().await;
        self.chart.project(current.as_ref())
    }

    pub async fn table(&self) -> TableProjection {
        let current = self.current_dataset().await;
        TableProjection::from_dataset(current.as_deref())
    }

    pub async fn summary_view(&self) -> SummaryView {
        let current = self.current_dataset().await;
        SummaryView::from_dataset(current.as_deref())
    }

    // ============================================================================
    // Internals
    // ============================================================================

    async fn load_history(&self, auth: &AuthConfig, generation: Generation) -> Outcome {
        let result = self.api.fetch_history(auth).await;

        let mut state = self.state.write().await;
        if !self.history_generation.is_current(generation) {
            tracing::debug!(
                "[Session] Discarding stale history response (#{})",
                generation.value()
            );
            return Outcome::Discarded;
        }

        match result {
            Ok(entries) => {
                tracing::debug!("[Session] History loaded: {} entries", entries.len());
                state.history = HistoryStore::from(entries);
                Outcome::Applied
            }
            Err(e) => {
                tracing::warn!("[Session] History fetch failed: {}", e);
                state.status_message = status::HISTORY_FAILED.to_string();
                Outcome::Failed(e)
            }
        }
    }

    async fn load_latest(&self, auth: &AuthConfig, generation: Generation) -> Outcome {
        let result = self.api.fetch_latest(auth).await;

        let mut state = self.state.write().await;
        if !self.dataset_generation.is_current(generation) {
            tracing::debug!(
                "[Session] Discarding stale latest dataset response (#{})",
                generation.value()
            );
            return Outcome::Discarded;
        }

        match result {
            Ok(Some(dataset)) => {
                tracing::debug!("[Session] Latest dataset is {}", dataset.id);
                state.current_dataset = Some(Arc::new(dataset));
                Outcome::Applied
            }
            Ok(None) => {
                tracing::debug!("[Session] No dataset uploaded yet");
                Outcome::Skipped
            }
            Err(e) => {
                // Only not-found means "no dataset yet"; anything else is
                // logged but left to the history fetch to report.
                tracing::warn!(
                    kind = e.kind(),
                    "[Session] Latest dataset fetch failed: {}",
                    e
                );
                Outcome::Failed(e)
            }
        }
    }

    async fn fetch_and_export(&self, auth: &AuthConfig, id: DatasetId) -> Result<ExportReceipt> {
        let report = self.api.fetch_report(auth, id).await?;
        tracing::debug!(
            "[Session] Report for dataset {} received ({} bytes)",
            id,
            report.bytes.len()
        );
        self.exporter.export(report).await
    }

    async fn set_status(&self, message: &str) {
        self.state.write().await.status_message = message.to_string();
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
