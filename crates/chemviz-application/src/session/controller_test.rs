#[cfg(test)]
mod tests {
    use crate::session::controller::DatasetSessionController;
    use async_trait::async_trait;
    use chemviz_core::auth::{AuthConfig, AuthContext, Credentials};
    use chemviz_core::dataset::{Dataset, DatasetApi, DatasetId, HistoryEntry, UploadFile, UploadPhase};
    use chemviz_core::error::{ChemvizError, Result};
    use chemviz_core::report::{ExportReceipt, ReportDocument, ReportExporter};
    use chemviz_core::session::{Outcome, status};
    use serde_json::json;
    use std::collections::{HashMap, VecDeque};
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::Notify;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        History(String),
        Latest(String),
        Dataset(DatasetId),
        Upload(String),
        Report(DatasetId),
    }

    // Mock DatasetApi with canned responses and optional gates that hold a
    // response until the test releases it
    struct MockDatasetApi {
        calls: Mutex<Vec<Call>>,
        history: Mutex<Result<Vec<HistoryEntry>>>,
        history_queue: Mutex<VecDeque<Result<Vec<HistoryEntry>>>>,
        history_gate: Mutex<Option<Arc<Notify>>>,
        latest: Mutex<Result<Option<Dataset>>>,
        datasets: Mutex<HashMap<DatasetId, Dataset>>,
        upload_response: Mutex<Result<Dataset>>,
        report: Mutex<Result<ReportDocument>>,
        dataset_gates: Mutex<HashMap<DatasetId, Arc<Notify>>>,
        upload_gate: Mutex<Option<Arc<Notify>>>,
    }

    impl MockDatasetApi {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                history: Mutex::new(Ok(Vec::new())),
                history_queue: Mutex::new(VecDeque::new()),
                history_gate: Mutex::new(None),
                latest: Mutex::new(Ok(None)),
                datasets: Mutex::new(HashMap::new()),
                upload_response: Mutex::new(Err(ChemvizError::server(500, None))),
                report: Mutex::new(Err(ChemvizError::not_found("Report", "none"))),
                dataset_gates: Mutex::new(HashMap::new()),
                upload_gate: Mutex::new(None),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }

        fn set_history(&self, result: Result<Vec<HistoryEntry>>) {
            *self.history.lock().unwrap() = result;
        }

        // Queued responses are handed out one per call, ahead of `history`
        fn queue_history(&self, result: Result<Vec<HistoryEntry>>) {
            self.history_queue.lock().unwrap().push_back(result);
        }

        // Holds only the next history call until released
        fn gate_next_history(&self) -> Arc<Notify> {
            let gate = Arc::new(Notify::new());
            *self.history_gate.lock().unwrap() = Some(gate.clone());
            gate
        }

        fn set_latest(&self, result: Result<Option<Dataset>>) {
            *self.latest.lock().unwrap() = result;
        }

        fn add_dataset(&self, dataset: Dataset) {
            self.datasets.lock().unwrap().insert(dataset.id, dataset);
        }

        fn set_upload_response(&self, result: Result<Dataset>) {
            *self.upload_response.lock().unwrap() = result;
        }

        fn set_report(&self, result: Result<ReportDocument>) {
            *self.report.lock().unwrap() = result;
        }

        fn gate_dataset(&self, id: DatasetId) -> Arc<Notify> {
            let gate = Arc::new(Notify::new());
            self.dataset_gates.lock().unwrap().insert(id, gate.clone());
            gate
        }

        fn gate_upload(&self) -> Arc<Notify> {
            let gate = Arc::new(Notify::new());
            *self.upload_gate.lock().unwrap() = Some(gate.clone());
            gate
        }
    }

    #[async_trait]
    impl DatasetApi for MockDatasetApi {
        async fn fetch_history(&self, auth: &AuthConfig) -> Result<Vec<HistoryEntry>> {
            self.record(Call::History(auth.username().to_string()));
            let queued = self.history_queue.lock().unwrap().pop_front();
            let response = queued.unwrap_or_else(|| self.history.lock().unwrap().clone());
            let gate = self.history_gate.lock().unwrap().take();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            response
        }

        async fn fetch_latest(&self, auth: &AuthConfig) -> Result<Option<Dataset>> {
            self.record(Call::Latest(auth.username().to_string()));
            self.latest.lock().unwrap().clone()
        }

        async fn fetch_dataset(&self, _auth: &AuthConfig, id: DatasetId) -> Result<Dataset> {
            self.record(Call::Dataset(id));
            let gate = self.dataset_gates.lock().unwrap().get(&id).cloned();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            self.datasets
                .lock()
                .unwrap()
                .get(&id)
                .cloned()
                .ok_or_else(|| ChemvizError::not_found("Dataset", id.to_string()))
        }

        async fn upload(&self, _auth: &AuthConfig, file: &UploadFile) -> Result<Dataset> {
            self.record(Call::Upload(file.name.clone()));
            let gate = self.upload_gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            self.upload_response.lock().unwrap().clone()
        }

        async fn fetch_report(&self, _auth: &AuthConfig, id: DatasetId) -> Result<ReportDocument> {
            self.record(Call::Report(id));
            self.report.lock().unwrap().clone()
        }
    }

    // Mock ReportExporter that records what it was asked to save
    struct MockReportExporter {
        exported: Mutex<Vec<ReportDocument>>,
        fail: bool,
    }

    impl MockReportExporter {
        fn new() -> Self {
            Self {
                exported: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                exported: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn exported(&self) -> Vec<ReportDocument> {
            self.exported.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ReportExporter for MockReportExporter {
        async fn export(&self, report: ReportDocument) -> Result<ExportReceipt> {
            if self.fail {
                return Err(ChemvizError::export("disk full"));
            }
            let receipt = ExportReceipt {
                location: PathBuf::from("/reports").join(&report.file_name),
                bytes_written: report.bytes.len() as u64,
            };
            self.exported.lock().unwrap().push(report);
            Ok(receipt)
        }
    }

    fn setup() -> (Arc<MockDatasetApi>, Arc<MockReportExporter>) {
        (Arc::new(MockDatasetApi::new()), Arc::new(MockReportExporter::new()))
    }

    fn controller(
        api: &Arc<MockDatasetApi>,
        exporter: &Arc<MockReportExporter>,
    ) -> DatasetSessionController {
        DatasetSessionController::new(
            AuthContext::new(Credentials::new("admin", "admin123")),
            api.clone(),
            exporter.clone(),
        )
    }

    fn dataset(id: DatasetId, type_dist: serde_json::Value) -> Dataset {
        serde_json::from_value(json!({
            "id": id,
            "name": format!("dataset-{id}.csv"),
            "columns": ["Equipment Name", "Type"],
            "data": [{"Equipment Name": "P-1", "Type": "Pump"}],
            "summary": {"total": 1, "type_dist": type_dist}
        }))
        .unwrap()
    }

    fn equipment_upload() -> Dataset {
        serde_json::from_value(json!({
            "id": 7,
            "name": "equipment.csv",
            "columns": ["Equipment Name", "Type", "Flowrate", "Pressure", "Temperature"],
            "data": [{"Equipment Name": "P-1", "Type": "Pump", "Flowrate": 10.0}],
            "summary": {
                "total": 10,
                "avg_flow": 10.0,
                "avg_pressure": 2.0,
                "avg_temp": 50.0,
                "type_dist": {"Pump": 4, "Valve": 6}
            }
        }))
        .unwrap()
    }

    fn entry(id: DatasetId) -> HistoryEntry {
        HistoryEntry {
            id,
            name: format!("dataset-{id}.csv"),
            uploaded_at: None,
            row_count: Some(1),
            summary: None,
        }
    }

    fn csv_file() -> UploadFile {
        UploadFile::new("equipment.csv", b"Equipment Name,Type\nP-1,Pump\n".to_vec())
    }

    // ============================================================================
    // Initialization and credentials
    // ============================================================================

    #[tokio::test]
    async fn test_initialize_fetches_history_and_latest_once() {
        let (api, exporter) = setup();
        api.set_history(Ok(vec![entry(2), entry(1)]));
        api.set_latest(Ok(Some(dataset(2, json!({"Pump": 1})))));
        let controller = controller(&api, &exporter);

        let (history, latest) = controller.initialize().await;

        assert!(history.is_applied());
        assert!(latest.is_applied());
        assert_eq!(
            api.calls(),
            vec![Call::History("admin".into()), Call::Latest("admin".into())]
        );
        let state = controller.snapshot().await;
        assert_eq!(state.history.len(), 2);
        assert_eq!(state.current_dataset.unwrap().id, 2);
        assert_eq!(state.status_message, "");
        assert_eq!(state.upload_phase, UploadPhase::Idle);
    }

    #[tokio::test]
    async fn test_reads_do_not_issue_requests() {
        let (api, exporter) = setup();
        let controller = controller(&api, &exporter);

        controller.snapshot().await;
        controller.chart().await;
        controller.table().await;
        controller.summary_view().await;

        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_history_failure_sets_status() {
        let (api, exporter) = setup();
        api.set_history(Err(ChemvizError::Auth { status: 401 }));
        let controller = controller(&api, &exporter);

        let (history, _) = controller.initialize().await;

        assert_eq!(history.error(), Some(&ChemvizError::Auth { status: 401 }));
        assert_eq!(controller.status_message().await, status::HISTORY_FAILED);
    }

    #[tokio::test]
    async fn test_missing_latest_dataset_is_silent() {
        let (api, exporter) = setup();
        api.set_latest(Ok(None));
        let controller = controller(&api, &exporter);

        let (_, latest) = controller.initialize().await;

        assert_eq!(latest, Outcome::Skipped);
        assert!(controller.current_dataset().await.is_none());
        assert_eq!(controller.status_message().await, "");
    }

    #[tokio::test]
    async fn test_latest_failure_keeps_status_and_dataset() {
        let (api, exporter) = setup();
        api.set_latest(Ok(Some(dataset(3, json!({"Pump": 1})))));
        let controller = controller(&api, &exporter);
        controller.initialize().await;

        api.set_latest(Err(ChemvizError::network("connection refused")));
        let (_, latest) = controller.initialize().await;

        assert!(matches!(latest, Outcome::Failed(ChemvizError::Network(_))));
        assert_eq!(controller.current_dataset().await.unwrap().id, 3);
        assert_eq!(controller.status_message().await, "");
    }

    #[tokio::test]
    async fn test_credentials_change_refreshes_once() {
        let (api, exporter) = setup();
        let controller = controller(&api, &exporter);

        assert!(controller.auth().set_username("operator"));
        let (history, latest) = controller.on_credentials_changed().await.unwrap();
        assert!(history.is_applied());
        assert_eq!(latest, Outcome::Skipped);
        // Already observed
        assert!(controller.on_credentials_changed().await.is_none());

        assert_eq!(
            api.calls(),
            vec![
                Call::History("operator".into()),
                Call::Latest("operator".into())
            ]
        );
    }

    #[tokio::test]
    async fn test_identical_credentials_do_not_refresh() {
        let (api, exporter) = setup();
        let controller = controller(&api, &exporter);

        assert!(!controller.set_credentials(Credentials::new("admin", "admin123")));
        assert!(controller.on_credentials_changed().await.is_none());

        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_watch_credentials_reacts_to_change() {
        let (api, exporter) = setup();
        let controller = controller(&api, &exporter);

        let driver = async {
            // Let the watcher subscribe first
            tokio::task::yield_now().await;
            controller.auth().set_password("rotated");
            for _ in 0..100 {
                if api.calls().len() >= 2 {
                    break;
                }
                tokio::task::yield_now().await;
            }
        };

        tokio::select! {
            _ = controller.watch_credentials() => panic!("watcher stopped while context is alive"),
            _ = driver => {}
        }

        assert_eq!(
            api.calls(),
            vec![Call::History("admin".into()), Call::Latest("admin".into())]
        );
    }

    #[tokio::test]
    async fn test_watcher_does_not_block_explicit_observation() {
        let (api, exporter) = setup();
        let controller = controller(&api, &exporter);

        let driver = async {
            tokio::task::yield_now().await;
            controller.auth().set_username("operator");
            controller.on_credentials_changed().await
        };

        let refreshed = tokio::select! {
            _ = controller.watch_credentials() => panic!("watcher stopped while context is alive"),
            refreshed = tokio::time::timeout(Duration::from_secs(5), driver) => refreshed,
        };

        let (history, _) = refreshed
            .expect("explicit observation must not wait on the watcher")
            .expect("credentials changed");
        assert!(history.is_applied());
    }

    #[tokio::test]
    async fn test_credentials_change_reports_history_failure() {
        let (api, exporter) = setup();
        api.set_history(Err(ChemvizError::Auth { status: 401 }));
        let controller = controller(&api, &exporter);

        controller.auth().set_password("wrong");
        let (history, latest) = controller.on_credentials_changed().await.unwrap();

        assert_eq!(history, Outcome::Failed(ChemvizError::Auth { status: 401 }));
        assert_eq!(latest, Outcome::Skipped);
        assert_eq!(controller.status_message().await, status::HISTORY_FAILED);
    }

    // ============================================================================
    // History refresh
    // ============================================================================

    #[tokio::test]
    async fn test_stale_history_response_is_discarded() {
        let (api, exporter) = setup();
        api.queue_history(Ok(vec![entry(1)]));
        api.queue_history(Ok(vec![entry(2), entry(1)]));
        let slow = api.gate_next_history();
        let controller = controller(&api, &exporter);

        // The first refresh is issued first but resolves last
        let (first, second) = tokio::join!(controller.refresh_history(), async {
            let outcome = controller.refresh_history().await;
            slow.notify_one();
            outcome
        });

        assert!(first.is_discarded());
        assert!(second.is_applied());
        let history = controller.history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history.get(0).map(|entry| entry.id), Some(2));
    }

    #[tokio::test]
    async fn test_stale_history_failure_leaves_status_alone() {
        let (api, exporter) = setup();
        api.queue_history(Err(ChemvizError::network("connection reset")));
        api.queue_history(Ok(vec![entry(3)]));
        let slow = api.gate_next_history();
        let controller = controller(&api, &exporter);

        let (first, _) = tokio::join!(controller.refresh_history(), async {
            controller.refresh_history().await;
            slow.notify_one();
        });

        assert!(first.is_discarded());
        assert_eq!(controller.status_message().await, "");
        assert!(controller.history().await.find(3).is_some());
    }

    // ============================================================================
    // Upload
    // ============================================================================

    #[tokio::test]
    async fn test_upload_without_file_is_rejected_locally() {
        let (api, exporter) = setup();
        let controller = controller(&api, &exporter);

        let outcome = controller.upload(None).await;

        assert!(matches!(outcome, Outcome::Failed(ChemvizError::Validation(_))));
        assert!(api.calls().is_empty());
        let state = controller.snapshot().await;
        assert_eq!(state.status_message, status::NO_FILE_SELECTED);
        assert_eq!(state.upload_phase, UploadPhase::Idle);
    }

    #[tokio::test]
    async fn test_upload_replaces_dataset_and_refreshes_history() {
        let (api, exporter) = setup();
        api.set_upload_response(Ok(equipment_upload()));
        api.set_history(Ok(vec![entry(7)]));
        let controller = controller(&api, &exporter);

        let outcome = controller.upload(Some(csv_file())).await;

        assert!(outcome.is_applied());
        let state = controller.snapshot().await;
        assert_eq!(state.status_message, "Upload successful.");
        assert_eq!(state.current_dataset.as_ref().unwrap().id, 7);
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.upload_phase, UploadPhase::Idle);

        let chart = controller.chart().await;
        assert_eq!(chart.labels, vec!["Pump", "Valve"]);
        assert_eq!(chart.values, vec![4, 6]);

        assert_eq!(
            api.calls(),
            vec![
                Call::Upload("equipment.csv".into()),
                Call::History("admin".into())
            ]
        );
    }

    #[tokio::test]
    async fn test_upload_failure_shows_server_message() {
        let (api, exporter) = setup();
        api.set_upload_response(Err(ChemvizError::server(
            400,
            Some("Missing required columns: Flowrate".to_string()),
        )));
        let controller = controller(&api, &exporter);

        let outcome = controller.upload(Some(csv_file())).await;

        assert!(outcome.error().is_some());
        assert_eq!(
            controller.status_message().await,
            "Missing required columns: Flowrate"
        );
        assert!(controller.current_dataset().await.is_none());
        // No history refresh after a failed upload
        assert_eq!(api.calls(), vec![Call::Upload("equipment.csv".into())]);
    }

    #[tokio::test]
    async fn test_upload_failure_without_message_uses_fallback() {
        let (api, exporter) = setup();
        api.set_upload_response(Err(ChemvizError::network("connection reset")));
        let controller = controller(&api, &exporter);

        controller.upload(Some(csv_file())).await;

        let state = controller.snapshot().await;
        assert_eq!(state.status_message, status::UPLOAD_FAILED);
        assert_eq!(state.upload_phase, UploadPhase::Idle);
    }

    #[tokio::test]
    async fn test_concurrent_upload_is_rejected() {
        let (api, exporter) = setup();
        api.set_upload_response(Ok(equipment_upload()));
        let gate = api.gate_upload();
        let controller = controller(&api, &exporter);

        let (first, (second, phase_during)) = tokio::join!(
            controller.upload(Some(csv_file())),
            async {
                let outcome = controller.upload(Some(csv_file())).await;
                let phase = controller.snapshot().await.upload_phase;
                gate.notify_one();
                (outcome, phase)
            }
        );

        assert!(first.is_applied());
        assert_eq!(second, Outcome::Failed(ChemvizError::UploadInProgress));
        assert_eq!(phase_during, UploadPhase::Uploading);
        assert_eq!(
            api.calls(),
            vec![
                Call::Upload("equipment.csv".into()),
                Call::History("admin".into())
            ]
        );

        // The guard is released once the first upload completes
        *api.upload_gate.lock().unwrap() = None;
        assert!(controller.upload(Some(csv_file())).await.is_applied());
    }

    #[tokio::test]
    async fn test_upload_superseded_by_selection() {
        let (api, exporter) = setup();
        api.set_upload_response(Ok(equipment_upload()));
        api.add_dataset(dataset(4, json!({"Valve": 2})));
        api.set_history(Ok(vec![entry(7), entry(4)]));
        let gate = api.gate_upload();
        let controller = controller(&api, &exporter);

        // The selection is issued after the upload but resolves first
        let (upload, select) = tokio::join!(controller.upload(Some(csv_file())), async {
            let outcome = controller.select_history_entry(4).await;
            gate.notify_one();
            outcome
        });

        assert!(upload.is_discarded());
        assert!(select.is_applied());
        let state = controller.snapshot().await;
        assert_eq!(state.current_dataset.unwrap().id, 4);
        assert_eq!(state.upload_phase, UploadPhase::Idle);
        assert_eq!(state.status_message, status::UPLOAD_SUCCEEDED);
        assert_eq!(state.history.len(), 2);
        assert_eq!(
            api.calls(),
            vec![
                Call::Upload("equipment.csv".into()),
                Call::Dataset(4),
                Call::History("admin".into())
            ]
        );
    }

    // ============================================================================
    // History selection
    // ============================================================================

    #[tokio::test]
    async fn test_select_history_entry_loads_dataset() {
        let (api, exporter) = setup();
        api.add_dataset(dataset(4, json!({"Valve": 2})));
        let controller = controller(&api, &exporter);

        let outcome = controller.select_history_entry(4).await;

        assert!(outcome.is_applied());
        assert_eq!(controller.current_dataset().await.unwrap().id, 4);
        assert_eq!(controller.status_message().await, status::DATASET_LOADED);
    }

    #[tokio::test]
    async fn test_select_unknown_entry_keeps_current_dataset() {
        let (api, exporter) = setup();
        api.set_history(Ok(vec![entry(1), entry(99)]));
        api.add_dataset(dataset(1, json!({"Pump": 1})));
        let controller = controller(&api, &exporter);
        controller.refresh_history().await;
        controller.select_history_entry(1).await;

        let outcome = controller.select_history_entry(99).await;

        assert!(outcome.error().unwrap().is_not_found());
        let state = controller.snapshot().await;
        assert_eq!(state.current_dataset.unwrap().id, 1);
        assert_eq!(state.status_message, status::DATASET_FAILED);
        // The entry stays selectable
        assert!(state.history.find(99).is_some());
    }

    #[tokio::test]
    async fn test_select_history_item_by_position() {
        let (api, exporter) = setup();
        api.set_history(Ok(vec![entry(5), entry(3)]));
        api.add_dataset(dataset(3, json!({"Pump": 1})));
        let controller = controller(&api, &exporter);
        controller.refresh_history().await;

        assert!(controller.select_history_item(1).await.is_applied());
        assert_eq!(controller.current_dataset().await.unwrap().id, 3);

        let outcome = controller.select_history_item(2).await;
        assert!(matches!(outcome, Outcome::Failed(ChemvizError::Validation(_))));
        assert_eq!(
            controller.status_message().await,
            "No history entry at position 3."
        );
    }

    #[tokio::test]
    async fn test_stale_selection_is_discarded() {
        let (api, exporter) = setup();
        api.add_dataset(dataset(1, json!({"Pump": 1})));
        api.add_dataset(dataset(2, json!({"Valve": 1})));
        let slow = api.gate_dataset(1);
        let controller = controller(&api, &exporter);

        // Request A (id 1) is issued first but resolves after request B
        let (a, b) = tokio::join!(controller.select_history_entry(1), async {
            let outcome = controller.select_history_entry(2).await;
            slow.notify_one();
            outcome
        });

        assert!(a.is_discarded());
        assert!(b.is_applied());
        assert_eq!(controller.current_dataset().await.unwrap().id, 2);
        assert_eq!(controller.chart().await.labels, vec!["Valve"]);
    }

    #[tokio::test]
    async fn test_stale_selection_failure_leaves_status_alone() {
        let (api, exporter) = setup();
        api.add_dataset(dataset(2, json!({"Valve": 1})));
        let slow = api.gate_dataset(404);
        let controller = controller(&api, &exporter);

        let (a, _) = tokio::join!(controller.select_history_entry(404), async {
            controller.select_history_entry(2).await;
            slow.notify_one();
        });

        assert!(a.is_discarded());
        assert_eq!(controller.status_message().await, status::DATASET_LOADED);
    }

    #[tokio::test]
    async fn test_credentials_change_supersedes_pending_selection() {
        let (api, exporter) = setup();
        api.add_dataset(dataset(1, json!({"Pump": 1})));
        api.set_latest(Ok(Some(dataset(5, json!({"Valve": 3})))));
        let slow = api.gate_dataset(1);
        let controller = controller(&api, &exporter);

        let (stale, _) = tokio::join!(controller.select_history_entry(1), async {
            controller.auth().set_username("operator");
            assert!(controller.on_credentials_changed().await.is_some());
            slow.notify_one();
        });

        assert!(stale.is_discarded());
        assert_eq!(controller.current_dataset().await.unwrap().id, 5);
    }

    // ============================================================================
    // Report
    // ============================================================================

    #[tokio::test]
    async fn test_report_without_dataset_is_skipped() {
        let (api, exporter) = setup();
        let controller = controller(&api, &exporter);

        assert_eq!(controller.download_report().await, Outcome::Skipped);
        assert!(api.calls().is_empty());
        assert!(exporter.exported().is_empty());
    }

    #[tokio::test]
    async fn test_report_is_exported() {
        let (api, exporter) = setup();
        api.add_dataset(dataset(7, json!({"Pump": 1})));
        api.set_report(Ok(ReportDocument::new(7, None, b"%PDF-1.4".to_vec())));
        let controller = controller(&api, &exporter);
        controller.select_history_entry(7).await;

        assert!(controller.download_report().await.is_applied());

        let exported = exporter.exported();
        assert_eq!(exported.len(), 1);
        assert_eq!(exported[0].file_name, "dataset-report-7.pdf");
        let state = controller.snapshot().await;
        assert_eq!(state.status_message, status::REPORT_SAVED);
        assert_eq!(
            state.last_report.unwrap().location,
            PathBuf::from("/reports/dataset-report-7.pdf")
        );
    }

    #[tokio::test]
    async fn test_report_fetch_failure() {
        let (api, exporter) = setup();
        api.add_dataset(dataset(7, json!({"Pump": 1})));
        api.set_report(Err(ChemvizError::server(500, None)));
        let controller = controller(&api, &exporter);
        controller.select_history_entry(7).await;

        let outcome = controller.download_report().await;

        assert!(outcome.error().is_some());
        assert_eq!(controller.status_message().await, status::REPORT_FAILED);
        assert!(exporter.exported().is_empty());
    }

    #[tokio::test]
    async fn test_report_export_failure() {
        let api = Arc::new(MockDatasetApi::new());
        let exporter = Arc::new(MockReportExporter::failing());
        api.add_dataset(dataset(7, json!({"Pump": 1})));
        api.set_report(Ok(ReportDocument::new(7, None, b"%PDF".to_vec())));
        let controller = controller(&api, &exporter);
        controller.select_history_entry(7).await;

        let outcome = controller.download_report().await;

        assert_eq!(outcome.error(), Some(&ChemvizError::export("disk full")));
        let state = controller.snapshot().await;
        assert_eq!(state.status_message, status::REPORT_FAILED);
        assert!(state.last_report.is_none());
    }

    // ============================================================================
    // Projections
    // ============================================================================

    #[tokio::test]
    async fn test_chart_is_reused_until_dataset_changes() {
        let (api, exporter) = setup();
        api.add_dataset(dataset(1, json!({"Pump": 1})));
        api.add_dataset(dataset(2, json!({"Valve": 2})));
        let controller = controller(&api, &exporter);

        let empty = controller.chart().await;
        assert!(empty.is_empty());

        controller.select_history_entry(1).await;
        let first = controller.chart().await;
        assert!(Arc::ptr_eq(&first, &controller.chart().await));

        controller.select_history_entry(2).await;
        let second = controller.chart().await;
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.values, vec![2]);
    }

    #[tokio::test]
    async fn test_table_and_summary_follow_current_dataset() {
        let (api, exporter) = setup();
        api.set_upload_response(Ok(equipment_upload()));
        let controller = controller(&api, &exporter);

        assert!(controller.table().await.is_empty());
        controller.upload(Some(csv_file())).await;

        let table = controller.table().await;
        assert_eq!(table.columns.len(), 5);
        assert_eq!(table.rows.len(), 1);
        let summary = controller.summary_view().await;
        assert_eq!(summary.total, 10);
        assert_eq!(summary.avg_flow, "10.00");
    }
}
