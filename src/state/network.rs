use crate::state::messages::{NetworkRequest, NetworkResponse};
use log::{debug, error, info};
use poolcast_api::client::ApiError;
use poolcast_api::control::StreamControlPatch;
use poolcast_api::source::{StreamingStore, fetch_tournament, update_stream_control};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Runs the writes and manual reads the pages ask for. Live updates come
/// through the subscriptions instead.
pub struct NetworkWorker {
    store: Arc<StreamingStore>,
    tournament_id: String,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        store: Arc<StreamingStore>,
        tournament_id: String,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            store,
            tournament_id,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let is_control_write = matches!(request, NetworkRequest::UpdateStreamControl { .. });
            let result = match request {
                NetworkRequest::RefreshTournament => self.handle_refresh_tournament().await,
                NetworkRequest::UpdateStreamControl { patch } => {
                    self.handle_update_stream_control(patch).await
                }
            };

            debug!("network request complete");
            self.stop_loading_animation(result.is_ok()).await;

            let response = result.unwrap_or_else(|err| {
                let message = err.to_string();
                if is_control_write {
                    NetworkResponse::StreamControlFailed { message }
                } else {
                    NetworkResponse::Error { message }
                }
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle_refresh_tournament(&self) -> Result<NetworkResponse, ApiError> {
        debug!("refreshing {} from {}", self.tournament_id, self.store.describe());
        let snapshot = fetch_tournament(self.store.as_ref(), &self.tournament_id).await?;
        Ok(NetworkResponse::TournamentRefreshed { snapshot })
    }

    async fn handle_update_stream_control(
        &self,
        patch: StreamControlPatch,
    ) -> Result<NetworkResponse, ApiError> {
        if patch.is_empty() {
            return Ok(NetworkResponse::StreamControlSaved);
        }
        info!("updating stream control: {patch:?}");
        update_stream_control(self.store.as_ref(), patch).await?;
        Ok(NetworkResponse::StreamControlSaved)
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolcast_api::source::{DocumentPath, DocumentSource, FileSource};
    use std::collections::BTreeSet;

    fn temp_store(name: &str) -> (std::path::PathBuf, Arc<StreamingStore>) {
        let dir = std::env::temp_dir().join(format!("poolcast-worker-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        (dir.clone(), Arc::new(StreamingStore::Files(FileSource::new(dir))))
    }

    async fn final_response(rx: &mut mpsc::Receiver<NetworkResponse>) -> NetworkResponse {
        loop {
            match rx.recv().await {
                Some(NetworkResponse::LoadingStateChanged { .. }) => continue,
                Some(other) => return other,
                None => panic!("worker stopped"),
            }
        }
    }

    #[tokio::test]
    async fn refresh_reads_the_tournament_document() {
        let (dir, store) = temp_store("refresh");
        let mut fields = serde_json::Map::new();
        fields.insert("name".into(), serde_json::json!("Friday League"));
        store.merge_document(&DocumentPath::tournament("t1"), &fields).await.unwrap();

        let (req_tx, req_rx) = mpsc::channel(4);
        let (resp_tx, mut resp_rx) = mpsc::channel(64);
        tokio::spawn(NetworkWorker::new(store, "t1".into(), req_rx, resp_tx).run());

        req_tx.send(NetworkRequest::RefreshTournament).await.unwrap();
        match final_response(&mut resp_rx).await {
            NetworkResponse::TournamentRefreshed { snapshot: Some(s) } => {
                assert_eq!(s.name, "Friday League")
            }
            other => panic!("unexpected response {other:?}"),
        }
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn control_update_is_written() {
        let (dir, store) = temp_store("control");
        let (req_tx, req_rx) = mpsc::channel(4);
        let (resp_tx, mut resp_rx) = mpsc::channel(64);
        tokio::spawn(NetworkWorker::new(store.clone(), "t1".into(), req_rx, resp_tx).run());

        let patch = StreamControlPatch {
            hidden_sections: Some(BTreeSet::from(["ticker".to_string()])),
            ..Default::default()
        };
        req_tx.send(NetworkRequest::UpdateStreamControl { patch }).await.unwrap();
        assert!(matches!(final_response(&mut resp_rx).await, NetworkResponse::StreamControlSaved));

        let doc = store.get_document(&DocumentPath::stream_control()).await.unwrap().unwrap();
        assert_eq!(doc["hiddenSections"], serde_json::json!(["ticker"]));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn failed_control_write_gets_its_own_reply() {
        // A plain file where the data directory should be makes every write fail.
        let (dir, _) = temp_store("control-fail");
        std::fs::write(&dir, "not a directory").unwrap();
        let store = Arc::new(StreamingStore::Files(FileSource::new(&dir)));

        let (req_tx, req_rx) = mpsc::channel(4);
        let (resp_tx, mut resp_rx) = mpsc::channel(64);
        tokio::spawn(NetworkWorker::new(store, "t1".into(), req_rx, resp_tx).run());

        let patch = StreamControlPatch {
            stream_matches: Some(vec!["m1".to_string()]),
            ..Default::default()
        };
        req_tx.send(NetworkRequest::UpdateStreamControl { patch }).await.unwrap();
        assert!(matches!(
            final_response(&mut resp_rx).await,
            NetworkResponse::StreamControlFailed { .. }
        ));
        let _ = std::fs::remove_file(dir);
    }
}
