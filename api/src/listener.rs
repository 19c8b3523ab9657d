use crate::control::normalize_control;
use crate::normalize::normalize_document;
use crate::source::{DocumentPath, DocumentSource};
use crate::{StreamControl, TournamentSnapshot};
use log::{debug, trace, warn};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Handle to a running subscription. Dropping it stops delivery.
#[derive(Debug)]
pub struct Subscription {
    path: DocumentPath,
    handle: JoinHandle<()>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn close(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
        debug!("closed subscription on {}", self.path);
    }
}

/// What one poll of a document saw.
#[derive(Debug, Clone, PartialEq)]
enum Observation {
    Missing,
    Present(Value),
    Failed(String),
}

impl Observation {
    fn document(&self) -> Option<&Value> {
        match self {
            Observation::Present(value) => Some(value),
            _ => None,
        }
    }
}

/// Poll `path` and hand every change to `deliver`. The first observation is
/// always delivered; after that only observations that differ from the
/// previous one are.
fn listen_to_document<S, F>(
    source: Arc<S>,
    path: DocumentPath,
    every: Duration,
    mut deliver: F,
) -> Subscription
where
    S: DocumentSource,
    F: FnMut(&Observation) + Send + 'static,
{
    debug!("opening subscription on {path} every {every:?}");
    let task_path = path.clone();
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every.max(MIN_POLL_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last: Option<Observation> = None;

        loop {
            ticker.tick().await;
            let observed = match source.get_document(&task_path).await {
                Ok(Some(value)) => Observation::Present(value),
                Ok(None) => Observation::Missing,
                Err(e) => Observation::Failed(e.to_string()),
            };
            if last.as_ref() == Some(&observed) {
                continue;
            }

            match &observed {
                Observation::Failed(msg) => warn!("subscription on {task_path} failed: {msg}"),
                Observation::Missing => debug!("{task_path} does not exist"),
                Observation::Present(_) => trace!("{task_path} changed"),
            }
            deliver(&observed);
            last = Some(observed);
        }
    });

    Subscription { path, handle }
}

/// Subscribe to `streaming/<tournament_id>`. Each change is normalized and
/// passed to `callback`; a missing document or a failed read yields `None`.
pub fn listen_to_streaming_data<S, F>(
    source: Arc<S>,
    tournament_id: &str,
    every: Duration,
    mut callback: F,
) -> Subscription
where
    S: DocumentSource,
    F: FnMut(Option<TournamentSnapshot>) + Send + 'static,
{
    let doc_id = tournament_id.to_string();
    listen_to_document(
        source,
        DocumentPath::tournament(tournament_id),
        every,
        move |observed| callback(normalize_document(&doc_id, observed.document())),
    )
}

/// Subscribe to the stream control document. A missing document or a failed
/// read yields the empty control.
pub fn listen_to_stream_control<S, F>(source: Arc<S>, every: Duration, mut callback: F) -> Subscription
where
    S: DocumentSource,
    F: FnMut(StreamControl) + Send + 'static,
{
    listen_to_document(source, DocumentPath::stream_control(), every, move |observed| {
        callback(normalize_control(observed.document()))
    })
}
