use crate::app::MenuItem;
use crate::state::messages::{FeedEvent, UiEvent};
use log::debug;
use poolcast_api::listener::{Subscription, listen_to_stream_control, listen_to_streaming_data};
use poolcast_api::source::StreamingStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::interval;

const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// The background work the visible page depends on: its document
/// subscriptions and, on the standby page, the countdown ticker. Whatever the
/// current page does not need is closed.
pub struct PageTasks {
    store: Arc<StreamingStore>,
    tournament_id: String,
    poll_interval: Duration,
    feed_events: mpsc::UnboundedSender<FeedEvent>,
    ui_events: mpsc::Sender<UiEvent>,
    tournament: Option<Subscription>,
    control: Option<Subscription>,
    countdown: Option<Ticker>,
}

/// Aborts the ticking task when dropped.
struct Ticker(JoinHandle<()>);

impl Drop for Ticker {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl PageTasks {
    pub fn new(
        store: Arc<StreamingStore>,
        tournament_id: String,
        poll_interval: Duration,
        feed_events: mpsc::UnboundedSender<FeedEvent>,
        ui_events: mpsc::Sender<UiEvent>,
    ) -> Self {
        Self {
            store,
            tournament_id,
            poll_interval,
            feed_events,
            ui_events,
            tournament: None,
            control: None,
            countdown: None,
        }
    }

    /// Open what `tab` needs and close the rest.
    pub fn sync(&mut self, tab: MenuItem, countdown_running: bool) {
        if !tab.needs_tournament() {
            self.tournament = None;
        } else if self.tournament.is_none() {
            let events = self.feed_events.clone();
            self.tournament = Some(listen_to_streaming_data(
                self.store.clone(),
                &self.tournament_id,
                self.poll_interval,
                move |snapshot| {
                    let _ = events.send(FeedEvent::Tournament(snapshot));
                },
            ));
        }

        if !tab.needs_stream_control() {
            self.control = None;
        } else if self.control.is_none() {
            let events = self.feed_events.clone();
            self.control = Some(listen_to_stream_control(
                self.store.clone(),
                self.poll_interval,
                move |control| {
                    let _ = events.send(FeedEvent::StreamControl(control));
                },
            ));
        }

        let wants_ticker = tab == MenuItem::Standby && countdown_running;
        if !wants_ticker {
            if self.countdown.take().is_some() {
                debug!("countdown ticker stopped");
            }
        } else if self.countdown.is_none() {
            debug!("countdown ticker started");
            self.countdown = Some(self.spawn_ticker());
        }
    }

    fn spawn_ticker(&self) -> Ticker {
        let ui_events = self.ui_events.clone();
        Ticker(tokio::spawn(async move {
            let mut ticks = interval(COUNTDOWN_TICK);
            loop {
                ticks.tick().await;
                if ui_events.send(UiEvent::CountdownTick).await.is_err() {
                    break;
                }
            }
        }))
    }

    pub fn close_all(&mut self) {
        self.tournament = None;
        self.control = None;
        self.countdown = None;
    }

    #[cfg(test)]
    pub fn has_tournament_feed(&self) -> bool {
        self.tournament.is_some()
    }

    #[cfg(test)]
    pub fn has_control_feed(&self) -> bool {
        self.control.is_some()
    }

    #[cfg(test)]
    pub fn is_ticking(&self) -> bool {
        self.countdown.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolcast_api::source::FileSource;

    fn tasks() -> (PageTasks, mpsc::UnboundedReceiver<FeedEvent>, mpsc::Receiver<UiEvent>) {
        let dir = std::env::temp_dir().join(format!("poolcast-tasks-{}", std::process::id()));
        let store = Arc::new(StreamingStore::Files(FileSource::new(dir)));
        let (feed_tx, feed_rx) = mpsc::unbounded_channel();
        let (ui_tx, ui_rx) = mpsc::channel(8);
        let tasks = PageTasks::new(store, "t1".into(), Duration::from_millis(10), feed_tx, ui_tx);
        (tasks, feed_rx, ui_rx)
    }

    #[tokio::test]
    async fn each_page_opens_only_its_feeds() {
        let (mut tasks, _feed, _ui) = tasks();

        tasks.sync(MenuItem::Overlay, false);
        assert!(tasks.has_tournament_feed());
        assert!(tasks.has_control_feed());

        tasks.sync(MenuItem::Teams, false);
        assert!(tasks.has_tournament_feed());
        assert!(!tasks.has_control_feed());

        tasks.sync(MenuItem::Help, false);
        assert!(!tasks.has_tournament_feed());

        tasks.sync(MenuItem::Admin, false);
        assert!(tasks.has_tournament_feed());
        assert!(tasks.has_control_feed());
    }

    #[tokio::test]
    async fn opened_feed_reports_missing_document() {
        let (mut tasks, mut feed, _ui) = tasks();
        tasks.sync(MenuItem::Rankings, false);
        let event = tokio::time::timeout(Duration::from_secs(2), feed.recv()).await.unwrap();
        assert!(matches!(event, Some(FeedEvent::Tournament(None))));
    }

    #[tokio::test]
    async fn ticker_only_runs_on_standby_while_counting() {
        let (mut tasks, _feed, mut ui) = tasks();

        tasks.sync(MenuItem::Standby, false);
        assert!(!tasks.is_ticking());

        tasks.sync(MenuItem::Standby, true);
        assert!(tasks.is_ticking());
        let tick = tokio::time::timeout(Duration::from_secs(2), ui.recv()).await.unwrap();
        assert!(matches!(tick, Some(UiEvent::CountdownTick)));

        tasks.sync(MenuItem::Overlay, true);
        assert!(!tasks.is_ticking());

        tasks.close_all();
        assert!(!tasks.has_tournament_feed());
    }
}
