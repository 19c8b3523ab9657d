use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use poolcast_api::control::StreamControlPatch;
use poolcast_api::{StreamControl, TournamentSnapshot};

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    /// One-shot read of the tournament document, outside the subscription.
    RefreshTournament,
    UpdateStreamControl { patch: StreamControlPatch },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    TournamentRefreshed { snapshot: Option<TournamentSnapshot> },
    StreamControlSaved,
    /// The write did not land; the stored control is unchanged.
    StreamControlFailed { message: String },
    Error { message: String },
}

/// Deliveries from the document subscriptions.
#[derive(Debug)]
pub enum FeedEvent {
    Tournament(Option<TournamentSnapshot>),
    StreamControl(StreamControl),
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    CountdownTick,
}
