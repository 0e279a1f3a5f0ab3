//! Session state
//!
//! `SessionState` holds everything the views read: the submitted address,
//! the current result, the single error slot and the address-prompt flag.
//! Transitions are pure (`&self -> Self`). Every accepted submission bumps
//! `generation` and hands out a `Ticket`; an outcome whose ticket is not the
//! current generation is dropped, so a superseded poll can never overwrite
//! the state of a newer submission.
//!
//! `Session` drives the transitions against an `AnalysisClient`. It also
//! publishes the current generation on a watch channel; a running submission
//! that sees a newer generation drops its analysis, which stops its polling.

use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::core::client::AnalysisClient;
use crate::models::errors::AnalysisError;
use crate::models::types::AnalysisResult;
use crate::providers::backend::AnalysisBackend;
use crate::utils::address::validate_address;

/// Page routes of the front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Home,
    TransactionFlow,
    WalletAnalysis,
    EntityLabels,
    TransactionClusters,
}

impl Route {
    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "" => Some(Self::Home),
            "/transaction-flow" => Some(Self::TransactionFlow),
            "/wallet-analysis" => Some(Self::WalletAnalysis),
            "/entity-labels" => Some(Self::EntityLabels),
            "/transaction-clusters" => Some(Self::TransactionClusters),
            _ => None,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::TransactionFlow => "/transaction-flow",
            Self::WalletAnalysis => "/wallet-analysis",
            Self::EntityLabels => "/entity-labels",
            Self::TransactionClusters => "/transaction-clusters",
        }
    }
}

/// Proof of which submission an outcome belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What a page should show; the error slot takes precedence over data
#[derive(Debug, Clone, PartialEq)]
pub enum SessionView {
    /// No data yet on a data page: ask for an address
    Prompt,
    Loading,
    Error(String),
    Ready(Arc<AnalysisResult>),
    /// Home page, or data page after the prompt was dismissed
    Empty,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub address: String,
    pub generation: u64,
    pub result: Option<Arc<AnalysisResult>>,
    pub error: Option<String>,
    pub loading: bool,
    pub modal_open: bool,
    pub route: Route,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a validated address: drop the previous result and error
    pub fn begin_submission(&self, address: &str) -> (Self, Ticket) {
        let generation = self.generation + 1;
        let next = Self {
            address: address.to_string(),
            generation,
            result: None,
            error: None,
            loading: true,
            ..self.clone()
        };
        (next, Ticket { generation })
    }

    /// Record a rejected input. No request is made and in-flight work is untouched.
    pub fn reject_input(&self, error: &AnalysisError) -> Self {
        Self {
            error: Some(error.user_message()),
            modal_open: true,
            ..self.clone()
        }
    }

    /// Apply an outcome; stale tickets leave the state untouched
    pub fn complete(
        &self,
        ticket: Ticket,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> Self {
        if !self.is_current(ticket) {
            return self.clone();
        }
        match outcome {
            Ok(result) => Self {
                result: Some(Arc::new(result)),
                error: None,
                loading: false,
                modal_open: false,
                ..self.clone()
            },
            Err(error) => Self {
                result: None,
                error: Some(error.user_message()),
                loading: false,
                ..self.clone()
            },
        }
    }

    #[inline]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.generation == self.generation
    }

    pub fn clear_error(&self) -> Self {
        Self {
            error: None,
            ..self.clone()
        }
    }

    pub fn open_modal(&self) -> Self {
        Self {
            modal_open: true,
            ..self.clone()
        }
    }

    /// Dismiss the prompt; the pending error goes with it
    pub fn close_modal(&self) -> Self {
        Self {
            modal_open: false,
            error: None,
            ..self.clone()
        }
    }

    /// Data pages without data or error open the address prompt
    pub fn navigate(&self, route: Route) -> Self {
        let next = Self {
            route,
            ..self.clone()
        };
        Self {
            modal_open: next.should_show_modal(),
            ..next
        }
    }

    pub fn should_show_modal(&self) -> bool {
        self.route != Route::Home && self.result.is_none() && self.error.is_none() && !self.loading
    }

    pub fn view(&self) -> SessionView {
        if let Some(error) = &self.error {
            return SessionView::Error(error.clone());
        }
        if self.loading {
            return SessionView::Loading;
        }
        if let Some(result) = &self.result {
            return SessionView::Ready(result.clone());
        }
        if self.modal_open {
            SessionView::Prompt
        } else {
            SessionView::Empty
        }
    }
}

/// Owns the session state and runs submissions against the client
pub struct Session<B> {
    client: Arc<AnalysisClient<B>>,
    state: RwLock<SessionState>,
    current: watch::Sender<u64>,
}

impl<B: AnalysisBackend> Session<B> {
    pub fn new(client: Arc<AnalysisClient<B>>) -> Self {
        Self {
            client,
            state: RwLock::new(SessionState::new()),
            current: watch::Sender::new(0),
        }
    }

    pub fn client(&self) -> &Arc<AnalysisClient<B>> {
        &self.client
    }

    pub fn snapshot(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn transition<T>(&self, f: impl FnOnce(&SessionState) -> (SessionState, T)) -> T {
        let mut guard = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let (next, out) = f(&guard);
        *guard = next;
        out
    }

    /// Submit an address and wait for its outcome.
    ///
    /// Returns the state after the outcome was applied (or discarded when a
    /// newer submission superseded this one).
    pub async fn submit(&self, address: &str) -> SessionState {
        let expected_len = self.client.config().address_length;
        let address = match validate_address(address, expected_len) {
            Ok(address) => address,
            Err(error) => {
                self.client.telemetry().record_rejected_input();
                debug!("Rejected input before submission: {}", error);
                return self.transition(|s| (s.reject_input(&error), s.reject_input(&error)));
            }
        };

        let ticket = self.transition(|s| {
            let (next, ticket) = s.begin_submission(address);
            self.current.send_replace(ticket.generation());
            (next, ticket)
        });

        let mut current = self.current.subscribe();
        let superseded = async move {
            let _ = current
                .wait_for(|generation| *generation != ticket.generation())
                .await;
        };
        let outcome = tokio::select! {
            outcome = self.client.analyze(address) => outcome,
            _ = superseded => {
                self.client.telemetry().record_superseded();
                info!("🛑 Submission #{} superseded, stopped polling", ticket.generation());
                return self.snapshot();
            }
        };

        self.transition(|s| {
            if !s.is_current(ticket) {
                info!(
                    "🗑️ Discarding outcome of superseded submission #{} (current #{})",
                    ticket.generation(),
                    s.generation
                );
            }
            let next = s.complete(ticket, outcome);
            (next.clone(), next)
        })
    }

    pub fn navigate(&self, route: Route) -> SessionState {
        self.transition(|s| {
            let next = s.navigate(route);
            (next.clone(), next)
        })
    }

    pub fn clear_error(&self) {
        self.transition(|s| (s.clear_error(), ()));
    }

    pub fn open_modal(&self) {
        self.transition(|s| (s.open_modal(), ()));
    }

    pub fn close_modal(&self) {
        self.transition(|s| (s.close_modal(), ()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::{TransactionGraph, WalletAnalysisReport};

    fn result() -> AnalysisResult {
        AnalysisResult {
            transaction_graph: TransactionGraph::default(),
            wallet_analysis: WalletAnalysisReport::default(),
        }
    }

    #[test]
    fn test_submission_clears_previous_result() {
        let (state, ticket) = SessionState::new().begin_submission("A");
        let state = state.complete(ticket, Ok(result()));
        assert!(state.result.is_some());

        let (state, _) = state.begin_submission("B");
        assert!(state.result.is_none());
        assert!(state.error.is_none());
        assert_eq!(state.view(), SessionView::Loading);
    }

    #[test]
    fn test_stale_ticket_ignored() {
        let (state, first) = SessionState::new().begin_submission("A");
        let (state, second) = state.begin_submission("B");
        let after_stale = state.complete(first, Err(AnalysisError::Timeout { attempts: 12 }));
        assert_eq!(after_stale, state);

        let done = after_stale.complete(second, Ok(result()));
        assert!(matches!(done.view(), SessionView::Ready(_)));
        assert_eq!(done.address, "B");
    }

    #[test]
    fn test_failure_keeps_prompt_open_and_is_recoverable() {
        let state = SessionState::new().navigate(Route::WalletAnalysis);
        assert!(state.modal_open);
        let (state, ticket) = state.begin_submission("A");
        let state = state.complete(ticket, Err(AnalysisError::transport(500, None)));
        assert!(state.modal_open);
        assert!(matches!(state.view(), SessionView::Error(_)));

        let (state, ticket) = state.begin_submission("A");
        let state = state.complete(ticket, Ok(result()));
        assert!(!state.modal_open);
        assert!(matches!(state.view(), SessionView::Ready(_)));
    }

    #[test]
    fn test_error_takes_precedence_over_data() {
        let (state, ticket) = SessionState::new().begin_submission("A");
        let state = state.complete(ticket, Ok(result()));
        let state = state.reject_input(&AnalysisError::invalid_address("x", 44));
        assert!(matches!(state.view(), SessionView::Error(_)));
        assert!(matches!(state.clear_error().view(), SessionView::Ready(_)));
    }

    #[test]
    fn test_home_never_prompts() {
        let state = SessionState::new().navigate(Route::Home);
        assert!(!state.modal_open);
        assert_eq!(state.view(), SessionView::Empty);
        assert_eq!(state.navigate(Route::EntityLabels).view(), SessionView::Prompt);
    }

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::from_path("/"), Some(Route::Home));
        assert_eq!(Route::from_path("/entity-labels/"), Some(Route::EntityLabels));
        assert_eq!(Route::from_path("/nope"), None);
        assert_eq!(Route::TransactionFlow.path(), "/transaction-flow");
    }
}
