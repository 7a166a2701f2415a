//! Quote Request Controller: validates tag input and runs at most one
//! generation request at a time.
//!
//! States move `Idle -> Pending -> {Succeeded, Failed} -> Idle`. The request
//! runs on its own task; its result is shared with every caller that arrives
//! while it is pending, and the history append plus the return to `Idle`
//! happen inside that task so they occur exactly once.

use std::sync::Arc;

use futures::{
    future::{BoxFuture, Shared},
    FutureExt,
};
use shared::{
    domain::{Quote, RequestState, MAX_TAG_LEN},
    error::{QuoteError, TransportError, ValidationError},
    protocol::GenerateQuoteRequest,
};
use storage::HistoryStore;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::api::QuoteApi;

type InFlight = Shared<BoxFuture<'static, Result<Quote, QuoteError>>>;

/// Picks the tag to send. A non-empty selector value wins over free text;
/// free text is trimmed.
pub fn resolve_tag(selected_tag: &str, free_text_tag: &str) -> Result<String, ValidationError> {
    let selected = selected_tag.trim();
    let tag = if selected.is_empty() {
        free_text_tag.trim()
    } else {
        selected
    };

    if tag.is_empty() {
        return Err(ValidationError::TagRequired);
    }

    let len = tag.chars().count();
    if len > MAX_TAG_LEN {
        return Err(ValidationError::TagTooLong { len });
    }

    Ok(tag.to_string())
}

fn normalize_requestor(requestor: Option<&str>) -> Option<String> {
    requestor
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Handle on a generation attempt, either freshly started or joined.
pub struct Submission {
    outcome: InFlight,
    joined: bool,
}

impl Submission {
    /// `true` when this call attached to a request that was already pending.
    pub fn joined(&self) -> bool {
        self.joined
    }

    pub async fn outcome(self) -> Result<Quote, QuoteError> {
        self.outcome.await
    }
}

struct ControllerState {
    state: RequestState,
    last_outcome: Option<RequestState>,
    in_flight: Option<InFlight>,
}

pub struct QuoteRequestController {
    api: Arc<dyn QuoteApi>,
    history: Arc<HistoryStore>,
    inner: Arc<Mutex<ControllerState>>,
    transitions: broadcast::Sender<RequestState>,
}

impl QuoteRequestController {
    pub fn new(api: Arc<dyn QuoteApi>, history: Arc<HistoryStore>) -> Self {
        let (transitions, _) = broadcast::channel(64);
        Self {
            api,
            history,
            inner: Arc::new(Mutex::new(ControllerState {
                state: RequestState::Idle,
                last_outcome: None,
                in_flight: None,
            })),
            transitions,
        }
    }

    pub async fn state(&self) -> RequestState {
        self.inner.lock().await.state.clone()
    }

    /// `Succeeded` or `Failed(..)` of the most recently settled request.
    pub async fn last_outcome(&self) -> Option<RequestState> {
        self.inner.lock().await.last_outcome.clone()
    }

    pub fn subscribe_transitions(&self) -> broadcast::Receiver<RequestState> {
        self.transitions.subscribe()
    }

    pub async fn submit(
        &self,
        selected_tag: &str,
        free_text_tag: &str,
        requestor: Option<&str>,
    ) -> Result<Quote, QuoteError> {
        self.begin(selected_tag, free_text_tag, requestor)
            .await?
            .outcome()
            .await
    }

    /// Joins the pending request if there is one. Otherwise validates the
    /// input (no I/O on failure, state stays `Idle`) and starts a request.
    pub async fn begin(
        &self,
        selected_tag: &str,
        free_text_tag: &str,
        requestor: Option<&str>,
    ) -> Result<Submission, QuoteError> {
        let mut inner = self.inner.lock().await;

        if let Some(existing) = inner.in_flight.as_ref() {
            debug!("quote: submission joined pending request");
            return Ok(Submission {
                outcome: existing.clone(),
                joined: true,
            });
        }

        let tag = resolve_tag(selected_tag, free_text_tag).inspect_err(|err| {
            debug!(error = %err, "quote: submission rejected before request");
        })?;
        let request = GenerateQuoteRequest {
            tag,
            requestor: normalize_requestor(requestor),
        };
        info!(tag = %request.tag, "quote: requesting generation");

        let task = tokio::spawn(run_request(
            Arc::clone(&self.api),
            Arc::clone(&self.history),
            Arc::clone(&self.inner),
            self.transitions.clone(),
            request,
        ));

        let state = Arc::clone(&self.inner);
        let transitions = self.transitions.clone();
        let outcome: InFlight = async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    error!(error = %err, "quote: request task ended abnormally");
                    let reason = "quote request was interrupted".to_string();
                    settle(&state, &transitions, RequestState::Failed(reason.clone())).await;
                    Err(QuoteError::Transport(TransportError::new(reason)))
                }
            }
        }
        .boxed()
        .shared();

        inner.state = RequestState::Pending;
        inner.in_flight = Some(outcome.clone());
        let _ = self.transitions.send(RequestState::Pending);

        Ok(Submission {
            outcome,
            joined: false,
        })
    }
}

async fn run_request(
    api: Arc<dyn QuoteApi>,
    history: Arc<HistoryStore>,
    state: Arc<Mutex<ControllerState>>,
    transitions: broadcast::Sender<RequestState>,
    request: GenerateQuoteRequest,
) -> Result<Quote, QuoteError> {
    let outcome = api
        .generate_quote(&request)
        .await
        .map_err(QuoteError::from);

    let settled = match &outcome {
        Ok(quote) => {
            let log = history.append(quote.clone()).await;
            info!(
                tag = %quote.tag,
                source = %quote.source_label(),
                history_len = log.len(),
                "quote: generated"
            );
            RequestState::Succeeded
        }
        Err(err) => {
            warn!(tag = %request.tag, error = %err, "quote: generation failed");
            RequestState::Failed(err.user_message())
        }
    };

    settle(&state, &transitions, settled).await;
    outcome
}

async fn settle(
    state: &Mutex<ControllerState>,
    transitions: &broadcast::Sender<RequestState>,
    settled: RequestState,
) {
    let mut guard = state.lock().await;
    if !guard.state.is_pending() {
        return;
    }
    let _ = transitions.send(settled.clone());
    guard.last_outcome = Some(settled);
    guard.state = RequestState::Idle;
    guard.in_flight = None;
    let _ = transitions.send(RequestState::Idle);
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
