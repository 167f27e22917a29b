//! Conversation about a single report.
//!
//! [`reduce`] is the state machine: it takes an [`Event`], updates
//! [`ConversationState`] in place and returns the [`Effect`]s the caller has to
//! perform. [`Conversation`] drives it against a [`ChatEndpoint`], dispatching
//! through the [`RequestLifecycle`] and applying recomputed forecasts to its
//! report.
//!
//! At most one request is in flight per conversation. Every settle carries the
//! id of the request it answers, and a settle for anything other than the
//! in-flight request is dropped, so a late answer can never touch the report.

use std::sync::Arc;

use chrono::Utc;
use tokio::time::Instant;
use uuid::Uuid;

use crate::chat::{ChatEndpoint, ChatReply, ChatRequest};
use crate::lifecycle::{DeadlineClass, Outcome, OutcomeKind, RequestLifecycle};
use crate::merge::OverrideSet;
use crate::models::{ForecastOutput, InputField, Message, Report};
use crate::reconcile;
use crate::telemetry::{LifecycleEvent, LifecycleObserver, TracingObserver};

/// Shown as the user's message when overrides are submitted without text.
pub const OVERRIDE_PLACEHOLDER: &str = "Modified Simulation Parameters";

/// Sent as the question when overrides are submitted without text.
pub const DEFAULT_OVERRIDE_PROMPT: &str = "Explain the changes in the forecast";

pub const EMPTY_REPLY: &str = "Sorry, I couldn't process that request.";
pub const AUTH_UNAVAILABLE_REPLY: &str = "Authentication failed. Please sign in again.";
pub const TIMEOUT_REPLY: &str =
    "The AI is taking longer than expected. Please try a simpler question or try again later.";
pub const TRANSPORT_FAILURE_REPLY: &str = "Failed to connect to the AI assistant. Please try again.";
pub const OVERRIDES_KEPT: &str = "Your staged overrides were kept so you can retry.";

/// The request currently awaiting an answer.
#[derive(Debug, Clone, PartialEq)]
struct InFlight {
    request_id: Uuid,
    override_mode: bool,
    staged: OverrideSet,
}

/// Everything the conversation shows and remembers between requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationState {
    pub messages: Vec<Message>,
    pub override_mode: bool,
    pub staged: OverrideSet,
    in_flight: Option<InFlight>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Id of the request awaiting an answer, if any.
    pub fn pending_request(&self) -> Option<Uuid> {
        self.in_flight.as_ref().map(|f| f.request_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ToggleOverrideMode,
    StageOverride { field: InputField, value: String },
    Submit { text: String, report_id: String },
    Settled { request_id: Uuid, outcome: Outcome<ChatReply> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send `request` and report back with `Event::Settled` carrying `request_id`.
    Dispatch { request_id: Uuid, request: ChatRequest },
    /// Replace the report's output; `overrides` is empty for chat-mode replies.
    ApplyPrediction { output: ForecastOutput, overrides: OverrideSet },
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Nothing to send
    Empty,
    /// A request is already in flight
    Busy,
    /// Answer for a request that is no longer in flight
    Stale,
}

/// Apply `event` to `state`.
pub fn reduce(state: &mut ConversationState, event: Event) -> Vec<Effect> {
    match event {
        Event::ToggleOverrideMode => {
            state.override_mode = !state.override_mode;
            Vec::new()
        }
        Event::StageOverride { field, value } => {
            state.staged.stage(field, value);
            Vec::new()
        }
        Event::Submit { text, report_id } => submit(state, text.trim(), report_id),
        Event::Settled {
            request_id,
            outcome,
        } => settle(state, request_id, outcome),
    }
}

fn submit(state: &mut ConversationState, text: &str, report_id: String) -> Vec<Effect> {
    if text.is_empty() && !state.override_mode && state.staged.is_empty() {
        return vec![Effect::Ignored(IgnoreReason::Empty)];
    }
    if state.is_pending() {
        return vec![Effect::Ignored(IgnoreReason::Busy)];
    }

    let request = if state.override_mode {
        let shown = if text.is_empty() { OVERRIDE_PLACEHOLDER } else { text };
        state.messages.push(Message::user(shown));

        let question = if text.is_empty() { DEFAULT_OVERRIDE_PROMPT } else { text };
        ChatRequest::modify_report(question, report_id, &state.staged)
    } else {
        state.messages.push(Message::user(text));
        ChatRequest::chat(text, report_id)
    };

    let request_id = Uuid::new_v4();
    state.in_flight = Some(InFlight {
        request_id,
        override_mode: state.override_mode,
        staged: state.staged.clone(),
    });

    vec![Effect::Dispatch {
        request_id,
        request,
    }]
}

fn settle(state: &mut ConversationState, request_id: Uuid, outcome: Outcome<ChatReply>) -> Vec<Effect> {
    if state.pending_request() != Some(request_id) {
        return vec![Effect::Ignored(IgnoreReason::Stale)];
    }
    let Some(in_flight) = state.in_flight.take() else {
        return vec![Effect::Ignored(IgnoreReason::Stale)];
    };

    let retain = in_flight.override_mode && matches!(outcome, Outcome::ServerRejected(_));
    let mut effects = Vec::new();

    let message = match outcome {
        Outcome::Success(reply) => {
            let content = reply
                .reply
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| EMPTY_REPLY.to_string());
            let message = Message::assistant(content);

            match reply.modified_prediction {
                Some(output) => {
                    let overrides = if in_flight.override_mode {
                        in_flight.staged
                    } else {
                        OverrideSet::new()
                    };
                    effects.push(Effect::ApplyPrediction {
                        output: output.clone(),
                        overrides,
                    });
                    message.with_prediction(output)
                }
                None => message,
            }
        }
        Outcome::AuthUnavailable => Message::assistant(AUTH_UNAVAILABLE_REPLY),
        Outcome::Timeout => Message::assistant(TIMEOUT_REPLY),
        Outcome::TransportFailure(_) => Message::assistant(TRANSPORT_FAILURE_REPLY),
        Outcome::ServerRejected(reason) => {
            let mut content = format!("The assistant rejected the request: {}", reason);
            if retain {
                content.push(' ');
                content.push_str(OVERRIDES_KEPT);
            }
            Message::assistant(content)
        }
    };
    state.messages.push(message);

    if in_flight.override_mode && !retain {
        state.override_mode = false;
        state.staged.clear();
    }

    effects
}

/// Result of [`Conversation::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    /// Nothing to send
    Ignored,
    /// Another request is still in flight
    Busy,
    /// Request settled; `None` on success, the failure kind otherwise
    Completed(Option<OutcomeKind>),
}

/// A conversation bound to one report.
pub struct Conversation {
    state: ConversationState,
    report: Report,
    chat: Arc<dyn ChatEndpoint>,
    lifecycle: RequestLifecycle,
    observer: Arc<dyn LifecycleObserver>,
}

impl Conversation {
    pub fn new(report: Report, chat: Arc<dyn ChatEndpoint>, lifecycle: RequestLifecycle) -> Self {
        Self {
            state: ConversationState::new(),
            report,
            chat,
            lifecycle,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn messages(&self) -> &[Message] {
        &self.state.messages
    }

    pub fn override_mode(&self) -> bool {
        self.state.override_mode
    }

    pub fn staged(&self) -> &OverrideSet {
        &self.state.staged
    }

    pub fn toggle_override_mode(&mut self) {
        reduce(&mut self.state, Event::ToggleOverrideMode);
    }

    pub fn stage_override(&mut self, field: InputField, value: impl Into<String>) {
        reduce(
            &mut self.state,
            Event::StageOverride {
                field,
                value: value.into(),
            },
        );
    }

    /// Consume the conversation, returning the report with any applied forecasts.
    pub fn into_report(self) -> Report {
        self.report
    }

    /// Send `text` (or the staged overrides) and wait for the request to settle.
    ///
    /// Every failure ends up as an assistant message; nothing here returns an error.
    pub async fn submit(&mut self, text: &str) -> SubmitStatus {
        let effects = reduce(
            &mut self.state,
            Event::Submit {
                text: text.to_string(),
                report_id: self.report.id.clone(),
            },
        );

        let mut dispatch = None;
        for effect in effects {
            match effect {
                Effect::Dispatch {
                    request_id,
                    request,
                } => dispatch = Some((request_id, request)),
                Effect::Ignored(IgnoreReason::Busy) => return SubmitStatus::Busy,
                _ => {}
            }
        }
        let Some((request_id, request)) = dispatch else {
            return SubmitStatus::Ignored;
        };

        self.observer.observe(&LifecycleEvent::Submitted {
            request_id,
            report_id: self.report.id.clone(),
            mode: request.mode(),
            override_count: match &request {
                ChatRequest::ModifyReport { overrides, .. } => overrides.len(),
                ChatRequest::Chat { .. } => 0,
            },
        });

        let started = Instant::now();
        let chat = Arc::clone(&self.chat);
        let outcome = self
            .lifecycle
            .dispatch(DeadlineClass::Long, move |credential| async move {
                chat.send(&request, &credential).await
            })
            .await;
        let elapsed = started.elapsed();
        let kind = outcome.kind();

        let mut applied_prediction = false;
        for effect in reduce(&mut self.state, Event::Settled { request_id, outcome }) {
            if let Effect::ApplyPrediction { output, overrides } = effect {
                self.report =
                    reconcile::apply_override(self.report.clone(), Some(output), &overrides, Utc::now());
                applied_prediction = true;
            }
        }

        let event = match kind {
            None => LifecycleEvent::Responded {
                request_id,
                elapsed,
                applied_prediction,
            },
            Some(kind) => LifecycleEvent::Failed {
                request_id,
                elapsed,
                kind,
            },
        };
        self.observer.observe(&event);

        SubmitStatus::Completed(kind)
    }
}
