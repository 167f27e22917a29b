//! Request lifecycle: credential lookup, bounded deadline, outcome classification.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

use crate::session::{Credential, SessionProvider};
use crate::Error;

/// Deadline bucket chosen by the expected cost of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineClass {
    /// Reads, listings, deletes
    Short,
    /// Model-bound calls: report creation, chat, overrides
    Long,
}

/// Durations for each deadline class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadlines {
    pub short: Duration,
    pub long: Duration,
}

impl Default for Deadlines {
    fn default() -> Self {
        Self {
            short: Duration::from_secs(30),
            long: Duration::from_secs(90),
        }
    }
}

impl Deadlines {
    pub fn for_class(&self, class: DeadlineClass) -> Duration {
        match class {
            DeadlineClass::Short => self.short,
            DeadlineClass::Long => self.long,
        }
    }
}

/// Failure categories a caller has to distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    AuthUnavailable,
    Timeout,
    TransportFailure,
    ServerRejected,
}

/// Classified result of a dispatched request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    /// Deadline passed; the request was cancelled
    Timeout,
    /// Network or decoding failure
    TransportFailure(String),
    /// No credential; nothing was sent
    AuthUnavailable,
    /// The backend answered and refused
    ServerRejected(String),
}

impl<T> Outcome<T> {
    /// Classify a failed call.
    pub fn from_error(error: Error) -> Self {
        match error.outcome_kind() {
            OutcomeKind::AuthUnavailable => Outcome::AuthUnavailable,
            OutcomeKind::Timeout => Outcome::Timeout,
            OutcomeKind::TransportFailure => Outcome::TransportFailure(error.to_string()),
            OutcomeKind::ServerRejected => Outcome::ServerRejected(match error {
                Error::Rejected(reason)
                | Error::Unauthorized(reason)
                | Error::NotFound(reason)
                | Error::Validation(reason) => reason,
                other => other.to_string(),
            }),
        }
    }

    /// `None` for `Success`.
    pub fn kind(&self) -> Option<OutcomeKind> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Timeout => Some(OutcomeKind::Timeout),
            Outcome::TransportFailure(_) => Some(OutcomeKind::TransportFailure),
            Outcome::AuthUnavailable => Some(OutcomeKind::AuthUnavailable),
            Outcome::ServerRejected(_) => Some(OutcomeKind::ServerRejected),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

/// Issues calls with a credential and a deadline.
#[derive(Clone)]
pub struct RequestLifecycle {
    session: Arc<dyn SessionProvider>,
    deadlines: Deadlines,
}

impl RequestLifecycle {
    pub fn new(session: Arc<dyn SessionProvider>, deadlines: Deadlines) -> Self {
        Self { session, deadlines }
    }

    /// Run `call` under the deadline for `class`.
    ///
    /// `call` is never invoked without a credential. When the deadline fires the
    /// call's future is dropped, which aborts the HTTP exchange; whatever it would
    /// have produced is lost and cannot reach the caller.
    pub async fn dispatch<T, F, Fut>(&self, class: DeadlineClass, call: F) -> Outcome<T>
    where
        F: FnOnce(Credential) -> Fut,
        Fut: Future<Output = crate::Result<T>>,
    {
        let request_id = Uuid::new_v4();
        let span = info_span!("dispatch", %request_id, deadline = ?class);

        async move {
            let Some(credential) = self.session.credential().await else {
                warn!("No session credential available, request not sent");
                return Outcome::AuthUnavailable;
            };

            let deadline = self.deadlines.for_class(class);
            let started = Instant::now();

            match tokio::time::timeout(deadline, call(credential)).await {
                Ok(Ok(payload)) => {
                    debug!("Request succeeded in {:?}", started.elapsed());
                    Outcome::Success(payload)
                }
                Ok(Err(e)) => {
                    warn!("Request failed after {:?}: {}", started.elapsed(), e);
                    Outcome::from_error(e)
                }
                Err(_) => {
                    warn!("Request exceeded {:?} deadline and was cancelled", deadline);
                    Outcome::Timeout
                }
            }
        }
        .instrument(span)
        .await
    }
}
