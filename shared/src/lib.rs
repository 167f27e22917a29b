//! Shared library for the forecast assistant.
//!
//! Report types, the request lifecycle, override merging, and the conversation
//! state machine used by the command-line tools.

pub mod auth;
pub mod chat;
pub mod config;
pub mod conversation;
pub mod error;
pub mod explain;
pub mod http;
pub mod lifecycle;
pub mod merge;
pub mod models;
pub mod reconcile;
pub mod session;
pub mod store;
pub mod telemetry;

#[cfg(test)]
mod testing;

pub use auth::{inspect_token, SessionClaims, SessionUser};
pub use chat::{ChatEndpoint, ChatReply, ChatRequest};
pub use config::Config;
pub use conversation::{Conversation, ConversationState, SubmitStatus};
pub use error::{Error, Result};
pub use http::ApiClient;
pub use lifecycle::{DeadlineClass, Deadlines, Outcome, OutcomeKind, RequestLifecycle};
pub use merge::{merge, normalize, OverrideSet};
pub use models::{ApiResponse, ForecastOutput, InputField, Message, Report, ReportInput, Role};
pub use session::{Credential, SessionProvider};
pub use store::{ReportStore, Reports};
pub use telemetry::{LifecycleEvent, LifecycleObserver, NoopObserver, TracingObserver};
