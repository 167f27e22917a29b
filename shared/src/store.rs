//! Report store contract and the deadline-aware facade over it.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use validator::Validate;

use crate::lifecycle::{DeadlineClass, Outcome, RequestLifecycle};
use crate::models::{Report, ReportInput};
use crate::session::Credential;
use crate::Result;

/// Persistent storage of reports, owned by the backend.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn list(&self, credential: &Credential) -> Result<Vec<Report>>;

    async fn fetch(&self, report_id: &str, credential: &Credential) -> Result<Report>;

    /// Runs the forecasting model and persists the result.
    async fn create(&self, input: &ReportInput, credential: &Credential) -> Result<Report>;

    async fn update(
        &self,
        report_id: &str,
        input: &ReportInput,
        credential: &Credential,
    ) -> Result<Report>;

    async fn delete(&self, report_id: &str, credential: &Credential) -> Result<bool>;
}

/// Report operations dispatched through the request lifecycle.
#[derive(Clone)]
pub struct Reports {
    store: Arc<dyn ReportStore>,
    lifecycle: RequestLifecycle,
}

impl Reports {
    pub fn new(store: Arc<dyn ReportStore>, lifecycle: RequestLifecycle) -> Self {
        Self { store, lifecycle }
    }

    pub async fn list(&self) -> Outcome<Vec<Report>> {
        let store = &self.store;
        self.lifecycle
            .dispatch(DeadlineClass::Short, |credential| async move {
                store.list(&credential).await
            })
            .await
    }

    pub async fn fetch(&self, report_id: &str) -> Outcome<Report> {
        let store = &self.store;
        self.lifecycle
            .dispatch(DeadlineClass::Short, |credential| async move {
                store.fetch(report_id, &credential).await
            })
            .await
    }

    /// Validates `input` locally before anything is sent.
    pub async fn create(&self, input: &ReportInput) -> Result<Outcome<Report>> {
        input.validate()?;

        let store = &self.store;
        let outcome = self
            .lifecycle
            .dispatch(DeadlineClass::Long, |credential| async move {
                store.create(input, &credential).await
            })
            .await;

        if let Outcome::Success(report) = &outcome {
            info!("Created report {} for {}", report.id, report.input.product_name);
        }
        Ok(outcome)
    }

    /// Validates `input` locally before anything is sent.
    pub async fn update(&self, report_id: &str, input: &ReportInput) -> Result<Outcome<Report>> {
        input.validate()?;

        let store = &self.store;
        let outcome = self
            .lifecycle
            .dispatch(DeadlineClass::Short, |credential| async move {
                store.update(report_id, input, &credential).await
            })
            .await;

        if outcome.is_success() {
            info!("Updated report {}", report_id);
        }
        Ok(outcome)
    }

    pub async fn delete(&self, report_id: &str) -> Outcome<bool> {
        let store = &self.store;
        let outcome = self
            .lifecycle
            .dispatch(DeadlineClass::Short, |credential| async move {
                store.delete(report_id, &credential).await
            })
            .await;

        if let Outcome::Success(true) = outcome {
            info!("Deleted report {}", report_id);
        }
        outcome
    }
}
