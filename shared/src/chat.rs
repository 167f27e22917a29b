//! Conversation endpoint contract.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::merge::{normalize, OverrideSet};
use crate::models::ForecastOutput;
use crate::session::Credential;
use crate::{Error, Result};

/// Request to the assistant. Serializes with a `mode` tag of `chat` or `modify_report`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ChatRequest {
    /// Free-form question about a report
    Chat {
        message: String,
        context: ChatContext,
    },
    /// Recompute the forecast with overridden inputs
    ModifyReport {
        message: String,
        report_id: String,
        overrides: BTreeMap<String, Value>,
    },
}

/// Report the question refers to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatContext {
    pub report_id: String,
}

impl ChatRequest {
    pub fn chat(message: impl Into<String>, report_id: impl Into<String>) -> Self {
        ChatRequest::Chat {
            message: message.into(),
            context: ChatContext {
                report_id: report_id.into(),
            },
        }
    }

    pub fn modify_report(
        message: impl Into<String>,
        report_id: impl Into<String>,
        overrides: &OverrideSet,
    ) -> Self {
        ChatRequest::ModifyReport {
            message: message.into(),
            report_id: report_id.into(),
            overrides: normalize(overrides),
        }
    }

    /// Wire value of the `mode` tag.
    pub fn mode(&self) -> &'static str {
        match self {
            ChatRequest::Chat { .. } => "chat",
            ChatRequest::ModifyReport { .. } => "modify_report",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ChatRequest::Chat { message, .. } | ChatRequest::ModifyReport { message, .. } => message,
        }
    }
}

/// Response from the assistant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChatReply {
    /// Assistant's response text
    pub reply: Option<String>,
    /// Recomputed forecast, present when the request changed the report
    pub modified_prediction: Option<ForecastOutput>,
}

/// Body of a `/chat` response as sent by the backend.
#[derive(Debug, Deserialize)]
pub struct ChatResponseBody {
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub modified_prediction: Option<ForecastOutput>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ChatResponseBody {
    /// An explicit `success: false`, or an error without a reply, is a rejection.
    pub fn into_reply(self) -> Result<ChatReply> {
        let rejected = self.success == Some(false) || (self.error.is_some() && self.reply.is_none());
        if rejected {
            return Err(Error::Rejected(
                self.error
                    .unwrap_or_else(|| "The assistant could not handle the request".to_string()),
            ));
        }

        Ok(ChatReply {
            reply: self.reply,
            modified_prediction: self.modified_prediction,
        })
    }
}

/// Endpoint that answers chat and override requests.
#[async_trait]
pub trait ChatEndpoint: Send + Sync {
    async fn send(&self, request: &ChatRequest, credential: &Credential) -> Result<ChatReply>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InputField;
    use serde_json::json;

    #[test]
    fn test_chat_shape() {
        let request = ChatRequest::chat("Why is waste so high?", "rep-1");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "message": "Why is waste so high?",
                "mode": "chat",
                "context": {"report_id": "rep-1"}
            })
        );
    }

    #[test]
    fn test_override_shape() {
        let overrides: OverrideSet = [(InputField::UnitPrice, "5000".to_string())]
            .into_iter()
            .collect();
        let request = ChatRequest::modify_report("Explain the changes in the forecast", "rep-1", &overrides);

        assert_eq!(request.mode(), "modify_report");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "message": "Explain the changes in the forecast",
                "mode": "modify_report",
                "report_id": "rep-1",
                "overrides": {"unit_price": 5000}
            })
        );
    }

    #[test]
    fn test_response_body() {
        let body: ChatResponseBody = serde_json::from_value(json!({
            "reply": "Demand drops by 12%.",
            "modified_prediction": {
                "forecast_sales": 35,
                "projected_revenue": 175000,
                "potential_waste_inr": 0,
                "risk_flags": [],
                "policy_impact": {"repo_rate_effect": "Neutral", "inflation_effect": "Neutral"}
            }
        }))
        .unwrap();
        let reply = body.into_reply().unwrap();
        assert_eq!(reply.reply.as_deref(), Some("Demand drops by 12%."));
        assert_eq!(reply.modified_prediction.unwrap().forecast_sales, 35);

        let empty: ChatResponseBody = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.into_reply().unwrap(), ChatReply::default());
    }

    #[test]
    fn test_rejected_body() {
        let body: ChatResponseBody = serde_json::from_value(json!({
            "success": false,
            "error": "Report not found"
        }))
        .unwrap();
        match body.into_reply() {
            Err(Error::Rejected(reason)) => assert_eq!(reason, "Report not found"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
