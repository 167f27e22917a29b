//! Shared data models.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{Error, Result};

/// Product categories accepted by the forecasting model.
pub const CATEGORIES: [&str; 6] = [
    "Electronics", "Fashion", "Jewelry", "Automotive", "Grocery", "Home"
];

/// Market tiers offered when creating a report.
pub const REGIONS: [&str; 4] = ["Tier-1", "Tier-2", "Tier-3", "Rural"];

/// A persisted forecast: the input parameters paired with the computed output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub user_id: String,
    pub input: ReportInput,
    pub output: ForecastOutput,
    pub created_at: DateTime<Utc>,
    /// Absent until the first applied override, never cleared afterwards.
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

/// Parameters the forecast was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ReportInput {
    #[validate(length(min = 1, message = "product_name cannot be empty"))]
    pub product_name: String,
    #[validate(custom(function = "validate_category"))]
    pub category: String,
    /// Market tier or state name
    #[serde(alias = "state")]
    #[validate(length(min = 1, message = "region cannot be empty"))]
    pub region: String,
    #[validate(range(exclusive_min = 0.0, message = "unit_price must be greater than zero"))]
    pub unit_price: f64,
    pub current_inventory: u64,
    pub prediction_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
}

fn validate_category(category: &str) -> std::result::Result<(), ValidationError> {
    if CATEGORIES.contains(&category) {
        Ok(())
    } else {
        let mut error = ValidationError::new("category");
        error.message = Some(format!("Invalid category. Must be one of: {:?}", CATEGORIES).into());
        Err(error)
    }
}

/// Forecast computed by the remote model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastOutput {
    pub forecast_sales: u64,
    pub projected_revenue: f64,
    pub potential_waste_inr: f64,
    #[serde(default)]
    pub risk_flags: Vec<String>,
    pub policy_impact: PolicyImpact,
    /// Feature contributions, when the model reports them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<BTreeMap<String, f64>>,
}

/// Effect of monetary policy on the forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyImpact {
    pub repo_rate_effect: String,
    pub inflation_effect: String,
}

/// Fields of [`ReportInput`] that can be overridden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InputField {
    ProductName,
    Category,
    Region,
    UnitPrice,
    CurrentInventory,
    PredictionDate,
    ModelType,
}

impl InputField {
    pub const ALL: [InputField; 7] = [
        InputField::ProductName,
        InputField::Category,
        InputField::Region,
        InputField::UnitPrice,
        InputField::CurrentInventory,
        InputField::PredictionDate,
        InputField::ModelType,
    ];

    /// Wire name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            InputField::ProductName => "product_name",
            InputField::Category => "category",
            InputField::Region => "region",
            InputField::UnitPrice => "unit_price",
            InputField::CurrentInventory => "current_inventory",
            InputField::PredictionDate => "prediction_date",
            InputField::ModelType => "model_type",
        }
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        if name == "state" {
            return Ok(InputField::Region);
        }

        InputField::ALL
            .into_iter()
            .find(|field| field.as_str() == name)
            .ok_or_else(|| {
                let valid: Vec<&str> = InputField::ALL.iter().map(|f| f.as_str()).collect();
                Error::Validation(format!(
                    "Unknown field '{}'. Must be one of: {:?}",
                    s.trim(),
                    valid
                ))
            })
    }
}

/// Author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    /// Set only on assistant replies that carried a recomputed forecast
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_prediction: Option<ForecastOutput>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content.into())
    }

    /// Attach the forecast that this reply applied.
    pub fn with_prediction(mut self, output: ForecastOutput) -> Self {
        self.modified_prediction = Some(output);
        self
    }

    fn new(role: Role, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            modified_prediction: None,
        }
    }
}

/// Standard API response wrapper used by the report endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the envelope, turning `success: false` into [`Error::Rejected`].
    pub fn into_optional(self) -> Result<Option<T>> {
        if self.success {
            Ok(self.data)
        } else {
            Err(Error::Rejected(
                self.error.unwrap_or_else(|| "Request failed".to_string()),
            ))
        }
    }

    /// Like [`ApiResponse::into_optional`], but a missing payload is also a rejection.
    pub fn into_result(self) -> Result<T> {
        self.into_optional()?
            .ok_or_else(|| Error::Rejected("Response did not include data".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_input;

    #[test]
    fn test_parse_report() {
        let json = r#"{
            "id": "rep-1",
            "user_id": "user_1",
            "input": {
                "product_name": "Fancy Silk Saree",
                "category": "Fashion",
                "state": "Maharashtra",
                "unit_price": 4500,
                "current_inventory": 50,
                "prediction_date": "2026-11-01"
            },
            "output": {
                "forecast_sales": 42,
                "projected_revenue": 189000.0,
                "potential_waste_inr": 36000,
                "risk_flags": ["Diwali Demand Spike Active"],
                "policy_impact": {
                    "repo_rate_effect": "Neutral",
                    "inflation_effect": "Neutral"
                },
                "explanation": {"festival": 0.4}
            },
            "created_at": "2026-10-01T10:00:00Z",
            "modified_at": null
        }"#;

        let report: Report = serde_json::from_str(json).unwrap();
        assert_eq!(report.input.region, "Maharashtra");
        assert_eq!(report.input.unit_price, 4500.0);
        assert_eq!(report.output.forecast_sales, 42);
        assert_eq!(report.output.explanation.unwrap()["festival"], 0.4);
        assert!(report.modified_at.is_none());
    }

    #[test]
    fn test_input_validation() {
        assert!(sample_input().validate().is_ok());

        let mut input = sample_input();
        input.unit_price = 0.0;
        assert!(input.validate().is_err());

        let mut input = sample_input();
        input.category = "Toys".to_string();
        let err = Error::from(input.validate().unwrap_err());
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_field_names() {
        assert_eq!("unit_price".parse::<InputField>().unwrap(), InputField::UnitPrice);
        assert_eq!(" State ".parse::<InputField>().unwrap(), InputField::Region);
        assert!("colour".parse::<InputField>().is_err());
    }

    #[test]
    fn test_envelope() {
        let ok: ApiResponse<u32> = serde_json::from_str(r#"{"success":true,"data":7}"#).unwrap();
        assert_eq!(ok.into_result().unwrap(), 7);

        let rejected: ApiResponse<u32> =
            serde_json::from_str(r#"{"success":false,"error":"Report not found"}"#).unwrap();
        match rejected.into_result() {
            Err(Error::Rejected(msg)) => assert_eq!(msg, "Report not found"),
            other => panic!("unexpected: {:?}", other),
        }

        let empty: ApiResponse<Vec<u32>> = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert_eq!(empty.into_optional().unwrap(), None);
    }
}
