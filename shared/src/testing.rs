//! Fixtures shared by the unit tests.

use chrono::{NaiveDate, TimeZone, Utc};

use crate::models::{ForecastOutput, PolicyImpact, Report, ReportInput};

pub fn sample_input() -> ReportInput {
    ReportInput {
        product_name: "Fancy Silk Saree".to_string(),
        category: "Fashion".to_string(),
        region: "Tier-1".to_string(),
        unit_price: 4500.0,
        current_inventory: 50,
        prediction_date: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
        model_type: None,
    }
}

pub fn sample_output() -> ForecastOutput {
    ForecastOutput {
        forecast_sales: 42,
        projected_revenue: 189000.0,
        potential_waste_inr: 36000.0,
        risk_flags: vec!["High Waste Risk".to_string()],
        policy_impact: PolicyImpact {
            repo_rate_effect: "Neutral".to_string(),
            inflation_effect: "Neutral".to_string(),
        },
        explanation: Some([("festival".to_string(), 0.4)].into_iter().collect()),
    }
}

pub fn sample_report() -> Report {
    Report {
        id: "rep-1".to_string(),
        user_id: "user_1".to_string(),
        input: sample_input(),
        output: sample_output(),
        created_at: Utc.with_ymd_and_hms(2026, 10, 1, 10, 0, 0).unwrap(),
        modified_at: None,
    }
}
