//! Applying recomputed forecasts to a report.
//!
//! Both functions take the old report by value and return the replacement, so a
//! holder swaps it in with one assignment and never exposes a half-updated output.

use chrono::{DateTime, Utc};

use crate::merge::{merge, OverrideSet};
use crate::models::{ForecastOutput, Report};

/// Replace the report's output wholesale and stamp `modified_at`.
///
/// With no new output the report comes back unchanged.
pub fn apply(report: Report, new_output: Option<ForecastOutput>, at: DateTime<Utc>) -> Report {
    match new_output {
        Some(output) => Report {
            output,
            modified_at: Some(at),
            ..report
        },
        None => report,
    }
}

/// [`apply`], also replacing the input with the overrides that produced `new_output`.
pub fn apply_override(
    report: Report,
    new_output: Option<ForecastOutput>,
    overrides: &OverrideSet,
    at: DateTime<Utc>,
) -> Report {
    match new_output {
        Some(output) => Report {
            input: merge(&report.input, overrides),
            output,
            modified_at: Some(at),
            ..report
        },
        None => report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InputField, PolicyImpact};
    use crate::testing::sample_report;
    use chrono::TimeZone;

    fn new_output() -> ForecastOutput {
        ForecastOutput {
            forecast_sales: 35,
            projected_revenue: 175000.0,
            potential_waste_inr: 0.0,
            risk_flags: vec![],
            policy_impact: PolicyImpact {
                repo_rate_effect: "High Interest Rates reduing Demand".to_string(),
                inflation_effect: "Neutral".to_string(),
            },
            explanation: None,
        }
    }

    #[test]
    fn test_apply_replaces_output_wholesale() {
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let before = sample_report();

        let after = apply(before.clone(), Some(new_output()), at);

        assert_eq!(after.output, new_output());
        // No carry-over from the previous output
        assert!(after.output.explanation.is_none());
        assert!(after.output.risk_flags.is_empty());
        assert_eq!(after.modified_at, Some(at));
        assert_eq!(after.input, before.input);
        assert_eq!(after.created_at, before.created_at);
    }

    #[test]
    fn test_apply_without_output_is_identity() {
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        assert_eq!(apply(sample_report(), None, at), sample_report());

        let mut modified = sample_report();
        let earlier = Utc.with_ymd_and_hms(2026, 10, 2, 9, 0, 0).unwrap();
        modified.modified_at = Some(earlier);
        assert_eq!(apply(modified, None, at).modified_at, Some(earlier));
    }

    #[test]
    fn test_apply_override_merges_input() {
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let overrides: OverrideSet = [(InputField::UnitPrice, "5000".to_string())]
            .into_iter()
            .collect();

        let after = apply_override(sample_report(), Some(new_output()), &overrides, at);
        assert_eq!(after.input.unit_price, 5000.0);
        assert_eq!(after.input.current_inventory, 50);
        assert_eq!(after.output, new_output());

        let untouched = apply_override(sample_report(), None, &overrides, at);
        assert_eq!(untouched, sample_report());
    }
}
