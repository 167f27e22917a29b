//! Plain-language explanations for forecast risk flags and policy effects.

const UNKNOWN_RISK: &str =
    "This risk factor may impact your forecast. Consider adjusting your strategy accordingly.";

const NEUTRAL_POLICY: &str =
    "Current policy conditions are within normal ranges and not significantly impacting demand patterns.";

/// Explanation for a risk flag emitted by the forecasting model.
pub fn risk_explanation(flag: &str) -> &'static str {
    match flag {
        "High Waste Risk" => {
            "Current inventory significantly exceeds forecasted demand. Consider promotional pricing or reducing future orders to minimize dead stock losses."
        }
        "Diwali Demand Spike Active" => {
            "The prediction date falls within the Diwali shopping window (Dussehra to Diwali+3 days). Expect 20-40% higher demand than normal periods."
        }
        "Wedding Season Boost Active" => {
            "Wedding season months (Nov-Feb, May-Jun) typically see elevated demand for fashion and jewelry categories. Factor in a 15-30% boost."
        }
        "High Interest Rate Drag detected" => {
            "RBI Repo Rate above 6.25% creates financing headwinds for big-ticket items like automotive and home goods. Expect 10-20% demand reduction."
        }
        _ => UNKNOWN_RISK,
    }
}

/// Explanation for a repo-rate or inflation effect label. Unknown labels read as neutral.
pub fn policy_explanation(effect: &str) -> &'static str {
    match effect {
        // Label is misspelled by the backend; match it as sent.
        "High Interest Rates reduing Demand" | "High Interest Rates reducing Demand" => {
            "When RBI Repo Rate exceeds 6.25%, borrowing costs increase, reducing consumer spending on credit-dependent purchases."
        }
        "Low Interest Rates boosting Demand" => {
            "RBI Repo Rate below 6.0% makes credit cheaper, encouraging consumer spending especially on high-value items."
        }
        "High Inflation reducing Purchasing Power" => {
            "CPI above 6% erodes real income, causing consumers to prioritize essentials over discretionary spending."
        }
        _ => NEUTRAL_POLICY,
    }
}
