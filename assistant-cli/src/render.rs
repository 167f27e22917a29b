//! Plain-text rendering of reports and conversation messages.

use shared::explain::{policy_explanation, risk_explanation};
use shared::{ForecastOutput, Message, OverrideSet, Report, Role};

/// Format a rupee amount with Indian digit grouping, e.g. `₹1,89,000`.
pub fn format_inr(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}₹{}", sign, group_indian(&(rounded.abs() as u64).to_string()))
}

/// Last three digits together, then pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut pairs = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        pairs.push(&head[start..end]);
        end = start;
    }
    pairs.reverse();

    format!("{},{}", pairs.join(","), tail)
}

/// One line per report, for listings.
pub fn render_summary(report: &Report) -> String {
    format!(
        "{}  {}  {}/{}  {} units  {}  {}",
        report.id,
        report.input.product_name,
        report.input.category,
        report.input.region,
        report.output.forecast_sales,
        format_inr(report.output.projected_revenue),
        report.input.prediction_date,
    )
}

pub fn render_report(report: &Report) -> String {
    let input = &report.input;
    let mut lines = vec![
        format!("Report {} ({})", report.id, input.product_name),
        format!("  Category:    {}", input.category),
        format!("  Region:      {}", input.region),
        format!("  Unit price:  {}", format_inr(input.unit_price)),
        format!("  Inventory:   {} units", input.current_inventory),
        format!("  Date:        {}", input.prediction_date),
        format!(
            "  Model:       {}",
            input.model_type.as_deref().unwrap_or("default")
        ),
        String::new(),
    ];
    lines.extend(render_output(&report.output));

    match report.modified_at {
        Some(at) => lines.push(format!("Modified {}", at.format("%Y-%m-%d %H:%M UTC"))),
        None => lines.push(format!("Created {}", report.created_at.format("%Y-%m-%d %H:%M UTC"))),
    }

    lines.join("\n")
}

fn render_output(output: &ForecastOutput) -> Vec<String> {
    let mut lines = vec![
        "Forecast".to_string(),
        format!("  Sales:       {} units", output.forecast_sales),
        format!("  Revenue:     {}", format_inr(output.projected_revenue)),
        format!("  Waste:       {}", format_inr(output.potential_waste_inr)),
        format!("  Repo rate:   {}", output.policy_impact.repo_rate_effect),
        format!(
            "               {}",
            policy_explanation(&output.policy_impact.repo_rate_effect)
        ),
        format!("  Inflation:   {}", output.policy_impact.inflation_effect),
        format!(
            "               {}",
            policy_explanation(&output.policy_impact.inflation_effect)
        ),
    ];

    if !output.risk_flags.is_empty() {
        lines.push("Risks".to_string());
        for flag in &output.risk_flags {
            lines.push(format!("  - {}: {}", flag, risk_explanation(flag)));
        }
    }

    if let Some(explanation) = &output.explanation {
        lines.push("Drivers".to_string());
        for (factor, weight) in explanation {
            lines.push(format!("  {:<12} {:+.2}", factor, weight));
        }
    }

    lines
}

pub fn render_message(message: &Message) -> String {
    let speaker = match message.role {
        Role::User => "you",
        Role::Assistant => "assistant",
    };
    let mut text = format!("{}> {}", speaker, message.content);

    if let Some(output) = &message.modified_prediction {
        text.push_str(&format!(
            "\n  forecast updated: {} units, {} revenue, {} waste",
            output.forecast_sales,
            format_inr(output.projected_revenue),
            format_inr(output.potential_waste_inr),
        ));
    }
    text
}

pub fn render_staged(staged: &OverrideSet) -> String {
    if staged.is_empty() {
        return "Nothing staged".to_string();
    }
    staged
        .iter()
        .map(|(field, raw)| format!("  {} = {}", field, raw))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::InputField;

    #[test]
    fn test_indian_grouping() {
        assert_eq!(format_inr(0.0), "₹0");
        assert_eq!(format_inr(999.0), "₹999");
        assert_eq!(format_inr(1000.0), "₹1,000");
        assert_eq!(format_inr(189000.0), "₹1,89,000");
        assert_eq!(format_inr(12345678.4), "₹1,23,45,678");
        assert_eq!(format_inr(-4500.0), "-₹4,500");
    }

    #[test]
    fn test_render_message() {
        let message = Message::assistant("Demand rises during Diwali.");
        assert_eq!(render_message(&message), "assistant> Demand rises during Diwali.");
        assert_eq!(render_message(&Message::user("why?")), "you> why?");
    }

    #[test]
    fn test_render_staged() {
        let mut staged = OverrideSet::new();
        assert_eq!(render_staged(&staged), "Nothing staged");

        staged.stage(InputField::UnitPrice, "5000");
        assert_eq!(render_staged(&staged), "  unit_price = 5000");
    }
}
