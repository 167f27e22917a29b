//! Override merging.
//!
//! Staged overrides arrive as raw user text. [`merge`] folds them into a complete
//! [`ReportInput`], coercing each value to the field's type and keeping the prior
//! value whenever coercion fails. [`normalize`] builds the `overrides` object sent
//! with a `modify_report` request.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::{Number, Value};

use crate::models::{InputField, ReportInput};

/// Sparse set of raw override values keyed by input field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideSet(BTreeMap<InputField, String>);

impl OverrideSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the raw value for `field`. A blank value un-stages the field.
    pub fn stage(&mut self, field: InputField, raw: impl Into<String>) {
        let raw = raw.into();
        if raw.trim().is_empty() {
            self.0.remove(&field);
        } else {
            self.0.insert(field, raw);
        }
    }

    pub fn get(&self, field: InputField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (InputField, &str)> {
        self.0.iter().map(|(field, raw)| (*field, raw.as_str()))
    }
}

impl FromIterator<(InputField, String)> for OverrideSet {
    fn from_iter<I: IntoIterator<Item = (InputField, String)>>(iter: I) -> Self {
        let mut set = OverrideSet::new();
        for (field, raw) in iter {
            set.stage(field, raw);
        }
        set
    }
}

/// Combine `input` with `overrides`. Pure and total.
pub fn merge(input: &ReportInput, overrides: &OverrideSet) -> ReportInput {
    let mut merged = input.clone();

    for (field, raw) in overrides.iter() {
        match field {
            InputField::ProductName => merged.product_name = raw.to_string(),
            InputField::Category => merged.category = raw.to_string(),
            InputField::Region => merged.region = raw.to_string(),
            InputField::ModelType => merged.model_type = Some(raw.to_string()),
            InputField::UnitPrice => {
                if let Some(price) = parse_unit_price(raw) {
                    merged.unit_price = price;
                }
            }
            InputField::CurrentInventory => {
                if let Some(count) = parse_inventory(raw) {
                    merged.current_inventory = count;
                }
            }
            InputField::PredictionDate => {
                if let Ok(date) = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
                    merged.prediction_date = date;
                }
            }
        }
    }

    merged
}

/// Build the wire form of the staged overrides.
///
/// Numeric fields are sent as JSON numbers only when [`merge`] would accept them
/// (integral values as integers); anything else goes out as the raw string.
pub fn normalize(overrides: &OverrideSet) -> BTreeMap<String, Value> {
    overrides
        .iter()
        .filter(|(_, raw)| !raw.trim().is_empty())
        .map(|(field, raw)| {
            let number = match field {
                InputField::UnitPrice => parse_unit_price(raw).and_then(price_number),
                InputField::CurrentInventory => parse_inventory(raw).map(Number::from),
                _ => None,
            };
            let value = number
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(raw.to_string()));
            (field.as_str().to_string(), value)
        })
        .collect()
}

fn parse_unit_price(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price > 0.0)
}

fn parse_inventory(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(count) = raw.parse::<u64>() {
        return Some(count);
    }

    let value = raw.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value < u64::MAX as f64 {
        Some(value as u64)
    } else {
        None
    }
}

fn price_number(price: f64) -> Option<Number> {
    if price.fract() == 0.0 && price < i64::MAX as f64 {
        return Some(Number::from(price as i64));
    }
    Number::from_f64(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_input;
    use proptest::prelude::*;
    use serde_json::json;

    fn staged(entries: &[(InputField, &str)]) -> OverrideSet {
        entries
            .iter()
            .map(|(field, raw)| (*field, raw.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_overrides_keep_input() {
        assert_eq!(merge(&sample_input(), &OverrideSet::new()), sample_input());
    }

    #[test]
    fn test_numeric_override_applies() {
        let merged = merge(
            &sample_input(),
            &staged(&[(InputField::UnitPrice, "5000"), (InputField::CurrentInventory, " 80 ")]),
        );
        assert_eq!(merged.unit_price, 5000.0);
        assert_eq!(merged.current_inventory, 80);
        assert_eq!(merged.product_name, "Fancy Silk Saree");
    }

    #[test]
    fn test_unparsable_numbers_fall_back() {
        let input = sample_input();
        let merged = merge(&input, &staged(&[(InputField::CurrentInventory, "abc")]));
        assert_eq!(merged.current_inventory, input.current_inventory);

        let merged = merge(
            &input,
            &staged(&[
                (InputField::UnitPrice, "-3"),
                (InputField::CurrentInventory, "2.5"),
                (InputField::PredictionDate, "next week"),
            ]),
        );
        assert_eq!(merged, input);
    }

    #[test]
    fn test_text_fields_are_verbatim() {
        let merged = merge(
            &sample_input(),
            &staged(&[
                (InputField::Region, "Tamil Nadu "),
                (InputField::Category, "Jewelry"),
                (InputField::ModelType, "xgboost"),
                (InputField::PredictionDate, "2026-12-25"),
            ]),
        );
        assert_eq!(merged.region, "Tamil Nadu ");
        assert_eq!(merged.category, "Jewelry");
        assert_eq!(merged.model_type.as_deref(), Some("xgboost"));
        assert_eq!(
            merged.prediction_date,
            NaiveDate::from_ymd_opt(2026, 12, 25).unwrap()
        );
    }

    #[test]
    fn test_blank_value_unstages() {
        let mut set = staged(&[(InputField::UnitPrice, "5000")]);
        set.stage(InputField::UnitPrice, "  ");
        assert!(set.is_empty());
    }

    #[test]
    fn test_normalize_payload() {
        let set = staged(&[
            (InputField::UnitPrice, "5000"),
            (InputField::CurrentInventory, "lots"),
            (InputField::Region, "42"),
        ]);
        let normalized = normalize(&set);

        assert_eq!(normalized["unit_price"], json!(5000));
        assert_eq!(normalized["current_inventory"], json!("lots"));
        assert_eq!(normalized["region"], json!("42"));

        let fractional = normalize(&staged(&[(InputField::UnitPrice, "4999.5")]));
        assert_eq!(fractional["unit_price"], json!(4999.5));
    }

    #[test]
    fn test_normalize_agrees_with_merge() {
        let set = staged(&[
            (InputField::UnitPrice, "-3"),
            (InputField::CurrentInventory, "2.5"),
        ]);
        let normalized = normalize(&set);

        assert_eq!(normalized["unit_price"], json!("-3"));
        assert_eq!(normalized["current_inventory"], json!("2.5"));
        assert_eq!(merge(&sample_input(), &set), sample_input());

        let whole = normalize(&staged(&[(InputField::CurrentInventory, "80.0")]));
        assert_eq!(whole["current_inventory"], json!(80));
    }

    #[test]
    fn test_inventory_beyond_u64_falls_back() {
        let input = sample_input();
        let merged = merge(&input, &staged(&[(InputField::CurrentInventory, "18446744073709551616.0")]));
        assert_eq!(merged.current_inventory, input.current_inventory);
    }

    fn field_strategy() -> impl Strategy<Value = InputField> {
        (0..InputField::ALL.len()).prop_map(|i| InputField::ALL[i])
    }

    fn raw_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            "[1-9][0-9]{0,5}",
            "[a-z]{1,6}",
            "20[0-9]{2}-0[1-9]-1[0-9]",
        ]
    }

    proptest! {
        #[test]
        fn prop_merge_respects_absent_and_coerced_fields(
            entries in proptest::collection::vec((field_strategy(), raw_strategy()), 0..7)
        ) {
            let input = sample_input();
            let set: OverrideSet = entries.into_iter().collect();
            let merged = merge(&input, &set);

            for field in InputField::ALL {
                let raw = set.get(field);
                match field {
                    InputField::ProductName => prop_assert_eq!(
                        &merged.product_name,
                        &raw.map(str::to_string).unwrap_or(input.product_name.clone())
                    ),
                    InputField::Category => prop_assert_eq!(
                        &merged.category,
                        &raw.map(str::to_string).unwrap_or(input.category.clone())
                    ),
                    InputField::Region => prop_assert_eq!(
                        &merged.region,
                        &raw.map(str::to_string).unwrap_or(input.region.clone())
                    ),
                    InputField::ModelType => prop_assert_eq!(
                        merged.model_type.as_deref(),
                        raw.or(input.model_type.as_deref())
                    ),
                    InputField::UnitPrice => {
                        let expected = raw
                            .and_then(|r| r.parse::<f64>().ok())
                            .filter(|p| p.is_finite() && *p > 0.0)
                            .unwrap_or(input.unit_price);
                        prop_assert_eq!(merged.unit_price, expected);
                    }
                    InputField::CurrentInventory => {
                        let expected = raw
                            .and_then(|r| r.parse::<u64>().ok())
                            .unwrap_or(input.current_inventory);
                        prop_assert_eq!(merged.current_inventory, expected);
                    }
                    InputField::PredictionDate => {
                        let expected = raw
                            .and_then(|r| NaiveDate::parse_from_str(r, "%Y-%m-%d").ok())
                            .unwrap_or(input.prediction_date);
                        prop_assert_eq!(merged.prediction_date, expected);
                    }
                }
            }
        }
    }
}
