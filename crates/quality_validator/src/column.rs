//! Column-level checks.
//!
//! Each check resolves its column first; a column absent from the batch
//! fails the rule with a [`RuleViolation::MissingColumn`] diagnostic.

use chrono::format::{Item, Parsed, StrftimeItems, parse};
use serde_json::{Value, json};

use crate::{DataSet, DataValue, Observation, RuleViolation, same_type};

/// Column must exist and hold no nulls.
pub fn check_not_null(dataset: &DataSet, column: &str) -> Observation {
    if dataset.column(column).is_none() {
        return Observation::missing_column(column);
    }

    let count = dataset.values(column).filter(|v| v.is_null()).count() as u64;
    let observed = json!({ "element_count": dataset.len(), "unexpected_count": count });
    if count == 0 {
        Observation::holds(observed)
    } else {
        Observation::violated(
            observed,
            RuleViolation::NullValues {
                column: column.to_string(),
                count,
            },
        )
    }
}

/// Declared column type must be one of `accepted`, after alias folding.
pub fn check_declared_type(dataset: &DataSet, column: &str, accepted: &[String]) -> Observation {
    let Some(schema) = dataset.column(column) else {
        return Observation::missing_column(column);
    };

    let observed = Value::from(schema.data_type.clone());
    if accepted.iter().any(|t| same_type(&schema.data_type, t)) {
        return Observation::holds(observed);
    }

    let expected = match accepted {
        [single] => format!("'{single}'"),
        many => format!("one of {many:?}"),
    };
    Observation::violated(
        observed,
        RuleViolation::type_mismatch(column, expected, &schema.data_type),
    )
}

/// Every non-null value must be a string fully matching `format`.
pub fn check_strftime(dataset: &DataSet, column: &str, format: &str) -> Observation {
    if dataset.column(column).is_none() {
        return Observation::missing_column(column);
    }

    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Observation::failed(RuleViolation::InvalidFormat(format.to_string()));
    }

    let mut count = 0u64;
    let mut first = None;
    for value in dataset.values(column).filter(|v| !v.is_null()) {
        let matches = value
            .as_text()
            .is_some_and(|text| matches_format(text, &items));
        if !matches {
            count += 1;
            first.get_or_insert_with(|| display(value));
        }
    }

    let observed = json!({ "element_count": dataset.len(), "unexpected_count": count });
    match first {
        None => Observation::holds(observed),
        Some(first) => Observation::violated(
            observed,
            RuleViolation::FormatMismatch {
                column: column.to_string(),
                format: format.to_string(),
                count,
                first,
            },
        ),
    }
}

fn matches_format(text: &str, items: &[Item<'_>]) -> bool {
    let mut parsed = Parsed::new();
    if parse(&mut parsed, text, items.iter()).is_err() {
        return false;
    }

    // Field values can each be in range and still name no real date.
    match parsed.to_naive_date() {
        Ok(_) => true,
        Err(e) => e.kind() == chrono::format::ParseErrorKind::NotEnough,
    }
}

fn display(value: &DataValue) -> String {
    match value.as_text() {
        Some(text) => format!("'{text}'"),
        None => serde_json::to_string(value).unwrap_or_else(|_| value.type_name().to_string()),
    }
}
