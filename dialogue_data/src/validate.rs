use std::fmt;

use crate::*;

/// Structural problem found in a [`DialogueDocument`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    TierOutOfRange { tier: Tier },
    EmptyConditions { tier: Tier, line: String },
    EmptyConditionList { tier: Tier, line: String },
    ConditionedDefault { tier: Tier },
    UnconditionedLine { tier: Tier, line: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::TierOutOfRange { tier } => {
                write!(f, "tier {tier} is outside {MIN_TIER}..={MAX_TIER}")
            },
            ValidationError::EmptyConditions { tier, line } => {
                write!(f, "tier {tier}: line '{line}' has an empty condition set")
            },
            ValidationError::EmptyConditionList { tier, line } => {
                write!(f, "tier {tier}: line '{line}' has an empty condition list")
            },
            ValidationError::ConditionedDefault { tier } => {
                write!(f, "tier {tier}: '{DEFAULT_LINE}' must hold plain text")
            },
            ValidationError::UnconditionedLine { tier, line } => {
                write!(f, "tier {tier}: line '{line}' has no conditions")
            },
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check the shape invariants of a dialogue document.
///
/// ```
/// use dialogue_data::{ConditionSet, DialogueDocument, LineValue, validate_document};
///
/// let mut doc = DialogueDocument::with_all_tiers();
/// doc.tier_mut(2).insert(
///     "Nice weather.".into(),
///     LineValue::Conditions(ConditionSet {
///         weather: Some("Sunny".into()),
///         ..ConditionSet::default()
///     }),
/// );
/// assert!(validate_document(&doc).is_empty());
/// ```
pub fn validate_document(doc: &DialogueDocument) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (&tier, bucket) in &doc.hearts {
        if tier > MAX_TIER {
            errors.push(ValidationError::TierOutOfRange { tier });
        }
        for (line, value) in bucket {
            check_line(tier, line, value, &mut errors);
        }
    }

    errors
}

fn check_line(tier: Tier, line: &str, value: &LineValue, errors: &mut Vec<ValidationError>) {
    let is_default = line == DEFAULT_LINE;
    match value {
        LineValue::Text(_) if is_default => {},
        LineValue::Text(_) => errors.push(ValidationError::UnconditionedLine {
            tier,
            line: line.to_string(),
        }),
        _ if is_default => errors.push(ValidationError::ConditionedDefault { tier }),
        LineValue::Conditions(set) => {
            if set.is_empty() {
                errors.push(ValidationError::EmptyConditions {
                    tier,
                    line: line.to_string(),
                });
            }
        },
        LineValue::Many(sets) => {
            if sets.is_empty() {
                errors.push(ValidationError::EmptyConditionList {
                    tier,
                    line: line.to_string(),
                });
            }
            if sets.iter().any(ConditionSet::is_empty) {
                errors.push(ValidationError::EmptyConditions {
                    tier,
                    line: line.to_string(),
                });
            }
        },
    }
}
