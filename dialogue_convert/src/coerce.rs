//! Loose conversions from raw JSON values to condition values.
//!
//! Content files are hand written and not strict about types: tiers show up
//! as `2` or `"2"`, item lists as arrays or single values. Numeric coercion
//! never rejects a value; anything that does not parse is kept as its raw
//! string.

use std::collections::BTreeMap;

use dialogue_data::{FlagCond, ItemCond, MAX_TIER, Numeric, Tier};
use log::warn;
use serde_json::Value;

/// Text view of a scalar value. `null` and empty strings count as absent.
///
/// Arrays are joined with `", "`, the content-patch convention for value lists.
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        },
        Value::Object(_) => Some(value.to_string()),
    }
}

/// Dialogue text of an entry value. Unlike [`text`], empty strings are kept.
pub fn line_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => text(other),
    }
}

/// Numeric view of a value; see [`Numeric::coerce_str`] for strings.
pub fn numeric(value: &Value) -> Option<Numeric> {
    match value {
        Value::Number(n) => Some(match n.as_i64() {
            Some(i) => Numeric::Int(i),
            None => Numeric::Float(n.as_f64().unwrap_or_default()),
        }),
        other => text(other).map(|raw| Numeric::coerce_str(&raw)),
    }
}

/// Like [`numeric`], logging values that stay non-numeric.
pub fn numeric_field(field: &str, value: &Value) -> Option<Numeric> {
    let coerced = numeric(value)?;
    if let Numeric::Text(raw) = &coerced {
        warn!("{field} value '{raw}' is not numeric; keeping it as text");
    }
    Some(coerced)
}

/// Item identifier(s): arrays become lists, everything else a single id.
pub fn item(value: &Value) -> Option<ItemCond> {
    match value {
        Value::Array(items) => {
            let ids: Vec<Numeric> = items.iter().filter_map(numeric).collect();
            (!ids.is_empty()).then_some(ItemCond::Many(ids))
        },
        other => numeric(other).map(ItemCond::One),
    }
}

/// Flag mapping; non-object values are carried as raw text.
pub fn flag(value: &Value) -> Option<FlagCond> {
    match value {
        Value::Object(map) => {
            let kinds: BTreeMap<String, String> = map
                .iter()
                .filter_map(|(kind, v)| text(v).map(|t| (kind.clone(), t)))
                .collect();
            (!kinds.is_empty()).then_some(FlagCond::Kinds(kinds))
        },
        other => text(other).map(FlagCond::Raw),
    }
}

/// Bring any tier number into `0..=MAX_TIER`.
pub fn clamp_tier(raw: u64) -> Tier {
    match Tier::try_from(raw) {
        Ok(tier) if tier <= MAX_TIER => tier,
        _ => {
            warn!("tier {raw} is above {MAX_TIER}; clamping to {MAX_TIER}");
            MAX_TIER
        },
    }
}

/// Tier from a run of ASCII digits captured out of a key.
pub fn tier_from_digits(digits: &str) -> Tier {
    clamp_tier(digits.parse::<u64>().unwrap_or(u64::MAX))
}

/// Tier from a guard `Hearts` value. `None` when the value is not a usable number.
pub fn tier(value: &Value) -> Option<Tier> {
    match numeric(value)? {
        Numeric::Int(n) if n >= 0 => Some(clamp_tier(n.unsigned_abs())),
        Numeric::Float(f) if f >= 0.0 => Some(clamp_tier(f.trunc() as u64)),
        other => {
            warn!("Hearts value {other:?} is not a tier number; using tier 0");
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_views() {
        assert_eq!(text(&json!("Rain")), Some("Rain".into()));
        assert_eq!(text(&json!(7)), Some("7".into()));
        assert_eq!(text(&json!(["Rain", "Storm"])), Some("Rain, Storm".into()));
        assert_eq!(text(&json!("")), None);
        assert_eq!(text(&Value::Null), None);
        assert_eq!(line_text(&json!("")), Some(String::new()));
    }

    #[test]
    fn numeric_keeps_unparsable_text() {
        assert_eq!(numeric(&json!(3)), Some(Numeric::Int(3)));
        assert_eq!(numeric(&json!("3")), Some(Numeric::Int(3)));
        assert_eq!(numeric(&json!(0.5)), Some(Numeric::Float(0.5)));
        assert_eq!(numeric(&json!("a few")), Some(Numeric::Text("a few".into())));
        assert_eq!(numeric_field("Kids", &json!("two")), Some(Numeric::Text("two".into())));
    }

    #[test]
    fn items() {
        assert_eq!(item(&json!("128")), Some(ItemCond::One(Numeric::Int(128))));
        assert_eq!(
            item(&json!([128, "Fiber"])),
            Some(ItemCond::Many(vec![Numeric::Int(128), Numeric::Text("Fiber".into())]))
        );
        assert_eq!(item(&json!([])), None);
    }

    #[test]
    fn flags() {
        assert_eq!(
            flag(&json!({"mail": "letter1"})),
            Some(FlagCond::Kinds([("mail".to_string(), "letter1".to_string())].into()))
        );
        assert_eq!(flag(&json!("metAbigail")), Some(FlagCond::Raw("metAbigail".into())));
    }

    #[test]
    fn tiers() {
        assert_eq!(tier(&json!(4)), Some(4));
        assert_eq!(tier(&json!("6")), Some(6));
        assert_eq!(tier(&json!(14)), Some(MAX_TIER));
        assert_eq!(tier(&json!("lots")), None);
        assert_eq!(tier(&json!(-1)), None);
        assert_eq!(tier_from_digits("99999999999999999999999"), MAX_TIER);
        assert_eq!(tier_from_digits("07"), 7);
    }
}
