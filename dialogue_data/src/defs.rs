use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Affection tier ("hearts") used as the outer key of a dialogue document.
pub type Tier = u8;

/// Lowest affection tier.
pub const MIN_TIER: Tier = 0;
/// Highest affection tier.
pub const MAX_TIER: Tier = 10;

/// Line key holding a tier's unconditioned line.
pub const DEFAULT_LINE: &str = "default";

/// Lines of one affection tier, keyed by line text (or [`DEFAULT_LINE`]).
pub type TierBucket = BTreeMap<String, LineValue>;

/// Top-level Dialogue Expander document.
///
/// Serializes as `{ "hearts": { "0": { ... }, ..., "10": { ... } } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogueDocument {
    #[serde(default)]
    pub hearts: BTreeMap<Tier, TierBucket>,
}

impl DialogueDocument {
    /// An empty document with every tier from [`MIN_TIER`] to [`MAX_TIER`] present.
    pub fn with_all_tiers() -> Self {
        Self {
            hearts: (MIN_TIER..=MAX_TIER).map(|t| (t, TierBucket::new())).collect(),
        }
    }

    pub fn tier(&self, tier: Tier) -> Option<&TierBucket> {
        self.hearts.get(&tier)
    }

    /// Mutable access to a tier bucket, creating it if needed.
    pub fn tier_mut(&mut self, tier: Tier) -> &mut TierBucket {
        self.hearts.entry(tier).or_default()
    }

    /// Look up one line of a tier.
    pub fn line(&self, tier: Tier, line: &str) -> Option<&LineValue> {
        self.hearts.get(&tier).and_then(|bucket| bucket.get(line))
    }

    /// The unconditioned line of a tier, if it holds plain text.
    pub fn default_line(&self, tier: Tier) -> Option<&str> {
        match self.line(tier, DEFAULT_LINE) {
            Some(LineValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Total number of lines across all tiers.
    pub fn line_count(&self) -> usize {
        self.hearts.values().map(BTreeMap::len).sum()
    }
}

/// The value stored under one line key of a tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineValue {
    /// Unconditioned line text (only used under [`DEFAULT_LINE`]).
    Text(String),
    /// The line is spoken when these conditions hold.
    Conditions(ConditionSet),
    /// The line is spoken when any one of these condition sets holds.
    Many(Vec<ConditionSet>),
}

impl LineValue {
    pub fn as_conditions(&self) -> Option<&ConditionSet> {
        match self {
            LineValue::Conditions(set) => Some(set),
            _ => None,
        }
    }

    /// All condition sets carried by this value, in order.
    pub fn condition_sets(&self) -> Vec<&ConditionSet> {
        match self {
            LineValue::Text(_) => Vec::new(),
            LineValue::Conditions(set) => vec![set],
            LineValue::Many(sets) => sets.iter().collect(),
        }
    }
}

/// A loosely typed number.
///
/// Source data is not strict about numbers: `"3"` and `3` both show up. Values
/// that coerce are stored as numbers, anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Numeric {
    /// Coerce a string: integer first, then finite float, else the raw text.
    pub fn coerce_str(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return Numeric::Int(n);
        }
        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() && !trimmed.is_empty() => Numeric::Float(f),
            _ => Numeric::Text(raw.to_string()),
        }
    }

    pub fn is_number(&self) -> bool {
        !matches!(self, Numeric::Text(_))
    }
}

/// A `date` condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateCond {
    /// `"Mon"`, `"spring_15"` or `"spring_Mon"`.
    Token(String),
    /// One `[season, weekday, day]` triple.
    Day(CalendarDay),
    /// Several triples; any one of them matches.
    Days(Vec<CalendarDay>),
}

impl From<&str> for DateCond {
    fn from(token: &str) -> Self {
        DateCond::Token(token.to_string())
    }
}

/// Concrete calendar day, serialized as `[season, weekday, day]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay(pub String, pub String, pub u8);

/// An `item` condition: one identifier or a list of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemCond {
    One(Numeric),
    Many(Vec<Numeric>),
}

/// A `flag` condition: flag kind (`mail`, `event`, `recipe`, ...) to value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagCond {
    Kinds(BTreeMap<String, String>),
    /// Anything that was not a mapping in the source, kept as-is.
    Raw(String),
}

impl FlagCond {
    /// Insert one flag kind, turning a raw flag into a mapping if needed.
    pub fn insert(&mut self, kind: impl Into<String>, value: impl Into<String>) {
        match self {
            FlagCond::Kinds(map) => {
                map.insert(kind.into(), value.into());
            },
            FlagCond::Raw(_) => {
                let mut map = BTreeMap::new();
                map.insert(kind.into(), value.into());
                *self = FlagCond::Kinds(map);
            },
        }
    }
}

/// Conditions gating one dialogue line. Absent kinds are omitted on output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateCond>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_in_state: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemCond>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<FlagCond>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kids: Option<Numeric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chance: Option<Numeric>,
    #[serde(default, alias = "rel", skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
}

impl ConditionSet {
    pub fn is_empty(&self) -> bool {
        self.kind_count() == 0
    }

    /// Number of condition kinds present.
    pub fn kind_count(&self) -> usize {
        [
            self.weather.is_some(),
            self.time.is_some(),
            self.location.is_some(),
            self.date.is_some(),
            self.days_in_state.is_some(),
            self.action.is_some(),
            self.item.is_some(),
            self.event.is_some(),
            self.flag.is_some(),
            self.kids.is_some(),
            self.chance.is_some(),
            self.relationship.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }

    /// Copy every kind present in `other` over the same kind in `self`.
    pub fn overlay(&mut self, other: ConditionSet) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(
            weather,
            time,
            location,
            date,
            days_in_state,
            action,
            item,
            event,
            flag,
            kids,
            chance,
            relationship
        );
    }
}

/// Event editor document: `{ "events": { cycle: { event_id: EventDef } } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDocument {
    #[serde(default)]
    pub events: BTreeMap<String, BTreeMap<String, EventDef>>,
}

/// A single scripted event and the conditions that allow it to start.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDef {
    /// Raw event script.
    pub event: String,
    #[serde(default)]
    pub conditions: ConditionSet,
    /// Translatable strings referenced by the script.
    #[serde(default)]
    pub strings: BTreeMap<String, String>,
}
