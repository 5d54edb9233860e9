//! Content-patch `When` blocks and condition merging.

use dialogue_data::{ConditionSet, MIN_TIER, Tier};
use log::debug;
use serde_json::{Map, Value};

use crate::coerce;

/// Guard kinds recognized in a `When` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardKind {
    Weather,
    Time,
    Location,
    Event,
    DaysInState,
    Action,
    Item,
    Flag,
    Kids,
    Chance,
    Relationship,
    Hearts,
}

impl GuardKind {
    /// Match a `When` key, ignoring ASCII case.
    pub fn from_key(key: &str) -> Option<Self> {
        const KINDS: [(&str, GuardKind); 12] = [
            ("Weather", GuardKind::Weather),
            ("Time", GuardKind::Time),
            ("Location", GuardKind::Location),
            ("Event", GuardKind::Event),
            ("DaysInState", GuardKind::DaysInState),
            ("Action", GuardKind::Action),
            ("Item", GuardKind::Item),
            ("Flag", GuardKind::Flag),
            ("Kids", GuardKind::Kids),
            ("Chance", GuardKind::Chance),
            ("Relationship", GuardKind::Relationship),
            ("Hearts", GuardKind::Hearts),
        ];
        KINDS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key.trim()))
            .map(|(_, kind)| *kind)
    }
}

/// Parsed `When` block of one change record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuardBlock {
    conditions: ConditionSet,
    hearts: Option<Tier>,
}

impl GuardBlock {
    /// Map a raw `When` object onto typed conditions.
    ///
    /// `Weather: "Rain"` is renamed to `"Rainy"`; `DaysInState`, `Kids` and
    /// `Chance` are coerced to numbers where possible. Unknown keys are ignored.
    pub fn from_when(when: &Map<String, Value>) -> Self {
        let mut guard = GuardBlock::default();
        for (key, value) in when {
            match GuardKind::from_key(key) {
                Some(kind) => guard.set(kind, value),
                None => debug!("ignoring unsupported When key '{key}'"),
            }
        }
        guard
    }

    fn set(&mut self, kind: GuardKind, value: &Value) {
        let c = &mut self.conditions;
        match kind {
            GuardKind::Weather => {
                c.weather = coerce::text(value).map(|w| if w == "Rain" { "Rainy".to_string() } else { w });
            },
            GuardKind::Time => c.time = coerce::text(value),
            GuardKind::Location => c.location = coerce::text(value),
            GuardKind::Event => c.event = coerce::text(value),
            GuardKind::DaysInState => c.days_in_state = coerce::numeric_field("DaysInState", value),
            GuardKind::Action => c.action = coerce::text(value),
            GuardKind::Item => c.item = coerce::item(value),
            GuardKind::Flag => c.flag = coerce::flag(value),
            GuardKind::Kids => c.kids = coerce::numeric_field("Kids", value),
            GuardKind::Chance => c.chance = coerce::numeric_field("Chance", value),
            GuardKind::Relationship => c.relationship = coerce::text(value),
            GuardKind::Hearts => self.hearts = coerce::tier(value),
        }
    }

    /// Tier the record's entries land in unless a key overrides it.
    pub fn base_tier(&self) -> Tier {
        self.hearts.unwrap_or(MIN_TIER)
    }

    /// Merge this guard with conditions derived from an entry key.
    pub fn merge(&self, key_fields: Option<ConditionSet>) -> Option<ConditionSet> {
        merge(&self.conditions, key_fields)
    }
}

/// Guard conditions first, then key-derived conditions on top.
///
/// Key-derived kinds win over the same kind from the guard. Returns `None`
/// when neither side contributes anything.
///
/// ```
/// use dialogue_convert::guard::merge;
/// use dialogue_data::ConditionSet;
///
/// let guard = ConditionSet { weather: Some("Rainy".into()), ..ConditionSet::default() };
/// let key = ConditionSet { event: Some("100".into()), ..ConditionSet::default() };
/// let merged = merge(&guard, Some(key)).unwrap();
/// assert_eq!(merged.weather.as_deref(), Some("Rainy"));
/// assert_eq!(merged.event.as_deref(), Some("100"));
/// assert!(merge(&ConditionSet::default(), None).is_none());
/// ```
pub fn merge(guard: &ConditionSet, key_fields: Option<ConditionSet>) -> Option<ConditionSet> {
    let mut merged = guard.clone();
    if let Some(fields) = key_fields {
        merged.overlay(fields);
    }
    (!merged.is_empty()).then_some(merged)
}
