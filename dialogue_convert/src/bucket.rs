//! Placement of converted lines into affection-tier buckets.
//!
//! Converters never touch a [`DialogueDocument`] directly. Each entry turns
//! into one or more [`Placement`]s and [`fold`] applies them in order, so all
//! write and collision behaviour lives here.

use dialogue_data::{ConditionSet, DEFAULT_LINE, DialogueDocument, LineValue, MAX_TIER, MIN_TIER, Tier};
use log::{debug, warn};

/// Where a placement is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Tier(Tier),
    /// Identical copy in every tier (expand-all).
    AllTiers,
}

/// What happens when the target line already holds a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceMode {
    /// The new value replaces the old one. An existing list of condition
    /// sets is extended instead.
    Replace,
    /// Condition sets pile up into an ordered list.
    Accumulate,
}

/// One pending write into a dialogue document.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub target: Target,
    pub line: String,
    pub value: LineValue,
    pub mode: PlaceMode,
}

impl Placement {
    /// The unconditioned line of `tier`.
    pub fn default_line(tier: Tier, text: impl Into<String>) -> Self {
        Self {
            target: Target::Tier(tier),
            line: DEFAULT_LINE.to_string(),
            value: LineValue::Text(text.into()),
            mode: PlaceMode::Replace,
        }
    }

    /// `text` spoken at `tier` when `conditions` hold.
    pub fn conditioned(tier: Tier, text: impl Into<String>, conditions: ConditionSet) -> Self {
        Self {
            target: Target::Tier(tier),
            line: text.into(),
            value: LineValue::Conditions(conditions),
            mode: PlaceMode::Replace,
        }
    }

    /// Copy into every tier instead of one.
    pub fn in_all_tiers(mut self) -> Self {
        self.target = Target::AllTiers;
        self
    }

    pub fn accumulating(mut self) -> Self {
        self.mode = PlaceMode::Accumulate;
        self
    }
}

/// Apply placements, in order, to a fresh document holding every tier.
pub fn fold(placements: impl IntoIterator<Item = Placement>) -> DialogueDocument {
    placements
        .into_iter()
        .fold(DialogueDocument::with_all_tiers(), |mut doc, placement| {
            place(&mut doc, placement);
            doc
        })
}

/// Apply a single placement.
pub fn place(doc: &mut DialogueDocument, placement: Placement) {
    let Placement {
        target,
        line,
        value,
        mode,
    } = placement;
    match target {
        Target::Tier(tier) => write_line(doc, tier, line, value, mode),
        Target::AllTiers => {
            for tier in MIN_TIER..=MAX_TIER {
                write_line(doc, tier, line.clone(), value.clone(), mode);
            }
        },
    }
}

fn push_new(sets: &mut Vec<ConditionSet>, set: ConditionSet) {
    if !sets.contains(&set) {
        sets.push(set);
    }
}

fn write_line(doc: &mut DialogueDocument, tier: Tier, line: String, value: LineValue, mode: PlaceMode) {
    let bucket = doc.tier_mut(tier);
    let merged = match (bucket.remove(&line), value, mode) {
        (None, value, _) => value,
        (Some(LineValue::Conditions(old)), LineValue::Conditions(new), PlaceMode::Accumulate) => {
            let mut sets = vec![old];
            push_new(&mut sets, new);
            LineValue::Many(sets)
        },
        // an existing list is only ever extended, whatever the mode
        (Some(LineValue::Many(mut sets)), LineValue::Conditions(new), _) => {
            push_new(&mut sets, new);
            LineValue::Many(sets)
        },
        (Some(LineValue::Many(mut sets)), LineValue::Many(more), _) => {
            for set in more {
                push_new(&mut sets, set);
            }
            LineValue::Many(sets)
        },
        (Some(old), new, _) => {
            if old != new {
                if matches!(old, LineValue::Text(_)) {
                    debug!("tier {tier}: replacing '{line}'");
                } else {
                    warn!("tier {tier}: conditions for '{line}' replaced by a later entry");
                }
            }
            new
        },
    };
    bucket.insert(line, merged);
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialogue_data::DateCond;

    fn dated(date: &str) -> ConditionSet {
        ConditionSet {
            date: Some(DateCond::Token(date.into())),
            ..ConditionSet::default()
        }
    }

    #[test]
    fn fold_starts_with_every_tier() {
        let doc = fold(Vec::new());
        assert_eq!(doc.hearts.len(), 11);
        assert!(doc.hearts.values().all(|b| b.is_empty()));
    }

    #[test]
    fn single_tier_write() {
        let doc = fold([Placement::conditioned(4, "Hi!", dated("Mon"))]);
        assert_eq!(doc.line(4, "Hi!"), Some(&LineValue::Conditions(dated("Mon"))));
        assert_eq!(doc.line_count(), 1);
    }

    #[test]
    fn all_tiers_write() {
        let doc = fold([Placement::conditioned(0, "Hi!", dated("Mon")).in_all_tiers()]);
        for tier in MIN_TIER..=MAX_TIER {
            assert_eq!(doc.line(tier, "Hi!"), Some(&LineValue::Conditions(dated("Mon"))));
        }
    }

    #[test]
    fn accumulate_builds_ordered_list() {
        let doc = fold(
            ["spring_1", "spring_8", "spring_15"]
                .into_iter()
                .map(|d| Placement::conditioned(6, "Bye", dated(d)).accumulating()),
        );
        assert_eq!(
            doc.line(6, "Bye"),
            Some(&LineValue::Many(vec![dated("spring_1"), dated("spring_8"), dated("spring_15")]))
        );
    }

    #[test]
    fn replace_keeps_last() {
        let doc = fold([
            Placement::conditioned(0, "Hi", dated("Mon")),
            Placement::conditioned(0, "Hi", dated("Tue")),
            Placement::default_line(0, "first"),
            Placement::default_line(0, "second"),
        ]);
        assert_eq!(doc.line(0, "Hi"), Some(&LineValue::Conditions(dated("Tue"))));
        assert_eq!(doc.default_line(0), Some("second"));
    }

    #[test]
    fn replace_onto_a_list_extends_it() {
        let expanded = ["spring_1", "spring_8", "spring_15", "spring_22"]
            .into_iter()
            .map(|d| Placement::conditioned(6, "Bye", dated(d)).accumulating());
        let later = [
            Placement::conditioned(0, "Bye", dated("spring_1")).in_all_tiers(),
            Placement::conditioned(6, "Bye", dated("summer_3")),
        ];
        let doc = fold(expanded.chain(later));
        assert_eq!(
            doc.line(6, "Bye"),
            Some(&LineValue::Many(vec![
                dated("spring_1"),
                dated("spring_8"),
                dated("spring_15"),
                dated("spring_22"),
                dated("summer_3"),
            ]))
        );
        assert_eq!(doc.line(2, "Bye"), Some(&LineValue::Conditions(dated("spring_1"))));
    }

    #[test]
    fn accumulating_the_same_set_twice_keeps_one() {
        let doc = fold([
            Placement::conditioned(1, "Hi", dated("Mon")).accumulating(),
            Placement::conditioned(1, "Hi", dated("Mon")).accumulating(),
        ]);
        assert_eq!(doc.line(1, "Hi"), Some(&LineValue::Many(vec![dated("Mon")])));
    }

    #[test]
    fn accumulate_over_plain_text_replaces_it() {
        let doc = fold([
            Placement::default_line(2, "x"),
            Placement {
                line: DEFAULT_LINE.into(),
                ..Placement::conditioned(2, "unused", dated("Mon")).accumulating()
            },
        ]);
        assert_eq!(doc.line(2, DEFAULT_LINE), Some(&LineValue::Conditions(dated("Mon"))));
    }
}
