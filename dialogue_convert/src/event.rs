//! Event documents: scripted events keyed by cycle and event id.

use dialogue_data::{EventDef, EventDocument};
use log::warn;

use crate::builder::{Condition, collect_conditions};

/// Return a copy of `doc` with `events[cycle][id]` set to the given script.
///
/// Conditions may be empty; events are allowed to start unconditionally.
/// An existing event with the same id in the same cycle is replaced.
///
/// ```
/// use dialogue_convert::{Condition, add_event};
/// use dialogue_data::EventDocument;
///
/// let conds = ["weather=Sun".parse::<Condition>().unwrap()];
/// let doc = add_event(&EventDocument::default(), "2", "9001", "continue/64 15/farmer 64 16 2", &conds);
/// let def = &doc.events["2"]["9001"];
/// assert_eq!(def.conditions.weather.as_deref(), Some("Sun"));
/// assert!(def.strings.is_empty());
/// ```
pub fn add_event(doc: &EventDocument, cycle: &str, id: &str, script: &str, conditions: &[Condition]) -> EventDocument {
    let mut out = doc.clone();
    let def = EventDef {
        event: script.to_string(),
        conditions: collect_conditions(conditions),
        strings: Default::default(),
    };
    if out
        .events
        .entry(cycle.to_string())
        .or_default()
        .insert(id.to_string(), def)
        .is_some()
    {
        warn!("event '{id}' in cycle '{cycle}' replaced");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_like_the_event_editor() {
        let doc = add_event(
            &EventDocument::default(),
            "4",
            "77",
            "none/-100 -100/farmer 0 0 0",
            &["flag=mail=ccBoard".parse().unwrap()],
        );
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({
                "events": {
                    "4": {
                        "77": {
                            "event": "none/-100 -100/farmer 0 0 0",
                            "conditions": {"flag": {"mail": "ccBoard"}},
                            "strings": {}
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn keeps_other_events_and_replaces_same_id() {
        let one = add_event(&EventDocument::default(), "1", "a", "first", &[]);
        let two = add_event(&one, "1", "b", "second", &[]);
        let three = add_event(&two, "1", "a", "third", &[]);
        assert_eq!(one.events["1"].len(), 1);
        assert_eq!(three.events["1"].len(), 2);
        assert_eq!(three.events["1"]["a"].event, "third");
        assert!(three.events["1"]["a"].conditions.is_empty());
    }
}
