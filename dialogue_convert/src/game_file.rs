//! Conversion of flat game dialogue files (`key → text`).

use dialogue_data::{DialogueDocument, MIN_TIER};
use log::{debug, info};
use serde_json::{Map, Value};

use crate::ConvertOptions;
use crate::bucket::{self, Placement};
use crate::coerce;
use crate::pattern::{RuleKind, SourceKind, classify};
use crate::sanitize::{needs_sanitizing, sanitize};

/// Convert a game dialogue file.
///
/// Unrecognized keys become the tier-0 default line. Digit-only keys become
/// the default line of that tier. With `expand_all`, date, event and gift
/// entries are copied into every tier.
///
/// ```
/// use dialogue_convert::{ConvertOptions, convert_game_file};
/// use serde_json::json;
///
/// let src = json!({"Mon": "Hi!", "3": "Howdy"});
/// let doc = convert_game_file(src.as_object().unwrap(), &ConvertOptions::default());
/// assert!(doc.line(0, "Hi!").is_some());
/// assert_eq!(doc.default_line(3), Some("Howdy"));
/// ```
pub fn convert_game_file(entries: &Map<String, Value>, options: &ConvertOptions) -> DialogueDocument {
    let placements: Vec<Placement> = entries
        .iter()
        .filter_map(|(key, value)| match coerce::line_text(value) {
            Some(text) => Some(entry_placement(key, &text, options)),
            None => {
                debug!("skipping null entry '{key}'");
                None
            },
        })
        .collect();
    info!("game file: {} entries converted", placements.len());
    bucket::fold(placements)
}

fn entry_placement(key: &str, text: &str, options: &ConvertOptions) -> Placement {
    if needs_sanitizing(text) {
        debug!("'{key}': stripping invisible characters");
    }
    let text = sanitize(text);
    let Some(matched) = classify(key, SourceKind::GameFile) else {
        debug!("unrecognized key '{key}'; using tier {MIN_TIER} default");
        return Placement::default_line(MIN_TIER, text);
    };
    let tier = matched.tier_override.unwrap_or(MIN_TIER);
    if matched.rule == RuleKind::TierDefault || matched.fields.is_empty() {
        return Placement::default_line(tier, text);
    }
    let expands = options.expand_all && matched.expands();
    let placement = Placement::conditioned(tier, text, matched.fields);
    if expands { placement.in_all_tiers() } else { placement }
}
