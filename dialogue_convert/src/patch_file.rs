//! Conversion of content-patch files (`{ "Changes": [ ... ] }`).

use dialogue_data::{ConditionSet, DateCond, DialogueDocument, Tier};
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::ConvertOptions;
use crate::bucket::{self, Placement};
use crate::calendar::season_weekday_days;
use crate::coerce;
use crate::guard::GuardBlock;
use crate::pattern::{KeyMatch, RuleKind, SourceKind, classify};
use crate::sanitize::{needs_sanitizing, sanitize};

/// The only change action that carries dialogue entries.
pub const EDIT_DATA: &str = "EditData";
/// Asset path prefix of character dialogue files.
pub const DIALOGUE_TARGET_PREFIX: &str = "Characters/Dialogue/";

/// A content-patch file. Change records stay raw until conversion, where a
/// malformed record is skipped on its own. Other top-level fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PatchFile {
    pub changes: Vec<Value>,
}

/// One entry of `Changes`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangeRecord {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub when: Option<Map<String, Value>>,
    #[serde(default)]
    pub entries: Option<Map<String, Value>>,
}

impl ChangeRecord {
    /// True for `EditData` records targeting a character's dialogue.
    pub fn edits_dialogue(&self) -> bool {
        self.action.as_deref() == Some(EDIT_DATA)
            && self
                .target
                .as_deref()
                .is_some_and(|t| t.starts_with(DIALOGUE_TARGET_PREFIX))
    }

    /// Character whose dialogue this record edits (`Characters/Dialogue/Abigail` → `Abigail`).
    pub fn character(&self) -> Option<&str> {
        self.target
            .as_deref()?
            .strip_prefix(DIALOGUE_TARGET_PREFIX)
            .map(|rest| rest.split(['/', ',']).next().unwrap_or(rest).trim())
    }
}

/// Convert a content-patch file.
///
/// Records that are not dialogue `EditData` changes are skipped. Each record's
/// `When` block is parsed once and merged into every entry; entries land at
/// the guard's `Hearts` tier unless the key names a tier of its own.
pub fn convert_patch_file(patch: &PatchFile, options: &ConvertOptions) -> DialogueDocument {
    let mut placements = Vec::new();
    let mut converted = 0usize;
    for (index, raw) in patch.changes.iter().enumerate() {
        let record = match ChangeRecord::deserialize(raw) {
            Ok(record) => record,
            Err(e) => {
                warn!("change #{index}: malformed record skipped: {e}");
                continue;
            },
        };
        if !record.edits_dialogue() {
            debug!(
                "change #{index}: skipping {} on {}",
                record.action.as_deref().unwrap_or("<no action>"),
                record.target.as_deref().unwrap_or("<no target>")
            );
            continue;
        }
        debug!("change #{index}: dialogue for {}", record.character().unwrap_or("?"));
        placements.extend(record_placements(&record, options));
        converted += 1;
    }
    info!(
        "patch file: {converted} of {} changes converted into {} placements",
        patch.changes.len(),
        placements.len()
    );
    bucket::fold(placements)
}

fn record_placements(record: &ChangeRecord, options: &ConvertOptions) -> Vec<Placement> {
    let guard = record.when.as_ref().map(GuardBlock::from_when).unwrap_or_default();
    let Some(entries) = &record.entries else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|(key, value)| coerce::line_text(value).map(|text| (key, text)))
        .flat_map(|(key, text)| {
            if needs_sanitizing(&text) {
                debug!("'{key}': stripping invisible characters");
            }
            entry_placements(key, &sanitize(&text), &guard, options)
        })
        .collect()
}

fn entry_placements(key: &str, text: &str, guard: &GuardBlock, options: &ConvertOptions) -> Vec<Placement> {
    let base = guard.base_tier();
    let Some(matched) = classify(key, SourceKind::PatchFile) else {
        debug!("unrecognized key '{key}'");
        return vec![unkeyed_placement(base, text, guard)];
    };
    let tier = matched.tier_override.unwrap_or(base);
    match matched.rule {
        RuleKind::TierDefault => vec![Placement::default_line(tier, text)],
        RuleKind::SeasonWeekdayTier => calendar_placements(&matched, tier, text, guard),
        _ => {
            let expands = options.expand_all && matched.expands();
            match guard.merge(Some(matched.fields)) {
                Some(conditions) => {
                    let placement = Placement::conditioned(tier, text, conditions);
                    vec![if expands { placement.in_all_tiers() } else { placement }]
                },
                None => vec![Placement::default_line(tier, text)],
            }
        },
    }
}

fn unkeyed_placement(tier: Tier, text: &str, guard: &GuardBlock) -> Placement {
    match guard.merge(None) {
        Some(conditions) => Placement::conditioned(tier, text, conditions),
        None => Placement::default_line(tier, text),
    }
}

/// `spring_Mon6` → one placement per Monday of spring (days 1, 8, 15, 22),
/// all accumulating under the same line at tier 6.
fn calendar_placements(matched: &KeyMatch, tier: Tier, text: &str, guard: &GuardBlock) -> Vec<Placement> {
    let Some(DateCond::Token(token)) = &matched.fields.date else {
        return vec![unkeyed_placement(tier, text, guard)];
    };
    let Some((season, weekday)) = token.split_once('_') else {
        return vec![unkeyed_placement(tier, text, guard)];
    };
    season_weekday_days(weekday)
        .into_iter()
        .filter_map(|day| {
            let fields = ConditionSet {
                date: Some(DateCond::Token(format!("{season}_{day}"))),
                ..matched.fields.clone()
            };
            guard.merge(Some(fields))
        })
        .map(|conditions| Placement::conditioned(tier, text, conditions).accumulating())
        .collect()
}
