//! Dialogue key recognition.
//!
//! Both source formats pack conditions into dictionary keys (`Mon4`,
//! `spring_Mon6`, `AcceptGift_(O)128`, `Rainy_Night_2`, ...). [`RULES`] is the
//! single ordered table of key shapes. Each rule pairs an anchored regex with
//! an extractor; [`classify`] tries them in order and stops at the first match.
//!
//! | # | rule | example | extracted |
//! |---|------|---------|-----------|
//! | 1 | weekday | `Mon` | `date = "Mon"` |
//! | 2 | weekday_tier | `Mon4` | `date = "Mon"`, tier 4 |
//! | 3 | tier_default | `3` | tier 3 default line |
//! | 4 | season_day | `spring_15` | `date = "spring_15"` |
//! | 5 | season_weekday | `spring_Mon` | `date = "spring_Mon"` |
//! | 6 | season_weekday_tier | `spring_Mon6` | `date = "spring_Mon"`, tier 6 (patch files only) |
//! | 7 | event_seen | `eventSeen_100` | `event = "100"` |
//! | 8 | accept_gift | `AcceptGift_(O)128` | `item = 128` |
//! | 9 | patio | `patio_Abigail` | `location = "patio"` |
//! | 10 | spouse_room | `spouseRoom_Abigail` | `location = "spouseRoom"` |
//! | 11 | outing | `funLeave_Abigail` | `action = "funLeave"` |
//! | 12 | rainy | `Rainy_Day_2` | `weather = "Rainy"`, `time = "0600-1800"`, tier 2 |
//! | 13 | indoor | `Indoor_Night_1` | `location = "Indoor"`, `time = "1800-2600"`, tier 1 |
//! | 14 | outdoor | `Outdoor_3` | `location = "Outdoor"`, tier 3 |
//! | 15 | kids | `TwoKids_5` | `kids = 2`, tier 5 |
//!
//! Trailing numbers only ever select the destination tier; they are never
//! emitted as a condition.

use dialogue_data::{ConditionSet, DateCond, ItemCond, Numeric, Tier};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::coerce::tier_from_digits;

const WEEKDAY: &str = "Mon|Tue|Wed|Thu|Fri|Sat|Sun";
const SEASON: &str = "spring|summer|fall|winter";

/// Day-time window for `_Day_` keys.
pub const DAY_TIME: &str = "0600-1800";
/// Night-time window for `_Night_` keys.
pub const NIGHT_TIME: &str = "1800-2600";

/// Which converter is asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Flat key→text game dialogue file.
    GameFile,
    /// Content-patch `EditData` entries.
    PatchFile,
}

/// Identity of a key-pattern rule, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Weekday,
    WeekdayTier,
    TierDefault,
    SeasonDay,
    SeasonWeekday,
    SeasonWeekdayTier,
    EventSeen,
    AcceptGift,
    Patio,
    SpouseRoom,
    Outing,
    Rainy,
    Indoor,
    Outdoor,
    Kids,
}

impl RuleKind {
    pub fn name(self) -> &'static str {
        match self {
            RuleKind::Weekday => "weekday",
            RuleKind::WeekdayTier => "weekday_tier",
            RuleKind::TierDefault => "tier_default",
            RuleKind::SeasonDay => "season_day",
            RuleKind::SeasonWeekday => "season_weekday",
            RuleKind::SeasonWeekdayTier => "season_weekday_tier",
            RuleKind::EventSeen => "event_seen",
            RuleKind::AcceptGift => "accept_gift",
            RuleKind::Patio => "patio",
            RuleKind::SpouseRoom => "spouse_room",
            RuleKind::Outing => "outing",
            RuleKind::Rainy => "rainy",
            RuleKind::Indoor => "indoor",
            RuleKind::Outdoor => "outdoor",
            RuleKind::Kids => "kids",
        }
    }
}

/// Result of classifying one key.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyMatch {
    pub rule: RuleKind,
    /// Conditions encoded in the key (empty for [`RuleKind::TierDefault`]).
    pub fields: ConditionSet,
    /// Destination tier named by the key itself.
    pub tier_override: Option<Tier>,
}

impl KeyMatch {
    /// Whether expand-all may copy this entry into every tier.
    ///
    /// Only date, event and gift entries qualify, and only when the key does
    /// not pin a tier of its own.
    pub fn expands(&self) -> bool {
        self.tier_override.is_none()
            && matches!(
                self.rule,
                RuleKind::Weekday
                    | RuleKind::SeasonDay
                    | RuleKind::SeasonWeekday
                    | RuleKind::EventSeen
                    | RuleKind::AcceptGift
            )
    }
}

type Extractor = fn(&Captures<'_>) -> (ConditionSet, Option<Tier>);

/// One row of the key-pattern table.
pub struct Rule {
    pub kind: RuleKind,
    patch_only: bool,
    pattern: Regex,
    extract: Extractor,
}

impl Rule {
    fn new(kind: RuleKind, pattern: &str, extract: Extractor) -> Self {
        let pattern = Regex::new(pattern).unwrap_or_else(|e| panic!("bad key pattern for {}: {e}", kind.name()));
        Self {
            kind,
            patch_only: false,
            pattern,
            extract,
        }
    }

    fn patch_only(mut self) -> Self {
        self.patch_only = true;
        self
    }

    pub fn applies_to(&self, source: SourceKind) -> bool {
        !self.patch_only || source == SourceKind::PatchFile
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    fn apply(&self, key: &str) -> Option<KeyMatch> {
        let caps = self.pattern.captures(key)?;
        let (fields, tier_override) = (self.extract)(&caps);
        Some(KeyMatch {
            rule: self.kind,
            fields,
            tier_override,
        })
    }
}

lazy_static! {
    /// The key-pattern table, highest priority first.
    pub static ref RULES: Vec<Rule> = build_rules();
}

fn build_rules() -> Vec<Rule> {
    vec![
        Rule::new(RuleKind::Weekday, &format!("^({WEEKDAY})$"), extract_date_token),
        Rule::new(RuleKind::WeekdayTier, &format!(r"^({WEEKDAY})(\d+)$"), extract_weekday_tier),
        Rule::new(RuleKind::TierDefault, r"^(\d+)$", extract_tier_default),
        Rule::new(RuleKind::SeasonDay, &format!(r"^({SEASON})_\d+$"), extract_date_token),
        Rule::new(RuleKind::SeasonWeekday, &format!("^({SEASON})_({WEEKDAY})$"), extract_date_token),
        Rule::new(
            RuleKind::SeasonWeekdayTier,
            &format!(r"^({SEASON})_({WEEKDAY})(\d+)$"),
            extract_season_weekday_tier,
        )
        .patch_only(),
        Rule::new(RuleKind::EventSeen, r"^eventSeen_([^_]+)", extract_event_seen),
        Rule::new(
            RuleKind::AcceptGift,
            r"^AcceptGift_.*?\((?:O|T|TR)\)([\w.-]+?)(?:_(\d+))?$",
            extract_accept_gift,
        ),
        Rule::new(RuleKind::Patio, r"^patio_(?:(?:.*_)?(\d+)|.*)$", |c| {
            location("patio", c)
        }),
        Rule::new(RuleKind::SpouseRoom, r"^spouseRoom_(?:(?:.*_)?(\d+)|.*)$", |c| {
            location("spouseRoom", c)
        }),
        Rule::new(
            RuleKind::Outing,
            r"^(funLeave|funReturn|jobLeave|jobReturn)_(?:(?:.*_)?(\d+)|.*)$",
            extract_outing,
        ),
        Rule::new(RuleKind::Rainy, r"^Rainy_(Day|Night)_(\d+)$", extract_rainy),
        Rule::new(RuleKind::Indoor, r"^Indoor_(Day|Night)_(\d+)$", extract_indoor),
        Rule::new(RuleKind::Outdoor, r"^Outdoor_(\d+)$", |c| location("Outdoor", c)),
        Rule::new(RuleKind::Kids, r"^(OneKid|TwoKids)_(\d+)$", extract_kids),
    ]
}

/// Classify a dialogue key. `None` means no rule recognized it.
///
/// ```
/// use dialogue_convert::pattern::{RuleKind, SourceKind, classify};
///
/// let m = classify("Mon4", SourceKind::GameFile).unwrap();
/// assert_eq!(m.rule, RuleKind::WeekdayTier);
/// assert_eq!(m.tier_override, Some(4));
/// assert!(classify("Introduction", SourceKind::GameFile).is_none());
/// ```
pub fn classify(key: &str, source: SourceKind) -> Option<KeyMatch> {
    RULES
        .iter()
        .filter(|rule| rule.applies_to(source))
        .find_map(|rule| rule.apply(key))
}

fn date(token: impl Into<String>) -> ConditionSet {
    ConditionSet {
        date: Some(DateCond::Token(token.into())),
        ..ConditionSet::default()
    }
}

fn tier_group(caps: &Captures<'_>, group: usize) -> Option<Tier> {
    caps.get(group).map(|m| tier_from_digits(m.as_str()))
}

fn time_of(part: &str) -> &'static str {
    if part == "Night" { NIGHT_TIME } else { DAY_TIME }
}

fn extract_date_token(caps: &Captures<'_>) -> (ConditionSet, Option<Tier>) {
    (date(&caps[0]), None)
}

fn extract_weekday_tier(caps: &Captures<'_>) -> (ConditionSet, Option<Tier>) {
    (date(&caps[1]), tier_group(caps, 2))
}

fn extract_tier_default(caps: &Captures<'_>) -> (ConditionSet, Option<Tier>) {
    (ConditionSet::default(), tier_group(caps, 1))
}

fn extract_season_weekday_tier(caps: &Captures<'_>) -> (ConditionSet, Option<Tier>) {
    (date(format!("{}_{}", &caps[1], &caps[2])), tier_group(caps, 3))
}

fn extract_event_seen(caps: &Captures<'_>) -> (ConditionSet, Option<Tier>) {
    let fields = ConditionSet {
        event: Some(caps[1].to_string()),
        ..ConditionSet::default()
    };
    (fields, None)
}

fn extract_accept_gift(caps: &Captures<'_>) -> (ConditionSet, Option<Tier>) {
    let fields = ConditionSet {
        item: Some(ItemCond::One(Numeric::coerce_str(&caps[1]))),
        ..ConditionSet::default()
    };
    (fields, tier_group(caps, 2))
}

fn location(name: &str, caps: &Captures<'_>) -> (ConditionSet, Option<Tier>) {
    let fields = ConditionSet {
        location: Some(name.to_string()),
        ..ConditionSet::default()
    };
    (fields, tier_group(caps, 1))
}

fn extract_outing(caps: &Captures<'_>) -> (ConditionSet, Option<Tier>) {
    let fields = ConditionSet {
        action: Some(caps[1].to_string()),
        ..ConditionSet::default()
    };
    (fields, tier_group(caps, 2))
}

fn extract_rainy(caps: &Captures<'_>) -> (ConditionSet, Option<Tier>) {
    let fields = ConditionSet {
        weather: Some("Rainy".to_string()),
        time: Some(time_of(&caps[1]).to_string()),
        ..ConditionSet::default()
    };
    (fields, tier_group(caps, 2))
}

fn extract_indoor(caps: &Captures<'_>) -> (ConditionSet, Option<Tier>) {
    let fields = ConditionSet {
        location: Some("Indoor".to_string()),
        time: Some(time_of(&caps[1]).to_string()),
        ..ConditionSet::default()
    };
    (fields, tier_group(caps, 2))
}

fn extract_kids(caps: &Captures<'_>) -> (ConditionSet, Option<Tier>) {
    let kids = if &caps[1] == "TwoKids" { 2 } else { 1 };
    let fields = ConditionSet {
        kids: Some(Numeric::Int(kids)),
        ..ConditionSet::default()
    };
    (fields, tier_group(caps, 2))
}
