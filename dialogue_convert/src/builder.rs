//! Hand-authored dialogue lines.
//!
//! A line is added to an existing document together with a list of
//! conditions picked one at a time (`weather=Rainy`, `flag=mail=ccBoard`,
//! `date=spring,Mon,15`, ...).

use std::str::FromStr;

use dialogue_data::{
    CalendarDay, ConditionSet, DEFAULT_LINE, DateCond, DialogueDocument, FlagCond, ItemCond, Numeric, Tier,
};
use log::debug;
use serde_json::Value;
use thiserror::Error;

use crate::bucket::{self, Placement};
use crate::calendar::{DAYS_PER_SEASON, is_season, weekday_number, weekday_of_day};
use crate::coerce;
use crate::sanitize::sanitize;

/// One condition chosen for a line or event.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Weather(String),
    Time(String),
    Location(String),
    Date(DateCond),
    DaysInState(Numeric),
    Action(String),
    Item(ItemCond),
    Event(String),
    Flag { kind: String, value: String },
    Kids(Numeric),
    Chance(Numeric),
    Relationship(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionParseError {
    #[error("expected kind=value, got '{0}'")]
    MissingSeparator(String),
    #[error("unknown condition kind '{0}'")]
    UnknownKind(String),
    #[error("condition '{0}' has an empty value")]
    EmptyValue(String),
    #[error("flag condition needs flagkind=value, got '{0}'")]
    BadFlag(String),
    #[error("'{value}' is not a valid {kind} (expected a number)")]
    NotNumeric { kind: String, value: String },
    #[error("bad item list '{0}': {1}")]
    BadItemList(String, String),
    #[error("bad date '{0}': {1}")]
    BadDate(String, &'static str),
}

impl Condition {
    /// Parse a condition from its kind and value as typed by an author.
    ///
    /// `kind` matches the output field names (`daysInState`, `rel` is accepted
    /// for `relationship`), ignoring ASCII case.
    pub fn parse(kind: &str, value: &str) -> Result<Self, ConditionParseError> {
        let kind = kind.trim();
        let value = value.trim();
        if value.is_empty() {
            return Err(ConditionParseError::EmptyValue(kind.to_string()));
        }
        let text = || value.to_string();
        let cond = match kind.to_ascii_lowercase().as_str() {
            "weather" => Condition::Weather(text()),
            "time" => Condition::Time(text()),
            "location" => Condition::Location(text()),
            "date" => Condition::Date(parse_date(value)?),
            "daysinstate" => Condition::DaysInState(parse_number(kind, value)?),
            "action" => Condition::Action(text()),
            "item" => Condition::Item(parse_item(value)?),
            "event" => Condition::Event(text()),
            "flag" => match value.split_once('=') {
                Some((k, v)) if !k.trim().is_empty() && !v.trim().is_empty() => Condition::Flag {
                    kind: k.trim().to_string(),
                    value: v.trim().to_string(),
                },
                _ => return Err(ConditionParseError::BadFlag(text())),
            },
            "kids" => Condition::Kids(parse_number(kind, value)?),
            "chance" => Condition::Chance(parse_number(kind, value)?),
            "relationship" | "rel" => Condition::Relationship(text()),
            _ => return Err(ConditionParseError::UnknownKind(kind.to_string())),
        };
        Ok(cond)
    }
}

impl FromStr for Condition {
    type Err = ConditionParseError;

    /// `kind=value`; only the first `=` separates, so `flag=mail=ccBoard` works.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, value) = s
            .split_once('=')
            .ok_or_else(|| ConditionParseError::MissingSeparator(s.to_string()))?;
        Condition::parse(kind, value)
    }
}

fn parse_number(kind: &str, value: &str) -> Result<Numeric, ConditionParseError> {
    let number = Numeric::coerce_str(value);
    if number.is_number() {
        Ok(number)
    } else {
        Err(ConditionParseError::NotNumeric {
            kind: kind.to_string(),
            value: value.to_string(),
        })
    }
}

/// A JSON array (`[128, 129]`) becomes a list, anything else a single id.
fn parse_item(value: &str) -> Result<ItemCond, ConditionParseError> {
    if !value.starts_with('[') {
        return Ok(ItemCond::One(Numeric::coerce_str(value)));
    }
    let parsed: Value =
        serde_json::from_str(value).map_err(|e| ConditionParseError::BadItemList(value.to_string(), e.to_string()))?;
    coerce::item(&parsed).ok_or_else(|| ConditionParseError::BadItemList(value.to_string(), "no item ids".into()))
}

/// Accepts `Mon`, `spring_15`, `spring_Mon`, or one or more
/// `season,weekday,day` triples separated by `;`.
fn parse_date(value: &str) -> Result<DateCond, ConditionParseError> {
    if value.contains(',') {
        let mut days = value
            .split(';')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| parse_calendar_day(part).map_err(|why| ConditionParseError::BadDate(value.to_string(), why)))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(if days.len() == 1 {
            DateCond::Day(days.remove(0))
        } else {
            DateCond::Days(days)
        });
    }
    if is_date_token(value) {
        Ok(DateCond::Token(value.to_string()))
    } else {
        Err(ConditionParseError::BadDate(
            value.to_string(),
            "expected a weekday, season_day or season_weekday",
        ))
    }
}

fn is_date_token(token: &str) -> bool {
    if weekday_number(token).is_some() {
        return true;
    }
    match token.split_once('_') {
        Some((season, rest)) if is_season(season) => {
            weekday_number(rest).is_some() || rest.parse::<u8>().is_ok_and(|d| (1..=DAYS_PER_SEASON).contains(&d))
        },
        _ => false,
    }
}

fn parse_calendar_day(triple: &str) -> Result<CalendarDay, &'static str> {
    let parts: Vec<&str> = triple.split(',').map(str::trim).collect();
    let [season, weekday, day] = parts.as_slice() else {
        return Err("expected season,weekday,day");
    };
    if !is_season(season) {
        return Err("unknown season");
    }
    if weekday_number(weekday).is_none() {
        return Err("unknown weekday");
    }
    let day: u8 = day.parse().map_err(|_| "day is not a number")?;
    if !(1..=DAYS_PER_SEASON).contains(&day) {
        return Err("day is outside 1..=28");
    }
    if weekday_of_day(day) != Some(*weekday) {
        return Err("weekday does not fall on that day");
    }
    Ok(CalendarDay(season.to_string(), weekday.to_string(), day))
}

/// Fold conditions into one set. Flags merge into a single mapping; for every
/// other kind the later condition wins.
///
/// ```
/// use dialogue_convert::{Condition, collect_conditions};
///
/// let conds: Vec<Condition> = ["weather=Rainy", "flag=mail=ccBoard", "flag=event=100"]
///     .iter()
///     .map(|s| s.parse().unwrap())
///     .collect();
/// let set = collect_conditions(&conds);
/// assert_eq!(set.weather.as_deref(), Some("Rainy"));
/// assert_eq!(set.kind_count(), 2);
/// ```
pub fn collect_conditions(conditions: &[Condition]) -> ConditionSet {
    let mut set = ConditionSet::default();
    for cond in conditions.iter().cloned() {
        match cond {
            Condition::Weather(v) => set.weather = Some(v),
            Condition::Time(v) => set.time = Some(v),
            Condition::Location(v) => set.location = Some(v),
            Condition::Date(v) => set.date = Some(v),
            Condition::DaysInState(v) => set.days_in_state = Some(v),
            Condition::Action(v) => set.action = Some(v),
            Condition::Item(v) => set.item = Some(v),
            Condition::Event(v) => set.event = Some(v),
            Condition::Flag { kind, value } => set
                .flag
                .get_or_insert_with(|| FlagCond::Kinds(Default::default()))
                .insert(kind, value),
            Condition::Kids(v) => set.kids = Some(v),
            Condition::Chance(v) => set.chance = Some(v),
            Condition::Relationship(v) => set.relationship = Some(v),
        }
    }
    set
}

/// Return a copy of `doc` with one more line at `tier`.
///
/// With no conditions the line becomes the tier's `default`. Tiers above 10
/// are clamped.
pub fn add_line(doc: &DialogueDocument, tier: Tier, line: &str, conditions: &[Condition]) -> DialogueDocument {
    let tier = coerce::clamp_tier(u64::from(tier));
    let line = sanitize(line);
    let placement = if conditions.is_empty() {
        Placement::default_line(tier, line)
    } else {
        if line == DEFAULT_LINE {
            debug!("conditioned line text collides with the '{DEFAULT_LINE}' key");
        }
        Placement::conditioned(tier, line, collect_conditions(conditions))
    };
    let mut out = doc.clone();
    bucket::place(&mut out, placement);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialogue_data::LineValue;

    fn cond(s: &str) -> Condition {
        s.parse().unwrap()
    }

    #[test]
    fn parses_simple_kinds() {
        assert_eq!(cond("weather=Rainy"), Condition::Weather("Rainy".into()));
        assert_eq!(cond("Location = Saloon"), Condition::Location("Saloon".into()));
        assert_eq!(cond("rel=Married"), Condition::Relationship("Married".into()));
        assert_eq!(cond("daysInState=3"), Condition::DaysInState(Numeric::Int(3)));
        assert_eq!(cond("chance=0.25"), Condition::Chance(Numeric::Float(0.25)));
    }

    #[test]
    fn parses_flags() {
        assert_eq!(
            cond("flag=mail=ccBoard"),
            Condition::Flag {
                kind: "mail".into(),
                value: "ccBoard".into()
            }
        );
        assert!(matches!("flag=mail".parse::<Condition>(), Err(ConditionParseError::BadFlag(_))));
    }

    #[test]
    fn parses_items() {
        assert_eq!(cond("item=128"), Condition::Item(ItemCond::One(Numeric::Int(128))));
        assert_eq!(
            cond("item=[128, 129]"),
            Condition::Item(ItemCond::Many(vec![Numeric::Int(128), Numeric::Int(129)]))
        );
        assert_eq!(cond("item=Prismatic"), Condition::Item(ItemCond::One(Numeric::Text("Prismatic".into()))));
        assert!(matches!("item=[128,".parse::<Condition>(), Err(ConditionParseError::BadItemList(..))));
    }

    #[test]
    fn parses_dates() {
        assert_eq!(cond("date=Mon"), Condition::Date(DateCond::Token("Mon".into())));
        assert_eq!(cond("date=spring_15"), Condition::Date(DateCond::Token("spring_15".into())));
        assert_eq!(cond("date=fall_Sun"), Condition::Date(DateCond::Token("fall_Sun".into())));
        assert_eq!(
            cond("date=spring,Mon,15"),
            Condition::Date(DateCond::Day(CalendarDay("spring".into(), "Mon".into(), 15)))
        );
        assert_eq!(
            cond("date=spring,Mon,1; summer,Tue,2"),
            Condition::Date(DateCond::Days(vec![
                CalendarDay("spring".into(), "Mon".into(), 1),
                CalendarDay("summer".into(), "Tue".into(), 2),
            ]))
        );
        for bad in ["date=Someday", "date=spring_29", "date=spring,Mon", "date=autumn,Mon,1", "date=spring,Mon,40", "date=spring,Tue,15"] {
            assert!(matches!(bad.parse::<Condition>(), Err(ConditionParseError::BadDate(..))), "{bad}");
        }
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!("weather".parse::<Condition>(), Err(ConditionParseError::MissingSeparator(_))));
        assert!(matches!("mood=happy".parse::<Condition>(), Err(ConditionParseError::UnknownKind(_))));
        assert!(matches!("time=".parse::<Condition>(), Err(ConditionParseError::EmptyValue(_))));
        assert!(matches!("kids=two".parse::<Condition>(), Err(ConditionParseError::NotNumeric { .. })));
    }

    #[test]
    fn flags_merge_and_later_kinds_win() {
        let set = collect_conditions(&[
            cond("flag=mail=ccBoard"),
            cond("weather=Sun"),
            cond("flag=recipe=Salad"),
            cond("weather=Rainy"),
        ]);
        assert_eq!(set.weather.as_deref(), Some("Rainy"));
        let Some(FlagCond::Kinds(flags)) = &set.flag else {
            panic!("expected a flag mapping: {:?}", set.flag);
        };
        assert_eq!(flags.len(), 2);
        assert_eq!(flags["recipe"], "Salad");
    }

    #[test]
    fn add_line_without_conditions_sets_default() {
        let doc = add_line(&DialogueDocument::default(), 3, "Hello there.", &[]);
        assert_eq!(doc.default_line(3), Some("Hello there."));
        assert_eq!(doc.hearts.len(), 1);
    }

    #[test]
    fn add_line_with_conditions_leaves_input_alone() {
        let before = add_line(&DialogueDocument::default(), 0, "Hi.", &[]);
        let after = add_line(&before, 2, "Wet out.", &[cond("weather=Rainy")]);
        assert_eq!(before.line_count(), 1);
        assert_eq!(after.line_count(), 2);
        let set = after.line(2, "Wet out.").and_then(LineValue::as_conditions).unwrap();
        assert_eq!(set.weather.as_deref(), Some("Rainy"));
    }

    #[test]
    fn add_line_clamps_tier() {
        let doc = add_line(&DialogueDocument::default(), 14, "Best friends!", &[]);
        assert_eq!(doc.default_line(10), Some("Best friends!"));
    }
}
