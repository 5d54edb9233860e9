//! In-game calendar arithmetic.
//!
//! A season is 28 days long and always starts on a Monday, so every weekday
//! falls on exactly four days of each season.

/// Season names as they appear in dialogue keys.
pub const SEASONS: [&str; 4] = ["spring", "summer", "fall", "winter"];

/// Weekday abbreviations as they appear in dialogue keys, Monday first.
pub const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub const DAYS_PER_SEASON: u8 = 28;

/// 1-based position of a weekday abbreviation (`Mon` is 1).
pub fn weekday_number(weekday: &str) -> Option<u8> {
    WEEKDAYS
        .iter()
        .position(|w| *w == weekday)
        .and_then(|i| u8::try_from(i + 1).ok())
}

/// Weekday abbreviation for a day of the season (1..=28).
pub fn weekday_of_day(day: u8) -> Option<&'static str> {
    if !(1..=DAYS_PER_SEASON).contains(&day) {
        return None;
    }
    WEEKDAYS.get(usize::from((day - 1) % 7)).copied()
}

pub fn is_season(token: &str) -> bool {
    SEASONS.contains(&token)
}

/// The days of a season on which `weekday` falls, in calendar order.
///
/// ```
/// use dialogue_convert::calendar::season_weekday_days;
///
/// assert_eq!(season_weekday_days("Mon"), vec![1, 8, 15, 22]);
/// assert_eq!(season_weekday_days("Sun"), vec![7, 14, 21, 28]);
/// assert!(season_weekday_days("Someday").is_empty());
/// ```
pub fn season_weekday_days(weekday: &str) -> Vec<u8> {
    match weekday_number(weekday) {
        Some(first) => (first..=DAYS_PER_SEASON).step_by(7).collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_weekday_has_four_days() {
        for wd in WEEKDAYS {
            let days = season_weekday_days(wd);
            assert_eq!(days.len(), 4, "{wd}");
            for day in days {
                assert_eq!(weekday_of_day(day), Some(wd));
            }
        }
    }

    #[test]
    fn weekday_of_day_bounds() {
        assert_eq!(weekday_of_day(0), None);
        assert_eq!(weekday_of_day(29), None);
        assert_eq!(weekday_of_day(28), Some("Sun"));
    }

    #[test]
    fn seasons() {
        assert!(is_season("fall"));
        assert!(!is_season("autumn"));
    }
}
