/// Bucket-key resolution: maps a tab's age onto the bucket it is grouped into
///
/// Algorithm (first match wins):
/// 1. A `TimeUnit` override buckets by whole elapsed hours or whole days
/// 2. Half-day mode splits each local calendar day into morning/afternoon
/// 3. Otherwise, with interval width W minutes:
///    - elapsed < W          → recent
///    - elapsed < 2W         → first interval
///    - elapsed < 3W         → second interval
///    - elapsed < 1 day      → whole hours ago
///    - else                 → whole days ago
///
/// Every boundary is half-open `[lower, upper)`: a tab exactly W minutes
/// old is no longer "recent".
use std::fmt;

use chrono::{DateTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

pub const MINUTES_PER_HOUR: u64 = 60;
pub const MINUTES_PER_DAY: u64 = 24 * 60;

/// Coarse grouping unit that bypasses the configured interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Hour,
    Day,
}

/// Configured grouping granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawInterval", into = "RawInterval")]
pub enum IntervalSpec {
    /// Fixed width in minutes
    Minutes(u32),
    /// Morning/afternoon split of each calendar day
    HalfDay,
}

const HALF_DAY_TAG: &str = "am_pm";

/// Stored form: a number of minutes or the string "am_pm"
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawInterval {
    Minutes(u32),
    Named(String),
}

impl TryFrom<RawInterval> for IntervalSpec {
    type Error = String;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        match raw {
            RawInterval::Minutes(minutes) => Ok(IntervalSpec::Minutes(minutes)),
            RawInterval::Named(name) if name == HALF_DAY_TAG => Ok(IntervalSpec::HalfDay),
            RawInterval::Named(name) => name
                .trim()
                .parse::<u32>()
                .map(IntervalSpec::Minutes)
                .map_err(|_| format!("unknown group interval: {:?}", name)),
        }
    }
}

impl From<IntervalSpec> for RawInterval {
    fn from(spec: IntervalSpec) -> Self {
        match spec {
            IntervalSpec::Minutes(minutes) => RawInterval::Minutes(minutes),
            IntervalSpec::HalfDay => RawInterval::Named(HALF_DAY_TAG.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayPeriod {
    Morning,
    Afternoon,
}

impl DayPeriod {
    pub fn of_hour(hour: u32) -> DayPeriod {
        if hour < 12 {
            DayPeriod::Morning
        } else {
            DayPeriod::Afternoon
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            DayPeriod::Morning => "morning",
            DayPeriod::Afternoon => "afternoon",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HalfDaySlot {
    /// Opened this morning, and it is still morning
    CurrentMorning,
    /// Opened this afternoon
    CurrentAfternoon,
    /// Opened this morning, and it is now afternoon
    ThisMorning,
    Yesterday(DayPeriod),
    /// 2 to 6 calendar days back
    DaysAgo { days: u32, period: DayPeriod },
    Older,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketKey {
    /// Whole hours or days elapsed, under a `TimeUnit` override
    Coarse { unit: TimeUnit, count: u32 },
    HalfDay(HalfDaySlot),
    Recent { width: u32 },
    FirstInterval { width: u32 },
    SecondInterval { width: u32 },
    HoursAgo(u32),
    DaysAgo(u32),
    /// Tab was open before tracking started
    UnknownAge,
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Coarse { unit: TimeUnit::Hour, count } => write!(f, "hour:{}", count),
            BucketKey::Coarse { unit: TimeUnit::Day, count } => write!(f, "day:{}", count),
            BucketKey::HalfDay(slot) => match slot {
                HalfDaySlot::CurrentMorning => f.write_str("current_morning"),
                HalfDaySlot::CurrentAfternoon => f.write_str("current_afternoon"),
                HalfDaySlot::ThisMorning => f.write_str("this_morning"),
                HalfDaySlot::Yesterday(period) => write!(f, "yesterday_{}", period.as_str()),
                HalfDaySlot::DaysAgo { days, period } => {
                    write!(f, "{}days_{}", days, period.as_str())
                }
                HalfDaySlot::Older => f.write_str("older"),
            },
            BucketKey::Recent { width } => write!(f, "recent:{}", width),
            BucketKey::FirstInterval { width } => write!(f, "interval1:{}", width),
            BucketKey::SecondInterval { width } => write!(f, "interval2:{}", width),
            BucketKey::HoursAgo(hours) => write!(f, "hours_ago:{}", hours),
            BucketKey::DaysAgo(days) => write!(f, "days_ago:{}", days),
            BucketKey::UnknownAge => f.write_str("unknown"),
        }
    }
}

/// Resolve the bucket for a tab created at `created`, as seen at `now`.
///
/// Both instants must carry the same local time zone; half-day mode reads
/// hours and calendar dates from it.
pub fn resolve<Tz: TimeZone>(
    created: &DateTime<Tz>,
    now: &DateTime<Tz>,
    interval: IntervalSpec,
    unit: Option<TimeUnit>,
) -> BucketKey {
    let elapsed = elapsed_minutes(created, now);

    match (unit, interval) {
        (Some(TimeUnit::Hour), _) => BucketKey::Coarse {
            unit: TimeUnit::Hour,
            count: saturate(elapsed / MINUTES_PER_HOUR),
        },
        (Some(TimeUnit::Day), _) => BucketKey::Coarse {
            unit: TimeUnit::Day,
            count: saturate(elapsed / MINUTES_PER_DAY),
        },
        (None, IntervalSpec::HalfDay) => BucketKey::HalfDay(resolve_half_day(created, now)),
        (None, IntervalSpec::Minutes(width)) => resolve_interval(elapsed, width),
    }
}

/// Whole minutes between the two instants; a creation time in the future counts as zero
pub fn elapsed_minutes<Tz: TimeZone>(created: &DateTime<Tz>, now: &DateTime<Tz>) -> u64 {
    let millis = now.timestamp_millis() - created.timestamp_millis();
    u64::try_from(millis.max(0) / 60_000).unwrap_or(0)
}

fn resolve_interval(elapsed: u64, width: u32) -> BucketKey {
    let width = width.max(1);
    let w = u64::from(width);

    if elapsed < w {
        BucketKey::Recent { width }
    } else if elapsed < 2 * w {
        BucketKey::FirstInterval { width }
    } else if elapsed < 3 * w {
        BucketKey::SecondInterval { width }
    } else if elapsed < MINUTES_PER_DAY {
        BucketKey::HoursAgo(saturate(elapsed / MINUTES_PER_HOUR))
    } else {
        BucketKey::DaysAgo(saturate(elapsed / MINUTES_PER_DAY))
    }
}

/// Morning/afternoon slot, using local calendar dates rather than dividing
/// elapsed time, so 23:50 yesterday is "yesterday" even at 00:10 today.
pub fn resolve_half_day<Tz: TimeZone>(created: &DateTime<Tz>, now: &DateTime<Tz>) -> HalfDaySlot {
    let created_period = DayPeriod::of_hour(created.hour());
    let days = now
        .date_naive()
        .signed_duration_since(created.date_naive())
        .num_days();

    match days {
        d if d <= 0 => match (created_period, DayPeriod::of_hour(now.hour())) {
            (DayPeriod::Morning, DayPeriod::Morning) => HalfDaySlot::CurrentMorning,
            (DayPeriod::Morning, DayPeriod::Afternoon) => HalfDaySlot::ThisMorning,
            // Created after now on the same day only happens with clock skew
            (DayPeriod::Afternoon, _) => HalfDaySlot::CurrentAfternoon,
        },
        1 => HalfDaySlot::Yesterday(created_period),
        2..=6 => HalfDaySlot::DaysAgo {
            days: days as u32,
            period: created_period,
        },
        _ => HalfDaySlot::Older,
    }
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, Utc};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn interval_key(elapsed_minutes: i64, width: u32) -> BucketKey {
        let now = utc(2024, 10, 28, 15, 0);
        let created = now - Duration::minutes(elapsed_minutes);
        resolve(&created, &now, IntervalSpec::Minutes(width), None)
    }

    #[test]
    fn test_recent_at_width() {
        assert_eq!(interval_key(10, 60), BucketKey::Recent { width: 60 });
        assert_eq!(interval_key(0, 60), BucketKey::Recent { width: 60 });
    }

    #[test]
    fn test_second_interval_example() {
        // 120 <= 125 < 180
        assert_eq!(interval_key(125, 60), BucketKey::SecondInterval { width: 60 });
    }

    #[test]
    fn test_boundaries_are_lower_inclusive() {
        assert_eq!(interval_key(59, 60), BucketKey::Recent { width: 60 });
        assert_eq!(interval_key(60, 60), BucketKey::FirstInterval { width: 60 });
        assert_eq!(interval_key(119, 60), BucketKey::FirstInterval { width: 60 });
        assert_eq!(interval_key(120, 60), BucketKey::SecondInterval { width: 60 });
        assert_eq!(interval_key(179, 60), BucketKey::SecondInterval { width: 60 });
        assert_eq!(interval_key(180, 60), BucketKey::HoursAgo(3));
        assert_eq!(interval_key(1439, 60), BucketKey::HoursAgo(23));
        assert_eq!(interval_key(1440, 60), BucketKey::DaysAgo(1));
        assert_eq!(interval_key(3 * 1440 + 5, 60), BucketKey::DaysAgo(3));
    }

    #[test]
    fn test_small_width_reaches_hours_bucket_below_one_hour() {
        assert_eq!(interval_key(30, 10), BucketKey::HoursAgo(0));
        assert_eq!(interval_key(75, 10), BucketKey::HoursAgo(1));
    }

    #[test]
    fn test_wide_interval_stays_in_second_interval_past_a_day() {
        // 2W = 1200 <= 1500 < 3W = 1800
        assert_eq!(interval_key(1500, 600), BucketKey::SecondInterval { width: 600 });
        assert_eq!(interval_key(1800, 600), BucketKey::DaysAgo(1));
    }

    #[test]
    fn test_interval_resolution_has_no_gaps() {
        for width in [1, 5, 15, 30, 60, 120, 480, 1000] {
            for elapsed in 0..(3 * 1440) {
                let key = interval_key(elapsed, width);
                let w = i64::from(width);
                let expected_variant = if elapsed < w {
                    0
                } else if elapsed < 2 * w {
                    1
                } else if elapsed < 3 * w {
                    2
                } else if elapsed < 1440 {
                    3
                } else {
                    4
                };
                let actual_variant = match key {
                    BucketKey::Recent { .. } => 0,
                    BucketKey::FirstInterval { .. } => 1,
                    BucketKey::SecondInterval { .. } => 2,
                    BucketKey::HoursAgo(_) => 3,
                    BucketKey::DaysAgo(_) => 4,
                    other => panic!("unexpected key {:?}", other),
                };
                assert_eq!(actual_variant, expected_variant, "width {} elapsed {}", width, elapsed);
            }
        }
    }

    #[test]
    fn test_future_creation_counts_as_recent() {
        assert_eq!(interval_key(-5, 60), BucketKey::Recent { width: 60 });
    }

    #[test]
    fn test_zero_width_is_treated_as_one_minute() {
        assert_eq!(interval_key(0, 0), BucketKey::Recent { width: 1 });
        assert_eq!(interval_key(1, 0), BucketKey::FirstInterval { width: 1 });
    }

    #[test]
    fn test_hour_override() {
        let now = utc(2024, 10, 28, 15, 0);
        let key = |minutes| {
            resolve(&(now - Duration::minutes(minutes)), &now, IntervalSpec::HalfDay, Some(TimeUnit::Hour))
        };

        assert_eq!(key(59), BucketKey::Coarse { unit: TimeUnit::Hour, count: 0 });
        assert_eq!(key(60), BucketKey::Coarse { unit: TimeUnit::Hour, count: 1 });
        assert_eq!(key(185), BucketKey::Coarse { unit: TimeUnit::Hour, count: 3 });
    }

    #[test]
    fn test_day_override_example() {
        let now = utc(2024, 10, 28, 15, 0);
        let created = now - Duration::minutes(1500);

        let key = resolve(&created, &now, IntervalSpec::Minutes(60), Some(TimeUnit::Day));

        assert_eq!(key, BucketKey::Coarse { unit: TimeUnit::Day, count: 1 });
    }

    #[test]
    fn test_half_day_same_day() {
        let now = utc(2024, 10, 28, 15, 0);

        assert_eq!(resolve_half_day(&utc(2024, 10, 28, 9, 0), &now), HalfDaySlot::ThisMorning);
        assert_eq!(resolve_half_day(&utc(2024, 10, 28, 12, 0), &now), HalfDaySlot::CurrentAfternoon);
        assert_eq!(
            resolve_half_day(&utc(2024, 10, 28, 8, 0), &utc(2024, 10, 28, 11, 59)),
            HalfDaySlot::CurrentMorning
        );
    }

    #[test]
    fn test_half_day_this_morning_example() {
        let now = utc(2024, 10, 28, 15, 0);
        let created = utc(2024, 10, 28, 9, 0);

        let key = resolve(&created, &now, IntervalSpec::HalfDay, None);

        assert_eq!(key, BucketKey::HalfDay(HalfDaySlot::ThisMorning));
    }

    #[test]
    fn test_half_day_skewed_clock_defaults_to_afternoon() {
        let now = utc(2024, 10, 28, 10, 0);
        let created = utc(2024, 10, 28, 13, 0);

        assert_eq!(resolve_half_day(&created, &now), HalfDaySlot::CurrentAfternoon);
    }

    #[test]
    fn test_half_day_previous_days() {
        let now = utc(2024, 10, 28, 15, 0);

        assert_eq!(
            resolve_half_day(&utc(2024, 10, 27, 11, 0), &now),
            HalfDaySlot::Yesterday(DayPeriod::Morning)
        );
        assert_eq!(
            resolve_half_day(&utc(2024, 10, 27, 18, 0), &now),
            HalfDaySlot::Yesterday(DayPeriod::Afternoon)
        );
        assert_eq!(
            resolve_half_day(&utc(2024, 10, 25, 10, 0), &now),
            HalfDaySlot::DaysAgo { days: 3, period: DayPeriod::Morning }
        );
        assert_eq!(
            resolve_half_day(&utc(2024, 10, 22, 20, 0), &now),
            HalfDaySlot::DaysAgo { days: 6, period: DayPeriod::Afternoon }
        );
        assert_eq!(resolve_half_day(&utc(2024, 10, 21, 10, 0), &now), HalfDaySlot::Older);
    }

    #[test]
    fn test_half_day_uses_calendar_dates_across_midnight() {
        // Only 20 minutes apart, but on different calendar days
        let now = utc(2024, 10, 28, 0, 10);
        let created = utc(2024, 10, 27, 23, 50);

        assert_eq!(
            resolve_half_day(&created, &now),
            HalfDaySlot::Yesterday(DayPeriod::Afternoon)
        );
    }

    #[test]
    fn test_half_day_reads_local_time_zone() {
        // 02:00 UTC is 11:00 the same day at +09:00, 22:00 the previous day at -04:00
        let created_utc = utc(2024, 10, 28, 2, 0);
        let now_utc = utc(2024, 10, 28, 5, 0);

        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let new_york = FixedOffset::west_opt(4 * 3600).unwrap();

        assert_eq!(
            resolve_half_day(&created_utc.with_timezone(&tokyo), &now_utc.with_timezone(&tokyo)),
            HalfDaySlot::ThisMorning
        );
        assert_eq!(
            resolve_half_day(&created_utc.with_timezone(&new_york), &now_utc.with_timezone(&new_york)),
            HalfDaySlot::Yesterday(DayPeriod::Afternoon)
        );
    }

    #[test]
    fn test_interval_spec_serialization() {
        assert_eq!(serde_json::to_string(&IntervalSpec::Minutes(30)).unwrap(), "30");
        assert_eq!(serde_json::to_string(&IntervalSpec::HalfDay).unwrap(), "\"am_pm\"");
        assert_eq!(serde_json::from_str::<IntervalSpec>("45").unwrap(), IntervalSpec::Minutes(45));
        assert_eq!(serde_json::from_str::<IntervalSpec>("\"am_pm\"").unwrap(), IntervalSpec::HalfDay);
        assert_eq!(serde_json::from_str::<IntervalSpec>("\"120\"").unwrap(), IntervalSpec::Minutes(120));
        assert!(serde_json::from_str::<IntervalSpec>("\"weekly\"").is_err());
    }

    #[test]
    fn test_time_unit_serialization() {
        assert_eq!(serde_json::from_str::<TimeUnit>("\"hour\"").unwrap(), TimeUnit::Hour);
        assert_eq!(serde_json::from_str::<TimeUnit>("\"day\"").unwrap(), TimeUnit::Day);
    }

    #[test]
    fn test_display_is_distinct_per_key() {
        let keys = [
            BucketKey::Coarse { unit: TimeUnit::Hour, count: 1 },
            BucketKey::Coarse { unit: TimeUnit::Day, count: 1 },
            BucketKey::HalfDay(HalfDaySlot::DaysAgo { days: 3, period: DayPeriod::Morning }),
            BucketKey::HalfDay(HalfDaySlot::DaysAgo { days: 3, period: DayPeriod::Afternoon }),
            BucketKey::Recent { width: 60 },
            BucketKey::FirstInterval { width: 60 },
            BucketKey::SecondInterval { width: 60 },
            BucketKey::HoursAgo(1),
            BucketKey::DaysAgo(1),
            BucketKey::UnknownAge,
        ];
        let rendered: std::collections::HashSet<String> = keys.iter().map(|k| k.to_string()).collect();

        assert_eq!(rendered.len(), keys.len());
        assert_eq!(keys[2].to_string(), "3days_morning");
    }
}
