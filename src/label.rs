/// Group titles and colors for bucket keys
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bucket::{BucketKey, DayPeriod, HalfDaySlot, TimeUnit};

/// Tab group colors chrome accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
    Blue,
    Red,
    Yellow,
    Green,
    Pink,
    Purple,
    Cyan,
    Orange,
}

pub const PALETTE: [GroupColor; 8] = [
    GroupColor::Blue,
    GroupColor::Red,
    GroupColor::Yellow,
    GroupColor::Green,
    GroupColor::Pink,
    GroupColor::Purple,
    GroupColor::Cyan,
    GroupColor::Orange,
];

impl GroupColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupColor::Blue => "blue",
            GroupColor::Red => "red",
            GroupColor::Yellow => "yellow",
            GroupColor::Green => "green",
            GroupColor::Pink => "pink",
            GroupColor::Purple => "purple",
            GroupColor::Cyan => "cyan",
            GroupColor::Orange => "orange",
        }
    }
}

impl fmt::Display for GroupColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn plural(count: u32, unit: &str) -> String {
    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

/// Human-readable group title for a bucket
pub fn title(key: &BucketKey) -> String {
    match *key {
        BucketKey::Coarse { unit: TimeUnit::Hour, count: 0 } => "last hour".to_string(),
        BucketKey::Coarse { unit: TimeUnit::Hour, count } => plural(count, "hour"),
        BucketKey::Coarse { unit: TimeUnit::Day, count: 0 } => "today".to_string(),
        BucketKey::Coarse { unit: TimeUnit::Day, count } => plural(count, "day"),
        BucketKey::HalfDay(slot) => half_day_title(slot),
        BucketKey::Recent { width } => format!("most recent {} minutes", width),
        BucketKey::FirstInterval { width } => {
            let w = u64::from(width);
            format!("{}-{} minutes ago", w, 2 * w)
        }
        BucketKey::SecondInterval { width } => {
            let w = u64::from(width);
            format!("{}-{} minutes ago", 2 * w, 3 * w)
        }
        BucketKey::HoursAgo(0) => "less than an hour ago".to_string(),
        BucketKey::HoursAgo(hours) => plural(hours, "hour"),
        BucketKey::DaysAgo(days) => plural(days, "day"),
        BucketKey::UnknownAge => "opened before tracking".to_string(),
    }
}

fn half_day_title(slot: HalfDaySlot) -> String {
    match slot {
        HalfDaySlot::CurrentMorning | HalfDaySlot::ThisMorning => "this morning".to_string(),
        HalfDaySlot::CurrentAfternoon => "this afternoon".to_string(),
        HalfDaySlot::Yesterday(DayPeriod::Morning) => "yesterday morning".to_string(),
        HalfDaySlot::Yesterday(DayPeriod::Afternoon) => "yesterday afternoon".to_string(),
        HalfDaySlot::DaysAgo { days, period: DayPeriod::Morning } => {
            format!("{} days ago, morning", days)
        }
        HalfDaySlot::DaysAgo { days, period: DayPeriod::Afternoon } => {
            format!("{} days ago, afternoon", days)
        }
        HalfDaySlot::Older => "older".to_string(),
    }
}

/// Group color for a bucket: fixed for the well-known buckets, otherwise
/// derived from the key's text so it never changes between runs
pub fn color(key: &BucketKey) -> GroupColor {
    match key {
        BucketKey::Recent { .. } => GroupColor::Green,
        BucketKey::FirstInterval { .. } => GroupColor::Blue,
        BucketKey::SecondInterval { .. } => GroupColor::Purple,
        BucketKey::UnknownAge => GroupColor::Cyan,
        BucketKey::HalfDay(slot) => match slot {
            HalfDaySlot::CurrentMorning | HalfDaySlot::ThisMorning => GroupColor::Green,
            HalfDaySlot::CurrentAfternoon => GroupColor::Blue,
            HalfDaySlot::Yesterday(DayPeriod::Morning) => GroupColor::Yellow,
            HalfDaySlot::Yesterday(DayPeriod::Afternoon) => GroupColor::Orange,
            HalfDaySlot::DaysAgo { period: DayPeriod::Morning, .. } => GroupColor::Purple,
            HalfDaySlot::DaysAgo { period: DayPeriod::Afternoon, .. } => GroupColor::Pink,
            HalfDaySlot::Older => GroupColor::Red,
        },
        BucketKey::Coarse { .. } | BucketKey::HoursAgo(_) | BucketKey::DaysAgo(_) => {
            hashed_color(&key.to_string())
        }
    }
}

fn hashed_color(text: &str) -> GroupColor {
    let hash = text.chars().fold(0usize, |sum, c| sum.wrapping_add(c as usize));
    PALETTE[hash % PALETTE.len()]
}
