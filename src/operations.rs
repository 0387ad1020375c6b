/// Tab operations: eligibility, bucket assignment, group summaries

use std::collections::HashMap;

use chrono::{DateTime, TimeZone};

use crate::bucket::{resolve, BucketKey, TimeUnit};
use crate::label::{self, GroupColor};
use crate::storage::GroupingConfig;
use crate::tab_data::{GroupId, TabId, TabInfo};
use crate::tracker::{CreationTime, CreationTimeTracker};

/// Whether a tab takes part in a grouping run
pub fn is_eligible(tab: &TabInfo, config: &GroupingConfig) -> bool {
    !tab.is_grouped() && (config.include_pinned || !tab.pinned)
}

/// Tabs sharing one bucket key, in the order they were encountered
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub key: BucketKey,
    pub tabs: Vec<TabInfo>,
}

impl Bucket {
    pub fn tab_ids(&self) -> Vec<TabId> {
        self.tabs.iter().map(|tab| tab.id).collect()
    }

    pub fn title(&self) -> String {
        label::title(&self.key)
    }

    pub fn color(&self) -> GroupColor {
        label::color(&self.key)
    }
}

/// Bucket key → tabs for one window, built once per run
#[derive(Debug, Clone, Default)]
pub struct GroupAssignment {
    buckets: Vec<Bucket>,
    index: HashMap<BucketKey, usize>,
}

impl GroupAssignment {
    pub fn new() -> Self {
        GroupAssignment {
            buckets: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn push(&mut self, key: BucketKey, tab: TabInfo) {
        match self.index.get(&key) {
            Some(&position) => self.buckets[position].tabs.push(tab),
            None => {
                self.index.insert(key, self.buckets.len());
                self.buckets.push(Bucket {
                    key,
                    tabs: vec![tab],
                });
            }
        }
    }

    pub fn get(&self, key: &BucketKey) -> Option<&Bucket> {
        self.index.get(key).map(|&position| &self.buckets[position])
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn into_buckets(self) -> Vec<Bucket> {
        self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Bucket key for one tab. A tab the tracker has never seen counts as just created.
pub fn bucket_key_for<Tz: TimeZone>(
    tab: &TabInfo,
    tracker: &CreationTimeTracker,
    config: &GroupingConfig,
    unit: Option<TimeUnit>,
    now: &DateTime<Tz>,
) -> BucketKey {
    match tracker.lookup(tab.id) {
        Some(CreationTime::Known(at)) => {
            let created = at.with_timezone(&now.timezone());
            resolve(&created, now, config.interval, unit)
        }
        Some(CreationTime::ObservedAt(_)) => BucketKey::UnknownAge,
        None if tracker.predates_tracking(tab.id) => BucketKey::UnknownAge,
        None => resolve(now, now, config.interval, unit),
    }
}

/// Filter a window's tabs and aggregate the eligible ones by bucket key
pub fn assign_buckets<Tz: TimeZone>(
    tabs: &[TabInfo],
    tracker: &CreationTimeTracker,
    config: &GroupingConfig,
    unit: Option<TimeUnit>,
    now: &DateTime<Tz>,
) -> GroupAssignment {
    tabs.iter()
        .filter(|tab| is_eligible(tab, config))
        .fold(GroupAssignment::new(), |mut assignment, tab| {
            let key = bucket_key_for(tab, tracker, config, unit, now);
            assignment.push(key, tab.clone());
            assignment
        })
}

/// Group id → member tab ids for every grouped tab, in first-seen order
pub fn tabs_by_group(tabs: &[TabInfo]) -> Vec<(GroupId, Vec<TabId>)> {
    let mut groups: Vec<(GroupId, Vec<TabId>)> = Vec::new();
    let mut index: HashMap<GroupId, usize> = HashMap::new();

    for tab in tabs.iter().filter(|tab| tab.is_grouped()) {
        match index.get(&tab.group_id) {
            Some(&position) => groups[position].1.push(tab.id),
            None => {
                index.insert(tab.group_id, groups.len());
                groups.push((tab.group_id, vec![tab.id]));
            }
        }
    }

    groups
}
