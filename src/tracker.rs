/// Creation-time tracking for open tabs
///
/// The tracker is the only state bucketing depends on besides the tabs
/// themselves. Entries are written by tab lifecycle events and read by
/// grouping runs; a tab without an entry is treated as just created.
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};

use crate::tab_data::{TabId, TabInfo};

/// How long an entry is kept, whether or not its tab is still open
pub const RETENTION_DAYS: i64 = 7;

pub fn retention() -> Duration {
    Duration::days(RETENTION_DAYS)
}

/// What the tracker knows about when a tab was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationTime {
    /// Recorded from the tab's creation event
    Known(DateTime<Utc>),
    /// The tab was already open when tracking began; only the moment it
    /// was first seen is known, not its age
    ObservedAt(DateTime<Utc>),
}

impl CreationTime {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            CreationTime::Known(at) | CreationTime::ObservedAt(at) => *at,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreationTimeTracker {
    entries: HashMap<TabId, CreationTime>,
    /// Tabs found open when tracking began. Survives purging so those tabs
    /// keep their unknown age instead of looking just created.
    pre_existing: HashSet<TabId>,
}

impl CreationTimeTracker {
    pub fn new() -> Self {
        CreationTimeTracker {
            entries: HashMap::new(),
            pre_existing: HashSet::new(),
        }
    }

    /// Set or overwrite the entry for a newly created tab
    pub fn record_created(&mut self, tab_id: TabId, at: DateTime<Utc>) {
        self.pre_existing.remove(&tab_id);
        self.entries.insert(tab_id, CreationTime::Known(at));
    }

    /// Drop the entry of a closed tab. Must run before the host may reuse the id.
    pub fn remove(&mut self, tab_id: TabId) -> bool {
        let marked = self.pre_existing.remove(&tab_id);
        self.entries.remove(&tab_id).is_some() || marked
    }

    pub fn lookup(&self, tab_id: TabId) -> Option<CreationTime> {
        self.entries.get(&tab_id).copied()
    }

    /// Whether the tab was already open when tracking began, even if its entry was purged since
    pub fn predates_tracking(&self, tab_id: TabId) -> bool {
        self.pre_existing.contains(&tab_id)
    }

    /// Seed an entry for every tab that has none. Returns how many were added.
    ///
    /// Tabs that predate tracking get an `ObservedAt` entry, so they land in
    /// one stable "unknown age" bucket instead of a made-up age.
    pub fn bulk_initialize(&mut self, tabs: &[TabInfo], now: DateTime<Utc>) -> usize {
        let mut seeded = 0;
        for tab in tabs {
            if let Entry::Vacant(slot) = self.entries.entry(tab.id) {
                slot.insert(CreationTime::ObservedAt(now));
                self.pre_existing.insert(tab.id);
                seeded += 1;
            }
        }
        seeded
    }

    /// Delete every entry older than `max_age`. Returns how many were dropped.
    pub fn purge_expired(&mut self, now: DateTime<Utc>, max_age: Duration) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, created| now.signed_duration_since(created.timestamp()) <= max_age);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
