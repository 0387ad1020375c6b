/// Capabilities the grouper consumes from the browser
///
/// Everything here is asynchronous and single-threaded: implementations may
/// suspend at every call, and nothing is required to be `Send`.
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};

use crate::error::Result;
use crate::storage::Settings;
use crate::tab_data::{GroupId, GroupInfo, GroupProperties, TabId, TabInfo, TabQuery, WindowInfo};

#[allow(async_fn_in_trait)]
pub trait TabHost {
    async fn list_windows(&self) -> Result<Vec<WindowInfo>>;

    async fn query_tabs(&self, query: TabQuery) -> Result<Vec<TabInfo>>;

    /// Put the tabs into a new group and return its id
    async fn create_group(&self, tab_ids: &[TabId]) -> Result<GroupId>;

    async fn update_group(&self, group_id: GroupId, properties: &GroupProperties) -> Result<()>;

    /// Remove the tabs from whatever group they are in
    async fn dissolve_group(&self, tab_ids: &[TabId]) -> Result<()>;

    async fn get_group(&self, group_id: GroupId) -> Result<GroupInfo>;
}

/// Persisted settings blob
#[allow(async_fn_in_trait)]
pub trait SettingsStore {
    /// `Ok(None)` when nothing has been stored yet
    async fn load(&self) -> Result<Option<Settings>>;

    async fn save(&self, settings: &Settings) -> Result<()>;
}

/// Source of "now", in the zone whose calendar half-day grouping follows
pub trait Clock {
    type Tz: TimeZone;

    fn now(&self) -> DateTime<Self::Tz>;
}

/// Wall clock in the browser's local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Tz = Local;

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Recurring and one-shot work the service asks the host to trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Job {
    /// Periodic auto-grouping
    AutoGroup,
    /// One run shortly after a tab finished loading
    DeferredGroup,
    /// Drop stale creation-time entries
    Purge,
}

impl Job {
    pub fn name(&self) -> &'static str {
        match self {
            Job::AutoGroup => "auto-group",
            Job::DeferredGroup => "deferred-group",
            Job::Purge => "purge",
        }
    }
}

pub trait Scheduler {
    /// Run `job` every `period`, replacing any earlier schedule for it
    fn every(&self, job: Job, period: Duration);

    fn cancel(&self, job: Job);

    /// Run `job` once after `delay`. Earlier pending runs are not cancelled.
    fn after(&self, job: Job, delay: Duration);
}
