/// In-memory fakes of the host capabilities
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use crate::error::{GrouperError, Result};
use crate::host::{Clock, Job, Scheduler, SettingsStore, TabHost};
use crate::storage::Settings;
use crate::tab_data::{
    GroupId, GroupInfo, GroupProperties, TabId, TabInfo, TabQuery, WindowInfo, TAB_GROUP_ID_NONE,
};

pub fn create_test_tab(id: TabId, window_id: i32) -> TabInfo {
    TabInfo::new(id, window_id, format!("Tab {}", id), false)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedGroup {
    pub id: GroupId,
    pub tab_ids: Vec<TabId>,
    pub properties: Option<GroupProperties>,
}

#[derive(Default)]
pub struct FakeHost {
    pub windows: RefCell<Vec<WindowInfo>>,
    pub tabs: RefCell<Vec<TabInfo>>,
    pub groups: RefCell<Vec<CreatedGroup>>,
    pub dissolved: RefCell<Vec<Vec<TabId>>>,
    /// Group creation fails when it includes any of these tabs
    pub fail_create_for: RefCell<HashSet<TabId>>,
    pub fail_update: Cell<bool>,
    pub fail_windows: Cell<bool>,
    /// Tab queries for these windows fail
    pub fail_query_for: RefCell<HashSet<i32>>,
    next_group_id: Cell<GroupId>,
}

impl FakeHost {
    pub fn with_tabs(tabs: Vec<TabInfo>) -> FakeHost {
        let mut window_ids: Vec<i32> = tabs.iter().map(|tab| tab.window_id).collect();
        window_ids.sort();
        window_ids.dedup();
        let host = FakeHost::default();
        *host.windows.borrow_mut() = window_ids.into_iter().map(|id| WindowInfo { id }).collect();
        *host.tabs.borrow_mut() = tabs;
        host.next_group_id.set(100);
        host
    }

    pub fn add_tab(&self, tab: TabInfo) {
        self.tabs.borrow_mut().push(tab);
    }

    pub fn group_of(&self, tab_id: TabId) -> GroupId {
        self.tabs
            .borrow()
            .iter()
            .find(|tab| tab.id == tab_id)
            .map(|tab| tab.group_id)
            .unwrap_or(TAB_GROUP_ID_NONE)
    }
}

impl TabHost for FakeHost {
    async fn list_windows(&self) -> Result<Vec<WindowInfo>> {
        if self.fail_windows.get() {
            return Err(GrouperError::Host("windows unavailable".to_string()));
        }
        Ok(self.windows.borrow().clone())
    }

    async fn query_tabs(&self, query: TabQuery) -> Result<Vec<TabInfo>> {
        if let Some(window_id) = query.window_id {
            if self.fail_query_for.borrow().contains(&window_id) {
                return Err(GrouperError::Host(format!("window {} is gone", window_id)));
            }
        }
        Ok(self
            .tabs
            .borrow()
            .iter()
            .filter(|tab| query.window_id.is_none_or(|id| tab.window_id == id))
            .cloned()
            .collect())
    }

    async fn create_group(&self, tab_ids: &[TabId]) -> Result<GroupId> {
        if tab_ids.iter().any(|id| self.fail_create_for.borrow().contains(id)) {
            return Err(GrouperError::Host("cannot group tabs".to_string()));
        }
        let id = self.next_group_id.get();
        self.next_group_id.set(id + 1);
        for tab in self.tabs.borrow_mut().iter_mut() {
            if tab_ids.contains(&tab.id) {
                tab.group_id = id;
            }
        }
        self.groups.borrow_mut().push(CreatedGroup {
            id,
            tab_ids: tab_ids.to_vec(),
            properties: None,
        });
        Ok(id)
    }

    async fn update_group(&self, group_id: GroupId, properties: &GroupProperties) -> Result<()> {
        if self.fail_update.get() {
            return Err(GrouperError::Host("cannot style group".to_string()));
        }
        let mut groups = self.groups.borrow_mut();
        let group = groups
            .iter_mut()
            .find(|group| group.id == group_id)
            .ok_or_else(|| GrouperError::Host(format!("no group {}", group_id)))?;
        group.properties = Some(properties.clone());
        Ok(())
    }

    async fn dissolve_group(&self, tab_ids: &[TabId]) -> Result<()> {
        for tab in self.tabs.borrow_mut().iter_mut() {
            if tab_ids.contains(&tab.id) {
                tab.group_id = TAB_GROUP_ID_NONE;
            }
        }
        self.dissolved.borrow_mut().push(tab_ids.to_vec());
        Ok(())
    }

    async fn get_group(&self, group_id: GroupId) -> Result<GroupInfo> {
        self.groups
            .borrow()
            .iter()
            .find(|group| group.id == group_id)
            .map(|group| GroupInfo {
                id: group.id,
                title: group.properties.as_ref().map(|p| p.title.clone()),
                color: group.properties.as_ref().map(|p| p.color.to_string()),
            })
            .ok_or_else(|| GrouperError::Host(format!("no group {}", group_id)))
    }
}

#[derive(Default)]
pub struct MemorySettingsStore {
    pub stored: RefCell<Option<Settings>>,
    pub fail_load: Cell<bool>,
}

impl MemorySettingsStore {
    pub fn with(settings: Settings) -> MemorySettingsStore {
        MemorySettingsStore {
            stored: RefCell::new(Some(settings)),
            fail_load: Cell::new(false),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<Option<Settings>> {
        if self.fail_load.get() {
            return Err(GrouperError::Storage("sync storage unavailable".to_string()));
        }
        Ok(self.stored.borrow().clone())
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        *self.stored.borrow_mut() = Some(settings.clone());
        Ok(())
    }
}

pub struct FixedClock {
    pub now: Cell<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> FixedClock {
        FixedClock {
            now: Cell::new(Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    type Tz = Utc;

    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleCall {
    Every(Job, Duration),
    Cancel(Job),
    After(Job, Duration),
}

#[derive(Default)]
pub struct RecordingScheduler {
    pub calls: RefCell<Vec<ScheduleCall>>,
}

impl RecordingScheduler {
    pub fn take(&self) -> Vec<ScheduleCall> {
        self.calls.borrow_mut().drain(..).collect()
    }
}

impl Scheduler for RecordingScheduler {
    fn every(&self, job: Job, period: Duration) {
        self.calls.borrow_mut().push(ScheduleCall::Every(job, period));
    }

    fn cancel(&self, job: Job) {
        self.calls.borrow_mut().push(ScheduleCall::Cancel(job));
    }

    fn after(&self, job: Job, delay: Duration) {
        self.calls.borrow_mut().push(ScheduleCall::After(job, delay));
    }
}
