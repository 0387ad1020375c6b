/// Background grouping service: tab events, control requests and timer jobs
///
/// Settings are re-read from storage at the start of every handler and run,
/// so a run always works from one immutable snapshot.
use std::cell::{Cell, RefCell};
use std::time::Duration;

use chrono::Utc;
use log::{debug, error, info, warn};

use crate::bucket::TimeUnit;
use crate::error::Result;
use crate::host::{Clock, Job, Scheduler, SettingsStore, TabHost};
use crate::messages::{Request, Response};
use crate::orchestrator::{dissolve_all_groups, run_grouping};
use crate::storage::{GroupingMode, Settings};
use crate::tab_data::{TabId, TabQuery};
use crate::tracker::{retention, CreationTimeTracker};

/// Delay between a tab finishing loading and the grouping run it triggers
pub const TAB_LOADED_DELAY: Duration = Duration::from_secs(2);
pub const PURGE_PERIOD: Duration = Duration::from_secs(60 * 60);

pub struct GrouperService<H, S, C, K> {
    host: H,
    store: S,
    clock: C,
    scheduler: K,
    tracker: RefCell<CreationTimeTracker>,
    auto_enabled: Cell<bool>,
}

impl<H, S, C, K> GrouperService<H, S, C, K>
where
    H: TabHost,
    S: SettingsStore,
    C: Clock,
    K: Scheduler,
{
    pub fn new(host: H, store: S, clock: C, scheduler: K) -> Self {
        GrouperService {
            host,
            store,
            clock,
            scheduler,
            tracker: RefCell::new(CreationTimeTracker::new()),
            auto_enabled: Cell::new(false),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn tracker(&self) -> &RefCell<CreationTimeTracker> {
        &self.tracker
    }

    pub fn auto_grouping_enabled(&self) -> bool {
        self.auto_enabled.get()
    }

    /// Load settings, start tracking the tabs already open and arm the timers
    pub async fn initialize(&self) {
        let settings = self.load_settings().await;

        match self.host.query_tabs(TabQuery::all()).await {
            Ok(tabs) => {
                let now = self.clock.now().with_timezone(&Utc);
                let seeded = self.tracker.borrow_mut().bulk_initialize(&tabs, now);
                info!("tracking {} tabs that were already open", seeded);
            }
            Err(e) => warn!("could not list open tabs: {}", e),
        }

        self.scheduler.every(Job::Purge, PURGE_PERIOD);

        self.auto_enabled.set(settings.auto_grouping);
        if settings.auto_grouping {
            self.start_auto_grouping(&settings);
        }
    }

    /// Stored settings, or the defaults if none are stored or they cannot be read
    pub async fn load_settings(&self) -> Settings {
        match self.store.load().await {
            Ok(Some(settings)) => settings,
            Ok(None) => Settings::default(),
            Err(e) => {
                warn!("using default settings: {}", e);
                Settings::default()
            }
        }
    }

    /// Stored settings for read-modify-write paths. Unlike `load_settings`, a failed read is an error.
    async fn stored_settings(&self) -> Result<Settings> {
        Ok(self.store.load().await?.unwrap_or_default())
    }

    pub fn on_tab_created(&self, tab_id: TabId) {
        let now = self.clock.now().with_timezone(&Utc);
        self.tracker.borrow_mut().record_created(tab_id, now);
        debug!("tab {} created", tab_id);
    }

    pub fn on_tab_removed(&self, tab_id: TabId) {
        if self.tracker.borrow_mut().remove(tab_id) {
            debug!("tab {} removed", tab_id);
        }
    }

    /// A finished page load schedules one grouping run shortly after
    pub fn on_tab_updated(&self, tab_id: TabId, status: &str) {
        if status == "complete" && self.auto_enabled.get() {
            debug!("tab {} loaded, grouping in {:?}", tab_id, TAB_LOADED_DELAY);
            self.scheduler.after(Job::DeferredGroup, TAB_LOADED_DELAY);
        }
    }

    /// Answer one control request. Never fails: errors become failure responses.
    pub async fn handle_message(&self, raw: &serde_json::Value) -> Response {
        let request = match Request::parse(raw) {
            Ok(request) => request,
            Err(e) => {
                warn!("rejected message: {}", e);
                return Response::failure(e.to_string());
            }
        };

        let result = match request {
            Request::ToggleAutoGrouping { enabled } => {
                self.toggle_auto_grouping(enabled).await.map(|_| Response::ok())
            }
            Request::GroupTabsNow => self.group_now(None).await.map(Response::grouped),
            Request::GroupTabsByTime { time_unit } => self
                .group_now(Some(time_unit))
                .await
                .map(|count| Response::grouped_by(time_unit, count)),
            Request::SettingsUpdated { settings } => {
                self.settings_updated(&settings).await.map(|_| Response::ok())
            }
        };

        result.unwrap_or_else(|e| {
            error!("request failed: {}", e);
            Response::failure(e.to_string())
        })
    }

    pub async fn toggle_auto_grouping(&self, enabled: bool) -> Result<()> {
        let mut settings = self.stored_settings().await?;
        settings.auto_grouping = enabled;
        self.store.save(&settings).await?;
        self.auto_enabled.set(enabled);

        if enabled {
            self.start_auto_grouping(&settings);
        } else {
            self.stop_auto_grouping();
            if settings.auto_ungroup_on_disable {
                match dissolve_all_groups(&self.host).await {
                    Ok(count) => info!("ungrouped {} groups after disabling auto grouping", count),
                    Err(e) => error!("could not ungroup after disabling auto grouping: {}", e),
                }
            }
        }
        Ok(())
    }

    /// One grouping run with freshly loaded settings
    pub async fn group_now(&self, unit: Option<TimeUnit>) -> Result<usize> {
        let config = self.load_settings().await.grouping_config();
        let now = self.clock.now();
        run_grouping(&self.host, &self.tracker, &config, unit, &now).await
    }

    pub async fn settings_updated(&self, patch: &serde_json::Value) -> Result<()> {
        let current = self.stored_settings().await?;
        let merged = current.merge(patch)?;
        self.store.save(&merged).await?;

        // The period may have changed
        if self.auto_enabled.get() {
            self.start_auto_grouping(&merged);
        }
        Ok(())
    }

    pub async fn run_job(&self, job: Job) {
        match job {
            Job::AutoGroup | Job::DeferredGroup => self.auto_group().await,
            Job::Purge => {
                let now = self.clock.now().with_timezone(&Utc);
                let purged = self.tracker.borrow_mut().purge_expired(now, retention());
                if purged > 0 {
                    debug!("purged {} stale creation times", purged);
                }
            }
        }
    }

    async fn auto_group(&self) {
        if !self.auto_enabled.get() {
            return;
        }

        let settings = self.load_settings().await;
        if !settings.auto_grouping {
            return;
        }
        if settings.grouping_mode != GroupingMode::Time {
            debug!("grouping mode {:?} does not group automatically", settings.grouping_mode);
            return;
        }

        let config = settings.grouping_config();
        let now = self.clock.now();
        if let Err(e) = run_grouping(&self.host, &self.tracker, &config, None, &now).await {
            error!("auto grouping failed: {}", e);
        }
    }

    fn start_auto_grouping(&self, settings: &Settings) {
        let minutes = settings.auto_interval_minutes();
        self.scheduler
            .every(Job::AutoGroup, Duration::from_secs(60 * u64::from(minutes)));
        info!("auto grouping every {} minutes", minutes);
    }

    fn stop_auto_grouping(&self) {
        self.scheduler.cancel(Job::AutoGroup);
        info!("auto grouping stopped");
    }
}
