/// chrome.* backed implementations of the host capabilities
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::error::{GrouperError, Result};
use crate::host::{Job, Scheduler, SettingsStore, TabHost};
use crate::messages::{Request, Response};
use crate::storage::{Settings, SETTINGS_KEY};
use crate::tab_data::{GroupId, GroupInfo, GroupProperties, TabId, TabInfo, TabQuery, WindowInfo};

// Import JS bridge functions
#[wasm_bindgen(module = "/js/chrome_bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getAllWindows() -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryTabs(query: JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn groupTabs(tab_ids: JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn updateGroup(group_id: i32, properties: JsValue) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn ungroupTabs(tab_ids: JsValue) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getGroup(group_id: i32) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendMessage(request: JsValue) -> std::result::Result<JsValue, JsValue>;

    fn startInterval(name: &str, ms: f64, callback: &js_sys::Function);

    fn stopInterval(name: &str);

    fn runLater(ms: f64, callback: &JsValue);
}

fn host_error(e: JsValue) -> GrouperError {
    GrouperError::Host(format!("{:?}", e))
}

/// Plain JS objects, never ES `Map`s, so values survive chrome's JSON messaging
fn to_js<T: Serialize>(value: &T) -> Result<JsValue> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeHost;

impl TabHost for ChromeHost {
    async fn list_windows(&self) -> Result<Vec<WindowInfo>> {
        let windows_js = getAllWindows().await.map_err(host_error)?;
        Ok(serde_wasm_bindgen::from_value(windows_js)?)
    }

    async fn query_tabs(&self, query: TabQuery) -> Result<Vec<TabInfo>> {
        let tabs_js = queryTabs(to_js(&query)?).await.map_err(host_error)?;
        Ok(serde_wasm_bindgen::from_value(tabs_js)?)
    }

    async fn create_group(&self, tab_ids: &[TabId]) -> Result<GroupId> {
        let group_js = groupTabs(to_js(&tab_ids)?).await.map_err(host_error)?;
        Ok(serde_wasm_bindgen::from_value(group_js)?)
    }

    async fn update_group(&self, group_id: GroupId, properties: &GroupProperties) -> Result<()> {
        updateGroup(group_id, to_js(properties)?)
            .await
            .map_err(host_error)
    }

    async fn dissolve_group(&self, tab_ids: &[TabId]) -> Result<()> {
        ungroupTabs(to_js(&tab_ids)?).await.map_err(host_error)
    }

    async fn get_group(&self, group_id: GroupId) -> Result<GroupInfo> {
        let group_js = getGroup(group_id).await.map_err(host_error)?;
        Ok(serde_wasm_bindgen::from_value(group_js)?)
    }
}

/// Settings in chrome.storage.sync
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeSettingsStore;

impl SettingsStore for ChromeSettingsStore {
    async fn load(&self) -> Result<Option<Settings>> {
        let stored = getStorage(SETTINGS_KEY)
            .await
            .map_err(|e| GrouperError::Storage(format!("{:?}", e)))?;

        if stored.is_null() || stored.is_undefined() {
            return Ok(None);
        }
        Ok(Some(serde_wasm_bindgen::from_value(stored)?))
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        setStorage(SETTINGS_KEY, to_js(settings)?)
            .await
            .map_err(|e| GrouperError::Storage(format!("{:?}", e)))
    }
}

/// Timers in the worker's JS event loop; each firing calls `on_job`
pub struct ChromeScheduler {
    on_job: fn(Job),
    intervals: RefCell<HashMap<Job, Closure<dyn FnMut()>>>,
}

impl ChromeScheduler {
    pub fn new(on_job: fn(Job)) -> Self {
        ChromeScheduler {
            on_job,
            intervals: RefCell::new(HashMap::new()),
        }
    }
}

impl Scheduler for ChromeScheduler {
    fn every(&self, job: Job, period: Duration) {
        let on_job = self.on_job;
        let callback = Closure::<dyn FnMut()>::new(move || on_job(job));
        startInterval(job.name(), period.as_millis() as f64, callback.as_ref().unchecked_ref());
        // The replaced closure is only dropped once its interval is cleared
        self.intervals.borrow_mut().insert(job, callback);
    }

    fn cancel(&self, job: Job) {
        stopInterval(job.name());
        self.intervals.borrow_mut().remove(&job);
    }

    fn after(&self, job: Job, delay: Duration) {
        let on_job = self.on_job;
        let callback = Closure::once_into_js(move || on_job(job));
        runLater(delay.as_millis() as f64, &callback);
    }
}

/// Send a control request to the background worker
pub async fn send_request(request: &Request) -> Result<Response> {
    let response_js = sendMessage(to_js(request)?).await.map_err(host_error)?;
    if response_js.is_null() || response_js.is_undefined() {
        return Err(GrouperError::Host("background worker did not answer".to_string()));
    }
    Ok(serde_wasm_bindgen::from_value(response_js)?)
}
