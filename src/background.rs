/// Entry points the extension's service worker calls

use std::cell::RefCell;
use std::rc::Rc;

use log::info;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::chrome::{ChromeHost, ChromeScheduler, ChromeSettingsStore};
use crate::host::{Job, SystemClock};
use crate::messages::Response;
use crate::service::GrouperService;

type BackgroundService = GrouperService<ChromeHost, ChromeSettingsStore, SystemClock, ChromeScheduler>;

thread_local! {
    static SERVICE: RefCell<Option<Rc<BackgroundService>>> = const { RefCell::new(None) };
}

fn service() -> Option<Rc<BackgroundService>> {
    SERVICE.with(|slot| slot.borrow().clone())
}

#[wasm_bindgen]
pub fn start_background() {
    if service().is_some() {
        return;
    }

    let service = Rc::new(GrouperService::new(
        ChromeHost,
        ChromeSettingsStore,
        SystemClock,
        ChromeScheduler::new(run_job),
    ));
    SERVICE.with(|slot| *slot.borrow_mut() = Some(service.clone()));

    spawn_local(async move {
        service.initialize().await;
        info!("Tab Time Grouper background service started");
    });
}

#[wasm_bindgen]
pub fn on_tab_created(tab_id: i32) {
    if let Some(service) = service() {
        service.on_tab_created(tab_id);
    }
}

#[wasm_bindgen]
pub fn on_tab_removed(tab_id: i32) {
    if let Some(service) = service() {
        service.on_tab_removed(tab_id);
    }
}

#[wasm_bindgen]
pub fn on_tab_updated(tab_id: i32, status: String) {
    if let Some(service) = service() {
        service.on_tab_updated(tab_id, &status);
    }
}

#[wasm_bindgen]
pub async fn handle_message(request: JsValue) -> JsValue {
    let response = match (service(), serde_wasm_bindgen::from_value::<serde_json::Value>(request)) {
        (Some(service), Ok(raw)) => service.handle_message(&raw).await,
        (None, _) => Response::failure("background service not started"),
        (_, Err(e)) => Response::failure(format!("unreadable request: {}", e)),
    };

    serde_wasm_bindgen::to_value(&response).unwrap_or(JsValue::NULL)
}

fn run_job(job: Job) {
    if let Some(service) = service() {
        spawn_local(async move { service.run_job(job).await });
    }
}
