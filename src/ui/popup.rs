/// Popup UI for Tab Time Grouper extension

use yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use patternfly_yew::prelude::*;
use serde_json::json;
use crate::bucket::{IntervalSpec, TimeUnit};
use crate::chrome::{send_request, ChromeHost, ChromeSettingsStore};
use crate::host::{SettingsStore, TabHost};
use crate::messages::{Request, Response};
use crate::orchestrator::group_summaries;
use crate::storage::Settings;
use crate::tab_data::{GroupSummary, TabQuery};
use crate::ui::components::{GroupList, ToggleSwitch};

const INTERVAL_CHOICES: [(&str, &str); 5] = [
    ("15", "15 minutes"),
    ("30", "30 minutes"),
    ("60", "1 hour"),
    ("120", "2 hours"),
    ("am_pm", "Morning / afternoon"),
];

#[derive(Clone, PartialEq)]
enum AppState {
    Idle,
    Loading(String),
    Notice(String),
    Error(String),
}

#[derive(Clone, PartialEq, Default)]
struct Overview {
    settings: Settings,
    groups: Vec<GroupSummary>,
    tab_count: usize,
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| AppState::Idle);
    let overview = use_state(Overview::default);

    // Load settings and groups on mount
    {
        let state = state.clone();
        let overview = overview.clone();
        use_effect_with((), move |_| {
            refresh(overview, state);
            || ()
        });
    }

    // Auto grouping switch; enabling also groups right away
    let on_toggle = {
        let state = state.clone();
        let overview = overview.clone();

        Callback::from(move |enabled: bool| {
            let state = state.clone();
            let overview = overview.clone();

            state.set(AppState::Loading(if enabled {
                "Enabling auto grouping...".to_string()
            } else {
                "Disabling auto grouping...".to_string()
            }));

            spawn_local(async move {
                let result: Result<String, String> = async {
                    request(Request::ToggleAutoGrouping { enabled }).await?;
                    if enabled {
                        let response = request(Request::GroupTabsNow).await?;
                        Ok(format!(
                            "Auto grouping enabled, created {} groups",
                            response.groups_created.unwrap_or(0)
                        ))
                    } else {
                        Ok("Auto grouping disabled".to_string())
                    }
                }
                .await;

                match result {
                    Ok(message) => state.set(AppState::Notice(message)),
                    Err(e) => state.set(AppState::Error(format!("Toggle failed: {}", e))),
                }
                refresh(overview, state);
            });
        })
    };

    // Group now / by hour / by day
    let on_group = {
        let state = state.clone();
        let overview = overview.clone();
        move |unit: Option<TimeUnit>| {
            let state = state.clone();
            let overview = overview.clone();
            Callback::from(move |_: MouseEvent| {
                let state = state.clone();
                let overview = overview.clone();

                state.set(AppState::Loading("Grouping tabs...".to_string()));

                spawn_local(async move {
                    let req = match unit {
                        Some(time_unit) => Request::GroupTabsByTime { time_unit },
                        None => Request::GroupTabsNow,
                    };
                    match request(req).await {
                        Ok(response) => state.set(AppState::Notice(format!(
                            "Created {} groups",
                            response.groups_created.unwrap_or(0)
                        ))),
                        Err(e) => state.set(AppState::Error(format!("Grouping failed: {}", e))),
                    }
                    refresh(overview, state);
                });
            })
        }
    };

    // Settings changes are sent as partial updates and merged by the worker
    let on_setting = {
        let state = state.clone();
        let overview = overview.clone();
        Callback::from(move |patch: serde_json::Value| {
            let state = state.clone();
            let overview = overview.clone();
            spawn_local(async move {
                match request(Request::SettingsUpdated { settings: patch }).await {
                    Ok(_) => state.set(AppState::Notice("Settings saved".to_string())),
                    Err(e) => state.set(AppState::Error(format!("Failed to save: {}", e))),
                }
                refresh(overview, state);
            });
        })
    };

    let on_interval_change = {
        let on_setting = on_setting.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                let value = select.value();
                match value.parse::<u32>() {
                    Ok(minutes) => on_setting.emit(json!({ "groupInterval": minutes })),
                    Err(_) => on_setting.emit(json!({ "groupInterval": value })),
                }
            }
        })
    };

    let on_auto_interval_change = {
        let on_setting = on_setting.clone();
        let state = state.clone();
        Callback::from(move |e: Event| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                match input.value().trim().parse::<u32>() {
                    Ok(minutes) if minutes > 0 => on_setting.emit(json!({ "autoInterval": minutes })),
                    _ => state.set(AppState::Error("Interval must be a whole number of minutes".to_string())),
                }
            }
        })
    };

    let on_checkbox = {
        let on_setting = on_setting.clone();
        move |key: &'static str| {
            let on_setting = on_setting.clone();
            Callback::from(move |e: Event| {
                if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                    on_setting.emit(json!({ key: input.checked() }));
                }
            })
        }
    };

    let is_busy = matches!(*state, AppState::Loading(_));
    let settings = &overview.settings;
    let current_interval = match settings.group_interval {
        IntervalSpec::Minutes(minutes) => minutes.to_string(),
        IntervalSpec::HalfDay => "am_pm".to_string(),
    };

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Tab Time Grouper"}</h1>

            <div class="stats-box">
                <div class="stat-item">
                    <span class="stat-label">{"Open tabs"}</span>
                    <span class="stat-count">{overview.tab_count}</span>
                </div>
                <div class="stat-item">
                    <span class="stat-label">{"Groups"}</span>
                    <span class="stat-count">{overview.groups.len()}</span>
                </div>
            </div>

            <ToggleSwitch
                label="Auto grouping"
                checked={settings.auto_grouping}
                onchange={on_toggle}
                disabled={is_busy}
            />

            // Status display
            {match &*state {
                AppState::Loading(msg) => html! {
                    <div class="loading-text-center">
                        <Spinner />
                        <p class="loading-text">{msg}</p>
                    </div>
                },
                AppState::Notice(msg) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Success} title={msg.clone()} inline={true}>
                        </Alert>
                    </div>
                },
                AppState::Error(err) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                            {err.clone()}
                        </Alert>
                    </div>
                },
                AppState::Idle => html! {}
            }}

            <div class="flex-column-gap">
                <Button onclick={on_group(None)} disabled={is_busy} variant={ButtonVariant::Primary} block={true}>
                    {"Group tabs now"}
                </Button>
                <Button onclick={on_group(Some(TimeUnit::Hour))} disabled={is_busy} variant={ButtonVariant::Secondary} block={true}>
                    {"Group by hour"}
                </Button>
                <Button onclick={on_group(Some(TimeUnit::Day))} disabled={is_busy} variant={ButtonVariant::Secondary} block={true}>
                    {"Group by day"}
                </Button>
            </div>

            <div class="settings-section">
                <label class="setting-row">
                    <span>{"Group interval"}</span>
                    <select onchange={on_interval_change}>
                        {for INTERVAL_CHOICES.iter().map(|(value, label)| html! {
                            <option value={*value} selected={current_interval == *value}>{*label}</option>
                        })}
                    </select>
                </label>
                <label class="setting-row">
                    <span>{"Auto group every (minutes)"}</span>
                    <input
                        type="number"
                        min="1"
                        value={settings.auto_interval.to_string()}
                        onchange={on_auto_interval_change}
                    />
                </label>
                <label class="setting-row">
                    <input type="checkbox" checked={settings.include_pinned} onchange={on_checkbox("includePinned")} />
                    <span>{"Include pinned tabs"}</span>
                </label>
                <label class="setting-row">
                    <input type="checkbox" checked={settings.auto_collapse_on_create} onchange={on_checkbox("autoCollapseOnCreate")} />
                    <span>{"Collapse new groups"}</span>
                </label>
                <label class="setting-row">
                    <input type="checkbox" checked={settings.auto_ungroup_on_disable} onchange={on_checkbox("autoUngroupOnDisable")} />
                    <span>{"Ungroup everything when auto grouping is turned off"}</span>
                </label>
            </div>

            <div class="stats-container">
                <h2 class="stats-title">{"Current groups"}</h2>
                <GroupList groups={overview.groups.clone()} />
            </div>

            <p class="footer-popup">
                {"Tab Time Grouper v0.1.0"}
            </p>
        </div>
    }
}

// Helper functions

fn refresh(overview: UseStateHandle<Overview>, state: UseStateHandle<AppState>) {
    spawn_local(async move {
        match load_overview().await {
            Ok(data) => overview.set(data),
            Err(e) => state.set(AppState::Error(format!("Failed to load: {}", e))),
        }
    });
}

async fn load_overview() -> crate::error::Result<Overview> {
    let settings = ChromeSettingsStore.load().await?.unwrap_or_default();
    let tabs = ChromeHost.query_tabs(TabQuery::all()).await?;
    let groups = group_summaries(&ChromeHost, None).await?;

    Ok(Overview {
        settings,
        groups,
        tab_count: tabs.len(),
    })
}

async fn request(req: Request) -> Result<Response, String> {
    let response = send_request(&req).await.map_err(|e| e.to_string())?;
    if response.success {
        Ok(response)
    } else {
        Err(response.error.unwrap_or_else(|| "unknown error".to_string()))
    }
}
