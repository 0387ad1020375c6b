/// Request/response protocol between the popup and the background worker
use serde::{Deserialize, Serialize};

use crate::bucket::TimeUnit;
use crate::error::{GrouperError, Result};

const KNOWN_ACTIONS: [&str; 6] = [
    "toggleAutoGrouping",
    "groupTabsNow",
    "groupNow",
    "groupTabsByTime",
    "groupByTime",
    "settingsUpdated",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    ToggleAutoGrouping {
        enabled: bool,
    },
    #[serde(alias = "groupNow")]
    GroupTabsNow,
    #[serde(alias = "groupByTime")]
    GroupTabsByTime {
        #[serde(rename = "timeUnit")]
        time_unit: TimeUnit,
    },
    /// Partial settings object, merged over the stored settings
    SettingsUpdated {
        settings: serde_json::Value,
    },
}

impl Request {
    /// Decode a raw message, telling unknown actions apart from malformed ones
    pub fn parse(raw: &serde_json::Value) -> Result<Request> {
        let action = raw
            .get("action")
            .and_then(|action| action.as_str())
            .ok_or_else(|| GrouperError::InvalidRequest("missing action".to_string()))?;

        if !KNOWN_ACTIONS.contains(&action) {
            return Err(GrouperError::InvalidRequest(format!("unknown action: {}", action)));
        }

        serde_json::from_value(raw.clone())
            .map_err(|e| GrouperError::InvalidRequest(format!("malformed {} request: {}", action, e)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups_created: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_unit: Option<TimeUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Response {
    pub fn ok() -> Response {
        Response {
            success: true,
            ..Response::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Response {
        Response {
            success: false,
            error: Some(error.into()),
            ..Response::default()
        }
    }

    pub fn grouped(groups_created: usize) -> Response {
        Response {
            success: true,
            groups_created: Some(groups_created),
            message: Some(format!("Created {} groups", groups_created)),
            ..Response::default()
        }
    }

    pub fn grouped_by(time_unit: TimeUnit, groups_created: usize) -> Response {
        Response {
            time_unit: Some(time_unit),
            ..Response::grouped(groups_created)
        }
    }
}
