/// Data structures for Tab Time Grouper
use serde::{Deserialize, Serialize};

use crate::label::GroupColor;

pub type TabId = i32;
pub type WindowId = i32;
pub type GroupId = i32;

/// Group id chrome reports for a tab that is not in any group
pub const TAB_GROUP_ID_NONE: GroupId = -1;

/// Information about a browser tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: TabId,
    #[serde(default)]
    pub window_id: WindowId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default = "ungrouped")]
    pub group_id: GroupId,
}

fn ungrouped() -> GroupId {
    TAB_GROUP_ID_NONE
}

impl TabInfo {
    pub fn new(id: TabId, window_id: WindowId, title: String, pinned: bool) -> TabInfo {
        TabInfo {
            id,
            window_id,
            title,
            url: String::new(),
            pinned,
            group_id: TAB_GROUP_ID_NONE,
        }
    }

    pub fn is_grouped(&self) -> bool {
        self.group_id != TAB_GROUP_ID_NONE
    }
}

/// A browser window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowInfo {
    pub id: WindowId,
}

/// Filter for tab queries; `None` means every window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_id: Option<WindowId>,
}

impl TabQuery {
    pub fn all() -> TabQuery {
        TabQuery { window_id: None }
    }

    pub fn window(window_id: WindowId) -> TabQuery {
        TabQuery {
            window_id: Some(window_id),
        }
    }
}

/// Display attributes of a tab group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupProperties {
    pub title: String,
    pub color: GroupColor,
    pub collapsed: bool,
}

/// Display attributes the host reports for an existing group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub id: GroupId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// An existing group as the popup lists it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub id: GroupId,
    pub title: String,
    pub color: String,
    pub tab_ids: Vec<TabId>,
}

impl GroupSummary {
    pub fn tab_count(&self) -> usize {
        self.tab_ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_info_creation() {
        let tab = TabInfo::new(1, 7, "Google".to_string(), false);

        assert_eq!(tab.id, 1);
        assert_eq!(tab.window_id, 7);
        assert_eq!(tab.title, "Google");
        assert!(!tab.pinned);
        assert!(!tab.is_grouped());
    }

    #[test]
    fn test_deserialize_chrome_tab() {
        let json = r#"{
            "id": 42,
            "windowId": 3,
            "title": "Docs",
            "url": "https://docs.rs",
            "pinned": true,
            "groupId": 9,
            "active": false
        }"#;

        let tab: TabInfo = serde_json::from_str(json).unwrap();

        assert_eq!(tab.id, 42);
        assert_eq!(tab.window_id, 3);
        assert!(tab.pinned);
        assert!(tab.is_grouped());
    }

    #[test]
    fn test_missing_group_id_means_ungrouped() {
        let tab: TabInfo = serde_json::from_str(r#"{"id": 5}"#).unwrap();

        assert_eq!(tab.group_id, TAB_GROUP_ID_NONE);
        assert!(!tab.is_grouped());
    }

    #[test]
    fn test_tab_query_serialization() {
        assert_eq!(serde_json::to_string(&TabQuery::all()).unwrap(), "{}");
        assert_eq!(
            serde_json::to_string(&TabQuery::window(4)).unwrap(),
            r#"{"windowId":4}"#
        );
    }
}
