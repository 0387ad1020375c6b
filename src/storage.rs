/// Settings blob persisted in chrome.storage.sync

use crate::bucket::IntervalSpec;
use crate::error::{GrouperError, Result};
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key the settings blob is stored under
pub const SETTINGS_KEY: &str = "tabGrouperSettings";

pub const DEFAULT_GROUP_INTERVAL_MINUTES: u32 = 60;
pub const DEFAULT_AUTO_INTERVAL_MINUTES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingMode {
    Time,
    Domain,
    Manual,
}

/// Root storage structure
///
/// Stored blobs are read field by field: a missing or unreadable value falls
/// back to that field's default without discarding the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "serde_json::Value")]
pub struct Settings {
    pub auto_grouping: bool,
    pub group_interval: IntervalSpec,
    /// Minutes between periodic auto-grouping runs
    pub auto_interval: u32,
    pub include_pinned: bool,
    pub auto_collapse_on_create: bool,
    pub auto_ungroup_on_disable: bool,
    pub grouping_mode: GroupingMode,
}

impl Settings {
    pub fn new() -> Self {
        Settings {
            auto_grouping: false,
            group_interval: IntervalSpec::Minutes(DEFAULT_GROUP_INTERVAL_MINUTES),
            auto_interval: DEFAULT_AUTO_INTERVAL_MINUTES,
            include_pinned: true,
            auto_collapse_on_create: false,
            auto_ungroup_on_disable: false,
            grouping_mode: GroupingMode::Time,
        }
    }

    /// Overlay the keys of a partial settings object onto these settings.
    /// Unknown keys are ignored; a bad value for a known key rejects the update.
    pub fn merge(&self, patch: &Value) -> Result<Settings> {
        let patch = patch.as_object().ok_or_else(|| {
            GrouperError::InvalidRequest("settings update must be an object".to_string())
        })?;

        let mut merged = self.clone();
        for (key, value) in patch {
            merged.apply(key, value)?;
        }
        Ok(merged)
    }

    fn apply(&mut self, key: &str, value: &Value) -> Result<()> {
        match key {
            "autoGrouping" => self.auto_grouping = field(key, value)?,
            "groupInterval" => self.group_interval = field(key, value)?,
            "autoInterval" => self.auto_interval = field(key, value)?,
            "includePinned" => self.include_pinned = field(key, value)?,
            "autoCollapseOnCreate" => self.auto_collapse_on_create = field(key, value)?,
            "autoUngroupOnDisable" => self.auto_ungroup_on_disable = field(key, value)?,
            "groupingMode" => self.grouping_mode = field(key, value)?,
            _ => {}
        }
        Ok(())
    }

    /// Periodic run spacing, never shorter than a minute
    pub fn auto_interval_minutes(&self) -> u32 {
        self.auto_interval.max(1)
    }

    /// Immutable snapshot used by one grouping run
    pub fn grouping_config(&self) -> GroupingConfig {
        let interval = match self.group_interval {
            IntervalSpec::Minutes(0) => IntervalSpec::Minutes(DEFAULT_GROUP_INTERVAL_MINUTES),
            other => other,
        };

        GroupingConfig {
            interval,
            include_pinned: self.include_pinned,
            auto_collapse_on_create: self.auto_collapse_on_create,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Value> for Settings {
    type Error = GrouperError;

    fn try_from(blob: Value) -> Result<Settings> {
        let fields = blob.as_object().ok_or_else(|| {
            GrouperError::Serialization("stored settings are not an object".to_string())
        })?;

        let mut settings = Settings::new();
        for (key, value) in fields {
            if let Err(e) = settings.apply(key, value) {
                warn!("keeping default for stored {}: {}", key, e);
            }
        }
        Ok(settings)
    }
}

fn field<T: DeserializeOwned>(key: &str, value: &Value) -> Result<T> {
    T::deserialize(value).map_err(|e| GrouperError::Serialization(format!("{}: {}", key, e)))
}

/// What a grouping run needs to know, fixed for the run's duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupingConfig {
    pub interval: IntervalSpec,
    pub include_pinned: bool,
    pub auto_collapse_on_create: bool,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Settings::default().grouping_config()
    }
}
