/// Grouping runs across every browser window
///
/// A run snapshots each window's tabs, buckets the ungrouped ones and
/// creates one group per non-empty bucket. Runs are not exclusive: a second
/// trigger can interleave with one in flight at any host call. The only
/// guard against grouping a tab twice is that each run re-reads group
/// membership and skips tabs that are already grouped, so a run that loses
/// the race simply creates fewer groups.
use std::cell::RefCell;

use chrono::{DateTime, TimeZone};
use log::{debug, error, info, warn};
use uuid::Uuid;

use crate::bucket::TimeUnit;
use crate::error::Result;
use crate::host::TabHost;
use crate::operations::{assign_buckets, tabs_by_group, Bucket};
use crate::storage::GroupingConfig;
use crate::tab_data::{GroupId, GroupProperties, GroupSummary, TabQuery, WindowId};
use crate::tracker::CreationTimeTracker;

pub const UNNAMED_GROUP_TITLE: &str = "Unnamed group";
pub const UNKNOWN_GROUP_COLOR: &str = "grey";

/// Group every window's ungrouped tabs by age. Returns how many groups
/// were created and styled.
///
/// Only a failure to list windows fails the run. A window whose tabs cannot
/// be listed, or a bucket whose group cannot be created or styled, is
/// logged and skipped.
pub async fn run_grouping<H: TabHost, Tz: TimeZone>(
    host: &H,
    tracker: &RefCell<CreationTimeTracker>,
    config: &GroupingConfig,
    unit: Option<TimeUnit>,
    now: &DateTime<Tz>,
) -> Result<usize> {
    let run_id = Uuid::new_v4();
    let windows = host.list_windows().await?;
    let mut groups_created = 0;

    for window in &windows {
        let tabs = match host.query_tabs(TabQuery::window(window.id)).await {
            Ok(tabs) => tabs,
            Err(e) => {
                warn!("[{}] skipping window {}: {}", run_id, window.id, e);
                continue;
            }
        };

        // Borrow ends before the next await so tab events can still record
        let assignment = assign_buckets(&tabs, &tracker.borrow(), config, unit, now);
        debug!(
            "[{}] window {}: {} tabs in {} buckets",
            run_id,
            window.id,
            tabs.len(),
            assignment.len()
        );

        for bucket in assignment.buckets() {
            match group_bucket(host, bucket, config.auto_collapse_on_create).await {
                Ok(group_id) => {
                    groups_created += 1;
                    info!(
                        "[{}] created group {} \"{}\" with {} tabs in window {}",
                        run_id,
                        group_id,
                        bucket.title(),
                        bucket.tabs.len(),
                        window.id
                    );
                }
                Err(e) => error!(
                    "[{}] failed to group bucket {} in window {}: {}",
                    run_id, bucket.key, window.id, e
                ),
            }
        }
    }

    info!(
        "[{}] grouping finished: {} groups across {} windows",
        run_id,
        groups_created,
        windows.len()
    );
    Ok(groups_created)
}

async fn group_bucket<H: TabHost>(host: &H, bucket: &Bucket, collapsed: bool) -> Result<GroupId> {
    let group_id = host.create_group(&bucket.tab_ids()).await?;
    let properties = GroupProperties {
        title: bucket.title(),
        color: bucket.color(),
        collapsed,
    };
    host.update_group(group_id, &properties).await?;
    Ok(group_id)
}

/// Ungroup every group in every window. Returns how many were dissolved.
pub async fn dissolve_all_groups<H: TabHost>(host: &H) -> Result<usize> {
    let tabs = host.query_tabs(TabQuery::all()).await?;
    let groups = tabs_by_group(&tabs);
    let mut dissolved = 0;

    for (group_id, tab_ids) in &groups {
        match host.dissolve_group(tab_ids).await {
            Ok(()) => dissolved += 1,
            Err(e) => error!("failed to dissolve group {}: {}", group_id, e),
        }
    }

    info!("dissolved {} of {} groups", dissolved, groups.len());
    Ok(dissolved)
}

/// Existing groups with their display attributes, optionally limited to one window
pub async fn group_summaries<H: TabHost>(
    host: &H,
    window_id: Option<WindowId>,
) -> Result<Vec<GroupSummary>> {
    let tabs = host.query_tabs(TabQuery { window_id }).await?;
    let mut summaries = Vec::new();

    for (group_id, tab_ids) in tabs_by_group(&tabs) {
        let (title, color) = match host.get_group(group_id).await {
            Ok(info) => (
                info.title.filter(|title| !title.is_empty()),
                info.color,
            ),
            Err(e) => {
                warn!("could not read group {}: {}", group_id, e);
                (None, None)
            }
        };

        summaries.push(GroupSummary {
            id: group_id,
            title: title.unwrap_or_else(|| UNNAMED_GROUP_TITLE.to_string()),
            color: color.unwrap_or_else(|| UNKNOWN_GROUP_COLOR.to_string()),
            tab_ids,
        });
    }

    Ok(summaries)
}
