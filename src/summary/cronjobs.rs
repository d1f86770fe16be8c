use chrono::{DateTime, Utc};
use k8s_openapi::api::batch::v1::CronJob;

use super::{logged, name_of, namespace_of};
use crate::clients::ClusterApi;
use crate::error::FetchResult;
use crate::helpers::{AgeStyle, age_of, format_age};
use crate::models::k8s::{ListOptions, Scope};
use crate::models::views::CronJobView;
use crate::status::{StatusLabel, StatusTally};

const CRONJOB_BUCKETS: [StatusLabel; 2] = [StatusLabel::Running, StatusLabel::Completed];

async fn fetch<C: ClusterApi>(cluster: &C, scope: &Scope) -> FetchResult<Vec<CronJob>> {
    logged(
        "cronjobs",
        scope,
        cluster.list(scope, &ListOptions::default()).await,
    )
}

fn active_jobs(cj: &CronJob) -> usize {
    cj.status
        .as_ref()
        .and_then(|s| s.active.as_ref())
        .map(Vec::len)
        .unwrap_or(0)
}

/// `Running` while any job spawned by the schedule is active.
pub fn classify_cronjob(cj: &CronJob) -> StatusLabel {
    if active_jobs(cj) > 0 {
        StatusLabel::Running
    } else {
        StatusLabel::Completed
    }
}

pub fn cronjob_view(cj: &CronJob, now: DateTime<Utc>) -> CronJobView {
    let spec = cj.spec.as_ref();

    CronJobView {
        namespace: namespace_of(&cj.metadata),
        name: name_of(&cj.metadata),
        schedule: spec.map(|s| s.schedule.clone()).unwrap_or_default(),
        time_zone: spec.and_then(|s| s.time_zone.clone()),
        suspend: spec.and_then(|s| s.suspend).unwrap_or(false),
        active: active_jobs(cj),
        last_schedule: cj
            .status
            .as_ref()
            .and_then(|s| s.last_schedule_time.as_ref())
            .map(|t| format_age(t.0, now))
            .unwrap_or_else(|| "N/A".to_string()),
        age: age_of(cj.metadata.creation_timestamp.as_ref(), AgeStyle::Compact, now),
    }
}

pub async fn list_cronjobs<C: ClusterApi>(
    cluster: &C,
    scope: &Scope,
    now: DateTime<Utc>,
) -> FetchResult<Vec<CronJobView>> {
    let items = fetch(cluster, scope).await?;
    Ok(items.iter().map(|cj| cronjob_view(cj, now)).collect())
}

pub async fn cronjob_status<C: ClusterApi>(cluster: &C, scope: &Scope) -> FetchResult<StatusTally> {
    let items = fetch(cluster, scope).await?;
    let mut tally = StatusTally::with_buckets(&CRONJOB_BUCKETS);
    for cj in &items {
        tally.record(Some(classify_cronjob(cj)));
    }
    Ok(super::log_tally("cronjobs", scope, tally))
}
