use chrono::{DateTime, Utc};
use k8s_openapi::api::batch::v1::Job;

use super::{logged, name_of, namespace_of};
use crate::clients::ClusterApi;
use crate::error::FetchResult;
use crate::helpers::{AgeStyle, age_of, format_age};
use crate::models::k8s::{ListOptions, Scope};
use crate::models::views::JobView;
use crate::status::{StatusLabel, StatusTally};

const JOB_BUCKETS: [StatusLabel; 3] = [
    StatusLabel::Running,
    StatusLabel::Failed,
    StatusLabel::Completed,
];

async fn fetch<C: ClusterApi>(cluster: &C, scope: &Scope) -> FetchResult<Vec<Job>> {
    logged("jobs", scope, cluster.list(scope, &ListOptions::default()).await)
}

/// A job without `completions` needs one success.
fn completions(job: &Job) -> i32 {
    job.spec.as_ref().and_then(|s| s.completions).unwrap_or(1)
}

fn succeeded(job: &Job) -> i32 {
    job.status.as_ref().and_then(|s| s.succeeded).unwrap_or(0)
}

/// `Completed` once enough pods succeeded, otherwise `Failed` if any pod
/// failed, otherwise `Running`.
pub fn classify_job(job: &Job) -> StatusLabel {
    let failed = job.status.as_ref().and_then(|s| s.failed).unwrap_or(0);
    if succeeded(job) >= completions(job) {
        StatusLabel::Completed
    } else if failed > 0 {
        StatusLabel::Failed
    } else {
        StatusLabel::Running
    }
}

pub fn job_view(job: &Job, now: DateTime<Utc>) -> JobView {
    let status = job.status.as_ref();
    let age = age_of(job.metadata.creation_timestamp.as_ref(), AgeStyle::Compact, now);
    let started = status.and_then(|s| s.start_time.as_ref());
    let finished = status.and_then(|s| s.completion_time.as_ref());

    JobView {
        namespace: namespace_of(&job.metadata),
        name: name_of(&job.metadata),
        status: classify_job(job),
        completions: format!("{}/{}", succeeded(job), completions(job)),
        duration: match (started, finished) {
            (Some(start), Some(end)) => format_age(start.0, end.0),
            _ => age.clone(),
        },
        age,
    }
}

pub async fn list_jobs<C: ClusterApi>(
    cluster: &C,
    scope: &Scope,
    now: DateTime<Utc>,
) -> FetchResult<Vec<JobView>> {
    let items = fetch(cluster, scope).await?;
    Ok(items.iter().map(|j| job_view(j, now)).collect())
}

pub async fn job_status<C: ClusterApi>(cluster: &C, scope: &Scope) -> FetchResult<StatusTally> {
    let items = fetch(cluster, scope).await?;
    let mut tally = StatusTally::with_buckets(&JOB_BUCKETS);
    for job in &items {
        tally.record(Some(classify_job(job)));
    }
    Ok(super::log_tally("jobs", scope, tally))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fake::FakeCluster;
    use crate::summary::fixtures::{meta, now};
    use chrono::Duration;
    use k8s_openapi::api::batch::v1::{JobSpec, JobStatus};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

    fn job(name: &str, completions: Option<i32>, succeeded: Option<i32>, failed: Option<i32>) -> Job {
        Job {
            metadata: meta("batch", name, Duration::hours(3)),
            spec: Some(JobSpec {
                completions,
                ..Default::default()
            }),
            status: Some(JobStatus {
                succeeded,
                failed,
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_classify_job() {
        assert_eq!(classify_job(&job("a", Some(3), Some(3), None)), StatusLabel::Completed);
        assert_eq!(classify_job(&job("b", Some(3), Some(1), Some(2))), StatusLabel::Failed);
        assert_eq!(classify_job(&job("c", Some(3), Some(1), Some(0))), StatusLabel::Running);
        assert_eq!(classify_job(&job("d", None, Some(1), None)), StatusLabel::Completed);
        assert_eq!(classify_job(&job("e", None, None, None)), StatusLabel::Running);
    }

    #[tokio::test]
    async fn test_job_tally() {
        let cluster = FakeCluster::new().with(vec![
            job("backup", Some(1), Some(1), None),
            job("migrate", Some(1), None, Some(4)),
            job("reindex", Some(5), Some(2), None),
            job("report", Some(1), Some(1), Some(1)),
        ]);

        let tally = job_status(&cluster, &Scope::All).await.unwrap();
        assert_eq!(
            serde_json::to_value(&tally).unwrap(),
            serde_json::json!({"Running": 1, "Failed": 1, "Completed": 2, "Count": 4})
        );
    }

    #[tokio::test]
    async fn test_empty_job_tally_is_zero_filled() {
        let tally = job_status(&FakeCluster::new(), &Scope::All).await.unwrap();
        assert_eq!(
            serde_json::to_value(&tally).unwrap(),
            serde_json::json!({"Running": 0, "Failed": 0, "Completed": 0, "Count": 0})
        );
    }

    #[tokio::test]
    async fn test_job_rows() {
        let mut done = job("backup", Some(1), Some(1), None);
        if let Some(status) = done.status.as_mut() {
            status.start_time = Some(Time(now() - Duration::hours(2)));
            status.completion_time = Some(Time(now() - Duration::hours(2) + Duration::minutes(4)));
        }
        let cluster = FakeCluster::new().with(vec![done, job("reindex", Some(5), Some(2), None)]);

        let rows = list_jobs(&cluster, &Scope::Namespace("batch".to_string()), now())
            .await
            .unwrap();
        assert_eq!(rows[0].completions, "1/1");
        assert_eq!(rows[0].duration, "4m");
        assert_eq!(rows[0].age, "3h");
        assert_eq!(rows[1].completions, "2/5");
        assert_eq!(rows[1].duration, "3h");
        assert_eq!(rows[1].status, StatusLabel::Running);
    }
}
