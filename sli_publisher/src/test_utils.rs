use crate::report::{PublishReport, SkipReason, SliOutcome, SliStatus};
use chrono::Utc;

pub fn sample_report() -> PublishReport {
    let now = Utc::now();
    PublishReport {
        run_id: "run-1".to_string(),
        namespace: "prod/sli".to_string(),
        prefix: "prod".to_string(),
        started_at: now,
        finished_at: now + chrono::Duration::milliseconds(250),
        outcomes: vec![
            SliOutcome {
                sli: "availability".to_string(),
                status: SliStatus::Published {
                    metric_name: "prod-availability".to_string(),
                    value: 0.95,
                },
            },
            SliOutcome {
                sli: "quiet".to_string(),
                status: SliStatus::Skipped {
                    reason: SkipReason::NoData,
                },
            },
            SliOutcome {
                sli: "broken".to_string(),
                status: SliStatus::Skipped {
                    reason: SkipReason::QueryFailed("throttled".to_string()),
                },
            },
        ],
    }
}
