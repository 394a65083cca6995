//! Ranked report produced by one coordinator run

use crate::types::{Endpoint, ProbeOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ranked outcomes of one run.
///
/// Entries are ordered by ascending latency with every failure after every
/// success. The report holds exactly one entry per probed endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub entries: Vec<ProbeOutcome>,
    /// Wall-clock time from dispatch to the last probe finishing
    pub total_duration: Duration,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl Report {
    /// Wrap already ranked entries
    pub fn new(
        entries: Vec<ProbeOutcome>,
        total_duration: Duration,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            entries,
            total_duration,
            started_at,
            completed_at,
        }
    }

    /// The endpoint of the first successful entry, if any
    pub fn recommendation(&self) -> Option<&Endpoint> {
        self.best().map(|outcome| &outcome.endpoint)
    }

    /// The first successful entry, if any
    pub fn best(&self) -> Option<&ProbeOutcome> {
        self.entries.first().filter(|outcome| outcome.is_success())
    }

    pub fn success_count(&self) -> usize {
        self.entries.iter().filter(|o| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.entries.len() - self.success_count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.entries.is_empty() {
            0.0
        } else {
            self.success_count() as f64 / self.entries.len() as f64 * 100.0
        }
    }
}

/// Serializable view of a report for JSON output
#[derive(Debug, Serialize)]
pub struct ReportSummary<'a> {
    pub entries: &'a [ProbeOutcome],
    pub recommendation: Option<&'a Endpoint>,
    pub success_count: usize,
    pub failure_count: usize,
    pub total_duration_ms: f64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl<'a> From<&'a Report> for ReportSummary<'a> {
    fn from(report: &'a Report) -> Self {
        Self {
            entries: &report.entries,
            recommendation: report.recommendation(),
            success_count: report.success_count(),
            failure_count: report.failure_count(),
            total_duration_ms: report.total_duration.as_secs_f64() * 1000.0,
            started_at: report.started_at,
            completed_at: report.completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(name: &str) -> Endpoint {
        Endpoint::parse(name, &format!("http://{}.example.com", name)).unwrap()
    }

    fn report(entries: Vec<ProbeOutcome>) -> Report {
        let now = Utc::now();
        Report::new(entries, Duration::from_millis(20), now, now)
    }

    #[test]
    fn test_recommendation_is_first_success() {
        let report = report(vec![
            ProbeOutcome::success(endpoint("fast"), Duration::from_millis(5)),
            ProbeOutcome::success(endpoint("slow"), Duration::from_millis(50)),
            ProbeOutcome::failure(endpoint("down")),
        ]);

        assert_eq!(report.recommendation().unwrap().name, "fast");
        assert_eq!(report.success_count(), 2);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.len(), 3);
    }

    #[test]
    fn test_no_recommendation_when_everything_failed() {
        let report = report(vec![
            ProbeOutcome::failure(endpoint("a")),
            ProbeOutcome::failure(endpoint("b")),
        ]);

        assert!(report.recommendation().is_none());
        assert_eq!(report.success_count(), 0);
        assert_eq!(report.success_rate(), 0.0);
    }

    #[test]
    fn test_empty_report() {
        let report = report(Vec::new());
        assert!(report.is_empty());
        assert!(report.recommendation().is_none());
        assert_eq!(report.success_rate(), 0.0);
    }

    #[test]
    fn test_summary_serialization() {
        let report = report(vec![
            ProbeOutcome::success(endpoint("fast"), Duration::from_millis(5)),
            ProbeOutcome::failure(endpoint("down")),
        ]);

        let json = serde_json::to_value(ReportSummary::from(&report)).unwrap();
        assert_eq!(json["recommendation"]["name"], "fast");
        assert_eq!(json["success_count"], 1);
        assert_eq!(json["failure_count"], 1);
        assert_eq!(json["entries"][1]["result"]["status"], "failure");
        assert_eq!(json["total_duration_ms"], 20.0);
    }
}
