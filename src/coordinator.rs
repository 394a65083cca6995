//! Concurrent probing of every configured endpoint and ranking of the results
//!
//! One task is spawned per endpoint. A semaphore bounds how many probes are in
//! flight at once, and the run waits for every task before ranking, so a slow
//! or failing probe never cuts its siblings short.

use crate::{
    defaults::MAX_CONCURRENCY_LIMIT,
    logging::{LogLevel, Logger},
    models::Report,
    prober::Prober,
    types::{Endpoint, Headers, ProbeOutcome},
};
use chrono::Utc;
use futures::future::join_all;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Semaphore;

/// Sort outcomes by ascending latency, failures last.
///
/// The sort is stable: equal latencies and failures keep their input order.
pub fn rank(mut outcomes: Vec<ProbeOutcome>) -> Vec<ProbeOutcome> {
    outcomes.sort_by(ProbeOutcome::rank_cmp);
    outcomes
}

/// Fans probes out across endpoints and builds the ranked report
pub struct Coordinator<P: Prober + 'static> {
    prober: Arc<P>,
    max_concurrency: Option<usize>,
    logger: Logger,
}

impl<P: Prober + 'static> Coordinator<P> {
    /// Create a coordinator that runs one worker per endpoint
    pub fn new(prober: P) -> Self {
        Self::from_shared(Arc::new(prober))
    }

    pub fn from_shared(prober: Arc<P>) -> Self {
        let mut logger = Logger::new("COORDINATOR");
        logger.set_level(LogLevel::Warn);
        Self {
            prober,
            max_concurrency: None,
            logger,
        }
    }

    /// Bound the number of probes in flight
    pub fn with_max_concurrency(mut self, limit: Option<usize>) -> Self {
        self.max_concurrency = limit;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Number of workers used for `endpoint_count` endpoints
    pub fn effective_concurrency(&self, endpoint_count: usize) -> usize {
        self.max_concurrency
            .unwrap_or(endpoint_count)
            .min(endpoint_count)
            .min(MAX_CONCURRENCY_LIMIT)
            .max(1)
    }

    /// Probe every endpoint once and return the ranked report.
    ///
    /// Never fails: a probe that errors, times out or panics is recorded as a
    /// failure for its endpoint. The report has one entry per endpoint.
    pub async fn run(&self, endpoints: &[Endpoint], timeout: Duration, headers: &Headers) -> Report {
        let started_at = Utc::now();
        let start = Instant::now();
        let workers = self.effective_concurrency(endpoints.len());

        let correlation_id = self.logger.start_operation("probe_sources").await;
        self.logger
            .debug("Dispatching probes")
            .field("endpoints", endpoints.len())
            .field("workers", workers)
            .field("timeout_ms", timeout.as_millis() as u64)
            .log()
            .await;

        let semaphore = Arc::new(Semaphore::new(workers));
        let headers = Arc::new(headers.clone());

        let handles: Vec<_> = endpoints
            .iter()
            .cloned()
            .map(|endpoint| {
                let prober = Arc::clone(&self.prober);
                let semaphore = Arc::clone(&semaphore);
                let headers = Arc::clone(&headers);

                tokio::spawn(async move {
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        // The semaphore is never closed while tasks are pending
                        Err(_) => return ProbeOutcome::failure(endpoint),
                    };
                    prober.probe(&endpoint, timeout, &headers).await
                })
            })
            .collect();

        let joined = join_all(handles).await;

        let mut outcomes = Vec::with_capacity(endpoints.len());
        for (result, endpoint) in joined.into_iter().zip(endpoints) {
            match result {
                Ok(outcome) => {
                    self.logger
                        .info(&format!("Probed {}", outcome.endpoint.name))
                        .field("success", outcome.is_success())
                        .field("latency_ms", outcome.latency_ms())
                        .log()
                        .await;
                    outcomes.push(outcome);
                }
                Err(join_error) => {
                    self.logger
                        .warn(&format!("Probe task for {} did not complete", endpoint.name))
                        .field("panicked", join_error.is_panic())
                        .log()
                        .await;
                    outcomes.push(ProbeOutcome::failure(endpoint.clone()));
                }
            }
        }

        let entries = rank(outcomes);
        let report = Report::new(entries, start.elapsed(), started_at, Utc::now());

        self.logger
            .end_operation(&correlation_id, "probe_sources", report.recommendation().is_some())
            .await;

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProbeResult;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted behaviour for one endpoint
    #[derive(Clone, Copy)]
    enum Script {
        Succeed { after_ms: u64, latency_ms: u64 },
        Fail { after_ms: u64 },
        Panic,
    }

    /// Prober answering from a script and recording how many probes overlap
    struct ScriptedProber {
        scripts: HashMap<String, Script>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl ScriptedProber {
        fn new(scripts: &[(&str, Script)]) -> Self {
            Self {
                scripts: scripts.iter().map(|(n, s)| (n.to_string(), *s)).collect(),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Prober for ScriptedProber {
        async fn probe(&self, endpoint: &Endpoint, _timeout: Duration, _headers: &Headers) -> ProbeOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            let outcome = match self.scripts[&endpoint.name] {
                Script::Succeed { after_ms, latency_ms } => {
                    tokio::time::sleep(Duration::from_millis(after_ms)).await;
                    ProbeOutcome::success(endpoint.clone(), Duration::from_millis(latency_ms))
                }
                Script::Fail { after_ms } => {
                    tokio::time::sleep(Duration::from_millis(after_ms)).await;
                    ProbeOutcome::failure(endpoint.clone())
                }
                Script::Panic => {
                    self.in_flight.fetch_sub(1, Ordering::SeqCst);
                    panic!("scripted panic for {}", endpoint.name);
                }
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            outcome
        }
    }

    fn endpoints(names: &[&str]) -> Vec<Endpoint> {
        names
            .iter()
            .map(|name| Endpoint::parse(name, &format!("http://{}.example.com", name)).unwrap())
            .collect()
    }

    fn names(report: &Report) -> Vec<&str> {
        report.entries.iter().map(|o| o.endpoint.name.as_str()).collect()
    }

    #[test]
    fn test_rank_orders_successes_then_failures() {
        let eps = endpoints(&["a", "b", "c", "d"]);
        let ranked = rank(vec![
            ProbeOutcome::failure(eps[0].clone()),
            ProbeOutcome::success(eps[1].clone(), Duration::from_millis(30)),
            ProbeOutcome::failure(eps[2].clone()),
            ProbeOutcome::success(eps[3].clone(), Duration::from_millis(10)),
        ]);

        let order: Vec<_> = ranked.iter().map(|o| o.endpoint.name.as_str()).collect();
        assert_eq!(order, vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn test_rank_is_idempotent() {
        let eps = endpoints(&["a", "b", "c"]);
        let once = rank(vec![
            ProbeOutcome::success(eps[0].clone(), Duration::from_millis(7)),
            ProbeOutcome::failure(eps[1].clone()),
            ProbeOutcome::success(eps[2].clone(), Duration::from_millis(7)),
        ]);
        let twice = rank(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_effective_concurrency() {
        let coordinator = Coordinator::new(ScriptedProber::new(&[]));
        assert_eq!(coordinator.effective_concurrency(8), 8);
        assert_eq!(coordinator.effective_concurrency(0), 1);
        assert_eq!(coordinator.effective_concurrency(1000), MAX_CONCURRENCY_LIMIT);

        let bounded = coordinator.with_max_concurrency(Some(3));
        assert_eq!(bounded.effective_concurrency(8), 3);
        assert_eq!(bounded.effective_concurrency(2), 2);
    }

    #[tokio::test]
    async fn test_run_ranks_and_recommends() {
        let prober = ScriptedProber::new(&[
            ("a", Script::Succeed { after_ms: 10, latency_ms: 10 }),
            ("b", Script::Fail { after_ms: 5 }),
            ("c", Script::Fail { after_ms: 40 }),
        ]);
        let coordinator = Coordinator::new(prober);

        let report = coordinator
            .run(&endpoints(&["a", "b", "c"]), Duration::from_secs(1), &Headers::new())
            .await;

        assert_eq!(report.len(), 3);
        assert_eq!(names(&report), vec!["a", "b", "c"]);
        assert_eq!(report.recommendation().unwrap().name, "a");
        assert_eq!(report.success_count(), 1);
    }

    #[tokio::test]
    async fn test_all_failures_give_no_recommendation() {
        let prober = ScriptedProber::new(&[
            ("a", Script::Fail { after_ms: 1 }),
            ("b", Script::Fail { after_ms: 1 }),
        ]);
        let report = Coordinator::new(prober)
            .run(&endpoints(&["a", "b"]), Duration::from_secs(1), &Headers::new())
            .await;

        assert_eq!(report.len(), 2);
        assert!(report.recommendation().is_none());
        assert!(report.entries.iter().all(|o| o.result == ProbeResult::Failure));
    }

    #[tokio::test]
    async fn test_equal_latencies_keep_input_order() {
        let scripts = [
            ("x", Script::Succeed { after_ms: 30, latency_ms: 25 }),
            ("y", Script::Succeed { after_ms: 1, latency_ms: 25 }),
            ("z", Script::Succeed { after_ms: 15, latency_ms: 25 }),
        ];
        let coordinator = Coordinator::new(ScriptedProber::new(&scripts));
        let eps = endpoints(&["x", "y", "z"]);

        for _ in 0..3 {
            let report = coordinator.run(&eps, Duration::from_secs(1), &Headers::new()).await;
            assert_eq!(names(&report), vec!["x", "y", "z"]);
        }
    }

    #[tokio::test]
    async fn test_probes_run_in_parallel() {
        let names_list = ["a", "b", "c", "d", "e", "f"];
        let scripts: Vec<_> = names_list
            .iter()
            .map(|n| (*n, Script::Succeed { after_ms: 100, latency_ms: 1 }))
            .collect();
        let coordinator = Coordinator::new(ScriptedProber::new(&scripts));

        let started = Instant::now();
        let report = coordinator
            .run(&endpoints(&names_list), Duration::from_secs(1), &Headers::new())
            .await;

        assert_eq!(report.success_count(), 6);
        assert_eq!(coordinator.prober.peak.load(Ordering::SeqCst), 6);
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_concurrency_limit_is_respected() {
        let names_list = ["a", "b", "c", "d", "e", "f"];
        let scripts: Vec<_> = names_list
            .iter()
            .map(|n| (*n, Script::Succeed { after_ms: 20, latency_ms: 1 }))
            .collect();
        let coordinator = Coordinator::new(ScriptedProber::new(&scripts)).with_max_concurrency(Some(2));

        let report = coordinator
            .run(&endpoints(&names_list), Duration::from_secs(1), &Headers::new())
            .await;

        assert_eq!(report.len(), 6);
        assert_eq!(coordinator.prober.calls.load(Ordering::SeqCst), 6);
        assert!(coordinator.prober.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_panicking_probe_is_contained() {
        let prober = ScriptedProber::new(&[
            ("ok", Script::Succeed { after_ms: 5, latency_ms: 12 }),
            ("boom", Script::Panic),
        ]);
        let report = Coordinator::new(prober)
            .run(&endpoints(&["boom", "ok"]), Duration::from_secs(1), &Headers::new())
            .await;

        assert_eq!(names(&report), vec!["ok", "boom"]);
        assert!(!report.entries[1].is_success());
    }

    #[tokio::test]
    async fn test_empty_endpoint_list() {
        let report = Coordinator::new(ScriptedProber::new(&[]))
            .run(&[], Duration::from_secs(1), &Headers::new())
            .await;
        assert!(report.is_empty());
        assert!(report.recommendation().is_none());
    }
}
