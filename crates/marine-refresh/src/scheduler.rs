//! The refresh scheduler.
//!
//! Runs at most one refresh cycle at a time. A cycle fetches every source
//! concurrently under its own timeout, merges whatever succeeded and
//! commits the result to the cache store.

use futures::future::join_all;
use marine_cache::{CacheStore, StalenessPolicy};
use marine_core::error::FetchError;
use marine_core::traits::SeriesFetcher;
use marine_core::types::{now_epoch, HourlyGrid, TimeWindow, WindowAnchor};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::merger::{MergeDecision, SeriesMerger, SourceResult};

/// Scheduler settings.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// Time between scheduled cycles
    pub interval: Duration,
    /// Per-fetcher timeout
    pub fetch_timeout: Duration,
    /// Forecast horizon in hours
    pub hours: usize,
    pub tz_offset_minutes: i32,
    pub anchor: WindowAnchor,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1800),
            fetch_timeout: Duration::from_secs(30),
            hours: 168,
            tz_offset_minutes: 120,
            anchor: WindowAnchor::NextHour,
        }
    }
}

/// Phase of the cycle in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CycleState {
    Idle = 0,
    Fetching = 1,
    Merging = 2,
    Committing = 3,
}

impl CycleState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => CycleState::Fetching,
            2 => CycleState::Merging,
            3 => CycleState::Committing,
            _ => CycleState::Idle,
        }
    }
}

/// Result of one call to [`RefreshScheduler::run_cycle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A new snapshot is live. `persisted` is false if the disk write failed.
    Committed { fields: usize, persisted: bool },
    /// No source produced a usable field; the previous snapshot stays.
    Retained { failures: usize },
    /// Another cycle was already running.
    Skipped,
}

/// What startup did with the persisted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupAction {
    /// A fresh record was loaded and is being served.
    Seeded { age_seconds: i64 },
    /// The record was missing or stale and a cycle ran.
    Refreshed(CycleOutcome),
}

/// Counters over the scheduler's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshStats {
    pub cycles: u64,
    pub commits: u64,
    pub retained: u64,
    pub skipped: u64,
    pub persistence_failures: u64,
    pub last_commit_at: Option<i64>,
    pub last_failure: Option<String>,
}

/// Clears the in-flight flag however the cycle ends.
struct CycleGuard<'a> {
    scheduler: &'a RefreshScheduler,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.scheduler.set_state(CycleState::Idle);
        self.scheduler.in_flight.store(false, Ordering::Release);
    }
}

/// Drives refresh cycles against a set of fetchers and a cache store.
pub struct RefreshScheduler {
    fetchers: Vec<Arc<dyn SeriesFetcher>>,
    store: Arc<CacheStore>,
    policy: StalenessPolicy,
    config: SchedulerConfig,
    in_flight: AtomicBool,
    state: AtomicU8,
    stats: Mutex<RefreshStats>,
}

impl RefreshScheduler {
    /// Create a scheduler. Fetchers may be given in any order.
    pub fn new(
        fetchers: Vec<Arc<dyn SeriesFetcher>>,
        store: Arc<CacheStore>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            fetchers,
            store,
            policy: StalenessPolicy::new(config.interval),
            config,
            in_flight: AtomicBool::new(false),
            state: AtomicU8::new(CycleState::Idle as u8),
            stats: Mutex::new(RefreshStats::default()),
        }
    }

    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    pub fn policy(&self) -> StalenessPolicy {
        self.policy
    }

    /// Current cycle phase.
    pub fn state(&self) -> CycleState {
        CycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Whether a cycle is running.
    pub fn in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Snapshot of the lifetime counters.
    pub fn stats(&self) -> RefreshStats {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_state(&self, state: CycleState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn record(&self, f: impl FnOnce(&mut RefreshStats)) {
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut stats);
    }

    /// Run one refresh cycle, unless one is already running.
    ///
    /// Never fails: upstream failures are contained within the cycle and
    /// leave the previous snapshot in place.
    pub async fn run_cycle(&self) -> CycleOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Refresh already in flight, skipping");
            self.record(|s| s.skipped += 1);
            return CycleOutcome::Skipped;
        }
        let _guard = CycleGuard { scheduler: self };

        let cycle_id = Uuid::new_v4();
        let span = info_span!("refresh", cycle = %cycle_id);
        let outcome = self.cycle().instrument(span.clone()).await;

        let stats = self.stats();
        span.in_scope(|| {
            info!(
                cycles = stats.cycles,
                commits = stats.commits,
                retained = stats.retained,
                skipped = stats.skipped,
                persistence_failures = stats.persistence_failures,
                "Refresh cycle finished"
            )
        });
        outcome
    }

    async fn cycle(&self) -> CycleOutcome {
        let started = now_epoch();
        let grid = HourlyGrid::anchored(
            started,
            self.config.tz_offset_minutes,
            self.config.hours,
            self.config.anchor,
        );
        info!(origin = grid.origin, hours = grid.hours, "Refresh cycle started");

        self.set_state(CycleState::Fetching);
        let results = self.fetch_all(grid.window()).await;

        self.set_state(CycleState::Merging);
        let previous = self.store.read();
        let decision = SeriesMerger::new(grid).merge(results, previous.as_deref(), now_epoch());

        let last_failure = decision
            .failures()
            .last()
            .map(|f| format!("{}: {}", f.source, f.error));

        let outcome = match decision {
            MergeDecision::KeepPrevious { failures } => {
                warn!(
                    failures = failures.len(),
                    has_previous = previous.is_some(),
                    "No usable data this cycle, keeping previous snapshot"
                );
                CycleOutcome::Retained {
                    failures: failures.len(),
                }
            }
            MergeDecision::Commit { snapshot, failures } => {
                self.set_state(CycleState::Committing);
                let fields = snapshot.field_names().len();
                let fetched_at = snapshot.fetched_at;
                let persisted = self.store.commit(snapshot).await.is_ok();
                info!(fields, failed_sources = failures.len(), persisted, "Snapshot committed");
                self.record(|s| s.last_commit_at = Some(fetched_at));
                CycleOutcome::Committed { fields, persisted }
            }
        };

        self.record(|s| {
            s.cycles += 1;
            match &outcome {
                CycleOutcome::Committed { persisted, .. } => {
                    s.commits += 1;
                    if !persisted {
                        s.persistence_failures += 1;
                    }
                }
                CycleOutcome::Retained { .. } => s.retained += 1,
                CycleOutcome::Skipped => {}
            }
            if last_failure.is_some() {
                s.last_failure = last_failure;
            }
        });
        outcome
    }

    /// Fetch every source concurrently, each under the fetch timeout.
    ///
    /// Each fetch runs in its own task so a panicking fetcher only fails
    /// its own source.
    async fn fetch_all(&self, window: TimeWindow) -> Vec<SourceResult> {
        let timeout = self.config.fetch_timeout;
        let handles: Vec<_> = self
            .fetchers
            .iter()
            .map(|fetcher| {
                let fetcher = Arc::clone(fetcher);
                let source = fetcher.source();
                let handle = tokio::spawn(async move {
                    match tokio::time::timeout(timeout, fetcher.fetch(&window)).await {
                        Ok(result) => result,
                        Err(_) => Err(FetchError::Timeout(timeout)),
                    }
                });
                (source, handle)
            })
            .collect();

        let (sources, handles): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
        join_all(handles)
            .await
            .into_iter()
            .zip(sources)
            .map(|(joined, source)| {
                let outcome = joined.unwrap_or_else(|e| {
                    error!(%source, error = %e, "Fetcher task failed");
                    Err(FetchError::Failure(format!("fetcher task failed: {e}")))
                });
                SourceResult { source, outcome }
            })
            .collect()
    }

    /// Load the persisted record and refresh if it is missing or stale.
    pub async fn startup(&self) -> StartupAction {
        self.store.remove_stale_temps();
        match self.store.load_from_disk() {
            Some(snapshot) => {
                let age = self.policy.age(snapshot.fetched_at, now_epoch());
                self.store.seed(snapshot);
                if self.policy.needs_refresh(Some(age)) {
                    info!(age_seconds = age, "Cached snapshot is stale, refreshing");
                    StartupAction::Refreshed(self.run_cycle().await)
                } else {
                    info!(age_seconds = age, "Serving cached snapshot");
                    StartupAction::Seeded { age_seconds: age }
                }
            }
            None => {
                info!("Cold start, running first refresh");
                StartupAction::Refreshed(self.run_cycle().await)
            }
        }
    }

    /// Run startup, then fire a cycle every interval until the task is aborted.
    ///
    /// After seeding a fresh record, the first cycle fires when that record
    /// reaches the interval age. Missed ticks are skipped.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let interval = self.config.interval;
            let first = match self.startup().await {
                StartupAction::Seeded { age_seconds } => {
                    interval.saturating_sub(Duration::from_secs(age_seconds.max(0) as u64))
                }
                StartupAction::Refreshed(_) => interval,
            };

            let mut ticker = interval_at(Instant::now() + first, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let scheduler = Arc::clone(&self);
                tokio::spawn(async move {
                    scheduler.run_cycle().await;
                });
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use marine_core::types::{CacheRecord, FieldKind, HourlyField, RawSeries, Snapshot, Source};
    use std::sync::atomic::AtomicUsize;

    /// Returns a constant value for every hour of the window.
    struct ConstFetcher {
        source: Source,
        field: HourlyField,
        value: f64,
        delay: Duration,
        calls: Arc<AtomicUsize>,
    }

    impl ConstFetcher {
        fn new(source: Source, field: HourlyField, value: f64) -> Self {
            Self {
                source,
                field,
                value,
                delay: Duration::ZERO,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    #[async_trait]
    impl SeriesFetcher for ConstFetcher {
        async fn fetch(&self, window: &TimeWindow) -> Result<RawSeries, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let epochs = window.hourly_epochs();
            let values = vec![Some(self.value); epochs.len()];
            Ok(RawSeries::new(self.source, epochs).with_field(
                FieldKind::Hourly(self.field),
                self.field.canonical_unit(),
                values,
            ))
        }

        fn source(&self) -> Source {
            self.source
        }

        fn name(&self) -> &str {
            "const"
        }
    }

    struct FailingFetcher(Source);

    #[async_trait]
    impl SeriesFetcher for FailingFetcher {
        async fn fetch(&self, _window: &TimeWindow) -> Result<RawSeries, FetchError> {
            Err(FetchError::Failure("HTTP 503".into()))
        }

        fn source(&self) -> Source {
            self.0
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct PanickingFetcher;

    #[async_trait]
    impl SeriesFetcher for PanickingFetcher {
        async fn fetch(&self, _window: &TimeWindow) -> Result<RawSeries, FetchError> {
            panic!("malformed upstream payload");
        }

        fn source(&self) -> Source {
            Source::Marine
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    fn config() -> SchedulerConfig {
        SchedulerConfig {
            hours: 48,
            ..SchedulerConfig::default()
        }
    }

    fn scheduler(
        dir: &tempfile::TempDir,
        fetchers: Vec<Arc<dyn SeriesFetcher>>,
    ) -> Arc<RefreshScheduler> {
        let store = Arc::new(CacheStore::new(dir.path().join("cache.json")));
        Arc::new(RefreshScheduler::new(fetchers, store, config()))
    }

    fn wind(value: f64) -> Arc<dyn SeriesFetcher> {
        Arc::new(ConstFetcher::new(Source::Weather, HourlyField::Wind, value))
    }

    fn persisted_snapshot(path: &std::path::Path, fetched_at: i64) -> Snapshot {
        let grid = HourlyGrid::anchored(fetched_at, 120, 48, WindowAnchor::NextHour);
        let mut snapshot = Snapshot::new(&grid, fetched_at);
        snapshot.hourly_series.insert(HourlyField::Wind, vec![7; 48]);
        std::fs::write(path, serde_json::to_vec(&CacheRecord::new(snapshot.clone())).unwrap())
            .unwrap();
        snapshot
    }

    #[tokio::test]
    async fn test_cycle_commits_all_sources() {
        let dir = tempfile::tempdir().unwrap();
        let s = scheduler(
            &dir,
            vec![
                wind(12.4),
                Arc::new(ConstFetcher::new(Source::Marine, HourlyField::SeaTemp, 24.6)),
                Arc::new(ConstFetcher::new(Source::Tide, HourlyField::Tide, 55.0)),
            ],
        );

        let outcome = s.run_cycle().await;
        assert_eq!(outcome, CycleOutcome::Committed { fields: 3, persisted: true });

        let snapshot = s.store().read().unwrap();
        assert_eq!(snapshot.hours, 48);
        assert_eq!(snapshot.hourly(HourlyField::Wind).unwrap(), &[12; 48][..]);
        assert_eq!(snapshot.hourly(HourlyField::SeaTemp).unwrap()[0], 25);
        assert_eq!(s.state(), CycleState::Idle);
        assert!(!s.in_flight());
        assert_eq!(s.stats().commits, 1);
    }

    #[tokio::test]
    async fn test_one_failed_source_omits_its_fields() {
        let dir = tempfile::tempdir().unwrap();
        let s = scheduler(
            &dir,
            vec![
                wind(10.0),
                Arc::new(FailingFetcher(Source::Marine)),
                Arc::new(ConstFetcher::new(Source::Tide, HourlyField::Tide, 40.0)),
            ],
        );

        assert_eq!(s.run_cycle().await, CycleOutcome::Committed { fields: 2, persisted: true });
        let snapshot = s.store().read().unwrap();
        assert!(snapshot.hourly(HourlyField::SeaTemp).is_none());
        assert!(snapshot.hourly(HourlyField::Tide).is_some());
        assert_eq!(s.stats().last_failure.as_deref(), Some("marine: upstream failure: HTTP 503"));
    }

    #[tokio::test]
    async fn test_all_failed_retains_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(CacheStore::new(dir.path().join("cache.json")));

        let good = RefreshScheduler::new(vec![wind(9.0)], Arc::clone(&store), config());
        good.run_cycle().await;
        let before = store.read().unwrap();
        let on_disk = std::fs::read(store.path()).unwrap();

        let failing = RefreshScheduler::new(
            vec![
                Arc::new(FailingFetcher(Source::Weather)),
                Arc::new(FailingFetcher(Source::Marine)),
                Arc::new(FailingFetcher(Source::Tide)),
            ],
            Arc::clone(&store),
            config(),
        );
        assert_eq!(failing.run_cycle().await, CycleOutcome::Retained { failures: 3 });

        let after = store.read().unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(std::fs::read(store.path()).unwrap(), on_disk);

        let policy = failing.policy();
        let age_now = policy.health(Some(&after), after.fetched_at + 60).cache_age_seconds;
        let age_later = policy.health(Some(&after), after.fetched_at + 3600);
        assert!(age_later.cache_age_seconds > age_now);
        assert!(age_later.needs_refresh);
        assert_eq!(failing.stats().retained, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_cycles_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let slow = ConstFetcher::new(Source::Weather, HourlyField::Wind, 8.0)
            .with_delay(Duration::from_secs(5));
        let calls = Arc::clone(&slow.calls);
        let s = scheduler(&dir, vec![Arc::new(slow)]);

        let first = tokio::spawn({
            let s = Arc::clone(&s);
            async move { s.run_cycle().await }
        });
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(s.in_flight());
        assert_eq!(s.state(), CycleState::Fetching);
        assert_eq!(s.run_cycle().await, CycleOutcome::Skipped);

        let outcome = first.await.unwrap();
        assert!(matches!(outcome, CycleOutcome::Committed { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = s.stats();
        assert_eq!(stats.cycles, 1);
        assert_eq!(stats.skipped, 1);
        assert!(!s.in_flight());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_source_times_out_alone() {
        let dir = tempfile::tempdir().unwrap();
        let slow = ConstFetcher::new(Source::Marine, HourlyField::SeaTemp, 24.0)
            .with_delay(Duration::from_secs(120));
        let s = scheduler(&dir, vec![wind(11.0), Arc::new(slow)]);

        assert_eq!(s.run_cycle().await, CycleOutcome::Committed { fields: 1, persisted: true });
        assert!(s.store().read().unwrap().hourly(HourlyField::SeaTemp).is_none());
        assert_eq!(s.stats().last_failure.as_deref(), Some("marine: timed out after 30s"));
    }

    #[tokio::test]
    async fn test_panicking_fetcher_is_contained() {
        let dir = tempfile::tempdir().unwrap();
        let s = scheduler(&dir, vec![wind(6.0), Arc::new(PanickingFetcher)]);

        assert_eq!(s.run_cycle().await, CycleOutcome::Committed { fields: 1, persisted: true });
        assert!(!s.in_flight());

        // The flag was cleared, so the next cycle runs.
        assert!(matches!(s.run_cycle().await, CycleOutcome::Committed { .. }));
    }

    #[tokio::test]
    async fn test_persistence_failure_still_serves_new_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let store = Arc::new(CacheStore::new(blocker.join("cache.json")));
        let s = RefreshScheduler::new(vec![wind(13.0)], Arc::clone(&store), config());

        assert_eq!(s.run_cycle().await, CycleOutcome::Committed { fields: 1, persisted: false });
        assert_eq!(store.read().unwrap().hourly(HourlyField::Wind).unwrap()[0], 13);
        assert_eq!(s.stats().persistence_failures, 1);
    }

    #[tokio::test]
    async fn test_startup_cold_refreshes() {
        let dir = tempfile::tempdir().unwrap();
        let s = scheduler(&dir, vec![wind(10.0)]);

        assert!(!s.store().has_data());
        let action = s.startup().await;
        assert_eq!(
            action,
            StartupAction::Refreshed(CycleOutcome::Committed { fields: 1, persisted: true })
        );
        assert!(s.store().has_data());
        assert!(dir.path().join("cache.json").exists());
    }

    #[tokio::test]
    async fn test_startup_serves_fresh_record_without_fetching() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = persisted_snapshot(&dir.path().join("cache.json"), now_epoch() - 600);

        let fetcher = ConstFetcher::new(Source::Weather, HourlyField::Wind, 30.0);
        let calls = Arc::clone(&fetcher.calls);
        let s = scheduler(&dir, vec![Arc::new(fetcher)]);

        match s.startup().await {
            StartupAction::Seeded { age_seconds } => assert!((600..700).contains(&age_seconds)),
            other => panic!("expected seeded, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(*s.store().read().unwrap(), snapshot);
    }

    #[tokio::test]
    async fn test_startup_clears_interrupted_writes() {
        let dir = tempfile::tempdir().unwrap();
        persisted_snapshot(&dir.path().join("cache.json"), now_epoch() - 600);
        let partial = dir.path().join(".cache.json.tmp.999999999.3");
        std::fs::write(&partial, b"{\"schema").unwrap();

        let s = scheduler(&dir, vec![wind(10.0)]);
        assert!(matches!(s.startup().await, StartupAction::Seeded { .. }));
        assert!(!partial.exists());
    }

    #[tokio::test]
    async fn test_startup_refreshes_stale_record() {
        let dir = tempfile::tempdir().unwrap();
        persisted_snapshot(&dir.path().join("cache.json"), now_epoch() - 7200);
        let s = scheduler(&dir, vec![wind(30.0)]);

        let action = s.startup().await;
        assert!(matches!(action, StartupAction::Refreshed(CycleOutcome::Committed { .. })));
        assert_eq!(s.store().read().unwrap().hourly(HourlyField::Wind).unwrap()[0], 30);
    }

    #[tokio::test]
    async fn test_stale_record_still_served_when_refresh_fails() {
        let dir = tempfile::tempdir().unwrap();
        let stale = persisted_snapshot(&dir.path().join("cache.json"), now_epoch() - 7200);
        let s = scheduler(&dir, vec![Arc::new(FailingFetcher(Source::Weather))]);

        let action = s.startup().await;
        assert_eq!(action, StartupAction::Refreshed(CycleOutcome::Retained { failures: 1 }));
        assert_eq!(*s.store().read().unwrap(), stale);
    }

    #[tokio::test(start_paused = true)]
    async fn test_health_reports_warming_up_during_first_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let slow = ConstFetcher::new(Source::Weather, HourlyField::Wind, 8.0)
            .with_delay(Duration::from_secs(5));
        let s = scheduler(&dir, vec![Arc::new(slow)]);

        let startup = tokio::spawn({
            let s = Arc::clone(&s);
            async move { s.startup().await }
        });
        tokio::time::sleep(Duration::from_secs(1)).await;

        let report = s.policy().health(s.store().read().as_deref(), now_epoch());
        assert!(!report.has_data);
        assert!(report.needs_refresh);

        startup.await.unwrap();
        let report = s.policy().health(s.store().read().as_deref(), now_epoch());
        assert!(report.has_data);
        assert!(report.cache_age_seconds.unwrap() < 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_loop_fires_on_interval() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = ConstFetcher::new(Source::Weather, HourlyField::Wind, 5.0);
        let calls = Arc::clone(&fetcher.calls);
        let s = scheduler(&dir, vec![Arc::new(fetcher)]);

        let handle = Arc::clone(&s).spawn();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(1800)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        handle.abort();
    }
}
