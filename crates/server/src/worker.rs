// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The queue worker.
//!
//! In quick mode the worker drains once and exits. Otherwise it monitors the
//! queue until its stop time: it drains whenever a ping arrived or a row was
//! added since the last look, and sweeps club transfers when there is nothing
//! to do.

use kampcomp_persistence::{Persistence, PersistenceError};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::{Mutex, broadcast};
use tokio::time::timeout;
use tracing::{debug, info};

use crate::events::{QueueEvent, QueueEvents, wait_for_ping};
use crate::processor::{DrainOptions, DrainReport, drain, overstap_sweep};

/// Run lengths a worker accepts.
pub const DURATIONS: [u16; 10] = [1, 2, 5, 7, 10, 15, 20, 30, 45, 60];

/// Longest wait for a ping between two turns.
const WAIT_SECS: i64 = 3;

/// The worker stops when this little time remains.
const STOP_MARGIN_SECS: i64 = 1;

/// Minimum time between two background overstap sweeps.
const SWEEP_INTERVAL: time::Duration = time::Duration::HOUR;

/// How long and how eagerly the worker runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerOptions {
    /// Run length; minutes, or seconds in quick mode.
    pub duration: u16,
    /// Drain once and exit.
    pub quick: bool,
    /// Repeat each drain until a pass finds nothing to apply.
    pub all: bool,
    /// Stop at this minute of the hour when it comes first.
    pub stop_exactly: Option<u8>,
    /// Lease and filter settings for every drain.
    pub drain: DrainOptions,
}

/// What a worker run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    /// Mutations applied.
    pub processed: usize,
    /// Pings received.
    pub pings: u64,
}

/// Builds a lease holder token unique to this process and moment.
#[must_use]
pub fn holder_token(now: OffsetDateTime) -> String {
    format!("worker-{}-{}", std::process::id(), now.unix_timestamp_nanos())
}

/// Computes when a worker started at `start` has to stop.
///
/// With `stop_exactly` the worker stops at the next occurrence of that minute
/// of the hour, truncated to the whole minute, when that comes before the
/// normal stop time. A minute equal to the start minute is ignored.
#[must_use]
pub fn stop_time(
    start: OffsetDateTime,
    duration: u16,
    quick: bool,
    stop_exactly: Option<u8>,
) -> OffsetDateTime {
    if quick {
        return start + time::Duration::seconds(i64::from(duration));
    }

    let stop: OffsetDateTime = start + time::Duration::minutes(i64::from(duration));
    let Some(minuut) = stop_exactly else {
        return stop;
    };

    let delta: i64 = (i64::from(minuut) - i64::from(start.minute())).rem_euclid(60);
    if delta == 0 {
        return stop;
    }

    let exact: OffsetDateTime = (start + time::Duration::minutes(delta))
        .replace_second(0)
        .and_then(|t| t.replace_nanosecond(0))
        .unwrap_or(stop);
    exact.min(stop)
}

/// A drain is due after a ping or when the newest queue row changed.
///
/// The newest id is compared rather than the pending count: another worker
/// may process one row while a producer adds another.
const fn drain_due(woken: bool, latest: Option<i64>, seen: Option<i64>) -> bool {
    if woken {
        return true;
    }
    match (latest, seen) {
        (Some(latest), Some(seen)) => latest != seen,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

async fn drain_rounds(
    persistence: &Mutex<Persistence>,
    events: &QueueEvents,
    options: &WorkerOptions,
) -> Result<usize, PersistenceError> {
    let mut processed: usize = 0;
    loop {
        let report: DrainReport = {
            let mut guard = persistence.lock().await;
            drain(&mut guard, &options.drain, events, OffsetDateTime::now_utc())?
        };
        processed += report.processed;
        if !options.all || report.processed == 0 {
            return Ok(processed);
        }
    }
}

async fn sweep(persistence: &Mutex<Persistence>) -> Result<(), PersistenceError> {
    let mut guard = persistence.lock().await;
    let toegepast: usize = overstap_sweep(&mut guard, OffsetDateTime::now_utc())?;
    if toegepast > 0 {
        info!(toegepast, "Overstap sweep finished");
    }
    Ok(())
}

/// Runs the worker until its stop time, or once in quick mode.
///
/// # Errors
///
/// Returns an error when the database fails.
pub async fn run(
    persistence: Arc<Mutex<Persistence>>,
    events: Arc<QueueEvents>,
    options: WorkerOptions,
) -> Result<WorkerReport, PersistenceError> {
    let start: OffsetDateTime = OffsetDateTime::now_utc();
    let stop: OffsetDateTime =
        stop_time(start, options.duration, options.quick, options.stop_exactly);
    info!(
        holder = %options.drain.holder,
        quick = options.quick,
        all = options.all,
        %stop,
        "Worker started"
    );

    let mut rx: broadcast::Receiver<QueueEvent> = events.subscribe();
    let mut report: WorkerReport = WorkerReport::default();

    sweep(&persistence).await?;
    let mut last_sweep: OffsetDateTime = start;

    if options.quick {
        report.processed = drain_rounds(&persistence, &events, &options).await?;
        info!(processed = report.processed, "Worker finished");
        return Ok(report);
    }

    let mut woken: bool = true;
    let mut seen: Option<i64> = None;

    loop {
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        let remaining: time::Duration = stop - now;
        if remaining <= time::Duration::seconds(STOP_MARGIN_SECS) {
            break;
        }

        let latest: Option<i64> = persistence.lock().await.latest_mutation_id()?;
        if drain_due(woken, latest, seen) {
            seen = latest;
            report.processed += drain_rounds(&persistence, &events, &options).await?;
        } else if now - last_sweep >= SWEEP_INTERVAL {
            sweep(&persistence).await?;
            last_sweep = now;
        }

        let wait: time::Duration = remaining.min(time::Duration::seconds(WAIT_SECS));
        let wait: std::time::Duration = wait.unsigned_abs();
        woken = matches!(timeout(wait, wait_for_ping(&mut rx)).await, Ok(true));
        if woken {
            report.pings += 1;
        }
    }

    debug!(pings = report.pings, "Worker received pings");
    info!(processed = report.processed, "Worker finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::test_support::{Seed, create_persistence, seed_competitie, seed_deelnemer};
    use kampcomp::Mutation;
    use kampcomp_domain::Deelname;
    use time::macros::datetime;

    fn create_worker_options(quick: bool) -> WorkerOptions {
        WorkerOptions {
            duration: 1,
            quick,
            all: true,
            stop_exactly: None,
            drain: DrainOptions {
                holder: String::from("test-worker"),
                lease_ttl_secs: 60,
                competitie: None,
            },
        }
    }

    #[test]
    fn test_stop_time_counts_minutes() {
        let start: OffsetDateTime = datetime!(2026-01-10 12:05:30 UTC);
        assert_eq!(
            stop_time(start, 10, false, None),
            datetime!(2026-01-10 12:15:30 UTC)
        );
    }

    #[test]
    fn test_stop_time_counts_seconds_in_quick_mode() {
        let start: OffsetDateTime = datetime!(2026-01-10 12:05:30 UTC);
        assert_eq!(
            stop_time(start, 10, true, Some(7)),
            datetime!(2026-01-10 12:05:40 UTC)
        );
    }

    #[test]
    fn test_stop_exactly_truncates_to_the_minute() {
        let start: OffsetDateTime = datetime!(2026-01-10 12:05:30 UTC);
        assert_eq!(
            stop_time(start, 10, false, Some(7)),
            datetime!(2026-01-10 12:07:00 UTC)
        );
    }

    #[test]
    fn test_stop_exactly_wraps_past_the_hour() {
        let start: OffsetDateTime = datetime!(2026-01-10 12:55:30 UTC);
        assert_eq!(
            stop_time(start, 30, false, Some(2)),
            datetime!(2026-01-10 13:02:00 UTC)
        );
    }

    #[test]
    fn test_stop_exactly_after_normal_stop_is_ignored() {
        let start: OffsetDateTime = datetime!(2026-01-10 12:05:30 UTC);
        assert_eq!(
            stop_time(start, 5, false, Some(30)),
            datetime!(2026-01-10 12:10:30 UTC)
        );
    }

    #[test]
    fn test_stop_exactly_at_start_minute_is_ignored() {
        let start: OffsetDateTime = datetime!(2026-01-10 12:05:30 UTC);
        assert_eq!(
            stop_time(start, 5, false, Some(5)),
            datetime!(2026-01-10 12:10:30 UTC)
        );
    }

    #[test]
    fn test_drain_due_when_newest_row_changed() {
        // one row processed elsewhere and one added leaves the pending count equal
        assert!(drain_due(false, Some(8), Some(7)));
        assert!(drain_due(false, Some(1), None));
    }

    #[test]
    fn test_drain_not_due_without_ping_or_new_row() {
        assert!(!drain_due(false, Some(7), Some(7)));
        assert!(!drain_due(false, None, None));
        assert!(drain_due(true, Some(7), Some(7)));
    }

    #[test]
    fn test_holder_token_names_the_process() {
        let token: String = holder_token(datetime!(2026-01-10 12:00 UTC));
        assert!(token.starts_with(&format!("worker-{}-", std::process::id())));
    }

    #[tokio::test]
    async fn test_quick_run_drains_and_exits() {
        let mut persistence: Persistence = create_persistence();
        let seed: Seed = seed_competitie(&mut persistence);
        let deelnemer_id: i64 = seed_deelnemer(
            &mut persistence,
            seed.rk(1),
            seed.klasse(),
            100_001,
            Deelname::Ja,
        );
        persistence
            .enqueue_mutation(
                &Mutation::Afmelden { deelnemer_id },
                Some(seed.competitie_id),
                "RKO 1",
            )
            .unwrap();

        let persistence: Arc<Mutex<Persistence>> = Arc::new(Mutex::new(persistence));
        let events: Arc<QueueEvents> = Arc::new(QueueEvents::new());

        let report: WorkerReport = run(
            Arc::clone(&persistence),
            Arc::clone(&events),
            create_worker_options(true),
        )
        .await
        .unwrap();

        assert_eq!(report.processed, 1);
        assert_eq!(report.pings, 0);
        assert_eq!(persistence.lock().await.count_pending().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_quick_run_with_empty_queue_processes_nothing() {
        let mut persistence: Persistence = create_persistence();
        seed_competitie(&mut persistence);

        let report: WorkerReport = run(
            Arc::new(Mutex::new(persistence)),
            Arc::new(QueueEvents::new()),
            create_worker_options(true),
        )
        .await
        .unwrap();

        assert_eq!(report, WorkerReport::default());
    }
}
