// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Draining the mutation queue.
//!
//! A drain walks the unprocessed mutations oldest first and applies each one
//! in its own transaction. A worker only touches a competition's mutations
//! while it holds that competition's lease; season bootstrap rows share the
//! global lease. Once a competition is found leased by another worker, its
//! later mutations are left alone too, so per-competition order holds across
//! workers.

use kampcomp::{MutationContext, OverstapPlan, plan_overstap};
use kampcomp_audit::Actor;
use kampcomp_persistence::{
    GLOBAL_LEASE_KEY, MutatieRecord, Persistence, PersistenceError, ProcessOutcome,
    ProcessedMutation,
};
use std::collections::HashSet;
use time::{OffsetDateTime, PrimitiveDateTime};
use tracing::{debug, error, info, warn};

use crate::events::{QueueEvent, QueueEvents};

/// Who drains and what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainOptions {
    /// Lease holder token of this worker.
    pub holder: String,
    /// Lease lifetime.
    pub lease_ttl_secs: i64,
    /// Only drain this competition.
    pub competitie: Option<i64>,
}

/// What one drain did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Mutations applied.
    pub processed: usize,
    /// Mutations that could not be applied. They are not picked up again.
    pub failed: usize,
    /// Mutations left for the worker that holds their competition.
    pub leased_elsewhere: usize,
}

fn utc_stamp(now: OffsetDateTime) -> PrimitiveDateTime {
    let utc: OffsetDateTime = now.to_offset(time::UtcOffset::UTC);
    PrimitiveDateTime::new(utc.date(), utc.time())
}

/// Applies every pending mutation this worker may take.
///
/// Leases taken during the drain are released at the end, also when the
/// drain stops on an error.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `options` - Holder token, lease lifetime and competition filter
/// * `events` - Receives a `Processed` event per applied mutation
/// * `now` - The processing time
///
/// # Errors
///
/// Returns an error when the database fails. Mutations that are unknown,
/// malformed or stale are logged, marked failed and not retried.
pub fn drain(
    persistence: &mut Persistence,
    options: &DrainOptions,
    events: &QueueEvents,
    now: OffsetDateTime,
) -> Result<DrainReport, PersistenceError> {
    let mut held: Vec<i64> = Vec::new();
    let result: Result<DrainReport, PersistenceError> =
        drain_pending(persistence, options, events, now, &mut held);

    for lease_key in held {
        if let Err(err) = persistence.release_lease(lease_key, &options.holder) {
            warn!(lease_key, error = %err, "Failed to release lease");
        }
    }

    result
}

fn drain_pending(
    persistence: &mut Persistence,
    options: &DrainOptions,
    events: &QueueEvents,
    now: OffsetDateTime,
    held: &mut Vec<i64>,
) -> Result<DrainReport, PersistenceError> {
    let stamp: PrimitiveDateTime = utc_stamp(now);
    let mut report: DrainReport = DrainReport::default();
    let mut elders: HashSet<i64> = HashSet::new();

    for mutatie_id in persistence.pending_mutation_ids()? {
        let record: MutatieRecord = persistence.get_mutation(mutatie_id)?;
        if record.is_verwerkt || record.fout.is_some() {
            continue;
        }
        if options.competitie.is_some() && record.competitie_id != options.competitie {
            continue;
        }

        let lease_key: i64 = record.competitie_id.unwrap_or(GLOBAL_LEASE_KEY);
        if elders.contains(&lease_key) {
            report.leased_elsewhere += 1;
            continue;
        }
        if !held.contains(&lease_key) {
            let acquired: bool = persistence.acquire_lease(
                lease_key,
                &options.holder,
                now.unix_timestamp(),
                options.lease_ttl_secs,
            )?;
            if !acquired {
                debug!(lease_key, "Competition is leased by another worker");
                elders.insert(lease_key);
                report.leased_elsewhere += 1;
                continue;
            }
            held.push(lease_key);
        }

        info!(
            mutatie_id,
            kind = %record.kind,
            competitie_id = record.competitie_id,
            "Mutation picked up"
        );

        match persistence.process_mutation(mutatie_id, stamp) {
            Ok(ProcessOutcome::Processed(processed)) => {
                report_processed(&processed, events);
                report.processed += 1;
            }
            Ok(ProcessOutcome::AlreadyProcessed | ProcessOutcome::GivenUp) => {
                debug!(mutatie_id, "Mutation was handled by an earlier drain");
            }
            Err(err) if err.is_stale() => {
                warn!(mutatie_id, kind = %record.kind, error = %err, "Stale mutation skipped");
                persistence.mark_failed(mutatie_id, &err.to_string())?;
                report.failed += 1;
            }
            Err(err @ PersistenceError::Rejected(_)) => {
                error!(mutatie_id, kind = %record.kind, error = %err, "Unknown mutation skipped");
                persistence.mark_failed(mutatie_id, &err.to_string())?;
                report.failed += 1;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(report)
}

fn report_processed(processed: &ProcessedMutation, events: &QueueEvents) {
    for lid_nr in &processed.zonder_vereniging {
        warn!(
            mutatie_id = processed.mutatie_id,
            lid_nr, "Sporter without club skipped for the next tier"
        );
    }

    info!(
        mutatie_id = processed.mutatie_id,
        kind = %processed.kind,
        event_id = processed.event_id,
        "Mutation processed"
    );

    events.broadcast(&QueueEvent::Processed {
        mutatie_id: processed.mutatie_id,
        kind: processed.kind.as_str().to_string(),
        competitie_id: processed.competitie_id,
    });
}

/// Lets frozen clubs follow the sporters' club transfers.
///
/// # Errors
///
/// Returns an error when the database fails; nothing is applied then.
pub fn overstap_sweep(
    persistence: &mut Persistence,
    now: OffsetDateTime,
) -> Result<usize, PersistenceError> {
    let kandidaten = persistence.overstap_kandidaten(now.date())?;
    if kandidaten.is_empty() {
        return Ok(0);
    }

    let ctx: MutationContext = MutationContext::new(None, None, Actor::systeem(), utc_stamp(now));
    let plan: OverstapPlan = plan_overstap(&kandidaten, &ctx);

    for (record_id, besluit) in &plan.overgeslagen {
        debug!(record_id, ?besluit, "Overstap not applied");
    }

    let toegepast: usize = persistence.apply_overstap(&plan)?;
    for actie in &plan.acties {
        info!(
            lid_nr = actie.lid_nr,
            ver_nr = actie.ver_nr,
            niveau = ?actie.niveau,
            "Overstap applied"
        );
    }

    Ok(toegepast)
}
