// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-competition worker leases.
//!
//! A lease row names the worker allowed to process one competition's
//! mutations until `expires_at` (unix seconds). Key 0 covers mutations that
//! belong to no competition.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::{debug, info};

use crate::diesel_schema::worker_leases;
use crate::error::PersistenceError;

/// Lease key for mutations without a competition.
pub const GLOBAL_LEASE_KEY: i64 = 0;

/// Takes or renews a lease.
///
/// Succeeds when the lease is free, already held by `holder`, or expired.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `lease_key` - The competition id, or `GLOBAL_LEASE_KEY`
/// * `holder` - The worker's token
/// * `now` - Current unix time in seconds
/// * `ttl_secs` - Lease lifetime
///
/// # Errors
///
/// Returns an error if the database cannot be read or written.
pub fn acquire_lease(
    conn: &mut SqliteConnection,
    lease_key: i64,
    holder: &str,
    now: i64,
    ttl_secs: i64,
) -> Result<bool, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let current: Option<(String, i64)> = worker_leases::table
            .find(lease_key)
            .select((worker_leases::holder, worker_leases::expires_at))
            .first(conn)
            .optional()?;

        let expires_at: i64 = now.saturating_add(ttl_secs);
        match current {
            None => {
                diesel::insert_into(worker_leases::table)
                    .values((
                        worker_leases::lease_key.eq(lease_key),
                        worker_leases::holder.eq(holder),
                        worker_leases::expires_at.eq(expires_at),
                    ))
                    .execute(conn)?;
                debug!(lease_key, holder, "Lease acquired");
                Ok(true)
            }
            Some((current_holder, current_expiry))
                if current_holder == holder || current_expiry <= now =>
            {
                if current_holder != holder {
                    info!(
                        lease_key,
                        holder,
                        previous = %current_holder,
                        "Taking over expired lease"
                    );
                }
                diesel::update(worker_leases::table.find(lease_key))
                    .set((
                        worker_leases::holder.eq(holder),
                        worker_leases::expires_at.eq(expires_at),
                    ))
                    .execute(conn)?;
                Ok(true)
            }
            Some(_) => Ok(false),
        }
    })
}

/// Releases a lease held by `holder`. A lease held by someone else is left alone.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn release_lease(
    conn: &mut SqliteConnection,
    lease_key: i64,
    holder: &str,
) -> Result<(), PersistenceError> {
    diesel::delete(
        worker_leases::table
            .filter(worker_leases::lease_key.eq(lease_key))
            .filter(worker_leases::holder.eq(holder)),
    )
    .execute(conn)?;
    debug!(lease_key, holder, "Lease released");
    Ok(())
}
