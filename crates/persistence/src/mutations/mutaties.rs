// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Queue writes. Rows are inserted once, flagged processed or failed once and
//! never deleted.

use diesel::SqliteConnection;
use diesel::prelude::*;
use kampcomp::Mutation;
use time::PrimitiveDateTime;
use tracing::info;

use super::format_stamp;
use crate::backend::PersistenceBackend;
use crate::diesel_schema::mutaties;
use crate::error::PersistenceError;

/// Appends a mutation to the queue.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `mutation` - The mutation to queue
/// * `competitie_id` - The competition it belongs to, used for the lease
/// * `door` - Who requested it
///
/// # Errors
///
/// Returns an error if the payload cannot be encoded or the insert fails.
pub fn enqueue_mutatie(
    conn: &mut SqliteConnection,
    mutation: &Mutation,
    competitie_id: Option<i64>,
    door: &str,
) -> Result<i64, PersistenceError> {
    let payload_json: String = mutation.to_payload()?;

    diesel::insert_into(mutaties::table)
        .values((
            mutaties::competitie_id.eq(competitie_id),
            mutaties::kind.eq(mutation.kind().as_str()),
            mutaties::payload_json.eq(&payload_json),
            mutaties::door.eq(door),
        ))
        .execute(conn)?;

    let mutatie_id: i64 = conn.get_last_insert_rowid()?;
    info!(
        mutatie_id,
        kind = %mutation.kind(),
        competitie_id = ?competitie_id,
        door,
        "Mutation queued"
    );
    Ok(mutatie_id)
}

/// Flags a mutation as processed.
///
/// # Errors
///
/// Returns `PersistenceError::MutationNotFound` if the row is missing or was
/// already processed.
pub fn mark_verwerkt(
    conn: &mut SqliteConnection,
    mutatie_id: i64,
    stamp: PrimitiveDateTime,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(
        mutaties::table
            .filter(mutaties::mutatie_id.eq(mutatie_id))
            .filter(mutaties::is_verwerkt.eq(0)),
    )
    .set((
        mutaties::is_verwerkt.eq(1),
        mutaties::verwerkt_at.eq(Some(format_stamp(stamp)?)),
    ))
    .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::MutationNotFound(mutatie_id));
    }
    Ok(())
}

/// Records why the worker gave up on a mutation.
///
/// The row stays unprocessed for the audit trail but is no longer pending.
///
/// # Errors
///
/// Returns `PersistenceError::MutationNotFound` if the row is missing, was
/// processed, or was already given up on.
pub fn mark_mislukt(
    conn: &mut SqliteConnection,
    mutatie_id: i64,
    reden: &str,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(
        mutaties::table
            .filter(mutaties::mutatie_id.eq(mutatie_id))
            .filter(mutaties::is_verwerkt.eq(0))
            .filter(mutaties::fout.is_null()),
    )
    .set(mutaties::fout.eq(Some(reden)))
    .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::MutationNotFound(mutatie_id));
    }
    info!(mutatie_id, reden, "Mutation given up");
    Ok(())
}
