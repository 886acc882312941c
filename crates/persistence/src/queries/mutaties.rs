// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Queue reads.

use diesel::SqliteConnection;
use diesel::prelude::*;

use super::to_bool;
use crate::diesel_schema::mutaties;
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = mutaties)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct MutatieRow {
    mutatie_id: i64,
    competitie_id: Option<i64>,
    kind: String,
    payload_json: String,
    door: String,
    created_at: String,
    is_verwerkt: i32,
    verwerkt_at: Option<String>,
    fout: Option<String>,
}

/// A queued mutation as stored.
///
/// The kind and payload are kept raw so that a row that no longer decodes
/// can still be reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutatieRecord {
    /// Creation-ordered id.
    pub mutatie_id: i64,
    /// The competition it belongs to; `None` for season bootstrap.
    pub competitie_id: Option<i64>,
    /// The stable mutation code.
    pub kind: String,
    /// The JSON payload.
    pub payload_json: String,
    /// Who requested it.
    pub door: String,
    /// When it was queued.
    pub created_at: String,
    /// Whether the worker has processed it.
    pub is_verwerkt: bool,
    /// When the worker processed it.
    pub verwerkt_at: Option<String>,
    /// Why the worker gave up on it. Such a row is never picked up again.
    pub fout: Option<String>,
}

impl From<MutatieRow> for MutatieRecord {
    fn from(row: MutatieRow) -> Self {
        Self {
            mutatie_id: row.mutatie_id,
            competitie_id: row.competitie_id,
            kind: row.kind,
            payload_json: row.payload_json,
            door: row.door,
            created_at: row.created_at,
            is_verwerkt: to_bool(row.is_verwerkt),
            verwerkt_at: row.verwerkt_at,
            fout: row.fout,
        }
    }
}

/// Retrieves a queued mutation.
///
/// # Errors
///
/// Returns `PersistenceError::MutationNotFound` if no such row exists.
pub fn get_mutatie(
    conn: &mut SqliteConnection,
    mutatie_id: i64,
) -> Result<MutatieRecord, PersistenceError> {
    mutaties::table
        .find(mutatie_id)
        .select(MutatieRow::as_select())
        .first(conn)
        .optional()?
        .map(MutatieRecord::from)
        .ok_or(PersistenceError::MutationNotFound(mutatie_id))
}

/// Ids of every unprocessed mutation the worker has not given up on, oldest
/// first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn pending_mutatie_ids(conn: &mut SqliteConnection) -> Result<Vec<i64>, PersistenceError> {
    Ok(mutaties::table
        .filter(mutaties::is_verwerkt.eq(0))
        .filter(mutaties::fout.is_null())
        .order(mutaties::mutatie_id.asc())
        .select(mutaties::mutatie_id)
        .load(conn)?)
}

/// Number of mutations `pending_mutatie_ids` would return.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_pending(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(mutaties::table
        .filter(mutaties::is_verwerkt.eq(0))
        .filter(mutaties::fout.is_null())
        .count()
        .get_result(conn)?)
}

/// Id of the newest row in the queue, processed or not.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn latest_mutatie_id(conn: &mut SqliteConnection) -> Result<Option<i64>, PersistenceError> {
    Ok(mutaties::table
        .select(diesel::dsl::max(mutaties::mutatie_id))
        .first(conn)?)
}
