// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event reads.

use diesel::SqliteConnection;
use diesel::prelude::*;
use kampcomp_audit::{Action, Actor, AuditEvent, StateSnapshot};

use crate::data_models::{StoredAction, StoredSnapshot};
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = audit_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct AuditEventRow {
    event_id: i64,
    mutatie_id: Option<i64>,
    competitie_id: Option<i64>,
    door: String,
    action_json: String,
    before_snapshot_json: String,
    after_snapshot_json: String,
}

impl AuditEventRow {
    fn into_event(self) -> Result<(i64, AuditEvent), PersistenceError> {
        let action: StoredAction = serde_json::from_str(&self.action_json)?;
        let before: StoredSnapshot = serde_json::from_str(&self.before_snapshot_json)?;
        let after: StoredSnapshot = serde_json::from_str(&self.after_snapshot_json)?;

        Ok((
            self.event_id,
            AuditEvent::new(
                self.mutatie_id,
                self.competitie_id,
                Actor::new(self.door),
                Action::new(action.code, action.details),
                StateSnapshot::new(before.samenvatting),
                StateSnapshot::new(after.samenvatting),
            ),
        ))
    }
}

/// Retrieves an audit event by ID.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the event does not exist, or an
/// error if it cannot be deserialized.
pub fn get_audit_event(
    conn: &mut SqliteConnection,
    event_id: i64,
) -> Result<AuditEvent, PersistenceError> {
    let (_, event): (i64, AuditEvent) = audit_events::table
        .find(event_id)
        .select(AuditEventRow::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("audit event {event_id}")))?
        .into_event()?;
    Ok(event)
}

/// Retrieves the audit event written for a processed mutation.
///
/// # Errors
///
/// Returns an error if the query fails or the event cannot be deserialized.
pub fn audit_event_for_mutatie(
    conn: &mut SqliteConnection,
    mutatie_id: i64,
) -> Result<Option<AuditEvent>, PersistenceError> {
    audit_events::table
        .filter(audit_events::mutatie_id.eq(mutatie_id))
        .order(audit_events::event_id.desc())
        .select(AuditEventRow::as_select())
        .first(conn)
        .optional()?
        .map(|row| row.into_event().map(|(_, event)| event))
        .transpose()
}

/// Lists the audit events of a competition in the order they were written.
///
/// # Errors
///
/// Returns an error if the query fails or an event cannot be deserialized.
pub fn audit_events_for_competitie(
    conn: &mut SqliteConnection,
    competitie_id: i64,
) -> Result<Vec<(i64, AuditEvent)>, PersistenceError> {
    audit_events::table
        .filter(audit_events::competitie_id.eq(competitie_id))
        .order(audit_events::event_id.asc())
        .select(AuditEventRow::as_select())
        .load(conn)?
        .into_iter()
        .map(AuditEventRow::into_event)
        .collect()
}
