// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the archery competition core.
//!
//! Built on Diesel with the `SQLite` backend. The crate stores competitions,
//! their tiers and classes, championship entries and class limits, and the
//! durable mutation queue with its worker leases and audit trail.
//!
//! ## Processing model
//!
//! Request handlers only append rows to the queue. The worker calls
//! [`Persistence::process_mutation`], which re-reads the row and its target
//! state, applies the mutation with the pure functions of the core crate and
//! writes every result in the same transaction that flags the row processed.
//!
//! ## Testing
//!
//! `Persistence::new_in_memory()` gives every caller its own shared-cache
//! in-memory database, so tests never see each other's rows.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use kampcomp::{CompetitieOpzet, KlasseState, Mutation, OverstapKandidaat, OverstapPlan};
use kampcomp_audit::AuditEvent;
use kampcomp_domain::{
    Club, Competitie, IndivKlasse, Kampioenschap, NieuweDeelnemer, RegioInschrijving, RkUitslag,
    Tijdlijn,
};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::{Date, PrimitiveDateTime};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;
pub use mutations::leases::GLOBAL_LEASE_KEY;
pub use mutations::process::{ProcessOutcome, ProcessedMutation};
pub use mutations::referentie::NieuweInschrijving;
pub use queries::deelnemers::DeelnemerRecord;
pub use queries::mutaties::MutatieRecord;

use backend::PersistenceBackend;

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter over one `SQLite` connection.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Creates a persistence adapter with a fresh in-memory database.
    ///
    /// Each call receives its own database, named from an atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String =
            format!("file:memdb_kampcomp_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Creates a persistence adapter over a database file.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        self.conn.verify_foreign_key_enforcement()
    }

    // ========================================================================
    // Mutation queue
    // ========================================================================

    /// Appends a mutation to the queue.
    ///
    /// # Arguments
    ///
    /// * `mutation` - The mutation to queue
    /// * `competitie_id` - The competition it belongs to; `None` for season bootstrap
    /// * `door` - Who requested it
    ///
    /// # Errors
    ///
    /// Returns an error if the competition does not exist or the insert fails.
    pub fn enqueue_mutation(
        &mut self,
        mutation: &Mutation,
        competitie_id: Option<i64>,
        door: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::mutaties::enqueue_mutatie(&mut self.conn, mutation, competitie_id, door)
    }

    /// Retrieves a queued mutation.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::MutationNotFound` if no such row exists.
    pub fn get_mutation(&mut self, mutatie_id: i64) -> Result<MutatieRecord, PersistenceError> {
        queries::mutaties::get_mutatie(&mut self.conn, mutatie_id)
    }

    /// Returns whether a queued mutation has been processed.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::MutationNotFound` if no such row exists.
    pub fn is_processed(&mut self, mutatie_id: i64) -> Result<bool, PersistenceError> {
        Ok(self.get_mutation(mutatie_id)?.is_verwerkt)
    }

    /// Ids of every unprocessed mutation, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn pending_mutation_ids(&mut self) -> Result<Vec<i64>, PersistenceError> {
        queries::mutaties::pending_mutatie_ids(&mut self.conn)
    }

    /// Number of unprocessed mutations the worker has not given up on.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_pending(&mut self) -> Result<i64, PersistenceError> {
        queries::mutaties::count_pending(&mut self.conn)
    }

    /// Id of the newest queued mutation; `None` for an empty queue.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn latest_mutation_id(&mut self) -> Result<Option<i64>, PersistenceError> {
        queries::mutaties::latest_mutatie_id(&mut self.conn)
    }

    /// Takes a mutation out of the queue without applying it.
    ///
    /// # Arguments
    ///
    /// * `mutatie_id` - The queue row
    /// * `reden` - Why it could not be applied
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::MutationNotFound` if the row is not pending.
    pub fn mark_failed(&mut self, mutatie_id: i64, reden: &str) -> Result<(), PersistenceError> {
        mutations::mutaties::mark_mislukt(&mut self.conn, mutatie_id, reden)
    }

    /// Applies one queued mutation in a single transaction.
    ///
    /// # Arguments
    ///
    /// * `mutatie_id` - The queue row
    /// * `stamp` - The processing time (UTC)
    ///
    /// # Errors
    ///
    /// Returns an error if the row is unknown, does not decode, names state
    /// that no longer exists, or a write fails. Nothing is written then and
    /// the row stays queued.
    pub fn process_mutation(
        &mut self,
        mutatie_id: i64,
        stamp: PrimitiveDateTime,
    ) -> Result<ProcessOutcome, PersistenceError> {
        mutations::process::process_mutation(&mut self.conn, mutatie_id, stamp)
    }

    // ========================================================================
    // Worker leases
    // ========================================================================

    /// Takes or renews the lease on a competition's mutations.
    ///
    /// # Arguments
    ///
    /// * `lease_key` - The competition id, or `GLOBAL_LEASE_KEY`
    /// * `holder` - The worker's token
    /// * `now` - Current unix time in seconds
    /// * `ttl_secs` - Lease lifetime
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read or written.
    pub fn acquire_lease(
        &mut self,
        lease_key: i64,
        holder: &str,
        now: i64,
        ttl_secs: i64,
    ) -> Result<bool, PersistenceError> {
        mutations::leases::acquire_lease(&mut self.conn, lease_key, holder, now, ttl_secs)
    }

    /// Releases a lease held by `holder`.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn release_lease(&mut self, lease_key: i64, holder: &str) -> Result<(), PersistenceError> {
        mutations::leases::release_lease(&mut self.conn, lease_key, holder)
    }

    // ========================================================================
    // Competitions
    // ========================================================================

    /// Creates a competition with its classes and tiers directly, outside
    /// the queue. Used for seeding and imports.
    ///
    /// # Errors
    ///
    /// Returns an error if the season already has this distance or an insert fails.
    pub fn create_competitie(&mut self, opzet: &CompetitieOpzet) -> Result<i64, PersistenceError> {
        self.conn
            .immediate_transaction(|conn| mutations::competitie::create_competitie(conn, opzet))
    }

    /// Retrieves a competition.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the competition does not exist.
    pub fn get_competitie(&mut self, competitie_id: i64) -> Result<Competitie, PersistenceError> {
        queries::competitie::get_competitie(&mut self.conn, competitie_id)
    }

    /// Lists every competition, newest season first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_competities(&mut self) -> Result<Vec<Competitie>, PersistenceError> {
        queries::competitie::list_competities(&mut self.conn)
    }

    /// Stores a competition's calendar, e.g. after forcing its phases.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the competition does not exist.
    pub fn update_tijdlijn(
        &mut self,
        competitie_id: i64,
        tijdlijn: &Tijdlijn,
    ) -> Result<(), PersistenceError> {
        mutations::competitie::update_tijdlijn(&mut self.conn, competitie_id, tijdlijn)
    }

    /// Lists the individual classes of a competition in volgorde order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_indiv_klassen(
        &mut self,
        competitie_id: i64,
    ) -> Result<Vec<IndivKlasse>, PersistenceError> {
        queries::competitie::list_indiv_klassen(&mut self.conn, competitie_id)
    }

    /// Returns the competition a class belongs to.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the class does not exist.
    pub fn indiv_klasse_competitie(
        &mut self,
        indiv_klasse_id: i64,
    ) -> Result<i64, PersistenceError> {
        queries::competitie::indiv_klasse_competitie(&mut self.conn, indiv_klasse_id)
    }

    /// Lists the tiers of a competition.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_kampioenschappen(
        &mut self,
        competitie_id: i64,
    ) -> Result<Vec<Kampioenschap>, PersistenceError> {
        queries::competitie::list_kampioenschappen(&mut self.conn, competitie_id)
    }

    /// Retrieves a tier.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the tier does not exist.
    pub fn get_kampioenschap(
        &mut self,
        kampioenschap_id: i64,
    ) -> Result<Kampioenschap, PersistenceError> {
        queries::competitie::get_kampioenschap(&mut self.conn, kampioenschap_id)
    }

    // ========================================================================
    // Entries
    // ========================================================================

    /// Retrieves an entry.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the entry does not exist.
    pub fn get_deelnemer(
        &mut self,
        deelnemer_id: i64,
    ) -> Result<DeelnemerRecord, PersistenceError> {
        queries::deelnemers::get_deelnemer(&mut self.conn, deelnemer_id)
    }

    /// Lists the entries of a tier, class by class in volgorde order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_deelnemers(
        &mut self,
        kampioenschap_id: i64,
    ) -> Result<Vec<DeelnemerRecord>, PersistenceError> {
        queries::deelnemers::list_deelnemers(&mut self.conn, kampioenschap_id)
    }

    /// Loads one class of a tier as a ranking set.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored entries are corrupt.
    pub fn load_klasse(
        &mut self,
        kampioenschap_id: i64,
        indiv_klasse_id: i64,
    ) -> Result<KlasseState, PersistenceError> {
        queries::deelnemers::load_klasse(&mut self.conn, kampioenschap_id, indiv_klasse_id)
    }

    /// Returns the limiet of a class.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_limiet(
        &mut self,
        kampioenschap_id: i64,
        indiv_klasse_id: i64,
    ) -> Result<u16, PersistenceError> {
        queries::deelnemers::get_limiet(&mut self.conn, kampioenschap_id, indiv_klasse_id)
    }

    /// Stores an entry directly, outside the queue. Used for imports and seeding.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_deelnemer(
        &mut self,
        kampioenschap_id: i64,
        deelnemer: &NieuweDeelnemer,
        volgorde: u16,
        rank: u16,
    ) -> Result<i64, PersistenceError> {
        mutations::referentie::insert_deelnemer(
            &mut self.conn,
            kampioenschap_id,
            deelnemer,
            volgorde,
            rank,
        )
    }

    /// Imports the RK result of an entry.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the entry does not exist.
    pub fn set_rk_uitslag(
        &mut self,
        deelnemer_id: i64,
        uitslag: RkUitslag,
        score_1: u16,
        score_2: u16,
    ) -> Result<(), PersistenceError> {
        mutations::referentie::set_rk_uitslag(
            &mut self.conn,
            deelnemer_id,
            uitslag,
            score_1,
            score_2,
        )
    }

    // ========================================================================
    // Clubs, sporters and regio registrations
    // ========================================================================

    /// Inserts or updates a club.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn upsert_club(&mut self, club: &Club) -> Result<(), PersistenceError> {
        mutations::referentie::upsert_club(&mut self.conn, club)
    }

    /// Retrieves a club.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_club(&mut self, ver_nr: i64) -> Result<Option<Club>, PersistenceError> {
        queries::competitie::get_club(&mut self.conn, ver_nr)
    }

    /// Inserts a sporter.
    ///
    /// # Errors
    ///
    /// Returns an error if the sporter exists or the club is unknown.
    pub fn insert_sporter(
        &mut self,
        lid_nr: i64,
        naam: &str,
        ver_nr: Option<i64>,
    ) -> Result<(), PersistenceError> {
        mutations::referentie::insert_sporter(&mut self.conn, lid_nr, naam, ver_nr)
    }

    /// Records a club transfer, or the sporter leaving every club.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the sporter does not exist.
    pub fn set_sporter_club(
        &mut self,
        lid_nr: i64,
        ver_nr: Option<i64>,
    ) -> Result<(), PersistenceError> {
        mutations::referentie::set_sporter_club(&mut self.conn, lid_nr, ver_nr)
    }

    /// Returns the sporter's current club.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the sporter does not exist.
    pub fn live_club(&mut self, lid_nr: i64) -> Result<Option<Club>, PersistenceError> {
        queries::competitie::live_club(&mut self.conn, lid_nr)
    }

    /// Stores a regio registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn insert_regio_inschrijving(
        &mut self,
        inschrijving: &NieuweInschrijving,
    ) -> Result<i64, PersistenceError> {
        mutations::referentie::insert_regio_inschrijving(&mut self.conn, inschrijving)
    }

    /// Loads the regio registrations of a competition with their live clubs.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    pub fn list_regio_inschrijvingen(
        &mut self,
        competitie_id: i64,
    ) -> Result<Vec<RegioInschrijving>, PersistenceError> {
        queries::deelnemers::load_regio_inschrijvingen(&mut self.conn, competitie_id)
    }

    // ========================================================================
    // Overstap
    // ========================================================================

    /// Lists records whose frozen club differs from the sporter's live club.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails or a row is corrupt.
    pub fn overstap_kandidaten(
        &mut self,
        today: Date,
    ) -> Result<Vec<OverstapKandidaat>, PersistenceError> {
        queries::overstap::overstap_kandidaten(&mut self.conn, today)
    }

    /// Applies the transfers of a sweep in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails; nothing is applied then.
    pub fn apply_overstap(&mut self, plan: &OverstapPlan) -> Result<usize, PersistenceError> {
        mutations::overstap::apply_overstap(&mut self.conn, plan)
    }

    // ========================================================================
    // Audit
    // ========================================================================

    /// Retrieves an audit event by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is not found or cannot be deserialized.
    pub fn get_audit_event(&mut self, event_id: i64) -> Result<AuditEvent, PersistenceError> {
        queries::audit::get_audit_event(&mut self.conn, event_id)
    }

    /// Retrieves the audit event written for a processed mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn audit_event_for_mutation(
        &mut self,
        mutatie_id: i64,
    ) -> Result<Option<AuditEvent>, PersistenceError> {
        queries::audit::audit_event_for_mutatie(&mut self.conn, mutatie_id)
    }

    /// Lists the audit events of a competition in the order they were written.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn audit_events_for_competitie(
        &mut self,
        competitie_id: i64,
    ) -> Result<Vec<(i64, AuditEvent)>, PersistenceError> {
        queries::audit::audit_events_for_competitie(&mut self.conn, competitie_id)
    }
}
