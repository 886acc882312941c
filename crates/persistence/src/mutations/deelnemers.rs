// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Writing ranking results back.

use diesel::SqliteConnection;
use diesel::prelude::*;
use kampcomp::{CascadeResult, KlasseState, LimietWijziging, TransitionResult};
use kampcomp_audit::LogboekRegel;
use kampcomp_domain::{DEFAULT_LIMIET, Entry};
use tracing::debug;

use super::competitie::update_tijdlijn;
use super::referentie::insert_deelnemer;
use crate::diesel_schema::{deelnemers, kampioenschappen, klasse_limieten};
use crate::error::PersistenceError;

/// Writes the ranking fields of every entry of a class.
///
/// The entry's class is written too, so an entry moved between classes
/// ends up in the class it was ranked in.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if an entry no longer exists.
pub fn save_klasse(
    conn: &mut SqliteConnection,
    klasse: &KlasseState,
) -> Result<(), PersistenceError> {
    for entry in klasse.set.entries() {
        save_entry(conn, klasse.indiv_klasse_id, entry)?;
    }
    debug!(
        kampioenschap_id = klasse.kampioenschap_id,
        indiv_klasse_id = klasse.indiv_klasse_id,
        entries = klasse.set.len(),
        "Saved klasse"
    );
    Ok(())
}

fn save_entry(
    conn: &mut SqliteConnection,
    indiv_klasse_id: i64,
    entry: &Entry,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(deelnemers::table.find(entry.id))
        .set((
            deelnemers::indiv_klasse_id.eq(indiv_klasse_id),
            deelnemers::volgorde.eq(i32::from(entry.volgorde)),
            deelnemers::rank.eq(i32::from(entry.rank)),
            deelnemers::deelname.eq(entry.deelname.as_str()),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("deelnemer {}", entry.id)));
    }
    Ok(())
}

/// Stores a class limiet. The default limiet is stored as no row at all.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn save_limiet(
    conn: &mut SqliteConnection,
    wijziging: &LimietWijziging,
) -> Result<(), PersistenceError> {
    let key = (wijziging.kampioenschap_id, wijziging.indiv_klasse_id);
    if wijziging.limiet == DEFAULT_LIMIET {
        diesel::delete(klasse_limieten::table.find(key)).execute(conn)?;
    } else {
        diesel::replace_into(klasse_limieten::table)
            .values((
                klasse_limieten::kampioenschap_id.eq(wijziging.kampioenschap_id),
                klasse_limieten::indiv_klasse_id.eq(wijziging.indiv_klasse_id),
                klasse_limieten::limiet.eq(i32::from(wijziging.limiet)),
            ))
            .execute(conn)?;
    }
    Ok(())
}

/// Appends one line to an entry's logbook.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the entry does not exist.
pub fn append_logboek(
    conn: &mut SqliteConnection,
    deelnemer_id: i64,
    regel: &LogboekRegel,
) -> Result<(), PersistenceError> {
    let mut tekst: String = String::new();
    regel.append_to(&mut tekst);

    let updated: usize = diesel::update(deelnemers::table.find(deelnemer_id))
        .set(deelnemers::logboek.eq(deelnemers::logboek.concat(tekst)))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("deelnemer {deelnemer_id}")));
    }
    Ok(())
}

/// Writes a class-level transition: ranking fields, limiet and logbook lines.
///
/// # Errors
///
/// Returns an error if any write fails.
pub fn save_transition(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<(), PersistenceError> {
    for klasse in &result.klassen {
        save_klasse(conn, klasse)?;
    }
    if let Some(wijziging) = &result.limiet {
        save_limiet(conn, wijziging)?;
    }
    for (deelnemer_id, regel) in &result.logboek {
        append_logboek(conn, *deelnemer_id, regel)?;
    }
    Ok(())
}

/// Writes a cascade: the calendar, every new list and the closed tiers.
///
/// Each listed tier loses all its existing entries before the new list is
/// inserted.
///
/// # Errors
///
/// Returns an error if any write fails.
pub fn save_cascade(
    conn: &mut SqliteConnection,
    result: &CascadeResult,
) -> Result<(), PersistenceError> {
    update_tijdlijn(conn, result.competitie_id, &result.tijdlijn)?;

    for lijst in &result.lijsten {
        let removed: usize = diesel::delete(
            deelnemers::table.filter(deelnemers::kampioenschap_id.eq(lijst.kampioenschap_id)),
        )
        .execute(conn)?;

        for geplaatst in &lijst.deelnemers {
            let deelnemer_id: i64 = insert_deelnemer(
                conn,
                lijst.kampioenschap_id,
                &geplaatst.deelnemer,
                geplaatst.volgorde,
                geplaatst.rank,
            )?;
            for regel in &geplaatst.logboek {
                append_logboek(conn, deelnemer_id, regel)?;
            }
        }

        diesel::update(kampioenschappen::table.find(lijst.kampioenschap_id))
            .set(kampioenschappen::heeft_deelnemerslijst.eq(1))
            .execute(conn)?;

        debug!(
            kampioenschap_id = lijst.kampioenschap_id,
            removed,
            inserted = lijst.deelnemers.len(),
            "Replaced deelnemerslijst"
        );
    }

    if !result.afgesloten.is_empty() {
        diesel::update(
            kampioenschappen::table
                .filter(kampioenschappen::kampioenschap_id.eq_any(&result.afgesloten)),
        )
        .set(kampioenschappen::is_afgesloten.eq(1))
        .execute(conn)?;
    }

    Ok(())
}
