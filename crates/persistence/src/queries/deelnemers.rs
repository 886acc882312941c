// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Championship entries, class limits and the cascade inputs.

use diesel::SqliteConnection;
use diesel::prelude::*;
use kampcomp::{CascadeInput, KlasseState, Limieten};
use kampcomp_domain::{
    Club, DEFAULT_LIMIET, Deelname, DomainError, Entry, Gemiddelde, RankingSet, RegioInschrijving,
    RkResultaat, RkUitslag,
};
use std::collections::HashMap;

use super::competitie::{
    get_competitie, list_indiv_klassen, list_kampioenschappen, load_clubs, load_sporter_clubs,
};
use super::{to_bool, to_u8, to_u16, to_u32};
use crate::diesel_schema::{deelnemers, kampioenschappen, klasse_limieten, regio_inschrijvingen};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = deelnemers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct DeelnemerRow {
    deelnemer_id: i64,
    kampioenschap_id: i64,
    sporterboog_id: i64,
    lid_nr: i64,
    indiv_klasse_id: i64,
    indiv_klasse_volgende_ronde_id: i64,
    bij_ver_nr: i64,
    kampioen_label: String,
    volgorde: i32,
    rank: i32,
    deelname: String,
    gemiddelde: i32,
    gemiddelde_scores: String,
    result_rank: i32,
    result_score_1: i32,
    result_score_2: i32,
    logboek: String,
}

/// A stored championship entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeelnemerRecord {
    /// The tier.
    pub kampioenschap_id: i64,
    /// The sporter/bow pairing.
    pub sporterboog_id: i64,
    /// The sporter's member number.
    pub lid_nr: i64,
    /// Class of this tier.
    pub indiv_klasse_id: i64,
    /// Class for the next tier.
    pub indiv_klasse_volgende_ronde_id: i64,
    /// The frozen club.
    pub bij_ver_nr: i64,
    /// The ranking fields; `entry.id` is the entry id.
    pub entry: Entry,
    /// RK outcome.
    pub uitslag: RkUitslag,
    /// First result score.
    pub result_score_1: u16,
    /// Second result score.
    pub result_score_2: u16,
    /// The logbook, one line per event.
    pub logboek: String,
}

impl DeelnemerRow {
    fn to_entry(&self) -> Result<Entry, PersistenceError> {
        let deelname: Deelname = self
            .deelname
            .parse()
            .map_err(|e: DomainError| PersistenceError::corrupt("deelnemers", e.to_string()))?;

        Ok(Entry::new(
            self.deelnemer_id,
            Gemiddelde::from_milli(to_u32("deelnemers", "gemiddelde", self.gemiddelde)?),
            self.gemiddelde_scores.clone(),
        )
        .with_kampioen_label(&self.kampioen_label)
        .with_deelname(deelname)
        .with_volgorde(to_u16("deelnemers", "volgorde", self.volgorde)?))
    }

    fn into_record(self) -> Result<DeelnemerRecord, PersistenceError> {
        let mut entry: Entry = self.to_entry()?;
        entry.rank = to_u16("deelnemers", "rank", self.rank)?;

        Ok(DeelnemerRecord {
            kampioenschap_id: self.kampioenschap_id,
            sporterboog_id: self.sporterboog_id,
            lid_nr: self.lid_nr,
            indiv_klasse_id: self.indiv_klasse_id,
            indiv_klasse_volgende_ronde_id: self.indiv_klasse_volgende_ronde_id,
            bij_ver_nr: self.bij_ver_nr,
            entry,
            uitslag: RkUitslag::from_code(to_u16("deelnemers", "result_rank", self.result_rank)?),
            result_score_1: to_u16("deelnemers", "result_score_1", self.result_score_1)?,
            result_score_2: to_u16("deelnemers", "result_score_2", self.result_score_2)?,
            logboek: self.logboek,
        })
    }
}

/// Retrieves an entry.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the entry does not exist.
pub fn get_deelnemer(
    conn: &mut SqliteConnection,
    deelnemer_id: i64,
) -> Result<DeelnemerRecord, PersistenceError> {
    deelnemers::table
        .find(deelnemer_id)
        .select(DeelnemerRow::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("deelnemer {deelnemer_id}")))?
        .into_record()
}

/// Lists the entries of a tier, class by class in volgorde order.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_deelnemers(
    conn: &mut SqliteConnection,
    kampioenschap_id: i64,
) -> Result<Vec<DeelnemerRecord>, PersistenceError> {
    deelnemers::table
        .filter(deelnemers::kampioenschap_id.eq(kampioenschap_id))
        .order((
            deelnemers::indiv_klasse_id.asc(),
            deelnemers::volgorde.asc(),
            deelnemers::deelnemer_id.asc(),
        ))
        .select(DeelnemerRow::as_select())
        .load(conn)?
        .into_iter()
        .map(DeelnemerRow::into_record)
        .collect()
}

/// Returns the limiet of a class, or the default when none is stored.
///
/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
pub fn get_limiet(
    conn: &mut SqliteConnection,
    kampioenschap_id: i64,
    indiv_klasse_id: i64,
) -> Result<u16, PersistenceError> {
    klasse_limieten::table
        .find((kampioenschap_id, indiv_klasse_id))
        .select(klasse_limieten::limiet)
        .first::<i32>(conn)
        .optional()?
        .map_or(Ok(DEFAULT_LIMIET), |limiet| {
            to_u16("klasse_limieten", "limiet", limiet)
        })
}

/// Loads one class of a tier as a ranking set.
///
/// A class without entries loads as an empty set.
///
/// # Errors
///
/// Returns an error if the query fails or the stored entries are corrupt.
pub fn load_klasse(
    conn: &mut SqliteConnection,
    kampioenschap_id: i64,
    indiv_klasse_id: i64,
) -> Result<KlasseState, PersistenceError> {
    let entries: Vec<Entry> = deelnemers::table
        .filter(deelnemers::kampioenschap_id.eq(kampioenschap_id))
        .filter(deelnemers::indiv_klasse_id.eq(indiv_klasse_id))
        .select(DeelnemerRow::as_select())
        .load(conn)?
        .iter()
        .map(DeelnemerRow::to_entry)
        .collect::<Result<_, _>>()?;

    let limiet: u16 = get_limiet(conn, kampioenschap_id, indiv_klasse_id)?;
    let set: RankingSet = RankingSet::new(limiet, entries)?;

    Ok(KlasseState::new(kampioenschap_id, indiv_klasse_id, set))
}

/// Loads every class of a tier that has entries.
///
/// # Errors
///
/// Returns an error if the query fails or the stored entries are corrupt.
pub fn load_kampioenschap_klassen(
    conn: &mut SqliteConnection,
    kampioenschap_id: i64,
) -> Result<Vec<KlasseState>, PersistenceError> {
    let klasse_ids: Vec<i64> = deelnemers::table
        .filter(deelnemers::kampioenschap_id.eq(kampioenschap_id))
        .select(deelnemers::indiv_klasse_id)
        .distinct()
        .order(deelnemers::indiv_klasse_id.asc())
        .load(conn)?;

    klasse_ids
        .into_iter()
        .map(|indiv_klasse_id| load_klasse(conn, kampioenschap_id, indiv_klasse_id))
        .collect()
}

/// Loads the stored limieten of every tier of a competition.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn load_limieten(
    conn: &mut SqliteConnection,
    competitie_id: i64,
) -> Result<Limieten, PersistenceError> {
    let rows: Vec<(i64, i64, i32)> = klasse_limieten::table
        .inner_join(kampioenschappen::table)
        .filter(kampioenschappen::competitie_id.eq(competitie_id))
        .select((
            klasse_limieten::kampioenschap_id,
            klasse_limieten::indiv_klasse_id,
            klasse_limieten::limiet,
        ))
        .load(conn)?;

    let mut limieten: Limieten = Limieten::new();
    for (kampioenschap_id, indiv_klasse_id, limiet) in rows {
        limieten.zet(
            kampioenschap_id,
            indiv_klasse_id,
            to_u16("klasse_limieten", "limiet", limiet)?,
        );
    }
    Ok(limieten)
}

/// Loads everything a cascade of this competition reads, apart from the
/// registrations or results themselves.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the competition does not exist.
pub fn load_cascade_input(
    conn: &mut SqliteConnection,
    competitie_id: i64,
) -> Result<CascadeInput, PersistenceError> {
    Ok(CascadeInput {
        competitie: get_competitie(conn, competitie_id)?,
        kampioenschappen: list_kampioenschappen(conn, competitie_id)?,
        klassen: list_indiv_klassen(conn, competitie_id)?,
        limieten: load_limieten(conn, competitie_id)?,
    })
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = regio_inschrijvingen)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct InschrijvingRow {
    inschrijving_id: i64,
    sporterboog_id: i64,
    lid_nr: i64,
    indiv_klasse_id: i64,
    regio_nr: i32,
    score1: i32,
    score2: i32,
    score3: i32,
    score4: i32,
    score5: i32,
    score6: i32,
    score7: i32,
    aantal_scores: i32,
    gemiddelde: i32,
    inschrijf_voorkeur_rk_bk: i32,
}

/// Loads the regio registrations of a competition with each sporter's live club.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn load_regio_inschrijvingen(
    conn: &mut SqliteConnection,
    competitie_id: i64,
) -> Result<Vec<RegioInschrijving>, PersistenceError> {
    let clubs: HashMap<i64, Club> = load_clubs(conn)?;
    let sporter_clubs: HashMap<i64, Option<i64>> = load_sporter_clubs(conn)?;

    let rows: Vec<InschrijvingRow> = regio_inschrijvingen::table
        .filter(regio_inschrijvingen::competitie_id.eq(competitie_id))
        .order(regio_inschrijvingen::inschrijving_id.asc())
        .select(InschrijvingRow::as_select())
        .load(conn)?;

    rows.into_iter()
        .map(|row| {
            let score = |value: i32| to_u16("regio_inschrijvingen", "score", value);
            let live_club: Option<Club> = sporter_clubs
                .get(&row.lid_nr)
                .copied()
                .flatten()
                .and_then(|ver_nr| clubs.get(&ver_nr).cloned());

            Ok(RegioInschrijving {
                id: row.inschrijving_id,
                sporterboog_id: row.sporterboog_id,
                lid_nr: row.lid_nr,
                indiv_klasse_id: row.indiv_klasse_id,
                regio_nr: to_u16("regio_inschrijvingen", "regio_nr", row.regio_nr)?,
                scores: [
                    score(row.score1)?,
                    score(row.score2)?,
                    score(row.score3)?,
                    score(row.score4)?,
                    score(row.score5)?,
                    score(row.score6)?,
                    score(row.score7)?,
                ],
                aantal_scores: to_u8("regio_inschrijvingen", "aantal_scores", row.aantal_scores)?,
                gemiddelde: Gemiddelde::from_milli(to_u32(
                    "regio_inschrijvingen",
                    "gemiddelde",
                    row.gemiddelde,
                )?),
                inschrijf_voorkeur_rk_bk: to_bool(row.inschrijf_voorkeur_rk_bk),
                live_club,
            })
        })
        .collect()
}

/// Loads every RK entry of a competition with its result.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn load_rk_resultaten(
    conn: &mut SqliteConnection,
    competitie_id: i64,
) -> Result<Vec<RkResultaat>, PersistenceError> {
    let rows: Vec<(DeelnemerRow, String)> = deelnemers::table
        .inner_join(kampioenschappen::table)
        .filter(kampioenschappen::competitie_id.eq(competitie_id))
        .filter(kampioenschappen::rayon_nr.is_not_null())
        .order((
            kampioenschappen::rayon_nr.asc(),
            deelnemers::indiv_klasse_id.asc(),
            deelnemers::volgorde.asc(),
        ))
        .select((DeelnemerRow::as_select(), kampioenschappen::rayon_naam))
        .load(conn)?;

    rows.into_iter()
        .map(|(row, rayon_naam)| {
            let record: DeelnemerRecord = row.into_record()?;
            Ok(RkResultaat {
                sporterboog_id: record.sporterboog_id,
                lid_nr: record.lid_nr,
                indiv_klasse_volgende_ronde_id: record.indiv_klasse_volgende_ronde_id,
                bij_ver_nr: record.bij_ver_nr,
                rayon_naam,
                deelname: record.entry.deelname,
                result_score_1: record.result_score_1,
                result_score_2: record.result_score_2,
                uitslag: record.uitslag,
            })
        })
        .collect()
}
