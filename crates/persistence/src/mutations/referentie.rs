// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reference data maintained outside the mutation queue: clubs, sporters,
//! regio registrations and imported RK results.

use diesel::SqliteConnection;
use diesel::prelude::*;
use kampcomp_domain::{Club, Gemiddelde, NieuweDeelnemer, RkUitslag};
use num_traits::ToPrimitive;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{clubs, deelnemers, regio_inschrijvingen, sporters};
use crate::error::PersistenceError;

/// A regio registration to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NieuweInschrijving {
    /// The competition.
    pub competitie_id: i64,
    /// The sporter/bow pairing.
    pub sporterboog_id: i64,
    /// The sporter's member number.
    pub lid_nr: i64,
    /// The class the sporter competes in.
    pub indiv_klasse_id: i64,
    /// Regio of the club registered with.
    pub regio_nr: u16,
    /// The club registered with.
    pub bij_ver_nr: i64,
    /// The seven regio scores; unshot rounds are 0.
    pub scores: [u16; 7],
    /// Average over the shot rounds.
    pub gemiddelde: Gemiddelde,
    /// Whether the sporter wants to take part in the RK/BK.
    pub inschrijf_voorkeur_rk_bk: bool,
}

fn milli(gemiddelde: Gemiddelde) -> Result<i32, PersistenceError> {
    gemiddelde
        .milli()
        .to_i32()
        .ok_or_else(|| PersistenceError::Other(format!("gemiddelde {gemiddelde} too large")))
}

/// Inserts or updates a club.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn upsert_club(conn: &mut SqliteConnection, club: &Club) -> Result<(), PersistenceError> {
    diesel::replace_into(clubs::table)
        .values((
            clubs::ver_nr.eq(club.ver_nr),
            clubs::naam.eq(&club.naam),
            clubs::regio_nr.eq(i32::from(club.regio_nr)),
            clubs::rayon_nr.eq(i32::from(club.rayon_nr)),
        ))
        .execute(conn)?;
    Ok(())
}

/// Inserts a sporter.
///
/// # Errors
///
/// Returns an error if the sporter exists or the club is unknown.
pub fn insert_sporter(
    conn: &mut SqliteConnection,
    lid_nr: i64,
    naam: &str,
    ver_nr: Option<i64>,
) -> Result<(), PersistenceError> {
    diesel::insert_into(sporters::table)
        .values((
            sporters::lid_nr.eq(lid_nr),
            sporters::naam.eq(naam),
            sporters::ver_nr.eq(ver_nr),
        ))
        .execute(conn)?;
    Ok(())
}

/// Records a club transfer, or the sporter leaving every club.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the sporter does not exist.
pub fn set_sporter_club(
    conn: &mut SqliteConnection,
    lid_nr: i64,
    ver_nr: Option<i64>,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(sporters::table.find(lid_nr))
        .set(sporters::ver_nr.eq(ver_nr))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("sporter {lid_nr}")));
    }
    Ok(())
}

/// Stores a regio registration.
///
/// The number of scores is the number of non-zero rounds.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_regio_inschrijving(
    conn: &mut SqliteConnection,
    inschrijving: &NieuweInschrijving,
) -> Result<i64, PersistenceError> {
    let [s1, s2, s3, s4, s5, s6, s7] = inschrijving.scores.map(i32::from);
    let aantal_scores: i32 = inschrijving
        .scores
        .iter()
        .filter(|s| **s > 0)
        .count()
        .to_i32()
        .unwrap_or(0);

    diesel::insert_into(regio_inschrijvingen::table)
        .values((
            regio_inschrijvingen::competitie_id.eq(inschrijving.competitie_id),
            regio_inschrijvingen::sporterboog_id.eq(inschrijving.sporterboog_id),
            regio_inschrijvingen::lid_nr.eq(inschrijving.lid_nr),
            regio_inschrijvingen::indiv_klasse_id.eq(inschrijving.indiv_klasse_id),
            regio_inschrijvingen::regio_nr.eq(i32::from(inschrijving.regio_nr)),
            regio_inschrijvingen::bij_ver_nr.eq(inschrijving.bij_ver_nr),
            (
                regio_inschrijvingen::score1.eq(s1),
                regio_inschrijvingen::score2.eq(s2),
                regio_inschrijvingen::score3.eq(s3),
                regio_inschrijvingen::score4.eq(s4),
                regio_inschrijvingen::score5.eq(s5),
                regio_inschrijvingen::score6.eq(s6),
                regio_inschrijvingen::score7.eq(s7),
            ),
            regio_inschrijvingen::aantal_scores.eq(aantal_scores),
            regio_inschrijvingen::gemiddelde.eq(milli(inschrijving.gemiddelde)?),
            regio_inschrijvingen::inschrijf_voorkeur_rk_bk
                .eq(i32::from(inschrijving.inschrijf_voorkeur_rk_bk)),
        ))
        .execute(conn)?;

    conn.get_last_insert_rowid()
}

/// Stores the recomputed average of a regio registration.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the registration does not exist.
pub fn set_regio_gemiddelde(
    conn: &mut SqliteConnection,
    inschrijving_id: i64,
    gemiddelde: Gemiddelde,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(regio_inschrijvingen::table.find(inschrijving_id))
        .set(regio_inschrijvingen::gemiddelde.eq(milli(gemiddelde)?))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "regio inschrijving {inschrijving_id}"
        )));
    }
    Ok(())
}

/// Stores a new championship entry, unranked unless a place is given.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `kampioenschap_id` - The tier
/// * `deelnemer` - The entry
/// * `volgorde` - Position in the class, 0 when not yet placed
/// * `rank` - Rank in the class, 0 when not yet placed
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_deelnemer(
    conn: &mut SqliteConnection,
    kampioenschap_id: i64,
    deelnemer: &NieuweDeelnemer,
    volgorde: u16,
    rank: u16,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(deelnemers::table)
        .values((
            deelnemers::kampioenschap_id.eq(kampioenschap_id),
            deelnemers::sporterboog_id.eq(deelnemer.sporterboog_id),
            deelnemers::lid_nr.eq(deelnemer.lid_nr),
            deelnemers::indiv_klasse_id.eq(deelnemer.indiv_klasse_id),
            deelnemers::indiv_klasse_volgende_ronde_id.eq(deelnemer.indiv_klasse_volgende_ronde_id),
            deelnemers::bij_ver_nr.eq(deelnemer.bij_ver_nr),
            deelnemers::kampioen_label.eq(&deelnemer.kampioen_label),
            deelnemers::volgorde.eq(i32::from(volgorde)),
            deelnemers::rank.eq(i32::from(rank)),
            deelnemers::deelname.eq(deelnemer.deelname.as_str()),
            deelnemers::gemiddelde.eq(milli(deelnemer.gemiddelde)?),
            deelnemers::gemiddelde_scores.eq(&deelnemer.gemiddelde_scores),
        ))
        .execute(conn)?;

    conn.get_last_insert_rowid()
}

/// Imports the RK result of an entry.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the entry does not exist.
pub fn set_rk_uitslag(
    conn: &mut SqliteConnection,
    deelnemer_id: i64,
    uitslag: RkUitslag,
    score_1: u16,
    score_2: u16,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(deelnemers::table.find(deelnemer_id))
        .set((
            deelnemers::result_rank.eq(i32::from(uitslag.code())),
            deelnemers::result_score_1.eq(i32::from(score_1)),
            deelnemers::result_score_2.eq(i32::from(score_2)),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("deelnemer {deelnemer_id}")));
    }
    Ok(())
}
