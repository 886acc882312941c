// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Competitions, their classes and tiers, clubs and sporters.

use diesel::SqliteConnection;
use diesel::prelude::*;
use kampcomp_domain::{
    Afstand, Club, Competitie, Deel, DomainError, IndivKlasse, Kampioenschap, Tijdlijn,
};
use std::collections::HashMap;

use super::{to_bool, to_u8, to_u16};
use crate::diesel_schema::{clubs, competities, indiv_klassen, kampioenschappen, sporters};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = competities)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct CompetitieRow {
    competitie_id: i64,
    begin_jaar: i32,
    afstand: String,
    beschrijving: String,
    aantal_scores_voor_rk_deelname: i32,
    tijdlijn_json: String,
}

impl CompetitieRow {
    fn into_competitie(self) -> Result<Competitie, PersistenceError> {
        let afstand: Afstand = self
            .afstand
            .parse()
            .map_err(|e: DomainError| {
                PersistenceError::corrupt("competities", e.to_string())
            })?;
        let tijdlijn: Tijdlijn = serde_json::from_str(&self.tijdlijn_json)?;

        Ok(Competitie {
            id: self.competitie_id,
            begin_jaar: to_u16("competities", "begin_jaar", self.begin_jaar)?,
            afstand,
            beschrijving: self.beschrijving,
            aantal_scores_voor_rk_deelname: to_u8(
                "competities",
                "aantal_scores_voor_rk_deelname",
                self.aantal_scores_voor_rk_deelname,
            )?,
            tijdlijn,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = indiv_klassen)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct IndivKlasseRow {
    indiv_klasse_id: i64,
    volgorde: i32,
    beschrijving: String,
    is_ook_voor_rk_bk: i32,
}

impl IndivKlasseRow {
    fn into_klasse(self) -> Result<IndivKlasse, PersistenceError> {
        Ok(IndivKlasse {
            id: self.indiv_klasse_id,
            volgorde: to_u16("indiv_klassen", "volgorde", self.volgorde)?,
            beschrijving: self.beschrijving,
            is_ook_voor_rk_bk: to_bool(self.is_ook_voor_rk_bk),
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = kampioenschappen)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct KampioenschapRow {
    kampioenschap_id: i64,
    competitie_id: i64,
    deel: String,
    rayon_nr: Option<i32>,
    rayon_naam: String,
    heeft_deelnemerslijst: i32,
    is_afgesloten: i32,
}

impl KampioenschapRow {
    fn into_kampioenschap(self) -> Result<Kampioenschap, PersistenceError> {
        let deel: Deel = self
            .deel
            .parse()
            .map_err(|e: DomainError| {
                PersistenceError::corrupt("kampioenschappen", e.to_string())
            })?;
        let rayon_nr: Option<u8> = self
            .rayon_nr
            .map(|nr| to_u8("kampioenschappen", "rayon_nr", nr))
            .transpose()?;

        Ok(Kampioenschap {
            id: self.kampioenschap_id,
            competitie_id: self.competitie_id,
            deel,
            rayon_nr,
            rayon_naam: self.rayon_naam,
            heeft_deelnemerslijst: to_bool(self.heeft_deelnemerslijst),
            is_afgesloten: to_bool(self.is_afgesloten),
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = clubs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct ClubRow {
    ver_nr: i64,
    naam: String,
    regio_nr: i32,
    rayon_nr: i32,
}

impl ClubRow {
    fn into_club(self) -> Result<Club, PersistenceError> {
        Ok(Club::new(
            self.ver_nr,
            self.naam,
            to_u16("clubs", "regio_nr", self.regio_nr)?,
            to_u8("clubs", "rayon_nr", self.rayon_nr)?,
        ))
    }
}

/// Retrieves a competition.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the competition does not exist.
pub fn get_competitie(
    conn: &mut SqliteConnection,
    competitie_id: i64,
) -> Result<Competitie, PersistenceError> {
    competities::table
        .find(competitie_id)
        .select(CompetitieRow::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("competitie {competitie_id}")))?
        .into_competitie()
}

/// Lists every competition, newest season first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_competities(conn: &mut SqliteConnection) -> Result<Vec<Competitie>, PersistenceError> {
    competities::table
        .order((competities::begin_jaar.desc(), competities::afstand.asc()))
        .select(CompetitieRow::as_select())
        .load(conn)?
        .into_iter()
        .map(CompetitieRow::into_competitie)
        .collect()
}

/// Distances that already have a competition in the given season.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn bestaande_afstanden(
    conn: &mut SqliteConnection,
    begin_jaar: u16,
) -> Result<Vec<Afstand>, PersistenceError> {
    competities::table
        .filter(competities::begin_jaar.eq(i32::from(begin_jaar)))
        .select(competities::afstand)
        .load::<String>(conn)?
        .iter()
        .map(|code| {
            code.parse().map_err(|e: DomainError| {
                PersistenceError::corrupt("competities", e.to_string())
            })
        })
        .collect()
}

/// Lists the individual classes of a competition in volgorde order.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_indiv_klassen(
    conn: &mut SqliteConnection,
    competitie_id: i64,
) -> Result<Vec<IndivKlasse>, PersistenceError> {
    indiv_klassen::table
        .filter(indiv_klassen::competitie_id.eq(competitie_id))
        .order(indiv_klassen::volgorde.asc())
        .select(IndivKlasseRow::as_select())
        .load(conn)?
        .into_iter()
        .map(IndivKlasseRow::into_klasse)
        .collect()
}

/// Returns the competition a class belongs to.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the class does not exist.
pub fn indiv_klasse_competitie(
    conn: &mut SqliteConnection,
    indiv_klasse_id: i64,
) -> Result<i64, PersistenceError> {
    indiv_klassen::table
        .find(indiv_klasse_id)
        .select(indiv_klassen::competitie_id)
        .first(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("indiv_klasse {indiv_klasse_id}")))
}

/// Lists the tiers of a competition: the RKs by rayon, then the BK.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_kampioenschappen(
    conn: &mut SqliteConnection,
    competitie_id: i64,
) -> Result<Vec<Kampioenschap>, PersistenceError> {
    kampioenschappen::table
        .filter(kampioenschappen::competitie_id.eq(competitie_id))
        .order(kampioenschappen::kampioenschap_id.asc())
        .select(KampioenschapRow::as_select())
        .load(conn)?
        .into_iter()
        .map(KampioenschapRow::into_kampioenschap)
        .collect()
}

/// Retrieves a tier.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the tier does not exist.
pub fn get_kampioenschap(
    conn: &mut SqliteConnection,
    kampioenschap_id: i64,
) -> Result<Kampioenschap, PersistenceError> {
    kampioenschappen::table
        .find(kampioenschap_id)
        .select(KampioenschapRow::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("kampioenschap {kampioenschap_id}")))?
        .into_kampioenschap()
}

/// Retrieves a club.
///
/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
pub fn get_club(
    conn: &mut SqliteConnection,
    ver_nr: i64,
) -> Result<Option<Club>, PersistenceError> {
    clubs::table
        .find(ver_nr)
        .select(ClubRow::as_select())
        .first(conn)
        .optional()?
        .map(ClubRow::into_club)
        .transpose()
}

/// Loads every club keyed by club number.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn load_clubs(conn: &mut SqliteConnection) -> Result<HashMap<i64, Club>, PersistenceError> {
    clubs::table
        .select(ClubRow::as_select())
        .load(conn)?
        .into_iter()
        .map(|row| row.into_club().map(|club| (club.ver_nr, club)))
        .collect()
}

/// Loads the live club number of every sporter.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn load_sporter_clubs(
    conn: &mut SqliteConnection,
) -> Result<HashMap<i64, Option<i64>>, PersistenceError> {
    Ok(sporters::table
        .select((sporters::lid_nr, sporters::ver_nr))
        .load::<(i64, Option<i64>)>(conn)?
        .into_iter()
        .collect())
}

/// Returns the sporter's current club, if they have one.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the sporter does not exist.
pub fn live_club(
    conn: &mut SqliteConnection,
    lid_nr: i64,
) -> Result<Option<Club>, PersistenceError> {
    let ver_nr: Option<i64> = sporters::table
        .find(lid_nr)
        .select(sporters::ver_nr)
        .first(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("sporter {lid_nr}")))?;

    match ver_nr {
        Some(ver_nr) => get_club(conn, ver_nr),
        None => Ok(None),
    }
}
