// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use kampcomp::CompetitieOpzet;
use kampcomp_domain::Tijdlijn;
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{competities, indiv_klassen, kampioenschappen};
use crate::error::PersistenceError;

/// Creates a competition with its classes and tiers.
///
/// # Errors
///
/// Returns an error if the season already has this distance or an insert fails.
pub fn create_competitie(
    conn: &mut SqliteConnection,
    opzet: &CompetitieOpzet,
) -> Result<i64, PersistenceError> {
    let tijdlijn_json: String = serde_json::to_string(&opzet.tijdlijn)?;

    diesel::insert_into(competities::table)
        .values((
            competities::begin_jaar.eq(i32::from(opzet.begin_jaar)),
            competities::afstand.eq(opzet.afstand.as_str()),
            competities::beschrijving.eq(&opzet.beschrijving),
            competities::aantal_scores_voor_rk_deelname
                .eq(i32::from(opzet.aantal_scores_voor_rk_deelname)),
            competities::tijdlijn_json.eq(&tijdlijn_json),
        ))
        .execute(conn)?;
    let competitie_id: i64 = conn.get_last_insert_rowid()?;

    for klasse in &opzet.klassen {
        diesel::insert_into(indiv_klassen::table)
            .values((
                indiv_klassen::competitie_id.eq(competitie_id),
                indiv_klassen::volgorde.eq(i32::from(klasse.volgorde)),
                indiv_klassen::beschrijving.eq(&klasse.beschrijving),
                indiv_klassen::is_ook_voor_rk_bk.eq(i32::from(klasse.is_ook_voor_rk_bk)),
            ))
            .execute(conn)?;
    }

    for kampioenschap in &opzet.kampioenschappen {
        diesel::insert_into(kampioenschappen::table)
            .values((
                kampioenschappen::competitie_id.eq(competitie_id),
                kampioenschappen::deel.eq(kampioenschap.deel.as_str()),
                kampioenschappen::rayon_nr.eq(kampioenschap.rayon_nr.map(i32::from)),
                kampioenschappen::rayon_naam.eq(&kampioenschap.rayon_naam),
            ))
            .execute(conn)?;
    }

    info!(
        competitie_id,
        beschrijving = %opzet.beschrijving,
        klassen = opzet.klassen.len(),
        kampioenschappen = opzet.kampioenschappen.len(),
        "Created competitie"
    );
    Ok(competitie_id)
}

/// Stores a competition's calendar.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the competition does not exist.
pub fn update_tijdlijn(
    conn: &mut SqliteConnection,
    competitie_id: i64,
    tijdlijn: &Tijdlijn,
) -> Result<(), PersistenceError> {
    let tijdlijn_json: String = serde_json::to_string(tijdlijn)?;
    let updated: usize = diesel::update(competities::table.find(competitie_id))
        .set(competities::tijdlijn_json.eq(&tijdlijn_json))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("competitie {competitie_id}")));
    }
    Ok(())
}
