// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Records whose frozen club differs from the sporter's live club.

use diesel::SqliteConnection;
use diesel::prelude::*;
use kampcomp::OverstapKandidaat;
use kampcomp_domain::{Club, Deel, DomainError, Fase, OverstapNiveau};
use std::collections::HashMap;
use time::Date;

use super::competitie::{list_competities, load_clubs, load_sporter_clubs};
use crate::diesel_schema::{deelnemers, kampioenschappen, regio_inschrijvingen};
use crate::error::PersistenceError;

/// Lists every regio registration and championship entry whose frozen club
/// is not the sporter's live club.
///
/// Records of archived competitions are left out. A frozen club that no
/// longer exists is reported as a corrupt row.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `today` - The date used to derive each competition's phase
///
/// # Errors
///
/// Returns an error if a query fails or a row is corrupt.
pub fn overstap_kandidaten(
    conn: &mut SqliteConnection,
    today: Date,
) -> Result<Vec<OverstapKandidaat>, PersistenceError> {
    let fases: HashMap<i64, Fase> = list_competities(conn)?
        .into_iter()
        .map(|c| (c.id, c.tijdlijn.bepaal_fase_indiv(today)))
        .filter(|(_, fase)| *fase != Fase::Z)
        .collect();
    let clubs: HashMap<i64, Club> = load_clubs(conn)?;
    let sporter_clubs: HashMap<i64, Option<i64>> = load_sporter_clubs(conn)?;

    let regio: Vec<(i64, i64, i64, i64)> = regio_inschrijvingen::table
        .select((
            regio_inschrijvingen::inschrijving_id,
            regio_inschrijvingen::competitie_id,
            regio_inschrijvingen::lid_nr,
            regio_inschrijvingen::bij_ver_nr,
        ))
        .order(regio_inschrijvingen::inschrijving_id.asc())
        .load(conn)?;

    let kampioenschap: Vec<(i64, i64, String, i64, i64)> = deelnemers::table
        .inner_join(kampioenschappen::table)
        .select((
            deelnemers::deelnemer_id,
            kampioenschappen::competitie_id,
            kampioenschappen::deel,
            deelnemers::lid_nr,
            deelnemers::bij_ver_nr,
        ))
        .order(deelnemers::deelnemer_id.asc())
        .load(conn)?;

    let mut records: Vec<(OverstapNiveau, i64, i64, i64, i64)> = regio
        .into_iter()
        .map(|(id, competitie_id, lid_nr, ver_nr)| {
            (OverstapNiveau::Regio, id, competitie_id, lid_nr, ver_nr)
        })
        .collect();
    for (id, competitie_id, deel, lid_nr, ver_nr) in kampioenschap {
        let deel: Deel = deel.parse().map_err(|e: DomainError| {
            PersistenceError::corrupt("kampioenschappen", e.to_string())
        })?;
        records.push((OverstapNiveau::from(deel), id, competitie_id, lid_nr, ver_nr));
    }

    let mut kandidaten: Vec<OverstapKandidaat> = Vec::new();
    for (niveau, record_id, competitie_id, lid_nr, bij_ver_nr) in records {
        let Some(fase_indiv) = fases.get(&competitie_id).copied() else {
            continue;
        };
        let live_ver_nr: Option<i64> = sporter_clubs.get(&lid_nr).copied().flatten();
        if live_ver_nr == Some(bij_ver_nr) {
            continue;
        }

        let bevroren: Club = clubs.get(&bij_ver_nr).cloned().ok_or_else(|| {
            PersistenceError::corrupt("clubs", format!("frozen club {bij_ver_nr} missing"))
        })?;
        kandidaten.push(OverstapKandidaat {
            niveau,
            record_id,
            lid_nr,
            fase_indiv,
            bevroren,
            live: live_ver_nr.and_then(|ver_nr| clubs.get(&ver_nr).cloned()),
        });
    }

    Ok(kandidaten)
}
