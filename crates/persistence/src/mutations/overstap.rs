// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use kampcomp::{OverstapActie, OverstapPlan};
use kampcomp_domain::OverstapNiveau;
use tracing::info;

use super::deelnemers::append_logboek;
use crate::diesel_schema::{deelnemers, regio_inschrijvingen};
use crate::error::PersistenceError;

/// Applies every transfer of a sweep in one transaction.
///
/// # Returns
///
/// The number of records updated.
///
/// # Errors
///
/// Returns an error if any write fails; nothing is applied in that case.
pub fn apply_overstap(
    conn: &mut SqliteConnection,
    plan: &OverstapPlan,
) -> Result<usize, PersistenceError> {
    conn.immediate_transaction(|conn| {
        for actie in &plan.acties {
            apply_actie(conn, actie)?;
            info!(
                niveau = ?actie.niveau,
                record_id = actie.record_id,
                lid_nr = actie.lid_nr,
                ver_nr = actie.ver_nr,
                "Overstap applied"
            );
        }
        Ok(plan.acties.len())
    })
}

fn apply_actie(
    conn: &mut SqliteConnection,
    actie: &OverstapActie,
) -> Result<(), PersistenceError> {
    match actie.niveau {
        OverstapNiveau::Regio => {
            let mut regel: String = String::new();
            actie.logboek.append_to(&mut regel);

            let target = regio_inschrijvingen::table.find(actie.record_id);
            let updated: usize = match actie.nieuwe_regio_nr {
                Some(regio_nr) => diesel::update(target)
                    .set((
                        regio_inschrijvingen::bij_ver_nr.eq(actie.ver_nr),
                        regio_inschrijvingen::regio_nr.eq(i32::from(regio_nr)),
                        regio_inschrijvingen::logboek
                            .eq(regio_inschrijvingen::logboek.concat(regel)),
                    ))
                    .execute(conn)?,
                None => diesel::update(target)
                    .set((
                        regio_inschrijvingen::bij_ver_nr.eq(actie.ver_nr),
                        regio_inschrijvingen::logboek
                            .eq(regio_inschrijvingen::logboek.concat(regel)),
                    ))
                    .execute(conn)?,
            };
            if updated == 0 {
                return Err(PersistenceError::NotFound(format!(
                    "regio inschrijving {}",
                    actie.record_id
                )));
            }
        }
        OverstapNiveau::Rk | OverstapNiveau::Bk => {
            diesel::update(deelnemers::table.find(actie.record_id))
                .set(deelnemers::bij_ver_nr.eq(actie.ver_nr))
                .execute(conn)?;
            append_logboek(conn, actie.record_id, &actie.logboek)?;
        }
    }
    Ok(())
}
