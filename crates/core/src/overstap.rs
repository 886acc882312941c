// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::state::MutationContext;
use kampcomp_audit::LogboekRegel;
use kampcomp_domain::{Club, Fase, OverstapBesluit, OverstapNiveau, beoordeel_overstap};

/// A record whose frozen club may have to follow a club transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverstapKandidaat {
    /// The tier of the record.
    pub niveau: OverstapNiveau,
    /// The regio registration or entry id.
    pub record_id: i64,
    /// The sporter's member number.
    pub lid_nr: i64,
    /// The individual phase of the record's competition.
    pub fase_indiv: Fase,
    /// The club frozen on the record.
    pub bevroren: Club,
    /// The sporter's current club.
    pub live: Option<Club>,
}

/// A transfer to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverstapActie {
    /// The tier of the record.
    pub niveau: OverstapNiveau,
    /// The record to update.
    pub record_id: i64,
    /// The sporter's member number.
    pub lid_nr: i64,
    /// The new club.
    pub ver_nr: i64,
    /// The new regio, for a regio registration that moves regio.
    pub nieuwe_regio_nr: Option<u16>,
    /// Logbook line for the record.
    pub logboek: LogboekRegel,
}

/// The decisions of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverstapPlan {
    /// Transfers to apply.
    pub acties: Vec<OverstapActie>,
    /// Records left alone, with the reason.
    pub overgeslagen: Vec<(i64, OverstapBesluit)>,
}

/// Decides, per record, whether its frozen club follows the live one.
///
/// Records whose clubs agree are dropped silently.
#[must_use]
pub fn plan_overstap(kandidaten: &[OverstapKandidaat], ctx: &MutationContext) -> OverstapPlan {
    let mut plan: OverstapPlan = OverstapPlan::default();

    for kandidaat in kandidaten {
        let besluit: OverstapBesluit = beoordeel_overstap(
            kandidaat.niveau,
            kandidaat.fase_indiv,
            &kandidaat.bevroren,
            kandidaat.live.as_ref(),
        );

        match besluit {
            OverstapBesluit::Ongewijzigd => {}
            OverstapBesluit::Toepassen {
                ver_nr,
                nieuwe_regio_nr,
            } => {
                let naam: &str = kandidaat.live.as_ref().map_or("", |c| c.naam.as_str());
                plan.acties.push(OverstapActie {
                    niveau: kandidaat.niveau,
                    record_id: kandidaat.record_id,
                    lid_nr: kandidaat.lid_nr,
                    ver_nr,
                    nieuwe_regio_nr,
                    logboek: ctx.regel(format!(
                        "Overstap van vereniging {} naar {ver_nr} {naam}",
                        kandidaat.bevroren.ver_nr
                    )),
                });
            }
            other => plan.overgeslagen.push((kandidaat.record_id, other)),
        }
    }

    plan
}
