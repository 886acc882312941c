// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Seeding shared by the server tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use kampcomp::{CompetitieOpzet, MutationContext, competities_opstarten};
use kampcomp_audit::Actor;
use kampcomp_domain::{
    Club, Competitie, Deel, Deelname, Gemiddelde, IndivKlasse, Kampioenschap, NieuweDeelnemer,
    Tijdlijn,
};
use kampcomp_persistence::{NieuweInschrijving, Persistence};
use time::OffsetDateTime;
use time::macros::datetime;

/// A moment in fase F of the seeded competition.
pub const NOW: OffsetDateTime = datetime!(2025-10-01 12:00 UTC);

/// Club in regio 101, rayon 1.
pub const CLUB_A: i64 = 1001;
/// Club in regio 102, rayon 1.
pub const CLUB_B: i64 = 1002;

pub struct Seed {
    pub competitie_id: i64,
    pub klassen: Vec<IndivKlasse>,
    pub kampioenschappen: Vec<Kampioenschap>,
}

impl Seed {
    pub fn rk(&self, rayon_nr: u8) -> i64 {
        self.kampioenschappen
            .iter()
            .find(|k| k.rayon_nr == Some(rayon_nr))
            .map(|k| k.id)
            .unwrap()
    }

    pub fn bk(&self) -> i64 {
        self.kampioenschappen
            .iter()
            .find(|k| k.deel == Deel::Bk)
            .map(|k| k.id)
            .unwrap()
    }

    pub fn klasse(&self) -> i64 {
        self.klassen[0].id
    }
}

pub fn create_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory database")
}

/// Stores the 18m competition of 2025/2026 and two clubs.
pub fn seed_competitie(persistence: &mut Persistence) -> Seed {
    let ctx: MutationContext =
        MutationContext::new(None, None, Actor::systeem(), datetime!(2025-08-01 12:00));
    let mut opzet: CompetitieOpzet = competities_opstarten(2025, &[], &ctx).competities.remove(0);
    opzet.tijdlijn.klassengrenzen_vastgesteld = true;
    let competitie_id: i64 = persistence.create_competitie(&opzet).unwrap();

    persistence
        .upsert_club(&Club::new(CLUB_A, "De Pijlen".to_string(), 101, 1))
        .unwrap();
    persistence
        .upsert_club(&Club::new(CLUB_B, "Het Doel".to_string(), 102, 1))
        .unwrap();

    Seed {
        competitie_id,
        klassen: persistence.list_indiv_klassen(competitie_id).unwrap(),
        kampioenschappen: persistence.list_kampioenschappen(competitie_id).unwrap(),
    }
}

/// Changes the progress flags of a competition.
pub fn zet_tijdlijn(
    persistence: &mut Persistence,
    competitie_id: i64,
    wijzig: impl FnOnce(&mut Tijdlijn),
) {
    let competitie: Competitie = persistence.get_competitie(competitie_id).unwrap();
    let mut tijdlijn: Tijdlijn = competitie.tijdlijn;
    wijzig(&mut tijdlijn);
    persistence
        .update_tijdlijn(competitie_id, &tijdlijn)
        .unwrap();
}

/// Puts the competition in fase N, whatever the date.
pub fn sluit_rk(persistence: &mut Persistence, competitie_id: i64) {
    zet_tijdlijn(persistence, competitie_id, |t| {
        t.regiocompetitie_is_afgesloten = true;
        t.rk_indiv_afgesloten = true;
    });
}

/// Stores a sporter and one entry for them, frozen to `CLUB_A`.
pub fn seed_deelnemer(
    persistence: &mut Persistence,
    kampioenschap_id: i64,
    indiv_klasse_id: i64,
    lid_nr: i64,
    deelname: Deelname,
) -> i64 {
    persistence
        .insert_sporter(lid_nr, &format!("Sporter {lid_nr}"), Some(CLUB_A))
        .unwrap();
    let nieuw: NieuweDeelnemer = NieuweDeelnemer {
        sporterboog_id: lid_nr,
        lid_nr,
        indiv_klasse_id,
        indiv_klasse_volgende_ronde_id: indiv_klasse_id,
        bij_ver_nr: CLUB_A,
        kampioen_label: String::new(),
        deelname,
        gemiddelde: Gemiddelde::from_milli(9_000),
        gemiddelde_scores: String::new(),
        logboek: Vec::new(),
    };
    persistence
        .insert_deelnemer(kampioenschap_id, &nieuw, 1, 1)
        .unwrap()
}

/// Stores a sporter of `CLUB_A` and their regio registration.
pub fn seed_regio_inschrijving(persistence: &mut Persistence, seed: &Seed, lid_nr: i64) -> i64 {
    persistence
        .insert_sporter(lid_nr, &format!("Sporter {lid_nr}"), Some(CLUB_A))
        .unwrap();
    persistence
        .insert_regio_inschrijving(&NieuweInschrijving {
            competitie_id: seed.competitie_id,
            sporterboog_id: lid_nr,
            lid_nr,
            indiv_klasse_id: seed.klasse(),
            regio_nr: 101,
            bij_ver_nr: CLUB_A,
            scores: [280, 0, 0, 0, 0, 0, 0],
            gemiddelde: Gemiddelde::from_milli(9_333),
            inschrijf_voorkeur_rk_bk: true,
        })
        .unwrap()
}
