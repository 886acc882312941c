// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Aanvrager, Rol};
use kampcomp::{CompetitieOpzet, MutationContext, competities_opstarten};
use kampcomp_audit::Actor;
use kampcomp_domain::{
    Club, Competitie, Deel, Deelname, Gemiddelde, IndivKlasse, Kampioenschap, NieuweDeelnemer,
    Tijdlijn,
};
use kampcomp_persistence::{Persistence, ProcessOutcome};
use time::macros::{date, datetime};
use time::{Date, PrimitiveDateTime};

pub const STAMP: PrimitiveDateTime = datetime!(2026-01-10 12:00);

/// Regio competition running.
pub const IN_FASE_F: Date = date!(2025 - 10 - 01);
/// Regio matches over, not yet closed.
pub const IN_FASE_G: Date = date!(2026 - 02 - 05);
/// With the regio closed: more than two weeks before the RK.
pub const IN_FASE_J: Date = date!(2026 - 01 - 10);
/// With the regio closed: the last two weeks before the RK.
pub const IN_FASE_K: Date = date!(2026 - 01 - 20);
/// With the regio closed: RK matches.
pub const IN_FASE_L: Date = date!(2026 - 02 - 10);

pub const CLUB_RAYON_1: i64 = 1001;
pub const CLUB_RAYON_2: i64 = 2001;

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

    pub fn andere_klasse(&self) -> i64 {
        self.klassen[1].id
    }
}

pub fn create_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory database")
}

pub fn aanvrager(rol: &str) -> Aanvrager {
    Aanvrager::new("Test Beheerder", rol.parse::<Rol>().unwrap()).unwrap()
}

/// The competitions of season 2025/2026, 18m first, with fixed class boundaries.
pub fn create_opzetten() -> Vec<CompetitieOpzet> {
    let ctx: MutationContext = MutationContext::new(None, None, Actor::systeem(), STAMP);
    let mut opzetten: Vec<CompetitieOpzet> = competities_opstarten(2025, &[], &ctx).competities;
    for opzet in &mut opzetten {
        opzet.tijdlijn.klassengrenzen_vastgesteld = true;
    }
    opzetten
}

/// Stores the 18m competition of 2025/2026 and a club in rayons 1 and 2.
pub fn seed_competitie(persistence: &mut Persistence) -> Seed {
    let opzet: CompetitieOpzet = create_opzetten().remove(0);
    let competitie_id: i64 = persistence.create_competitie(&opzet).unwrap();

    persistence
        .upsert_club(&Club::new(CLUB_RAYON_1, "De Pijlen".to_string(), 101, 1))
        .unwrap();
    persistence
        .upsert_club(&Club::new(CLUB_RAYON_2, "De Roos".to_string(), 105, 2))
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

pub fn sluit_regio(persistence: &mut Persistence, competitie_id: i64) {
    zet_tijdlijn(persistence, competitie_id, |t| {
        t.regiocompetitie_is_afgesloten = true;
    });
}

/// Puts the competition in fase N.
pub fn sluit_rk(persistence: &mut Persistence, competitie_id: i64) {
    zet_tijdlijn(persistence, competitie_id, |t| {
        t.regiocompetitie_is_afgesloten = true;
        t.rk_indiv_afgesloten = true;
    });
}

/// Stores a sporter and one entry for them, frozen to `CLUB_RAYON_1`.
///
/// `live_club` is the sporter's current membership.
pub fn seed_deelnemer(
    persistence: &mut Persistence,
    kampioenschap_id: i64,
    indiv_klasse_id: i64,
    lid_nr: i64,
    live_club: Option<i64>,
    deelname: Deelname,
) -> i64 {
    persistence
        .insert_sporter(lid_nr, &format!("Sporter {lid_nr}"), live_club)
        .unwrap();
    let nieuw: NieuweDeelnemer = NieuweDeelnemer {
        sporterboog_id: lid_nr,
        lid_nr,
        indiv_klasse_id,
        indiv_klasse_volgende_ronde_id: indiv_klasse_id,
        bij_ver_nr: CLUB_RAYON_1,
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

/// Processes every queued mutation at `STAMP`.
pub fn process_all(persistence: &mut Persistence) {
    for mutatie_id in persistence.pending_mutation_ids().unwrap() {
        let outcome: ProcessOutcome = persistence.process_mutation(mutatie_id, STAMP).unwrap();
        assert!(matches!(outcome, ProcessOutcome::Processed(_)));
    }
}
