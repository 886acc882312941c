// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Persistence, ProcessOutcome, ProcessedMutation};
use kampcomp::{CompetitieOpzet, Mutation, MutationContext, competities_opstarten};
use kampcomp_audit::Actor;
use kampcomp_domain::{
    Club, Deel, Deelname, Gemiddelde, IndivKlasse, Kampioenschap, NieuweDeelnemer,
};
use time::PrimitiveDateTime;
use time::macros::datetime;

/// Processing time used by every test that does not care about the date.
pub const STAMP: PrimitiveDateTime = datetime!(2026-01-10 12:00);

pub const CLUB_RAYON_1: i64 = 1001;
pub const CLUB_RAYON_1_ANDERE_REGIO: i64 = 1002;
pub const CLUB_RAYON_2: i64 = 2001;

/// A stored competition with the ids the tests need.
pub struct Seed {
    pub competitie_id: i64,
    pub klassen: Vec<IndivKlasse>,
    pub kampioenschappen: Vec<Kampioenschap>,
}

impl Seed {
    /// The RK tier of `rayon_nr`.
    pub fn rk(&self, rayon_nr: u8) -> i64 {
        self.kampioenschappen
            .iter()
            .find(|k| k.rayon_nr == Some(rayon_nr))
            .map(|k| k.id)
            .unwrap()
    }

    /// The BK tier.
    pub fn bk(&self) -> i64 {
        self.kampioenschappen
            .iter()
            .find(|k| k.deel == Deel::Bk)
            .map(|k| k.id)
            .unwrap()
    }

    /// The id of the first class that continues into the RK/BK.
    pub fn klasse(&self) -> i64 {
        self.klassen[0].id
    }

    /// The id of the second class that continues into the RK/BK.
    pub fn andere_klasse(&self) -> i64 {
        self.klassen[1].id
    }
}

pub fn create_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory database")
}

pub fn create_ctx() -> MutationContext {
    MutationContext::new(None, None, Actor::systeem(), STAMP)
}

/// The 18m competition of season 2025/2026, with its class boundaries fixed.
pub fn create_opzet() -> CompetitieOpzet {
    let mut opzet: CompetitieOpzet = competities_opstarten(2025, &[], &create_ctx())
        .competities
        .remove(0);
    opzet.tijdlijn.klassengrenzen_vastgesteld = true;
    opzet
}

/// Stores the 18m competition of 2025/2026 and three clubs.
pub fn seed_competitie(persistence: &mut Persistence) -> Seed {
    let competitie_id: i64 = persistence.create_competitie(&create_opzet()).unwrap();

    persistence
        .upsert_club(&Club::new(CLUB_RAYON_1, "De Pijlen".to_string(), 101, 1))
        .unwrap();
    persistence
        .upsert_club(&Club::new(
            CLUB_RAYON_1_ANDERE_REGIO,
            "Het Doel".to_string(),
            102,
            1,
        ))
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

pub fn create_nieuwe_deelnemer(lid_nr: i64, indiv_klasse_id: i64, milli: u32) -> NieuweDeelnemer {
    NieuweDeelnemer {
        sporterboog_id: lid_nr,
        lid_nr,
        indiv_klasse_id,
        indiv_klasse_volgende_ronde_id: indiv_klasse_id,
        bij_ver_nr: CLUB_RAYON_1,
        kampioen_label: String::new(),
        deelname: Deelname::Onbekend,
        gemiddelde: Gemiddelde::from_milli(milli),
        gemiddelde_scores: String::new(),
        logboek: Vec::new(),
    }
}

/// Stores `count` ranked entries with falling gemiddelde in one class.
///
/// Sporters get member numbers `lid_base + 1..=count` and are members of
/// `CLUB_RAYON_1`. Returns the entry ids in volgorde order.
pub fn seed_klasse(
    persistence: &mut Persistence,
    kampioenschap_id: i64,
    indiv_klasse_id: i64,
    lid_base: i64,
    count: u16,
) -> Vec<i64> {
    (1..=count)
        .map(|plek| {
            let lid_nr: i64 = lid_base + i64::from(plek);
            persistence
                .insert_sporter(lid_nr, &format!("Sporter {lid_nr}"), Some(CLUB_RAYON_1))
                .unwrap();
            let nieuw: NieuweDeelnemer =
                create_nieuwe_deelnemer(lid_nr, indiv_klasse_id, 9_500 - u32::from(plek) * 100);
            persistence
                .insert_deelnemer(kampioenschap_id, &nieuw, plek, plek)
                .unwrap()
        })
        .collect()
}

/// Queues a mutation and processes it at `STAMP`.
pub fn queue_and_process(
    persistence: &mut Persistence,
    mutation: &Mutation,
    competitie_id: Option<i64>,
) -> ProcessedMutation {
    let mutatie_id: i64 = persistence
        .enqueue_mutation(mutation, competitie_id, "RKO Rayon 1")
        .unwrap();
    match persistence.process_mutation(mutatie_id, STAMP).unwrap() {
        ProcessOutcome::Processed(processed) => processed,
        other => panic!("fresh mutation {mutatie_id} not applied: {other:?}"),
    }
}
