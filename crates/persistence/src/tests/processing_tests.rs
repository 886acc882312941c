// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::diesel_schema::klasse_limieten;
use crate::tests::helpers::{
    CLUB_RAYON_1, Seed, create_nieuwe_deelnemer, create_persistence, queue_and_process,
    seed_competitie, seed_klasse,
};
use crate::{DeelnemerRecord, NieuweInschrijving, Persistence, ProcessedMutation};
use diesel::prelude::*;
use kampcomp::{KlasseState, Mutation};
use kampcomp_audit::AuditEvent;
use kampcomp_domain::{
    Competitie, DEFAULT_LIMIET, Deelname, Entry, Fase, Gemiddelde, NieuweDeelnemer,
    RegioInschrijving,
};
use time::macros::date;

fn cut(persistence: &mut Persistence, seed: &Seed, kampioenschap_id: i64, cut_nieuw: u16) {
    queue_and_process(
        persistence,
        &Mutation::Cut {
            kampioenschap_id,
            indiv_klasse_id: seed.klasse(),
            cut_oud: DEFAULT_LIMIET,
            cut_nieuw,
        },
        Some(seed.competitie_id),
    );
}

fn limiet_rows(persistence: &mut Persistence) -> i64 {
    klasse_limieten::table
        .count()
        .get_result(&mut persistence.conn)
        .unwrap()
}

// ============================================================================
// Cut
// ============================================================================

#[test]
fn test_cut_stores_limiet() {
    let mut persistence: Persistence = create_persistence();
    let seed: Seed = seed_competitie(&mut persistence);
    seed_klasse(&mut persistence, seed.rk(1), seed.klasse(), 100_000, 4);

    cut(&mut persistence, &seed, seed.rk(1), 3);

    assert_eq!(persistence.get_limiet(seed.rk(1), seed.klasse()).unwrap(), 3);
    assert_eq!(limiet_rows(&mut persistence), 1);
}

#[test]
fn test_cut_back_to_default_removes_limiet_row() {
    let mut persistence: Persistence = create_persistence();
    let seed: Seed = seed_competitie(&mut persistence);
    seed_klasse(&mut persistence, seed.rk(1), seed.klasse(), 100_000, 4);

    cut(&mut persistence, &seed, seed.rk(1), 3);
    cut(&mut persistence, &seed, seed.rk(1), DEFAULT_LIMIET);

    assert_eq!(
        persistence.get_limiet(seed.rk(1), seed.klasse()).unwrap(),
        DEFAULT_LIMIET
    );
    assert_eq!(limiet_rows(&mut persistence), 0);
}

// ============================================================================
// Withdraw / confirm
// ============================================================================

#[test]
fn test_afmelden_promotes_reserve_and_writes_logboek() {
    let mut persistence: Persistence = create_persistence();
    let seed: Seed = seed_competitie(&mut persistence);
    let ids: Vec<i64> = seed_klasse(&mut persistence, seed.rk(1), seed.klasse(), 100_000, 4);
    cut(&mut persistence, &seed, seed.rk(1), 3);

    queue_and_process(
        &mut persistence,
        &Mutation::Afmelden {
            deelnemer_id: ids[1],
        },
        Some(seed.competitie_id),
    );

    let afgemeld: DeelnemerRecord = persistence.get_deelnemer(ids[1]).unwrap();
    assert_eq!(afgemeld.entry.deelname, Deelname::Nee);
    assert_eq!(afgemeld.entry.rank, 0);
    assert!(
        afgemeld
            .logboek
            .contains("Deelname op Nee gezet want afmelding ontvangen van RKO Rayon 1")
    );
    assert!(afgemeld.logboek.starts_with("[2026-01-10 om 12:00]"));

    let reserve: DeelnemerRecord = persistence.get_deelnemer(ids[3]).unwrap();
    assert!(reserve.logboek.contains("Reserve wordt deelnemer"));
    assert!(reserve.entry.rank <= 3);
}

#[test]
fn test_afmelden_twice_writes_one_logboek_line() {
    let mut persistence: Persistence = create_persistence();
    let seed: Seed = seed_competitie(&mut persistence);
    let ids: Vec<i64> = seed_klasse(&mut persistence, seed.rk(1), seed.klasse(), 100_000, 3);

    for _ in 0..2 {
        queue_and_process(
            &mut persistence,
            &Mutation::Afmelden {
                deelnemer_id: ids[0],
            },
            Some(seed.competitie_id),
        );
    }

    let afgemeld: DeelnemerRecord = persistence.get_deelnemer(ids[0]).unwrap();
    assert_eq!(afgemeld.logboek.lines().count(), 1);
}

#[test]
fn test_aanmelden_confirms_entry() {
    let mut persistence: Persistence = create_persistence();
    let seed: Seed = seed_competitie(&mut persistence);
    let ids: Vec<i64> = seed_klasse(&mut persistence, seed.rk(1), seed.klasse(), 100_000, 3);

    queue_and_process(
        &mut persistence,
        &Mutation::Aanmelden {
            deelnemer_id: ids[2],
        },
        Some(seed.competitie_id),
    );

    let bevestigd: DeelnemerRecord = persistence.get_deelnemer(ids[2]).unwrap();
    assert_eq!(bevestigd.entry.deelname, Deelname::Ja);
    assert_eq!(bevestigd.entry.rank, 3);
    assert!(bevestigd.logboek.contains("Mutatie door RKO Rayon 1"));
    assert!(bevestigd.logboek.contains("Deelname op Ja gezet"));
}

// ============================================================================
// Membership
// ============================================================================

#[test]
fn test_extra_rk_deelnemer_is_stored_and_placed() {
    let mut persistence: Persistence = create_persistence();
    let seed: Seed = seed_competitie(&mut persistence);
    seed_klasse(&mut persistence, seed.rk(1), seed.klasse(), 100_000, 2);
    persistence
        .insert_sporter(200_001, "Laatkomer", Some(crate::tests::helpers::CLUB_RAYON_1))
        .unwrap();

    let nieuw: NieuweDeelnemer = create_nieuwe_deelnemer(200_001, seed.klasse(), 9_450);
    queue_and_process(
        &mut persistence,
        &Mutation::ExtraRkDeelnemer {
            kampioenschap_id: seed.rk(1),
            nieuw,
        },
        Some(seed.competitie_id),
    );

    let lijst: Vec<DeelnemerRecord> = persistence.list_deelnemers(seed.rk(1)).unwrap();
    assert_eq!(lijst.len(), 3);

    let extra: &DeelnemerRecord = lijst.iter().find(|d| d.lid_nr == 200_001).unwrap();
    assert_eq!(extra.entry.volgorde, 1);
    assert_eq!(extra.entry.rank, 1);
    assert_eq!(extra.entry.deelname, Deelname::Ja);

    let mut ranks: Vec<u16> = lijst.iter().map(|d| d.entry.rank).collect();
    ranks.sort_unstable();
    assert_eq!(ranks, vec![1, 2, 3]);
}

#[test]
fn test_verplaats_klasse_moves_entry() {
    let mut persistence: Persistence = create_persistence();
    let seed: Seed = seed_competitie(&mut persistence);
    let van: Vec<i64> = seed_klasse(&mut persistence, seed.bk(), seed.klasse(), 100_000, 2);
    seed_klasse(&mut persistence, seed.bk(), seed.andere_klasse(), 110_000, 1);

    queue_and_process(
        &mut persistence,
        &Mutation::VerplaatsKlasse {
            deelnemer_id: van[1],
            indiv_klasse_id: seed.andere_klasse(),
        },
        Some(seed.competitie_id),
    );

    let verplaatst: DeelnemerRecord = persistence.get_deelnemer(van[1]).unwrap();
    assert_eq!(verplaatst.indiv_klasse_id, seed.andere_klasse());

    let oud: KlasseState = persistence.load_klasse(seed.bk(), seed.klasse()).unwrap();
    let nieuw: KlasseState = persistence
        .load_klasse(seed.bk(), seed.andere_klasse())
        .unwrap();
    assert_eq!(oud.set.len(), 1);
    assert_eq!(nieuw.set.len(), 2);
    assert_eq!(oud.set.entries()[0].volgorde, 1);
}

// ============================================================================
// Full recompute
// ============================================================================

#[test]
fn test_initieel_orders_by_gemiddelde() {
    let mut persistence: Persistence = create_persistence();
    let seed: Seed = seed_competitie(&mut persistence);

    // stored weakest first
    let ids: Vec<i64> = (1..=3_u16)
        .map(|plek| {
            let lid_nr: i64 = 100_000 + i64::from(plek);
            persistence
                .insert_sporter(lid_nr, "Sporter", Some(crate::tests::helpers::CLUB_RAYON_1))
                .unwrap();
            let nieuw: NieuweDeelnemer =
                create_nieuwe_deelnemer(lid_nr, seed.klasse(), 9_000 + u32::from(plek) * 100);
            persistence
                .insert_deelnemer(seed.rk(1), &nieuw, plek, plek)
                .unwrap()
        })
        .collect();

    queue_and_process(
        &mut persistence,
        &Mutation::Initieel {
            kampioenschap_id: seed.rk(1),
        },
        Some(seed.competitie_id),
    );

    let klasse: KlasseState = persistence.load_klasse(seed.rk(1), seed.klasse()).unwrap();
    let volgorde: Vec<i64> = klasse.set.entries().iter().map(|e: &Entry| e.id).collect();
    assert_eq!(volgorde, vec![ids[2], ids[1], ids[0]]);
}

// ============================================================================
// Season
// ============================================================================

#[test]
fn test_competitie_opstarten_creates_both_distances_once() {
    let mut persistence: Persistence = create_persistence();

    queue_and_process(&mut persistence, &Mutation::CompetitieOpstarten { begin_jaar: 2026 }, None);
    queue_and_process(&mut persistence, &Mutation::CompetitieOpstarten { begin_jaar: 2026 }, None);

    let competities: Vec<Competitie> = persistence.list_competities().unwrap();
    assert_eq!(competities.len(), 2);
    assert!(competities.iter().all(|c| c.begin_jaar == 2026));
}

#[test]
fn test_afsluiten_archives_competitie() {
    let mut persistence: Persistence = create_persistence();
    let seed: Seed = seed_competitie(&mut persistence);

    queue_and_process(
        &mut persistence,
        &Mutation::Afsluiten {
            competitie_id: seed.competitie_id,
        },
        Some(seed.competitie_id),
    );

    let competitie: Competitie = persistence.get_competitie(seed.competitie_id).unwrap();
    assert!(competitie.tijdlijn.is_afgesloten);
    assert_eq!(competitie.tijdlijn.bepaal_fase_indiv(date!(2026 - 01 - 10)), Fase::Z);
}

#[test]
fn test_ag_vaststellen_stores_recomputed_averages() {
    let mut persistence: Persistence = create_persistence();
    let seed: Seed = seed_competitie(&mut persistence);
    persistence
        .insert_sporter(100_001, "Sporter 100001", Some(CLUB_RAYON_1))
        .unwrap();
    let inschrijving_id: i64 = persistence
        .insert_regio_inschrijving(&NieuweInschrijving {
            competitie_id: seed.competitie_id,
            sporterboog_id: 100_001,
            lid_nr: 100_001,
            indiv_klasse_id: seed.klasse(),
            regio_nr: 101,
            bij_ver_nr: CLUB_RAYON_1,
            scores: [270, 285, 0, 0, 0, 0, 0],
            gemiddelde: Gemiddelde::from_milli(8_000),
            inschrijf_voorkeur_rk_bk: true,
        })
        .unwrap();

    let processed: ProcessedMutation = queue_and_process(
        &mut persistence,
        &Mutation::AgVaststellen {
            competitie_id: seed.competitie_id,
        },
        Some(seed.competitie_id),
    );

    let inschrijvingen: Vec<RegioInschrijving> = persistence
        .list_regio_inschrijvingen(seed.competitie_id)
        .unwrap();
    assert_eq!(inschrijvingen[0].id, inschrijving_id);
    assert_eq!(inschrijvingen[0].gemiddelde, Gemiddelde::from_milli(9_250));

    let event: AuditEvent = persistence
        .audit_event_for_mutation(processed.mutatie_id)
        .unwrap()
        .unwrap();
    assert_eq!(event.action.name, "AG_VASTSTELLEN");
    assert!(event.after.data.ends_with("gewijzigd=1"));
}
