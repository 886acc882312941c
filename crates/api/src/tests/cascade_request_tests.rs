// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    CLUB_RAYON_1, IN_FASE_F, IN_FASE_G, IN_FASE_J, IN_FASE_L, Seed, aanvrager,
    create_persistence, process_all, seed_competitie, seed_deelnemer, sluit_regio, sluit_rk,
};
use crate::{
    ApiError, ExtraDeelnemerRequest, RequestOutcome, request_extra_rk_deelnemer,
    request_regio_naar_rk, request_rk_naar_bk, request_verplaats_klasse,
};
use kampcomp::Mutation;
use kampcomp_domain::{Deelname, Fase, Gemiddelde};
use kampcomp_persistence::{DeelnemerRecord, MutatieRecord, Persistence};

fn create_extra_request(lid_nr: i64, indiv_klasse_id: i64) -> ExtraDeelnemerRequest {
    ExtraDeelnemerRequest {
        sporterboog_id: lid_nr,
        lid_nr,
        indiv_klasse_id,
        indiv_klasse_volgende_ronde_id: indiv_klasse_id,
        gemiddelde: Gemiddelde::from_milli(9_400),
        gemiddelde_scores: String::new(),
    }
}

// ============================================================================
// Regio to RK, RK to BK
// ============================================================================

#[test]
fn test_regio_naar_rk_is_queued_in_fase_g() {
    let mut persistence: Persistence = create_persistence();
    let seed: Seed = seed_competitie(&mut persistence);

    let outcome: RequestOutcome =
        request_regio_naar_rk(&mut persistence, &aanvrager("BKO"), seed.competitie_id, IN_FASE_G)
            .unwrap();

    let record: MutatieRecord = persistence
        .get_mutation(outcome.mutatie_id().unwrap())
        .unwrap();
    assert_eq!(record.kind, "REGIO_NAAR_RK");
    assert_eq!(record.competitie_id, Some(seed.competitie_id));
}

#[test]
fn test_regio_naar_rk_during_regio_matches_is_wrong_phase() {
    let mut persistence: Persistence = create_persistence();
    let seed: Seed = seed_competitie(&mut persistence);

    let result: Result<RequestOutcome, ApiError> =
        request_regio_naar_rk(&mut persistence, &aanvrager("BKO"), seed.competitie_id, IN_FASE_F);

    assert!(matches!(
        result,
        Err(ApiError::WrongPhase {
            fase: Fase::F,
            ..
        })
    ));
    assert_eq!(persistence.count_pending().unwrap(), 0);
}

#[test]
fn test_regio_naar_rk_requires_bko() {
    let mut persistence: Persistence = create_persistence();
    let seed: Seed = seed_competitie(&mut persistence);

    let result: Result<RequestOutcome, ApiError> =
        request_regio_naar_rk(&mut persistence, &aanvrager("RKO 1"), seed.competitie_id, IN_FASE_G);

    assert_eq!(
        result,
        Err(ApiError::Unauthorized {
            action: String::from("regio naar RK"),
            required_role: String::from("BKO"),
        })
    );
}

#[test]
fn test_rk_naar_bk_is_only_allowed_during_rk_matches() {
    let mut persistence: Persistence = create_persistence();
    let seed: Seed = seed_competitie(&mut persistence);
    sluit_regio(&mut persistence, seed.competitie_id);

    let te_vroeg: Result<RequestOutcome, ApiError> =
        request_rk_naar_bk(&mut persistence, &aanvrager("BKO"), seed.competitie_id, IN_FASE_J);
    assert!(matches!(
        te_vroeg,
        Err(ApiError::WrongPhase {
            fase: Fase::J,
            ..
        })
    ));

    let outcome: RequestOutcome =
        request_rk_naar_bk(&mut persistence, &aanvrager("BKO"), seed.competitie_id, IN_FASE_L)
            .unwrap();
    let record: MutatieRecord = persistence
        .get_mutation(outcome.mutatie_id().unwrap())
        .unwrap();
    assert_eq!(record.kind, "RK_NAAR_BK");
}

#[test]
fn test_unknown_competition_is_not_found() {
    let mut persistence: Persistence = create_persistence();

    let result: Result<RequestOutcome, ApiError> =
        request_regio_naar_rk(&mut persistence, &aanvrager("BKO"), 42, IN_FASE_G);

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

// ============================================================================
// Extra RK entry
// ============================================================================

#[test]
fn test_extra_rk_deelnemer_is_frozen_to_the_live_club() {
    let mut persistence: Persistence = create_persistence();
    let seed: Seed = seed_competitie(&mut persistence);
    sluit_regio(&mut persistence, seed.competitie_id);
    persistence
        .insert_sporter(200_001, "Late Sporter", Some(CLUB_RAYON_1))
        .unwrap();

    let outcome: RequestOutcome = request_extra_rk_deelnemer(
        &mut persistence,
        &aanvrager("RKO 1"),
        seed.rk(1),
        &create_extra_request(200_001, seed.klasse()),
        IN_FASE_J,
    )
    .unwrap();

    let record: MutatieRecord = persistence
        .get_mutation(outcome.mutatie_id().unwrap())
        .unwrap();
    let Mutation::ExtraRkDeelnemer { nieuw, .. } =
        Mutation::decode(&record.kind, &record.payload_json).unwrap()
    else {
        panic!("expected an extra RK entry, got {}", record.kind);
    };
    assert_eq!(nieuw.bij_ver_nr, CLUB_RAYON_1);
    assert_eq!(nieuw.deelname, Deelname::Onbekend);

    process_all(&mut persistence);
    let lijst: Vec<DeelnemerRecord> = persistence.list_deelnemers(seed.rk(1)).unwrap();
    assert_eq!(lijst.len(), 1);
    assert_eq!(lijst[0].lid_nr, 200_001);
    assert!(lijst[0].logboek.contains("Toegevoegd aan de RK indiv deelnemerslijst"));
}

#[test]
fn test_extra_rk_deelnemer_without_club_is_rejected() {
    let mut persistence: Persistence = create_persistence();
    let seed: Seed = seed_competitie(&mut persistence);
    sluit_regio(&mut persistence, seed.competitie_id);
    persistence
        .insert_sporter(200_001, "Late Sporter", None)
        .unwrap();

    let result: Result<RequestOutcome, ApiError> = request_extra_rk_deelnemer(
        &mut persistence,
        &aanvrager("RKO 1"),
        seed.rk(1),
        &create_extra_request(200_001, seed.klasse()),
        IN_FASE_J,
    );

    assert!(matches!(result, Err(ApiError::DomainRuleViolation { .. })));
    assert_eq!(persistence.count_pending().unwrap(), 0);
}

#[test]
fn test_extra_rk_deelnemer_already_on_the_list_is_rejected() {
    let mut persistence: Persistence = create_persistence();
    let seed: Seed = seed_competitie(&mut persistence);
    sluit_regio(&mut persistence, seed.competitie_id);
    seed_deelnemer(
        &mut persistence,
        seed.rk(1),
        seed.klasse(),
        200_001,
        Some(CLUB_RAYON_1),
        Deelname::Onbekend,
    );

    let result: Result<RequestOutcome, ApiError> = request_extra_rk_deelnemer(
        &mut persistence,
        &aanvrager("RKO 1"),
        seed.rk(1),
        &create_extra_request(200_001, seed.klasse()),
        IN_FASE_J,
    );

    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "unique_deelnemer"
    ));
}

#[test]
fn test_extra_deelnemer_on_bk_is_rejected() {
    let mut persistence: Persistence = create_persistence();
    let seed: Seed = seed_competitie(&mut persistence);
    sluit_regio(&mut persistence, seed.competitie_id);

    let result: Result<RequestOutcome, ApiError> = request_extra_rk_deelnemer(
        &mut persistence,
        &aanvrager("BKO"),
        seed.bk(),
        &create_extra_request(200_001, seed.klasse()),
        IN_FASE_J,
    );

    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "extra_alleen_rk"
    ));
}

// ============================================================================
// Small-class merge
// ============================================================================

#[test]
fn test_verplaats_klasse_is_queued_in_fase_n() {
    let mut persistence: Persistence = create_persistence();
    let seed: Seed = seed_competitie(&mut persistence);
    sluit_rk(&mut persistence, seed.competitie_id);
    let deelnemer_id: i64 = seed_deelnemer(
        &mut persistence,
        seed.bk(),
        seed.klasse(),
        100_001,
        Some(CLUB_RAYON_1),
        Deelname::Ja,
    );

    let outcome: RequestOutcome = request_verplaats_klasse(
        &mut persistence,
        &aanvrager("BKO"),
        deelnemer_id,
        seed.andere_klasse(),
        IN_FASE_L,
    )
    .unwrap();
    assert!(outcome.mutatie_id().is_some());

    process_all(&mut persistence);
    let record: DeelnemerRecord = persistence.get_deelnemer(deelnemer_id).unwrap();
    assert_eq!(record.indiv_klasse_id, seed.andere_klasse());
}

#[test]
fn test_verplaats_to_same_klasse_is_unchanged() {
    let mut persistence: Persistence = create_persistence();
    let seed: Seed = seed_competitie(&mut persistence);
    sluit_rk(&mut persistence, seed.competitie_id);
    let deelnemer_id: i64 = seed_deelnemer(
        &mut persistence,
        seed.bk(),
        seed.klasse(),
        100_001,
        Some(CLUB_RAYON_1),
        Deelname::Ja,
    );

    let outcome: RequestOutcome = request_verplaats_klasse(
        &mut persistence,
        &aanvrager("BKO"),
        deelnemer_id,
        seed.klasse(),
        IN_FASE_L,
    )
    .unwrap();

    assert_eq!(outcome, RequestOutcome::Unchanged);
}

#[test]
fn test_verplaats_of_rk_entry_is_rejected() {
    let mut persistence: Persistence = create_persistence();
    let seed: Seed = seed_competitie(&mut persistence);
    sluit_rk(&mut persistence, seed.competitie_id);
    let deelnemer_id: i64 = seed_deelnemer(
        &mut persistence,
        seed.rk(1),
        seed.klasse(),
        100_001,
        Some(CLUB_RAYON_1),
        Deelname::Ja,
    );

    let result: Result<RequestOutcome, ApiError> = request_verplaats_klasse(
        &mut persistence,
        &aanvrager("BKO"),
        deelnemer_id,
        seed.andere_klasse(),
        IN_FASE_L,
    );

    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "verplaats_alleen_bk"
    ));
}
