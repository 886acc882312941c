// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{create_club, create_ctx};
use crate::{OverstapKandidaat, OverstapPlan, plan_overstap};
use kampcomp_domain::{Club, Fase, OverstapBesluit, OverstapNiveau};

fn kandidaat(
    record_id: i64,
    niveau: OverstapNiveau,
    fase_indiv: Fase,
    live: Option<Club>,
) -> OverstapKandidaat {
    OverstapKandidaat {
        niveau,
        record_id,
        lid_nr: 100_000 + record_id,
        fase_indiv,
        bevroren: create_club(1001, 101, 1),
        live,
    }
}

#[test]
fn test_regio_transfer_moves_club_and_regio() {
    let kandidaten: Vec<OverstapKandidaat> = vec![kandidaat(
        1,
        OverstapNiveau::Regio,
        Fase::C,
        Some(create_club(1002, 102, 1)),
    )];

    let plan: OverstapPlan = plan_overstap(&kandidaten, &create_ctx());

    assert_eq!(plan.acties.len(), 1);
    assert_eq!(plan.acties[0].ver_nr, 1002);
    assert_eq!(plan.acties[0].nieuwe_regio_nr, Some(102));
    assert_eq!(
        plan.acties[0].logboek.tekst,
        "Overstap van vereniging 1001 naar 1002 Club 1002"
    );
}

#[test]
fn test_rk_transfer_to_other_rayon_is_skipped() {
    let kandidaten: Vec<OverstapKandidaat> = vec![
        kandidaat(1, OverstapNiveau::Rk, Fase::J, Some(create_club(1002, 105, 2))),
        kandidaat(2, OverstapNiveau::Rk, Fase::K, Some(create_club(1003, 102, 1))),
    ];

    let plan: OverstapPlan = plan_overstap(&kandidaten, &create_ctx());

    assert_eq!(plan.acties.len(), 1);
    assert_eq!(plan.acties[0].record_id, 2);
    assert_eq!(plan.overgeslagen, vec![(1, OverstapBesluit::AndereRayon)]);
}

#[test]
fn test_unchanged_and_clubless_records_are_left_alone() {
    let kandidaten: Vec<OverstapKandidaat> = vec![
        kandidaat(1, OverstapNiveau::Bk, Fase::N, Some(create_club(1001, 101, 1))),
        kandidaat(2, OverstapNiveau::Bk, Fase::N, None),
        kandidaat(3, OverstapNiveau::Bk, Fase::L, Some(create_club(1002, 102, 1))),
    ];

    let plan: OverstapPlan = plan_overstap(&kandidaten, &create_ctx());

    assert!(plan.acties.is_empty());
    assert_eq!(
        plan.overgeslagen,
        vec![
            (2, OverstapBesluit::GeenVereniging),
            (3, OverstapBesluit::BuitenVenster)
        ]
    );
}
