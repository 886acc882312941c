// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, Fase};

#[test]
fn test_domain_error_display() {
    let err: DomainError = DomainError::UnsupportedPhaseCombination {
        indiv: Fase::A,
        teams: Fase::C,
    };
    assert_eq!(
        format!("{err}"),
        "Combination indiv_fase=A and team_fase=C is not supported"
    );

    let err: DomainError = DomainError::WrongPhase {
        actie: String::from("wijzig RK deelname"),
        fase: Fase::G,
    };
    assert_eq!(
        format!("{err}"),
        "Wrong phase: 'wijzig RK deelname' is not allowed in fase G"
    );

    let err: DomainError = DomainError::InvalidLimiet { limiet: 49 };
    assert_eq!(
        format!("{err}"),
        "Invalid limiet 49: must be between 1 and 48"
    );

    let err: DomainError = DomainError::EntryNotFound { entry_id: 7 };
    assert_eq!(format!("{err}"), "Entry 7 not found");

    let err: DomainError = DomainError::NoClub { lid_nr: 100_001 };
    assert_eq!(
        format!("{err}"),
        "Sporter 100001 must be a member of a club"
    );

    let err: DomainError = DomainError::InvalidFase(String::from("E"));
    assert_eq!(format!("{err}"), "Invalid fase: E");
}

#[test]
fn test_wrong_phase_is_distinct_from_not_found() {
    let wrong: DomainError = DomainError::WrongPhase {
        actie: String::from("x"),
        fase: Fase::C,
    };
    let missing: DomainError = DomainError::EntryNotFound { entry_id: 1 };
    assert_ne!(wrong, missing);
}
