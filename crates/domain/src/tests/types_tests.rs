// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Afstand, Deel, Deelname, DomainError, Fase, Gemiddelde, RkUitslag};
use std::str::FromStr;

#[test]
fn test_fase_ordering_follows_alphabet() {
    assert!(Fase::A < Fase::B);
    assert!(Fase::D < Fase::F);
    assert!(Fase::G < Fase::J);
    assert!(Fase::L < Fase::N);
    assert!(Fase::Q < Fase::Z);
}

#[test]
fn test_fase_parse_and_display() {
    assert_eq!(Fase::from_str("K").unwrap(), Fase::K);
    assert_eq!(Fase::K.to_string(), "K");
    assert_eq!(
        Fase::from_str("E"),
        Err(DomainError::InvalidFase(String::from("E")))
    );
}

#[test]
fn test_fase_open_voor_inschrijven() {
    assert!(!Fase::B.is_open_voor_inschrijven());
    assert!(Fase::C.is_open_voor_inschrijven());
    assert!(Fase::D.is_open_voor_inschrijven());
    assert!(Fase::F.is_open_voor_inschrijven());
    assert!(!Fase::G.is_open_voor_inschrijven());
}

#[test]
fn test_gemiddelde_parse_and_display() {
    let gem: Gemiddelde = Gemiddelde::from_str("9.123").unwrap();
    assert_eq!(gem.milli(), 9_123);
    assert_eq!(gem.to_string(), "9.123");

    assert_eq!(Gemiddelde::from_str("8.5").unwrap().milli(), 8_500);
    assert_eq!(Gemiddelde::from_str("10").unwrap().to_string(), "10.000");
    assert!(Gemiddelde::from_str("8.1234").is_err());
    assert!(Gemiddelde::from_str("abc").is_err());
    assert!(Gemiddelde::from_str("").is_err());
}

#[test]
fn test_gemiddelde_from_scores_rounds_half_up() {
    // 580 / 60 = 9.6666...
    assert_eq!(Gemiddelde::from_scores(580, 60).milli(), 9_667);
    // 1 / 8 = 0.125 exactly
    assert_eq!(Gemiddelde::from_scores(1, 8).milli(), 125);
    // 1 / 16 = 0.0625 rounds to 0.063
    assert_eq!(Gemiddelde::from_scores(1, 16).milli(), 63);
    assert_eq!(Gemiddelde::from_scores(500, 0).milli(), 0);
}

#[test]
fn test_codes_round_trip() {
    for deelname in [Deelname::Ja, Deelname::Nee, Deelname::Onbekend] {
        assert_eq!(Deelname::from_str(deelname.as_str()).unwrap(), deelname);
    }
    for deel in [Deel::Rk, Deel::Bk] {
        assert_eq!(Deel::from_str(deel.as_str()).unwrap(), deel);
    }
    assert_eq!(Afstand::from_str("25").unwrap(), Afstand::Vijfentwintig);
    assert!(Deelname::from_str("X").is_err());
}

#[test]
fn test_rk_uitslag_codes() {
    assert_eq!(RkUitslag::from_code(0), RkUitslag::Geen);
    assert_eq!(RkUitslag::from_code(3), RkUitslag::Geplaatst(3));
    assert_eq!(RkUitslag::from_code(32_000), RkUitslag::Blanco);
    assert_eq!(RkUitslag::from_code(32_002), RkUitslag::NoShow);
    assert_eq!(RkUitslag::Reserve.code(), 32_001);

    assert!(RkUitslag::Geplaatst(1).telt_voor_bk());
    assert!(RkUitslag::Blanco.telt_voor_bk());
    assert!(!RkUitslag::Reserve.telt_voor_bk());
    assert!(!RkUitslag::NoShow.telt_voor_bk());
    assert!(!RkUitslag::Geen.telt_voor_bk());
}
