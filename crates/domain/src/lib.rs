// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod cascade;
mod error;
mod fase;
mod ranking;
mod tijdlijn;
mod types;

#[cfg(test)]
mod tests;

pub use cascade::{
    NieuweDeelnemer, OverstapBesluit, OverstapNiveau, PhaseGate, RegioInschrijving, RkPlaatsing,
    RkResultaat, RkSelectie, beoordeel_overstap, check_kan_bevestigen, regio_scores_string,
    selecteer_bk_deelnemers, selecteer_rk_deelnemers,
};
pub use error::DomainError;
pub use fase::{Fase, Fases};
pub use ranking::{
    BK_MAX_DEELNEMERS, CutChange, DEFAULT_LIMIET, Entry, MAX_LIMIET, RankingSet,
    ReregisterOutcome, WithdrawOutcome, validate_limiet,
};
pub use tijdlijn::{DAGEN_FASE_K, DEFAULT_DATUM, RkTeamsInschrijving, Tijdlijn};
pub use types::{
    AANTAL_SCORES_VOOR_RK_DEELNAME, Afstand, Club, Competitie, Deel, Deelname, Gemiddelde,
    IndivKlasse, KAMP_RANK_BLANCO, KAMP_RANK_NO_SHOW, KAMP_RANK_RESERVE, Kampioenschap, RkUitslag,
};
