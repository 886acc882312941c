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

mod apply;
mod cascade;
mod competitie;
mod error;
mod mutation;
mod overstap;
mod state;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::apply;
pub use cascade::{
    CascadeInput, CascadeResult, GeplaatsteDeelnemer, KampioenschapLijst, Limieten, regio_naar_rk,
    rk_naar_bk,
};
pub use competitie::{
    AANTAL_RAYONS, AfsluitResult, AgResult, CompetitieOpzet, GemiddeldeWijziging,
    KampioenschapOpzet, KlasseOpzet, OpstartResult, competitie_afsluiten, competities_opstarten,
    gemiddelden_vaststellen,
};
pub use error::CoreError;
pub use mutation::{Mutation, MutationKind};
pub use overstap::{OverstapActie, OverstapKandidaat, OverstapPlan, plan_overstap};
pub use state::{KlasseState, LimietWijziging, MutationContext, Target, TransitionResult};
