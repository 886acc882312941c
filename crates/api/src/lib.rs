// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The producer side of the mutation queue.
//!
//! Requests are validated against the stored state and queued; they never
//! change entry lists directly. Validation fails fast: a request with a bad
//! role, a wrong phase or malformed input is rejected before a queue row
//! exists. The worker in the server crate applies what is queued.

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
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod error;
mod handlers;
mod poll;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{Aanvrager, Rol};
pub use error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use handlers::{
    fase_overzicht, mutation_status, request_afsluiten, request_ag_vaststellen,
    request_competitie_opstarten,
    request_cut_change, request_deelname_change, request_extra_rk_deelnemer,
    request_regio_naar_rk, request_rk_naar_bk, request_verplaats_klasse,
};
pub use poll::{DEFAULT_WAIT_CAP_MS, POLL_INTERVALS_MS, PollSchedule};
pub use request_response::{
    DeelnameActie, DeelnameRequest, ExtraDeelnemerRequest, FaseResponse, LimietRequest,
    MutationStatus, PayloadError, ProcessedResponse, RequestOutcome,
};
