// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use kampcomp_domain::{Fase, Gemiddelde};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Errors in the requester fields of a request body.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// The requester name is blank.
    #[error("Requester name must not be empty")]
    MissingDoor,

    /// The role is not one of BB, BKO, RKO <rayon> or HWL <ver_nr>.
    #[error("Unknown role '{0}'")]
    InvalidRol(String),

    /// The participation action is not `bevestigen` or `afmelden`.
    #[error("Unknown participation action '{0}'")]
    InvalidActie(String),
}

/// What a participation request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeelnameActie {
    /// Confirm the entry, or register it again after a withdrawal.
    Bevestigen,
    /// Withdraw the entry.
    Afmelden,
}

impl FromStr for DeelnameActie {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bevestigen" | "aanmelden" => Ok(Self::Bevestigen),
            "afmelden" => Ok(Self::Afmelden),
            _ => Err(PayloadError::InvalidActie(s.to_string())),
        }
    }
}

/// The outcome of a request that may queue a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RequestOutcome {
    /// A mutation was queued.
    Queued {
        /// The queue row.
        mutatie_id: i64,
    },
    /// The request matches the current state; nothing was queued.
    Unchanged,
}

impl RequestOutcome {
    /// The queued mutation, if any.
    #[must_use]
    pub const fn mutatie_id(&self) -> Option<i64> {
        match self {
            Self::Queued { mutatie_id } => Some(*mutatie_id),
            Self::Unchanged => None,
        }
    }
}

/// Whether a queued mutation has been processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationStatus {
    /// The queue row.
    pub mutatie_id: i64,
    /// The stored mutation code.
    pub kind: String,
    /// Whether the worker has applied it.
    pub processed: bool,
    /// When it was applied (UTC).
    pub verwerkt_at: Option<String>,
    /// Why the worker gave up on it, if it did.
    pub fout: Option<String>,
}

/// The phases of a competition on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaseResponse {
    /// The competition.
    pub competitie_id: i64,
    /// Its name.
    pub beschrijving: String,
    /// Phase of the individual track.
    pub fase_indiv: Fase,
    /// Phase of the team track.
    pub fase_teams: Fase,
}

/// Requester fields shared by every request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeelnameRequest {
    /// The requester's name.
    pub door: String,
    /// The role, e.g. `RKO 2` or `HWL 1001`.
    pub rol: String,
}

/// Body of a limiet change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimietRequest {
    /// The requester's name.
    pub door: String,
    /// The role.
    pub rol: String,
    /// The class within the tier.
    pub indiv_klasse_id: i64,
    /// The new limiet as typed; validated before anything is queued.
    pub limiet: String,
}

/// A late RK entry, as submitted by the RKO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraDeelnemerRequest {
    /// The sporter/bow pairing.
    pub sporterboog_id: i64,
    /// The sporter's member number.
    pub lid_nr: i64,
    /// Class in the RK.
    pub indiv_klasse_id: i64,
    /// Class for the BK.
    pub indiv_klasse_volgende_ronde_id: i64,
    /// Seed strength.
    pub gemiddelde: Gemiddelde,
    /// Tie-break digit string.
    pub gemiddelde_scores: String,
}

/// The outcome of a request over HTTP, after the sync poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedResponse {
    /// The queued mutation, if one was needed.
    pub mutatie_id: Option<i64>,
    /// Whether the change is visible now; `false` means it is still queued.
    pub processed: bool,
}
