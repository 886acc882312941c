// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Queued ranking changes.
//!
//! A mutation is stored as a stable code plus a JSON payload. The code is
//! kept in its own column so the queue can be inspected without decoding
//! payloads, and a row is only trusted when both agree.

use crate::error::CoreError;
use kampcomp_domain::NieuweDeelnemer;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A queued change to the championship lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mutatie", rename_all = "snake_case")]
pub enum Mutation {
    /// Establish every class of a tier from scratch.
    Initieel {
        /// The tier to recompute.
        kampioenschap_id: i64,
    },
    /// Change the limiet of one class.
    Cut {
        /// The tier.
        kampioenschap_id: i64,
        /// The class.
        indiv_klasse_id: i64,
        /// The limiet the requester saw; informational.
        cut_oud: u16,
        /// The requested limiet.
        cut_nieuw: u16,
    },
    /// Withdraw an entry.
    Afmelden {
        /// The entry.
        deelnemer_id: i64,
    },
    /// Confirm an entry, or register it again after a withdrawal.
    Aanmelden {
        /// The entry.
        deelnemer_id: i64,
    },
    /// Add a late RK entry.
    ExtraRkDeelnemer {
        /// The RK tier.
        kampioenschap_id: i64,
        /// The entry to add.
        nieuw: NieuweDeelnemer,
    },
    /// Move an entry into another class (BK small-class merge).
    VerplaatsKlasse {
        /// The entry.
        deelnemer_id: i64,
        /// The target class.
        indiv_klasse_id: i64,
    },
    /// Close the regio competition and build the RK lists.
    RegioNaarRk {
        /// The competition.
        competitie_id: i64,
    },
    /// Close the RK and build the BK lists.
    RkNaarBk {
        /// The competition.
        competitie_id: i64,
    },
    /// Create the competitions of a new season.
    CompetitieOpstarten {
        /// First year of the season.
        begin_jaar: u16,
    },
    /// Archive a finished competition.
    Afsluiten {
        /// The competition.
        competitie_id: i64,
    },
    /// Recompute the regio averages of a competition from its scores.
    AgVaststellen {
        /// The competition.
        competitie_id: i64,
    },
}

/// The stable code stored with each queued mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    /// `INITIEEL`; `KAMP_REINIT` is read as the same kind
    Initieel,
    /// `CUT`
    Cut,
    /// `AFMELDEN_INDIV`
    Afmelden,
    /// `AANMELDEN_INDIV`
    Aanmelden,
    /// `EXTRA_RK_DEELNEMER`
    ExtraRkDeelnemer,
    /// `VERPLAATS_KLASSE_INDIV`
    VerplaatsKlasse,
    /// `REGIO_NAAR_RK`
    RegioNaarRk,
    /// `RK_NAAR_BK`
    RkNaarBk,
    /// `COMPETITIE_OPSTARTEN`
    CompetitieOpstarten,
    /// `AFSLUITEN`
    Afsluiten,
    /// `AG_VASTSTELLEN`
    AgVaststellen,
}

impl MutationKind {
    /// Returns the stored code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Initieel => "INITIEEL",
            Self::Cut => "CUT",
            Self::Afmelden => "AFMELDEN_INDIV",
            Self::Aanmelden => "AANMELDEN_INDIV",
            Self::ExtraRkDeelnemer => "EXTRA_RK_DEELNEMER",
            Self::VerplaatsKlasse => "VERPLAATS_KLASSE_INDIV",
            Self::RegioNaarRk => "REGIO_NAAR_RK",
            Self::RkNaarBk => "RK_NAAR_BK",
            Self::CompetitieOpstarten => "COMPETITIE_OPSTARTEN",
            Self::Afsluiten => "AFSLUITEN",
            Self::AgVaststellen => "AG_VASTSTELLEN",
        }
    }
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MutationKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INITIEEL" | "KAMP_REINIT" => Ok(Self::Initieel),
            "CUT" => Ok(Self::Cut),
            "AFMELDEN_INDIV" => Ok(Self::Afmelden),
            "AANMELDEN_INDIV" => Ok(Self::Aanmelden),
            "EXTRA_RK_DEELNEMER" => Ok(Self::ExtraRkDeelnemer),
            "VERPLAATS_KLASSE_INDIV" => Ok(Self::VerplaatsKlasse),
            "REGIO_NAAR_RK" => Ok(Self::RegioNaarRk),
            "RK_NAAR_BK" => Ok(Self::RkNaarBk),
            "COMPETITIE_OPSTARTEN" => Ok(Self::CompetitieOpstarten),
            "AFSLUITEN" => Ok(Self::Afsluiten),
            "AG_VASTSTELLEN" => Ok(Self::AgVaststellen),
            _ => Err(CoreError::UnknownMutation {
                kind: s.to_string(),
            }),
        }
    }
}

impl Mutation {
    /// Returns the code stored with this mutation.
    #[must_use]
    pub const fn kind(&self) -> MutationKind {
        match self {
            Self::Initieel { .. } => MutationKind::Initieel,
            Self::Cut { .. } => MutationKind::Cut,
            Self::Afmelden { .. } => MutationKind::Afmelden,
            Self::Aanmelden { .. } => MutationKind::Aanmelden,
            Self::ExtraRkDeelnemer { .. } => MutationKind::ExtraRkDeelnemer,
            Self::VerplaatsKlasse { .. } => MutationKind::VerplaatsKlasse,
            Self::RegioNaarRk { .. } => MutationKind::RegioNaarRk,
            Self::RkNaarBk { .. } => MutationKind::RkNaarBk,
            Self::CompetitieOpstarten { .. } => MutationKind::CompetitieOpstarten,
            Self::Afsluiten { .. } => MutationKind::Afsluiten,
            Self::AgVaststellen { .. } => MutationKind::AgVaststellen,
        }
    }

    /// The competition named directly by the payload, if any.
    ///
    /// Mutations that only name an entry or tier resolve their competition
    /// when they are enqueued.
    #[must_use]
    pub const fn competitie_id(&self) -> Option<i64> {
        match self {
            Self::RegioNaarRk { competitie_id }
            | Self::RkNaarBk { competitie_id }
            | Self::Afsluiten { competitie_id }
            | Self::AgVaststellen { competitie_id } => Some(*competitie_id),
            _ => None,
        }
    }

    /// Encodes the payload for storage.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MalformedPayload` if serialization fails.
    pub fn to_payload(&self) -> Result<String, CoreError> {
        serde_json::to_string(self).map_err(|err| CoreError::MalformedPayload {
            kind: self.kind().as_str().to_string(),
            message: err.to_string(),
        })
    }

    /// Decodes a stored mutation.
    ///
    /// # Arguments
    ///
    /// * `kind` - The stored code
    /// * `payload` - The stored JSON payload
    ///
    /// # Errors
    ///
    /// Returns `CoreError::UnknownMutation` for an unknown code and
    /// `CoreError::MalformedPayload` when the payload does not decode or names
    /// a different mutation than the code.
    pub fn decode(kind: &str, payload: &str) -> Result<Self, CoreError> {
        let expected: MutationKind = kind.parse()?;
        let mutation: Self =
            serde_json::from_str(payload).map_err(|err| CoreError::MalformedPayload {
                kind: kind.to_string(),
                message: err.to_string(),
            })?;

        if mutation.kind() != expected {
            return Err(CoreError::MalformedPayload {
                kind: kind.to_string(),
                message: format!("payload holds a {} mutation", mutation.kind()),
            });
        }
        Ok(mutation)
    }
}
