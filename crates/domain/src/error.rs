// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::fase::Fase;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The requested pair of phases cannot be reached together.
    UnsupportedPhaseCombination {
        /// The requested individual phase.
        indiv: Fase,
        /// The requested team phase.
        teams: Fase,
    },
    /// A phase letter could not be parsed.
    InvalidFase(String),
    /// A deelname code could not be parsed.
    InvalidDeelname(String),
    /// A tier code could not be parsed.
    InvalidDeel(String),
    /// A distance code could not be parsed.
    InvalidAfstand(String),
    /// A gemiddelde value could not be parsed.
    InvalidGemiddelde(String),
    /// The limiet is outside the permitted range.
    InvalidLimiet {
        /// The rejected value.
        limiet: i64,
    },
    /// An action was attempted outside its phase window.
    WrongPhase {
        /// The action that was attempted.
        actie: String,
        /// The phase the competition is in.
        fase: Fase,
    },
    /// The entry does not exist in the ranking set.
    EntryNotFound {
        /// The entry identifier.
        entry_id: i64,
    },
    /// An entry with this identifier is already present.
    DuplicateEntry {
        /// The entry identifier.
        entry_id: i64,
    },
    /// The sporter is not a member of any club.
    NoClub {
        /// The sporter's member number.
        lid_nr: i64,
    },
    /// The ranking set no longer satisfies its ordering invariants.
    RankingInvariantViolated(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedPhaseCombination { indiv, teams } => {
                write!(
                    f,
                    "Combination indiv_fase={indiv} and team_fase={teams} is not supported"
                )
            }
            Self::InvalidFase(msg) => write!(f, "Invalid fase: {msg}"),
            Self::InvalidDeelname(msg) => write!(f, "Invalid deelname: {msg}"),
            Self::InvalidDeel(msg) => write!(f, "Invalid tier: {msg}"),
            Self::InvalidAfstand(msg) => write!(f, "Invalid afstand: {msg}"),
            Self::InvalidGemiddelde(msg) => write!(f, "Invalid gemiddelde: {msg}"),
            Self::InvalidLimiet { limiet } => {
                write!(f, "Invalid limiet {limiet}: must be between 1 and 48")
            }
            Self::WrongPhase { actie, fase } => {
                write!(f, "Wrong phase: '{actie}' is not allowed in fase {fase}")
            }
            Self::EntryNotFound { entry_id } => write!(f, "Entry {entry_id} not found"),
            Self::DuplicateEntry { entry_id } => {
                write!(f, "Entry {entry_id} is already in the ranking set")
            }
            Self::NoClub { lid_nr } => {
                write!(f, "Sporter {lid_nr} must be a member of a club")
            }
            Self::RankingInvariantViolated(msg) => {
                write!(f, "Ranking invariant violated: {msg}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
