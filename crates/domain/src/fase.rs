// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Competition phase letters.
//!
//! A competition moves through the letters A..Q once per season. The letters
//! E, H, I and M are skipped by convention. Z marks an archived competition and
//! is not part of the normal progression.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The phase of one track (individual or team) of a competition.
///
/// Variants are declared in timeline order so that `Ord` follows the
/// alphabet, which lets callers write range checks such as `C <= fase <= F`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Fase {
    /// Setting up the season; class boundaries not yet fixed.
    A,
    /// Preparation by the regional officials.
    B,
    /// Open for registration.
    C,
    /// Regional poules and schedules (regio specific).
    D,
    /// Regional matches.
    F,
    /// Establishing the regional results.
    G,
    /// RK preparation: confirm or withdraw.
    J,
    /// RK preparation: final two weeks.
    K,
    /// RK matches.
    L,
    /// Merging small classes for the BK.
    N,
    /// BK preparation.
    O,
    /// BK matches.
    P,
    /// Season finished.
    Q,
    /// Archived.
    Z,
}

impl Fase {
    /// Returns the letter of this phase.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
            Self::G => "G",
            Self::J => "J",
            Self::K => "K",
            Self::L => "L",
            Self::N => "N",
            Self::O => "O",
            Self::P => "P",
            Self::Q => "Q",
            Self::Z => "Z",
        }
    }

    /// Short human-readable description of the phase.
    #[must_use]
    pub const fn beschrijving(&self) -> &'static str {
        match self {
            Self::A => "opstarten",
            Self::B => "voorbereiden",
            Self::C | Self::D => "inschrijven",
            Self::F => "wedstrijden regio",
            Self::G => "vaststellen uitslag regio",
            Self::J | Self::K => "voorbereiding RK",
            Self::L => "wedstrijden RK",
            Self::N => "kleine klassen samenvoegen BK",
            Self::O => "voorbereiding BK",
            Self::P => "wedstrijden BK",
            Self::Q => "einde competitie",
            Self::Z => "afgesloten",
        }
    }

    /// Returns true while sporters may register for the regional competition.
    #[must_use]
    pub fn is_open_voor_inschrijven(&self) -> bool {
        (Self::C..=Self::F).contains(self)
    }

    /// Phases that may only be requested for both tracks at once.
    #[must_use]
    pub const fn is_synchronous(&self) -> bool {
        matches!(
            self,
            Self::A | Self::B | Self::F | Self::G | Self::Q | Self::Z
        )
    }
}

impl std::fmt::Display for Fase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Fase {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            "F" => Ok(Self::F),
            "G" => Ok(Self::G),
            "J" => Ok(Self::J),
            "K" => Ok(Self::K),
            "L" => Ok(Self::L),
            "N" => Ok(Self::N),
            "O" => Ok(Self::O),
            "P" => Ok(Self::P),
            "Q" => Ok(Self::Q),
            "Z" => Ok(Self::Z),
            _ => Err(DomainError::InvalidFase(s.to_string())),
        }
    }
}

/// The phases of both tracks of a competition at one moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fases {
    /// Phase of the individual competition.
    pub indiv: Fase,
    /// Phase of the team competition.
    pub teams: Fase,
}

impl Fases {
    /// Creates a new phase pair.
    #[must_use]
    pub const fn new(indiv: Fase, teams: Fase) -> Self {
        Self { indiv, teams }
    }

    /// Describes both tracks, e.g. `"Competitie fase individueel: J (voorbereiding RK)"`.
    #[must_use]
    pub fn beschrijvingen(&self) -> (String, String) {
        (
            format!(
                "Competitie fase individueel: {} ({})",
                self.indiv,
                self.indiv.beschrijving()
            ),
            format!(
                "Competitie fase teams: {} ({})",
                self.teams,
                self.teams.beschrijving()
            ),
        )
    }
}
