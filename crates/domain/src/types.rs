// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::fase::Fases;
use crate::tijdlijn::Tijdlijn;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Date;

/// Default minimum number of regio scores needed to enter the RK.
pub const AANTAL_SCORES_VOOR_RK_DEELNAME: u8 = 6;

/// Whether a sporter takes part in a championship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Deelname {
    /// Confirmed.
    Ja,
    /// Withdrawn.
    Nee,
    /// Not yet confirmed.
    Onbekend,
}

impl Deelname {
    /// Returns the single-letter storage code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ja => "J",
            Self::Nee => "N",
            Self::Onbekend => "O",
        }
    }
}

impl FromStr for Deelname {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "J" => Ok(Self::Ja),
            "N" => Ok(Self::Nee),
            "O" => Ok(Self::Onbekend),
            _ => Err(DomainError::InvalidDeelname(s.to_string())),
        }
    }
}

/// Championship tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Deel {
    /// Rayonkampioenschap.
    Rk,
    /// Bondskampioenschap.
    Bk,
}

impl Deel {
    /// Returns the storage code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rk => "RK",
            Self::Bk => "BK",
        }
    }
}

impl FromStr for Deel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RK" => Ok(Self::Rk),
            "BK" => Ok(Self::Bk),
            _ => Err(DomainError::InvalidDeel(s.to_string())),
        }
    }
}

/// Shooting distance of a competition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Afstand {
    /// 18 meter indoor.
    Achttien,
    /// 25 meter, one arrow.
    Vijfentwintig,
}

impl Afstand {
    /// Returns the storage code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Achttien => "18",
            Self::Vijfentwintig => "25",
        }
    }

    /// Number of arrows in one regio round.
    #[must_use]
    pub const fn aantal_pijlen_per_ronde(&self) -> u32 {
        match self {
            Self::Achttien => 30,
            Self::Vijfentwintig => 25,
        }
    }

    /// Number of arrows in the two RK rounds, used to turn a score into an average.
    #[must_use]
    pub const fn aantal_pijlen_rk(&self) -> u32 {
        match self {
            Self::Achttien => 60,
            Self::Vijfentwintig => 50,
        }
    }
}

impl FromStr for Afstand {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "18" => Ok(Self::Achttien),
            "25" => Ok(Self::Vijfentwintig),
            _ => Err(DomainError::InvalidAfstand(s.to_string())),
        }
    }
}

/// An average score per arrow, stored with three decimals.
///
/// Internally this is a count of thousandths so that comparisons are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Gemiddelde(u32);

impl Gemiddelde {
    /// Creates an average from thousandths (9.123 is 9123).
    #[must_use]
    pub const fn from_milli(milli: u32) -> Self {
        Self(milli)
    }

    /// Returns the value in thousandths.
    #[must_use]
    pub const fn milli(&self) -> u32 {
        self.0
    }

    /// Computes `som / pijlen`, rounded half up to three decimals.
    ///
    /// A zero arrow count yields zero.
    #[must_use]
    pub fn from_scores(som: u32, pijlen: u32) -> Self {
        if pijlen == 0 {
            return Self(0);
        }
        let scaled: u64 = u64::from(som) * 2000 + u64::from(pijlen);
        let milli: u64 = scaled / (2 * u64::from(pijlen));
        Self(u32::try_from(milli).unwrap_or(u32::MAX))
    }
}

impl std::fmt::Display for Gemiddelde {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:03}", self.0 / 1000, self.0 % 1000)
    }
}

impl FromStr for Gemiddelde {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidGemiddelde(s.to_string());
        let (whole, frac): (&str, &str) = s.trim().split_once('.').unwrap_or((s.trim(), ""));

        if whole.is_empty() || frac.len() > 3 || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole: u32 = whole.parse().map_err(|_| invalid())?;
        let mut padded: String = frac.to_string();
        while padded.len() < 3 {
            padded.push('0');
        }
        let frac: u32 = padded.parse().map_err(|_| invalid())?;

        whole
            .checked_mul(1000)
            .and_then(|w| w.checked_add(frac))
            .map(Self)
            .ok_or_else(invalid)
    }
}

/// A club with its position in the regional structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Club {
    /// Club number.
    pub ver_nr: i64,
    /// Club name.
    pub naam: String,
    /// Regio the club belongs to.
    pub regio_nr: u16,
    /// Rayon the regio belongs to.
    pub rayon_nr: u8,
}

impl Club {
    /// Creates a new club.
    #[must_use]
    pub const fn new(ver_nr: i64, naam: String, regio_nr: u16, rayon_nr: u8) -> Self {
        Self {
            ver_nr,
            naam,
            regio_nr,
            rayon_nr,
        }
    }
}

/// An individual competition class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndivKlasse {
    /// Class identifier.
    pub id: i64,
    /// Sort order of the class within the competition.
    pub volgorde: u16,
    /// Human readable name.
    pub beschrijving: String,
    /// Whether the class continues into the RK and BK.
    pub is_ook_voor_rk_bk: bool,
}

/// One competition: a distance in a season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitie {
    /// Competition identifier.
    pub id: i64,
    /// First year of the season.
    pub begin_jaar: u16,
    /// Shooting distance.
    pub afstand: Afstand,
    /// Human readable name.
    pub beschrijving: String,
    /// Minimum regio scores needed to enter the RK.
    pub aantal_scores_voor_rk_deelname: u8,
    /// Phase dates and flags.
    pub tijdlijn: Tijdlijn,
}

impl Competitie {
    /// Derives the phases of both tracks.
    #[must_use]
    pub fn bepaal_fases(&self, today: Date) -> Fases {
        self.tijdlijn.bepaal_fases(today)
    }
}

/// A championship tier of a competition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kampioenschap {
    /// Tier identifier.
    pub id: i64,
    /// Owning competition.
    pub competitie_id: i64,
    /// RK or BK.
    pub deel: Deel,
    /// The rayon number for an RK; `None` for the BK.
    pub rayon_nr: Option<u8>,
    /// Display name of the rayon, used for champion labels.
    pub rayon_naam: String,
    /// Whether the entry list has been established.
    pub heeft_deelnemerslijst: bool,
    /// Whether the tier is closed.
    pub is_afgesloten: bool,
}

/// Result code range reserved for special RK outcomes.
pub const KAMP_RANK_BLANCO: u16 = 32_000;
/// Did not shoot, was a reserve.
pub const KAMP_RANK_RESERVE: u16 = 32_001;
/// Invited but did not show up.
pub const KAMP_RANK_NO_SHOW: u16 = 32_002;

/// The outcome of an RK for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RkUitslag {
    /// No result imported.
    Geen,
    /// Placed at the given rank (1 is the rayon champion).
    Geplaatst(u16),
    /// Shot, but the result is kept blank.
    Blanco,
    /// Was a reserve and did not shoot.
    Reserve,
    /// Did not show up.
    NoShow,
}

impl RkUitslag {
    /// Decodes a stored `result_rank`.
    #[must_use]
    pub const fn from_code(code: u16) -> Self {
        match code {
            0 => Self::Geen,
            KAMP_RANK_BLANCO => Self::Blanco,
            KAMP_RANK_RESERVE => Self::Reserve,
            KAMP_RANK_NO_SHOW => Self::NoShow,
            rank => Self::Geplaatst(rank),
        }
    }

    /// Encodes to the stored `result_rank`.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::Geen => 0,
            Self::Geplaatst(rank) => *rank,
            Self::Blanco => KAMP_RANK_BLANCO,
            Self::Reserve => KAMP_RANK_RESERVE,
            Self::NoShow => KAMP_RANK_NO_SHOW,
        }
    }

    /// Whether this result qualifies for the BK candidate list.
    #[must_use]
    pub const fn telt_voor_bk(&self) -> bool {
        matches!(self, Self::Geplaatst(_) | Self::Blanco)
    }
}
