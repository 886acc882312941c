// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Selection rules for moving sporters from one tier to the next.
//!
//! ## Regio to RK
//!
//! Registrations with enough regio scores in a class that continues into the
//! RK/BK are ordered by class, then by gemiddelde (highest first). The first
//! registration of each regio within a class is that regio's champion. Every
//! selected sporter is placed in the RK of the rayon of their current club,
//! and that club is frozen on the entry.
//!
//! ## RK to BK
//!
//! Every RK entry that took part and has a placed (or blanco) result moves on
//! to the BK in its next-round class. The RK winner becomes a champion and is
//! confirmed straight away.
//!
//! ## Phase gates and transfers
//!
//! Confirm and withdraw actions are only legal inside their phase window. A
//! sporter's frozen club may follow a club transfer only while the tier
//! allows it.

use crate::error::DomainError;
use crate::fase::Fase;
use crate::types::{Afstand, Club, Deel, Deelname, Gemiddelde, IndivKlasse, RkUitslag};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// Phase gates
// ============================================================================

/// An action whose legality depends on the individual phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseGate {
    /// RKO confirms or withdraws an RK entry, or changes an RK limiet.
    RkDeelname,
    /// A club official confirms or withdraws one of their members for the RK.
    HwlRkDeelname,
    /// BKO confirms or withdraws a BK entry, or changes a BK limiet.
    BkDeelname,
    /// Close the regio competition and build the RK lists.
    RegioAfsluiten,
    /// Close the RK and build the BK lists.
    RkAfsluiten,
    /// Move BK entries out of small classes.
    KleineKlassen,
    /// Archive the competition.
    Archiveren,
    /// Recompute the regio averages before the class limits are fixed.
    AgVaststellen,
}

impl PhaseGate {
    /// The gate for confirm/withdraw by the tier administrator.
    #[must_use]
    pub const fn deelname(deel: Deel) -> Self {
        match deel {
            Deel::Rk => Self::RkDeelname,
            Deel::Bk => Self::BkDeelname,
        }
    }

    /// The phases in which the action is allowed.
    #[must_use]
    pub const fn toegestaan(&self) -> &'static [Fase] {
        match self {
            Self::RkDeelname => &[Fase::J, Fase::K],
            Self::HwlRkDeelname => &[Fase::K, Fase::L],
            Self::BkDeelname => &[Fase::N, Fase::O],
            Self::RegioAfsluiten => &[Fase::G],
            Self::RkAfsluiten => &[Fase::L],
            Self::KleineKlassen => &[Fase::N],
            Self::Archiveren => &[Fase::Q],
            Self::AgVaststellen => &[Fase::A],
        }
    }

    /// Short name of the action, used in error messages.
    #[must_use]
    pub const fn actie(&self) -> &'static str {
        match self {
            Self::RkDeelname => "wijzig RK deelname",
            Self::HwlRkDeelname => "wijzig RK deelname door HWL",
            Self::BkDeelname => "wijzig BK deelname",
            Self::RegioAfsluiten => "regiocompetitie afsluiten",
            Self::RkAfsluiten => "RK afsluiten",
            Self::KleineKlassen => "kleine klassen samenvoegen",
            Self::Archiveren => "competitie afsluiten",
            Self::AgVaststellen => "aanvangsgemiddelden vaststellen",
        }
    }

    /// Checks the current individual phase against this gate.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::WrongPhase` outside the window.
    pub fn check(&self, fase: Fase) -> Result<(), DomainError> {
        if self.toegestaan().contains(&fase) {
            Ok(())
        } else {
            Err(DomainError::WrongPhase {
                actie: self.actie().to_string(),
                fase,
            })
        }
    }
}

/// Confirming participation requires a current club membership.
///
/// # Errors
///
/// Returns `DomainError::NoClub` when the sporter has no club.
pub const fn check_kan_bevestigen(
    lid_nr: i64,
    live_club: Option<&Club>,
) -> Result<(), DomainError> {
    match live_club {
        Some(_) => Ok(()),
        None => Err(DomainError::NoClub { lid_nr }),
    }
}

// ============================================================================
// Entries created by a cascade
// ============================================================================

/// A new championship entry produced by a cascade or added by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NieuweDeelnemer {
    /// The sporter/bow pairing.
    pub sporterboog_id: i64,
    /// The sporter's member number.
    pub lid_nr: i64,
    /// Class of this tier.
    pub indiv_klasse_id: i64,
    /// Class for the next tier.
    pub indiv_klasse_volgende_ronde_id: i64,
    /// The frozen club.
    pub bij_ver_nr: i64,
    /// Non-empty for a champion.
    pub kampioen_label: String,
    /// Initial participation state.
    pub deelname: Deelname,
    /// Seed strength.
    pub gemiddelde: Gemiddelde,
    /// Tie-break digit string.
    pub gemiddelde_scores: String,
    /// Logbook texts to record on creation, oldest first.
    pub logboek: Vec<String>,
}

/// A regio registration considered for the RK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegioInschrijving {
    /// Registration identifier.
    pub id: i64,
    /// The sporter/bow pairing.
    pub sporterboog_id: i64,
    /// The sporter's member number.
    pub lid_nr: i64,
    /// Class the sporter competed in.
    pub indiv_klasse_id: i64,
    /// Regio of the club the sporter registered with.
    pub regio_nr: u16,
    /// The seven regio scores; unshot rounds are 0.
    pub scores: [u16; 7],
    /// Number of rounds shot.
    pub aantal_scores: u8,
    /// Average over the shot rounds.
    pub gemiddelde: Gemiddelde,
    /// Whether the sporter wants to take part in the RK/BK.
    pub inschrijf_voorkeur_rk_bk: bool,
    /// The sporter's club today, if any.
    pub live_club: Option<Club>,
}

impl RegioInschrijving {
    /// The average per arrow over the shot rounds; `None` before the first round.
    #[must_use]
    pub fn gemiddelde_uit_scores(&self, afstand: Afstand) -> Option<Gemiddelde> {
        if self.aantal_scores == 0 {
            return None;
        }
        let som: u32 = self.scores.iter().map(|s| u32::from(*s)).sum();
        let pijlen: u32 = u32::from(self.aantal_scores) * afstand.aantal_pijlen_per_ronde();
        Some(Gemiddelde::from_scores(som, pijlen))
    }
}

/// Where a new RK entry goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RkPlaatsing {
    /// Rayon of the RK tier.
    pub rayon_nr: u8,
    /// The entry to create.
    pub deelnemer: NieuweDeelnemer,
}

/// The result of the regio to RK selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RkSelectie {
    /// Entries to create, in class order, strongest first.
    pub plaatsingen: Vec<RkPlaatsing>,
    /// Member numbers of qualifying sporters left out because they have no club.
    pub zonder_vereniging: Vec<i64>,
}

/// Formats the seven regio scores, best first, as a tie-break string.
#[must_use]
pub fn regio_scores_string(scores: &[u16; 7]) -> String {
    let mut sorted: [u16; 7] = *scores;
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.iter().map(|s| format!("{s:03}")).collect()
}

/// Selects the RK entries from the closed regio competition.
///
/// # Arguments
///
/// * `inschrijvingen` - All regio registrations of the competition
/// * `klassen` - The individual classes of the competition
/// * `min_scores` - Minimum number of regio scores required
#[must_use]
pub fn selecteer_rk_deelnemers(
    inschrijvingen: &[RegioInschrijving],
    klassen: &[IndivKlasse],
    min_scores: u8,
) -> RkSelectie {
    let mut kandidaten: Vec<(&IndivKlasse, &RegioInschrijving)> = inschrijvingen
        .iter()
        .filter(|i| i.aantal_scores >= min_scores)
        .filter_map(|i| {
            klassen
                .iter()
                .find(|k| k.id == i.indiv_klasse_id && k.is_ook_voor_rk_bk)
                .map(|k| (k, i))
        })
        .collect();

    kandidaten.sort_by(|(ka, a), (kb, b)| {
        ka.volgorde
            .cmp(&kb.volgorde)
            .then_with(|| b.gemiddelde.cmp(&a.gemiddelde))
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut selectie: RkSelectie = RkSelectie::default();
    let mut kampioen_regios: HashSet<(i64, u16)> = HashSet::new();

    for (klasse, inschrijving) in kandidaten {
        let kampioen_label: String = if kampioen_regios.insert((klasse.id, inschrijving.regio_nr)) {
            format!("Kampioen regio {}", inschrijving.regio_nr)
        } else {
            String::new()
        };

        let Some(club) = &inschrijving.live_club else {
            selectie.zonder_vereniging.push(inschrijving.lid_nr);
            continue;
        };

        let mut logboek: Vec<String> =
            vec!["Toegevoegd aan de RK indiv deelnemerslijst".to_string()];
        let deelname: Deelname = if inschrijving.inschrijf_voorkeur_rk_bk {
            Deelname::Onbekend
        } else {
            logboek.push("Deelname op Nee gezet want geen voorkeur RK/BK".to_string());
            Deelname::Nee
        };

        selectie.plaatsingen.push(RkPlaatsing {
            rayon_nr: club.rayon_nr,
            deelnemer: NieuweDeelnemer {
                sporterboog_id: inschrijving.sporterboog_id,
                lid_nr: inschrijving.lid_nr,
                indiv_klasse_id: klasse.id,
                indiv_klasse_volgende_ronde_id: klasse.id,
                bij_ver_nr: club.ver_nr,
                kampioen_label,
                deelname,
                gemiddelde: inschrijving.gemiddelde,
                gemiddelde_scores: regio_scores_string(&inschrijving.scores),
                logboek,
            },
        });
    }

    selectie
}

/// An RK entry with its result, considered for the BK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RkResultaat {
    /// The sporter/bow pairing.
    pub sporterboog_id: i64,
    /// The sporter's member number.
    pub lid_nr: i64,
    /// Class the sporter moves on in.
    pub indiv_klasse_volgende_ronde_id: i64,
    /// The frozen club.
    pub bij_ver_nr: i64,
    /// Name of the rayon of the RK.
    pub rayon_naam: String,
    /// Participation state at the end of the RK.
    pub deelname: Deelname,
    /// First RK score.
    pub result_score_1: u16,
    /// Second RK score.
    pub result_score_2: u16,
    /// RK outcome.
    pub uitslag: RkUitslag,
}

/// Selects the BK entries from the closed RK.
///
/// # Arguments
///
/// * `resultaten` - All RK entries of the competition
/// * `afstand` - The competition distance, which fixes the arrow count
#[must_use]
pub fn selecteer_bk_deelnemers(
    resultaten: &[RkResultaat],
    afstand: Afstand,
) -> Vec<NieuweDeelnemer> {
    let pijlen: u32 = afstand.aantal_pijlen_rk();

    resultaten
        .iter()
        .filter(|r| r.deelname != Deelname::Nee && r.uitslag.telt_voor_bk())
        .map(|r| {
            let som: u32 = u32::from(r.result_score_1) + u32::from(r.result_score_2);
            let hoog: u16 = r.result_score_1.max(r.result_score_2);
            let laag: u16 = r.result_score_1.min(r.result_score_2);

            let mut deelnemer: NieuweDeelnemer = NieuweDeelnemer {
                sporterboog_id: r.sporterboog_id,
                lid_nr: r.lid_nr,
                indiv_klasse_id: r.indiv_klasse_volgende_ronde_id,
                indiv_klasse_volgende_ronde_id: r.indiv_klasse_volgende_ronde_id,
                bij_ver_nr: r.bij_ver_nr,
                kampioen_label: String::new(),
                deelname: Deelname::Onbekend,
                gemiddelde: Gemiddelde::from_scores(som, pijlen),
                gemiddelde_scores: format!("{hoog:03}{laag:03}"),
                logboek: vec!["Toegevoegd aan de BK indiv deelnemerslijst".to_string()],
            };

            if r.uitslag == RkUitslag::Geplaatst(1) {
                deelnemer.kampioen_label = format!("Kampioen {}", r.rayon_naam);
                deelnemer.deelname = Deelname::Ja;
                deelnemer
                    .logboek
                    .push("Deelname op Ja gezet, want kampioen RK".to_string());
            }
            deelnemer
        })
        .collect()
}

// ============================================================================
// Club transfers
// ============================================================================

/// The tier of a record with a frozen club.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverstapNiveau {
    /// A regio registration.
    Regio,
    /// An RK entry.
    Rk,
    /// A BK entry.
    Bk,
}

impl From<Deel> for OverstapNiveau {
    fn from(deel: Deel) -> Self {
        match deel {
            Deel::Rk => Self::Rk,
            Deel::Bk => Self::Bk,
        }
    }
}

/// What to do with a record whose frozen club differs from the live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverstapBesluit {
    /// The clubs are the same.
    Ongewijzigd,
    /// Follow the transfer.
    Toepassen {
        /// The new club.
        ver_nr: i64,
        /// The new regio, when a regio registration moves to another regio.
        nieuwe_regio_nr: Option<u16>,
    },
    /// The sporter left every club; leave the record alone.
    GeenVereniging,
    /// The RK entry would have to move to another rayon; left for manual handling.
    AndereRayon,
    /// The current phase does not allow transfers for this tier.
    BuitenVenster,
}

impl OverstapBesluit {
    /// Returns true when the record should be updated.
    #[must_use]
    pub const fn is_toepassen(&self) -> bool {
        matches!(self, Self::Toepassen { .. })
    }
}

/// Decides whether a frozen club may follow the sporter's live club.
///
/// # Arguments
///
/// * `niveau` - The tier of the record
/// * `fase_indiv` - The individual phase of the competition
/// * `bevroren` - The club frozen on the record
/// * `live` - The sporter's current club, if any
#[must_use]
pub fn beoordeel_overstap(
    niveau: OverstapNiveau,
    fase_indiv: Fase,
    bevroren: &Club,
    live: Option<&Club>,
) -> OverstapBesluit {
    let Some(live) = live else {
        return OverstapBesluit::GeenVereniging;
    };
    if live.ver_nr == bevroren.ver_nr {
        return OverstapBesluit::Ongewijzigd;
    }

    match niveau {
        OverstapNiveau::Regio if fase_indiv <= Fase::F => OverstapBesluit::Toepassen {
            ver_nr: live.ver_nr,
            nieuwe_regio_nr: (live.regio_nr != bevroren.regio_nr).then_some(live.regio_nr),
        },
        OverstapNiveau::Rk if matches!(fase_indiv, Fase::J | Fase::K) => {
            if live.rayon_nr == bevroren.rayon_nr {
                OverstapBesluit::Toepassen {
                    ver_nr: live.ver_nr,
                    nieuwe_regio_nr: None,
                }
            } else {
                OverstapBesluit::AndereRayon
            }
        }
        OverstapNiveau::Bk if matches!(fase_indiv, Fase::N | Fase::O) => {
            OverstapBesluit::Toepassen {
                ver_nr: live.ver_nr,
                nieuwe_regio_nr: None,
            }
        }
        _ => OverstapBesluit::BuitenVenster,
    }
}
