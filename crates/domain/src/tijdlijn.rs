// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Phase calendar.
//!
//! The phase of a competition is never stored. It is derived from a handful
//! of dates and monotonic "closed" flags, walking back from the end of the
//! season: the first unmet threshold fixes the current phase. The individual
//! and team tracks are derived independently.

use crate::error::DomainError;
use crate::fase::{Fase, Fases};
use serde::{Deserialize, Serialize};
use time::macros::date;
use time::{Date, Duration};

/// Days between the start of fase K and the start of fase L.
pub const DAGEN_FASE_K: i64 = 14;

/// Default for every date field of a fresh competition.
pub const DEFAULT_DATUM: Date = date!(2000 - 01 - 01);

/// Registration state of the RK team window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RkTeamsInschrijving {
    /// Clubs may register RK teams now.
    Open,
    /// Registration opens on the given date.
    OpensOn(Date),
    /// Registration is far in the future or in the past.
    Closed,
}

/// Dates and progress flags from which both phase letters are derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Tijdlijn {
    /// Start of registration.
    pub begin_fase_c: Date,
    /// Start of fase D for the individual track (informational).
    pub begin_fase_d_indiv: Date,
    /// Start of the regional matches.
    pub begin_fase_f: Date,
    /// Last day of the regional matches.
    pub einde_fase_f: Date,
    /// Start of the RK matches, individual.
    pub begin_fase_l_indiv: Date,
    /// Start of the RK matches, teams.
    pub begin_fase_l_teams: Date,
    /// Start of the BK matches, individual.
    pub begin_fase_p_indiv: Date,
    /// Start of the BK matches, teams.
    pub begin_fase_p_teams: Date,
    /// Class boundaries for the regional competition are fixed.
    pub klassengrenzen_vastgesteld: bool,
    /// Class boundaries for the RK/BK teams are fixed.
    pub klassengrenzen_vastgesteld_rk_bk: bool,
    /// The regional competition is closed.
    pub regiocompetitie_is_afgesloten: bool,
    /// The individual RK is closed.
    pub rk_indiv_afgesloten: bool,
    /// The team RK is closed.
    pub rk_teams_afgesloten: bool,
    /// Small BK classes have been merged (individual).
    pub bk_indiv_klassen_zijn_samengevoegd: bool,
    /// Small BK classes have been merged (teams).
    pub bk_teams_klassen_zijn_samengevoegd: bool,
    /// The individual BK is closed.
    pub bk_indiv_afgesloten: bool,
    /// The team BK is closed.
    pub bk_teams_afgesloten: bool,
    /// The competition is archived.
    pub is_afgesloten: bool,
}

impl Default for Tijdlijn {
    fn default() -> Self {
        Self {
            begin_fase_c: DEFAULT_DATUM,
            begin_fase_d_indiv: DEFAULT_DATUM,
            begin_fase_f: DEFAULT_DATUM,
            einde_fase_f: DEFAULT_DATUM,
            begin_fase_l_indiv: DEFAULT_DATUM,
            begin_fase_l_teams: DEFAULT_DATUM,
            begin_fase_p_indiv: DEFAULT_DATUM,
            begin_fase_p_teams: DEFAULT_DATUM,
            klassengrenzen_vastgesteld: false,
            klassengrenzen_vastgesteld_rk_bk: false,
            regiocompetitie_is_afgesloten: false,
            rk_indiv_afgesloten: false,
            rk_teams_afgesloten: false,
            bk_indiv_klassen_zijn_samengevoegd: false,
            bk_teams_klassen_zijn_samengevoegd: false,
            bk_indiv_afgesloten: false,
            bk_teams_afgesloten: false,
            is_afgesloten: false,
        }
    }
}

impl Tijdlijn {
    /// Derives the phase of the individual competition.
    ///
    /// # Arguments
    ///
    /// * `today` - The evaluation date
    #[must_use]
    pub fn bepaal_fase_indiv(&self, today: Date) -> Fase {
        if self.is_afgesloten {
            return Fase::Z;
        }

        if self.bk_indiv_afgesloten {
            return Fase::Q;
        }

        if self.bk_indiv_klassen_zijn_samengevoegd {
            if today < self.begin_fase_p_indiv {
                return Fase::O;
            }
            return Fase::P;
        }

        if self.rk_indiv_afgesloten {
            return Fase::N;
        }

        if self.regiocompetitie_is_afgesloten {
            let begin_fase_k: Date = self
                .begin_fase_l_indiv
                .saturating_sub(Duration::days(DAGEN_FASE_K));
            if today < begin_fase_k {
                return Fase::J;
            }
            if today < self.begin_fase_l_indiv {
                return Fase::K;
            }
            return Fase::L;
        }

        self.bepaal_regio_fase(today)
    }

    /// Derives the phase of the team competition.
    ///
    /// # Arguments
    ///
    /// * `today` - The evaluation date
    #[must_use]
    pub fn bepaal_fase_teams(&self, today: Date) -> Fase {
        if self.is_afgesloten {
            return Fase::Z;
        }

        if self.bk_teams_afgesloten {
            return Fase::Q;
        }

        if self.bk_teams_klassen_zijn_samengevoegd {
            if today < self.begin_fase_p_teams {
                return Fase::O;
            }
            return Fase::P;
        }

        if self.rk_teams_afgesloten {
            return Fase::N;
        }

        if self.klassengrenzen_vastgesteld_rk_bk {
            if today < self.begin_fase_l_teams {
                return Fase::K;
            }
            return Fase::L;
        }

        if self.regiocompetitie_is_afgesloten {
            return Fase::J;
        }

        // fase D is regio specific and is not derived here
        self.bepaal_regio_fase(today)
    }

    /// Derives both phases at once.
    #[must_use]
    pub fn bepaal_fases(&self, today: Date) -> Fases {
        Fases::new(self.bepaal_fase_indiv(today), self.bepaal_fase_teams(today))
    }

    fn bepaal_regio_fase(&self, today: Date) -> Fase {
        if !self.klassengrenzen_vastgesteld {
            return Fase::A;
        }
        if today < self.begin_fase_c {
            return Fase::B;
        }
        if today < self.begin_fase_f {
            return Fase::C;
        }
        if today <= self.einde_fase_f {
            return Fase::F;
        }
        Fase::G
    }

    /// Reports whether clubs may register RK teams.
    ///
    /// # Arguments
    ///
    /// * `fase_teams` - The current phase of the team track
    /// * `today` - The evaluation date
    /// * `days_after_f` - Days after the start of fase F at which registration opens
    #[must_use]
    pub fn is_open_voor_inschrijven_rk_teams(
        &self,
        fase_teams: Fase,
        today: Date,
        days_after_f: i64,
    ) -> RkTeamsInschrijving {
        if !(Fase::F..=Fase::J).contains(&fase_teams) {
            return RkTeamsInschrijving::Closed;
        }

        let vanaf: Date = self
            .begin_fase_f
            .saturating_add(Duration::days(days_after_f));
        if today >= vanaf {
            RkTeamsInschrijving::Open
        } else {
            RkTeamsInschrijving::OpensOn(vanaf)
        }
    }

    /// Moves the dates and flags so that the derivation yields the requested phases.
    ///
    /// Only combinations the calendar can represent together are accepted.
    /// Synchronous phases (A, B, F, G, Q, Z) must be requested for both tracks,
    /// and individual phase C requires team phase C or D. Team phase D is
    /// accepted as input but derives as C.
    ///
    /// # Arguments
    ///
    /// * `indiv` - The requested individual phase
    /// * `teams` - The requested team phase
    /// * `today` - The date relative to which thresholds are placed
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnsupportedPhaseCombination` when the pair cannot
    /// be represented. The calendar is left unchanged in that case.
    pub fn zet_fases(&mut self, indiv: Fase, teams: Fase, today: Date) -> Result<(), DomainError> {
        let unsupported = DomainError::UnsupportedPhaseCombination { indiv, teams };

        if indiv.is_synchronous() && teams != indiv {
            return Err(unsupported);
        }
        if indiv == Fase::C && !matches!(teams, Fase::C | Fase::D) {
            return Err(unsupported);
        }
        if indiv == Fase::D {
            return Err(unsupported);
        }

        let mut candidate: Self = self.clone();

        if indiv == Fase::Z {
            candidate.is_afgesloten = true;
        } else {
            candidate.is_afgesloten = false;
            candidate.zet_indiv_fase(indiv, today);
            candidate.zet_teams_fase(teams, today);
        }

        let expected_teams: Fase = if teams == Fase::D { Fase::C } else { teams };
        if candidate.bepaal_fases(today) != Fases::new(indiv, expected_teams) {
            return Err(unsupported);
        }

        *self = candidate;
        Ok(())
    }

    fn zet_indiv_fase(&mut self, fase: Fase, today: Date) {
        let gister: Date = today.saturating_sub(Duration::DAY);
        let morgen: Date = today.saturating_add(Duration::DAY);

        self.bk_indiv_afgesloten = true;
        self.bk_indiv_klassen_zijn_samengevoegd = true;
        self.rk_indiv_afgesloten = true;
        self.regiocompetitie_is_afgesloten = true;
        self.klassengrenzen_vastgesteld = true;

        if fase == Fase::Q {
            return;
        }
        self.bk_indiv_afgesloten = false;

        if fase >= Fase::O {
            self.begin_fase_p_indiv = if fase == Fase::O { morgen } else { gister };
            return;
        }
        self.bk_indiv_klassen_zijn_samengevoegd = false;

        if fase == Fase::N {
            return;
        }
        self.rk_indiv_afgesloten = false;

        if fase >= Fase::J {
            self.begin_fase_l_indiv = match fase {
                Fase::J => morgen.saturating_add(Duration::days(DAGEN_FASE_K)),
                Fase::K => morgen,
                _ => gister,
            };
            return;
        }
        self.regiocompetitie_is_afgesloten = false;

        if fase == Fase::A {
            self.klassengrenzen_vastgesteld = false;
            return;
        }

        self.zet_regio_datums(fase, gister, morgen);
    }

    fn zet_teams_fase(&mut self, fase: Fase, today: Date) {
        let gister: Date = today.saturating_sub(Duration::DAY);
        let morgen: Date = today.saturating_add(Duration::DAY);

        self.bk_teams_afgesloten = true;
        self.bk_teams_klassen_zijn_samengevoegd = true;
        self.rk_teams_afgesloten = true;
        self.klassengrenzen_vastgesteld_rk_bk = true;

        if fase == Fase::Q {
            return;
        }
        self.bk_teams_afgesloten = false;

        if fase >= Fase::O {
            self.begin_fase_p_teams = if fase == Fase::O { morgen } else { gister };
            return;
        }
        self.bk_teams_klassen_zijn_samengevoegd = false;

        if fase == Fase::N {
            return;
        }
        self.rk_teams_afgesloten = false;

        if fase >= Fase::J {
            match fase {
                Fase::J => self.klassengrenzen_vastgesteld_rk_bk = false,
                Fase::K => self.begin_fase_l_teams = morgen,
                _ => self.begin_fase_l_teams = gister,
            }
            return;
        }
        self.klassengrenzen_vastgesteld_rk_bk = false;

        if fase == Fase::A {
            return;
        }

        self.zet_regio_datums(fase, gister, morgen);
    }

    fn zet_regio_datums(&mut self, fase: Fase, gister: Date, morgen: Date) {
        if fase == Fase::B {
            self.begin_fase_c = morgen;
            return;
        }
        self.begin_fase_c = gister;

        if matches!(fase, Fase::C | Fase::D) {
            self.begin_fase_f = morgen;
            return;
        }
        self.begin_fase_f = gister;

        self.einde_fase_f = if fase == Fase::F { morgen } else { gister };
    }
}
