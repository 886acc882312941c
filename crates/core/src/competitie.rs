// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::state::MutationContext;
use kampcomp_audit::{AuditEvent, StateSnapshot};
use kampcomp_domain::{
    AANTAL_SCORES_VOOR_RK_DEELNAME, Afstand, Competitie, DEFAULT_DATUM, Deel, Fase, Gemiddelde,
    RegioInschrijving, Tijdlijn,
};
use time::{Date, Month};

/// Number of rayons; each gets its own RK.
pub const AANTAL_RAYONS: u8 = 4;

/// Individual classes every new competition starts with: name and whether
/// the class continues into the RK/BK.
const STANDAARD_KLASSEN: &[(&str, bool)] = &[
    ("Recurve klasse 1", true),
    ("Recurve klasse 2", true),
    ("Recurve klasse 3", true),
    ("Recurve klasse 4", true),
    ("Recurve klasse 5", true),
    ("Recurve klasse 6", true),
    ("Recurve klasse onbekend", false),
    ("Compound klasse 1", true),
    ("Compound klasse 2", true),
    ("Compound klasse onbekend", false),
    ("Barebow klasse 1", true),
    ("Barebow klasse onbekend", false),
    ("Traditional klasse 1", true),
    ("Longbow klasse 1", true),
];

/// A class to create with a new competition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KlasseOpzet {
    /// Sort order.
    pub volgorde: u16,
    /// Name.
    pub beschrijving: String,
    /// Whether the class continues into the RK/BK.
    pub is_ook_voor_rk_bk: bool,
}

/// A championship tier to create with a new competition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KampioenschapOpzet {
    /// RK or BK.
    pub deel: Deel,
    /// The rayon of an RK.
    pub rayon_nr: Option<u8>,
    /// Display name used in champion labels.
    pub rayon_naam: String,
}

/// A competition to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompetitieOpzet {
    /// First year of the season.
    pub begin_jaar: u16,
    /// Distance.
    pub afstand: Afstand,
    /// Name.
    pub beschrijving: String,
    /// Minimum regio scores for the RK.
    pub aantal_scores_voor_rk_deelname: u8,
    /// The calendar.
    pub tijdlijn: Tijdlijn,
    /// Its classes.
    pub klassen: Vec<KlasseOpzet>,
    /// Its tiers.
    pub kampioenschappen: Vec<KampioenschapOpzet>,
}

/// The outcome of starting a season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpstartResult {
    /// Competitions to create; empty when the season already exists.
    pub competities: Vec<CompetitieOpzet>,
    /// The audit event.
    pub audit_event: AuditEvent,
}

/// Plans the 18m and 25m competitions of a new season.
///
/// A distance that already has a competition for `begin_jaar` is skipped, so
/// a second request for the same season creates nothing.
///
/// # Arguments
///
/// * `begin_jaar` - First year of the season
/// * `bestaand` - Distances that already have a competition that season
/// * `ctx` - Actor, mutation id and processing time
#[must_use]
pub fn competities_opstarten(
    begin_jaar: u16,
    bestaand: &[Afstand],
    ctx: &MutationContext,
) -> OpstartResult {
    let competities: Vec<CompetitieOpzet> = [Afstand::Achttien, Afstand::Vijfentwintig]
        .into_iter()
        .filter(|afstand| !bestaand.contains(afstand))
        .map(|afstand| competitie_opzet(begin_jaar, afstand))
        .collect();

    let audit_event: AuditEvent = ctx.audit(
        "COMPETITIE_OPSTARTEN",
        format!(
            "Seizoen {begin_jaar}/{}: {} competities aangemaakt",
            begin_jaar + 1,
            competities.len()
        ),
        StateSnapshot::new(format!("begin_jaar={begin_jaar} competities={}", bestaand.len())),
        StateSnapshot::new(format!(
            "begin_jaar={begin_jaar} competities={}",
            bestaand.len() + competities.len()
        )),
    );

    OpstartResult {
        competities,
        audit_event,
    }
}

fn competitie_opzet(begin_jaar: u16, afstand: Afstand) -> CompetitieOpzet {
    let beschrijving: String = match afstand {
        Afstand::Achttien => format!("Indoorcompetitie {begin_jaar}/{}", begin_jaar + 1),
        Afstand::Vijfentwintig => format!("25m 1pijl-competitie {begin_jaar}/{}", begin_jaar + 1),
    };

    let klassen: Vec<KlasseOpzet> = STANDAARD_KLASSEN
        .iter()
        .zip(1_u16..)
        .map(|((naam, rk_bk), index)| KlasseOpzet {
            volgorde: index * 10,
            beschrijving: (*naam).to_string(),
            is_ook_voor_rk_bk: *rk_bk,
        })
        .collect();

    let mut kampioenschappen: Vec<KampioenschapOpzet> = (1..=AANTAL_RAYONS)
        .map(|rayon_nr| KampioenschapOpzet {
            deel: Deel::Rk,
            rayon_nr: Some(rayon_nr),
            rayon_naam: format!("Rayon {rayon_nr}"),
        })
        .collect();
    kampioenschappen.push(KampioenschapOpzet {
        deel: Deel::Bk,
        rayon_nr: None,
        rayon_naam: String::from("Bond"),
    });

    CompetitieOpzet {
        begin_jaar,
        afstand,
        beschrijving,
        aantal_scores_voor_rk_deelname: AANTAL_SCORES_VOOR_RK_DEELNAME,
        tijdlijn: standaard_tijdlijn(begin_jaar, afstand),
        klassen,
        kampioenschappen,
    }
}

/// The season calendar; the 25m competition runs a month behind the 18m one.
fn standaard_tijdlijn(begin_jaar: u16, afstand: Afstand) -> Tijdlijn {
    let jaar: i32 = i32::from(begin_jaar);
    let datum = |jaar: i32, maand: Month, dag: u8| {
        Date::from_calendar_date(jaar, maand, dag).unwrap_or(DEFAULT_DATUM)
    };

    let (einde_f, begin_l, begin_p): ((Month, u8), (Month, u8), (Month, u8)) = match afstand {
        Afstand::Achttien => ((Month::January, 31), (Month::February, 1), (Month::March, 8)),
        Afstand::Vijfentwintig => ((Month::February, 28), (Month::March, 1), (Month::May, 10)),
    };

    Tijdlijn {
        begin_fase_c: datum(jaar, Month::August, 1),
        begin_fase_d_indiv: datum(jaar, Month::August, 15),
        begin_fase_f: datum(jaar, Month::September, 1),
        einde_fase_f: datum(jaar + 1, einde_f.0, einde_f.1),
        begin_fase_l_indiv: datum(jaar + 1, begin_l.0, begin_l.1),
        begin_fase_l_teams: datum(jaar + 1, begin_l.0, begin_l.1),
        begin_fase_p_indiv: datum(jaar + 1, begin_p.0, begin_p.1),
        begin_fase_p_teams: datum(jaar + 1, begin_p.0, begin_p.1),
        ..Tijdlijn::default()
    }
}

/// The outcome of archiving a competition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AfsluitResult {
    /// The calendar with the archive flag set.
    pub tijdlijn: Tijdlijn,
    /// The audit event.
    pub audit_event: AuditEvent,
}

/// Archives a competition, moving both tracks to fase Z.
///
/// # Arguments
///
/// * `competitie` - The competition
/// * `today` - The processing date, for the audit snapshot
/// * `ctx` - Actor, mutation id and processing time
#[must_use]
pub fn competitie_afsluiten(
    competitie: &Competitie,
    today: Date,
    ctx: &MutationContext,
) -> AfsluitResult {
    let voor: Fase = competitie.tijdlijn.bepaal_fase_indiv(today);
    let mut tijdlijn: Tijdlijn = competitie.tijdlijn.clone();
    tijdlijn.is_afgesloten = true;

    let audit_event: AuditEvent = ctx.audit(
        "AFSLUITEN",
        format!("{} afgesloten", competitie.beschrijving),
        StateSnapshot::new(format!("competitie={} fase={voor}", competitie.id)),
        StateSnapshot::new(format!(
            "competitie={} fase={}",
            competitie.id,
            tijdlijn.bepaal_fase_indiv(today)
        )),
    );

    AfsluitResult {
        tijdlijn,
        audit_event,
    }
}

/// A regio average to store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GemiddeldeWijziging {
    /// The regio registration.
    pub inschrijving_id: i64,
    /// Its new average.
    pub gemiddelde: Gemiddelde,
}

/// The outcome of recomputing the regio averages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgResult {
    /// Registrations whose stored average changes.
    pub wijzigingen: Vec<GemiddeldeWijziging>,
    /// The audit event.
    pub audit_event: AuditEvent,
}

/// Recomputes the average of every regio registration from its scores.
///
/// A registration without a shot round keeps the average it was registered
/// with. Only averages that change are returned, so running it twice in a
/// row stores nothing the second time.
///
/// # Arguments
///
/// * `competitie` - The competition, which fixes the arrows per round
/// * `inschrijvingen` - Its regio registrations
/// * `ctx` - Actor, mutation id and processing time
#[must_use]
pub fn gemiddelden_vaststellen(
    competitie: &Competitie,
    inschrijvingen: &[RegioInschrijving],
    ctx: &MutationContext,
) -> AgResult {
    let wijzigingen: Vec<GemiddeldeWijziging> = inschrijvingen
        .iter()
        .filter_map(|inschrijving| {
            inschrijving
                .gemiddelde_uit_scores(competitie.afstand)
                .filter(|nieuw| *nieuw != inschrijving.gemiddelde)
                .map(|gemiddelde| GemiddeldeWijziging {
                    inschrijving_id: inschrijving.id,
                    gemiddelde,
                })
        })
        .collect();

    let audit_event: AuditEvent = ctx.audit(
        "AG_VASTSTELLEN",
        format!(
            "Aanvangsgemiddelden vastgesteld voor de {}m competitie",
            competitie.afstand.as_str()
        ),
        StateSnapshot::new(format!(
            "competitie={} inschrijvingen={}",
            competitie.id,
            inschrijvingen.len()
        )),
        StateSnapshot::new(format!(
            "competitie={} inschrijvingen={} gewijzigd={}",
            competitie.id,
            inschrijvingen.len(),
            wijzigingen.len()
        )),
    );

    AgResult {
        wijzigingen,
        audit_event,
    }
}
