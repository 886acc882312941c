// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Qualification cascades: regio to RK and RK to BK.
//!
//! A cascade closes one tier and builds the entry lists of the next. The
//! selection rules live in the domain crate; this module groups the selected
//! sporters per tier and class, runs the initial allocation on each class
//! and hands back complete lists, ready to be stored in one transaction.
//!
//! New entries have no storage ids yet. Each class is ranked with temporary
//! ids (the position in the class input) which are mapped back afterwards.

use crate::error::CoreError;
use crate::state::MutationContext;
use kampcomp_audit::{AuditEvent, LogboekRegel, StateSnapshot};
use kampcomp_domain::{
    BK_MAX_DEELNEMERS, Competitie, DEFAULT_LIMIET, Entry, IndivKlasse, Kampioenschap,
    NieuweDeelnemer, RankingSet, RegioInschrijving, RkResultaat, RkSelectie, Tijdlijn,
    selecteer_bk_deelnemers, selecteer_rk_deelnemers,
};
use std::collections::HashMap;

/// Stored limieten of the classes of a competition.
///
/// Classes without a stored limiet use `DEFAULT_LIMIET`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Limieten {
    per_klasse: HashMap<(i64, i64), u16>,
}

impl Limieten {
    /// Creates an empty set of limieten.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the limiet of a class.
    pub fn zet(&mut self, kampioenschap_id: i64, indiv_klasse_id: i64, limiet: u16) {
        self.per_klasse
            .insert((kampioenschap_id, indiv_klasse_id), limiet);
    }

    /// Returns the limiet of a class.
    #[must_use]
    pub fn get(&self, kampioenschap_id: i64, indiv_klasse_id: i64) -> u16 {
        self.per_klasse
            .get(&(kampioenschap_id, indiv_klasse_id))
            .copied()
            .unwrap_or(DEFAULT_LIMIET)
    }
}

/// A new entry with its place in the established list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeplaatsteDeelnemer {
    /// The entry to create; its deelname reflects the allocation.
    pub deelnemer: NieuweDeelnemer,
    /// Position in the class.
    pub volgorde: u16,
    /// Rank in the class.
    pub rank: u16,
    /// Logbook lines to store with the entry.
    pub logboek: Vec<LogboekRegel>,
}

/// The complete new entry list of one tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KampioenschapLijst {
    /// The tier.
    pub kampioenschap_id: i64,
    /// Every entry of every class, class by class in volgorde order.
    pub deelnemers: Vec<GeplaatsteDeelnemer>,
}

/// Everything a cascade reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeInput {
    /// The competition.
    pub competitie: Competitie,
    /// The tiers of the competition.
    pub kampioenschappen: Vec<Kampioenschap>,
    /// The individual classes of the competition.
    pub klassen: Vec<IndivKlasse>,
    /// Stored limieten.
    pub limieten: Limieten,
}

/// The outcome of a cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeResult {
    /// The competition.
    pub competitie_id: i64,
    /// The calendar with the closing flag set.
    pub tijdlijn: Tijdlijn,
    /// New lists; every listed tier replaces all its existing entries.
    pub lijsten: Vec<KampioenschapLijst>,
    /// Tiers to mark closed.
    pub afgesloten: Vec<i64>,
    /// Member numbers of qualifying sporters skipped because they have no club.
    pub zonder_vereniging: Vec<i64>,
    /// The audit event for this cascade.
    pub audit_event: AuditEvent,
}

/// Closes the regio competition and builds the RK lists.
///
/// Every RK tier of the competition gets a list, possibly empty, so stale
/// entries from an earlier run are replaced everywhere.
///
/// # Arguments
///
/// * `input` - The competition, its tiers, classes and limieten
/// * `inschrijvingen` - Every regio registration of the competition
/// * `ctx` - Actor, mutation id and processing time
///
/// # Errors
///
/// Returns `CoreError::MissingRk` when a selected sporter's club lies in a
/// rayon without an RK tier.
pub fn regio_naar_rk(
    input: &CascadeInput,
    inschrijvingen: &[RegioInschrijving],
    ctx: &MutationContext,
) -> Result<CascadeResult, CoreError> {
    let competitie: &Competitie = &input.competitie;
    let mut tijdlijn: Tijdlijn = competitie.tijdlijn.clone();
    tijdlijn.regiocompetitie_is_afgesloten = true;

    let selectie: RkSelectie = selecteer_rk_deelnemers(
        inschrijvingen,
        &input.klassen,
        competitie.aantal_scores_voor_rk_deelname,
    );

    let rks: Vec<&Kampioenschap> = input
        .kampioenschappen
        .iter()
        .filter(|k| k.competitie_id == competitie.id && k.rayon_nr.is_some())
        .collect();

    let mut per_rk: HashMap<i64, Vec<NieuweDeelnemer>> = HashMap::new();
    for plaatsing in selectie.plaatsingen {
        let rk: &Kampioenschap = rks
            .iter()
            .find(|k| k.rayon_nr == Some(plaatsing.rayon_nr))
            .ok_or(CoreError::MissingRk {
                rayon_nr: plaatsing.rayon_nr,
            })?;
        per_rk.entry(rk.id).or_default().push(plaatsing.deelnemer);
    }

    let mut lijsten: Vec<KampioenschapLijst> = Vec::new();
    for rk in &rks {
        let deelnemers: Vec<NieuweDeelnemer> = per_rk.remove(&rk.id).unwrap_or_default();
        lijsten.push(stel_lijst_op(rk.id, deelnemers, &input.limieten, false, None, ctx)?);
    }

    let totaal: usize = lijsten.iter().map(|l| l.deelnemers.len()).sum();
    let audit_event: AuditEvent = ctx.audit(
        "REGIO_NAAR_RK",
        format!(
            "{totaal} RK deelnemers in {} rayons, {} zonder vereniging",
            lijsten.len(),
            selectie.zonder_vereniging.len()
        ),
        StateSnapshot::new(format!("competitie={} regio_afgesloten=false", competitie.id)),
        StateSnapshot::new(format!(
            "competitie={} regio_afgesloten=true rk_deelnemers={totaal}",
            competitie.id
        )),
    );

    Ok(CascadeResult {
        competitie_id: competitie.id,
        tijdlijn,
        lijsten,
        afgesloten: Vec::new(),
        zonder_vereniging: selectie.zonder_vereniging,
        audit_event,
    })
}

/// Closes the RK and builds the BK lists.
///
/// RK champions are confirmed straight away, every class is established with
/// the deelnemers above the cut confirmed, and each class keeps at most
/// `BK_MAX_DEELNEMERS` entries. The RK tiers are closed.
///
/// # Arguments
///
/// * `input` - The competition, its tiers, classes and limieten
/// * `resultaten` - Every RK entry of the competition with its result
/// * `ctx` - Actor, mutation id and processing time
///
/// # Errors
///
/// Returns `CoreError::TargetMismatch` when the competition has no BK tier.
pub fn rk_naar_bk(
    input: &CascadeInput,
    resultaten: &[RkResultaat],
    ctx: &MutationContext,
) -> Result<CascadeResult, CoreError> {
    let competitie: &Competitie = &input.competitie;
    let mut tijdlijn: Tijdlijn = competitie.tijdlijn.clone();
    tijdlijn.rk_indiv_afgesloten = true;

    let bk: &Kampioenschap = input
        .kampioenschappen
        .iter()
        .find(|k| k.competitie_id == competitie.id && k.rayon_nr.is_none())
        .ok_or_else(|| CoreError::TargetMismatch {
            kind: "RK_NAAR_BK",
            expected: format!("a BK for competitie {}", competitie.id),
        })?;

    let deelnemers: Vec<NieuweDeelnemer> = selecteer_bk_deelnemers(resultaten, competitie.afstand);
    let lijst: KampioenschapLijst = stel_lijst_op(
        bk.id,
        deelnemers,
        &input.limieten,
        true,
        Some(BK_MAX_DEELNEMERS),
        ctx,
    )?;

    let afgesloten: Vec<i64> = input
        .kampioenschappen
        .iter()
        .filter(|k| k.competitie_id == competitie.id && k.rayon_nr.is_some())
        .map(|k| k.id)
        .collect();

    let audit_event: AuditEvent = ctx.audit(
        "RK_NAAR_BK",
        format!("{} BK deelnemers", lijst.deelnemers.len()),
        StateSnapshot::new(format!("competitie={} rk_afgesloten=false", competitie.id)),
        StateSnapshot::new(format!(
            "competitie={} rk_afgesloten=true bk_deelnemers={}",
            competitie.id,
            lijst.deelnemers.len()
        )),
    );

    Ok(CascadeResult {
        competitie_id: competitie.id,
        tijdlijn,
        lijsten: vec![lijst],
        afgesloten,
        zonder_vereniging: Vec::new(),
        audit_event,
    })
}

/// Groups new entries by class and establishes each class.
fn stel_lijst_op(
    kampioenschap_id: i64,
    deelnemers: Vec<NieuweDeelnemer>,
    limieten: &Limieten,
    zet_boven_cut_op_ja: bool,
    max_per_klasse: Option<usize>,
    ctx: &MutationContext,
) -> Result<KampioenschapLijst, CoreError> {
    let mut per_klasse: Vec<(i64, Vec<NieuweDeelnemer>)> = Vec::new();
    for deelnemer in deelnemers {
        match per_klasse
            .iter_mut()
            .find(|(klasse, _)| *klasse == deelnemer.indiv_klasse_id)
        {
            Some((_, groep)) => groep.push(deelnemer),
            None => per_klasse.push((deelnemer.indiv_klasse_id, vec![deelnemer])),
        }
    }

    let mut geplaatst: Vec<GeplaatsteDeelnemer> = Vec::new();
    for (indiv_klasse_id, groep) in per_klasse {
        let entries: Vec<Entry> = groep
            .iter()
            .zip(0_i64..)
            .map(|(d, tijdelijk_id)| {
                Entry::new(tijdelijk_id, d.gemiddelde, d.gemiddelde_scores.clone())
                    .with_kampioen_label(&d.kampioen_label)
                    .with_deelname(d.deelname)
            })
            .collect();

        let mut set: RankingSet =
            RankingSet::new(limieten.get(kampioenschap_id, indiv_klasse_id), entries)?;
        set.initial_allocation(zet_boven_cut_op_ja);
        if let Some(max) = max_per_klasse {
            set.truncate(max);
        }

        let mut groep: Vec<Option<NieuweDeelnemer>> = groep.into_iter().map(Some).collect();
        for entry in set.into_entries() {
            let Some(mut deelnemer) = usize::try_from(entry.id)
                .ok()
                .and_then(|index| groep.get_mut(index))
                .and_then(Option::take)
            else {
                continue;
            };
            deelnemer.deelname = entry.deelname;
            let logboek: Vec<LogboekRegel> = deelnemer
                .logboek
                .iter()
                .map(|tekst| ctx.regel(tekst.as_str()))
                .collect();
            geplaatst.push(GeplaatsteDeelnemer {
                deelnemer,
                volgorde: entry.volgorde,
                rank: entry.rank,
                logboek,
            });
        }
    }

    Ok(KampioenschapLijst {
        kampioenschap_id,
        deelnemers: geplaatst,
    })
}
