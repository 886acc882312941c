// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Processing one queued mutation.
//!
//! Everything happens in one immediate transaction: the row is re-read, the
//! target state is loaded fresh, the mutation is applied, the results, the
//! logbook lines and the audit event are written and the row is flagged
//! processed. Any error rolls all of it back and leaves the row queued.

use diesel::SqliteConnection;
use kampcomp::{
    AfsluitResult, AgResult, CascadeInput, CascadeResult, KlasseState, Mutation,
    MutationContext, MutationKind, OpstartResult, Target, TransitionResult, apply,
    competitie_afsluiten, competities_opstarten, gemiddelden_vaststellen, regio_naar_rk,
    rk_naar_bk,
};
use kampcomp_audit::{Actor, AuditEvent};
use kampcomp_domain::{Afstand, Competitie, Entry, RegioInschrijving, RkResultaat};
use time::PrimitiveDateTime;
use tracing::debug;

use super::audit::persist_audit_event;
use super::competitie::{create_competitie, update_tijdlijn};
use super::deelnemers::{save_cascade, save_transition};
use super::mutaties::mark_verwerkt;
use super::referentie::{insert_deelnemer, set_regio_gemiddelde};
use crate::error::PersistenceError;
use crate::queries::competitie::{
    bestaande_afstanden, get_competitie, get_kampioenschap, indiv_klasse_competitie,
};
use crate::queries::deelnemers::{
    DeelnemerRecord, get_deelnemer, load_cascade_input, load_kampioenschap_klassen, load_klasse,
    load_regio_inschrijvingen, load_rk_resultaten,
};
use crate::queries::mutaties::{MutatieRecord, get_mutatie};

/// What processing a queued mutation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The row was already processed by an earlier drain.
    AlreadyProcessed,
    /// An earlier drain gave up on the row.
    GivenUp,
    /// The mutation was applied and flagged processed.
    Processed(ProcessedMutation),
}

/// A mutation that was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedMutation {
    /// The queue row.
    pub mutatie_id: i64,
    /// Its kind.
    pub kind: MutationKind,
    /// The competition it belonged to.
    pub competitie_id: Option<i64>,
    /// The audit event written for it.
    pub event_id: i64,
    /// Qualifying sporters a cascade skipped for lack of a club.
    pub zonder_vereniging: Vec<i64>,
}

struct Toegepast {
    audit_event: AuditEvent,
    zonder_vereniging: Vec<i64>,
}

impl From<AuditEvent> for Toegepast {
    fn from(audit_event: AuditEvent) -> Self {
        Self {
            audit_event,
            zonder_vereniging: Vec::new(),
        }
    }
}

/// Applies one queued mutation and flags it processed.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `mutatie_id` - The queue row
/// * `stamp` - The processing time (UTC), used for logbook lines
///
/// # Errors
///
/// Returns an error if:
/// - The row does not exist (`MutationNotFound`)
/// - The row does not decode (`Rejected` with an unknown or malformed mutation)
/// - The target no longer exists (`NotFound`, or `Rejected` with a missing entry)
/// - A write fails
///
/// In every error case nothing is written.
pub fn process_mutation(
    conn: &mut SqliteConnection,
    mutatie_id: i64,
    stamp: PrimitiveDateTime,
) -> Result<ProcessOutcome, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let record: MutatieRecord = get_mutatie(conn, mutatie_id)?;
        if record.is_verwerkt {
            return Ok(ProcessOutcome::AlreadyProcessed);
        }
        if record.fout.is_some() {
            return Ok(ProcessOutcome::GivenUp);
        }

        let mutation: Mutation = Mutation::decode(&record.kind, &record.payload_json)?;
        let ctx: MutationContext = MutationContext::new(
            Some(mutatie_id),
            record.competitie_id,
            Actor::new(record.door),
            stamp,
        );

        let toegepast: Toegepast = apply_stored(conn, &mutation, &ctx)?;
        let event_id: i64 = persist_audit_event(conn, &toegepast.audit_event)?;
        mark_verwerkt(conn, mutatie_id, stamp)?;

        debug!(mutatie_id, event_id, kind = %mutation.kind(), "Mutation applied");
        Ok(ProcessOutcome::Processed(ProcessedMutation {
            mutatie_id,
            kind: mutation.kind(),
            competitie_id: record.competitie_id,
            event_id,
            zonder_vereniging: toegepast.zonder_vereniging,
        }))
    })
}

fn apply_stored(
    conn: &mut SqliteConnection,
    mutation: &Mutation,
    ctx: &MutationContext,
) -> Result<Toegepast, PersistenceError> {
    match mutation {
        Mutation::Initieel { kampioenschap_id } => {
            get_kampioenschap(conn, *kampioenschap_id)?;
            let klassen: Vec<KlasseState> = load_kampioenschap_klassen(conn, *kampioenschap_id)?;
            let target: Target = Target::Kampioenschap {
                kampioenschap_id: *kampioenschap_id,
                klassen,
            };
            apply_klassen(conn, target, mutation, ctx)
        }
        Mutation::Cut {
            kampioenschap_id,
            indiv_klasse_id,
            ..
        } => {
            get_kampioenschap(conn, *kampioenschap_id)?;
            indiv_klasse_competitie(conn, *indiv_klasse_id)?;
            let klasse: KlasseState = load_klasse(conn, *kampioenschap_id, *indiv_klasse_id)?;
            apply_klassen(conn, Target::Klasse(klasse), mutation, ctx)
        }
        Mutation::Afmelden { deelnemer_id } | Mutation::Aanmelden { deelnemer_id } => {
            let deelnemer: DeelnemerRecord = get_deelnemer(conn, *deelnemer_id)?;
            let klasse: KlasseState =
                load_klasse(conn, deelnemer.kampioenschap_id, deelnemer.indiv_klasse_id)?;
            apply_klassen(conn, Target::Klasse(klasse), mutation, ctx)
        }
        Mutation::ExtraRkDeelnemer {
            kampioenschap_id,
            nieuw,
        } => {
            get_kampioenschap(conn, *kampioenschap_id)?;
            // Load the class before the new entry exists in it.
            let klasse: KlasseState = load_klasse(conn, *kampioenschap_id, nieuw.indiv_klasse_id)?;
            let deelnemer_id: i64 = insert_deelnemer(conn, *kampioenschap_id, nieuw, 0, 0)?;
            let entry: Entry =
                Entry::new(deelnemer_id, nieuw.gemiddelde, nieuw.gemiddelde_scores.clone())
                    .with_kampioen_label(&nieuw.kampioen_label)
                    .with_deelname(nieuw.deelname);
            apply_klassen(conn, Target::Extra { klasse, entry }, mutation, ctx)
        }
        Mutation::VerplaatsKlasse {
            deelnemer_id,
            indiv_klasse_id,
        } => {
            let deelnemer: DeelnemerRecord = get_deelnemer(conn, *deelnemer_id)?;
            indiv_klasse_competitie(conn, *indiv_klasse_id)?;
            let van: KlasseState =
                load_klasse(conn, deelnemer.kampioenschap_id, deelnemer.indiv_klasse_id)?;
            let naar: KlasseState =
                load_klasse(conn, deelnemer.kampioenschap_id, *indiv_klasse_id)?;
            apply_klassen(conn, Target::Verplaatsing { van, naar }, mutation, ctx)
        }
        Mutation::RegioNaarRk { competitie_id } => {
            let input: CascadeInput = load_cascade_input(conn, *competitie_id)?;
            let inschrijvingen: Vec<RegioInschrijving> =
                load_regio_inschrijvingen(conn, *competitie_id)?;
            let result: CascadeResult = regio_naar_rk(&input, &inschrijvingen, ctx)?;
            save_cascade(conn, &result)?;
            Ok(Toegepast {
                audit_event: result.audit_event,
                zonder_vereniging: result.zonder_vereniging,
            })
        }
        Mutation::RkNaarBk { competitie_id } => {
            let input: CascadeInput = load_cascade_input(conn, *competitie_id)?;
            let resultaten: Vec<RkResultaat> = load_rk_resultaten(conn, *competitie_id)?;
            let result: CascadeResult = rk_naar_bk(&input, &resultaten, ctx)?;
            save_cascade(conn, &result)?;
            Ok(result.audit_event.into())
        }
        Mutation::CompetitieOpstarten { begin_jaar } => {
            let bestaand: Vec<Afstand> = bestaande_afstanden(conn, *begin_jaar)?;
            let result: OpstartResult = competities_opstarten(*begin_jaar, &bestaand, ctx);
            for opzet in &result.competities {
                create_competitie(conn, opzet)?;
            }
            Ok(result.audit_event.into())
        }
        Mutation::Afsluiten { competitie_id } => {
            let competitie: Competitie = get_competitie(conn, *competitie_id)?;
            let result: AfsluitResult = competitie_afsluiten(&competitie, ctx.stamp.date(), ctx);
            update_tijdlijn(conn, *competitie_id, &result.tijdlijn)?;
            Ok(result.audit_event.into())
        }
        Mutation::AgVaststellen { competitie_id } => {
            let competitie: Competitie = get_competitie(conn, *competitie_id)?;
            let inschrijvingen: Vec<RegioInschrijving> =
                load_regio_inschrijvingen(conn, *competitie_id)?;
            let result: AgResult = gemiddelden_vaststellen(&competitie, &inschrijvingen, ctx);
            for wijziging in &result.wijzigingen {
                set_regio_gemiddelde(conn, wijziging.inschrijving_id, wijziging.gemiddelde)?;
            }
            debug!(
                competitie_id,
                gewijzigd = result.wijzigingen.len(),
                "Regio averages recomputed"
            );
            Ok(result.audit_event.into())
        }
    }
}

fn apply_klassen(
    conn: &mut SqliteConnection,
    target: Target,
    mutation: &Mutation,
    ctx: &MutationContext,
) -> Result<Toegepast, PersistenceError> {
    let result: TransitionResult = apply(target, mutation, ctx)?;
    save_transition(conn, &result)?;
    Ok(result.audit_event.into())
}
