// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use crate::mutation::Mutation;
use crate::state::{KlasseState, LimietWijziging, MutationContext, Target, TransitionResult};
use kampcomp_audit::{LogboekRegel, StateSnapshot};
use kampcomp_domain::{CutChange, Entry, ReregisterOutcome, WithdrawOutcome};

const DEELNAME_JA: &str = "Deelname op Ja gezet";

/// Applies a class-level mutation to freshly loaded state.
///
/// The function is pure: it takes the loaded classes by value and returns
/// them in their new state together with the logbook lines and the audit
/// event that must be stored in the same transaction.
///
/// # Arguments
///
/// * `target` - The state the mutation reads, loaded just before applying
/// * `mutation` - The mutation to apply
/// * `ctx` - Actor, mutation id and processing time
///
/// # Errors
///
/// Returns an error if:
/// - The entry is not part of the loaded class (a stale target)
/// - The loaded state does not match the mutation
/// - A ranking operation rejects its input
pub fn apply(
    target: Target,
    mutation: &Mutation,
    ctx: &MutationContext,
) -> Result<TransitionResult, CoreError> {
    match (mutation, target) {
        (
            Mutation::Initieel { kampioenschap_id },
            Target::Kampioenschap {
                kampioenschap_id: geladen,
                klassen,
            },
        ) if *kampioenschap_id == geladen => Ok(apply_initieel(geladen, klassen, ctx)),
        (
            Mutation::Cut {
                kampioenschap_id,
                indiv_klasse_id,
                cut_nieuw,
                ..
            },
            Target::Klasse(klasse),
        ) if klasse.kampioenschap_id == *kampioenschap_id
            && klasse.indiv_klasse_id == *indiv_klasse_id =>
        {
            apply_cut(klasse, *cut_nieuw, ctx)
        }
        (Mutation::Afmelden { deelnemer_id }, Target::Klasse(klasse)) => {
            apply_afmelden(klasse, *deelnemer_id, ctx)
        }
        (Mutation::Aanmelden { deelnemer_id }, Target::Klasse(klasse)) => {
            apply_aanmelden(klasse, *deelnemer_id, ctx)
        }
        (
            Mutation::ExtraRkDeelnemer {
                kampioenschap_id,
                nieuw,
            },
            Target::Extra { klasse, entry },
        ) if klasse.kampioenschap_id == *kampioenschap_id => {
            apply_extra(klasse, entry, &nieuw.logboek, ctx)
        }
        (
            Mutation::VerplaatsKlasse {
                deelnemer_id,
                indiv_klasse_id,
            },
            Target::Verplaatsing { van, naar },
        ) if naar.indiv_klasse_id == *indiv_klasse_id => {
            apply_verplaats(van, naar, *deelnemer_id, ctx)
        }
        (mutation, _) => Err(CoreError::TargetMismatch {
            kind: mutation.kind().as_str(),
            expected: verwacht_target(mutation),
        }),
    }
}

fn verwacht_target(mutation: &Mutation) -> String {
    match mutation {
        Mutation::Initieel { kampioenschap_id } => {
            format!("all classes of kampioenschap {kampioenschap_id}")
        }
        Mutation::Cut {
            kampioenschap_id,
            indiv_klasse_id,
            ..
        } => format!("class {indiv_klasse_id} of kampioenschap {kampioenschap_id}"),
        Mutation::Afmelden { deelnemer_id } | Mutation::Aanmelden { deelnemer_id } => {
            format!("the class of entry {deelnemer_id}")
        }
        Mutation::ExtraRkDeelnemer {
            kampioenschap_id, ..
        } => format!("a class of kampioenschap {kampioenschap_id} plus the new entry"),
        Mutation::VerplaatsKlasse {
            deelnemer_id,
            indiv_klasse_id,
        } => format!("the class of entry {deelnemer_id} and class {indiv_klasse_id}"),
        other => format!("no class state; {} is a cascade mutation", other.kind()),
    }
}

// ============================================================================
// Full recompute
// ============================================================================

fn apply_initieel(
    kampioenschap_id: i64,
    mut klassen: Vec<KlasseState>,
    ctx: &MutationContext,
) -> TransitionResult {
    let before: StateSnapshot = StateSnapshot::new(format!(
        "kampioenschap={kampioenschap_id} klassen={}",
        klassen.len()
    ));

    for klasse in &mut klassen {
        klasse.set.initial_allocation(false);
    }

    let entries: usize = klassen.iter().map(|k| k.set.len()).sum();
    let after: StateSnapshot = StateSnapshot::new(format!(
        "kampioenschap={kampioenschap_id} klassen={} entries={entries}",
        klassen.len()
    ));
    let audit_event = ctx.audit(
        "INITIEEL",
        format!("Deelnemerslijsten van kampioenschap {kampioenschap_id} opnieuw opgesteld"),
        before,
        after,
    );

    TransitionResult {
        klassen,
        limiet: None,
        logboek: Vec::new(),
        audit_event,
    }
}

// ============================================================================
// Cut
// ============================================================================

fn apply_cut(
    mut klasse: KlasseState,
    cut_nieuw: u16,
    ctx: &MutationContext,
) -> Result<TransitionResult, CoreError> {
    let before: StateSnapshot = klasse.to_snapshot();
    let cut_oud: u16 = klasse.set.limiet();
    let change: CutChange = klasse.set.apply_cut_change(cut_nieuw)?;

    let limiet: Option<LimietWijziging> =
        (change != CutChange::Unchanged).then_some(LimietWijziging {
            kampioenschap_id: klasse.kampioenschap_id,
            indiv_klasse_id: klasse.indiv_klasse_id,
            limiet: cut_nieuw,
        });

    let audit_event = ctx.audit(
        "CUT",
        format!("Limiet van {cut_oud} naar {cut_nieuw}"),
        before,
        klasse.to_snapshot(),
    );

    Ok(TransitionResult {
        klassen: vec![klasse],
        limiet,
        logboek: Vec::new(),
        audit_event,
    })
}

// ============================================================================
// Withdraw / confirm
// ============================================================================

fn apply_afmelden(
    mut klasse: KlasseState,
    deelnemer_id: i64,
    ctx: &MutationContext,
) -> Result<TransitionResult, CoreError> {
    let before: StateSnapshot = klasse.to_snapshot();
    let outcome: WithdrawOutcome = klasse.set.withdraw(deelnemer_id)?;

    let mut logboek: Vec<(i64, LogboekRegel)> = Vec::new();
    let details: String = match outcome {
        WithdrawOutcome::AlreadyWithdrawn => format!("Deelnemer {deelnemer_id} was al afgemeld"),
        WithdrawOutcome::Withdrawn { promoted_reserve } => {
            logboek.push((
                deelnemer_id,
                ctx.regel(format!(
                    "Deelname op Nee gezet want afmelding ontvangen van {}",
                    ctx.actor
                )),
            ));
            if let Some(reserve) = promoted_reserve {
                logboek.push((reserve, ctx.regel("Reserve wordt deelnemer")));
                format!("Deelnemer {deelnemer_id} afgemeld, reserve {reserve} wordt deelnemer")
            } else {
                format!("Deelnemer {deelnemer_id} afgemeld")
            }
        }
    };

    let audit_event = ctx.audit("AFMELDEN_INDIV", details, before, klasse.to_snapshot());
    Ok(TransitionResult {
        klassen: vec![klasse],
        limiet: None,
        logboek,
        audit_event,
    })
}

fn apply_aanmelden(
    mut klasse: KlasseState,
    deelnemer_id: i64,
    ctx: &MutationContext,
) -> Result<TransitionResult, CoreError> {
    let before: StateSnapshot = klasse.to_snapshot();
    let outcome: ReregisterOutcome = klasse.set.reregister(deelnemer_id)?;

    let mut logboek: Vec<(i64, LogboekRegel)> =
        vec![(deelnemer_id, ctx.regel(format!("Mutatie door {}", ctx.actor)))];
    logboek.extend(
        aanmeld_regels(outcome, ctx)
            .into_iter()
            .map(|regel| (deelnemer_id, regel)),
    );

    let audit_event = ctx.audit(
        "AANMELDEN_INDIV",
        format!("Deelnemer {deelnemer_id}: {outcome:?}"),
        before,
        klasse.to_snapshot(),
    );
    Ok(TransitionResult {
        klassen: vec![klasse],
        limiet: None,
        logboek,
        audit_event,
    })
}

fn aanmeld_regels(outcome: ReregisterOutcome, ctx: &MutationContext) -> Vec<LogboekRegel> {
    match outcome {
        ReregisterOutcome::AlreadyRegistered => Vec::new(),
        ReregisterOutcome::Confirmed => vec![ctx.regel(DEELNAME_JA)],
        ReregisterOutcome::ToReserveList | ReregisterOutcome::ToDeelnemersList => outcome
            .logboek_tekst()
            .into_iter()
            .chain(std::iter::once(DEELNAME_JA))
            .map(|tekst| ctx.regel(tekst))
            .collect(),
    }
}

// ============================================================================
// Membership
// ============================================================================

fn apply_extra(
    mut klasse: KlasseState,
    entry: Entry,
    creatie_regels: &[String],
    ctx: &MutationContext,
) -> Result<TransitionResult, CoreError> {
    let before: StateSnapshot = klasse.to_snapshot();
    let entry_id: i64 = entry.id;
    let outcome: ReregisterOutcome = klasse.set.add_extra(entry)?;

    let logboek: Vec<(i64, LogboekRegel)> = creatie_regels
        .iter()
        .map(|tekst| ctx.regel(tekst.as_str()))
        .chain(aanmeld_regels(outcome, ctx))
        .map(|regel| (entry_id, regel))
        .collect();

    let audit_event = ctx.audit(
        "EXTRA_RK_DEELNEMER",
        format!("Deelnemer {entry_id} toegevoegd: {outcome:?}"),
        before,
        klasse.to_snapshot(),
    );
    Ok(TransitionResult {
        klassen: vec![klasse],
        limiet: None,
        logboek,
        audit_event,
    })
}

fn apply_verplaats(
    mut van: KlasseState,
    mut naar: KlasseState,
    deelnemer_id: i64,
    ctx: &MutationContext,
) -> Result<TransitionResult, CoreError> {
    let before: StateSnapshot = van.to_snapshot();

    if van.indiv_klasse_id == naar.indiv_klasse_id {
        let audit_event = ctx.audit(
            "VERPLAATS_KLASSE_INDIV",
            format!("Deelnemer {deelnemer_id} staat al in klasse {}", naar.indiv_klasse_id),
            before.clone(),
            before,
        );
        return Ok(TransitionResult {
            klassen: Vec::new(),
            limiet: None,
            logboek: Vec::new(),
            audit_event,
        });
    }

    let entry: Entry = van.set.remove(deelnemer_id)?;
    naar.set.insert_unranked(entry)?;
    naar.set.initial_allocation(false);

    let audit_event = ctx.audit(
        "VERPLAATS_KLASSE_INDIV",
        format!(
            "Deelnemer {deelnemer_id} van klasse {} naar klasse {}",
            van.indiv_klasse_id, naar.indiv_klasse_id
        ),
        before,
        naar.to_snapshot(),
    );
    Ok(TransitionResult {
        klassen: vec![van, naar],
        limiet: None,
        logboek: Vec::new(),
        audit_event,
    })
}
