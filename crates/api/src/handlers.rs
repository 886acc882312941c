// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request handlers: the producer side of the mutation queue.
//!
//! Every handler checks the request against the stored state before anything
//! is queued: the requester's role, the phase of the competition, and the
//! request itself. A request that would not change anything is answered with
//! `RequestOutcome::Unchanged`. Whatever passes is queued for the worker,
//! which re-reads the state when it applies the mutation.

use kampcomp::Mutation;
use kampcomp_domain::{
    Afstand, Club, Competitie, Deel, Deelname, Fase, Fases, Kampioenschap, NieuweDeelnemer,
    PhaseGate, check_kan_bevestigen, validate_limiet,
};
use kampcomp_persistence::{DeelnemerRecord, MutatieRecord, Persistence};
use time::Date;
use tracing::{debug, info};

use crate::auth::{Aanvrager, Rol};
use crate::error::ApiError;
use crate::request_response::{
    DeelnameActie, ExtraDeelnemerRequest, FaseResponse, MutationStatus, RequestOutcome,
};

const TOEGEVOEGD_AAN_RK: &str = "Toegevoegd aan de RK indiv deelnemerslijst";

// ============================================================================
// Shared checks
// ============================================================================

fn enqueue(
    persistence: &mut Persistence,
    mutation: &Mutation,
    competitie_id: Option<i64>,
    aanvrager: &Aanvrager,
) -> Result<RequestOutcome, ApiError> {
    let mutatie_id: i64 = persistence.enqueue_mutation(mutation, competitie_id, &aanvrager.door)?;

    info!(
        mutatie_id,
        kind = %mutation.kind(),
        competitie_id,
        door = %aanvrager.door,
        "Mutation queued"
    );

    Ok(RequestOutcome::Queued { mutatie_id })
}

fn vereis_rol(aanvrager: &Aanvrager, rol: Rol, action: &str) -> Result<(), ApiError> {
    if aanvrager.rol == rol {
        Ok(())
    } else {
        Err(ApiError::Unauthorized {
            action: action.to_string(),
            required_role: rol.to_string(),
        })
    }
}

/// Picks the phase gate for a change to an entry list.
///
/// The RKO of the tier's rayon manages an RK, the BKO manages the BK. A club
/// official may change RK entries frozen to their own club; `bij_ver_nr` is
/// `None` for actions that are not open to club officials.
fn lijst_gate(
    aanvrager: &Aanvrager,
    kampioenschap: &Kampioenschap,
    bij_ver_nr: Option<i64>,
    action: &str,
) -> Result<PhaseGate, ApiError> {
    match (aanvrager.rol, kampioenschap.deel) {
        (Rol::Rko { rayon_nr }, Deel::Rk) if kampioenschap.rayon_nr == Some(rayon_nr) => {
            Ok(PhaseGate::deelname(Deel::Rk))
        }
        (Rol::Bko, Deel::Bk) => Ok(PhaseGate::deelname(Deel::Bk)),
        (Rol::Hwl { ver_nr }, Deel::Rk) if bij_ver_nr == Some(ver_nr) => {
            Ok(PhaseGate::HwlRkDeelname)
        }
        (_, deel) => Err(ApiError::Unauthorized {
            action: action.to_string(),
            required_role: beheerder(kampioenschap, deel),
        }),
    }
}

fn beheerder(kampioenschap: &Kampioenschap, deel: Deel) -> String {
    match (deel, kampioenschap.rayon_nr) {
        (Deel::Rk, Some(rayon_nr)) => Rol::Rko { rayon_nr }.to_string(),
        (Deel::Rk, None) => String::from("RKO"),
        (Deel::Bk, _) => Rol::Bko.to_string(),
    }
}

fn fase_indiv(
    persistence: &mut Persistence,
    competitie_id: i64,
    today: Date,
) -> Result<Fase, ApiError> {
    let competitie: Competitie = persistence.get_competitie(competitie_id)?;
    Ok(competitie.tijdlijn.bepaal_fase_indiv(today))
}

fn check_klasse_van_competitie(
    persistence: &mut Persistence,
    indiv_klasse_id: i64,
    competitie_id: i64,
) -> Result<(), ApiError> {
    if persistence.indiv_klasse_competitie(indiv_klasse_id)? == competitie_id {
        Ok(())
    } else {
        Err(ApiError::InvalidInput {
            field: String::from("indiv_klasse_id"),
            message: format!(
                "Klasse {indiv_klasse_id} does not belong to competitie {competitie_id}"
            ),
        })
    }
}

// ============================================================================
// Entry lists
// ============================================================================

/// Requests a confirmation or withdrawal of a championship entry.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `aanvrager` - The requester and their role
/// * `deelnemer_id` - The entry
/// * `actie` - Confirm or withdraw
/// * `today` - The date the phase is derived for
///
/// # Errors
///
/// Returns an error if:
/// - The entry does not exist
/// - The role does not cover the entry's tier, or for a club official, the entry's club
/// - The competition is outside the phase window for the role
/// - A confirmation is requested for a sporter without a club
pub fn request_deelname_change(
    persistence: &mut Persistence,
    aanvrager: &Aanvrager,
    deelnemer_id: i64,
    actie: DeelnameActie,
    today: Date,
) -> Result<RequestOutcome, ApiError> {
    let deelnemer: DeelnemerRecord = persistence.get_deelnemer(deelnemer_id)?;
    let kampioenschap: Kampioenschap =
        persistence.get_kampioenschap(deelnemer.kampioenschap_id)?;

    let gate: PhaseGate = lijst_gate(
        aanvrager,
        &kampioenschap,
        Some(deelnemer.bij_ver_nr),
        "wijzig deelname",
    )?;
    gate.check(fase_indiv(persistence, kampioenschap.competitie_id, today)?)?;

    let mutation: Mutation = match actie {
        DeelnameActie::Afmelden => {
            if deelnemer.entry.deelname == Deelname::Nee {
                debug!(deelnemer_id, "Entry already withdrawn");
                return Ok(RequestOutcome::Unchanged);
            }
            Mutation::Afmelden { deelnemer_id }
        }
        DeelnameActie::Bevestigen => {
            if deelnemer.entry.deelname == Deelname::Ja {
                debug!(deelnemer_id, "Entry already confirmed");
                return Ok(RequestOutcome::Unchanged);
            }
            let club: Option<Club> = persistence.live_club(deelnemer.lid_nr)?;
            check_kan_bevestigen(deelnemer.lid_nr, club.as_ref())?;
            Mutation::Aanmelden { deelnemer_id }
        }
    };

    enqueue(
        persistence,
        &mutation,
        Some(kampioenschap.competitie_id),
        aanvrager,
    )
}

/// Requests a new limiet for one class of a tier.
///
/// The raw text is validated first, so a malformed or out-of-range value
/// never reaches the queue.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `aanvrager` - The requester and their role
/// * `kampioenschap_id` - The tier
/// * `indiv_klasse_id` - The class
/// * `limiet` - The new limiet as typed
/// * `today` - The date the phase is derived for
///
/// # Errors
///
/// Returns an error if:
/// - The limiet is not a whole number between 1 and 48
/// - The tier does not exist, or the class is not part of its competition
/// - The role does not manage the tier
/// - The competition is outside the phase window
pub fn request_cut_change(
    persistence: &mut Persistence,
    aanvrager: &Aanvrager,
    kampioenschap_id: i64,
    indiv_klasse_id: i64,
    limiet: &str,
    today: Date,
) -> Result<RequestOutcome, ApiError> {
    let ruw: i64 = limiet
        .trim()
        .parse()
        .map_err(|_| ApiError::InvalidInput {
            field: String::from("limiet"),
            message: format!("'{limiet}' is not a whole number"),
        })?;
    let cut_nieuw: u16 = validate_limiet(ruw)?;

    let kampioenschap: Kampioenschap = persistence.get_kampioenschap(kampioenschap_id)?;
    check_klasse_van_competitie(persistence, indiv_klasse_id, kampioenschap.competitie_id)?;

    let gate: PhaseGate = lijst_gate(aanvrager, &kampioenschap, None, "wijzig limiet")?;
    gate.check(fase_indiv(persistence, kampioenschap.competitie_id, today)?)?;

    let cut_oud: u16 = persistence.get_limiet(kampioenschap_id, indiv_klasse_id)?;
    if cut_oud == cut_nieuw {
        debug!(kampioenschap_id, indiv_klasse_id, cut_oud, "Limiet unchanged");
        return Ok(RequestOutcome::Unchanged);
    }

    enqueue(
        persistence,
        &Mutation::Cut {
            kampioenschap_id,
            indiv_klasse_id,
            cut_oud,
            cut_nieuw,
        },
        Some(kampioenschap.competitie_id),
        aanvrager,
    )
}

/// Requests a late entry on an RK list.
///
/// The entry is frozen to the sporter's current club.
///
/// # Errors
///
/// Returns an error if:
/// - The tier is not an RK, or the requester is not the RKO of its rayon
/// - The class is not part of the tier's competition
/// - The competition is outside the RK preparation window
/// - The sporter has no club
/// - The sporter is already on the list of this class
pub fn request_extra_rk_deelnemer(
    persistence: &mut Persistence,
    aanvrager: &Aanvrager,
    kampioenschap_id: i64,
    request: &ExtraDeelnemerRequest,
    today: Date,
) -> Result<RequestOutcome, ApiError> {
    let kampioenschap: Kampioenschap = persistence.get_kampioenschap(kampioenschap_id)?;
    let Some(rayon_nr) = kampioenschap.rayon_nr else {
        return Err(ApiError::DomainRuleViolation {
            rule: String::from("extra_alleen_rk"),
            message: format!("Kampioenschap {kampioenschap_id} is not an RK"),
        });
    };
    vereis_rol(aanvrager, Rol::Rko { rayon_nr }, "extra RK deelnemer")?;
    check_klasse_van_competitie(persistence, request.indiv_klasse_id, kampioenschap.competitie_id)?;
    PhaseGate::RkDeelname.check(fase_indiv(persistence, kampioenschap.competitie_id, today)?)?;

    let club: Option<Club> = persistence.live_club(request.lid_nr)?;
    check_kan_bevestigen(request.lid_nr, club.as_ref())?;
    let bij_ver_nr: i64 = club.map_or(0, |c| c.ver_nr);

    let al_op_lijst: bool = persistence
        .list_deelnemers(kampioenschap_id)?
        .iter()
        .any(|d| d.lid_nr == request.lid_nr && d.indiv_klasse_id == request.indiv_klasse_id);
    if al_op_lijst {
        return Err(ApiError::DomainRuleViolation {
            rule: String::from("unique_deelnemer"),
            message: format!(
                "Sporter {} is already on the list of klasse {}",
                request.lid_nr, request.indiv_klasse_id
            ),
        });
    }

    let nieuw: NieuweDeelnemer = NieuweDeelnemer {
        sporterboog_id: request.sporterboog_id,
        lid_nr: request.lid_nr,
        indiv_klasse_id: request.indiv_klasse_id,
        indiv_klasse_volgende_ronde_id: request.indiv_klasse_volgende_ronde_id,
        bij_ver_nr,
        kampioen_label: String::new(),
        deelname: Deelname::Onbekend,
        gemiddelde: request.gemiddelde,
        gemiddelde_scores: request.gemiddelde_scores.clone(),
        logboek: vec![TOEGEVOEGD_AAN_RK.to_string()],
    };

    enqueue(
        persistence,
        &Mutation::ExtraRkDeelnemer {
            kampioenschap_id,
            nieuw,
        },
        Some(kampioenschap.competitie_id),
        aanvrager,
    )
}

/// Requests moving a BK entry into another class.
///
/// # Errors
///
/// Returns an error if:
/// - The requester is not the BKO
/// - The entry does not exist or is not a BK entry
/// - The class is not part of the competition
/// - The competition is not merging small classes
pub fn request_verplaats_klasse(
    persistence: &mut Persistence,
    aanvrager: &Aanvrager,
    deelnemer_id: i64,
    indiv_klasse_id: i64,
    today: Date,
) -> Result<RequestOutcome, ApiError> {
    vereis_rol(aanvrager, Rol::Bko, "verplaats klasse")?;

    let deelnemer: DeelnemerRecord = persistence.get_deelnemer(deelnemer_id)?;
    let kampioenschap: Kampioenschap =
        persistence.get_kampioenschap(deelnemer.kampioenschap_id)?;
    if kampioenschap.deel != Deel::Bk {
        return Err(ApiError::DomainRuleViolation {
            rule: String::from("verplaats_alleen_bk"),
            message: format!("Deelnemer {deelnemer_id} is not a BK entry"),
        });
    }
    check_klasse_van_competitie(persistence, indiv_klasse_id, kampioenschap.competitie_id)?;
    PhaseGate::KleineKlassen.check(fase_indiv(persistence, kampioenschap.competitie_id, today)?)?;

    if deelnemer.indiv_klasse_id == indiv_klasse_id {
        return Ok(RequestOutcome::Unchanged);
    }

    enqueue(
        persistence,
        &Mutation::VerplaatsKlasse {
            deelnemer_id,
            indiv_klasse_id,
        },
        Some(kampioenschap.competitie_id),
        aanvrager,
    )
}

// ============================================================================
// Cascades and season
// ============================================================================

/// Requests closing the regio competition and building the RK lists.
///
/// # Errors
///
/// Returns an error if the requester is not the BKO, the competition does
/// not exist, or it is not in fase G.
pub fn request_regio_naar_rk(
    persistence: &mut Persistence,
    aanvrager: &Aanvrager,
    competitie_id: i64,
    today: Date,
) -> Result<RequestOutcome, ApiError> {
    vereis_rol(aanvrager, Rol::Bko, "regio naar RK")?;
    PhaseGate::RegioAfsluiten.check(fase_indiv(persistence, competitie_id, today)?)?;

    enqueue(
        persistence,
        &Mutation::RegioNaarRk { competitie_id },
        Some(competitie_id),
        aanvrager,
    )
}

/// Requests closing the RK and building the BK lists.
///
/// # Errors
///
/// Returns an error if the requester is not the BKO, the competition does
/// not exist, or it is not in fase L.
pub fn request_rk_naar_bk(
    persistence: &mut Persistence,
    aanvrager: &Aanvrager,
    competitie_id: i64,
    today: Date,
) -> Result<RequestOutcome, ApiError> {
    vereis_rol(aanvrager, Rol::Bko, "RK naar BK")?;
    PhaseGate::RkAfsluiten.check(fase_indiv(persistence, competitie_id, today)?)?;

    enqueue(
        persistence,
        &Mutation::RkNaarBk { competitie_id },
        Some(competitie_id),
        aanvrager,
    )
}

/// Requests the competitions of a new season.
///
/// # Errors
///
/// Returns an error if the requester is not the BB or the queue insert fails.
pub fn request_competitie_opstarten(
    persistence: &mut Persistence,
    aanvrager: &Aanvrager,
    begin_jaar: u16,
) -> Result<RequestOutcome, ApiError> {
    vereis_rol(aanvrager, Rol::Bb, "competitie opstarten")?;

    let bestaand: Vec<Afstand> = persistence
        .list_competities()?
        .into_iter()
        .filter(|c| c.begin_jaar == begin_jaar)
        .map(|c| c.afstand)
        .collect();
    if [Afstand::Achttien, Afstand::Vijfentwintig]
        .iter()
        .all(|afstand| bestaand.contains(afstand))
    {
        debug!(begin_jaar, "Season already exists");
        return Ok(RequestOutcome::Unchanged);
    }

    enqueue(
        persistence,
        &Mutation::CompetitieOpstarten { begin_jaar },
        None,
        aanvrager,
    )
}

/// Requests archiving a finished competition.
///
/// # Errors
///
/// Returns an error if the requester is not the BB, the competition does not
/// exist, or it is not in fase Q.
pub fn request_afsluiten(
    persistence: &mut Persistence,
    aanvrager: &Aanvrager,
    competitie_id: i64,
    today: Date,
) -> Result<RequestOutcome, ApiError> {
    vereis_rol(aanvrager, Rol::Bb, "competitie afsluiten")?;

    let competitie: Competitie = persistence.get_competitie(competitie_id)?;
    if competitie.tijdlijn.is_afgesloten {
        return Ok(RequestOutcome::Unchanged);
    }
    PhaseGate::Archiveren.check(competitie.tijdlijn.bepaal_fase_indiv(today))?;

    enqueue(
        persistence,
        &Mutation::Afsluiten { competitie_id },
        Some(competitie_id),
        aanvrager,
    )
}

/// Requests recomputing the regio averages of a competition.
///
/// Only allowed while the class boundaries are still open (fase A), since
/// the averages decide the class a sporter is placed in.
///
/// # Errors
///
/// Returns an error if the requester is not the BB, the competition does
/// not exist, or it is past fase A.
pub fn request_ag_vaststellen(
    persistence: &mut Persistence,
    aanvrager: &Aanvrager,
    competitie_id: i64,
    today: Date,
) -> Result<RequestOutcome, ApiError> {
    vereis_rol(aanvrager, Rol::Bb, "aanvangsgemiddelden vaststellen")?;
    PhaseGate::AgVaststellen.check(fase_indiv(persistence, competitie_id, today)?)?;

    enqueue(
        persistence,
        &Mutation::AgVaststellen { competitie_id },
        Some(competitie_id),
        aanvrager,
    )
}

// ============================================================================
// Read side
// ============================================================================

/// Derives both phases of a competition.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the competition does not exist.
pub fn fase_overzicht(
    persistence: &mut Persistence,
    competitie_id: i64,
    today: Date,
) -> Result<FaseResponse, ApiError> {
    let competitie: Competitie = persistence.get_competitie(competitie_id)?;
    let fases: Fases = competitie.bepaal_fases(today);

    Ok(FaseResponse {
        competitie_id,
        beschrijving: competitie.beschrijving,
        fase_indiv: fases.indiv,
        fase_teams: fases.teams,
    })
}

/// Reports whether a queued mutation has been applied.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the mutation does not exist.
pub fn mutation_status(
    persistence: &mut Persistence,
    mutatie_id: i64,
) -> Result<MutationStatus, ApiError> {
    let record: MutatieRecord = persistence.get_mutation(mutatie_id)?;

    Ok(MutationStatus {
        mutatie_id,
        kind: record.kind,
        processed: record.is_verwerkt,
        verwerkt_at: record.verwerkt_at,
        fout: record.fout,
    })
}
