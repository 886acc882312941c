// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use crate::request_response::PayloadError;
use kampcomp::CoreError;
use kampcomp_domain::{DomainError, Fase};
use kampcomp_persistence::PersistenceError;

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The requester's role does not cover this action or this target.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// The action is not allowed in the competition's current phase.
    WrongPhase {
        /// The action that was attempted.
        actie: String,
        /// The phase the competition is in.
        fase: Fase,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::WrongPhase { actie, fase } => {
                write!(f, "'{actie}' is not allowed in fase {fase}")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        translate_domain_error(err)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        translate_core_error(err)
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        translate_persistence_error(err)
    }
}

impl From<PayloadError> for ApiError {
    fn from(err: PayloadError) -> Self {
        let field: &str = match err {
            PayloadError::MissingDoor => "door",
            PayloadError::InvalidRol(_) => "rol",
            PayloadError::InvalidActie(_) => "actie",
        };
        Self::InvalidInput {
            field: field.to_string(),
            message: err.to_string(),
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::WrongPhase { actie, fase } => ApiError::WrongPhase { actie, fase },
        DomainError::InvalidLimiet { limiet } => ApiError::InvalidInput {
            field: String::from("limiet"),
            message: format!("Limiet {limiet} must be between 1 and 48"),
        },
        DomainError::EntryNotFound { entry_id } => ApiError::ResourceNotFound {
            resource_type: String::from("Deelnemer"),
            message: format!("Deelnemer {entry_id} does not exist"),
        },
        DomainError::DuplicateEntry { entry_id } => ApiError::DomainRuleViolation {
            rule: String::from("unique_deelnemer"),
            message: format!("Deelnemer {entry_id} is already on the list"),
        },
        DomainError::NoClub { lid_nr } => ApiError::DomainRuleViolation {
            rule: String::from("lid_van_vereniging"),
            message: format!("Sporter {lid_nr} is not a member of any club"),
        },
        DomainError::UnsupportedPhaseCombination { .. } => ApiError::DomainRuleViolation {
            rule: String::from("fase_combinatie"),
            message: err.to_string(),
        },
        DomainError::InvalidFase(_)
        | DomainError::InvalidDeelname(_)
        | DomainError::InvalidDeel(_)
        | DomainError::InvalidAfstand(_)
        | DomainError::InvalidGemiddelde(_) => ApiError::InvalidInput {
            field: String::from("waarde"),
            message: err.to_string(),
        },
        DomainError::RankingInvariantViolated(msg) => ApiError::Internal {
            message: format!("Ranking invariant violated: {msg}"),
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::UnknownMutation { .. }
        | CoreError::MalformedPayload { .. }
        | CoreError::TargetMismatch { .. }
        | CoreError::MissingRk { .. } => ApiError::Internal {
            message: err.to_string(),
        },
    }
}

/// Translates a persistence error into an API error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message,
        },
        PersistenceError::MutationNotFound(mutatie_id) => ApiError::ResourceNotFound {
            resource_type: String::from("Mutatie"),
            message: format!("Mutatie {mutatie_id} does not exist"),
        },
        PersistenceError::Rejected(core_err) => translate_core_error(core_err),
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
