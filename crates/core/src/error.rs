// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use kampcomp_domain::DomainError;

/// Errors that can occur while applying a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// The stored mutation code is not known.
    UnknownMutation {
        /// The stored code.
        kind: String,
    },
    /// The stored payload does not decode into the mutation named by its code.
    MalformedPayload {
        /// The stored code.
        kind: String,
        /// What went wrong.
        message: String,
    },
    /// The loaded state does not belong to the mutation being applied.
    TargetMismatch {
        /// The mutation code.
        kind: &'static str,
        /// What was expected.
        expected: String,
    },
    /// A selected sporter belongs to a rayon without an RK tier.
    MissingRk {
        /// The rayon without RK.
        rayon_nr: u8,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::UnknownMutation { kind } => write!(f, "Unknown mutation kind '{kind}'"),
            Self::MalformedPayload { kind, message } => {
                write!(f, "Malformed payload for mutation '{kind}': {message}")
            }
            Self::TargetMismatch { kind, expected } => {
                write!(f, "Target mismatch for mutation '{kind}': expected {expected}")
            }
            Self::MissingRk { rayon_nr } => write!(f, "No RK exists for rayon {rayon_nr}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
