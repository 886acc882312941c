// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Who is asking.
//!
//! Accounts and sessions live outside this crate. A request arrives with the
//! requester's name and the role they act in; the role decides which tiers,
//! classes and entries they may change.

use std::str::{FromStr, SplitWhitespace};

use crate::request_response::PayloadError;

/// The role a requester acts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rol {
    /// Competition manager of the whole bond; starts and archives seasons.
    Bb,
    /// BK organiser; closes the regio and the RK, manages the BK.
    Bko,
    /// RK organiser of one rayon.
    Rko {
        /// The rayon.
        rayon_nr: u8,
    },
    /// Club official, acting for the members of one club.
    Hwl {
        /// The club.
        ver_nr: i64,
    },
}

impl Rol {
    /// Name used in authorization errors.
    #[must_use]
    pub const fn naam(&self) -> &'static str {
        match self {
            Self::Bb => "BB",
            Self::Bko => "BKO",
            Self::Rko { .. } => "RKO",
            Self::Hwl { .. } => "HWL",
        }
    }
}

impl std::fmt::Display for Rol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bb | Self::Bko => f.write_str(self.naam()),
            Self::Rko { rayon_nr } => write!(f, "RKO {rayon_nr}"),
            Self::Hwl { ver_nr } => write!(f, "HWL {ver_nr}"),
        }
    }
}

impl FromStr for Rol {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut delen: SplitWhitespace<'_> = s.split_whitespace();
        let naam: &str = delen.next().unwrap_or_default();
        let nummer: Option<&str> = delen.next();
        if delen.next().is_some() {
            return Err(PayloadError::InvalidRol(s.to_string()));
        }

        match (naam.to_ascii_uppercase().as_str(), nummer) {
            ("BB", None) => Ok(Self::Bb),
            ("BKO", None) => Ok(Self::Bko),
            ("RKO", Some(nr)) => nr
                .parse()
                .map(|rayon_nr| Self::Rko { rayon_nr })
                .map_err(|_| PayloadError::InvalidRol(s.to_string())),
            ("HWL", Some(nr)) => nr
                .parse()
                .map(|ver_nr| Self::Hwl { ver_nr })
                .map_err(|_| PayloadError::InvalidRol(s.to_string())),
            _ => Err(PayloadError::InvalidRol(s.to_string())),
        }
    }
}

/// A requester with the role they act in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aanvrager {
    /// Name recorded in the queue and the logbooks.
    pub door: String,
    /// The role.
    pub rol: Rol,
}

impl Aanvrager {
    /// Creates a new requester.
    ///
    /// # Arguments
    ///
    /// * `door` - The name recorded with every change
    /// * `rol` - The role the requester acts in
    ///
    /// # Errors
    ///
    /// Returns `PayloadError::MissingDoor` when the name is blank.
    pub fn new(door: &str, rol: Rol) -> Result<Self, PayloadError> {
        let door: &str = door.trim();
        if door.is_empty() {
            return Err(PayloadError::MissingDoor);
        }
        Ok(Self {
            door: door.to_string(),
            rol,
        })
    }
}
