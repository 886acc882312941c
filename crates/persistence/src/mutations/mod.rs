// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Writes.
//!
//! Every function takes the connection it is given and does not open its
//! own transaction, except where noted; `process` wraps a whole mutation
//! in one.

pub mod audit;
pub mod competitie;
pub mod deelnemers;
pub mod leases;
pub mod mutaties;
pub mod overstap;
pub mod process;
pub mod referentie;

use time::PrimitiveDateTime;
use time::macros::format_description;

use crate::error::PersistenceError;

/// Formats a processing stamp the way `CURRENT_TIMESTAMP` does.
pub fn format_stamp(stamp: PrimitiveDateTime) -> Result<String, PersistenceError> {
    stamp
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}
