// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! Storage columns are plain SQLite integers; the helpers here narrow them to
//! the domain's unsigned types and report a `CorruptRow` when a value does
//! not fit.

pub mod audit;
pub mod competitie;
pub mod deelnemers;
pub mod mutaties;
pub mod overstap;

use num_traits::ToPrimitive;

use crate::error::PersistenceError;

pub fn to_u8(table: &'static str, column: &str, value: i32) -> Result<u8, PersistenceError> {
    value
        .to_u8()
        .ok_or_else(|| PersistenceError::corrupt(table, format!("{column}={value} out of range")))
}

pub fn to_u16(
    table: &'static str,
    column: &str,
    value: i32,
) -> Result<u16, PersistenceError> {
    value
        .to_u16()
        .ok_or_else(|| PersistenceError::corrupt(table, format!("{column}={value} out of range")))
}

pub fn to_u32(
    table: &'static str,
    column: &str,
    value: i32,
) -> Result<u32, PersistenceError> {
    value
        .to_u32()
        .ok_or_else(|| PersistenceError::corrupt(table, format!("{column}={value} out of range")))
}

/// Stored flags are 0 or 1.
pub const fn to_bool(value: i32) -> bool {
    value != 0
}
