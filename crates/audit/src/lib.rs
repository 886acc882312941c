// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use time::PrimitiveDateTime;

/// Represents whoever requested a change.
///
/// The `door` string is stored on every queued mutation and repeated in the
/// logbook of the entries it touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Who did it, e.g. "RKO Rayon 2" or an account name.
    pub door: String,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `door` - The actor string recorded with each change
    #[must_use]
    pub const fn new(door: String) -> Self {
        Self { door }
    }

    /// The actor used for changes the worker makes on its own.
    #[must_use]
    pub fn systeem() -> Self {
        Self::new(String::from("Systeem"))
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.door)
    }
}

/// One timestamped line in an entry's logbook.
///
/// Rendered as `[2026-02-14 om 09:30] Deelname op Ja gezet`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogboekRegel {
    /// When it happened (UTC).
    pub stamp: PrimitiveDateTime,
    /// What happened.
    pub tekst: String,
}

impl LogboekRegel {
    /// Creates a new logbook line.
    #[must_use]
    pub const fn new(stamp: PrimitiveDateTime, tekst: String) -> Self {
        Self { stamp, tekst }
    }

    /// Appends this line, newline terminated, to a logbook.
    pub fn append_to(&self, logboek: &mut String) {
        logboek.push_str(&self.to_string());
        logboek.push('\n');
    }
}

impl std::fmt::Display for LogboekRegel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:04}-{:02}-{:02} om {:02}:{:02}] {}",
            self.stamp.year(),
            u8::from(self.stamp.month()),
            self.stamp.day(),
            self.stamp.hour(),
            self.stamp.minute(),
            self.tekst
        )
    }
}

/// Represents the specific action performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// The name of the action, the mutation code (e.g. "CUT").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the action
    /// * `details` - Optional additional details
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// A short description of the state a mutation touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    /// A string representation of the state.
    pub data: String,
}

impl StateSnapshot {
    /// Creates a new `StateSnapshot`.
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }
}

/// An immutable record of one processed mutation.
///
/// Every mutation the worker processes produces exactly one audit event,
/// written in the same transaction that marks the mutation processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// The mutation that was processed; `None` for worker background work.
    pub mutatie_id: Option<i64>,
    /// The competition affected, when known.
    pub competitie_id: Option<i64>,
    /// The actor who requested the change.
    pub actor: Actor,
    /// The action that was performed.
    pub action: Action,
    /// The state before the transition.
    pub before: StateSnapshot,
    /// The state after the transition.
    pub after: StateSnapshot,
}

impl AuditEvent {
    /// Creates a new `AuditEvent`.
    ///
    /// # Arguments
    ///
    /// * `mutatie_id` - The processed mutation, if any
    /// * `competitie_id` - The affected competition, if known
    /// * `actor` - The actor who initiated the change
    /// * `action` - The action that was performed
    /// * `before` - The state before the transition
    /// * `after` - The state after the transition
    #[must_use]
    pub const fn new(
        mutatie_id: Option<i64>,
        competitie_id: Option<i64>,
        actor: Actor,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
    ) -> Self {
        Self {
            mutatie_id,
            competitie_id,
            actor,
            action,
            before,
            after,
        }
    }
}
