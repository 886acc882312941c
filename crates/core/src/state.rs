// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use kampcomp_audit::{Action, Actor, AuditEvent, LogboekRegel, StateSnapshot};
use kampcomp_domain::{Entry, RankingSet};
use time::PrimitiveDateTime;

/// Who is applying a mutation, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationContext {
    /// The queued mutation; `None` for work the worker starts itself.
    pub mutatie_id: Option<i64>,
    /// The competition affected, when known.
    pub competitie_id: Option<i64>,
    /// Who requested the change.
    pub actor: Actor,
    /// Stamp for every logbook line this mutation writes (UTC).
    pub stamp: PrimitiveDateTime,
}

impl MutationContext {
    /// Creates a new context.
    ///
    /// # Arguments
    ///
    /// * `mutatie_id` - The queued mutation, if any
    /// * `competitie_id` - The affected competition, if known
    /// * `actor` - Who requested the change
    /// * `stamp` - The processing time
    #[must_use]
    pub const fn new(
        mutatie_id: Option<i64>,
        competitie_id: Option<i64>,
        actor: Actor,
        stamp: PrimitiveDateTime,
    ) -> Self {
        Self {
            mutatie_id,
            competitie_id,
            actor,
            stamp,
        }
    }

    pub(crate) fn regel(&self, tekst: impl Into<String>) -> LogboekRegel {
        LogboekRegel::new(self.stamp, tekst.into())
    }

    pub(crate) fn audit(
        &self,
        name: &str,
        details: String,
        before: StateSnapshot,
        after: StateSnapshot,
    ) -> AuditEvent {
        AuditEvent::new(
            self.mutatie_id,
            self.competitie_id,
            self.actor.clone(),
            Action::new(name.to_string(), Some(details)),
            before,
            after,
        )
    }
}

/// The entries of one class of one championship tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KlasseState {
    /// The tier.
    pub kampioenschap_id: i64,
    /// The class.
    pub indiv_klasse_id: i64,
    /// The ranked entries.
    pub set: RankingSet,
}

impl KlasseState {
    /// Creates a new class state.
    #[must_use]
    pub const fn new(kampioenschap_id: i64, indiv_klasse_id: i64, set: RankingSet) -> Self {
        Self {
            kampioenschap_id,
            indiv_klasse_id,
            set,
        }
    }

    /// Summarizes the class for an audit event.
    #[must_use]
    pub fn to_snapshot(&self) -> StateSnapshot {
        let limiet: u16 = self.set.limiet();
        let entries: &[Entry] = self.set.entries();
        let deelnemers: usize = entries
            .iter()
            .filter(|e| e.is_actief() && e.rank <= limiet)
            .count();
        let reserves: usize = entries
            .iter()
            .filter(|e| e.is_actief() && e.rank > limiet)
            .count();
        let afgemeld: usize = entries.len() - deelnemers - reserves;

        StateSnapshot::new(format!(
            "kampioenschap={} klasse={} limiet={limiet} deelnemers={deelnemers} \
             reserves={reserves} afgemeld={afgemeld}",
            self.kampioenschap_id, self.indiv_klasse_id
        ))
    }
}

/// Everything one class-level mutation reads, loaded fresh from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// One class (cut, withdraw, confirm).
    Klasse(KlasseState),
    /// Every class of one tier (full recompute).
    Kampioenschap {
        /// The tier.
        kampioenschap_id: i64,
        /// Its classes.
        klassen: Vec<KlasseState>,
    },
    /// A class plus a freshly stored late entry that is not yet ranked.
    Extra {
        /// The class the entry joins.
        klasse: KlasseState,
        /// The new entry.
        entry: Entry,
    },
    /// The classes an entry moves between.
    Verplaatsing {
        /// The entry's current class.
        van: KlasseState,
        /// The target class.
        naar: KlasseState,
    },
}

/// A limiet to store for a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimietWijziging {
    /// The tier.
    pub kampioenschap_id: i64,
    /// The class.
    pub indiv_klasse_id: i64,
    /// The new limiet.
    pub limiet: u16,
}

/// The outcome of applying a class-level mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// Every class touched, in its new state.
    pub klassen: Vec<KlasseState>,
    /// A changed limiet, if any.
    pub limiet: Option<LimietWijziging>,
    /// Logbook lines per entry id, in the order they were written.
    pub logboek: Vec<(i64, LogboekRegel)>,
    /// The audit event for this transition.
    pub audit_event: AuditEvent,
}
