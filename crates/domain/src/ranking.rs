// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The ranked entry list of one class in one championship tier.
//!
//! The list is held in volgorde order. Every operation rebuilds the list and
//! then renumbers both volgorde (1..N, from list position) and rank (0 for a
//! withdrawn entry, otherwise the next dense number). Reserves therefore carry
//! a rank above the limiet; [`RankingSet::start_rank`] gives the view in which
//! everything below the cut is 0.

use crate::error::DomainError;
use crate::types::{Deelname, Gemiddelde};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Limiet applied to a class when no explicit limit is stored.
pub const DEFAULT_LIMIET: u16 = 24;

/// The highest limiet an administrator may configure.
pub const MAX_LIMIET: u16 = 48;

/// The BK keeps at most this many entries per class.
pub const BK_MAX_DEELNEMERS: usize = 48;

/// One sporter's entry in a class of a championship tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Entry identifier.
    pub id: i64,
    /// Position in the list, 1..N.
    pub volgorde: u16,
    /// Dense rank among non-withdrawn entries; 0 when withdrawn.
    pub rank: u16,
    /// Participation state.
    pub deelname: Deelname,
    /// Non-empty for a protected champion.
    pub kampioen_label: String,
    /// Seed strength.
    pub gemiddelde: Gemiddelde,
    /// Digit string used to break ties on equal gemiddelde.
    pub gemiddelde_scores: String,
}

impl Entry {
    /// Creates an unranked entry with deelname `Onbekend`.
    #[must_use]
    pub const fn new(id: i64, gemiddelde: Gemiddelde, gemiddelde_scores: String) -> Self {
        Self {
            id,
            volgorde: 0,
            rank: 0,
            deelname: Deelname::Onbekend,
            kampioen_label: String::new(),
            gemiddelde,
            gemiddelde_scores,
        }
    }

    /// Marks the entry as a champion.
    #[must_use]
    pub fn with_kampioen_label(mut self, label: &str) -> Self {
        self.kampioen_label = label.to_string();
        self
    }

    /// Sets the deelname.
    #[must_use]
    pub const fn with_deelname(mut self, deelname: Deelname) -> Self {
        self.deelname = deelname;
        self
    }

    /// Places the entry at a given volgorde.
    #[must_use]
    pub const fn with_volgorde(mut self, volgorde: u16) -> Self {
        self.volgorde = volgorde;
        self
    }

    /// Returns true for a protected champion.
    #[must_use]
    pub const fn is_kampioen(&self) -> bool {
        !self.kampioen_label.is_empty()
    }

    /// Returns true unless the entry has withdrawn.
    #[must_use]
    pub fn is_actief(&self) -> bool {
        self.deelname != Deelname::Nee
    }
}

/// Result of a cut change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutChange {
    /// The new limiet equals the current one; nothing changed.
    Unchanged,
    /// The limiet went up.
    Raised,
    /// The limiet went down.
    Lowered,
}

/// Result of a withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawOutcome {
    /// The entry was already withdrawn; nothing changed.
    AlreadyWithdrawn,
    /// The entry is now withdrawn.
    Withdrawn {
        /// The reserve that was called up to fill the slot, if any.
        promoted_reserve: Option<i64>,
    },
}

/// Result of a (re-)registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReregisterOutcome {
    /// The entry was already confirmed; nothing changed.
    AlreadyRegistered,
    /// An unconfirmed entry was confirmed in place.
    Confirmed,
    /// The class was full; the entry joined the reserve list.
    ToReserveList,
    /// There was room; the entry went straight into the deelnemers list.
    ToDeelnemersList,
}

impl ReregisterOutcome {
    /// Logbook text for an entry that moved, if any.
    #[must_use]
    pub const fn logboek_tekst(&self) -> Option<&'static str> {
        match self {
            Self::ToReserveList => Some("Naar de reserve-lijst"),
            Self::ToDeelnemersList => Some("Direct naar de deelnemerslijst"),
            Self::AlreadyRegistered | Self::Confirmed => None,
        }
    }
}

/// Entries of one (championship tier, class) pair, in volgorde order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingSet {
    limiet: u16,
    entries: Vec<Entry>,
}

impl RankingSet {
    /// Builds a ranking set from stored entries.
    ///
    /// Entries are ordered by their stored volgorde (id breaks ties) and then
    /// renumbered, so the result always satisfies the density invariants.
    ///
    /// # Arguments
    ///
    /// * `limiet` - The cut for this class
    /// * `entries` - The entries in any order
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DuplicateEntry` if an id occurs twice, or
    /// `DomainError::InvalidLimiet` for a limiet outside 1..=48.
    pub fn new(limiet: u16, mut entries: Vec<Entry>) -> Result<Self, DomainError> {
        validate_limiet(i64::from(limiet))?;

        let mut seen: HashSet<i64> = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.id) {
                return Err(DomainError::DuplicateEntry { entry_id: entry.id });
            }
        }

        entries.sort_by_key(|e| (e.volgorde, e.id));
        let mut set: Self = Self { limiet, entries };
        set.renumber();
        Ok(set)
    }

    /// The current cut.
    #[must_use]
    pub const fn limiet(&self) -> u16 {
        self.limiet
    }

    /// The entries in volgorde order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Consumes the set, returning the entries in volgorde order.
    #[must_use]
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    /// Number of entries, withdrawn ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the class has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up an entry.
    #[must_use]
    pub fn get(&self, entry_id: i64) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == entry_id)
    }

    /// The starting-slot rank: the rank for deelnemers, 0 for reserves and withdrawals.
    #[must_use]
    pub const fn start_rank(&self, entry: &Entry) -> u16 {
        if entry.rank > self.limiet {
            0
        } else {
            entry.rank
        }
    }

    /// Returns true when the entry holds a starting slot.
    #[must_use]
    pub const fn is_deelnemer(&self, entry: &Entry) -> bool {
        entry.rank > 0 && entry.rank <= self.limiet
    }

    /// Returns true when the entry is waiting on the reserve list.
    #[must_use]
    pub const fn is_reserve(&self, entry: &Entry) -> bool {
        entry.rank > self.limiet
    }

    // ========================================================================
    // Full recompute
    // ========================================================================

    /// Establishes the list from scratch (INITIEEL).
    ///
    /// Champions are guaranteed a place above the cut. The list is filled up
    /// with the strongest non-champions until the limiet is reached, that top
    /// group is ordered by gemiddelde, and the remaining non-champions follow
    /// by strength.
    ///
    /// # Arguments
    ///
    /// * `zet_boven_cut_op_ja` - Confirm every active entry in the top group
    pub fn initial_allocation(&mut self, zet_boven_cut_op_ja: bool) {
        let limiet: usize = usize::from(self.limiet);
        let (kampioenen, mut overigen): (Vec<Entry>, Vec<Entry>) =
            std::mem::take(&mut self.entries)
                .into_iter()
                .partition(Entry::is_kampioen);
        overigen.sort_by(sterkte);

        let mut aantal: usize = kampioenen.iter().filter(|e| e.is_actief()).count();
        let mut lijst: Vec<Entry> = kampioenen;
        let mut rest = overigen.into_iter();

        // the limiet is checked after each append
        for entry in rest.by_ref() {
            let telt: bool = entry.is_actief();
            lijst.push(entry);
            if telt {
                aantal += 1;
                if aantal >= limiet {
                    break;
                }
            }
        }

        let mut lijst: Vec<Entry> = sorteer_op_gemiddelde(lijst);
        if zet_boven_cut_op_ja {
            for entry in lijst.iter_mut().filter(|e| e.is_actief()) {
                entry.deelname = Deelname::Ja;
            }
        }
        lijst.extend(rest);

        self.entries = lijst;
        self.renumber();
    }

    // ========================================================================
    // Cut
    // ========================================================================

    /// Changes the limiet and re-sequences the list.
    ///
    /// Raising keeps the list as it is: every ranked entry keeps its rank and
    /// the first reserves, in volgorde order, take the new slots. A champion
    /// lifted by an earlier lowering keeps the slot it got. Lowering keeps the
    /// champions that already had a slot above the new cut.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidLimiet` for a value outside 1..=48.
    pub fn apply_cut_change(&mut self, nieuw: u16) -> Result<CutChange, DomainError> {
        validate_limiet(i64::from(nieuw))?;

        let oud: u16 = self.limiet;
        let change: CutChange = match nieuw.cmp(&oud) {
            Ordering::Equal => return Ok(CutChange::Unchanged),
            Ordering::Greater => CutChange::Raised,
            Ordering::Less => {
                let (binnen, buiten): (Vec<Entry>, Vec<Entry>) = std::mem::take(&mut self.entries)
                    .into_iter()
                    .partition(|e| e.rank <= oud);
                let (kampioenen, mut overigen): (Vec<Entry>, Vec<Entry>) =
                    binnen.into_iter().partition(Entry::is_kampioen);
                overigen.sort_by(sterkte);

                let mut aantal: usize = kampioenen.iter().filter(|e| e.is_actief()).count();
                let mut lijst: Vec<Entry> = kampioenen;
                let mut onder_cut: Vec<Entry> = Vec::new();
                for entry in overigen {
                    if aantal < usize::from(nieuw) {
                        if entry.is_actief() {
                            aantal += 1;
                        }
                        lijst.push(entry);
                    } else {
                        onder_cut.push(entry);
                    }
                }

                let mut lijst: Vec<Entry> = sorteer_op_gemiddelde(lijst);
                lijst.extend(onder_cut);
                lijst.extend(buiten);
                self.entries = lijst;
                CutChange::Lowered
            }
        };

        self.limiet = nieuw;
        self.renumber();
        Ok(change)
    }

    // ========================================================================
    // Withdraw / reregister
    // ========================================================================

    /// Withdraws an entry and calls up the first reserve.
    ///
    /// The withdrawn entry keeps its place in the list so it can still be
    /// shown. When it held a slot above the cut, the first reserve moves up to
    /// just before the first weaker deelnemer.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EntryNotFound` when the entry is not in this class.
    pub fn withdraw(&mut self, entry_id: i64) -> Result<WithdrawOutcome, DomainError> {
        let pos: usize = self.position(entry_id)?;
        if !self.entries[pos].is_actief() {
            return Ok(WithdrawOutcome::AlreadyWithdrawn);
        }

        let afgemeld_volgorde: u16 = self.entries[pos].volgorde;
        self.entries[pos].deelname = Deelname::Nee;

        // ranks are still those from before the withdrawal
        let limiet: u16 = self.limiet;
        let reserve_rank: u16 = limiet.saturating_add(1);
        let mut promoted_reserve: Option<i64> = None;

        let reserve_pos: Option<usize> = self
            .entries
            .iter()
            .position(|e| e.rank == reserve_rank && e.is_actief());

        if let Some(reserve_pos) = reserve_pos {
            let reserve_volgorde: u16 = self.entries[reserve_pos].volgorde;
            let reserve_gemiddelde: Gemiddelde = self.entries[reserve_pos].gemiddelde;

            if reserve_volgorde > afgemeld_volgorde {
                promoted_reserve = Some(self.entries[reserve_pos].id);

                let slechter: Option<usize> = self.entries.iter().position(|e| {
                    e.gemiddelde < reserve_gemiddelde
                        && e.rank <= limiet
                        && e.volgorde < reserve_volgorde
                });
                if let Some(target) = slechter {
                    let reserve: Entry = self.entries.remove(reserve_pos);
                    self.entries.insert(target, reserve);
                }
            }
        }

        self.renumber();
        Ok(WithdrawOutcome::Withdrawn { promoted_reserve })
    }

    /// Registers an entry again after a withdrawal, or confirms it.
    ///
    /// A withdrawn entry does not get its old place back. It is taken out of
    /// the list and re-inserted by gemiddelde: on the reserve list when the
    /// class is full, otherwise directly among the deelnemers. It always lands
    /// after entries with an equal gemiddelde.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EntryNotFound` when the entry is not in this class.
    pub fn reregister(&mut self, entry_id: i64) -> Result<ReregisterOutcome, DomainError> {
        let pos: usize = self.position(entry_id)?;
        match self.entries[pos].deelname {
            Deelname::Ja => Ok(ReregisterOutcome::AlreadyRegistered),
            Deelname::Onbekend => {
                self.entries[pos].deelname = Deelname::Ja;
                Ok(ReregisterOutcome::Confirmed)
            }
            Deelname::Nee => {
                let entry: Entry = self.entries.remove(pos);
                Ok(self.herplaats(entry))
            }
        }
    }

    /// Adds a late entry to the class the same way a re-registration is placed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DuplicateEntry` when the id is already present.
    pub fn add_extra(&mut self, entry: Entry) -> Result<ReregisterOutcome, DomainError> {
        if self.get(entry.id).is_some() {
            return Err(DomainError::DuplicateEntry { entry_id: entry.id });
        }
        Ok(self.herplaats(entry))
    }

    fn herplaats(&mut self, mut entry: Entry) -> ReregisterOutcome {
        let limiet: u16 = self.limiet;
        let aantal: usize = self
            .entries
            .iter()
            .filter(|e| e.is_actief() && e.rank <= limiet)
            .count();

        let (index, outcome): (usize, ReregisterOutcome) = if aantal >= usize::from(limiet) {
            let nieuwe_rank: u16 = self
                .entries
                .iter()
                .filter(|e| e.rank > limiet && e.gemiddelde >= entry.gemiddelde)
                .min_by(|a, b| zwakste_eerst(a, b))
                .map_or(limiet.saturating_add(1), |e| e.rank.saturating_add(1));

            let index: usize = self
                .entries
                .iter()
                .position(|e| e.rank >= nieuwe_rank)
                .unwrap_or(self.entries.len());
            (index, ReregisterOutcome::ToReserveList)
        } else {
            let index: usize = self
                .entries
                .iter()
                .enumerate()
                .filter(|(_, e)| e.gemiddelde >= entry.gemiddelde)
                .min_by(|(_, a), (_, b)| zwakste_eerst(a, b))
                .map_or(0, |(i, _)| i + 1);
            (index, ReregisterOutcome::ToDeelnemersList)
        };

        entry.deelname = Deelname::Ja;
        self.entries.insert(index, entry);
        self.renumber();
        outcome
    }

    // ========================================================================
    // Membership
    // ========================================================================

    /// Takes an entry out of the class.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EntryNotFound` when the entry is not in this class.
    pub fn remove(&mut self, entry_id: i64) -> Result<Entry, DomainError> {
        let pos: usize = self.position(entry_id)?;
        let entry: Entry = self.entries.remove(pos);
        self.renumber();
        Ok(entry)
    }

    /// Appends an entry at the end of the list, ahead of a full recompute.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DuplicateEntry` when the id is already present.
    pub fn insert_unranked(&mut self, entry: Entry) -> Result<(), DomainError> {
        if self.get(entry.id).is_some() {
            return Err(DomainError::DuplicateEntry { entry_id: entry.id });
        }
        self.entries.push(entry);
        self.renumber();
        Ok(())
    }

    /// Drops every entry beyond `max` and returns the dropped ids.
    pub fn truncate(&mut self, max: usize) -> Vec<i64> {
        if self.entries.len() <= max {
            return Vec::new();
        }
        let dropped: Vec<i64> = self.entries.split_off(max).into_iter().map(|e| e.id).collect();
        self.renumber();
        dropped
    }

    /// Verifies volgorde density and rank density.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::RankingInvariantViolated` describing the first
    /// violation found.
    pub fn check_invariants(&self) -> Result<(), DomainError> {
        let mut rank: u16 = 0;
        for (index, entry) in self.entries.iter().enumerate() {
            let expected: usize = index + 1;
            if usize::from(entry.volgorde) != expected {
                return Err(DomainError::RankingInvariantViolated(format!(
                    "entry {} has volgorde {}, expected {expected}",
                    entry.id, entry.volgorde
                )));
            }

            let expected_rank: u16 = if entry.is_actief() {
                rank += 1;
                rank
            } else {
                0
            };
            if entry.rank != expected_rank {
                return Err(DomainError::RankingInvariantViolated(format!(
                    "entry {} has rank {}, expected {expected_rank}",
                    entry.id, entry.rank
                )));
            }
        }
        Ok(())
    }

    fn position(&self, entry_id: i64) -> Result<usize, DomainError> {
        self.entries
            .iter()
            .position(|e| e.id == entry_id)
            .ok_or(DomainError::EntryNotFound { entry_id })
    }

    fn renumber(&mut self) {
        let mut rank: u16 = 0;
        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.volgorde = u16::try_from(index + 1).unwrap_or(u16::MAX);
            if entry.is_actief() {
                rank = rank.saturating_add(1);
                entry.rank = rank;
            } else {
                entry.rank = 0;
            }
        }
    }
}

/// Validates a limiet against the permitted range 1..=48.
///
/// # Errors
///
/// Returns `DomainError::InvalidLimiet` for any other value.
pub fn validate_limiet(limiet: i64) -> Result<u16, DomainError> {
    u16::try_from(limiet)
        .ok()
        .filter(|l| (1..=MAX_LIMIET).contains(l))
        .ok_or(DomainError::InvalidLimiet { limiet })
}

/// Strongest first: gemiddelde, then the score string, then current volgorde.
fn sterkte(a: &Entry, b: &Entry) -> Ordering {
    b.gemiddelde
        .cmp(&a.gemiddelde)
        .then_with(|| b.gemiddelde_scores.cmp(&a.gemiddelde_scores))
        .then_with(|| a.volgorde.cmp(&b.volgorde))
}

/// Weakest first; among equals the one furthest down the list wins.
fn zwakste_eerst(a: &Entry, b: &Entry) -> Ordering {
    a.gemiddelde
        .cmp(&b.gemiddelde)
        .then_with(|| a.gemiddelde_scores.cmp(&b.gemiddelde_scores))
        .then_with(|| b.volgorde.cmp(&a.volgorde))
}

/// Orders by gemiddelde, highest first. On equal gemiddelde the entry that
/// was added to the group later goes first.
fn sorteer_op_gemiddelde(lijst: Vec<Entry>) -> Vec<Entry> {
    let mut indexed: Vec<(usize, Entry)> = lijst.into_iter().enumerate().collect();
    indexed.sort_by(|(ia, a), (ib, b)| b.gemiddelde.cmp(&a.gemiddelde).then(ib.cmp(ia)));
    indexed.into_iter().map(|(_, e)| e).collect()
}
