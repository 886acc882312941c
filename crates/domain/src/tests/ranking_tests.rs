// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{create_ranking_set, entry, ids};
use crate::{
    CutChange, Deelname, DomainError, Entry, Gemiddelde, RankingSet, ReregisterOutcome,
    WithdrawOutcome,
};
use proptest::prelude::*;

fn ranks(set: &RankingSet) -> Vec<u16> {
    set.entries().iter().map(|e| e.rank).collect()
}

fn start_ranks(set: &RankingSet) -> Vec<u16> {
    set.entries().iter().map(|e| set.start_rank(e)).collect()
}

/// Twenty entries, limiet 16, with the weakest (id 20) a regio champion.
fn create_set_with_weak_champion() -> RankingSet {
    let entries: Vec<Entry> = (1..=20)
        .map(|id| {
            let e: Entry = entry(id, 9_800 - u32::try_from(id).unwrap() * 100);
            if id == 20 {
                e.with_kampioen_label("Kampioen regio 101")
            } else {
                e
            }
        })
        .collect();
    let mut set: RankingSet = RankingSet::new(16, entries).unwrap();
    set.initial_allocation(false);
    set
}

// ============================================================================
// Construction and density
// ============================================================================

#[test]
fn test_new_renumbers_from_stored_volgorde() {
    let entries: Vec<Entry> = vec![
        entry(3, 9_000).with_volgorde(7),
        entry(1, 9_500).with_volgorde(2),
        entry(2, 9_200).with_volgorde(2),
    ];
    let set: RankingSet = RankingSet::new(24, entries).unwrap();

    assert_eq!(ids(&set), vec![1, 2, 3]);
    let volgordes: Vec<u16> = set.entries().iter().map(|e| e.volgorde).collect();
    assert_eq!(volgordes, vec![1, 2, 3]);
    assert!(set.check_invariants().is_ok());
}

#[test]
fn test_new_rejects_duplicate_ids() {
    let entries: Vec<Entry> = vec![entry(1, 9_000), entry(1, 8_000)];
    assert_eq!(
        RankingSet::new(24, entries),
        Err(DomainError::DuplicateEntry { entry_id: 1 })
    );
}

#[test]
fn test_withdrawn_entries_have_rank_zero() {
    let entries: Vec<Entry> = vec![
        entry(1, 9_500),
        entry(2, 9_400).with_deelname(Deelname::Nee),
        entry(3, 9_300),
    ];
    let set: RankingSet = RankingSet::new(24, entries).unwrap();
    assert_eq!(ranks(&set), vec![1, 0, 2]);
}

#[test]
fn test_invariants_hold_after_every_operation() {
    let mut set: RankingSet = create_set_with_weak_champion();
    set.check_invariants().unwrap();

    set.withdraw(4).unwrap();
    set.check_invariants().unwrap();
    set.withdraw(18).unwrap();
    set.check_invariants().unwrap();
    set.apply_cut_change(8).unwrap();
    set.check_invariants().unwrap();
    set.reregister(4).unwrap();
    set.check_invariants().unwrap();
    set.apply_cut_change(20).unwrap();
    set.check_invariants().unwrap();
    set.reregister(18).unwrap();
    set.check_invariants().unwrap();
    set.add_extra(Entry::new(21, Gemiddelde::from_milli(9_050), String::new()))
        .unwrap();
    set.check_invariants().unwrap();
    set.remove(7).unwrap();
    set.check_invariants().unwrap();

    assert_eq!(set.len(), 20);
}

// ============================================================================
// Cut
// ============================================================================

#[test]
fn test_basic_cut_and_raise() {
    let mut set: RankingSet = create_ranking_set(20, 16);

    let expected: Vec<u16> = (1..=16).chain([0, 0, 0, 0]).collect();
    assert_eq!(start_ranks(&set), expected);
    assert!(set.is_deelnemer(&set.entries()[15]));
    assert!(set.is_reserve(&set.entries()[16]));

    let change: CutChange = set.apply_cut_change(20).unwrap();
    assert_eq!(change, CutChange::Raised);
    assert_eq!(set.limiet(), 20);

    let expected: Vec<u16> = (1..=20).collect();
    assert_eq!(start_ranks(&set), expected);
    assert_eq!(ids(&set), (1..=20).collect::<Vec<i64>>());
}

#[test]
fn test_cut_change_to_same_value_is_unchanged() {
    let mut set: RankingSet = create_ranking_set(20, 16);
    let before: RankingSet = set.clone();

    assert_eq!(set.apply_cut_change(16).unwrap(), CutChange::Unchanged);
    assert_eq!(set, before);
}

#[test]
fn test_cut_change_rejects_out_of_range() {
    let mut set: RankingSet = create_ranking_set(5, 16);
    assert_eq!(
        set.apply_cut_change(0),
        Err(DomainError::InvalidLimiet { limiet: 0 })
    );
    assert_eq!(
        set.apply_cut_change(49),
        Err(DomainError::InvalidLimiet { limiet: 49 })
    );
    assert_eq!(set.limiet(), 16);
}

#[test]
fn test_raising_cut_keeps_deelnemers_and_fills_new_slots() {
    let mut set: RankingSet = create_set_with_weak_champion();
    let deelnemers: Vec<i64> = set
        .entries()
        .iter()
        .filter(|e| set.is_deelnemer(e))
        .map(|e| e.id)
        .collect();

    set.apply_cut_change(18).unwrap();

    for id in deelnemers {
        assert!(set.is_deelnemer(set.get(id).unwrap()), "entry {id}");
    }
    // the protected champion keeps slot 16; the first two reserves move up
    assert_eq!(set.get(20).unwrap().rank, 16);
    assert_eq!(set.get(16).unwrap().rank, 17);
    assert_eq!(set.get(17).unwrap().rank, 18);
    assert!(set.is_deelnemer(set.get(17).unwrap()));
    assert!(set.is_reserve(set.get(18).unwrap()));
}

#[test]
fn test_lowering_cut_keeps_champion_above_cut() {
    let mut set: RankingSet = create_set_with_weak_champion();

    assert_eq!(set.apply_cut_change(10).unwrap(), CutChange::Lowered);

    let champion: &Entry = set.get(20).unwrap();
    assert_eq!(champion.rank, 10);
    assert!(set.is_deelnemer(champion));

    let expected: Vec<i64> = (1..=9).chain([20]).chain(10..=19).collect();
    assert_eq!(ids(&set), expected);
}

#[test]
fn test_raising_cut_keeps_lifted_champion_in_place() {
    let mut set: RankingSet = create_set_with_weak_champion();

    set.apply_cut_change(10).unwrap();
    let lowered: Vec<u16> = ranks(&set);
    set.apply_cut_change(16).unwrap();

    let expected: Vec<i64> = (1..=9).chain([20]).chain(10..=19).collect();
    assert_eq!(ids(&set), expected);
    assert_eq!(ranks(&set), lowered);
    assert_eq!(set.get(20).unwrap().rank, 10);
    assert!(set.is_deelnemer(set.get(15).unwrap()));
    assert!(set.is_reserve(set.get(16).unwrap()));
}

#[test]
fn test_raising_cut_does_not_move_reregistered_entry_up() {
    let mut set: RankingSet = create_ranking_set(20, 16);
    set.withdraw(5).unwrap();
    set.reregister(5).unwrap();
    assert_eq!(set.get(5).unwrap().rank, 17);
    let before: RankingSet = set.clone();

    assert_eq!(set.apply_cut_change(17).unwrap(), CutChange::Raised);

    for entry in before.entries() {
        assert_eq!(set.get(entry.id).unwrap().rank, entry.rank, "entry {}", entry.id);
    }
    let reregistered: &Entry = set.get(5).unwrap();
    assert_eq!(reregistered.rank, 17);
    assert!(set.is_deelnemer(reregistered));
    assert!(set.is_reserve(set.get(18).unwrap()));
    set.check_invariants().unwrap();
}

// ============================================================================
// Full recompute
// ============================================================================

#[test]
fn test_initial_allocation_protects_champion() {
    let set: RankingSet = create_set_with_weak_champion();

    let expected: Vec<i64> = (1..=15).chain([20]).chain(16..=19).collect();
    assert_eq!(ids(&set), expected);
    assert_eq!(set.get(20).unwrap().rank, 16);
    assert!(set.is_reserve(set.get(16).unwrap()));
}

#[test]
fn test_initial_allocation_confirms_top_group() {
    let mut set: RankingSet = create_ranking_set(30, 24);
    set.initial_allocation(true);

    for entry in set.entries() {
        if entry.volgorde <= 24 {
            assert_eq!(entry.deelname, Deelname::Ja, "entry {}", entry.id);
        } else {
            assert_eq!(entry.deelname, Deelname::Onbekend, "entry {}", entry.id);
        }
    }
}

#[test]
fn test_initial_allocation_orders_by_gemiddelde() {
    let entries: Vec<Entry> = vec![
        entry(1, 8_000),
        entry(2, 9_000),
        entry(3, 8_500),
        entry(4, 9_000).with_deelname(Deelname::Nee),
    ];
    let mut set: RankingSet = RankingSet::new(24, entries).unwrap();
    set.initial_allocation(false);

    // equal gemiddelde: the later of the two goes first
    assert_eq!(ids(&set), vec![4, 2, 3, 1]);
    assert_eq!(ranks(&set), vec![0, 1, 2, 3]);
}

// ============================================================================
// Withdraw
// ============================================================================

#[test]
fn test_withdraw_promotes_first_reserve() {
    let mut set: RankingSet = create_ranking_set(20, 16);

    let outcome: WithdrawOutcome = set.withdraw(5).unwrap();
    assert_eq!(
        outcome,
        WithdrawOutcome::Withdrawn {
            promoted_reserve: Some(17)
        }
    );

    let withdrawn: &Entry = set.get(5).unwrap();
    assert_eq!(withdrawn.rank, 0);
    assert_eq!(withdrawn.volgorde, 5);
    assert_eq!(withdrawn.deelname, Deelname::Nee);

    let reserve: &Entry = set.get(17).unwrap();
    assert_eq!(reserve.rank, 16);
    assert!(set.is_deelnemer(reserve));
}

#[test]
fn test_double_withdraw_is_noop() {
    let mut set: RankingSet = create_ranking_set(20, 16);
    set.withdraw(5).unwrap();
    let after_first: RankingSet = set.clone();

    assert_eq!(set.withdraw(5).unwrap(), WithdrawOutcome::AlreadyWithdrawn);
    assert_eq!(set, after_first);
    assert_eq!(set.get(5).unwrap().rank, 0);
}

#[test]
fn test_withdraw_of_reserve_promotes_nobody() {
    let mut set: RankingSet = create_ranking_set(20, 16);

    let outcome: WithdrawOutcome = set.withdraw(19).unwrap();
    assert_eq!(
        outcome,
        WithdrawOutcome::Withdrawn {
            promoted_reserve: None
        }
    );
    assert_eq!(ids(&set), (1..=20).collect::<Vec<i64>>());
}

#[test]
fn test_reserve_moves_ahead_of_weaker_champion() {
    let mut set: RankingSet = create_set_with_weak_champion();

    set.withdraw(3).unwrap();

    let expected: Vec<i64> = (1..=16).chain([20]).chain(17..=19).collect();
    assert_eq!(ids(&set), expected);
    assert_eq!(set.get(16).unwrap().rank, 15);
    assert_eq!(set.get(20).unwrap().rank, 16);
}

#[test]
fn test_withdraw_unknown_entry() {
    let mut set: RankingSet = create_ranking_set(3, 24);
    assert_eq!(
        set.withdraw(99),
        Err(DomainError::EntryNotFound { entry_id: 99 })
    );
}

// ============================================================================
// Reregister
// ============================================================================

#[test]
fn test_champion_reregisters_on_reserve_list() {
    // a protected champion at volgorde 14 with the lowest gemiddelde
    let entries: Vec<Entry> = (1..=17)
        .map(|id| {
            if id == 14 {
                entry(id, 5_000).with_kampioen_label("Kampioen regio 102")
            } else {
                entry(id, 9_800 - u32::try_from(id).unwrap() * 100)
            }
        })
        .collect();
    let mut set: RankingSet = RankingSet::new(16, entries).unwrap();
    assert_eq!(set.get(14).unwrap().rank, 14);

    set.withdraw(14).unwrap();
    let outcome: ReregisterOutcome = set.reregister(14).unwrap();

    assert_eq!(outcome, ReregisterOutcome::ToReserveList);
    let champion: &Entry = set.get(14).unwrap();
    assert_eq!(champion.deelname, Deelname::Ja);
    assert_eq!(champion.rank, 17);
    assert_eq!(champion.volgorde, 17);
    assert!(set.is_reserve(champion));
    set.check_invariants().unwrap();
}

#[test]
fn test_withdraw_then_reregister_lands_at_tail_of_actives() {
    let mut set: RankingSet = create_ranking_set(20, 16);

    set.withdraw(5).unwrap();
    set.reregister(5).unwrap();

    // the promoted reserve keeps the slot; the entry is first reserve now
    let entry: &Entry = set.get(5).unwrap();
    assert_ne!(entry.rank, 5);
    assert_eq!(entry.rank, 17);
    assert!(set.is_reserve(entry));
}

#[test]
fn test_reregister_with_room_goes_to_deelnemers() {
    let mut set: RankingSet = create_ranking_set(10, 16);

    set.withdraw(3).unwrap();
    let outcome: ReregisterOutcome = set.reregister(3).unwrap();

    assert_eq!(outcome, ReregisterOutcome::ToDeelnemersList);
    assert_eq!(
        outcome.logboek_tekst(),
        Some("Direct naar de deelnemerslijst")
    );
    assert_eq!(set.get(3).unwrap().rank, 3);
    assert_eq!(ids(&set), (1..=10).collect::<Vec<i64>>());
}

#[test]
fn test_reregister_confirms_unknown_in_place() {
    let mut set: RankingSet = create_ranking_set(10, 16);
    let before: Vec<i64> = ids(&set);

    assert_eq!(set.reregister(4).unwrap(), ReregisterOutcome::Confirmed);
    assert_eq!(set.get(4).unwrap().deelname, Deelname::Ja);
    assert_eq!(ids(&set), before);

    assert_eq!(
        set.reregister(4).unwrap(),
        ReregisterOutcome::AlreadyRegistered
    );
}

#[test]
fn test_add_extra_goes_after_equal_gemiddelde() {
    let mut set: RankingSet = create_ranking_set(10, 16);

    let extra: Entry = Entry::new(11, Gemiddelde::from_milli(9_500), String::new());
    let outcome: ReregisterOutcome = set.add_extra(extra).unwrap();

    assert_eq!(outcome, ReregisterOutcome::ToDeelnemersList);
    assert_eq!(set.get(11).unwrap().volgorde, 4);
    assert_eq!(set.get(11).unwrap().deelname, Deelname::Ja);

    let duplicate: Entry = Entry::new(11, Gemiddelde::from_milli(9_500), String::new());
    assert_eq!(
        set.add_extra(duplicate),
        Err(DomainError::DuplicateEntry { entry_id: 11 })
    );
}

#[test]
fn test_add_extra_reserve_goes_after_all_equal_reserves() {
    let entries: Vec<Entry> = vec![
        entry(1, 9_000),
        entry(2, 8_900),
        entry(3, 8_800),
        entry(4, 8_000),
        entry(5, 8_000),
        entry(6, 8_000),
        entry(7, 7_000),
    ];
    let mut set: RankingSet = RankingSet::new(3, entries).unwrap();

    let extra: Entry = Entry::new(8, Gemiddelde::from_milli(8_000), String::new());
    let outcome: ReregisterOutcome = set.add_extra(extra).unwrap();

    assert_eq!(outcome, ReregisterOutcome::ToReserveList);
    assert_eq!(ids(&set), vec![1, 2, 3, 4, 5, 6, 8, 7]);
    assert_eq!(set.get(8).unwrap().rank, 7);
    set.check_invariants().unwrap();
}

// ============================================================================
// Membership
// ============================================================================

#[test]
fn test_move_entry_between_classes() {
    let mut klein: RankingSet = create_ranking_set(3, 24);
    let mut groot: RankingSet = create_ranking_set(5, 24);

    let mut moved: Entry = klein.remove(2).unwrap();
    moved.id = 102;
    groot.insert_unranked(moved).unwrap();
    groot.initial_allocation(false);

    assert_eq!(ids(&klein), vec![1, 3]);
    assert_eq!(ids(&groot), vec![1, 102, 2, 3, 4, 5]);
    groot.check_invariants().unwrap();
}

#[test]
fn test_truncate_keeps_first_entries() {
    let mut set: RankingSet = create_ranking_set(50, 24);

    let dropped: Vec<i64> = set.truncate(48);
    assert_eq!(dropped, vec![49, 50]);
    assert_eq!(set.len(), 48);
    assert!(set.truncate(48).is_empty());
}

// ============================================================================
// Random sequences
// ============================================================================

#[derive(Debug, Clone)]
enum Step {
    Withdraw(i64),
    Reregister(i64),
    Cut(u16),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (1..=20_i64).prop_map(Step::Withdraw),
        (1..=20_i64).prop_map(Step::Reregister),
        (1..=20_u16).prop_map(Step::Cut),
    ]
}

proptest! {
    #[test]
    fn test_raising_cut_never_pushes_a_ranked_entry_down(
        steps in prop::collection::vec(step(), 1..40),
        champion in 1..=20_i64,
    ) {
        let entries: Vec<Entry> = (1..=20)
            .map(|id| {
                let e: Entry = entry(id, 9_800 - u32::try_from(id).unwrap() * 100);
                if id == champion {
                    e.with_kampioen_label("Kampioen regio 101")
                } else {
                    e
                }
            })
            .collect();
        let mut set: RankingSet = RankingSet::new(16, entries).unwrap();
        set.initial_allocation(false);

        for step in steps {
            let before: RankingSet = set.clone();
            match step {
                Step::Withdraw(id) => {
                    set.withdraw(id).unwrap();
                }
                Step::Reregister(id) => {
                    set.reregister(id).unwrap();
                }
                Step::Cut(limiet) => {
                    let change: CutChange = set.apply_cut_change(limiet).unwrap();
                    if change == CutChange::Raised {
                        for oud in before.entries().iter().filter(|e| e.rank > 0) {
                            let nu: u16 = set.get(oud.id).unwrap().rank;
                            prop_assert!(
                                nu <= oud.rank,
                                "entry {} went from rank {} to {nu}", oud.id, oud.rank
                            );
                        }
                    }
                }
            }
            prop_assert!(set.check_invariants().is_ok());
        }
    }
}
