// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Club, Entry, Gemiddelde, RankingSet};

/// Entry `id` with gemiddelde `milli` thousandths, placed at volgorde `id`.
pub fn entry(id: i64, milli: u32) -> Entry {
    Entry::new(id, Gemiddelde::from_milli(milli), String::new())
        .with_volgorde(u16::try_from(id).unwrap())
}

/// A class of `count` entries with strictly falling gemiddelde, in volgorde order.
pub fn create_ranking_set(count: i64, limiet: u16) -> RankingSet {
    let entries: Vec<Entry> = (1..=count)
        .map(|id| entry(id, 9_800 - u32::try_from(id).unwrap() * 100))
        .collect();
    RankingSet::new(limiet, entries).unwrap()
}

/// Ids in volgorde order.
pub fn ids(set: &RankingSet) -> Vec<i64> {
    set.entries().iter().map(|e| e.id).collect()
}

pub fn create_club(ver_nr: i64, regio_nr: u16, rayon_nr: u8) -> Club {
    Club::new(ver_nr, format!("Club {ver_nr}"), regio_nr, rayon_nr)
}
