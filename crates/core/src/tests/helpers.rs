// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{KlasseState, MutationContext};
use kampcomp_audit::Actor;
use kampcomp_domain::{
    Afstand, Club, Competitie, Deel, Deelname, Entry, Gemiddelde, IndivKlasse, Kampioenschap,
    NieuweDeelnemer, RankingSet, Tijdlijn,
};
use time::macros::datetime;

pub const KAMPIOENSCHAP_ID: i64 = 11;
pub const KLASSE_ID: i64 = 100;

pub fn create_ctx() -> MutationContext {
    MutationContext::new(
        Some(7),
        Some(1),
        Actor::new(String::from("RKO Rayon 1")),
        datetime!(2026-02-14 09:30),
    )
}

/// Entry `id` with gemiddelde `milli` thousandths, placed at volgorde `id`.
pub fn entry(id: i64, milli: u32) -> Entry {
    Entry::new(id, Gemiddelde::from_milli(milli), String::new())
        .with_volgorde(u16::try_from(id).unwrap())
}

/// A class of `count` entries with strictly falling gemiddelde.
pub fn create_klasse(count: i64, limiet: u16) -> KlasseState {
    let entries: Vec<Entry> = (1..=count)
        .map(|id| entry(id, 9_800 - u32::try_from(id).unwrap() * 100))
        .collect();
    KlasseState::new(
        KAMPIOENSCHAP_ID,
        KLASSE_ID,
        RankingSet::new(limiet, entries).unwrap(),
    )
}

/// Ids in volgorde order.
pub fn ids(klasse: &KlasseState) -> Vec<i64> {
    klasse.set.entries().iter().map(|e| e.id).collect()
}

pub fn create_nieuwe_deelnemer(sporterboog_id: i64, milli: u32) -> NieuweDeelnemer {
    NieuweDeelnemer {
        sporterboog_id,
        lid_nr: 100_000 + sporterboog_id,
        indiv_klasse_id: KLASSE_ID,
        indiv_klasse_volgende_ronde_id: KLASSE_ID,
        bij_ver_nr: 1001,
        kampioen_label: String::new(),
        deelname: Deelname::Onbekend,
        gemiddelde: Gemiddelde::from_milli(milli),
        gemiddelde_scores: String::new(),
        logboek: vec![String::from("Toegevoegd aan de RK indiv deelnemerslijst")],
    }
}

pub fn create_club(ver_nr: i64, regio_nr: u16, rayon_nr: u8) -> Club {
    Club::new(ver_nr, format!("Club {ver_nr}"), regio_nr, rayon_nr)
}

pub fn create_competitie() -> Competitie {
    Competitie {
        id: 1,
        begin_jaar: 2025,
        afstand: Afstand::Achttien,
        beschrijving: String::from("Indoorcompetitie 2025/2026"),
        aantal_scores_voor_rk_deelname: 6,
        tijdlijn: Tijdlijn::default(),
    }
}

pub fn create_kampioenschap(id: i64, rayon_nr: Option<u8>) -> Kampioenschap {
    Kampioenschap {
        id,
        competitie_id: 1,
        deel: if rayon_nr.is_some() { Deel::Rk } else { Deel::Bk },
        rayon_nr,
        rayon_naam: rayon_nr.map_or_else(|| String::from("Bond"), |nr| format!("Rayon {nr}")),
        heeft_deelnemerslijst: false,
        is_afgesloten: false,
    }
}

pub fn create_indiv_klasse(id: i64, volgorde: u16) -> IndivKlasse {
    IndivKlasse {
        id,
        volgorde,
        beschrijving: format!("Klasse {id}"),
        is_ook_voor_rk_bk: true,
    }
}
