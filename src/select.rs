use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::{
    card::{CardNumber, CardRecord, KnownVariant, SetCode, Status},
    reconcile::Collection,
};

/// Same card, any variant.
pub type CardGroupKey = (SetCode, String);

fn priority(record: &CardRecord) -> Option<u8> {
    match (record.variant.known(), record.is_owned()) {
        (Some(KnownVariant::ReverseHolo), true) => Some(0),
        (Some(KnownVariant::Normal), true) => Some(1),
        (Some(KnownVariant::Normal), false) => Some(2),
        (Some(KnownVariant::ReverseHolo), false) => Some(3),
        _ => None,
    }
}

/// Picks the representative of a group of variants of one card.
///
/// Owned Reverse Holo, then owned Normal, then any Normal, then any Reverse
/// Holo. Groups with none of those (a Holo-only card) fall back to the first
/// record given. Only an empty group returns `None`.
pub fn select_best<'a>(group: &[&'a CardRecord]) -> Option<&'a CardRecord> {
    group
        .iter()
        .filter_map(|record| priority(record).map(|p| (p, *record)))
        .min_by_key(|(p, _)| *p)
        .map(|(_, record)| record)
        .or_else(|| group.first().copied())
}

/// Groups records by `(set, number)` keeping the order they were given in.
pub fn group_by_card<'a>(
    records: impl Iterator<Item = &'a CardRecord>,
) -> BTreeMap<CardGroupKey, Vec<&'a CardRecord>> {
    let mut groups: BTreeMap<CardGroupKey, Vec<&CardRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry((record.set_code.clone(), record.number.export_form()))
            .or_default()
            .push(record);
    }
    groups
}

/// Strongest status over every variant of a card.
pub fn card_status(group: &[&CardRecord]) -> Status {
    group
        .iter()
        .fold(Status::Needed, |status, record| status.strongest(record.status))
}

/// One representative per card, in listing order.
pub fn best_view(collection: &Collection) -> Vec<&CardRecord> {
    let mut best: Vec<&CardRecord> = group_by_card(collection.records())
        .values()
        .filter_map(|group| select_best(group))
        .collect();
    best.sort_by(|a, b| {
        (&a.set_code, a.listing_order()).cmp(&(&b.set_code, b.listing_order()))
    });
    best
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WantEntry {
    pub name: String,
    pub set_code: SetCode,
    pub set_name: Option<String>,
    pub number: CardNumber,
}

/// Cards with no variant owned or on the way, one line per `(name, set)`.
///
/// The marketplace does not tell variants apart, so the representative's
/// variant is dropped.
pub fn want_entries(collection: &Collection) -> Vec<WantEntry> {
    let mut wanted: Vec<&CardRecord> = group_by_card(collection.records())
        .values()
        .filter(|group| card_status(group) == Status::Needed)
        .filter_map(|group| select_best(group))
        .collect();

    wanted.sort_by(|a, b| {
        (
            &a.set_code,
            a.number.value().unwrap_or(u32::MAX),
            a.number.raw(),
            &a.name,
        )
            .cmp(&(
                &b.set_code,
                b.number.value().unwrap_or(u32::MAX),
                b.number.raw(),
                &b.name,
            ))
    });

    let mut seen: HashSet<(String, SetCode)> = HashSet::new();
    wanted
        .into_iter()
        .filter(|record| seen.insert((record.name.clone(), record.set_code.clone())))
        .map(|record| WantEntry {
            name: record.name.clone(),
            set_code: record.set_code.clone(),
            set_name: record.set_name.clone(),
            number: record.number.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{tests::record, Variant};
    use crate::diagnostics::Diagnostics;
    use crate::reconcile::reconcile;

    #[test]
    fn owned_normal_beats_unowned_reverse_holo() {
        let normal = record("TWM", "133", Variant::normal(), Status::Owned);
        let reverse = record("TWM", "133", Variant::reverse_holo(), Status::Needed);

        let best = select_best(&[&reverse, &normal]).unwrap();
        assert_eq!(best.variant, Variant::normal());
    }

    #[test]
    fn owned_reverse_holo_beats_owned_normal() {
        let normal = record("TWM", "133", Variant::normal(), Status::Owned);
        let reverse = record("TWM", "133", Variant::reverse_holo(), Status::Owned);

        let best = select_best(&[&normal, &reverse]).unwrap();
        assert_eq!(best.variant, Variant::reverse_holo());
    }

    #[test]
    fn unowned_normal_beats_unowned_reverse_holo() {
        let normal = record("TWM", "133", Variant::normal(), Status::Needed);
        let reverse = record("TWM", "133", Variant::reverse_holo(), Status::PendingDelivery);

        let best = select_best(&[&reverse, &normal]).unwrap();
        assert_eq!(best.variant, Variant::normal());
    }

    #[test]
    fn holo_only_group_falls_back_to_first() {
        let holo = record("TWM", "214", Variant::holo(), Status::Needed);
        let other = record("TWM", "214", Variant::parse("Cosmos Holo").unwrap(), Status::Owned);

        assert_eq!(select_best(&[&holo, &other]).unwrap().variant, Variant::holo());
        assert_eq!(
            select_best(&[&other, &holo]).unwrap().variant.as_str(),
            "Cosmos Holo"
        );
    }

    #[test]
    fn empty_group_selects_nothing() {
        assert!(select_best(&[]).is_none());
    }

    #[test]
    fn card_status_takes_strongest_variant() {
        let normal = record("TWM", "133", Variant::normal(), Status::Needed);
        let reverse = record("TWM", "133", Variant::reverse_holo(), Status::PendingDelivery);
        assert_eq!(card_status(&[&normal, &reverse]), Status::PendingDelivery);
    }

    #[test]
    fn best_view_has_one_record_per_card() {
        let catalogue = vec![
            record("TWM", "133", Variant::normal(), Status::Owned),
            record("TWM", "133", Variant::reverse_holo(), Status::Needed),
            record("TWM", "7", Variant::normal(), Status::Needed),
        ];
        let collection = reconcile(&catalogue, &[], &mut Diagnostics::new());

        let best = best_view(&collection);
        let numbers: Vec<_> = best.iter().map(|r| r.number.raw()).collect();
        assert_eq!(numbers, vec!["7", "133"]);
    }

    #[test]
    fn collection_fallback_is_first_by_variant_label() {
        let catalogue = vec![
            record("TWM", "214", Variant::holo(), Status::Needed),
            record("TWM", "214", Variant::parse("Cosmos Holo").unwrap(), Status::Needed),
        ];
        let collection = reconcile(&catalogue, &[], &mut Diagnostics::new());

        let best = best_view(&collection);
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].variant.as_str(), "Cosmos Holo");
    }

    #[test]
    fn want_list_skips_cards_already_collected() {
        let catalogue = vec![
            record("TWM", "133", Variant::normal(), Status::Needed),
            record("TWM", "133", Variant::reverse_holo(), Status::Owned),
            record("TWM", "049", Variant::normal(), Status::Needed),
            record("TWM", "049", Variant::reverse_holo(), Status::Needed),
            record("TWM", "7", Variant::normal(), Status::Needed),
        ];
        let purchases = vec![record("TWM", "7", Variant::normal(), Status::PendingDelivery)];
        let collection = reconcile(&catalogue, &purchases, &mut Diagnostics::new());

        let wanted = want_entries(&collection);
        assert_eq!(wanted.len(), 1);
        assert_eq!(wanted[0].number.raw(), "049");
    }

    #[test]
    fn want_list_dedups_by_name_and_set() {
        let mut first = record("TWM", "10", Variant::normal(), Status::Needed);
        first.name = String::from("Basic Grass Energy");
        let mut second = record("TWM", "11", Variant::normal(), Status::Needed);
        second.name = String::from("Basic Grass Energy");
        let collection = reconcile(&[first, second], &[], &mut Diagnostics::new());

        let wanted = want_entries(&collection);
        assert_eq!(wanted.len(), 1);
        assert_eq!(wanted[0].number.raw(), "10");
    }
}
