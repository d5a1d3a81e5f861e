use log::{debug, info, trace};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::{
    card::{CardRecord, IdentityKey, SetCode, Status},
    diagnostics::{Diagnostic, Diagnostics},
};

/// Reconciled collection: every catalogue card with its final status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Collection {
    #[serde(serialize_with = "records_as_list")]
    records: BTreeMap<IdentityKey, CardRecord>,
    unmatched: Vec<CardRecord>,
    pending_purchases: usize,
}

fn records_as_list<S: serde::Serializer>(
    records: &BTreeMap<IdentityKey, CardRecord>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(records.values())
}

impl Collection {
    pub fn records(&self) -> impl Iterator<Item = &CardRecord> {
        self.records.values()
    }

    pub fn get(&self, key: &IdentityKey) -> Option<&CardRecord> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Purchases whose identity matched no catalogue card.
    pub fn unmatched(&self) -> &[CardRecord] {
        &self.unmatched
    }

    /// Every purchase sighting seen, matched or not.
    pub fn pending_purchases(&self) -> usize {
        self.pending_purchases
    }

    pub fn by_set(&self) -> BTreeMap<&SetCode, Vec<&CardRecord>> {
        let mut sets: BTreeMap<&SetCode, Vec<&CardRecord>> = BTreeMap::new();
        for record in self.records.values() {
            sets.entry(&record.set_code).or_default().push(record);
        }
        sets
    }
}

/// Builds the set universes from catalogue records, then applies purchases.
///
/// Purchases only ever match on the exact `(set, number, variant)` key and
/// never create cards the catalogue does not list.
pub fn reconcile(
    catalogue: &[CardRecord],
    purchases: &[CardRecord],
    diagnostics: &mut Diagnostics,
) -> Collection {
    let mut records: BTreeMap<IdentityKey, CardRecord> = BTreeMap::new();

    for record in catalogue {
        let key = record.key();
        match records.get_mut(&key) {
            Some(existing) => merge_catalogue(existing, record),
            None => {
                let mut fresh = record.clone();
                fresh.purchase_count = 0;
                if fresh.status != Status::Owned {
                    fresh.status = Status::Needed;
                }
                records.insert(key, fresh);
            }
        }
    }
    info!("catalogue universe: {} cards", records.len());

    let mut unmatched: BTreeMap<IdentityKey, CardRecord> = BTreeMap::new();
    for purchase in purchases {
        let key = purchase.key();
        match records.get_mut(&key) {
            Some(existing) => {
                existing.purchase_count += 1;
                if existing.status != Status::Owned {
                    existing.status = Status::PendingDelivery;
                }
                trace!("purchase matched: {}", existing);
            }
            None => match unmatched.get_mut(&key) {
                Some(seen) => seen.purchase_count += 1,
                None => {
                    diagnostics.report(Diagnostic::UnmatchedPurchase { key: key.clone() });
                    let mut orphan = purchase.clone();
                    orphan.purchase_count = 1;
                    unmatched.insert(key, orphan);
                }
            },
        }
    }
    debug!(
        "{} purchases, {} unmatched identities",
        purchases.len(),
        unmatched.len()
    );

    Collection {
        records,
        unmatched: unmatched.into_values().collect(),
        pending_purchases: purchases.len(),
    }
}

/// Same card listed by two catalogue pages: keep what either page knows.
fn merge_catalogue(existing: &mut CardRecord, other: &CardRecord) {
    if other.status == Status::Owned {
        existing.status = Status::Owned;
    }
    if existing.set_name.is_none() {
        existing.set_name = other.set_name.clone();
    }
    if existing.card_id.is_none() {
        existing.card_id = other.card_id.clone();
    }
    existing.total_count = match (existing.total_count, other.total_count) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{tests::record, Variant};

    fn twm_133_pair() -> Vec<CardRecord> {
        vec![
            record("TWM", "133", Variant::normal(), Status::Needed),
            record("TWM", "133", Variant::reverse_holo(), Status::Needed),
        ]
    }

    fn status_of(collection: &Collection, variant: Variant) -> Status {
        collection
            .records()
            .find(|r| r.number.raw() == "133" && r.variant == variant)
            .map(|r| r.status)
            .unwrap()
    }

    #[test]
    fn purchase_only_touches_its_own_variant() {
        let purchases = vec![record("TWM", "133", Variant::normal(), Status::PendingDelivery)];
        let mut diagnostics = Diagnostics::new();

        let collection = reconcile(&twm_133_pair(), &purchases, &mut diagnostics);

        assert_eq!(
            status_of(&collection, Variant::normal()),
            Status::PendingDelivery
        );
        assert_eq!(
            status_of(&collection, Variant::reverse_holo()),
            Status::Needed
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn reverse_holo_purchase_is_not_lost_to_normal() {
        let purchases = vec![record(
            "TWM",
            "133",
            Variant::reverse_holo(),
            Status::PendingDelivery,
        )];
        let mut diagnostics = Diagnostics::new();

        let collection = reconcile(&twm_133_pair(), &purchases, &mut diagnostics);

        assert_eq!(status_of(&collection, Variant::normal()), Status::Needed);
        assert_eq!(
            status_of(&collection, Variant::reverse_holo()),
            Status::PendingDelivery
        );
    }

    #[test]
    fn owned_is_never_downgraded() {
        let catalogue = vec![record("TWM", "133", Variant::normal(), Status::Owned)];
        let purchases = vec![
            record("TWM", "133", Variant::normal(), Status::PendingDelivery),
            record("TWM", "133", Variant::normal(), Status::PendingDelivery),
        ];
        let mut diagnostics = Diagnostics::new();

        let collection = reconcile(&catalogue, &purchases, &mut diagnostics);
        let card = collection.records().next().unwrap();

        assert_eq!(card.status, Status::Owned);
        assert_eq!(card.purchase_count, 2);
        assert!(card.is_duplicate_purchase());
    }

    #[test]
    fn zero_padding_does_not_block_a_match() {
        let catalogue = vec![record("SVI", "060", Variant::normal(), Status::Needed)];
        let purchases = vec![record("SVI", "60", Variant::normal(), Status::PendingDelivery)];
        let mut diagnostics = Diagnostics::new();

        let collection = reconcile(&catalogue, &purchases, &mut diagnostics);

        let card = collection.records().next().unwrap();
        assert_eq!(card.status, Status::PendingDelivery);
        assert_eq!(card.number.raw(), "060");
    }

    #[test]
    fn unmatched_purchase_is_reported_not_added() {
        let purchases = vec![
            record("PAL", "12", Variant::normal(), Status::PendingDelivery),
            record("PAL", "12", Variant::normal(), Status::PendingDelivery),
        ];
        let mut diagnostics = Diagnostics::new();

        let collection = reconcile(&twm_133_pair(), &purchases, &mut diagnostics);

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.unmatched().len(), 1);
        assert_eq!(collection.unmatched()[0].purchase_count, 2);
        assert_eq!(collection.pending_purchases(), 2);
        assert_eq!(diagnostics.unmatched_purchases(), 1);
    }

    #[test]
    fn duplicate_catalogue_sightings_merge_ownership() {
        let catalogue = vec![
            record("TWM", "133", Variant::normal(), Status::Needed),
            record("TWM", "133", Variant::normal(), Status::Owned),
        ];
        let mut diagnostics = Diagnostics::new();

        let collection = reconcile(&catalogue, &[], &mut diagnostics);

        assert_eq!(collection.len(), 1);
        assert_eq!(collection.records().next().unwrap().status, Status::Owned);
    }

    #[test]
    fn reconciling_twice_is_identical() {
        let purchases = vec![record("TWM", "133", Variant::normal(), Status::PendingDelivery)];

        let first = reconcile(&twm_133_pair(), &purchases, &mut Diagnostics::new());
        let second = reconcile(&twm_133_pair(), &purchases, &mut Diagnostics::new());

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
