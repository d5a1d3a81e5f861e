use log::debug;
use serde::Serialize;
use std::{collections::BTreeSet, ops::AddAssign};

use crate::{
    card::{CardNumber, CardRecord, SetCode, Status},
    reconcile::Collection,
    select::{card_status, group_by_card},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub owned: u32,
    pub pending: u32,
    pub needed: u32,
}

impl StatusCounts {
    pub fn add(&mut self, status: Status) {
        match status {
            Status::Owned => self.owned += 1,
            Status::PendingDelivery => self.pending += 1,
            Status::Needed => self.needed += 1,
        }
    }

    pub fn collected(&self) -> u32 {
        self.owned + self.pending
    }

    pub fn total(&self) -> u32 {
        self.owned + self.pending + self.needed
    }
}

impl AddAssign for StatusCounts {
    fn add_assign(&mut self, other: Self) {
        self.owned += other.owned;
        self.pending += other.pending;
        self.needed += other.needed;
    }
}

fn ratio(collected: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    f64::from(collected) / f64::from(total)
}

/// Percentage for display, one decimal place.
pub fn format_percent(ratio: f64) -> String {
    format!("{:.1}", ratio * 100.0)
}

/// Statistics of one set, computed against that set's own ceiling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetSummary {
    pub set_code: SetCode,
    pub set_name: Option<String>,
    /// Highest regular card number; anything above it is a secret card.
    pub total_count: u32,
    /// Every variant record.
    pub records: StatusCounts,
    /// Regular cards, one per number, at the strongest status of their variants.
    pub cards: StatusCounts,
    /// Secret cards, counted the same way.
    pub secret: StatusCounts,
}

impl SetSummary {
    pub fn compute(set_code: &SetCode, records: &[&CardRecord]) -> SetSummary {
        let set_name = records.iter().find_map(|r| r.set_name.clone());

        let total_count = match records.iter().filter_map(|r| r.total_count).max() {
            Some(total) => total,
            None => {
                let distinct: BTreeSet<String> =
                    records.iter().map(|r| r.number.export_form()).collect();
                debug!(
                    "no ceiling printed for {}, using {} distinct numbers",
                    set_code,
                    distinct.len()
                );
                u32::try_from(distinct.len()).unwrap_or(u32::MAX)
            }
        };

        let mut summary = SetSummary {
            set_code: set_code.clone(),
            set_name,
            total_count,
            records: StatusCounts::default(),
            cards: StatusCounts::default(),
            secret: StatusCounts::default(),
        };

        for record in records {
            summary.records.add(record.status);
        }

        for group in group_by_card(records.iter().copied()).values() {
            let status = card_status(group);
            match group.first() {
                Some(first) if summary.is_secret(&first.number) => summary.secret.add(status),
                Some(_) => summary.cards.add(status),
                None => {}
            }
        }

        summary
    }

    pub fn is_secret(&self, number: &CardNumber) -> bool {
        number.value().is_some_and(|n| n > self.total_count)
    }

    /// `(owned + pending) / total_count` over regular cards, unrounded.
    pub fn completion_ratio(&self) -> f64 {
        ratio(self.cards.collected(), self.total_count)
    }

    pub fn owned_ratio(&self) -> f64 {
        ratio(self.cards.owned, self.total_count)
    }

    pub fn pending_ratio(&self) -> f64 {
        ratio(self.cards.pending, self.total_count)
    }

    pub fn display_name(&self) -> &str {
        self.set_name.as_deref().unwrap_or(self.set_code.as_str())
    }
}

/// Sum of every set summary.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct OverallSummary {
    pub sets: usize,
    pub total_count: u32,
    pub records: StatusCounts,
    pub cards: StatusCounts,
    pub secret: StatusCounts,
}

impl OverallSummary {
    pub fn from_sets(sets: &[SetSummary]) -> OverallSummary {
        let mut overall = OverallSummary {
            sets: sets.len(),
            ..OverallSummary::default()
        };
        for set in sets {
            overall.total_count += set.total_count;
            overall.records += set.records;
            overall.cards += set.cards;
            overall.secret += set.secret;
        }
        overall
    }

    pub fn completion_ratio(&self) -> f64 {
        ratio(self.cards.collected(), self.total_count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub sets: Vec<SetSummary>,
    pub overall: OverallSummary,
}

impl Metrics {
    pub fn compute(collection: &Collection) -> Metrics {
        let sets: Vec<SetSummary> = collection
            .by_set()
            .into_iter()
            .map(|(set_code, records)| SetSummary::compute(set_code, &records))
            .collect();
        let overall = OverallSummary::from_sets(&sets);

        Metrics { sets, overall }
    }

    /// Most complete first; ties keep set code order.
    pub fn by_completion(&self) -> Vec<&SetSummary> {
        let mut sorted: Vec<&SetSummary> = self.sets.iter().collect();
        sorted.sort_by(|a, b| {
            b.completion_ratio()
                .total_cmp(&a.completion_ratio())
                .then_with(|| a.set_code.cmp(&b.set_code))
        });
        sorted
    }
}
