use anyhow::{ensure, Context, Result};
use log::{debug, trace};
use std::{collections::BTreeMap, path::Path};
use unicode_normalization::UnicodeNormalization;

use crate::{
    card::{CardNumber, CardRecord, SetCode, Status, Variant},
    diagnostics::{Diagnostic, Diagnostics},
    page::{RawSighting, SourceKind},
};

fn normalize_ascii(s: &str) -> String {
    // NFKC folds full-width digits and letters to ASCII
    s.nfkc().collect::<String>()
}

/// Turns one raw sighting into a typed record.
///
/// Text reaching this point has already been entity-decoded by the document
/// tree, so it is never unescaped again here.
pub fn normalize(sighting: &RawSighting, kind: SourceKind) -> Result<CardRecord> {
    let name = sighting.name_text.trim().to_string();
    ensure!(!name.is_empty(), "card has no name");

    let raw_number = sighting
        .number_text
        .as_deref()
        .with_context(|| format!("no card number for `{}`", name))?;
    let number = CardNumber::parse(&normalize_ascii(raw_number))
        .with_context(|| format!("bad card number for `{}`", name))?;

    let raw_set = sighting
        .set_hint
        .as_deref()
        .with_context(|| format!("no set code on page for `{}`", name))?;
    let set_code = SetCode::parse(&normalize_ascii(raw_set))
        .with_context(|| format!("bad set code for `{}`", name))?;

    let variant = match sighting.variant_hint.as_deref() {
        Some(label) => Variant::parse(label)?,
        None => Variant::normal(),
    };

    let total_count = sighting.total_hint.as_deref().and_then(|raw| {
        let parsed = normalize_ascii(raw).trim().parse::<u32>().ok();
        if parsed.is_none() {
            trace!("ignoring non-numeric total `{}`", raw);
        }
        parsed
    });

    let status = match kind {
        SourceKind::Catalogue if sighting.owned_hint => Status::Owned,
        SourceKind::Catalogue => Status::Needed,
        SourceKind::Purchase => Status::PendingDelivery,
    };

    Ok(CardRecord {
        set_code,
        set_name: sighting.set_name_hint.clone(),
        number,
        name,
        variant,
        total_count,
        status,
        card_id: sighting.card_id.clone(),
        purchase_count: 0,
    })
}

/// Normalizes every sighting of one page, dropping the malformed ones.
pub fn normalize_page(
    file: &Path,
    kind: SourceKind,
    sightings: impl Iterator<Item = RawSighting>,
    diagnostics: &mut Diagnostics,
) -> Vec<CardRecord> {
    let mut records = Vec::new();

    for sighting in sightings {
        match normalize(&sighting, kind) {
            Ok(record) => {
                trace!("normalized: {}", record);
                records.push(record);
            }
            Err(e) => diagnostics.report(Diagnostic::MalformedIdentity {
                file: file.to_path_buf(),
                detail: format!("{:#}", e),
            }),
        }
    }

    if kind == SourceKind::Catalogue {
        apply_page_total(&mut records);
    }

    records
}

/// Gives every card of a catalogue page the set ceiling printed on that page.
///
/// The ceiling is the most common `/NNN` suffix; ties go to the larger value.
pub fn apply_page_total(records: &mut [CardRecord]) {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for total in records.iter().filter_map(|r| r.total_count) {
        *counts.entry(total).or_default() += 1;
    }

    let page_total = counts
        .into_iter()
        .fold(None, |best: Option<(u32, usize)>, (total, count)| match best {
            Some((_, best_count)) if best_count > count => best,
            _ => Some((total, count)),
        })
        .map(|(total, _)| total);

    debug!("page total count: {:?}", page_total);
    for record in records.iter_mut() {
        record.total_count = page_total;
    }
}
