use regex::{Captures, Regex};
use std::{collections::HashMap, sync::LazyLock};

use crate::{
    card::{CardRecord, Status},
    metrics::{format_percent, Metrics, SetSummary},
    select::{group_by_card, select_best},
    storage::set_page_filename,
};

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");
const SET_TEMPLATE: &str = include_str!("../../templates/set_page.html");
const CARD_PAGE_URL: &str = "https://www.tcgcollector.com/cards";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Z_]+)\}\}").expect("valid regex"));

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Substitutes every `{{KEY}}` in one pass, so values are never rescanned.
/// Unknown keys are left as they are.
fn fill(template: &str, values: &HashMap<&str, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

pub fn status_text(record: &CardRecord) -> &'static str {
    match record.status {
        Status::Owned if record.is_duplicate_purchase() => "Have + Pending Purchase (Duplicate!)",
        Status::Owned => "Have",
        Status::PendingDelivery => "Pending Purchase",
        Status::Needed => "Need",
    }
}

fn row_class(status: Status) -> &'static str {
    match status {
        Status::Owned => "has-card",
        Status::PendingDelivery => "pending",
        Status::Needed => "missing-card",
    }
}

fn card_row(summary: &SetSummary, record: &CardRecord) -> String {
    let mut class = row_class(record.status).to_string();
    if summary.is_secret(&record.number) {
        class.push_str(" secret");
    }

    let preview = match &record.card_id {
        Some(id) => {
            let id = escape(id);
            format!(
                r#"<a class="preview" href="{CARD_PAGE_URL}/{id}" data-card-id="{id}" target="_blank" rel="noopener">&#x1F4F7;</a>"#
            )
        }
        None => String::new(),
    };
    let total = record
        .total_count
        .map(|t| t.to_string())
        .unwrap_or_default();

    format!(
        r#"
            <tr class="{}"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
        class,
        preview,
        escape(record.number.raw()),
        total,
        escape(&record.name),
        escape(record.variant.as_str()),
        if record.is_owned() { "&#x2713;" } else { "&#x2717;" },
        status_text(record)
    )
}

fn set_card(summary: &SetSummary) -> String {
    let mut stats = format!(
        "<strong>{}</strong> of <strong>{}</strong> cards owned (<strong>{}%</strong> complete)",
        summary.cards.owned,
        summary.total_count,
        format_percent(summary.completion_ratio())
    );
    if summary.cards.pending > 0 {
        stats.push_str(&format!(
            "<br><strong>{}</strong> cards pending purchase ({}%)",
            summary.cards.pending,
            format_percent(summary.pending_ratio())
        ));
    }
    if summary.secret.collected() > 0 {
        stats.push_str(&format!(
            "<br><strong>{}</strong> secret cards collected",
            summary.secret.collected()
        ));
    }

    format!(
        r#"
        <div class="set-card">
            <div class="set-title">{}</div>
            <div class="set-code">Set Code: {}</div>
            <div class="progress-bar">
                <div class="progress-owned" style="width: {}%"></div>
                <div class="progress-pending" style="width: {}%"></div>
            </div>
            <div class="set-stats">{}</div>
            <a href="{}" class="set-link">View Set Details &rarr;</a>
        </div>"#,
        escape(summary.display_name()),
        escape(summary.set_code.as_str()),
        format_percent(summary.owned_ratio().min(1.0)),
        format_percent(summary.pending_ratio().min(1.0)),
        stats,
        escape(&set_page_filename(&summary.set_code))
    )
}

/// Overview of every set, most complete first.
pub fn render_index(metrics: &Metrics) -> String {
    let overall = &metrics.overall;
    let set_cards: String = metrics.by_completion().into_iter().map(set_card).collect();

    let values = HashMap::from([
        ("SET_COUNT", overall.sets.to_string()),
        ("TOTAL_CARDS", overall.total_count.to_string()),
        ("OWNED_CARDS", overall.cards.owned.to_string()),
        ("PENDING_CARDS", overall.cards.pending.to_string()),
        ("SECRET_CARDS", overall.secret.collected().to_string()),
        ("COMPLETION_PERCENT", format_percent(overall.completion_ratio())),
        ("SET_CARDS", set_cards),
    ]);
    fill(INDEX_TEMPLATE, &values)
}

/// Every variant record of one set, plus a table with one record per card.
pub fn render_set_page(summary: &SetSummary, records: &[&CardRecord]) -> String {
    let mut all: Vec<&CardRecord> = records.to_vec();
    all.sort_by_key(|r| r.listing_order());

    let mut best: Vec<&CardRecord> = group_by_card(records.iter().copied())
        .values()
        .filter_map(|group| select_best(group))
        .collect();
    best.sort_by_key(|r| r.listing_order());

    let card_rows: String = all.iter().map(|r| card_row(summary, r)).collect();
    let best_rows: String = best.iter().map(|r| card_row(summary, r)).collect();

    let secret_summary = if summary.secret.total() > 0 {
        format!(
            ", plus {} of {} secret cards",
            summary.secret.collected(),
            summary.secret.total()
        )
    } else {
        String::new()
    };

    let values = HashMap::from([
        ("SET_NAME", escape(summary.display_name())),
        ("SET_CODE", escape(summary.set_code.as_str())),
        ("TOTAL_CARDS", summary.total_count.to_string()),
        ("OWNED_CARDS", summary.cards.owned.to_string()),
        ("PENDING_CARDS", summary.cards.pending.to_string()),
        ("NEEDED_CARDS", summary.cards.needed.to_string()),
        ("SECRET_SUMMARY", secret_summary),
        ("COMPLETION_PERCENT", format_percent(summary.completion_ratio())),
        ("OWNED_PERCENT", format_percent(summary.owned_ratio().min(1.0))),
        ("PENDING_PERCENT", format_percent(summary.pending_ratio().min(1.0))),
        ("CARD_ROWS", card_rows),
        ("BEST_ROWS", best_rows),
    ]);
    fill(SET_TEMPLATE, &values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{tests::record, Variant};
    use crate::diagnostics::Diagnostics;
    use crate::reconcile::reconcile;

    fn twm_collection() -> crate::reconcile::Collection {
        let mut owned = record("TWM", "133", Variant::normal(), Status::Owned);
        owned.name = String::from("Farfetch'd & <Friends>");
        owned.card_id = Some(String::from("102"));
        owned.total_count = Some(167);
        let mut reverse = record("TWM", "133", Variant::reverse_holo(), Status::Needed);
        reverse.total_count = Some(167);
        let mut secret = record("TWM", "214", Variant::holo(), Status::Needed);
        secret.total_count = Some(167);
        let catalogue = vec![owned, reverse, secret];
        let purchases = vec![
            record("TWM", "133", Variant::normal(), Status::PendingDelivery),
            record("TWM", "133", Variant::reverse_holo(), Status::PendingDelivery),
        ];
        reconcile(&catalogue, &purchases, &mut Diagnostics::new())
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<b>"Pika" & 'chu'</b>"#),
            "&lt;b&gt;&quot;Pika&quot; &amp; &#x27;chu&#x27;&lt;/b&gt;"
        );
    }

    #[test]
    fn fill_is_single_pass() {
        let values = HashMap::from([("A", String::from("{{B}}")), ("B", String::from("b"))]);
        assert_eq!(fill("{{A}} {{B}} {{C}}", &values), "{{B}} b {{C}}");
    }

    #[test]
    fn status_texts() {
        let collection = twm_collection();
        let texts: Vec<_> = collection.records().map(status_text).collect();
        assert_eq!(
            texts,
            vec!["Have + Pending Purchase (Duplicate!)", "Pending Purchase", "Need"]
        );
    }

    #[test]
    fn set_page_lists_every_variant_and_best_rows() {
        let collection = twm_collection();
        let metrics = Metrics::compute(&collection);
        let records: Vec<&CardRecord> = collection.records().collect();

        let page = render_set_page(&metrics.sets[0], &records);
        assert!(!page.contains("{{"));
        assert!(page.contains("Farfetch&#x27;d &amp; &lt;Friends&gt;"));
        assert!(page.contains(r#"<tr class="missing-card secret"><td></td><td>214</td>"#));
        assert!(page.contains(r#"href="https://www.tcgcollector.com/cards/102" data-card-id="102""#));
        assert!(page.contains("function copyMissingCards()"));
        assert!(page.contains(r#"const SET_CODE = "TWM";"#));

        let best_table = &page[page.find("id=\"best-cards\"").unwrap()..];
        assert_eq!(best_table.matches("<tr class=").count(), 2);
    }

    #[test]
    fn index_links_every_set() {
        let collection = twm_collection();
        let metrics = Metrics::compute(&collection);

        let index = render_index(&metrics);
        assert!(!index.contains("{{"));
        assert!(index.contains(r#"href="set_twm.html""#));
        assert!(index.contains("<strong>0.6%</strong> complete"));
    }
}
