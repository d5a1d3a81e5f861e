use log::trace;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use super::{element_text, pattern, PageAdapter, RawSighting, SourceKind};

mod selectors {
    use super::*;

    fn parse(sel: &str) -> Selector {
        Selector::parse(sel).expect("static selector is valid")
    }

    pub static ROW: LazyLock<Selector> = LazyLock::new(|| parse("tr, .article-row"));

    pub static LINK: LazyLock<Selector> = LazyLock::new(|| parse("a"));

    pub static ANY: LazyLock<Selector> = LazyLock::new(|| parse("*"));
}

/// Attributes the marketplace uses for icon tooltips such as "Reverse Holo".
const DESCRIPTIVE_ATTRS: [&str; 5] = [
    "title",
    "alt",
    "aria-label",
    "data-original-title",
    "data-bs-original-title",
];

/// Purchase (order history) page of the marketplace.
pub struct PurchasePage {
    document: Html,
    markers: Vec<String>,
}

impl PurchasePage {
    pub fn parse(html: &str, variant_markers: &[String]) -> PurchasePage {
        PurchasePage {
            document: Html::parse_document(html),
            markers: variant_markers.to_vec(),
        }
    }

    fn row_sighting(&self, row: ElementRef) -> Option<RawSighting> {
        let (link_text, identity) = row.select(&selectors::LINK).find_map(|link| {
            let text = element_text(link);
            let identity = pattern::parse_identity_suffix(&text).map(|id| {
                (
                    id.name.to_string(),
                    id.set_code.to_string(),
                    id.number.to_string(),
                )
            });
            identity.map(|identity| (text, identity))
        })?;

        let (name, set_code, number) = identity;
        let variant = self.detect_variant(row, &link_text);
        trace!("purchase row: {} ({} {}) [{}]", name, set_code, number, variant);

        Some(RawSighting {
            name_text: name,
            number_text: Some(number),
            set_hint: Some(set_code),
            variant_hint: Some(variant),
            ..RawSighting::default()
        })
    }

    /// Scans everything in the row except the card link itself, so a card
    /// whose name contains a marker word is not mistaken for that variant.
    fn detect_variant(&self, row: ElementRef, link_text: &str) -> String {
        let mut haystack = element_text(row).replacen(link_text, " ", 1);

        for element in std::iter::once(row).chain(row.select(&selectors::ANY)) {
            for attr in DESCRIPTIVE_ATTRS {
                if let Some(value) = element.value().attr(attr) {
                    if value.trim() == link_text {
                        continue;
                    }
                    haystack.push(' ');
                    haystack.push_str(value);
                }
            }
        }

        self.markers
            .iter()
            .find(|marker| haystack.contains(marker.as_str()))
            .cloned()
            .unwrap_or_else(|| String::from("Normal"))
    }

    fn is_innermost_row(row: &ElementRef) -> bool {
        row.select(&selectors::ROW).next().is_none()
    }
}

impl PageAdapter for PurchasePage {
    fn kind(&self) -> SourceKind {
        SourceKind::Purchase
    }

    fn sightings(&self) -> Box<dyn Iterator<Item = RawSighting> + '_> {
        Box::new(
            self.document
                .select(&selectors::ROW)
                .filter(Self::is_innermost_row)
                .filter_map(move |row| self.row_sighting(row)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> Vec<String> {
        vec![String::from("Reverse Holo"), String::from("Holo")]
    }

    const ORDER_PAGE: &str = r#"<html><body>
<table class="table">
  <tbody>
    <tr data-article-id="1">
      <td class="info"><span class="icon" data-bs-original-title="Reverse Holo"></span></td>
      <td class="name"><a href="/en/Pokemon/Products/Singles/Twilight-Masquerade/Farfetchd">Farfetch&#39;d (TWM 133)</a></td>
      <td class="price">0,10 €</td>
    </tr>
    <tr data-article-id="2">
      <td class="info"></td>
      <td class="name"><a href="/x">Farfetch&#39;d (TWM 133)</a></td>
      <td class="price">0,05 €</td>
    </tr>
    <tr>
      <td class="name"><a href="/y">Booster Display (TWM)</a></td>
    </tr>
    <tr data-article-id="3">
      <td class="name"><a href="/z">Holon Research Tower (TWM 7)</a></td>
      <td>Holo</td>
    </tr>
  </tbody>
</table>
<div class="article-row">
  <div class="col-name"><a href="/w">Ralts (SVI 060)</a></div>
  <div class="col-extras"><span title="Reverse Holo"></span></div>
</div>
</body></html>"#;

    #[test]
    fn finds_cards_in_rows_in_document_order() {
        let page = PurchasePage::parse(ORDER_PAGE, &markers());
        let found: Vec<_> = page
            .sightings()
            .map(|s| {
                (
                    s.name_text,
                    s.set_hint.unwrap(),
                    s.number_text.unwrap(),
                    s.variant_hint.unwrap(),
                )
            })
            .collect();

        assert_eq!(
            found,
            vec![
                (
                    String::from("Farfetch'd"),
                    String::from("TWM"),
                    String::from("133"),
                    String::from("Reverse Holo")
                ),
                (
                    String::from("Farfetch'd"),
                    String::from("TWM"),
                    String::from("133"),
                    String::from("Normal")
                ),
                (
                    String::from("Holon Research Tower"),
                    String::from("TWM"),
                    String::from("7"),
                    String::from("Holo")
                ),
                (
                    String::from("Ralts"),
                    String::from("SVI"),
                    String::from("060"),
                    String::from("Reverse Holo")
                ),
            ]
        );
    }

    #[test]
    fn marker_inside_card_name_is_ignored() {
        let html = r#"<table><tr><td><a>Holo Tower (TWM 9)</a></td></tr></table>"#;
        let page = PurchasePage::parse(html, &markers());
        let sighting = page.sightings().next().unwrap();
        assert_eq!(sighting.variant_hint.as_deref(), Some("Normal"));
    }

    #[test]
    fn page_without_cards_is_empty() {
        let page = PurchasePage::parse("<html><body><p>No orders</p></body></html>", &markers());
        assert_eq!(page.sightings().count(), 0);
    }

    #[test]
    fn outer_layout_rows_are_skipped() {
        let html = r#"<table><tr><td>
<table><tr><td><a>Dreepy (TWM 128)</a></td></tr></table>
</td></tr></table>"#;
        let page = PurchasePage::parse(html, &markers());
        assert_eq!(page.sightings().count(), 1);
    }
}
