use scraper::{ElementRef, Html, Selector};

use crate::model::{Card, HoodSpec};
use crate::{Error, Result, LAST_MODIFIED_MARKER, SOUND_GLYPH, UNTITLED, URL_PREFIX};

/// Text skipped when collecting a hood description (alt text of the hood icon).
const ICON_TEXT_PREFIX: &str = "Geocities Icon";

/// Items that could be extracted from a page plus a note for every unit that couldn't.
#[derive(Debug)]
pub struct Extracted<T> {
    pub items: Vec<T>,
    pub diagnostics: Vec<String>,
}

impl<T> Default for Extracted<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}

impl<T> Extracted<T> {
    fn push(&mut self, res: Result<T>) {
        match res {
            Ok(item) => self.items.push(item),
            Err(e) => self.diagnostics.push(e.to_string()),
        }
    }

    /// Logs every diagnostic as a warning and returns the items.
    pub fn into_logged_items(self, context: &str) -> Vec<T> {
        for diagnostic in &self.diagnostics {
            tracing::warn!(context, %diagnostic, "skipped while extracting");
        }
        self.items
    }
}

/// Collapses every whitespace run into a single space and trims the ends.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::ParseMissingSelector(sel_str.into()))
}

/// Parses the mirror's front page into `(hood name, spec)` pairs, in page order.
///
/// Every `h2` holding a link introduces a hood. The description is the next `h5`
/// and the burbs are the links of the next `table`, both searched in document order.
pub fn parse_listing(html: &str) -> Result<Extracted<(String, HoodSpec)>> {
    let doc = Html::parse_document(html);
    let link_selector = create_selector("a")?;

    let elements = doc
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .collect::<Vec<_>>();

    let mut extracted = Extracted::default();
    for (idx, heading) in elements.iter().enumerate() {
        if heading.value().name() != "h2" {
            continue;
        }
        let Some(link) = heading.select(&link_selector).next() else {
            continue;
        };
        let following = &elements[idx + 1..];
        extracted.push(extract_hood(link, following, &link_selector));
    }
    Ok(extracted)
}

fn extract_hood(
    link: ElementRef,
    following: &[ElementRef],
    link_selector: &Selector,
) -> Result<(String, HoodSpec)> {
    let name = clean_text(&link.text().collect::<String>());
    if name.is_empty() {
        return Err(Error::MissingElement("hood name"));
    }

    let next_named = |tag: &str| following.iter().find(|el| el.value().name() == tag);

    let description = next_named("h5")
        .map(|h5| {
            h5.text()
                .map(str::trim)
                .filter(|t| !t.is_empty() && !t.starts_with(ICON_TEXT_PREFIX))
                .map(clean_text)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();

    let mut burbs: Vec<String> = Vec::new();
    if let Some(table) = next_named("table") {
        for burb_link in table.select(link_selector) {
            let burb = clean_text(&burb_link.text().collect::<String>());
            if !burb.is_empty() && !burbs.contains(&burb) {
                burbs.push(burb);
            }
        }
    }

    Ok((name, HoodSpec { description, burbs }))
}

struct CardSelectors {
    card: Selector,
    title: Selector,
    link: Selector,
    subtitle: Selector,
}

impl CardSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            card: create_selector("div.card")?,
            title: create_selector("div.card-title")?,
            link: create_selector("a")?,
            subtitle: create_selector("div.card-subtitle")?,
        })
    }
}

/// Extracts every card listed on a hood or burb page.
/// Cards that can't be read end up in the diagnostics instead of failing the page.
pub fn parse_cards(html: &str) -> Result<Extracted<Card>> {
    let doc = Html::parse_document(html);
    let selectors = CardSelectors::new()?;

    let mut extracted = Extracted::default();
    for card in doc.select(&selectors.card) {
        extracted.push(extract_card(card, &selectors));
    }
    Ok(extracted)
}

fn extract_card(card: ElementRef, selectors: &CardSelectors) -> Result<Card> {
    let title = card
        .select(&selectors.title)
        .next()
        .and_then(|title| title.select(&selectors.link).next())
        .map(|link| link.text().collect::<String>())
        .unwrap_or_else(|| UNTITLED.to_string());

    let subtitle = card
        .select(&selectors.subtitle)
        .next()
        .ok_or(Error::MissingElement("div.card-subtitle"))?
        .text()
        .collect::<String>();

    Ok(card_from_parts(title, &subtitle))
}

/// Builds a card from its raw title and the `"<url> Last modified: <date>"` subtitle.
/// A subtitle without the marker is taken as a bare URL.
pub fn card_from_parts(title: String, subtitle: &str) -> Card {
    let mut parts = subtitle.split(LAST_MODIFIED_MARKER);
    let url = parts.next().unwrap_or_default().trim().replace(URL_PREFIX, "");
    let last_modified = parts.next().map(str::trim).unwrap_or_default().to_string();

    Card {
        has_sound: title.contains(SOUND_GLYPH),
        title,
        url,
        last_modified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
<html><body>
  <h1>Neighborhoods</h1>
  <h2><a href="/Area51">Area51</a></h2>
  <h5><img src="icon.gif" alt="Geocities Icon"> Science   fiction
      and fantasy</h5>
  <table>
    <tr><td><a href="/Area51/Vault">Vault</a></td><td><a href="/Area51/Nebula">Nebula</a></td></tr>
    <tr><td><a href="/Area51/Vault">Vault</a></td></tr>
  </table>
  <h2>No link here</h2>
  <h2><a href="/Athens">
      Athens</a></h2>
  <h5>Geocities Icon text<b>Philosophy</b>, literature</h5>
  <table><tr><td><a href="/Athens/Acropolis">Acropolis</a></td></tr></table>
</body></html>"#;

    fn card_html(title: &str, subtitle: Option<&str>) -> String {
        let subtitle = subtitle
            .map(|s| format!(r#"<div class="card-subtitle">{s}</div>"#))
            .unwrap_or_default();
        format!(
            r#"<div class="card"><div class="card-title"><a href="x">{title}</a></div>{subtitle}</div>"#
        )
    }

    #[test]
    fn clean_text_collapses_whitespace() {
        assert_eq!(clean_text("\n\t Hello \t\n  world \n"), "Hello world");
        assert_eq!(clean_text("   "), "");
    }

    #[test]
    fn listing_extracts_hoods_descriptions_and_burbs() {
        let extracted = parse_listing(LISTING).unwrap();

        assert!(extracted.diagnostics.is_empty());
        assert_eq!(extracted.items.len(), 2);

        let (name, spec) = &extracted.items[0];
        assert_eq!(name, "Area51");
        assert_eq!(spec.description, "Science fiction and fantasy");
        assert_eq!(spec.burbs, vec!["Vault", "Nebula"]);

        let (name, spec) = &extracted.items[1];
        assert_eq!(name, "Athens");
        assert_eq!(spec.description, "Philosophy , literature");
        assert_eq!(spec.burbs, vec!["Acropolis"]);
    }

    #[test]
    fn listing_reports_hood_with_empty_name() {
        let html = r#"<h2><a href="/x">   </a></h2><h2><a href="/y">Tokyo</a></h2>"#;

        let extracted = parse_listing(html).unwrap();

        assert_eq!(extracted.items.len(), 1);
        assert_eq!(extracted.items[0].0, "Tokyo");
        assert_eq!(extracted.items[0].1, HoodSpec::default());
        assert_eq!(extracted.diagnostics.len(), 1);
    }

    #[test]
    fn card_with_sound_glyph_is_flagged() {
        let html = card_html(
            "My page 🔊",
            Some("www.geocities.com/Area51/Vault/1234/ Last modified: 1999-01-02"),
        );

        let cards = parse_cards(&html).unwrap().items;

        assert_eq!(
            cards,
            vec![Card {
                title: "My page 🔊".into(),
                url: "Area51/Vault/1234/".into(),
                last_modified: "1999-01-02".into(),
                has_sound: true,
            }]
        );
    }

    #[test]
    fn card_without_sound_glyph_is_not_flagged() {
        let html = card_html("Quiet page", Some("www.geocities.com/a Last modified: x"));

        let cards = parse_cards(&html).unwrap().items;

        assert!(!cards[0].has_sound);
    }

    #[test]
    fn subtitle_without_marker_becomes_url() {
        let card = card_from_parts("t".into(), "  www.geocities.com/Athens/2000/  ");

        assert_eq!(card.url, "Athens/2000/");
        assert_eq!(card.last_modified, "");
    }

    #[test]
    fn card_without_title_link_is_untitled() {
        let html = r#"<div class="card"><div class="card-title">plain</div>
            <div class="card-subtitle">www.geocities.com/x Last modified: y</div></div>"#;

        let cards = parse_cards(html).unwrap().items;

        assert_eq!(cards[0].title, "Untitled");
        assert_eq!(cards[0].url, "x");
    }

    #[test]
    fn card_without_subtitle_is_dropped_with_diagnostic() {
        let html = format!(
            "{}{}",
            card_html("no subtitle", None),
            card_html("ok", Some("www.geocities.com/ok Last modified: z"))
        );

        let extracted = parse_cards(&html).unwrap();

        assert_eq!(extracted.items.len(), 1);
        assert_eq!(extracted.items[0].title, "ok");
        assert_eq!(extracted.diagnostics.len(), 1);
    }
}
