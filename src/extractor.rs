use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use itertools::Itertools;
use scraper::{Html, Selector};
use url::Url;

use crate::dom;
use crate::models::ItemRecord;

/// Substring of an icon `src` marking platform availability on a page.
const GREEN_TICK_MARKER: &str = "clip-green-tick-mark";

pub struct Extraction {
    /// Slug-keyed records in directory-iteration order. Later duplicate
    /// slugs overwrite earlier ones.
    pub records: IndexMap<String, ItemRecord>,
    /// Pages dropped because neither platform flag was set.
    pub skipped: usize,
}

/// Scrape every `.html` file in `dir` into a slug-keyed record map.
/// An unreadable file aborts the run; malformed markup never does.
pub fn extract_dir(dir: &Path) -> Result<Extraction> {
    let mut records = IndexMap::new();
    let mut skipped = 0;

    for entry in fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("html") {
            continue;
        }
        let html = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let record = extract_page(&html, &path.to_string_lossy());
        if !record.ase && !record.asa {
            log::debug!("skipping {}: not available on any tracked platform", path.display());
            skipped += 1;
            continue;
        }
        let key = slug_from_url(record.url.as_deref().unwrap_or_default());
        log::info!("processed {key}");
        records.insert(key, record);
    }

    Ok(Extraction { records, skipped })
}

/// Extract one record from a saved page. Missing elements degrade to empty
/// strings or false flags; nothing here errors.
pub fn extract_page(html: &str, fallback_url: &str) -> ItemRecord {
    let doc = Html::parse_document(html);

    let canonical = Selector::parse(r#"link[rel="canonical"]"#).unwrap();
    let url = doc
        .select(&canonical)
        .next()
        .and_then(|el| el.value().attr("href"))
        .unwrap_or(fallback_url)
        .to_string();

    let heading = Selector::parse("h1.withsep").unwrap();
    let title = doc
        .select(&heading)
        .next()
        .map(|el| el.text().map(str::trim).filter(|t| !t.is_empty()).collect::<String>())
        .unwrap_or_default();

    let figure = Selector::parse("figure.wp-block-image").unwrap();
    let img = Selector::parse("img").unwrap();
    let image = doc
        .select(&figure)
        .next()
        .and_then(|fig| fig.select(&img).next())
        .and_then(|el| el.value().attr("src"))
        .unwrap_or_default()
        .to_string();

    let (ase, asa) = availability_flags(&doc);

    ItemRecord {
        url: Some(url),
        title,
        image,
        ase,
        asa,
        gfi: extract_command(&doc, "anchorlonggfi"),
        blueprint_path: extract_command(&doc, "anchorblueprint"),
        item_id: extract_command(&doc, "anchoritemid"),
        item_id_number: extract_command(&doc, "anchoritemidnumber"),
    }
}

/// Scan the page's icons for green tick markers; alt text decides which
/// platform each one vouches for. OR-accumulated across the whole page.
fn availability_flags(doc: &Html) -> (bool, bool) {
    let icons = Selector::parse("img[src][alt]").unwrap();
    let (mut ase, mut asa) = (false, false);
    for icon in doc.select(&icons) {
        let src = icon.value().attr("src").unwrap_or_default().to_lowercase();
        if !src.contains(GREEN_TICK_MARKER) {
            continue;
        }
        let alt = icon.value().attr("alt").unwrap_or_default().to_lowercase();
        if alt.contains("ase") {
            ase = true;
        }
        if alt.contains("asa") {
            asa = true;
        }
    }
    (ase, asa)
}

/// Pull a cheat-code fragment out of the section a page anchor points at:
/// the anchor's next `div.container-section` holds a `copier` element whose
/// text nodes form the command.
fn extract_command(doc: &Html, anchor_id: &str) -> String {
    let Some(anchor) = dom::find_by_id(doc, anchor_id) else {
        return String::new();
    };
    let Some(container) = dom::find_following_with_class(anchor, "div", "container-section") else {
        return String::new();
    };
    let Some(copier) = dom::find_descendant_tag(container, "copier") else {
        return String::new();
    };
    copier
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .join(" ")
}

/// Last non-empty path segment of the URL, or the raw string if the path
/// has no segments. Unparseable inputs (plain file paths) are treated as a
/// bare path.
pub fn slug_from_url(raw: &str) -> String {
    let path = match Url::parse(raw) {
        Ok(url) => url.path().to_owned(),
        Err(_) => raw.to_owned(),
    };
    path.split('/')
        .rev()
        .find(|s| !s.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| raw.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util;

    const FULL_PAGE: &str = r#"
        <html>
        <head><link rel="canonical" href="https://example.com/items/stone-pick/"></head>
        <body>
            <h1 class="withsep"> Stone Pick </h1>
            <figure class="wp-block-image">
                <img src="https://cdn.example.com/img/Stone_Pick.png">
            </figure>
            <img src="/icons/clip-green-tick-mark.svg" alt="Available on ASE">
            <img src="/icons/clip-green-tick-mark.svg" alt="ASA: yes">
            <h3 id="anchorlonggfi">GFI command</h3>
            <div class="container-section">
                <copier><span>cheat gfi</span> <span>StonePick 1 0 0</span></copier>
            </div>
            <h3 id="anchorblueprint">Blueprint path</h3>
            <div class="container-section">
                <copier>cheat giveitem "Blueprint'/Game/StonePick'" 1 0 0</copier>
            </div>
            <h3 id="anchoritemidnumber">Item ID</h3>
            <div class="container-section"><copier>1</copier></div>
        </body>
        </html>
    "#;

    #[test]
    fn extracts_full_record() {
        let record = extract_page(FULL_PAGE, "scraped/stone-pick.html");
        assert_eq!(record.url.as_deref(), Some("https://example.com/items/stone-pick/"));
        assert_eq!(record.title, "Stone Pick");
        assert_eq!(record.image, "https://cdn.example.com/img/Stone_Pick.png");
        assert!(record.ase);
        assert!(record.asa);
        assert_eq!(record.gfi, "cheat gfi StonePick 1 0 0");
        assert_eq!(
            record.blueprint_path,
            r#"cheat giveitem "Blueprint'/Game/StonePick'" 1 0 0"#
        );
        assert_eq!(record.item_id, "");
        assert_eq!(record.item_id_number, "1");
    }

    #[test]
    fn falls_back_to_file_path_without_canonical_link() {
        let record = extract_page("<html><body></body></html>", "scraped/orphan.html");
        assert_eq!(record.url.as_deref(), Some("scraped/orphan.html"));
        assert_eq!(record.title, "");
        assert_eq!(record.image, "");
        assert!(!record.ase);
        assert!(!record.asa);
    }

    #[test]
    fn tick_without_platform_alt_sets_no_flags() {
        let html = r#"<img src="/clip-green-tick-mark.png" alt="checkmark">"#;
        let record = extract_page(html, "x.html");
        assert!(!record.ase && !record.asa);
    }

    #[test]
    fn plain_icon_with_platform_alt_sets_no_flags() {
        let html = r#"<img src="/plain-icon.png" alt="ASE ASA">"#;
        let record = extract_page(html, "x.html");
        assert!(!record.ase && !record.asa);
    }

    #[test]
    fn marker_match_is_case_insensitive() {
        let html = r#"<img src="/CLIP-GREEN-TICK-MARK.png" alt="Ase only">"#;
        let record = extract_page(html, "x.html");
        assert!(record.ase);
        assert!(!record.asa);
    }

    #[test]
    fn missing_copier_yields_empty_command() {
        let html = r#"
            <h3 id="anchorlonggfi">GFI</h3>
            <div class="container-section"><p>no copier here</p></div>
        "#;
        let record = extract_page(html, "x.html");
        assert_eq!(record.gfi, "");
    }

    #[test]
    fn slug_takes_last_nonempty_segment() {
        assert_eq!(slug_from_url("https://example.com/foo/bar-item/"), "bar-item");
        assert_eq!(slug_from_url("https://example.com/foo/bar-item"), "bar-item");
        assert_eq!(slug_from_url("https://example.com/foo/bar-item?tab=ids"), "bar-item");
        assert_eq!(slug_from_url("scraped/orphan.html"), "orphan.html");
    }

    #[test]
    fn slug_of_segmentless_url_is_the_raw_string() {
        assert_eq!(slug_from_url(""), "");
    }

    #[test]
    fn directory_walk_filters_and_overwrites_duplicates() {
        let dir = test_util::temp_dir("extract");
        let available = r#"
            <link rel="canonical" href="https://example.com/items/shared-slug/">
            <img src="/clip-green-tick-mark.png" alt="ASE">
            <h1 class="withsep">First</h1>
        "#;
        let duplicate = available.replace("First", "Second");
        let unavailable = r#"<h1 class="withsep">Nope</h1>"#;
        fs::write(dir.join("a.html"), available).unwrap();
        fs::write(dir.join("b.html"), duplicate).unwrap();
        fs::write(dir.join("c.html"), unavailable).unwrap();
        fs::write(dir.join("ignored.txt"), "not html").unwrap();

        let extraction = extract_dir(&dir).unwrap();
        // Directory iteration order decides which duplicate wins, so only
        // the single-survivor invariant is checkable here.
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.skipped, 1);
        assert!(extraction.records.contains_key("shared-slug"));

        fs::remove_dir_all(&dir).unwrap();
    }
}
