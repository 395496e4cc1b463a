//! Scraper for the lano.com hospitality carpet range
//!
//! Detail pages carry a slideshow, a short description, colour
//! thumbnails, a definition-list of technical data and a single PDF
//! reachable through the tools menu.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::fetch::{PAGE_DELAY, PageFetcher};
use crate::models::{ProductRecord, ScrapeSummary};
use crate::storage::{self, ProductDirs};
use crate::traits::{SiteScraper, absolutize};

use super::{element_text, last_url_segment};

const BASE_URL: &str = "https://www.lano.com";
const LISTING_URL: &str = "https://www.lano.com/en/hospitality";

pub struct LanoScraper;

impl LanoScraper {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SiteScraper for LanoScraper {
    fn name(&self) -> &'static str {
        "lano"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    async fn run(&self, fetcher: &PageFetcher, out_root: &Path) -> Result<ScrapeSummary> {
        let listing_html = fetcher.get_html(LISTING_URL).await?;
        let entries = parse_listing(&listing_html);
        info!("Found {} products on lano.com", entries.len());

        let site_root = out_root.join(self.name());
        let mut summary = ScrapeSummary::default();

        for entry in &entries {
            match scrape_product(fetcher, &site_root, entry).await {
                Ok(product_summary) => summary.merge(product_summary),
                Err(e) => warn!("Skipping product {}: {:#}", entry.name, e),
            }
            tokio::time::sleep(PAGE_DELAY).await;
        }

        Ok(summary)
    }
}

async fn scrape_product(
    fetcher: &PageFetcher,
    site_root: &Path,
    entry: &ListingEntry,
) -> Result<ScrapeSummary> {
    info!("Downloading product data for {}", entry.name);

    let html = fetcher.get_html(&entry.url).await?;
    let detail = parse_detail(&html);

    let dirs = ProductDirs::create(site_root, &entry.name)?;
    let mut summary = ScrapeSummary::default();

    for image in &detail.slideshow {
        match fetcher.fetch_asset(&image.url).await {
            Ok(asset) => {
                storage::save_asset(&dirs.images.join(&image.filename), &asset.bytes)?;
                summary.assets += 1;
            }
            Err(e) => warn!("Failed to download image {}: {:#}", image.url, e),
        }
    }

    if !detail.colours.is_empty() {
        let colours = dirs.colours()?;
        for image in &detail.colours {
            match fetcher.fetch_asset(&image.url).await {
                Ok(asset) => {
                    storage::save_asset(&colours.join(&image.filename), &asset.bytes)?;
                    summary.assets += 1;
                }
                Err(e) => warn!("Failed to download swatch {}: {:#}", image.url, e),
            }
        }
    }

    if let Some(url) = &detail.pdf_url {
        match fetcher.fetch_asset(url).await {
            Ok(asset) => {
                let filename = format!("{}.pdf", entry.name);
                storage::save_asset(&dirs.docs.join(filename), &asset.bytes)?;
                summary.assets += 1;
            }
            Err(e) => warn!("Failed to download document {}: {:#}", url, e),
        }
    }

    let mut record = ProductRecord::new(&entry.name);
    record.push("description", detail.description);
    record.push("technical_details", detail.technical_details);
    storage::write_product_csv(&dirs.root, &record)?;
    summary.items += 1;

    Ok(summary)
}

#[derive(Debug)]
struct ListingEntry {
    name: String,
    url: String,
}

#[derive(Debug, Default)]
struct ProductDetail {
    slideshow: Vec<ImageLink>,
    description: String,
    colours: Vec<ImageLink>,
    technical_details: String,
    pdf_url: Option<String>,
}

#[derive(Debug, PartialEq)]
struct ImageLink {
    url: String,
    filename: String,
}

fn parse_listing(html: &str) -> Vec<ListingEntry> {
    let document = Html::parse_document(html);
    let item_selector = Selector::parse("ul.product-overview div.va-m").unwrap();
    let link_selector = Selector::parse("a").unwrap();

    let mut entries = Vec::new();
    for item in document.select(&item_selector) {
        if let Some(link) = item.select(&link_selector).next()
            && let Some(href) = link.value().attr("href")
        {
            entries.push(ListingEntry {
                name: element_text(link),
                url: absolutize(BASE_URL, href),
            });
        }
    }

    entries
}

fn parse_detail(html: &str) -> ProductDetail {
    let document = Html::parse_document(html);
    let mut detail = ProductDetail::default();

    let slideshow_selector = Selector::parse(
        "div.page-wrap div.product-slideshow-wrapper div.cycle-slideshow img",
    )
    .unwrap();
    for img in document.select(&slideshow_selector) {
        if let Some(src) = img.value().attr("src") {
            detail.slideshow.push(ImageLink {
                url: absolutize(BASE_URL, src),
                filename: slideshow_filename(src),
            });
        }
    }

    let desc_selector = Selector::parse("div.page-wrap div.description p").unwrap();
    detail.description = document
        .select(&desc_selector)
        .next()
        .map(element_text)
        .unwrap_or_default();

    let colour_selector = Selector::parse("div.page-wrap ul.product-thumbs img").unwrap();
    for img in document.select(&colour_selector) {
        if let Some(src) = img.value().attr("src") {
            detail.colours.push(ImageLink {
                url: absolutize(BASE_URL, src),
                filename: last_url_segment(src).to_string(),
            });
        }
    }

    // Technical data is a definition list of dt/dd pairs.
    let dt_selector = Selector::parse("div.page-wrap dl.product-data dt").unwrap();
    let dd_selector = Selector::parse("div.page-wrap dl.product-data dd").unwrap();
    let lines: Vec<String> = document
        .select(&dt_selector)
        .zip(document.select(&dd_selector))
        .map(|(dt, dd)| format!("{} {}", element_text(dt), element_text(dd)))
        .collect();
    detail.technical_details = lines.join("\n");

    let tool_selector = Selector::parse("div.page-wrap ul.tools a").unwrap();
    detail.pdf_url = document
        .select(&tool_selector)
        .find(|anchor| anchor.value().attr("title") == Some("Download PDF"))
        .and_then(|anchor| anchor.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(|href| absolutize(BASE_URL, href));

    detail
}

/// Image names on the slideshow CDN repeat across products; joining the
/// last two path segments keeps them distinct.
fn slideshow_filename(src: &str) -> String {
    let mut segments = src.trim_matches('/').rsplit('/');
    let file = segments.next().unwrap_or(src);
    match segments.next() {
        Some(folder) => format!("{folder}-{file}"),
        None => file.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING_HTML: &str = r#"
        <html><body>
        <ul class="product-overview">
          <li>
            <div class="va-m"><a href="/en/hospitality/zen">Zen</a></div>
          </li>
          <li>
            <div class="va-m"><a href="https://www.lano.com/en/hospitality/glamour">Glamour</a></div>
          </li>
        </ul>
        </body></html>"#;

    #[test]
    fn listing_extracts_anchor_text_and_urls() {
        let entries = parse_listing(LISTING_HTML);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Zen");
        assert_eq!(entries[0].url, "https://www.lano.com/en/hospitality/zen");
        assert_eq!(entries[1].url, "https://www.lano.com/en/hospitality/glamour");
    }

    const DETAIL_HTML: &str = r#"
        <html><body><div class="page-wrap">
        <div class="product-slideshow-wrapper">
          <div class="cycle-slideshow">
            <img src="https://media.lano.com/zen/room-1.jpg">
            <img src="https://media.lano.com/zen/room-2.jpg">
          </div>
        </div>
        <div class="description">
          <p>A velvety cut pile.</p>
        </div>
        <ul class="product-thumbs">
          <li><img src="https://media.lano.com/zen/colours/810.jpg"></li>
          <li><img src="https://media.lano.com/zen/colours/830.jpg"></li>
        </ul>
        <dl class="product-data">
          <dt>Pile weight</dt><dd>1350 g/m2</dd>
          <dt>Total height</dt><dd>9.5 mm</dd>
        </dl>
        <ul class="tools">
          <li><a title="Print" href="/print/zen">Print</a></li>
          <li><a title="Download PDF" href="https://media.lano.com/zen/zen.pdf">PDF</a></li>
        </ul>
        </div></body></html>"#;

    #[test]
    fn detail_joins_last_two_segments_for_slideshow_names() {
        let detail = parse_detail(DETAIL_HTML);

        assert_eq!(detail.slideshow.len(), 2);
        assert_eq!(detail.slideshow[0].filename, "zen-room-1.jpg");
        assert_eq!(detail.slideshow[0].url, "https://media.lano.com/zen/room-1.jpg");
    }

    #[test]
    fn detail_extracts_description_and_colours() {
        let detail = parse_detail(DETAIL_HTML);

        assert_eq!(detail.description, "A velvety cut pile.");
        assert_eq!(detail.colours.len(), 2);
        assert_eq!(detail.colours[0].filename, "810.jpg");
    }

    #[test]
    fn detail_pairs_definition_list_entries() {
        let detail = parse_detail(DETAIL_HTML);
        assert_eq!(
            detail.technical_details,
            "Pile weight 1350 g/m2\nTotal height 9.5 mm"
        );
    }

    #[test]
    fn detail_takes_pdf_link_by_title() {
        let detail = parse_detail(DETAIL_HTML);
        assert_eq!(
            detail.pdf_url.as_deref(),
            Some("https://media.lano.com/zen/zen.pdf")
        );
    }

    #[test]
    fn missing_description_is_empty() {
        let detail = parse_detail("<html><body><div class=\"page-wrap\"></div></body></html>");
        assert_eq!(detail.description, "");
        assert!(detail.slideshow.is_empty());
        assert!(detail.pdf_url.is_none());
    }
}
