//! Scraper for the tapibel.be collections
//!
//! Collections pages carry a slider, a description block, the list of
//! markets a collection ships to, named colour swatches and a
//! technical details block whose anchors double as document links.

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

const BASE_URL: &str = "https://www.tapibel.be";
const LISTING_URL: &str = "https://www.tapibel.be/collections";

pub struct TapibelScraper;

impl TapibelScraper {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SiteScraper for TapibelScraper {
    fn name(&self) -> &'static str {
        "tapibel"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    async fn run(&self, fetcher: &PageFetcher, out_root: &Path) -> Result<ScrapeSummary> {
        let listing_html = fetcher.get_html(LISTING_URL).await?;
        let entries = parse_listing(&listing_html);
        info!("Found {} collections on tapibel.be", entries.len());

        let site_root = out_root.join(self.name());
        let mut summary = ScrapeSummary::default();

        for entry in &entries {
            match scrape_product(fetcher, &site_root, entry).await {
                Ok(product_summary) => summary.merge(product_summary),
                Err(e) => warn!("Skipping collection {}: {:#}", entry.name, e),
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
    info!("Downloading collection data for {}", entry.name);

    let html = fetcher.get_html(&entry.url).await?;
    let detail = parse_detail(&html, &entry.name);

    let dirs = ProductDirs::create(site_root, &entry.name)?;
    let mut summary = ScrapeSummary::default();

    for image in &detail.slider {
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

    for url in &detail.documents {
        match fetcher.fetch_asset(url).await {
            Ok(asset) => {
                storage::save_asset(&dirs.docs.join(last_url_segment(url)), &asset.bytes)?;
                summary.assets += 1;
            }
            Err(e) => warn!("Failed to download document {}: {:#}", url, e),
        }
    }

    let mut record = ProductRecord::new(&entry.name);
    record.push("description", detail.description);
    record.push("available_in", detail.available_in);
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
    slider: Vec<ImageLink>,
    description: String,
    available_in: String,
    colours: Vec<ImageLink>,
    technical_details: String,
    documents: Vec<String>,
}

#[derive(Debug, PartialEq)]
struct ImageLink {
    url: String,
    filename: String,
}

fn parse_listing(html: &str) -> Vec<ListingEntry> {
    let document = Html::parse_document(html);
    let item_selector = Selector::parse("div.collections_row div.collection_content").unwrap();
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

fn parse_detail(html: &str, product_name: &str) -> ProductDetail {
    let document = Html::parse_document(html);
    let mut detail = ProductDetail::default();

    let slider_selector = Selector::parse("div.sections_group div.product_slider img").unwrap();
    for img in document.select(&slider_selector) {
        if let Some(src) = img.value().attr("src") {
            detail.slider.push(ImageLink {
                url: absolutize(BASE_URL, src),
                filename: last_url_segment(src).to_string(),
            });
        }
    }

    let desc_selector = Selector::parse("div.sections_group div.product_head p").unwrap();
    detail.description = document
        .select(&desc_selector)
        .map(element_text)
        .collect::<Vec<_>>()
        .concat();

    let location_selector =
        Selector::parse("div.sections_group div.cusrow div.product_btns a").unwrap();
    detail.available_in = document
        .select(&location_selector)
        .map(element_text)
        .collect::<Vec<_>>()
        .join("\n");

    let swatch_selector = Selector::parse(
        "div.sections_group div.beschikbare_kleuren_inner div.thumbs.ff div.productSlide",
    )
    .unwrap();
    let img_selector = Selector::parse("img").unwrap();
    let h5_selector = Selector::parse("h5").unwrap();
    for slide in document.select(&swatch_selector) {
        if let Some(img) = slide.select(&img_selector).next()
            && let Some(src) = img.value().attr("src")
            && let Some(colour) = slide.select(&h5_selector).next()
        {
            detail.colours.push(ImageLink {
                url: absolutize(BASE_URL, src),
                filename: format!(
                    "{}-{}{}",
                    product_name,
                    element_text(colour),
                    file_extension(src)
                ),
            });
        }
    }

    let details_selector =
        Selector::parse("div.sections_group div.technische-details_inner").unwrap();
    if let Some(details) = document.select(&details_selector).next() {
        let p_selector = Selector::parse("p").unwrap();
        detail.technical_details = details
            .select(&p_selector)
            .map(element_text)
            .collect::<Vec<_>>()
            .join("\n");

        let anchor_selector = Selector::parse("a").unwrap();
        for anchor in details.select(&anchor_selector) {
            if let Some(href) = anchor.value().attr("href")
                && !href.is_empty()
            {
                detail.documents.push(absolutize(BASE_URL, href));
            }
        }
    }

    detail
}

/// Extension including the dot, empty when the URL has none.
fn file_extension(url: &str) -> String {
    Path::new(url)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING_HTML: &str = r#"
        <html><body>
        <div class="collections_row">
          <div class="collection_content"><a href="/collections/altitude">Altitude</a></div>
          <div class="collection_content"><a href="https://www.tapibel.be/collections/cobalt">Cobalt</a></div>
        </div>
        </body></html>"#;

    #[test]
    fn listing_extracts_collection_links() {
        let entries = parse_listing(LISTING_HTML);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Altitude");
        assert_eq!(entries[0].url, "https://www.tapibel.be/collections/altitude");
        assert_eq!(entries[1].url, "https://www.tapibel.be/collections/cobalt");
    }

    const DETAIL_HTML: &str = r#"
        <html><body><div class="sections_group">
        <div class="product_slider">
          <img src="https://www.tapibel.be/uploads/altitude-1.jpg">
          <img src="https://www.tapibel.be/uploads/altitude-2.jpg">
        </div>
        <div class="product_head">
          <div class="the_content_wrapper"><h2>Altitude</h2></div>
          <p>A dense loop pile.</p>
          <p>Made in Belgium.</p>
        </div>
        <div class="cusrow">
          <div class="product_btns">
            <a href="/be">Belgium</a>
            <a href="/nl">Netherlands</a>
          </div>
        </div>
        <div class="beschikbare_kleuren_inner">
          <div class="thumbs ff">
            <div class="productSlide">
              <img src="https://www.tapibel.be/uploads/colours/110.jpg">
              <h5>Slate 110</h5>
            </div>
            <div class="productSlide">
              <img src="https://www.tapibel.be/uploads/colours/120.jpg">
              <h5>Dune 120</h5>
            </div>
          </div>
        </div>
        <div class="technische-details_inner">
          <p>Pile: 100% PA</p>
          <p>Width: 4m</p>
          <a href="/uploads/altitude-technical.pdf">Technical sheet</a>
        </div>
        </div></body></html>"#;

    #[test]
    fn detail_extracts_slider_and_description() {
        let detail = parse_detail(DETAIL_HTML, "Altitude");

        assert_eq!(detail.slider.len(), 2);
        assert_eq!(detail.slider[0].filename, "altitude-1.jpg");
        assert_eq!(detail.description, "A dense loop pile.Made in Belgium.");
    }

    #[test]
    fn detail_joins_locations_with_newlines() {
        let detail = parse_detail(DETAIL_HTML, "Altitude");
        assert_eq!(detail.available_in, "Belgium\nNetherlands");
    }

    #[test]
    fn detail_names_swatches_from_product_and_heading() {
        let detail = parse_detail(DETAIL_HTML, "Altitude");

        assert_eq!(detail.colours.len(), 2);
        assert_eq!(detail.colours[0].filename, "Altitude-Slate 110.jpg");
        assert_eq!(
            detail.colours[0].url,
            "https://www.tapibel.be/uploads/colours/110.jpg"
        );
    }

    #[test]
    fn detail_collects_technical_block_and_documents() {
        let detail = parse_detail(DETAIL_HTML, "Altitude");

        assert_eq!(detail.technical_details, "Pile: 100% PA\nWidth: 4m");
        assert_eq!(
            detail.documents,
            ["https://www.tapibel.be/uploads/altitude-technical.pdf"]
        );
    }

    #[test]
    fn extension_is_empty_when_absent() {
        assert_eq!(file_extension("https://x.be/a/b.jpg"), ".jpg");
        assert_eq!(file_extension("https://x.be/a/b"), "");
    }
}
