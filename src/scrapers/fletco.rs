//! Scraper for the fletcocarpets.com wall-to-wall catalog
//!
//! The listing is not HTML: the shop exposes a JSON feed when queried
//! with `feed=true`. Detail pages are regular markup carrying a hero
//! image, colour variant swatches, a description and document links.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::{info, warn};

use crate::fetch::{PAGE_DELAY, PageFetcher};
use crate::models::{ProductRecord, ScrapeSummary};
use crate::storage::{self, ProductDirs};
use crate::traits::{SiteScraper, absolutize};

use super::{element_text, last_url_segment};

const BASE_URL: &str = "https://www.fletcocarpets.com";
const LISTING_URL: &str = "https://www.fletcocarpets.com/en/products/wall-to-wall-carpets";

pub struct FletcoScraper;

impl FletcoScraper {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SiteScraper for FletcoScraper {
    fn name(&self) -> &'static str {
        "fletco"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    async fn run(&self, fetcher: &PageFetcher, out_root: &Path) -> Result<ScrapeSummary> {
        let feed: Vec<FeedPage> = fetcher
            .get_json(
                LISTING_URL,
                &[
                    ("feed", "true"),
                    ("DoNotShowVariantsAsSingleProducts", "True"),
                ],
            )
            .await?;
        let entries = feed_entries(&feed);
        info!("Found {} products on fletcocarpets.com", entries.len());

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

    if let Some(hero) = &detail.hero_image {
        match fetcher.fetch_asset(&hero.url).await {
            Ok(asset) => {
                storage::save_asset(&dirs.images.join(&hero.filename), &asset.bytes)?;
                summary.assets += 1;
            }
            Err(e) => warn!("Failed to download image {}: {:#}", hero.url, e),
        }
    }

    if !detail.variants.is_empty() {
        let colours = dirs.colours()?;
        for variant in &detail.variants {
            match fetcher.fetch_asset(&variant.url).await {
                Ok(asset) => {
                    storage::save_asset(&colours.join(&variant.filename), &asset.bytes)?;
                    summary.assets += 1;
                }
                Err(e) => warn!("Failed to download swatch {}: {:#}", variant.url, e),
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
    storage::write_product_csv(&dirs.root, &record)?;
    summary.items += 1;

    Ok(summary)
}

/// One page of the shop's product feed. Only the impression block is
/// interesting; everything else is dropped during decoding.
#[derive(Debug, Deserialize)]
struct FeedPage {
    #[serde(rename = "ProductsContainer", default)]
    containers: Vec<FeedContainer>,
}

#[derive(Debug, Deserialize)]
struct FeedContainer {
    #[serde(rename = "Product", default)]
    products: Vec<FeedProduct>,
}

#[derive(Debug, Deserialize)]
struct FeedProduct {
    #[serde(rename = "googleImpression")]
    impression: FeedImpression,
}

#[derive(Debug, Deserialize)]
struct FeedImpression {
    name: String,
    url: String,
}

#[derive(Debug)]
struct ListingEntry {
    name: String,
    url: String,
}

fn feed_entries(feed: &[FeedPage]) -> Vec<ListingEntry> {
    let Some(page) = feed.first() else {
        return Vec::new();
    };

    page.containers
        .iter()
        .filter_map(|container| container.products.first())
        .map(|product| ListingEntry {
            name: product.impression.name.clone(),
            url: absolutize(BASE_URL, &product.impression.url),
        })
        .collect()
}

#[derive(Debug, Default)]
struct ProductDetail {
    hero_image: Option<ImageLink>,
    variants: Vec<ImageLink>,
    description: String,
    documents: Vec<String>,
}

#[derive(Debug, PartialEq)]
struct ImageLink {
    url: String,
    filename: String,
}

fn parse_detail(html: &str) -> ProductDetail {
    let document = Html::parse_document(html);
    let mut detail = ProductDetail::default();

    let hero_selector = Selector::parse(
        "div.page div.background-image.image-filter.image-filter--none.dw-mod img",
    )
    .unwrap();
    detail.hero_image = document
        .select(&hero_selector)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(|src| ImageLink {
            url: absolutize(BASE_URL, src),
            filename: last_url_segment(src).to_string(),
        });

    let grid_selector = Selector::parse("div.page div.grid.grid--align-content-start").unwrap();
    let Some(grid) = document.select(&grid_selector).next() else {
        return detail;
    };

    // Colour swatches. Wrappers without an image are placeholders.
    let variant_selector = Selector::parse("div.variant__wrapper").unwrap();
    let img_selector = Selector::parse("img").unwrap();
    let p_selector = Selector::parse("p").unwrap();
    for wrapper in grid.select(&variant_selector) {
        if let Some(img) = wrapper.select(&img_selector).next()
            && let Some(src) = img.value().attr("src")
        {
            let labels: Vec<String> = wrapper.select(&p_selector).map(element_text).collect();
            if labels.len() < 2 {
                continue;
            }
            let variant_name = &labels[0];
            let colour_name = &labels[1];
            let extension = src.rsplit('.').next().unwrap_or("jpg");

            detail.variants.push(ImageLink {
                url: absolutize(BASE_URL, src),
                filename: format!("{colour_name}-{variant_name}.{extension}"),
            });
        }
    }

    // Description paragraphs run until the first empty one.
    let desc_selector = Selector::parse("div.grid__col-md-12.u-margin-bottom p").unwrap();
    let mut description = String::new();
    for paragraph in grid.select(&desc_selector) {
        let raw: String = paragraph.text().collect();
        if raw.is_empty() {
            break;
        }
        description.push_str(raw.trim());
    }
    detail.description = description;

    // The document list is the last of the half-width columns.
    let column_selector =
        Selector::parse("div.grid__col-md-6.grid__col-sm-12.grid__col-xs-12").unwrap();
    let doc_selector = Selector::parse("a.product__document.dw-mod").unwrap();
    if let Some(column) = grid.select(&column_selector).last() {
        for anchor in column.select(&doc_selector) {
            if let Some(href) = anchor.value().attr("href") {
                detail.documents.push(absolutize(BASE_URL, href));
            }
        }
    }

    detail
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED_JSON: &str = r#"[
        {
            "ProductsContainer": [
                {"Product": [{"googleImpression": {"name": "Corda", "url": "/en/products/corda"}}]},
                {"Product": [{"googleImpression": {"name": "Avanti", "url": "/en/products/avanti"}}]}
            ]
        },
        {"ProductsContainer": []}
    ]"#;

    #[test]
    fn feed_decodes_first_page_entries() {
        let feed: Vec<FeedPage> = serde_json::from_str(FEED_JSON).unwrap();
        let entries = feed_entries(&feed);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Corda");
        assert_eq!(entries[0].url, "https://www.fletcocarpets.com/en/products/corda");
        assert_eq!(entries[1].name, "Avanti");
    }

    #[test]
    fn feed_without_pages_yields_nothing() {
        let entries = feed_entries(&[]);
        assert!(entries.is_empty());
    }

    const DETAIL_HTML: &str = r#"
        <html><body><div class="page">
        <div class="background-image image-filter image-filter--none dw-mod">
          <img src="/images/products/corda-room.jpg">
        </div>
        <div class="grid grid--align-content-start">
          <div class="variant__wrapper">
            <img src="/images/variants/corda-1010.png">
            <p>1010</p>
            <p>Sand</p>
          </div>
          <div class="variant__wrapper">
            <p>No swatch here</p>
          </div>
          <div class="variant__wrapper">
            <img src="/images/variants/corda-1020.png">
            <p>1020</p>
            <p>Graphite</p>
          </div>
          <div class="grid__col-md-12 u-margin-bottom">
            <p>A flat-woven carpet.</p>
            <p>Suited for contract use.</p>
            <p></p>
            <p>Ignored after the break.</p>
          </div>
          <div class="grid__col-md-6 grid__col-sm-12 grid__col-xs-12">
            <a class="product__document dw-mod" href="/files/wrong-column.pdf">Old</a>
          </div>
          <div class="grid__col-md-6 grid__col-sm-12 grid__col-xs-12">
            <a class="product__document dw-mod" href="/files/corda-datasheet.pdf">Datasheet</a>
            <a class="product__document dw-mod" href="/files/corda-care.pdf">Care</a>
          </div>
        </div>
        </div></body></html>"#;

    #[test]
    fn detail_extracts_hero_image() {
        let detail = parse_detail(DETAIL_HTML);
        assert_eq!(
            detail.hero_image,
            Some(ImageLink {
                url: "https://www.fletcocarpets.com/images/products/corda-room.jpg".to_string(),
                filename: "corda-room.jpg".to_string(),
            })
        );
    }

    #[test]
    fn detail_names_swatches_by_colour_and_variant() {
        let detail = parse_detail(DETAIL_HTML);

        assert_eq!(detail.variants.len(), 2);
        assert_eq!(detail.variants[0].filename, "Sand-1010.png");
        assert_eq!(
            detail.variants[0].url,
            "https://www.fletcocarpets.com/images/variants/corda-1010.png"
        );
        assert_eq!(detail.variants[1].filename, "Graphite-1020.png");
    }

    #[test]
    fn detail_description_stops_at_first_empty_paragraph() {
        let detail = parse_detail(DETAIL_HTML);
        assert_eq!(
            detail.description,
            "A flat-woven carpet.Suited for contract use."
        );
    }

    #[test]
    fn detail_documents_come_from_last_column() {
        let detail = parse_detail(DETAIL_HTML);
        assert_eq!(
            detail.documents,
            [
                "https://www.fletcocarpets.com/files/corda-datasheet.pdf",
                "https://www.fletcocarpets.com/files/corda-care.pdf"
            ]
        );
    }
}
