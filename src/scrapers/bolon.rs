//! Scraper for the bolon.com flooring catalog
//!
//! Walks the floors listing, then for every product collects the
//! description, the availability sections (rolls, tiles, acoustic
//! tiles, studio), the slideshow images and the documentation links.
//! Shared guides (installation, cleaning, specification sheets) are
//! downloaded once into site-wide folders; textures and image archives
//! land in the product's own `doc_files/`.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};

use crate::fetch::{PAGE_DELAY, PageFetcher};
use crate::models::{ProductRecord, ScrapeSummary};
use crate::storage::{self, ProductDirs, dir_is_empty};
use crate::traits::{SiteScraper, absolutize};

use super::element_text;

const BASE_URL: &str = "https://www.bolon.com";
const LISTING_URL: &str = "https://www.bolon.com/en/products/floors";

/// Fallback when the server sends no usable Content-Disposition name.
const DEFAULT_DOC_NAME: &str = "file_1.pdf";

pub struct BolonScraper;

impl BolonScraper {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SiteScraper for BolonScraper {
    fn name(&self) -> &'static str {
        "bolon"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    async fn run(&self, fetcher: &PageFetcher, out_root: &Path) -> Result<ScrapeSummary> {
        let listing_html = fetcher.get_html(LISTING_URL).await?;
        let entries = parse_listing(&listing_html);
        info!("Found {} products on bolon.com", entries.len());

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

    for image in &detail.images {
        match fetcher.fetch_asset(&image.url).await {
            Ok(asset) => {
                storage::save_asset(&dirs.images.join(&image.filename), &asset.bytes)?;
                summary.assets += 1;
            }
            Err(e) => warn!("Failed to download image {}: {:#}", image.url, e),
        }
    }

    for document in &detail.documents {
        summary.assets += download_document(fetcher, site_root, &dirs, document).await?;
    }

    let mut record = ProductRecord::new(&entry.name);
    record.push("desc", detail.description.unwrap_or_default());
    for (label, text) in &detail.sections {
        record.push(label.as_str(), text.as_str());
    }
    record.push(
        "Product documentation & files",
        document_index(&detail.documents),
    );

    storage::write_product_csv(&dirs.root, &record)?;
    summary.items += 1;

    Ok(summary)
}

/// Route one documentation link by its literal label. Returns how many
/// files were saved.
async fn download_document(
    fetcher: &PageFetcher,
    site_root: &Path,
    dirs: &ProductDirs,
    document: &DocumentLink,
) -> Result<usize> {
    match document.label.trim() {
        "Installation Guide" => {
            download_guide_page(
                fetcher,
                &site_root.join("Installation_Guide"),
                &document.url,
                AssetScope::WholePage,
            )
            .await
        }
        "Cleaning Guide" => {
            download_guide_page(
                fetcher,
                &site_root.join("Cleaning_Guide"),
                &document.url,
                AssetScope::DownloadsOverlay,
            )
            .await
        }
        "Product Specification" => {
            download_shared_file(fetcher, &site_root.join("Product_Specification"), document).await
        }
        "Declaration of Performance" => {
            download_shared_file(
                fetcher,
                &site_root.join("Declaration_of_Performance"),
                document,
            )
            .await
        }
        "Light Reflectance Value" => {
            download_shared_file(
                fetcher,
                &site_root.join("Light_Reflectance_Value"),
                document,
            )
            .await
        }
        "Texture" | "High resolution images (.zip)" => {
            download_into(fetcher, &dirs.docs, document).await
        }
        _ => Ok(0),
    }
}

/// The installation and cleaning guides sit behind an intermediate page
/// listing the actual files. The guides are identical for every
/// product, so the folder is filled once and skipped afterwards.
async fn download_guide_page(
    fetcher: &PageFetcher,
    folder: &Path,
    url: &str,
    scope: AssetScope,
) -> Result<usize> {
    if !dir_is_empty(folder) {
        return Ok(0);
    }

    let html = match fetcher.get_html(url).await {
        Ok(html) => html,
        Err(e) => {
            warn!("Failed to fetch guide page {}: {:#}", url, e);
            return Ok(0);
        }
    };

    let mut saved = 0;
    for link in parse_asset_links(&html, scope) {
        match fetcher.fetch_asset(&link).await {
            Ok(asset) => {
                let filename = asset.filename.as_deref().unwrap_or(DEFAULT_DOC_NAME);
                storage::save_asset(&folder.join(filename), &asset.bytes)?;
                saved += 1;
            }
            Err(e) => warn!("Failed to download file {}: {:#}", link, e),
        }
    }

    Ok(saved)
}

/// Direct download into a site-wide once-only folder.
async fn download_shared_file(
    fetcher: &PageFetcher,
    folder: &Path,
    document: &DocumentLink,
) -> Result<usize> {
    if !dir_is_empty(folder) {
        return Ok(0);
    }
    download_into(fetcher, folder, document).await
}

async fn download_into(
    fetcher: &PageFetcher,
    folder: &Path,
    document: &DocumentLink,
) -> Result<usize> {
    match fetcher.fetch_asset(&document.url).await {
        Ok(asset) => {
            let filename = asset.filename.as_deref().unwrap_or(DEFAULT_DOC_NAME);
            storage::save_asset(&folder.join(filename), &asset.bytes)?;
            Ok(1)
        }
        Err(e) => {
            warn!("Failed to download file {}: {:#}", document.url, e);
            Ok(0)
        }
    }
}

#[derive(Debug)]
struct ListingEntry {
    name: String,
    url: String,
}

#[derive(Debug, Default)]
struct ProductDetail {
    description: Option<String>,
    /// Rendered availability sections, in page order.
    sections: Vec<(String, String)>,
    images: Vec<ImageLink>,
    documents: Vec<DocumentLink>,
}

#[derive(Debug)]
struct ImageLink {
    url: String,
    filename: String,
}

#[derive(Debug, PartialEq)]
struct DocumentLink {
    label: String,
    url: String,
}

#[derive(Debug, Clone, Copy)]
enum AssetScope {
    /// Every anchor on the page (installation guide layout).
    WholePage,
    /// Only anchors inside the downloads overlay (cleaning guide layout).
    DownloadsOverlay,
}

fn parse_listing(html: &str) -> Vec<ListingEntry> {
    let document = Html::parse_document(html);
    let item_selector = Selector::parse("ul.product-list.columns li.product-list__item").unwrap();
    let title_selector = Selector::parse("h4.product-list__item-title").unwrap();
    let link_selector = Selector::parse("a").unwrap();

    let mut entries = Vec::new();
    for item in document.select(&item_selector) {
        if let Some(link) = item.select(&link_selector).next()
            && let Some(href) = link.value().attr("href")
            && let Some(title) = item.select(&title_selector).next()
        {
            entries.push(ListingEntry {
                name: element_text(title),
                url: absolutize(BASE_URL, href),
            });
        }
    }

    entries
}

fn parse_detail(html: &str) -> ProductDetail {
    let document = Html::parse_document(html);
    let mut detail = ProductDetail::default();

    let desc_selector = Selector::parse("div.row.show-for-medium-up p.paragraphed-gen5").unwrap();
    detail.description = document.select(&desc_selector).next().map(element_text);

    // The availability sections live in the second full-width column of
    // the baseline-offset row.
    let column_selector =
        Selector::parse("div.row.baseline-offset--1 div.small-12.columns").unwrap();
    if let Some(column) = document.select(&column_selector).nth(1) {
        for (id, label, with_list) in [
            ("#b-rolls", "Rolls", false),
            ("#b-tiles", "Tiles", false),
            ("#b-acoustictiles", "Acoustictiles", true),
        ] {
            let section_selector = Selector::parse(id).unwrap();
            if let Some(section) = column.select(&section_selector).next() {
                detail
                    .sections
                    .push((label.to_string(), render_table_section(section, with_list)));
            }
        }

        let studio_selector = Selector::parse("#b-studio").unwrap();
        if let Some(section) = column.select(&studio_selector).next() {
            detail
                .sections
                .push(("Studio".to_string(), render_studio_section(section)));
        }
    }

    let image_selector = Selector::parse(
        "section.product-slideshow ul.product-slideshow__thumbs.small-block-grid-2 img",
    )
    .unwrap();
    for img in document.select(&image_selector) {
        if let Some(src) = img.value().attr("src") {
            detail.images.push(ImageLink {
                url: absolutize(BASE_URL, src),
                filename: image_filename(src),
            });
        }
    }

    // Documentation rows sit in the fourth section of the page.
    let section_selector = Selector::parse("section").unwrap();
    let row_selector =
        Selector::parse("div.row.baseline-offset--0-5.baseline-offset-bottom--0-5").unwrap();
    let anchor_selector = Selector::parse("a").unwrap();
    if let Some(doc_section) = document.select(&section_selector).nth(3) {
        for row in doc_section.select(&row_selector) {
            if let Some(anchor) = row.select(&anchor_selector).next() {
                // Some rows point at the file through data-url instead
                // of the href.
                let url = anchor
                    .value()
                    .attr("data-url")
                    .or_else(|| anchor.value().attr("href"));
                if let Some(url) = url {
                    detail.documents.push(DocumentLink {
                        label: element_text(anchor),
                        url: absolutize(BASE_URL, url),
                    });
                }
            }
        }
    }

    detail
}

/// Render a rolls/tiles table section: leading paragraph, then one
/// `header: value` line per table row. The acoustic tiles variant
/// appends its bullet list to the paragraph.
fn render_table_section(section: ElementRef, append_list_items: bool) -> String {
    let p_selector = Selector::parse("p").unwrap();
    let row_selector = Selector::parse("tr").unwrap();
    let header_selector = Selector::parse("td.product-types__info__item__table__header").unwrap();
    let value_selector = Selector::parse("td.product-types__info__item__table__value").unwrap();

    let mut desc = section
        .select(&p_selector)
        .next()
        .map(element_text)
        .unwrap_or_default();

    if append_list_items {
        let item_selector = Selector::parse("ul li").unwrap();
        let items: Vec<String> = section.select(&item_selector).map(element_text).collect();
        desc.push_str(&items.join(", "));
    }

    let mut lines = vec![desc];
    for row in section.select(&row_selector) {
        if let Some(header) = row.select(&header_selector).next()
            && let Some(value) = row.select(&value_selector).next()
        {
            lines.push(format!("{}: {}", element_text(header), element_text(value)));
        }
    }

    lines.join("\n")
}

/// The studio section has no table: first paragraph, remaining
/// paragraphs appended comma-separated.
fn render_studio_section(section: ElementRef) -> String {
    let p_selector = Selector::parse("p.paragraphed-gen5").unwrap();
    let mut paragraphs = section.select(&p_selector).map(element_text);

    let mut desc = paragraphs.next().unwrap_or_default();
    let rest: Vec<String> = paragraphs.collect();
    desc.push_str(&rest.join(", "));
    desc
}

/// Local image name: the part of the src after the `cover-` (or
/// `contain-`) crop marker, with path separators flattened.
fn image_filename(src: &str) -> String {
    let tail = if src.contains("cover-") {
        src.rsplit("cover-").next().unwrap_or(src)
    } else {
        src.rsplit("contain-").next().unwrap_or(src)
    };
    tail.replace('/', "-")
}

/// Anchors on a guide page whose href points at an asset.
fn parse_asset_links(html: &str, scope: AssetScope) -> Vec<String> {
    let document = Html::parse_document(html);
    let anchor_selector = Selector::parse("a[href]").unwrap();

    let anchors: Vec<ElementRef> = match scope {
        AssetScope::WholePage => document.select(&anchor_selector).collect(),
        AssetScope::DownloadsOverlay => {
            let overlay_selector = Selector::parse("div.downloads-overlay").unwrap();
            document
                .select(&overlay_selector)
                .next()
                .map(|overlay| overlay.select(&anchor_selector).collect())
                .unwrap_or_default()
        }
    };

    anchors
        .iter()
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter(|href| href.contains("asset"))
        .map(|href| absolutize(BASE_URL, href))
        .collect()
}

/// The CSV documentation column: every label except the CAD/BIM entry,
/// joined the way the site renders its download list.
fn document_index(documents: &[DocumentLink]) -> String {
    let mut index = documents
        .iter()
        .filter(|doc| !doc.label.contains("BIM"))
        .map(|doc| doc.label.as_str())
        .collect::<Vec<_>>()
        .join(": \n");
    index.push(':');
    index
}
