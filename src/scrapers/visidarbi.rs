//! Scraper for the visidarbi.lv job board
//!
//! Walks the first five result pages and stores one row per vacancy in
//! the local SQLite table. Every field except the position title is
//! optional on the listing markup. Rows already stored in a previous
//! run are recognised by their content id and skipped.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use tracing::info;

use crate::database::Database;
use crate::fetch::{PAGE_DELAY, PageFetcher};
use crate::models::{JobListing, ScrapeSummary};
use crate::traits::SiteScraper;

use super::element_text;

const BASE_URL: &str = "https://www.visidarbi.lv";
const PAGE_COUNT: u32 = 5;

pub struct VisidarbiScraper {
    database: Database,
}

impl VisidarbiScraper {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl SiteScraper for VisidarbiScraper {
    fn name(&self) -> &'static str {
        "visidarbi"
    }

    fn base_url(&self) -> &'static str {
        BASE_URL
    }

    async fn run(&self, fetcher: &PageFetcher, _out_root: &Path) -> Result<ScrapeSummary> {
        let mut seen = self.database.existing_job_ids().await?;
        let mut summary = ScrapeSummary::default();

        for page in 1..=PAGE_COUNT {
            let url = format!("{BASE_URL}/darba-sludinajumi?page={page}#results");
            let html = fetcher.get_html(&url).await?;
            let jobs = parse_jobs(&html, Utc::now());
            info!("Page {}: {} job listings", page, jobs.len());

            for job in jobs {
                // Also catches a vacancy repeated across pages.
                if !seen.insert(job.id.clone()) {
                    continue;
                }
                self.database.save_job(&job).await?;
                summary.items += 1;
            }

            tokio::time::sleep(PAGE_DELAY).await;
        }

        info!("Stored {} new job listings", summary.items);
        Ok(summary)
    }
}

fn parse_jobs(html: &str, scraped_at: DateTime<Utc>) -> Vec<JobListing> {
    let document = Html::parse_document(html);
    let box_selector = Selector::parse("div.item.premium.big-item").unwrap();
    let title_selector = Selector::parse("a.long-title").unwrap();
    let location_selector = Selector::parse("li.location").unwrap();
    let added_selector = Selector::parse("li.added").unwrap();
    let salary_selector = Selector::parse("li.salary").unwrap();
    let company_selector = Selector::parse("li.company").unwrap();
    let due_selector = Selector::parse("li.duedate").unwrap();
    let source_selector = Selector::parse("li.source").unwrap();

    let mut jobs = Vec::new();
    for job_box in document.select(&box_selector) {
        // A box without a title link is an ad slot, not a vacancy.
        let Some(title) = job_box.select(&title_selector).next().map(element_text) else {
            continue;
        };

        let field = |selector: &Selector| job_box.select(selector).next().map(element_text);

        let location = field(&location_selector);
        let added = field(&added_selector);
        let salary = field(&salary_selector);
        let company = field(&company_selector);
        let due_date = field(&due_selector);
        let source = field(&source_selector);

        let id = listing_id(
            &title,
            company.as_deref(),
            location.as_deref(),
            due_date.as_deref(),
            source.as_deref(),
        );

        jobs.push(JobListing {
            id,
            title,
            location,
            added,
            salary,
            company,
            due_date,
            source,
            scraped_at,
        });
    }

    jobs
}

/// Stable id over the fields that identify a vacancy. The relative
/// "added" age and the scrape timestamp change between runs and are
/// left out so re-runs map to the same id.
fn listing_id(
    title: &str,
    company: Option<&str>,
    location: Option<&str>,
    due_date: Option<&str>,
    source: Option<&str>,
) -> String {
    let key = format!(
        "{}|{}|{}|{}|{}",
        title,
        company.unwrap_or_default(),
        location.unwrap_or_default(),
        due_date.unwrap_or_default(),
        source.unwrap_or_default()
    );
    format!("{:x}", md5::compute(key))
}
