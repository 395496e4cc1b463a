use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use tracing::{error, info};

use crate::database::Database;
use crate::fetch::PageFetcher;
use crate::models::ScrapeSummary;
use crate::scrapers::{
    BolonScraper, FletcoScraper, LanoScraper, TapibelScraper, VisidarbiScraper,
};
use crate::traits::SiteScraper;

/// Sites known to the harvester, in default run order.
pub const SITE_NAMES: [&str; 5] = ["bolon", "fletco", "lano", "tapibel", "visidarbi"];

#[derive(Clone)]
pub struct Harvester {
    fetcher: PageFetcher,
    database: Database,
    out_root: PathBuf,
}

impl Harvester {
    pub async fn new() -> Result<Self> {
        let out_root = std::env::var("OUTPUT_DIR").unwrap_or_else(|_| "output".to_string());
        let db_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:data/job_listings.db".to_string());

        let fetcher = PageFetcher::new()?;
        let database = Database::new(&db_url).await?;

        Ok(Self {
            fetcher,
            database,
            out_root: PathBuf::from(out_root),
        })
    }

    fn scraper_for(&self, site: &str) -> Option<Box<dyn SiteScraper>> {
        match site {
            "bolon" => Some(Box::new(BolonScraper::new())),
            "fletco" => Some(Box::new(FletcoScraper::new())),
            "lano" => Some(Box::new(LanoScraper::new())),
            "tapibel" => Some(Box::new(TapibelScraper::new())),
            "visidarbi" => Some(Box::new(VisidarbiScraper::new(self.database.clone()))),
            _ => None,
        }
    }

    /// Run the named sites in order. A failing site is logged and the
    /// remaining sites still run.
    pub async fn run_sites(&self, sites: &[String]) -> Result<()> {
        let started = Instant::now();
        let mut total = ScrapeSummary::default();

        for site in sites {
            let Some(scraper) = self.scraper_for(site) else {
                anyhow::bail!(
                    "unknown site '{}', expected one of: {}",
                    site,
                    SITE_NAMES.join(", ")
                );
            };

            info!("Scraping {} ({})", site, scraper.base_url());
            match scraper.run(&self.fetcher, &self.out_root).await {
                Ok(summary) => {
                    info!(
                        "{}: {} items, {} assets",
                        site, summary.items, summary.assets
                    );
                    total.merge(summary);
                }
                Err(e) => error!("Scrape of {} failed: {:#}", site, e),
            }
        }

        info!(
            "Run finished in {:.1?}: {} items, {} assets",
            started.elapsed(),
            total.items,
            total.assets
        );
        Ok(())
    }

    /// The job board is the only site worth re-polling on a schedule;
    /// the product catalogs barely change.
    pub async fn refresh_job_board(&self) -> Result<()> {
        self.run_sites(&["visidarbi".to_string()]).await
    }
}
