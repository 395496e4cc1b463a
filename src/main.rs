use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

mod database;
mod fetch;
mod harvester;
mod models;
mod scrapers;
mod storage;
mod traits;

use harvester::{Harvester, SITE_NAMES};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let mut watch = false;
    let mut sites: Vec<String> = Vec::new();
    for arg in std::env::args().skip(1) {
        if arg == "--watch" {
            watch = true;
        } else if SITE_NAMES.contains(&arg.as_str()) {
            sites.push(arg);
        } else {
            anyhow::bail!(
                "unknown site '{}', expected one of: {}",
                arg,
                SITE_NAMES.join(", ")
            );
        }
    }
    if sites.is_empty() {
        sites = SITE_NAMES.iter().map(|site| site.to_string()).collect();
    }

    info!("Starting listing harvester for: {}", sites.join(", "));

    let harvester = Harvester::new().await?;

    // Full run up front; per-site failures are logged inside.
    harvester.run_sites(&sites).await?;

    if !watch {
        return Ok(());
    }

    // Set up scheduler to re-poll the job board every 30 minutes
    let sched = JobScheduler::new().await?;

    let job_harvester = harvester.clone();
    sched
        .add(Job::new_async("0 */30 * * * *", move |_uuid, _l| {
            let harvester = job_harvester.clone();
            Box::pin(async move {
                if let Err(e) = harvester.refresh_job_board().await {
                    error!("Error refreshing job listings: {}", e);
                }
            })
        })?)
        .await?;

    info!("Scheduler started - refreshing job listings every 30 minutes");
    sched.start().await?;

    // Keep the program running
    loop {
        tokio::time::sleep(tokio::time::Duration::from_secs(30)).await;
    }
}
