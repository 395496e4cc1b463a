use anyhow::Result;
use sqlx::{Row, Sqlite, SqlitePool, migrate::MigrateDatabase};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

use crate::models::JobListing;

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(db_url: &str) -> Result<Self> {
        // SQLite will not create intermediate directories itself
        if let Some(path) = db_url.strip_prefix("sqlite:")
            && let Some(parent) = Path::new(path).parent()
        {
            std::fs::create_dir_all(parent)?;
        }

        if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            info!("Creating database file");
            Sqlite::create_database(db_url).await?;
        }

        let pool = SqlitePool::connect(db_url).await?;

        info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;

        info!("Database initialized successfully");
        Ok(Self { pool })
    }

    pub async fn existing_job_ids(&self) -> Result<HashSet<String>> {
        let rows = sqlx::query("SELECT id FROM job_listings")
            .fetch_all(&self.pool)
            .await?;

        let ids = rows
            .into_iter()
            .map(|row| row.get::<String, _>("id"))
            .collect();

        Ok(ids)
    }

    pub async fn save_job(&self, job: &JobListing) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO job_listings (id, title, location, added, salary, company, due_date, source, scraped_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&job.id)
        .bind(&job.title)
        .bind(&job.location)
        .bind(&job.added)
        .bind(&job.salary)
        .bind(&job.company)
        .bind(&job.due_date)
        .bind(&job.source)
        .bind(job.scraped_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
        }
    }
}
