//! Runs pending SQLx migrations against the database.
//!
//! Migrations are embedded at compile time. Used as a deploy step before
//! starting the relay.

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    println!("Running database migrations...");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await?;

    eventlog_store::run_migrations(&pool).await?;

    println!("Migrations completed successfully.");

    Ok(())
}
