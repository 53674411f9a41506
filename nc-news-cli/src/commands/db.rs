use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use nc_news::config::Config;
use nc_news::database::create_pool;
use nc_news::error::sanitize_url;
use nc_news::seed::{self, SeedData};
use std::path::PathBuf;

use crate::utils;

#[derive(Subcommand)]
pub enum DbCommands {
    /// Recreate the schema and load seed data
    Seed {
        /// Directory holding topics.json, users.json, articles.json and comments.json
        /// (the embedded test data set if omitted)
        #[arg(long, value_name = "DIR")]
        data_dir: Option<PathBuf>,

        #[command(flatten)]
        connection: ConnectionArgs,
    },
    /// Drop every table and recreate the empty schema
    Reset {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
}

#[derive(Args)]
pub struct ConnectionArgs {
    /// Database URL (overrides configuration files)
    #[arg(long, env = "DATABASE_URL", value_name = "URL")]
    pub database_url: Option<String>,
}

impl ConnectionArgs {
    fn config(&self) -> Result<Config> {
        let mut config = Config::load().context("Failed to load configuration")?;
        if let Some(ref url) = self.database_url {
            config.database.url = url.clone();
        }
        Ok(config)
    }
}

pub async fn execute(command: DbCommands) -> Result<()> {
    match command {
        DbCommands::Seed {
            data_dir,
            connection,
        } => seed_database(data_dir, &connection).await,
        DbCommands::Reset { connection } => reset_database(&connection).await,
    }
}

async fn seed_database(data_dir: Option<PathBuf>, connection: &ConnectionArgs) -> Result<()> {
    let data = match data_dir {
        Some(ref dir) => SeedData::from_dir(dir)
            .with_context(|| format!("Failed to load seed data from {}", dir.display()))?,
        None => SeedData::test().context("Embedded test data is invalid")?,
    };

    let config = connection.config()?;
    let pb = utils::spinner(&format!(
        "Seeding {}",
        sanitize_url(config.database_url())
    ))?;

    let pool = create_pool(&config.database)
        .await
        .context("Failed to connect to the database")?;
    let result = seed::seed(&pool, &data).await;
    pool.close().await;

    pb.finish_and_clear();
    result.context("Seeding failed")?;

    utils::success("Database seeded");
    println!(
        "  {} topics, {} users, {} articles, {} comments",
        data.topics.len().to_string().cyan(),
        data.users.len().to_string().cyan(),
        data.articles.len().to_string().cyan(),
        data.comments.len().to_string().cyan()
    );
    if data_dir.is_none() {
        utils::info("Loaded the embedded test data set");
    }
    Ok(())
}

async fn reset_database(connection: &ConnectionArgs) -> Result<()> {
    let config = connection.config()?;
    let pb = utils::spinner(&format!(
        "Resetting {}",
        sanitize_url(config.database_url())
    ))?;

    let pool = create_pool(&config.database)
        .await
        .context("Failed to connect to the database")?;
    let result = seed::reset_schema(&pool).await;
    pool.close().await;

    pb.finish_and_clear();
    result.context("Schema reset failed")?;

    utils::success("Schema recreated; all tables are empty");
    Ok(())
}
