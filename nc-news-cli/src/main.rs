use clap::{Parser, Subcommand};
use colored::Colorize;

mod commands;
mod utils;

use commands::db::DbCommands;
use commands::setup::SetupCommands;

/// ncnews - database and setup tooling for the nc-news API
#[derive(Parser)]
#[command(name = "ncnews")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database schema and seed data
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Setup and configuration commands
    Setup {
        #[command(subcommand)]
        command: SetupCommands,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Db { command } => commands::db::execute(command).await,
        Commands::Setup { command } => commands::setup::execute(command).await,
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);

            if let Some(source) = e.source() {
                eprintln!("\n{} {}", "Caused by:".yellow(), source);
            }

            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_db_seed_with_data_dir() {
        let cli = Cli::try_parse_from(["ncnews", "db", "seed", "--data-dir", "data/dev"]).unwrap();
        match cli.command {
            Commands::Db {
                command: DbCommands::Seed { data_dir, .. },
            } => assert_eq!(data_dir.unwrap().to_str(), Some("data/dev")),
            _ => panic!("expected db seed"),
        }
    }

    #[test]
    fn test_parse_db_reset_with_url() {
        let cli = Cli::try_parse_from([
            "ncnews",
            "db",
            "reset",
            "--database-url",
            "postgres://localhost/nc_news_test",
        ])
        .unwrap();
        match cli.command {
            Commands::Db {
                command: DbCommands::Reset { connection },
            } => assert_eq!(
                connection.database_url.as_deref(),
                Some("postgres://localhost/nc_news_test")
            ),
            _ => panic!("expected db reset"),
        }
    }

    #[test]
    fn test_unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["ncnews", "db", "migrate"]).is_err());
    }
}
