use anyhow::{Context, Result};
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::{utils, Cli};

const BIN_NAME: &str = "ncnews";

#[derive(Subcommand)]
pub enum SetupCommands {
    /// Generate and install shell completions
    Completions {
        /// Shell to generate completions for (auto-detected from $SHELL if not specified)
        #[arg(short, long, value_name = "SHELL")]
        shell: Option<Shell>,

        /// Output to stdout instead of installing
        #[arg(long)]
        stdout: bool,
    },
}

pub async fn execute(command: SetupCommands) -> Result<()> {
    match command {
        SetupCommands::Completions { shell, stdout } => {
            let shell = match shell {
                Some(s) => s,
                None => Shell::from_env().context(
                    "Failed to detect shell from $SHELL. Use --shell to specify explicitly.",
                )?,
            };
            if stdout {
                generate(shell, &mut Cli::command(), BIN_NAME, &mut io::stdout());
                Ok(())
            } else {
                let home = dirs::home_dir().context("Failed to find home directory")?;
                install(shell, &home)
            }
        }
    }
}

/// Where a shell looks for completion scripts, and what the user must add to load them
struct CompletionTarget {
    dir: PathBuf,
    filename: String,
    setup: &'static [&'static str],
}

fn target(shell: Shell, home: &Path) -> Result<CompletionTarget> {
    let (dir, filename, setup): (&str, String, &'static [&'static str]) = match shell {
        Shell::Bash => (
            ".local/share/bash-completion/completions",
            BIN_NAME.to_string(),
            &[],
        ),
        Shell::Zsh => (
            ".zfunc",
            format!("_{BIN_NAME}"),
            &[
                "Add to ~/.zshrc:",
                "  fpath=(~/.zfunc $fpath)",
                "  autoload -Uz compinit && compinit",
            ],
        ),
        Shell::Fish => (".config/fish/completions", format!("{BIN_NAME}.fish"), &[]),
        Shell::PowerShell => (
            "Documents/PowerShell/Completions",
            format!("{BIN_NAME}.ps1"),
            &["Dot-source the script from your PowerShell profile ($PROFILE)"],
        ),
        Shell::Elvish => (
            ".config/elvish/lib",
            format!("{BIN_NAME}.elv"),
            &["Add `use ncnews` to ~/.config/elvish/rc.elv"],
        ),
        other => anyhow::bail!("Unsupported shell: {:?}", other),
    };
    Ok(CompletionTarget {
        dir: home.join(dir),
        filename,
        setup,
    })
}

fn install(shell: Shell, home: &Path) -> Result<()> {
    let target = target(shell, home)?;

    fs::create_dir_all(&target.dir)
        .with_context(|| format!("Failed to create directory: {}", target.dir.display()))?;

    let path = target.dir.join(&target.filename);
    let mut file = fs::File::create(&path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    generate(shell, &mut Cli::command(), BIN_NAME, &mut file);

    utils::success(&format!(
        "Completions installed for {}",
        format!("{:?}", shell).cyan()
    ));
    println!("  {}", path.to_string_lossy().dimmed());

    if target.setup.is_empty() {
        println!("\nCompletions load automatically on next shell start.");
    } else {
        println!("\n{}", "Required setup:".yellow().bold());
        for line in target.setup {
            println!("  {}", line);
        }
    }
    Ok(())
}
