use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use auto_release::cli::{self, DeployOrchestrator, ReleaseOrchestrator};
use auto_release::config::{self, Config};
use auto_release::domain::changelog::extract_latest_notes;
use auto_release::git::{GitHubContext, GitHubHost};
use auto_release::ui;

#[derive(Parser)]
#[command(
    name = "auto-release",
    version,
    about = "Cut releases through the GitHub API without a local checkout"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(
        long,
        global = true,
        help = "Target repository as owner/name (defaults to GITHUB_REPOSITORY)"
    )]
    repository: Option<String>,

    #[arg(short, long, global = true, help = "Show debug diagnostics on stderr")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a release branch with the next version and open a pull request
    Release {
        #[arg(long, help = "Preview what would happen without making changes")]
        dry_run: bool,
    },
    /// Publish a release for the current version and open a merge-back pull request
    Deploy,
    /// Print the notes of the latest version in the changelog
    Notes {
        #[arg(long, help = "Changelog path (defaults to the configured changelog)")]
        path: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    ui::init_logging(args.verbose);

    let config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };
    let root = std::env::current_dir().context("cannot determine working directory")?;

    match args.command {
        Command::Notes { path } => print_notes(&config, &root, path),
        Command::Release { dry_run: true } => preview_release(&config, &root),
        Command::Release { dry_run: false } => {
            println!("Running auto-release...");
            let (host, _) = connect(&config, args.repository.as_deref())?;
            let outcome = ReleaseOrchestrator::new(&host, &config, root).run().await;
            if !outcome.is_done() {
                std::process::exit(1);
            }
            println!("\n\x1b[32m✓\x1b[0m Done!\n");
            Ok(())
        }
        Command::Deploy => {
            println!("Running deploy...");
            let (host, context) = connect(&config, args.repository.as_deref())?;
            let outcome = DeployOrchestrator::new(&host, &config, root, context.sha)
                .run()
                .await;
            if !outcome.is_done() {
                std::process::exit(1);
            }
            println!("\n\x1b[32m✓\x1b[0m Done!\n");
            Ok(())
        }
    }
}

fn connect(config: &Config, repository: Option<&str>) -> Result<(GitHubHost, GitHubContext)> {
    let context = GitHubContext::from_env(&config.github.token_env, repository)?;
    let host = GitHubHost::new(&config.github.api_url, &context)?;
    tracing::debug!(owner = %context.owner, repo = %context.repo, "connected");
    Ok((host, context))
}

fn print_notes(config: &Config, root: &Path, path: Option<String>) -> Result<()> {
    let path = path
        .map(PathBuf::from)
        .unwrap_or_else(|| config.files.changelog_path(root));
    let text = fs::read_to_string(&path)
        .with_context(|| format!("cannot read changelog {}", path.display()))?;
    print!("{}", extract_latest_notes(&text));
    Ok(())
}

fn preview_release(config: &Config, root: &Path) -> Result<()> {
    let report = match cli::dry_run(config, root) {
        Ok(report) => report,
        Err(e) => {
            ui::display_error(&format!("Dry run failed: {}", e));
            std::process::exit(1);
        }
    };

    ui::display_version_change(&report.plan.current.to_string(), &report.plan.next.to_string());
    ui::display_plan(&report.steps);
    ui::display_release_notes(&report.notes);
    Ok(())
}
