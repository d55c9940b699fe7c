use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use auto_release::config::{self, Config};
use auto_release::domain::ReleaseIntent;
use auto_release::git::{Git2TagRepository, TagRepository};
use auto_release::orchestrator::{ReleaseOptions, ReleaseOrchestrator, ReleaseOutputs};
use auto_release::release::GitHubReleaseRepository;
use auto_release::ui;

#[derive(clap::Parser)]
#[command(
    name = "auto-release",
    version,
    about = "Tag, publish and track semantic-version releases"
)]
struct Args {
    #[arg(
        long,
        required_unless_present = "latest",
        help = "Release type: major, minor, patch or none"
    )]
    release_type: Option<String>,

    #[arg(long, help = "Publish as a prerelease")]
    prerelease: bool,

    #[arg(long, help = "Prerelease identifier (default from config: beta)")]
    prerelease_suffix: Option<String>,

    #[arg(long, help = "Starting prerelease number (default from config: 1)")]
    prerelease_number: Option<u64>,

    #[arg(long, conflicts_with = "notes_file", help = "Release notes text")]
    notes: Option<String>,

    #[arg(long, help = "Read release notes from a file")]
    notes_file: Option<PathBuf>,

    #[arg(long, help = "Do not update the major version tag and release")]
    no_major_tag: bool,

    #[arg(long, help = "Do not copy assets onto the major release")]
    no_copy_assets: bool,

    #[arg(long, default_value = ".", help = "Repository directory")]
    repo_dir: PathBuf,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(long, help = "Resolve the next version without changing anything")]
    dry_run: bool,

    #[arg(short, long, help = "Skip confirmation prompts")]
    yes: bool,

    #[arg(long, env = "GITHUB_OUTPUT", help = "Append outputs to this file")]
    github_output: Option<PathBuf>,

    #[arg(long, help = "Print outputs as JSON")]
    json: bool,

    #[arg(long, help = "Print the latest released version and exit")]
    latest: bool,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let intent = match ReleaseIntent::parse(
        args.release_type.as_deref().unwrap_or("none"),
        args.prerelease,
    ) {
        Ok(intent) => intent,
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };

    if !intent.is_release() && !args.latest {
        let outputs = ReleaseOutputs {
            released: false,
            release_type: Some(intent.release_type.to_string()),
            is_prerelease: Some(intent.prerelease),
            ..ReleaseOutputs::default()
        };
        if !args.json {
            ui::display_status("Release type is 'none', nothing to release");
        }
        return emit_outputs(&outputs, &args);
    }

    let config = match config::load_config(args.config.as_deref(), &args.repo_dir) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };

    let tags = match open_tag_repository(&args.repo_dir, &config) {
        Ok(repo) => repo,
        Err(e) => {
            ui::display_error(&format!("Git repository error: {}", e));
            std::process::exit(1);
        }
    };

    let releases = match open_release_repository(&config, args.dry_run || args.latest) {
        Ok(repo) => repo,
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };

    let mut options = release_options(&config, &args)?;

    if args.latest {
        if let Err(e) = tags.fetch_remote_tags() {
            tracing::warn!(error = %e, "could not fetch remote tags");
        }
        let orchestrator = ReleaseOrchestrator::new(&tags, &releases, options);
        println!("{}", orchestrator.resolve_latest_version()?);
        return Ok(());
    }

    if !args.yes && !args.dry_run && std::io::stdin().is_terminal() {
        let planner = ReleaseOrchestrator::new(&tags, &releases, options.clone());
        let (latest, next) = planner.preview(&intent)?;
        ui::display_proposed_version(&latest.to_string(), &next.to_string());

        if !ui::confirm_action("Create and publish this release?")? {
            println!("Release cancelled by user.");
            return Ok(());
        }
        // Tags may still move on the remote before the run fetches again
        options.expected_version = Some(next);
    }

    let orchestrator = ReleaseOrchestrator::new(&tags, &releases, options);
    match orchestrator.run(&intent) {
        Ok(outcome) => {
            if args.json {
                outcome.warnings.iter().for_each(ui::display_warning);
            } else {
                ui::display_outcome(&outcome);
            }
            emit_outputs(&outcome.outputs, &args)
        }
        Err(failure) => {
            ui::display_failure(&failure);
            if let Err(e) = emit_outputs(&failure.outputs, &args) {
                ui::display_error(&format!("Could not write outputs: {}", e));
            }
            std::process::exit(1);
        }
    }
}

fn open_tag_repository(repo_dir: &Path, config: &Config) -> auto_release::Result<Git2TagRepository> {
    let repo = Git2TagRepository::open(repo_dir, config.git.remote.clone())?;
    Ok(match config.github.resolve_token() {
        Ok(token) => repo.with_token(token),
        Err(_) => repo,
    })
}

/// Release API client; credentials are optional when nothing will be published
fn open_release_repository(
    config: &Config,
    read_only: bool,
) -> auto_release::Result<GitHubReleaseRepository> {
    let (repository, token) = if read_only {
        (
            config.github.resolve_repository().unwrap_or_default(),
            config.github.resolve_token().unwrap_or_default(),
        )
    } else {
        (
            config.github.resolve_repository()?,
            config.github.resolve_token()?,
        )
    };

    Ok(GitHubReleaseRepository::new(
        config.github.api_url.clone(),
        repository,
        token,
        config.github.timeout(),
    )
    .with_retry_policy(config.github.retry_policy()))
}

fn release_options(config: &Config, args: &Args) -> Result<ReleaseOptions> {
    let mut options = ReleaseOptions::from_config(config);

    if let Some(suffix) = &args.prerelease_suffix {
        options.prerelease_suffix = suffix.clone();
    }
    if let Some(number) = args.prerelease_number {
        options.prerelease_number = number;
    }
    options.major_tag &= !args.no_major_tag;
    options.copy_assets &= !args.no_copy_assets;
    options.dry_run = args.dry_run;

    options.notes = match (&args.notes, &args.notes_file) {
        (Some(text), _) => Some(text.clone()),
        (None, Some(path)) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read notes file {}", path.display()))?,
        ),
        (None, None) => None,
    };

    Ok(options)
}

fn emit_outputs(outputs: &ReleaseOutputs, args: &Args) -> Result<()> {
    if let Some(path) = &args.github_output {
        outputs
            .append_to(path)
            .with_context(|| format!("failed to write outputs to {}", path.display()))?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(outputs)?);
    }

    Ok(())
}
