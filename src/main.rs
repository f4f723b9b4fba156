use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};

use release_manager::cli::{self, orchestration, DeployArgs};
use release_manager::config::{self, Config};
use release_manager::domain::BumpKind;
use release_manager::environment::{self, Environment};
use release_manager::git::{Git2Repository, Repository};
use release_manager::release::ReleaseManager;
use release_manager::tools::{ReleaseMode, Secrets};
use release_manager::{ui, ReleaseError};

#[derive(Parser)]
#[command(
    name = "release",
    version,
    about = "Bump versions, cut release branches and deploy tagged bundles"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(long, global = true, default_value = ".", help = "Repository to operate on")]
    repo: PathBuf,

    #[arg(
        short,
        long,
        global = true,
        action = ArgAction::Count,
        help = "Increase log verbosity (-v, -vv, -vvv)"
    )]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Bump the version, tag it, and cut a release branch for major/minor bumps
    BumpVersion {
        #[arg(value_name = "MAJOR|MINOR|PATCH")]
        kind: BumpKind,
    },

    /// Deploy a bundle; production deploys cut and push a new version first
    Deploy {
        /// [staging|production] [major|minor|patch] <BUNDLE> <SOURCEMAP>
        ///
        /// The mode defaults to $ENV, then production. The bump defaults to patch.
        #[arg(required = true, num_args = 2..=4, value_name = "OPERAND")]
        operands: Vec<String>,
    },

    /// Build the bundle and move index.js and index.js.map into OUTPUT_DIRECTORY
    Build {
        output_directory: PathBuf,
        node_modules_path: PathBuf,
    },

    /// Print the latest released version (0.0.0 when there is none)
    PrintVersion,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        if e
            .downcast_ref::<ReleaseError>()
            .is_some_and(ReleaseError::is_policy_violation)
        {
            ui::display_warning("Nothing was tagged or pushed");
        }
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(args: Args) -> Result<()> {
    let repo = Git2Repository::open(&args.repo)?;
    let config = config::load_config(args.config.as_deref(), Some(repo.root()))
        .context("Error loading config")?;
    let manager = ReleaseManager::with_policy(&repo, config.branches.policy());

    match args.command {
        Command::BumpVersion { kind } => {
            let previous = manager.latest_version()?;
            let version = orchestration::bump(&manager, kind)?;
            ui::display_success(&ui::format_version_change(
                kind,
                previous.as_ref(),
                &version,
            ));
            ui::display_status(&format!("On branch {}", repo.current_branch()?));
        }
        Command::Deploy { operands } => {
            let env_mode = std::env::var("ENV").ok();
            let resolved = cli::resolve_deploy_operands(&operands, env_mode.as_deref())?;
            let deploy_args = DeployArgs {
                release_mode: resolved.release_mode,
                bump: resolved.bump,
                bundle_path: resolved.bundle_path,
                sourcemap_path: resolved.sourcemap_path,
                remote: config.remote.name.clone(),
            };

            let env = Environment::assemble(repo.root(), &config)
                .context("Cannot assemble the deploy environment")?;
            if deploy_args.release_mode == ReleaseMode::Production {
                ui::display_status(&format!("Cutting a {} release", deploy_args.bump));
            }

            let result = orchestration::deploy(
                &repo,
                &manager,
                env.wrangler(),
                &env.sentry(),
                &deploy_args,
            )?;
            ui::display_success(&ui::format_deploy_result(&result));
        }
        Command::Build {
            output_directory,
            node_modules_path,
        } => {
            let project_dir = std::env::current_dir()?;
            build(
                &project_dir,
                &config,
                repo.root(),
                &output_directory,
                &node_modules_path,
            )?;
        }
        Command::PrintVersion => {
            println!("{}", orchestration::print_version(&manager)?);
        }
    }

    Ok(())
}

fn build(
    project_dir: &Path,
    config: &Config,
    repo_root: &Path,
    output_directory: &Path,
    node_modules_path: &Path,
) -> Result<()> {
    let secrets = Secrets::from_home(config.tools.age.clone())?;
    let toml = project_dir.join("wrangler.toml");
    let wrangler = environment::setup_wrangler(&secrets, repo_root, config, &toml)?;

    ui::display_status("Building bundle...");
    let artifacts =
        orchestration::build(&wrangler, project_dir, output_directory, node_modules_path)?;
    for artifact in artifacts {
        ui::display_success(&format!("{}", artifact.display()));
    }
    Ok(())
}
