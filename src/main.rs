use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use liberty_features::models::{WorkspaceFolder, DEFAULT_LIBERTY_VERSION};
use liberty_features::workspace::path_to_uri;
use liberty_features::{FetchPolicy, Settings, VersionFeatureFacade};

#[derive(Parser)]
#[command(name = "liberty-features")]
#[command(about = "Resolve Liberty releases and their features for server.xml files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the build files under a directory and print their Liberty versions
    Scan {
        /// Workspace root to scan
        root: PathBuf,
    },
    /// List the public features of a Liberty release
    Features {
        /// Liberty release; defaults to the bundled dataset
        #[arg(short, long)]
        version: Option<String>,

        /// Fetch immediately, ignoring the request delay
        #[arg(short, long)]
        force: bool,
    },
    /// Print the Liberty version resolved for a server.xml
    Version {
        /// Path to the server.xml
        config: PathBuf,

        /// Workspace folder (repeatable)
        #[arg(short, long = "workspace", required = true)]
        workspaces: Vec<PathBuf>,
    },
    /// Check whether a feature exists for the project owning a server.xml
    Check {
        /// Path to the server.xml
        config: PathBuf,

        /// Feature short name, e.g. servlet-4.0
        feature: String,

        /// Workspace folder (repeatable)
        #[arg(short, long = "workspace", required = true)]
        workspaces: Vec<PathBuf>,
    },
}

/// Logs go to stderr so stdout carries only command output.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "liberty_features=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("Invalid path {}", path.display()))
}

async fn session(
    settings: &Settings,
    workspaces: &[PathBuf],
) -> anyhow::Result<VersionFeatureFacade> {
    let facade = VersionFeatureFacade::from_settings(settings)?;
    let mut folders = Vec::with_capacity(workspaces.len());
    for dir in workspaces {
        folders.push(WorkspaceFolder::new(path_to_uri(&absolute(dir)?)));
    }
    facade.initialize(folders).await;
    Ok(facade)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let settings = Settings::load();
    let policy = settings.fetch_policy();

    match cli.command {
        Commands::Scan { root } => {
            let facade = VersionFeatureFacade::from_settings(&settings)?;
            facade.build_files().scan(&absolute(&root)?).await;
            for descriptor in facade.build_files().descriptors() {
                println!(
                    "{}\t{}",
                    descriptor.path.display(),
                    descriptor.version.as_deref().unwrap_or("unknown")
                );
            }
        }
        Commands::Features { version, force } => {
            let facade = VersionFeatureFacade::from_settings(&settings)?;
            let policy = FetchPolicy {
                force_immediate: force || policy.force_immediate,
                ..policy
            };
            let features = facade
                .features_for_version(version.as_deref(), &policy)
                .await;
            for feature in features.iter() {
                match feature.short_description() {
                    Some(summary) => println!("{}\t{}", feature.short_name(), summary),
                    None => println!("{}", feature.short_name()),
                }
            }
        }
        Commands::Version { config, workspaces } => {
            let facade = session(&settings, &workspaces).await?;
            let uri = path_to_uri(&absolute(&config)?);
            match facade.version_for(&uri).await {
                Some(version) => println!("{}", version),
                None => println!("unknown (default {})", DEFAULT_LIBERTY_VERSION),
            }
        }
        Commands::Check {
            config,
            feature,
            workspaces,
        } => {
            let facade = session(&settings, &workspaces).await?;
            let uri = path_to_uri(&absolute(&config)?);
            match facade.get_feature(&feature, &uri, &policy).await {
                Some(found) => println!(
                    "{}\t{}\t{}",
                    found.short_name(),
                    found.wlp_information.visibility.as_str(),
                    found.name.as_deref().unwrap_or_default()
                ),
                None => {
                    println!("{} not found", feature);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
