use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use s3site::config::{read_config, SyncConfig};
use s3site::invalidation::{invalidate_files, CloudFrontInvalidator};
use s3site::site::{Site, SiteConfig};
use s3site::state::{read_state, remove_state, write_state};
use s3site::store::S3Store;
use s3site::utils::STATE_FILE;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "s3site.json";

/// s3site - keep an S3 bucket in sync with a static site archive
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Engine configuration file (JSON)
    #[arg(long, env = "S3SITE_CONFIG", default_value = DEFAULT_CONFIG, global = true)]
    config: PathBuf,

    /// File holding the last applied state
    #[arg(long, env = "S3SITE_STATE", default_value = STATE_FILE, global = true)]
    state: PathBuf,

    /// Parent directory for staging extracted archives
    #[arg(long, env = "S3SITE_STAGING_ROOT", global = true)]
    staging_root: Option<PathBuf>,

    /// Maximum number of concurrent uploads or deletes
    #[arg(long, env = "S3SITE_PARALLELISM", global = true)]
    parallelism: Option<usize>,

    /// Custom S3-compatible endpoint
    #[arg(long, env = "S3SITE_ENDPOINT_URL", global = true)]
    endpoint_url: Option<String>,

    /// Address buckets as path segments instead of subdomains
    #[arg(long, env = "S3SITE_FORCE_PATH_STYLE", global = true)]
    force_path_style: bool,

    /// AWS region
    #[arg(long, env = "S3SITE_REGION", global = true)]
    region: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show what an apply would upload and delete
    Plan(SiteArgs),
    /// Upload the archive and remove objects that are no longer in it
    Apply(SiteArgs),
    /// Refresh the recorded state from the bucket
    Refresh,
    /// Remove every object from the recorded bucket
    Destroy,
    /// Start tracking an existing bucket
    Import {
        #[arg(long)]
        bucket: String,
    },
    /// Invalidate every recorded file on a CloudFront distribution
    Invalidate {
        #[arg(long)]
        distribution_id: String,
    },
}

#[derive(Args, Debug)]
struct SiteArgs {
    /// Target bucket
    #[arg(long)]
    bucket: String,

    /// Archive to deploy
    #[arg(long)]
    path: PathBuf,

    /// Skip keys containing this substring
    #[arg(long, default_value = "")]
    exclude: String,
}

impl From<SiteArgs> for SiteConfig {
    fn from(args: SiteArgs) -> Self {
        SiteConfig::new(args.bucket, args.path).with_exclude(args.exclude)
    }
}

async fn load_config(cli: &Cli) -> anyhow::Result<SyncConfig> {
    let mut config = read_config(&cli.config)
        .await
        .with_context(|| format!("reading {}", cli.config.display()))?
        .unwrap_or_default();

    if let Some(staging_root) = &cli.staging_root {
        config.staging_root = staging_root.clone();
    }
    if let Some(parallelism) = cli.parallelism {
        config.parallelism = parallelism;
    }
    if cli.endpoint_url.is_some() {
        config.endpoint_url = cli.endpoint_url.clone();
    }
    if cli.force_path_style {
        config.force_path_style = true;
    }
    if cli.region.is_some() {
        config.region = cli.region.clone();
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli).await?;
    let previous = read_state(&cli.state)
        .await
        .with_context(|| format!("reading {}", cli.state.display()))?;

    let store = Arc::new(S3Store::from_config(&config).await);
    let site = Site::new(store, config.clone());

    match cli.command {
        Command::Plan(args) => {
            let site_config = SiteConfig::from(args);
            let recorded = previous.map(|s| s.files).unwrap_or_default();
            let plan = site.plan(&site_config, &recorded).await?;

            for key in &plan.to_put {
                println!("put    {}", s3site::state::decode_key(key));
            }
            for key in &plan.to_delete {
                println!("delete {}", s3site::state::decode_key(key));
            }
            println!(
                "Plan: {} to put, {} to delete",
                plan.to_put.len(),
                plan.to_delete.len()
            );
        }
        Command::Apply(args) => {
            let site_config = SiteConfig::from(args);
            let applied = match previous.filter(|s| s.id.is_some()) {
                Some(previous) => site.update(&site_config, &previous).await?,
                None => site.create(&site_config).await?,
            };
            write_state(&cli.state, &applied.state).await?;
            info!(
                put = applied.result.put.len(),
                deleted = applied.result.deleted.len(),
                "Apply complete"
            );
        }
        Command::Refresh => {
            let Some(previous) = previous else {
                bail!("no state at {}", cli.state.display());
            };
            let state = site.read(previous).await?;
            write_state(&cli.state, &state).await?;
            info!(files = state.files.len(), tracked = state.id.is_some(), "Refresh complete");
        }
        Command::Destroy => {
            let Some(previous) = previous else {
                bail!("no state at {}", cli.state.display());
            };
            let deleted = site.delete(&previous).await?;
            remove_state(&cli.state).await?;
            info!(deleted = deleted.len(), "Destroy complete");
        }
        Command::Import { bucket } => {
            if previous.is_some() {
                bail!("state already exists at {}", cli.state.display());
            }
            let state = site.import(&bucket).await?;
            if state.id.is_none() {
                bail!("bucket {bucket} does not exist");
            }
            write_state(&cli.state, &state).await?;
            info!(bucket = %bucket, files = state.files.len(), "Import complete");
        }
        Command::Invalidate { distribution_id } => {
            let Some(previous) = previous else {
                bail!("no state at {}", cli.state.display());
            };
            let invalidator = CloudFrontInvalidator::from_config(&config).await;
            match invalidate_files(&invalidator, &distribution_id, &previous.files).await? {
                Some(id) => info!(invalidation_id = %id, "Invalidation created"),
                None => info!("Nothing to invalidate"),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use s3site::config::write_config;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("Should parse arguments")
    }

    #[tokio::test]
    async fn test_endpoint_keeps_configured_addressing_style() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s3site.json");
        write_config(&path, &SyncConfig::default()).await.unwrap();
        let config_arg = path.to_string_lossy().to_string();
        let config_arg = config_arg.as_str();

        let cli = parse(&[
            "s3site",
            "--config",
            config_arg,
            "--endpoint-url",
            "http://localhost:9000",
            "refresh",
        ]);
        let config = load_config(&cli).await.unwrap();
        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:9000"));
        assert!(!config.force_path_style);

        let cli = parse(&["s3site", "--config", config_arg, "--force-path-style", "refresh"]);
        let config = load_config(&cli).await.unwrap();
        assert!(config.force_path_style);
    }
}
