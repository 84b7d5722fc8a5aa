//! Stowage CLI: upload files to the configured storage backend.
//!
//! Backend settings come from the environment, see `stowage_core::config`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use stowage_cli::{init_tracing, print_json, resolve_bucket};
use stowage_core::Config;
use stowage_storage::{create_storage, ObjectPathBuilder, Storage};
use stowage_upload::{decode_data_url, FileBlob, UploadConfig, UploadCoordinator};

#[derive(Parser)]
#[command(name = "stowage", about = "Upload files to object storage")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload one or more files
    Upload {
        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Owner of the uploaded objects
        #[arg(long)]
        user: String,
        /// Optional folder prefix
        #[arg(long)]
        folder: Option<String>,
        /// Target bucket (defaults to STORAGE_BUCKET)
        #[arg(long)]
        bucket: Option<String>,
    },
    /// Upload the payload of a data: URL
    UploadDataUrl {
        data_url: String,
        /// Name recorded for the decoded file
        #[arg(long)]
        filename: String,
        #[arg(long)]
        user: String,
        #[arg(long)]
        folder: Option<String>,
        #[arg(long)]
        bucket: Option<String>,
    },
    /// Print the key an upload would be stored under
    Key {
        filename: String,
        #[arg(long)]
        user: String,
        #[arg(long)]
        folder: Option<String>,
    },
    /// Delete previously uploaded objects
    Delete {
        #[arg(required = true)]
        paths: Vec<String>,
        #[arg(long)]
        bucket: Option<String>,
    },
}

async fn open_storage(config: &Config) -> anyhow::Result<Arc<dyn Storage>> {
    config.validate().context("Invalid storage configuration")?;
    create_storage(config)
        .await
        .context("Failed to initialize storage backend")
}

async fn coordinator(config: &Config) -> anyhow::Result<UploadCoordinator> {
    let storage = open_storage(config).await?;
    Ok(UploadCoordinator::with_config(
        storage,
        UploadConfig::from(config),
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.log_format());

    match cli.command {
        Commands::Upload {
            files,
            user,
            folder,
            bucket,
        } => {
            let bucket = resolve_bucket(bucket, &config)?;
            let mut blobs = Vec::with_capacity(files.len());
            for path in &files {
                let blob = FileBlob::from_path(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                blobs.push(blob);
            }

            let coordinator = coordinator(&config).await?;
            if let [blob] = blobs.as_slice() {
                let result = coordinator
                    .upload_one(&bucket, blob, &user, folder.as_deref())
                    .await;
                print_json(&result)?;
                if !result.is_success() {
                    anyhow::bail!("Upload of {} failed", blob.name);
                }
            } else {
                let batch = coordinator
                    .upload_many(&bucket, &blobs, &user, folder.as_deref())
                    .await;
                print_json(&batch)?;
                if !batch.is_complete_success() {
                    anyhow::bail!("{} of {} uploads failed", batch.errors.len(), blobs.len());
                }
            }
        }
        Commands::UploadDataUrl {
            data_url,
            filename,
            user,
            folder,
            bucket,
        } => {
            let bucket = resolve_bucket(bucket, &config)?;
            let blob = decode_data_url(&data_url, &filename).context("Invalid data URL")?;

            let coordinator = coordinator(&config).await?;
            let result = coordinator
                .upload_one(&bucket, &blob, &user, folder.as_deref())
                .await;
            print_json(&result)?;
            if !result.is_success() {
                anyhow::bail!("Upload of {} failed", filename);
            }
        }
        Commands::Key {
            filename,
            user,
            folder,
        } => {
            let key = ObjectPathBuilder::new().build(&user, &filename, folder.as_deref());
            print_json(&serde_json::json!({ "key": key.as_str() }))?;
        }
        Commands::Delete { paths, bucket } => {
            let bucket = resolve_bucket(bucket, &config)?;
            let coordinator = coordinator(&config).await?;

            let errors = coordinator.remove_many(&bucket, &paths).await;
            print_json(&serde_json::json!({
                "deleted": paths.len() - errors.len(),
                "errors": errors,
            }))?;
            if !errors.is_empty() {
                anyhow::bail!("{} of {} deletions failed", errors.len(), paths.len());
            }
        }
    }

    Ok(())
}
