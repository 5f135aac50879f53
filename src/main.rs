use anyhow::Result;
use clap::Parser;
use dogdisk::app::App;
use dogdisk::models::Config;
use dogdisk::retry::PollPolicy;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "dogdisk")]
#[command(about = "Copy random images of a dog breed into a Yandex Disk folder")]
struct CliArgs {
    /// Breed name as listed by dog.ceo (for example `akita`).
    #[arg(value_name = "BREED")]
    breed: String,

    /// Destination folder on the disk.
    #[arg(long, default_value = "test_folder")]
    path: String,

    /// Poll the disk until the folder holds the expected files.
    #[arg(long)]
    verify: bool,

    /// Delete the folder before uploading and again when done.
    #[arg(long)]
    cleanup: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dogdisk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    info!("Starting dogdisk for breed {}", args.breed);

    let config = Config::from_env()?;
    let app = App::new(&config)?;

    if args.cleanup {
        app.storage().reset_folder(&args.path).await?;
    }

    let outcome = run(&app, &args).await;

    if args.cleanup {
        if let Err(e) = app.storage().reset_folder(&args.path).await {
            warn!("Cleanup of {} failed: {}", args.path, e);
        }
    }

    match outcome {
        Ok(true) => {
            info!("Upload completed successfully");
            Ok(())
        }
        Ok(false) => {
            error!("Folder {} did not reach the expected state", args.path);
            std::process::exit(1);
        }
        Err(e) => {
            error!("Upload failed: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run(app: &App, args: &CliArgs) -> dogdisk::Result<bool> {
    let report = app.upload_breed_images(&args.breed, &args.path).await?;
    for upload in &report.uploads {
        info!("Accepted {} from {}", upload.name, upload.source_url);
    }

    if !args.verify {
        return Ok(true);
    }
    app.verify_upload(
        &args.breed,
        &args.path,
        PollPolicy::FOLDER,
        PollPolicy::CONTENTS,
    )
    .await
}
