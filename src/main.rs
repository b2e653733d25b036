use chrono::Utc;
use clap::{CommandFactory, Parser};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use worm_upload::config::UploaderConfig;
use worm_upload::infrastructure::storage;
use worm_upload::models::UploadRequest;

#[derive(Parser, Debug)]
#[command(author, version, about = "Create an object-locked bucket and upload a file under compliance retention", long_about = None)]
struct Args {
    /// The name of the bucket
    #[arg(short, long)]
    bucket: Option<String>,

    /// The file to upload
    #[arg(short, long)]
    file: Option<String>,

    /// Object key to store the file under (default: the file path)
    #[arg(short, long)]
    key: Option<String>,
}

fn usage() -> String {
    format!(
        "You must supply a bucket name [-b BUCKET] and a filename [-f FILENAME]\n{}",
        Args::command().render_usage()
    )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "worm_upload=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let request = match UploadRequest::new(
        args.bucket.as_deref().unwrap_or_default(),
        args.file.as_deref().unwrap_or_default(),
        args.key.as_deref(),
    ) {
        Ok(request) => request,
        Err(e) => {
            error!("❌ {}", e);
            // Printed directly so RUST_LOG cannot hide it.
            eprintln!("{}", usage());
            std::process::exit(1);
        }
    };

    let config = UploaderConfig::from_env();
    info!(
        "🔐 Bucket default: {} for {} days, object lock: {} for {} days",
        config.default_retention_mode,
        config.default_retention_days,
        config.object_lock_mode,
        config.object_retention_days
    );

    let storage = storage::setup_storage(&config).await?;

    let report = worm_upload::run(&*storage, &request, &config, Utc::now()).await?;

    if report.all_succeeded() {
        info!("🎉 All steps completed for {}", request.object_key());
    } else {
        info!("🏁 Finished with failures, see messages above");
    }

    Ok(())
}
