use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use facematch::{
    consts::consts::{FaceId, ImageRef},
    gateway::{GatewayEngine, Gateways},
    handlers::{
        search::handle_search, stream::handle_stream_request, upload::handle_upload,
        HandlerResponse,
    },
    options::PipelineOptions,
};
use serde_json::json;

/// 🔎 Missing person face matching, runs the pipeline handlers from the command line
///
/// Configuration comes from the environment: BUCKETNAME, REKOGNITIONCOLLECTION,
/// REKOGNITIONFACEMATCHTHRESHOLD, SnsTopic, PersonData and optionally AWS_REGION
#[derive(Parser, Debug)]
struct Cli {
    /// Use the in-memory engine instead of AWS. Nothing outlives this invocation
    #[clap(long)]
    local: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Registers the face in an image together with a missing person's details
    Upload {
        /// Object key of the image in the bucket
        #[clap(short, long)]
        image: String,

        /// Local image to upload to the bucket under the key first
        #[clap(short, long)]
        file: Option<PathBuf>,

        /// JSON file with the `missingpersondata` object
        #[clap(short, long)]
        details: PathBuf,
    },
    /// Searches an image against registered faces and notifies observers of a match
    Search {
        /// Object key of the image in the bucket
        #[clap(short, long)]
        image: String,

        /// Local image to upload to the bucket under the key first
        #[clap(short, long)]
        file: Option<PathBuf>,
    },
    /// Processes a batch of face search stream records from a JSON event file
    Stream {
        #[clap(short, long)]
        event: PathBuf,
    },
    /// Prints the person record stored for a face id
    Record {
        #[clap(long)]
        face_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Cli::parse();

    let (engine, options) = if args.local {
        let options = PipelineOptions::from_env().unwrap_or_else(|e| {
            log::warn!("Using default options for the local engine: {}", e);
            PipelineOptions::default()
        });

        (GatewayEngine::Memory, options)
    } else {
        let options = PipelineOptions::from_env().context("Unable to load configuration")?;

        (GatewayEngine::Aws, options)
    };

    log::info!(
        "Engine: {:?} [Collection: {}, Threshold: {}]",
        engine,
        options.collection_id,
        options.face_match_threshold
    );

    let gateways = Gateways::from_engine(engine, &options).await;

    let response = match args.command {
        Command::Upload {
            image,
            file,
            details,
        } => {
            let image = stage_image(&gateways, image, file).await?;
            let details: serde_json::Value = serde_json::from_str(&read_file(&details)?)
                .context("Details file is not valid JSON")?;

            let body = json!({ "image": image, "missingpersondata": details }).to_string();

            handle_upload(&gateways, &body).await
        }
        Command::Search { image, file } => {
            let image = stage_image(&gateways, image, file).await?;

            handle_search(&gateways, &json!({ "image": image }).to_string()).await
        }
        Command::Stream { event } => handle_stream_request(&gateways, &read_file(&event)?).await,
        Command::Record { face_id } => {
            let record = gateways.records.get_record(&FaceId(face_id)).await?;

            println!("{}", serde_json::to_string_pretty(&record)?);

            return Ok(());
        }
    };

    print_response(&response)
}

async fn stage_image(
    gateways: &Gateways,
    image: String,
    file: Option<PathBuf>,
) -> anyhow::Result<ImageRef> {
    let Some(file) = file else {
        return Ok(ImageRef(image));
    };

    let bytes = tokio::fs::read(&file)
        .await
        .with_context(|| format!("Unable to read image {}", file.display()))?;

    log::info!("Uploading {} as {}", file.display(), image);

    Ok(gateways.images.put_image(&image, bytes).await?)
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Unable to read {}", path.display()))
}

fn print_response(response: &HandlerResponse) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&response.body_json())?);

    if !response.is_success() {
        anyhow::bail!("Handler failed with status {}", response.status_code);
    }

    Ok(())
}
