use std::sync::Arc;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use thiserror::Error;

use crate::{
    consts::consts::{FaceId, ImageRef},
    model::{face::FaceMatchResult, person::PersonRecord, validation::ValidationError},
    options::PipelineOptions,
};

pub mod dynamodb;
pub mod memory;
pub mod rekognition;
pub mod s3;
pub mod sns;

/// Any failure of a dependent service call
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Unable to search faces: {0}")]
    UnableToSearchFaces(anyhow::Error),

    #[error("Unable to index face: {0}")]
    UnableToIndexFace(anyhow::Error),

    #[error("Fail to register a face, no face was indexed from image: {0}")]
    NoFaceIndexed(ImageRef),

    #[error("Unable to read person record: {0}")]
    UnableToReadRecord(anyhow::Error),

    #[error("Unable to write person record: {0}")]
    UnableToWriteRecord(anyhow::Error),

    #[error("Stored person record is invalid: {0}")]
    InvalidStoredRecord(#[from] ValidationError),

    #[error("Unable to publish notification: {0}")]
    UnableToPublish(anyhow::Error),

    #[error("Unable to write image: {0}")]
    UnableToWriteImage(anyhow::Error),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[async_trait]
pub trait FaceRecognition: Send + Sync {
    /// Best match at or above the configured threshold, if any. Has no side effects
    async fn search_face(&self, image: &ImageRef) -> GatewayResult<FaceMatchResult>;

    /// Indexes the face in the image into the collection and returns its new identifier
    async fn register_face(&self, image: &ImageRef) -> GatewayResult<FaceId>;
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Absent records are `Ok(None)`, never an error
    async fn get_record(&self, face_id: &FaceId) -> GatewayResult<Option<PersonRecord>>;

    /// Unconditional upsert keyed by face id
    async fn put_record(&self, record: &PersonRecord) -> GatewayResult<()>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, message: &str) -> GatewayResult<()>;
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn put_image(&self, key: &str, bytes: Vec<u8>) -> GatewayResult<ImageRef>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GatewayEngine {
    Aws,
    Memory,
}

/// One client per collaborator, built once at process start and shared by every invocation
#[derive(Clone)]
pub struct Gateways {
    pub recognition: Arc<dyn FaceRecognition>,
    pub records: Arc<dyn RecordStore>,
    pub notifier: Arc<dyn Notifier>,
    pub images: Arc<dyn ImageStore>,
}

impl Gateways {
    pub async fn from_engine(engine: GatewayEngine, options: &PipelineOptions) -> Self {
        match engine {
            GatewayEngine::Aws => Gateways::aws(options).await,
            GatewayEngine::Memory => Gateways::memory(options),
        }
    }

    pub async fn aws(options: &PipelineOptions) -> Self {
        let sdk = load_sdk_config(options).await;

        Self {
            recognition: Arc::new(rekognition::RekognitionGateway::new(&sdk, options)),
            records: Arc::new(dynamodb::DynamoDBRecordStore::new(&sdk, options)),
            notifier: Arc::new(sns::SnsNotifier::new(&sdk, options)),
            images: Arc::new(s3::S3ImageStore::new(&sdk, options)),
        }
    }

    pub fn memory(options: &PipelineOptions) -> Self {
        let recognition = memory::MemoryFaceRecognition::new(options.face_match_threshold);

        Self {
            images: recognition.image_store(),
            recognition: Arc::new(recognition),
            records: Arc::new(memory::MemoryRecordStore::new()),
            notifier: Arc::new(memory::MemoryNotifier::new()),
        }
    }
}

async fn load_sdk_config(options: &PipelineOptions) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &options.region {
        loader = loader.region(Region::new(region.clone()));
    }

    loader.load().await
}
