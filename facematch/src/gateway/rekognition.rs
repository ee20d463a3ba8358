use anyhow::anyhow;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_rekognition::{
    types::{Image, S3Object},
    Client,
};

use crate::{
    consts::consts::{FaceId, ImageRef, MAX_FACES},
    model::face::{FaceMatch, FaceMatchResult},
    options::PipelineOptions,
};

use super::{FaceRecognition, GatewayError, GatewayResult};

pub struct RekognitionGateway {
    client: Client,
    bucket: String,
    collection_id: String,
    face_match_threshold: f32,
}

impl RekognitionGateway {
    pub fn new(sdk: &SdkConfig, options: &PipelineOptions) -> Self {
        Self {
            client: Client::new(sdk),
            bucket: options.bucket.clone(),
            collection_id: options.collection_id.clone(),
            face_match_threshold: options.face_match_threshold,
        }
    }

    // Images are never uploaded inline, the service reads them straight from the bucket
    fn image(&self, image: &ImageRef) -> Image {
        Image::builder()
            .s3_object(
                S3Object::builder()
                    .bucket(&self.bucket)
                    .name(image.as_str())
                    .build(),
            )
            .build()
    }
}

#[async_trait]
impl FaceRecognition for RekognitionGateway {
    #[tracing::instrument(skip(self))]
    async fn search_face(&self, image: &ImageRef) -> GatewayResult<FaceMatchResult> {
        let response = self
            .client
            .search_faces_by_image()
            .collection_id(&self.collection_id)
            .image(self.image(image))
            .face_match_threshold(self.face_match_threshold)
            .max_faces(MAX_FACES)
            .send()
            .await
            .map_err(|e| GatewayError::UnableToSearchFaces(anyhow!(e)))?;

        let candidates = response.face_matches().iter().filter_map(|face_match| {
            let face_id = face_match.face()?.face_id()?;

            Some(FaceMatch::new(
                FaceId(face_id.to_string()),
                face_match.similarity().unwrap_or_default(),
            ))
        });

        Ok(FaceMatchResult::from_candidates(candidates))
    }

    #[tracing::instrument(skip(self))]
    async fn register_face(&self, image: &ImageRef) -> GatewayResult<FaceId> {
        let response = self
            .client
            .index_faces()
            .collection_id(&self.collection_id)
            .image(self.image(image))
            .max_faces(MAX_FACES)
            .send()
            .await
            .map_err(|e| GatewayError::UnableToIndexFace(anyhow!(e)))?;

        response
            .face_records()
            .iter()
            .find_map(|record| record.face()?.face_id())
            .map(|face_id| FaceId(face_id.to_string()))
            .ok_or_else(|| GatewayError::NoFaceIndexed(image.clone()))
    }
}
