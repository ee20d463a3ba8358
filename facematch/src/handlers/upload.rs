use serde_json::json;

use crate::{
    consts::consts::{FaceId, ImageRef},
    gateway::Gateways,
    model::{
        event::UploadRequest,
        person::{MissingPersonData, PersonRecord},
    },
    resolver::identity::{render_duplicate_summary, IdentityResolver, Resolution},
};

use super::{HandlerResponse, HandlerResult};

#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// A new record was stored under this face id
    Registered(FaceId),
    /// The face was already registered, nothing was written
    AlreadyRegistered(PersonRecord),
}

impl UploadOutcome {
    pub fn message(&self) -> String {
        match self {
            UploadOutcome::Registered(_) => "Success. Face recorded".to_string(),
            UploadOutcome::AlreadyRegistered(record) => render_duplicate_summary(record),
        }
    }
}

/// Registers a face with its biographic data, or reports who it is already registered to
pub async fn handle_upload(gateways: &Gateways, body: &str) -> HandlerResponse {
    log::info!("Parsing request data.");

    match upload(gateways, body).await {
        Ok(outcome) => {
            let body = match &outcome {
                UploadOutcome::Registered(face_id) => {
                    json!({ "message": outcome.message(), "faceId": face_id })
                }
                UploadOutcome::AlreadyRegistered(_) => json!({ "message": outcome.message() }),
            };

            HandlerResponse::ok(body)
        }
        Err(e) => {
            log::error!("Upload failed: {}", e);
            HandlerResponse::error(&e)
        }
    }
}

pub async fn upload(gateways: &Gateways, body: &str) -> HandlerResult<UploadOutcome> {
    let (image, data) = UploadRequest::parse(body)?;

    register_image(gateways, &image, &data).await
}

/// Searches before indexing so the same face is never registered twice
pub async fn register_image(
    gateways: &Gateways,
    image: &ImageRef,
    data: &MissingPersonData,
) -> HandlerResult<UploadOutcome> {
    let resolver = IdentityResolver::new(gateways.records.as_ref());

    log::info!("Searching faces [Image: {}]", image);

    let result = gateways.recognition.search_face(image).await?;

    let outcome = match resolver.resolve(result, Some(data)).await? {
        Resolution::NoMatch => {
            log::info!("Face not found, indexing [Image: {}]", image);

            let face_id = gateways.recognition.register_face(image).await?;

            UploadOutcome::Registered(resolver.register(face_id, data).await?)
        }
        Resolution::Registered { face_id } => UploadOutcome::Registered(face_id),
        Resolution::Resolved(identified) => {
            log::info!("Face already exists [FaceId: {}]", identified.face_match.face_id);

            UploadOutcome::AlreadyRegistered(identified.record)
        }
    };

    Ok(outcome)
}
