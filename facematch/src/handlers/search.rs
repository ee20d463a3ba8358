use serde_json::json;

use crate::{
    gateway::Gateways,
    model::{event::SearchRequest, face::FaceMatch},
    resolver::identity::{render_notification_summary, IdentityResolver},
};

use super::{HandlerError, HandlerResponse, HandlerResult};

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Summary that was published to observers
    pub summary: String,
    pub face_match: FaceMatch,
}

/// Searches an uploaded image against the registered faces and notifies observers of a match
pub async fn handle_search(gateways: &Gateways, body: &str) -> HandlerResponse {
    log::info!("Parsing request data.");

    match search(gateways, body).await {
        Ok(SearchOutcome {
            summary,
            face_match,
        }) => HandlerResponse::ok(json!({
            "message": format!("Succeed to find={}", summary),
            "faceId": face_match.face_id,
            "confidence": face_match.similarity,
        })),
        Err(e) => {
            log::error!("Search failed: {}", e);
            HandlerResponse::error(&e)
        }
    }
}

pub async fn search(gateways: &Gateways, body: &str) -> HandlerResult<SearchOutcome> {
    let image = SearchRequest::parse(body)?;

    log::info!("Searching faces [Image: {}]", image);

    let result = gateways.recognition.search_face(&image).await?;

    let identified = IdentityResolver::new(gateways.records.as_ref())
        .lookup(result)
        .await?
        .ok_or(HandlerError::NoSimilarFace)?;

    let summary = render_notification_summary(&identified.record);

    log::info!("Sending notification [FaceId: {}]", identified.face_match.face_id);

    gateways.notifier.publish(&summary).await?;

    Ok(SearchOutcome {
        summary,
        face_match: identified.face_match,
    })
}
